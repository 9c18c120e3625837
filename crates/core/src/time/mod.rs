pub mod restock;
