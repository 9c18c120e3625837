pub mod forecast;
pub mod prediction;
pub mod stock;
pub mod weather;
