pub mod domain;
pub mod proxy;
pub mod time;
pub mod upstream;

pub mod config {
    use anyhow::Context;
    use chrono::FixedOffset;

    pub const DEFAULT_GAG_BASE_URL: &str = "https://gagapi.onrender.com";
    pub const DEFAULT_CYCLEON_BASE_URL: &str = "https://cycleonapi-production.up.railway.app";
    pub const DEFAULT_IMAGE_CDN_BASE_URL: &str = "https://cdn.3itx.tech/image/GrowAGarden/";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub gag_base_url: String,
        pub cycleon_base_url: String,
        pub image_cdn_base_url: String,
        pub cycleon_accept_invalid_certs: bool,
        pub restock_utc_offset_minutes: i32,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                gag_base_url: DEFAULT_GAG_BASE_URL.to_string(),
                cycleon_base_url: DEFAULT_CYCLEON_BASE_URL.to_string(),
                image_cdn_base_url: DEFAULT_IMAGE_CDN_BASE_URL.to_string(),
                cycleon_accept_invalid_certs: false,
                restock_utc_offset_minutes: 0,
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();

            let cycleon_accept_invalid_certs = match non_empty_var("CYCLEON_ACCEPT_INVALID_CERTS") {
                Some(v) => v
                    .parse::<bool>()
                    .with_context(|| format!("CYCLEON_ACCEPT_INVALID_CERTS must be true or false (got {v})"))?,
                None => defaults.cycleon_accept_invalid_certs,
            };

            let restock_utc_offset_minutes = match non_empty_var("RESTOCK_UTC_OFFSET_MINUTES") {
                Some(v) => v
                    .parse::<i32>()
                    .with_context(|| format!("RESTOCK_UTC_OFFSET_MINUTES must be an integer (got {v})"))?,
                None => defaults.restock_utc_offset_minutes,
            };

            let settings = Self {
                gag_base_url: non_empty_var("GAG_BASE_URL").unwrap_or(defaults.gag_base_url),
                cycleon_base_url: non_empty_var("CYCLEON_BASE_URL")
                    .unwrap_or(defaults.cycleon_base_url),
                image_cdn_base_url: non_empty_var("IMAGE_CDN_BASE_URL")
                    .unwrap_or(defaults.image_cdn_base_url),
                cycleon_accept_invalid_certs,
                restock_utc_offset_minutes,
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            };

            // Fail at startup rather than on the first restock.
            settings.restock_offset()?;
            Ok(settings)
        }

        pub fn restock_offset(&self) -> anyhow::Result<FixedOffset> {
            FixedOffset::east_opt(self.restock_utc_offset_minutes * 60).with_context(|| {
                format!(
                    "RESTOCK_UTC_OFFSET_MINUTES out of range: {}",
                    self.restock_utc_offset_minutes
                )
            })
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

}
