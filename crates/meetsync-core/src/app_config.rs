use std::path::PathBuf;

/// Runtime configuration for the daemon, resolved once at startup from
/// environment variables. See [`crate::load_app_config`].
#[derive(Clone)]
pub struct AppConfig {
    pub bmlt_base_url: String,
    pub bmlt_admin_user: String,
    pub bmlt_admin_pass: String,
    pub bmlt_api_prefix: String,
    pub sync_interval_minutes: i64,
    pub data_dir: PathBuf,
    pub wp_base: String,
    pub service_body_id: i64,
    pub default_lat: f64,
    pub default_lon: f64,
    pub allow_fallback_coords: bool,
    pub default_province: String,
    pub log_level: String,
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bmlt_base_url", &self.bmlt_base_url)
            .field("bmlt_admin_user", &self.bmlt_admin_user)
            .field("bmlt_admin_pass", &"[redacted]")
            .field("bmlt_api_prefix", &self.bmlt_api_prefix)
            .field("sync_interval_minutes", &self.sync_interval_minutes)
            .field("data_dir", &self.data_dir)
            .field("wp_base", &self.wp_base)
            .field("service_body_id", &self.service_body_id)
            .field("default_lat", &self.default_lat)
            .field("default_lon", &self.default_lon)
            .field("allow_fallback_coords", &self.allow_fallback_coords)
            .field("default_province", &self.default_province)
            .field("log_level", &self.log_level)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}
