use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MediDesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> String {
    "medidesk=info,axum=warn".to_string()
}

/// Get the application data directory
/// ~/MediDesk/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("MediDesk")
}

/// Path of the SQLite database, overridable via MEDIDESK_DB
pub fn database_path() -> PathBuf {
    match std::env::var("MEDIDESK_DB") {
        Ok(path) => PathBuf::from(path),
        Err(_) => app_data_dir().join("hospital.db"),
    }
}

/// Listen address, overridable via MEDIDESK_ADDR
pub fn bind_addr() -> SocketAddr {
    std::env::var("MEDIDESK_ADDR")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 5000)))
}
