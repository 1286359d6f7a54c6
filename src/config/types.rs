use std::path::PathBuf;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";

/// This holds the server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Addresses to accept connections on
    pub listen_addresses: Vec<String>,

    /// Directory whose subtree is listed
    pub root: PathBuf,

    /// Directory holding a custom 404.html
    pub error_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addresses: vec![DEFAULT_LISTEN.to_string()],
            root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            error_path: None,
        }
    }
}
