//! Configuration module for the family tree DPL.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;
use crate::tree::DEFAULT_MAX_DEPTH;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Basic auth user name
    pub api_user: String,
    /// Basic auth password; authentication is disabled when unset
    pub api_password: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Deepest subtree a tree view will build
    pub max_tree_depth: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_user = env::var("DPL_API_USER").unwrap_or_else(|_| "admin".to_string());
        let api_password = env::var("DPL_API_PASSWORD").ok().filter(|p| !p.is_empty());

        let db_path = env::var("DPL_DB_PATH")
            .unwrap_or_else(|_| "./data/brothers.sqlite".to_string())
            .into();

        let raw_addr = env::var("DPL_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8051".to_string());
        let bind_addr = raw_addr.parse::<SocketAddr>().map_err(|e| {
            AppError::Internal(format!("Invalid DPL_BIND_ADDR {:?}: {}", raw_addr, e))
        })?;

        let log_level = env::var("DPL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("DPL_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let max_tree_depth = match env::var("DPL_MAX_TREE_DEPTH") {
            Ok(raw) => raw.parse::<usize>().map_err(|e| {
                AppError::Internal(format!("Invalid DPL_MAX_TREE_DEPTH {:?}: {}", raw, e))
            })?,
            Err(_) => DEFAULT_MAX_DEPTH,
        };

        Ok(Self {
            api_user,
            api_password,
            db_path,
            bind_addr,
            log_level,
            log_format,
            max_tree_depth,
        })
    }
}
