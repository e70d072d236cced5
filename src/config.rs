// ⚙️ Configuration - environment variables with sensible defaults

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "contracts.db";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `CONTRACTS_DB`
    pub db_path: PathBuf,
    /// `CONTRACTS_ADDR`
    pub bind_addr: SocketAddr,
    /// `CONTRACTS_API_URL`, base URL remote clients talk to
    pub api_url: String,
    /// `CONTRACTS_LOG_JSON`
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            api_url: DEFAULT_API_URL.to_string(),
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup("CONTRACTS_DB") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(addr) = lookup("CONTRACTS_ADDR") {
            config.bind_addr = addr
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid CONTRACTS_ADDR '{}': {}", addr, e))?;
        }
        if let Some(url) = lookup("CONTRACTS_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(flag) = lookup("CONTRACTS_LOG_JSON") {
            config.log_json = parse_bool(&flag)
                .ok_or_else(|| anyhow::anyhow!("invalid CONTRACTS_LOG_JSON '{}'", flag))?;
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

/// Install the tracing subscriber; `RUST_LOG` overrides the `info` default
pub fn init_tracing(log_json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("tracing already initialized: {}", e);
    }
}
