use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Per-request timeout in seconds. A remote write on the interactive path
    /// must give up quickly; the queue picks it up afterwards.
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    /// Drain interval in seconds while online.
    pub sync_interval: u64,
    /// Replay attempts before a queue item is quarantined.
    pub max_retries: u32,
    pub backoff_base_secs: u64,
    pub backoff_cap_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/crewdesk.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            remote: RemoteConfig {
                base_url: "http://localhost:3000".to_string(),
                api_key: None,
                request_timeout: 10,
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval: 60,
                max_retries: 5,
                backoff_base_secs: 5,
                backoff_cap_secs: 300,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("CREWDESK_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("CREWDESK_REMOTE_URL") {
            if !v.trim().is_empty() {
                cfg.remote.base_url = v;
            }
        }
        if let Ok(v) = std::env::var("CREWDESK_REMOTE_API_KEY") {
            if !v.trim().is_empty() {
                cfg.remote.api_key = Some(v);
            }
        }
        if let Ok(v) = std::env::var("CREWDESK_REMOTE_TIMEOUT") {
            cfg.remote.request_timeout = parse_u64(&v, cfg.remote.request_timeout);
        }
        if let Ok(v) = std::env::var("CREWDESK_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Ok(v) = std::env::var("CREWDESK_SYNC_INTERVAL") {
            cfg.sync.sync_interval = parse_u64(&v, cfg.sync.sync_interval);
        }
        if let Ok(v) = std::env::var("CREWDESK_SYNC_MAX_RETRIES") {
            cfg.sync.max_retries = parse_u32(&v, cfg.sync.max_retries);
        }
        if let Ok(v) = std::env::var("CREWDESK_SYNC_BACKOFF_BASE") {
            cfg.sync.backoff_base_secs = parse_u64(&v, cfg.sync.backoff_base_secs);
        }
        if let Ok(v) = std::env::var("CREWDESK_SYNC_BACKOFF_CAP") {
            cfg.sync.backoff_cap_secs = parse_u64(&v, cfg.sync.backoff_cap_secs);
        }

        cfg
    }
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str, default: u64) -> u64 {
    value.trim().parse().unwrap_or(default)
}

fn parse_u32(value: &str, default: u32) -> u32 {
    value.trim().parse().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert!(cfg.sync.auto_sync);
        assert_eq!(cfg.sync.max_retries, 5);
        assert!(cfg.sync.backoff_base_secs < cfg.sync.backoff_cap_secs);
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("TRUE", false));
        assert!(parse_bool("on", false));
        assert!(!parse_bool("off", true));
        assert!(parse_bool("garbage", true));
    }
}
