//! Server configuration for Kravy.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `KRAVY_*` environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use kravy_widgets::dialog::{AUTO_CLOSE_DELAY, AUTO_OPEN_DELAY};
use kravy_widgets::session::DisplayPolicy;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REDB_PATH: &str = "./data/leads.redb";
const DEFAULT_ROCKSDB_PATH: &str = "./data/leads";
const DEFAULT_WHATSAPP_NUMBER: &str = "919289507882";
const DEFAULT_WHATSAPP_MESSAGE: &str =
    "Hi Kravy team, I want to know more about the billing software.";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Storage backend type.
    pub storage_backend: StorageBackendType,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Landing page and widget settings.
    pub landing: LandingConfig,
}

/// Settings rendered into the landing page.
#[derive(Debug, Clone)]
pub struct LandingConfig {
    /// WhatsApp number for the chat link, international format.
    pub whatsapp_number: String,
    /// Pre-filled chat message.
    pub whatsapp_message: String,
    /// Delay before the lead-capture popup opens.
    pub popup_open_delay: Duration,
    /// Delay before the popup closes after a successful submission.
    pub popup_close_delay: Duration,
    /// When the popup is allowed to appear.
    pub popup_policy: DisplayPolicy,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_owned(),
            whatsapp_message: DEFAULT_WHATSAPP_MESSAGE.to_owned(),
            popup_open_delay: AUTO_OPEN_DELAY,
            popup_close_delay: AUTO_CLOSE_DELAY,
            popup_policy: DisplayPolicy::EveryLoad,
        }
    }
}

/// Supported storage backend types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (development only, data lost on restart).
    Memory,
    /// redb single-file storage.
    Redb { path: String },
    /// `RocksDB` persistent storage.
    RocksDb { path: String },
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on (binds to `0.0.0.0`)
    /// - `KRAVY_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:3000`)
    /// - `KRAVY_STORAGE`: `memory`, `redb`, or `rocksdb` (default: `redb`)
    /// - `KRAVY_STORAGE_PATH`: path for persistent backends (default:
    ///   `./data/leads.redb` for redb, `./data/leads` for `RocksDB`)
    /// - `KRAVY_LOG_LEVEL`: log filter (default: `info`)
    /// - `KRAVY_WHATSAPP_NUMBER` / `KRAVY_WHATSAPP_MESSAGE`: chat link target
    /// - `KRAVY_POPUP_DELAY_MS`: popup open delay (default: `1800`)
    /// - `KRAVY_POPUP_POLICY`: `every-load` or `once-per-session` (default: `every-load`)
    ///
    /// # Errors
    ///
    /// Returns an error if `KRAVY_STORAGE` names an unknown backend.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source. Unparseable
    /// tunables fall back to their defaults; an unknown storage backend is
    /// an error so a typo never silently loses data.
    ///
    /// # Errors
    ///
    /// Returns an error if `KRAVY_STORAGE` names an unknown backend.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        // Priority: KRAVY_BIND_ADDR > PORT > default 127.0.0.1:3000
        let bind_addr = if let Some(addr) = lookup("KRAVY_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))
        } else if let Some(port_str) = lookup("PORT") {
            let port: u16 = port_str.parse().unwrap_or(DEFAULT_PORT);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
        };

        let storage_path = lookup("KRAVY_STORAGE_PATH");

        let storage_backend = match lookup("KRAVY_STORAGE")
            .unwrap_or_else(|| "redb".to_owned())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackendType::Memory,
            "redb" => StorageBackendType::Redb {
                path: storage_path.unwrap_or_else(|| DEFAULT_REDB_PATH.to_owned()),
            },
            "rocksdb" => StorageBackendType::RocksDb {
                path: storage_path.unwrap_or_else(|| DEFAULT_ROCKSDB_PATH.to_owned()),
            },
            other => anyhow::bail!(
                "unknown KRAVY_STORAGE value '{other}' (expected memory, redb or rocksdb)"
            ),
        };

        let log_level = lookup("KRAVY_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let defaults = LandingConfig::default();
        let landing = LandingConfig {
            whatsapp_number: lookup("KRAVY_WHATSAPP_NUMBER").unwrap_or(defaults.whatsapp_number),
            whatsapp_message: lookup("KRAVY_WHATSAPP_MESSAGE")
                .unwrap_or(defaults.whatsapp_message),
            popup_open_delay: lookup("KRAVY_POPUP_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .map_or(defaults.popup_open_delay, Duration::from_millis),
            popup_close_delay: defaults.popup_close_delay,
            popup_policy: lookup("KRAVY_POPUP_POLICY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.popup_policy),
        };

        Ok(Self {
            bind_addr,
            storage_backend,
            log_level,
            landing,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(
            cfg.storage_backend,
            StorageBackendType::Redb {
                path: DEFAULT_REDB_PATH.to_owned()
            }
        );
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.landing.popup_open_delay, Duration::from_millis(1800));
        assert_eq!(cfg.landing.popup_policy, DisplayPolicy::EveryLoad);
    }

    #[test]
    fn port_binds_all_interfaces() {
        let cfg = config(&[("PORT", "8080")]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
    }

    #[test]
    fn bind_addr_overrides_port() {
        let cfg = config(&[("PORT", "8080"), ("KRAVY_BIND_ADDR", "10.0.0.1:9000")]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([10, 0, 0, 1], 9000)));
    }

    #[test]
    fn storage_selection() {
        let cfg = config(&[("KRAVY_STORAGE", "REDB"), ("KRAVY_STORAGE_PATH", "/tmp/leads")]);
        assert_eq!(
            cfg.storage_backend,
            StorageBackendType::Redb {
                path: "/tmp/leads".to_owned()
            }
        );

        let cfg = config(&[("KRAVY_STORAGE", "memory")]);
        assert_eq!(cfg.storage_backend, StorageBackendType::Memory);

        let cfg = config(&[("KRAVY_STORAGE", "rocksdb")]);
        assert_eq!(
            cfg.storage_backend,
            StorageBackendType::RocksDb {
                path: DEFAULT_ROCKSDB_PATH.to_owned()
            }
        );
    }

    #[test]
    fn unknown_storage_backend_is_rejected() {
        let err = ServerConfig::from_lookup(|key| {
            (key == "KRAVY_STORAGE").then(|| "reddb".to_owned())
        })
        .unwrap_err();
        assert!(err.to_string().contains("reddb"));
    }

    #[test]
    fn popup_settings_and_bad_values() {
        let cfg = config(&[
            ("KRAVY_POPUP_DELAY_MS", "500"),
            ("KRAVY_POPUP_POLICY", "once-per-session"),
        ]);
        assert_eq!(cfg.landing.popup_open_delay, Duration::from_millis(500));
        assert_eq!(cfg.landing.popup_policy, DisplayPolicy::OncePerSession);

        let cfg = config(&[("KRAVY_POPUP_DELAY_MS", "soon"), ("KRAVY_POPUP_POLICY", "never")]);
        assert_eq!(cfg.landing.popup_open_delay, AUTO_OPEN_DELAY);
        assert_eq!(cfg.landing.popup_policy, DisplayPolicy::EveryLoad);
    }
}
