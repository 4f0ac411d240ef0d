//! Waypoint Configuration Management
//!
//! Loads the proxy configuration from `waypoint.conf`, a flat
//! `key = value` file with `#` comments. Missing file or missing keys
//! fall back to defaults so a bare checkout still starts.

use std::fs;
use std::path::Path;
use waypoint_core::{Result, WaypointError};

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "waypoint.conf";

/// Complete proxy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyConfig {
    /// Address the proxy listens on (from "bind" option)
    pub bind_address: String,
    /// Backend game server the proxy forwards to (from "backend" option)
    pub backend_address: String,
    /// Message of the day shown in the server list (from "motd" option)
    pub motd: String,
    /// Player cap advertised in the server list (from "maxplayers" option)
    pub max_players: u32,
    /// Value of the strict-error-handling flag appended to login success
    /// on wire revision 766 (from "strict-error-handling" option)
    pub strict_error_handling: bool,
    /// Close connections idle for this many seconds (from "idle-timeout" option)
    pub idle_timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:25565".into(),
            backend_address: "127.0.0.1:25566".into(),
            motd: "A Waypoint Proxy".into(),
            max_players: 100,
            strict_error_handling: true,
            idle_timeout_secs: 30,
        }
    }
}

impl ProxyConfig {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            WaypointError::Config(format!(
                "Cannot read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(Self::parse(&content))
    }

    /// Load `waypoint.conf` from the working directory
    pub fn load_default() -> Result<Self> {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }

    /// Parse configuration file content
    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(eq_pos) = line.find('=') {
                let key = line[..eq_pos].trim();
                let value = line[eq_pos + 1..].trim();
                config.parse_option(key, value);
            } else {
                tracing::warn!(line, "ignoring malformed configuration line");
            }
        }

        config
    }

    fn parse_option(&mut self, key: &str, value: &str) {
        match key {
            "bind" => self.bind_address = value.into(),
            "backend" => self.backend_address = value.into(),
            "motd" => self.motd = value.into(),
            "maxplayers" => {
                self.max_players = value.parse().unwrap_or(100);
            }
            "strict-error-handling" => {
                self.strict_error_handling = value.parse().unwrap_or(true);
            }
            "idle-timeout" => {
                self.idle_timeout_secs = value.parse().unwrap_or(30);
            }
            _ => {
                tracing::warn!(key, "unknown configuration option");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0:25565");
        assert_eq!(config.max_players, 100);
        assert!(config.strict_error_handling);
    }

    #[test]
    fn test_parse_overrides_and_comments() {
        let content = "\
# Waypoint proxy configuration
bind = 127.0.0.1:25577

backend = game.internal:25565
motd = Hello there
maxplayers = 250
strict-error-handling = false
";
        let config = ProxyConfig::parse(content);
        assert_eq!(config.bind_address, "127.0.0.1:25577");
        assert_eq!(config.backend_address, "game.internal:25565");
        assert_eq!(config.motd, "Hello there");
        assert_eq!(config.max_players, 250);
        assert!(!config.strict_error_handling);
        // Untouched keys keep their defaults
        assert_eq!(config.idle_timeout_secs, 30);
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = ProxyConfig::parse("maxplayers = over nine thousand\n");
        assert_eq!(config.max_players, 100);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "motd = From disk").unwrap();

        let config = ProxyConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.motd, "From disk");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ProxyConfig::load_from_file("/nonexistent/waypoint.conf");
        assert!(matches!(result, Err(WaypointError::Config(_))));
    }
}
