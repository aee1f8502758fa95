use std::time::Duration;

use innohub_client::config::parse_or;
use innohub_client::ConfigError;
use innohub_core::types::UserId;

/// Watcher settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// User whose notifications are followed.
    pub user_id: UserId,
    /// Seconds between background refreshes (default: `60`).
    pub refresh_interval_secs: u64,
    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,
}

impl WatchConfig {
    /// | Env Var                         | Default  |
    /// |---------------------------------|----------|
    /// | `INNOHUB_USER_ID`               | required |
    /// | `INNOHUB_REFRESH_INTERVAL_SECS` | `60`     |
    /// | `LOG_FORMAT`                    | `text`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let user_id = lookup("INNOHUB_USER_ID")
            .filter(|s| !s.trim().is_empty())
            .map(UserId::new)
            .ok_or(ConfigError::Missing("INNOHUB_USER_ID"))?;

        let refresh_interval_secs = parse_or(&lookup, "INNOHUB_REFRESH_INTERVAL_SECS", 60)?;
        if refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "INNOHUB_REFRESH_INTERVAL_SECS",
                value: "0".into(),
            });
        }

        let json_logs = lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        Ok(Self {
            user_id,
            refresh_interval_secs,
            json_logs,
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn requires_user_id() {
        assert_matches!(
            WatchConfig::from_lookup(|_: &str| None),
            Err(ConfigError::Missing("INNOHUB_USER_ID"))
        );
    }

    #[test]
    fn applies_defaults() {
        let config = WatchConfig::from_lookup(|var: &str| {
            (var == "INNOHUB_USER_ID").then(|| "user-42".to_string())
        })
        .unwrap();
        assert_eq!(config.user_id.as_str(), "user-42");
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert!(!config.json_logs);
    }

    #[test]
    fn rejects_zero_interval() {
        let err = WatchConfig::from_lookup(|var: &str| match var {
            "INNOHUB_USER_ID" => Some("u".into()),
            "INNOHUB_REFRESH_INTERVAL_SECS" => Some("0".into()),
            _ => None,
        })
        .unwrap_err();
        assert_matches!(
            err,
            ConfigError::Invalid {
                var: "INNOHUB_REFRESH_INTERVAL_SECS",
                ..
            }
        );
    }

    #[test]
    fn json_log_format_is_case_insensitive() {
        let config = WatchConfig::from_lookup(|var: &str| match var {
            "INNOHUB_USER_ID" => Some("u".into()),
            "LOG_FORMAT" => Some("JSON".into()),
            _ => None,
        })
        .unwrap();
        assert!(config.json_logs);
    }
}
