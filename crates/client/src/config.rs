use std::fmt;

use crate::error::ConfigError;

/// Callable-function client configuration loaded from environment variables.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the functions deployment, e.g.
    /// `https://us-central1-innohub.cloudfunctions.net`.
    pub functions_url: String,
    /// Name of the notifications callable (default: `manageNotifications`).
    pub notifications_function: String,
    /// ID token of the signed-in user, sent as a bearer token when set.
    pub id_token: Option<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default               |
    /// |----------------------------------|-----------------------|
    /// | `INNOHUB_FUNCTIONS_URL`          | required              |
    /// | `INNOHUB_NOTIFICATIONS_FUNCTION` | `manageNotifications` |
    /// | `INNOHUB_ID_TOKEN`               | unset                 |
    /// | `INNOHUB_REQUEST_TIMEOUT_SECS`   | `30`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let functions_url = lookup("INNOHUB_FUNCTIONS_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("INNOHUB_FUNCTIONS_URL"))?;

        let notifications_function = lookup("INNOHUB_NOTIFICATIONS_FUNCTION")
            .unwrap_or_else(|| "manageNotifications".into());

        let id_token = lookup("INNOHUB_ID_TOKEN").filter(|s| !s.is_empty());

        let request_timeout_secs = parse_or(&lookup, "INNOHUB_REQUEST_TIMEOUT_SECS", 30)?;

        Ok(Self {
            functions_url,
            notifications_function,
            id_token,
            request_timeout_secs,
        })
    }

    /// Full URL of the notifications callable.
    pub fn notifications_endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.functions_url.trim_end_matches('/'),
            self.notifications_function
        )
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("functions_url", &self.functions_url)
            .field("notifications_function", &self.notifications_function)
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Parse an optional numeric variable, falling back to `default` when unset.
pub fn parse_or(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_only_url_is_set() {
        let config =
            ClientConfig::from_lookup(lookup(&[("INNOHUB_FUNCTIONS_URL", "http://fn.local/")]))
                .unwrap();
        assert_eq!(config.notifications_function, "manageNotifications");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.id_token.is_none());
        assert_eq!(
            config.notifications_endpoint(),
            "http://fn.local/manageNotifications"
        );
    }

    #[test]
    fn missing_url_is_an_error() {
        assert_matches!(
            ClientConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("INNOHUB_FUNCTIONS_URL"))
        );
    }

    #[test]
    fn invalid_timeout_is_reported_with_its_value() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("INNOHUB_FUNCTIONS_URL", "http://fn.local"),
            ("INNOHUB_REQUEST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert_matches!(
            err,
            ConfigError::Invalid { var: "INNOHUB_REQUEST_TIMEOUT_SECS", ref value } if value == "soon"
        );
    }

    #[test]
    fn overrides_are_honoured() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("INNOHUB_FUNCTIONS_URL", "http://fn.local"),
            ("INNOHUB_NOTIFICATIONS_FUNCTION", "notificationsV2"),
            ("INNOHUB_ID_TOKEN", "tok"),
            ("INNOHUB_REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.id_token.as_deref(), Some("tok"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(
            config.notifications_endpoint(),
            "http://fn.local/notificationsV2"
        );
    }

    #[test]
    fn debug_output_redacts_id_token() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("INNOHUB_FUNCTIONS_URL", "http://fn.local"),
            ("INNOHUB_ID_TOKEN", "secret-token"),
        ]))
        .unwrap();

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("http://fn.local"));
    }
}
