use std::time::Duration;

use url::Url;

use crate::error::ClientError;

pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base every API path is appended to, without a trailing slash
    pub api_base: String,
    /// Period of the poll scheduler
    pub poll_interval: Duration,
}

impl ClientConfig {
    pub fn new(api_base: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            api_base: normalize_api_base(&api_base.into())?,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = match lookup("DASHBOARD_API_BASE").filter(|v| !v.trim().is_empty()) {
            Some(base) => base,
            None => {
                let origin = lookup("DASHBOARD_ORIGIN")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
                api_base_from_origin(&origin)
            }
        };

        let poll_ms: u64 = match lookup("DASHBOARD_POLL_INTERVAL_MS") {
            Some(raw) => raw.trim().parse().map_err(|e| {
                ClientError::Config(format!(
                    "Failed to parse env var DASHBOARD_POLL_INTERVAL_MS={raw}: {e}"
                ))
            })?,
            None => DEFAULT_POLL_INTERVAL.as_millis() as u64,
        };
        if poll_ms == 0 {
            return Err(ClientError::Config(
                "DASHBOARD_POLL_INTERVAL_MS must be greater than zero".to_string(),
            ));
        }

        Ok(Self::new(api_base)?.with_poll_interval(Duration::from_millis(poll_ms)))
    }
}

/// The API lives under `/api` on the page's own origin
pub fn api_base_from_origin(origin: &str) -> String {
    format!("{}/api", origin.trim_end_matches('/'))
}

fn normalize_api_base(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed)
        .map_err(|e| ClientError::Config(format!("Invalid API base '{raw}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ClientError::Config(format!(
            "Invalid API base '{raw}': unsupported scheme '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_derive_base_from_origin() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base, "http://127.0.0.1:8000/api");
        assert_eq!(config.poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn test_origin_trailing_slash_is_trimmed() {
        let config =
            ClientConfig::from_lookup(lookup(&[("DASHBOARD_ORIGIN", "https://dash.local/")]))
                .unwrap();
        assert_eq!(config.api_base, "https://dash.local/api");
    }

    #[test]
    fn test_explicit_api_base_wins() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("DASHBOARD_ORIGIN", "https://ignored.local"),
            ("DASHBOARD_API_BASE", "http://10.0.0.5:9000/v1/"),
            ("DASHBOARD_POLL_INTERVAL_MS", "750"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "http://10.0.0.5:9000/v1");
        assert_eq!(config.poll_interval, Duration::from_millis(750));
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        let zero = ClientConfig::from_lookup(lookup(&[("DASHBOARD_POLL_INTERVAL_MS", "0")]));
        assert!(matches!(zero, Err(ClientError::Config(_))));

        let garbage =
            ClientConfig::from_lookup(lookup(&[("DASHBOARD_POLL_INTERVAL_MS", "soon")]));
        assert!(matches!(garbage, Err(ClientError::Config(_))));

        let scheme = ClientConfig::new("ftp://files.local/api");
        assert!(matches!(scheme, Err(ClientError::Config(_))));
    }
}
