use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub http: HttpConfig,
    pub lists: ListConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Base URL every entity path is joined onto
    pub base_url: String,
    /// `None` leaves the transport default in place
    pub timeout_secs: Option<u64>,
    pub log_requests: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Page size for option lists (pickers) and the dashboard summary
    pub page_size: u32,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let environment = match var("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(var)
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        // HTTP overrides
        if let Some(v) = var("CASEBOARD_API_URL") {
            self.http.base_url = v;
        }
        if let Some(v) = var("CASEBOARD_HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = match v.trim() {
                "" | "0" | "none" => None,
                secs => secs.parse().ok().or(self.http.timeout_secs),
            };
        }
        if let Some(v) = var("CASEBOARD_LOG_REQUESTS") {
            self.http.log_requests = v.parse().unwrap_or(self.http.log_requests);
        }

        // List overrides
        if let Some(v) = var("CASEBOARD_LIST_PAGE_SIZE") {
            self.lists.page_size = v
                .parse()
                .ok()
                .filter(|size| *size >= 1)
                .unwrap_or(self.lists.page_size);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            http: HttpConfig {
                base_url: "http://localhost:4000/api".to_string(),
                timeout_secs: None,
                log_requests: true,
            },
            lists: ListConfig { page_size: 1000 },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            http: HttpConfig {
                base_url: "http://localhost:4000/api".to_string(),
                timeout_secs: Some(30),
                log_requests: true,
            },
            lists: ListConfig { page_size: 1000 },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            http: HttpConfig {
                base_url: "http://localhost:4000/api".to_string(),
                timeout_secs: Some(30),
                log_requests: false,
            },
            lists: ListConfig { page_size: 1000 },
        }
    }

    /// Development defaults pointed at `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::development();
        config.http.base_url = base_url.into();
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

// Global config for shells that want one; components take an explicit AppConfig
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.http.base_url, "http://localhost:4000/api");
        assert_eq!(config.http.timeout(), None);
        assert_eq!(config.lists.page_size, 1000);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::from_lookup(lookup(&[("APP_ENV", "prod")]));
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.http.timeout(), Some(Duration::from_secs(30)));
        assert!(!config.http.log_requests);
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "staging"),
            ("CASEBOARD_API_URL", "https://cases.example.org/api"),
            ("CASEBOARD_HTTP_TIMEOUT_SECS", "none"),
            ("CASEBOARD_LIST_PAGE_SIZE", "0"),
            ("CASEBOARD_LOG_REQUESTS", "false"),
        ]));
        assert_eq!(config.http.base_url, "https://cases.example.org/api");
        assert_eq!(config.http.timeout(), None);
        // Zero is not a usable page size
        assert_eq!(config.lists.page_size, 1000);
        assert!(!config.http.log_requests);
    }
}
