use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub backends: BackendsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Base URLs of the backend services the gateway composes.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendsConfig {
    pub user_url: String,
    pub event_url: String,
    pub ticket_url: String,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            user_url: "http://localhost:8000".to_string(),
            event_url: "http://localhost:8001".to_string(),
            ticket_url: "http://localhost:8003".to_string(),
        }
    }
}

/// Shared-secret settings for bearer token validation (HS256)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "myjwtsecret".to_string(),
        }
    }
}

/// Side-channel endpoints. A channel with no URL is disabled.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotificationConfig {
    #[serde(default)]
    pub email_trigger_url: Option<String>,
    #[serde(default)]
    pub publish_url: Option<String>,
    #[serde(default = "default_topic")]
    pub topic: String,
}

fn default_topic() -> String {
    "event-updates".to_string()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            email_trigger_url: None,
            publish_url: None,
            topic: default_topic(),
        }
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml` and apply environment overrides.
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config yaml")
    }

    /// Environment variables win over the file for deploy-time settings.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("USER_MGMT_URL") {
            self.backends.user_url = v;
        }
        if let Some(v) = lookup("EVENT_MGMT_URL") {
            self.backends.event_url = v;
        }
        if let Some(v) = lookup("TICKET_URL") {
            self.backends.ticket_url = v;
        }
        if let Some(v) = lookup("JWT_SECRET_KEY") {
            self.auth.jwt_secret = v;
        }
        if let Some(v) = lookup("EMAIL_TRIGGER_URL") {
            self.notifications.email_trigger_url = Some(v);
        }
        if let Some(v) = lookup("PUBLISH_URL") {
            self.notifications.publish_url = Some(v);
        }
        if let Some(port) = lookup("COMPOSITE_SERVICE_PORT").and_then(|p| p.parse().ok()) {
            self.gateway.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const YAML: &str = r#"
log_level: "info"
log_dir: "./logs"
log_file: "gateway.log"
use_json: false
rotation: "daily"
gateway:
  host: "0.0.0.0"
  port: 8002
backends:
  user_url: "http://users:8000"
  event_url: "http://events:8001"
  ticket_url: "http://tickets:8003"
"#;

    #[test]
    fn test_config_deserialize() {
        let config = AppConfig::from_yaml(YAML).unwrap();
        assert_eq!(config.gateway.port, 8002);
        assert_eq!(config.backends.event_url, "http://events:8001");
        // omitted sections fall back to defaults
        assert_eq!(config.auth.jwt_secret, "myjwtsecret");
        assert!(config.notifications.email_trigger_url.is_none());
        assert_eq!(config.notifications.topic, "event-updates");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::from_yaml(YAML).unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            ("TICKET_URL", "http://ticketing.internal"),
            ("JWT_SECRET_KEY", "s3cret"),
            ("PUBLISH_URL", "http://pubsub/publish"),
            ("COMPOSITE_SERVICE_PORT", "9000"),
        ]);
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.backends.ticket_url, "http://ticketing.internal");
        assert_eq!(config.backends.user_url, "http://users:8000");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(
            config.notifications.publish_url.as_deref(),
            Some("http://pubsub/publish")
        );
        assert_eq!(config.gateway.port, 9000);
    }

    #[test]
    fn test_partial_notifications_section_keeps_topic() {
        let yaml = format!("{}notifications:\n  publish_url: \"http://pubsub\"\n", YAML);
        let config = AppConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.notifications.topic, "event-updates");
        assert_eq!(config.notifications.publish_url.as_deref(), Some("http://pubsub"));
        assert_eq!(NotificationConfig::default().topic, "event-updates");
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(AppConfig::from_yaml("gateway: [").is_err());
    }
}
