//! SmartApp HTTP notifier.

use crate::config::{SharedConfig, SmartAppConfig};
use crate::display::Direction;
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use log::{debug, info};
use serde_json::json;

/// Tells the remote endpoint about a confirmed transition.
///
/// Implementations must be safe to call repeatedly and must not block
/// forever.
#[async_trait]
pub trait RemoteNotifier: Send + Sync {
    async fn notify(&self, direction: Direction) -> Result<()>;
}

/// A fully resolved SmartApp call.
#[derive(Debug, Clone, PartialEq)]
pub struct SmartAppRequest {
    pub url: String,
    pub authorization: String,
    pub body: serde_json::Value,
}

impl SmartAppRequest {
    /// Build `PUT {app_url}{app_id}/do/{direction}` with its bearer token.
    pub fn build(config: &SmartAppConfig, direction: Direction) -> Result<Self> {
        let app_url = required(&config.app_url, "app_url")?;
        let app_id = required(&config.app_id, "app_id")?;
        let token = required(&config.access_token, "access_token")?;

        Ok(Self {
            url: format!("{app_url}{app_id}/do/{direction}"),
            authorization: format!("Bearer {token}"),
            body: json!({ "command": direction.to_string() }),
        })
    }
}

fn required<'a>(value: &'a Option<String>, key: &'static str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(BridgeError::ConfigMissing(key))
}

/// Calls the SmartApp over HTTP using the current shared config.
pub struct SmartAppNotifier {
    config: SharedConfig,
}

impl SmartAppNotifier {
    pub fn new(config: SharedConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RemoteNotifier for SmartAppNotifier {
    async fn notify(&self, direction: Direction) -> Result<()> {
        let config = self.config.snapshot();
        let request = SmartAppRequest::build(&config, direction)?;
        let timeout = config.notify_timeout();

        info!("[SmartApp] Sending {} to {}", direction, request.url);

        // ureq is blocking; keep it off the async workers
        let response = tokio::task::spawn_blocking(move || {
            let agent = ureq::AgentBuilder::new().timeout(timeout).build();
            agent
                .put(&request.url)
                .set("Authorization", &request.authorization)
                .send_json(request.body)
        })
        .await
        .map_err(|e| BridgeError::RemoteDelivery(format!("request task failed: {e}")))?;

        match response {
            Ok(response) => {
                debug!("[SmartApp] {} acknowledged with HTTP {}", direction, response.status());
                Ok(())
            }
            Err(ureq::Error::Status(code, _)) => Err(BridgeError::RemoteDelivery(format!(
                "SmartApp answered HTTP {code}"
            ))),
            Err(e) => Err(BridgeError::RemoteDelivery(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmartAppConfig {
        SmartAppConfig {
            app_url: Some("https://graph.api.smartthings.com/api/smartapps/installations/".into()),
            app_id: Some("1234".into()),
            access_token: Some("token".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_request_for_sleep() {
        let request = SmartAppRequest::build(&config(), Direction::Sleep).unwrap();
        assert_eq!(
            request.url,
            "https://graph.api.smartthings.com/api/smartapps/installations/1234/do/sleep"
        );
        assert_eq!(request.authorization, "Bearer token");
        assert_eq!(request.body, json!({ "command": "sleep" }));
    }

    #[test]
    fn test_request_for_wake() {
        let request = SmartAppRequest::build(&config(), Direction::Wake).unwrap();
        assert!(request.url.ends_with("/1234/do/wake"));
        assert_eq!(request.body["command"], "wake");
    }

    #[test]
    fn test_missing_keys() {
        let mut missing_url = config();
        missing_url.app_url = None;
        assert!(matches!(
            SmartAppRequest::build(&missing_url, Direction::Wake),
            Err(BridgeError::ConfigMissing("app_url"))
        ));

        let mut missing_id = config();
        missing_id.app_id = Some(String::new());
        assert!(matches!(
            SmartAppRequest::build(&missing_id, Direction::Wake),
            Err(BridgeError::ConfigMissing("app_id"))
        ));

        let mut missing_token = config();
        missing_token.access_token = None;
        assert!(matches!(
            SmartAppRequest::build(&missing_token, Direction::Sleep),
            Err(BridgeError::ConfigMissing("access_token"))
        ));
    }

    #[tokio::test]
    async fn test_notify_without_config_skips_io() {
        let notifier = SmartAppNotifier::new(SharedConfig::default());
        let err = notifier.notify(Direction::Wake).await.unwrap_err();
        assert!(matches!(err, BridgeError::ConfigMissing("app_url")));
    }
}
