use std::time::Duration;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum BridgeError {
    #[error("{0} not configured; cannot build SmartApp URL")]
    ConfigMissing(&'static str),

    #[error("Invalid command: {0}")]
    BadCommand(String),

    #[error("Missing command field")]
    MissingCommand,

    #[error("SmartApp delivery failed: {0}")]
    RemoteDelivery(String),

    #[error("SmartApp call timed out after {0:?}")]
    RemoteTimeout(Duration),

    #[error("Display control failed: {0}")]
    HardwareAction(String),

    #[error("D-Bus error: {0}")]
    DisplayBus(#[from] zbus::Error),

    #[error("another instance is already running")]
    AlreadyRunning,

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

impl BridgeError {
    /// Whether the error came from malformed caller input rather than
    /// from the daemon or its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::BadCommand(_) | Self::MissingCommand)
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(BridgeError::BadCommand("dance".into()).is_client_error());
        assert!(BridgeError::MissingCommand.is_client_error());
        assert!(!BridgeError::ConfigMissing("app_url").is_client_error());
        assert!(!BridgeError::RemoteDelivery("refused".into()).is_client_error());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            BridgeError::ConfigMissing("app_id").to_string(),
            "app_id not configured; cannot build SmartApp URL"
        );
        assert_eq!(
            BridgeError::BadCommand("dance".into()).to_string(),
            "Invalid command: dance"
        );
    }

    #[test]
    fn test_from_conversions() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "app.json");
        assert!(matches!(BridgeError::from(io), BridgeError::IoError(_)));

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(BridgeError::from(json), BridgeError::SerdeJsonError(_)));
    }
}
