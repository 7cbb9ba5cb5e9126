//! Inbound skill request envelope

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Interface key a device advertises when it has a screen
pub const DISPLAY_INTERFACE: &str = "Display";

/// Skill request as posted by the voice platform
#[derive(Debug, Clone, Deserialize)]
pub struct SkillRequest {
    /// Envelope version, "1.0" in practice
    #[serde(default)]
    pub version: String,
    /// Session metadata (absent for some out-of-session events)
    #[serde(default)]
    pub session: Option<Session>,
    /// Device and application context
    #[serde(default)]
    pub context: Option<Context>,
    /// The request payload itself
    pub request: RequestBody,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub application: Option<Application>,
    #[serde(default)]
    pub attributes: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Context {
    #[serde(rename = "System", default)]
    pub system: Option<SystemContext>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemContext {
    #[serde(default)]
    pub application: Option<Application>,
    #[serde(default)]
    pub device: Option<Device>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default)]
    pub device_id: Option<String>,
    /// Interface name to interface-specific settings
    #[serde(default)]
    pub supported_interfaces: HashMap<String, Value>,
}

/// Fields shared by every request type, plus the optional type-specific ones
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(default)]
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub locale: Option<String>,
    /// Present on `IntentRequest`
    #[serde(default)]
    pub intent: Option<Intent>,
    /// Present on `SessionEndedRequest`
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: Option<HashMap<String, Value>>,
}

/// Request kinds the router distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Launch,
    Intent,
    SessionEnded,
    /// Anything else, e.g. `Display.ElementSelected`
    Other,
}

impl SkillRequest {
    pub fn kind(&self) -> RequestKind {
        match self.request.request_type.as_str() {
            "LaunchRequest" => RequestKind::Launch,
            "IntentRequest" => RequestKind::Intent,
            "SessionEndedRequest" => RequestKind::SessionEnded,
            _ => RequestKind::Other,
        }
    }

    /// Intent name, only for intent requests
    pub fn intent_name(&self) -> Option<&str> {
        match self.kind() {
            RequestKind::Intent => self.request.intent.as_ref().map(|i| i.name.as_str()),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.request.timestamp
    }

    /// Whether the invoking device advertises the given interface.
    pub fn is_interface_supported(&self, interface: &str) -> bool {
        self.context
            .as_ref()
            .and_then(|c| c.system.as_ref())
            .and_then(|s| s.device.as_ref())
            .is_some_and(|d| d.supported_interfaces.contains_key(interface))
    }

    pub fn supports_display(&self) -> bool {
        self.is_interface_supported(DISPLAY_INTERFACE)
    }
}
