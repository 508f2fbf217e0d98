//! Contact-channel permission records.
//!
//! The registry reports per-channel contact permissions as a map of
//! raw keys to values. This module owns the closed label table for the
//! known channel keys and the `ChannelPermission` record derived from
//! each map entry. The four display facets of a permission (allowed
//! flag, status text, icon token, style class) are all derived from a
//! single status value so they can never disagree.

use serde_json::Value;

/// Known channel keys and their display labels. The table is closed:
/// unknown keys fall back to the upper-cased raw key.
const CHANNEL_LABELS: &[(&str, &str)] = &[
    ("sms", "Mensajería SMS"),
    ("aplicacion", "Apps (WhatsApp)"),
    ("llamada", "Llamada de Voz"),
    ("correo_electronico", "Correo Electrónico"),
];

/// Display label for a raw channel key, if it is a known channel.
pub fn channel_label(key: &str) -> Option<&'static str> {
    CHANNEL_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
}

/// Permission status of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Permitido,
    Restringido,
}

impl PermissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::Permitido => "PERMITIDO",
            PermissionStatus::Restringido => "RESTRINGIDO",
        }
    }

    pub fn icon_token(&self) -> &'static str {
        match self {
            PermissionStatus::Permitido => "utility:check",
            PermissionStatus::Restringido => "utility:close",
        }
    }

    pub fn style_class(&self) -> &'static str {
        match self {
            PermissionStatus::Permitido => "theme-success",
            PermissionStatus::Restringido => "theme-error",
        }
    }
}

/// One channel's resolved permission, ready for display.
#[derive(Debug, Clone)]
pub struct ChannelPermission {
    pub key: String,
    pub label: String,
    pub allowed: bool,
    pub status: PermissionStatus,
}

impl ChannelPermission {
    /// Build a permission record from a raw `contactOptions` entry.
    ///
    /// Only the JSON boolean `true` grants permission. Anything else
    /// (`false`, `null`, `"true"`, `1`) is restricted: absence of an
    /// explicit permission is never treated as permission.
    pub fn new(key: &str, raw_value: &Value) -> Self {
        let allowed = matches!(raw_value, Value::Bool(true));
        let status = if allowed {
            PermissionStatus::Permitido
        } else {
            PermissionStatus::Restringido
        };
        let label = match channel_label(key) {
            Some(l) => l.to_string(),
            None => key.to_uppercase(),
        };
        Self {
            key: key.to_string(),
            label,
            allowed,
            status,
        }
    }
}
