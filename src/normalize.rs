//! Normalization of raw registry responses into display records.
//!
//! The free-form flow and the record-scoped flow disagree on two
//! points, and both behaviors are kept as-is rather than unified:
//!
//! - Naming: the free-form response's `found` flag is carried into
//!   `is_excluded` unchanged (a known upstream naming inversion),
//!   while the record-scoped `Is_Excluded__c` genuinely means blocked.
//! - Timestamps: the free-form flow displays the processing time, the
//!   record-scoped flow displays the response's own query date.

use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::channels::ChannelPermission;
use crate::registry::RawRegistryResponse;

/// Regional display format (es-CO style, 24-hour).
const DISPLAY_FORMAT: &[FormatItem<'static>] =
    format_description!("[day]/[month]/[year], [hour]:[minute]:[second]");

/// Timestamp shape the registry service emits when no offset is given.
const WIRE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Normalized result of a free-form registry query, ready for display.
#[derive(Debug, Clone)]
pub struct ContactPermissionResult {
    pub message: String,
    pub query_timestamp_localized: String,
    /// Passes through the raw `found` flag unchanged. Upstream names
    /// this inconsistently with "excluded"; kept per flow.
    pub is_excluded: bool,
    /// One entry per `contactOptions` key, in upstream insertion
    /// order. Always present, possibly empty.
    pub channels: Vec<ChannelPermission>,
}

/// Convert a raw free-form response into the canonical display record.
///
/// `query_timestamp_localized` is the processing-time timestamp, not
/// anything taken from the response; see [`localized_now`].
pub fn normalize(
    raw: &RawRegistryResponse,
    query_timestamp_localized: String,
) -> ContactPermissionResult {
    let channels = match &raw.contact_options {
        Some(options) => options
            .iter()
            .map(|(key, value)| ChannelPermission::new(key, value))
            .collect(),
        None => Vec::new(),
    };

    ContactPermissionResult {
        message: raw.message.clone(),
        query_timestamp_localized,
        is_excluded: raw.found,
        channels,
    }
}

/// Current time at the given fixed offset, in the display format.
pub fn localized_now(offset: UtcOffset) -> String {
    OffsetDateTime::now_utc()
        .to_offset(offset)
        .format(DISPLAY_FORMAT)
        .unwrap_or_default()
}

/// Localize a response timestamp for display.
///
/// Offset-carrying values (RFC 3339) are shifted to the given offset;
/// bare values are taken as already local. Empty input yields the
/// empty string; an unrecognizable value passes through unchanged so
/// the user still sees what the service sent.
pub fn localize_response_timestamp(raw: &str, offset: UtcOffset) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Ok(dt) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return dt
            .to_offset(offset)
            .format(DISPLAY_FORMAT)
            .unwrap_or_else(|_| trimmed.to_string());
    }

    if let Ok(dt) = PrimitiveDateTime::parse(trimmed, WIRE_FORMAT) {
        return dt
            .format(DISPLAY_FORMAT)
            .unwrap_or_else(|_| trimmed.to_string());
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::PermissionStatus;
    use time::macros::offset;

    fn raw_from(json: &str) -> RawRegistryResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_found_with_mixed_channels() {
        let raw = raw_from(
            r#"{"found": true, "message": "Registrado",
                "contactOptions": {"sms": true, "llamada": false}}"#,
        );
        let result = normalize(&raw, "30/08/2026, 12:00:00".to_string());

        assert!(result.is_excluded);
        assert_eq!(result.message, "Registrado");
        assert_eq!(result.channels.len(), 2);
        assert_eq!(result.channels[0].key, "sms");
        assert_eq!(result.channels[0].status, PermissionStatus::Permitido);
        assert_eq!(result.channels[1].key, "llamada");
        assert_eq!(result.channels[1].status, PermissionStatus::Restringido);
    }

    #[test]
    fn test_missing_options_yield_empty_channels() {
        let raw = raw_from(r#"{"found": false}"#);
        let result = normalize(&raw, String::new());

        assert!(!result.is_excluded);
        assert!(result.channels.is_empty());
    }

    #[test]
    fn test_channel_order_follows_response() {
        let raw = raw_from(
            r#"{"found": true,
                "contactOptions": {"correo_electronico": true, "sms": false, "aplicacion": true}}"#,
        );
        let result = normalize(&raw, String::new());
        let keys: Vec<&str> = result.channels.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["correo_electronico", "sms", "aplicacion"]);
    }

    #[test]
    fn test_non_boolean_values_restricted() {
        let raw = raw_from(
            r#"{"found": true,
                "contactOptions": {"sms": "true", "llamada": 1, "aplicacion": null}}"#,
        );
        let result = normalize(&raw, String::new());
        assert!(result.channels.iter().all(|c| !c.allowed));
    }

    #[test]
    fn test_localize_bare_wire_timestamp() {
        let localized = localize_response_timestamp("2024-01-01T10:00:00", offset!(-5));
        assert_eq!(localized, "01/01/2024, 10:00:00");
    }

    #[test]
    fn test_localize_rfc3339_shifts_offset() {
        let localized = localize_response_timestamp("2024-01-01T10:00:00Z", offset!(-5));
        assert_eq!(localized, "01/01/2024, 05:00:00");
    }

    #[test]
    fn test_localize_empty_and_garbage() {
        assert_eq!(localize_response_timestamp("", offset!(-5)), "");
        assert_eq!(localize_response_timestamp("   ", offset!(-5)), "");
        assert_eq!(
            localize_response_timestamp("mañana", offset!(-5)),
            "mañana"
        );
    }

    #[test]
    fn test_localized_now_shape() {
        let now = localized_now(offset!(-5));
        // dd/mm/yyyy, HH:MM:SS
        assert_eq!(now.len(), 20);
        assert_eq!(&now[2..3], "/");
        assert_eq!(&now[10..12], ", ");
    }
}
