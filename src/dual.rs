//! Record-scoped dual lookup: phone and email checked independently
//! against the registry, in the context of a host record.
//!
//! Each identifier's lookup is isolated: a phone-lookup failure never
//! prevents the email lookup from running, and vice versa. Failures
//! are downgraded to "not found" display entries rather than surfaced
//! as notifications, so a transient service error and a genuinely
//! absent registration look the same to the user. The distinction is
//! kept internally (and logged to stderr) for observability.
//!
//! Unlike the free-form flow, `Is_Excluded__c` here really means
//! contact is blocked, and the displayed date is the response's own
//! query date. Both flows keep their own conventions.

use time::UtcOffset;

use crate::error::RegistryError;
use crate::normalize::localize_response_timestamp;
use crate::notify::{Notifier, Severity};
use crate::registry::{Registry, RelatedQueryResult};

pub const NOT_FOUND_MESSAGE: &str = "No se encontró el registro";

const TYPE_PHONE: &str = "Móvil";
const TYPE_EMAIL: &str = "Correo";

/// Settled outcome of one record-scoped lookup. Failure and not-found
/// collapse into one display case; the reason survives for logging.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    Found(RelatedQueryResult),
    NotFoundOrFailed { reason: Option<String> },
}

/// Display entry for one identifier. The not-found variant genuinely
/// lacks the per-channel fields rather than defaulting them.
#[derive(Debug, Clone)]
pub enum RecordEntry {
    Found(FoundEntry),
    NotFound(NotFoundEntry),
}

impl RecordEntry {
    pub fn exists(&self) -> bool {
        matches!(self, RecordEntry::Found(_))
    }
}

#[derive(Debug, Clone)]
pub struct FoundEntry {
    pub type_label: &'static str,
    pub value: String,
    pub can_receive_sms: String,
    pub can_receive_calls: String,
    pub applications: String,
    pub creation_date: String,
    pub is_excluded: bool,
}

#[derive(Debug, Clone)]
pub struct NotFoundEntry {
    pub type_label: &'static str,
    pub value: String,
    pub message: &'static str,
}

impl FoundEntry {
    /// Phone entry: all three channel strings keyed off the exclusion
    /// flag.
    fn phone(value: &str, data: &RelatedQueryResult, offset: UtcOffset) -> Self {
        let excluded = data.is_excluded;
        Self {
            type_label: TYPE_PHONE,
            value: value.to_string(),
            can_receive_sms: receive_text(excluded, ""),
            can_receive_calls: receive_text(excluded, " llamadas"),
            applications: receive_text(excluded, ""),
            creation_date: creation_date(data, offset),
            is_excluded: excluded,
        }
    }

    /// Email entry: SMS and calls do not apply; only the applications
    /// channel reflects the exclusion flag.
    fn email(value: &str, data: &RelatedQueryResult, offset: UtcOffset) -> Self {
        let excluded = data.is_excluded;
        Self {
            type_label: TYPE_EMAIL,
            value: value.to_string(),
            can_receive_sms: "N/A".to_string(),
            can_receive_calls: "N/A".to_string(),
            applications: receive_text(excluded, ""),
            creation_date: creation_date(data, offset),
            is_excluded: excluded,
        }
    }
}

fn receive_text(excluded: bool, suffix: &str) -> String {
    if excluded {
        format!("No recibir{}", suffix)
    } else {
        format!("Recibir{}", suffix)
    }
}

fn creation_date(data: &RelatedQueryResult, offset: UtcOffset) -> String {
    match &data.query_date {
        Some(raw) => localize_response_timestamp(raw, offset),
        None => String::new(),
    }
}

/// Settle one lookup, logging the failure reason it swallows.
fn settle(
    label: &str,
    result: Result<RelatedQueryResult, RegistryError>,
) -> LookupOutcome {
    match result {
        Ok(data) => LookupOutcome::Found(data),
        Err(err) => {
            eprintln!("warning: {} lookup failed: {}", label, err);
            LookupOutcome::NotFoundOrFailed {
                reason: Some(err.to_string()),
            }
        }
    }
}

/// Dual-lookup flow state for one host record.
pub struct RecordChecker {
    phone: String,
    email: String,
    object_type: String,
    record_id: String,
    is_loading: bool,
    show_results: bool,
    phone_result: Option<RecordEntry>,
    email_result: Option<RecordEntry>,
    offset: UtcOffset,
}

impl RecordChecker {
    /// `object_type` and `record_id` identify the host record; both
    /// are forwarded to the service unmodified, never interpreted.
    pub fn new(object_type: &str, record_id: &str, offset: UtcOffset) -> Self {
        Self {
            phone: String::new(),
            email: String::new(),
            object_type: object_type.to_string(),
            record_id: record_id.to_string(),
            is_loading: false,
            show_results: false,
            phone_result: None,
            email_result: None,
            offset,
        }
    }

    /// Set the phone input, discarding previously displayed results.
    pub fn set_phone(&mut self, value: &str) {
        self.phone = value.to_string();
        self.clear_results();
    }

    /// Set the email input, discarding previously displayed results.
    pub fn set_email(&mut self, value: &str) {
        self.email = value.to_string();
        self.clear_results();
    }

    fn clear_results(&mut self) {
        self.phone_result = None;
        self.email_result = None;
        self.show_results = false;
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn show_results(&self) -> bool {
        self.show_results
    }

    /// Run up to two lookups sequentially: the phone lookup is fully
    /// awaited before the email lookup begins. Results are surfaced
    /// only after both attempted lookups settle.
    pub async fn run_check<R: Registry, N: Notifier>(
        &mut self,
        registry: &R,
        notifier: &N,
    ) -> Result<(), RegistryError> {
        if self.phone.is_empty() && self.email.is_empty() {
            self.is_loading = true;
            notifier.notify(
                "Error",
                "Ingrese al menos un número telefónico o correo electrónico",
                Severity::Error,
            );
            self.is_loading = false;
            return Err(RegistryError::InputMissing);
        }

        self.is_loading = true;
        self.clear_results();

        if !self.phone.is_empty() {
            let outcome = settle(
                "phone",
                registry
                    .query_phone_related(&self.phone, &self.object_type, &self.record_id)
                    .await,
            );
            self.phone_result = Some(match outcome {
                LookupOutcome::Found(data) => {
                    RecordEntry::Found(FoundEntry::phone(&self.phone, &data, self.offset))
                }
                LookupOutcome::NotFoundOrFailed { .. } => RecordEntry::NotFound(NotFoundEntry {
                    type_label: TYPE_PHONE,
                    value: self.phone.clone(),
                    message: NOT_FOUND_MESSAGE,
                }),
            });
        }

        if !self.email.is_empty() {
            let outcome = settle(
                "email",
                registry
                    .query_email_related(&self.email, &self.object_type, &self.record_id)
                    .await,
            );
            self.email_result = Some(match outcome {
                LookupOutcome::Found(data) => {
                    RecordEntry::Found(FoundEntry::email(&self.email, &data, self.offset))
                }
                LookupOutcome::NotFoundOrFailed { .. } => RecordEntry::NotFound(NotFoundEntry {
                    type_label: TYPE_EMAIL,
                    value: self.email.clone(),
                    message: NOT_FOUND_MESSAGE,
                }),
            });
        }

        self.show_results = true;
        self.is_loading = false;
        Ok(())
    }

    /// Both entries in phone-then-email order, however many exist.
    pub fn table_data(&self) -> Vec<&RecordEntry> {
        self.phone_result
            .iter()
            .chain(self.email_result.iter())
            .collect()
    }

    pub fn results_for_display(&self) -> Vec<&FoundEntry> {
        self.table_data()
            .into_iter()
            .filter_map(|entry| match entry {
                RecordEntry::Found(found) => Some(found),
                RecordEntry::NotFound(_) => None,
            })
            .collect()
    }

    pub fn not_found_results(&self) -> Vec<&NotFoundEntry> {
        self.table_data()
            .into_iter()
            .filter_map(|entry| match entry {
                RecordEntry::NotFound(missing) => Some(missing),
                RecordEntry::Found(_) => None,
            })
            .collect()
    }

    pub fn has_results(&self) -> bool {
        self.show_results && !self.table_data().is_empty()
    }

    pub fn has_found_results(&self) -> bool {
        !self.results_for_display().is_empty()
    }

    pub fn has_not_found_results(&self) -> bool {
        !self.not_found_results().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::registry::{LookupKind, RawRegistryResponse};
    use std::cell::Cell;
    use time::macros::offset;

    struct MockRegistry {
        phone_response: Option<String>,
        email_response: Option<String>,
        phone_calls: Cell<usize>,
        email_calls: Cell<usize>,
    }

    impl MockRegistry {
        fn new(phone_response: Option<&str>, email_response: Option<&str>) -> Self {
            Self {
                phone_response: phone_response.map(str::to_string),
                email_response: email_response.map(str::to_string),
                phone_calls: Cell::new(0),
                email_calls: Cell::new(0),
            }
        }
    }

    impl Registry for MockRegistry {
        async fn query_identifier(
            &self,
            _value: &str,
            _kind: LookupKind,
        ) -> Result<RawRegistryResponse, RegistryError> {
            unimplemented!("not used by the record flow")
        }

        async fn query_phone_related(
            &self,
            _phone: &str,
            _object_type: &str,
            _record_id: &str,
        ) -> Result<RelatedQueryResult, RegistryError> {
            self.phone_calls.set(self.phone_calls.get() + 1);
            match &self.phone_response {
                Some(json) => Ok(serde_json::from_str(json).unwrap()),
                None => Err(RegistryError::Service { message: None }),
            }
        }

        async fn query_email_related(
            &self,
            _email: &str,
            _object_type: &str,
            _record_id: &str,
        ) -> Result<RelatedQueryResult, RegistryError> {
            self.email_calls.set(self.email_calls.get() + 1);
            match &self.email_response {
                Some(json) => Ok(serde_json::from_str(json).unwrap()),
                None => Err(RegistryError::Service { message: None }),
            }
        }
    }

    fn checker() -> RecordChecker {
        RecordChecker::new("Lead", "00Q000000000001", offset!(-5))
    }

    #[tokio::test]
    async fn test_phone_failure_isolated_from_email_success() {
        let registry = MockRegistry::new(
            None,
            Some(r#"{"Is_Excluded__c": false, "Query_Date__c": "2024-01-01T10:00:00"}"#),
        );
        let notifier = RecordingNotifier::new();
        let mut checker = checker();
        checker.set_phone("3001234567");
        checker.set_email("a@b.com");

        checker.run_check(&registry, &notifier).await.unwrap();

        assert!(checker.show_results());
        assert_eq!(registry.phone_calls.get(), 1);
        assert_eq!(registry.email_calls.get(), 1);
        // Failures are display entries, never notifications.
        assert_eq!(notifier.count(), 0);

        let not_found = checker.not_found_results();
        assert_eq!(not_found.len(), 1);
        assert_eq!(not_found[0].type_label, "Móvil");
        assert_eq!(not_found[0].message, NOT_FOUND_MESSAGE);

        let found = checker.results_for_display();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].type_label, "Correo");
        assert_eq!(found[0].applications, "Recibir");
        assert_eq!(found[0].can_receive_sms, "N/A");
        assert_eq!(found[0].can_receive_calls, "N/A");
        assert_eq!(found[0].creation_date, "01/01/2024, 10:00:00");
    }

    #[tokio::test]
    async fn test_excluded_phone_channel_strings() {
        let registry = MockRegistry::new(
            Some(r#"{"Is_Excluded__c": true, "Query_Date__c": "2024-06-15T08:30:00"}"#),
            None,
        );
        let notifier = RecordingNotifier::new();
        let mut checker = checker();
        checker.set_phone("3001234567");

        checker.run_check(&registry, &notifier).await.unwrap();

        let found = checker.results_for_display();
        assert_eq!(found.len(), 1);
        assert!(found[0].is_excluded);
        assert_eq!(found[0].can_receive_sms, "No recibir");
        assert_eq!(found[0].can_receive_calls, "No recibir llamadas");
        assert_eq!(found[0].applications, "No recibir");
        assert_eq!(registry.email_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_included_phone_channel_strings() {
        let registry = MockRegistry::new(Some(r#"{"Is_Excluded__c": false}"#), None);
        let notifier = RecordingNotifier::new();
        let mut checker = checker();
        checker.set_phone("3001234567");

        checker.run_check(&registry, &notifier).await.unwrap();

        let found = checker.results_for_display();
        assert_eq!(found[0].can_receive_sms, "Recibir");
        assert_eq!(found[0].can_receive_calls, "Recibir llamadas");
        assert_eq!(found[0].creation_date, "");
    }

    #[tokio::test]
    async fn test_no_input_errors_without_remote_calls() {
        let registry = MockRegistry::new(None, None);
        let notifier = RecordingNotifier::new();
        let mut checker = checker();

        let err = checker.run_check(&registry, &notifier).await.unwrap_err();

        assert!(matches!(err, RegistryError::InputMissing));
        assert_eq!(registry.phone_calls.get(), 0);
        assert_eq!(registry.email_calls.get(), 0);
        assert_eq!(notifier.count(), 1);
        assert_eq!(notifier.last_severity(), Some(Severity::Error));
        assert!(!checker.show_results());
        assert!(!checker.is_loading());
    }

    #[tokio::test]
    async fn test_both_lookups_fail_still_surfaces_results() {
        let registry = MockRegistry::new(None, None);
        let notifier = RecordingNotifier::new();
        let mut checker = checker();
        checker.set_phone("3001234567");
        checker.set_email("a@b.com");

        checker.run_check(&registry, &notifier).await.unwrap();

        assert!(checker.show_results());
        assert!(checker.has_results());
        assert!(!checker.has_found_results());
        assert!(checker.has_not_found_results());
        assert_eq!(checker.not_found_results().len(), 2);
        assert_eq!(notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_input_change_discards_previous_results() {
        let registry = MockRegistry::new(Some(r#"{"Is_Excluded__c": false}"#), None);
        let notifier = RecordingNotifier::new();
        let mut checker = checker();
        checker.set_phone("3001234567");

        checker.run_check(&registry, &notifier).await.unwrap();
        assert!(checker.has_results());

        checker.set_phone("3017654321");
        assert!(!checker.show_results());
        assert!(checker.table_data().is_empty());
    }

    #[tokio::test]
    async fn test_table_order_is_phone_then_email() {
        let registry = MockRegistry::new(
            Some(r#"{"Is_Excluded__c": false}"#),
            Some(r#"{"Is_Excluded__c": true}"#),
        );
        let notifier = RecordingNotifier::new();
        let mut checker = checker();
        checker.set_phone("3001234567");
        checker.set_email("a@b.com");

        checker.run_check(&registry, &notifier).await.unwrap();

        let labels: Vec<&str> = checker
            .table_data()
            .iter()
            .map(|entry| match entry {
                RecordEntry::Found(f) => f.type_label,
                RecordEntry::NotFound(n) => n.type_label,
            })
            .collect();
        assert_eq!(labels, vec!["Móvil", "Correo"]);
        assert!(checker.table_data().iter().all(|e| e.exists()));
    }
}
