//! Registry service abstraction and HTTP client implementation.
//!
//! This module provides:
//! - `Registry` trait for abstracting the remote exclusion-registry service
//! - `HttpRegistry` implementation over its JSON API
//! - Wire types for lookup requests and responses

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RegistryError;

/// Which identifier a free-form lookup is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LookupKind {
    Phone,
    Email,
}

/// A free-form lookup request: exactly one identifier value.
#[derive(Debug, Clone, Serialize)]
pub struct LookupRequest {
    pub value: String,
    pub kind: LookupKind,
}

/// Raw response of a free-form registry query.
///
/// `found` reports presence in the registry. `contact_options` maps raw
/// channel keys to permission values and is not guaranteed to be
/// present; its key order is the upstream insertion order and is
/// preserved as such. `query_date` is the service's own timestamp; the
/// free-form flow displays the processing time instead and leaves this
/// field untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRegistryResponse {
    pub found: bool,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "contactOptions")]
    pub contact_options: Option<Map<String, Value>>,
    #[serde(rename = "queryDate")]
    pub query_date: Option<String>,
}

/// Response of a record-scoped lookup. Field names on the wire are the
/// upstream service's own (`Is_Excluded__c`, `Query_Date__c`); here
/// `is_excluded` really does mean contact is blocked.
#[derive(Debug, Clone, Deserialize)]
pub struct RelatedQueryResult {
    #[serde(rename = "Is_Excluded__c")]
    pub is_excluded: bool,
    #[serde(rename = "Query_Date__c")]
    pub query_date: Option<String>,
}

/// Trait for registry service implementations.
#[allow(async_fn_in_trait)]
pub trait Registry {
    /// Free-form query by a single identifier.
    async fn query_identifier(
        &self,
        value: &str,
        kind: LookupKind,
    ) -> Result<RawRegistryResponse, RegistryError>;

    /// Phone lookup scoped to a host record.
    async fn query_phone_related(
        &self,
        phone: &str,
        object_type: &str,
        record_id: &str,
    ) -> Result<RelatedQueryResult, RegistryError>;

    /// Email lookup scoped to a host record.
    async fn query_email_related(
        &self,
        email: &str,
        object_type: &str,
        record_id: &str,
    ) -> Result<RelatedQueryResult, RegistryError>;
}

/// Registry client over the service's JSON HTTP API.
pub struct HttpRegistry {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct RelatedLookupBody<'a> {
    #[serde(rename = "phoneNumber", skip_serializing_if = "Option::is_none")]
    phone_number: Option<&'a str>,
    #[serde(rename = "email", skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(rename = "relatedObjectType")]
    related_object_type: &'a str,
    #[serde(rename = "relatedObjectId")]
    related_object_id: &'a str,
}

/// Error body the service returns on rejected lookups.
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: Option<String>,
}

impl HttpRegistry {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// POST a JSON body and strictly deserialize the response.
    ///
    /// Non-2xx responses are read for an optional `message` field and
    /// surfaced as `Service` errors; 2xx bodies that fail to parse are
    /// `MalformedResponse`.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, RegistryError>
    where
        B: Serialize,
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ServiceErrorBody>(&text)
                .ok()
                .and_then(|b| b.message);
            return Err(RegistryError::Service { message });
        }

        let text = response.text().await?;
        let parsed = serde_json::from_str(&text)?;
        Ok(parsed)
    }
}

impl Registry for HttpRegistry {
    async fn query_identifier(
        &self,
        value: &str,
        kind: LookupKind,
    ) -> Result<RawRegistryResponse, RegistryError> {
        let request = LookupRequest {
            value: value.to_string(),
            kind,
        };
        self.post_json("/rne/query", &request).await
    }

    async fn query_phone_related(
        &self,
        phone: &str,
        object_type: &str,
        record_id: &str,
    ) -> Result<RelatedQueryResult, RegistryError> {
        let body = RelatedLookupBody {
            phone_number: Some(phone),
            email: None,
            related_object_type: object_type,
            related_object_id: record_id,
        };
        self.post_json("/rne/query/phone", &body).await
    }

    async fn query_email_related(
        &self,
        email: &str,
        object_type: &str,
        record_id: &str,
    ) -> Result<RelatedQueryResult, RegistryError> {
        let body = RelatedLookupBody {
            phone_number: None,
            email: Some(email),
            related_object_type: object_type,
            related_object_id: record_id,
        };
        self.post_json("/rne/query/email", &body).await
    }
}
