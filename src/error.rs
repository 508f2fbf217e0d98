//! Error kinds for registry lookups.
//!
//! Two of these are user-visible contract errors (`InputMissing`,
//! `Service`); the rest mark transport or payload problems. Malformed
//! upstream payloads are rejected at the boundary instead of letting
//! missing fields leak into display state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Neither a phone number nor an email was provided; no remote call
    /// is attempted in this state.
    #[error("no phone number or email provided")]
    InputMissing,

    /// The registry service rejected the lookup. Carries the upstream
    /// human-readable message when the service supplied one.
    #[error("registry lookup failed{}", display_reason(.message))]
    Service { message: Option<String> },

    /// Transport-level failure reaching the registry service.
    #[error("registry request failed")]
    Http(#[from] reqwest::Error),

    /// The service answered but the payload did not match the expected
    /// shape.
    #[error("malformed registry response")]
    MalformedResponse(#[from] serde_json::Error),
}

impl RegistryError {
    /// Upstream message for user-facing notifications, when one exists.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            RegistryError::Service { message } => message.as_deref(),
            _ => None,
        }
    }
}

fn display_reason(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}
