//! Single-identifier exclusion check flow.
//!
//! Holds the free-form query state: one phone number or one email,
//! a loading flag, and the last normalized result. Entering one
//! identifier clears the other, along with any displayed result.
//!
//! Dispatches carry a generation number captured at start; a response
//! is applied only if no newer input or dispatch has bumped the
//! generation since. The loading flag alone is advisory and would let
//! a late response overwrite newer input's cleared state.

use time::UtcOffset;

use crate::error::RegistryError;
use crate::normalize::{localized_now, normalize, ContactPermissionResult};
use crate::notify::{Notifier, Severity};
use crate::registry::{LookupKind, RawRegistryResponse, Registry};

/// Generation captured by a dispatch; required to apply its outcome.
#[derive(Debug, Clone, Copy)]
pub struct DispatchTicket {
    generation: u64,
}

pub struct ExclusionChecker {
    phone: String,
    email: String,
    is_loading: bool,
    generation: u64,
    result: Option<ContactPermissionResult>,
    offset: UtcOffset,
}

impl ExclusionChecker {
    pub fn new(offset: UtcOffset) -> Self {
        Self {
            phone: String::new(),
            email: String::new(),
            is_loading: false,
            generation: 0,
            result: None,
            offset,
        }
    }

    /// Set the phone input. Clears the email input and any displayed
    /// result, and invalidates in-flight dispatches.
    pub fn set_phone(&mut self, value: &str) {
        self.phone = value.to_string();
        self.email.clear();
        self.result = None;
        self.generation += 1;
    }

    /// Set the email input. Clears the phone input and any displayed
    /// result, and invalidates in-flight dispatches.
    pub fn set_email(&mut self, value: &str) {
        self.email = value.to_string();
        self.phone.clear();
        self.result = None;
        self.generation += 1;
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn result(&self) -> Option<&ContactPermissionResult> {
        self.result.as_ref()
    }

    /// The identifier the next check will query. Phone takes
    /// precedence over email when both are present.
    fn lookup_target(&self) -> Option<(String, LookupKind)> {
        if !self.phone.is_empty() {
            Some((self.phone.clone(), LookupKind::Phone))
        } else if !self.email.is_empty() {
            Some((self.email.clone(), LookupKind::Email))
        } else {
            None
        }
    }

    /// Mark a dispatch as started and capture its generation.
    pub fn begin_dispatch(&mut self) -> DispatchTicket {
        self.is_loading = true;
        self.generation += 1;
        DispatchTicket {
            generation: self.generation,
        }
    }

    /// Apply a settled lookup outcome.
    ///
    /// Clears the loading flag on every path. A stale outcome (ticket
    /// generation no longer current) is discarded without touching the
    /// result or notifying. Otherwise exactly one notification is
    /// emitted: info when the identifier was found in the registry,
    /// success when it was not (absence from an exclusion list is good
    /// news), error on failure.
    pub fn apply_outcome<N: Notifier>(
        &mut self,
        ticket: DispatchTicket,
        outcome: Result<RawRegistryResponse, RegistryError>,
        notifier: &N,
    ) -> Result<(), RegistryError> {
        self.is_loading = false;

        if ticket.generation != self.generation {
            return Ok(());
        }

        match outcome {
            Ok(raw) => {
                let found = raw.found;
                self.result = Some(normalize(&raw, localized_now(self.offset)));
                if found {
                    notifier.notify(
                        "Registro Encontrado",
                        "El contacto existe en la base de datos.",
                        Severity::Info,
                    );
                } else {
                    notifier.notify(
                        "No Encontrado",
                        "El contacto no aparece en la lista de excluidos.",
                        Severity::Success,
                    );
                }
                Ok(())
            }
            Err(err) => {
                self.result = None;
                let message = match err.upstream_message() {
                    Some(m) => format!("Error al consultar: {}", m),
                    None => "Error al consultar el registro".to_string(),
                };
                notifier.notify("Error", &message, Severity::Error);
                Err(err)
            }
        }
    }

    /// Run one check end to end: validate input, dispatch the lookup,
    /// apply the outcome.
    pub async fn run_check<R: Registry, N: Notifier>(
        &mut self,
        registry: &R,
        notifier: &N,
    ) -> Result<(), RegistryError> {
        let Some((value, kind)) = self.lookup_target() else {
            self.is_loading = true;
            notifier.notify("Atención", "Ingresa un dato para consultar", Severity::Warning);
            self.is_loading = false;
            return Err(RegistryError::InputMissing);
        };

        let ticket = self.begin_dispatch();
        let outcome = registry.query_identifier(&value, kind).await;
        self.apply_outcome(ticket, outcome, notifier)
    }
}
