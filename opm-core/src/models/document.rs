//! Credential document types.
//!
//! The active credential file and every stored preset share one shape: a JSON
//! object whose top-level keys are service names (`"openai"`, `"google"`,
//! `"anthropic"`, ...) and whose values are provider-specific token records.
//! The values are kept opaque here; providers that understand a given service
//! decode it themselves.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// Auth Document
// ============================================================================

/// A whole credential document, keyed by service name.
///
/// Backed by a `BTreeMap` so service iteration is always name-ordered and
/// equality is structural. Deserializing anything other than a JSON object
/// (array, scalar, string) fails, which is how corrupt payloads are rejected
/// before they can be stored or switched to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthDocument {
    services: BTreeMap<String, Value>,
}

impl AuthDocument {
    /// Creates an empty document (the state of a missing active file).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a document from raw JSON text.
    ///
    /// # Errors
    /// Returns the underlying parse error if the text is not valid JSON or
    /// not a JSON object.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Returns the service names present, in name order.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Returns the token record stored under `service`, if any.
    pub fn get(&self, service: &str) -> Option<&Value> {
        self.services.get(service)
    }

    /// Returns true if `service` is present.
    pub fn contains(&self, service: &str) -> bool {
        self.services.contains_key(service)
    }

    /// Inserts or replaces the record for `service`.
    pub fn insert(&mut self, service: impl Into<String>, record: Value) {
        self.services.insert(service.into(), record);
    }

    /// Returns true if the document holds no services.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Number of services in the document.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Computes the service-level diff from `self` (the current state) to
    /// `target` (the state after a switch).
    ///
    /// A service is `modified` if present on both sides with structurally
    /// different sub-documents. All four lists come out sorted by name.
    pub fn diff(&self, target: &AuthDocument) -> ServiceDiff {
        let mut diff = ServiceDiff::default();

        for (service, record) in &target.services {
            match self.services.get(service) {
                None => diff.added.push(service.clone()),
                Some(current) if current != record => diff.modified.push(service.clone()),
                Some(_) => diff.unchanged.push(service.clone()),
            }
        }
        for service in self.services.keys() {
            if !target.services.contains_key(service) {
                diff.removed.push(service.clone());
            }
        }

        // BTreeMap iteration already yields name order for added/modified/
        // unchanged; removed is collected from a second ordered pass.
        diff
    }
}

// ============================================================================
// Service Diff
// ============================================================================

/// Service-level difference between two credential documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDiff {
    /// Services present in the target but not the current document.
    pub added: Vec<String>,
    /// Services present in the current document but not the target.
    pub removed: Vec<String>,
    /// Services present on both sides with differing records.
    pub modified: Vec<String>,
    /// Services present on both sides with identical records.
    pub unchanged: Vec<String>,
}

impl ServiceDiff {
    /// Returns true if the switch would change nothing.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Total number of services that would change.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
