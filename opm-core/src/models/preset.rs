//! Preset metadata types.
//!
//! A preset is a named snapshot of the credential file. The payload itself
//! lives in its own file under the presets directory; the metadata below is
//! tracked in the config document and joined back in when listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Preset Metadata
// ============================================================================

/// Metadata recorded for a stored preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetMeta {
    /// Free-form description given at save time.
    #[serde(default)]
    pub description: String,
    /// Service names present in the payload when it was saved.
    #[serde(default)]
    pub services: Vec<String>,
    /// Services the user cares about for quota display.
    #[serde(default = "PresetMeta::default_watched_services")]
    pub watched_services: Vec<String>,
    /// When the preset was first saved (or last overwritten).
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the preset was last switched to.
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
}

impl PresetMeta {
    fn default_watched_services() -> Vec<String> {
        vec!["openai".to_string()]
    }

    /// Creates metadata stamped `now` for a freshly saved preset.
    pub fn stamped(
        now: DateTime<Utc>,
        description: impl Into<String>,
        services: Vec<String>,
        watched_services: Option<Vec<String>>,
    ) -> Self {
        Self {
            description: description.into(),
            services,
            watched_services: watched_services
                .unwrap_or_else(Self::default_watched_services),
            created_at: Some(now),
            last_used: Some(now),
        }
    }
}

impl Default for PresetMeta {
    fn default() -> Self {
        Self {
            description: String::new(),
            services: Vec::new(),
            watched_services: Self::default_watched_services(),
            created_at: None,
            last_used: None,
        }
    }
}

// ============================================================================
// Preset
// ============================================================================

/// A preset as reported by the store's listing: name, metadata, and whether
/// it is the last-selected one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Unique, filesystem-safe name.
    pub name: String,
    /// Metadata joined from the config document.
    #[serde(flatten)]
    pub meta: PresetMeta,
    /// True if this preset is the config's last-selected one.
    #[serde(default)]
    pub is_current: bool,
}

impl Preset {
    /// Creates a listing entry.
    pub fn new(name: impl Into<String>, meta: PresetMeta, is_current: bool) -> Self {
        Self {
            name: name.into(),
            meta,
            is_current,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_watches_openai() {
        let meta = PresetMeta::default();
        assert_eq!(meta.watched_services, vec!["openai"]);
        assert!(meta.created_at.is_none());
    }

    #[test]
    fn test_stamped_sets_both_timestamps() {
        let now = Utc::now();
        let meta = PresetMeta::stamped(now, "work account", vec!["openai".into()], None);
        assert_eq!(meta.created_at, Some(now));
        assert_eq!(meta.last_used, Some(now));
        assert_eq!(meta.description, "work account");
    }

    #[test]
    fn test_explicit_watched_services_kept() {
        let meta = PresetMeta::stamped(
            Utc::now(),
            "",
            vec!["openai".into(), "google".into()],
            Some(vec!["google".into()]),
        );
        assert_eq!(meta.watched_services, vec!["google"]);
    }

    #[test]
    fn test_meta_deserializes_from_minimal_json() {
        let meta: PresetMeta = serde_json::from_str("{}").unwrap();
        assert_eq!(meta.watched_services, vec!["openai"]);
        assert!(meta.services.is_empty());
        assert!(meta.description.is_empty());
    }
}
