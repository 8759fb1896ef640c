//! Preference record and partial-update types.
//!
//! DESIGN
//! ======
//! One record is authoritative per logical identity (username or device id).
//! The wire stores the record as a flat JSON object; [`PreferencePatch`] is
//! both the partial-update type and the tolerant wire decoding of a stored
//! record, so a missing or sparse remote object degrades to defaults instead
//! of failing the read.

#[cfg(test)]
#[path = "record_test.rs"]
mod record_test;

use serde::{Deserialize, Serialize};

use crate::state::themes::DEFAULT_THEME_ID;

/// How list screens lay out inventory rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewLayout {
    #[default]
    Grid,
    List,
    Compact,
}

/// The full preference set for one identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceRecord {
    pub theme: String,
    pub language: String,
    pub items_per_page: u32,
    pub default_view: ViewLayout,
    pub notifications_enabled: bool,
    pub auto_backup: bool,
    /// Epoch milliseconds of the last write; `0` means never written.
    pub updated_at: u64,
    pub last_active: u64,
}

impl Default for PreferenceRecord {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME_ID.to_owned(),
            language: "en".to_owned(),
            items_per_page: 25,
            default_view: ViewLayout::Grid,
            notifications_enabled: true,
            auto_backup: false,
            updated_at: 0,
            last_active: 0,
        }
    }
}

impl PreferenceRecord {
    /// Merge `patch` into this record. Fields the patch does not mention are
    /// left untouched; a patch never clears sibling fields.
    pub fn apply(&mut self, patch: &PreferencePatch) {
        if let Some(theme) = &patch.theme {
            self.theme = theme.clone();
        }
        if let Some(language) = &patch.language {
            self.language = language.clone();
        }
        if let Some(items_per_page) = patch.items_per_page {
            self.items_per_page = items_per_page;
        }
        if let Some(default_view) = patch.default_view {
            self.default_view = default_view;
        }
        if let Some(notifications_enabled) = patch.notifications_enabled {
            self.notifications_enabled = notifications_enabled;
        }
        if let Some(auto_backup) = patch.auto_backup {
            self.auto_backup = auto_backup;
        }
        if let Some(updated_at) = patch.updated_at {
            self.updated_at = updated_at;
        }
        if let Some(last_active) = patch.last_active {
            self.last_active = last_active;
        }
    }
}

/// Sparse update: only set fields are written through.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_view: Option<ViewLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_backup: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<u64>,
}

impl PreferencePatch {
    /// Patch setting only the theme, the single most common update.
    pub fn theme(id: impl Into<String>) -> Self {
        Self {
            theme: Some(id.into()),
            ..Self::default()
        }
    }

    /// True when no field is set. An empty stored object on the wire means
    /// "no record exists for this identity".
    pub fn is_empty(&self) -> bool {
        self.theme.is_none()
            && self.language.is_none()
            && self.items_per_page.is_none()
            && self.default_view.is_none()
            && self.notifications_enabled.is_none()
            && self.auto_backup.is_none()
            && self.updated_at.is_none()
            && self.last_active.is_none()
    }

    /// Materialize a full record: defaults overlaid with this patch.
    pub fn into_record(self) -> PreferenceRecord {
        let mut record = PreferenceRecord::default();
        record.apply(&self);
        record
    }
}
