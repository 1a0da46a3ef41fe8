//! Playback preferences that outlive any loaded track

use serde::{Deserialize, Serialize};

/// Persisted volume key (number in `[0, 1]`)
pub const PREF_VOLUME: &str = "volume";

/// Persisted mute key (boolean)
pub const PREF_IS_MUTED: &str = "isMuted";

/// Persisted expanded-player key (boolean)
pub const PREF_IS_EXPANDED: &str = "isExpanded";

/// Volume, mute and player expansion, restored across sessions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Volume level (0.0-1.0)
    pub volume: f32,

    /// Mute state (independent of volume)
    pub is_muted: bool,

    /// Whether the player panel is expanded
    pub is_expanded: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            volume: 1.0,
            is_muted: false,
            is_expanded: false,
        }
    }
}

/// A partial preferences update; `None` fields are left untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    /// New volume level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    /// New mute state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_muted: Option<bool>,
    /// New expansion state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
}

impl PreferencesPatch {
    /// Patch that only sets the volume
    pub fn volume(volume: f32) -> Self {
        Self {
            volume: Some(volume),
            ..Self::default()
        }
    }

    /// Patch that only sets the mute state
    pub fn muted(is_muted: bool) -> Self {
        Self {
            is_muted: Some(is_muted),
            ..Self::default()
        }
    }

    /// Patch that only sets the expanded state
    pub fn expanded(is_expanded: bool) -> Self {
        Self {
            is_expanded: Some(is_expanded),
            ..Self::default()
        }
    }

    /// True when no key is set
    pub fn is_empty(&self) -> bool {
        self.volume.is_none() && self.is_muted.is_none() && self.is_expanded.is_none()
    }
}

impl From<Preferences> for PreferencesPatch {
    fn from(prefs: Preferences) -> Self {
        Self {
            volume: Some(prefs.volume),
            is_muted: Some(prefs.is_muted),
            is_expanded: Some(prefs.is_expanded),
        }
    }
}
