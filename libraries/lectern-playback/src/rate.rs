//! Playback speed
//!
//! Only a fixed set of speeds is recognized. Anything else is rejected at the
//! conversion boundary and ignored by the transport.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A speed outside the recognized set
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Unsupported playback rate: {0}")]
pub struct UnsupportedRate(pub f64);

/// Recognized playback speeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub enum PlaybackRate {
    /// 0.5x
    Half,
    /// 0.75x
    ThreeQuarters,
    /// 1x
    #[default]
    Normal,
    /// 1.25x
    OneAndQuarter,
    /// 1.5x
    OneAndHalf,
    /// 1.75x
    OneAndThreeQuarters,
    /// 2x
    Double,
}

impl PlaybackRate {
    /// Every recognized rate, slowest first
    pub const ALL: [PlaybackRate; 7] = [
        PlaybackRate::Half,
        PlaybackRate::ThreeQuarters,
        PlaybackRate::Normal,
        PlaybackRate::OneAndQuarter,
        PlaybackRate::OneAndHalf,
        PlaybackRate::OneAndThreeQuarters,
        PlaybackRate::Double,
    ];

    /// Speed multiplier
    pub fn value(self) -> f64 {
        match self {
            Self::Half => 0.5,
            Self::ThreeQuarters => 0.75,
            Self::Normal => 1.0,
            Self::OneAndQuarter => 1.25,
            Self::OneAndHalf => 1.5,
            Self::OneAndThreeQuarters => 1.75,
            Self::Double => 2.0,
        }
    }

    /// Look up a recognized rate by multiplier
    pub fn from_value(value: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rate| (rate.value() - value).abs() < 1e-9)
    }

    /// Next faster rate, wrapping from the fastest to the slowest
    #[must_use]
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|&r| r == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl From<PlaybackRate> for f64 {
    fn from(rate: PlaybackRate) -> Self {
        rate.value()
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = UnsupportedRate;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or(UnsupportedRate(value))
    }
}

impl std::fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x", self.value())
    }
}
