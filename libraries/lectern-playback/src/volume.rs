//! Volume control with logarithmic scaling
//!
//! Volume is a level in `[0, 1]` plus an independent mute bit. Changing the
//! level while muted takes effect but stays silent until unmuted.
//! Output gain maps the level onto -60 dB..0 dB.

/// Volume controller with logarithmic scaling
///
/// Spotify-style: 0.0 = silence, 0.01 ≈ -59.4 dB, 1.0 = 0 dB (unity gain)
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f32,

    /// Mute state (preserves volume level)
    muted: bool,

    /// Cached linear gain multiplier
    linear_gain: f32,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial volume, clamped to 0.0-1.0 (non-finite becomes 1.0)
    pub fn new(level: f32) -> Self {
        let level = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            1.0
        };

        Self {
            level,
            muted: false,
            linear_gain: Self::calculate_linear_gain(level),
        }
    }

    /// Set volume level, clamped to 0.0-1.0
    ///
    /// Does not touch the mute state. Returns `false` (and changes nothing)
    /// for non-finite input.
    pub fn set_level(&mut self, level: f32) -> bool {
        if !level.is_finite() {
            return false;
        }

        self.level = level.clamp(0.0, 1.0);
        self.linear_gain = Self::calculate_linear_gain(self.level);
        true
    }

    /// Get current volume level (0.0-1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Set mute state explicitly
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get linear gain multiplier for audio output
    ///
    /// Returns 0.0 if muted, otherwise logarithmic gain based on level
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.linear_gain
        }
    }

    /// Convert level to linear gain
    ///
    /// Formula: gain = 10^((level - 1) * 60 / 20)
    /// - 0.0 → silence
    /// - 0.5 → -30 dB → 0.0316 gain
    /// - 0.8 → -12 dB → 0.251 gain
    /// - 1.0 →   0 dB → 1.0 gain (unity)
    fn calculate_linear_gain(level: f32) -> f32 {
        if level == 0.0 {
            return 0.0;
        }

        let db = (level - 1.0) * 60.0;
        10.0_f32.powf(db / 20.0)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::new(0.8);
        assert_eq!(vol.level(), 0.8);
        assert!(!vol.is_muted());
    }

    #[test]
    fn set_volume_level_clamps() {
        let mut vol = Volume::new(0.5);

        vol.set_level(0.75);
        assert_eq!(vol.level(), 0.75);

        vol.set_level(1.5);
        assert_eq!(vol.level(), 1.0);

        vol.set_level(-0.2);
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn non_finite_level_is_ignored() {
        let mut vol = Volume::new(0.4);
        assert!(!vol.set_level(f32::NAN));
        assert_eq!(vol.level(), 0.4);

        assert_eq!(Volume::new(f32::INFINITY).level(), 1.0);
    }

    #[test]
    fn mute_preserves_level() {
        let mut vol = Volume::new(0.8);

        vol.set_muted(true);
        assert!(vol.is_muted());
        assert_eq!(vol.level(), 0.8);

        vol.set_muted(false);
        assert!(!vol.is_muted());
        assert_eq!(vol.level(), 0.8);
    }

    #[test]
    fn level_change_while_muted_stays_muted() {
        let mut vol = Volume::new(0.5);
        vol.set_muted(true);
        vol.set_level(0.8);

        assert!(vol.is_muted());
        assert_eq!(vol.gain(), 0.0);

        vol.set_muted(false);
        assert_eq!(vol.level(), 0.8);
        assert!(vol.gain() > 0.0);
    }

    #[test]
    fn toggle_mute() {
        let mut vol = Volume::new(0.8);

        vol.toggle_mute();
        assert!(vol.is_muted());

        vol.toggle_mute();
        assert!(!vol.is_muted());
    }

    #[test]
    fn gain_calculation() {
        assert_eq!(Volume::new(0.0).gain(), 0.0);
        assert!((Volume::new(1.0).gain() - 1.0).abs() < 0.001);
        assert!((Volume::new(0.5).gain() - 0.0316).abs() < 0.001);
        assert!((Volume::new(0.8).gain() - 0.251).abs() < 0.01);
    }
}
