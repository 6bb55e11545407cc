/*!
 * Run settings: track parameters plus how the frame loop is driven.
 * Track files use a tag based text format, see `parse`.
 */

use anyhow::{bail, Result};

use circuit_graphics::track::parameters::TrackParameters;

pub mod parse;

#[derive(Clone, Debug, PartialEq)]
pub struct TrackSettings {
    pub parameters: TrackParameters,
    /// Number of frames rendered before the loop exits.
    pub frame_count: u64,
    pub target_fps: u32,
    /// Distance covered by the autopilot per second.
    pub pilot_speed: f32,
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            parameters: TrackParameters::default(),
            frame_count: 600,
            target_fps: 60,
            pilot_speed: 40.0,
        }
    }
}

impl TrackSettings {
    pub fn validate(&self) -> Result<()> {
        if self.target_fps == 0 {
            bail!("Target frame rate must be at least 1.");
        }
        if !self.pilot_speed.is_finite() {
            bail!("Pilot speed is not finite: {}", self.pilot_speed);
        }

        self.parameters.validate()
    }
}
