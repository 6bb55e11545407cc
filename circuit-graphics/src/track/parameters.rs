use anyhow::{anyhow, bail, Result};
use nalgebra::Vector4;

/// Vertical offsets of each track material. Coplanar surfaces are separated by giving
/// every material its own height, lowest first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerHeights {
    pub sand: f32,
    pub asphalt: f32,
    pub lines: f32,
    /// Height reached by the outer edge of a kerb ramp. The inner edge stays at `asphalt`.
    pub kerb: f32,
}

impl Default for LayerHeights {
    fn default() -> Self {
        Self {
            sand: -0.45,
            asphalt: -0.40,
            lines: -0.38,
            kerb: -0.35,
        }
    }
}

impl LayerHeights {
    fn validate(&self) -> Result<()> {
        let heights = [self.sand, self.asphalt, self.lines, self.kerb];
        if heights.iter().any(|h| !h.is_finite()) {
            bail!("Layer heights must be finite: {:?}", self);
        }
        if !heights.windows(2).all(|pair| pair[0] < pair[1]) {
            bail!(
                "Layer heights must be strictly increasing (sand < asphalt < lines < kerb): {:?}",
                self
            );
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackPalette {
    pub sand: Vector4<f32>,
    pub asphalt: Vector4<f32>,
    pub line: Vector4<f32>,
    pub kerb_red: Vector4<f32>,
    pub kerb_white: Vector4<f32>,
}

impl Default for TrackPalette {
    fn default() -> Self {
        Self {
            sand: Vector4::new(0.76, 0.7, 0.5, 1.0),
            asphalt: Vector4::new(0.2, 0.2, 0.23, 1.0),
            line: Vector4::new(0.9, 0.9, 0.9, 1.0),
            kerb_red: Vector4::new(0.8, 0.1, 0.1, 1.0),
            kerb_white: Vector4::new(0.9, 0.9, 0.9, 1.0),
        }
    }
}

/// Every tunable of the track generator. Built once at startup and validated before any
/// geometry is generated.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackParameters {
    /// Number of centerline samples, which is also the number of ribbon segments.
    pub step_count: usize,
    /// Base ellipse radius along world x.
    pub scale_x: f64,
    /// Base ellipse radius along world z.
    pub scale_z: f64,
    /// Whether the procedural deformations are layered onto the base ellipse.
    pub deform: bool,

    pub track_width: f64,
    pub kerb_width: f64,
    pub shoulder_width: f64,
    pub lane_line_width: f64,
    /// Number of consecutive segments sharing one kerb color.
    pub kerb_band_length: usize,

    pub layers: LayerHeights,
    pub palette: TrackPalette,
}

impl Default for TrackParameters {
    fn default() -> Self {
        Self {
            step_count: 300,
            scale_x: 90.0,
            scale_z: 60.0,
            deform: true,
            track_width: 14.0,
            kerb_width: 2.0,
            shoulder_width: 4.0,
            lane_line_width: 0.4,
            kerb_band_length: 4,
            layers: LayerHeights::default(),
            palette: TrackPalette::default(),
        }
    }
}

impl TrackParameters {
    /// Rejects configurations that can never produce a sensible track. These are startup
    /// errors, never per-frame ones.
    pub fn validate(&self) -> Result<()> {
        if self.step_count == 0 {
            bail!("Track needs at least one centerline sample.");
        }
        if self.kerb_band_length == 0 {
            bail!("Kerb band length must be at least one segment.");
        }

        let scalars = [
            ("scale_x", self.scale_x),
            ("scale_z", self.scale_z),
            ("track_width", self.track_width),
            ("kerb_width", self.kerb_width),
            ("shoulder_width", self.shoulder_width),
            ("lane_line_width", self.lane_line_width),
        ];
        if let Some((name, value)) = scalars.iter().find(|(_, value)| !value.is_finite()) {
            return Err(anyhow!("Track parameter `{}` is not finite: {}", name, value));
        }

        if self.track_width <= 0.0 {
            bail!("Track width must be positive, got {}", self.track_width);
        }
        for (name, value) in &scalars[3..] {
            if *value < 0.0 {
                bail!("Track parameter `{}` must not be negative: {}", name, value);
            }
        }
        if self.lane_line_width > self.track_width / 2.0 {
            bail!(
                "Lane lines ({}) do not fit inside half the track width ({})",
                self.lane_line_width,
                self.track_width / 2.0
            );
        }

        self.layers.validate()
    }

    /// Lateral distance from a track edge to the outer rim of the shoulder.
    pub fn run_off_width(&self) -> f64 {
        self.kerb_width + self.shoulder_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = TrackParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.step_count, 300);
        assert_eq!(params.run_off_width(), 6.0);
    }

    #[test]
    fn non_positive_track_width_is_fatal() {
        for width in [0.0, -3.0] {
            let params = TrackParameters {
                track_width: width,
                ..Default::default()
            };
            let err = params.validate().unwrap_err();
            assert!(err.to_string().contains("Track width"));
        }
    }

    #[test]
    fn rejects_zero_samples_and_zero_band() {
        let params = TrackParameters {
            step_count: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = TrackParameters {
            kerb_band_length: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_and_negative_widths() {
        let params = TrackParameters {
            scale_x: f64::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = TrackParameters {
            kerb_width: -0.1,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = TrackParameters {
            lane_line_width: 8.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn layers_must_be_ordered() {
        let params = TrackParameters {
            layers: LayerHeights {
                lines: -0.40,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
