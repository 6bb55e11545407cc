/*!
 * Procedural race track: centerline sampling, edge offsetting and the layered ribbon mesh
 * laid over them.
 */

use anyhow::{Context, Result};

pub mod centerline;
pub mod edges;
pub mod parameters;
pub mod ribbon;

use centerline::Centerline;
use edges::EdgePair;
use parameters::TrackParameters;

/// Planar track layout, generated once at startup and read-only afterwards.
#[derive(Clone, Debug)]
pub struct TrackGeometry {
    parameters: TrackParameters,
    centerline: Centerline,
    edges: EdgePair,
}

impl TrackGeometry {
    pub fn generate(parameters: &TrackParameters) -> Result<Self> {
        parameters
            .validate()
            .context("Invalid track parameters")?;

        let centerline = if parameters.deform {
            Centerline::generate(
                parameters.step_count,
                parameters.scale_x,
                parameters.scale_z,
            )
        } else {
            Centerline::ellipse(
                parameters.step_count,
                parameters.scale_x,
                parameters.scale_z,
            )
        };

        Ok(Self::with_edges(parameters.clone(), centerline))
    }

    /// Builds the edges for an already sampled centerline. `step_count`, `scale_*` and
    /// `deform` are ignored, everything else is validated and kept for mesh building.
    pub fn from_centerline(parameters: TrackParameters, centerline: Centerline) -> Result<Self> {
        parameters
            .validate()
            .context("Invalid track parameters")?;

        Ok(Self::with_edges(parameters, centerline))
    }

    fn with_edges(parameters: TrackParameters, centerline: Centerline) -> Self {
        let edges = EdgePair::build(&centerline, parameters.track_width);

        log::info!(
            "Generated track with {} samples, width {}",
            centerline.len(),
            parameters.track_width
        );

        Self {
            parameters,
            centerline,
            edges,
        }
    }

    pub fn parameters(&self) -> &TrackParameters {
        &self.parameters
    }

    pub fn centerline(&self) -> &Centerline {
        &self.centerline
    }

    pub fn edges(&self) -> &EdgePair {
        &self.edges
    }

    pub fn segment_count(&self) -> usize {
        self.edges.len()
    }
}
