/*!
 * Per-frame driving of the track view: the autopilot, the chase camera and the frame loop.
 */

use std::time::{Duration, Instant};

use anyhow::Result;

use circuit_graphics::{gpu::RenderDevice, renderer::TrackRenderer};

use self::{camera::ChaseCamera, pilot::Autopilot};

pub mod camera;
pub mod pilot;

/// Runs a fixed number of frames at a fixed simulation step.
pub struct FrameLoop {
    frame_count: u64,
    frame_time: Duration,
    paced: bool,
}

impl FrameLoop {
    pub fn new(frame_count: u64, target_fps: u32) -> Self {
        Self {
            frame_count,
            frame_time: Duration::from_secs_f64(1.0 / target_fps.max(1) as f64),
            paced: true,
        }
    }

    /// Renders as fast as possible, the simulation still steps by the target frame time.
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }

    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    pub fn run<D: RenderDevice>(
        &self,
        renderer: &mut TrackRenderer<D>,
        pilot: &mut Autopilot,
        camera: &ChaseCamera,
    ) -> Result<()> {
        let dt = self.frame_time().as_secs_f32();
        let started = Instant::now();

        for frame in 0..self.frame_count {
            let frame_start = Instant::now();

            pilot.advance(dt);
            let pose = pilot.pose();
            renderer.render(&camera.scene_constants(&pose, pilot.speed()))?;

            log::trace!(
                "Frame {} at ({:.2}, {:.2}) heading {:.3}",
                frame,
                pose.position.x,
                pose.position.z,
                pose.heading
            );

            if self.paced {
                if let Some(remaining) = self.frame_time.checked_sub(frame_start.elapsed()) {
                    std::thread::sleep(remaining);
                }
            }
        }

        log::info!(
            "Rendered {} frames in {:.2?}",
            self.frame_count,
            started.elapsed()
        );

        Ok(())
    }
}
