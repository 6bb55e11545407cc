use nalgebra::Point3;

use circuit_graphics::track::centerline::{Centerline, PlanarPoint};

/// Where the car is this frame. Only used to place the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehiclePose {
    pub position: Point3<f32>,
    /// Angle of the direction of travel in the ground plane, measured from +x towards +z.
    pub heading: f32,
}

/// Drives along the track centerline at a constant speed, wrapping around the lap.
pub struct Autopilot<'a> {
    centerline: &'a Centerline,
    /// Cumulative distance at the start of each centerline segment.
    segment_starts: Vec<f64>,
    lap_length: f64,
    distance: f64,
    speed: f32,
}

impl<'a> Autopilot<'a> {
    pub fn new(centerline: &'a Centerline, speed: f32) -> Self {
        let mut segment_starts = Vec::with_capacity(centerline.len());
        let mut lap_length = 0.0;
        for i in 0..centerline.len() {
            segment_starts.push(lap_length);
            lap_length += (centerline.point(centerline.next_index(i)) - centerline.point(i)).norm();
        }

        Self {
            centerline,
            segment_starts,
            lap_length,
            distance: 0.0,
            speed,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn lap_length(&self) -> f64 {
        self.lap_length
    }

    pub fn advance(&mut self, dt: f32) {
        if self.lap_length == 0.0 {
            return;
        }
        self.distance = (self.distance + (self.speed * dt) as f64).rem_euclid(self.lap_length);
    }

    pub fn pose(&self) -> VehiclePose {
        if self.centerline.is_empty() {
            return VehiclePose {
                position: Point3::origin(),
                heading: 0.0,
            };
        }

        // Last segment starting at or before the current distance.
        let segment = self
            .segment_starts
            .partition_point(|&start| start <= self.distance)
            .saturating_sub(1);
        let start = self.centerline.point(segment);
        let direction = self.centerline.point(self.centerline.next_index(segment)) - start;
        let length = direction.norm();

        let position: PlanarPoint = if length > 0.0 {
            start + direction * ((self.distance - self.segment_starts[segment]) / length)
        } else {
            start
        };

        VehiclePose {
            position: Point3::new(position.x as f32, 0.0, position.y as f32),
            heading: direction.y.atan2(direction.x) as f32,
        }
    }
}
