use nalgebra::Point3;

use circuit_graphics::renderer::SceneConstants;

use super::pilot::VehiclePose;

/// Follows the car from behind, pulling back and up as the car speeds up.
#[derive(Clone, Copy, Debug)]
pub struct ChaseCamera {
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
    /// Extra rotation around the car, added to its heading.
    pub orbit_angle: f32,
}

impl Default for ChaseCamera {
    fn default() -> Self {
        Self {
            aspect: 1024.0 / 768.0,
            fovy: std::f32::consts::FRAC_PI_3,
            znear: 0.1,
            zfar: 400.0,
            orbit_angle: 0.0,
        }
    }
}

impl ChaseCamera {
    pub fn eye(&self, pose: &VehiclePose, speed: f32) -> Point3<f32> {
        let distance = 11.0 + speed.abs() / 20.0;
        let height = 3.5 + speed.abs() / 30.0;
        let angle = pose.heading + self.orbit_angle;

        Point3::new(
            pose.position.x - angle.cos() * distance,
            height,
            pose.position.z - angle.sin() * distance,
        )
    }

    pub fn scene_constants(&self, pose: &VehiclePose, speed: f32) -> SceneConstants {
        let target = Point3::new(pose.position.x, 1.0, pose.position.z);

        SceneConstants::look_at(
            &self.eye(pose, speed),
            &target,
            self.aspect,
            self.fovy,
            self.znear,
            self.zfar,
        )
    }
}
