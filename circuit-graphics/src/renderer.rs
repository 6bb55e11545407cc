use anyhow::Result;
use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector3};

use crate::{
    gpu::{CommandBuffer, MeshId, RenderDevice},
    mesh::{DrawRange, PackedTrackMesh},
    track::ribbon::{Surface, TrackMesh},
};

#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct SceneConstants {
    pub view_projection: Matrix4<f32>,
}

impl Default for SceneConstants {
    fn default() -> Self {
        Self {
            view_projection: Matrix4::identity(),
        }
    }
}

impl SceneConstants {
    /// Right handed view looking from `eye` at `target` with `y` up.
    pub fn look_at(
        eye: &Point3<f32>,
        target: &Point3<f32>,
        aspect: f32,
        fovy: f32,
        znear: f32,
        zfar: f32,
    ) -> Self {
        let view = Isometry3::look_at_rh(eye, target, &Vector3::y());
        let projection = Perspective3::new(aspect, fovy, znear, zfar);

        Self {
            view_projection: projection.into_inner() * view.to_homogeneous(),
        }
    }
}

/// Draws the track every frame from a mesh uploaded once at construction.
pub struct TrackRenderer<D: RenderDevice> {
    mesh: MeshId,
    draw_ranges: [DrawRange; 4],
    device: D,
}

impl<D: RenderDevice> TrackRenderer<D> {
    pub fn new(device: D, track_mesh: &TrackMesh) -> Result<Self> {
        let packed = PackedTrackMesh::pack(track_mesh);
        let mesh = device.create_mesh(&packed.buffers)?;

        log::info!(
            "Uploaded track mesh: {} segments, {} vertices, {} indices",
            track_mesh.segment_count(),
            packed.buffers.vertex_count(),
            packed.buffers.index_count()
        );

        Ok(Self {
            mesh,
            draw_ranges: packed.draw_ranges,
            device,
        })
    }

    /// Runs one frame. Once begun, the frame is presented even when recording or submission
    /// fails, so the device can begin the next one.
    pub fn render(&mut self, scene_constants: &SceneConstants) -> Result<()> {
        self.device.write_scene_constants(scene_constants)?;

        self.device.frame_begin()?;

        let recorded = self.record_and_submit();
        let presented = self.device.swapchain_present();

        recorded.and(presented)
    }

    fn record_and_submit(&self) -> Result<()> {
        let mut commands = self.device.get_current_command_buffer()?;
        commands.begin()?;
        self.write_render_commands(&mut commands);
        commands.end()?;

        self.device.queue_submit_commands_graphics(commands)
    }

    /// One indexed draw per surface, lowest layer first.
    pub fn write_render_commands(&self, commands: &mut D::CommandBuffer) {
        commands.bind_mesh(self.mesh);

        for range in self.draw_ranges.iter().filter(|r| !r.is_empty()) {
            commands.draw_indexed(range.index_count, 1, range.index_offset, 0, 0);
        }
    }

    pub fn draw_range(&self, surface: Surface) -> DrawRange {
        self.draw_ranges[surface as usize]
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gpu::headless::HeadlessDevice,
        track::{parameters::TrackParameters, ribbon::RibbonMeshBuilder, TrackGeometry},
    };

    fn renderer(params: &TrackParameters) -> TrackRenderer<HeadlessDevice> {
        let geometry = TrackGeometry::generate(params).unwrap();
        let mesh = RibbonMeshBuilder::new(&geometry).build();
        TrackRenderer::new(HeadlessDevice::new(), &mesh).unwrap()
    }

    #[test]
    fn one_draw_per_layer() {
        let params = TrackParameters::default();
        let mut renderer = renderer(&params);
        renderer.render(&SceneConstants::default()).unwrap();

        let stats = renderer.device().stats();
        assert_eq!(stats.frames_presented, 1);
        assert_eq!(stats.last_frame_draw_calls, 4);
        assert_eq!(stats.last_frame_indices, 300 * 7 * 6);
    }

    #[test]
    fn geometry_is_uploaded_once() {
        let mut renderer = renderer(&TrackParameters::default());
        for _ in 0..5 {
            renderer.render(&SceneConstants::default()).unwrap();
        }

        let stats = renderer.device().stats();
        assert_eq!(stats.meshes_created, 1);
        assert_eq!(stats.frames_presented, 5);
        assert_eq!(stats.draw_calls, 20);
    }

    #[test]
    fn collapsed_track_draws_asphalt_only() {
        let params = TrackParameters {
            step_count: 1,
            ..Default::default()
        };
        let mut renderer = renderer(&params);
        renderer.render(&SceneConstants::default()).unwrap();

        assert_eq!(renderer.device().stats().last_frame_draw_calls, 1);
        assert!(renderer.draw_range(Surface::Kerb).is_empty());
        assert_eq!(renderer.draw_range(Surface::Asphalt).index_count, 6);
    }

    #[test]
    fn uploaded_mesh_holds_every_quad() {
        let params = TrackParameters {
            step_count: 10,
            ..Default::default()
        };
        let renderer = renderer(&params);

        let (vertex_count, index_count) = renderer
            .device()
            .with_mesh(renderer.mesh(), |buffers| {
                (buffers.vertex_count(), buffers.index_count())
            })
            .unwrap();
        assert_eq!(vertex_count, 10 * 7 * 4);
        assert_eq!(index_count, 10 * 7 * 6);
        assert_eq!(renderer.draw_range(Surface::Kerb).indices().end, index_count);
    }

    #[test]
    fn failed_frame_is_still_presented() {
        let mut renderer = renderer(&TrackParameters::default());
        let uploaded = renderer.mesh();

        renderer.mesh = MeshId(uploaded.0 + 1);
        assert!(renderer.render(&SceneConstants::default()).is_err());
        assert_eq!(renderer.device().stats().frames_presented, 1);
        assert_eq!(renderer.device().stats().draw_calls, 0);

        renderer.mesh = uploaded;
        renderer.render(&SceneConstants::default()).unwrap();
        let stats = renderer.device().stats();
        assert_eq!(stats.frames_presented, 2);
        assert_eq!(stats.last_frame_draw_calls, 4);
    }

    #[test]
    fn scene_constants_reach_the_device() {
        let mut renderer = renderer(&TrackParameters::default());
        let constants = SceneConstants::look_at(
            &Point3::new(0.0, 3.5, 11.0),
            &Point3::new(0.0, 1.0, 0.0),
            1024.0 / 768.0,
            std::f32::consts::FRAC_PI_3,
            0.1,
            400.0,
        );
        renderer.render(&constants).unwrap();

        assert_eq!(renderer.device().scene_constants(), constants);
    }

    #[test]
    fn look_at_puts_target_in_front() {
        let constants = SceneConstants::look_at(
            &Point3::new(0.0, 0.0, 10.0),
            &Point3::origin(),
            1.0,
            std::f32::consts::FRAC_PI_2,
            0.1,
            100.0,
        );
        let clip = constants.view_projection * nalgebra::Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.xyz() / clip.w;

        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }
}
