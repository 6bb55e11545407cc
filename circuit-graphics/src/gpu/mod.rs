/*! Contract between the renderer and a graphics backend.
 *
 * The renderer only ever talks to a `RenderDevice`: geometry is uploaded once through
 * `create_mesh`, afterwards every frame is recorded into a `CommandBuffer` that references
 * the uploaded mesh by id.
 */

use anyhow::Result;

use crate::{mesh::MeshBuffers, renderer::SceneConstants};

pub mod headless;

/// Number of frames that may be in flight at once.
pub const MAX_FRAMES: usize = 2;

/// Handle to a mesh that lives on the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) u32);

pub trait CommandBuffer {
    fn begin(&mut self) -> Result<()>;

    fn bind_mesh(&mut self, mesh: MeshId);

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    );

    fn end(&mut self) -> Result<()>;
}

pub trait RenderDevice {
    type CommandBuffer: CommandBuffer;

    /// Uploads vertex and index data. Meant to be called during setup, not per frame.
    fn create_mesh(&self, buffers: &MeshBuffers) -> Result<MeshId>;

    fn write_scene_constants(&self, constants: &SceneConstants) -> Result<()>;

    fn frame_begin(&mut self) -> Result<()>;

    /// Index of the frame in flight, in `0..MAX_FRAMES`.
    fn current_frame(&self) -> u64;

    fn get_current_command_buffer(&self) -> Result<Self::CommandBuffer>;

    fn queue_submit_commands_graphics(&self, commands: Self::CommandBuffer) -> Result<()>;

    fn swapchain_present(&self) -> Result<()>;
}
