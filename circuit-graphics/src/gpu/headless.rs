/*! Render device without a GPU or window behind it.
 *
 * Keeps uploaded meshes in memory, validates recorded draws against them and counts what
 * would have been drawn. Used by the headless frame loop and by tests.
 */

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use parking_lot::RwLock;

use super::{CommandBuffer, MeshId, RenderDevice, MAX_FRAMES};
use crate::{mesh::MeshBuffers, renderer::SceneConstants};

struct FrameCounters {
    current: u64,
    previous: u64,
}

/// Counters accumulated over every presented frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames_presented: u64,
    pub draw_calls: u64,
    pub indices_drawn: u64,
    pub last_frame_draw_calls: u32,
    pub last_frame_indices: u32,
    pub meshes_created: u32,
}

pub struct HeadlessMesh {
    pub buffers: MeshBuffers,
}

pub struct HeadlessCommandBuffer {
    meshes: Arc<RwLock<Vec<HeadlessMesh>>>,
    recording: bool,
    bound_mesh: Option<MeshId>,
    draw_calls: u32,
    indices: u32,
    /// First invalid command, reported by `end`.
    error: Option<anyhow::Error>,
}

impl HeadlessCommandBuffer {
    fn record_error(&mut self, error: anyhow::Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

impl CommandBuffer for HeadlessCommandBuffer {
    fn begin(&mut self) -> Result<()> {
        if self.recording {
            bail!("Command buffer is already recording.");
        }
        self.recording = true;

        Ok(())
    }

    fn bind_mesh(&mut self, mesh: MeshId) {
        if mesh.0 as usize >= self.meshes.read().len() {
            self.record_error(anyhow!("Bound unknown mesh {:?}", mesh));
            return;
        }
        self.bound_mesh = Some(mesh);
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        _first_instance: u32,
    ) {
        if !self.recording {
            self.record_error(anyhow!("Draw recorded outside of begin/end."));
            return;
        }
        let Some(mesh) = self.bound_mesh else {
            self.record_error(anyhow!("Draw recorded without a bound mesh."));
            return;
        };

        let meshes = self.meshes.read();
        let buffers = &meshes[mesh.0 as usize].buffers;
        let end = first_index as usize + index_count as usize;
        if end > buffers.index_count() {
            let error = anyhow!(
                "Draw range {}..{} exceeds {} indices of mesh {:?}",
                first_index,
                end,
                buffers.index_count(),
                mesh
            );
            drop(meshes);
            self.record_error(error);
            return;
        }
        let max_vertex = buffers.indices[first_index as usize..end]
            .iter()
            .map(|&i| i as i64 + vertex_offset as i64)
            .max();
        if let Some(max_vertex) = max_vertex {
            if max_vertex >= buffers.vertex_count() as i64 {
                let error = anyhow!(
                    "Draw references vertex {} of {} in mesh {:?}",
                    max_vertex,
                    buffers.vertex_count(),
                    mesh
                );
                drop(meshes);
                self.record_error(error);
                return;
            }
        }
        drop(meshes);

        self.draw_calls += 1;
        self.indices += index_count * instance_count;
    }

    fn end(&mut self) -> Result<()> {
        if !self.recording {
            bail!("Command buffer ended without begin.");
        }
        self.recording = false;

        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub struct HeadlessDevice {
    meshes: Arc<RwLock<Vec<HeadlessMesh>>>,
    scene_constants: RwLock<SceneConstants>,
    frame_counters: RwLock<FrameCounters>,
    /// Set between `frame_begin` and `swapchain_present`.
    frame_in_progress: RwLock<bool>,
    stats: RwLock<FrameStats>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self {
            meshes: Arc::new(RwLock::new(Vec::new())),
            scene_constants: RwLock::new(SceneConstants::default()),
            frame_counters: RwLock::new(FrameCounters {
                current: 0,
                previous: 0,
            }),
            frame_in_progress: RwLock::new(false),
            stats: RwLock::new(FrameStats::default()),
        }
    }

    pub fn stats(&self) -> FrameStats {
        *self.stats.read()
    }

    pub fn scene_constants(&self) -> SceneConstants {
        *self.scene_constants.read()
    }

    pub fn previous_frame(&self) -> u64 {
        self.frame_counters.read().previous
    }

    /// Runs `f` with the buffers of an uploaded mesh.
    pub fn with_mesh<R>(&self, mesh: MeshId, f: impl FnOnce(&MeshBuffers) -> R) -> Option<R> {
        self.meshes
            .read()
            .get(mesh.0 as usize)
            .map(|m| f(&m.buffers))
    }

    fn frame_counters_advance(&self) {
        let mut counters = self.frame_counters.write();
        counters.previous = counters.current;
        counters.current = (counters.current + 1) % (MAX_FRAMES as u64);
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderDevice for HeadlessDevice {
    type CommandBuffer = HeadlessCommandBuffer;

    fn create_mesh(&self, buffers: &MeshBuffers) -> Result<MeshId> {
        if buffers.colors.len() != buffers.vertex_count()
            || buffers.normals.len() != buffers.vertex_count()
        {
            bail!(
                "Mismatched vertex streams: {} positions, {} colors, {} normals",
                buffers.vertex_count(),
                buffers.colors.len(),
                buffers.normals.len()
            );
        }

        let mut meshes = self.meshes.write();
        let id = MeshId(meshes.len() as u32);
        meshes.push(HeadlessMesh {
            buffers: buffers.clone(),
        });
        self.stats.write().meshes_created += 1;

        log::debug!(
            "Created headless mesh {:?}: {} vertices, {} indices",
            id,
            buffers.vertex_count(),
            buffers.index_count()
        );
        Ok(id)
    }

    fn write_scene_constants(&self, constants: &SceneConstants) -> Result<()> {
        *self.scene_constants.write() = *constants;
        Ok(())
    }

    fn frame_begin(&mut self) -> Result<()> {
        let mut frame_in_progress = self.frame_in_progress.write();
        if *frame_in_progress {
            bail!("Frame begun twice without presenting.");
        }
        *frame_in_progress = true;

        Ok(())
    }

    fn current_frame(&self) -> u64 {
        self.frame_counters.read().current
    }

    fn get_current_command_buffer(&self) -> Result<HeadlessCommandBuffer> {
        if !*self.frame_in_progress.read() {
            bail!("Command buffer requested outside of a frame.");
        }

        Ok(HeadlessCommandBuffer {
            meshes: self.meshes.clone(),
            recording: false,
            bound_mesh: None,
            draw_calls: 0,
            indices: 0,
            error: None,
        })
    }

    fn queue_submit_commands_graphics(&self, commands: HeadlessCommandBuffer) -> Result<()> {
        if commands.recording {
            bail!("Submitted a command buffer that is still recording.");
        }

        let mut stats = self.stats.write();
        stats.draw_calls += commands.draw_calls as u64;
        stats.indices_drawn += commands.indices as u64;
        stats.last_frame_draw_calls = commands.draw_calls;
        stats.last_frame_indices = commands.indices;

        Ok(())
    }

    fn swapchain_present(&self) -> Result<()> {
        {
            let mut frame_in_progress = self.frame_in_progress.write();
            if !*frame_in_progress {
                bail!("Present without a frame in progress.");
            }
            *frame_in_progress = false;
        }

        self.stats.write().frames_presented += 1;
        self.frame_counters_advance();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_buffers() -> MeshBuffers {
        MeshBuffers {
            positions: vec![[0.0; 3]; 4],
            colors: vec![[1.0; 4]; 4],
            normals: vec![[0.0, 1.0, 0.0]; 4],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[test]
    fn counts_draws_of_a_frame() {
        let mut device = HeadlessDevice::new();
        let mesh = device.create_mesh(&quad_buffers()).unwrap();

        device.frame_begin().unwrap();
        let mut commands = device.get_current_command_buffer().unwrap();
        commands.begin().unwrap();
        commands.bind_mesh(mesh);
        commands.draw_indexed(6, 1, 0, 0, 0);
        commands.end().unwrap();
        device.queue_submit_commands_graphics(commands).unwrap();
        device.swapchain_present().unwrap();

        let stats = device.stats();
        assert_eq!(stats.frames_presented, 1);
        assert_eq!(stats.last_frame_draw_calls, 1);
        assert_eq!(stats.last_frame_indices, 6);
        assert_eq!(device.current_frame(), 1);
    }

    #[test]
    fn frame_index_wraps_at_max_frames() {
        let mut device = HeadlessDevice::new();
        for _ in 0..MAX_FRAMES {
            device.frame_begin().unwrap();
            device.swapchain_present().unwrap();
        }
        assert_eq!(device.current_frame(), 0);
        assert_eq!(device.previous_frame(), MAX_FRAMES as u64 - 1);
    }

    #[test]
    fn out_of_range_draw_fails_at_end() {
        let mut device = HeadlessDevice::new();
        let mesh = device.create_mesh(&quad_buffers()).unwrap();

        device.frame_begin().unwrap();
        let mut commands = device.get_current_command_buffer().unwrap();
        commands.begin().unwrap();
        commands.bind_mesh(mesh);
        commands.draw_indexed(12, 1, 0, 0, 0);
        assert!(commands.end().is_err());
    }

    #[test]
    fn draw_without_mesh_fails() {
        let mut device = HeadlessDevice::new();
        device.frame_begin().unwrap();
        let mut commands = device.get_current_command_buffer().unwrap();
        commands.begin().unwrap();
        commands.draw_indexed(6, 1, 0, 0, 0);
        assert!(commands.end().is_err());
    }

    #[test]
    fn rejects_unbalanced_frames() {
        let mut device = HeadlessDevice::new();
        assert!(device.swapchain_present().is_err());
        assert!(device.get_current_command_buffer().is_err());

        device.frame_begin().unwrap();
        assert!(device.frame_begin().is_err());
    }

    #[test]
    fn rejects_mismatched_streams() {
        let device = HeadlessDevice::new();
        let mut buffers = quad_buffers();
        buffers.normals.pop();
        assert!(device.create_mesh(&buffers).is_err());
    }
}
