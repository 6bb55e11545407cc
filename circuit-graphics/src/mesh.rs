/*!
 * CPU side vertex/index data ready to be handed to a render device.
 */

use std::ops::Range;

use crate::track::ribbon::{Surface, TrackMesh, TrackQuad};

pub const VERTICES_PER_QUAD: u32 = 4;
pub const INDICES_PER_QUAD: u32 = 6;

/// Contiguous slice of the index buffer drawn with a single indexed draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawRange {
    pub index_offset: u32,
    pub index_count: u32,
}

impl DrawRange {
    pub fn is_empty(&self) -> bool {
        self.index_count == 0
    }

    pub fn indices(&self) -> Range<usize> {
        self.index_offset as usize..(self.index_offset + self.index_count) as usize
    }
}

/// Interleaving is left to the device, every attribute has its own stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    fn push_quad(&mut self, quad: &TrackQuad) {
        let base_index = self.positions.len() as u32;
        for corner in &quad.corners {
            self.positions.push([corner.x, corner.y, corner.z]);
            self.colors.push(quad.color.into());
            self.normals.push(quad.normal.into());
        }
        // Corners go around the quad, so fan it from the first one.
        self.indices.extend([
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);
    }
}

/// Track mesh packed into buffers, quads grouped by surface in layer order.
#[derive(Clone, Debug, Default)]
pub struct PackedTrackMesh {
    pub buffers: MeshBuffers,
    /// One range per entry of `Surface::ALL`.
    pub draw_ranges: [DrawRange; 4],
}

impl PackedTrackMesh {
    pub fn pack(mesh: &TrackMesh) -> Self {
        let num_quads = mesh.quads().len();
        let mut buffers = MeshBuffers {
            positions: Vec::with_capacity(num_quads * VERTICES_PER_QUAD as usize),
            colors: Vec::with_capacity(num_quads * VERTICES_PER_QUAD as usize),
            normals: Vec::with_capacity(num_quads * VERTICES_PER_QUAD as usize),
            indices: Vec::with_capacity(num_quads * INDICES_PER_QUAD as usize),
        };
        let mut draw_ranges = [DrawRange::default(); 4];

        for (range, surface) in draw_ranges.iter_mut().zip(Surface::ALL) {
            range.index_offset = buffers.indices.len() as u32;
            for quad in mesh.surface_quads(surface) {
                buffers.push_quad(quad);
            }
            range.index_count = buffers.indices.len() as u32 - range.index_offset;
        }

        Self {
            buffers,
            draw_ranges,
        }
    }

    pub fn draw_range(&self, surface: Surface) -> DrawRange {
        self.draw_ranges[surface as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{
        parameters::TrackParameters, ribbon::RibbonMeshBuilder, TrackGeometry,
    };

    fn packed(step_count: usize) -> (TrackMesh, PackedTrackMesh) {
        let params = TrackParameters {
            step_count,
            ..Default::default()
        };
        let geometry = TrackGeometry::generate(&params).unwrap();
        let mesh = RibbonMeshBuilder::new(&geometry).build();
        let packed = PackedTrackMesh::pack(&mesh);
        (mesh, packed)
    }

    #[test]
    fn ranges_cover_index_buffer_in_layer_order() {
        let (mesh, packed) = packed(40);

        assert_eq!(packed.buffers.vertex_count(), mesh.quads().len() * 4);
        assert_eq!(packed.buffers.index_count(), mesh.quads().len() * 6);

        let mut expected_offset = 0;
        for surface in Surface::ALL {
            let range = packed.draw_range(surface);
            assert_eq!(range.index_offset, expected_offset);
            assert_eq!(
                range.index_count as usize,
                mesh.surface_quads(surface).count() * 6
            );
            expected_offset += range.index_count;
        }
        assert_eq!(expected_offset as usize, packed.buffers.index_count());
    }

    #[test]
    fn quad_is_fanned_from_first_corner() {
        let (mesh, packed) = packed(8);
        let first_shoulder = mesh.surface_quads(Surface::Shoulder).next().unwrap();

        assert_eq!(&packed.buffers.indices[..6], &[0, 1, 2, 0, 2, 3]);
        assert_eq!(
            packed.buffers.positions[2],
            [
                first_shoulder.corners[2].x,
                first_shoulder.corners[2].y,
                first_shoulder.corners[2].z
            ]
        );
        let max_index = *packed.buffers.indices.iter().max().unwrap();
        assert_eq!(max_index as usize, packed.buffers.vertex_count() - 1);
    }

    #[test]
    fn empty_mesh_packs_to_empty_ranges() {
        let packed = PackedTrackMesh::pack(&TrackMesh::default());
        assert!(packed.draw_ranges.iter().all(DrawRange::is_empty));
        assert_eq!(packed.buffers, MeshBuffers::default());
    }
}
