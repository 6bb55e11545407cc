/*! Layered ribbon mesh laid over the track edges.
 *
 * Per segment, lowest layer first: two shoulder strips, the asphalt body, two lane lines
 * and two kerb ramps. Every quad is wound counter-clockwise seen from above.
 */

use nalgebra::{Vector3, Vector4};

use super::{
    centerline::PlanarPoint,
    edges::SegmentEdges,
    parameters::LayerHeights,
    TrackGeometry,
};

/// Track material. The declaration order is the layer order, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Surface {
    Shoulder,
    Asphalt,
    LaneLine,
    Kerb,
}

impl Surface {
    pub const ALL: [Surface; 4] = [
        Surface::Shoulder,
        Surface::Asphalt,
        Surface::LaneLine,
        Surface::Kerb,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KerbColor {
    Red,
    White,
}

impl KerbColor {
    /// Kerbs alternate in bands of `band_length` segments, starting with red. A zero band
    /// length counts as one.
    pub fn for_segment(segment: usize, band_length: usize) -> Self {
        if (segment / band_length.max(1)) % 2 == 0 {
            KerbColor::Red
        } else {
            KerbColor::White
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackQuad {
    pub segment: usize,
    pub surface: Surface,
    /// `None` for the asphalt body, which spans both edges.
    pub side: Option<Side>,
    pub corners: [Vector3<f32>; 4],
    pub color: Vector4<f32>,
    pub normal: Vector3<f32>,
}

/// One long side of a strip: the points at the start and the end of the segment.
#[derive(Clone, Copy)]
struct Rail {
    start: Vector3<f32>,
    end: Vector3<f32>,
}

impl Rail {
    fn new(start: PlanarPoint, end: PlanarPoint, y: f32) -> Self {
        Self {
            start: lift(&start, y),
            end: lift(&end, y),
        }
    }
}

fn lift(point: &PlanarPoint, y: f32) -> Vector3<f32> {
    Vector3::new(point.x as f32, y, point.y as f32)
}

/// Newell's method, falls back to straight up for zero-area quads.
fn face_normal(corners: &[Vector3<f32>; 4]) -> Vector3<f32> {
    let mut normal = Vector3::zeros();
    for i in 0..corners.len() {
        let current = corners[i];
        let next = corners[(i + 1) % corners.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    normal.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::y)
}

/// Quads of the whole track, in segment order.
#[derive(Clone, Debug, Default)]
pub struct TrackMesh {
    quads: Vec<TrackQuad>,
    segment_count: usize,
}

impl TrackMesh {
    pub fn quads(&self) -> &[TrackQuad] {
        &self.quads
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn segment_quads(&self, segment: usize) -> impl Iterator<Item = &TrackQuad> + '_ {
        self.quads.iter().filter(move |q| q.segment == segment)
    }

    pub fn surface_quads(&self, surface: Surface) -> impl Iterator<Item = &TrackQuad> + '_ {
        self.quads.iter().filter(move |q| q.surface == surface)
    }
}

/// Emits the ribbon for a validated track, using the parameters it was generated with.
pub struct RibbonMeshBuilder<'a> {
    geometry: &'a TrackGeometry,
}

impl<'a> RibbonMeshBuilder<'a> {
    pub fn new(geometry: &'a TrackGeometry) -> Self {
        Self { geometry }
    }

    pub fn build(&self) -> TrackMesh {
        let segment_count = self.geometry.segment_count();
        let mut quads = Vec::with_capacity(segment_count * 7);
        let mut num_collapsed = 0;

        for segment in self.geometry.edges().segments() {
            if !self.emit_segment(&segment, &mut quads) {
                num_collapsed += 1;
            }
        }

        if num_collapsed > 0 {
            log::warn!(
                "{} of {} segments have coincident edges, only their asphalt was emitted",
                num_collapsed,
                segment_count
            );
        }
        log::debug!(
            "Ribbon mesh: {} segments, {} quads",
            segment_count,
            quads.len()
        );

        TrackMesh {
            quads,
            segment_count,
        }
    }

    /// Returns false when the lateral vector is zero and only the asphalt body was emitted.
    fn emit_segment(&self, segment: &SegmentEdges, quads: &mut Vec<TrackQuad>) -> bool {
        let params = self.geometry.parameters();
        let layers: &LayerHeights = &params.layers;
        let palette = &params.palette;
        let SegmentEdges {
            index,
            l1,
            r1,
            l2,
            r2,
        } = *segment;

        let mut push = |surface: Surface,
                        side: Option<Side>,
                        left: Rail,
                        right: Rail,
                        color: Vector4<f32>| {
            let corners = [left.start, left.end, right.end, right.start];
            quads.push(TrackQuad {
                segment: index,
                surface,
                side,
                corners,
                color,
                normal: face_normal(&corners),
            });
        };

        let lateral = l1 - r1;
        let lateral_length = lateral.norm();
        if lateral_length == 0.0 {
            push(
                Surface::Asphalt,
                None,
                Rail::new(l1, l2, layers.asphalt),
                Rail::new(r1, r2, layers.asphalt),
                palette.asphalt,
            );
            return false;
        }
        // Points from the right edge towards the left edge.
        let normal = lateral / lateral_length;

        let run_off = normal * params.run_off_width();
        push(
            Surface::Shoulder,
            Some(Side::Left),
            Rail::new(l1 + run_off, l2 + run_off, layers.sand),
            Rail::new(l1, l2, layers.sand),
            palette.sand,
        );
        push(
            Surface::Shoulder,
            Some(Side::Right),
            Rail::new(r1, r2, layers.sand),
            Rail::new(r1 - run_off, r2 - run_off, layers.sand),
            palette.sand,
        );

        push(
            Surface::Asphalt,
            None,
            Rail::new(l1, l2, layers.asphalt),
            Rail::new(r1, r2, layers.asphalt),
            palette.asphalt,
        );

        let inset = normal * params.lane_line_width;
        push(
            Surface::LaneLine,
            Some(Side::Left),
            Rail::new(l1, l2, layers.lines),
            Rail::new(l1 - inset, l2 - inset, layers.lines),
            palette.line,
        );
        push(
            Surface::LaneLine,
            Some(Side::Right),
            Rail::new(r1 + inset, r2 + inset, layers.lines),
            Rail::new(r1, r2, layers.lines),
            palette.line,
        );

        // Ramps rise from asphalt height at the track edge to kerb height at the outer rim.
        let kerb_color = match KerbColor::for_segment(index, params.kerb_band_length) {
            KerbColor::Red => palette.kerb_red,
            KerbColor::White => palette.kerb_white,
        };
        let kerb = normal * params.kerb_width;
        push(
            Surface::Kerb,
            Some(Side::Left),
            Rail::new(l1 + kerb, l2 + kerb, layers.kerb),
            Rail::new(l1, l2, layers.asphalt),
            kerb_color,
        );
        push(
            Surface::Kerb,
            Some(Side::Right),
            Rail::new(r1, r2, layers.asphalt),
            Rail::new(r1 - kerb, r2 - kerb, layers.kerb),
            kerb_color,
        );

        true
    }
}
