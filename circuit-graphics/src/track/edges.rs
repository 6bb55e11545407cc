use super::centerline::{Centerline, PlanarPoint};

/// Corners of one ribbon segment: the edge points at sample `i` and at the following sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentEdges {
    pub index: usize,
    pub l1: PlanarPoint,
    pub r1: PlanarPoint,
    pub l2: PlanarPoint,
    pub r2: PlanarPoint,
}

/// Left and right track borders, aligned index for index with the centerline.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgePair {
    pub left: Vec<PlanarPoint>,
    pub right: Vec<PlanarPoint>,
}

impl EdgePair {
    /// Offsets every centerline sample by half of `width` along its normal, left edge on the
    /// counter-clockwise side of travel.
    pub fn build(centerline: &Centerline, width: f64) -> Self {
        let half_width = width / 2.0;
        let mut left = Vec::with_capacity(centerline.len());
        let mut right = Vec::with_capacity(centerline.len());
        let mut num_degenerate = 0;

        for i in 0..centerline.len() {
            if centerline.tangent(i).is_degenerate() {
                num_degenerate += 1;
            }

            let current = centerline.point(i);
            let offset = centerline.normal(i) * half_width;
            left.push(current + offset);
            right.push(current - offset);
        }

        if num_degenerate > 0 {
            log::warn!(
                "{} of {} centerline samples coincide with their successor, their edges collapse onto the centerline",
                num_degenerate,
                centerline.len()
            );
        }

        Self { left, right }
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Segment `index`, closing the ring by pairing the last sample with the first one.
    pub fn segment(&self, index: usize) -> SegmentEdges {
        let next = (index + 1) % self.len();
        SegmentEdges {
            index,
            l1: self.left[index],
            r1: self.right[index],
            l2: self.left[next],
            r2: self.right[next],
        }
    }

    /// All segments of the ring, one per sample.
    pub fn segments(&self) -> impl Iterator<Item = SegmentEdges> + '_ {
        (0..self.len()).map(|i| self.segment(i))
    }
}
