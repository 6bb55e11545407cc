use std::f64::consts::TAU;

use nalgebra::Vector2;

/// A point on the ground plane. `x` is world x, `y` holds world z: the vertical axis is
/// reserved for layering and never stored here.
pub type PlanarPoint = Vector2<f64>;

/// Forward-difference tangent at a centerline sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tangent {
    pub direction: Vector2<f64>,
    /// Euclidean length of `direction`, with zero replaced by one.
    pub length: f64,
}

impl Tangent {
    pub fn is_degenerate(&self) -> bool {
        self.direction.x == 0.0 && self.direction.y == 0.0
    }
}

/// Closed midline of the track. Holds exactly one entry per sample; index `len()` aliases
/// index `0` through the wrapping accessors.
#[derive(Clone, Debug, PartialEq)]
pub struct Centerline {
    points: Vec<PlanarPoint>,
}

impl Centerline {
    /// Samples the base ellipse and layers the procedural deformations onto it.
    pub fn generate(step_count: usize, scale_x: f64, scale_z: f64) -> Self {
        Self::sample(step_count, scale_x, scale_z, true)
    }

    /// Samples the plain base ellipse.
    pub fn ellipse(step_count: usize, scale_x: f64, scale_z: f64) -> Self {
        Self::sample(step_count, scale_x, scale_z, false)
    }

    pub fn from_points(points: Vec<PlanarPoint>) -> Self {
        Self { points }
    }

    fn sample(step_count: usize, scale_x: f64, scale_z: f64, deform: bool) -> Self {
        let points = (0..step_count)
            .map(|i| {
                let angle = (i as f64 / step_count as f64) * TAU;
                let x = angle.cos() * scale_x;
                let mut z = angle.sin() * scale_z;

                if deform {
                    // Both conditions look at the sample as it stands when they run, so
                    // the second one sees z after the first has bent it.
                    if z < 0.0 {
                        z += (x * 0.1).sin() * 12.0;
                    }
                    if x > 50.0 {
                        z += (z * 0.2).cos() * 5.0;
                    }
                }

                PlanarPoint::new(x, z)
            })
            .collect::<Vec<_>>();

        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PlanarPoint] {
        &self.points
    }

    /// Wrapping accessor, `point(len())` is `point(0)`.
    ///
    /// Panics on an empty centerline.
    pub fn point(&self, index: usize) -> PlanarPoint {
        self.points[index % self.points.len()]
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.points.len()
    }

    pub fn tangent(&self, index: usize) -> Tangent {
        let direction = self.point(self.next_index(index)) - self.point(index);
        let mut length = direction.norm();
        if length == 0.0 {
            length = 1.0;
        }

        Tangent { direction, length }
    }

    /// Unit normal pointing to the left of the direction of travel (the tangent rotated a
    /// quarter turn counter-clockwise). Zero for a degenerate tangent.
    pub fn normal(&self, index: usize) -> Vector2<f64> {
        let tangent = self.tangent(index);
        Vector2::new(
            -tangent.direction.y / tangent.length,
            tangent.direction.x / tangent.length,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_count_matches_steps() {
        let centerline = Centerline::generate(300, 90.0, 60.0);
        assert_eq!(centerline.len(), 300);
        // x > 50 at angle zero, so the second deformation lifts z by cos(0) * 5.
        assert_eq!(centerline.point(0), PlanarPoint::new(90.0, 5.0));
    }

    #[test]
    fn wrapping_access() {
        let centerline = Centerline::ellipse(8, 5.0, 5.0);
        assert_eq!(centerline.point(8), centerline.point(0));
        assert_eq!(centerline.point(9), centerline.point(1));
        assert_eq!(centerline.next_index(7), 0);
    }

    #[test]
    fn deformation_only_touches_matching_samples() {
        let base = Centerline::ellipse(300, 90.0, 60.0);
        let deformed = Centerline::generate(300, 90.0, 60.0);

        for (plain, bent) in base.points().iter().zip(deformed.points()) {
            assert_eq!(plain.x, bent.x);
            if plain.y >= 0.0 && plain.x <= 50.0 {
                assert_eq!(plain.y, bent.y);
            }
        }

        // Top of the ellipse, x == 0 and z > 0, is left alone.
        assert_eq!(base.point(75), deformed.point(75));
    }

    #[test]
    fn second_deformation_sees_first() {
        // Sample in the x > 50, z < 0 quadrant.
        let step_count = 12;
        let index = 11;
        let deformed = Centerline::generate(step_count, 90.0, 60.0);

        let angle = (index as f64 / step_count as f64) * TAU;
        let x = angle.cos() * 90.0;
        let mut z = angle.sin() * 60.0;
        z += (x * 0.1).sin() * 12.0;
        z += (z * 0.2).cos() * 5.0;

        assert_eq!(deformed.point(index), PlanarPoint::new(x, z));
    }

    #[test]
    fn normal_points_left_of_travel() {
        let centerline = Centerline::from_points(vec![
            PlanarPoint::new(0.0, 0.0),
            PlanarPoint::new(2.0, 0.0),
            PlanarPoint::new(2.0, 2.0),
        ]);
        assert_eq!(centerline.normal(0), Vector2::new(0.0, 1.0));
        assert_eq!(centerline.tangent(0).length, 2.0);
    }

    #[test]
    fn coincident_samples_fall_back_to_zero_normal() {
        let centerline = Centerline::from_points(vec![PlanarPoint::new(3.0, 4.0)]);
        let tangent = centerline.tangent(0);
        assert!(tangent.is_degenerate());
        assert_eq!(tangent.length, 1.0);
        assert_eq!(centerline.normal(0), Vector2::zeros());
    }
}
