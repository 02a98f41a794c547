//! Bounding volumes and intersection tests
//!
//! Moving entities use spheres (one squared-distance compare per test),
//! static geometry uses axis-aligned boxes. Touching counts as intersecting.

use glam::Vec3;

/// A bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn intersects_sphere(&self, other: &Sphere) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }

    #[inline]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let closest = self.center.clamp(aabb.min, aabb.max);
        self.center.distance_squared(closest) <= self.radius * self.radius
    }
}

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of the given edge length centered on a point
    pub fn cube(center: Vec3, size: f32) -> Self {
        let half = Vec3::splat(size / 2.0);
        Self::new(center - half, center + half)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn translated(&self, offset: Vec3) -> Aabb {
        Aabb::new(self.min + offset, self.max + offset)
    }

    /// Smallest sphere around the box (center to corner)
    pub fn bounding_sphere(&self) -> Sphere {
        Sphere::new(self.center(), (self.max - self.min).length() * 0.5)
    }

    #[inline]
    pub fn intersects_aabb(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

/// Collision shape attached to an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collider {
    Sphere(Sphere),
    Aabb(Aabb),
}

impl Collider {
    pub fn intersects(&self, other: &Collider) -> bool {
        match (self, other) {
            (Collider::Sphere(a), Collider::Sphere(b)) => a.intersects_sphere(b),
            (Collider::Sphere(s), Collider::Aabb(b)) | (Collider::Aabb(b), Collider::Sphere(s)) => {
                s.intersects_aabb(b)
            }
            (Collider::Aabb(a), Collider::Aabb(b)) => a.intersects_aabb(b),
        }
    }

    /// Copy of this collider moved by `offset`
    pub fn translated(&self, offset: Vec3) -> Collider {
        match self {
            Collider::Sphere(s) => Collider::Sphere(Sphere::new(s.center + offset, s.radius)),
            Collider::Aabb(b) => Collider::Aabb(b.translated(offset)),
        }
    }

    pub fn center(&self) -> Vec3 {
        match self {
            Collider::Sphere(s) => s.center,
            Collider::Aabb(b) => b.center(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sphere_sphere_touching_counts() {
        let a = Sphere::new(Vec3::ZERO, 1.0);
        let b = Sphere::new(Vec3::new(3.0, 0.0, 0.0), 2.0);
        assert!(a.intersects_sphere(&b));

        let c = Sphere::new(Vec3::new(3.0001, 0.0, 0.0), 2.0);
        assert!(!a.intersects_sphere(&c));
    }

    #[test]
    fn test_sphere_aabb() {
        let wall = Aabb::cube(Vec3::new(0.0, 0.0, 0.0), 1.0);

        // Touching the face
        assert!(Sphere::new(Vec3::new(1.0, 0.0, 0.0), 0.5).intersects_aabb(&wall));
        // Near the corner but outside the rounded reach
        assert!(!Sphere::new(Vec3::new(0.9, 0.9, 0.0), 0.5).intersects_aabb(&wall));
        // Center inside the box
        assert!(Sphere::new(Vec3::new(0.1, 0.1, 0.1), 0.01).intersects_aabb(&wall));
    }

    #[test]
    fn test_aabb_aabb_adjacent_walls_touch() {
        let a = Aabb::cube(Vec3::ZERO, 1.0);
        let b = Aabb::cube(Vec3::new(1.0, 0.0, 0.0), 1.0);
        let c = Aabb::cube(Vec3::new(1.5, 1.5, 0.0), 1.0);
        assert!(a.intersects_aabb(&b));
        assert!(!a.intersects_aabb(&c));
    }

    #[test]
    fn test_bounding_sphere_reaches_corners() {
        let b = Aabb::cube(Vec3::new(1.0, 2.0, 3.0), 2.0);
        let s = b.bounding_sphere();
        assert_eq!(s.center, Vec3::new(1.0, 2.0, 3.0));
        assert!((s.radius - 3.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_translated_keeps_shape() {
        let c = Collider::Aabb(Aabb::cube(Vec3::ZERO, 1.0)).translated(Vec3::X);
        assert_eq!(c, Collider::Aabb(Aabb::cube(Vec3::X, 1.0)));
        let s = Collider::Sphere(Sphere::new(Vec3::ZERO, 0.5)).translated(Vec3::Y);
        assert_eq!(s.center(), Vec3::Y);
    }

    proptest! {
        #[test]
        fn prop_intersection_is_symmetric(
            ax in -10.0f32..10.0, ay in -10.0f32..10.0, ar in 0.01f32..3.0,
            bx in -10.0f32..10.0, by in -10.0f32..10.0, size in 0.01f32..3.0,
        ) {
            let s = Collider::Sphere(Sphere::new(Vec3::new(ax, ay, 0.0), ar));
            let b = Collider::Aabb(Aabb::cube(Vec3::new(bx, by, 0.0), size));
            prop_assert_eq!(s.intersects(&b), b.intersects(&s));
        }

        #[test]
        fn prop_sphere_test_matches_distance(
            d in 0.0f32..10.0, r1 in 0.0f32..5.0, r2 in 0.0f32..5.0,
        ) {
            // Skip the rounding band right at the boundary
            prop_assume!((d - (r1 + r2)).abs() > 1e-3);
            let a = Sphere::new(Vec3::ZERO, r1);
            let b = Sphere::new(Vec3::new(d, 0.0, 0.0), r2);
            prop_assert_eq!(a.intersects_sphere(&b), d <= r1 + r2);
        }
    }
}
