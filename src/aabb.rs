use strum::IntoEnumIterator;

use crate::{Axis, Ray};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: glam::Vec3A,
    pub max: glam::Vec3A,
}

impl Default for AABB {
    fn default() -> Self {
        Self {
            min: glam::Vec3A::splat(f32::INFINITY),
            max: glam::Vec3A::splat(-f32::INFINITY),
        }
    }
}

impl AABB {
    #[inline]
    pub fn new(min: glam::Vec3A, max: glam::Vec3A) -> Self {
        Self { min, max }
    }

    /// Cube with the given center and edge length
    #[inline]
    pub fn cube(center: glam::Vec3A, size: f32) -> Self {
        let half = glam::Vec3A::splat(size * 0.5);
        Self::new(center - half, center + half)
    }

    /// Smallest box containing all the points
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = glam::Vec3A>,
    {
        let mut aabb = Self::default();
        for point in points {
            aabb.grow(point);
        }
        aabb
    }

    /// Grow the box to contain a new point
    #[inline]
    pub fn grow(&mut self, point: glam::Vec3A) {
        self.max = self.max.max(point);
        self.min = self.min.min(point);
    }

    /// Grow the box to contain another box
    #[inline]
    pub fn grow_aabb(&mut self, other: &AABB) {
        self.max = self.max.max(other.max);
        self.min = self.min.min(other.min);
    }

    #[inline]
    pub fn union(&self, other: &AABB) -> AABB {
        let mut aabb = *self;
        aabb.grow_aabb(other);
        aabb
    }

    /// If the AABB is valid (min <= max)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    pub fn extent(&self) -> glam::Vec3A {
        self.max - self.min
    }

    pub fn center(&self) -> glam::Vec3A {
        (self.min + self.max) * 0.5
    }

    pub fn surface_area(&self) -> f32 {
        let d = self.extent();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    /// Axis with the largest extent. Ties go to the later axis.
    pub fn maximum_extent(&self) -> Axis {
        let extent = self.extent();
        Axis::iter()
            .max_by(|a, b| extent[*a].total_cmp(&extent[*b]))
            .unwrap_or(Axis::X)
    }

    /// Slab test clipped to the ray interval. Returns the entry and exit parameters.
    #[inline]
    pub fn ray_intersect(&self, ray: &Ray) -> Option<(f32, f32)> {
        self.ray_intersect_range(ray, ray.t_min, ray.t_max)
    }

    /// Slab test clipped to `[t0, t1]` instead of the ray interval.
    ///
    /// NaN slab distances (a zero direction component with the origin on a slab plane) leave the
    /// running interval untouched.
    pub fn ray_intersect_range(&self, ray: &Ray, mut t0: f32, mut t1: f32) -> Option<(f32, f32)> {
        if !self.is_valid() {
            return None;
        }

        let inv_dir = ray.inv_direction();
        for axis in Axis::iter() {
            let mut t_near = (self.min[axis] - ray.origin[axis]) * inv_dir[axis];
            let mut t_far = (self.max[axis] - ray.origin[axis]) * inv_dir[axis];
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }

            if t_near > t0 {
                t0 = t_near;
            }
            if t_far < t1 {
                t1 = t_far;
            }
            if t0 > t1 {
                return None;
            }
        }

        Some((t0, t1))
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3A;

    use approx::*;

    use crate::{Axis, Ray, AABB};

    #[test]
    fn default_is_empty() {
        let aabb = AABB::default();
        assert!(!aabb.is_valid());

        let ray = Ray::infinite_ray(Vec3A::splat(-1.0), Vec3A::ONE);
        assert!(aabb.ray_intersect(&ray).is_none());
    }

    #[test]
    fn union_and_area() {
        let a = AABB::cube(Vec3A::ZERO, 1.0);
        let b = AABB::cube(Vec3A::new(2.0, 0.0, 0.0), 1.0);
        let u = a.union(&b);

        assert_relative_eq!(u.min, Vec3A::new(-0.5, -0.5, -0.5));
        assert_relative_eq!(u.max, Vec3A::new(2.5, 0.5, 0.5));
        assert_relative_eq!(a.surface_area(), 6.0);
        assert_relative_eq!(u.surface_area(), 2.0 * (3.0 + 3.0 + 1.0));
        assert_eq!(u.maximum_extent(), Axis::X);
    }

    #[test]
    fn maximum_extent_ties_pick_later_axis() {
        let aabb = AABB::new(Vec3A::ZERO, Vec3A::new(2.0, 2.0, 1.0));
        assert_eq!(aabb.maximum_extent(), Axis::Y);

        let aabb = AABB::new(Vec3A::ZERO, Vec3A::ONE);
        assert_eq!(aabb.maximum_extent(), Axis::Z);
    }

    #[test]
    fn slab_entry_and_exit() {
        let aabb = AABB::cube(Vec3A::ZERO, 1.0);
        let ray = Ray::segment(Vec3A::new(-1.0, 0.0, 0.0), Vec3A::X, 10.0);

        let (t0, t1) = aabb.ray_intersect(&ray).unwrap();
        assert_relative_eq!(t0, 0.5);
        assert_relative_eq!(t1, 1.5);
    }

    #[test]
    fn slab_is_clipped_to_ray_interval() {
        let aabb = AABB::cube(Vec3A::ZERO, 1.0);

        let short = Ray::segment(Vec3A::new(-1.0, 0.0, 0.0), Vec3A::X, 0.25);
        assert!(aabb.ray_intersect(&short).is_none());

        let inside = Ray::segment(Vec3A::ZERO, Vec3A::X, 0.25);
        let (t0, t1) = aabb.ray_intersect(&inside).unwrap();
        assert_eq!(t0, 0.0);
        assert_eq!(t1, 0.25);
    }

    #[test]
    fn slab_misses_parallel_ray_outside() {
        let aabb = AABB::cube(Vec3A::ZERO, 1.0);
        let ray = Ray::infinite_ray(Vec3A::new(-1.0, 2.0, 0.0), Vec3A::X);
        assert!(aabb.ray_intersect(&ray).is_none());
    }
}
