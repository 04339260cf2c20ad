use strum::IntoEnumIterator;

use crate::{ray_box_intersect, Axis, Intersection, Primitive, Ray, AABB};

/// Solid axis aligned box
#[derive(Debug, Clone, Copy)]
pub struct Cuboid {
    pub bounds: AABB,
}

impl Cuboid {
    #[inline]
    pub fn new(bounds: AABB) -> Self {
        Self { bounds }
    }

    /// Outward normal of the face closest to `point`
    fn face_normal(&self, point: glam::Vec3A) -> glam::Vec3A {
        let center = self.bounds.center();
        let half = self.bounds.extent() * 0.5;
        let local = point - center;

        let axis = Axis::iter()
            .max_by(|a, b| {
                let da = (local[*a] / half[*a]).abs();
                let db = (local[*b] / half[*b]).abs();
                da.total_cmp(&db)
            })
            .unwrap_or(Axis::X);

        let mut normal = glam::Vec3A::ZERO;
        normal[axis] = local[axis].signum();
        normal
    }
}

impl Primitive for Cuboid {
    #[inline]
    fn world_bound(&self) -> AABB {
        self.bounds
    }

    fn intersect(&self, ray: &mut Ray) -> Option<Intersection> {
        let t = ray_box_intersect(&self.bounds, ray)?;
        ray.t_max = t;
        let point = ray.at(t);
        Some(Intersection {
            t,
            point,
            normal: self.face_normal(point),
        })
    }

    #[inline]
    fn intersect_p(&self, ray: &Ray) -> bool {
        ray_box_intersect(&self.bounds, ray).is_some()
    }
}
