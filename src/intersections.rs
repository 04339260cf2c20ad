use crate::{Ray, Triangle, AABB};

/// Epsilon used for ray intersections
pub const RAY_INTERSECT_EPSILON: f32 = 0.0001;

/// Hit record filled in by a successful intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Ray parameter of the hit
    pub t: f32,
    pub point: glam::Vec3A,
    /// Unit geometric normal
    pub normal: glam::Vec3A,
}

impl Intersection {
    #[inline]
    pub fn new(ray: &Ray, t: f32, normal: glam::Vec3A) -> Self {
        Self {
            t,
            point: ray.at(t),
            normal,
        }
    }
}

/// Intersect a triangle with a ray. Returns the ray parameter of the hit if it lies inside
/// `(ray.t_min, ray.t_max)`.
pub fn ray_triangle_intersect(tri: &Triangle, ray: &Ray) -> Option<f32> {
    let edge1 = tri.vertex1 - tri.vertex0;
    let edge2 = tri.vertex2 - tri.vertex0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);
    if a > -RAY_INTERSECT_EPSILON && a < RAY_INTERSECT_EPSILON {
        // ray parallel to triangle
        return None;
    }
    let f = 1.0 / a;
    let s = ray.origin - tri.vertex0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = f * edge2.dot(q);
    if t > RAY_INTERSECT_EPSILON && t > ray.t_min && t < ray.t_max {
        Some(t)
    } else {
        None
    }
}

/// Intersect a solid box with a ray. The hit is the entry face, or the exit face when the ray
/// starts inside the box. Returns the ray parameter of the hit.
pub fn ray_box_intersect(aabb: &AABB, ray: &Ray) -> Option<f32> {
    let (t_near, t_far) = aabb.ray_intersect_range(ray, f32::NEG_INFINITY, f32::INFINITY)?;

    if t_near > ray.t_min && t_near < ray.t_max {
        Some(t_near)
    } else if t_far > ray.t_min && t_far < ray.t_max {
        Some(t_far)
    } else {
        None
    }
}
