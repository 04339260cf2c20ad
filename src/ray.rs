/// Ray object with a parametric interval `[t_min, t_max]`. Might be a proper ray (t_max = infinity)
/// or a line segment (t_max is finite, e.g. a shadow ray towards a light)
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: glam::Vec3A,
    pub direction: glam::Vec3A,
    pub t_min: f32,
    pub t_max: f32,
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Default::default(),
            direction: glam::Vec3A::new(1.0, 0.0, 0.0),
            t_min: 0.0,
            t_max: 1.0,
        }
    }
}

impl Ray {
    #[inline]
    pub fn new(origin: glam::Vec3A, direction: glam::Vec3A, t_min: f32, t_max: f32) -> Self {
        Self {
            origin,
            direction,
            t_min,
            t_max,
        }
    }

    /// Create a segment starting at the origin (t_min = 0) and ending at `t_max`
    #[inline]
    pub fn segment(origin: glam::Vec3A, direction: glam::Vec3A, t_max: f32) -> Self {
        Self::new(origin, direction, 0.0, t_max)
    }

    /// Create a ray with infinite length (a proper ray)
    #[inline]
    pub fn infinite_ray(origin: glam::Vec3A, direction: glam::Vec3A) -> Self {
        Self::segment(origin, direction, f32::INFINITY)
    }

    /// Point along the ray at parameter `t`
    #[inline]
    pub fn at(&self, t: f32) -> glam::Vec3A {
        self.origin + self.direction * t
    }

    /// Component-wise reciprocal of the direction. Zero components become signed infinities.
    #[inline]
    pub fn inv_direction(&self) -> glam::Vec3A {
        self.direction.recip()
    }
}
