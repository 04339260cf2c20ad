extern crate glam;

use std::sync::Arc;

use rand::{
    distributions::{Distribution, Standard},
    Rng,
};

use crate::{ray_triangle_intersect, Intersection, Primitive, Ray, AABB};

#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertex0: glam::Vec3A,
    pub vertex1: glam::Vec3A,
    pub vertex2: glam::Vec3A,
    pub centroid: glam::Vec3A,
}

impl Triangle {
    #[inline]
    pub fn new(vertex0: glam::Vec3A, vertex1: glam::Vec3A, vertex2: glam::Vec3A) -> Triangle {
        let mut tri = Triangle {
            vertex0,
            vertex1,
            vertex2,
            centroid: glam::Vec3A::ZERO,
        };
        tri.compute_centroid();
        tri
    }

    #[inline]
    pub fn compute_centroid(&mut self) {
        self.centroid = (self.vertex0 + self.vertex1 + self.vertex2) / 3.0;
    }

    #[inline]
    pub fn normal(&self) -> glam::Vec3A {
        (self.vertex1 - self.vertex0)
            .cross(self.vertex2 - self.vertex0)
            .normalize_or_zero()
    }
}

impl Distribution<Triangle> for Standard {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Triangle {
        Triangle::new(rng.gen(), rng.gen(), rng.gen())
    }
}

impl Primitive for Triangle {
    #[inline]
    fn world_bound(&self) -> AABB {
        AABB::from_points([self.vertex0, self.vertex1, self.vertex2])
    }

    #[inline]
    fn intersect(&self, ray: &mut Ray) -> Option<Intersection> {
        let t = ray_triangle_intersect(self, ray)?;
        ray.t_max = t;
        Some(Intersection::new(ray, t, self.normal()))
    }

    #[inline]
    fn intersect_p(&self, ray: &Ray) -> bool {
        ray_triangle_intersect(self, ray).is_some()
    }
}

/// Indexed triangle mesh. It is not intersectable by itself and has to be refined into its
/// triangles first.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    positions: Vec<glam::Vec3A>,
    indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// # Panic
    /// Panics if an index points outside of `positions`
    pub fn new(positions: Vec<glam::Vec3A>, indices: Vec<[u32; 3]>) -> Self {
        assert!(
            indices
                .iter()
                .flatten()
                .all(|&i| (i as usize) < positions.len()),
            "Triangle index out of range"
        );
        Self { positions, indices }
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.iter().map(|[i0, i1, i2]| {
            Triangle::new(
                self.positions[*i0 as usize],
                self.positions[*i1 as usize],
                self.positions[*i2 as usize],
            )
        })
    }
}

impl Primitive for TriangleMesh {
    fn world_bound(&self) -> AABB {
        AABB::from_points(self.positions.iter().copied())
    }

    fn intersect(&self, _: &mut Ray) -> Option<Intersection> {
        panic!("TriangleMesh has to be refined before intersection")
    }

    fn intersect_p(&self, _: &Ray) -> bool {
        panic!("TriangleMesh has to be refined before intersection")
    }

    #[inline]
    fn can_intersect(&self) -> bool {
        false
    }

    fn refine(&self) -> Vec<Arc<dyn Primitive>> {
        self.triangles()
            .map(|tri| Arc::new(tri) as Arc<dyn Primitive>)
            .collect()
    }
}
