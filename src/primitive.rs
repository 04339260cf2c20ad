use std::sync::Arc;

use crate::{Intersection, Ray, AABB};

/// Geometry that can be stored in an acceleration structure.
///
/// Implementations are shared read-only between rendering threads, so none of the methods may
/// mutate the primitive.
pub trait Primitive: Send + Sync {
    /// World space bounds of the primitive
    fn world_bound(&self) -> AABB;

    /// Find the closest hit inside `(ray.t_min, ray.t_max)`. On success `ray.t_max` is shrunk to
    /// the hit distance so later tests only accept closer hits.
    fn intersect(&self, ray: &mut Ray) -> Option<Intersection>;

    /// Occlusion test: is there any hit inside `(ray.t_min, ray.t_max)`
    fn intersect_p(&self, ray: &Ray) -> bool;

    /// Primitives that return false must be refined before they can be intersected
    fn can_intersect(&self) -> bool {
        true
    }

    /// Split the primitive into simpler ones. Only called when `can_intersect` is false.
    fn refine(&self) -> Vec<Arc<dyn Primitive>> {
        Vec::new()
    }
}

impl<P> Primitive for Arc<P>
where
    P: Primitive + ?Sized,
{
    #[inline]
    fn world_bound(&self) -> AABB {
        (**self).world_bound()
    }

    #[inline]
    fn intersect(&self, ray: &mut Ray) -> Option<Intersection> {
        (**self).intersect(ray)
    }

    #[inline]
    fn intersect_p(&self, ray: &Ray) -> bool {
        (**self).intersect_p(ray)
    }

    #[inline]
    fn can_intersect(&self) -> bool {
        (**self).can_intersect()
    }

    #[inline]
    fn refine(&self) -> Vec<Arc<dyn Primitive>> {
        (**self).refine()
    }
}

impl<P> Primitive for Box<P>
where
    P: Primitive + ?Sized,
{
    #[inline]
    fn world_bound(&self) -> AABB {
        (**self).world_bound()
    }

    #[inline]
    fn intersect(&self, ray: &mut Ray) -> Option<Intersection> {
        (**self).intersect(ray)
    }

    #[inline]
    fn intersect_p(&self, ray: &Ray) -> bool {
        (**self).intersect_p(ray)
    }

    #[inline]
    fn can_intersect(&self) -> bool {
        (**self).can_intersect()
    }

    #[inline]
    fn refine(&self) -> Vec<Arc<dyn Primitive>> {
        (**self).refine()
    }
}

/// Refine `primitive` until only intersectable primitives are left, appending them to `refined`.
pub fn fully_refine(primitive: Arc<dyn Primitive>, refined: &mut Vec<Arc<dyn Primitive>>) {
    let mut todo = vec![primitive];
    while let Some(prim) = todo.pop() {
        if prim.can_intersect() {
            refined.push(prim);
        } else {
            // keep the refined order stable: children are visited first to last
            todo.extend(prim.refine().into_iter().rev());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3A;

    use crate::*;

    #[test]
    fn intersectable_primitive_is_kept() {
        let cuboid: Arc<dyn Primitive> = Arc::new(Cuboid::new(AABB::cube(Vec3A::ZERO, 1.0)));

        let mut refined = Vec::new();
        fully_refine(cuboid, &mut refined);

        assert_eq!(refined.len(), 1);
    }

    #[test]
    fn mesh_is_refined_into_triangles() {
        let quad = TriangleMesh::new(
            vec![
                Vec3A::new(0.0, 0.0, 0.0),
                Vec3A::new(1.0, 0.0, 0.0),
                Vec3A::new(1.0, 1.0, 0.0),
                Vec3A::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );

        let mut refined = Vec::new();
        fully_refine(Arc::new(quad), &mut refined);

        assert_eq!(refined.len(), 2);
        assert!(refined.iter().all(|prim| prim.can_intersect()));

        let first = refined[0].world_bound();
        assert_eq!(first.min, Vec3A::new(0.0, 0.0, 0.0));
        assert_eq!(first.max, Vec3A::new(1.0, 1.0, 0.0));
    }
}
