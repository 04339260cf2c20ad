//! Kd-tree accelerator built with the surface area heuristic.
//!
//! The tree is built once, single threaded, and is immutable afterwards. Queries only read the
//! tree; the per query state (todo stack and mailbox) lives on the caller's stack, so a
//! `KdTree` can be shared between any number of rendering threads.

mod builder;
mod node;
mod split;
mod stats;
mod traversal;

pub use node::*;
pub use split::*;
pub use stats::*;
pub use traversal::TodoEntry;
pub use traversal::TodoStack;

use std::sync::Arc;

use log::debug;

use crate::{
    fully_refine, Intersection, KdTreeConfig, Mailbox, Primitive, Ray, Result, RingMailbox, AABB,
    DEFAULT_MAILBOX_SLOTS,
};

use builder::Builder;
use traversal::{AnyHit, ClosestHit};

/// Closest hit found by a tree query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub intersection: Intersection,
    /// Index of the primitive in [`KdTree::primitives`]
    pub primitive: u32,
}

pub struct KdTree<P = Arc<dyn Primitive>> {
    primitives: Vec<P>,
    pool: NodePool,
    bounds: AABB,
    todo_capacity: usize,
    stats: KdTreeStats,
}

impl<P> KdTree<P>
where
    P: Primitive,
{
    /// Build a tree over `primitives`. Fails only if the configuration is invalid.
    pub fn new(primitives: Vec<P>, config: &KdTreeConfig) -> Result<Self> {
        config.validate(primitives.len())?;
        Ok(Self::build(primitives, config))
    }

    /// Build a tree with the default parameters
    pub fn with_default_config(primitives: Vec<P>) -> Self {
        Self::build(primitives, &KdTreeConfig::default())
    }

    fn build(primitives: Vec<P>, config: &KdTreeConfig) -> Self {
        assert!(
            primitives.len() <= MAX_NODE_FIELD as usize,
            "Too many primitives"
        );

        let primitive_bounds: Vec<AABB> = primitives.iter().map(|p| p.world_bound()).collect();
        let bounds = primitive_bounds
            .iter()
            .fold(AABB::default(), |acc, b| acc.union(b));

        let (pool, stats) = Builder::new(&primitive_bounds, config).build(&bounds);
        debug!("{}", stats);

        Self {
            primitives,
            pool,
            bounds,
            todo_capacity: config.todo_capacity,
            stats,
        }
    }

    /// Closest hit along `ray`. On success `ray.t_max` is the hit distance.
    #[inline]
    pub fn find_closest_hit(&self, ray: &mut Ray) -> Option<Hit> {
        self.find_closest_hit_with_mailbox(ray, &mut RingMailbox::<DEFAULT_MAILBOX_SLOTS>::new())
    }

    /// Closest hit along `ray`, deduplicating primitive tests with `mailbox`
    pub fn find_closest_hit_with_mailbox<M>(&self, ray: &mut Ray, mailbox: &mut M) -> Option<Hit>
    where
        M: Mailbox,
    {
        let mut query = ClosestHit::default();
        self.traverse(ray, mailbox, &mut query);
        query.hit
    }

    /// True if anything is hit inside the ray interval
    #[inline]
    pub fn exists_hit(&self, ray: &Ray) -> bool {
        self.exists_hit_with_mailbox(ray, &mut RingMailbox::<DEFAULT_MAILBOX_SLOTS>::new())
    }

    pub fn exists_hit_with_mailbox<M>(&self, ray: &Ray, mailbox: &mut M) -> bool
    where
        M: Mailbox,
    {
        let mut ray = *ray;
        let mut query = AnyHit::default();
        self.traverse(&mut ray, mailbox, &mut query);
        query.found
    }

    #[inline]
    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    #[inline]
    pub fn stats(&self) -> &KdTreeStats {
        &self.stats
    }

    #[inline]
    pub fn primitives(&self) -> &[P] {
        &self.primitives
    }

    /// Nodes in build order, the root is the first one
    #[inline]
    pub fn nodes(&self) -> &[KdNode] {
        self.pool.nodes()
    }

    #[inline]
    pub fn node_pool(&self) -> &NodePool {
        &self.pool
    }

    /// Primitive indices referenced by a leaf of this tree
    #[inline]
    pub fn leaf_primitives<'a>(&'a self, node: &'a KdNode) -> &'a [u32] {
        self.pool.leaf_primitives(node)
    }

    #[inline]
    pub fn todo_capacity(&self) -> usize {
        self.todo_capacity
    }
}

impl KdTree<Arc<dyn Primitive>> {
    /// Refine every primitive that can not be intersected directly, then build the tree
    pub fn from_unrefined(
        primitives: Vec<Arc<dyn Primitive>>,
        config: &KdTreeConfig,
    ) -> Result<Self> {
        let mut refined = Vec::with_capacity(primitives.len());
        for prim in primitives {
            fully_refine(prim, &mut refined);
        }
        Self::new(refined, config)
    }
}

impl<P> Primitive for KdTree<P>
where
    P: Primitive,
{
    #[inline]
    fn world_bound(&self) -> AABB {
        self.bounds
    }

    #[inline]
    fn intersect(&self, ray: &mut Ray) -> Option<Intersection> {
        self.find_closest_hit(ray).map(|hit| hit.intersection)
    }

    #[inline]
    fn intersect_p(&self, ray: &Ray) -> bool {
        self.exists_hit(ray)
    }

    #[inline]
    fn can_intersect(&self) -> bool {
        true
    }
}
