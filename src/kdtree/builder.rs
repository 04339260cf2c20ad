use log::trace;

use crate::{
    best_split_on_axis, fill_edges, BoundEdge, EdgeType, KdNode, KdTreeConfig, KdTreeStats,
    NodePool, SahCost, AABB,
};

/// Bad refinements tolerated along one path before a leaf is forced
const MAX_BAD_REFINES: u32 = 3;

/// Splits more expensive than this multiple of the leaf cost are rejected for small nodes
const EXPENSIVE_SPLIT_FACTOR: f32 = 4.0;
const EXPENSIVE_SPLIT_MAX_PRIMS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeafReason {
    SmallEnough,
    DepthLimit,
    NoSplit,
    TooExpensive,
    BadRefines,
}

/// Top-down surface area heuristic builder. Nodes are appended to the pool depth first, below
/// subtree before above subtree.
pub(crate) struct Builder<'a> {
    primitive_bounds: &'a [AABB],
    sah: SahCost,
    max_prims_per_leaf: usize,
    max_depth: u32,
    /// Sorted edge scratch space, one list per axis
    edges: [Vec<BoundEdge>; 3],
    pool: NodePool,
    stats: KdTreeStats,
}

impl<'a> Builder<'a> {
    pub fn new(primitive_bounds: &'a [AABB], config: &KdTreeConfig) -> Self {
        let max_depth = config.resolved_max_depth(primitive_bounds.len());
        Self {
            primitive_bounds,
            sah: SahCost::from(config),
            max_prims_per_leaf: config.max_prims_per_leaf,
            max_depth,
            edges: Default::default(),
            pool: NodePool::new(),
            stats: KdTreeStats {
                primitives: primitive_bounds.len(),
                max_depth,
                ..Default::default()
            },
        }
    }

    /// Build the tree for all primitives inside `bounds`
    pub fn build(mut self, bounds: &AABB) -> (NodePool, KdTreeStats) {
        let primitives: Vec<u32> = (0..self.primitive_bounds.len() as u32).collect();
        self.build_node(0, bounds, &primitives, self.max_depth, 0);
        (self.pool, self.stats)
    }

    /// `depth` counts the levels left before the depth limit, `bad_refines` is inherited from the
    /// parent chain
    fn build_node(
        &mut self,
        node_num: u32,
        node_bounds: &AABB,
        primitives: &[u32],
        depth: u32,
        mut bad_refines: u32,
    ) {
        let primitive_count = primitives.len();

        if primitive_count <= self.max_prims_per_leaf {
            self.make_leaf(node_num, primitives, depth, LeafReason::SmallEnough);
            return;
        }
        if depth == 0 {
            self.make_leaf(node_num, primitives, depth, LeafReason::DepthLimit);
            return;
        }

        // Longest axis first, then the other two if no edge lies inside the node
        let mut axis = node_bounds.maximum_extent();
        let mut best = None;
        for _ in 0..3 {
            let edges = &mut self.edges[axis.index()];
            fill_edges(edges, axis, primitives, self.primitive_bounds);
            best = best_split_on_axis(edges, axis, node_bounds, &self.sah);
            if best.is_some() {
                break;
            }
            axis = axis.next();
        }

        let Some(split) = best else {
            self.make_leaf(node_num, primitives, depth, LeafReason::NoSplit);
            return;
        };

        let leaf_cost = self.sah.leaf_cost(primitive_count);
        if split.cost > leaf_cost {
            bad_refines += 1;
        }
        if split.cost > EXPENSIVE_SPLIT_FACTOR * leaf_cost
            && primitive_count < EXPENSIVE_SPLIT_MAX_PRIMS
        {
            self.make_leaf(node_num, primitives, depth, LeafReason::TooExpensive);
            return;
        }
        if bad_refines >= MAX_BAD_REFINES {
            self.make_leaf(node_num, primitives, depth, LeafReason::BadRefines);
            return;
        }

        // Primitives starting before the split edge go below, the ones ending after it go above.
        // A primitive straddling the plane ends up in both lists.
        let edges = &self.edges[split.axis.index()];
        let below: Vec<u32> = edges[..split.edge_offset]
            .iter()
            .filter(|edge| edge.edge_type == EdgeType::Start)
            .map(|edge| edge.primitive)
            .collect();
        let above: Vec<u32> = edges[split.edge_offset + 1..]
            .iter()
            .filter(|edge| edge.edge_type == EdgeType::End)
            .map(|edge| edge.primitive)
            .collect();
        let t_split = edges[split.edge_offset].t;

        let mut below_bounds = *node_bounds;
        below_bounds.max[split.axis] = t_split;
        let mut above_bounds = *node_bounds;
        above_bounds.min[split.axis] = t_split;

        self.pool.push(node_num, KdNode::interior(split.axis, t_split));
        self.stats.interior_nodes += 1;

        self.build_node(node_num + 1, &below_bounds, &below, depth - 1, bad_refines);

        let above_child = self.pool.next_free();
        self.pool.link_above_child(node_num, above_child);
        self.build_node(above_child, &above_bounds, &above, depth - 1, bad_refines);
    }

    fn make_leaf(&mut self, node_num: u32, primitives: &[u32], depth: u32, reason: LeafReason) {
        match reason {
            LeafReason::SmallEnough => {}
            LeafReason::DepthLimit => self.stats.depth_limited_leaves += 1,
            LeafReason::NoSplit | LeafReason::TooExpensive | LeafReason::BadRefines => {
                self.stats.fallback_leaves += 1
            }
        }
        if reason != LeafReason::SmallEnough {
            trace!(
                "Leaf {} with {} primitives: {:?}",
                node_num,
                primitives.len(),
                reason
            );
        }

        self.pool.push_leaf(node_num, primitives);
        self.stats.record_leaf(primitives.len(), self.max_depth - depth);
    }
}
