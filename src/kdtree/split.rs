use std::cmp::Ordering;

use crate::{Axis, KdTreeConfig, AABB};

/// Kind of a bound edge. Starts sort before ends at the same coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum EdgeType {
    Start = 0,
    End = 1,
}

/// Start or end of one primitive's bounds projected onto the split axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundEdge {
    pub t: f32,
    pub primitive: u32,
    pub edge_type: EdgeType,
}

impl BoundEdge {
    #[inline]
    pub fn new(t: f32, primitive: u32, edge_type: EdgeType) -> Self {
        Self {
            t,
            primitive,
            edge_type,
        }
    }

    /// Sweep order: by coordinate, then starts before ends, then by primitive so that the order is
    /// total and builds are reproducible. NaN coordinates fall back to the IEEE total order.
    #[inline]
    pub fn sweep_order(&self, other: &Self) -> Ordering {
        self.t
            .partial_cmp(&other.t)
            .unwrap_or_else(|| self.t.total_cmp(&other.t))
            .then(self.edge_type.cmp(&other.edge_type))
            .then(self.primitive.cmp(&other.primitive))
    }
}

/// Best split found on one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitPlane {
    pub axis: Axis,
    /// Index of the splitting edge in the sorted edge list of `axis`
    pub edge_offset: usize,
    pub cost: f32,
}

/// Surface area heuristic cost model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SahCost {
    pub intersect_cost: f32,
    pub traversal_cost: f32,
    pub empty_bonus: f32,
}

impl From<&KdTreeConfig> for SahCost {
    fn from(config: &KdTreeConfig) -> Self {
        Self {
            intersect_cost: config.intersect_cost,
            traversal_cost: config.traversal_cost,
            empty_bonus: config.empty_bonus,
        }
    }
}

impl SahCost {
    /// Cost of intersecting every primitive of a leaf
    #[inline]
    pub fn leaf_cost(&self, primitive_count: usize) -> f32 {
        self.intersect_cost * primitive_count as f32
    }

    /// Cost of an interior node whose children are hit with the given probabilities
    #[inline]
    pub fn split_cost(&self, p_below: f32, n_below: usize, p_above: f32, n_above: usize) -> f32 {
        let bonus = if n_below == 0 || n_above == 0 {
            self.empty_bonus
        } else {
            0.0
        };
        self.traversal_cost
            + self.intersect_cost
                * (1.0 - bonus)
                * (p_below * n_below as f32 + p_above * n_above as f32)
    }
}

/// Fill `edges` with the sorted bound edges of `primitives` along `axis`
pub fn fill_edges(
    edges: &mut Vec<BoundEdge>,
    axis: Axis,
    primitives: &[u32],
    primitive_bounds: &[AABB],
) {
    edges.clear();
    edges.reserve(2 * primitives.len());
    for &prim in primitives {
        let bounds = &primitive_bounds[prim as usize];
        edges.push(BoundEdge::new(bounds.min[axis], prim, EdgeType::Start));
        edges.push(BoundEdge::new(bounds.max[axis], prim, EdgeType::End));
    }
    edges.sort_unstable_by(BoundEdge::sweep_order);
}

/// Sweep the sorted `edges` of `axis` and return the cheapest split strictly inside `node_bounds`,
/// or `None` if no edge lies inside the node.
pub fn best_split_on_axis(
    edges: &[BoundEdge],
    axis: Axis,
    node_bounds: &AABB,
    sah: &SahCost,
) -> Option<SplitPlane> {
    let primitive_count = edges.len() / 2;

    let inv_total_sa = 1.0 / node_bounds.surface_area();
    let d = node_bounds.extent();
    let other0 = axis.next();
    let other1 = other0.next();
    let cap_area = d[other0] * d[other1];
    let side_length = d[other0] + d[other1];
    let lower = node_bounds.min[axis];
    let upper = node_bounds.max[axis];

    let mut best: Option<SplitPlane> = None;
    let mut n_below = 0;
    let mut n_above = primitive_count;

    for (offset, edge) in edges.iter().enumerate() {
        if edge.edge_type == EdgeType::End {
            n_above -= 1;
        }

        let t = edge.t;
        if t > lower && t < upper {
            let below_sa = 2.0 * (cap_area + (t - lower) * side_length);
            let above_sa = 2.0 * (cap_area + (upper - t) * side_length);
            let cost = sah.split_cost(
                below_sa * inv_total_sa,
                n_below,
                above_sa * inv_total_sa,
                n_above,
            );

            if cost < best.map_or(f32::INFINITY, |best| best.cost) {
                best = Some(SplitPlane {
                    axis,
                    edge_offset: offset,
                    cost,
                });
            }
        }

        if edge.edge_type == EdgeType::Start {
            n_below += 1;
        }
    }

    debug_assert!(n_below == primitive_count && n_above == 0);

    best
}
