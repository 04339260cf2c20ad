use std::fmt::{self, Display};

/// Shape of a built kd-tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KdTreeStats {
    /// Number of primitives the tree was built over
    pub primitives: usize,
    /// Depth limit used during the build
    pub max_depth: u32,
    pub interior_nodes: usize,
    pub leaf_nodes: usize,
    pub empty_leaves: usize,
    /// Sum of the primitive counts of all leaves
    pub leaf_references: usize,
    /// Depth of the deepest leaf, the root has depth 0
    pub deepest_leaf: u32,
    /// Primitive count of the largest leaf
    pub largest_leaf: usize,
    /// Leaves created because the depth limit was reached
    pub depth_limited_leaves: usize,
    /// Leaves created because no split was found or splitting was not worth it
    pub fallback_leaves: usize,
}

impl KdTreeStats {
    #[inline]
    pub fn node_count(&self) -> usize {
        self.interior_nodes + self.leaf_nodes
    }

    /// Average number of primitives per non-empty leaf
    pub fn average_leaf_size(&self) -> f32 {
        let filled = self.leaf_nodes - self.empty_leaves;
        if filled == 0 {
            0.0
        } else {
            self.leaf_references as f32 / filled as f32
        }
    }

    pub(crate) fn record_leaf(&mut self, primitive_count: usize, depth: u32) {
        self.leaf_nodes += 1;
        if primitive_count == 0 {
            self.empty_leaves += 1;
        }
        self.leaf_references += primitive_count;
        self.deepest_leaf = self.deepest_leaf.max(depth);
        self.largest_leaf = self.largest_leaf.max(primitive_count);
    }
}

impl Display for KdTreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "kd-tree over {} primitives", self.primitives)?;
        writeln!(
            f,
            "  - nodes: {} ({} interior, {} leaves, {} empty)",
            self.node_count(),
            self.interior_nodes,
            self.leaf_nodes,
            self.empty_leaves
        )?;
        writeln!(
            f,
            "  - depth: {} (limit {})",
            self.deepest_leaf, self.max_depth
        )?;
        writeln!(
            f,
            "  - leaf references: {} (avg {:.2}, max {})",
            self.leaf_references,
            self.average_leaf_size(),
            self.largest_leaf
        )?;
        write!(
            f,
            "  - forced leaves: {} depth limited, {} fallback",
            self.depth_limited_leaves, self.fallback_leaves
        )
    }
}
