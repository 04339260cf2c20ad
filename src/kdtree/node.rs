use bytemuck::{Pod, Zeroable};

use crate::Axis;

/// Initial number of node slots of a [`NodePool`]
pub const INITIAL_NODE_CAPACITY: usize = 512;

const LEAF_FLAG: u32 = 3;
const FLAG_BITS: u32 = 2;
const FLAG_MASK: u32 = (1 << FLAG_BITS) - 1;

/// Largest value that fits next to the flag bits (child index or primitive count)
pub const MAX_NODE_FIELD: u32 = u32::MAX >> FLAG_BITS;

/// Kd-tree node packed into 8 bytes.
///
/// The two low bits of `flags` hold the split axis (0, 1, 2) of an interior node or 3 for a
/// leaf, the remaining bits hold the above child index (interior) or the primitive count (leaf).
/// `payload` is the split position of an interior node, the only primitive of a leaf with one
/// primitive or the offset into the leaf reference arena for larger leaves.
///
/// The below child of an interior node is always the next node in the array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct KdNode {
    flags: u32,
    payload: u32,
}

/// Decoded view of a [`KdNode`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Interior {
        axis: Axis,
        split: f32,
        above_child: u32,
    },
    Leaf {
        primitive_count: u32,
    },
}

impl KdNode {
    /// Interior node. The above child is set with [`KdNode::set_above_child`] once the below
    /// subtree is built.
    #[inline]
    pub fn interior(axis: Axis, split: f32) -> Self {
        Self {
            flags: axis as u32,
            payload: split.to_bits(),
        }
    }

    /// Leaf node. `payload` is the only primitive (count 1), the arena offset (count > 1) or
    /// ignored (count 0).
    #[inline]
    pub fn leaf(primitive_count: u32, payload: u32) -> Self {
        assert!(
            primitive_count <= MAX_NODE_FIELD,
            "Too many primitives in one leaf"
        );
        Self {
            flags: LEAF_FLAG | (primitive_count << FLAG_BITS),
            payload: if primitive_count == 0 { 0 } else { payload },
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.flags & FLAG_MASK == LEAF_FLAG
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        if self.is_leaf() {
            NodeKind::Leaf {
                primitive_count: self.primitive_count(),
            }
        } else {
            NodeKind::Interior {
                axis: self.split_axis(),
                split: self.split_position(),
                above_child: self.above_child(),
            }
        }
    }

    #[inline]
    pub fn primitive_count(&self) -> u32 {
        assert!(self.is_leaf(), "Only valid for leaves");
        self.flags >> FLAG_BITS
    }

    #[inline]
    pub fn split_axis(&self) -> Axis {
        assert!(!self.is_leaf(), "Not valid for leaves");
        let Some(axis) = Axis::from_index(self.flags & FLAG_MASK) else {
            unreachable!("interior node carries the leaf flag");
        };
        axis
    }

    #[inline]
    pub fn split_position(&self) -> f32 {
        assert!(!self.is_leaf(), "Not valid for leaves");
        f32::from_bits(self.payload)
    }

    #[inline]
    pub fn above_child(&self) -> u32 {
        assert!(!self.is_leaf(), "Not valid for leaves");
        self.flags >> FLAG_BITS
    }

    #[inline]
    pub fn set_above_child(&mut self, above_child: u32) {
        assert!(!self.is_leaf(), "Not valid for leaves");
        assert!(above_child <= MAX_NODE_FIELD, "Too many nodes");
        self.flags = (self.flags & FLAG_MASK) | (above_child << FLAG_BITS);
    }

    /// Raw payload word of a leaf (inline primitive or arena offset)
    #[inline]
    fn leaf_payload(&self) -> &u32 {
        &self.payload
    }
}

/// Growable node array plus the arena holding the primitive lists of leaves with more than one
/// primitive. Nodes are only ever appended; the pool is dropped as a whole.
#[derive(Debug, Clone, Default)]
pub struct NodePool {
    nodes: Vec<KdNode>,
    leaf_refs: Vec<u32>,
}

impl NodePool {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(INITIAL_NODE_CAPACITY),
            leaf_refs: Vec::new(),
        }
    }

    /// Index the next appended node will get
    #[inline]
    pub fn next_free(&self) -> u32 {
        self.nodes.len() as u32
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Append `node`, which must end up at index `node_num`.
    ///
    /// # Panic
    /// Panics if `node_num` is not the next free slot
    pub fn push(&mut self, node_num: u32, node: KdNode) {
        assert_eq!(
            node_num,
            self.next_free(),
            "Nodes must be initialized in build order"
        );
        assert!(node_num <= MAX_NODE_FIELD, "Too many nodes");

        if self.nodes.len() == self.nodes.capacity() {
            let additional = self.nodes.capacity().max(INITIAL_NODE_CAPACITY);
            self.nodes.reserve_exact(additional);
        }
        self.nodes.push(node);
    }

    /// Append a leaf for `primitives` at `node_num`
    pub fn push_leaf(&mut self, node_num: u32, primitives: &[u32]) {
        let count = primitives.len() as u32;
        let payload = match primitives {
            [] => 0,
            [only] => *only,
            _ => {
                let offset = self.leaf_refs.len() as u32;
                self.leaf_refs.extend_from_slice(primitives);
                offset
            }
        };
        self.push(node_num, KdNode::leaf(count, payload));
    }

    /// Link an interior node to its above child.
    ///
    /// # Panic
    /// Panics if `above_child` is not the next free slot, the above subtree has to be built right
    /// after the below subtree.
    pub fn link_above_child(&mut self, node_num: u32, above_child: u32) {
        assert_eq!(
            above_child,
            self.next_free(),
            "The above child must be the next free slot"
        );
        self.nodes[node_num as usize].set_above_child(above_child);
    }

    #[inline]
    pub fn node(&self, node_num: u32) -> &KdNode {
        &self.nodes[node_num as usize]
    }

    #[inline]
    pub fn nodes(&self) -> &[KdNode] {
        &self.nodes
    }

    /// Primitive indices referenced by a leaf of this pool
    #[inline]
    pub fn leaf_primitives<'a>(&'a self, node: &'a KdNode) -> &'a [u32] {
        match node.primitive_count() {
            0 => &[],
            1 => std::slice::from_ref(node.leaf_payload()),
            count => {
                let offset = *node.leaf_payload() as usize;
                &self.leaf_refs[offset..offset + count as usize]
            }
        }
    }

    /// Total number of entries in the leaf reference arena
    #[inline]
    pub fn arena_len(&self) -> usize {
        self.leaf_refs.len()
    }

    /// Raw bytes of the node array
    #[inline]
    pub fn node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }
}
