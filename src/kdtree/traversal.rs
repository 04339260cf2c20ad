use smallvec::SmallVec;

use crate::{Hit, KdTree, Mailbox, Primitive, Ray, DEFAULT_TODO_CAPACITY};

/// Subtree deferred in favour of a nearer one, with the ray interval inside it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TodoEntry {
    pub node: u32,
    pub t_min: f32,
    pub t_max: f32,
}

/// Bounded stack of deferred subtrees. Storage for the default capacity lives inline.
#[derive(Debug, Clone)]
pub struct TodoStack {
    entries: SmallVec<[TodoEntry; DEFAULT_TODO_CAPACITY]>,
    capacity: usize,
}

impl Default for TodoStack {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TODO_CAPACITY)
    }
}

impl TodoStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SmallVec::with_capacity(capacity),
            capacity,
        }
    }

    /// # Panic
    /// Panics when the stack is full. The tree depth is bounded by the capacity at build time, so
    /// this means the tree is inconsistent.
    #[inline]
    pub fn push(&mut self, entry: TodoEntry) {
        assert!(
            self.entries.len() < self.capacity,
            "kd-tree todo stack overflow ({} entries)",
            self.capacity
        );
        self.entries.push(entry);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<TodoEntry> {
        self.entries.pop()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// What to do with the primitives of a visited leaf
pub(crate) trait LeafQuery<P> {
    /// Stop once the closest hit so far lies before the next node's interval
    const CLOSEST: bool;

    /// Test one primitive. Returning true ends the traversal.
    fn test(&mut self, primitive_index: u32, primitive: &P, ray: &mut Ray) -> bool;
}

#[derive(Debug, Default)]
pub(crate) struct ClosestHit {
    pub hit: Option<Hit>,
}

impl<P: Primitive> LeafQuery<P> for ClosestHit {
    const CLOSEST: bool = true;

    #[inline]
    fn test(&mut self, primitive_index: u32, primitive: &P, ray: &mut Ray) -> bool {
        if let Some(intersection) = primitive.intersect(ray) {
            self.hit = Some(Hit {
                intersection,
                primitive: primitive_index,
            });
        }
        false
    }
}

#[derive(Debug, Default)]
pub(crate) struct AnyHit {
    pub found: bool,
}

impl<P: Primitive> LeafQuery<P> for AnyHit {
    const CLOSEST: bool = false;

    #[inline]
    fn test(&mut self, _: u32, primitive: &P, ray: &mut Ray) -> bool {
        self.found = primitive.intersect_p(ray);
        self.found
    }
}

impl<P: Primitive> KdTree<P> {
    /// Front to back traversal shared by closest hit and occlusion queries
    pub(crate) fn traverse<M, Q>(&self, ray: &mut Ray, mailbox: &mut M, query: &mut Q)
    where
        M: Mailbox,
        Q: LeafQuery<P>,
    {
        let Some((mut t_min, mut t_max)) = self.bounds.ray_intersect(ray) else {
            return;
        };

        mailbox.begin_query();
        let inv_dir = ray.inv_direction();
        let mut todo = TodoStack::with_capacity(self.todo_capacity);
        let mut node_num = 0_u32;

        loop {
            // a closer hit is already known, nothing behind `t_min` can beat it
            let skip = Q::CLOSEST && ray.t_max < t_min;

            if !skip {
                let node = self.pool.node(node_num);
                if !node.is_leaf() {
                    let axis = node.split_axis();
                    let split = node.split_position();
                    let origin = ray.origin[axis];
                    let t_plane = (split - origin) * inv_dir[axis];

                    // on the plane the direction decides which side comes first
                    let below_first =
                        origin < split || (origin == split && ray.direction[axis] <= 0.0);
                    let (first, second) = if below_first {
                        (node_num + 1, node.above_child())
                    } else {
                        (node.above_child(), node_num + 1)
                    };

                    if t_plane.is_nan() {
                        // the ray runs inside the split plane and touches both children
                        // over the whole interval
                        todo.push(TodoEntry {
                            node: second,
                            t_min,
                            t_max,
                        });
                        node_num = first;
                    } else if t_plane > t_max || t_plane <= 0.0 {
                        node_num = first;
                    } else if t_plane < t_min {
                        node_num = second;
                    } else {
                        todo.push(TodoEntry {
                            node: second,
                            t_min: t_plane,
                            t_max,
                        });
                        node_num = first;
                        t_max = t_plane;
                    }
                    continue;
                }

                for &prim in self.pool.leaf_primitives(node) {
                    if mailbox.already_tested(prim) {
                        continue;
                    }
                    mailbox.mark_tested(prim);
                    if query.test(prim, &self.primitives[prim as usize], ray) {
                        return;
                    }
                }
            }

            // entries are not strictly ordered once a ray ran inside a split plane, so a
            // skipped node does not end the traversal
            match todo.pop() {
                Some(entry) => {
                    node_num = entry.node;
                    t_min = entry.t_min;
                    t_max = entry.t_max;
                }
                None => break,
            }
        }
    }
}
