//! Redundant test avoidance for primitives referenced by more than one leaf.
//!
//! A mailbox remembers which primitives were already tested during one traversal so that a
//! primitive straddling several leaves is tested at most once per query. A mailbox is mutable
//! per-query state: every traversal borrows one exclusively, which keeps the shared tree free of
//! any mutable state.

/// Default number of slots of a [`RingMailbox`]
pub const DEFAULT_MAILBOX_SLOTS: usize = 8;

pub trait Mailbox {
    /// Called once at the start of every traversal
    fn begin_query(&mut self) {}

    /// True if `primitive` was tested since the last `begin_query`. May return false for a
    /// tested primitive (costs one extra test), never true for an untested one.
    fn already_tested(&self, primitive: u32) -> bool;

    fn mark_tested(&mut self, primitive: u32);
}

/// Fixed size ring buffer of the most recently tested primitives. Once full the oldest entry
/// is overwritten.
#[derive(Debug, Clone, Copy)]
pub struct RingMailbox<const SLOTS: usize = DEFAULT_MAILBOX_SLOTS> {
    slots: [u32; SLOTS],
    len: usize,
    next: usize,
}

impl<const SLOTS: usize> Default for RingMailbox<SLOTS> {
    fn default() -> Self {
        Self {
            slots: [0; SLOTS],
            len: 0,
            next: 0,
        }
    }
}

impl<const SLOTS: usize> RingMailbox<SLOTS> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const SLOTS: usize> Mailbox for RingMailbox<SLOTS> {
    #[inline]
    fn begin_query(&mut self) {
        self.len = 0;
        self.next = 0;
    }

    #[inline]
    fn already_tested(&self, primitive: u32) -> bool {
        self.slots[..self.len].contains(&primitive)
    }

    #[inline]
    fn mark_tested(&mut self, primitive: u32) {
        if SLOTS == 0 {
            return;
        }
        self.slots[self.next] = primitive;
        self.next += 1;
        if self.next == SLOTS {
            self.next = 0;
        }
        self.len = (self.len + 1).min(SLOTS);
    }
}

/// Never remembers anything: every reference is tested
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMailbox;

impl Mailbox for NoMailbox {
    #[inline]
    fn already_tested(&self, _: u32) -> bool {
        false
    }

    #[inline]
    fn mark_tested(&mut self, _: u32) {}
}

/// Exact mailbox with one "last query id" per primitive.
///
/// Checks are O(1) and never miss a duplicate, but the table is as large as the primitive list.
/// Meant to be created once per rendering thread and reused for all of its queries; it can not
/// be shared between concurrent traversals since every query needs it mutably.
#[derive(Debug, Clone, Default)]
pub struct CounterMailbox {
    last_query: Vec<u32>,
    query_id: u32,
}

impl CounterMailbox {
    pub fn new(primitive_count: usize) -> Self {
        Self {
            last_query: vec![0; primitive_count],
            query_id: 0,
        }
    }

    #[inline]
    pub fn query_id(&self) -> u32 {
        self.query_id
    }
}

impl Mailbox for CounterMailbox {
    #[inline]
    fn begin_query(&mut self) {
        self.query_id = self.query_id.wrapping_add(1);
        if self.query_id == 0 {
            // ids wrapped around, stale entries could alias the new ids
            self.last_query.fill(0);
            self.query_id = 1;
        }
    }

    #[inline]
    fn already_tested(&self, primitive: u32) -> bool {
        self.query_id != 0 && self.last_query.get(primitive as usize) == Some(&self.query_id)
    }

    #[inline]
    fn mark_tested(&mut self, primitive: u32) {
        if let Some(last) = self.last_query.get_mut(primitive as usize) {
            *last = self.query_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{CounterMailbox, Mailbox, NoMailbox, RingMailbox};

    #[test]
    fn ring_remembers_recent_primitives() {
        let mut mailbox = RingMailbox::<8>::new();
        mailbox.begin_query();

        assert!(!mailbox.already_tested(3));
        mailbox.mark_tested(3);
        assert!(mailbox.already_tested(3));
        assert!(!mailbox.already_tested(4));
        assert_eq!(mailbox.len(), 1);
    }

    #[test]
    fn ring_overwrites_oldest_when_full() {
        let mut mailbox = RingMailbox::<4>::new();
        mailbox.begin_query();

        for prim in 0..5 {
            mailbox.mark_tested(prim);
        }

        assert_eq!(mailbox.len(), 4);
        assert!(!mailbox.already_tested(0));
        for prim in 1..5 {
            assert!(mailbox.already_tested(prim));
        }
    }

    #[test]
    fn ring_forgets_between_queries() {
        let mut mailbox = RingMailbox::<8>::new();
        mailbox.begin_query();
        mailbox.mark_tested(7);

        mailbox.begin_query();
        assert!(mailbox.is_empty());
        assert!(!mailbox.already_tested(7));
    }

    #[test]
    fn ring_default_zero_slots_are_not_tested() {
        // slots start zeroed, primitive 0 must still read as untested
        let mailbox = RingMailbox::<8>::new();
        assert!(!mailbox.already_tested(0));
    }

    #[test]
    fn ring_without_slots_never_remembers() {
        let mut mailbox = RingMailbox::<0>::new();
        mailbox.begin_query();
        mailbox.mark_tested(1);
        assert!(!mailbox.already_tested(1));
    }

    #[test]
    fn no_mailbox_never_remembers() {
        let mut mailbox = NoMailbox;
        mailbox.begin_query();
        mailbox.mark_tested(1);
        assert!(!mailbox.already_tested(1));
    }

    #[test]
    fn counter_is_exact_within_a_query() {
        let mut mailbox = CounterMailbox::new(100);
        mailbox.begin_query();

        for prim in (0..100).step_by(3) {
            mailbox.mark_tested(prim);
        }
        for prim in 0..100 {
            assert_eq!(mailbox.already_tested(prim), prim % 3 == 0);
        }

        mailbox.begin_query();
        assert!((0..100).all(|prim| !mailbox.already_tested(prim)));
        assert_eq!(mailbox.query_id(), 2);
    }

    #[test]
    fn counter_survives_id_wrap() {
        let mut mailbox = CounterMailbox::new(4);
        mailbox.begin_query();
        mailbox.mark_tested(2);

        // jump to the last id before the wrap
        mailbox.query_id = u32::MAX;
        mailbox.mark_tested(1);
        mailbox.begin_query();

        assert_eq!(mailbox.query_id(), 1);
        assert!(!mailbox.already_tested(1));
        assert!(!mailbox.already_tested(2));
    }
}
