use std::fmt;
use std::mem;
use std::ptr::NonNull;

use static_assertions::assert_eq_size;

pub(crate) type Link<T> = Option<NonNull<Node<T>>>;

// The forward link costs one pointer; `None` lives in the null niche.
assert_eq_size!(Link<u8>, usize);
assert_eq_size!(Link<[u64; 4]>, usize);

// A node outside a `List` never has a successor; inside one, `next` is owned by
// the list, not by the node.
pub struct Node<T> {
    pub(crate) payload: T,
    pub(crate) next: Link<T>,
}

impl<T> Node<T> {
    pub fn new(payload: T) -> Self {
        Node { payload, next: None }
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    pub fn next(&self) -> Option<&Node<T>> {
        // SAFETY: only a list sets `next`, and it points at a live node of that
        // same list, which is borrowed for as long as `self` is.
        self.next.map(|next| unsafe { &*next.as_ptr() })
    }

    pub fn payload_size(&self) -> usize {
        mem::size_of::<T>()
    }

    // Whole allocation: payload, link and padding.
    pub fn footprint(&self) -> usize {
        mem::size_of::<Self>()
    }

    pub fn overhead(&self) -> usize {
        self.footprint() - self.payload_size()
    }
}

impl<T: Default> Default for Node<T> {
    fn default() -> Self {
        Node::new(T::default())
    }
}

impl<T> From<T> for Node<T> {
    fn from(payload: T) -> Self {
        Node::new(payload)
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("payload", &self.payload)
            .field("linked", &self.next.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::alloc::Layout;

    #[test]
    fn new_node_has_no_successor() {
        let node = Node::new(7u32);
        assert!(node.next().is_none());
        assert_eq!(*node.payload(), 7);
    }

    #[test]
    fn default_node_payload_written_after_creation() {
        let mut node: Node<i32> = Node::default();
        assert_eq!(*node.payload(), 0);

        *node.payload_mut() = 50;
        assert_eq!(*node.payload(), 50);
    }

    #[test]
    fn into_payload_returns_value() {
        let node = Node::from(String::from("hello"));
        assert_eq!(node.into_payload(), "hello");
    }

    #[test]
    fn payload_size_matches_payload_type() {
        assert_eq!(Node::new(0u8).payload_size(), 1);
        assert_eq!(Node::new(0i32).payload_size(), 4);
        assert_eq!(Node::new([0u8; 3]).payload_size(), 3);
        assert_eq!(Node::new(0u128).payload_size(), 16);
    }

    #[test]
    fn footprint_is_payload_plus_overhead() {
        let node = Node::new([1u8; 3]);
        assert_eq!(node.footprint(), node.payload_size() + node.overhead());

        let node = Node::new(1u64);
        assert_eq!(node.footprint(), node.payload_size() + node.overhead());
    }

    #[test]
    fn footprint_matches_allocation_size() {
        let boxed = Box::new(Node::new(42u64));
        assert_eq!(Layout::for_value(&*boxed).size(), boxed.footprint());

        let boxed = Box::new(Node::new([9u8; 5]));
        assert_eq!(Layout::for_value(&*boxed).size(), boxed.footprint());
    }

    #[test]
    fn overhead_covers_forward_link() {
        assert!(Node::new(0u8).overhead() >= mem::size_of::<usize>());
        assert_eq!(Node::new(0usize).overhead(), mem::size_of::<usize>());
    }

    #[test]
    fn zero_sized_payload() {
        let node = Node::new(());
        assert_eq!(node.payload_size(), 0);
        assert_eq!(node.overhead(), node.footprint());
    }

    #[test]
    fn debug_shows_payload() {
        let node = Node::new(3);
        assert_eq!(format!("{:?}", node), "Node { payload: 3, linked: false }");
    }
}
