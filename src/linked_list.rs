use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr::NonNull;

use log::{debug, trace};
use static_assertions::assert_not_impl_any;

use crate::error::{InvariantError, Result};
use crate::node::Node;

assert_not_impl_any!(List<u32>: Send, Sync);

// Never empty: `head` and `tail` always point at live nodes allocated by `alloc`
// and freed only through `release`.
pub struct List<T> {
    head: NonNull<Node<T>>,
    tail: NonNull<Node<T>>,
    size: usize,
    marker: PhantomData<Box<Node<T>>>,
}

#[derive(Debug)]
pub enum Deletion<T> {
    Shrunk { list: List<T>, payload: T },
    // The removed node was the last one, so the list is gone.
    Emptied(T),
}

impl<T> Deletion<T> {
    pub fn payload(&self) -> &T {
        match self {
            Deletion::Shrunk { payload, .. } => payload,
            Deletion::Emptied(payload) => payload,
        }
    }

    pub fn into_payload(self) -> T {
        match self {
            Deletion::Shrunk { payload, .. } => payload,
            Deletion::Emptied(payload) => payload,
        }
    }

    pub fn into_list(self) -> Option<List<T>> {
        match self {
            Deletion::Shrunk { list, .. } => Some(list),
            Deletion::Emptied(_) => None,
        }
    }

    pub fn is_emptied(&self) -> bool {
        matches!(self, Deletion::Emptied(_))
    }
}

impl<T> List<T> {
    pub fn new(seed: Node<T>) -> Self {
        let head = Self::alloc(seed);
        List {
            head,
            tail: head,
            size: 1,
            marker: PhantomData,
        }
    }

    pub fn with_payload(payload: T) -> Self {
        Self::new(Node::new(payload))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn last_index(&self) -> usize {
        self.size - 1
    }

    pub fn head(&self) -> &Node<T> {
        // SAFETY: head points at a live node owned by this list; the reference
        // lifetime is tied to &self.
        unsafe { self.head.as_ref() }
    }

    pub fn tail(&self) -> &Node<T> {
        // SAFETY: tail points at a live node owned by this list; the reference
        // lifetime is tied to &self.
        unsafe { self.tail.as_ref() }
    }

    pub fn front(&self) -> &T {
        self.head().payload()
    }

    pub fn back(&self) -> &T {
        self.tail().payload()
    }

    pub fn push_front(&mut self, payload: T) {
        self.insert(0, payload);
    }

    pub fn push_back(&mut self, payload: T) {
        self.insert(self.size, payload);
    }

    // Index 0 becomes the new head, anything at or past the last index becomes
    // the new tail, and otherwise the node takes `index` and the rest shift back.
    pub fn insert(&mut self, index: usize, node: impl Into<Node<T>>) {
        let node = Self::alloc(node.into());

        if index == 0 {
            // SAFETY: `node` was just allocated and nothing else refers to it.
            unsafe {
                (*node.as_ptr()).next = Some(self.head);
            }
            self.head = node;
            self.size += 1;
            return;
        }

        let last = self.last_index();
        if index >= last {
            if index > last + 1 {
                trace!("insert index {} clamped to {}", index, last + 1);
            }
            // SAFETY: tail is live, and `&mut self` means no reference into the
            // chain is alive.
            unsafe {
                (*self.tail.as_ptr()).next = Some(node);
            }
            self.tail = node;
            self.size += 1;
            return;
        }

        let prev = self.node_at(index - 1);
        // SAFETY: `prev` is live, `node` is fresh, and `&mut self` means no
        // reference into the chain is alive.
        unsafe {
            (*node.as_ptr()).next = (*prev.as_ptr()).next;
            (*prev.as_ptr()).next = Some(node);
            // Defensive append: unreachable while `size` matches the chain.
            if (*node.as_ptr()).next.is_none() {
                self.tail = node;
            }
        }
        self.size += 1;
        trace!("spliced node at index {} of {}", index, self.size);
    }

    pub fn read(&self, index: usize) -> &T {
        // SAFETY: `clamped` returns a live node owned by this list; the
        // reference lifetime is tied to &self.
        unsafe { &self.clamped(index).as_ref().payload }
    }

    pub fn read_mut(&mut self, index: usize) -> &mut T {
        // SAFETY: as for `read`, and `&mut self` makes this the only reference.
        unsafe { &mut (*self.clamped(index).as_ptr()).payload }
    }

    // Takes `self` because removing the only node ends the list.
    pub fn delete(self, index: usize) -> Deletion<T> {
        let mut list = self;
        let last = list.last_index();
        if index > last {
            trace!("delete index {} clamped to {}", index, last);
        }

        // SAFETY: head is live.
        let Some(second) = (unsafe { list.head.as_ref().next }) else {
            let list = ManuallyDrop::new(list);
            // SAFETY: `list` is never dropped, so its only node is freed here once.
            let payload = unsafe { Self::release(list.head) };
            return Deletion::Emptied(payload);
        };

        let removed = if index == 0 {
            let old_head = list.head;
            list.head = second;
            old_head
        } else {
            let mut prev = list.head;
            let mut removed = second;
            for _ in 1..index {
                // SAFETY: every linked pointer refers to a live node of this list.
                match unsafe { removed.as_ref().next } {
                    Some(next) => {
                        prev = removed;
                        removed = next;
                    }
                    None => break,
                }
            }
            // SAFETY: `prev` and `removed` are live and adjacent, and the list is
            // owned here, so nothing else refers to them.
            unsafe {
                (*prev.as_ptr()).next = removed.as_ref().next;
            }
            if removed == list.tail {
                list.tail = prev;
            }
            removed
        };

        list.size -= 1;
        trace!("removed node at index {}, {} left", index.min(last), list.size);
        // SAFETY: `removed` is no longer reachable from the list.
        let payload = unsafe { Self::release(removed) };
        Deletion::Shrunk { list, payload }
    }

    pub fn teardown(self) -> usize {
        let mut list = self;
        let mut released = 0;
        loop {
            released += 1;
            match list.delete(0) {
                Deletion::Shrunk { list: rest, .. } => list = rest,
                Deletion::Emptied(_) => break,
            }
        }
        debug!("teardown released {} nodes", released);
        released
    }

    pub fn validate(&self) -> Result<()> {
        let mut reachable = 1;
        let mut current = self.head;
        // SAFETY: every linked pointer refers to a live node of this list.
        while let Some(next) = unsafe { current.as_ref().next } {
            current = next;
            reachable += 1;
        }

        if reachable != self.size {
            return Err(InvariantError::LengthMismatch {
                recorded: self.size,
                reachable,
            });
        }
        if current != self.tail {
            return Err(InvariantError::TailMismatch {
                position: reachable - 1,
            });
        }
        Ok(())
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            current: Some(self.head),
            marker: PhantomData,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            current: Some(self.head),
            marker: PhantomData,
        }
    }

    fn alloc(mut node: Node<T>) -> NonNull<Node<T>> {
        node.next = None;
        NonNull::from(Box::leak(Box::new(node)))
    }

    // SAFETY: `node` must come from `alloc`, be unreachable from any list, and
    // not be used afterwards.
    unsafe fn release(node: NonNull<Node<T>>) -> T {
        Box::from_raw(node.as_ptr()).into_payload()
    }

    fn clamped(&self, index: usize) -> NonNull<Node<T>> {
        let last = self.last_index();
        if index >= last {
            if index > last {
                trace!("index {} clamped to {}", index, last);
            }
            return self.tail;
        }
        self.node_at(index)
    }

    // Stops at the end of the chain if it is shorter than `index`.
    fn node_at(&self, index: usize) -> NonNull<Node<T>> {
        let mut current = self.head;
        for _ in 0..index {
            // SAFETY: every linked pointer refers to a live node of this list.
            match unsafe { current.as_ref().next } {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        let mut current = Some(self.head);
        while let Some(node) = current {
            // SAFETY: each node is reached once, read, then freed once.
            unsafe {
                current = node.as_ref().next;
                Self::release(node);
            }
        }
    }
}

impl<T: Clone> Clone for List<T> {
    fn clone(&self) -> Self {
        let mut new_list = List::with_payload(self.front().clone());
        new_list.extend(self.iter().skip(1).cloned());
        new_list
    }
}

impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for payload in iter {
            self.push_back(payload);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for List<T> {}

pub struct Iter<'a, T> {
    current: Option<NonNull<Node<T>>>,
    marker: PhantomData<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.current.map(|node| {
            // SAFETY: the list is borrowed for 'a, so its nodes stay alive.
            let node: &'a Node<T> = unsafe { &*node.as_ptr() };
            self.current = node.next;
            &node.payload
        })
    }
}

pub struct IterMut<'a, T> {
    current: Option<NonNull<Node<T>>>,
    marker: PhantomData<&'a mut Node<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        self.current.map(|node| {
            // SAFETY: the list is mutably borrowed for 'a and each node is
            // handed out once.
            let node: &'a mut Node<T> = unsafe { &mut *node.as_ptr() };
            self.current = node.next;
            &mut node.payload
        })
    }
}

pub struct IntoIter<T> {
    list: Option<List<T>>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.take().map(|list| match list.delete(0) {
            Deletion::Shrunk { list, payload } => {
                self.list = Some(list);
                payload
            }
            Deletion::Emptied(payload) => payload,
        })
    }
}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: Some(self) }
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut List<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
