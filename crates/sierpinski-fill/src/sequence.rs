//! The ordered list of cells the curve currently passes through.
//!
//! The sequence is a doubly linked list over [`CellId`]s, with the links
//! stored in a table parallel to the [`Tree`] arena. Replacing a unit by its
//! children only touches the links of the cells involved, so ids stay valid
//! while other cells are being refined, and a removed cell can be detected
//! with [`Sequence::contains`].

use crate::{cell::CellId, tree::Tree};

/// Neighbors of a cell in the sequence.
#[derive(Clone, Copy, Debug, Default)]
struct Link {
    /// The previous cell along the curve.
    prev: Option<CellId>,
    /// The next cell along the curve.
    next: Option<CellId>,
    /// Whether the cell is currently part of the sequence.
    live: bool,
}

/// Ordered frontier of the subdivision tree.
#[derive(Clone, Debug)]
pub struct Sequence {
    /// One entry per cell of the arena.
    links: Vec<Link>,
    /// First cell along the curve.
    head: CellId,
    /// Last cell along the curve.
    tail: CellId,
    /// Number of live cells.
    len: usize,
}

impl Sequence {
    /// The initial sequence: the two roots of `tree`.
    pub fn new(tree: &Tree) -> Self {
        let [first, second] = tree.roots();
        let mut links = vec![Link::default(); tree.len()];
        links[first.index()] = Link {
            prev: None,
            next: Some(second),
            live: true,
        };
        links[second.index()] = Link {
            prev: Some(first),
            next: None,
            live: true,
        };
        Self {
            links,
            head: first,
            tail: second,
            len: 2,
        }
    }

    /// First cell along the curve.
    pub fn first(&self) -> CellId {
        self.head
    }

    /// Last cell along the curve.
    pub fn last(&self) -> CellId {
        self.tail
    }

    /// The cell after `id`, if any.
    pub fn next(&self, id: CellId) -> Option<CellId> {
        self.links[id.index()].next
    }

    /// The cell before `id`, if any.
    pub fn prev(&self, id: CellId) -> Option<CellId> {
        self.links[id.index()].prev
    }

    /// Whether `id` is currently part of the sequence.
    pub fn contains(&self, id: CellId) -> bool {
        self.links[id.index()].live
    }

    /// Number of cells in the sequence.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence is empty. Never true for a built sequence.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over the cells in curve order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            sequence: self,
            cursor: Some(self.head),
        }
    }

    /// Replace the consecutive cells `old` by `new`, keeping the order of
    /// both. Does nothing if either slice is empty.
    pub fn replace(&mut self, old: &[CellId], new: &[CellId]) {
        let (Some(&old_first), Some(&old_last), Some(&new_first), Some(&new_last)) =
            (old.first(), old.last(), new.first(), new.last())
        else {
            return;
        };
        debug_assert!(
            old.windows(2).all(|w| self.next(w[0]) == Some(w[1])),
            "replaced cells must be consecutive"
        );

        let before = self.prev(old_first);
        let after = self.next(old_last);
        for &id in old {
            self.links[id.index()] = Link::default();
        }

        let mut prev = before;
        for &id in new {
            let link = &mut self.links[id.index()];
            link.prev = prev;
            link.live = true;
            if let Some(p) = prev {
                self.links[p.index()].next = Some(id);
            }
            prev = Some(id);
        }
        self.links[new_last.index()].next = after;

        match after {
            Some(a) => self.links[a.index()].prev = Some(new_last),
            None => self.tail = new_last,
        }
        if before.is_none() {
            self.head = new_first;
        }
        self.len = self.len + new.len() - old.len();
    }

    /// Live cells grouped by depth, shallowest first, each group in curve
    /// order.
    pub fn by_depth(&self, tree: &Tree) -> Vec<Vec<CellId>> {
        let mut levels = vec![Vec::new(); tree.max_depth() as usize + 1];
        for id in self.iter() {
            levels[tree[id].depth as usize].push(id);
        }
        levels
    }
}

/// Iterator over a [`Sequence`] in curve order.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    /// The sequence being walked.
    sequence: &'a Sequence,
    /// The next cell to yield.
    cursor: Option<CellId>,
}

impl Iterator for Iter<'_> {
    type Item = CellId;

    fn next(&mut self) -> Option<CellId> {
        let id = self.cursor?;
        self.cursor = self.sequence.next(id);
        Some(id)
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = CellId;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
