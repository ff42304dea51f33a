//! Union-find (disjoint set union) over record indices.
//!
//! Identity resolution unions every record sharing a well-formed key, so
//! merges propagate across key schemes: a document-key match followed by a
//! demographic-key match places all three records in one set.

use std::collections::BTreeMap;

/// Disjoint-set forest with path compression and union by rank.
///
/// # Examples
/// ```
/// use lineage_core::DisjointSet;
///
/// let mut set = DisjointSet::new(4);
/// set.union(0, 1);
/// set.union(1, 3);
/// assert_eq!(set.find(3), set.find(0));
/// assert_ne!(set.find(2), set.find(0));
/// assert_eq!(set.groups().len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    /// Creates `n` singleton sets.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Returns the number of elements tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns `true` when the structure tracks no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Returns the representative of `node`, compressing the path walked.
    ///
    /// # Panics
    /// Panics when `node` is out of range.
    pub fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    /// Merges the sets containing `left` and `right` and returns the
    /// representative of the merged set.
    ///
    /// # Panics
    /// Panics when either index is out of range.
    pub fn union(&mut self, left: usize, right: usize) -> usize {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return left;
        }
        let left_rank = self.rank[left];
        let right_rank = self.rank[right];
        if left_rank < right_rank {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        if left_rank == right_rank {
            self.rank[left] = left_rank.saturating_add(1);
        }
        left
    }

    /// Returns the final partition keyed by representative. Members are listed
    /// in ascending order and every element appears in exactly one group.
    #[must_use]
    pub fn groups(&mut self) -> BTreeMap<usize, Vec<usize>> {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for node in 0..self.parent.len() {
            let root = self.find(node);
            groups.entry(root).or_default().push(node);
        }
        groups
    }
}
