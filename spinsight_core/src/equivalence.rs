use std::collections::HashMap;

/// Equivalence classes of channel names (union-find).
///
/// The same logical channel may be named differently by different processes.
/// Names are interned on first union; a name never united with another
/// is only equivalent to itself.
#[derive(Debug, Clone, Default)]
pub struct ChannelEquivalence {
    ids: HashMap<String, usize>,
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl ChannelEquivalence {
    /// Creates an empty [`ChannelEquivalence`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`ChannelEquivalence`] where each pair of names is already united.
    pub fn with_seeds<I, A, B>(seeds: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut equivalence = Self::new();
        for (a, b) in seeds {
            equivalence.union(a.as_ref(), b.as_ref());
        }
        equivalence
    }

    fn intern(&mut self, name: &str) -> usize {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.parent.len();
        self.ids.insert(name.to_owned(), id);
        self.parent.push(id);
        self.rank.push(0);
        id
    }

    fn root(&mut self, id: usize) -> usize {
        let mut root = id;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut node = id;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Unites the classes of `a` and `b`.
    /// Returns `false` if they were already equivalent.
    pub fn union(&mut self, a: &str, b: &str) -> bool {
        let a = self.intern(a);
        let b = self.intern(b);
        let ra = self.root(a);
        let rb = self.root(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }

    /// Tells whether `a` and `b` name the same channel.
    pub fn equivalent(&mut self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        match (self.ids.get(a).copied(), self.ids.get(b).copied()) {
            (Some(a), Some(b)) => self.root(a) == self.root(b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_is_transitive() {
        let mut eq = ChannelEquivalence::new();
        assert!(eq.union("4", "me"));
        assert!(eq.union("me", "you"));
        assert!(!eq.union("you", "4"));
        assert!(eq.equivalent("4", "you"));
        assert!(!eq.equivalent("4", "f"));
    }

    #[test]
    fn unknown_names_are_self_equivalent() {
        let mut eq = ChannelEquivalence::with_seeds([("4", "me")]);
        assert!(eq.equivalent("f", "f"));
        assert!(!eq.equivalent("f", "g"));
        assert!(eq.equivalent("me", "4"));
    }
}
