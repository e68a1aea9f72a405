//! Dependency tracking for formula calculation
//!
//! A [`DependencyGraph`] is a set of ordered pairs `(s, t)` of string
//! identifiers meaning "`t` depends on `s`": `t` is a *dependent* of `s`, and
//! `s` is a *dependee* of `t`. The graph knows nothing about formulas or cells;
//! callers decide what the identifiers mean.
//!
//! Both directions are indexed, so every lookup is a hash probe.

use ahash::{AHashMap, AHashSet};
use std::collections::BTreeSet;

/// Dependency graph over string identifiers
///
/// Cloning produces a fully independent copy, which is how callers take a
/// snapshot before a mutation they may need to roll back.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// s → every t such that (s, t) is in the graph
    dependents: AHashMap<String, AHashSet<String>>,
    /// t → every s such that (s, t) is in the graph
    dependees: AHashMap<String, AHashSet<String>>,
    /// Number of distinct pairs
    size: usize,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (s, t) pairs in the graph
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the graph has no pairs
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Whether (s, t) is in the graph
    pub fn contains(&self, s: &str, t: &str) -> bool {
        self.dependents.get(s).is_some_and(|set| set.contains(t))
    }

    /// Whether `s` has at least one dependent
    pub fn has_dependents(&self, s: &str) -> bool {
        self.dependents.get(s).is_some_and(|set| !set.is_empty())
    }

    /// Whether `t` has at least one dependee
    pub fn has_dependees(&self, t: &str) -> bool {
        self.dependees.get(t).is_some_and(|set| !set.is_empty())
    }

    /// Copy of the dependents of `s` (empty if `s` is unknown)
    pub fn dependents(&self, s: &str) -> BTreeSet<String> {
        self.iter_dependents(s).map(str::to_string).collect()
    }

    /// Copy of the dependees of `t` (empty if `t` is unknown)
    pub fn dependees(&self, t: &str) -> BTreeSet<String> {
        self.iter_dependees(t).map(str::to_string).collect()
    }

    /// Borrowing iterator over the dependents of `s`, in no particular order
    pub fn iter_dependents<'a>(&'a self, s: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.dependents
            .get(s)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Borrowing iterator over the dependees of `t`, in no particular order
    pub fn iter_dependees<'a>(&'a self, t: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.dependees
            .get(t)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Add the pair (s, t): `t` depends on `s`
    ///
    /// Adding a pair that is already present does nothing.
    pub fn add_dependency(&mut self, s: &str, t: &str) {
        let inserted = self
            .dependents
            .entry(s.to_string())
            .or_default()
            .insert(t.to_string());
        if inserted {
            self.dependees
                .entry(t.to_string())
                .or_default()
                .insert(s.to_string());
            self.size += 1;
        }
    }

    /// Remove the pair (s, t) if present
    pub fn remove_dependency(&mut self, s: &str, t: &str) {
        let removed = remove_from_bucket(&mut self.dependents, s, t);
        if removed {
            remove_from_bucket(&mut self.dependees, t, s);
            self.size -= 1;
        }
    }

    /// Replace every (s, r) pair with (s, t) for each `t` in `new_dependents`
    pub fn replace_dependents<I, S>(&mut self, s: &str, new_dependents: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for r in self.dependents(s) {
            self.remove_dependency(s, &r);
        }
        for t in new_dependents {
            self.add_dependency(s, t.as_ref());
        }
    }

    /// Replace every (r, t) pair with (s, t) for each `s` in `new_dependees`
    pub fn replace_dependees<I, S>(&mut self, t: &str, new_dependees: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for r in self.dependees(t) {
            self.remove_dependency(&r, t);
        }
        for s in new_dependees {
            self.add_dependency(s.as_ref(), t);
        }
    }
}

/// Remove `value` from the bucket at `key`, dropping the bucket once empty
fn remove_from_bucket(index: &mut AHashMap<String, AHashSet<String>>, key: &str, value: &str) -> bool {
    let Some(bucket) = index.get_mut(key) else {
        return false;
    };
    let removed = bucket.remove(value);
    if bucket.is_empty() {
        index.remove(key);
    }
    removed
}
