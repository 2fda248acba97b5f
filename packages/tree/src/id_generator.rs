//! Unique id allocation for synthesized and user-created nodes

use crate::tree::SiteTree;
use std::collections::HashSet;

/// Hands out ids that do not collide with any already taken
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    taken: HashSet<String>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with every id present in a tree
    pub fn from_tree(tree: &SiteTree) -> Self {
        let mut allocator = Self::new();
        for id in tree.ids() {
            allocator.reserve(id);
        }
        allocator
    }

    /// Mark an id as used; returns false if it already was
    pub fn reserve(&mut self, id: &str) -> bool {
        self.taken.insert(id.to_string())
    }

    pub fn is_taken(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    /// Allocate `base`, or `base-2`, `base-3`, ... if taken
    pub fn allocate(&mut self, base: &str) -> String {
        self.claim(slugify(base))
    }

    /// Like `allocate`, but keeps `base` as written (script identifiers)
    pub fn allocate_verbatim(&mut self, base: &str) -> String {
        if base.is_empty() {
            return self.allocate(base);
        }
        self.claim(base.to_string())
    }

    fn claim(&mut self, base: String) -> String {
        if self.reserve(&base) {
            return base;
        }

        let mut suffix = 2;
        loop {
            let candidate = format!("{}-{}", base, suffix);
            if self.reserve(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Lowercase, keep alphanumerics, collapse everything else into single dashes
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "node".to_string()
    } else {
        slug
    }
}
