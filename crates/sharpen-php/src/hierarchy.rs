//! Class hierarchy lookup.
//!
//! The resolver needs two facts about classes: whether a class is known,
//! and its chain of parent classes, nearest first. Building the hierarchy
//! for a whole program is the job of the surrounding checker; this module
//! defines the lookup trait and an in-memory map for callers and tests.
//!
//! Class names are matched case-insensitively, as the host language does,
//! and reported with the spelling they were recorded with.

use std::collections::{HashMap, HashSet};

/// Read access to recorded class metadata.
pub trait ClassHierarchy {
    /// True if `name` denotes a recorded class.
    fn class_exists(&self, name: &str) -> bool;

    /// Parent classes of `name`, nearest first. Empty for unknown classes
    /// and for classes without a parent.
    fn parent_classes(&self, name: &str) -> Vec<String>;
}

#[derive(Debug, Clone)]
struct ClassEntry {
    name: String,
    parent: Option<String>,
}

/// In-memory class hierarchy built from direct parent links.
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchyMap {
    classes: HashMap<String, ClassEntry>,
}

impl ClassHierarchyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` with its direct parent. Re-adding a class replaces it.
    pub fn add_class(&mut self, name: &str, parent: Option<&str>) {
        self.classes.insert(
            name.to_ascii_lowercase(),
            ClassEntry {
                name: name.to_string(),
                parent: parent.map(str::to_string),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn entry(&self, name: &str) -> Option<&ClassEntry> {
        self.classes.get(&name.to_ascii_lowercase())
    }
}

impl ClassHierarchy for ClassHierarchyMap {
    fn class_exists(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    fn parent_classes(&self, name: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(name.to_ascii_lowercase());

        let mut current = self.entry(name).and_then(|entry| entry.parent.clone());
        while let Some(parent) = current {
            if !seen.insert(parent.to_ascii_lowercase()) {
                tracing::trace!(class = name, parent = %parent, "cycle in parent chain");
                break;
            }
            // Prefer the spelling the parent was recorded with.
            let entry = self.entry(&parent);
            chain.push(entry.map_or_else(|| parent.clone(), |e| e.name.clone()));
            current = entry.and_then(|e| e.parent.clone());
        }

        chain
    }
}
