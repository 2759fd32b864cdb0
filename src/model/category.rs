//! Class-name table for box categories.

use std::collections::BTreeMap;

/// Mapping from class id to display name.
///
/// Ids need not be dense; [`ClassNames::dense_names`] fills gaps with
/// placeholder names when a contiguous list is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames {
    names: BTreeMap<u32, String>,
}

impl ClassNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list where the position is the class id.
    pub fn from_list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: (0u32..).zip(names.into_iter().map(Into::into)).collect(),
        }
    }

    /// Display name for `id`, or `"Class {id}"` when unknown.
    pub fn name(&self, id: u32) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Class {}", id))
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn insert(&mut self, id: u32, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    /// Add a class after the highest existing id and return its id.
    ///
    /// Returns `None` when the highest id is already `u32::MAX`.
    pub fn add(&mut self, name: impl Into<String>) -> Option<u32> {
        let id = match self.max_id() {
            Some(max) => max.checked_add(1)?,
            None => 0,
        };
        let name = name.into();
        log::info!("Added class {} ({})", id, name);
        self.names.insert(id, name);
        Some(id)
    }

    pub fn max_id(&self) -> Option<u32> {
        self.names.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Names for ids `0..=max`, with `class_{i}` for unfilled ids.
    pub fn dense_names(&self) -> Vec<String> {
        let Some(max) = self.max_id() else {
            return Vec::new();
        };
        (0..=max)
            .map(|i| {
                self.names
                    .get(&i)
                    .cloned()
                    .unwrap_or_else(|| format!("class_{}", i))
            })
            .collect()
    }
}
