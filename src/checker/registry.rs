//! Ordered checker registry.

use std::collections::HashSet;

use crate::error::{QcError, Result};

use super::descriptor::CheckerDescriptor;

/// Checkers in the order they are executed.
///
/// Order is fixed at construction; the orchestrator never reorders checkers.
pub struct Registry<D: ?Sized> {
    checkers: Vec<CheckerDescriptor<D>>,
    ids: HashSet<String>,
}

impl<D: ?Sized> Registry<D> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            checkers: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Build a registry, rejecting duplicate checker ids.
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = CheckerDescriptor<D>>,
    {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Append a checker to the end of the run order.
    pub fn register(&mut self, descriptor: CheckerDescriptor<D>) -> Result<()> {
        if !self.ids.insert(descriptor.id().to_string()) {
            return Err(QcError::DuplicateChecker(descriptor.id().to_string()));
        }
        self.checkers.push(descriptor);
        Ok(())
    }

    /// Register a checker (builder pattern)
    pub fn with(mut self, descriptor: CheckerDescriptor<D>) -> Result<Self> {
        self.register(descriptor)?;
        Ok(self)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CheckerDescriptor<D>> {
        self.checkers.iter().find(|c| c.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckerDescriptor<D>> {
        self.checkers.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }
}

impl<D: ?Sized> Default for Registry<D> {
    fn default() -> Self {
        Self::new()
    }
}
