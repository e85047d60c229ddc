//! Group Store
//!
//! In-process registry of computer groups keyed by name.

use std::sync::Arc;

use assetdesk_core::{EntityId, Group, MembershipOverride, MembershipPredicate};
use dashmap::DashMap;

/// Concurrent map of groups shared between handlers.
#[derive(Debug, Clone, Default)]
pub struct GroupStore {
    groups: Arc<DashMap<String, Group>>,
}

impl GroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. from a fixture file.
    pub fn with_groups(groups: impl IntoIterator<Item = Group>) -> Self {
        let store = Self::new();
        for group in groups {
            store.groups.insert(group.name.clone(), group);
        }
        store
    }

    pub fn get(&self, name: &str) -> Option<Group> {
        self.groups.get(name).map(|group| group.clone())
    }

    /// Create or update a group's description and predicate.
    ///
    /// Existing overrides survive a predicate change.
    pub fn upsert(
        &self,
        name: &str,
        description: Option<String>,
        predicate: Option<MembershipPredicate>,
    ) -> Group {
        let mut entry = self
            .groups
            .entry(name.to_string())
            .or_insert_with(|| Group::new(name));
        entry.description = description;
        entry.predicate = predicate;
        entry.clone()
    }

    /// Set one entity's override. Returns `None` for an unknown group.
    pub fn set_override(
        &self,
        name: &str,
        id: EntityId,
        membership: MembershipOverride,
    ) -> Option<Group> {
        self.groups.get_mut(name).map(|mut group| {
            group.set_override(id, membership);
            group.clone()
        })
    }

    pub fn remove(&self, name: &str) -> Option<Group> {
        self.groups.remove(name).map(|(_, group)| group)
    }

    /// All groups, ordered by name.
    pub fn list(&self) -> Vec<Group> {
        let mut groups: Vec<Group> = self.groups.iter().map(|g| g.value().clone()).collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
