//! Dynamic group membership
//!
//! A group's members are the entities matching its predicate, adjusted by
//! per-entity overrides. Predicate evaluation is delegated to a
//! [`GroupMembershipEvaluator`]; this module owns only the override rules.

use crate::{AssetdeskResult, EntityId, MembershipOverride};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque dynamic-membership predicate, stored as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct MembershipPredicate(String);

impl MembershipPredicate {
    pub fn new(predicate: impl Into<String>) -> Self {
        Self(predicate.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MembershipPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A computer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Predicate for automatic members; `None` for purely static groups
    #[serde(default)]
    pub predicate: Option<MembershipPredicate>,
    /// Explicit overrides. `Automatic` entries are never stored.
    #[serde(default)]
    pub overrides: BTreeMap<EntityId, MembershipOverride>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            predicate: None,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_predicate(mut self, predicate: MembershipPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Set an override; `Automatic` removes any stored override.
    pub fn set_override(&mut self, id: EntityId, membership: MembershipOverride) {
        match membership {
            MembershipOverride::Automatic => {
                self.overrides.remove(&id);
            }
            other => {
                self.overrides.insert(id, other);
            }
        }
    }

    pub fn override_for(&self, id: EntityId) -> MembershipOverride {
        self.overrides.get(&id).copied().unwrap_or_default()
    }
}

/// Apply the override rules to the set of entities matching the predicate.
///
/// - `Always`: member regardless of the predicate
/// - `Never`: excluded regardless of the predicate
/// - `Automatic`: member iff the predicate matches
pub fn resolve_membership(
    predicate_matches: &BTreeSet<EntityId>,
    overrides: &BTreeMap<EntityId, MembershipOverride>,
) -> BTreeSet<EntityId> {
    let mut members: BTreeSet<EntityId> = predicate_matches
        .iter()
        .copied()
        .filter(|id| overrides.get(id) != Some(&MembershipOverride::Never))
        .collect();

    members.extend(
        overrides
            .iter()
            .filter(|(_, membership)| **membership == MembershipOverride::Always)
            .map(|(id, _)| *id),
    );
    members
}

/// Evaluates dynamic-membership predicates.
#[async_trait]
pub trait GroupMembershipEvaluator: Send + Sync {
    /// Entities currently satisfying `predicate`.
    async fn matching_entities(
        &self,
        predicate: &MembershipPredicate,
    ) -> AssetdeskResult<BTreeSet<EntityId>>;

    /// Current members of `group`.
    async fn evaluate(&self, group: &Group) -> AssetdeskResult<BTreeSet<EntityId>> {
        let matches = match &group.predicate {
            Some(predicate) => self.matching_entities(predicate).await?,
            None => BTreeSet::new(),
        };
        Ok(resolve_membership(&matches, &group.overrides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[EntityId]) -> BTreeSet<EntityId> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_override_semantics() {
        let matches = set(&[1, 2, 3]);
        let overrides = BTreeMap::from([
            (2, MembershipOverride::Never),
            (7, MembershipOverride::Always),
            (3, MembershipOverride::Automatic),
        ]);
        assert_eq!(resolve_membership(&matches, &overrides), set(&[1, 3, 7]));
    }

    #[test]
    fn test_never_beats_predicate_and_always_needs_no_predicate() {
        let overrides = BTreeMap::from([(1, MembershipOverride::Never), (2, MembershipOverride::Always)]);
        assert_eq!(resolve_membership(&set(&[1]), &overrides), set(&[2]));
        assert_eq!(resolve_membership(&BTreeSet::new(), &overrides), set(&[2]));
    }

    #[test]
    fn test_set_override_automatic_removes_entry() {
        let mut group = Group::new("Servers");
        group.set_override(4, MembershipOverride::Always);
        assert_eq!(group.override_for(4), MembershipOverride::Always);
        group.set_override(4, MembershipOverride::Automatic);
        assert!(group.overrides.is_empty());
        assert_eq!(group.override_for(4), MembershipOverride::Automatic);
    }

    struct FixedEvaluator(BTreeSet<EntityId>);

    #[async_trait]
    impl GroupMembershipEvaluator for FixedEvaluator {
        async fn matching_entities(
            &self,
            _predicate: &MembershipPredicate,
        ) -> AssetdeskResult<BTreeSet<EntityId>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_default_evaluate_applies_overrides() -> AssetdeskResult<()> {
        let evaluator = FixedEvaluator(set(&[1, 2]));

        let mut dynamic = Group::new("Dynamic").with_predicate(MembershipPredicate::new("filter=Name"));
        dynamic.set_override(1, MembershipOverride::Never);
        assert_eq!(evaluator.evaluate(&dynamic).await?, set(&[2]));

        let mut manual = Group::new("Manual");
        manual.set_override(9, MembershipOverride::Always);
        assert_eq!(evaluator.evaluate(&manual).await?, set(&[9]));
        Ok(())
    }

    #[test]
    fn test_group_serde_defaults() -> Result<(), serde_json::Error> {
        let group: Group = serde_json::from_str(r#"{"name": "Laptops"}"#)?;
        assert_eq!(group, Group::new("Laptops"));

        let json = serde_json::to_value(Group::new("x").with_predicate(MembershipPredicate::new("p")))?;
        assert_eq!(json["predicate"], "p");
        Ok(())
    }
}
