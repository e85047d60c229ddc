//! Group-related API types

use std::collections::{BTreeMap, BTreeSet};

use assetdesk_core::{EntityId, Group, MembershipOverride};
use serde::{Deserialize, Serialize};

/// Request to create or replace a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpsertGroupRequest {
    #[serde(default)]
    pub description: Option<String>,
    /// List-view query string selecting automatic members; empty for a
    /// static group
    #[serde(default)]
    pub query: String,
}

/// Request to set one entity's membership override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SetMembershipRequest {
    pub membership: MembershipOverride,
}

/// Group as listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GroupSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Number of stored overrides
    pub overrides: usize,
}

impl From<&Group> for GroupSummary {
    fn from(group: &Group) -> Self {
        Self {
            name: group.name.clone(),
            description: group.description.clone(),
            query: group.predicate.as_ref().map(|p| p.as_str().to_string()),
            overrides: group.overrides.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListGroupsResponse {
    pub groups: Vec<GroupSummary>,
    pub total: usize,
}

/// Current members of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GroupMembersResponse {
    pub name: String,
    pub members: Vec<EntityId>,
    pub total: usize,
    /// Stored overrides, for display next to each member
    pub overrides: BTreeMap<EntityId, MembershipOverride>,
}

impl GroupMembersResponse {
    pub fn new(group: Group, members: BTreeSet<EntityId>) -> Self {
        let members: Vec<EntityId> = members.into_iter().collect();
        Self {
            name: group.name,
            total: members.len(),
            members,
            overrides: group.overrides,
        }
    }
}
