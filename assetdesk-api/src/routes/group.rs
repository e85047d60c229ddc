//! Group REST API Routes
//!
//! Groups select their automatic members with a saved list-view query and
//! carry per-computer overrides.

use std::sync::Arc;

use assetdesk_core::{
    CatalogHandle, Group, GroupMembershipEvaluator, MembershipPredicate, SearchDefaults,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{group_name, MemberPath},
    services::{parse_predicate, GroupStore},
    state::AppState,
    types::{
        GroupMembersResponse, GroupSummary, ListGroupsResponse, SetMembershipRequest,
        UpsertGroupRequest,
    },
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/groups - List groups
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/groups",
    tag = "Groups",
    responses(
        (status = 200, description = "All groups, ordered by name", body = ListGroupsResponse),
    ),
))]
pub async fn list_groups(State(groups): State<GroupStore>) -> Json<ListGroupsResponse> {
    let groups: Vec<GroupSummary> = groups.list().iter().map(GroupSummary::from).collect();
    Json(ListGroupsResponse {
        total: groups.len(),
        groups,
    })
}

/// PUT /api/v1/groups/{name} - Create or replace a group
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/api/v1/groups/{name}",
    tag = "Groups",
    params(("name" = String, Path, description = "Group name")),
    request_body = UpsertGroupRequest,
    responses(
        (status = 200, description = "Group stored", body = Group),
        (status = 400, description = "Invalid membership query", body = ApiError),
    ),
))]
pub async fn upsert_group(
    State(catalog): State<CatalogHandle>,
    State(defaults): State<Arc<SearchDefaults>>,
    State(groups): State<GroupStore>,
    Path(name): Path<String>,
    Json(req): Json<UpsertGroupRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = group_name(&name)?;

    let predicate = match req.query.trim() {
        "" => None,
        query => {
            let predicate = MembershipPredicate::new(query);
            let catalog = catalog.snapshot()?;
            parse_predicate(&catalog, &defaults, &predicate)?;
            Some(predicate)
        }
    };

    let description = req.description.filter(|d| !d.trim().is_empty());
    let group = groups.upsert(name, description, predicate);
    tracing::info!(group = %group.name, dynamic = group.predicate.is_some(), "Group stored");
    Ok(Json(group))
}

/// DELETE /api/v1/groups/{name} - Delete a group
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/v1/groups/{name}",
    tag = "Groups",
    params(("name" = String, Path, description = "Group name")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 404, description = "Group not found", body = ApiError),
    ),
))]
pub async fn delete_group(
    State(groups): State<GroupStore>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    let name = group_name(&name)?;
    groups
        .remove(name)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiError::group_not_found(name))
}

/// GET /api/v1/groups/{name}/members - Evaluate current members
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/groups/{name}/members",
    tag = "Groups",
    params(("name" = String, Path, description = "Group name")),
    responses(
        (status = 200, description = "Current members", body = GroupMembersResponse),
        (status = 404, description = "Group not found", body = ApiError),
        (status = 500, description = "Query engine failure", body = ApiError),
    ),
))]
pub async fn group_members(
    State(groups): State<GroupStore>,
    State(evaluator): State<Arc<dyn GroupMembershipEvaluator>>,
    Path(name): Path<String>,
) -> ApiResult<Json<GroupMembersResponse>> {
    let name = group_name(&name)?;
    let group = groups
        .get(name)
        .ok_or_else(|| ApiError::group_not_found(name))?;
    let members = evaluator.evaluate(&group).await?;
    Ok(Json(GroupMembersResponse::new(group, members)))
}

/// PUT /api/v1/groups/{name}/members/{id} - Set a membership override
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/api/v1/groups/{name}/members/{id}",
    tag = "Groups",
    params(
        ("name" = String, Path, description = "Group name"),
        ("id" = i64, Path, description = "Computer id"),
    ),
    request_body = SetMembershipRequest,
    responses(
        (status = 200, description = "Override stored", body = Group),
        (status = 400, description = "Invalid id or membership", body = ApiError),
        (status = 404, description = "Group not found", body = ApiError),
    ),
))]
pub async fn set_membership(
    State(groups): State<GroupStore>,
    member: MemberPath,
    Json(req): Json<SetMembershipRequest>,
) -> ApiResult<Json<Group>> {
    let group = groups
        .set_override(&member.group, member.id, req.membership)
        .ok_or_else(|| ApiError::group_not_found(&member.group))?;
    tracing::info!(
        group = %group.name,
        id = member.id,
        membership = req.membership.as_str(),
        "Membership override set"
    );
    Ok(Json(group))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_groups))
        .route("/:name", put(upsert_group).delete(delete_group))
        .route("/:name/members", get(group_members))
        .route("/:name/members/:id", put(set_membership))
}
