//! OpenAPI Specification for assetdesk API
//!
//! This module defines the OpenAPI document for the assetdesk REST API.
//! It uses utoipa to generate the OpenAPI specification from Rust types
//! and route annotations.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{HealthResponse, HealthStatus};
use crate::routes::{catalog, computer, group, health};
use crate::telemetry::metrics;
use crate::types::*;

use assetdesk_core::{
    CatalogExtensions, DeclaredFieldType, FilterCriterion, Group, JumpTarget, MembershipOverride,
    MembershipPredicate, Operator, ResultRow, SearchRequest, SortDirection, TypedValue,
    UserDefinedField, ValueType,
};

/// OpenAPI document for assetdesk API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "assetdesk API",
        version = "0.4.0",
        description = "Inventory list-view search, computer groups and filter catalog",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Computers", description = "List-view search over inventoried computers"),
        (name = "Groups", description = "Dynamic computer groups and membership overrides"),
        (name = "Catalog", description = "Searchable filters, including user-defined fields and registry values"),
        (name = "Health", description = "Liveness"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        computer::list_computers,
        computer::search_form,
        group::list_groups,
        group::upsert_group,
        group::delete_group,
        group::group_members,
        group::set_membership,
        catalog::get_catalog,
        catalog::update_extensions,
        health::health,
        metrics::metrics_handler,
    ),
    components(
        schemas(
            // === Errors ===
            ApiError, ErrorCode,

            // === Computers ===
            ComputerListResponse, SearchFormResponse, QueryParam, FieldError,
            SearchRequest, FilterCriterion, ResultRow, TypedValue,
            Operator, ValueType, SortDirection, JumpTarget,

            // === Groups ===
            Group, MembershipPredicate, MembershipOverride, UpsertGroupRequest,
            SetMembershipRequest, GroupSummary, ListGroupsResponse, GroupMembersResponse,

            // === Catalog ===
            CatalogResponse, FilterField, CatalogExtensions, UserDefinedField, DeclaredFieldType,

            // === Health ===
            HealthResponse, HealthStatus
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "assetdesk API");

        let tags = openapi
            .tags
            .as_ref()
            .ok_or_else(|| "OpenAPI tags missing".to_string())?;
        assert_eq!(tags.len(), 5);

        let components = openapi
            .components
            .as_ref()
            .ok_or_else(|| "OpenAPI components missing".to_string())?;
        assert!(components.schemas.contains_key("ComputerListResponse"));
        assert!(components.schemas.contains_key("MembershipOverride"));
        Ok(())
    }

    #[test]
    fn test_openapi_json_serialization() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| format!("Failed to serialize OpenAPI: {}", e))?;
        serde_json::from_str::<serde_json::Value>(&json)
            .map_err(|e| format!("Generated JSON invalid: {}", e))?;
        assert!(json.contains("assetdesk API"));
        Ok(())
    }

    #[test]
    fn test_openapi_paths_exist() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;
        assert!(paths.contains_key("/api/v1/computers"));
        assert!(paths.contains_key("/api/v1/computers/search"));
        assert!(paths.contains_key("/api/v1/groups"));
        assert!(paths.contains_key("/api/v1/groups/{name}"));
        assert!(paths.contains_key("/api/v1/groups/{name}/members"));
        assert!(paths.contains_key("/api/v1/groups/{name}/members/{id}"));
        assert!(paths.contains_key("/api/v1/catalog"));
        assert!(paths.contains_key("/api/v1/catalog/extensions"));
        assert!(paths.contains_key("/health"));
    }
}
