//! Filter Catalog REST API Routes

use std::sync::Arc;

use assetdesk_core::{
    CatalogExtensions, CatalogHandle, FilterCatalog, QueryResolver, SearchDefaults,
};
use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};

use crate::{
    error::{ApiError, ApiResult},
    services::{parse_predicate, GroupStore},
    state::AppState,
    telemetry::metrics::with_metrics,
    types::{CatalogResponse, FilterField},
};

fn catalog_response(catalog: &FilterCatalog) -> CatalogResponse {
    catalog.definitions().map(FilterField::from).collect()
}

/// Names of stored groups whose membership query no longer parses against
/// `catalog`.
fn invalidated_groups(
    catalog: &FilterCatalog,
    defaults: &SearchDefaults,
    groups: &GroupStore,
) -> Vec<String> {
    groups
        .list()
        .into_iter()
        .filter(|group| {
            group
                .predicate
                .as_ref()
                .is_some_and(|predicate| parse_predicate(catalog, defaults, predicate).is_err())
        })
        .map(|group| group.name)
        .collect()
}

/// GET /api/v1/catalog - Current filter catalog
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/catalog",
    tag = "Catalog",
    responses(
        (status = 200, description = "All filters", body = CatalogResponse),
        (status = 503, description = "Catalog unavailable", body = ApiError),
    ),
))]
pub async fn get_catalog(State(catalog): State<CatalogHandle>) -> ApiResult<Json<CatalogResponse>> {
    let snapshot = catalog.snapshot()?;
    Ok(Json(catalog_response(&snapshot)))
}

/// PUT /api/v1/catalog/extensions - Replace user-defined fields and registry values
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/api/v1/catalog/extensions",
    tag = "Catalog",
    request_body = CatalogExtensions,
    responses(
        (status = 200, description = "Catalog rebuilt", body = CatalogResponse),
        (status = 400, description = "Invalid extensions, or stored data the rebuilt catalog cannot express", body = ApiError),
    ),
))]
pub async fn update_extensions(
    State(catalog): State<CatalogHandle>,
    State(defaults): State<Arc<SearchDefaults>>,
    State(resolver): State<Arc<dyn QueryResolver>>,
    State(groups): State<GroupStore>,
    Json(extensions): Json<CatalogExtensions>,
) -> ApiResult<Json<CatalogResponse>> {
    if extensions
        .user_defined_fields
        .iter()
        .any(|field| field.name.trim().is_empty())
    {
        return Err(ApiError::missing_field("user_defined_fields[].name"));
    }
    if extensions.registry_values.iter().any(|name| name.trim().is_empty()) {
        return Err(ApiError::validation_failed("Registry value names must not be empty"));
    }

    let rebuilt = FilterCatalog::with_extensions(&extensions);
    defaults.validate(&rebuilt)?;

    let invalidated = invalidated_groups(&rebuilt, &defaults, &groups);
    if !invalidated.is_empty() {
        tracing::warn!(groups = ?invalidated, "Catalog rebuild rejected by group queries");
        return Err(ApiError::validation_failed(format!(
            "Rebuilt catalog would invalidate the membership query of: {}",
            invalidated.join(", ")
        ))
        .with_details(serde_json::json!({ "groups": invalidated })));
    }
    resolver.catalog_changed(&rebuilt).await?;

    let response = catalog_response(&rebuilt);
    catalog.replace(rebuilt)?;

    with_metrics(|metrics| metrics.set_catalog_filters(response.total));
    tracing::info!(
        filters = response.total,
        user_defined = extensions.user_defined_fields.len(),
        registry_values = extensions.registry_values.len(),
        "Filter catalog rebuilt"
    );
    Ok(Json(response))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_catalog))
        .route("/extensions", put(update_extensions))
}
