//! Computer List REST API Routes
//!
//! `GET /api/v1/computers` runs a list-view search. A request with invalid
//! criteria never fails: it is redirected to the search form when it was
//! submitted from there (`customSearch`), otherwise to the unfiltered list.
//!
//! `GET /api/v1/computers/search` serves the search form model, including
//! field-level errors for the submitted parameters.

use std::sync::Arc;
use std::time::Instant;

use assetdesk_core::{
    CatalogHandle, JumpTarget, ParseOptions, QueryResolver, SearchDefaults, SearchError,
    SearchRequestParser,
};
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{to_query_string, SearchQuery},
    state::AppState,
    telemetry::metrics::{with_metrics, SearchOutcome},
    types::{ComputerListResponse, FieldError, FilterField, QueryParam, SearchFormResponse},
};

pub const LIST_PATH: &str = "/api/v1/computers";
pub const SEARCH_FORM_PATH: &str = "/api/v1/computers/search";

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/computers - List computers matching the submitted criteria
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/computers",
    tag = "Computers",
    params(
        ("filter" = Option<String>, Query, description = "Filter key (singular form)"),
        ("search" = Option<String>, Query, description = "Search value (singular form)"),
        ("operator" = Option<String>, Query, description = "Operator code: eq, ne, like, lt, le, ge, gt"),
        ("invert" = Option<String>, Query, description = "Negate the criterion (1/0)"),
        ("filter1" = Option<String>, Query, description = "First filter key (indexed form, continues with filter2, ...)"),
        ("columns" = Option<String>, Query, description = "Comma-separated base columns"),
        ("order" = Option<String>, Query, description = "Sort column"),
        ("direction" = Option<String>, Query, description = "asc or desc"),
        ("distinct" = Option<String>, Query, description = "Present to collapse duplicate rows"),
        ("jumpto" = Option<String>, Query, description = "Detail tab opened from a row"),
        ("customSearch" = Option<String>, Query, description = "Present when submitted from the search form"),
    ),
    responses(
        (status = 200, description = "Matching computers", body = ComputerListResponse),
        (status = 303, description = "Invalid criteria, redirected to the search form or the unfiltered list"),
        (status = 500, description = "Query engine failure", body = ApiError),
    ),
))]
pub async fn list_computers(
    State(catalog): State<CatalogHandle>,
    State(defaults): State<Arc<SearchDefaults>>,
    State(resolver): State<Arc<dyn QueryResolver>>,
    query: SearchQuery,
) -> ApiResult<Response> {
    let catalog = catalog.snapshot()?;
    let custom_search = query.params.contains("customSearch");

    let parsed = SearchRequestParser::new(&catalog, &defaults)
        .parse(&query.params, ParseOptions::for_request(custom_search));
    let request = match parsed {
        Ok(request) => request,
        Err(err) => return Ok(redirect_after_parse_failure(&query, custom_search, &err)),
    };

    tracing::debug!(
        criteria = request.criteria.len(),
        columns = ?request.columns,
        order = %request.order,
        distinct = request.distinct,
        "Parsed list request"
    );

    let start = Instant::now();
    let rows = resolver.resolve(&request).await?;
    with_metrics(|metrics| {
        metrics.record_resolver_duration(start.elapsed().as_secs_f64());
        metrics.record_search(SearchOutcome::Ok);
    });

    let canonical = to_query_string(request.query_pairs());
    Ok(Json(ComputerListResponse::new(request, rows, canonical)).into_response())
}

fn redirect_after_parse_failure(
    query: &SearchQuery,
    custom_search: bool,
    err: &SearchError,
) -> Response {
    if custom_search {
        tracing::warn!(
            error = %err,
            param = err.param().unwrap_or("-"),
            "Invalid search, returning to search form"
        );
        with_metrics(|metrics| metrics.record_search(SearchOutcome::RedirectForm));
        Redirect::to(&format!("{}?{}", SEARCH_FORM_PATH, query.raw)).into_response()
    } else {
        tracing::warn!(
            error = %err,
            param = err.param().unwrap_or("-"),
            "Invalid list request, showing unfiltered list"
        );
        with_metrics(|metrics| metrics.record_search(SearchOutcome::RedirectList));
        Redirect::to(LIST_PATH).into_response()
    }
}

/// GET /api/v1/computers/search - Search form model
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/computers/search",
    tag = "Computers",
    responses(
        (status = 200, description = "Filters, submitted parameters and validation messages", body = SearchFormResponse),
    ),
))]
pub async fn search_form(
    State(catalog): State<CatalogHandle>,
    State(defaults): State<Arc<SearchDefaults>>,
    query: SearchQuery,
) -> ApiResult<Json<SearchFormResponse>> {
    let catalog = catalog.snapshot()?;

    let (request, errors) = match SearchRequestParser::new(&catalog, &defaults)
        .parse(&query.params, ParseOptions::for_request(true))
    {
        Ok(request) => (Some(request), Vec::new()),
        Err(err) => (None, vec![FieldError::from(&err)]),
    };

    Ok(Json(SearchFormResponse {
        filters: catalog.definitions().map(FilterField::from).collect(),
        jump_targets: JumpTarget::ALL.to_vec(),
        params: query.params.iter().map(QueryParam::from).collect(),
        errors,
        request,
    }))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_computers))
        .route("/search", get(search_form))
}
