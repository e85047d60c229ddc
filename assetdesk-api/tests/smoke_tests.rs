//! End-to-end smoke tests for the assetdesk API router

use axum::http::StatusCode;
use serde_json::json;

#[allow(dead_code)]
#[path = "support/app.rs"]
mod app;
use app::{delete, get, put, test_app};

type TestResult = Result<(), String>;

// ============================================================================
// HEALTH / OBSERVABILITY
// ============================================================================

#[tokio::test]
async fn smoke_test_health() -> TestResult {
    let app = test_app();
    let response = get(&app, "/health").await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert!(response.body["filters"].as_u64().unwrap_or(0) > 0);
    Ok(())
}

#[tokio::test]
async fn smoke_test_metrics_and_openapi() -> TestResult {
    let app = test_app();
    get(&app, "/api/v1/computers").await?;

    let metrics = get(&app, "/metrics").await?;
    assert_eq!(metrics.status, StatusCode::OK);
    let text = metrics.body.as_str().unwrap_or_default().to_string();
    assert!(text.contains("assetdesk_http_requests_total"));

    let openapi = get(&app, "/openapi.json").await?;
    assert_eq!(openapi.status, StatusCode::OK);
    assert_eq!(openapi.body["info"]["title"], "assetdesk API");
    Ok(())
}

// ============================================================================
// COMPUTER LIST
// ============================================================================

#[tokio::test]
async fn smoke_test_default_list() -> TestResult {
    let app = test_app();
    let response = get(&app, "/api/v1/computers").await?;
    assert_eq!(response.status, StatusCode::OK);
    // InventoryDate descending
    assert_eq!(response.row_ids(), vec![5, 1, 4, 2, 3]);
    assert_eq!(response.strings("columns"), vec!["Name", "UserName", "InventoryDate"]);
    assert_eq!(response.body["order"], "InventoryDate");
    assert_eq!(response.body["direction"], "desc");
    assert_eq!(response.body["jump_to"], "general");
    assert_eq!(response.body["total"], 5);
    Ok(())
}

#[tokio::test]
async fn smoke_test_singular_equality_filter_keeps_columns() -> TestResult {
    let app = test_app();
    let response = get(&app, "/api/v1/computers?filter=OsName&search=Linux").await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.row_ids(), vec![5, 2]);
    assert_eq!(response.strings("columns"), vec!["Name", "UserName", "InventoryDate"]);
    Ok(())
}

#[tokio::test]
async fn smoke_test_ordinal_filter_reveals_column() -> TestResult {
    let app = test_app();
    let response = get(
        &app,
        "/api/v1/computers?filter1=CpuClock&operator1=gt&search1=2500&order=Name&direction=asc",
    )
    .await?;
    assert_eq!(response.status, StatusCode::OK);
    // build01, test-lab
    assert_eq!(response.row_ids(), vec![2, 5]);
    assert_eq!(
        response.strings("columns"),
        vec!["Name", "UserName", "InventoryDate", "CpuClock"]
    );
    assert_eq!(response.body["rows"][0]["values"]["CpuClock"], 3600);
    Ok(())
}

#[tokio::test]
async fn smoke_test_one_to_many_and_distinct() -> TestResult {
    let app = test_app();
    let joined = get(
        &app,
        "/api/v1/computers?filter=Software.Name&operator=like&search=office*",
    )
    .await?;
    assert_eq!(joined.row_ids(), vec![1, 4, 4]);

    let distinct = get(
        &app,
        "/api/v1/computers?filter=Software.Name&operator=like&search=office*&distinct",
    )
    .await?;
    assert_eq!(distinct.row_ids(), vec![1, 4]);
    assert_eq!(distinct.body["distinct"], true);
    Ok(())
}

#[tokio::test]
async fn smoke_test_inverted_filter() -> TestResult {
    let app = test_app();
    let response = get(
        &app,
        "/api/v1/computers?filter=Software.Name&search=Firefox&invert=1",
    )
    .await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.row_ids(), vec![5, 4, 3]);
    // An inverted equality shows the filtered column
    assert!(response.strings("columns").contains(&"Software.Name".to_string()));
    Ok(())
}

#[tokio::test]
async fn smoke_test_form_field_id_filters() -> TestResult {
    let app = test_app();
    let form = get(&app, "/api/v1/computers/search").await?;
    let field_id = form.body["filters"]
        .as_array()
        .and_then(|filters| {
            filters
                .iter()
                .find(|f| f["key"] == "UserDefinedInfo.AssetTag")
                .and_then(|f| f["field_id"].as_str().map(str::to_string))
        })
        .ok_or("AssetTag missing from the search form")?;

    let response = get(
        &app,
        &format!("/api/v1/computers?filter={}&search=A-100", field_id),
    )
    .await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.row_ids(), vec![1]);
    let query = response.body["query"].as_str().unwrap_or_default();
    assert!(query.contains("filter1=UserDefinedInfo.AssetTag"));
    Ok(())
}

#[tokio::test]
async fn smoke_test_canonical_query_round_trips() -> TestResult {
    let app = test_app();
    let first = get(&app, "/api/v1/computers?filter=OsName&search=Windows%2010&columns=Name").await?;
    let query = first.body["query"].as_str().unwrap_or_default().to_string();
    assert!(query.contains("filter1=OsName"));
    assert!(query.contains("search1=Windows%2010"));

    let second = get(&app, &format!("/api/v1/computers?{}", query)).await?;
    assert_eq!(second.row_ids(), first.row_ids());
    assert_eq!(second.body["columns"], first.body["columns"]);
    Ok(())
}

#[tokio::test]
async fn smoke_test_invalid_custom_search_redirects_to_form() -> TestResult {
    let app = test_app();
    let raw = "filter=CpuClock&search=fast&customSearch=1";
    let response = get(&app, &format!("/api/v1/computers?{}", raw)).await?;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.location.as_deref(),
        Some(format!("/api/v1/computers/search?{}", raw).as_str())
    );
    Ok(())
}

#[tokio::test]
async fn smoke_test_invalid_list_request_redirects_to_unfiltered_list() -> TestResult {
    let app = test_app();
    let response = get(&app, "/api/v1/computers?filter1=NoSuchField&search1=x").await?;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/api/v1/computers"));
    Ok(())
}

#[tokio::test]
async fn smoke_test_bad_presentation_fields_fall_back() -> TestResult {
    let app = test_app();
    let response = get(
        &app,
        "/api/v1/computers?columns=Name,Bogus&order=Bogus&direction=sideways&jumpto=nowhere",
    )
    .await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["order"], "InventoryDate");
    assert_eq!(response.body["jump_to"], "general");
    Ok(())
}

// ============================================================================
// SEARCH FORM
// ============================================================================

#[tokio::test]
async fn smoke_test_search_form_reports_field_errors() -> TestResult {
    let app = test_app();
    let response = get(
        &app,
        "/api/v1/computers/search?filter1=Name&search1=test&filter2=InventoryDate&operator2=lt&search2=03/01/2024&customSearch=1",
    )
    .await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["errors"][0]["field"], "search2");
    assert!(response.body.get("request").is_none());
    assert_eq!(response.body["params"][0]["name"], "filter1");

    let filters = response.body["filters"].as_array().cloned().unwrap_or_default();
    assert!(filters.iter().any(|f| f["key"] == "UserDefinedInfo.AssetTag"));
    assert_eq!(response.body["jump_targets"].as_array().map(Vec::len), Some(16));
    Ok(())
}

#[tokio::test]
async fn smoke_test_search_form_without_errors() -> TestResult {
    let app = test_app();
    let response = get(&app, "/api/v1/computers/search").await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["errors"], json!([]));
    assert_eq!(response.body["request"]["order"], "InventoryDate");
    Ok(())
}

// ============================================================================
// GROUPS
// ============================================================================

#[tokio::test]
async fn smoke_test_group_membership_flow() -> TestResult {
    let app = test_app();

    let list = get(&app, "/api/v1/groups").await?;
    assert_eq!(list.body["groups"][0]["name"], "Linux");

    // 2 and 5 match; 5 is excluded and 3 forced in
    let members = get(&app, "/api/v1/groups/Linux/members").await?;
    assert_eq!(members.status, StatusCode::OK);
    assert_eq!(members.body["members"], json!([2, 3]));

    let updated = put(&app, "/api/v1/groups/Linux/members/5", json!({ "membership": "automatic" })).await?;
    assert_eq!(updated.status, StatusCode::OK);
    let members = get(&app, "/api/v1/groups/Linux/members").await?;
    assert_eq!(members.body["members"], json!([2, 3, 5]));

    put(&app, "/api/v1/groups/Linux/members/2", json!({ "membership": "never" })).await?;
    let members = get(&app, "/api/v1/groups/Linux/members").await?;
    assert_eq!(members.body["members"], json!([3, 5]));
    Ok(())
}

#[tokio::test]
async fn smoke_test_group_upsert_keeps_overrides() -> TestResult {
    let app = test_app();
    let response = put(
        &app,
        "/api/v1/groups/Linux",
        json!({ "description": "Recent Linux boxes", "query": "filter=OsName&search=Linux&order=Name" }),
    )
    .await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["overrides"]["5"], "never");

    let created = put(
        &app,
        "/api/v1/groups/Fast%20CPUs",
        json!({ "query": "filter=CpuClock&operator=ge&search=3000" }),
    )
    .await?;
    assert_eq!(created.body["name"], "Fast CPUs");
    let members = get(&app, "/api/v1/groups/Fast%20CPUs/members").await?;
    assert_eq!(members.body["members"], json!([2, 5]));
    Ok(())
}

#[tokio::test]
async fn smoke_test_group_rejects_invalid_query() -> TestResult {
    let app = test_app();
    let response = put(
        &app,
        "/api/v1/groups/Broken",
        json!({ "query": "filter1=Name&search1=x&filter2=Nope&search2=y" }),
    )
    .await?;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "UNKNOWN_FILTER");
    assert_eq!(response.body["details"]["field"], "filter2");

    let list = get(&app, "/api/v1/groups").await?;
    assert_eq!(list.body["total"], 1);
    Ok(())
}

#[tokio::test]
async fn smoke_test_static_group_and_errors() -> TestResult {
    let app = test_app();
    put(&app, "/api/v1/groups/Kiosks", json!({ "query": "" })).await?;
    put(&app, "/api/v1/groups/Kiosks/members/3", json!({ "membership": "always" })).await?;
    let members = get(&app, "/api/v1/groups/Kiosks/members").await?;
    assert_eq!(members.body["members"], json!([3]));

    let missing = get(&app, "/api/v1/groups/Nope/members").await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["code"], "GROUP_NOT_FOUND");

    let bad_id = put(&app, "/api/v1/groups/Kiosks/members/abc", json!({ "membership": "never" })).await?;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_id.body["details"]["field"], "id");

    let deleted = delete(&app, "/api/v1/groups/Kiosks").await?;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let again = delete(&app, "/api/v1/groups/Kiosks").await?;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn smoke_test_group_names_are_trimmed_everywhere() -> TestResult {
    let app = test_app();
    let stored = put(&app, "/api/v1/groups/%20Kiosks%20", json!({ "query": "" })).await?;
    assert_eq!(stored.body["name"], "Kiosks");

    let set = put(
        &app,
        "/api/v1/groups/Kiosks%20/members/3",
        json!({ "membership": "always" }),
    )
    .await?;
    assert_eq!(set.status, StatusCode::OK);

    let members = get(&app, "/api/v1/groups/%20Linux%20/members").await?;
    assert_eq!(members.status, StatusCode::OK);
    let kiosks = get(&app, "/api/v1/groups/%20Kiosks/members").await?;
    assert_eq!(kiosks.body["members"], json!([3]));

    let blank = get(&app, "/api/v1/groups/%20/members").await?;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["code"], "MISSING_FIELD");

    let deleted = delete(&app, "/api/v1/groups/%20Kiosks%20").await?;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    Ok(())
}

// ============================================================================
// CATALOG
// ============================================================================

#[tokio::test]
async fn smoke_test_catalog_rebuild() -> TestResult {
    let app = test_app();
    let catalog = get(&app, "/api/v1/catalog").await?;
    assert_eq!(catalog.status, StatusCode::OK);
    let keys: Vec<String> = catalog.body["filters"]
        .as_array()
        .map(|filters| {
            filters
                .iter()
                .filter_map(|f| f["key"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    assert!(keys.contains(&"Registry.BitLocker".to_string()));

    let rebuilt = put(
        &app,
        "/api/v1/catalog/extensions",
        json!({
            "user_defined_fields": [{ "name": "Room", "declared_type": "text" }],
            "registry_values": ["TPM"]
        }),
    )
    .await?;
    assert_eq!(rebuilt.status, StatusCode::OK);

    let form = get(&app, "/api/v1/computers/search").await?;
    let filters = form.body["filters"].as_array().cloned().unwrap_or_default();
    assert!(filters.iter().any(|f| f["key"] == "Registry.TPM"));
    assert!(filters.iter().any(|f| f["key"] == "UserDefinedInfo.Room"));
    assert!(!filters.iter().any(|f| f["key"] == "Registry.BitLocker"));

    // The dropped registry value is no longer a valid filter
    let stale = get(&app, "/api/v1/computers?filter=Registry.BitLocker&search=enabled").await?;
    assert_eq!(stale.status, StatusCode::SEE_OTHER);
    Ok(())
}

#[tokio::test]
async fn smoke_test_catalog_rejects_empty_names() -> TestResult {
    let app = test_app();
    let response = put(
        &app,
        "/api/v1/catalog/extensions",
        json!({ "registry_values": [" "] }),
    )
    .await?;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn smoke_test_catalog_rebuild_retypes_inventory() -> TestResult {
    let app = test_app();
    let query = "/api/v1/computers?filter=UserDefinedInfo.PurchaseDate&search=2021-06-30";
    assert_eq!(get(&app, query).await?.row_ids(), vec![4]);

    let rebuilt = put(
        &app,
        "/api/v1/catalog/extensions",
        json!({
            "user_defined_fields": [
                { "name": "AssetTag", "declared_type": "text" },
                { "name": "PurchaseDate", "declared_type": "text" }
            ],
            "registry_values": ["BitLocker"]
        }),
    )
    .await?;
    assert_eq!(rebuilt.status, StatusCode::OK);

    // Same rows once the field is text, and the inversion is the complement
    let retyped = get(&app, query).await?;
    assert_eq!(retyped.status, StatusCode::OK);
    assert_eq!(retyped.row_ids(), vec![4]);

    let inverted = get(&app, &format!("{}&invert=1", query)).await?;
    assert_eq!(inverted.status, StatusCode::OK);
    assert!(!inverted.row_ids().contains(&4));

    let like = get(
        &app,
        "/api/v1/computers?filter=UserDefinedInfo.PurchaseDate&operator=like&search=2021-06",
    )
    .await?;
    assert_eq!(like.row_ids(), vec![4]);
    Ok(())
}

#[tokio::test]
async fn smoke_test_catalog_rebuild_keeps_group_queries_valid() -> TestResult {
    let app = test_app();
    let stored = put(
        &app,
        "/api/v1/groups/Tagged",
        json!({ "query": "filter=UserDefinedInfo.AssetTag&search=A-100" }),
    )
    .await?;
    assert_eq!(stored.status, StatusCode::OK);

    let rejected = put(&app, "/api/v1/catalog/extensions", json!({})).await?;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.body["code"], "VALIDATION_FAILED");
    assert_eq!(rejected.body["details"]["groups"], json!(["Tagged"]));

    // Nothing was replaced
    let catalog = get(&app, "/api/v1/catalog").await?;
    let filters = catalog.body["filters"].as_array().cloned().unwrap_or_default();
    assert!(filters.iter().any(|f| f["key"] == "UserDefinedInfo.AssetTag"));
    let members = get(&app, "/api/v1/groups/Tagged/members").await?;
    assert_eq!(members.status, StatusCode::OK);
    assert_eq!(members.body["members"], json!([1]));

    // Once the group is gone the same rebuild goes through
    assert_eq!(
        delete(&app, "/api/v1/groups/Tagged").await?.status,
        StatusCode::NO_CONTENT
    );
    let accepted = put(&app, "/api/v1/catalog/extensions", json!({})).await?;
    assert_eq!(accepted.status, StatusCode::OK);
    Ok(())
}
