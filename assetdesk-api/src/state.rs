//! Shared application state for Axum routers.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use assetdesk_core::{
    CatalogExtensions, CatalogHandle, FilterCatalog, Group, GroupMembershipEvaluator,
    InMemoryQueryResolver, InventoryRecord, QueryResolver, SearchDefaults,
};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::services::{parse_predicate, GroupStore, SavedSearchEvaluator};
use crate::telemetry::metrics::with_metrics;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Filter catalog, rebuilt when extensions change.
    pub catalog: CatalogHandle,
    /// Query engine the list view and group predicates run against.
    pub resolver: Arc<dyn QueryResolver>,
    /// Evaluates dynamic group predicates.
    pub evaluator: Arc<dyn GroupMembershipEvaluator>,
    pub defaults: Arc<SearchDefaults>,
    pub groups: GroupStore,
    pub start_time: Instant,
}

crate::impl_from_ref!(CatalogHandle, catalog);
crate::impl_from_ref!(Arc<dyn QueryResolver>, resolver);
crate::impl_from_ref!(Arc<dyn GroupMembershipEvaluator>, evaluator);
crate::impl_from_ref!(Arc<SearchDefaults>, defaults);
crate::impl_from_ref!(GroupStore, groups);
crate::impl_from_ref!(Instant, start_time);

impl AppState {
    /// Wire state around a resolver, evaluating group predicates through
    /// the same resolver.
    pub fn new(
        catalog: CatalogHandle,
        resolver: Arc<dyn QueryResolver>,
        defaults: SearchDefaults,
    ) -> Self {
        let defaults = Arc::new(defaults);
        let evaluator = Arc::new(SavedSearchEvaluator::new(
            catalog.clone(),
            Arc::clone(&defaults),
            Arc::clone(&resolver),
        ));
        Self {
            catalog,
            resolver,
            evaluator,
            defaults,
            groups: GroupStore::new(),
            start_time: Instant::now(),
        }
    }

    /// Swap in a different membership evaluator.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn GroupMembershipEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_groups(mut self, groups: GroupStore) -> Self {
        self.groups = groups;
        self
    }
}

/// Build state from the configured data files.
///
/// Without a catalog file only the builtin filters are available; without
/// an inventory file the resolver starts empty. Seeded group predicates are
/// validated like those submitted over the API.
pub async fn bootstrap(config: &ApiConfig, defaults: SearchDefaults) -> ApiResult<AppState> {
    let extensions = match &config.catalog_file {
        Some(path) => read_json::<CatalogExtensions>(path).await?,
        None => CatalogExtensions::default(),
    };
    let catalog = FilterCatalog::with_extensions(&extensions);
    defaults.validate(&catalog)?;

    let records = match &config.inventory_file {
        Some(path) => read_json::<Vec<InventoryRecord>>(path).await?,
        None => Vec::new(),
    };
    let resolver = InMemoryQueryResolver::from_records(&catalog, records)?;

    let groups = match &config.groups_file {
        Some(path) => read_json::<Vec<Group>>(path).await?,
        None => Vec::new(),
    };
    for group in &groups {
        if let Some(predicate) = &group.predicate {
            parse_predicate(&catalog, &defaults, predicate)?;
        }
    }

    with_metrics(|metrics| metrics.set_catalog_filters(catalog.len()));
    tracing::info!(
        filters = catalog.len(),
        user_defined = extensions.user_defined_fields.len(),
        registry_values = extensions.registry_values.len(),
        records = resolver.len(),
        groups = groups.len(),
        "Loaded filter catalog and inventory"
    );

    Ok(AppState::new(CatalogHandle::new(catalog), Arc::new(resolver), defaults)
        .with_groups(GroupStore::with_groups(groups)))
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> ApiResult<T> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        ApiError::internal_error(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        ApiError::invalid_input(format!("Invalid JSON in {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdesk_test_utils::fixtures::{linux_group, sample_extensions, sample_records};
    use assetdesk_core::MembershipPredicate;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("assetdesk-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).expect("write temp file");
        path
    }

    #[tokio::test]
    async fn test_bootstrap_without_files() -> ApiResult<()> {
        let state = bootstrap(&ApiConfig::default(), SearchDefaults::default()).await?;
        let catalog = state.catalog.snapshot()?;
        assert!(catalog.contains("Name"));
        assert!(state.groups.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_loads_files() -> ApiResult<()> {
        let catalog_file = temp_file("catalog.json", &serde_json::to_string(&sample_extensions())?);
        let inventory_file =
            temp_file("inventory.json", &serde_json::to_string(&sample_records())?);
        let config = ApiConfig {
            catalog_file: Some(catalog_file.clone()),
            inventory_file: Some(inventory_file.clone()),
            ..Default::default()
        };

        let state = bootstrap(&config, SearchDefaults::default()).await?;
        let catalog = state.catalog.snapshot()?;
        assert!(catalog.contains("UserDefinedInfo.AssetTag"));
        assert!(catalog.contains("Registry.BitLocker"));

        let _ = std::fs::remove_file(catalog_file);
        let _ = std::fs::remove_file(inventory_file);
        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_seeds_groups() -> ApiResult<()> {
        let groups_file = temp_file("groups.json", &serde_json::to_string(&vec![linux_group()])?);
        let config = ApiConfig {
            groups_file: Some(groups_file.clone()),
            ..Default::default()
        };
        let state = bootstrap(&config, SearchDefaults::default()).await?;
        assert_eq!(state.groups.get("Linux"), Some(linux_group()));
        let _ = std::fs::remove_file(groups_file);
        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_invalid_group_predicate() -> ApiResult<()> {
        let bad = Group::new("Broken").with_predicate(MembershipPredicate::new("filter=Nope&search=x"));
        let groups_file = temp_file("bad-groups.json", &serde_json::to_string(&vec![bad])?);
        let config = ApiConfig {
            groups_file: Some(groups_file.clone()),
            ..Default::default()
        };
        let result = bootstrap(&config, SearchDefaults::default()).await;
        assert!(matches!(result, Err(e) if e.code == crate::error::ErrorCode::UnknownFilter));
        let _ = std::fs::remove_file(groups_file);
        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_unknown_default_column() {
        let defaults = SearchDefaults {
            base_columns: vec!["NoSuchColumn".to_string()],
            ..Default::default()
        };
        let result = bootstrap(&ApiConfig::default(), defaults).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_bootstrap_missing_file() {
        let config = ApiConfig {
            inventory_file: Some(PathBuf::from("/nonexistent/assetdesk/inventory.json")),
            ..Default::default()
        };
        let result = bootstrap(&config, SearchDefaults::default()).await;
        assert!(matches!(result, Err(e) if e.code == crate::error::ErrorCode::InternalError));
    }
}
