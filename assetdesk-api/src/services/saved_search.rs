//! Saved-search membership evaluation
//!
//! A group predicate is a list-view query string. Evaluating it parses the
//! query strictly against the current catalog and runs it through the query
//! resolver.

use std::collections::BTreeSet;
use std::sync::Arc;

use assetdesk_core::{
    AssetdeskResult, CatalogHandle, EntityId, FilterCatalog, GroupMembershipEvaluator,
    MembershipPredicate, ParseOptions, QueryResolver, SearchDefaults, SearchError, SearchRequest,
    SearchRequestParser,
};
use async_trait::async_trait;

use crate::extractors::parse_query_string;

/// Parse a predicate into a request. Presentation fields are validated
/// too, so a stored predicate is always a reproducible list view.
pub fn parse_predicate(
    catalog: &FilterCatalog,
    defaults: &SearchDefaults,
    predicate: &MembershipPredicate,
) -> Result<SearchRequest, SearchError> {
    let params = parse_query_string(predicate.as_str());
    SearchRequestParser::new(catalog, defaults).parse(&params, ParseOptions::strict())
}

/// Membership evaluator backed by the list-view search engine.
#[derive(Clone)]
pub struct SavedSearchEvaluator {
    catalog: CatalogHandle,
    defaults: Arc<SearchDefaults>,
    resolver: Arc<dyn QueryResolver>,
}

impl SavedSearchEvaluator {
    pub fn new(
        catalog: CatalogHandle,
        defaults: Arc<SearchDefaults>,
        resolver: Arc<dyn QueryResolver>,
    ) -> Self {
        Self {
            catalog,
            defaults,
            resolver,
        }
    }

    /// Parse a predicate against the current catalog snapshot.
    pub fn request_for(&self, predicate: &MembershipPredicate) -> AssetdeskResult<SearchRequest> {
        let catalog = self.catalog.snapshot()?;
        Ok(parse_predicate(&catalog, &self.defaults, predicate)?)
    }
}

#[async_trait]
impl GroupMembershipEvaluator for SavedSearchEvaluator {
    async fn matching_entities(
        &self,
        predicate: &MembershipPredicate,
    ) -> AssetdeskResult<BTreeSet<EntityId>> {
        let mut request = self.request_for(predicate)?;
        request.distinct = true;
        let rows = self.resolver.resolve(&request).await?;
        tracing::debug!(predicate = %predicate, matches = rows.len(), "Evaluated group predicate");
        Ok(rows.into_iter().map(|row| row.id).collect())
    }
}
