//! assetdesk Test Utilities
//!
//! Centralized test infrastructure for the assetdesk workspace:
//! - Mock collaborators (query resolver, membership evaluator)
//! - Proptest generators for request parameters and criteria
//! - Test fixtures: a sample catalog and inventory
//! - Custom assertions for search results and parse errors

// Re-export core types for convenience
pub use assetdesk_core::{
    select_columns, AssetdeskError, AssetdeskResult, CatalogExtensions, CatalogHandle,
    CriterionParams, DeclaredFieldType, EntityId, FilterCatalog, FilterCriterion, Group,
    GroupMembershipEvaluator, InMemoryQueryResolver, InventoryRecord, JumpTarget,
    MembershipOverride, MembershipPredicate, Operator, ParseOptions, QueryResolver,
    RequestParams, ResultRow, SearchDefaults, SearchError, SearchRequest, SearchRequestParser,
    SortDirection, TypedValue, UserDefinedField, ValidationError, ValueType, DATE_FILTERS,
    INTEGER_FILTERS,
};

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

// ============================================================================
// MOCK COLLABORATORS
// ============================================================================

/// Query resolver returning canned rows and recording every request.
#[derive(Debug, Default)]
pub struct MockQueryResolver {
    rows: Vec<ResultRow>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockQueryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<ResultRow>) -> Self {
        Self {
            rows,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QueryResolver for MockQueryResolver {
    async fn resolve(&self, request: &SearchRequest) -> AssetdeskResult<Vec<ResultRow>> {
        self.requests
            .lock()
            .map_err(|_| AssetdeskError::LockPoisoned)?
            .push(request.clone());
        Ok(self.rows.clone())
    }
}

/// Query resolver that always fails.
#[derive(Debug, Clone)]
pub struct FailingQueryResolver {
    reason: String,
}

impl FailingQueryResolver {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl QueryResolver for FailingQueryResolver {
    async fn resolve(&self, _request: &SearchRequest) -> AssetdeskResult<Vec<ResultRow>> {
        Err(AssetdeskError::Resolver {
            reason: self.reason.clone(),
        })
    }
}

/// Membership evaluator with a fixed answer per predicate text.
#[derive(Debug, Clone, Default)]
pub struct StaticMembershipEvaluator {
    matches: BTreeMap<String, BTreeSet<EntityId>>,
}

impl StaticMembershipEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match(
        mut self,
        predicate: impl Into<String>,
        ids: impl IntoIterator<Item = EntityId>,
    ) -> Self {
        self.matches
            .insert(predicate.into(), ids.into_iter().collect());
        self
    }
}

#[async_trait]
impl GroupMembershipEvaluator for StaticMembershipEvaluator {
    async fn matching_entities(
        &self,
        predicate: &MembershipPredicate,
    ) -> AssetdeskResult<BTreeSet<EntityId>> {
        Ok(self
            .matches
            .get(predicate.as_str())
            .cloned()
            .unwrap_or_default())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for search protocol inputs.

    use super::*;
    use proptest::prelude::*;

    /// Raw inputs of one criterion: key, operator, raw value, invert.
    #[derive(Debug, Clone, PartialEq)]
    pub struct CriterionInput {
        pub key: String,
        pub operator: Operator,
        pub raw: String,
        pub invert: bool,
    }

    impl CriterionInput {
        /// Parameters in the singular shape.
        pub fn singular_params(&self) -> RequestParams {
            self.params_with_suffix("")
        }

        /// Parameters in the indexed shape at `index`.
        pub fn indexed_params(&self, index: usize) -> RequestParams {
            self.params_with_suffix(&index.to_string())
        }

        pub fn push_indexed(&self, params: &mut RequestParams, index: usize) {
            for (key, value) in self.params_with_suffix(&index.to_string()).iter() {
                params.push(key, value);
            }
        }

        fn params_with_suffix(&self, suffix: &str) -> RequestParams {
            [
                (format!("filter{suffix}"), self.key.clone()),
                (format!("search{suffix}"), self.raw.clone()),
                (format!("operator{suffix}"), self.operator.as_str().to_string()),
                (
                    format!("invert{suffix}"),
                    if self.invert { "1" } else { "0" }.to_string(),
                ),
            ]
            .into_iter()
            .collect()
        }
    }

    // === Enum Generators ===

    pub fn arb_value_type() -> impl Strategy<Value = ValueType> {
        prop_oneof![
            Just(ValueType::Text),
            Just(ValueType::Integer),
            Just(ValueType::Float),
            Just(ValueType::Date),
        ]
    }

    pub fn arb_operator() -> impl Strategy<Value = Operator> {
        prop_oneof![
            Just(Operator::Eq),
            Just(Operator::Ne),
            Just(Operator::Lt),
            Just(Operator::Le),
            Just(Operator::Ge),
            Just(Operator::Gt),
            Just(Operator::Like),
        ]
    }

    /// An operator permitted for `value_type`.
    pub fn arb_operator_for(value_type: ValueType) -> impl Strategy<Value = Operator> {
        prop::sample::select(value_type.allowed_operators().to_vec())
    }

    pub fn arb_sort_direction() -> impl Strategy<Value = SortDirection> {
        prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]
    }

    pub fn arb_jump_target() -> impl Strategy<Value = JumpTarget> {
        prop::sample::select(JumpTarget::ALL.to_vec())
    }

    pub fn arb_membership_override() -> impl Strategy<Value = MembershipOverride> {
        prop_oneof![
            Just(MembershipOverride::Automatic),
            Just(MembershipOverride::Always),
            Just(MembershipOverride::Never),
        ]
    }

    /// Override maps over a small id range so they overlap predicate matches.
    pub fn arb_overrides() -> impl Strategy<Value = BTreeMap<EntityId, MembershipOverride>> {
        prop::collection::btree_map(1i64..20, arb_membership_override(), 0..8)
    }

    pub fn arb_entity_set() -> impl Strategy<Value = BTreeSet<EntityId>> {
        prop::collection::btree_set(1i64..20, 0..10)
    }

    // === Key Generators ===

    /// Any builtin filter key.
    pub fn arb_builtin_key() -> impl Strategy<Value = String> {
        let keys: Vec<String> = FilterCatalog::builtin()
            .definitions()
            .map(|d| d.key.clone())
            .collect();
        prop::sample::select(keys)
    }

    /// An integer or date filter key.
    pub fn arb_ordinal_key() -> impl Strategy<Value = &'static str> {
        let keys: Vec<&'static str> = INTEGER_FILTERS
            .iter()
            .chain(DATE_FILTERS.iter())
            .copied()
            .collect();
        prop::sample::select(keys)
    }

    /// A key no builtin catalog knows.
    pub fn arb_unknown_key() -> impl Strategy<Value = String> {
        "Unknown[A-Za-z]{1,10}"
    }

    // === Value Generators ===

    /// A raw value that parses as `value_type`.
    pub fn arb_raw_value(value_type: ValueType) -> BoxedStrategy<String> {
        match value_type {
            ValueType::Text => "[A-Za-z0-9 ._*?-]{0,16}".boxed(),
            ValueType::Integer => any::<i32>().prop_map(|n| n.to_string()).boxed(),
            ValueType::Float => (-1.0e6f64..1.0e6).prop_map(|f| f.to_string()).boxed(),
            ValueType::Date => arb_date()
                .prop_map(|date| date.format("%Y-%m-%d").to_string())
                .boxed(),
        }
    }

    pub fn arb_date() -> impl Strategy<Value = chrono::NaiveDate> {
        (1990i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| {
            chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
        })
    }

    /// A criterion that is valid against the builtin catalog.
    pub fn arb_criterion_input() -> impl Strategy<Value = CriterionInput> {
        arb_builtin_key().prop_flat_map(|key| {
            let value_type = FilterCatalog::builtin()
                .value_type_of(&key)
                .unwrap_or(ValueType::Text);
            (
                Just(key),
                arb_operator_for(value_type),
                arb_raw_value(value_type),
                any::<bool>(),
            )
                .prop_map(|(key, operator, raw, invert)| CriterionInput {
                    key,
                    operator,
                    raw,
                    invert,
                })
        })
    }

    /// Arbitrary query strings, including malformed ones.
    pub fn arb_query_string() -> impl Strategy<Value = String> {
        let key = prop_oneof![
            prop::sample::select(vec![
                "filter",
                "search",
                "operator",
                "invert",
                "columns",
                "order",
                "direction",
                "jumpto",
                "distinct",
                "customSearch",
            ])
            .prop_map(str::to_string),
            (
                1u8..4,
                prop::sample::select(vec!["filter", "search", "operator", "invert"]),
            )
                .prop_map(|(index, name)| format!("{name}{index}")),
            "[a-z]{1,6}",
        ];
        let pair = (
            key,
            "[A-Za-z0-9%+.*-]{0,12}",
        )
            .prop_map(|(key, value)| format!("{key}={value}"));
        prop::collection::vec(pair, 0..8).prop_map(|pairs| pairs.join("&"))
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;
    use serde_json::json;

    /// Extensions registered by [`sample_catalog`].
    pub fn sample_extensions() -> CatalogExtensions {
        CatalogExtensions {
            user_defined_fields: vec![
                UserDefinedField {
                    name: "AssetTag".to_string(),
                    declared_type: DeclaredFieldType::Text,
                },
                UserDefinedField {
                    name: "PurchaseDate".to_string(),
                    declared_type: DeclaredFieldType::Date,
                },
            ],
            registry_values: vec!["BitLocker".to_string()],
        }
    }

    /// Builtin filters plus [`sample_extensions`].
    pub fn sample_catalog() -> FilterCatalog {
        FilterCatalog::with_extensions(&sample_extensions())
    }

    fn record(id: EntityId, fields: serde_json::Value) -> InventoryRecord {
        InventoryRecord {
            id,
            fields: serde_json::from_value(fields).expect("fixture fields are an object"),
        }
    }

    /// Five computers covering single and multi-valued fields.
    pub fn sample_records() -> Vec<InventoryRecord> {
        vec![
            record(1, json!({
                "Name": "test",
                "UserName": "alice",
                "InventoryDate": "2024-03-01",
                "OsName": "Windows 10",
                "CpuType": "Intel Core i5",
                "CpuClock": 2400,
                "PhysicalMemory": 8192,
                "Software.Name": ["Office 2019", "Firefox"],
                "UserDefinedInfo.AssetTag": "A-100",
            })),
            record(2, json!({
                "Name": "build01",
                "UserName": "bob",
                "InventoryDate": "2024-01-15",
                "OsName": "Linux",
                "CpuType": "AMD Ryzen 7",
                "CpuClock": 3600,
                "PhysicalMemory": 32768,
                "Software.Name": ["Firefox", "Git"],
            })),
            record(3, json!({
                "Name": "kiosk",
                "InventoryDate": "2023-12-24",
                "OsName": "Windows 10",
            })),
            record(4, json!({
                "Name": "ws-sales-01",
                "UserName": "carol",
                "InventoryDate": "2024-02-10",
                "OsName": "Windows 11",
                "CpuType": "Intel Core i5",
                "CpuClock": 2400,
                "Software.Name": ["Office 2021", "Office 2019"],
                "Registry.BitLocker": "enabled",
                "UserDefinedInfo.PurchaseDate": "2021-06-30",
            })),
            record(5, json!({
                "Name": "test-lab",
                "UserName": "dave",
                "InventoryDate": "2024-03-05",
                "OsName": "Linux",
                "CpuClock": 3000,
            })),
        ]
    }

    /// In-memory resolver over [`sample_records`] typed by [`sample_catalog`].
    pub fn sample_resolver() -> InMemoryQueryResolver {
        InMemoryQueryResolver::from_records(&sample_catalog(), sample_records())
            .expect("sample records match the sample catalog")
    }

    /// Build request parameters from literal pairs.
    pub fn params(pairs: &[(&str, &str)]) -> RequestParams {
        pairs.iter().copied().collect()
    }

    /// Strictly parse literal pairs against the sample catalog.
    pub fn parse_request(pairs: &[(&str, &str)]) -> Result<SearchRequest, SearchError> {
        let catalog = sample_catalog();
        let defaults = SearchDefaults::default();
        SearchRequestParser::new(&catalog, &defaults).parse(&params(pairs), ParseOptions::strict())
    }

    /// Dynamic group of Linux machines with one exclusion and one addition.
    pub fn linux_group() -> Group {
        let mut group = Group::new("Linux")
            .with_predicate(MembershipPredicate::new("filter=OsName&search=Linux"));
        group.description = Some("Linux workstations and servers".to_string());
        group.set_override(5, MembershipOverride::Never);
        group.set_override(3, MembershipOverride::Always);
        group
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion helpers for search-specific validation.

    use super::*;

    /// Assert that parsing failed with an unknown filter `key`.
    #[track_caller]
    pub fn assert_unknown_filter<T: std::fmt::Debug>(result: &Result<T, SearchError>, key: &str) {
        match result {
            Err(SearchError::UnknownFilter { key: actual, .. }) => {
                assert_eq!(actual, key, "Wrong key in UnknownFilter error");
            }
            other => panic!("Expected UnknownFilter({}), got: {:?}", key, other),
        }
    }

    /// Assert that parsing failed validation on request parameter `field`.
    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(
        result: &Result<T, SearchError>,
        field: &str,
    ) {
        match result {
            Err(err @ SearchError::Validation(_)) => {
                assert_eq!(err.param(), Some(field), "Wrong parameter in {:?}", err);
            }
            other => panic!("Expected validation error on {}, got: {:?}", field, other),
        }
    }

    /// Assert the entity ids of result rows, in order.
    #[track_caller]
    pub fn assert_row_ids(rows: &[ResultRow], expected: &[EntityId]) {
        let actual: Vec<EntityId> = rows.iter().map(|row| row.id).collect();
        assert_eq!(actual, expected, "Unexpected result rows");
    }

    /// Assert the selected columns of a request.
    #[track_caller]
    pub fn assert_columns(request: &SearchRequest, expected: &[&str]) {
        assert_eq!(request.columns, expected, "Unexpected result columns");
    }
}

// ============================================================================
// TESTS
// ============================================================================
