//! ASSETDESK Core - Inventory Search Protocol
//!
//! Domain types and pure algorithms shared by the API layer: the filter
//! catalog, criteria and request parsing, result column selection, group
//! membership rules and the query resolver interface.
//!
//! Nothing in this crate performs I/O. Collaborators that touch storage
//! (query resolution, membership predicate evaluation) are traits.

pub mod catalog;
pub mod columns;
pub mod config;
pub mod encoding;
pub mod enums;
pub mod error;
pub mod filter;
pub mod membership;
pub mod resolver;
pub mod search;
pub mod value;

/// Inventory entity identifier (computer id).
pub type EntityId = i64;

pub use catalog::{
    CatalogExtensions, CatalogHandle, FilterCatalog, FilterDefinition, UserDefinedField,
    DATE_FILTERS, INTEGER_FILTERS, REGISTRY_PREFIX, USER_DEFINED_PREFIX,
};
pub use columns::select_columns;
pub use config::SearchDefaults;
pub use encoding::{decode_field_name, encode_field_name};
pub use enums::{
    DeclaredFieldType, EnumParseError, JumpTarget, MembershipOverride, Operator, SortDirection,
    ValueType,
};
pub use error::{AssetdeskError, AssetdeskResult, ConfigError, SearchError, ValidationError};
pub use filter::{CriterionParams, FilterCriterion};
pub use membership::{resolve_membership, Group, GroupMembershipEvaluator, MembershipPredicate};
pub use resolver::{InMemoryQueryResolver, InventoryRecord, QueryResolver, ResultRow};
pub use search::{ParseMode, ParseOptions, RequestParams, SearchRequest, SearchRequestParser};
pub use value::{like_matches, TypedValue, DATE_FORMAT};
