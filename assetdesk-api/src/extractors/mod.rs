//! Custom request extractors.

pub mod member_path;
pub mod search_query;

pub use member_path::{group_name, MemberPath};
pub use search_query::{parse_query_string, to_query_string, SearchQuery};
