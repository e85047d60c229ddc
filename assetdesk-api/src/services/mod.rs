//! Service Layer
//!
//! Group bookkeeping and saved-search evaluation, kept out of the route
//! handlers so that they stay thin request/response adapters.

mod group_store;
mod saved_search;

pub use group_store::*;
pub use saved_search::*;
