//! API Request and Response Types
//!
//! This module defines all request and response types for the assetdesk API.

// Catalog types
mod catalog;
pub use catalog::*;

// Computer list and search form types
mod computer;
pub use computer::*;

// Group types
mod group;
pub use group::*;
