//! Path extractor for per-computer group membership routes.

use assetdesk_core::EntityId;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::ApiError;

/// Group names are stored trimmed; every route looks them up the same way.
pub fn group_name(raw: &str) -> Result<&str, ApiError> {
    match raw.trim() {
        "" => Err(ApiError::missing_field("name")),
        name => Ok(name),
    }
}

/// `/groups/:name/members/:id` with a validated computer id.
///
/// Unlike `Path<(String, EntityId)>`, a malformed id is reported through the
/// JSON error envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPath {
    pub group: String,
    pub id: EntityId,
}

#[async_trait]
impl<S> FromRequestParts<S> for MemberPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((group, raw_id)): Path<(String, String)> =
            Path::from_request_parts(parts, state)
                .await
                .map_err(|e| ApiError::invalid_input(format!("Invalid member path: {}", e)))?;

        let id = raw_id.parse::<EntityId>().map_err(|_| {
            ApiError::invalid_input(format!("Invalid computer id '{}'", raw_id))
                .with_details(serde_json::json!({ "field": "id" }))
        })?;

        let group = group_name(&group)?.to_string();
        Ok(MemberPath { group, id })
    }
}
