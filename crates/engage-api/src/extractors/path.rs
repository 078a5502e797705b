//! Path parameter extractors
//!
//! Raw path segments are kept as strings and parsed in the accessors so a bad id
//! reports which parameter was wrong.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use engage_core::ReferenceType;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::response::ApiError;

/// Path extractor whose rejection is an [`ApiError`]
#[derive(Debug, Clone)]
pub struct ParsedPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ParsedPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        Ok(ParsedPath(inner))
    }
}

fn parse_uuid(raw: &str, name: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::invalid_path(format!("Invalid {name} format")))
}

/// `/reactions/{reference_type}/{reference_id}`
#[derive(Debug, Deserialize)]
pub struct ReactionTargetPath {
    pub reference_type: String,
    pub reference_id: String,
}

impl ReactionTargetPath {
    pub fn reference_type(&self) -> Result<ReferenceType, ApiError> {
        self.reference_type
            .parse()
            .map_err(|_| ApiError::invalid_path("reference_type must be thread, post, or menfess"))
    }

    pub fn reference_id(&self) -> Result<Uuid, ApiError> {
        parse_uuid(&self.reference_id, "reference_id")
    }
}

/// Path parameters with thread_id
#[derive(Debug, Deserialize)]
pub struct ThreadIdPath {
    pub thread_id: String,
}

impl ThreadIdPath {
    pub fn thread_id(&self) -> Result<Uuid, ApiError> {
        parse_uuid(&self.thread_id, "thread_id")
    }
}

/// Path parameters with user_id
#[derive(Debug, Deserialize)]
pub struct UserIdPath {
    pub user_id: String,
}

impl UserIdPath {
    pub fn user_id(&self) -> Result<Uuid, ApiError> {
        parse_uuid(&self.user_id, "user_id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_target_parsing() {
        let path = ReactionTargetPath {
            reference_type: "menfess".to_string(),
            reference_id: Uuid::nil().to_string(),
        };
        assert_eq!(path.reference_type().unwrap(), ReferenceType::Menfess);
        assert_eq!(path.reference_id().unwrap(), Uuid::nil());

        let bad = ReactionTargetPath {
            reference_type: "comment".to_string(),
            reference_id: "42".to_string(),
        };
        assert!(bad.reference_type().is_err());
        assert!(bad.reference_id().is_err());
    }
}
