// viz-service/src/org_scope.rs
use crate::error_handler::ServiceError;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{err, ok, Ready};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct OrganizationQuery {
    #[serde(rename = "organizationId")]
    organization_id: Option<String>,
}

/// The tenant a dashboard request is scoped to, taken from the
/// `organizationId` query parameter. Every dashboard handler requires it, so
/// a missing or malformed id is rejected before the handler body runs.
#[derive(Debug, Clone, Copy)]
pub struct OrganizationScope {
    pub id: Uuid,
}

impl FromRequest for OrganizationScope {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let query = match web::Query::<OrganizationQuery>::from_query(req.query_string()) {
            Ok(query) => query.into_inner(),
            Err(parse_err) => {
                log::warn!(
                    "Could not parse query string '{}': {}",
                    req.query_string(),
                    parse_err
                );
                return err(ServiceError::BadRequest(
                    "Invalid query string.".to_string(),
                ));
            }
        };

        let raw = match query.organization_id {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                log::warn!("Missing organization ID on {}", req.path());
                return err(ServiceError::BadRequest(
                    "Missing organization ID".to_string(),
                ));
            }
        };

        match Uuid::parse_str(&raw) {
            Ok(id) => ok(OrganizationScope { id }),
            Err(parse_err) => {
                log::warn!("Failed to parse organizationId '{}': {}", raw, parse_err);
                err(ServiceError::BadRequest(
                    "Invalid organization ID format (not a valid UUID).".to_string(),
                ))
            }
        }
    }
}
