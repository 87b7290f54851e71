//! Caller identity extraction.
//!
//! Authentication happens upstream at the gateway, which forwards the
//! resolved identity in `x-actor-id` and `x-actor-role` headers. The
//! extractor turns those into an [`Actor`] and rejects requests where the
//! headers are missing or malformed.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use telestaff_service::{Actor, Role};

use crate::error::AppError;

/// Extracts the acting user from the gateway identity headers.
#[derive(Debug, Clone)]
pub struct CallerActor(pub Actor);

impl<S> FromRequestParts<S> for CallerActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, "x-actor-id")?
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("x-actor-id must be a numeric id".into()))?;

        let role = Role::parse(header_value(parts, "x-actor-role")?)
            .map_err(|err| AppError::Unauthorized(err.to_string()))?;

        Ok(CallerActor(Actor::new(id, role)))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {name} header")))?
        .to_str()
        .map_err(|_| AppError::Unauthorized(format!("Invalid {name} header")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    async fn extract(headers: &[(&str, &str)]) -> Result<CallerActor, AppError> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CallerActor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn extracts_valid_identity() {
        let CallerActor(actor) = extract(&[("x-actor-id", "42"), ("x-actor-role", "coordinator")])
            .await
            .unwrap();
        assert_eq!(actor.id, 42);
        assert_eq!(actor.role, Role::Coordinator);
    }

    #[tokio::test]
    async fn rejects_missing_headers() {
        assert!(extract(&[]).await.is_err());
        assert!(extract(&[("x-actor-id", "42")]).await.is_err());
    }

    #[tokio::test]
    async fn rejects_bad_values() {
        assert!(extract(&[("x-actor-id", "abc"), ("x-actor-role", "coordinator")])
            .await
            .is_err());
        assert!(extract(&[("x-actor-id", "1"), ("x-actor-role", "superuser")])
            .await
            .is_err());
    }
}
