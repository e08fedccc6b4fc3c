//! Explicit session contexts for the customer and admin surfaces
//!
//! Authentication is done by an external identity provider. What reaches this
//! crate is an already-authenticated identity, carried in one of two distinct
//! types so a customer session can never be mistaken for an admin one:
//!
//! - [`CustomerSession`]: renter identity, copied into rentals at booking time
//! - [`AdminSession`]: console operator identity
//!
//! Adapters take the session they need by reference; there is no ambient
//! "current user".

use crate::core::error::{Result, VelocityError};
use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Authenticated customer, with the profile fields copied into bookings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSession {
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

impl CustomerSession {
    pub fn new(
        user_id: impl Into<String>,
        full_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            full_name: full_name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

/// Authenticated console operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSession {
    pub admin_id: String,
    pub email: String,
}

impl AdminSession {
    pub fn new(admin_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            admin_id: admin_id.into(),
            email: email.into(),
        }
    }
}

/// Resolves sessions from incoming HTTP requests
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolve the customer session, or fail with `Unauthorized`
    async fn customer_session(&self, headers: &HeaderMap) -> Result<CustomerSession>;

    /// Resolve the admin session, or fail with `Unauthorized`
    async fn admin_session(&self, headers: &HeaderMap) -> Result<AdminSession>;
}

/// Session provider trusting identity headers set by an upstream auth gateway
///
/// Customer headers: `x-user-id`, `x-user-name`, `x-user-email`, `x-user-phone`.
/// Admin headers: `x-admin-id`, `x-admin-email`.
///
/// Only suitable behind a gateway that strips these headers from client
/// traffic and sets them after verifying the identity token.
#[derive(Debug, Clone, Default)]
pub struct HeaderSessionProvider;

impl HeaderSessionProvider {
    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn required(headers: &HeaderMap, name: &str) -> Result<String> {
        Self::header(headers, name)
            .map(str::to_string)
            .ok_or_else(|| VelocityError::Unauthorized(format!("missing {} header", name)))
    }
}

#[async_trait]
impl SessionProvider for HeaderSessionProvider {
    async fn customer_session(&self, headers: &HeaderMap) -> Result<CustomerSession> {
        let user_id = Self::required(headers, "x-user-id")?;
        Ok(CustomerSession {
            user_id,
            full_name: Self::header(headers, "x-user-name").unwrap_or_default().to_string(),
            email: Self::header(headers, "x-user-email").unwrap_or_default().to_string(),
            phone: Self::header(headers, "x-user-phone").unwrap_or_default().to_string(),
        })
    }

    async fn admin_session(&self, headers: &HeaderMap) -> Result<AdminSession> {
        let admin_id = Self::required(headers, "x-admin-id")?;
        let email = Self::header(headers, "x-admin-email").unwrap_or_default().to_string();
        Ok(AdminSession { admin_id, email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn test_customer_session_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("uid-1"));
        headers.insert("x-user-name", HeaderValue::from_static("Maria Santos"));
        headers.insert("x-user-email", HeaderValue::from_static("maria@example.com"));

        let session = HeaderSessionProvider
            .customer_session(&headers)
            .await
            .unwrap();
        assert_eq!(session.user_id, "uid-1");
        assert_eq!(session.full_name, "Maria Santos");
        assert_eq!(session.phone, "");
    }

    #[tokio::test]
    async fn test_missing_user_id_is_unauthorized() {
        let err = HeaderSessionProvider
            .customer_session(&HeaderMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_customer_headers_do_not_grant_admin() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("uid-1"));

        let err = HeaderSessionProvider
            .admin_session(&headers)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
}
