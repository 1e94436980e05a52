//! Identity middleware.
//! Attaches the caller's `User` to the request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::dispatch::request::User;

pub const X_USER: &str = "x-user";
pub const X_USER_ROLES: &str = "x-user-roles";

/// Whether identity headers are honoured.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityState {
    pub trust_headers: bool,
}

pub async fn identity_middleware(
    State(state): State<IdentityState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Untrusted headers are ignored entirely; anyone could send them.
    let user = if state.trust_headers {
        match user_from_headers(req.headers()) {
            Ok(user) => user,
            Err(header) => {
                tracing::warn!(header = header, "Invalid identity header");
                return (StatusCode::BAD_REQUEST, "Invalid identity header").into_response();
            }
        }
    } else {
        User::anonymous()
    };

    req.extensions_mut().insert(user);
    next.run(req).await
}

/// Read `X-User` and the comma-separated `X-User-Roles`.
///
/// No `X-User` means anonymous, whatever roles are sent. Returns the
/// offending header name when a value is not valid UTF-8.
pub fn user_from_headers(headers: &HeaderMap) -> Result<User, &'static str> {
    let name = match headers.get(X_USER) {
        Some(value) => value.to_str().map_err(|_| X_USER)?.trim(),
        None => return Ok(User::anonymous()),
    };
    if name.is_empty() {
        return Ok(User::anonymous());
    }

    let roles = match headers.get(X_USER_ROLES) {
        Some(value) => value.to_str().map_err(|_| X_USER_ROLES)?,
        None => "",
    };

    Ok(User::new(
        name,
        roles.split(',').map(str::trim).filter(|role| !role.is_empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_user_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(X_USER, HeaderValue::from_static("ann"));
        headers.insert(X_USER_ROLES, HeaderValue::from_static("Admin, Editor,,"));

        let user = user_from_headers(&headers).unwrap();
        assert_eq!(user.name.as_deref(), Some("ann"));
        assert_eq!(user.roles.len(), 2);
        assert!(user.has_role("Admin"));
        assert!(user.has_role("Editor"));
    }

    #[test]
    fn test_roles_without_name_are_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(X_USER_ROLES, HeaderValue::from_static("Admin"));
        assert_eq!(user_from_headers(&headers).unwrap(), User::anonymous());
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(X_USER, HeaderValue::from_bytes(b"\xffann").unwrap());
        assert_eq!(user_from_headers(&headers), Err(X_USER));
    }
}
