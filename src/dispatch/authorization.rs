//! Role-based authorization gate.

use crate::dispatch::action::RouteMeta;
use crate::dispatch::request::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Allow,
    Deny,
}

/// An action with no declared roles is open to everyone; otherwise the
/// caller needs any one of the declared roles.
pub fn authorize(meta: &RouteMeta, user: &User) -> Authorization {
    if meta.roles.is_empty() || meta.roles.iter().any(|role| user.has_role(role)) {
        Authorization::Allow
    } else {
        Authorization::Deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    fn meta(roles: &[&str]) -> RouteMeta {
        RouteMeta {
            verbs: vec![Method::GET],
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_unrestricted_allows_anyone() {
        assert_eq!(authorize(&meta(&[]), &User::anonymous()), Authorization::Allow);
    }

    #[test]
    fn test_any_declared_role_suffices() {
        let restricted = meta(&["Admin", "Editor"]);
        assert_eq!(authorize(&restricted, &User::new("e", ["Editor"])), Authorization::Allow);
        assert_eq!(authorize(&restricted, &User::new("v", ["Viewer"])), Authorization::Deny);
        assert_eq!(authorize(&restricted, &User::anonymous()), Authorization::Deny);
    }

    #[test]
    fn test_role_names_are_case_sensitive() {
        assert_eq!(authorize(&meta(&["Admin"]), &User::new("a", ["admin"])), Authorization::Deny);
    }
}
