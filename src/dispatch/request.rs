//! Dispatch request model.
//!
//! # Responsibilities
//! - Carry everything the pipeline reads: site, controller, action, verb,
//!   positional url values, named fields and the caller's identity
//! - Split a URL path into the `/{controller}/{action}/{values...}` convention
//! - Pair a request with the site that accepted it (`Routed`)
//!
//! # Design Decisions
//! - Requests are owned values; nothing in the pipeline mutates them
//! - The site back-reference lives in `Routed`, built once by the site

use std::collections::{HashMap, HashSet};

use axum::http::Method;

use crate::dispatch::site::Site;

/// Action name used when the path names only a controller.
pub const DEFAULT_ACTION: &str = "Index";

/// The authenticated caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub name: Option<String>,
    pub roles: HashSet<String>,
}

impl User {
    /// A caller with no name and no roles.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new<I, R>(name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            name: Some(name.into()),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// A request as seen by the dispatch pipeline.
#[derive(Debug, Clone)]
pub struct Request {
    /// Logical site name (usually the Host header without port).
    pub site_name: String,
    /// Requested controller name, matched by prefix.
    pub controller_name: String,
    /// Requested action name, matched exactly.
    pub action_name: String,
    pub verb: Method,
    /// Path segments after the action, in order.
    pub url_values: Vec<String>,
    /// Named fields from the query string and form body.
    pub fields: HashMap<String, String>,
    /// Path relative to a site's static root.
    pub file_path: String,
    pub user: User,
    pub request_id: Option<String>,
}

impl Request {
    pub fn new(
        verb: Method,
        site_name: impl Into<String>,
        controller_name: impl Into<String>,
        action_name: impl Into<String>,
    ) -> Self {
        Self {
            site_name: site_name.into(),
            controller_name: controller_name.into(),
            action_name: action_name.into(),
            verb,
            url_values: Vec::new(),
            fields: HashMap::new(),
            file_path: String::new(),
            user: User::anonymous(),
            request_id: None,
        }
    }

    /// Build a request from a URL path of the form
    /// `/{controller}/{action}/{value}/{value}...`.
    ///
    /// Segments are percent-decoded. A path with only a controller segment
    /// gets the `Index` action; an empty path names no controller at all.
    pub fn from_path(verb: Method, site_name: impl Into<String>, path: &str) -> Self {
        let mut segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(decode_segment);

        let controller_name = segments.next().unwrap_or_default();
        let action_name = if controller_name.is_empty() {
            String::new()
        } else {
            segments.next().unwrap_or_else(|| DEFAULT_ACTION.to_string())
        };

        let mut request = Self::new(verb, site_name, controller_name, action_name);
        request.url_values = segments.collect();
        request.file_path = decode_segment(path.trim_start_matches('/'));
        request
    }

    pub fn with_url_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.url_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_fields(mut self, fields: HashMap<String, String>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }

    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = path.into();
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// A request paired with the site that accepted it.
pub struct Routed<'a> {
    site: &'a dyn Site,
    request: Request,
}

impl<'a> Routed<'a> {
    pub fn new(site: &'a dyn Site, request: Request) -> Self {
        Self { site, request }
    }

    pub fn site(&self) -> &'a dyn Site {
        self.site
    }

    pub fn request(&self) -> &Request {
        &self.request
    }
}
