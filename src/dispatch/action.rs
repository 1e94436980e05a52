//! Actions and their route metadata.
//!
//! # Responsibilities
//! - Describe an action: name, verbs, roles, parameter shapes, handler
//! - Invoke the handler, turning panics into errors
//!
//! # Design Decisions
//! - Metadata is fixed when the action is built and never changes
//! - Verbs and roles are sequences, so resolution order is reproducible

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;

use crate::dispatch::binder::{Arguments, Composite, Parameter};
use crate::dispatch::controller::RegistrationError;
use crate::dispatch::convert::Primitive;
use crate::dispatch::request::Request;

/// Error returned by an action body.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// What an action hands to the view provider.
pub type ActionResult = Result<serde_json::Value, ActionError>;

type Handler = dyn Fn(&Request, &Arguments) -> ActionResult + Send + Sync;

/// Verbs an action answers to and roles allowed to invoke it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub verbs: Vec<Method>,
    /// Empty means unrestricted.
    pub roles: Vec<String>,
}

impl RouteMeta {
    pub fn supports(&self, verb: &Method) -> bool {
        self.verbs.contains(verb)
    }
}

/// An action body panicked.
#[derive(Debug, Error)]
#[error("action panicked: {0}")]
pub struct ActionPanic(pub String);

impl ActionPanic {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self(message)
    }
}

/// An invocable unit within a controller.
#[derive(Clone)]
pub struct Action {
    name: String,
    meta: RouteMeta,
    parameters: Vec<Parameter>,
    handler: Arc<Handler>,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("meta", &self.meta)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl Action {
    pub fn builder(name: impl Into<String>) -> ActionBuilder {
        ActionBuilder {
            name: name.into(),
            meta: RouteMeta::default(),
            parameters: Vec::new(),
            handler: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &RouteMeta {
        &self.meta
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Exact name match and a declared verb.
    pub fn matches(&self, name: &str, verb: &Method) -> bool {
        self.name == name && self.meta.supports(verb)
    }

    /// Run the handler. A panic inside the body becomes an `ActionPanic`.
    pub fn invoke(&self, request: &Request, arguments: Arguments) -> ActionResult {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.handler)(request, &arguments))) {
            Ok(result) => result,
            Err(payload) => Err(Box::new(ActionPanic::from_payload(payload))),
        }
    }
}

/// Builder for [`Action`].
pub struct ActionBuilder {
    name: String,
    meta: RouteMeta,
    parameters: Vec<Parameter>,
    handler: Option<Arc<Handler>>,
}

impl ActionBuilder {
    pub fn verb(mut self, verb: Method) -> Self {
        if !self.meta.verbs.contains(&verb) {
            self.meta.verbs.push(verb);
        }
        self
    }

    pub fn get(self) -> Self {
        self.verb(Method::GET)
    }

    pub fn post(self) -> Self {
        self.verb(Method::POST)
    }

    pub fn put(self) -> Self {
        self.verb(Method::PUT)
    }

    pub fn delete(self) -> Self {
        self.verb(Method::DELETE)
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        let role = role.into();
        if !self.meta.roles.contains(&role) {
            self.meta.roles.push(role);
        }
        self
    }

    /// Declare the next parameter as a primitive.
    pub fn param<T: Primitive>(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter::primitive::<T>(name));
        self
    }

    /// Declare the next parameter as a composite.
    pub fn object<T: Composite>(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter::composite::<T>(name));
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Request, &Arguments) -> ActionResult + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<Action, RegistrationError> {
        if self.meta.verbs.is_empty() {
            return Err(RegistrationError::NoVerbs { action: self.name });
        }
        let handler = self
            .handler
            .ok_or_else(|| RegistrationError::MissingHandler { action: self.name.clone() })?;

        Ok(Action {
            name: self.name,
            meta: self.meta,
            parameters: self.parameters,
            handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> Request {
        Request::new(Method::GET, "site", "Items", "List")
    }

    #[test]
    fn test_builder_collects_metadata() {
        let action = Action::builder("Create")
            .post()
            .post()
            .role("Admin")
            .role("Editor")
            .param::<String>("name")
            .handler(|_, _| Ok(json!(null)))
            .build()
            .unwrap();

        assert_eq!(action.meta().verbs, vec![Method::POST]);
        assert_eq!(action.meta().roles, vec!["Admin", "Editor"]);
        assert_eq!(action.parameters().len(), 1);
        assert!(action.matches("Create", &Method::POST));
        assert!(!action.matches("Create", &Method::GET));
        assert!(!action.matches("create", &Method::POST));
    }

    #[test]
    fn test_build_requires_verbs_and_handler() {
        let err = Action::builder("List").handler(|_, _| Ok(json!(null))).build().unwrap_err();
        assert!(matches!(err, RegistrationError::NoVerbs { .. }));

        let err = Action::builder("List").get().build().unwrap_err();
        assert!(matches!(err, RegistrationError::MissingHandler { .. }));
    }

    #[test]
    fn test_invoke_returns_handler_result() {
        let action = Action::builder("List")
            .get()
            .handler(|req, _| Ok(json!({ "controller": req.controller_name })))
            .build()
            .unwrap();

        let model = action.invoke(&request(), Arguments::default()).unwrap();
        assert_eq!(model, json!({ "controller": "Items" }));
    }

    #[test]
    fn test_invoke_catches_panics() {
        let action = Action::builder("List")
            .get()
            .handler(|_, _| panic!("boom"))
            .build()
            .unwrap();

        let err = action.invoke(&request(), Arguments::default()).unwrap_err();
        assert_eq!(err.to_string(), "action panicked: boom");
    }
}
