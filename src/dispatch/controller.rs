//! Controllers and action resolution.
//!
//! # Responsibilities
//! - Accept requests whose controller name prefixes the identifier
//!   ("Users" is accepted by "UsersController")
//! - Resolve an action by exact name and declared verb
//! - Run authorize → bind → invoke → render and write one outcome
//! - Order a site's controllers for first-match selection
//!
//! # Design Decisions
//! - Controllers are shared across concurrent requests and hold no
//!   request state
//! - Ambiguous actions (same name, overlapping verbs) fail at build time
//!   instead of depending on declaration order at runtime

use std::cmp::Reverse;
use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;

use crate::dispatch::action::{Action, ActionBuilder};
use crate::dispatch::authorization::{authorize, Authorization};
use crate::dispatch::binder::bind;
use crate::dispatch::request::{Request, Routed};
use crate::dispatch::response::Response;
use crate::dispatch::site::Priority;

/// Errors detected while registering controllers and actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("controller identifier must not be empty")]
    EmptyIdentifier,

    #[error("action `{action}` declares no HTTP verbs")]
    NoVerbs { action: String },

    #[error("action `{action}` has no handler")]
    MissingHandler { action: String },

    #[error("controller `{controller}` declares action `{action}` twice for {verb}")]
    AmbiguousAction {
        controller: String,
        action: String,
        verb: String,
    },
}

/// A group of actions selected by controller name.
pub trait Controller: Send + Sync {
    fn identifier(&self) -> &str;

    fn priority(&self) -> Priority {
        Priority::Normal
    }

    /// Case-sensitive prefix match of the requested controller name.
    fn can_handle(&self, request: &Request) -> bool {
        !request.controller_name.is_empty() && self.identifier().starts_with(request.controller_name.as_str())
    }

    fn handle(&self, routed: &Routed<'_>, response: &mut Response);
}

/// Controller backed by an explicit action table.
#[derive(Debug)]
pub struct ActionController {
    identifier: String,
    priority: Priority,
    actions: Vec<Action>,
}

impl ActionController {
    pub fn builder(identifier: impl Into<String>) -> ActionControllerBuilder {
        ActionControllerBuilder {
            identifier: identifier.into(),
            priority: Priority::Normal,
            actions: Vec::new(),
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// First action, in registration order, with this name and verb.
    pub fn resolve(&self, action_name: &str, verb: &Method) -> Option<&Action> {
        self.actions.iter().find(|action| action.matches(action_name, verb))
    }
}

impl Controller for ActionController {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn handle(&self, routed: &Routed<'_>, response: &mut Response) {
        let request = routed.request();

        let Some(action) = self.resolve(&request.action_name, &request.verb) else {
            tracing::debug!(
                controller = %self.identifier,
                action = %request.action_name,
                verb = %request.verb,
                "No action matched"
            );
            response.not_found();
            return;
        };

        if authorize(action.meta(), &request.user) == Authorization::Deny {
            tracing::info!(
                controller = %self.identifier,
                action = %action.name(),
                user = ?request.user.name,
                "Caller lacks a required role"
            );
            response.not_allowed();
            return;
        }

        let arguments = match bind(action.parameters(), request) {
            Ok(arguments) => arguments,
            Err(e) => {
                tracing::warn!(
                    controller = %self.identifier,
                    action = %action.name(),
                    error = %e,
                    "Binding failed"
                );
                response.bad_request(e);
                return;
            }
        };

        let model = match action.invoke(request, arguments) {
            Ok(model) => model,
            Err(e) => {
                tracing::error!(
                    controller = %self.identifier,
                    action = %action.name(),
                    error = %e,
                    "Action failed"
                );
                response.internal_error(e);
                return;
            }
        };

        let site = routed.site();
        match site.view_provider().render(site, request, &model) {
            Ok(view) => response.write_body(view.content, view.content_type),
            Err(e) => {
                tracing::error!(site = %site.name(), error = %e, "View rendering failed");
                response.internal_error(Box::new(e));
            }
        }
    }
}

/// Builder for [`ActionController`].
pub struct ActionControllerBuilder {
    identifier: String,
    priority: Priority,
    actions: Vec<ActionBuilder>,
}

impl ActionControllerBuilder {
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn action(mut self, action: ActionBuilder) -> Self {
        self.actions.push(action);
        self
    }

    pub fn build(self) -> Result<ActionController, RegistrationError> {
        if self.identifier.is_empty() {
            return Err(RegistrationError::EmptyIdentifier);
        }

        let actions = self
            .actions
            .into_iter()
            .map(ActionBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;

        for (index, action) in actions.iter().enumerate() {
            for earlier in actions[..index].iter().filter(|a| a.name() == action.name()) {
                if let Some(verb) = action.meta().verbs.iter().find(|v| earlier.meta().supports(v)) {
                    return Err(RegistrationError::AmbiguousAction {
                        controller: self.identifier,
                        action: action.name().to_string(),
                        verb: verb.to_string(),
                    });
                }
            }
        }

        Ok(ActionController {
            identifier: self.identifier,
            priority: self.priority,
            actions,
        })
    }
}

/// Picks the controller for a request within one site.
pub trait ControllerProvider: Send + Sync {
    fn controller_for(&self, request: &Request) -> Option<&dyn Controller>;

    /// Identifiers in selection order.
    fn identifiers(&self) -> Vec<&str>;
}

/// Builds a site's controller provider from its controller set.
pub trait ControllerProviderFactory: Send + Sync {
    fn create(&self, controllers: Vec<Arc<dyn Controller>>) -> Box<dyn ControllerProvider>;
}

/// First match by descending priority, ties in registration order.
pub struct OrderedControllers {
    controllers: Vec<Arc<dyn Controller>>,
}

impl OrderedControllers {
    pub fn new(mut controllers: Vec<Arc<dyn Controller>>) -> Self {
        controllers.sort_by_key(|c| Reverse(c.priority()));
        Self { controllers }
    }
}

impl ControllerProvider for OrderedControllers {
    fn controller_for(&self, request: &Request) -> Option<&dyn Controller> {
        self.controllers
            .iter()
            .find(|c| c.can_handle(request))
            .map(|c| c.as_ref())
    }

    fn identifiers(&self) -> Vec<&str> {
        self.controllers.iter().map(|c| c.identifier()).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderedControllersFactory;

impl ControllerProviderFactory for OrderedControllersFactory {
    fn create(&self, controllers: Vec<Arc<dyn Controller>>) -> Box<dyn ControllerProvider> {
        Box::new(OrderedControllers::new(controllers))
    }
}
