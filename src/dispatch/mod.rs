//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Request (site, controller, action, verb, url values, fields, user)
//!     → host.rs (first site by priority whose can_handle is true)
//!     → site.rs (Routed back-reference, controller provider)
//!     → controller.rs
//!         → action.rs (resolve by name + verb)
//!         → authorization.rs (role gate)
//!         → binder.rs (positional or by-name arguments)
//!         → convert.rs (text → primitive value)
//!         → invoke handler
//!     → view.rs (model → content + content type)
//!     → response.rs (exactly one Outcome)
//!
//! No controller matched:
//!     → static_files.rs (file under the site root, else NotFound)
//! ```
//!
//! # Design Decisions
//! - Sites, controllers and actions are registered once at startup and
//!   never mutated, so dispatch needs no locks
//! - Registration order is a sequence, never a set: resolution is
//!   reproducible
//! - Ambiguous actions (same name and verb) are rejected at build time
//! - Every failure is converted to an Outcome at the controller boundary

pub mod action;
pub mod authorization;
pub mod binder;
pub mod controller;
pub mod convert;
pub mod host;
pub mod request;
pub mod response;
pub mod site;
pub mod static_files;
pub mod view;

pub use action::{Action, ActionBuilder, ActionError, RouteMeta};
pub use authorization::{authorize, Authorization};
pub use binder::{bind, Argument, ArgumentError, Arguments, BindError, Composite, Parameter, Property, Shape};
pub use controller::{
    ActionController, ActionControllerBuilder, Controller, ControllerProvider, ControllerProviderFactory,
    OrderedControllers, OrderedControllersFactory, RegistrationError,
};
pub use convert::{convert, ConvertError, Primitive, PrimitiveKind, Value};
pub use host::{Dispatched, Host, HostError};
pub use request::{Request, Routed, User};
pub use response::{Outcome, Response};
pub use site::{Priority, Site, WebSite, WebSiteBuilder};
pub use static_files::StaticFiles;
pub use view::{JsonViewProvider, TextViewProvider, ViewError, ViewKind, ViewProvider, ViewResult};
