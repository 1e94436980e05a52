//! Sites: named virtual hosts owning controllers and a static root.
//!
//! # Responsibilities
//! - Accept requests addressed to the site's name (or any request when
//!   the site is the default)
//! - Establish the request's site back-reference before any controller
//!   sees it
//! - Fall back to static files when no controller accepts the request
//!
//! # Design Decisions
//! - Built once from configuration and immutable afterwards
//! - Controller selection is delegated to a `ControllerProvider` created
//!   by a pluggable factory

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dispatch::controller::{Controller, ControllerProvider, ControllerProviderFactory, OrderedControllersFactory};
use crate::dispatch::request::{Request, Routed};
use crate::dispatch::response::Response;
use crate::dispatch::static_files::StaticFiles;
use crate::dispatch::view::{TextViewProvider, ViewProvider};

/// Selection priority; higher is consulted first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        };
        f.write_str(name)
    }
}

/// A virtual host the [`Host`](crate::dispatch::Host) can route to.
pub trait Site: Send + Sync {
    fn name(&self) -> &str;

    fn port(&self) -> u16;

    fn priority(&self) -> Priority;

    fn is_default(&self) -> bool;

    fn view_provider(&self) -> &dyn ViewProvider;

    fn can_handle(&self, request: &Request) -> bool {
        self.is_default() || self.name() == request.site_name
    }

    fn handle(&self, request: Request, response: &mut Response);
}

/// The standard site: controllers first, then static files.
pub struct WebSite {
    name: String,
    port: u16,
    priority: Priority,
    is_default: bool,
    static_files: Option<StaticFiles>,
    view_provider: Arc<dyn ViewProvider>,
    controllers: Box<dyn ControllerProvider>,
}

impl fmt::Debug for WebSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSite")
            .field("name", &self.name)
            .field("port", &self.port)
            .field("priority", &self.priority)
            .field("is_default", &self.is_default)
            .field("static_root", &self.static_root())
            .field("controllers", &self.controllers.identifiers())
            .finish()
    }
}

impl WebSite {
    pub fn builder(name: impl Into<String>, port: u16) -> WebSiteBuilder {
        WebSiteBuilder {
            name: name.into(),
            port,
            priority: Priority::Normal,
            is_default: false,
            static_root: None,
            view_provider: None,
            factory: Arc::new(OrderedControllersFactory),
            controllers: Vec::new(),
        }
    }

    pub fn static_root(&self) -> Option<&Path> {
        self.static_files.as_ref().map(StaticFiles::root)
    }

    /// Controller identifiers in selection order.
    pub fn controller_identifiers(&self) -> Vec<&str> {
        self.controllers.identifiers()
    }

    fn serve_static(&self, request: &Request, response: &mut Response) {
        let file = self
            .static_files
            .as_ref()
            .and_then(|files| files.resolve(&request.file_path));

        match file {
            Some(path) => {
                tracing::debug!(site = %self.name, path = %path.display(), "Serving static file");
                response.write_file(path);
            }
            None => {
                tracing::debug!(
                    site = %self.name,
                    controller = %request.controller_name,
                    file = %request.file_path,
                    "No controller or file matched"
                );
                response.not_found();
            }
        }
    }
}

impl Site for WebSite {
    fn name(&self) -> &str {
        &self.name
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn is_default(&self) -> bool {
        self.is_default
    }

    fn view_provider(&self) -> &dyn ViewProvider {
        self.view_provider.as_ref()
    }

    fn handle(&self, request: Request, response: &mut Response) {
        let routed = Routed::new(self, request);

        match self.controllers.controller_for(routed.request()) {
            Some(controller) => {
                tracing::debug!(
                    site = %self.name,
                    controller = %controller.identifier(),
                    action = %routed.request().action_name,
                    "Dispatching to controller"
                );
                controller.handle(&routed, response);
            }
            None => self.serve_static(routed.request(), response),
        }
    }
}

/// Builder for [`WebSite`].
pub struct WebSiteBuilder {
    name: String,
    port: u16,
    priority: Priority,
    is_default: bool,
    static_root: Option<PathBuf>,
    view_provider: Option<Arc<dyn ViewProvider>>,
    factory: Arc<dyn ControllerProviderFactory>,
    controllers: Vec<Arc<dyn Controller>>,
}

impl WebSiteBuilder {
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn default_site(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    pub fn static_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.static_root = Some(root.into());
        self
    }

    pub fn view_provider(mut self, provider: Arc<dyn ViewProvider>) -> Self {
        self.view_provider = Some(provider);
        self
    }

    pub fn controller_provider_factory(mut self, factory: Arc<dyn ControllerProviderFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn controller(mut self, controller: Arc<dyn Controller>) -> Self {
        self.controllers.push(controller);
        self
    }

    pub fn controllers<I>(mut self, controllers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Controller>>,
    {
        self.controllers.extend(controllers);
        self
    }

    pub fn build(self) -> WebSite {
        WebSite {
            name: self.name,
            port: self.port,
            priority: self.priority,
            is_default: self.is_default,
            static_files: self.static_root.map(StaticFiles::new),
            view_provider: self.view_provider.unwrap_or_else(|| Arc::new(TextViewProvider)),
            controllers: self.factory.create(self.controllers),
        }
    }
}
