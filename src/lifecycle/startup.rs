//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn validated configuration into sites
//! - Resolve each site's controller identifiers against the catalog
//! - Assemble the host in priority order
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Controllers are shared between sites; the catalog owns one instance each

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{HostConfig, SiteConfig};
use crate::dispatch::controller::Controller;
use crate::dispatch::host::Host;
use crate::dispatch::site::{Site, WebSite};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartupError {
    #[error("site `{site}` references unknown controller `{controller}`")]
    UnknownController { site: String, controller: String },

    #[error("controller `{0}` is registered twice")]
    DuplicateController(String),
}

/// Every controller the binary can serve, by identifier.
#[derive(Default, Clone)]
pub struct ControllerCatalog {
    controllers: BTreeMap<String, Arc<dyn Controller>>,
}

impl ControllerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, controller: Arc<dyn Controller>) -> Result<(), StartupError> {
        let identifier = controller.identifier().to_string();
        if self.controllers.contains_key(&identifier) {
            return Err(StartupError::DuplicateController(identifier));
        }
        self.controllers.insert(identifier, controller);
        Ok(())
    }

    pub fn get(&self, identifier: &str) -> Option<Arc<dyn Controller>> {
        self.controllers.get(identifier).cloned()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.controllers.keys().map(String::as_str)
    }
}

/// Build every configured site and the host that routes between them.
pub fn build_host(config: &HostConfig, catalog: &ControllerCatalog) -> Result<Host, StartupError> {
    let sites = config
        .sites
        .iter()
        .map(|site| build_site(site, catalog))
        .collect::<Result<Vec<_>, _>>()?;

    let host = Host::new(sites);
    tracing::info!(sites = host.sites().len(), ports = ?host.ports(), "Host assembled");
    Ok(host)
}

fn build_site(config: &SiteConfig, catalog: &ControllerCatalog) -> Result<Arc<dyn Site>, StartupError> {
    let controllers = config
        .controllers
        .iter()
        .map(|identifier| {
            catalog.get(identifier).ok_or_else(|| StartupError::UnknownController {
                site: config.name.clone(),
                controller: identifier.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = WebSite::builder(&config.name, config.port)
        .priority(config.priority)
        .default_site(config.default)
        .view_provider(config.view.provider())
        .controllers(controllers);
    if let Some(root) = &config.static_root {
        builder = builder.static_root(root);
    }

    let site = builder.build();
    tracing::info!(
        site = %config.name,
        port = config.port,
        priority = %config.priority,
        default = config.default,
        controllers = ?site.controller_identifiers(),
        "Site registered"
    );
    Ok(Arc::new(site))
}
