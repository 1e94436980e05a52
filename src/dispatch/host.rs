//! Process-wide site routing.
//!
//! # Responsibilities
//! - Hold every registered site in selection order
//! - Route a request to the first site that accepts it
//! - Split sites by listening port for the transport
//!
//! # Design Decisions
//! - Sorted once at construction: descending priority, ties keep
//!   registration order
//! - An unroutable request is an explicit error, never a silent drop

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::dispatch::request::Request;
use crate::dispatch::response::{Outcome, Response};
use crate::dispatch::site::Site;

/// Outcome of a routed request and the site that produced it.
#[derive(Debug)]
pub struct Dispatched {
    pub site: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("no site accepts requests for `{site_name}`")]
    Unroutable { site_name: String },
}

/// Ordered collection of sites.
#[derive(Clone, Default)]
pub struct Host {
    sites: Vec<Arc<dyn Site>>,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.sites.iter().map(|s| (s.name(), s.port(), s.priority())))
            .finish()
    }
}

impl Host {
    pub fn new(mut sites: Vec<Arc<dyn Site>>) -> Self {
        sites.sort_by_key(|site| Reverse(site.priority()));
        Self { sites }
    }

    /// Sites in selection order.
    pub fn sites(&self) -> &[Arc<dyn Site>] {
        &self.sites
    }

    pub fn route(&self, request: &Request) -> Option<&dyn Site> {
        self.sites
            .iter()
            .find(|site| site.can_handle(request))
            .map(|site| site.as_ref())
    }

    /// Route and handle one request, yielding its single outcome.
    pub fn dispatch(&self, request: Request) -> Result<Dispatched, HostError> {
        let site = self.route(&request).ok_or_else(|| HostError::Unroutable {
            site_name: request.site_name.clone(),
        })?;

        let mut response = Response::new();
        site.handle(request, &mut response);
        Ok(Dispatched {
            site: site.name().to_string(),
            outcome: response.into_outcome(),
        })
    }

    /// Distinct listening ports across all sites.
    pub fn ports(&self) -> BTreeSet<u16> {
        self.sites.iter().map(|site| site.port()).collect()
    }

    /// The sites bound to `port`, in the same order.
    pub fn for_port(&self, port: u16) -> Host {
        Host {
            sites: self
                .sites
                .iter()
                .filter(|site| site.port() == port)
                .cloned()
                .collect(),
        }
    }
}
