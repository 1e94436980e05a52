//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Detect conflicting sites
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HostConfig → Result<(), Vec<ValidationError>>
//! - Several default sites on one port are allowed, only logged
//! - Runs before config is accepted into the system

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::config::schema::HostConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no sites configured")]
    NoSites,

    #[error("site #{index} has an empty name")]
    EmptySiteName { index: usize },

    #[error("site `{site}` name must be lowercase (host names are matched lowercased)")]
    SiteNameNotLowercase { site: String },

    #[error("site `{site}` uses port 0")]
    InvalidPort { site: String },

    #[error("site `{site}` is declared twice on port {port}")]
    DuplicateSite { site: String, port: u16 },

    #[error("site `{site}` lists controller `{controller}` twice")]
    DuplicateController { site: String, controller: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

pub fn validate_config(config: &HostConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.sites.is_empty() {
        errors.push(ValidationError::NoSites);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "security.max_body_size" });
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero { field: "listener.max_connections" });
    }

    let mut seen = HashSet::new();
    let mut defaults_per_port: HashMap<u16, Vec<&str>> = HashMap::new();

    for (index, site) in config.sites.iter().enumerate() {
        if site.name.is_empty() {
            errors.push(ValidationError::EmptySiteName { index });
        } else if site.name != site.name.to_lowercase() {
            errors.push(ValidationError::SiteNameNotLowercase { site: site.name.clone() });
        }
        if site.port == 0 {
            errors.push(ValidationError::InvalidPort { site: site.name.clone() });
        }
        if !seen.insert((site.name.as_str(), site.port)) {
            errors.push(ValidationError::DuplicateSite {
                site: site.name.clone(),
                port: site.port,
            });
        }

        let mut controllers = HashSet::new();
        for controller in &site.controllers {
            if !controllers.insert(controller.as_str()) {
                errors.push(ValidationError::DuplicateController {
                    site: site.name.clone(),
                    controller: controller.clone(),
                });
            }
        }

        if site.default {
            defaults_per_port.entry(site.port).or_default().push(&site.name);
        }
    }

    for (port, sites) in defaults_per_port {
        if sites.len() > 1 {
            tracing::warn!(
                port,
                sites = ?sites,
                "Several default sites on one port; the first by priority wins"
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
