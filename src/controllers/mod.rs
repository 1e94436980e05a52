//! Controllers shipped with the binary.
//!
//! Sites opt into them by identifier in configuration:
//!
//! ```toml
//! [[sites]]
//! name = "shop"
//! port = 8080
//! controllers = ["ItemsController", "UsersController"]
//! ```

pub mod items;
pub mod users;

use std::sync::Arc;

use crate::dispatch::controller::RegistrationError;
use crate::lifecycle::startup::{ControllerCatalog, StartupError};

/// Error raised while assembling the built-in catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Startup(#[from] StartupError),
}

/// Catalog with every built-in controller.
pub fn catalog() -> Result<ControllerCatalog, CatalogError> {
    let mut catalog = ControllerCatalog::new();
    catalog.register(Arc::new(items::controller(Arc::new(items::ItemStore::seeded()))?))?;
    catalog.register(Arc::new(users::controller()?))?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_registers_builtins() {
        let catalog = catalog().unwrap();
        assert_eq!(
            catalog.identifiers().collect::<Vec<_>>(),
            vec!["ItemsController", "UsersController"]
        );
    }
}
