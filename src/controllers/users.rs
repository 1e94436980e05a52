//! User registration and greeting controller.

use serde_json::json;

use crate::dispatch::action::Action;
use crate::dispatch::binder::{Argument, ArgumentError, Composite, Property};
use crate::dispatch::controller::{ActionController, RegistrationError};

/// Postal address, bound from `address.Street`, `address.City` and
/// `address.Zip` (field names match ignoring case).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: String,
}

impl Composite for Address {
    fn properties() -> Vec<Property> {
        vec![
            Property::primitive::<String>("Street"),
            Property::primitive::<String>("City"),
            Property::primitive::<String>("Zip"),
        ]
    }

    fn assign(&mut self, property: &str, argument: Argument) -> Result<(), ArgumentError> {
        match property {
            "Street" => self.street = argument.into_required()?,
            "City" => self.city = argument.into_required()?,
            "Zip" => self.zip = argument.into_required()?,
            other => return Err(ArgumentError::UnknownProperty(other.to_string())),
        }
        Ok(())
    }
}

pub fn controller() -> Result<ActionController, RegistrationError> {
    ActionController::builder("UsersController")
        .action(
            Action::builder("Register")
                .post()
                .param::<String>("name")
                .object::<Address>("address")
                .handler(|_, args| {
                    let name = args.value::<String>(0)?.unwrap_or_default();
                    let address = args.object::<Address>(1)?;
                    Ok(json!({
                        "name": name,
                        "address": {
                            "street": address.street,
                            "city": address.city,
                            "zip": address.zip,
                        },
                    }))
                }),
        )
        .action(
            Action::builder("Greet")
                .get()
                .param::<String>("name")
                .param::<i32>("age")
                .handler(|_, args| {
                    let name = args.value::<String>(0)?.unwrap_or_default();
                    let age = args.value::<i32>(1)?.unwrap_or_default();
                    Ok(json!(format!("Hello, {}! You are {}.", name, age)))
                }),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::binder::BindError;
    use crate::dispatch::request::Request;
    use crate::dispatch::response::{Outcome, Response};
    use crate::dispatch::site::{Site, WebSite};
    use axum::http::Method;
    use std::sync::Arc;

    fn site() -> WebSite {
        WebSite::builder("people", 8080)
            .controller(Arc::new(controller().unwrap()))
            .build()
    }

    fn run(request: Request) -> Outcome {
        let mut response = Response::new();
        site().handle(request, &mut response);
        response.into_outcome()
    }

    fn text(outcome: Outcome) -> String {
        match outcome {
            Outcome::Body { content, .. } => content,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_register_binds_nested_address() {
        let request = Request::from_path(Method::POST, "people", "/Users/Register")
            .with_field("name", "Ann")
            .with_field("Address.City", "Oslo")
            .with_field("address.street", "Main St");

        let body: serde_json::Value = serde_json::from_str(&text(run(request))).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "Ann",
                "address": { "street": "Main St", "city": "Oslo", "zip": "" },
            })
        );
    }

    #[test]
    fn test_greet_positional() {
        let request = Request::from_path(Method::GET, "people", "/Users/Greet/Ann/-5");
        assert_eq!(text(run(request)), "Hello, Ann! You are -5.");

        // Controller names match by prefix.
        let request = Request::from_path(Method::GET, "people", "/Us/Greet/Bo/41");
        assert_eq!(text(run(request)), "Hello, Bo! You are 41.");
    }

    #[test]
    fn test_greet_binding_failures() {
        let request = Request::from_path(Method::GET, "people", "/Users/Greet/Ann");
        assert!(matches!(
            run(request),
            Outcome::BadRequest(BindError::MissingPositional { index: 1, .. })
        ));

        let request = Request::from_path(Method::GET, "people", "/Users/Greet/Ann/old");
        assert!(matches!(run(request), Outcome::BadRequest(BindError::Convert { .. })));
    }

    #[test]
    fn test_greet_by_name_defaults_absent_fields() {
        let request = Request::from_path(Method::GET, "people", "/Users/Greet");
        assert_eq!(text(run(request)), "Hello, ! You are 0.");

        let request = Request::from_path(Method::GET, "people", "/Users/Greet").with_field("name", "Ann");
        assert_eq!(text(run(request)), "Hello, Ann! You are 0.");
    }

    #[test]
    fn test_wrong_verb_is_not_found() {
        let request = Request::from_path(Method::GET, "people", "/Users/Register");
        assert!(matches!(run(request), Outcome::NotFound));
    }
}
