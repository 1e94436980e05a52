//! Item catalogue controller.
//!
//! | Action   | Verb | Parameters             | Roles         |
//! |----------|------|------------------------|---------------|
//! | `List`   | GET  |                        |               |
//! | `Get`    | GET  | `id: u32`              |               |
//! | `Get`    | POST | `id: u32, name: text`  |               |
//! | `Create` | POST | `item: NewItem`        | Admin, Editor |

use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use serde_json::{json, Value as Model};
use thiserror::Error;

use crate::dispatch::action::Action;
use crate::dispatch::binder::{Argument, ArgumentError, Composite, Property};
use crate::dispatch::controller::{ActionController, RegistrationError};

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub price: Decimal,
}

impl Item {
    fn to_model(&self) -> Model {
        json!({
            "id": self.id,
            "name": self.name,
            "price": self.price.to_string(),
        })
    }
}

/// Form payload for `Create`, bound from `item.Name` and `item.Price`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub price: Decimal,
}

impl Composite for NewItem {
    fn properties() -> Vec<Property> {
        vec![
            Property::primitive::<String>("Name"),
            Property::primitive::<Decimal>("Price"),
        ]
    }

    fn assign(&mut self, property: &str, argument: Argument) -> Result<(), ArgumentError> {
        match property {
            "Name" => self.name = argument.into_required()?,
            "Price" => self.price = argument.into_required()?,
            other => return Err(ArgumentError::UnknownProperty(other.to_string())),
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("item store lock poisoned")]
    Poisoned,

    #[error("item name must not be empty")]
    EmptyName,

    #[error("item price must not be negative")]
    NegativePrice,
}

/// In-memory item storage shared by every site using the controller.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: RwLock<Vec<Item>>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with two demo items.
    pub fn seeded() -> Self {
        Self {
            items: RwLock::new(vec![
                Item {
                    id: 1,
                    name: "Widget".to_string(),
                    price: Decimal::new(999, 2),
                },
                Item {
                    id: 2,
                    name: "Gadget".to_string(),
                    price: Decimal::new(2450, 2),
                },
            ]),
        }
    }

    pub fn list(&self) -> Result<Vec<Item>, ItemError> {
        Ok(self.items.read().map_err(|_| ItemError::Poisoned)?.clone())
    }

    pub fn get(&self, id: u32) -> Result<Option<Item>, ItemError> {
        let items = self.items.read().map_err(|_| ItemError::Poisoned)?;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    /// Store a new item under the next free id.
    pub fn insert(&self, new: NewItem) -> Result<Item, ItemError> {
        if new.name.trim().is_empty() {
            return Err(ItemError::EmptyName);
        }
        if new.price.is_sign_negative() {
            return Err(ItemError::NegativePrice);
        }

        let mut items = self.items.write().map_err(|_| ItemError::Poisoned)?;
        let id = items.iter().map(|item| item.id).max().unwrap_or(0) + 1;
        let item = Item {
            id,
            name: new.name,
            price: new.price,
        };
        items.push(item.clone());
        Ok(item)
    }
}

pub fn controller(store: Arc<ItemStore>) -> Result<ActionController, RegistrationError> {
    let for_list = store.clone();
    let for_get = store.clone();
    let for_create = store;

    ActionController::builder("ItemsController")
        .action(Action::builder("List").get().handler(move |_, _| {
            let items = for_list.list()?;
            Ok(Model::Array(items.iter().map(Item::to_model).collect()))
        }))
        .action(Action::builder("Get").get().param::<u32>("id").handler(move |_, args| {
            let item = match args.value::<u32>(0)? {
                Some(id) => for_get.get(id)?,
                None => None,
            };
            Ok(item.as_ref().map(Item::to_model).unwrap_or(Model::Null))
        }))
        .action(
            Action::builder("Get")
                .post()
                .param::<u32>("id")
                .param::<String>("name")
                .handler(|request, args| {
                    Ok(json!({
                        "id": args.value::<u32>(0)?,
                        "name": args.value::<String>(1)?,
                        "verb": request.verb.as_str(),
                    }))
                }),
        )
        .action(
            Action::builder("Create")
                .post()
                .role("Admin")
                .role("Editor")
                .object::<NewItem>("item")
                .handler(move |request, args| {
                    let item = for_create.insert(args.object::<NewItem>(0)?)?;
                    tracing::info!(
                        id = item.id,
                        name = %item.name,
                        user = ?request.user.name,
                        "Item created"
                    );
                    Ok(item.to_model())
                }),
        )
        .build()
}
