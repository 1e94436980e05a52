//! Parameter binding.
//!
//! # Responsibilities
//! - Turn request data into the ordered argument list of an action
//! - Positional mode: url value `i` binds parameter `i`
//! - By-name mode: fields keyed by parameter name, recursing into
//!   composite parameters with dotted prefixes (`address.City`)
//!
//! # Design Decisions
//! - Mode is chosen by the presence of url values, never by verb
//! - Composite types describe their own properties (`Composite`) instead
//!   of being discovered at runtime
//! - A missing named field is `Absent`, not an error; a missing url
//!   value is an error

use std::collections::HashMap;

use thiserror::Error;

use crate::dispatch::convert::{convert, ConvertError, Primitive, PrimitiveKind, Value};
use crate::dispatch::request::Request;

/// The declared shape of a parameter or property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Primitive(PrimitiveKind),
    Composite {
        type_name: &'static str,
        properties: Vec<Parameter>,
    },
}

impl Shape {
    pub fn primitive<T: Primitive>() -> Self {
        Shape::Primitive(T::KIND)
    }

    pub fn composite<T: Composite>() -> Self {
        Shape::Composite {
            type_name: std::any::type_name::<T>(),
            properties: T::properties(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Shape::Primitive(_))
    }
}

/// A named slot to bind: an action parameter or a composite property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub shape: Shape,
}

/// Composite properties share the parameter representation.
pub type Property = Parameter;

impl Parameter {
    pub fn primitive<T: Primitive>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: Shape::primitive::<T>(),
        }
    }

    pub fn composite<T: Composite>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: Shape::composite::<T>(),
        }
    }
}

/// A type bound property-by-property from dotted field names.
///
/// Implementations list their public properties and accept the bound
/// value for each one. Properties that resolve to nothing are never
/// assigned and keep their `Default` value.
pub trait Composite: Default {
    fn properties() -> Vec<Property>;

    fn assign(&mut self, property: &str, argument: Argument) -> Result<(), ArgumentError>;
}

/// One bound argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Argument {
    /// No field carried a value for this slot.
    #[default]
    Absent,
    Value(Value),
    /// Bound properties of a composite, in declaration order.
    Object(Vec<(String, Argument)>),
}

impl Argument {
    pub fn is_absent(&self) -> bool {
        matches!(self, Argument::Absent)
    }

    /// Extract a primitive; `Absent` yields `None`.
    pub fn into_value<T: Primitive>(self) -> Result<Option<T>, ArgumentError> {
        match self {
            Argument::Absent => Ok(None),
            Argument::Value(value) => {
                let found = value.kind();
                T::from_value(value).map(Some).ok_or(ArgumentError::Mismatch {
                    expected: T::KIND.to_string(),
                    found: found.to_string(),
                })
            }
            Argument::Object(_) => Err(ArgumentError::Mismatch {
                expected: T::KIND.to_string(),
                found: "object".to_string(),
            }),
        }
    }

    /// Extract a primitive that must be present.
    pub fn into_required<T: Primitive>(self) -> Result<T, ArgumentError> {
        self.into_value()?.ok_or(ArgumentError::Absent)
    }

    /// Build a composite from its bound properties.
    pub fn into_object<T: Composite>(self) -> Result<T, ArgumentError> {
        match self {
            Argument::Object(properties) => {
                let mut target = T::default();
                for (name, argument) in properties {
                    if !argument.is_absent() {
                        target.assign(&name, argument)?;
                    }
                }
                Ok(target)
            }
            Argument::Absent => Ok(T::default()),
            Argument::Value(value) => Err(ArgumentError::Mismatch {
                expected: std::any::type_name::<T>().to_string(),
                found: value.kind().to_string(),
            }),
        }
    }
}

/// Errors raised while an action reads its bound arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("argument {0} does not exist")]
    OutOfRange(usize),

    #[error("required argument {0} has no value")]
    Missing(usize),

    #[error("value is absent")]
    Absent,

    #[error("expected {expected}, found {found}")]
    Mismatch { expected: String, found: String },

    #[error("unknown property `{0}`")]
    UnknownProperty(String),
}

/// The ordered arguments for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<Argument>,
}

impl Arguments {
    pub fn new(values: Vec<Argument>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.values.get(index)
    }

    /// Primitive at `index`, `None` when no value was bound.
    pub fn value<T: Primitive>(&self, index: usize) -> Result<Option<T>, ArgumentError> {
        self.argument(index)?.clone().into_value()
    }

    /// Primitive at `index` that must have been bound.
    pub fn require<T: Primitive>(&self, index: usize) -> Result<T, ArgumentError> {
        self.value(index)?.ok_or(ArgumentError::Missing(index))
    }

    /// Composite at `index`.
    pub fn object<T: Composite>(&self, index: usize) -> Result<T, ArgumentError> {
        self.argument(index)?.clone().into_object()
    }

    fn argument(&self, index: usize) -> Result<&Argument, ArgumentError> {
        self.values.get(index).ok_or(ArgumentError::OutOfRange(index))
    }
}

/// Request data that cannot be bound to the action's parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("no url value at position {index} for parameter `{parameter}`")]
    MissingPositional { index: usize, parameter: String },

    #[error("{actual} url values supplied but the action takes {expected}")]
    UnexpectedPositional { expected: usize, actual: usize },

    #[error("parameter `{parameter}` is composite and cannot bind from a url value")]
    CompositePositional { parameter: String },

    #[error("parameter `{parameter}`: {source}")]
    Convert {
        parameter: String,
        #[source]
        source: ConvertError,
    },
}

/// Bind `parameters` from `request`.
pub fn bind(parameters: &[Parameter], request: &Request) -> Result<Arguments, BindError> {
    if request.url_values.is_empty() {
        bind_by_name(parameters, &request.fields)
    } else {
        bind_positional(parameters, &request.url_values)
    }
}

fn bind_positional(parameters: &[Parameter], values: &[String]) -> Result<Arguments, BindError> {
    if values.len() > parameters.len() {
        return Err(BindError::UnexpectedPositional {
            expected: parameters.len(),
            actual: values.len(),
        });
    }

    parameters
        .iter()
        .enumerate()
        .map(|(index, parameter)| {
            let text = values.get(index).ok_or_else(|| BindError::MissingPositional {
                index,
                parameter: parameter.name.clone(),
            })?;

            match &parameter.shape {
                Shape::Primitive(kind) => convert(text, *kind)
                    .map(Argument::Value)
                    .map_err(|source| BindError::Convert {
                        parameter: parameter.name.clone(),
                        source,
                    }),
                Shape::Composite { .. } => Err(BindError::CompositePositional {
                    parameter: parameter.name.clone(),
                }),
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Arguments::new)
}

fn bind_by_name(parameters: &[Parameter], fields: &HashMap<String, String>) -> Result<Arguments, BindError> {
    parameters
        .iter()
        .map(|parameter| bind_named(parameter, fields, ""))
        .collect::<Result<Vec<_>, _>>()
        .map(Arguments::new)
}

fn bind_named(parameter: &Parameter, fields: &HashMap<String, String>, prefix: &str) -> Result<Argument, BindError> {
    match &parameter.shape {
        Shape::Primitive(kind) => {
            let key = format!("{}{}", prefix, parameter.name);
            match lookup_field(fields, &key) {
                Some(text) => convert(text, *kind)
                    .map(Argument::Value)
                    .map_err(|source| BindError::Convert { parameter: key, source }),
                None => Ok(Argument::Absent),
            }
        }
        Shape::Composite { properties, .. } => {
            let nested = format!("{}{}.", prefix, parameter.name);
            properties
                .iter()
                .map(|property| {
                    bind_named(property, fields, &nested).map(|argument| (property.name.clone(), argument))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Argument::Object)
        }
    }
}

/// Exact key first, then the smallest key equal ignoring ASCII case.
fn lookup_field<'a>(fields: &'a HashMap<String, String>, key: &str) -> Option<&'a String> {
    fields.get(key).or_else(|| {
        fields
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(key))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, value)| value)
    })
}
