//! View providers: turn an action's model into response content.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as Model;
use thiserror::Error;

use crate::dispatch::request::Request;
use crate::dispatch::site::Site;

/// Rendered content plus its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewResult {
    pub content: String,
    pub content_type: String,
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("failed to serialize model: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait ViewProvider: Send + Sync {
    fn render(&self, site: &dyn Site, request: &Request, model: &Model) -> Result<ViewResult, ViewError>;
}

/// Serializes the model as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonViewProvider {
    pub pretty: bool,
}

impl ViewProvider for JsonViewProvider {
    fn render(&self, _site: &dyn Site, _request: &Request, model: &Model) -> Result<ViewResult, ViewError> {
        let content = if self.pretty {
            serde_json::to_string_pretty(model)?
        } else {
            serde_json::to_string(model)?
        };
        Ok(ViewResult {
            content,
            content_type: "application/json".to_string(),
        })
    }
}

/// Strings verbatim, null as empty, anything else as compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextViewProvider;

impl ViewProvider for TextViewProvider {
    fn render(&self, _site: &dyn Site, _request: &Request, model: &Model) -> Result<ViewResult, ViewError> {
        let content = match model {
            Model::String(text) => text.clone(),
            Model::Null => String::new(),
            other => serde_json::to_string(other)?,
        };
        Ok(ViewResult {
            content,
            content_type: "text/plain; charset=utf-8".to_string(),
        })
    }
}

/// View provider selected per site in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    #[default]
    Json,
    Text,
}

impl ViewKind {
    pub fn provider(self) -> Arc<dyn ViewProvider> {
        match self {
            ViewKind::Json => Arc::new(JsonViewProvider::default()),
            ViewKind::Text => Arc::new(TextViewProvider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::site::WebSite;
    use axum::http::Method;
    use serde_json::json;

    fn render(provider: &dyn ViewProvider, model: Model) -> ViewResult {
        let site = WebSite::builder("shop", 8080).build();
        let request = Request::new(Method::GET, "shop", "Items", "List");
        provider.render(&site, &request, &model).unwrap()
    }

    #[test]
    fn test_json_view() {
        let view = render(&JsonViewProvider::default(), json!({ "items": [1, 2] }));
        assert_eq!(view.content, r#"{"items":[1,2]}"#);
        assert_eq!(view.content_type, "application/json");
    }

    #[test]
    fn test_text_view() {
        assert_eq!(render(&TextViewProvider, json!("hello")).content, "hello");
        assert_eq!(render(&TextViewProvider, Model::Null).content, "");
        assert_eq!(render(&TextViewProvider, json!(3)).content, "3");
    }

    #[test]
    fn test_view_kind_from_config_text() {
        let kind: ViewKind = serde_json::from_str(r#""text""#).unwrap();
        assert_eq!(kind, ViewKind::Text);
        assert_eq!(ViewKind::default(), ViewKind::Json);
    }
}
