//! Response rendering subsystem.
//!
//! # Data Flow
//! ```text
//! handler JSON document + RenderMode
//!     → Legacy:       serde_json
//!     → ExplicitType: expand.rs (amount envelopes → strings) → serde_json
//!     → AutoHtml:     html.rs (schema-aware page)
//!     → Rendered body handed to http::response
//! ```

pub mod amount;
pub mod expand;
pub mod html;

use serde_json::Value;

use crate::config::RenderConfig;
use crate::error::ExplorerError;
use self::html::HtmlConverter;

/// Nesting limit for every recursive pass over a document.
pub const MAX_DEPTH: u32 = 128;

/// How a handler's document is turned into a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Raw JSON as produced by the backend.
    #[default]
    Legacy,
    /// JSON with amount envelopes expanded to decimal strings.
    ExplicitType,
    /// Auto-generated HTML page.
    AutoHtml,
}

impl RenderMode {
    /// `htm` wins over `exp_am`; neither means legacy JSON.
    pub fn from_flags(htm: bool, exp_am: bool) -> Self {
        if htm {
            RenderMode::AutoHtml
        } else if exp_am {
            RenderMode::ExplicitType
        } else {
            RenderMode::Legacy
        }
    }

    pub fn is_html(&self) -> bool {
        matches!(self, RenderMode::AutoHtml)
    }
}

/// A serialized response body.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub body: String,
    pub html: bool,
}

/// Serializes handler output according to the request's mode.
#[derive(Debug, Clone)]
pub struct Renderer {
    native_asset_name: String,
}

impl Renderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            native_asset_name: config.native_asset_name.clone(),
        }
    }

    /// `url` is the request target; html pages build pagination links from it.
    pub fn render(&self, mut doc: Value, mode: RenderMode, url: &str) -> Result<Rendered, ExplorerError> {
        let body = match mode {
            RenderMode::AutoHtml => HtmlConverter::new(url, &self.native_asset_name).convert(&doc)?,
            RenderMode::ExplicitType => {
                expand::expand_amounts(&mut doc)?;
                serde_json::to_string(&doc)?
            }
            RenderMode::Legacy => serde_json::to_string(&doc)?,
        };
        Ok(Rendered {
            body,
            html: mode.is_html(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn htm_takes_precedence() {
        assert_eq!(RenderMode::from_flags(true, true), RenderMode::AutoHtml);
        assert_eq!(RenderMode::from_flags(false, true), RenderMode::ExplicitType);
        assert_eq!(RenderMode::from_flags(false, false), RenderMode::Legacy);
    }

    #[test]
    fn modes_produce_expected_bodies() {
        let renderer = Renderer::new(&RenderConfig::default());
        let doc = json!({"fee": {"type": "amount", "value": "123"}});

        let legacy = renderer.render(doc.clone(), RenderMode::Legacy, "/status").unwrap();
        assert!(!legacy.html);
        assert_eq!(legacy.body, r#"{"fee":{"type":"amount","value":"123"}}"#);

        let typed = renderer.render(doc.clone(), RenderMode::ExplicitType, "/status").unwrap();
        assert_eq!(typed.body, r#"{"fee":"123"}"#);

        let page = renderer.render(doc, RenderMode::AutoHtml, "/status?htm=1").unwrap();
        assert!(page.html);
        assert!(page.body.contains("<li>fee: <p2 style=\"color:blue\">123</p2></li>"));
    }
}
