//! Per-process server definition shared by every session.
//!
//! A profile fixes which variant is running: its name, its tool registry,
//! and (for the widget server) the cached widget resource.

use serde_json::{json, Value};

use crate::mcp::handlers::{RegistryError, ToolRegistry, NEXT_BEST_STEP};
use crate::mcp::types::{ResourceContents, ResourceDefinition, ResourceTemplateDefinition};
use crate::widget::{WidgetAsset, WIDGET_MIME_TYPE, WIDGET_NAME, WIDGET_URI};

pub const SSE_PATH: &str = "/mcp";
pub const MESSAGES_PATH: &str = "/mcp/messages";
pub const HEALTH_PATH: &str = "/healthz";

/// Which of the two servers is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `next_best_step {user_input}` with keyword classification
    NextStep,
    /// Directive composer, `kitchen-sink-refresh`, and the widget resource
    Widget,
}

impl Variant {
    pub fn server_name(&self) -> &'static str {
        match self {
            Self::NextStep => "next-best-step",
            Self::Widget => "next-best-step-widget",
        }
    }

    /// Port used when `PORT` is unset or not a number
    pub fn default_port(&self) -> u16 {
        match self {
            Self::NextStep => 3000,
            Self::Widget => 8000,
        }
    }
}

pub struct ServerProfile {
    variant: Variant,
    tools: ToolRegistry,
    widget: Option<WidgetAsset>,
}

impl ServerProfile {
    pub fn next_step() -> Result<Self, RegistryError> {
        Ok(Self {
            variant: Variant::NextStep,
            tools: ToolRegistry::next_step_tools()?,
            widget: None,
        })
    }

    pub fn widget(asset: WidgetAsset) -> Result<Self, RegistryError> {
        Ok(Self {
            variant: Variant::Widget,
            tools: ToolRegistry::widget_tools()?,
            widget: Some(asset),
        })
    }

    pub fn name(&self) -> &'static str {
        self.variant.server_name()
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn has_resources(&self) -> bool {
        self.widget.is_some()
    }

    fn resource_meta() -> Value {
        json!({
            "openai/widgetDescription": "Shows the single next step with its timebox and constraints.",
            "openai/widgetPrefersBorder": true
        })
    }

    pub fn resources(&self) -> Vec<ResourceDefinition> {
        self.widget
            .iter()
            .map(|_| ResourceDefinition {
                uri: WIDGET_URI.to_string(),
                name: WIDGET_NAME.to_string(),
                description: "Next best step widget markup".to_string(),
                mime_type: WIDGET_MIME_TYPE.to_string(),
                meta: Some(Self::resource_meta()),
            })
            .collect()
    }

    pub fn resource_templates(&self) -> Vec<ResourceTemplateDefinition> {
        self.widget
            .iter()
            .map(|_| ResourceTemplateDefinition {
                uri_template: WIDGET_URI.to_string(),
                name: WIDGET_NAME.to_string(),
                description: "Next best step widget markup".to_string(),
                mime_type: WIDGET_MIME_TYPE.to_string(),
                meta: Some(Self::resource_meta()),
            })
            .collect()
    }

    /// Cached widget HTML for `uri`, verbatim
    pub fn read_resource(&self, uri: &str) -> Option<ResourceContents> {
        let widget = self.widget.as_ref()?;
        if uri != WIDGET_URI {
            return None;
        }
        Some(ResourceContents {
            uri: WIDGET_URI.to_string(),
            mime_type: WIDGET_MIME_TYPE.to_string(),
            text: widget.html().to_string(),
            meta: Some(Self::resource_meta()),
        })
    }

    /// Body of `GET /`
    pub fn descriptor(&self) -> Value {
        json!({
            "name": self.name(),
            "version": self.version(),
            "tool": NEXT_BEST_STEP,
            "endpoints": {
                "sse": SSE_PATH,
                "messages": MESSAGES_PATH,
                "health": HEALTH_PATH
            }
        })
    }
}
