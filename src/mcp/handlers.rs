//! MCP tool handlers and the tool registry.
//!
//! Each registered tool pairs its advertised definition with a compiled
//! JSON Schema validator; arguments are validated before a handler runs.

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::coach::{compose_directive, compose_reply, DirectiveRequest, WidgetPayload};
use crate::widget::WIDGET_URI;

use super::types::{ToolAnnotations, ToolDefinition, ToolResult};

pub const NEXT_BEST_STEP: &str = "next_best_step";
pub const KITCHEN_SINK_REFRESH: &str = "kitchen-sink-refresh";

/// Handler invoked with schema-valid arguments
pub type ToolHandler = fn(Value) -> Result<ToolResult, ToolCallError>;

#[derive(Debug, Error)]
pub enum ToolCallError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {}", .errors.join("; "))]
    InvalidArguments { tool: String, errors: Vec<String> },
    #[error("Failed to encode tool result: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
#[error("Invalid input schema for tool {tool}: {message}")]
pub struct RegistryError {
    pub tool: String,
    pub message: String,
}

struct RegisteredTool {
    definition: ToolDefinition,
    validator: jsonschema::Validator,
    handler: ToolHandler,
}

/// Static set of tools advertised on `tools/list`
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, compiling its input schema
    pub fn register(
        &mut self,
        definition: ToolDefinition,
        handler: ToolHandler,
    ) -> Result<(), RegistryError> {
        let validator =
            jsonschema::validator_for(&definition.input_schema).map_err(|e| RegistryError {
                tool: definition.name.clone(),
                message: e.to_string(),
            })?;
        self.tools.push(RegisteredTool {
            definition,
            validator,
            handler,
        });
        Ok(())
    }

    /// Tools for the simple server: `next_best_step {user_input}`
    pub fn next_step_tools() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(next_step_definition(), handle_next_step)?;
        Ok(registry)
    }

    /// Tools for the widget server
    pub fn widget_tools() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(directive_definition(), handle_next_step_directive)?;
        registry.register(kitchen_sink_definition(), handle_kitchen_sink_refresh)?;
        Ok(registry)
    }

    /// Definitions in registration order
    pub fn definitions(&self) -> Vec<&ToolDefinition> {
        self.tools.iter().map(|t| &t.definition).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.definition.name.as_str()).collect()
    }

    /// Validate `arguments` and run the named tool
    pub fn call(&self, name: &str, arguments: Option<Value>) -> Result<ToolResult, ToolCallError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.definition.name == name)
            .ok_or_else(|| ToolCallError::UnknownTool(name.to_string()))?;

        let arguments = arguments.unwrap_or_else(|| json!({}));
        let errors: Vec<String> = tool
            .validator
            .iter_errors(&arguments)
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", path, e)
                }
            })
            .collect();
        if !errors.is_empty() {
            debug!("Rejected {} arguments: {:?}", name, errors);
            return Err(ToolCallError::InvalidArguments {
                tool: name.to_string(),
                errors,
            });
        }

        let result = (tool.handler)(arguments)?;
        Ok(result.with_meta(tool.definition.meta.clone()))
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(tool: &str, arguments: Value) -> Result<T, ToolCallError> {
    serde_json::from_value(arguments).map_err(|e| ToolCallError::InvalidArguments {
        tool: tool.to_string(),
        errors: vec![e.to_string()],
    })
}

// ============================================================================
// next_best_step (simple)
// ============================================================================

#[derive(Debug, Deserialize)]
struct NextStepArgs {
    user_input: String,
}

fn next_step_definition() -> ToolDefinition {
    ToolDefinition {
        name: NEXT_BEST_STEP.to_string(),
        title: "Next best step".to_string(),
        description: "Reads how the user is doing with a task and replies with one encouraging message and exactly one next action.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "user_input": {
                    "type": "string",
                    "description": "What the user said about where they are with the task"
                }
            },
            "required": ["user_input"],
            "additionalProperties": false
        }),
        annotations: ToolAnnotations::default(),
        meta: Some(json!({
            "openai/toolInvocation/invoking": "Finding your next step",
            "openai/toolInvocation/invoked": "Here's your next step"
        })),
    }
}

/// Handle the simple `next_best_step` tool
pub fn handle_next_step(arguments: Value) -> Result<ToolResult, ToolCallError> {
    let args: NextStepArgs = parse_args(NEXT_BEST_STEP, arguments)?;
    let reply = compose_reply(&args.user_input);
    debug!("Classified input as {}", reply.state);
    Ok(ToolResult::new(reply.text(), &reply)?)
}

// ============================================================================
// next_best_step (widget)
// ============================================================================

#[derive(Debug, Deserialize)]
struct DirectiveArgs {
    situation: String,
    #[serde(default)]
    constraints: Option<String>,
    #[serde(default)]
    desired_outcome: Option<String>,
}

fn widget_meta(invoking: &str, invoked: &str) -> Value {
    json!({
        "openai/outputTemplate": WIDGET_URI,
        "openai/toolInvocation/invoking": invoking,
        "openai/toolInvocation/invoked": invoked,
        "openai/widgetAccessible": true,
        "openai/resultCanProduceWidget": true
    })
}

fn directive_definition() -> ToolDefinition {
    ToolDefinition {
        name: NEXT_BEST_STEP.to_string(),
        title: "Next best step".to_string(),
        description: "Turns a situation into one timeboxed action: an ugly first draft. Never returns a list of choices.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "situation": {
                    "type": "string",
                    "description": "What is going on, including any time available (e.g. \"I have 2 hours\")"
                },
                "constraints": {
                    "type": "string",
                    "description": "Anything that limits what the user can do right now"
                },
                "desired_outcome": {
                    "type": "string",
                    "description": "What a good result looks like"
                }
            },
            "required": ["situation"],
            "additionalProperties": false
        }),
        annotations: ToolAnnotations::default(),
        meta: Some(widget_meta("Picking one next step", "Next step ready")),
    }
}

/// Handle the widget server's `next_best_step` tool
pub fn handle_next_step_directive(arguments: Value) -> Result<ToolResult, ToolCallError> {
    let args: DirectiveArgs = parse_args(NEXT_BEST_STEP, arguments)?;
    let directive = compose_directive(&DirectiveRequest {
        situation: &args.situation,
        constraints: args.constraints.as_deref(),
        desired_outcome: args.desired_outcome.as_deref(),
    });

    let payload = WidgetPayload::new(
        directive.text.clone(),
        format!("Timebox: {}. Constraints: {}", directive.timebox, directive.constraints),
        NEXT_BEST_STEP,
    );
    Ok(ToolResult::new(directive.text, &payload)?)
}

// ============================================================================
// kitchen-sink-refresh
// ============================================================================

#[derive(Debug, Deserialize)]
struct KitchenSinkArgs {
    message: String,
}

fn kitchen_sink_definition() -> ToolDefinition {
    ToolDefinition {
        name: KITCHEN_SINK_REFRESH.to_string(),
        title: "Refresh widget".to_string(),
        description: "Echoes a message back so the widget can refresh its content.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "Message to echo back to the widget"
                }
            },
            "required": ["message"],
            "additionalProperties": false
        }),
        annotations: ToolAnnotations::default(),
        meta: Some(widget_meta("Refreshing widget", "Widget refreshed")),
    }
}

/// Handle the `kitchen-sink-refresh` tool
pub fn handle_kitchen_sink_refresh(arguments: Value) -> Result<ToolResult, ToolCallError> {
    let args: KitchenSinkArgs = parse_args(KITCHEN_SINK_REFRESH, arguments)?;
    let payload = WidgetPayload::new(
        args.message.clone(),
        "Echoed by kitchen-sink-refresh",
        KITCHEN_SINK_REFRESH,
    );
    Ok(ToolResult::new(args.message, &payload)?)
}
