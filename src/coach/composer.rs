//! Reply composition for the coaching tools.
//!
//! The simple composer renders a classified state. The directive composer
//! always produces one fixed "ugly first draft" action; the caller's
//! situation only changes the timebox named in the heading.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use super::classifier::{classify, CoachingState};

/// Timebox used when the situation does not mention a duration
pub const DEFAULT_TIMEBOX: &str = "30 minutes";

/// Constraints line used when the caller gives none
pub const DEFAULT_CONSTRAINTS: &str =
    "None given. Keep it small, private, and good enough to react to.";

/// The three draft shapes offered by the single action
pub const DRAFT_OPTIONS: [&str; 3] = [
    "5 rough bullet points",
    "a 3-sentence summary",
    "a 10-line outline",
];

pub const DONE_CRITERION: &str =
    "Done when: something exists on the page that you could show one person, even if it's ugly.";

/// Accent color for widget payloads
pub const ACCENT_COLOR: &str = "#2563eb";

/// "<digits> <minute|hour unit>", e.g. `2 hours`, `45 MINUTES`, `90min`
fn timebox_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b\d+\s*(?:minutes?|mins?|hours?|hrs?)\b")
            .expect("Invalid timebox regex")
    })
}

// ============================================================================
// Simple reply
// ============================================================================

/// Structured record returned alongside the simple reply text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoachingReply {
    pub message: String,
    pub action: String,
    pub state: CoachingState,
}

impl CoachingReply {
    pub fn for_state(state: CoachingState) -> Self {
        Self {
            message: state.message().to_string(),
            action: state.ask().to_string(),
            state,
        }
    }

    /// Two-paragraph text: message, blank line, call-to-action
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.message, self.action)
    }
}

/// Classify the input and render the matching reply
pub fn compose_reply(user_input: &str) -> CoachingReply {
    CoachingReply::for_state(classify(user_input))
}

// ============================================================================
// Directive (widget variant)
// ============================================================================

/// Inputs of the widget variant's `next_best_step`
#[derive(Debug, Clone, Default)]
pub struct DirectiveRequest<'a> {
    pub situation: &'a str,
    pub constraints: Option<&'a str>,
    pub desired_outcome: Option<&'a str>,
}

/// Rendered single-action directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub timebox: String,
    pub constraints: String,
    pub text: String,
}

/// Find the first "<digits> <minute|hour unit>" phrase, verbatim
pub fn detect_timebox(situation: &str) -> Option<&str> {
    timebox_pattern().find(situation).map(|m| m.as_str())
}

/// The fixed action line naming all three draft options
pub fn draft_instruction() -> String {
    format!(
        "Make an ugly first draft: {}, {}, or {}. Pick one and start now.",
        DRAFT_OPTIONS[0], DRAFT_OPTIONS[1], DRAFT_OPTIONS[2]
    )
}

pub fn compose_directive(req: &DirectiveRequest<'_>) -> Directive {
    let timebox = detect_timebox(req.situation)
        .unwrap_or(DEFAULT_TIMEBOX)
        .to_string();

    let constraints = req
        .constraints
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CONSTRAINTS)
        .to_string();

    let mut lines = vec![
        format!("Your next best step (next {}):", timebox),
        draft_instruction(),
        format!("Constraints: {}", constraints),
    ];

    if let Some(outcome) = req
        .desired_outcome
        .map(str::trim)
        .filter(|o| !o.is_empty())
    {
        lines.push(format!("Desired outcome: {}", outcome));
    }

    lines.push(DONE_CRITERION.to_string());

    Directive {
        timebox,
        constraints,
        text: lines.join("\n"),
    }
}

/// Structured content rendered by the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPayload {
    pub message: String,
    pub accent_color: String,
    pub details: String,
    pub from_tool: String,
}

impl WidgetPayload {
    pub fn new(message: impl Into<String>, details: impl Into<String>, from_tool: &str) -> Self {
        Self {
            message: message.into(),
            accent_color: ACCENT_COLOR.to_string(),
            details: details.into(),
            from_tool: from_tool.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(situation: &str) -> Directive {
        compose_directive(&DirectiveRequest {
            situation,
            ..Default::default()
        })
    }

    #[test]
    fn test_simple_reply_text() {
        let reply = compose_reply("done!");
        assert_eq!(reply.state, CoachingState::Moved);
        assert_eq!(
            reply.text(),
            format!("{}\n\n{}", CoachingState::Moved.message(), CoachingState::Moved.ask())
        );
    }

    #[test]
    fn test_simple_reply_serializes() {
        let reply = compose_reply("");
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["state"], "stuck");
        assert_eq!(json["action"], CoachingState::Stuck.ask());
    }

    #[test]
    fn test_timebox_detected() {
        let d = directive("I have 2 hours before the launch");
        assert_eq!(d.timebox, "2 hours");
        assert!(d.text.lines().next().unwrap().contains("2 hours"));
    }

    #[test]
    fn test_timebox_verbatim_and_case_insensitive() {
        assert_eq!(detect_timebox("only 45 MINUTES left"), Some("45 MINUTES"));
        assert_eq!(detect_timebox("a 90min block"), Some("90min"));
        assert_eq!(detect_timebox("about 3 hrs today"), Some("3 hrs"));
    }

    #[test]
    fn test_timebox_default() {
        let d = directive("I need to write the launch post");
        assert_eq!(d.timebox, DEFAULT_TIMEBOX);
        assert!(d.text.lines().next().unwrap().contains("30 minutes"));
    }

    #[test]
    fn test_digits_without_unit_are_ignored() {
        assert_eq!(detect_timebox("I have 3 tasks and 2 meetings"), None);
    }

    #[test]
    fn test_timebox_pattern_compiles() {
        let re = timebox_pattern();
        assert!(re.is_match("10 mins"));
        assert!(std::ptr::eq(re, timebox_pattern()));
    }

    #[test]
    fn test_single_action_regardless_of_situation() {
        let situations = [
            "",
            "Options: A) rewrite the deck B) email the team C) do nothing",
            "should I 1. call 2. write 3. wait?",
            "5 rough bullet points",
        ];
        for situation in situations {
            let d = directive(situation);
            assert_eq!(d.text.matches(&draft_instruction()).count(), 1);
            assert!(!d.text.contains("rewrite the deck"));
            assert!(!d.text.contains("should I"));
        }
    }

    #[test]
    fn test_constraints_default_when_blank() {
        let d = compose_directive(&DirectiveRequest {
            situation: "launch",
            constraints: Some("   "),
            desired_outcome: None,
        });
        assert_eq!(d.constraints, DEFAULT_CONSTRAINTS);
        assert!(d.text.contains(&format!("Constraints: {}", DEFAULT_CONSTRAINTS)));
        assert!(!d.text.contains("Desired outcome:"));
    }

    #[test]
    fn test_full_directive_layout() {
        let d = compose_directive(&DirectiveRequest {
            situation: "launch in 20 minutes",
            constraints: Some("no meetings"),
            desired_outcome: Some(" a sendable draft "),
        });
        let lines: Vec<&str> = d.text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Your next best step (next 20 minutes):");
        assert_eq!(lines[1], draft_instruction());
        assert_eq!(lines[2], "Constraints: no meetings");
        assert_eq!(lines[3], "Desired outcome: a sendable draft");
        assert_eq!(lines[4], DONE_CRITERION);
    }

    #[test]
    fn test_widget_payload_camel_case() {
        let payload = WidgetPayload::new("hi", "details", "kitchen-sink-refresh");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["accentColor"], ACCENT_COLOR);
        assert_eq!(json["fromTool"], "kitchen-sink-refresh");
    }
}
