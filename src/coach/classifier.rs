//! Keyword-based intent classification for the simple `next_best_step` tool.
//!
//! Maps free text to one of four coaching states. Phrase sets are tested in
//! a fixed priority order and the first hit wins; input that matches nothing
//! is treated as `Stuck`.

use serde::{Deserialize, Serialize};

/// Coaching state inferred from the caller's input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachingState {
    Stuck,
    Moved,
    Momentum,
    NeedsClarity,
}

impl CoachingState {
    /// Encouragement shown first in the reply
    pub fn message(&self) -> &'static str {
        match self {
            Self::Stuck => {
                "Feeling stuck is normal. Let's shrink the task until starting feels almost too easy."
            }
            Self::Moved => "Nice work. You moved it forward, and that counts.",
            Self::Momentum => "You're on a roll. Let's keep the momentum going.",
            Self::NeedsClarity => {
                "Let's get clear on what matters most before doing anything else."
            }
        }
    }

    /// The single call-to-action that follows the message
    pub fn ask(&self) -> &'static str {
        match self {
            Self::Stuck => {
                "Pick the smallest piece you could finish in 10 minutes and tell me what it is."
            }
            Self::Moved => "What's the next small step you want to take while it's fresh?",
            Self::Momentum => "Name the very next action and set a 25-minute timer to start it.",
            Self::NeedsClarity => {
                "In one sentence, what would a good outcome look like by the end of today?"
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stuck => "stuck",
            Self::Moved => "moved",
            Self::Momentum => "momentum",
            Self::NeedsClarity => "needs_clarity",
        }
    }
}

impl std::fmt::Display for CoachingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const COMPLETION_PHRASES: &[&str] = &[
    "done",
    "finished",
    "completed",
    "i did it",
    "i sent the email",
    "sent it",
    "shipped",
    "submitted",
];

const CLARITY_PHRASES: &[&str] = &[
    "what's the plan",
    "whats the plan",
    "not sure what",
    "unclear",
    "confused",
    "where do i start",
    "what should i focus",
    "clarify",
];

const MOMENTUM_PHRASES: &[&str] = &[
    "next step",
    "what's next",
    "whats next",
    "keep going",
    "momentum",
    "keep the ball rolling",
];

const OVERWHELM_PHRASES: &[&str] = &[
    "stuck",
    "overwhelmed",
    "too much",
    "can't start",
    "cannot start",
    "procrastinat",
    "paralyzed",
];

/// Priority order: completion > clarity > momentum > overwhelm.
const RULES: &[(&[&str], CoachingState)] = &[
    (COMPLETION_PHRASES, CoachingState::Moved),
    (CLARITY_PHRASES, CoachingState::NeedsClarity),
    (MOMENTUM_PHRASES, CoachingState::Momentum),
    (OVERWHELM_PHRASES, CoachingState::Stuck),
];

/// Classify user input into a coaching state. Never fails.
pub fn classify(input: &str) -> CoachingState {
    let normalized = normalize(input);
    if normalized.is_empty() {
        return CoachingState::Stuck;
    }

    RULES
        .iter()
        .find(|(phrases, _)| phrases.iter().any(|p| normalized.contains(p)))
        .map(|(_, state)| *state)
        .unwrap_or(CoachingState::Stuck)
}

/// Lower-case, trim, and fold typographic apostrophes so "what’s" matches "what's"
fn normalize(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .replace(['\u{2018}', '\u{2019}'], "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_phrases() {
        assert_eq!(classify("done"), CoachingState::Moved);
        assert_eq!(classify("I sent the email!"), CoachingState::Moved);
        assert_eq!(classify("  FINISHED the draft  "), CoachingState::Moved);
    }

    #[test]
    fn test_completion_beats_overwhelm() {
        assert_eq!(
            classify("I was overwhelmed and stuck but I'm done now"),
            CoachingState::Moved
        );
    }

    #[test]
    fn test_clarity_beats_momentum() {
        assert_eq!(
            classify("what's the plan, next step?"),
            CoachingState::NeedsClarity
        );
    }

    #[test]
    fn test_typographic_apostrophe() {
        assert_eq!(classify("What\u{2019}s the plan?"), CoachingState::NeedsClarity);
    }

    #[test]
    fn test_momentum() {
        assert_eq!(classify("Give me the next step"), CoachingState::Momentum);
        assert_eq!(classify("I want to keep going"), CoachingState::Momentum);
    }

    #[test]
    fn test_overwhelm() {
        assert_eq!(classify("I'm totally overwhelmed"), CoachingState::Stuck);
        assert_eq!(classify("I keep procrastinating"), CoachingState::Stuck);
    }

    #[test]
    fn test_empty_and_whitespace_default_to_stuck() {
        assert_eq!(classify(""), CoachingState::Stuck);
        assert_eq!(classify("   \n\t "), CoachingState::Stuck);
    }

    #[test]
    fn test_unmatched_defaults_to_stuck() {
        assert_eq!(classify("hello there"), CoachingState::Stuck);
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&CoachingState::NeedsClarity).unwrap();
        assert_eq!(json, "\"needs_clarity\"");
        assert_eq!(CoachingState::NeedsClarity.to_string(), "needs_clarity");
    }

    #[test]
    fn test_every_state_has_text() {
        for state in [
            CoachingState::Stuck,
            CoachingState::Moved,
            CoachingState::Momentum,
            CoachingState::NeedsClarity,
        ] {
            assert!(!state.message().is_empty());
            assert!(!state.ask().is_empty());
        }
    }
}
