//! Coaching logic behind the `next_best_step` tool.
//!
//! - `classifier` - keyword intent classification into a [`CoachingState`]
//! - `composer` - reply text and structured payloads for both server variants

mod classifier;
mod composer;

pub use classifier::{classify, CoachingState};
pub use composer::{
    compose_directive, compose_reply, detect_timebox, draft_instruction, CoachingReply, Directive,
    DirectiveRequest, WidgetPayload, ACCENT_COLOR, DEFAULT_CONSTRAINTS, DEFAULT_TIMEBOX,
    DONE_CRITERION, DRAFT_OPTIONS,
};
