//! Result presentation
//!
//! Every failure is shown to the user through one message shape, no matter
//! which stage produced it.

use crate::error::SuggestError;
use crate::types::Suggestion;

/// Hours of sleep represented by one meter glyph
const HOURS_PER_SLEEP_GLYPH: u32 = 3;

/// Render a suggestion as the user-visible result block
pub fn render_text(suggestion: &Suggestion) -> String {
    format!(
        "Suggested Activity\n\n  {}\n\nTake {} minutes to focus on this activity for better mental wellness.\n",
        suggestion.activity, suggestion.time_available
    )
}

/// Uniform user-visible failure message
pub fn render_error(error: &SuggestError) -> String {
    format!("An error occurred: {error}")
}

/// One 😴 per full three hours of sleep
pub fn sleep_quality_meter(sleep_hours: u32) -> String {
    let glyphs = (sleep_hours / HOURS_PER_SLEEP_GLYPH) as usize;
    format!("Sleep Quality: {}", "😴".repeat(glyphs))
}

/// Echo of the minutes the user selected
pub fn time_available_line(time_available: u32) -> String {
    format!("Time Available: ⏰ {time_available} minutes")
}
