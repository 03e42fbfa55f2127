//! # Agents Module
//!
//! The four graph nodes. Each one reads the current [`SharedState`] and
//! returns a [`StateUpdate`]; none of them knows which node runs next.
//!
//! [`SharedState`]: crate::state::SharedState
//! [`StateUpdate`]: crate::state::StateUpdate

pub mod document;
pub mod prompts;
pub mod router;
pub mod synthesizer;
pub mod web;

pub use document::DocumentAgent;
pub use prompts::{Prompts, APOLOGY, ERROR_PREFIX, NO_DATA};
pub use router::{normalize_label, Route, RouterAgent};
pub use synthesizer::SynthesizerAgent;
pub use web::WebSearchAgent;

/// First 200 characters of an answer, for debug logs.
pub(crate) fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(200).collect();
    if out.len() < text.len() {
        out.push_str("...");
    }
    out
}
