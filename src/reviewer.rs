//! Language-model polishing pass over weather answers

use crate::llm::TextCompleter;
use tracing::{debug, warn};

/// Rewrites a draft weather answer into one attributed paragraph
pub struct ResponseReviewer<'a, C> {
    completer: &'a C,
}

impl<'a, C: TextCompleter> ResponseReviewer<'a, C> {
    pub fn new(completer: &'a C) -> Self {
        Self { completer }
    }

    /// One completion call; any failure or blank output returns the draft
    pub fn review(&self, draft: &str, query: &str) -> String {
        let prompt = review_prompt(draft, query);
        match self.completer.complete(&prompt) {
            Ok(text) if !text.trim().is_empty() => {
                debug!("Reviewer rewrote {} characters", draft.len());
                text.trim().to_string()
            }
            Ok(_) => {
                warn!("Reviewer returned no text, keeping draft");
                draft.to_string()
            }
            Err(e) => {
                warn!("Reviewer failed, keeping draft: {}", e);
                draft.to_string()
            }
        }
    }
}

fn review_prompt(draft: &str, query: &str) -> String {
    format!(
        "You are reviewing a weather assistant's answer before it is shown to the user.\n\
         User question: {query}\n\
         Draft answer: {draft}\n\n\
         Rewrite the draft as a single clear paragraph. Keep every number and \
         location exactly as given, add nothing that is not in the draft, and \
         state that the data comes from OpenWeatherMap. Reply with the paragraph only."
    )
}
