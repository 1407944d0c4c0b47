//! Optional enrichment of normalized changes through a generative text
//! service.
use async_trait::async_trait;
use log::*;
use std::rc::Rc;

#[cfg(test)]
use mockall::automock;

use crate::{
    error::{NotesError, Result},
    interpreter::ChangeSet,
};

/// Google Gemini client.
pub mod gemini;

/// A service that turns a free-text prompt into text.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GenerativeTextProvider {
    /// Single request/response exchange returning the first candidate's text.
    async fn generate(&self, prompt: String) -> Result<String>;
}

/// Builds the instruction sent to the generative service.
pub fn build_prompt(changes: &ChangeSet) -> String {
    format!(
        "Refine these release notes for business and operations stakeholders.

{}
Explain:
- User impact
- Operational impact
- Business impact

Do not invent features. Only describe the changes listed above.
",
        changes.to_markdown()
    )
}

/// Produces the "Impact Analysis" text for a change set.
pub struct Enricher {
    provider: Rc<dyn GenerativeTextProvider>,
}

impl Enricher {
    pub fn new(provider: Rc<dyn GenerativeTextProvider>) -> Self {
        Self { provider }
    }

    /// Any provider failure, or an empty answer, is an
    /// [`NotesError::Enrichment`] so no document is published with a missing
    /// or garbled impact section.
    pub async fn enrich(&self, changes: &ChangeSet) -> Result<String> {
        info!("requesting impact analysis for {} changes", changes.len());

        let text = self
            .provider
            .generate(build_prompt(changes))
            .await
            .map_err(|e| match e {
                NotesError::Enrichment(_) => e,
                other => NotesError::enrichment(other.to_string()),
            })?;

        if text.trim().is_empty() {
            return Err(NotesError::enrichment(
                "generative service returned empty text",
            ));
        }

        Ok(text)
    }
}
