//! Assembly of the final release-note document.
//!
//! Documents are rendered through a [tera](https://github.com/Keats/tera)
//! template. The built-in layout can be replaced through configuration; the
//! template receives `repo`, `tag`, `url`, `summary`, `changes` (list of
//! normalized lines) and `impact` (absent unless enrichment ran).
use serde::Serialize;
use tera::{Context, Tera};

use crate::{
    error::{NotesError, Result},
    forge::request::Release,
    interpreter::ChangeSet,
};

/// Name the template is registered under. The `.md` suffix keeps tera's
/// HTML autoescaping off.
const TEMPLATE_NAME: &str = "release-notes.md";

/// Static paragraph used for the "Change Summary" section.
pub const CHANGE_SUMMARY: &str =
    "This release focuses on improving reliability and usability.";

/// Built-in document layout.
pub const DEFAULT_TEMPLATE: &str = "# {{ repo }} – Release {{ tag }}

## Change Summary
{{ summary }}

## Interpreted Changes
{% for change in changes %}- {{ change }}
{% endfor %}{% if impact %}
## Impact Analysis
{{ impact }}
{% endif %}";

/// A fully assembled release-note document for one (repository, tag).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteDocument {
    pub repo: String,
    pub tag: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub changes: Vec<String>,
    pub impact: Option<String>,
}

impl NoteDocument {
    pub fn new(
        release: &Release,
        changes: &ChangeSet,
        impact: Option<String>,
    ) -> Self {
        Self {
            repo: release.repo.to_string(),
            tag: release.tag.clone(),
            url: release.url.clone(),
            title: format!("{} – Release {}", release.repo, release.tag),
            summary: CHANGE_SUMMARY.to_string(),
            changes: changes.lines().to_vec(),
            impact,
        }
    }
}

/// Renders [`NoteDocument`]s with a compiled template.
pub struct NoteComposer {
    tera: Tera,
}

impl NoteComposer {
    /// Compile `template`, or the built-in layout when `None`. A template
    /// that fails to compile is a configuration error.
    pub fn new(template: Option<&str>) -> Result<Self> {
        let mut tera = Tera::default();

        let source = template.unwrap_or(DEFAULT_TEMPLATE);

        tera.add_raw_template(TEMPLATE_NAME, source).map_err(|e| {
            NotesError::config(format!("invalid note template: {e}"))
        })?;

        Ok(Self { tera })
    }

    pub fn render(&self, document: &NoteDocument) -> Result<String> {
        let context = Context::from_serialize(document)?;
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}
