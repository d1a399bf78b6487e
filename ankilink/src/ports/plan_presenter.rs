// src/ports/plan_presenter.rs
use crate::application::{FileEdits, NotePlan, SkipReason, SyncAction, SyncPlan};
use crate::domain::location::vault_path_string;
use anyhow::{Context, Result};
use std::fmt::Write;
use tracing::instrument;

#[derive(Debug, Default)]
pub struct PlanPresenter;

impl PlanPresenter {
    pub fn new() -> Self {
        Self
    }

    #[instrument(level = "debug", skip_all)]
    pub fn render_json(&self, plan: &SyncPlan) -> Result<String> {
        serde_json::to_string_pretty(plan).context("Failed to serialize plan to JSON")
    }

    /// One line per note, then warnings, errors and a summary
    pub fn render_text(&self, plan: &SyncPlan) -> String {
        let mut out = String::new();
        for note in &plan.notes {
            let _ = writeln!(out, "{}", self.note_line(note));
            if note.rewrite.is_some() {
                let _ = writeln!(out, "    block will be rewritten");
            }
            for warning in &note.warnings {
                let _ = writeln!(out, "    warning: {}", warning);
            }
        }
        for error in &plan.errors {
            let _ = writeln!(out, "error: {}", error);
        }

        let _ = writeln!(
            out,
            "{} to create, {} to update, {} to delete, {} unchanged, {} errors",
            plan.count(|a| matches!(a, SyncAction::Create { .. })),
            plan.count(|a| matches!(a, SyncAction::Update { .. })),
            plan.count(|a| matches!(a, SyncAction::Delete { .. })),
            plan.count(|a| matches!(a, SyncAction::Skip { .. })),
            plan.errors.len()
        );
        out
    }

    fn note_line(&self, note: &NotePlan) -> String {
        let source = &note.source;
        match &note.action {
            SyncAction::Create {
                model,
                deck,
                tags,
                stale_id,
                ..
            } => {
                let mut line = format!(
                    "create  {}  {} in '{}' [{}]",
                    source,
                    model,
                    deck,
                    tags.join(", ")
                );
                if let Some(id) = stale_id {
                    let _ = write!(line, " (replaces {})", id);
                }
                line
            }
            SyncAction::Update { id, deck, tags, .. } => {
                format!("update  {}  {} in '{}' [{}]", source, id, deck, tags.join(", "))
            }
            SyncAction::Delete { id } => format!("delete  {}  {}", source, id),
            SyncAction::Skip { reason } => {
                let reason = match reason {
                    SkipReason::Disabled => "disabled",
                    SkipReason::NothingToDelete => "marked for deletion but never synced",
                    SkipReason::UpToDate => "up to date",
                };
                format!("skip    {}  {}", source, reason)
            }
        }
    }

    /// Files and block positions a render pass touches
    pub fn render_edits(&self, planned: &[FileEdits], written: bool) -> String {
        let mut out = String::new();
        for file in planned {
            for (location, _) in &file.edits {
                let _ = writeln!(out, "{}:{}", vault_path_string(&file.path), location);
            }
        }
        let verb = if written { "rewritten" } else { "to rewrite" };
        let blocks: usize = planned.iter().map(|f| f.edits.len()).sum();
        let _ = writeln!(out, "{} blocks in {} files {}", blocks, planned.len(), verb);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::NoteError;
    use crate::domain::{DomainError, ParseLocation, SourceDescriptor};
    use std::collections::BTreeMap;
    use std::path::Path;

    fn plan() -> SyncPlan {
        let text = "\n\n<!--anki-->";
        let location = ParseLocation::from_range(text, 2..text.len()).unwrap();
        let source = SourceDescriptor::new("Bio/Cells.md", location.clone());
        SyncPlan {
            notes: vec![
                NotePlan {
                    source: source.clone(),
                    action: SyncAction::Create {
                        model: "Basic".to_string(),
                        deck: "Bio".to_string(),
                        tags: vec!["obsidian".to_string(), "exam".to_string()],
                        fields: BTreeMap::new(),
                        stale_id: Some(5),
                    },
                    rewrite: None,
                    warnings: vec!["note 5 no longer exists in Anki".to_string()],
                },
                NotePlan {
                    source,
                    action: SyncAction::Skip {
                        reason: SkipReason::Disabled,
                    },
                    rewrite: None,
                    warnings: vec![],
                },
            ],
            errors: vec![NoteError::new(
                Path::new("Bio/Cells.md"),
                &location,
                DomainError::NoteNotFound(9),
            )],
        }
    }

    #[test]
    fn given_plan_when_rendering_text_then_lists_actions_and_summary() {
        let output = PlanPresenter::new().render_text(&plan());

        assert!(output.contains("create  Bio/Cells.md:3:0  Basic in 'Bio' [obsidian, exam] (replaces 5)"));
        assert!(output.contains("    warning: note 5 no longer exists in Anki"));
        assert!(output.contains("skip    Bio/Cells.md:3:0  disabled"));
        assert!(output.contains("error: Bio/Cells.md:3:0: Note not found: 9"));
        assert!(output.ends_with("1 to create, 0 to update, 0 to delete, 1 unchanged, 1 errors\n"));
    }

    #[test]
    fn given_plan_when_rendering_json_then_includes_errors() {
        let json = PlanPresenter::new().render_json(&plan()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["notes"][0]["action"], "create");
        assert_eq!(value["notes"][0]["stale_id"], 5);
        assert_eq!(value["notes"][1]["reason"], "disabled");
        assert_eq!(value["errors"][0]["line"], 3);
        assert_eq!(value["errors"][0]["error"], "Note not found: 9");
    }
}
