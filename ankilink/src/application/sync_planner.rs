use crate::application::NoteError;
use crate::constants::{BASIC_MODEL_NAME, CLOZE_MODEL_NAME};
use crate::domain::{
    normalise_note_info_fields, AnkiFields, DomainError, Note, NotesInfoResponseEntity,
    Settings, SourceDescriptor, TagCache,
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument, warn};

/// Read access to the remote flashcard store
pub trait RemoteNoteStore {
    /// One entry per requested id, in order; `None` when the store has no such note
    fn notes_info(
        &mut self,
        ids: &[i64],
    ) -> Result<Vec<Option<NotesInfoResponseEntity>>, DomainError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Disabled,
    NothingToDelete,
    UpToDate,
}

/// What the I/O layer should do in Anki for one note
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncAction {
    Create {
        model: String,
        deck: String,
        tags: Vec<String>,
        fields: AnkiFields,
        /// Id the block carried although Anki no longer has that note
        stale_id: Option<i64>,
    },
    Update {
        id: i64,
        deck: String,
        tags: Vec<String>,
        fields: AnkiFields,
    },
    Delete {
        id: i64,
    },
    Skip {
        reason: SkipReason,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotePlan {
    pub source: SourceDescriptor,
    #[serde(flatten)]
    pub action: SyncAction,
    /// Canonical block text, when the document should be rewritten
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncPlan {
    pub notes: Vec<NotePlan>,
    pub errors: Vec<NoteError>,
}

impl SyncPlan {
    pub fn count(&self, matches: impl Fn(&SyncAction) -> bool) -> usize {
        self.notes.iter().filter(|plan| matches(&plan.action)).count()
    }
}

/// Decide the sync action for one note given the remote record for its id.
///
/// `remote` is `None` both for new notes and for ids Anki does not know.
pub fn plan_note(
    note: &Note,
    remote: Option<&NotesInfoResponseEntity>,
    settings: &Settings,
    cache: &dyn TagCache,
) -> Result<NotePlan, DomainError> {
    let mut warnings = Vec::new();
    if note.has_cloze_conflict() {
        warnings.push(format!(
            "config says cloze: {} but the block is a {} note; using the block type",
            note.config().cloze.unwrap_or_default(),
            note.blueprint()
        ));
    }

    let rewrite = if note.should_update_file()? {
        Some(note.render_as_text()?)
    } else {
        None
    };

    let action = if !note.get_enabled() {
        SyncAction::Skip {
            reason: SkipReason::Disabled,
        }
    } else if note.is_marked_for_deletion() {
        match note.id() {
            Some(id) => SyncAction::Delete { id },
            None => SyncAction::Skip {
                reason: SkipReason::NothingToDelete,
            },
        }
    } else {
        let deck = note.get_deck_name(settings);
        let tags = note.get_tags(settings, cache);
        match (note.id(), remote) {
            (None, _) => create(note, deck, tags, None),
            (Some(id), None) => {
                warnings.push(format!("note {} no longer exists in Anki and will be recreated", id));
                create(note, deck, tags, Some(id))
            }
            (Some(id), Some(remote)) => {
                let (remote_fields, remote_is_cloze) = normalise_note_info_fields(remote)?;
                if remote_is_cloze != note.is_cloze() {
                    return Err(DomainError::ModelMismatch {
                        note_id: id,
                        local: model_name(note.is_cloze()).to_string(),
                        remote: remote.model_name.clone(),
                    });
                }
                if &remote_fields != note.fields() || !same_tags(&tags, &remote.tags) {
                    SyncAction::Update {
                        id,
                        deck,
                        tags,
                        fields: note.anki_fields(),
                    }
                } else {
                    SyncAction::Skip {
                        reason: SkipReason::UpToDate,
                    }
                }
            }
        }
    };

    Ok(NotePlan {
        source: note.source().clone(),
        action,
        rewrite,
        warnings,
    })
}

fn create(note: &Note, deck: String, tags: Vec<String>, stale_id: Option<i64>) -> SyncAction {
    SyncAction::Create {
        model: model_name(note.is_cloze()).to_string(),
        deck,
        tags,
        fields: note.anki_fields(),
        stale_id,
    }
}

fn model_name(is_cloze: bool) -> &'static str {
    if is_cloze {
        CLOZE_MODEL_NAME
    } else {
        BASIC_MODEL_NAME
    }
}

fn same_tags(local: &[String], remote: &[String]) -> bool {
    local.iter().collect::<BTreeSet<_>>() == remote.iter().collect::<BTreeSet<_>>()
}

/// Plans a batch of notes against a remote store
pub struct SyncPlanner<'a, R: RemoteNoteStore> {
    store: R,
    settings: &'a Settings,
    cache: &'a dyn TagCache,
}

impl<'a, R: RemoteNoteStore> SyncPlanner<'a, R> {
    pub fn new(store: R, settings: &'a Settings, cache: &'a dyn TagCache) -> Self {
        Self {
            store,
            settings,
            cache,
        }
    }

    /// Look up all known ids in one request, then plan every note.
    /// A note that cannot be planned is reported and does not affect the others.
    /// An id already used earlier in the batch is an error for every later note carrying it.
    #[instrument(level = "debug", skip_all, fields(notes = notes.len()))]
    pub fn plan(&mut self, notes: &[Note]) -> Result<SyncPlan> {
        let mut first_use: HashMap<i64, usize> = HashMap::new();
        let mut ids: Vec<i64> = Vec::new();
        for (index, note) in notes.iter().enumerate() {
            if let Some(id) = note.id() {
                if let Entry::Vacant(slot) = first_use.entry(id) {
                    slot.insert(index);
                    ids.push(id);
                }
            }
        }
        let infos = self
            .store
            .notes_info(&ids)
            .context("Failed to query remote notes")?;
        let remote: HashMap<i64, NotesInfoResponseEntity> = ids
            .iter()
            .zip(infos)
            .filter_map(|(id, info)| info.map(|info| (*id, info)))
            .collect();
        debug!(requested = ids.len(), found = remote.len(), "Fetched remote notes");

        let mut plan = SyncPlan::default();
        for (index, note) in notes.iter().enumerate() {
            if let Some(id) = note.id() {
                let first_index = first_use.get(&id).copied().unwrap_or(index);
                if first_index != index {
                    let first = notes[first_index].source().to_string();
                    warn!(source = %note.source(), id, %first, "Duplicate note id");
                    plan.errors
                        .push(NoteError::for_note(note, DomainError::DuplicateId { id, first }));
                    continue;
                }
            }
            let remote_note = note.id().and_then(|id| remote.get(&id));
            match plan_note(note, remote_note, self.settings, self.cache) {
                Ok(note_plan) => plan.notes.push(note_plan),
                Err(e) => plan.errors.push(NoteError::for_note(note, e)),
            }
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NoTagCache, NoteFields, NoteInfoField, ParseLocation, ParseNoteResult};
    use crate::util::testing::MockRemoteStore;

    fn note(config: Option<&str>, front: &str, back: &str) -> Note {
        note_of_type("basic", config, front, back)
    }

    fn note_of_type(note_type: &str, config: Option<&str>, front: &str, back: &str) -> Note {
        let result = ParseNoteResult {
            note_type: note_type.to_string(),
            config: config.map(str::to_string),
            front: Some(front.to_string()),
            back: Some(back.to_string()),
            location: ParseLocation::from_range("", 0..0).unwrap(),
        };
        let source = SourceDescriptor::new("Biology/Cells.md", result.location.clone());
        let note = Note::from_parse_result(&result, source.clone(), "").unwrap();
        // Rebuild with its own rendering as source text, as if freshly read from disk
        let text = note.render_as_text().unwrap();
        Note::from_parse_result(&result, source, text).unwrap()
    }

    fn remote(id: i64, model: &str, fields: &[(&str, &str)], tags: &[&str]) -> NotesInfoResponseEntity {
        NotesInfoResponseEntity {
            note_id: id,
            model_name: model.to_string(),
            fields: fields
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        NoteInfoField {
                            value: value.to_string(),
                            order: 0,
                        },
                    )
                })
                .collect(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn given_new_note_when_planning_then_creates_it() {
        let note = note(Some("deck: Bio"), "Q", "A");

        let plan = plan_note(&note, None, &Settings::default(), &NoTagCache).unwrap();

        match plan.action {
            SyncAction::Create {
                model,
                deck,
                tags,
                fields,
                stale_id,
            } => {
                assert_eq!(model, "Basic");
                assert_eq!(deck, "Default");
                assert_eq!(tags, vec!["obsidian"]);
                assert_eq!(fields["Front"], "Q");
                assert_eq!(stale_id, None);
            }
            other => panic!("Expected Create, got {:?}", other),
        }
        assert_eq!(plan.rewrite, None);
    }

    #[test]
    fn given_unchanged_remote_when_planning_then_skips() {
        let note = note(Some("id: 10"), "Q", "A");
        let record = remote(10, "Basic", &[("Front", "Q"), ("Back", "A")], &["obsidian"]);

        let plan = plan_note(&note, Some(&record), &Settings::default(), &NoTagCache).unwrap();

        assert_eq!(
            plan.action,
            SyncAction::Skip {
                reason: SkipReason::UpToDate
            }
        );
    }

    #[test]
    fn given_local_edit_when_planning_then_updates_remote() {
        let note = note(Some("id: 10"), "Q", "New answer");
        let record = remote(10, "Basic", &[("Front", "Q"), ("Back", "A")], &["obsidian"]);

        let plan = plan_note(&note, Some(&record), &Settings::default(), &NoTagCache).unwrap();

        match plan.action {
            SyncAction::Update { id, fields, .. } => {
                assert_eq!(id, 10);
                assert_eq!(fields["Back"], "New answer");
            }
            other => panic!("Expected Update, got {:?}", other),
        }
    }

    #[test]
    fn given_changed_tags_when_planning_then_updates_remote() {
        let note = note(Some("id: 10\ntags: [exam]"), "Q", "A");
        let record = remote(10, "Basic", &[("Front", "Q"), ("Back", "A")], &["obsidian"]);

        let plan = plan_note(&note, Some(&record), &Settings::default(), &NoTagCache).unwrap();

        assert!(matches!(plan.action, SyncAction::Update { .. }));
    }

    #[test]
    fn given_id_unknown_to_remote_when_planning_then_recreates_with_warning() {
        let note = note(Some("id: 10"), "Q", "A");

        let plan = plan_note(&note, None, &Settings::default(), &NoTagCache).unwrap();

        assert!(matches!(
            plan.action,
            SyncAction::Create {
                stale_id: Some(10),
                ..
            }
        ));
        assert_eq!(plan.warnings.len(), 1);
    }

    #[test]
    fn given_disabled_note_when_planning_then_skips() {
        let note = note(Some("id: 10\nenabled: false"), "Q", "A");

        let plan = plan_note(&note, None, &Settings::default(), &NoTagCache).unwrap();

        assert_eq!(
            plan.action,
            SyncAction::Skip {
                reason: SkipReason::Disabled
            }
        );
    }

    #[test]
    fn given_delete_flag_when_planning_then_deletes_or_skips() {
        let with_id = note(Some("id: 10\ndelete: true"), "Q", "A");
        let without_id = note(Some("delete: true"), "Q", "A");

        let settings = Settings::default();
        let first = plan_note(&with_id, None, &settings, &NoTagCache).unwrap();
        let second = plan_note(&without_id, None, &settings, &NoTagCache).unwrap();

        assert_eq!(first.action, SyncAction::Delete { id: 10 });
        assert_eq!(
            second.action,
            SyncAction::Skip {
                reason: SkipReason::NothingToDelete
            }
        );
    }

    #[test]
    fn given_remote_cloze_for_basic_note_when_planning_then_reports_model_mismatch() {
        let note = note(Some("id: 10"), "Q", "A");
        let record = remote(10, "Cloze", &[("Text", "Q"), ("Back Extra", "A")], &[]);

        let result = plan_note(&note, Some(&record), &Settings::default(), &NoTagCache);

        assert!(matches!(result, Err(DomainError::ModelMismatch { note_id: 10, .. })));
    }

    #[test]
    fn given_remote_with_missing_field_when_planning_then_reports_shape_mismatch() {
        let note = note(Some("id: 10"), "Q", "A");
        let record = remote(10, "Basic", &[("Front", "Q")], &[]);

        let result = plan_note(&note, Some(&record), &Settings::default(), &NoTagCache);

        assert!(matches!(result, Err(DomainError::ShapeMismatch { .. })));
    }

    #[test]
    fn given_short_cloze_syntax_when_planning_then_asks_for_rewrite() {
        let result = ParseNoteResult {
            note_type: "cloze".to_string(),
            config: None,
            front: Some("Capital is {Paris}".to_string()),
            back: None,
            location: ParseLocation::from_range("", 0..0).unwrap(),
        };
        let source_text = "<!--anki:cloze-->\nCapital is {Paris}\n<!--/anki-->";
        let source = SourceDescriptor::new("Geo.md", result.location.clone());
        let note = Note::from_parse_result(&result, source, source_text).unwrap();

        let plan = plan_note(&note, None, &Settings::default(), &NoTagCache).unwrap();

        assert_eq!(
            plan.rewrite.as_deref(),
            Some("<!--anki:cloze-->\nCapital is {{c1::Paris}}\n<!--/anki-->")
        );
        assert!(matches!(plan.action, SyncAction::Create { ref model, .. } if model == "Cloze"));
    }

    #[test]
    fn given_cloze_conflict_when_planning_then_warns() {
        let note = note_of_type("cloze", Some("cloze: false"), "{{c1::x}}", "");

        let plan = plan_note(&note, None, &Settings::default(), &NoTagCache).unwrap();

        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("cloze"));
    }

    #[test]
    fn given_batch_with_bad_remote_when_planning_then_other_notes_still_planned() {
        let good = note(Some("id: 1"), "Q1", "A1");
        let bad = note(Some("id: 2"), "Q2", "A2");
        let fresh = note(None, "Q3", "A3");
        let store = MockRemoteStore::builder()
            .with_note(remote(1, "Basic", &[("Front", "Q1"), ("Back", "A1")], &["obsidian"]))
            .with_note(remote(2, "Basic", &[("Front", "Q2")], &[]))
            .build();
        let settings = Settings::default();
        let mut planner = SyncPlanner::new(store, &settings, &NoTagCache);

        let plan = planner.plan(&[good, bad, fresh]).unwrap();

        assert_eq!(plan.notes.len(), 2);
        assert_eq!(plan.errors.len(), 1);
        assert!(plan.errors[0].to_string().contains("missing field 'Back'"));
        assert_eq!(plan.count(|a| matches!(a, SyncAction::Create { .. })), 1);
        assert_eq!(plan.count(|a| matches!(a, SyncAction::Skip { .. })), 1);
    }

    #[test]
    fn given_duplicate_ids_in_batch_when_planning_then_reports_later_uses() {
        let first = note(Some("id: 5"), "Q1", "A1");
        let copy = note(Some("id: 5"), "Q1 copy", "A1");
        let other = note(Some("id: 6"), "Q2", "A2");
        let store = MockRemoteStore::builder()
            .with_note(remote(5, "Basic", &[("Front", "Q1"), ("Back", "A1")], &["obsidian"]))
            .build();
        let settings = Settings::default();
        let mut planner = SyncPlanner::new(store, &settings, &NoTagCache);

        let plan = planner.plan(&[first, copy, other]).unwrap();

        assert_eq!(plan.notes.len(), 2);
        assert_eq!(plan.errors.len(), 1);
        assert!(plan.errors[0].to_string().contains("Note id 5 is also used"));
        assert_eq!(planner.store.requests(), &[vec![5, 6]]);
    }

    #[test]
    fn given_failing_store_when_planning_then_returns_error() {
        let store = MockRemoteStore::builder().with_failure("connection refused").build();
        let settings = Settings::default();
        let mut planner = SyncPlanner::new(store, &settings, &NoTagCache);

        let result = planner.plan(&[note(Some("id: 1"), "Q", "A")]);

        assert!(result.is_err());
    }

    #[test]
    fn given_plan_when_serializing_then_flattens_action() {
        let note = note(None, "Q", "A");
        let plan = plan_note(&note, None, &Settings::default(), &NoTagCache).unwrap();

        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["action"], "create");
        assert_eq!(json["deck"], "Default");
        assert_eq!(json["fields"]["Front"], "Q");
        assert!(json.get("rewrite").is_none());
    }

    #[test]
    fn given_fields_from_note_when_comparing_then_uses_normalised_slots() {
        let fields = NoteFields::new("Q", "A");
        let record = remote(1, "Basic", &[("Front", "Q"), ("Back", "A")], &[]);

        let (remote_fields, _) = normalise_note_info_fields(&record).unwrap();

        assert_eq!(remote_fields, fields);
    }
}
