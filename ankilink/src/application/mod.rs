// src/application/mod.rs
pub mod note_collector;
pub mod note_renderer;
pub mod sync_planner;

pub use note_collector::{CollectedFile, NoteCollector, NoteError};
pub use note_renderer::{FileEdits, NoteRenderer};
pub use sync_planner::{
    plan_note, NotePlan, RemoteNoteStore, SkipReason, SyncAction, SyncPlan, SyncPlanner,
};
