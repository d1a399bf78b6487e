// src/util/testing.rs

use anyhow::Result;
use std::collections::HashMap;
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::RemoteNoteStore;
use crate::domain::{DomainError, NotesInfoResponseEntity};

/// In-memory remote store for testing the planner
///
/// # Examples
///
/// ```
/// use ankilink::util::testing::MockRemoteStore;
/// use ankilink::domain::NotesInfoResponseEntity;
/// use std::collections::HashMap;
///
/// let mock = MockRemoteStore::builder()
///     .with_note(NotesInfoResponseEntity {
///         note_id: 123,
///         model_name: "Basic".to_string(),
///         fields: HashMap::new(),
///         tags: vec![],
///     })
///     .build();
/// ```
pub struct MockRemoteStore {
    notes: HashMap<i64, NotesInfoResponseEntity>,
    failure: Option<String>,
    requests: Vec<Vec<i64>>,
}

impl MockRemoteStore {
    pub fn builder() -> MockRemoteStoreBuilder {
        MockRemoteStoreBuilder::new()
    }

    /// Id batches received so far
    pub fn requests(&self) -> &[Vec<i64>] {
        &self.requests
    }
}

impl RemoteNoteStore for MockRemoteStore {
    fn notes_info(
        &mut self,
        ids: &[i64],
    ) -> Result<Vec<Option<NotesInfoResponseEntity>>, DomainError> {
        self.requests.push(ids.to_vec());
        if let Some(message) = &self.failure {
            return Err(DomainError::validation(message.clone()));
        }
        Ok(ids.iter().map(|id| self.notes.get(id).cloned()).collect())
    }
}

/// Builder for MockRemoteStore
pub struct MockRemoteStoreBuilder {
    notes: HashMap<i64, NotesInfoResponseEntity>,
    failure: Option<String>,
}

impl MockRemoteStoreBuilder {
    pub fn new() -> Self {
        Self {
            notes: HashMap::new(),
            failure: None,
        }
    }

    /// Add a remote record, keyed by its note id
    pub fn with_note(mut self, note: NotesInfoResponseEntity) -> Self {
        self.notes.insert(note.note_id, note);
        self
    }

    /// Make every query fail
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn build(self) -> MockRemoteStore {
        MockRemoteStore {
            notes: self.notes,
            failure: self.failure,
            requests: Vec::new(),
        }
    }
}

impl Default for MockRemoteStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["walkdir"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
