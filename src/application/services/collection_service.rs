//! Collection Service - The session-scoped gallery and its single mutator
//!
//! [`CollectionState`] is a plain state container with total mutation
//! methods. At runtime it is owned by one actor task; every read and write
//! goes through a [`CollectionHandle`] as a command over an mpsc channel, so
//! commands are applied strictly one after another and a batch becomes
//! visible in a single step.

use std::collections::HashSet;

use tokio::sync::{mpsc, oneshot};

use crate::domain::entities::{Entry, EntryPatch};
use crate::domain::value_objects::EntryId;

/// Capacity of the command channel
const COMMAND_BUFFER: usize = 64;

// =============================================================================
// State
// =============================================================================

/// Entries (newest first) plus transient batch flags and per-entry view-state
#[derive(Debug, Clone, Default)]
pub struct CollectionState {
    entries: Vec<Entry>,
    is_loading: bool,
    error: Option<String>,
    /// Entries whose model sheet request is in flight
    model_loading: HashSet<EntryId>,
}

impl CollectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Mark a batch as started and clear the previous error
    ///
    /// Rejected while another batch is running.
    pub fn begin_batch(&mut self) -> Result<(), CollectionError> {
        if self.is_loading {
            return Err(CollectionError::BatchInProgress);
        }
        self.is_loading = true;
        self.error = None;
        Ok(())
    }

    /// Prepend a batch, keeping both its internal order and the existing order
    pub fn append_batch(&mut self, batch: Vec<Entry>) {
        let mut entries = batch;
        entries.append(&mut self.entries);
        self.entries = entries;
    }

    /// Publish a finished batch and clear the loading flag in one step
    pub fn complete_batch(&mut self, batch: Vec<Entry>) {
        self.append_batch(batch);
        self.is_loading = false;
        self.error = None;
    }

    /// Record a batch failure; entries are left untouched
    pub fn fail_batch(&mut self, message: impl Into<String>) {
        self.is_loading = false;
        self.error = Some(message.into());
    }

    /// Shallow-merge `patch` into the entry with `id`
    ///
    /// Returns false (and changes nothing) when no entry matches.
    pub fn patch_entry(&mut self, id: EntryId, patch: EntryPatch) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Toggle the model sheet loading flag; no-op for unknown ids
    pub fn set_model_loading(&mut self, id: EntryId, loading: bool) -> bool {
        if !self.entries.iter().any(|e| e.id == id) {
            self.model_loading.remove(&id);
            return false;
        }
        if loading {
            self.model_loading.insert(id);
        } else {
            self.model_loading.remove(&id);
        }
        true
    }

    /// Drop every entry along with its view-state
    pub fn clear(&mut self) {
        self.entries.clear();
        self.model_loading.clear();
    }

    pub fn entry(&self, id: EntryId) -> Option<EntryView> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|entry| self.view_of(entry))
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        CollectionSnapshot {
            entries: self.entries.iter().map(|e| self.view_of(e)).collect(),
            is_loading: self.is_loading,
            error: self.error.clone(),
        }
    }

    fn view_of(&self, entry: &Entry) -> EntryView {
        EntryView {
            entry: entry.clone(),
            is_model_loading: self.model_loading.contains(&entry.id),
        }
    }
}

/// An entry together with its transient view-state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub entry: Entry,
    pub is_model_loading: bool,
}

/// Point-in-time copy of the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSnapshot {
    pub entries: Vec<EntryView>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    #[error("A batch is already being generated")]
    BatchInProgress,
    #[error("Collection store is not running")]
    StoreClosed,
}

// =============================================================================
// Actor
// =============================================================================

enum CollectionCommand {
    BeginBatch {
        reply: oneshot::Sender<Result<(), CollectionError>>,
    },
    CompleteBatch {
        entries: Vec<Entry>,
        reply: oneshot::Sender<()>,
    },
    FailBatch {
        message: String,
        reply: oneshot::Sender<()>,
    },
    PatchEntry {
        id: EntryId,
        patch: EntryPatch,
        reply: oneshot::Sender<bool>,
    },
    SetModelLoading {
        id: EntryId,
        loading: bool,
        reply: oneshot::Sender<bool>,
    },
    Clear {
        reply: oneshot::Sender<()>,
    },
    GetEntry {
        id: EntryId,
        reply: oneshot::Sender<Option<EntryView>>,
    },
    Snapshot {
        reply: oneshot::Sender<CollectionSnapshot>,
    },
}

/// Cloneable handle to the collection actor
#[derive(Clone)]
pub struct CollectionHandle {
    sender: mpsc::Sender<CollectionCommand>,
}

impl CollectionHandle {
    /// Spawn the actor with an empty collection
    ///
    /// Must be called from within a tokio runtime. The actor stops once every
    /// handle has been dropped.
    pub fn spawn() -> Self {
        Self::spawn_with(CollectionState::new())
    }

    pub fn spawn_with(state: CollectionState) -> Self {
        let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(run_actor(state, receiver));
        Self { sender }
    }

    pub async fn begin_batch(&self) -> Result<(), CollectionError> {
        self.request(|reply| CollectionCommand::BeginBatch { reply })
            .await?
    }

    pub async fn complete_batch(&self, entries: Vec<Entry>) -> Result<(), CollectionError> {
        self.request(|reply| CollectionCommand::CompleteBatch { entries, reply })
            .await
    }

    pub async fn fail_batch(&self, message: impl Into<String>) -> Result<(), CollectionError> {
        let message = message.into();
        self.request(|reply| CollectionCommand::FailBatch { message, reply })
            .await
    }

    pub async fn patch_entry(&self, id: EntryId, patch: EntryPatch) -> Result<bool, CollectionError> {
        self.request(|reply| CollectionCommand::PatchEntry { id, patch, reply })
            .await
    }

    pub async fn set_model_loading(
        &self,
        id: EntryId,
        loading: bool,
    ) -> Result<bool, CollectionError> {
        self.request(|reply| CollectionCommand::SetModelLoading { id, loading, reply })
            .await
    }

    pub async fn clear(&self) -> Result<(), CollectionError> {
        self.request(|reply| CollectionCommand::Clear { reply }).await
    }

    pub async fn entry(&self, id: EntryId) -> Result<Option<EntryView>, CollectionError> {
        self.request(|reply| CollectionCommand::GetEntry { id, reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<CollectionSnapshot, CollectionError> {
        self.request(|reply| CollectionCommand::Snapshot { reply })
            .await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> CollectionCommand,
    ) -> Result<T, CollectionError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| CollectionError::StoreClosed)?;
        response.await.map_err(|_| CollectionError::StoreClosed)
    }
}

async fn run_actor(mut state: CollectionState, mut receiver: mpsc::Receiver<CollectionCommand>) {
    tracing::debug!("Collection actor started");

    while let Some(command) = receiver.recv().await {
        match command {
            CollectionCommand::BeginBatch { reply } => {
                let _ = reply.send(state.begin_batch());
            }
            CollectionCommand::CompleteBatch { entries, reply } => {
                let added = entries.len();
                state.complete_batch(entries);
                tracing::debug!(added, total = state.entries().len(), "Batch published");
                let _ = reply.send(());
            }
            CollectionCommand::FailBatch { message, reply } => {
                state.fail_batch(message);
                let _ = reply.send(());
            }
            CollectionCommand::PatchEntry { id, patch, reply } => {
                let _ = reply.send(state.patch_entry(id, patch));
            }
            CollectionCommand::SetModelLoading { id, loading, reply } => {
                let _ = reply.send(state.set_model_loading(id, loading));
            }
            CollectionCommand::Clear { reply } => {
                state.clear();
                let _ = reply.send(());
            }
            CollectionCommand::GetEntry { id, reply } => {
                let _ = reply.send(state.entry(id));
            }
            CollectionCommand::Snapshot { reply } => {
                let _ = reply.send(state.snapshot());
            }
        }
    }

    tracing::debug!("Collection actor shutting down");
}
