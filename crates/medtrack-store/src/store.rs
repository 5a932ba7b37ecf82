//! The persisted reactive store.
//!
//! [`MedicationStore`] holds the medication list and auth info in a
//! `tokio::sync::watch` channel. Mutators apply to memory synchronously, so
//! the next read on the same task sees them, and then hand the new list to
//! the write path without waiting on it.
//!
//! Two write paths exist:
//!
//! - [`WriteMode::FireAndForget`] spawns one task per write. Writes may
//!   complete in any order; the persisted list is whatever the last write to
//!   resolve carried, which can be older than memory.
//! - [`WriteMode::Serialized`] pushes writes through one queue drained by a
//!   single writer task, so they reach the backend in mutation order.
//!
//! Either way the mutator returns a [`PersistHandle`]. Dropping it is the
//! normal fire-and-forget usage; awaiting it observes the acknowledgement.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::adapter::StorageAdapter;
use crate::error::{StoreError, StoreResult};
use crate::model::{AuthInfo, INFO_KEY, MEDICATIONS_KEY, MedicationRecord, StoreState};

// ── configuration ────────────────────────────────────────────────────

/// How mutations reach the storage adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// One spawned task per write, unordered.
    #[default]
    FireAndForget,
    /// One writer task, writes applied in call order.
    Serialized,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FireAndForget => write!(f, "fire_and_forget"),
            Self::Serialized => write!(f, "serialized"),
        }
    }
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fire_and_forget" => Ok(Self::FireAndForget),
            "serialized" => Ok(Self::Serialized),
            other => Err(format!(
                "unknown write mode `{other}` (expected fire_and_forget or serialized)"
            )),
        }
    }
}

/// Store construction options.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub write_mode: WriteMode,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }
}

// ── persist handle ───────────────────────────────────────────────────

/// Outcome of one persisted write, observable at the caller's discretion.
#[derive(Debug)]
pub struct PersistHandle {
    key: &'static str,
    ack: oneshot::Receiver<StoreResult<()>>,
}

impl PersistHandle {
    /// The storage key this write targets.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Wait until the backend acknowledges (or rejects) the write.
    pub async fn wait(self) -> StoreResult<()> {
        self.ack.await.map_err(|_| StoreError::WriterClosed)?
    }
}

// ── writer ───────────────────────────────────────────────────────────

struct WriteJob {
    key: &'static str,
    value: Value,
    ack: oneshot::Sender<StoreResult<()>>,
}

enum Writer {
    FireAndForget,
    Serialized {
        queue: mpsc::UnboundedSender<WriteJob>,
        task: JoinHandle<()>,
    },
}

async fn write_one(storage: &dyn StorageAdapter, job: WriteJob) {
    let result = storage.set(job.key, job.value).await;
    match &result {
        Ok(()) => debug!(backend = storage.name(), key = job.key, "write acknowledged"),
        Err(err) => warn!(backend = storage.name(), key = job.key, %err, "write failed"),
    }
    // Nobody listening is the common case.
    let _ = job.ack.send(result);
}

async fn run_writer(storage: Arc<dyn StorageAdapter>, mut queue: mpsc::UnboundedReceiver<WriteJob>) {
    debug!(backend = storage.name(), "serialized writer started");
    while let Some(job) = queue.recv().await {
        write_one(storage.as_ref(), job).await;
    }
    debug!(backend = storage.name(), "serialized writer drained");
}

// ── store ────────────────────────────────────────────────────────────

/// In-memory medication list and auth info, mirrored to a storage adapter.
///
/// Construct once at startup inside a Tokio runtime and share by reference.
pub struct MedicationStore {
    storage: Arc<dyn StorageAdapter>,
    state: watch::Sender<StoreState>,
    writer: Writer,
}

impl MedicationStore {
    /// Create a store over `storage`. The list stays unloaded until
    /// [`init`](Self::init) resolves.
    pub fn new(storage: Arc<dyn StorageAdapter>, config: StoreConfig) -> Self {
        let (state, _) = watch::channel(StoreState::default());

        let writer = match config.write_mode {
            WriteMode::FireAndForget => Writer::FireAndForget,
            WriteMode::Serialized => {
                let (queue, rx) = mpsc::unbounded_channel();
                let task = tokio::spawn(run_writer(Arc::clone(&storage), rx));
                Writer::Serialized { queue, task }
            }
        };

        info!(
            backend = storage.name(),
            write_mode = %config.write_mode,
            "medication store created"
        );

        Self {
            storage,
            state,
            writer,
        }
    }

    pub fn write_mode(&self) -> WriteMode {
        match self.writer {
            Writer::FireAndForget => WriteMode::FireAndForget,
            Writer::Serialized { .. } => WriteMode::Serialized,
        }
    }

    // ── reads ────────────────────────────────────────────────────────

    /// A copy of the current state.
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Run `f` against the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Subscribe to state changes. Every mutator notifies subscribers.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    // ── lifecycle ────────────────────────────────────────────────────

    /// Load the medication list from storage.
    ///
    /// A missing (or null) key is seeded with an empty list and the
    /// in-memory list becomes empty, discarding anything mutated before the
    /// read resolved. There is no timeout: a read that never resolves keeps
    /// the list unloaded. Errors leave the list as it was.
    pub async fn init(&self) -> StoreResult<()> {
        let stored = self.storage.get(MEDICATIONS_KEY).await?;

        match stored {
            None | Some(Value::Null) => {
                info!("no stored medications, seeding empty list");
                self.state.send_modify(|state| state.list = Some(Vec::new()));
                // Through the write path, so a serialized queue keeps call order.
                let seed = self.persist(MEDICATIONS_KEY, Value::Array(Vec::new()));
                if let Err(err) = seed.wait().await {
                    warn!(%err, "failed to seed empty medication list");
                }
            }
            Some(value) => {
                let list: Vec<MedicationRecord> = serde_json::from_value(value)?;
                info!(count = list.len(), "medications loaded");
                self.state.send_modify(|state| state.list = Some(list));
            }
        }
        Ok(())
    }

    /// Restore auth info persisted by a previous login, if any.
    pub async fn load_auth_info(&self) -> StoreResult<()> {
        match self.storage.get(INFO_KEY).await? {
            None | Some(Value::Null) => debug!("no stored auth info"),
            Some(value) => {
                let info: AuthInfo = serde_json::from_value(value)?;
                self.set_auth_info(info);
            }
        }
        Ok(())
    }

    /// Stop accepting writes and wait for queued ones to finish.
    pub async fn shutdown(self) -> StoreResult<()> {
        if let Writer::Serialized { queue, task } = self.writer {
            drop(queue);
            task.await?;
        }
        info!("medication store shut down");
        Ok(())
    }

    // ── mutators ─────────────────────────────────────────────────────

    /// Append `record` and persist the new list.
    pub fn add_item(&self, record: MedicationRecord) -> PersistHandle {
        debug!(id = %record.id, "adding medication");
        let list = self.modify_list(|list| list.push(record));
        self.persist_list(list)
    }

    /// Replace the record sharing `record.id` and persist the new list.
    ///
    /// The old entry is removed and the new one appended, so an updated
    /// record always moves to the end of the list. Timeline rendering may
    /// depend on that order.
    pub fn update_item(&self, record: MedicationRecord) -> PersistHandle {
        debug!(id = %record.id, "updating medication");
        let list = self.modify_list(|list| {
            list.retain(|existing| existing.id != record.id);
            list.push(record);
        });
        self.persist_list(list)
    }

    /// Replace the auth info in memory. Persisting it is up to the caller;
    /// see [`persist_auth_info`](Self::persist_auth_info).
    pub fn set_auth_info(&self, info: AuthInfo) {
        debug!(authenticated = info.is_authenticated(), "auth info replaced");
        self.state.send_modify(|state| state.info = info);
    }

    /// Persist the current auth info under the `info` key.
    pub fn persist_auth_info(&self) -> PersistHandle {
        let info = self.state.borrow().info.clone();
        match serde_json::to_value(&info) {
            Ok(value) => self.persist(INFO_KEY, value),
            Err(err) => Self::failed(INFO_KEY, err.into()),
        }
    }

    // ── internals ────────────────────────────────────────────────────

    /// Apply `f` to the list (loaded or not) and return the resulting list.
    fn modify_list(&self, f: impl FnOnce(&mut Vec<MedicationRecord>)) -> Vec<MedicationRecord> {
        let mut snapshot = Vec::new();
        self.state.send_modify(|state| {
            let list = state.list.get_or_insert_with(Vec::new);
            f(list);
            snapshot = list.clone();
        });
        snapshot
    }

    fn persist_list(&self, list: Vec<MedicationRecord>) -> PersistHandle {
        match serde_json::to_value(&list) {
            Ok(value) => self.persist(MEDICATIONS_KEY, value),
            Err(err) => Self::failed(MEDICATIONS_KEY, err.into()),
        }
    }

    fn persist(&self, key: &'static str, value: Value) -> PersistHandle {
        let (ack, rx) = oneshot::channel();
        let job = WriteJob { key, value, ack };

        match &self.writer {
            Writer::FireAndForget => {
                let storage = Arc::clone(&self.storage);
                tokio::spawn(async move { write_one(storage.as_ref(), job).await });
            }
            Writer::Serialized { queue, .. } => {
                if queue.send(job).is_err() {
                    // The job (and its ack) is dropped; the handle reports it.
                    warn!(key, "serialized writer gone, write dropped");
                }
            }
        }

        PersistHandle { key, ack: rx }
    }

    fn failed(key: &'static str, err: StoreError) -> PersistHandle {
        warn!(key, %err, "could not encode value for storage");
        let (ack, rx) = oneshot::channel();
        let _ = ack.send(Err(err));
        PersistHandle { key, ack: rx }
    }
}

// ── tests ────────────────────────────────────────────────────────────
