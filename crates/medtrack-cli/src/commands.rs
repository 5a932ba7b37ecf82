//! Subcommand implementations.
//!
//! Every command opens a [`Session`], does its work against the reactive
//! store, waits for the writes it issued, and shuts the store down so no
//! write is lost when the process exits.

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use medtrack_store::{
    AuthInfo, CachedStorage, Database, MEDICATIONS_KEY, MedicationRecord, MedicationStore,
    PersistHandle, ScreenSet, SqliteStorage, StorageAdapter, StoreConfig,
};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::helpers::{format_record, parse_time, resolve_color};
use crate::picker::{ColorPicker, PickerOutcome};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An initialised store plus direct access to its SQLite backend.
pub struct Session {
    pub store: MedicationStore,
    sqlite: Arc<SqliteStorage>,
    cache: Option<Arc<CachedStorage<Arc<SqliteStorage>>>>,
}

impl Session {
    /// Open the database, wrap it in the cache if enabled, and load state.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let path = config.storage.path.clone();
        ensure_parent_dir(&path)?;

        let db = Database::open_and_migrate(path.clone())
            .await
            .with_context(|| format!("failed to open database {}", path.display()))?;
        let sqlite = Arc::new(SqliteStorage::new(db));

        let cache = (config.storage.cache_capacity > 0).then(|| {
            Arc::new(
                CachedStorage::builder(sqlite.clone())
                    .max_capacity(config.storage.cache_capacity)
                    .ttl_seconds(config.storage.cache_ttl_seconds)
                    .build(),
            )
        });
        let storage: Arc<dyn StorageAdapter> = match &cache {
            Some(cached) => cached.clone(),
            None => sqlite.clone(),
        };

        let store = MedicationStore::new(
            storage,
            StoreConfig::new().with_write_mode(config.storage.write_mode),
        );
        store.init().await.context("failed to load medications")?;
        store
            .load_auth_info()
            .await
            .context("failed to load auth info")?;

        info!(
            path = %path.display(),
            write_mode = %config.storage.write_mode,
            "session opened"
        );
        Ok(Self {
            store,
            sqlite,
            cache,
        })
    }

    /// Fail unless a token is stored. Medication screens sit behind login.
    fn require_app(&self) -> Result<()> {
        if self.store.with_state(|s| s.screens()) == ScreenSet::Auth {
            bail!("not signed in; run `medtrack login --token <TOKEN>` first");
        }
        Ok(())
    }

    async fn finish(self, pending: Vec<PersistHandle>) -> Result<()> {
        for handle in pending {
            let key = handle.key();
            handle
                .wait()
                .await
                .with_context(|| format!("failed to persist {key}"))?;
        }
        self.store.shutdown().await?;
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
            debug!(dir = %parent.display(), "created data directory");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Medications
// ---------------------------------------------------------------------------

pub async fn cmd_list(session: Session, json: bool) -> Result<()> {
    session.require_app()?;
    let state = session.store.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(state.list())?);
    } else if state.list().is_empty() {
        println!("No medications yet. Add one with `medtrack add <NAME>`.");
    } else {
        println!(
            "{:<38} {:<20} {:<10} {:<6} COLOUR",
            "ID", "MEDICATION", "DOSAGE", "TIME"
        );
        for record in state.list() {
            println!("{}", format_record(record));
        }
    }
    session.finish(Vec::new()).await
}

/// Optional field edits shared by `add` and `update`.
#[derive(Debug, Default)]
pub struct RecordEdit {
    pub medication: Option<String>,
    pub dosage: Option<String>,
    pub time: Option<String>,
    pub color: Option<String>,
}

impl RecordEdit {
    /// Validate and apply onto `record`.
    pub fn apply_to(self, mut record: MedicationRecord) -> Result<MedicationRecord> {
        if let Some(medication) = self.medication {
            record.medication = Some(medication);
        }
        if let Some(dosage) = self.dosage {
            record.dosage = Some(dosage);
        }
        if let Some(time) = self.time {
            record.time = Some(parse_time(&time)?);
        }
        if let Some(color) = self.color {
            record.color_id = Some(resolve_color(&color)?);
        }
        Ok(record)
    }
}

pub async fn cmd_add(session: Session, edit: RecordEdit) -> Result<()> {
    session.require_app()?;
    let id = uuid::Uuid::now_v7().to_string();
    let record = edit.apply_to(MedicationRecord::new(id.clone()))?;

    let handle = session.store.add_item(record);
    session.finish(vec![handle]).await?;
    println!("Added {id}");
    Ok(())
}

pub async fn cmd_update(session: Session, id: String, edit: RecordEdit) -> Result<()> {
    session.require_app()?;
    let Some(existing) = session.store.with_state(|s| s.find(&id).cloned()) else {
        bail!("no medication with id {id}");
    };
    let record = edit.apply_to(existing)?;

    let handle = session.store.update_item(record);
    session.finish(vec![handle]).await?;
    println!("Updated {id}");
    Ok(())
}

pub async fn cmd_pick(session: Session, id: String) -> Result<()> {
    session.require_app()?;
    let Some(mut record) = session.store.with_state(|s| s.find(&id).cloned()) else {
        bail!("no medication with id {id}");
    };

    let picker = ColorPicker::new(record.color_id.as_deref())?;
    let outcome = picker.run(io::stdin().lock(), io::stdout().lock())?;
    println!();

    let mut pending = Vec::new();
    match outcome {
        PickerOutcome::Chosen(hex) if record.color_id.as_deref() == Some(hex.as_str()) => {
            println!("Colour unchanged.");
        }
        PickerOutcome::Chosen(hex) => {
            record.color_id = Some(hex);
            pending.push(session.store.update_item(record));
            println!("Colour updated.");
        }
        PickerOutcome::Cleared => {
            record.color_id = None;
            pending.push(session.store.update_item(record));
            println!("Colour cleared.");
        }
        PickerOutcome::Cancelled => println!("Cancelled."),
    }
    session.finish(pending).await
}

// ---------------------------------------------------------------------------
// Session commands
// ---------------------------------------------------------------------------

pub async fn cmd_login(session: Session, token: String) -> Result<()> {
    let token = token.trim().to_owned();
    if token.is_empty() {
        bail!("token must not be empty");
    }
    session.store.set_auth_info(AuthInfo::new(token));
    let handle = session.store.persist_auth_info();
    session.finish(vec![handle]).await?;
    println!("Signed in.");
    Ok(())
}

pub async fn cmd_logout(session: Session) -> Result<()> {
    session.store.set_auth_info(AuthInfo::default());
    let handle = session.store.persist_auth_info();
    session.finish(vec![handle]).await?;
    println!("Signed out.");
    Ok(())
}

pub async fn cmd_status(session: Session, config: &AppConfig) -> Result<()> {
    let state = session.store.snapshot();
    let screens = state.screens();

    println!("medtrack status");
    println!("---------------");
    println!("Database:    {}", config.storage.path.display());
    println!("Write mode:  {}", session.store.write_mode());
    println!("Signed in:   {}", state.info.is_authenticated());
    println!("Screens:     {:?} ({})", screens, screens.routes().join(", "));
    println!("Medications: {}", state.list().len());

    let keys = session.sqlite.keys().await?;
    println!("Stored keys: {}", keys.join(", "));
    if let Some(revision) = session.sqlite.revision(MEDICATIONS_KEY).await? {
        println!("List revision: {revision}");
    }
    if let Some(cache) = &session.cache {
        println!("Cache:       {}", cache.stats());
    }

    session.finish(Vec::new()).await
}

#[cfg(test)]
mod tests {
    use medtrack_select::catalog;

    use super::*;

    fn config_in(dir: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.path = dir.join("nested").join("medtrack.db");
        config
    }

    #[tokio::test]
    async fn open_creates_directory_and_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let session = Session::open(&config).await.unwrap();
        assert!(session.store.snapshot().is_loaded());
        assert_eq!(
            session.sqlite.keys().await.unwrap(),
            vec![MEDICATIONS_KEY.to_owned()]
        );
        session.finish(Vec::new()).await.unwrap();
        assert!(config.storage.path.exists());
    }

    #[tokio::test]
    async fn medication_commands_require_login() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let session = Session::open(&config).await.unwrap();
        let err = cmd_add(session, RecordEdit::default()).await.unwrap_err();
        assert!(err.to_string().contains("not signed in"));
    }

    #[tokio::test]
    async fn login_add_update_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        cmd_login(Session::open(&config).await.unwrap(), "tok".into())
            .await
            .unwrap();

        let edit = RecordEdit {
            medication: Some("Aspirin".into()),
            time: Some("8:00".into()),
            ..RecordEdit::default()
        };
        cmd_add(Session::open(&config).await.unwrap(), edit)
            .await
            .unwrap();

        let session = Session::open(&config).await.unwrap();
        let record = session.store.snapshot().list()[0].clone();
        assert_eq!(record.time.as_deref(), Some("08:00"));
        session.finish(Vec::new()).await.unwrap();

        let edit = RecordEdit {
            color: Some("red".into()),
            ..RecordEdit::default()
        };
        cmd_update(Session::open(&config).await.unwrap(), record.id.clone(), edit)
            .await
            .unwrap();

        let session = Session::open(&config).await.unwrap();
        let updated = session.store.snapshot().find(&record.id).cloned().unwrap();
        assert_eq!(updated.medication.as_deref(), Some("Aspirin"));
        assert_eq!(updated.color_id.as_deref(), Some(catalog::COLOR_PRESETS[2].0));
        session.finish(Vec::new()).await.unwrap();
    }

    #[tokio::test]
    async fn update_unknown_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        cmd_login(Session::open(&config).await.unwrap(), "tok".into())
            .await
            .unwrap();

        let session = Session::open(&config).await.unwrap();
        let err = cmd_update(session, "missing".into(), RecordEdit::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn logout_returns_to_auth_screens() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        cmd_login(Session::open(&config).await.unwrap(), "tok".into())
            .await
            .unwrap();
        cmd_logout(Session::open(&config).await.unwrap())
            .await
            .unwrap();

        let session = Session::open(&config).await.unwrap();
        assert_eq!(session.store.snapshot().screens(), ScreenSet::Auth);
        session.finish(Vec::new()).await.unwrap();
    }

    #[test]
    fn edit_rejects_bad_time() {
        let edit = RecordEdit {
            time: Some("7pm".into()),
            ..RecordEdit::default()
        };
        assert!(edit.apply_to(MedicationRecord::new("1")).is_err());
    }
}
