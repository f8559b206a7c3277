use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::api::ApplicationApi;
use super::controller::{ApplicationWizardController, WizardSnapshot};
use crate::config::AutoSaveConfig;

/// Local persistence for in-progress drafts.
pub trait DraftStore: Send + Sync {
    fn load(&self) -> Result<Option<WizardSnapshot>, StoreError>;
    fn save(&self, snapshot: &WizardSnapshot) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("draft storage io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("draft could not be encoded or decoded: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("draft storage unavailable: {0}")]
    Unavailable(String),
}

/// Keeps the snapshot as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self) -> Result<Option<WizardSnapshot>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, snapshot: &WizardSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, encoded)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    slot: Mutex<Option<WizardSnapshot>>,
}

impl MemoryDraftStore {
    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<WizardSnapshot>>, StoreError> {
        self.slot
            .lock()
            .map_err(|_| StoreError::Unavailable("draft mutex poisoned".to_string()))
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self) -> Result<Option<WizardSnapshot>, StoreError> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, snapshot: &WizardSnapshot) -> Result<(), StoreError> {
        *self.slot()? = Some(snapshot.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot()? = None;
        Ok(())
    }
}

/// What a tick of the auto-saver did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { revision: u64 },
    /// Dirty, but the interval since the last save has not elapsed.
    NotDue,
    Clean,
    /// The application was submitted and the stored draft was removed.
    Cleared,
}

/// Samples the controller on a fixed interval and persists its snapshot when dirty.
///
/// The scheduler calling [`AutoSaver::tick`] lives outside this type; the saver only decides
/// whether a save is due.
pub struct AutoSaver<S> {
    store: S,
    interval: Duration,
    last_saved: Option<DateTime<Utc>>,
    cleared: bool,
}

impl<S> AutoSaver<S>
where
    S: DraftStore,
{
    pub fn new(store: S, interval: Duration) -> Self {
        Self {
            store,
            interval,
            last_saved: None,
            cleared: false,
        }
    }

    pub fn from_config(store: S, config: &AutoSaveConfig) -> Self {
        Self::new(store, Duration::seconds(i64::from(config.interval_secs)))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load a previously saved session, if any.
    pub fn restore<A>(&self, api: A) -> Result<Option<ApplicationWizardController<A>>, StoreError>
    where
        A: ApplicationApi,
    {
        Ok(self
            .store
            .load()?
            .map(|snapshot| ApplicationWizardController::resume(api, snapshot)))
    }

    pub fn tick<A>(
        &mut self,
        wizard: &mut ApplicationWizardController<A>,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, StoreError>
    where
        A: ApplicationApi,
    {
        if wizard.is_submitted() {
            return self.clear_after_submit();
        }

        if !wizard.is_dirty() {
            return Ok(SaveOutcome::Clean);
        }

        if let Some(last_saved) = self.last_saved {
            if now - last_saved < self.interval {
                return Ok(SaveOutcome::NotDue);
            }
        }

        self.persist(wizard, now)
    }

    /// Save immediately when dirty, ignoring the interval.
    pub fn flush<A>(
        &mut self,
        wizard: &mut ApplicationWizardController<A>,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, StoreError>
    where
        A: ApplicationApi,
    {
        if wizard.is_submitted() {
            return self.clear_after_submit();
        }
        if !wizard.is_dirty() {
            return Ok(SaveOutcome::Clean);
        }
        self.persist(wizard, now)
    }

    /// Explicit exit: drop the controller's draft and the stored copy.
    pub fn discard<A>(&mut self, wizard: &mut ApplicationWizardController<A>) -> Result<(), StoreError>
    where
        A: ApplicationApi,
    {
        wizard.discard();
        self.last_saved = None;
        self.cleared = false;
        self.store.clear()
    }

    fn clear_after_submit(&mut self) -> Result<SaveOutcome, StoreError> {
        if self.cleared {
            return Ok(SaveOutcome::Clean);
        }
        self.store.clear()?;
        self.cleared = true;
        debug!("stored draft cleared after submission");
        Ok(SaveOutcome::Cleared)
    }

    fn persist<A>(
        &mut self,
        wizard: &mut ApplicationWizardController<A>,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, StoreError>
    where
        A: ApplicationApi,
    {
        let snapshot = wizard.snapshot();
        if let Err(err) = self.store.save(&snapshot) {
            warn!(error = %err, revision = snapshot.revision, "draft auto-save failed");
            return Err(err);
        }

        wizard.mark_saved(snapshot.revision);
        self.last_saved = Some(now);
        debug!(revision = snapshot.revision, "draft auto-saved");
        Ok(SaveOutcome::Saved {
            revision: snapshot.revision,
        })
    }
}
