//! Sync Coordinator.
//!
//! Owns the in-memory notebook and is the only code that mutates it. Loads
//! the document at startup (remote, then public read, then cache, then seed
//! data), routes every edit through the Local Store and the Remote Document
//! Client, resolves write conflicts by merge-and-retry, and polls the remote
//! revision so consumers can pull when somebody else saved.
//!
//! Lock order: `write_gate` before `read_gate`, never the reverse.

mod merge;
mod mutation;
mod poller;

pub use merge::merge_documents;
pub use mutation::Mutation;
pub use poller::Poller;

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex, RwLock};

use crate::config::Config;
use crate::errors::SyncError;
use crate::geocode::NominatimGeocoder;
use crate::local_store::{LocalStore, StoredCredentials};
use crate::models::{
    Document, Entry, EntryDraft, EntryId, ListKind, NotebookInfo, NotebookStats, Ratings,
    RevisionToken,
};
use crate::remote::RemoteDocumentClient;

/// Capacity of the event channel; slow subscribers lag rather than block.
const EVENT_CAPACITY: usize = 64;

/// Coordinator settings.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Interval between remote revision checks. Zero disables polling.
    pub poll_interval: Duration,
    /// Identity written to `metadata.updatedBy`.
    pub editor: Option<String>,
    /// Title block written to `config` on every save. Without it the
    /// document keeps whatever block it already has.
    pub notebook: Option<NotebookInfo>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            editor: None,
            notebook: None,
        }
    }
}

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Uninitialized,
    /// No usable credential: edits are rejected, reads go through the public path.
    ReadOnly,
    Authorized,
}

/// Where the current document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Authenticated read of the remote store
    Remote,
    /// Anonymous read of the remote store
    Public,
    /// Local cache, after a failed remote read
    Cache,
    /// Built-in seed data
    Defaults,
    /// A local edit that was saved remotely
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Notifications for presentation code.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    StateChanged(SyncState),
    DocumentChanged { source: DataSource },
    /// A poll found a newer remote revision; call [`SyncCoordinator::refresh`] to pull it.
    RemoteChanged(RevisionToken),
    Saved(RevisionToken),
    Notice { level: NoticeLevel, message: String },
}

/// Result of one poll tick.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Not authorized, or a read or write was already in flight
    Skipped,
    Unchanged,
    Changed(RevisionToken),
    Failed,
}

struct Shared {
    remote: RemoteDocumentClient,
    store: LocalStore,
    options: SyncOptions,
    geocoder: Option<NominatimGeocoder>,
    state: RwLock<SyncState>,
    document: RwLock<Document>,
    revision: RwLock<Option<RevisionToken>>,
    remote_changed: AtomicBool,
    write_gate: Mutex<()>,
    read_gate: Mutex<()>,
    last_id: AtomicI64,
    events: broadcast::Sender<SyncEvent>,
}

/// Owns the notebook and its synchronization. Dropping it stops polling.
pub struct SyncCoordinator {
    shared: Arc<Shared>,
    poller: Mutex<Option<Poller>>,
}

impl SyncCoordinator {
    pub fn new(
        remote: RemoteDocumentClient,
        store: LocalStore,
        options: SyncOptions,
        geocoder: Option<NominatimGeocoder>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            shared: Arc::new(Shared {
                remote,
                store,
                options,
                geocoder,
                state: RwLock::new(SyncState::Uninitialized),
                document: RwLock::new(Document::empty()),
                revision: RwLock::new(None),
                remote_changed: AtomicBool::new(false),
                write_gate: Mutex::new(()),
                read_gate: Mutex::new(()),
                last_id: AtomicI64::new(0),
                events,
            }),
            poller: Mutex::new(None),
        }
    }

    /// Build a coordinator from environment configuration. The credential
    /// from the environment is installed; `start` may replace it with the
    /// one saved in the Local Store.
    pub async fn from_config(config: &Config) -> Result<Self, SyncError> {
        let store = LocalStore::open(&config.cache_path, config.cache_max_pages).await?;
        let remote = RemoteDocumentClient::new(config.remote())?;
        if let Some(token) = &config.token {
            remote.set_token(token.clone()).await;
        }
        let geocoder = config
            .geocoder_url
            .as_deref()
            .map(NominatimGeocoder::new)
            .transpose()?;

        Ok(Self::new(remote, store, config.sync_options(), geocoder))
    }

    // ==================== LIFECYCLE ====================

    /// Resolve credentials, pick the operating mode and load the document.
    pub async fn start(&self) -> SyncState {
        let shared = &self.shared;

        let stored = shared.store.load_credentials().await;
        if let (Some(owner), Some(repo)) = (stored.owner, stored.repo) {
            shared.remote.retarget(owner, repo).await;
        }
        if let Some(token) = stored.token {
            shared.remote.set_token(token).await;
        }

        if shared.remote.test_reachability().await {
            self.enter_authorized().await;
        } else {
            tracing::info!("Remote store not writable; starting read-only");
            shared.set_state(SyncState::ReadOnly).await;
            shared.load_public().await;
        }

        shared.state().await
    }

    async fn enter_authorized(&self) {
        let shared = &self.shared;
        shared.set_state(SyncState::Authorized).await;
        shared.load_authorized().await;

        if shared.state().await != SyncState::Authorized {
            shared.load_public().await;
            return;
        }

        if let Err(e) = self.sync_pending().await {
            tracing::warn!("Pending edits not synced yet: {}", e);
        }
        self.start_polling().await;
    }

    /// Validate and persist a credential, then switch to authorized mode.
    pub async fn authorize(&self, credentials: StoredCredentials) -> Result<(), SyncError> {
        let shared = &self.shared;
        let token = credentials
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SyncError::Validation("a token is required".to_string()))?;

        if let (Some(owner), Some(repo)) = (&credentials.owner, &credentials.repo) {
            shared.remote.retarget(owner.clone(), repo.clone()).await;
        }
        shared.remote.set_token(token).await;

        if !shared.remote.test_reachability().await {
            shared.remote.clear_token().await;
            return Err(SyncError::Auth(
                "Repository not reachable with this credential".to_string(),
            ));
        }

        if let Err(e) = shared.store.save_credentials(&credentials).await {
            shared.notice(NoticeLevel::Warning, format!("Credential not saved: {}", e));
        }
        tracing::info!("Credential accepted; switching to authorized mode");
        self.enter_authorized().await;
        Ok(())
    }

    /// Forget the credential and fall back to read-only mode.
    pub async fn logout(&self) {
        self.stop_polling().await;
        self.shared.revoke("Logged out").await;
    }

    /// Stop background polling.
    pub async fn shutdown(&self) {
        self.stop_polling().await;
    }

    async fn start_polling(&self) {
        let mut poller = self.poller.lock().await;
        if let Some(previous) = poller.take() {
            previous.stop();
        }

        let period = self.shared.options.poll_interval;
        if period.is_zero() {
            return;
        }

        let shared = Arc::clone(&self.shared);
        *poller = Some(Poller::spawn(period, move || {
            let shared = Arc::clone(&shared);
            async move {
                shared.poll().await;
                // A revoked credential ends polling until the next authorize.
                shared.state().await == SyncState::Authorized
            }
        }));
        tracing::debug!("Polling remote revision every {:?}", period);
    }

    async fn stop_polling(&self) {
        if let Some(poller) = self.poller.lock().await.take() {
            poller.stop();
        }
    }

    pub async fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .await
            .as_ref()
            .is_some_and(Poller::is_running)
    }

    // ==================== READ SURFACE ====================

    /// Copy of the current document.
    pub async fn snapshot(&self) -> Document {
        self.shared.document.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.shared.events.subscribe()
    }

    pub async fn state(&self) -> SyncState {
        self.shared.state().await
    }

    pub async fn revision(&self) -> Option<RevisionToken> {
        self.shared.revision.read().await.clone()
    }

    /// Whether a poll saw a remote revision newer than the loaded one.
    pub fn remote_changed(&self) -> bool {
        self.shared.remote_changed.load(Ordering::SeqCst)
    }

    pub async fn stats(&self) -> NotebookStats {
        self.shared.document.read().await.stats()
    }

    pub fn store(&self) -> &LocalStore {
        &self.shared.store
    }

    pub fn remote(&self) -> &RemoteDocumentClient {
        &self.shared.remote
    }

    /// Check the remote revision now. Used by the poller on every tick.
    pub async fn poll_now(&self) -> PollOutcome {
        self.shared.poll().await
    }

    // ==================== MUTATIONS ====================

    /// Add a restaurant to `kind`. The identifier and dates are assigned here;
    /// missing coordinates are geocoded from the address when possible.
    pub async fn add_entry(&self, kind: ListKind, mut draft: EntryDraft) -> Result<Entry, SyncError> {
        self.shared.ensure_writable().await?;

        if draft.coordinates.is_none() {
            if let (Some(geocoder), Some(address)) = (
                &self.shared.geocoder,
                draft.address.as_deref().filter(|a| !a.trim().is_empty()),
            ) {
                draft.coordinates = Some(geocoder.resolve(address).await);
            }
        }

        let id = self.shared.next_id().await;
        let entry = draft.into_entry(id.clone(), kind, &today());
        let saved = self
            .shared
            .commit(Mutation::Add {
                kind,
                entry: entry.clone(),
            })
            .await?;

        Ok(saved.find(&id).map(|(_, e)| e.clone()).unwrap_or(entry))
    }

    /// Replace the entry with the same identifier in `kind`.
    pub async fn update_entry(&self, kind: ListKind, entry: Entry) -> Result<Entry, SyncError> {
        self.shared.ensure_writable().await?;
        let id = entry.id.clone();
        let saved = self
            .shared
            .commit(Mutation::Update {
                kind,
                entry: entry.clone(),
            })
            .await?;

        Ok(saved.find(&id).map(|(_, e)| e.clone()).unwrap_or(entry))
    }

    pub async fn delete_entry(&self, kind: ListKind, id: &EntryId) -> Result<(), SyncError> {
        self.shared.ensure_writable().await?;
        self.shared
            .commit(Mutation::Delete {
                kind,
                id: id.clone(),
            })
            .await?;
        Ok(())
    }

    /// Rate a wishlist entry and move it to the tested list. Without a new
    /// comment the entry keeps its old one.
    pub async fn move_to_tested(
        &self,
        id: &EntryId,
        ratings: Ratings,
        comment: Option<String>,
    ) -> Result<Entry, SyncError> {
        self.shared.ensure_writable().await?;
        let saved = self
            .shared
            .commit(Mutation::MoveToTested {
                id: id.clone(),
                ratings,
                comment,
                visited_on: today(),
            })
            .await?;

        saved
            .find(id)
            .map(|(_, e)| e.clone())
            .ok_or_else(|| SyncError::Validation(format!("entry {} vanished while saving", id)))
    }

    // ==================== EXPLICIT SYNC ====================

    /// Pull the remote document, replacing the in-memory copy.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        let shared = &self.shared;
        match shared.state().await {
            SyncState::Authorized => {
                let _write = shared.write_gate.lock().await;
                let fetched = {
                    let _read = shared.read_gate.lock().await;
                    shared.remote.fetch_document().await
                };
                match fetched {
                    Ok((document, revision)) => {
                        shared
                            .accept_remote(document, Some(revision), DataSource::Remote)
                            .await;
                        Ok(())
                    }
                    Err(e) => Err(shared.fail(e, "Refresh failed").await),
                }
            }
            SyncState::ReadOnly | SyncState::Uninitialized => {
                let fetched = {
                    let _read = shared.read_gate.lock().await;
                    shared.remote.fetch_public().await
                };
                match fetched {
                    Ok(document) => {
                        shared.accept_remote(document, None, DataSource::Public).await;
                        Ok(())
                    }
                    Err(e) => Err(shared.fail(e, "Refresh failed").await),
                }
            }
        }
    }

    /// Manual sync button: reload in read-only mode, otherwise push pending
    /// edits or the current document.
    pub async fn manual_sync(&self) -> Result<(), SyncError> {
        if self.shared.state().await != SyncState::Authorized {
            return self.refresh().await;
        }
        if self.sync_pending().await? {
            return Ok(());
        }

        let shared = &self.shared;
        let _write = shared.write_gate.lock().await;
        let mut candidate = shared.document.read().await.clone();
        shared.stamp(&mut candidate);
        let base = shared.revision.read().await.clone();
        shared.save(candidate, base, None).await?;
        Ok(())
    }

    /// Write a recorded unsynced version, merged with the remote copy.
    /// Returns `false` when nothing was pending.
    pub async fn sync_pending(&self) -> Result<bool, SyncError> {
        let shared = &self.shared;
        shared.ensure_writable().await?;

        let _write = shared.write_gate.lock().await;
        let Some(pending) = shared.store.read_pending().await else {
            return Ok(false);
        };
        tracing::info!("Replaying edits recorded at {}", pending.recorded_at);

        let fetched = {
            let _read = shared.read_gate.lock().await;
            shared.remote.fetch_document().await
        };
        let (candidate, base) = match fetched {
            Ok((remote, revision)) => (merge_documents(&pending.document, &remote), Some(revision)),
            Err(SyncError::NotFound(_)) => (pending.document, None),
            Err(e) => return Err(shared.fail(e, "Sync failed").await),
        };

        let mut candidate = candidate;
        shared.stamp(&mut candidate);
        shared.save(candidate, base, None).await?;
        Ok(true)
    }
}

impl Shared {
    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        self.emit(SyncEvent::Notice {
            level,
            message: message.into(),
        });
    }

    async fn state(&self) -> SyncState {
        *self.state.read().await
    }

    async fn set_state(&self, state: SyncState) {
        let mut current = self.state.write().await;
        if *current != state {
            tracing::info!("Sync state {:?} -> {:?}", *current, state);
            *current = state;
            drop(current);
            self.emit(SyncEvent::StateChanged(state));
        }
    }

    /// Refresh metadata and the title block before a save.
    fn stamp(&self, document: &mut Document) {
        document.touch(self.options.editor.as_deref());
        if let Some(notebook) = &self.options.notebook {
            document.config = Some(notebook.clone());
        }
    }

    async fn ensure_writable(&self) -> Result<(), SyncError> {
        match self.state().await {
            SyncState::Authorized => Ok(()),
            _ => Err(SyncError::Auth(
                "Notebook is read-only; configure a credential to edit".to_string(),
            )),
        }
    }

    /// Millisecond timestamp, bumped past every identifier already in use.
    /// Once the numeric range is exhausted a random text identifier is used.
    async fn next_id(&self) -> EntryId {
        let highest = {
            let document = self.document.read().await;
            document
                .tested
                .iter()
                .chain(document.wishlist.iter())
                .filter_map(|e| match e.id {
                    EntryId::Number(n) => Some(n),
                    EntryId::Text(_) => None,
                })
                .max()
                .unwrap_or(0)
        };

        let Some(floor) = highest
            .checked_add(1)
            .map(|next| next.max(Utc::now().timestamp_millis()))
        else {
            return text_id();
        };

        match self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                last.checked_add(1).map(|next| floor.max(next))
            }) {
            // The closure accepted `previous`, so `previous + 1` fits.
            Ok(previous) => EntryId::Number(floor.max(previous + 1)),
            Err(_) => text_id(),
        }
    }

    // ==================== LOADING ====================

    async fn load_authorized(&self) {
        let fetched = {
            let _read = self.read_gate.lock().await;
            self.remote.fetch_document().await
        };

        match fetched {
            Ok((document, revision)) => {
                tracing::info!(
                    "Loaded notebook from remote store ({} entries)",
                    document.total_entries()
                );
                self.accept_remote(document, Some(revision), DataSource::Remote)
                    .await;
            }
            Err(SyncError::NotFound(_)) => self.create_remote().await,
            Err(e) => {
                let e = self.fail(e, "Remote load failed").await;
                if !e.is_auth() {
                    self.load_fallback().await;
                }
            }
        }
    }

    /// The file does not exist yet: write the cached copy, or an empty notebook.
    async fn create_remote(&self) {
        let _write = self.write_gate.lock().await;
        let mut document = self.store.read_cache().await.unwrap_or_else(Document::empty);
        self.stamp(&mut document);

        tracing::info!("Remote notebook missing; creating it");
        match self.remote.write_document(&document, None).await {
            Ok(revision) => self.accept_saved(document, revision).await,
            Err(e) => {
                let e = self.fail(e, "Could not create the remote notebook").await;
                if !e.is_auth() {
                    self.load_fallback().await;
                }
            }
        }
    }

    async fn load_public(&self) {
        let fetched = {
            let _read = self.read_gate.lock().await;
            self.remote.fetch_public().await
        };

        match fetched {
            Ok(document) => {
                tracing::info!(
                    "Loaded notebook through the public path ({} entries)",
                    document.total_entries()
                );
                self.accept_remote(document, None, DataSource::Public).await;
            }
            Err(e) => {
                tracing::warn!("Public read failed: {}", e);
                self.load_fallback().await;
            }
        }
    }

    async fn load_fallback(&self) {
        let (document, source) = match self.store.read_cache().await {
            Some(document) => (document, DataSource::Cache),
            None => (Document::seed(), DataSource::Defaults),
        };
        tracing::info!("Using {:?} copy of the notebook", source);
        self.notice(
            NoticeLevel::Warning,
            match source {
                DataSource::Cache => "Offline: showing the last saved copy",
                _ => "Offline: showing sample data",
            },
        );
        *self.document.write().await = document;
        self.emit(SyncEvent::DocumentChanged { source });
    }

    async fn accept_remote(
        &self,
        document: Document,
        revision: Option<RevisionToken>,
        source: DataSource,
    ) {
        if let Err(e) = self.store.write_cache(&document).await {
            self.notice(NoticeLevel::Warning, format!("Local cache not updated: {}", e));
        }
        *self.document.write().await = document;
        *self.revision.write().await = revision;
        self.remote_changed.store(false, Ordering::SeqCst);
        self.emit(SyncEvent::DocumentChanged { source });
    }

    async fn accept_saved(&self, document: Document, revision: RevisionToken) {
        if let Err(e) = self.store.write_cache(&document).await {
            self.notice(NoticeLevel::Warning, format!("Local cache not updated: {}", e));
        }
        if let Err(e) = self.store.clear_pending().await {
            tracing::warn!("Failed to clear pending edit: {}", e);
        }
        *self.document.write().await = document;
        *self.revision.write().await = Some(revision.clone());
        self.remote_changed.store(false, Ordering::SeqCst);
        self.emit(SyncEvent::Saved(revision));
        self.emit(SyncEvent::DocumentChanged {
            source: DataSource::Local,
        });
    }

    // ==================== SAVING ====================

    /// Apply a mutation to the current document and save it.
    async fn commit(&self, mutation: Mutation) -> Result<Document, SyncError> {
        // Queue behind any in-flight write.
        let _write = self.write_gate.lock().await;
        self.ensure_writable().await?;

        // Unsynced edits from earlier failed saves stay underneath this one.
        let mut candidate = match self.store.read_pending().await {
            Some(pending) => {
                tracing::debug!("Building on edits pending since {}", pending.recorded_at);
                pending.document
            }
            None => self.document.read().await.clone(),
        };
        mutation.apply(&mut candidate)?;
        self.stamp(&mut candidate);

        let base = self.revision.read().await.clone();
        self.save(candidate, base, Some(&mutation)).await
    }

    /// Write `candidate` derived from `base`. On a stale base, merge with the
    /// remote copy, replay `mutation` and retry once. Caller holds `write_gate`.
    async fn save(
        &self,
        candidate: Document,
        base: Option<RevisionToken>,
        mutation: Option<&Mutation>,
    ) -> Result<Document, SyncError> {
        if let Err(e) = self.store.mark_pending(&candidate).await {
            self.notice(NoticeLevel::Warning, format!("Edit not recorded locally: {}", e));
        }

        let conflict = match self.remote.write_document(&candidate, base.as_ref()).await {
            Ok(revision) => {
                self.accept_saved(candidate.clone(), revision).await;
                return Ok(candidate);
            }
            Err(SyncError::Conflict(message)) => message,
            Err(e) => return Err(self.fail(e, "Save failed").await),
        };

        tracing::warn!("Save conflicted ({}); merging with remote copy", conflict);
        let fetched = {
            let _read = self.read_gate.lock().await;
            self.remote.fetch_document().await
        };
        let (remote, revision) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => return Err(self.fail(e, "Save failed").await),
        };

        let mut merged = merge_documents(&candidate, &remote);
        if let Some(mutation) = mutation {
            mutation.replay(&mut merged);
        }
        self.stamp(&mut merged);
        if let Err(e) = self.store.mark_pending(&merged).await {
            tracing::warn!("Merged edit not recorded locally: {}", e);
        }

        match self.remote.write_document(&merged, Some(&revision)).await {
            Ok(revision) => {
                tracing::info!("Saved after merging with remote changes");
                self.accept_saved(merged.clone(), revision).await;
                Ok(merged)
            }
            Err(SyncError::Conflict(message)) => {
                let e = SyncError::UnresolvedConflict(format!(
                    "The notebook changed again while saving: {}",
                    message
                ));
                Err(self.fail(e, "Save failed").await)
            }
            Err(e) => Err(self.fail(e, "Save failed").await),
        }
    }

    /// Report an error at the coordinator boundary. Auth errors revoke the
    /// credential.
    async fn fail(&self, error: SyncError, context: &str) -> SyncError {
        tracing::warn!("{}: {}", context, error);
        if error.is_auth() {
            self.revoke("Credential rejected by the remote store").await;
        }
        self.notice(NoticeLevel::Error, format!("{}: {}", context, error.message()));
        error
    }

    async fn revoke(&self, reason: &str) {
        tracing::info!("Dropping credential: {}", reason);
        self.remote.clear_token().await;
        if let Err(e) = self.store.clear_token().await {
            tracing::warn!("Failed to clear stored credential: {}", e);
        }
        *self.revision.write().await = None;
        self.set_state(SyncState::ReadOnly).await;
    }

    // ==================== POLLING ====================

    async fn poll(&self) -> PollOutcome {
        if self.state().await != SyncState::Authorized {
            return PollOutcome::Skipped;
        }
        let Ok(_write) = self.write_gate.try_lock() else {
            tracing::debug!("Skipping poll: write in flight");
            return PollOutcome::Skipped;
        };
        let Ok(_read) = self.read_gate.try_lock() else {
            tracing::debug!("Skipping poll: read in flight");
            return PollOutcome::Skipped;
        };

        match self.remote.fetch_revision().await {
            Ok(revision) => {
                if self.revision.read().await.as_ref() == Some(&revision) {
                    return PollOutcome::Unchanged;
                }
                if !self.remote_changed.swap(true, Ordering::SeqCst) {
                    tracing::info!("Remote notebook changed (revision {})", revision);
                    self.emit(SyncEvent::RemoteChanged(revision.clone()));
                }
                PollOutcome::Changed(revision)
            }
            Err(e) => {
                tracing::warn!("Poll failed: {}", e);
                if e.is_auth() {
                    self.revoke("Credential rejected during poll").await;
                }
                PollOutcome::Failed
            }
        }
    }
}

fn text_id() -> EntryId {
    let id = uuid::Uuid::new_v4().simple().to_string();
    tracing::warn!("Numeric identifiers exhausted; assigning {}", id);
    EntryId::Text(id)
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
