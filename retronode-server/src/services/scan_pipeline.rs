//! Batch scan-and-identify orchestrator
//!
//! # State Progression
//! IDLE → SCANNING → (IDENTIFYING → MERGING)* → COMPLETED | FAILED
//!
//! The folder is listed once, the filenames are cut into fixed-size batches
//! and each batch is identified strictly after the previous one. A batch
//! whose identification fails degrades to fallback names and the run goes
//! on; only a failed folder listing fails the session. Every step is
//! mirrored into the session registry and broadcast on the event bus.

use chrono::Utc;
use retronode_common::events::{EventBus, LibraryEvent, RomScanResult, ScanProgressData};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{ScanSession, ScanState, StateTransition};
use crate::services::file_scanner::{is_valid_path_format, FileScanner, ScanError};
use crate::services::identification::{fallback_batch, IdentificationClient, IdentifyError};

/// Terminal sessions kept for polling before the oldest are dropped
pub const MAX_RETAINED_SESSIONS: usize = 64;

/// In-memory registry of scan sessions
#[derive(Clone, Default)]
pub struct ScanSessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, ScanSession>>>,
}

impl ScanSessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session_id: Uuid) -> Option<ScanSession> {
        self.sessions.read().await.get(&session_id).cloned()
    }

    /// Store a snapshot, pruning the oldest finished sessions when full
    pub async fn save(&self, session: &ScanSession) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.session_id, session.clone());

        if sessions.len() > MAX_RETAINED_SESSIONS {
            let mut finished: Vec<(Uuid, chrono::DateTime<Utc>)> = sessions
                .values()
                .filter(|s| s.is_terminal())
                .map(|s| (s.session_id, s.ended_at.unwrap_or(s.started_at)))
                .collect();
            finished.sort_by_key(|(_, ended)| *ended);

            let excess = sessions.len() - MAX_RETAINED_SESSIONS;
            for (id, _) in finished.into_iter().take(excess) {
                sessions.remove(&id);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Scan-and-identify orchestrator
pub struct ScanOrchestrator {
    scanner: FileScanner,
    batch_size: usize,
    sessions: ScanSessionRegistry,
    event_bus: EventBus,
}

impl ScanOrchestrator {
    /// `batch_size` below 1 is treated as 1
    pub fn new(
        scanner: FileScanner,
        batch_size: usize,
        sessions: ScanSessionRegistry,
        event_bus: EventBus,
    ) -> Self {
        Self {
            scanner,
            batch_size: batch_size.max(1),
            sessions,
            event_bus,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run a session to completion
    ///
    /// `client` is the backend for this run, or the reason none could be
    /// built; in the latter case every batch uses fallback names.
    /// Returns the terminal session snapshot.
    pub async fn execute(
        &self,
        mut session: ScanSession,
        client: Result<IdentificationClient, IdentifyError>,
    ) -> ScanSession {
        let session_id = session.session_id;

        self.event_bus.emit_lossy(LibraryEvent::ScanSessionStarted {
            session_id,
            folder_path: session.folder_path.clone(),
            platform_name: session.platform_name.clone(),
            timestamp: Utc::now(),
        });

        let files = match self.phase_scanning(&mut session).await {
            Ok(files) => files,
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(session_id = %session_id, error = %message, "Scan session failed");
                log_transition(&session.fail(message.clone()));
                self.sessions.save(&session).await;
                self.event_bus.emit_lossy(LibraryEvent::ScanSessionFailed {
                    session_id,
                    error: message,
                    timestamp: Utc::now(),
                });
                return session;
            }
        };

        if let Err(e) = &client {
            tracing::warn!(
                session_id = %session_id,
                error = %e,
                "Identification backend unavailable, every batch will use fallback names"
            );
        }

        self.phase_identifying(&mut session, &files, client.as_ref().ok())
            .await;

        log_transition(&session.transition_to(ScanState::Completed));
        self.sessions.save(&session).await;

        let identified = session.results.iter().filter(|r| r.success).count();
        tracing::info!(
            session_id = %session_id,
            roms_found = files.len(),
            identified,
            duration_ms = session.duration_ms(),
            "Scan session completed"
        );
        self.event_bus.emit_lossy(LibraryEvent::ScanSessionCompleted {
            session_id,
            roms_found: files.len(),
            identified,
            duration_ms: session.duration_ms(),
            timestamp: Utc::now(),
        });

        session
    }

    /// SCANNING: validate the path shape, then list the folder
    async fn phase_scanning(&self, session: &mut ScanSession) -> Result<Vec<String>, ScanError> {
        if !is_valid_path_format(&session.folder_path) {
            return Err(ScanError::InvalidPath(session.folder_path.clone()));
        }

        log_transition(&session.transition_to(ScanState::Scanning));
        self.sessions.save(session).await;
        tracing::info!(
            session_id = %session.session_id,
            folder = %session.folder_path,
            "Phase SCANNING"
        );

        let scanner = self.scanner.clone();
        let folder = session.folder_path.clone();
        let extensions = session.extensions.clone();
        let files = tokio::task::spawn_blocking(move || scanner.scan(&folder, &extensions))
            .await
            .map_err(|e| {
                ScanError::Io(session.folder_path.clone().into(), format!("Scan task failed: {}", e))
            })??;

        tracing::info!(session_id = %session.session_id, files = files.len(), "Folder listed");
        Ok(files)
    }

    /// IDENTIFYING / MERGING, one batch at a time
    async fn phase_identifying(
        &self,
        session: &mut ScanSession,
        files: &[String],
        client: Option<&IdentificationClient>,
    ) {
        let total = files.len();
        let batch_count = total.div_ceil(self.batch_size);

        if total == 0 {
            session.progress = ScanProgressData::new(0, 0, 0, 0);
            return;
        }

        for (index, batch) in files.chunks(self.batch_size).enumerate() {
            let current_batch = index + 1;

            log_transition(&session.transition_to(ScanState::Identifying));
            self.sessions.save(session).await;

            let results: Vec<RomScanResult> = match client {
                Some(client) => client.identify(&session.platform_name, batch).await,
                None => fallback_batch(&session.platform_name, batch),
            };

            log_transition(&session.transition_to(ScanState::Merging));
            session.merge_batch(&results, total, current_batch, batch_count);
            self.sessions.save(session).await;

            tracing::debug!(
                session_id = %session.session_id,
                current_batch,
                batch_count,
                processed = session.progress.processed,
                "Batch merged"
            );

            self.event_bus.emit_lossy(LibraryEvent::ScanProgress {
                session_id: session.session_id,
                progress: session.progress.clone(),
                roms: results,
                timestamp: Utc::now(),
            });
        }
    }
}

fn log_transition(transition: &StateTransition) {
    tracing::debug!(
        session_id = %transition.session_id,
        from = ?transition.old_state,
        to = ?transition.new_state,
        at = %transition.transitioned_at,
        "Scan session state transition"
    );
}
