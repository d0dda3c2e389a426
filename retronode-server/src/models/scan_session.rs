//! Scan session state machine
//!
//! A session walks IDLE → SCANNING → (IDENTIFYING → MERGING)* → COMPLETED,
//! or ends in FAILED when the folder cannot be listed.

use chrono::{DateTime, Utc};
use retronode_common::events::{RomScanResult, ScanProgressData};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::IdentificationBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanState {
    /// Accepted, not yet started
    Idle,
    /// Listing the folder
    Scanning,
    /// Waiting on the identification backend for one batch
    Identifying,
    /// Appending a batch's results
    Merging,
    Completed,
    Failed,
}

/// State transition record, logged by the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: ScanState,
    pub new_state: ScanState,
    pub transitioned_at: DateTime<Utc>,
}

/// One orchestrated scan, held in memory only
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSession {
    pub session_id: Uuid,
    pub state: ScanState,
    pub folder_path: String,
    pub platform_name: String,
    pub extensions: Vec<String>,
    pub backend: IdentificationBackend,
    pub progress: ScanProgressData,
    /// Cumulative results in filename order
    pub results: Vec<RomScanResult>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ScanSession {
    pub fn new(
        folder_path: String,
        platform_name: String,
        extensions: Vec<String>,
        backend: IdentificationBackend,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: ScanState::Idle,
            folder_path,
            platform_name,
            extensions,
            backend,
            progress: ScanProgressData::default(),
            results: Vec::new(),
            error: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn transition_to(&mut self, new_state: ScanState) -> StateTransition {
        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        if matches!(new_state, ScanState::Completed | ScanState::Failed) {
            self.ended_at = Some(Utc::now());
        }

        transition
    }

    /// Append one batch of results and refresh progress
    pub fn merge_batch(
        &mut self,
        batch: &[RomScanResult],
        total: usize,
        current_batch: usize,
        batch_count: usize,
    ) {
        self.results.extend_from_slice(batch);
        self.progress =
            ScanProgressData::new(self.results.len(), total, current_batch, batch_count);
    }

    /// Mark the session failed; earlier partial results are discarded
    pub fn fail(&mut self, message: String) -> StateTransition {
        self.results.clear();
        self.error = Some(message);
        self.transition_to(ScanState::Failed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ScanState::Completed | ScanState::Failed)
    }

    pub fn duration_ms(&self) -> u64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds().max(0) as u64
    }
}
