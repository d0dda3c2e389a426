//! Scan workflow type definitions
//!
//! Supporting types for ROM scan progress tracking.

use serde::{Deserialize, Serialize};

/// Progress snapshot reported after every identification batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgressData {
    /// Rounded percentage (0-100)
    pub percentage: u8,
    /// Filenames identified so far
    pub processed: usize,
    /// Filenames found by the scanner
    pub total: usize,
    /// 1-based index of the batch that just finished (0 before the first)
    pub current_batch: usize,
    pub batch_count: usize,
}

impl ScanProgressData {
    pub fn new(processed: usize, total: usize, current_batch: usize, batch_count: usize) -> Self {
        let percentage = if total == 0 {
            100
        } else {
            ((processed as f64 / total as f64) * 100.0).round().min(100.0) as u8
        };

        Self {
            percentage,
            processed,
            total,
            current_batch,
            batch_count,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// One identified (or heuristically named) ROM
///
/// Transient: lives in a scan session until the user imports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomScanResult {
    pub filename: String,
    pub name: String,
    pub description: String,
    /// Confidence flag from the identification backend; false for fallbacks
    pub success: bool,
}

/// Per-item outcome of a bulk import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedRomInfo {
    pub filename: String,
    pub game_id: String,
}
