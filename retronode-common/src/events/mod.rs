//! Event types for the RetroNode event system
//!
//! Provides the shared event definitions and the EventBus used to stream
//! scan progress to connected browsers.

mod scan_types;

pub use scan_types::{ImportedRomInfo, RomScanResult, ScanProgressData};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// RetroNode event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LibraryEvent {
    /// A scan session was accepted and the folder listing is starting
    ScanSessionStarted {
        session_id: Uuid,
        folder_path: String,
        platform_name: String,
        timestamp: DateTime<Utc>,
    },

    /// One identification batch finished
    ///
    /// `roms` holds only the results of that batch, in filename order.
    ScanProgress {
        session_id: Uuid,
        progress: ScanProgressData,
        roms: Vec<RomScanResult>,
        timestamp: DateTime<Utc>,
    },

    /// Every batch was processed
    ScanSessionCompleted {
        session_id: Uuid,
        roms_found: usize,
        /// Results the backend marked as confidently identified
        identified: usize,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The folder could not be scanned; no results survive
    ScanSessionFailed {
        session_id: Uuid,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// Scan results were committed as games
    RomsImported {
        platform_id: String,
        imported: Vec<ImportedRomInfo>,
        failed: usize,
        timestamp: DateTime<Utc>,
    },

    /// An emulator process was started (or would have been, in dry-run mode)
    GameLaunched {
        game_id: String,
        emulator_id: String,
        success: bool,
        timestamp: DateTime<Utc>,
    },
}

impl LibraryEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &str {
        match self {
            LibraryEvent::ScanSessionStarted { .. } => "ScanSessionStarted",
            LibraryEvent::ScanProgress { .. } => "ScanProgress",
            LibraryEvent::ScanSessionCompleted { .. } => "ScanSessionCompleted",
            LibraryEvent::ScanSessionFailed { .. } => "ScanSessionFailed",
            LibraryEvent::RomsImported { .. } => "RomsImported",
            LibraryEvent::GameLaunched { .. } => "GameLaunched",
        }
    }

    /// True for events describing a scan session
    pub fn is_scan_event(&self) -> bool {
        matches!(
            self,
            LibraryEvent::ScanSessionStarted { .. }
                | LibraryEvent::ScanProgress { .. }
                | LibraryEvent::ScanSessionCompleted { .. }
                | LibraryEvent::ScanSessionFailed { .. }
        )
    }
}

/// Broadcast bus for LibraryEvents
///
/// Cloning shares the underlying channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LibraryEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before lagging receivers drop old events
    ///
    /// # Examples
    ///
    /// ```
    /// use retronode_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<LibraryEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: LibraryEvent,
    ) -> Result<usize, broadcast::error::SendError<LibraryEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Progress events are fine to lose when no browser is connected.
    pub fn emit_lossy(&self, event: LibraryEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
