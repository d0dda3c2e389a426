//! Data models for the RetroNode library
//!
//! Persisted documents (games, platforms, settings) plus the in-memory
//! scan session state machine.

pub mod game;
pub mod platform;
pub mod scan_session;
pub mod settings;

pub use game::{Game, GameInput, GameView, PlatformSummary, RomLocation};
pub use platform::{Emulator, EmulatorInput, Platform, PlatformInput};
pub use scan_session::{ScanSession, ScanState, StateTransition};
pub use settings::{IdentificationBackend, Settings, SettingsUpdate};
