//! Library services: folder scanning, identification, import and launch

pub mod file_scanner;
pub mod identification;
pub mod launcher;
pub mod rom_importer;
pub mod scan_pipeline;

pub use file_scanner::{FileScanner, ScanError};
pub use identification::{BackendCredentials, IdentificationClient, IdentifyError};
pub use launcher::{GameLauncher, LaunchError, LaunchOutcome, LaunchPlan};
pub use rom_importer::{FailedRom, ImportError, ImportReport, RomImporter};
pub use scan_pipeline::{ScanOrchestrator, ScanSessionRegistry};
