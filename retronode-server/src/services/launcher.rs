//! Emulator launch
//!
//! Resolves a game to its first platform entry and an emulator on that
//! platform, builds an argument vector and runs it directly (no shell).
//! Emulators with a structured `program` + `args` use those; otherwise the
//! legacy `command` template is split on whitespace before `%ROM%` is
//! substituted, so a ROM path containing spaces stays one argument.

use chrono::Utc;
use retronode_common::events::{EventBus, LibraryEvent};
use serde::Serialize;
use std::process::Command;
use thiserror::Error;

use crate::models::Emulator;
use crate::storage::{JsonStore, StorageError};

const ROM_PLACEHOLDER: &str = "%rom%";

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Game with ID {0} not found")]
    GameNotFound(String),

    #[error("Game has no ROM path configured")]
    NoRomPath,

    #[error("Platform not found: {0}")]
    PlatformNotFound(String),

    #[error("No emulators configured for {0}")]
    NoEmulators(String),

    #[error("Emulator {0} has no launch command configured")]
    EmptyCommand(String),

    /// Process could not be started
    #[error("Failed to launch {command}: {reason}")]
    Spawn { command: String, reason: String },

    /// Process ran and reported failure
    #[error("Emulator exited with code {}", exit_code_text(.exit_code))]
    Exited {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn exit_code_text(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

/// Program and arguments to execute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchPlan {
    /// Human-readable command line; arguments with spaces are quoted
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| {
                if part.contains(char::is_whitespace) {
                    format!("\"{}\"", part)
                } else {
                    part.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of a launch request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOutcome {
    pub game_id: String,
    pub platform_id: String,
    pub emulator_id: String,
    pub command: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// True when the command was only built, not executed
    pub dry_run: bool,
}

/// Replace every `%ROM%` (any case) in `template` with `rom_path`
pub fn substitute_rom(template: &str, rom_path: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `template`
    let lowered = template.to_ascii_lowercase();
    let mut out = String::with_capacity(template.len() + rom_path.len());
    let mut last = 0;
    for (idx, _) in lowered.match_indices(ROM_PLACEHOLDER) {
        out.push_str(&template[last..idx]);
        out.push_str(rom_path);
        last = idx + ROM_PLACEHOLDER.len();
    }
    out.push_str(&template[last..]);
    out
}

/// Build the argument vector for `emulator`
pub fn build_launch_plan(
    emulator_id: &str,
    emulator: &Emulator,
    rom_path: &str,
) -> Result<LaunchPlan, LaunchError> {
    if let Some(program) = emulator.program.as_deref().filter(|p| !p.trim().is_empty()) {
        return Ok(LaunchPlan {
            program: substitute_rom(program.trim(), rom_path),
            args: emulator
                .args
                .iter()
                .map(|arg| substitute_rom(arg, rom_path))
                .collect(),
        });
    }

    let mut tokens = emulator.command.split_whitespace();
    let program = tokens
        .next()
        .ok_or_else(|| LaunchError::EmptyCommand(emulator_id.to_string()))?;

    Ok(LaunchPlan {
        program: substitute_rom(program, rom_path),
        args: tokens.map(|token| substitute_rom(token, rom_path)).collect(),
    })
}

pub struct GameLauncher {
    store: JsonStore,
    event_bus: EventBus,
    dry_run: bool,
}

/// Resolved launch target before execution
struct LaunchTarget {
    platform_id: String,
    emulator_id: String,
    plan: LaunchPlan,
}

impl GameLauncher {
    pub fn new(store: JsonStore, event_bus: EventBus, dry_run: bool) -> Self {
        Self {
            store,
            event_bus,
            dry_run,
        }
    }

    async fn resolve(&self, game_id: &str, emulator_id: Option<&str>) -> Result<LaunchTarget, LaunchError> {
        let games = self.store.games.read().await?;
        let game = games
            .get(game_id)
            .ok_or_else(|| LaunchError::GameNotFound(game_id.to_string()))?;

        let (platform_id, location) = game.primary_platform().ok_or(LaunchError::NoRomPath)?;
        let rom_path = location.path();
        if rom_path.trim().is_empty() {
            return Err(LaunchError::NoRomPath);
        }

        let platforms = self.store.platforms.read().await?;
        let platform = platforms
            .get(platform_id)
            .ok_or_else(|| LaunchError::PlatformNotFound(platform_id.clone()))?;

        let (emulator_id, emulator) = emulator_id
            .and_then(|id| platform.emulators.get_key_value(id))
            .or_else(|| platform.emulators.first())
            .ok_or_else(|| LaunchError::NoEmulators(platform.name.clone()))?;

        let plan = build_launch_plan(emulator_id, emulator, rom_path)?;

        Ok(LaunchTarget {
            platform_id: platform_id.clone(),
            emulator_id: emulator_id.clone(),
            plan,
        })
    }

    /// Launch a game and wait for the emulator to exit
    ///
    /// `emulator_id` selects an emulator on the game's first platform; when
    /// it is absent or unknown the platform's first emulator is used.
    pub async fn launch(
        &self,
        game_id: &str,
        emulator_id: Option<&str>,
    ) -> Result<LaunchOutcome, LaunchError> {
        let target = self.resolve(game_id, emulator_id).await?;
        let command = target.plan.command_line();

        let mut outcome = LaunchOutcome {
            game_id: game_id.to_string(),
            platform_id: target.platform_id,
            emulator_id: target.emulator_id,
            command: command.clone(),
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            dry_run: self.dry_run,
        };

        if self.dry_run {
            tracing::info!(game_id = %game_id, command = %command, "Dry run, emulator not started");
            self.emit(&outcome, true);
            return Ok(outcome);
        }

        tracing::info!(game_id = %game_id, command = %command, "Launching emulator");

        let plan = target.plan;
        let result = tokio::task::spawn_blocking(move || {
            Command::new(&plan.program).args(&plan.args).output()
        })
        .await
        .map_err(|e| LaunchError::Spawn {
            command: command.clone(),
            reason: format!("Task join error: {}", e),
        })?;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(command = %command, error = %e, "Emulator failed to start");
                self.emit(&outcome, false);
                return Err(LaunchError::Spawn {
                    command,
                    reason: e.to_string(),
                });
            }
        };

        outcome.exit_code = output.status.code();
        outcome.stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        outcome.stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            tracing::warn!(command = %command, exit_code = ?outcome.exit_code, "Emulator exited with failure");
            self.emit(&outcome, false);
            return Err(LaunchError::Exited {
                command,
                exit_code: outcome.exit_code,
                stdout: outcome.stdout,
                stderr: outcome.stderr,
            });
        }

        self.emit(&outcome, true);
        Ok(outcome)
    }

    fn emit(&self, outcome: &LaunchOutcome, success: bool) {
        self.event_bus.emit_lossy(LibraryEvent::GameLaunched {
            game_id: outcome.game_id.clone(),
            emulator_id: outcome.emulator_id.clone(),
            success,
            timestamp: Utc::now(),
        });
    }
}
