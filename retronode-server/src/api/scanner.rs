//! Folder scan, identification and import endpoints
//!
//! POST /scan-folder, POST /identify-roms, POST /import-roms

use axum::{extract::State, routing::post, Json, Router};
use retronode_common::events::{ImportedRomInfo, RomScanResult};
use serde::{Deserialize, Serialize};

use crate::models::IdentificationBackend;
use crate::services::{FailedRom, IdentificationClient, IdentifyError, RomImporter};
use crate::{storage, ApiError, ApiResult, AppState};

use super::ApiJson;

/// POST /scan-folder request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanFolderRequest {
    #[serde(default)]
    pub folder_path: String,
    #[serde(default)]
    pub extensions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanFolderResponse {
    pub success: bool,
    pub files: Vec<String>,
}

/// POST /identify-roms request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyRequest {
    #[serde(default)]
    pub platform_name: String,
    #[serde(default)]
    pub rom_names: Vec<String>,
    /// Backend override; the stored setting is used when absent
    pub model: Option<IdentificationBackend>,
}

#[derive(Debug, Serialize)]
pub struct IdentifyResponse {
    pub success: bool,
    pub data: Vec<RomScanResult>,
}

/// POST /import-roms request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    #[serde(default)]
    pub platform_id: String,
    #[serde(default)]
    pub roms: Vec<RomScanResult>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub imported: Vec<ImportedRomInfo>,
    pub failed: Vec<FailedRom>,
}

/// Build the identification client for `model`, or the stored default
///
/// The outer error is a storage failure while reading settings; the inner
/// one is a backend that cannot be used (missing credential).
pub(crate) async fn identification_client(
    state: &AppState,
    model: Option<IdentificationBackend>,
) -> Result<(IdentificationBackend, Result<IdentificationClient, IdentifyError>), ApiError> {
    let backend = match model {
        Some(backend) => backend,
        None => {
            storage::settings::get_settings(&state.store)
                .await?
                .identification_backend
        }
    };
    let credentials = crate::config::resolve_credentials(&state.store, &state.config).await?;
    let client = IdentificationClient::new(backend, &credentials, &state.config.identification);
    Ok((backend, client))
}

/// POST /scan-folder
///
/// Lists the files in one folder below the ROM base path. Folders outside
/// the base answer 403.
pub async fn scan_folder(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ScanFolderRequest>,
) -> ApiResult<Json<ScanFolderResponse>> {
    if request.folder_path.trim().is_empty() {
        return Err(ApiError::Validation(
            "Invalid input: folderPath is required".to_string(),
        ));
    }

    let scanner = state.scanner.clone();
    let files = tokio::task::spawn_blocking(move || {
        scanner.scan(&request.folder_path, &request.extensions)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Scan task failed: {}", e)))??;

    Ok(Json(ScanFolderResponse {
        success: true,
        files,
    }))
}

/// POST /identify-roms
///
/// Always answers with one result per name; backend failures degrade to
/// fallback names. A backend without credentials answers 503.
pub async fn identify_roms(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<IdentifyRequest>,
) -> ApiResult<Json<IdentifyResponse>> {
    if request.platform_name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Invalid input: platformName is required".to_string(),
        ));
    }
    if request.rom_names.is_empty() {
        return Err(ApiError::Validation(
            "Invalid input: romNames must contain at least one name".to_string(),
        ));
    }

    let (_, client) = identification_client(&state, request.model).await?;
    let client = client?;
    let data = client.identify(&request.platform_name, &request.rom_names).await;

    Ok(Json(IdentifyResponse {
        success: true,
        data,
    }))
}

/// POST /import-roms
pub async fn import_roms(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ImportRequest>,
) -> ApiResult<Json<ImportResponse>> {
    if request.platform_id.trim().is_empty() {
        return Err(ApiError::Validation(
            "Invalid input: platformId is required".to_string(),
        ));
    }

    let importer = RomImporter::new(
        state.store.clone(),
        state.event_bus.clone(),
        state.config.scanner.rom_library_root.clone(),
    );
    let report = importer.import(&request.platform_id, request.roms).await?;

    if let Some(first) = report.failed.first() {
        state.record_error(first.message.clone()).await;
    }

    Ok(Json(ImportResponse {
        success: true,
        imported: report.imported,
        failed: report.failed,
    }))
}

/// Build scanner routes
pub fn scanner_routes() -> Router<AppState> {
    Router::new()
        .route("/scan-folder", post(scan_folder))
        .route("/identify-roms", post(identify_roms))
        .route("/import-roms", post(import_roms))
}
