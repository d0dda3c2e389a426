//! Integration tests for the catalogue endpoints
//!
//! Covers games, platforms, emulators, settings, health and the error
//! envelope.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{create_platform, extract_json, setup_app};
use serde_json::json;
use tower::util::ServiceExt;

// =============================================================================
// Health and envelope
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app();

    let (status, body) = app.send("GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "retronode-server");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_unknown_api_route_is_404_envelope() {
    let app = setup_app();

    let (status, body) = app.send("GET", "/api/does-not-exist", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("/does-not-exist"));
}

#[tokio::test]
async fn test_unknown_root_route_without_static_assets_is_404_envelope() {
    let app = setup_app();

    let (status, body) = app.send("GET", "/index.html", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_malformed_bodies_get_json_envelope() {
    let app = setup_app();

    let cases = [
        ("application/json", "{\"title\": \"Zelda\""),
        ("application/json", "{\"title\": 42}"),
        ("text/plain", "{\"title\": \"Zelda\"}"),
    ];
    for (content_type, raw) in cases {
        let request = Request::builder()
            .method("POST")
            .uri("/api/games")
            .header("content-type", content_type)
            .body(Body::from(raw))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{raw}");
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));
    }
}

// =============================================================================
// Games
// =============================================================================

#[tokio::test]
async fn test_game_crud_round_trip() {
    let app = setup_app();

    let (status, body) = app
        .send(
            "POST",
            "/api/games",
            Some(json!({
                "title": "Zelda",
                "description": "Adventure",
                "platforms": {"nes": "/roms/nes/Zelda.zip"}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());
    let created_at = body["data"]["created_at"].clone();

    let (status, body) = app.send("GET", &format!("/api/games/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Zelda");
    assert_eq!(body["data"]["platforms"]["nes"], "/roms/nes/Zelda.zip");

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/games/{id}"),
            Some(json!({"title": "The Legend of Zelda", "platforms": {"nes": "/roms/nes/Zelda.zip"}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "The Legend of Zelda");
    assert_eq!(body["data"]["created_at"], created_at);

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/games/{id}/cover"),
            Some(json!({"imageUrl": "https://img/zelda.png"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cover_image_path"], "https://img/zelda.png");

    let (status, body) = app.send("DELETE", &format!("/api/games/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app.send("GET", &format!("/api/games/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_create_game_requires_title() {
    let app = setup_app();

    let (status, body) = app
        .send("POST", "/api/games", Some(json!({"title": "  "})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Game title is required");
}

#[tokio::test]
async fn test_duplicate_titles_get_distinct_ids() {
    let app = setup_app();

    let (_, first) = app.send("POST", "/api/games", Some(json!({"title": "Tetris"}))).await;
    let (_, second) = app.send("POST", "/api/games", Some(json!({"title": "Tetris"}))).await;

    assert_ne!(first["data"]["id"], second["data"]["id"]);
}

#[tokio::test]
async fn test_list_games_filters_sorts_and_paginates() {
    let app = setup_app();
    create_platform(&app, "nes", "Nintendo Entertainment System").await;

    for (title, platform) in [
        ("zelda", "nes"),
        ("Metroid", "nes"),
        ("Sonic", "genesis"),
        ("Castlevania", "nes"),
    ] {
        app.send(
            "POST",
            "/api/games",
            Some(json!({"title": title, "platforms": {platform: format!("/roms/{platform}/{title}")}})),
        )
        .await;
    }

    let (status, body) = app.send("GET", "/api/games", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Castlevania", "Metroid", "Sonic", "zelda"]);
    assert_eq!(body["pagination"]["total"], 4);
    assert_eq!(body["pagination"]["limit"], 100);
    assert_eq!(body["pagination"]["hasMore"], false);

    let (_, body) = app.send("GET", "/api/games?platform=nes", None).await;
    assert_eq!(body["pagination"]["total"], 3);
    let first = &body["data"][0];
    assert_eq!(
        first["platformDetails"]["nes"]["name"],
        "Nintendo Entertainment System"
    );
    assert_eq!(first["platformDetails"]["nes"]["release_year"], 1985);

    let (_, body) = app.send("GET", "/api/games?search=ZEL", None).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["title"], "zelda");

    let (_, body) = app.send("GET", "/api/games?page=2&limit=3", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasMore"], false);

    let (status, body) = app.send("GET", "/api/games?page=abc&limit=999", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 200);
}

// =============================================================================
// Platforms and emulators
// =============================================================================

#[tokio::test]
async fn test_platform_round_trip_preserves_emulators() {
    let app = setup_app();
    create_platform(&app, "nes", "NES").await;

    let (status, _) = app
        .send(
            "POST",
            "/api/emulators/nes",
            Some(json!({"emulator_id": "fceux", "name": "FCEUX", "command": "fceux %ROM%"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(
            "PUT",
            "/api/platforms/nes",
            Some(json!({"name": "Nintendo Entertainment System", "manufacturer": "Nintendo"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["platform_id"], "nes");

    let (status, body) = app.send("GET", "/api/platforms/nes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Nintendo Entertainment System");
    assert_eq!(body["data"]["manufacturer"], "Nintendo");
    assert_eq!(body["data"]["emulators"]["fceux"]["command"], "fceux %ROM%");

    let (_, body) = app.send("GET", "/api/platforms", None).await;
    assert!(body["data"]["nes"].is_object());
}

#[tokio::test]
async fn test_platform_image_update() {
    let app = setup_app();
    create_platform(&app, "snes", "Super Nintendo").await;
    let (_, before) = app.send("GET", "/api/platforms/snes", None).await;

    let (status, body) = app
        .send(
            "POST",
            "/api/platforms/update-image",
            Some(json!({"pid": "snes", "imageUrl": "https://img/snes.png"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["image_url"], "https://img/snes.png");
    assert_eq!(body["data"]["created_at"], before["data"]["created_at"]);

    // A later edit that does not mention the image keeps it
    app.send("PUT", "/api/platforms/snes", Some(json!({"name": "SNES"})))
        .await;
    let (_, body) = app.send("GET", "/api/platforms/snes", None).await;
    assert_eq!(body["data"]["image_url"], "https://img/snes.png");

    let (status, body) = app
        .send(
            "POST",
            "/api/platforms/update-image",
            Some(json!({"pid": "snes", "imageUrl": "not a url"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "A valid image URL is required");

    let (status, _) = app
        .send(
            "POST",
            "/api/platforms/update-image",
            Some(json!({"pid": "n64", "imageUrl": "https://img/n64.png"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_platform_rewrite_keeps_foreign_fields() {
    let app = setup_app();
    std::fs::write(
        app.data_dir.path().join("platforms.json"),
        serde_json::to_string_pretty(&json!({
            "nes": {
                "name": "NES",
                "image_url": "https://img/nes.png",
                "created_at": "2023-05-01T00:00:00Z",
                "updated_at": "2023-05-01T00:00:00Z",
                "igdb_id": 18,
                "emulators": {}
            }
        }))
        .unwrap(),
    )
    .unwrap();

    create_platform(&app, "snes", "SNES").await;

    let raw = std::fs::read_to_string(app.data_dir.path().join("platforms.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["nes"]["igdb_id"], 18);
    assert_eq!(doc["nes"]["image_url"], "https://img/nes.png");
    assert_eq!(doc["nes"]["created_at"], "2023-05-01T00:00:00Z");
}

#[tokio::test]
async fn test_duplicate_platform_is_conflict() {
    let app = setup_app();
    create_platform(&app, "nes", "NES").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/platforms",
            Some(json!({"platform_id": "nes", "name": "Another"})),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_platform_requires_id_and_name() {
    let app = setup_app();

    let (status, _) = app
        .send("POST", "/api/platforms", Some(json!({"name": "NES"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send("POST", "/api/platforms", Some(json!({"platform_id": "nes"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_platform_cascades_emulators() {
    let app = setup_app();
    create_platform(&app, "nes", "NES").await;
    app.send(
        "POST",
        "/api/emulators/nes",
        Some(json!({"emulator_id": "fceux", "name": "FCEUX", "command": "fceux %ROM%"})),
    )
    .await;

    let (status, _) = app.send("DELETE", "/api/platforms/nes", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send("GET", "/api/emulators/nes", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send("DELETE", "/api/platforms/nes", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_emulator_crud() {
    let app = setup_app();
    create_platform(&app, "nes", "NES").await;
    create_platform(&app, "snes", "SNES").await;

    let emulator = json!({"emulator_id": "mesen", "name": "Mesen", "command": "mesen %ROM%"});
    let (status, body) = app.send("POST", "/api/emulators/nes", Some(emulator.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let created_at = body["data"]["created_at"].clone();

    let (status, _) = app.send("POST", "/api/emulators/nes", Some(emulator)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .send(
            "PUT",
            "/api/emulators/nes/mesen",
            Some(json!({
                "name": "Mesen 2",
                "command": "",
                "program": "/usr/bin/mesen",
                "args": ["--fullscreen", "%ROM%"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Mesen 2");
    assert_eq!(body["data"]["created_at"], created_at);
    assert_eq!(body["data"]["args"][1], "%ROM%");

    let (_, body) = app.send("GET", "/api/emulators", None).await;
    assert_eq!(body["data"]["nes"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["snes"].as_array().unwrap().len(), 0);

    let (status, _) = app.send("DELETE", "/api/emulators/nes/mesen", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.send("GET", "/api/emulators/nes", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = app.send("DELETE", "/api/emulators/nes/mesen", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Settings
// =============================================================================

#[tokio::test]
async fn test_settings_never_echo_credentials() {
    let app = setup_app();

    let (status, body) = app.send("GET", "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["identificationBackend"], "chat");
    assert_eq!(body["data"]["githubTokenConfigured"], false);

    let (status, body) = app
        .send(
            "PUT",
            "/api/settings",
            Some(json!({"identification_backend": "gemini", "github_token": "secret-token"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["identificationBackend"], "generative");
    assert_eq!(body["data"]["githubTokenConfigured"], true);
    assert!(!body.to_string().contains("secret-token"));

    let (_, body) = app
        .send("PUT", "/api/settings", Some(json!({"github_token": ""})))
        .await;
    assert_eq!(body["data"]["githubTokenConfigured"], false);
    assert_eq!(body["data"]["identificationBackend"], "generative");
}
