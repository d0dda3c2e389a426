//! Platforms and their nested emulators (`platforms.json`)

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A gaming platform keyed by its caller-chosen id (e.g. `nes`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "lenient_year")]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Emulator id → emulator, in document order
    #[serde(default)]
    pub emulators: IndexMap<String, Emulator>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Fields written by other tools; carried through rewrites untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Platform {
    pub fn from_input(input: PlatformInput) -> Self {
        let now = Utc::now();
        Self {
            name: input.name.trim().to_string(),
            manufacturer: input.manufacturer,
            release_year: input.release_year,
            description: input.description,
            image_url: input.image_url.filter(|url| !url.trim().is_empty()),
            emulators: IndexMap::new(),
            created_at: now,
            updated_at: now,
            extra: Map::new(),
        }
    }

    /// Replace scalar fields; emulators, `created_at` and an image not
    /// mentioned in `input` are left untouched
    pub fn replace_scalars(&mut self, input: PlatformInput) {
        self.name = input.name.trim().to_string();
        self.manufacturer = input.manufacturer;
        self.release_year = input.release_year;
        self.description = input.description;
        if let Some(url) = input.image_url {
            self.image_url = Some(url).filter(|url| !url.trim().is_empty());
        }
        self.updated_at = Utc::now();
    }

    pub fn set_image(&mut self, image_url: String) {
        self.image_url = Some(image_url);
        self.updated_at = Utc::now();
    }
}

/// Create / update payload for a platform
///
/// `platform_id` is only read on create; updates never rename.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformInput {
    #[serde(default)]
    pub platform_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "lenient_year")]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Emulator configuration for one platform
///
/// Launching prefers `program` + `args`. Records without `program` fall back
/// to the legacy `command` template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emulator {
    #[serde(default)]
    pub name: String,
    /// Legacy whitespace-separated command template containing `%ROM%`
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Emulator {
    pub fn from_input(input: EmulatorInput) -> Self {
        let now = Utc::now();
        Self {
            name: input.name.trim().to_string(),
            command: input.command,
            description: input.description,
            version: input.version,
            website: input.website,
            program: input.program.filter(|p| !p.trim().is_empty()),
            args: input.args,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every field from `input`, keeping `created_at`
    pub fn replace_with(&mut self, input: EmulatorInput) {
        let created_at = self.created_at;
        *self = Self::from_input(input);
        self.created_at = created_at;
    }
}

/// Create / replace payload for an emulator
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmulatorInput {
    #[serde(default)]
    pub emulator_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Accept `1985`, `"1985"`, `""` or `null` for a release year
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Number(i32),
        Text(String),
    }

    match Option::<Year>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Year::Number(year)) => Ok(Some(year)),
        Some(Year::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                text.parse::<i32>()
                    .map(Some)
                    .map_err(|_| serde::de::Error::custom(format!("invalid release year: {text}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_year_accepts_strings_and_null() {
        let p: Platform = serde_json::from_str(r#"{"name":"NES","release_year":"1985"}"#).unwrap();
        assert_eq!(p.release_year, Some(1985));

        let p: Platform = serde_json::from_str(r#"{"name":"NES","release_year":""}"#).unwrap();
        assert_eq!(p.release_year, None);

        let p: Platform = serde_json::from_str(r#"{"name":"NES","release_year":null}"#).unwrap();
        assert_eq!(p.release_year, None);

        let p: Platform = serde_json::from_str(r#"{"name":"NES","release_year":1983}"#).unwrap();
        assert_eq!(p.release_year, Some(1983));
    }

    #[test]
    fn replace_scalars_preserves_emulators() {
        let mut platform = Platform::from_input(PlatformInput {
            name: "Nintendo".to_string(),
            ..PlatformInput::default()
        });
        platform.emulators.insert(
            "fceux".to_string(),
            Emulator::from_input(EmulatorInput {
                name: "FCEUX".to_string(),
                command: "fceux %ROM%".to_string(),
                ..EmulatorInput::default()
            }),
        );

        platform.replace_scalars(PlatformInput {
            name: "Nintendo Entertainment System".to_string(),
            release_year: Some(1985),
            ..PlatformInput::default()
        });

        assert_eq!(platform.name, "Nintendo Entertainment System");
        assert_eq!(platform.emulators.len(), 1);
    }

    #[test]
    fn unknown_fields_survive_a_rewrite() {
        let json = r#"{
            "name": "NES",
            "image_url": "https://img/nes.png",
            "created_at": "2024-01-02T03:04:05Z",
            "updated_at": "2024-01-02T03:04:05Z",
            "igdb_id": 18,
            "emulators": {}
        }"#;
        let mut platform: Platform = serde_json::from_str(json).unwrap();
        let created_at = platform.created_at;

        platform.replace_scalars(PlatformInput {
            name: "Nintendo Entertainment System".to_string(),
            ..PlatformInput::default()
        });
        let out = serde_json::to_value(&platform).unwrap();

        assert_eq!(out["igdb_id"], 18);
        assert_eq!(out["image_url"], "https://img/nes.png");
        assert_eq!(platform.created_at, created_at);
        assert!(platform.updated_at > created_at);
    }

    #[test]
    fn blank_program_is_dropped() {
        let emulator = Emulator::from_input(EmulatorInput {
            program: Some("   ".to_string()),
            command: "mednafen %ROM%".to_string(),
            ..EmulatorInput::default()
        });
        assert!(emulator.program.is_none());

        let json = serde_json::to_value(&emulator).unwrap();
        assert!(json.get("program").is_none());
        assert!(json.get("args").is_none());
    }
}
