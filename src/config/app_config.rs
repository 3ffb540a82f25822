use std::sync::LazyLock;

use config::Config;
use serde::de::IntoDeserializer;
use serde::Deserialize;
use serde_path_to_error::{Deserializer as PathDeserializer, Segment, Track};

use super::server_config::ServerConfig;
use super::sheets_config::SpreadsheetConfig;
use super::staging_config::StagingConfig;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sheets: SpreadsheetConfig,
    pub staging: StagingConfig,
}

/// Loaded once at startup from `Config.toml` (or whatever `CONFIG_PATH`
/// points at). A broken config file is unrecoverable, so loading panics with
/// the exact field path that failed.
pub static CONFIG: LazyLock<AppConfig> = LazyLock::new(|| {
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "Config".to_string());
    let config = Config::builder()
        .add_source(config::File::with_name(&config_path))
        .build()
        .unwrap_or_else(|err| {
            panic!(
                "[CONFIG ERROR] Could not read config file '{}': {:?}",
                config_path, err
            )
        });

    let value = config
        .try_deserialize::<serde_json::Value>()
        .expect("Config to JSON failed");

    let mut track = Track::new();
    let path_de = PathDeserializer::new(value.into_deserializer(), &mut track);
    match AppConfig::deserialize(path_de) {
        Ok(parsed) => parsed,
        Err(err) => panic!(
            "[CONFIG ERROR] Failed to deserialize config file '{}': {}\nField path: {}\nMake sure all required fields are present.",
            config_path,
            err,
            render_path(track)
        ),
    }
});

fn render_path(track: Track) -> String {
    let rendered = track
        .path()
        .iter()
        .map(|seg| match seg {
            Segment::Seq { index } => format!("[{}]", index),
            Segment::Map { key } => format!(".{}", key),
            Segment::Enum { variant } => format!("::{}", variant),
            Segment::Unknown => String::from("<?>"),
        })
        .collect::<String>();
    rendered.trim_start_matches('.').to_string()
}
