use api_core::ApiSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Directory name used under the platform data dir for persisted sessions.
pub const SESSION_DIR_NAME: &str = "archflaire-admin";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionSettings {
    /// Root for per-origin session files. Unset means the platform data dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl SessionSettings {
    pub fn resolve_dir(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(SESSION_DIR_NAME),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint (e.g., http://tempo:4317). Export is off when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;

    // Works from the workspace root and from inside admin-console.
    let configuration_directory = if base_path.ends_with("admin-console") {
        base_path.join("config")
    } else {
        base_path.join("admin-console").join("config")
    };

    load_from(&configuration_directory)
}

/// `base.yaml` under `configuration_directory` (optional), then `APP_*`
/// environment overrides such as `APP_API__BASE_URL`.
pub fn load_from(configuration_directory: &Path) -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::time::Duration;

    #[test]
    #[serial]
    fn falls_back_to_defaults_without_sources() {
        let empty = tempfile::tempdir().unwrap();
        let settings = load_from(empty.path()).unwrap();

        assert_eq!(settings.api.base_url, "http://localhost:8000/api/");
        assert_eq!(settings.api.timeout(), Duration::from_secs(30));
        assert_eq!(settings.telemetry.log_level, "info");
        assert!(settings.telemetry.otlp_endpoint.is_none());
        assert!(settings.session.resolve_dir().ends_with(SESSION_DIR_NAME));
    }

    #[test]
    #[serial]
    fn reads_base_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("base.yaml"),
            "api:\n  base_url: \"https://api.archflaire.test/api/\"\n  timeout_ms: 5000\nsession:\n  dir: \"/tmp/archflaire-sessions\"\n",
        )
        .unwrap();

        let settings = load_from(dir.path()).unwrap();
        assert_eq!(settings.api.base_url, "https://api.archflaire.test/api/");
        assert_eq!(settings.api.timeout(), Duration::from_secs(5));
        assert_eq!(
            settings.session.resolve_dir(),
            PathBuf::from("/tmp/archflaire-sessions")
        );
    }

    #[test]
    #[serial]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("base.yaml"),
            "api:\n  base_url: \"http://localhost:8000/api/\"\n",
        )
        .unwrap();

        std::env::set_var("APP_API__BASE_URL", "https://staging.archflaire.test/api/");
        let settings = load_from(dir.path());
        std::env::remove_var("APP_API__BASE_URL");

        assert_eq!(
            settings.unwrap().api.base_url,
            "https://staging.archflaire.test/api/"
        );
    }
}
