//! Config file discovery, loading, merging, and environment variable overlay.

use crate::{ConfigError, ForgeConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/logoforge/config.toml");
    if system.exists() {
        files.push(system);
    }

    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("logoforge/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("logoforge.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a TOML file as a raw table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_table(&contents, path)
}

fn parse_table(contents: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    contents
        .parse()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Deep-merge `overlay` into `base`. Nested tables merge key by key,
/// everything else is replaced.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Deserialize a merged table; missing keys fall back to serde defaults.
pub fn from_table(table: toml::Table) -> Result<ForgeConfig, ConfigError> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: PathBuf::from("<merged config>"),
            message: e.to_string(),
        })
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut ForgeConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, |name| env::var(name).ok());
}

/// Apply overrides through an arbitrary variable lookup.
pub fn apply_overrides_from<F>(config: &mut ForgeConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let mut record = |name: &str| sources.env_overrides.push(name.to_string());

    if let Some(v) = lookup("LOGOFORGE_BASE_URL") {
        config.backend.base_url = v;
        record("LOGOFORGE_BASE_URL");
    }
    if let Some(v) = lookup("LOGOFORGE_TIMEOUT_MS") {
        if let Ok(ms) = v.parse() {
            config.backend.timeout_ms = ms;
            record("LOGOFORGE_TIMEOUT_MS");
        }
    }
    if let Some(v) = lookup("LOGOFORGE_TICK_MS") {
        if let Ok(ms) = v.parse() {
            config.stream.tick_interval_ms = ms;
            record("LOGOFORGE_TICK_MS");
        }
    }

    if let Some(v) = lookup("LOGOFORGE_LOG_LEVEL") {
        config.telemetry.log_level = v;
        record("LOGOFORGE_LOG_LEVEL");
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        record("RUST_LOG");
    }

    if let Some(v) = lookup("LOGOFORGE_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = Some(v);
        record("LOGOFORGE_OTLP_ENDPOINT");
    }
    // Also support standard OTEL env var
    if let Some(v) = lookup("OTEL_EXPORTER_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = Some(v);
        record("OTEL_EXPORTER_OTLP_ENDPOINT");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_discover_config_files() {
        // Just verify it doesn't panic
        let _files = discover_config_files();
    }

    #[test]
    fn test_parse_minimal_toml() {
        let table = parse_table(
            r#"
[stream]
tick_interval_ms = 1000
"#,
            Path::new("test.toml"),
        )
        .unwrap();
        let config = from_table(table).unwrap();
        assert_eq!(config.stream.tick_interval_ms, 1000);
        // Other values should be defaults
        assert_eq!(config.stream.gallery_capacity, 60);
        assert_eq!(config.backend.voice, "Kore");
    }

    #[test]
    fn test_parse_full_toml() {
        let table = parse_table(
            r#"
[backend]
base_url = "http://localhost:9999"
timeout_ms = 5000
voice = "Puck"
sample_rate = 16000
channels = 2

[backend.models]
fast = "flash-test"
speech = "tts-test"

[stream]
tick_interval_ms = 100
initial_items = 4
gallery_capacity = 8
log_capacity = 3
counter_start = 10

[telemetry]
log_level = "debug"
otlp_endpoint = "127.0.0.1:4317"
"#,
            Path::new("test.toml"),
        )
        .unwrap();
        let config = from_table(table).unwrap();

        assert_eq!(config.backend.base_url, "http://localhost:9999");
        assert_eq!(config.backend.timeout_ms, 5000);
        assert_eq!(config.backend.voice, "Puck");
        assert_eq!(config.backend.sample_rate, 16_000);
        assert_eq!(config.backend.channels, 2);
        assert_eq!(config.backend.models.fast, "flash-test");
        assert_eq!(config.backend.models.speech, "tts-test");
        assert_eq!(config.backend.models.reasoning, "gemini-3-pro-preview");
        assert_eq!(config.stream.initial_items, 4);
        assert_eq!(config.stream.log_capacity, 3);
        assert_eq!(config.stream.counter_start, 10);
        assert_eq!(config.telemetry.log_level, "debug");
        assert_eq!(config.telemetry.otlp_endpoint.as_deref(), Some("127.0.0.1:4317"));
    }

    #[test]
    fn test_merge_is_deep() {
        let mut base = parse_table(
            r#"
[backend]
voice = "Kore"
[backend.models]
fast = "a"
reasoning = "b"
"#,
            Path::new("base.toml"),
        )
        .unwrap();
        let overlay = parse_table(
            r#"
[backend.models]
fast = "c"
"#,
            Path::new("overlay.toml"),
        )
        .unwrap();

        merge_tables(&mut base, overlay);
        let config = from_table(base).unwrap();
        assert_eq!(config.backend.voice, "Kore");
        assert_eq!(config.backend.models.fast, "c");
        assert_eq!(config.backend.models.reasoning, "b");
    }

    #[test]
    fn test_load_table_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stream]\nlog_capacity = 5").unwrap();

        let table = load_table(file.path()).unwrap();
        let config = from_table(table).unwrap();
        assert_eq!(config.stream.log_capacity, 5);
    }

    #[test]
    fn test_load_table_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stream\nbroken").unwrap();

        let err = load_table(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides_are_recorded() {
        let mut config = ForgeConfig::default();
        let mut sources = ConfigSources::default();

        apply_overrides_from(&mut config, &mut sources, |name| match name {
            "LOGOFORGE_TICK_MS" => Some("750".to_string()),
            "LOGOFORGE_BASE_URL" => Some("http://mock".to_string()),
            "OTEL_EXPORTER_OTLP_ENDPOINT" => Some("collector:4317".to_string()),
            "LOGOFORGE_TIMEOUT_MS" => Some("not-a-number".to_string()),
            _ => None,
        });

        assert_eq!(config.stream.tick_interval_ms, 750);
        assert_eq!(config.backend.base_url, "http://mock");
        assert_eq!(config.backend.timeout_ms, 60_000);
        assert_eq!(config.telemetry.otlp_endpoint.as_deref(), Some("collector:4317"));
        assert_eq!(
            sources.env_overrides,
            vec!["LOGOFORGE_BASE_URL", "LOGOFORGE_TICK_MS", "OTEL_EXPORTER_OTLP_ENDPOINT"]
        );
    }
}
