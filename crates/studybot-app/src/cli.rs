//! CLI argument definitions for the StudyBot service.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use studybot_core::config::StudyBotConfig;
use studybot_core::error::StudyBotError;

/// StudyBot: a study assistant chat API backed by a hosted language model.
#[derive(Parser, Debug)]
#[command(name = "studybot", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Address to bind the API server to.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// History database location (file path or `:memory:`).
    #[arg(short = 'd', long = "database-url")]
    pub database_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Write the effective configuration (without the API key) to the
    /// config path and exit.
    #[arg(long = "write-config")]
    pub write_config: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > STUDYBOT_CONFIG env var > ~/.studybot/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("STUDYBOT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Overlay command-line values onto an already env-resolved config.
    pub fn apply_overrides(&self, config: &mut StudyBotConfig) {
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref url) = self.database_url {
            config.storage.database_url = url.clone();
        }
        if let Some(ref level) = self.log_level {
            config.server.log_level = level.clone();
        }
    }
}

/// How the configuration file was found on startup.
#[derive(Debug)]
pub enum ConfigSource {
    /// Parsed from the file.
    File,
    /// No file at the path; defaults are in effect.
    Missing,
    /// The file exists but could not be read or parsed; defaults are in
    /// effect for this run only.
    Invalid(StudyBotError),
}

/// Read the config file, falling back to defaults when it is absent or broken.
pub fn load_config(path: &Path) -> (StudyBotConfig, ConfigSource) {
    match StudyBotConfig::load(path) {
        Ok(config) => (config, ConfigSource::File),
        Err(StudyBotError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            (StudyBotConfig::default(), ConfigSource::Missing)
        }
        Err(e) => (StudyBotConfig::default(), ConfigSource::Invalid(e)),
    }
}

/// Persist `config` to `path` without its API key.
///
/// Refuses when the existing file could not be parsed, since the in-memory
/// config then holds defaults rather than the file's settings.
pub fn write_config(
    path: &Path,
    source: &ConfigSource,
    config: &StudyBotConfig,
) -> Result<(), StudyBotError> {
    if let ConfigSource::Invalid(e) = source {
        return Err(StudyBotError::Config(format!(
            "refusing to overwrite {}: {}",
            path.display(),
            e
        )));
    }
    let mut to_save = config.clone();
    to_save.provider.api_key = None;
    to_save.save(path)
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".studybot").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".studybot").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_flags() {
        let args = CliArgs::parse_from([
            "studybot",
            "--config",
            "/etc/studybot.toml",
            "--host",
            "0.0.0.0",
            "-p",
            "9001",
            "-d",
            ":memory:",
            "-l",
            "debug",
        ]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/etc/studybot.toml"));
        assert_eq!(args.port, Some(9001));
        assert!(!args.write_config);

        let mut config = StudyBotConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.storage.database_url, ":memory:");
        assert_eq!(config.server.log_level, "debug");
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let args = CliArgs::parse_from(["studybot"]);
        let mut config = StudyBotConfig::default();
        config.server.port = 7000;
        args.apply_overrides(&mut config);
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.storage.database_url, "~/.studybot/studybot.db");
    }

    #[test]
    fn test_write_config_flag() {
        let args = CliArgs::parse_from(["studybot", "--write-config"]);
        assert!(args.write_config);
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, source) = load_config(&dir.path().join("absent.toml"));
        assert!(matches!(source, ConfigSource::Missing));
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_write_config_creates_missing_file_without_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let (mut config, source) = load_config(&path);
        config.provider.api_key = Some("gsk-secret".to_string());
        config.server.port = 9100;

        write_config(&path, &source, &config).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("gsk-secret"));
        assert_eq!(StudyBotConfig::load(&path).unwrap().server.port, 9100);
    }

    #[test]
    fn test_write_config_preserves_loaded_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chat]\nsystem_instruction = \"My custom persona\"\n").unwrap();

        let (config, source) = load_config(&path);
        assert!(matches!(source, ConfigSource::File));
        write_config(&path, &source, &config).unwrap();

        let reloaded = StudyBotConfig::load(&path).unwrap();
        assert_eq!(reloaded.chat.system_instruction, "My custom persona");
    }

    #[test]
    fn test_write_config_refuses_to_overwrite_unparseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let original = "[chat]\nsystem_instruction = \"My custom persona\"\n\n[server\nport = 9000\n";
        std::fs::write(&path, original).unwrap();

        let (config, source) = load_config(&path);
        assert!(matches!(source, ConfigSource::Invalid(_)));
        assert_eq!(config.server.port, 8000);

        let err = write_config(&path, &source, &config).unwrap_err();
        assert!(matches!(err, StudyBotError::Config(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }
}
