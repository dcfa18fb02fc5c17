use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;
use tracing::debug;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides.
///
/// A missing file is not an error: every section has defaults, so the
/// service can run from environment variables alone.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        debug!("Config file {:?} not found, using defaults", path);
    }

    figment
        .merge(Env::prefixed("CONVERTIFY_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::path::PathBuf;

    // Every test that reads the environment runs inside a `Jail`, which
    // serializes them and restores the variables afterwards.

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
port = 9000

[engine]
ffmpeg_path = "/bin/ffmpeg"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.engine.ffmpeg_path, PathBuf::from("/bin/ffmpeg"));
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[server]
port = "not a port"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = load_config(Path::new("/nonexistent/convertify.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 7878);
            assert_eq!(config.engine.cancel_grace_ms, 3000);
            Ok(())
        });
    }

    #[test]
    fn test_load_config_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "convertify.toml",
                r#"
[server]
host = "0.0.0.0"
port = 3000

[logs]
max_logs = 5
"#,
            )?;

            let config =
                load_config(Path::new("convertify.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.server.host.to_string(), "0.0.0.0");
            assert_eq!(config.logs.max_logs, 5);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "convertify.toml",
                r#"
[server]
port = 3000

[engine]
cancel_grace_ms = 1000
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
"#,
            )?;
            jail.set_env("CONVERTIFY_ENGINE__CANCEL_GRACE_MS", "250");
            jail.set_env("CONVERTIFY_SERVER__PORT", "9100");
            jail.set_env("CONVERTIFY_LOGGING__JSON", "true");

            let config =
                load_config(Path::new("convertify.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.engine.cancel_grace_ms, 250);
            assert_eq!(config.server.port, 9100);
            assert!(config.logging.json);
            // untouched file values survive
            assert_eq!(
                config.engine.ffmpeg_path,
                PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
            );
            Ok(())
        });
    }

    #[test]
    fn test_env_only_without_file() {
        Jail::expect_with(|jail| {
            jail.set_env("CONVERTIFY_LOGS__MAX_LOGS", "12");
            jail.set_env("CONVERTIFY_ENGINE__FFPROBE_PATH", "/usr/local/bin/ffprobe");

            let config = load_config(Path::new("missing.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.logs.max_logs, 12);
            assert_eq!(
                config.engine.ffprobe_path,
                PathBuf::from("/usr/local/bin/ffprobe")
            );
            assert_eq!(config.server.port, 7878);
            Ok(())
        });
    }

    #[test]
    fn test_config_path_variable_is_ignored_by_extraction() {
        Jail::expect_with(|jail| {
            jail.set_env("CONVERTIFY_CONFIG", "/etc/convertify/config.toml");

            let config = load_config(Path::new("missing.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 7878);
            Ok(())
        });
    }
}
