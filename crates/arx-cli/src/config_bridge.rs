//! Bridge from `arx_config::Config` to telemetry types.

use std::path::PathBuf;

use arx_config::{Config, ConfigLayer, ResolvedConfig, loader};
use arx_telemetry::{FileRotation, LogConfig, LogFormat, LogTarget};
use tracing::{debug, info};

/// Build the telemetry config from the `[logging]` section.
///
/// Strings were validated when the config loaded, so an unparseable value
/// can only come from a hand-built `Config`; those fall back to the
/// telemetry defaults.
pub(crate) fn to_log_config(config: &Config) -> LogConfig {
    let logging = &config.logging;
    let format = logging
        .format
        .parse::<LogFormat>()
        .unwrap_or(LogFormat::Compact);

    let mut log = LogConfig::new(logging.level.to_ascii_lowercase()).with_format(format);
    log = match (logging.target.as_str(), logging.directory.as_deref()) {
        ("stdout", _) => log.with_target(LogTarget::Stdout),
        ("file", Some(dir)) => {
            let rotation = logging.rotation.parse().unwrap_or(FileRotation::Never);
            let dir = loader::expand_home(dir).unwrap_or_else(|_| PathBuf::from(dir));
            log.with_file_logging(dir, rotation)
        },
        _ => log.with_target(LogTarget::Stderr),
    };

    logging
        .directives
        .iter()
        .fold(log, |log, directive| log.with_directive(directive.as_str()))
}

/// Report where the configuration came from. Runs once logging is up,
/// since loading happens before a subscriber exists.
pub(crate) fn report_sources(resolved: &ResolvedConfig) {
    for path in &resolved.loaded_files {
        info!(path = %path, "loaded config file");
    }
    for (field, layer) in &resolved.field_sources {
        if *layer == ConfigLayer::Environment {
            debug!(field = %field, "value taken from environment");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_logging_section_maps_to_log_config() {
        let mut config = Config::default();
        config.logging.level = "DEBUG".to_owned();
        config.logging.format = "json".to_owned();
        config.logging.directives = vec!["arx_crypto=trace".to_owned()];

        let log = to_log_config(&config);
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.target, LogTarget::Stderr);
        assert_eq!(log.directives, vec!["arx_crypto=trace"]);
    }

    #[test]
    fn test_unknown_format_falls_back() {
        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert_eq!(to_log_config(&config).format, LogFormat::Compact);
    }

    #[test]
    fn test_file_target_maps_directory_and_rotation() {
        let mut config = Config::default();
        config.logging.target = "file".to_owned();
        config.logging.directory = Some("/var/log/arx".to_owned());
        config.logging.rotation = "daily".to_owned();

        let log = to_log_config(&config);
        assert_eq!(log.target, LogTarget::File(PathBuf::from("/var/log/arx")));
        assert_eq!(log.rotation, FileRotation::Daily);
        assert!(!log.ansi);

        config.logging.target = "stdout".to_owned();
        assert_eq!(to_log_config(&config).target, LogTarget::Stdout);
    }

    #[test]
    fn test_report_sources_logs_loaded_files() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join("config.toml"), "[hash]\nlength = 48\n").unwrap();
        let resolved = Config::load_with_home(home.path(), None).unwrap();

        let capture = Capture::default();
        let writer = capture.clone();
        let log = LogConfig::new("info").without_timestamps().without_ansi();
        let subscriber = arx_telemetry::build_subscriber(&log, move || writer.clone()).unwrap();
        tracing::subscriber::with_default(subscriber, || report_sources(&resolved));

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("loaded config file"), "{output}");
        assert!(output.contains("config.toml"), "{output}");
    }
}
