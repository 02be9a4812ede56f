//! Wires configuration into a collect pass.

use fastcollect_collect::{
    CollectOptions, CollectResult, Collector, DetectorConfig, IgnorePatterns, StaticSource,
};
use fastcollect_storage::{DirectoryStore, LocalSource, RemoteStore};
use serde::Serialize;

use crate::config::Config;

/// Outcome of a run, as printed with `--json`.
#[derive(Debug, Serialize)]
pub struct Report {
    pub destination: String,
    pub fast_collect: bool,
    pub dry_run: bool,
    #[serde(flatten)]
    pub result: CollectResult,
    pub summary: String,
}

/// Runs one collect pass as described by `config`.
pub fn run(config: &Config) -> anyhow::Result<Report> {
    let store = DirectoryStore::new(&config.destination.root, config.destination.backend.clone())
        .with_algorithm(config.algorithm)
        .with_block_size(config.block_size)
        .with_preload(config.destination.preload_metadata);

    let sources: Vec<StaticSource> = config
        .sources
        .iter()
        .map(|s| StaticSource::new(LocalSource::new(&s.path), s.prefix.clone()))
        .collect();
    if sources.is_empty() {
        tracing::warn!("no sources configured, nothing to collect");
    }

    let detector = DetectorConfig {
        enabled: config.fast_collect,
        algorithm: config.algorithm,
        block_size: config.block_size,
    };
    let options = CollectOptions {
        dry_run: config.dry_run,
        ignore: IgnorePatterns::with_defaults(
            &config.ignore_patterns,
            config.use_default_ignore_patterns,
        )?,
    };

    tracing::info!(
        destination = %store.describe(),
        sources = sources.len(),
        fast_collect = config.fast_collect,
        dry_run = config.dry_run,
        "starting collect"
    );

    let result = Collector::new(&store, detector, options).run(&sources)?;
    let destination = store.describe();
    let summary = result.summary(&destination);

    Ok(Report {
        destination,
        fast_collect: config.fast_collect,
        dry_run: config.dry_run,
        result,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use fastcollect_storage::BackendKind;

    use crate::config::{DestinationConfig, SourceConfig};

    fn config_for(src: &std::path::Path, dest: &std::path::Path) -> Config {
        Config {
            fast_collect: true,
            sources: vec![SourceConfig {
                path: src.to_path_buf(),
                prefix: None,
            }],
            destination: DestinationConfig {
                root: dest.to_path_buf(),
                preload_metadata: false,
                backend: BackendKind::LocationPrefixed {
                    location: "static".into(),
                },
            },
            ..Config::default()
        }
    }

    #[test]
    fn run_copies_then_skips() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::write(src.path().join("app.js"), b"1").unwrap();
        fs::write(src.path().join(".hidden"), b"x").unwrap();

        let config = config_for(src.path(), dest.path());
        let first = run(&config).unwrap();
        assert_eq!(first.result.copied, vec!["app.js"]);
        assert!(dest.path().join("static/app.js").is_file());
        assert!(!dest.path().join("static/.hidden").exists());

        let second = run(&config).unwrap();
        assert!(second.result.copied.is_empty());
        assert_eq!(second.result.unmodified, vec!["app.js"]);
        assert!(second.summary.contains("1 unmodified"));
    }

    #[test]
    fn report_json_is_flat() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::write(src.path().join("app.js"), b"1").unwrap();

        let config = Config {
            dry_run: true,
            ..config_for(src.path(), dest.path())
        };
        let report = run(&config).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["copied"][0], "app.js");
        assert!(json["summary"].as_str().unwrap().starts_with("1 static file copied"));
        assert!(!dest.path().join("static/app.js").exists());
    }

    #[test]
    fn invalid_ignore_pattern_fails() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let config = Config {
            ignore_patterns: vec!["{broken".into()],
            ..config_for(src.path(), dest.path())
        };
        assert!(run(&config).is_err());
    }

    #[test]
    fn no_sources_is_empty_run() {
        let dest = tempfile::tempdir().unwrap();
        let config = Config {
            destination: DestinationConfig {
                root: dest.path().to_path_buf(),
                ..DestinationConfig::default()
            },
            ..Config::default()
        };
        let report = run(&config).unwrap();
        assert!(report.result.copied.is_empty());
        assert!(report.result.is_success());
    }
}
