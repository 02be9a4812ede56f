fn main() {
    println!("Run `cargo test -p collect-e2e` to execute end-to-end collect tests.");
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::path::Path;
    use std::time::{Duration, SystemTime};

    use fastcollect_collect::{
        CollectOptions, CollectResult, Collector, DetectorConfig, IgnorePatterns, StaticSource,
    };
    use fastcollect_fingerprint::{Algorithm, DEFAULT_BLOCK_SIZE, hash_file};
    use fastcollect_storage::{BackendKind, DirectoryStore, LocalSource, RemoteStore};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, data: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    /// Sets the modification time of every file under `root`, as a fresh
    /// checkout or container build would.
    fn touch_all(root: &Path, when: SystemTime) {
        for entry in fs::read_dir(root).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                touch_all(&path, when);
            } else {
                File::options()
                    .write(true)
                    .open(&path)
                    .unwrap()
                    .set_modified(when)
                    .unwrap();
            }
        }
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "css/site.css", b"body { margin: 0 }");
        write(dir.path(), "js/app.js", b"console.log('hi')");
        write(dir.path(), "img/logo.svg", b"<svg/>");
        write(dir.path(), ".gitignore", b"*.log");
        dir
    }

    fn prefixed(location: &str) -> BackendKind {
        BackendKind::LocationPrefixed {
            location: location.to_string(),
        }
    }

    fn options() -> CollectOptions {
        CollectOptions {
            dry_run: false,
            ignore: IgnorePatterns::with_defaults(&[], true).unwrap(),
        }
    }

    fn collect(
        store: &DirectoryStore,
        detector: DetectorConfig,
        sources: &[StaticSource],
    ) -> CollectResult {
        Collector::new(store, detector, options()).run(sources).unwrap()
    }

    #[test]
    fn reset_mtimes_skip_with_fast_collect() {
        let src = site();
        let bucket = TempDir::new().unwrap();
        let sources = [StaticSource::new(LocalSource::new(src.path()), None)];

        let store = DirectoryStore::new(bucket.path(), prefixed("static"));
        let first = collect(&store, DetectorConfig::enabled(), &sources);
        assert_eq!(first.copied.len(), 3);

        // A new checkout makes every local file look newer than the bucket.
        touch_all(src.path(), SystemTime::now() + Duration::from_secs(3600));

        let store = DirectoryStore::new(bucket.path(), prefixed("static"));
        let by_time = Collector::new(
            &store,
            DetectorConfig::default(),
            CollectOptions {
                dry_run: true,
                ..options()
            },
        )
        .run(&sources)
        .unwrap();
        assert_eq!(by_time.copied.len(), 3);

        let store = DirectoryStore::new(bucket.path(), prefixed("static"));
        let by_hash = collect(&store, DetectorConfig::enabled(), &sources);
        assert!(by_hash.copied.is_empty());
        assert_eq!(
            by_hash.unmodified,
            vec!["css/site.css", "img/logo.svg", "js/app.js"]
        );
        assert_eq!(store.index_loads(), 1);
    }

    #[test]
    fn changed_content_with_old_mtime_is_published() {
        let src = site();
        let bucket = TempDir::new().unwrap();
        let sources = [StaticSource::new(LocalSource::new(src.path()), None)];

        let store = DirectoryStore::new(bucket.path(), prefixed("static"));
        collect(&store, DetectorConfig::enabled(), &sources);

        write(src.path(), "js/app.js", b"console.log('bye')");
        touch_all(
            src.path(),
            SystemTime::now() - Duration::from_secs(7 * 24 * 3600),
        );

        let store = DirectoryStore::new(bucket.path(), prefixed("static"));
        let result = collect(&store, DetectorConfig::enabled(), &sources);
        assert_eq!(result.copied, vec!["js/app.js"]);
        assert_eq!(
            fs::read(bucket.path().join("static/js/app.js")).unwrap(),
            b"console.log('bye')"
        );
    }

    #[test]
    fn bucket_etags_match_local_digests() {
        let src = site();
        let bucket = TempDir::new().unwrap();
        let store = DirectoryStore::new(bucket.path(), BackendKind::BucketRoot);
        collect(
            &store,
            DetectorConfig::enabled(),
            &[StaticSource::new(LocalSource::new(src.path()), None)],
        );

        let entry = store.entry("css/site.css").unwrap().unwrap();
        let local = hash_file(
            &src.path().join("css/site.css"),
            Algorithm::Md5,
            DEFAULT_BLOCK_SIZE,
        )
        .unwrap();
        assert_eq!(entry.etag.unwrap(), local.to_etag());
    }

    #[test]
    fn prefixed_sources_share_one_bucket() {
        let app = site();
        let admin = TempDir::new().unwrap();
        write(admin.path(), "css/base.css", b"admin");
        write(admin.path(), "js/app.js", b"admin app");

        let bucket = TempDir::new().unwrap();
        let store = DirectoryStore::new(bucket.path(), prefixed("static"));
        let sources = [
            StaticSource::new(LocalSource::new(app.path()), None),
            StaticSource::new(LocalSource::new(admin.path()), Some("admin".into())),
        ];

        let result = collect(&store, DetectorConfig::enabled(), &sources);
        assert_eq!(result.copied.len(), 5);
        assert!(bucket.path().join("static/admin/js/app.js").is_file());
        assert!(bucket.path().join("static/js/app.js").is_file());
        assert!(!bucket.path().join("static/.gitignore").exists());
    }

    #[test]
    fn unknown_backend_round_trips() {
        let src = site();
        let bucket = TempDir::new().unwrap();
        let kind = BackendKind::Unknown {
            location: "assets".into(),
        };
        let sources = [StaticSource::new(LocalSource::new(src.path()), None)];

        let store = DirectoryStore::new(bucket.path(), kind.clone());
        collect(&store, DetectorConfig::enabled(), &sources);
        assert!(bucket.path().join("assets/css/site.css").is_file());

        let store = DirectoryStore::new(bucket.path(), kind);
        let second = collect(&store, DetectorConfig::enabled(), &sources);
        assert!(second.copied.is_empty());
        assert_eq!(second.unmodified.len(), 3);
    }

    #[test]
    fn sha256_bucket() {
        let src = site();
        let bucket = TempDir::new().unwrap();
        let sources = [StaticSource::new(LocalSource::new(src.path()), None)];
        let config = DetectorConfig {
            algorithm: Algorithm::Sha256,
            ..DetectorConfig::enabled()
        };

        let store = DirectoryStore::new(bucket.path(), BackendKind::BucketRoot)
            .with_algorithm(Algorithm::Sha256);
        collect(&store, config, &sources);

        let store = DirectoryStore::new(bucket.path(), BackendKind::BucketRoot)
            .with_algorithm(Algorithm::Sha256);
        let second = collect(&store, config, &sources);
        assert_eq!(second.unmodified.len(), 3);
    }

    #[test]
    fn result_json_shape() {
        let src = site();
        let bucket = TempDir::new().unwrap();
        let store = DirectoryStore::new(bucket.path(), BackendKind::BucketRoot);
        let result = collect(
            &store,
            DetectorConfig::enabled(),
            &[StaticSource::new(LocalSource::new(src.path()), None)],
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["copied"].as_array().unwrap().len(), 3);
        assert!(json["unmodified"].as_array().unwrap().is_empty());
        assert!(json["failed"].as_array().unwrap().is_empty());
        assert!(
            result
                .summary(&store.describe())
                .starts_with("3 static files copied")
        );
    }
}
