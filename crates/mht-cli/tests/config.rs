use mht_cli::config::{CURRENT_VERSION, FIRST_VERSION, MhtConfig, load_config, migrate, save_config};
use mht_interactions::DocumentSource;
use mht_rules::store::RuleSource;
use serde_json::json;

#[test]
fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = load_config(&dir.path().join("config.json")).unwrap();
    assert_eq!(loaded.config, MhtConfig::default());
    assert_eq!(loaded.on_disk_version, None);
    assert!(!loaded.was_migrated());
    assert_eq!(loaded.config.log_filter, "info");
    assert!(!loaded.config.log_json);
}

#[test]
fn unversioned_config_reads_as_first_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "rules_dir": "/srv/rules", "log_filter": "debug" }"#).unwrap();

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.on_disk_version, Some(FIRST_VERSION));
    assert!(!loaded.was_migrated());
    assert_eq!(loaded.config.config_version, CURRENT_VERSION);
    assert_eq!(
        loaded.config.rules_dir.as_deref(),
        Some(std::path::Path::new("/srv/rules"))
    );
    assert_eq!(loaded.config.log_filter, "debug");
    assert!(!loaded.config.log_json);
}

#[test]
fn current_config_passes_through_unchanged() {
    let migrated = migrate(json!({ "config_version": 1, "log_json": true }), CURRENT_VERSION).unwrap();
    assert_eq!(migrated, json!({ "config_version": 1, "log_json": true }));
}

#[test]
fn newer_config_is_refused() {
    let err = migrate(json!({}), CURRENT_VERSION + 1).unwrap_err();
    assert!(err.to_string().contains("newer than this build supports"));
}

#[test]
fn version_zero_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "config_version": 0 }"#).unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("predates the first config format"));
}

#[test]
fn non_numeric_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "config_version": "one" }"#).unwrap();
    assert!(load_config(&path).is_err());
}

#[test]
fn non_object_config_is_refused() {
    assert!(migrate(json!([1, 2, 3]), CURRENT_VERSION).is_err());
}

#[test]
fn save_then_load_round_trips_and_stamps_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let config = MhtConfig {
        config_version: 0,
        interaction_pairs: Some("/srv/pairs.json".into()),
        log_json: true,
        ..MhtConfig::default()
    };

    save_config(&path, &config).unwrap();
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.on_disk_version, Some(CURRENT_VERSION));
    assert_eq!(loaded.config.config_version, CURRENT_VERSION);
    assert_eq!(loaded.config.interaction_pairs, config.interaction_pairs);
    assert!(loaded.config.log_json);
}

#[test]
fn rules_dir_override_beats_config() {
    let config = MhtConfig {
        rules_dir: Some("/etc/mht".into()),
        ..MhtConfig::default()
    };
    assert!(matches!(
        config.rule_source(Some(std::path::Path::new("/tmp/rules"))),
        RuleSource::Directory(dir) if dir == std::path::Path::new("/tmp/rules")
    ));
    assert!(matches!(
        config.rule_source(None),
        RuleSource::Directory(dir) if dir == std::path::Path::new("/etc/mht")
    ));
    assert!(matches!(MhtConfig::default().rule_source(None), RuleSource::Bundled));
}

#[test]
fn interaction_documents_found_in_rules_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("interaction_rules.json"), "{}").unwrap();
    let config = MhtConfig::default();

    assert!(matches!(
        config.interaction_rules_source(Some(dir.path())),
        DocumentSource::File(path) if path.ends_with("interaction_rules.json")
    ));
    assert!(matches!(
        config.interaction_pairs_source(Some(dir.path())),
        DocumentSource::Bundled
    ));
}

#[test]
fn explicit_interaction_file_wins() {
    let config = MhtConfig {
        interaction_rules: Some("/data/rules.json".into()),
        ..MhtConfig::default()
    };
    assert!(matches!(
        config.interaction_rules_source(None),
        DocumentSource::File(path) if path == std::path::Path::new("/data/rules.json")
    ));
}
