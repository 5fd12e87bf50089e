use akku_core::parse::ParseError;
use akku_core::stats::{aggregate_by_date, mean_mood};
use akku_core::{
    open_db_in_memory, DecryptionError, EntryStore, GpgDecryptor, RefreshEngine, RefreshError,
    RefreshOptions, RefreshResult, Source, SourceConfig, SourceState, SqliteEntryStore,
};
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

const CAPTURE_DAY_ONE: &str = "* log
:PROPERTIES:
:CREATED: [2021-03-01 Mon 08:15]
:END:
slept well #mood(2) with @sam

* log
:PROPERTIES:
:CREATED: [2021-03-01 Mon 20:40]
:END:
long day #mood(-1)
";

const CAPTURE_MISSING_CREATED: &str = "* log
no drawer here
";

fn write(path: &Path, text: &str) {
    fs::write(path, text).unwrap();
}

fn options() -> RefreshOptions {
    RefreshOptions::default()
}

#[test]
fn second_refresh_skips_unchanged_source() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("inbox.org");
    write(&file, CAPTURE_DAY_ONE);

    let mut conn = open_db_in_memory().unwrap();
    let mut engine = RefreshEngine::new(SqliteEntryStore::new(&mut conn), GpgDecryptor::default());
    engine
        .store()
        .add_source(&Source::new(&file, SourceConfig::outline()))
        .unwrap();

    let first = engine.refresh(&options()).unwrap();
    assert_eq!(first.refreshed_count(), 1);
    assert_eq!(first.outcomes[0].state, SourceState::Stale);
    assert!(matches!(
        first.outcomes[0].result,
        RefreshResult::Replaced { entries: 2 }
    ));
    let stored = engine.store().all_entries().unwrap();

    let second = engine.refresh(&options()).unwrap();
    assert_eq!(second.skipped_count(), 1);
    assert_eq!(second.outcomes[0].state, SourceState::Fresh);
    assert_eq!(engine.store().all_entries().unwrap(), stored);
}

#[test]
fn single_byte_change_makes_source_stale() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("inbox.org");
    write(&file, CAPTURE_DAY_ONE);

    let mut conn = open_db_in_memory().unwrap();
    let mut engine = RefreshEngine::new(SqliteEntryStore::new(&mut conn), GpgDecryptor::default());
    engine
        .store()
        .add_source(&Source::new(&file, SourceConfig::outline()))
        .unwrap();
    engine.refresh(&options()).unwrap();

    write(&file, &CAPTURE_DAY_ONE.replace("#mood(2)", "#mood(1)"));
    let report = engine.refresh(&options()).unwrap();

    assert_eq!(report.refreshed_count(), 1);
    let moods = aggregate_by_date(&engine.store().all_entries().unwrap(), mean_mood);
    let day = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    assert_eq!(moods[&day], Some(0.0));
}

#[test]
fn force_refresh_reparses_fresh_sources() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("inbox.org");
    write(&file, CAPTURE_DAY_ONE);

    let mut conn = open_db_in_memory().unwrap();
    let mut engine = RefreshEngine::new(SqliteEntryStore::new(&mut conn), GpgDecryptor::default());
    engine
        .store()
        .add_source(&Source::new(&file, SourceConfig::outline()))
        .unwrap();
    engine.refresh(&options()).unwrap();

    let forced = RefreshOptions {
        force: true,
        ..RefreshOptions::default()
    };
    let report = engine.refresh(&forced).unwrap();
    assert_eq!(report.outcomes[0].state, SourceState::Stale);
    assert_eq!(report.refreshed_count(), 1);
    assert_eq!(engine.store().all_entries().unwrap().len(), 2);
}

#[test]
fn failed_parse_keeps_last_good_entries_and_fingerprint() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("inbox.org");
    write(&file, CAPTURE_DAY_ONE);

    let mut conn = open_db_in_memory().unwrap();
    let mut engine = RefreshEngine::new(SqliteEntryStore::new(&mut conn), GpgDecryptor::default());
    let source = Source::new(&file, SourceConfig::outline());
    engine.store().add_source(&source).unwrap();
    engine.refresh(&options()).unwrap();
    let good_entries = engine.store().all_entries().unwrap();
    let good_fingerprint = engine.store().fingerprint(source.id).unwrap();

    write(&file, CAPTURE_MISSING_CREATED);
    let report = engine.refresh(&options()).unwrap();

    assert_eq!(report.failed_count(), 1);
    assert!(matches!(
        report.outcomes[0].error(),
        Some(RefreshError::Parse(ParseError::Format(_)))
    ));
    assert_eq!(engine.store().all_entries().unwrap(), good_entries);
    assert_eq!(engine.store().fingerprint(source.id).unwrap(), good_fingerprint);

    // Restoring the last good content matches the stored fingerprint again.
    write(&file, CAPTURE_DAY_ONE);
    assert_eq!(engine.refresh(&options()).unwrap().skipped_count(), 1);
}

#[test]
fn one_failing_source_does_not_stop_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.org");
    write(&good, "* Log\n- [2021-03-02 Tue] walked #mood(1)\n");

    let mut conn = open_db_in_memory().unwrap();
    let mut engine = RefreshEngine::new(SqliteEntryStore::new(&mut conn), GpgDecryptor::default());
    let missing = Source::new(dir.path().join("missing.org"), SourceConfig::outline());
    let list = Source::new(&good, SourceConfig::list());
    engine.store().add_source(&missing).unwrap();
    engine.store().add_source(&list).unwrap();

    let report = engine.refresh(&options()).unwrap();

    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.refreshed_count(), 1);
    let failure = report.failures().next().unwrap();
    assert_eq!(failure.source_id, missing.id);
    assert_eq!(failure.state, SourceState::Unknown);
    assert!(matches!(
        failure.error(),
        Some(RefreshError::Fingerprint { .. })
    ));
    assert_eq!(engine.store().entries_for(list.id).unwrap().len(), 1);
}

#[test]
fn archive_without_passphrase_fails_that_source_only() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("20210301.org"), "* day\ncipher\n");

    let decryptor = |cipher: &str, _: &str| -> Result<String, DecryptionError> {
        Ok(format!("** 09:00 {cipher}"))
    };
    let mut conn = open_db_in_memory().unwrap();
    let mut engine = RefreshEngine::new(SqliteEntryStore::new(&mut conn), decryptor);
    let archive = Source::new(dir.path(), SourceConfig::EncryptedArchive);
    engine.store().add_source(&archive).unwrap();

    let report = engine.refresh(&options()).unwrap();
    assert!(matches!(
        report.outcomes[0].error(),
        Some(RefreshError::Parse(ParseError::MissingPassphrase))
    ));
    assert_eq!(engine.store().fingerprint(archive.id).unwrap(), None);

    let with_passphrase = RefreshOptions {
        passphrase: Some("secret".to_string()),
        ..RefreshOptions::default()
    };
    let report = engine.refresh(&with_passphrase).unwrap();
    assert_eq!(report.refreshed_count(), 1);
    let entries = engine.store().entries_for(archive.id).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].body, "cipher");
}
