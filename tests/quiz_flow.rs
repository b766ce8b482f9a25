use std::fs;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde_json::json;
use tempfile::TempDir;

use quizdrill::LoadError;
use quizdrill::fetch::FileFetcher;
use quizdrill::quiz::loader::QuestionLoader;
use quizdrill::quiz::session::{OptionMark, Outcome, Phase, SessionState, Trainer};
use quizdrill::store::json_store::JsonStore;
use quizdrill::store::ledger::WrongLedger;

fn write_json(dir: &Path, name: &str, value: serde_json::Value) {
    fs::write(dir.join(name), serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn manifest_location(dir: &Path) -> String {
    dir.join("manifest.json").to_string_lossy().to_string()
}

fn json_ledger(dir: &Path) -> WrongLedger {
    WrongLedger::new(Box::new(JsonStore::with_base_dir(dir.to_path_buf()).unwrap()))
}

fn single_source_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_json(
        dir.path(),
        "manifest.json",
        json!({"sources": [{"id": "s", "path": "./s.json", "enabled": true}]}),
    );
    write_json(
        dir.path(),
        "s.json",
        json!([{
            "id": "A",
            "stem": "?",
            "options": [{"key": "a", "text": "x"}, {"key": "b", "text": "y"}],
            "answer": "a"
        }]),
    );
    dir
}

#[test]
fn test_bundled_sample_data_loads() {
    let set = QuestionLoader::new(FileFetcher)
        .load("data/manifest.json")
        .unwrap();
    let ids: Vec<&str> = set.ids().collect();
    assert_eq!(ids, vec!["rb-001", "rb-002", "rb-003", "ro-001", "ro-002"]);
    assert_eq!(
        set.get("rb-003").unwrap().stem,
        "Which macro prints to standard error?"
    );
}

#[test]
fn test_end_to_end_single_source() {
    let quiz_dir = single_source_fixture();
    let data_dir = TempDir::new().unwrap();

    let all = QuestionLoader::new(FileFetcher)
        .load(&manifest_location(quiz_dir.path()))
        .unwrap();
    assert_eq!(all.len(), 1);

    let mut trainer = Trainer::new(all, json_ledger(data_dir.path()), SmallRng::seed_from_u64(42));
    let state = trainer.next_question(SessionState::default());
    assert_eq!(state.current().map(|q| q.id.as_str()), Some("A"));

    let state = trainer.choose(state, "b");
    assert!(matches!(state.outcome(), Some(Outcome::Incorrect { .. })));
    assert_eq!(state.option_mark("a"), OptionMark::Correct);
    assert_eq!(state.option_mark("b"), OptionMark::Wrong);
    assert_eq!(trainer.ledger().get().get("A"), Some(&1));

    let again = trainer.choose(state.clone(), "a");
    assert_eq!(again, state);
    assert_eq!(trainer.ledger().get().get("A"), Some(&1));

    // persisted under the fixed key
    let raw = fs::read_to_string(data_dir.path().join("wrong_ledger.json")).unwrap();
    assert_eq!(raw, r#"{"A":1}"#);
}

#[test]
fn test_wrong_answers_accumulate_across_sessions() {
    let quiz_dir = single_source_fixture();
    let data_dir = TempDir::new().unwrap();
    let location = manifest_location(quiz_dir.path());

    for seed in 0..2 {
        let all = QuestionLoader::new(FileFetcher).load(&location).unwrap();
        let mut trainer = Trainer::new(all, json_ledger(data_dir.path()), SmallRng::seed_from_u64(seed));
        let state = trainer.next_question(SessionState::default());
        trainer.choose(state, "b");
    }

    let all = QuestionLoader::new(FileFetcher).load(&location).unwrap();
    let mut trainer = Trainer::new(all, json_ledger(data_dir.path()), SmallRng::seed_from_u64(9));
    assert_eq!(trainer.ledger().get().get("A"), Some(&2));

    let state = trainer.next_question(SessionState::default());
    trainer.choose(state, "a");
    assert_eq!(trainer.ledger().get().get("A"), Some(&2));

    // wrong-only works from the persisted ledger, and reset falls back
    let state = trainer.toggle_wrong_mode(SessionState::default());
    assert!(state.wrong_only);
    let state = trainer.reset_wrong_ledger(state);
    assert!(!state.wrong_only);
    assert!(trainer.ledger().get().is_empty());
    assert!(!data_dir.path().join("wrong_ledger.json").exists());
}

#[test]
fn test_corrupt_ledger_file_is_treated_as_empty() {
    let data_dir = TempDir::new().unwrap();
    fs::write(data_dir.path().join("wrong_ledger.json"), "{ truncated").unwrap();
    let ledger = json_ledger(data_dir.path());
    assert!(ledger.get().is_empty());
    assert_eq!(ledger.increment("A").unwrap(), 1);
}

#[test]
fn test_validation_failure_aborts_whole_load() {
    let dir = TempDir::new().unwrap();
    write_json(
        dir.path(),
        "manifest.json",
        json!({"sources": [
            {"id": "ok", "path": "ok.json", "enabled": true},
            {"id": "bad", "path": "bad.json", "enabled": true}
        ]}),
    );
    let good = json!({"id": "G", "stem": "?", "options": [{"key": "a", "text": "x"}], "answer": "a"});
    write_json(dir.path(), "ok.json", json!([good]));
    write_json(
        dir.path(),
        "bad.json",
        json!([
            {"id": "B1", "stem": "?", "options": [{"key": "a", "text": "x"}], "answer": "a"},
            {"id": "B2", "stem": "?", "options": [{"key": "a", "text": "x"}], "answer": "a"},
            {"id": "B3", "stem": "?", "options": [{"key": "a", "text": "x"}]}
        ]),
    );

    let err = QuestionLoader::new(FileFetcher)
        .load(&manifest_location(dir.path()))
        .unwrap_err();
    assert!(matches!(
        &err,
        LoadError::Validation { id, position: Some(3), .. } if id == "bad"
    ));
    let msg = err.to_string();
    assert!(msg.contains("`bad`"));
    assert!(msg.contains("question 3"));
}

#[test]
fn test_missing_source_file_names_source() {
    let dir = TempDir::new().unwrap();
    write_json(
        dir.path(),
        "manifest.json",
        json!({"sources": [{"id": "gone", "path": "gone.json", "enabled": true}]}),
    );
    let err = QuestionLoader::new(FileFetcher)
        .load(&manifest_location(dir.path()))
        .unwrap_err();
    assert!(matches!(err, LoadError::SourceFetch { ref id, .. } if id == "gone"));
    assert!(err.to_string().contains("gone.json"));
}

#[test]
fn test_reload_sees_fresh_content() {
    let dir = single_source_fixture();
    let location = manifest_location(dir.path());
    let loader = QuestionLoader::new(FileFetcher);
    assert_eq!(loader.load(&location).unwrap().len(), 1);

    write_json(
        dir.path(),
        "s.json",
        json!([
            {"id": "A", "stem": "?", "options": [{"key": "a", "text": "x"}], "answer": "a"},
            {"id": "B", "stem": "?", "options": [{"key": "a", "text": "x"}], "answer": "a"}
        ]),
    );
    let reloaded = loader.load(&location).unwrap();
    assert_eq!(reloaded.len(), 2);
}

#[test]
fn test_empty_manifest_gives_empty_pool_notice() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "manifest.json", json!({"sources": []}));
    let all = QuestionLoader::new(FileFetcher)
        .load(&manifest_location(dir.path()))
        .unwrap();
    assert!(all.is_empty());

    let data_dir = TempDir::new().unwrap();
    let mut trainer = Trainer::new(all, json_ledger(data_dir.path()), SmallRng::seed_from_u64(1));
    let state = trainer.next_question(SessionState::default());
    assert_eq!(state.phase, Phase::Empty);
    assert!(state.notice.is_some());
}
