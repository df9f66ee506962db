use quiz_core::model::BankId;
use serde_json::json;
use storage::repository::{BankRepository, StorageError};
use storage::FsBankRepository;

fn bank_id(name: &str) -> BankId {
    name.parse().unwrap()
}

fn write(dir: &std::path::Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("write fixture");
}

fn sample_document() -> String {
    json!({
        "module": "Module 1",
        "questions": [
            { "id": "m1-1", "stem": "First", "options": ["a", "b"], "correct": ["A"] },
            { "id": "m1-2", "stem": "Second", "options": ["a", "b", "c"], "correct": ["B", "C"], "type": "multi_select" }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn lists_only_bank_files_sorted() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Pharm_Quiz_HESI.json", "{}");
    write(dir.path(), "Module_2.json", "{}");
    write(dir.path(), "Module_1.json", "{}");
    write(dir.path(), "notes.json", "{}");
    write(dir.path(), "Module_3.txt", "{}");
    std::fs::create_dir(dir.path().join("Module_dir.json")).unwrap();

    let repo = FsBankRepository::new(dir.path());
    let files: Vec<String> = repo
        .list_banks()
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.file)
        .collect();

    assert_eq!(files, vec!["Module_1.json", "Module_2.json", "Pharm_Quiz_HESI.json"]);
}

#[tokio::test]
async fn fetches_and_normalizes_bank() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Module_1.json", &sample_document());

    let repo = FsBankRepository::new(dir.path());
    let bank = repo.fetch_bank(&bank_id("Module_1.json")).await.unwrap();

    assert_eq!(bank.name, "Module 1");
    assert_eq!(bank.questions.len(), 2);
    assert!(bank.questions[1].is_multi());
}

#[tokio::test]
async fn refuses_files_outside_patterns_and_directory() {
    let dir = tempfile::tempdir().unwrap();
    let inner = dir.path().join("banks");
    std::fs::create_dir(&inner).unwrap();
    write(&inner, "notes.json", &sample_document());
    write(dir.path(), "Module_1.json", &sample_document());

    let repo = FsBankRepository::new(&inner);

    let err = repo.fetch_bank(&bank_id("notes")).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    let err = repo.fetch_bank(&bank_id("../Module_1")).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidName(_)));
}

#[tokio::test]
async fn existence_check_follows_listing() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Learning_Questions_Module_1_2.json", &sample_document());

    let repo = FsBankRepository::new(dir.path());
    assert!(repo
        .bank_exists(&bank_id("Learning_Questions_Module_1_2"))
        .await
        .unwrap());
    assert!(!repo.bank_exists(&bank_id("Module_9")).await.unwrap());
}

#[tokio::test]
async fn missing_directory_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let repo = FsBankRepository::new(dir.path().join("missing"));
    let err = repo.list_banks().await.unwrap_err();
    assert!(matches!(err, StorageError::Io(_)));
}
