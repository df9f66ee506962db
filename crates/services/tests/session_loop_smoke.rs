use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::SampleSize;
use quiz_core::model::{Bank, BankId, OptionLetter, Question};
use serde_json::json;
use services::{
    BankCatalog, Counters, Feedback, QuizController, QuizRenderer, RunSummary, SessionError,
    SessionStep, FALLBACK_BANKS,
};
use storage::repository::{BankEntry, BankRepository, InMemoryRepository, StorageError};

#[derive(Debug, Default)]
struct RecordingRenderer {
    questions: Vec<String>,
    feedback: Vec<bool>,
    summaries: Vec<RunSummary>,
    counters: Vec<Counters>,
    notices: Vec<String>,
}

impl QuizRenderer for RecordingRenderer {
    fn render_question(&mut self, question: &Question) {
        self.questions.push(question.id.to_string());
    }

    fn render_feedback(&mut self, feedback: &Feedback) {
        self.feedback.push(feedback.correct);
    }

    fn render_summary(&mut self, summary: &RunSummary) {
        self.summaries.push(summary.clone());
    }

    fn update_counters(&mut self, counters: Counters) {
        self.counters.push(counters);
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

struct OfflineRepository;

#[async_trait]
impl BankRepository for OfflineRepository {
    async fn list_banks(&self) -> Result<Vec<BankEntry>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn fetch_bank(&self, _id: &BankId) -> Result<Bank, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn bank_exists(&self, _id: &BankId) -> Result<bool, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

fn bank_id(name: &str) -> BankId {
    name.parse().unwrap()
}

fn repo_with_module() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    let document = json!({
        "module": "Module 1",
        "questions": [
            { "id": "m1-1", "stem": "One", "options": ["a", "b", "c"], "correct": ["A"] },
            { "id": "m1-2", "stem": "Two", "options": ["a", "b", "c"], "correct": ["B"] },
            {
                "id": "m1-3",
                "stem": "Three",
                "options": ["a", "b", "c", "d"],
                "correct": ["A", "D"],
                "type": "multi_select"
            }
        ]
    });
    repo.insert_document(bank_id("Module_1"), document.to_string())
        .unwrap();
    repo
}

fn current_question<R: QuizRenderer>(controller: &QuizController<R>) -> Question {
    controller
        .session()
        .and_then(|s| s.current_question())
        .cloned()
        .unwrap()
}

fn correct_letters(question: &Question) -> Vec<OptionLetter> {
    question.correct.iter().copied().collect()
}

fn wrong_letter(question: &Question) -> OptionLetter {
    question
        .options
        .letters()
        .find(|l| !question.correct.contains(l))
        .unwrap()
}

#[tokio::test]
async fn controller_runs_a_bank_to_completion() {
    let repo = Arc::new(repo_with_module());
    let mut controller = QuizController::new(repo, RecordingRenderer::default());

    controller
        .start_quiz(&bank_id("Module_1.json"), SampleSize::Full)
        .await
        .unwrap();
    assert_eq!(controller.renderer().questions.len(), 1);
    assert_eq!(
        controller.renderer().counters.last(),
        Some(&Counters { seen: 1, remaining: 3 })
    );

    let summary = loop {
        let question = current_question(&controller);
        let feedback = controller.submit(correct_letters(&question)).unwrap();
        assert!(feedback.correct);
        match controller.advance().unwrap() {
            SessionStep::Question(_) => {}
            SessionStep::Complete(summary) => break summary,
        }
    };

    let renderer = controller.renderer();
    assert_eq!(renderer.questions.len(), 3);
    assert_eq!(renderer.feedback, vec![true, true, true]);
    assert_eq!(renderer.summaries, vec![summary.clone()]);
    assert_eq!(
        renderer.counters.last(),
        Some(&Counters { seen: 3, remaining: 0 })
    );
    assert!(renderer.notices.is_empty());

    assert_eq!(summary.bank, "Module 1");
    let stats = summary.first_try.unwrap();
    assert_eq!((stats.correct, stats.total, stats.percent), (3, 3, 100));
}

#[tokio::test]
async fn missed_question_comes_back_until_mastered() {
    let repo = InMemoryRepository::new();
    let document = json!({
        "questions": [{ "id": "solo", "stem": "Only", "options": ["x", "y"], "correct": ["B"] }]
    });
    repo.insert_document(bank_id("Pharm_Quiz_HESI"), document.to_string())
        .unwrap();
    let mut controller = QuizController::new(Arc::new(repo), RecordingRenderer::default());

    controller
        .start_quiz(&bank_id("Pharm_Quiz_HESI"), SampleSize::Count(10))
        .await
        .unwrap();

    let question = current_question(&controller);
    let feedback = controller.submit([wrong_letter(&question)]).unwrap();
    assert!(!feedback.correct);
    assert_eq!(feedback.correct_answer.len(), 1);

    match controller.advance().unwrap() {
        SessionStep::Question(q) => assert_eq!(q.id.as_str(), "solo"),
        SessionStep::Complete(_) => panic!("question was not mastered"),
    }

    let question = current_question(&controller);
    controller.submit(correct_letters(&question)).unwrap();
    let SessionStep::Complete(summary) = controller.advance().unwrap() else {
        panic!("run should be complete");
    };

    assert_eq!(summary.bank, "Pharm_Quiz_HESI");
    let stats = summary.first_try.unwrap();
    assert_eq!((stats.correct, stats.total, stats.percent), (0, 1, 0));
    assert_eq!(summary.review.len(), 2);
    assert_eq!(controller.renderer().feedback, vec![false, true]);
}

#[tokio::test]
async fn failed_start_notifies_and_discards_previous_run() {
    let repo = Arc::new(repo_with_module());
    let mut controller = QuizController::new(repo, RecordingRenderer::default());

    controller
        .start_quiz(&bank_id("Module_1"), SampleSize::Count(10))
        .await
        .unwrap();
    assert!(controller.session().is_some());

    let err = controller
        .start_quiz(&bank_id("Module_9"), SampleSize::Count(10))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Storage(StorageError::NotFound)));
    assert!(controller.session().is_none());
    assert_eq!(controller.renderer().notices, vec!["Could not load Module_9.json"]);

    controller
        .start_quiz(&bank_id("Module_1"), SampleSize::Count(10))
        .await
        .unwrap();
    assert!(controller.session().is_some());
}

#[tokio::test]
async fn actions_without_a_run_are_rejected() {
    let mut controller = QuizController::new(Arc::new(OfflineRepository), RecordingRenderer::default());

    let err = controller.submit([OptionLetter::A]).unwrap_err();
    assert!(matches!(err, SessionError::NoActiveSession));
    let err = controller.advance().unwrap_err();
    assert!(matches!(err, SessionError::NoActiveSession));

    let err = controller
        .start_quiz(&bank_id("Module_1"), SampleSize::Full)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Storage(StorageError::Connection(_))));
    assert_eq!(controller.renderer().notices.len(), 1);
}

#[tokio::test]
async fn unanswerable_questions_are_announced_at_start() {
    let repo = InMemoryRepository::new();
    let document = json!({
        "questions": [
            { "id": "ok", "stem": "Fine", "options": ["a", "b"], "correct": ["A"] },
            { "id": "broken", "stem": "Bad key", "options": ["a", "b"], "correct": ["Z"] }
        ]
    });
    repo.insert_document(bank_id("Module_3"), document.to_string())
        .unwrap();
    let mut controller = QuizController::new(Arc::new(repo), RecordingRenderer::default());

    controller
        .start_quiz(&bank_id("Module_3"), SampleSize::Full)
        .await
        .unwrap();

    assert_eq!(
        controller.renderer().notices,
        vec!["1 question(s) in this run have no valid correct answer and cannot be mastered"]
    );
    assert!(controller.session().is_some());
}

#[tokio::test]
async fn clean_bank_starts_without_notices() {
    let mut controller =
        QuizController::new(Arc::new(repo_with_module()), RecordingRenderer::default());
    controller
        .start_quiz(&bank_id("Module_1"), SampleSize::Full)
        .await
        .unwrap();
    assert!(controller.renderer().notices.is_empty());
}

#[tokio::test]
async fn empty_bank_does_not_start() {
    let repo = InMemoryRepository::new();
    repo.insert_document(bank_id("Module_4"), r#"{"questions": "not a list"}"#)
        .unwrap();
    let mut controller = QuizController::new(Arc::new(repo), RecordingRenderer::default());

    let err = controller
        .start_quiz(&bank_id("Module_4"), SampleSize::Count(10))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Empty));
    assert!(controller.session().is_none());
    assert!(controller.renderer().questions.is_empty());
}

#[tokio::test]
async fn catalog_falls_back_when_listing_fails() {
    let mut catalog = BankCatalog::new(Arc::new(OfflineRepository));
    let entries = catalog.load().await;

    assert_eq!(entries.len(), FALLBACK_BANKS.len());
    assert_eq!(entries[4].file, "Pharm_Quiz_HESI.json");
    assert_eq!(entries[9].label, "Pharmacology 3");

    let err = catalog.add_custom("Module_7").await.unwrap_err();
    assert!(matches!(err, services::CatalogError::Storage(_)));
}
