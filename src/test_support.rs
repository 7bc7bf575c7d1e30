use std::sync::Arc;

use time::macros::datetime;

use crate::core::config::Settings;
use crate::core::state::EngineContext;
use crate::core::time::{Clock, ManualClock};
use crate::domain::models::{Answer, Attempt, TestDefinition};
use crate::domain::types::TestCategory;
use crate::engine::lifecycle::ExamFlow;
use crate::schemas::test::{OptionCreate, QuestionCreate, TestCreate};
use crate::store::{AssessmentStore, MemoryStore};

pub(crate) fn sample_test_create() -> TestCreate {
    sample_test_create_with_limit(None)
}

pub(crate) fn sample_test_create_with_limit(time_limit_minutes: Option<u32>) -> TestCreate {
    let questions = vec![
        question_create("q1", "What PPE is required on site?", &["safety"]),
        question_create("q2", "Which ratio yields a C25 mix?", &["mixing"]),
        question_create("q3", "When is a mix considered workable?", &["mixing", "curing"]),
        question_create("q4", "How long must a slab cure before loading?", &["curing"]),
    ];

    TestCreate {
        id: String::from("test-concrete-101"),
        title: String::from("Concrete basics prerequisite"),
        course_id: String::from("course-concrete"),
        category: TestCategory::Prerequisite,
        questions,
        passing_score: 70,
        max_attempts: 3,
        time_limit_minutes,
    }
}

fn question_create(id: &str, text: &str, tags: &[&str]) -> QuestionCreate {
    QuestionCreate {
        id: id.to_string(),
        text: text.to_string(),
        options: vec![
            OptionCreate { id: format!("{id}-a"), text: String::from("Option A") },
            OptionCreate { id: format!("{id}-b"), text: String::from("Option B") },
            OptionCreate { id: format!("{id}-c"), text: String::from("Option C") },
        ],
        correct_option_id: format!("{id}-a"),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        difficulty: None,
    }
}

pub(crate) fn sample_test() -> TestDefinition {
    sample_test_create().into_definition().expect("sample test definition")
}

pub(crate) fn sample_test_with_questions(count: usize) -> TestDefinition {
    let questions = (1..=count)
        .map(|index| question_create(&format!("q{index}"), &format!("Question {index}"), &[]))
        .collect();

    TestCreate {
        id: format!("test-generated-{count}"),
        title: format!("Generated test with {count} questions"),
        course_id: String::from("course-concrete"),
        category: TestCategory::Module,
        questions,
        passing_score: 70,
        max_attempts: 1,
        time_limit_minutes: None,
    }
    .into_definition()
    .expect("generated test definition")
}

pub(crate) fn all_correct_answers(test: &TestDefinition) -> Vec<Answer> {
    test.questions
        .iter()
        .map(|question| Answer {
            question_id: question.id.clone(),
            selected_option_id: question.correct_option_id.clone(),
        })
        .collect()
}

pub(crate) fn no_answers(test: &TestDefinition) -> Vec<Answer> {
    test.questions
        .iter()
        .map(|question| Answer {
            question_id: question.id.clone(),
            selected_option_id: String::new(),
        })
        .collect()
}

pub(crate) fn attempt_record(
    test_id: &str,
    attempt_number: u32,
    score: u8,
    passed: bool,
) -> Attempt {
    Attempt {
        id: format!("attempt-{attempt_number}"),
        test_id: test_id.to_string(),
        answers: Vec::new(),
        attempt_number,
        score,
        passed,
        created_at: datetime!(2025-01-02 10:00:00 UTC),
    }
}

/// Fully wired flow over a manual clock and a seeded in-memory store.
pub(crate) struct FlowHarness {
    pub(crate) ctx: EngineContext,
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) clock: Arc<ManualClock>,
    pub(crate) test: TestDefinition,
    flow: ExamFlow,
}

impl FlowHarness {
    pub(crate) async fn new() -> Self {
        Self::build(None).await
    }

    pub(crate) async fn with_time_limit(minutes: u32) -> Self {
        Self::build(Some(minutes)).await
    }

    async fn build(time_limit_minutes: Option<u32>) -> Self {
        let settings = Settings::load().expect("settings");
        let clock = Arc::new(ManualClock::new(datetime!(2025-01-02 10:00:00 UTC)));
        let store = Arc::new(MemoryStore::new(clock.clone() as Arc<dyn Clock>));

        let test = store
            .seed_test(sample_test_create_with_limit(time_limit_minutes))
            .await
            .expect("seed sample test");

        let ctx = EngineContext::new(
            settings,
            store.clone() as Arc<dyn AssessmentStore>,
            clock.clone() as Arc<dyn Clock>,
        );
        let flow = ExamFlow::load(ctx.clone(), &test.id).await.expect("load flow");

        Self { ctx, store, clock, test, flow }
    }

    pub(crate) fn flow_mut(&mut self) -> &mut ExamFlow {
        &mut self.flow
    }
}
