use std::cell::Cell;

use async_trait::async_trait;
use colony_atlas::controller::open_and_load_quiz;
use colony_atlas::quiz::pass_threshold;
use colony_atlas::{
    AppState, GenerateRequest, GenerationError, HistoryService, QuizPhase, QuizQuestion,
    ServiceError, TerritoryTable, TextGenerator,
};
use futures::executor::block_on;
use serde_json::json;

/// Replies with a fixed body and counts calls.
struct ScriptedGenerator {
    reply: Result<String, GenerationError>,
    calls: Cell<usize>,
}

impl ScriptedGenerator {
    fn replying(body: serde_json::Value) -> Self {
        Self {
            reply: Ok(body.to_string()),
            calls: Cell::new(0),
        }
    }

    fn failing(error: GenerationError) -> Self {
        Self {
            reply: Err(error),
            calls: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _request: &GenerateRequest) -> Result<String, GenerationError> {
        self.calls.set(self.calls.get() + 1);
        self.reply.clone()
    }
}

fn question(country: &str, answer: &str, correct: usize) -> serde_json::Value {
    let mut options = vec!["Lagos", "Accra", "Nairobi", "Kampala"];
    options[correct] = answer;

    json!({
        "relatedCountry": country,
        "question": format!("Welche Stadt war Verwaltungssitz von {}?", country),
        "options": options,
        "correctAnswerIndex": correct,
        "explanation": "Siehe Kolonialgeschichte."
    })
}

fn service(generator: ScriptedGenerator) -> HistoryService<ScriptedGenerator> {
    HistoryService::new(generator, TerritoryTable::africa())
}

#[test]
fn invalid_questions_are_dropped_and_answers_survive_shuffling() {
    let batch = json!([
        question("Nigeria", "Lagos", 0),
        {
            "relatedCountry": "Kenya",
            "question": "Zu wenige Optionen?",
            "options": ["A", "B", "C"],
            "correctAnswerIndex": 0,
            "explanation": ""
        },
        question("Uganda", "Entebbe", 3),
        {
            "relatedCountry": "Malawi",
            "question": "Index zu groß?",
            "options": ["A", "B", "C", "D"],
            "correctAnswerIndex": 7,
            "explanation": ""
        }
    ]);
    let service = service(ScriptedGenerator::replying(batch));

    let questions = block_on(service.try_fetch_quiz_questions()).expect("two questions remain");

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].related_country, "Nigeria");
    assert_eq!(questions[0].correct_option(), Some("Lagos"));
    assert_eq!(questions[1].correct_option(), Some("Entebbe"));
}

#[test]
fn undecodable_items_do_not_discard_the_batch() {
    let batch = json!([
        question("Kenya", "Nairobi", 0),
        question("Ghana", "Accra", 1),
        {
            "relatedCountry": "Uganda",
            "question": "Negativer Index?",
            "options": ["A", "B", "C", "D"],
            "correctAnswerIndex": -1,
            "explanation": ""
        },
        {
            "question": "Ohne Land?",
            "options": ["A", "B", "C", "D"],
            "correctAnswerIndex": 0
        }
    ]);
    let service = service(ScriptedGenerator::replying(batch));

    let questions = block_on(service.fetch_quiz_questions());

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].correct_option(), Some("Nairobi"));
    assert_eq!(questions[1].correct_option(), Some("Accra"));
    assert!(!questions.contains(&QuizQuestion::fallback()));
}

#[test]
fn batch_of_only_invalid_questions_is_an_error() {
    let batch = json!([{
        "relatedCountry": "Kenya",
        "question": "",
        "options": ["A", "B", "C", "D"],
        "correctAnswerIndex": 0,
        "explanation": ""
    }]);
    let service = service(ScriptedGenerator::replying(batch));

    let error = block_on(service.try_fetch_quiz_questions()).expect_err("nothing usable");

    assert!(matches!(error, ServiceError::NoQuestions));
    assert_eq!(
        block_on(service.fetch_quiz_questions()),
        vec![QuizQuestion::fallback()]
    );
}

#[test]
fn service_failure_yields_fallback_but_detail_fails() {
    let service = service(ScriptedGenerator::failing(GenerationError::MissingApiKey));

    let questions = block_on(service.fetch_quiz_questions());
    assert_eq!(questions, vec![QuizQuestion::fallback()]);

    let detail = block_on(service.fetch_colony_details("Ghana"));
    assert!(matches!(
        detail,
        Err(ServiceError::Generation(GenerationError::MissingApiKey))
    ));
}

#[test]
fn prose_reply_yields_fallback() {
    let service = service(ScriptedGenerator {
        reply: Ok("Hier sind deine Fragen!".to_string()),
        calls: Cell::new(0),
    });

    assert_eq!(
        block_on(service.fetch_quiz_questions()),
        vec![QuizQuestion::fallback()]
    );
}

#[test]
fn full_round_scores_and_grades() {
    let batch = json!([
        question("Nigeria", "Lagos", 0),
        question("Ghana", "Accra", 1),
        question("Kenya", "Nairobi", 2),
        question("Uganda", "Entebbe", 3),
    ]);
    let service = service(ScriptedGenerator::replying(batch));
    let mut state = AppState::new();

    assert!(block_on(open_and_load_quiz(&mut state, &service)));
    assert_eq!(state.quiz().total(), 4);

    // Answer the first three correctly and the last one wrong.
    for round in 0..4 {
        let quiz = state.quiz_mut();
        let question = quiz.current_question().expect("question shown").clone();
        let choice = if round < 3 {
            question.correct_answer_index
        } else {
            (question.correct_answer_index + 1) % 4
        };

        quiz.select(choice).expect("answer accepted");
        quiz.select(question.correct_answer_index)
            .expect("second click is ignored");
        quiz.advance().expect("advance accepted");
    }

    let outcome = state.quiz().outcome().expect("results shown");
    assert_eq!(outcome.score, 3);
    assert_eq!(outcome.total, 4);
    assert_eq!(outcome.threshold, pass_threshold(4));
    assert!(outcome.passed);
}

#[test]
fn reopening_fetches_a_new_batch_and_resets_progress() {
    let service = service(ScriptedGenerator::replying(json!([question(
        "Ghana", "Accra", 1
    )])));
    let mut state = AppState::new();

    block_on(open_and_load_quiz(&mut state, &service));
    state.quiz_mut().select(1).expect("answer accepted");
    assert_eq!(state.quiz().score(), 1);

    block_on(open_and_load_quiz(&mut state, &service));

    assert_eq!(service.generator().calls.get(), 2);
    assert_eq!(state.quiz().phase(), QuizPhase::InProgress);
    assert_eq!(state.quiz().score(), 0);
    assert_eq!(state.quiz().selected(), None);
}

#[test]
fn minimized_quiz_keeps_its_place() {
    let service = service(ScriptedGenerator::replying(json!([
        question("Nigeria", "Lagos", 0),
        question("Ghana", "Accra", 1),
    ])));
    let mut state = AppState::new();
    block_on(open_and_load_quiz(&mut state, &service));

    let quiz = state.quiz_mut();
    let correct = quiz.current_question().expect("question shown").correct_answer_index;
    quiz.select(correct).expect("answer accepted");
    quiz.minimize();

    assert!(state.quiz().is_minimized());
    assert_eq!(state.quiz().phase(), QuizPhase::Answered);
    assert_eq!(state.quiz().score(), 1);

    state.quiz_mut().restore();
    assert_eq!(state.quiz().index(), 0);
    assert_eq!(state.quiz().selected(), Some(correct));

    state.quiz_mut().close();
    assert_eq!(state.quiz().phase(), QuizPhase::Closed);
    assert_eq!(state.quiz().score(), 0);
}
