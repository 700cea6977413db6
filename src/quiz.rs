use rand::Rng;
use rand::seq::SliceRandom;

use crate::record::QuizQuestion;

/// Where the quiz modal currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Modal hidden, no quiz state.
    Closed,
    /// Waiting for a question batch.
    Loading,
    /// Current question shown, no answer yet.
    InProgress,
    /// Current question answered, explanation visible.
    Answered,
    /// All questions answered, score shown.
    Results,
}

/// Final score of a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub score: usize,
    pub total: usize,
    /// Points needed to pass: two thirds of the questions, rounded up.
    pub threshold: usize,
    pub passed: bool,
}

impl QuizOutcome {
    pub fn new(score: usize, total: usize) -> Self {
        let threshold = pass_threshold(total);
        Self {
            score,
            total,
            threshold,
            passed: score >= threshold,
        }
    }
}

/// `ceil(total * 2 / 3)`.
pub fn pass_threshold(total: usize) -> usize {
    (total * 2).div_ceil(3)
}

/// Result of picking an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Correct,
    Incorrect,
    /// The question was already answered; nothing changed.
    Locked,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("no question is waiting for an answer while the quiz is {0:?}")]
    NotAnswerable(QuizPhase),
    #[error("option {index} does not exist, the question has {count} options")]
    OptionOutOfRange { index: usize, count: usize },
    #[error("quiz cannot advance while it is {0:?}")]
    CannotAdvance(QuizPhase),
}

/// How an answer option is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    /// Still selectable.
    Open,
    Correct,
    /// The chosen, wrong option.
    Wrong,
    Dimmed,
}

/// Handle for one question batch request. Only the newest ticket is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizTicket {
    generation: u64,
}

/// Turn-based quiz state.
///
/// `minimized` is independent of the phase: hiding the modal keeps every
/// other field untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    phase: QuizPhase,
    minimized: bool,
    questions: Vec<QuizQuestion>,
    index: usize,
    score: usize,
    selected: Option<usize>,
    generation: u64,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            phase: QuizPhase::Closed,
            minimized: false,
            questions: Vec::new(),
            index: 0,
            score: 0,
            selected: None,
            generation: 0,
        }
    }

    /// Opens the modal and starts a fresh batch request, discarding progress.
    pub fn open(&mut self) -> QuizTicket {
        self.reset();
        self.generation += 1;
        self.phase = QuizPhase::Loading;
        QuizTicket {
            generation: self.generation,
        }
    }

    /// Installs a question batch. Returns `false` when the ticket was
    /// superseded by a later open or close.
    pub fn load(&mut self, ticket: QuizTicket, questions: Vec<QuizQuestion>) -> bool {
        if ticket.generation != self.generation || self.phase != QuizPhase::Loading {
            log::debug!("discarding stale quiz batch {}", ticket.generation);
            return false;
        }

        self.questions = questions;
        self.phase = QuizPhase::InProgress;
        true
    }

    /// Locks in an answer for the current question.
    pub fn select(&mut self, option: usize) -> Result<Selection, QuizError> {
        match self.phase {
            QuizPhase::Answered => return Ok(Selection::Locked),
            QuizPhase::InProgress => {}
            other => return Err(QuizError::NotAnswerable(other)),
        }

        let question = self
            .questions
            .get(self.index)
            .ok_or(QuizError::NotAnswerable(self.phase))?;

        if option >= question.options.len() {
            return Err(QuizError::OptionOutOfRange {
                index: option,
                count: question.options.len(),
            });
        }

        let correct = question.is_correct(option);
        self.selected = Some(option);
        self.phase = QuizPhase::Answered;

        if correct {
            self.score += 1;
            Ok(Selection::Correct)
        } else {
            Ok(Selection::Incorrect)
        }
    }

    /// Moves to the next question, or to the results after the last one.
    pub fn advance(&mut self) -> Result<QuizPhase, QuizError> {
        if self.phase != QuizPhase::Answered {
            return Err(QuizError::CannotAdvance(self.phase));
        }

        if self.index + 1 < self.questions.len() {
            self.index += 1;
            self.selected = None;
            self.phase = QuizPhase::InProgress;
        } else {
            self.phase = QuizPhase::Results;
        }

        Ok(self.phase)
    }

    pub fn minimize(&mut self) {
        if self.phase != QuizPhase::Closed {
            self.minimized = true;
        }
    }

    pub fn restore(&mut self) {
        self.minimized = false;
    }

    pub fn toggle_minimized(&mut self) {
        if self.minimized {
            self.restore();
        } else {
            self.minimize();
        }
    }

    /// Closes the modal and clears all progress. Pending batches are dropped.
    pub fn close(&mut self) {
        self.reset();
        self.generation += 1;
    }

    fn reset(&mut self) {
        self.phase = QuizPhase::Closed;
        self.minimized = false;
        self.questions.clear();
        self.index = 0;
        self.score = 0;
        self.selected = None;
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != QuizPhase::Closed
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        match self.phase {
            QuizPhase::InProgress | QuizPhase::Answered => self.questions.get(self.index),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_last_question(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    /// Loaded without any question to ask.
    pub fn is_empty(&self) -> bool {
        matches!(self.phase, QuizPhase::InProgress) && self.questions.is_empty()
    }

    /// Marking of option `index` of the current question.
    pub fn option_mark(&self, index: usize) -> OptionMark {
        let Some(question) = self.current_question() else {
            return OptionMark::Dimmed;
        };

        if self.phase != QuizPhase::Answered {
            return OptionMark::Open;
        }

        if question.is_correct(index) {
            OptionMark::Correct
        } else if self.selected == Some(index) {
            OptionMark::Wrong
        } else {
            OptionMark::Dimmed
        }
    }

    pub fn outcome(&self) -> Option<QuizOutcome> {
        (self.phase == QuizPhase::Results).then(|| QuizOutcome::new(self.score, self.total()))
    }
}

/// Shuffles the answer options of a question, keeping the correct index in
/// step. The model tends to place the answer at the same position.
pub fn shuffle_options<R: Rng + ?Sized>(rng: &mut R, question: QuizQuestion) -> QuizQuestion {
    let QuizQuestion {
        related_country,
        question: text,
        options,
        correct_answer_index,
        explanation,
    } = question;

    let mut tagged: Vec<(usize, String)> = options.into_iter().enumerate().collect();
    tagged.shuffle(rng);

    let correct_answer_index = tagged
        .iter()
        .position(|(original, _)| *original == correct_answer_index)
        .unwrap_or(correct_answer_index);

    QuizQuestion {
        related_country,
        question: text,
        options: tagged.into_iter().map(|(_, option)| option).collect(),
        correct_answer_index,
        explanation,
    }
}
