use std::fmt;

/// Marker written into `administrationType` when the requested country was never
/// under British administration.
pub const NOT_A_COLONY_MARKER: &str = "Keine britische Kolonie";

/// Number of answer options every quiz question carries.
pub const QUIZ_OPTION_COUNT: usize = 4;

/// A dated entry on the colonial timeline.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoricalEvent {
    pub year: String,
    pub description: String,
}

/// Historical summary of one territory during British rule.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColonyDetail {
    /// Historical name of the colony or protectorate.
    pub name: String,
    /// German name of the modern country.
    pub german_name: String,
    /// Modern country name.
    pub modern_name: String,
    /// Period of British rule, free text such as "1874–1957".
    pub period: String,
    /// Kind of administration (crown colony, protectorate, ...).
    pub administration_type: String,
    /// General summary of the colonial era.
    pub description: String,
    /// How the territory came under British control.
    #[serde(default)]
    pub colonization_text: String,
    /// Most important export goods.
    #[serde(default)]
    pub export_goods: Vec<String>,
    /// Key events in chronological order.
    #[serde(default)]
    pub important_events: Vec<HistoricalEvent>,
}

impl ColonyDetail {
    /// Returns `false` when the service flagged the country as never having
    /// been a British colony.
    pub fn is_british_colony(&self) -> bool {
        self.administration_type.trim() != NOT_A_COLONY_MARKER
    }

    /// Heading label that shows the historical and the modern name when they differ.
    pub fn heading(&self) -> String {
        if self.name.trim().is_empty() || self.name == self.modern_name {
            self.modern_name.clone()
        } else {
            format!("{} ({})", self.name, self.modern_name)
        }
    }
}

impl fmt::Display for ColonyDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.heading(), self.period)
    }
}

/// One multiple-choice question of the colonial history quiz.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// Country the question is about.
    #[serde(default)]
    pub related_country: String,
    pub question: String,
    /// Answer options. Always [`QUIZ_OPTION_COUNT`] entries once validated.
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question must have exactly {expected} options but has {actual}")]
    WrongOptionCount { expected: usize, actual: usize },
    #[error("correct answer index {index} is outside 0..{count}")]
    AnswerOutOfRange { index: usize, count: usize },
    #[error("question text is empty")]
    EmptyQuestion,
}

impl QuizQuestion {
    /// Checks the four-option and answer-range invariants.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.question.trim().is_empty() {
            return Err(QuestionError::EmptyQuestion);
        }

        if self.options.len() != QUIZ_OPTION_COUNT {
            return Err(QuestionError::WrongOptionCount {
                expected: QUIZ_OPTION_COUNT,
                actual: self.options.len(),
            });
        }

        if self.correct_answer_index >= QUIZ_OPTION_COUNT {
            return Err(QuestionError::AnswerOutOfRange {
                index: self.correct_answer_index,
                count: QUIZ_OPTION_COUNT,
            });
        }

        Ok(())
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_answer_index
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options
            .get(self.correct_answer_index)
            .map(String::as_str)
    }

    /// Question served when the quiz service cannot produce a batch.
    pub fn fallback() -> Self {
        Self {
            related_country: "Ghana".to_string(),
            question: "Welches heutige Land war als 'Goldküste' bekannt?".to_string(),
            options: vec![
                "Nigeria".to_string(),
                "Ghana".to_string(),
                "Kenia".to_string(),
                "Sierra Leone".to_string(),
            ],
            correct_answer_index: 1,
            explanation: "Ghana war während der Kolonialzeit als Goldküste bekannt. \
                          (Hinweis: API Key fehlt oder Fehler aufgetreten)"
                .to_string(),
        }
    }
}
