//! Application state shared by the views.
//!
//! Every detail request is stamped with a generation number. Results for an
//! older generation are dropped, so a slow answer for a previous country can
//! never overwrite the panel of the current one.

use crate::gemini::TextGenerator;
use crate::panel::{DETAIL_ERROR_MESSAGE, DetailState, PanelView, panel_view};
use crate::quiz::{QuizSession, QuizTicket};
use crate::record::{ColonyDetail, QuizQuestion};
use crate::service::{HistoryService, ServiceError};
use crate::territory::TerritoryTable;

/// Pending detail request for one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    generation: u64,
    country: String,
}

impl DetailTicket {
    pub fn country(&self) -> &str {
        &self.country
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    selected: Option<String>,
    detail: DetailState,
    generation: u64,
    quiz: QuizSession,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn detail(&self) -> &DetailState {
        &self.detail
    }

    pub fn panel(&self) -> PanelView {
        panel_view(self.selected(), &self.detail)
    }

    /// Selects a country and starts loading its detail.
    ///
    /// Names are canonicalized through the territory table, so "Republic of
    /// Ghana" selects "Ghana". Re-selecting the current country, or a name
    /// that is no British colony, returns `None` and leaves the state alone.
    pub fn select(&mut self, name: &str, territories: &TerritoryTable) -> Option<DetailTicket> {
        let country = match territories.resolve_name(name) {
            Ok(Some(entry)) if entry.british => entry.name.clone(),
            Ok(_) => {
                log::debug!("ignoring selection of {:?}", name);
                return None;
            }
            Err(error) => {
                log::warn!("ignoring selection: {}", error);
                return None;
            }
        };

        if self.selected.as_deref() == Some(country.as_str()) {
            return None;
        }

        self.generation += 1;
        self.selected = Some(country.clone());
        self.detail = DetailState::Loading;

        Some(DetailTicket {
            generation: self.generation,
            country,
        })
    }

    /// Applies a finished detail request. Returns `false` when a newer
    /// selection superseded it.
    pub fn apply_detail(
        &mut self,
        ticket: &DetailTicket,
        result: Result<ColonyDetail, ServiceError>,
    ) -> bool {
        if ticket.generation != self.generation {
            log::debug!(
                "discarding stale detail for {} (generation {}, current {})",
                ticket.country,
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.detail = match result {
            Ok(detail) => DetailState::Loaded(detail),
            Err(error) => {
                log::error!("detail for {} failed: {}", ticket.country, error);
                DetailState::Failed(DETAIL_ERROR_MESSAGE.to_string())
            }
        };
        true
    }

    pub fn quiz(&self) -> &QuizSession {
        &self.quiz
    }

    pub fn quiz_mut(&mut self) -> &mut QuizSession {
        &mut self.quiz
    }

    /// Opens the quiz with a fresh batch request. Questions are never reused.
    pub fn open_quiz(&mut self) -> QuizTicket {
        self.quiz.open()
    }

    pub fn apply_quiz(&mut self, ticket: QuizTicket, questions: Vec<QuizQuestion>) -> bool {
        self.quiz.load(ticket, questions)
    }
}

/// Runs the request described by `ticket`.
pub async fn load_detail<G: TextGenerator>(
    service: &HistoryService<G>,
    ticket: &DetailTicket,
) -> Result<ColonyDetail, ServiceError> {
    service.fetch_colony_details(ticket.country()).await
}

/// Selects `name` and, when that starts a request, waits for it and applies
/// the result. Returns whether a request was made.
pub async fn select_and_load<G: TextGenerator>(
    state: &mut AppState,
    service: &HistoryService<G>,
    name: &str,
) -> bool {
    let Some(ticket) = state.select(name, service.territories()) else {
        return false;
    };

    let result = load_detail(service, &ticket).await;
    state.apply_detail(&ticket, result);
    true
}

/// Opens the quiz and loads a batch, falling back to the built-in question.
pub async fn open_and_load_quiz<G: TextGenerator>(
    state: &mut AppState,
    service: &HistoryService<G>,
) -> bool {
    let ticket = state.open_quiz();
    let questions = service.fetch_quiz_questions().await;
    state.apply_quiz(ticket, questions)
}
