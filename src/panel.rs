use crate::record::{ColonyDetail, HistoricalEvent};

pub const DETAIL_ERROR_MESSAGE: &str =
    "Daten konnten nicht geladen werden. Bitte versuchen Sie es später erneut.";

pub const WELCOME_TITLE: &str = "Willkommen";
pub const WELCOME_TEXT: &str =
    "Wählen Sie ein rot markiertes Land auf der Karte aus, um die koloniale Geschichte zu erkunden.";

/// Fetch state of the detail record for the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailState {
    #[default]
    Idle,
    Loading,
    Failed(String),
    Loaded(ColonyDetail),
}

impl DetailState {
    pub fn is_loading(&self) -> bool {
        matches!(self, DetailState::Loading)
    }

    pub fn detail(&self) -> Option<&ColonyDetail> {
        match self {
            DetailState::Loaded(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Everything the info panel shows for a loaded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub name: String,
    pub modern_name: String,
    pub period: String,
    pub administration: String,
    pub description: String,
    pub colonization: Option<String>,
    pub export_goods: Vec<String>,
    pub timeline: Vec<HistoricalEvent>,
    pub british: bool,
}

impl From<&ColonyDetail> for DetailView {
    fn from(detail: &ColonyDetail) -> Self {
        let colonization = Some(detail.colonization_text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        Self {
            name: detail.name.clone(),
            modern_name: detail.modern_name.clone(),
            period: detail.period.clone(),
            administration: detail.administration_type.clone(),
            description: detail.description.clone(),
            colonization,
            export_goods: detail
                .export_goods
                .iter()
                .filter(|good| !good.trim().is_empty())
                .cloned()
                .collect(),
            timeline: detail.important_events.clone(),
            british: detail.is_british_colony(),
        }
    }
}

/// What the info panel renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelView {
    Welcome,
    Loading,
    Error(String),
    Detail(Box<DetailView>),
    /// Selection exists but nothing has been requested for it.
    Empty,
}

/// Derives the panel contents. With no selection the welcome text wins over
/// any leftover fetch state.
pub fn panel_view(selected: Option<&str>, state: &DetailState) -> PanelView {
    if selected.is_none() {
        return PanelView::Welcome;
    }

    match state {
        DetailState::Idle => PanelView::Empty,
        DetailState::Loading => PanelView::Loading,
        DetailState::Failed(message) => PanelView::Error(message.clone()),
        DetailState::Loaded(detail) => PanelView::Detail(Box::new(DetailView::from(detail))),
    }
}
