#![cfg(target_arch = "wasm32")]

use std::rc::Rc;

use leptos::*;
use wasm_bindgen::prelude::wasm_bindgen;

use crate::config::AppConfig;
use crate::controller::{AppState, load_detail};
use crate::gemini::GeminiClient;
use crate::geography::fetch_geography;
use crate::logging;
use crate::map::{COLOR_BASE, COLOR_BRITISH, MAP_HEIGHT, MAP_WIDTH, MapModel};
use crate::panel::{DetailView, PanelView, WELCOME_TEXT, WELCOME_TITLE};
use crate::quiz::{OptionMark, QuizPhase, QuizSession};
use crate::record::{NOT_A_COLONY_MARKER, QuizQuestion};
use crate::service::HistoryService;
use crate::territory::TerritoryTable;

type Service = HistoryService<GeminiClient>;

async fn load_map(url: String, territories: Rc<TerritoryTable>) -> Result<Rc<MapModel>, String> {
    let geography = fetch_geography(&url).await.map_err(|error| {
        log::error!("map data failed: {}", error);
        error.to_string()
    })?;

    let model = MapModel::build(&geography, &territories).map_err(|error| error.to_string())?;
    log::info!(
        "map ready with {} shapes, {} colonies",
        model.shapes().len(),
        model.colony_count()
    );

    Ok(Rc::new(model))
}

#[component]
fn Header(on_start_quiz: Callback<()>) -> impl IntoView {
    view! {
        <header class="page-header">
            <div class="brand">
                <h1 class="headline">"Britische Kolonien in Afrika"</h1>
                <p class="eyebrow">"Interaktive Historische Karte"</p>
            </div>
            <button class="primary" type="button" on:click=move |_| on_start_quiz.call(())>
                "Quiz starten"
            </button>
        </header>
    }
}

#[component]
fn MapSurface(
    model: Rc<MapModel>,
    #[prop(into)] selected: Signal<Option<String>>,
    on_select: Callback<String>,
) -> impl IntoView {
    let (hovered, set_hovered) = create_signal::<Option<usize>>(None);

    let paths = model
        .shapes()
        .iter()
        .enumerate()
        .map(|(index, shape)| {
            let styled = Rc::clone(&model);
            let hovering = Rc::clone(&model);
            let clicked = Rc::clone(&model);

            let style = create_memo(move |_| {
                selected.with(|name| styled.style(index, name.as_deref(), hovered.get()))
            });

            view! {
                <path
                    d=shape.path.clone()
                    aria-label=shape.label()
                    fill=move || style.get().fill
                    stroke=move || style.get().stroke
                    stroke-width=move || style.get().stroke_width.to_string()
                    fill-opacity=move || style.get().fill_opacity.to_string()
                    style=move || {
                        if style.get().interactive {
                            "cursor: pointer"
                        } else {
                            "cursor: default"
                        }
                    }
                    on:mouseenter=move |_| set_hovered.set(hovering.hover(index))
                    on:mouseleave=move |_| set_hovered.set(None)
                    on:click=move |_| {
                        if let Some(name) = clicked.click(index) {
                            on_select.call(name);
                        }
                    }
                ></path>
            }
        })
        .collect_view();

    view! {
        <svg
            class="africa-map"
            viewBox=format!("0 0 {} {}", MAP_WIDTH, MAP_HEIGHT)
            preserveAspectRatio="xMidYMid meet"
        >
            <g>{paths}</g>
        </svg>
        <div class="map-legend">
            <span class="legend-item">
                <span class="swatch" style=format!("background: {}", COLOR_BRITISH)></span>
                "Britische Kolonie"
            </span>
            <span class="legend-item">
                <span class="swatch" style=format!("background: {}", COLOR_BASE)></span>
                "Andere"
            </span>
        </div>
    }
}

#[component]
fn AfricaMap(
    geojson_url: String,
    territories: Rc<TerritoryTable>,
    #[prop(into)] selected: Signal<Option<String>>,
    on_select: Callback<String>,
) -> impl IntoView {
    let (retry, set_retry) = create_signal(0u32);

    let map = create_local_resource(
        move || retry.get(),
        move |attempt| {
            let url = geojson_url.clone();
            let territories = Rc::clone(&territories);
            if attempt > 0 {
                log::info!("retrying map download, attempt {}", attempt + 1);
            }
            load_map(url, territories)
        },
    );

    view! {
        <div class="map-frame">
            {move || match map.get() {
                None => view! { <div class="map-status">"Lade Karte..."</div> }.into_view(),
                Some(Err(message)) => view! {
                    <div class="map-error">
                        <p class="map-error-title">"Karte konnte nicht geladen werden"</p>
                        <p class="map-error-detail">{message}</p>
                        <button class="primary" type="button" on:click=move |_| set_retry.update(|count| *count += 1)>
                            "Erneut versuchen"
                        </button>
                    </div>
                }
                .into_view(),
                Some(Ok(model)) => view! {
                    <MapSurface model=model selected=selected on_select=on_select />
                }
                .into_view(),
            }}
        </div>
    }
}

#[component]
fn DetailCard(detail: DetailView) -> impl IntoView {
    let DetailView {
        name,
        modern_name,
        period,
        administration,
        description,
        colonization,
        export_goods,
        timeline,
        british,
    } = detail;

    let colonization = colonization.map(|text| {
        view! {
            <section class="detail-section muted">
                <h3>"Kolonialisierungsprozess"</h3>
                <p>{text}</p>
            </section>
        }
    });

    let goods = (!export_goods.is_empty()).then(|| {
        view! {
            <section class="detail-section goods">
                <h3>"Wichtigste Exportgüter"</h3>
                <div class="chips">
                    {export_goods
                        .into_iter()
                        .map(|good| view! { <span class="chip">{good}</span> })
                        .collect_view()}
                </div>
            </section>
        }
    });

    let title = administration.clone();

    view! {
        <article class="detail">
            <div class="detail-header">
                <h2>{name}</h2>
                <p class="detail-modern">{modern_name}</p>
                {(!british).then(|| view! { <p class="detail-note">{NOT_A_COLONY_MARKER}</p> })}
                <div class="detail-facts">
                    <div class="fact">
                        <span class="fact-label">"Zeitraum"</span>
                        <span class="fact-value">{period}</span>
                    </div>
                    <div class="fact">
                        <span class="fact-label">"Verwaltung"</span>
                        <span class="fact-value" title=title>{administration}</span>
                    </div>
                </div>
            </div>
            <div class="detail-body">
                <section class="detail-section">
                    <h3>"Überblick"</h3>
                    <p>{description}</p>
                </section>
                {colonization}
                {goods}
                <section class="detail-section">
                    <h3>"Schlüsselereignisse"</h3>
                    <ol class="timeline">
                        {timeline
                            .into_iter()
                            .map(|event| {
                                view! {
                                    <li class="timeline-entry">
                                        <span class="timeline-year">{event.year}</span>
                                        <p>{event.description}</p>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ol>
                </section>
            </div>
        </article>
    }
}

#[component]
fn InfoPanel(#[prop(into)] panel: Signal<PanelView>) -> impl IntoView {
    view! {
        <aside class="info-panel">
            {move || match panel.get() {
                PanelView::Welcome => view! {
                    <div class="panel-welcome">
                        <h3>{WELCOME_TITLE}</h3>
                        <p>{WELCOME_TEXT}</p>
                    </div>
                }
                .into_view(),
                PanelView::Loading => view! {
                    <div class="panel-loading">
                        <div class="spinner"></div>
                        <p>"Lade historische Daten..."</p>
                    </div>
                }
                .into_view(),
                PanelView::Error(message) => view! {
                    <div class="panel-error">
                        <p class="panel-error-title">"Ein Fehler ist aufgetreten."</p>
                        <p>{message}</p>
                    </div>
                }
                .into_view(),
                PanelView::Detail(detail) => view! { <DetailCard detail=*detail /> }.into_view(),
                PanelView::Empty => ().into_view(),
            }}
        </aside>
    }
}

fn choose(state: RwSignal<AppState>, index: usize) {
    state.update(|app| match app.quiz_mut().select(index) {
        Ok(selection) => log::debug!("option {} -> {:?}", index, selection),
        Err(error) => log::warn!("answer ignored: {}", error),
    });
}

fn advance(state: RwSignal<AppState>) {
    state.update(|app| {
        if let Err(error) = app.quiz_mut().advance() {
            log::warn!("{}", error);
        }
    });
}

fn option_class(mark: OptionMark) -> &'static str {
    match mark {
        OptionMark::Open => "quiz-option",
        OptionMark::Correct => "quiz-option correct",
        OptionMark::Wrong => "quiz-option wrong",
        OptionMark::Dimmed => "quiz-option dimmed",
    }
}

fn question_view(state: RwSignal<AppState>, session: &QuizSession, question: &QuizQuestion) -> View {
    let answered = session.phase() == QuizPhase::Answered;

    let options = question
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            view! {
                <button
                    class=option_class(session.option_mark(index))
                    type="button"
                    disabled=answered
                    on:click=move |_| choose(state, index)
                >
                    {option.clone()}
                </button>
            }
        })
        .collect_view();

    let footer = if answered {
        let next_label = if session.is_last_question() {
            "Ergebnisse anzeigen"
        } else {
            "Nächste Frage"
        };

        view! {
            <div class="quiz-explanation">
                <span class="quiz-explanation-title">"Erklärung:"</span>
                {question.explanation.clone()}
            </div>
            <button class="primary wide" type="button" on:click=move |_| advance(state)>
                {next_label}
            </button>
        }
        .into_view()
    } else {
        view! {
            <p class="quiz-tip">"Tipp: Minimiere das Quiz, um auf der Karte nachzuschauen!"</p>
        }
        .into_view()
    };

    let topic = (!question.related_country.is_empty())
        .then(|| view! { <span class="quiz-topic">{format!("Thema: {}", question.related_country)}</span> });

    view! {
        <div class="quiz-progress">
            <div>
                <span class="quiz-counter">
                    {format!("Frage {} / {}", session.index() + 1, session.total())}
                </span>
                {topic}
            </div>
            <span class="quiz-score">{format!("Punkte: {}", session.score())}</span>
        </div>
        <h3 class="quiz-question">{question.question.clone()}</h3>
        <div class="quiz-options">{options}</div>
        {footer}
    }
    .into_view()
}

fn results_view(state: RwSignal<AppState>, session: &QuizSession) -> View {
    let Some(outcome) = session.outcome() else {
        return ().into_view();
    };

    let (title, note, action) = if outcome.passed {
        (
            "Herzlichen Glückwunsch!",
            "Du hast das Quiz erfolgreich gemeistert.",
            "Schließen",
        )
    } else {
        (
            "Das hat leider nicht gereicht. Viel Erfolg beim nächsten Mal!",
            "Du benötigst zwei Drittel der Punkte, um zu bestehen.",
            "Nochmal versuchen",
        )
    };

    view! {
        <div class="quiz-results" class:passed=outcome.passed>
            <h3>{title}</h3>
            <p>{note}</p>
            <div class="quiz-tally">
                <span>{format!("Dein Ergebnis: {} / {}", outcome.score, outcome.total)}</span>
                <span>{format!("Benötigt: {}", outcome.threshold)}</span>
            </div>
            <button class="primary wide" type="button" on:click=move |_| state.update(|app| app.quiz_mut().close())>
                {action}
            </button>
        </div>
    }
    .into_view()
}

#[component]
fn QuizModal(state: RwSignal<AppState>) -> impl IntoView {
    let session = create_memo(move |_| state.with(|app| app.quiz().clone()));

    move || {
        let session = session.get();
        if !session.is_open() {
            return ().into_view();
        }

        if session.is_minimized() {
            return view! {
                <button class="quiz-paused" type="button" on:click=move |_| state.update(|app| app.quiz_mut().restore())>
                    <span class="quiz-paused-title">"Quiz pausiert"</span>
                    <span class="quiz-paused-hint">"Klicken zum Fortsetzen"</span>
                </button>
            }
            .into_view();
        }

        let body = match (session.phase(), session.current_question()) {
            (QuizPhase::Loading, _) => view! {
                <div class="quiz-loading">
                    <div class="spinner"></div>
                    <p>"Erstelle Fragen für alle Kolonien..."</p>
                </div>
            }
            .into_view(),
            (QuizPhase::Results, _) => results_view(state, &session),
            (_, Some(question)) => question_view(state, &session, question),
            _ => view! { <p class="quiz-empty">"Keine Fragen verfügbar."</p> }.into_view(),
        };

        view! {
            <div class="quiz-overlay">
                <div class="quiz-card">
                    <div class="quiz-header">
                        <h2>"Wissens-Quiz"</h2>
                        <div class="quiz-controls">
                            <button
                                type="button"
                                title="Quiz pausieren & Karte nutzen"
                                on:click=move |_| state.update(|app| app.quiz_mut().minimize())
                            >
                                "–"
                            </button>
                            <button
                                type="button"
                                title="Quiz beenden"
                                on:click=move |_| state.update(|app| app.quiz_mut().close())
                            >
                                "×"
                            </button>
                        </div>
                    </div>
                    <div class="quiz-body">{body}</div>
                </div>
            </div>
        }
        .into_view()
    }
}

#[component]
fn App() -> impl IntoView {
    let config = AppConfig::from_build_env();
    if config.api_key.is_none() {
        log::warn!("API_KEY was not set at build time, history requests will fail");
    }

    let territories = Rc::new(TerritoryTable::africa());
    let geojson_url = config.geojson_url.clone();
    let service: Rc<Service> = Rc::new(HistoryService::new(
        GeminiClient::new(config),
        TerritoryTable::clone(&territories),
    ));

    let state = create_rw_signal(AppState::new());

    let on_select = {
        let service = Rc::clone(&service);

        Callback::new(move |name: String| {
            let ticket = state
                .try_update(|app| app.select(&name, service.territories()))
                .flatten();

            if let Some(ticket) = ticket {
                let service = Rc::clone(&service);
                spawn_local(async move {
                    let result = load_detail(&service, &ticket).await;
                    state.update(|app| {
                        app.apply_detail(&ticket, result);
                    });
                });
            }
        })
    };

    let start_quiz = {
        let service = Rc::clone(&service);

        Callback::new(move |_| {
            let Some(ticket) = state.try_update(AppState::open_quiz) else {
                return;
            };

            let service = Rc::clone(&service);
            spawn_local(async move {
                let questions = service.fetch_quiz_questions().await;
                state.update(|app| {
                    app.apply_quiz(ticket, questions);
                });
            });
        })
    };

    let selected = Signal::derive(move || state.with(|app| app.selected().map(str::to_string)));
    let panel = Signal::derive(move || state.with(AppState::panel));

    view! {
        <div class="page">
            <Header on_start_quiz=start_quiz />
            <main class="layout">
                <section class="map-column">
                    <AfricaMap
                        geojson_url=geojson_url
                        territories=territories
                        selected=selected
                        on_select=on_select
                    />
                </section>
                <InfoPanel panel=panel />
            </main>
            <QuizModal state=state />
        </div>
    }
}

/// Mounts the application into the document body. Exported so a page can
/// load the `cdylib` build directly.
#[wasm_bindgen]
pub fn start() {
    console_error_panic_hook::set_once();
    logging::init(logging::default_level());
    mount_to_body(|| view! { <App /> });
}
