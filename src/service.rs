use rand::SeedableRng;

use crate::gemini::{GenerateRequest, GenerationError, TextGenerator};
use crate::quiz::shuffle_options;
use crate::record::{ColonyDetail, NOT_A_COLONY_MARKER, QuizQuestion};
use crate::schema::{ResponseSchema, SchemaViolation};
use crate::territory::TerritoryTable;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Schema(#[from] SchemaViolation),
    #[error("service returned no usable quiz questions")]
    NoQuestions,
}

/// Prompt for the historical summary of one modern country.
pub fn detail_prompt(modern_name: &str, colonial_name: Option<&str>) -> String {
    let hint = colonial_name
        .map(|name| format!(" (Historisch bekannt als {})", name))
        .unwrap_or_default();

    format!(
        "Erstelle eine historische Zusammenfassung für das heutige {modern_name}{hint} \
         während seiner Zeit als britische Kolonie oder Protektorat in Afrika.\n\n\
         Falls das Land nie eine britische Kolonie war, gib trotzdem Daten zurück, \
         aber vermerke im Feld \"administrationType\" explizit \"{NOT_A_COLONY_MARKER}\" \
         und lass die anderen Felder leer oder allgemein.\n\n\
         Bitte berücksichtige folgende Punkte:\n\
         1. Allgemeine Beschreibung der Kolonialzeit.\n\
         2. Der Prozess der Kolonialisierung: Wie kam das Gebiet unter britische Kontrolle? \
         (z.B. Verträge, Kriege, Handelsgesellschaften).\n\
         3. Die wichtigsten Rohstoffe oder Güter, die exportiert wurden.\n\n\
         Die Antwort MUSS in validem JSON erfolgen, das dem folgenden Schema entspricht."
    )
}

/// Prompt asking for one question per listed country.
pub fn quiz_prompt(countries: &[&str]) -> String {
    format!(
        "Erstelle ein Quiz über die britischen Kolonien in Afrika.\n\n\
         Ich benötige EXAKT EINE Frage für JEDES der folgenden Länder: {}.\n\n\
         Die Frage soll sich spezifisch auf die Kolonialgeschichte dieses Landes beziehen \
         (z.B. Verwaltung, Exportgüter, Unabhängigkeit, historischer Name).\n\n\
         Jede Frage hat genau 4 Antwortmöglichkeiten.\n\n\
         Die Fragen sollen auf Deutsch sein.",
        countries.join(", ")
    )
}

/// Colonial history lookups backed by a text generator.
pub struct HistoryService<G> {
    generator: G,
    territories: TerritoryTable,
}

impl<G: TextGenerator> HistoryService<G> {
    pub fn new(generator: G, territories: TerritoryTable) -> Self {
        Self {
            generator,
            territories,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn territories(&self) -> &TerritoryTable {
        &self.territories
    }

    /// Fetches the historical summary for a modern country name.
    ///
    /// # Errors
    /// Propagates transport, status and schema failures unchanged.
    pub async fn fetch_colony_details(
        &self,
        modern_name: &str,
    ) -> Result<ColonyDetail, ServiceError> {
        let request = GenerateRequest {
            prompt: detail_prompt(modern_name, self.territories.colonial_hint(modern_name)),
            schema: ResponseSchema::colony_detail(),
        };

        let text = self.generator.generate(&request).await.map_err(|error| {
            log::error!("colony details for {} failed: {}", modern_name, error);
            error
        })?;

        let detail: ColonyDetail = request.schema.parse(&text).map_err(|error| {
            log::error!("colony details for {} rejected: {}", modern_name, error);
            error
        })?;

        if !detail.is_british_colony() {
            log::info!("{} reported as never British-administered", modern_name);
        }

        Ok(detail)
    }

    /// Fetches one question per British colony.
    ///
    /// Each question is checked on its own. Questions that do not match the
    /// schema or break the four-option rule are dropped; options of the rest
    /// are shuffled.
    ///
    /// # Errors
    /// Fails when the request fails or no valid question remains.
    pub async fn try_fetch_quiz_questions(&self) -> Result<Vec<QuizQuestion>, ServiceError> {
        let countries = self.territories.colony_names();
        let request = GenerateRequest {
            prompt: quiz_prompt(&countries),
            schema: ResponseSchema::quiz_batch(),
        };

        let text = self.generator.generate(&request).await?;
        let items = request.schema.parse_each::<QuizQuestion>(&text)?;

        let mut rng = rand::rngs::StdRng::from_entropy();
        let valid: Vec<QuizQuestion> = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let checked = item
                    .map_err(|error| error.to_string())
                    .and_then(|question| match question.validate() {
                        Ok(()) => Ok(question),
                        Err(error) => Err(format!("{}: {}", question.related_country, error)),
                    });

                match checked {
                    Ok(question) => Some(question),
                    Err(reason) => {
                        log::warn!("dropping quiz question {}: {}", index, reason);
                        None
                    }
                }
            })
            .map(|question| shuffle_options(&mut rng, question))
            .collect();

        if valid.is_empty() {
            return Err(ServiceError::NoQuestions);
        }

        Ok(valid)
    }

    /// Like [`Self::try_fetch_quiz_questions`], but never fails: any error
    /// yields the single fallback question.
    pub async fn fetch_quiz_questions(&self) -> Vec<QuizQuestion> {
        match self.try_fetch_quiz_questions().await {
            Ok(questions) => questions,
            Err(error) => {
                log::error!("quiz could not be generated, using fallback: {}", error);
                vec![QuizQuestion::fallback()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_prompt_embeds_name_and_hint() {
        let prompt = detail_prompt("Ghana", Some("Goldküste"));

        assert!(prompt.contains("das heutige Ghana (Historisch bekannt als Goldküste) während"));
        assert!(prompt.contains(NOT_A_COLONY_MARKER));
    }

    #[test]
    fn detail_prompt_without_hint_has_no_parenthesis() {
        let prompt = detail_prompt("Kenya", None);

        assert!(prompt.contains("das heutige Kenya während"));
        assert!(!prompt.contains("Historisch bekannt"));
    }

    #[test]
    fn quiz_prompt_lists_every_country() {
        let table = TerritoryTable::africa();
        let prompt = quiz_prompt(&table.colony_names());

        for name in table.colony_names() {
            assert!(prompt.contains(name), "{name} missing from prompt");
        }
        assert!(prompt.contains("Egypt, Sudan, South Sudan"));
    }
}
