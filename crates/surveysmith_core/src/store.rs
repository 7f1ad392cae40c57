//! crates/surveysmith_core/src/store.rs
//!
//! The mapping between the hierarchical `SurveyDocument` and the flat row
//! shape both persistence tiers share, plus the ephemeral (client-local)
//! tier itself. The durable tier lives behind the `DatabaseService` port;
//! both tiers move documents through the same `flatten`/`reconstruct` pair,
//! so formatters and validators never learn which tier a document came from.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{section_title, GenerationConfig, Question, QuestionType, Section, SurveyDocument};
use crate::validate::{question_body_from_parts, ValidationError};

//=========================================================================================
// Flat Row Shape
//=========================================================================================

/// One flattened question row: the stable field vocabulary the durable tier
/// exposes for reconstruction. `order_index` is the 0-based global ordinal of
/// the question across all sections in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRow {
    pub section_id: String,
    pub question_id: String,
    pub text: String,
    pub question_type: QuestionType,
    pub options: Option<Value>,
    pub config: Option<Value>,
    pub rationale: String,
    pub order_index: i32,
}

/// Flattens a validated document into ordered rows.
///
/// The global ordinal is derived from position in the flattened iteration,
/// never from a counter shared across calls.
pub fn flatten(document: &SurveyDocument) -> Vec<QuestionRow> {
    document
        .sections
        .iter()
        .flat_map(|section| {
            section
                .questions
                .iter()
                .map(move |question| (section.section_id.as_str(), question))
        })
        .enumerate()
        .map(|(index, (section_id, question))| QuestionRow {
            section_id: section_id.to_string(),
            question_id: question.id.clone(),
            text: question.text.clone(),
            question_type: question.body.question_type(),
            options: question.body.options_json(),
            config: question.body.config_json(),
            rationale: question.rationale.clone(),
            order_index: index as i32,
        })
        .collect()
}

/// Rebuilds a document from flat rows: sorts by the stored order index,
/// groups by section id preserving first-seen order, and resolves display
/// titles through the fixed lookup table. The exact inverse of `flatten` for
/// any document that passed validation.
///
/// Row payloads pass through the same per-variant checks as provider output,
/// so a corrupted row is rejected rather than smuggled into the typed model.
pub fn reconstruct(rows: &[QuestionRow]) -> Result<SurveyDocument, ValidationError> {
    if rows.is_empty() {
        return Err(ValidationError::Shape(
            "no question rows to reconstruct".to_string(),
        ));
    }

    let mut ordered: Vec<&QuestionRow> = rows.iter().collect();
    ordered.sort_by_key(|row| row.order_index);

    let mut sections: Vec<Section> = Vec::new();
    for row in ordered {
        let body = question_body_from_parts(
            row.question_type,
            row.options.as_ref(),
            row.config.as_ref(),
        )
        .map_err(|message| ValidationError::Schema {
            location: format!(
                "section `{}`, question `{}`",
                row.section_id, row.question_id
            ),
            message,
        })?;
        let question = Question {
            id: row.question_id.clone(),
            text: row.text.clone(),
            body,
            rationale: row.rationale.clone(),
        };
        match sections
            .iter_mut()
            .find(|section| section.section_id == row.section_id)
        {
            Some(section) => section.questions.push(question),
            None => sections.push(Section {
                section_id: row.section_id.clone(),
                title: section_title(&row.section_id),
                questions: vec![question],
            }),
        }
    }

    Ok(SurveyDocument { sections })
}

//=========================================================================================
// Ephemeral Tier
//=========================================================================================

/// Reserved id prefix distinguishing ephemeral-tier surveys from durable ids.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// Retention cap for the ephemeral tier; the oldest entry is evicted first.
pub const LOCAL_SURVEY_CAP: usize = 50;

/// An ephemeral-tier survey: the same logical shape as a persisted one, plus
/// the full original configuration so it can later be promoted to the
/// durable tier.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemeralSurvey {
    pub id: String,
    pub config: GenerationConfig,
    pub document: SurveyDocument,
    pub created_at: DateTime<Utc>,
}

/// Identity-independent, capacity-capped local storage for surveys generated
/// without a signed-in user. Confined to a single client context; entries
/// leave by explicit deletion or by promotion to the durable tier.
#[derive(Debug, Default)]
pub struct EphemeralStore {
    entries: Vec<EphemeralSurvey>,
}

impl EphemeralStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an id belongs to the ephemeral tier.
    pub fn is_local_id(id: &str) -> bool {
        id.starts_with(LOCAL_ID_PREFIX)
    }

    /// Stores a survey and returns its locally-generated id. Inserting past
    /// the cap evicts the oldest entries, FIFO by insertion.
    pub fn save(&mut self, config: GenerationConfig, document: SurveyDocument) -> String {
        let id = format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4());
        self.entries.push(EphemeralSurvey {
            id: id.clone(),
            config,
            document,
            created_at: Utc::now(),
        });
        if self.entries.len() > LOCAL_SURVEY_CAP {
            let excess = self.entries.len() - LOCAL_SURVEY_CAP;
            self.entries.drain(..excess);
        }
        id
    }

    pub fn get(&self, id: &str) -> Option<&EphemeralSurvey> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[EphemeralSurvey] {
        &self.entries
    }

    /// Removes an entry; returns whether it existed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() < before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DemographicsDepth, InputSize, QuestionBody, RankMode};
    use pretty_assertions::assert_eq;

    fn question(id: &str, body: QuestionBody) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Question {id}"),
            body,
            rationale: format!("Rationale for {id}"),
        }
    }

    fn document() -> SurveyDocument {
        SurveyDocument {
            sections: vec![
                Section {
                    section_id: "screeners".into(),
                    title: "Screeners".into(),
                    questions: vec![question(
                        "q1",
                        QuestionBody::SingleChoice {
                            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                            allow_other: true,
                        },
                    )],
                },
                Section {
                    section_id: "core".into(),
                    title: "Core Questions".into(),
                    questions: vec![
                        question(
                            "q2",
                            QuestionBody::LikertScale {
                                scale_min: Some(1),
                                scale_max: Some(5),
                                scale_labels: vec!["Low".into(), "High".into()],
                            },
                        ),
                        question(
                            "q3",
                            QuestionBody::RankOrder {
                                options: vec!["X".into(), "Y".into(), "Z".into(), "W".into()],
                                rank_mode: Some(RankMode::TopN(2)),
                            },
                        ),
                    ],
                },
                Section {
                    section_id: "pricing_or_attitudes".into(),
                    title: "Pricing / Attitudes".into(),
                    questions: vec![
                        question(
                            "q4",
                            QuestionBody::NumericInput {
                                min: Some(0.0),
                                max: Some(100.0),
                                unit: Some("USD".into()),
                            },
                        ),
                        question(
                            "q5",
                            QuestionBody::OpenText {
                                input_size: Some(InputSize::Long),
                            },
                        ),
                    ],
                },
            ],
        }
    }

    fn config() -> GenerationConfig {
        GenerationConfig {
            brand_name: "Acme".into(),
            brand_description: "d".into(),
            brand_category: "c".into(),
            brand_market: "m".into(),
            survey_context: "ctx".into(),
            survey_goals: "g".into(),
            target_audience: "a".into(),
            number_of_questions: 5,
            include_demographics: false,
            demographics_depth: DemographicsDepth::Standard,
            include_followup: false,
            capture_contact: false,
            business_type: None,
        }
    }

    #[test]
    fn flatten_assigns_a_continuous_zero_based_ordinal() {
        let rows = flatten(&document());
        assert_eq!(rows.len(), 5);
        let indices: Vec<i32> = rows.iter().map(|r| r.order_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(rows[0].section_id, "screeners");
        assert_eq!(rows[2].section_id, "core");
        assert_eq!(rows[4].section_id, "pricing_or_attitudes");
    }

    #[test]
    fn flatten_emits_the_stable_row_vocabulary() {
        let rows = flatten(&document());
        assert_eq!(rows[0].question_id, "q1");
        assert_eq!(rows[0].question_type, QuestionType::SingleChoice);
        assert_eq!(
            rows[0].options,
            Some(serde_json::json!(["A", "B", "C", "D"]))
        );
        assert_eq!(rows[0].config, Some(serde_json::json!({ "allow_other": true })));
        assert_eq!(rows[4].options, None);
        assert_eq!(
            rows[4].config,
            Some(serde_json::json!({ "input_size": "long" }))
        );
    }

    #[test]
    fn reconstruct_is_the_exact_inverse_of_flatten() {
        let original = document();
        let rows = flatten(&original);
        let rebuilt = reconstruct(&rows).unwrap();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn reconstruct_reorders_rows_by_the_stored_index() {
        let mut rows = flatten(&document());
        rows.reverse();
        let rebuilt = reconstruct(&rows).unwrap();
        assert_eq!(rebuilt, document());
    }

    #[test]
    fn reconstruct_titles_unknown_sections_by_capitalizing_the_slug() {
        let mut rows = flatten(&document());
        for row in &mut rows {
            row.section_id = "brand_recall".into();
        }
        let rebuilt = reconstruct(&rows).unwrap();
        assert_eq!(rebuilt.sections.len(), 1);
        assert_eq!(rebuilt.sections[0].title, "Brand_recall");
    }

    #[test]
    fn reconstruct_rejects_an_empty_row_set() {
        assert!(matches!(
            reconstruct(&[]),
            Err(ValidationError::Shape(_))
        ));
    }

    #[test]
    fn reconstruct_rejects_a_corrupted_row() {
        let mut rows = flatten(&document());
        rows[0].options = None;
        let err = reconstruct(&rows).unwrap_err();
        assert!(matches!(err, ValidationError::Schema { .. }), "{err:?}");
    }

    #[test]
    fn ephemeral_ids_carry_the_reserved_prefix() {
        let mut store = EphemeralStore::new();
        let id = store.save(config(), document());
        assert!(EphemeralStore::is_local_id(&id));
        assert!(!EphemeralStore::is_local_id("8b5c8f2e-c3f1-4a2e-9d6f-000000000000"));
    }

    #[test]
    fn ephemeral_store_keeps_the_original_config_for_promotion() {
        let mut store = EphemeralStore::new();
        let id = store.save(config(), document());
        let entry = store.get(&id).unwrap();
        assert_eq!(entry.config, config());
        assert_eq!(entry.document, document());
    }

    #[test]
    fn ephemeral_store_evicts_the_oldest_entry_past_the_cap() {
        let mut store = EphemeralStore::new();
        let first = store.save(config(), document());
        for _ in 0..LOCAL_SURVEY_CAP {
            store.save(config(), document());
        }
        assert_eq!(store.len(), LOCAL_SURVEY_CAP);
        assert!(store.get(&first).is_none(), "oldest entry should be evicted");
    }

    #[test]
    fn ephemeral_delete_removes_only_the_named_entry() {
        let mut store = EphemeralStore::new();
        let keep = store.save(config(), document());
        let drop = store.save(config(), document());
        assert!(store.delete(&drop));
        assert!(!store.delete(&drop));
        assert!(store.get(&keep).is_some());
        assert_eq!(store.len(), 1);
    }
}
