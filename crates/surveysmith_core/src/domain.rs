//! crates/surveysmith_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database, with one deliberate
//! exception: the survey document types implement `Serialize` so they can be
//! rendered back into the wire shape the provider contract and the HTTP layer
//! speak. They do NOT implement `Deserialize`; the only way to obtain a
//! `SurveyDocument` from untrusted text is the validator in `validate.rs`.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

//=========================================================================================
// Question Schema & Type Model
//=========================================================================================

/// The closed set of question types a survey instrument may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    LikertScale,
    RankOrder,
    OpenText,
    NumericInput,
}

impl QuestionType {
    /// All six variants, in the order the generation prompt enumerates them.
    pub const ALL: [QuestionType; 6] = [
        QuestionType::SingleChoice,
        QuestionType::MultiChoice,
        QuestionType::LikertScale,
        QuestionType::RankOrder,
        QuestionType::OpenText,
        QuestionType::NumericInput,
    ];

    /// The wire name of this type (`SINGLE_CHOICE`, `LIKERT_SCALE`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "SINGLE_CHOICE",
            QuestionType::MultiChoice => "MULTI_CHOICE",
            QuestionType::LikertScale => "LIKERT_SCALE",
            QuestionType::RankOrder => "RANK_ORDER",
            QuestionType::OpenText => "OPEN_TEXT",
            QuestionType::NumericInput => "NUMERIC_INPUT",
        }
    }

    /// Parses a wire name. Unrecognized names are `None`; the validator turns
    /// that into a schema rejection rather than a silent fallthrough.
    pub fn from_wire(s: &str) -> Option<QuestionType> {
        QuestionType::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranking mode for `RANK_ORDER` questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMode {
    /// Respondents rank every option.
    All,
    /// Respondents rank only their top `n` options.
    TopN(u32),
}

/// Rendering hint for `OPEN_TEXT` questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSize {
    Short,
    Long,
}

impl InputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputSize::Short => "short",
            InputSize::Long => "long",
        }
    }
}

/// The variant-specific payload of a question.
///
/// A closed tagged union over the six question types: the validator and both
/// export formatters dispatch on it with exhaustive `match`es, so a seventh
/// type is a compile-time-visible gap rather than a silent fallthrough.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionBody {
    SingleChoice {
        options: Vec<String>,
        allow_other: bool,
    },
    MultiChoice {
        options: Vec<String>,
        allow_other: bool,
        min_choices: Option<u32>,
        max_choices: Option<u32>,
    },
    LikertScale {
        /// Lower scale bound as provided; renderers default to 1 when absent.
        scale_min: Option<i64>,
        /// Upper scale bound as provided; renderers default to 5 when absent.
        scale_max: Option<i64>,
        /// Endpoint labels, first = lowest, last = highest. Renderers fall
        /// back to a generic pair when fewer than two are provided.
        scale_labels: Vec<String>,
    },
    RankOrder {
        options: Vec<String>,
        rank_mode: Option<RankMode>,
    },
    OpenText {
        input_size: Option<InputSize>,
    },
    NumericInput {
        min: Option<f64>,
        max: Option<f64>,
        unit: Option<String>,
    },
}

impl QuestionBody {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionBody::SingleChoice { .. } => QuestionType::SingleChoice,
            QuestionBody::MultiChoice { .. } => QuestionType::MultiChoice,
            QuestionBody::LikertScale { .. } => QuestionType::LikertScale,
            QuestionBody::RankOrder { .. } => QuestionType::RankOrder,
            QuestionBody::OpenText { .. } => QuestionType::OpenText,
            QuestionBody::NumericInput { .. } => QuestionType::NumericInput,
        }
    }

    /// The wire `options` field: a JSON array for the option-carrying
    /// variants, `None` for the rest.
    pub fn options_json(&self) -> Option<serde_json::Value> {
        match self {
            QuestionBody::SingleChoice { options, .. }
            | QuestionBody::MultiChoice { options, .. }
            | QuestionBody::RankOrder { options, .. } => Some(serde_json::json!(options)),
            QuestionBody::LikertScale { .. }
            | QuestionBody::OpenText { .. }
            | QuestionBody::NumericInput { .. } => None,
        }
    }

    /// The wire `config` field: a JSON object holding only the settings that
    /// are actually set, or `None` when nothing is.
    pub fn config_json(&self) -> Option<serde_json::Value> {
        let mut config = serde_json::Map::new();
        match self {
            QuestionBody::SingleChoice { allow_other, .. } => {
                if *allow_other {
                    config.insert("allow_other".into(), serde_json::json!(true));
                }
            }
            QuestionBody::MultiChoice {
                allow_other,
                min_choices,
                max_choices,
                ..
            } => {
                if *allow_other {
                    config.insert("allow_other".into(), serde_json::json!(true));
                }
                if let Some(min) = min_choices {
                    config.insert("min_choices".into(), serde_json::json!(min));
                }
                if let Some(max) = max_choices {
                    config.insert("max_choices".into(), serde_json::json!(max));
                }
            }
            QuestionBody::LikertScale {
                scale_min,
                scale_max,
                scale_labels,
            } => {
                if let Some(min) = scale_min {
                    config.insert("scale_min".into(), serde_json::json!(min));
                }
                if let Some(max) = scale_max {
                    config.insert("scale_max".into(), serde_json::json!(max));
                }
                if !scale_labels.is_empty() {
                    config.insert("scale_labels".into(), serde_json::json!(scale_labels));
                }
            }
            QuestionBody::RankOrder { rank_mode, .. } => match rank_mode {
                Some(RankMode::All) => {
                    config.insert("rank_mode".into(), serde_json::json!("all"));
                }
                Some(RankMode::TopN(n)) => {
                    config.insert("rank_mode".into(), serde_json::json!("top_n"));
                    config.insert("top_n".into(), serde_json::json!(n));
                }
                None => {}
            },
            QuestionBody::OpenText { input_size } => {
                if let Some(size) = input_size {
                    config.insert("input_size".into(), serde_json::json!(size.as_str()));
                }
            }
            QuestionBody::NumericInput { min, max, unit } => {
                if let Some(min) = min {
                    config.insert("min".into(), serde_json::json!(min));
                }
                if let Some(max) = max {
                    config.insert("max".into(), serde_json::json!(max));
                }
                if let Some(unit) = unit {
                    config.insert("unit".into(), serde_json::json!(unit));
                }
            }
        }
        if config.is_empty() {
            None
        } else {
            Some(serde_json::Value::Object(config))
        }
    }
}

/// A single survey question.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// Provider-assigned id, unique within a document (e.g. "q1").
    pub id: String,
    pub text: String,
    pub body: QuestionBody,
    /// Why the question belongs in the instrument and how it avoids bias.
    pub rationale: String,
}

// Serialized in the wire shape with split `type`/`options`/`config` fields
// so responses match the shape the validator accepts.
impl Serialize for Question {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Question", 6)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("text", &self.text)?;
        s.serialize_field("type", self.body.question_type().as_str())?;
        s.serialize_field("options", &self.body.options_json())?;
        s.serialize_field("config", &self.body.config_json())?;
        s.serialize_field("rationale", &self.rationale)?;
        s.end()
    }
}

/// An ordered group of questions under one section heading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub section_id: String,
    pub title: String,
    pub questions: Vec<Question>,
}

/// The validated, hierarchical survey instrument. Section order is
/// request-defined and preserved once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyDocument {
    pub sections: Vec<Section>,
}

impl SurveyDocument {
    /// Total question count across all sections.
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }
}

/// Resolves a section id to its canonical display title, falling back to
/// capitalizing the slug for ids outside the fixed vocabulary.
pub fn section_title(section_id: &str) -> String {
    match section_id {
        "screeners" => "Screeners".to_string(),
        "core" => "Core Questions".to_string(),
        "pricing_or_attitudes" => "Pricing / Attitudes".to_string(),
        "demographics" => "Demographics".to_string(),
        "followup" => "Follow-Up".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}

//=========================================================================================
// Generation Configuration
//=========================================================================================

/// How many demographic questions to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemographicsDepth {
    Light,
    #[default]
    Standard,
    Extended,
}

impl DemographicsDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemographicsDepth::Light => "light",
            DemographicsDepth::Standard => "standard",
            DemographicsDepth::Extended => "extended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    B2b,
    B2c,
}

impl BusinessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessType::B2b => "b2b",
            BusinessType::B2c => "b2c",
        }
    }
}

/// An error raised by the required-field pre-check on `GenerationConfig`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required field `{0}`")]
    MissingField(&'static str),
    #[error("numberOfQuestions must be a positive integer")]
    InvalidQuestionCount,
}

/// The user-supplied description of the brand and the research goal.
///
/// Field names on the wire are camelCase, matching the public request shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub brand_name: String,
    pub brand_description: String,
    pub brand_category: String,
    pub brand_market: String,
    pub survey_context: String,
    pub survey_goals: String,
    pub target_audience: String,
    pub number_of_questions: u32,
    #[serde(default)]
    pub include_demographics: bool,
    /// Only meaningful when `include_demographics` is true.
    #[serde(default)]
    pub demographics_depth: DemographicsDepth,
    #[serde(default)]
    pub include_followup: bool,
    /// Only meaningful when `include_followup` is true.
    #[serde(default)]
    pub capture_contact: bool,
    #[serde(default, rename = "b2bOrB2c")]
    pub business_type: Option<BusinessType>,
}

impl GenerationConfig {
    /// The caller-side pre-check: every brand and intent field must be
    /// non-blank and the requested question count positive. The prompt
    /// builder assumes this has run.
    pub fn ensure_complete(&self) -> Result<(), ConfigError> {
        let required: [(&'static str, &str); 7] = [
            ("brandName", &self.brand_name),
            ("brandDescription", &self.brand_description),
            ("brandCategory", &self.brand_category),
            ("brandMarket", &self.brand_market),
            ("surveyContext", &self.survey_context),
            ("surveyGoals", &self.survey_goals),
            ("targetAudience", &self.target_audience),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(name));
            }
        }
        if self.number_of_questions == 0 {
            return Err(ConfigError::InvalidQuestionCount);
        }
        Ok(())
    }
}

//=========================================================================================
// Users & Auth Sessions
//=========================================================================================

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Durable-Tier Request Records
//=========================================================================================

/// A persisted survey request: the required `GenerationConfig` fields plus
/// ownership and creation metadata. Owns its flattened question rows;
/// deleting it cascades to them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRequest {
    pub id: Uuid,
    pub brand_name: String,
    pub brand_description: String,
    pub brand_category: String,
    pub brand_market: String,
    pub context: String,
    pub goals: String,
    pub audience: String,
    pub question_count: u32,
    pub created_at: DateTime<Utc>,
}

/// A one-line listing entry for a user's saved surveys.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySummary {
    pub id: Uuid,
    pub brand_name: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> GenerationConfig {
        GenerationConfig {
            brand_name: "Acme Coffee".into(),
            brand_description: "Specialty roaster".into(),
            brand_category: "Food & Beverage".into(),
            brand_market: "United States".into(),
            survey_context: "New cold brew line".into(),
            survey_goals: "Understand price sensitivity".into(),
            target_audience: "Urban coffee drinkers".into(),
            number_of_questions: 8,
            include_demographics: false,
            demographics_depth: DemographicsDepth::Standard,
            include_followup: false,
            capture_contact: false,
            business_type: None,
        }
    }

    #[test]
    fn complete_config_passes_precheck() {
        assert_eq!(config().ensure_complete(), Ok(()));
    }

    #[test]
    fn blank_required_field_is_reported_by_wire_name() {
        let mut cfg = config();
        cfg.survey_goals = "   ".into();
        assert_eq!(
            cfg.ensure_complete(),
            Err(ConfigError::MissingField("surveyGoals"))
        );
    }

    #[test]
    fn zero_question_count_is_rejected() {
        let mut cfg = config();
        cfg.number_of_questions = 0;
        assert_eq!(cfg.ensure_complete(), Err(ConfigError::InvalidQuestionCount));
    }

    #[test]
    fn known_section_ids_resolve_to_canonical_titles() {
        assert_eq!(section_title("screeners"), "Screeners");
        assert_eq!(section_title("core"), "Core Questions");
        assert_eq!(section_title("pricing_or_attitudes"), "Pricing / Attitudes");
        assert_eq!(section_title("demographics"), "Demographics");
        assert_eq!(section_title("followup"), "Follow-Up");
    }

    #[test]
    fn unknown_section_ids_fall_back_to_capitalization() {
        assert_eq!(section_title("brand_recall"), "Brand_recall");
    }

    #[test]
    fn question_type_wire_names_round_trip() {
        for qtype in QuestionType::ALL {
            assert_eq!(QuestionType::from_wire(qtype.as_str()), Some(qtype));
        }
        assert_eq!(QuestionType::from_wire("DROPDOWN"), None);
    }

    #[test]
    fn question_serializes_in_wire_shape() {
        let question = Question {
            id: "q1".into(),
            text: "How often do you buy coffee?".into(),
            body: QuestionBody::SingleChoice {
                options: vec!["Daily".into(), "Weekly".into()],
                allow_other: true,
            },
            rationale: "Frequency screener.".into(),
        };
        let value = serde_json::to_value(&question).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "q1",
                "text": "How often do you buy coffee?",
                "type": "SINGLE_CHOICE",
                "options": ["Daily", "Weekly"],
                "config": { "allow_other": true },
                "rationale": "Frequency screener.",
            })
        );
    }

    #[test]
    fn empty_config_serializes_as_null() {
        let body = QuestionBody::OpenText { input_size: None };
        assert_eq!(body.config_json(), None);
        assert_eq!(body.options_json(), None);
    }

    #[test]
    fn generation_config_deserializes_from_camel_case() {
        let cfg: GenerationConfig = serde_json::from_value(serde_json::json!({
            "brandName": "Acme",
            "brandDescription": "d",
            "brandCategory": "c",
            "brandMarket": "m",
            "surveyContext": "ctx",
            "surveyGoals": "g",
            "targetAudience": "a",
            "numberOfQuestions": 5,
            "includeDemographics": true,
            "demographicsDepth": "light",
            "b2bOrB2c": "b2b",
        }))
        .unwrap();
        assert_eq!(cfg.demographics_depth, DemographicsDepth::Light);
        assert_eq!(cfg.business_type, Some(BusinessType::B2b));
        assert!(!cfg.include_followup);
    }
}
