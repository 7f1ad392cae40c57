//! crates/surveysmith_core/src/validate.rs
//!
//! The validation boundary between the generative provider and the typed
//! document model. Provider output is untrusted text: nothing here assumes a
//! field is present or correctly typed, and nothing is coerced or invented.
//! The whole document is accepted or the whole document is rejected, with the
//! rejection naming the section, question, and field that failed.

use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::domain::{
    InputSize, Question, QuestionBody, QuestionType, RankMode, Section, SurveyDocument,
};

//=========================================================================================
// Error Type
//=========================================================================================

/// Why a provider response was rejected. The three kinds are distinguished
/// for diagnostics but are all fatal to the generation attempt.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The response is not valid JSON at all.
    #[error("Provider response is not valid JSON: {0}")]
    Parse(String),

    /// The response parsed but is not an object with a `sections` array.
    #[error("Unexpected response shape: {0}")]
    Shape(String),

    /// A section or question violates the survey schema.
    #[error("Schema violation at {location}: {message}")]
    Schema { location: String, message: String },
}

fn schema_error(location: impl Into<String>, message: impl Into<String>) -> ValidationError {
    ValidationError::Schema {
        location: location.into(),
        message: message.into(),
    }
}

//=========================================================================================
// Document Validation
//=========================================================================================

/// Parses and validates raw provider text into a `SurveyDocument`.
///
/// No partial acceptance: one malformed section or question rejects the whole
/// document. On success the document carries exactly the provider's content;
/// ordinals and display titles for persistence are derived elsewhere.
pub fn parse_survey_response(raw: &str) -> Result<SurveyDocument, ValidationError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ValidationError::Parse(e.to_string()))?;

    let root = value
        .as_object()
        .ok_or_else(|| ValidationError::Shape("expected a JSON object".to_string()))?;
    let sections_value = root
        .get("sections")
        .ok_or_else(|| ValidationError::Shape("missing `sections` field".to_string()))?;
    let raw_sections = sections_value
        .as_array()
        .ok_or_else(|| ValidationError::Shape("`sections` is not an array".to_string()))?;
    if raw_sections.is_empty() {
        return Err(ValidationError::Shape(
            "`sections` is empty; a survey needs at least one section".to_string(),
        ));
    }

    let mut seen_question_ids = HashSet::new();
    let mut sections = Vec::with_capacity(raw_sections.len());
    for (index, raw_section) in raw_sections.iter().enumerate() {
        sections.push(validate_section(index, raw_section, &mut seen_question_ids)?);
    }
    Ok(SurveyDocument { sections })
}

fn validate_section(
    index: usize,
    value: &Value,
    seen_question_ids: &mut HashSet<String>,
) -> Result<Section, ValidationError> {
    let location = format!("section #{}", index + 1);
    let section = value
        .as_object()
        .ok_or_else(|| schema_error(&location, "section is not an object"))?;

    let section_id = non_empty_string(section, "section_id")
        .map_err(|message| schema_error(&location, message))?;
    let location = format!("section `{}`", section_id);

    let title = match section.get("title") {
        Some(Value::String(title)) => title.clone(),
        _ => return Err(schema_error(&location, "`title` must be a string")),
    };

    let raw_questions = match section.get("questions") {
        Some(Value::Array(questions)) => questions,
        _ => return Err(schema_error(&location, "`questions` must be an array")),
    };

    let mut questions = Vec::with_capacity(raw_questions.len());
    for raw_question in raw_questions {
        questions.push(validate_question(
            &section_id,
            raw_question,
            seen_question_ids,
        )?);
    }

    Ok(Section {
        section_id,
        title,
        questions,
    })
}

fn validate_question(
    section_id: &str,
    value: &Value,
    seen_question_ids: &mut HashSet<String>,
) -> Result<Question, ValidationError> {
    let location = format!("section `{}`", section_id);
    let question = value
        .as_object()
        .ok_or_else(|| schema_error(&location, "question is not an object"))?;

    let id =
        non_empty_string(question, "id").map_err(|message| schema_error(&location, message))?;
    let location = format!("section `{}`, question `{}`", section_id, id);
    if !seen_question_ids.insert(id.clone()) {
        return Err(schema_error(
            &location,
            "question `id` is duplicated within the document",
        ));
    }

    let text =
        non_empty_string(question, "text").map_err(|message| schema_error(&location, message))?;
    let rationale = non_empty_string(question, "rationale")
        .map_err(|message| schema_error(&location, message))?;

    let type_name = match question.get("type") {
        Some(Value::String(name)) => name.as_str(),
        _ => return Err(schema_error(&location, "`type` must be a string")),
    };
    let question_type = QuestionType::from_wire(type_name).ok_or_else(|| {
        schema_error(
            &location,
            format!("`type` has unrecognized value `{}`", type_name),
        )
    })?;

    let body = question_body_from_parts(
        question_type,
        question.get("options"),
        question.get("config"),
    )
    .map_err(|message| schema_error(&location, message))?;

    Ok(Question {
        id,
        text,
        body,
        rationale,
    })
}

//=========================================================================================
// Per-Variant Body Validation
//=========================================================================================

/// Builds the typed variant payload from the wire `type`/`options`/`config`
/// triple, enforcing the per-variant constraints. Shared with store
/// reconstruction so both tiers pass through identical checks.
pub fn question_body_from_parts(
    question_type: QuestionType,
    options: Option<&Value>,
    config: Option<&Value>,
) -> Result<QuestionBody, String> {
    let config = config_object(config)?;

    match question_type {
        QuestionType::SingleChoice => Ok(QuestionBody::SingleChoice {
            options: required_options(options)?,
            allow_other: opt_bool(config, "allow_other")?.unwrap_or(false),
        }),
        QuestionType::MultiChoice => {
            let min_choices = opt_u32(config, "min_choices")?;
            let max_choices = opt_u32(config, "max_choices")?;
            if let (Some(min), Some(max)) = (min_choices, max_choices) {
                if min > max {
                    return Err("`min_choices` must not exceed `max_choices`".to_string());
                }
            }
            Ok(QuestionBody::MultiChoice {
                options: required_options(options)?,
                allow_other: opt_bool(config, "allow_other")?.unwrap_or(false),
                min_choices,
                max_choices,
            })
        }
        QuestionType::LikertScale => {
            forbid_options(options)?;
            Ok(QuestionBody::LikertScale {
                scale_min: opt_i64(config, "scale_min")?,
                scale_max: opt_i64(config, "scale_max")?,
                scale_labels: opt_string_array(config, "scale_labels")?.unwrap_or_default(),
            })
        }
        QuestionType::RankOrder => {
            let options = required_options(options)?;
            let rank_mode = match opt_str(config, "rank_mode")? {
                None => None,
                Some("all") => Some(RankMode::All),
                Some("top_n") => {
                    let top_n = opt_u32(config, "top_n")?.ok_or_else(|| {
                        "`top_n` is required when `rank_mode` is `top_n`".to_string()
                    })?;
                    if top_n == 0 {
                        return Err("`top_n` must be a positive integer".to_string());
                    }
                    Some(RankMode::TopN(top_n))
                }
                Some(other) => {
                    return Err(format!("`rank_mode` has unrecognized value `{}`", other))
                }
            };
            Ok(QuestionBody::RankOrder { options, rank_mode })
        }
        QuestionType::OpenText => {
            forbid_options(options)?;
            let input_size = match opt_str(config, "input_size")? {
                None => None,
                Some("short") => Some(InputSize::Short),
                Some("long") => Some(InputSize::Long),
                Some(other) => {
                    return Err(format!("`input_size` has unrecognized value `{}`", other))
                }
            };
            Ok(QuestionBody::OpenText { input_size })
        }
        QuestionType::NumericInput => {
            forbid_options(options)?;
            Ok(QuestionBody::NumericInput {
                min: opt_f64(config, "min")?,
                max: opt_f64(config, "max")?,
                unit: opt_str(config, "unit")?.map(str::to_string),
            })
        }
    }
}

//=========================================================================================
// Field Readers
//
// JSON null and a missing key are both "absent"; a present value of the wrong
// type is an error, never coerced.
//=========================================================================================

fn non_empty_string(object: &Map<String, Value>, key: &str) -> Result<String, String> {
    match object.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(format!("`{}` must not be empty", key)),
        _ => Err(format!("`{}` must be a non-empty string", key)),
    }
}

fn config_object(config: Option<&Value>) -> Result<Option<&Map<String, Value>>, String> {
    match config {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err("`config` must be an object".to_string()),
    }
}

fn required_options(options: Option<&Value>) -> Result<Vec<String>, String> {
    let items = match options {
        None | Some(Value::Null) => {
            return Err("`options` is required for this question type".to_string())
        }
        Some(Value::Array(items)) => items,
        Some(_) => return Err("`options` must be an array of strings".to_string()),
    };
    if items.is_empty() {
        return Err("`options` must not be empty".to_string());
    }
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            _ => Err("`options` must be an array of strings".to_string()),
        })
        .collect()
}

fn forbid_options(options: Option<&Value>) -> Result<(), String> {
    match options {
        None | Some(Value::Null) => Ok(()),
        Some(_) => Err("`options` must be absent for this question type".to_string()),
    }
}

fn config_field<'a>(config: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Value> {
    match config?.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

fn opt_bool(config: Option<&Map<String, Value>>, key: &str) -> Result<Option<bool>, String> {
    match config_field(config, key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(format!("`{}` must be a boolean", key)),
    }
}

fn opt_u32(config: Option<&Map<String, Value>>, key: &str) -> Result<Option<u32>, String> {
    match config_field(config, key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| format!("`{}` must be a non-negative integer", key)),
    }
}

fn opt_i64(config: Option<&Map<String, Value>>, key: &str) -> Result<Option<i64>, String> {
    match config_field(config, key) {
        None => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| format!("`{}` must be an integer", key)),
    }
}

fn opt_f64(config: Option<&Map<String, Value>>, key: &str) -> Result<Option<f64>, String> {
    match config_field(config, key) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| format!("`{}` must be a number", key)),
    }
}

fn opt_str<'a>(
    config: Option<&'a Map<String, Value>>,
    key: &str,
) -> Result<Option<&'a str>, String> {
    match config_field(config, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(format!("`{}` must be a string", key)),
    }
}

fn opt_string_array(
    config: Option<&Map<String, Value>>,
    key: &str,
) -> Result<Option<Vec<String>>, String> {
    match config_field(config, key) {
        None => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(format!("`{}` must be an array of strings", key)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(format!("`{}` must be an array of strings", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(value: Value) -> String {
        value.to_string()
    }

    fn full_fixture() -> Value {
        json!({
            "sections": [
                {
                    "section_id": "screeners",
                    "title": "Screeners",
                    "questions": [
                        {
                            "id": "q1",
                            "text": "How often do you drink coffee?",
                            "type": "SINGLE_CHOICE",
                            "options": ["Daily", "Weekly", "Monthly", "Never"],
                            "config": { "allow_other": false },
                            "rationale": "Screens for category usage without assuming purchase."
                        }
                    ]
                },
                {
                    "section_id": "core",
                    "title": "Core Questions",
                    "questions": [
                        {
                            "id": "q2",
                            "text": "Which factors matter when choosing a coffee brand?",
                            "type": "MULTI_CHOICE",
                            "options": ["Price", "Taste", "Origin", "Packaging", "Availability"],
                            "config": { "allow_other": true, "min_choices": 1, "max_choices": 3 },
                            "rationale": "Captures decision drivers without forcing a single answer."
                        },
                        {
                            "id": "q3",
                            "text": "The brand feels trustworthy.",
                            "type": "LIKERT_SCALE",
                            "options": null,
                            "config": {
                                "scale_min": 1,
                                "scale_max": 5,
                                "scale_labels": ["Strongly Disagree", "Strongly Agree"]
                            },
                            "rationale": "Standard agreement scale avoids leading wording."
                        },
                        {
                            "id": "q4",
                            "text": "Rank these product attributes by importance.",
                            "type": "RANK_ORDER",
                            "options": ["Flavor", "Caffeine", "Price", "Sustainability"],
                            "config": { "rank_mode": "top_n", "top_n": 3 },
                            "rationale": "Forced ranking reveals relative priorities."
                        }
                    ]
                },
                {
                    "section_id": "pricing_or_attitudes",
                    "title": "Pricing / Attitudes",
                    "questions": [
                        {
                            "id": "q5",
                            "text": "What would you expect a 12oz bag to cost?",
                            "type": "NUMERIC_INPUT",
                            "options": null,
                            "config": { "min": 0, "max": 100, "unit": "USD" },
                            "rationale": "Open price expectation without anchoring."
                        },
                        {
                            "id": "q6",
                            "text": "What would make you switch brands?",
                            "type": "OPEN_TEXT",
                            "options": null,
                            "config": { "input_size": "long" },
                            "rationale": "Captures unprompted switching triggers."
                        }
                    ]
                }
            ]
        })
    }

    #[test]
    fn accepts_a_complete_document_covering_all_variants() {
        let doc = parse_survey_response(&raw(full_fixture())).unwrap();
        assert_eq!(doc.sections.len(), 3);
        assert_eq!(doc.question_count(), 6);
        assert_eq!(doc.sections[0].section_id, "screeners");
        assert_eq!(
            doc.sections[1].questions[2].body,
            QuestionBody::RankOrder {
                options: vec![
                    "Flavor".into(),
                    "Caffeine".into(),
                    "Price".into(),
                    "Sustainability".into()
                ],
                rank_mode: Some(RankMode::TopN(3)),
            }
        );
    }

    #[test]
    fn rejects_non_json_text() {
        let err = parse_survey_response("Here is your survey!").unwrap_err();
        assert!(matches!(err, ValidationError::Parse(_)), "{err:?}");
    }

    #[test]
    fn rejects_sections_that_are_not_an_array() {
        let err = parse_survey_response(&raw(json!({ "sections": "not-an-array" }))).unwrap_err();
        assert!(matches!(err, ValidationError::Shape(_)), "{err:?}");
    }

    #[test]
    fn rejects_an_empty_sections_array() {
        let err = parse_survey_response(&raw(json!({ "sections": [] }))).unwrap_err();
        assert!(matches!(err, ValidationError::Shape(_)), "{err:?}");
    }

    #[test]
    fn rejects_a_non_object_root() {
        let err = parse_survey_response("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ValidationError::Shape(_)), "{err:?}");
    }

    #[test]
    fn rejects_a_section_missing_its_title() {
        let mut fixture = full_fixture();
        fixture["sections"][0]
            .as_object_mut()
            .unwrap()
            .remove("title");
        let err = parse_survey_response(&raw(fixture)).unwrap_err();
        match err {
            ValidationError::Schema { location, message } => {
                assert_eq!(location, "section `screeners`");
                assert!(message.contains("title"), "{message}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_single_choice_without_options() {
        let mut fixture = full_fixture();
        fixture["sections"][0]["questions"][0]["options"] = Value::Null;
        let err = parse_survey_response(&raw(fixture)).unwrap_err();
        match err {
            ValidationError::Schema { location, message } => {
                assert_eq!(location, "section `screeners`, question `q1`");
                assert!(message.contains("options"), "{message}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_an_unrecognized_question_type() {
        let mut fixture = full_fixture();
        fixture["sections"][0]["questions"][0]["type"] = json!("DROPDOWN");
        let err = parse_survey_response(&raw(fixture)).unwrap_err();
        match err {
            ValidationError::Schema { message, .. } => {
                assert!(message.contains("DROPDOWN"), "{message}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_likert_carrying_options() {
        let mut fixture = full_fixture();
        fixture["sections"][1]["questions"][1]["options"] = json!(["1", "2", "3"]);
        let err = parse_survey_response(&raw(fixture)).unwrap_err();
        assert!(matches!(err, ValidationError::Schema { .. }), "{err:?}");
    }

    #[test]
    fn rejects_min_choices_above_max_choices() {
        let mut fixture = full_fixture();
        fixture["sections"][1]["questions"][0]["config"] =
            json!({ "min_choices": 4, "max_choices": 2 });
        let err = parse_survey_response(&raw(fixture)).unwrap_err();
        match err {
            ValidationError::Schema { message, .. } => {
                assert!(message.contains("min_choices"), "{message}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_top_n_mode_without_top_n() {
        let mut fixture = full_fixture();
        fixture["sections"][1]["questions"][2]["config"] = json!({ "rank_mode": "top_n" });
        let err = parse_survey_response(&raw(fixture)).unwrap_err();
        match err {
            ValidationError::Schema { message, .. } => {
                assert!(message.contains("top_n"), "{message}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_question_ids_across_sections() {
        let mut fixture = full_fixture();
        fixture["sections"][2]["questions"][0]["id"] = json!("q1");
        let err = parse_survey_response(&raw(fixture)).unwrap_err();
        match err {
            ValidationError::Schema { message, .. } => {
                assert!(message.contains("duplicated"), "{message}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_a_blank_rationale() {
        let mut fixture = full_fixture();
        fixture["sections"][0]["questions"][0]["rationale"] = json!("  ");
        let err = parse_survey_response(&raw(fixture)).unwrap_err();
        assert!(matches!(err, ValidationError::Schema { .. }), "{err:?}");
    }

    #[test]
    fn rejects_a_config_of_the_wrong_type() {
        let mut fixture = full_fixture();
        fixture["sections"][0]["questions"][0]["config"] = json!("allow_other=true");
        let err = parse_survey_response(&raw(fixture)).unwrap_err();
        assert!(matches!(err, ValidationError::Schema { .. }), "{err:?}");
    }

    #[test]
    fn rejects_mistyped_config_fields_rather_than_coercing() {
        let mut fixture = full_fixture();
        fixture["sections"][1]["questions"][1]["config"] = json!({ "scale_min": "1" });
        let err = parse_survey_response(&raw(fixture)).unwrap_err();
        match err {
            ValidationError::Schema { message, .. } => {
                assert!(message.contains("scale_min"), "{message}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn null_config_values_count_as_absent() {
        let mut fixture = full_fixture();
        fixture["sections"][2]["questions"][1]["config"] = json!({
            "allow_other": null,
            "input_size": null,
            "min": null,
        });
        let doc = parse_survey_response(&raw(fixture)).unwrap();
        assert_eq!(
            doc.sections[2].questions[1].body,
            QuestionBody::OpenText { input_size: None }
        );
    }

    #[test]
    fn a_section_with_no_questions_is_permitted() {
        let mut fixture = full_fixture();
        fixture["sections"][2]["questions"] = json!([]);
        let doc = parse_survey_response(&raw(fixture)).unwrap();
        assert!(doc.sections[2].questions.is_empty());
    }
}
