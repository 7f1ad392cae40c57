//! crates/surveysmith_core/src/format/forms.rs
//!
//! Serializes a validated document into the Google Forms `batchUpdate`
//! request payload used by the form-import mechanism: an ordered sequence of
//! `createItem` requests, one text header per section and one question item
//! per question. The field names in this output are a stable external
//! contract; any mismatch with the Forms API is an integration bug.

use serde_json::{json, Value};

use crate::domain::{InputSize, QuestionBody, SurveyDocument};

/// Generic endpoint labels used when a Likert question provides fewer than
/// two of its own.
const FALLBACK_SCALE_LABELS: (&str, &str) = ("Strongly Disagree", "Strongly Agree");

/// Renders the document as form-schema JSON.
pub fn to_form_schema(document: &SurveyDocument) -> String {
    let mut requests: Vec<Value> = Vec::new();
    let mut ordinal = 1usize;
    for section in &document.sections {
        requests.push(json!({
            "createItem": {
                "item": {
                    "title": section.title,
                    "textItem": {}
                },
                "location": { "index": requests.len() }
            }
        }));
        for question in &section.questions {
            let item = json!({
                "createItem": {
                    "item": question_item(ordinal, question),
                    "location": { "index": requests.len() }
                }
            });
            requests.push(item);
            ordinal += 1;
        }
    }

    let payload = json!({ "requests": requests });
    serde_json::to_string_pretty(&payload)
        .expect("serializing an in-memory JSON value cannot fail")
}

fn choice_question(kind: &str, options: &[String], allow_other: bool) -> Value {
    let mut values: Vec<Value> = options
        .iter()
        .map(|option| json!({ "value": option }))
        .collect();
    if allow_other {
        values.push(json!({ "isOther": true }));
    }
    json!({
        "choiceQuestion": {
            "type": kind,
            "options": values,
            "shuffle": false
        }
    })
}

fn question_item(ordinal: usize, question: &crate::domain::Question) -> Value {
    let mut title = format!("{}. {}", ordinal, question.text);

    let answer_shape = match &question.body {
        QuestionBody::SingleChoice {
            options,
            allow_other,
        } => choice_question("RADIO", options, *allow_other),
        QuestionBody::MultiChoice {
            options,
            allow_other,
            ..
        } => choice_question("CHECKBOX", options, *allow_other),
        // The Forms contract has no native ranking item; the options are
        // exported as an ordered dropdown carrying the ranking candidates.
        QuestionBody::RankOrder { options, .. } => choice_question("DROP_DOWN", options, false),
        QuestionBody::LikertScale {
            scale_min,
            scale_max,
            scale_labels,
        } => {
            let (low_label, high_label) = if scale_labels.len() >= 2 {
                (
                    scale_labels[0].clone(),
                    scale_labels[scale_labels.len() - 1].clone(),
                )
            } else {
                (
                    FALLBACK_SCALE_LABELS.0.to_string(),
                    FALLBACK_SCALE_LABELS.1.to_string(),
                )
            };
            json!({
                "scaleQuestion": {
                    "low": scale_min.unwrap_or(1),
                    "high": scale_max.unwrap_or(5),
                    "lowLabel": low_label,
                    "highLabel": high_label
                }
            })
        }
        QuestionBody::OpenText { input_size } => json!({
            "textQuestion": {
                "paragraph": matches!(input_size, Some(InputSize::Long))
            }
        }),
        QuestionBody::NumericInput { unit, .. } => {
            if let Some(unit) = unit {
                title.push_str(&format!(" ({})", unit));
            }
            json!({
                "textQuestion": {
                    "paragraph": false
                }
            })
        }
    };

    let mut item = json!({
        "title": title,
        "description": question.rationale,
        "questionItem": {
            "question": {
                "required": false
            }
        }
    });
    if let (Value::Object(question_obj), Value::Object(shape)) =
        (&mut item["questionItem"]["question"], answer_shape)
    {
        question_obj.extend(shape);
    }
    item
}
