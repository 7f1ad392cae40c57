//! crates/surveysmith_core/src/format/markdown.rs
//!
//! Renders a validated document as a human-readable markdown questionnaire:
//! one heading block per section, one sub-block per question with a global
//! 1-based ordinal continuous across section boundaries.

use crate::domain::{InputSize, QuestionBody, SurveyDocument};

/// Renders the document to markdown text.
pub fn to_markdown(document: &SurveyDocument) -> String {
    let mut section_blocks = Vec::with_capacity(document.sections.len());
    let mut ordinal = 1usize;
    for section in &document.sections {
        let mut question_blocks = Vec::with_capacity(section.questions.len());
        for question in &section.questions {
            question_blocks.push(format!(
                "### {}. {}\n*Type: {}*\n{}\n\n> **Rationale:** {}\n",
                ordinal,
                question.text,
                question.body.question_type(),
                question_body(&question.body),
                question.rationale
            ));
            ordinal += 1;
        }
        section_blocks.push(format!(
            "## {}\n\n{}",
            section.title,
            question_blocks.join("\n---\n\n")
        ));
    }
    section_blocks.join("\n\n---\n\n")
}

fn choice_lines(marker: &str, options: &[String], allow_other: bool) -> String {
    let mut lines: Vec<String> = options
        .iter()
        .map(|option| format!("- {} {}", marker, option))
        .collect();
    if allow_other {
        lines.push(format!("- {} Other...", marker));
    }
    lines.join("\n")
}

fn question_body(body: &QuestionBody) -> String {
    match body {
        QuestionBody::SingleChoice {
            options,
            allow_other,
        } => choice_lines("( )", options, *allow_other),
        QuestionBody::MultiChoice {
            options,
            allow_other,
            ..
        } => choice_lines("[ ]", options, *allow_other),
        QuestionBody::LikertScale {
            scale_min,
            scale_max,
            scale_labels,
        } => {
            let mut text = format!(
                "Scale: {} to {}",
                scale_min.unwrap_or(1),
                scale_max.unwrap_or(5)
            );
            if !scale_labels.is_empty() {
                text.push_str(&format!(" ({})", scale_labels.join(" ... ")));
            }
            text
        }
        QuestionBody::RankOrder { options, .. } => options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("{}. {}", i + 1, option))
            .collect::<Vec<_>>()
            .join("\n"),
        // input_size is a hint for interactive surfaces, not for print
        QuestionBody::OpenText { .. } => "> [Open Answer]".to_string(),
        QuestionBody::NumericInput { unit, .. } => match unit {
            Some(unit) => format!("> [Number] ({})", unit),
            None => "> [Number]".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Question, RankMode, Section};
    use pretty_assertions::assert_eq;

    fn question(id: &str, text: &str, body: QuestionBody) -> Question {
        Question {
            id: id.to_string(),
            text: text.to_string(),
            body,
            rationale: format!("Rationale {id}."),
        }
    }

    fn two_section_document() -> SurveyDocument {
        SurveyDocument {
            sections: vec![
                Section {
                    section_id: "screeners".into(),
                    title: "Screeners".into(),
                    questions: vec![
                        question(
                            "q1",
                            "Pick one.",
                            QuestionBody::SingleChoice {
                                options: vec!["A".into(), "B".into()],
                                allow_other: true,
                            },
                        ),
                        question(
                            "q2",
                            "Pick many.",
                            QuestionBody::MultiChoice {
                                options: vec!["C".into(), "D".into()],
                                allow_other: false,
                                min_choices: Some(1),
                                max_choices: Some(2),
                            },
                        ),
                    ],
                },
                Section {
                    section_id: "core".into(),
                    title: "Core Questions".into(),
                    questions: vec![
                        question(
                            "q3",
                            "Agree?",
                            QuestionBody::LikertScale {
                                scale_min: None,
                                scale_max: None,
                                scale_labels: vec!["Disagree".into(), "Agree".into()],
                            },
                        ),
                        question(
                            "q4",
                            "Rank these.",
                            QuestionBody::RankOrder {
                                options: vec!["X".into(), "Y".into()],
                                rank_mode: Some(RankMode::All),
                            },
                        ),
                        question(
                            "q5",
                            "How much?",
                            QuestionBody::NumericInput {
                                min: None,
                                max: None,
                                unit: Some("USD".into()),
                            },
                        ),
                    ],
                },
            ],
        }
    }

    #[test]
    fn numbering_is_continuous_across_sections() {
        let markdown = to_markdown(&two_section_document());
        for heading in [
            "### 1. Pick one.",
            "### 2. Pick many.",
            "### 3. Agree?",
            "### 4. Rank these.",
            "### 5. How much?",
        ] {
            assert!(markdown.contains(heading), "missing `{heading}`");
        }
        assert!(!markdown.contains("### 6."));
    }

    #[test]
    fn renders_section_headings_and_separators() {
        let markdown = to_markdown(&two_section_document());
        assert!(markdown.starts_with("## Screeners\n\n"));
        assert!(markdown.contains("\n\n---\n\n## Core Questions\n\n"));
        assert!(markdown.contains("\n---\n\n### 2."));
    }

    #[test]
    fn choice_questions_use_round_and_square_markers() {
        let markdown = to_markdown(&two_section_document());
        assert!(markdown.contains("- ( ) A\n- ( ) B\n- ( ) Other..."));
        assert!(markdown.contains("- [ ] C\n- [ ] D"));
        assert!(!markdown.contains("- [ ] Other..."));
    }

    #[test]
    fn likert_scale_defaults_to_one_through_five_with_joined_labels() {
        let markdown = to_markdown(&two_section_document());
        assert!(markdown.contains("Scale: 1 to 5 (Disagree ... Agree)"));
    }

    #[test]
    fn likert_scale_without_labels_omits_the_label_suffix() {
        let document = SurveyDocument {
            sections: vec![Section {
                section_id: "core".into(),
                title: "Core Questions".into(),
                questions: vec![question(
                    "q1",
                    "Agree?",
                    QuestionBody::LikertScale {
                        scale_min: Some(0),
                        scale_max: Some(10),
                        scale_labels: vec![],
                    },
                )],
            }],
        };
        let markdown = to_markdown(&document);
        assert!(markdown.contains("Scale: 0 to 10\n"));
    }

    #[test]
    fn rank_order_renders_a_numbered_list() {
        let markdown = to_markdown(&two_section_document());
        assert!(markdown.contains("1. X\n2. Y"));
    }

    #[test]
    fn numeric_input_carries_its_unit_suffix() {
        let markdown = to_markdown(&two_section_document());
        assert!(markdown.contains("> [Number] (USD)"));
    }

    #[test]
    fn open_text_renders_a_placeholder() {
        let document = SurveyDocument {
            sections: vec![Section {
                section_id: "followup".into(),
                title: "Follow-Up".into(),
                questions: vec![question(
                    "q1",
                    "Anything else?",
                    QuestionBody::OpenText { input_size: None },
                )],
            }],
        };
        assert!(to_markdown(&document).contains("> [Open Answer]"));
    }

    #[test]
    fn rationale_appears_as_a_blockquote() {
        let markdown = to_markdown(&two_section_document());
        assert!(markdown.contains("> **Rationale:** Rationale q1."));
    }

    #[test]
    fn formatting_is_idempotent() {
        let document = two_section_document();
        assert_eq!(to_markdown(&document), to_markdown(&document));
    }
}
