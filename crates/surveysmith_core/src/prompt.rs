//! crates/surveysmith_core/src/prompt.rs
//!
//! Deterministically renders a `GenerationConfig` into the generation request
//! text. Pure string assembly, no I/O: the same configuration always produces
//! byte-identical prompt text. Conditional instructions (demographics depth,
//! followup, contact capture) are emitted only when their governing toggle is
//! on, never as blank placeholders.

use crate::domain::{BusinessType, DemographicsDepth, GenerationConfig};

const SEPARATOR: &str = "----------------------------------------";

/// Question-count range requested for the demographics section.
fn demographics_range(depth: DemographicsDepth) -> &'static str {
    match depth {
        DemographicsDepth::Light => "2-3",
        DemographicsDepth::Standard => "4-6",
        DemographicsDepth::Extended => "6-9",
    }
}

/// Builds the single user-turn prompt sent to the generative provider.
///
/// The caller is expected to have run `GenerationConfig::ensure_complete`
/// first; this function renders whatever it is given.
pub fn build_prompt(config: &GenerationConfig) -> String {
    let mut p = String::with_capacity(4096);
    let mut line = |s: &str| {
        p.push_str(s);
        p.push('\n');
    };

    line("You are SurveySmith, an expert market researcher. Generate a professional, unbiased, research-grade SURVEY QUESTION SET for the user.");
    line("");
    line(SEPARATOR);
    line("CONTEXT ABOUT THE BRAND (IMPORTANT)");
    line(&format!("Brand Name: {}", config.brand_name));
    line(&format!("Brand Description: {}", config.brand_description));
    line(&format!("Brand Category: {}", config.brand_category));
    line(&format!("Brand Market: {}", config.brand_market));
    line("");
    line(SEPARATOR);
    line("SURVEY REQUIREMENTS");
    line(&format!("Survey Context: {}", config.survey_context));
    line(&format!("Primary Goals: {}", config.survey_goals));
    line(&format!("Target Audience: {}", config.target_audience));
    line(&format!(
        "Number Of Questions: {}",
        config.number_of_questions
    ));
    line("");
    line(SEPARATOR);
    line("OPTIONAL SECTIONS");
    if config.include_demographics {
        line(&format!(
            "Include Demographics: Yes (Depth: {})",
            config.demographics_depth.as_str()
        ));
    } else {
        line("Include Demographics: No");
    }
    line(&format!(
        "Include Follow-Up: {}",
        if config.include_followup { "Yes" } else { "No" }
    ));
    line(&format!(
        "Capture Contact: {}",
        if config.include_followup && config.capture_contact {
            "Yes"
        } else {
            "No"
        }
    ));
    line(&format!(
        "Business Type: {}",
        config
            .business_type
            .map(|b| b.as_str())
            .unwrap_or("Not specified")
    ));
    line("");
    line(SEPARATOR);
    line("STRICT RULES");
    line(&format!(
        "1. Generate EXACTLY {} questions for the core survey sections (screeners + core + pricing_or_attitudes).",
        config.number_of_questions
    ));
    if config.include_demographics {
        line(&format!(
            "2. ADDITIONALLY include a \"demographics\" section with {} questions appropriate for the market ({}).",
            demographics_range(config.demographics_depth),
            config.brand_market
        ));
    } else {
        line("2. Do NOT include a demographics section.");
    }
    let capture_contact = config.include_followup && config.capture_contact;
    if config.include_followup {
        let mut rule = format!(
            "3. ADDITIONALLY include a \"followup\" section with {} question(s).",
            if capture_contact { 2 } else { 1 }
        );
        if capture_contact {
            rule.push_str(" Include an optional contact information field with consent disclaimer.");
        }
        line(&rule);
    } else {
        line("3. Do NOT include a followup section.");
    }
    line("4. Use a diverse mix of ONLY these types:");
    line("   - SINGLE_CHOICE");
    line("   - MULTI_CHOICE");
    line("   - LIKERT_SCALE");
    line("   - RANK_ORDER");
    line("   - OPEN_TEXT");
    line("   - NUMERIC_INPUT");
    line("5. Never repeat the same type more than twice consecutively.");
    line("6. Organize questions into SECTIONS:");
    line("   - \"screeners\" (1-2 questions)");
    line("   - \"core\" (majority of questions)");
    line("   - \"pricing_or_attitudes\" (if relevant)");
    if config.include_demographics {
        line("   - \"demographics\" (if enabled)");
    }
    if config.include_followup {
        line("   - \"followup\" (if enabled)");
    }
    line("7. ABSOLUTELY NO:");
    line("   - Leading questions");
    line("   - Double-barreled questions");
    line("   - Assumptive wording");
    line("   - Vague prompts");
    line("8. Every question MUST include a clear rationale explaining:");
    line("   - Why it matters for this survey");
    line("   - Why it avoids bias");

    let mut next_rule = 9;
    if config.include_demographics {
        line(&format!("{}. For demographics section:", next_rule));
        next_rule += 1;
        line(&format!(
            "   - Create questions appropriate to the MARKET ({})",
            config.brand_market
        ));
        if let Some(business_type) = config.business_type {
            let guidance = match business_type {
                BusinessType::B2b => "include roles, companies, employees",
                BusinessType::B2c => "consumer-focused",
            };
            line(&format!(
                "   - Match {} context ({})",
                business_type.as_str().to_uppercase(),
                guidance
            ));
        }
        line("   - Use only: SINGLE_CHOICE, MULTI_CHOICE, NUMERIC_INPUT");
        line("   - Must be neutral, respectful, and culturally appropriate");
    }
    if config.include_followup {
        line(&format!("{}. For followup section:", next_rule));
        line("   - Add 1 OPEN_TEXT question: \"Is there anything else you would like to share about this topic?\"");
        if capture_contact {
            line("   - Add ONE optional OPEN_TEXT field for email or phone");
            line("   - The question MUST explicitly state it is optional");
            line("   - Add consent disclaimer: \"Your contact information will only be used for follow-up regarding this survey.\"");
        }
    }

    line("");
    line(SEPARATOR);
    line("QUESTION TYPE RULES");
    line("SINGLE_CHOICE -> 4-7 balanced options");
    line("MULTI_CHOICE -> define min_choices and max_choices");
    line("LIKERT_SCALE -> use scale_min:1, scale_max:5 AND labels");
    line("RANK_ORDER -> 4-7 items");
    line("NUMERIC_INPUT -> define min, max, unit");
    line("OPEN_TEXT -> specific, not generic");
    line("");
    line(SEPARATOR);
    line("RETURN FORMAT (STRICT JSON ONLY)");
    line("{");
    line("  \"sections\": [");
    line("    {");
    line("      \"section_id\": \"screeners\",");
    line("      \"title\": \"Screeners\",");
    line("      \"questions\": [ SurveyQuestion ]");
    line("    },");
    line("    {");
    line("      \"section_id\": \"core\",");
    line("      \"title\": \"Core Questions\",");
    line("      \"questions\": [ SurveyQuestion ]");
    line("    },");
    if config.include_demographics || config.include_followup {
        line("    {");
        line("      \"section_id\": \"pricing_or_attitudes\",");
        line("      \"title\": \"Pricing / Attitudes\",");
        line("      \"questions\": [ SurveyQuestion ]");
        line("    },");
        if config.include_demographics {
            line("    {");
            line("      \"section_id\": \"demographics\",");
            line("      \"title\": \"Demographics\",");
            line("      \"questions\": [ SurveyQuestion ]");
            if config.include_followup {
                line("    },");
            } else {
                line("    }");
            }
        }
        if config.include_followup {
            line("    {");
            line("      \"section_id\": \"followup\",");
            line("      \"title\": \"Follow-Up\",");
            line("      \"questions\": [ SurveyQuestion ]");
            line("    }");
        }
    } else {
        line("    {");
        line("      \"section_id\": \"pricing_or_attitudes\",");
        line("      \"title\": \"Pricing / Attitudes\",");
        line("      \"questions\": [ SurveyQuestion ]");
        line("    }");
    }
    line("  ]");
    line("}");
    line("");
    line("A SurveyQuestion is:");
    line("{");
    line("  \"id\": \"q1\",");
    line("  \"text\": \"...\",");
    line("  \"type\": \"...\",");
    line("  \"options\": [...],");
    line("  \"config\": {");
    line("    \"allow_other\": false,");
    line("    \"min_choices\": null,");
    line("    \"max_choices\": null,");
    line("    \"scale_min\": null,");
    line("    \"scale_max\": null,");
    line("    \"scale_labels\": null,");
    line("    \"rank_mode\": null,");
    line("    \"top_n\": null,");
    line("    \"input_size\": null,");
    line("    \"min\": null,");
    line("    \"max\": null,");
    line("    \"unit\": null");
    line("  },");
    line("  \"rationale\": \"...\"");
    line("}");
    line("");
    line("ONLY RETURN VALID JSON. No commentary.");

    p
}
