pub mod domain;
pub mod format;
pub mod ports;
pub mod prompt;
pub mod store;
pub mod validate;

pub use domain::{
    BusinessType, ConfigError, DemographicsDepth, GenerationConfig, InputSize, Question,
    QuestionBody, QuestionType, RankMode, Section, SurveyDocument, SurveyRequest, SurveySummary,
    User, UserCredentials,
};
pub use format::{to_form_schema, to_markdown};
pub use ports::{DatabaseService, PortError, PortResult, SurveyGenerationService};
pub use prompt::build_prompt;
pub use store::{flatten, reconstruct, EphemeralStore, EphemeralSurvey, QuestionRow};
pub use validate::{parse_survey_response, ValidationError};
