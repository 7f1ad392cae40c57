pub mod db;
pub mod generator;

pub use db::DbAdapter;
pub use generator::OpenAiSurveyAdapter;
