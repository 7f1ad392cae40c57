pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

// Re-export the pieces the binary needs to build the router.
pub use middleware::{optional_auth, require_auth};
pub use rest::{
    delete_survey_handler, export_forms_handler, export_markdown_handler, generate_survey_handler,
    get_survey_handler, list_local_surveys_handler, list_surveys_handler, promote_survey_handler,
};
