//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use surveysmith_core::ports::{DatabaseService, SurveyGenerationService};
use surveysmith_core::EphemeralStore;
use tokio::sync::Mutex;

/// The shared application state, created once at startup and passed to all handlers.
///
/// Anonymous generations land in `local_surveys`, an in-memory capped store
/// that lives for the lifetime of the process. Everything durable goes through
/// the `db` port.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub generator: Arc<dyn SurveyGenerationService>,
    pub local_surveys: Arc<Mutex<EphemeralStore>>,
    pub config: Arc<Config>,
}
