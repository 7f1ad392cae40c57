//! crates/surveysmith_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or generative providers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{GenerationConfig, SurveyRequest, SurveySummary, User, UserCredentials};
use crate::store::QuestionRow;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g.
/// database, provider API).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Also used for records owned by another identity, so a foreign record
    /// is indistinguishable from a missing one.
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Generation provider error: {0}")]
    Provider(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The external generative content provider. One attempt, no retry; a failed
/// call or empty reply surfaces as `PortError::Provider`.
#[async_trait]
pub trait SurveyGenerationService: Send + Sync {
    /// Sends the prompt as a single user turn demanding a JSON-only reply and
    /// returns the raw response text, untrusted and unparsed.
    async fn generate_survey(&self, prompt: &str) -> PortResult<String>;
}

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth Methods ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Durable Survey Tier ---
    //
    // Every operation below is scoped to the owning identity. Reads of
    // another user's record must come back as `NotFound`.

    /// Inserts the request record and its flattened question rows, returning
    /// the new durable identifier. The two inserts are a single logical unit
    /// but are not required to be atomic; a request row without questions
    /// reads back as not found.
    async fn create_survey(
        &self,
        user_id: Uuid,
        config: &GenerationConfig,
        rows: &[QuestionRow],
    ) -> PortResult<Uuid>;

    /// Fetches a request record and its question rows ordered by the stored
    /// order index.
    async fn get_survey(
        &self,
        user_id: Uuid,
        survey_id: Uuid,
    ) -> PortResult<(SurveyRequest, Vec<QuestionRow>)>;

    async fn list_surveys(&self, user_id: Uuid) -> PortResult<Vec<SurveySummary>>;

    /// Deletes the request record; question rows go with it via cascade.
    async fn delete_survey(&self, user_id: Uuid, survey_id: Uuid) -> PortResult<()>;
}
