//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `surveysmith_core` crate. It handles all
//! interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use surveysmith_core::domain::{
    GenerationConfig, SurveyRequest, SurveySummary, User, UserCredentials,
};
use surveysmith_core::ports::{DatabaseService, PortError, PortResult};
use surveysmith_core::store::QuestionRow;
use surveysmith_core::QuestionType;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct UserCredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl UserCredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct SurveyRequestRecord {
    id: Uuid,
    brand_name: String,
    brand_description: String,
    brand_category: String,
    brand_market: String,
    survey_context: String,
    survey_goals: String,
    target_audience: String,
    number_of_questions: i32,
    created_at: DateTime<Utc>,
}
impl SurveyRequestRecord {
    fn to_domain(self) -> SurveyRequest {
        SurveyRequest {
            id: self.id,
            brand_name: self.brand_name,
            brand_description: self.brand_description,
            brand_category: self.brand_category,
            brand_market: self.brand_market,
            context: self.survey_context,
            goals: self.survey_goals,
            audience: self.target_audience,
            question_count: self.number_of_questions as u32,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct SurveySummaryRecord {
    id: Uuid,
    brand_name: String,
    created_at: DateTime<Utc>,
}
impl SurveySummaryRecord {
    fn to_domain(self) -> SurveySummary {
        SurveySummary {
            id: self.id,
            brand_name: self.brand_name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct QuestionRowRecord {
    section_id: String,
    question_id: String,
    question_text: String,
    question_type: String,
    options: Option<Value>,
    config: Option<Value>,
    rationale: String,
    order_index: i32,
}
impl QuestionRowRecord {
    fn to_domain(self) -> PortResult<QuestionRow> {
        let question_type = QuestionType::from_wire(&self.question_type).ok_or_else(|| {
            PortError::Unexpected(format!(
                "Stored question has unknown type '{}'",
                self.question_type
            ))
        })?;
        Ok(QuestionRow {
            section_id: self.section_id,
            question_id: self.question_id,
            text: self.question_text,
            question_type,
            options: self.options,
            config: self.config,
            rationale: self.rationale,
            order_index: self.order_index,
        })
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserCredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let row: (Uuid,) = sqlx::query_as(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(row.0)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn create_survey(
        &self,
        user_id: Uuid,
        config: &GenerationConfig,
        rows: &[QuestionRow],
    ) -> PortResult<Uuid> {
        let survey_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO survey_requests \
             (id, user_id, brand_name, brand_description, brand_category, brand_market, \
              survey_context, survey_goals, target_audience, number_of_questions) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(survey_id)
        .bind(user_id)
        .bind(&config.brand_name)
        .bind(&config.brand_description)
        .bind(&config.brand_category)
        .bind(&config.brand_market)
        .bind(&config.survey_context)
        .bind(&config.survey_goals)
        .bind(&config.target_audience)
        .bind(config.number_of_questions as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        for row in rows {
            sqlx::query(
                "INSERT INTO survey_questions \
                 (id, survey_request_id, section_id, question_id, question_text, \
                  question_type, options, config, rationale, order_index) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(Uuid::new_v4())
            .bind(survey_id)
            .bind(&row.section_id)
            .bind(&row.question_id)
            .bind(&row.text)
            .bind(row.question_type.as_str())
            .bind(&row.options)
            .bind(&row.config)
            .bind(&row.rationale)
            .bind(row.order_index)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }

        Ok(survey_id)
    }

    async fn get_survey(
        &self,
        user_id: Uuid,
        survey_id: Uuid,
    ) -> PortResult<(SurveyRequest, Vec<QuestionRow>)> {
        let request = sqlx::query_as::<_, SurveyRequestRecord>(
            "SELECT id, brand_name, brand_description, brand_category, brand_market, \
             survey_context, survey_goals, target_audience, number_of_questions, created_at \
             FROM survey_requests WHERE id = $1 AND user_id = $2",
        )
        .bind(survey_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Survey {} not found", survey_id))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;

        let records = sqlx::query_as::<_, QuestionRowRecord>(
            "SELECT section_id, question_id, question_text, question_type, options, config, \
             rationale, order_index \
             FROM survey_questions WHERE survey_request_id = $1 ORDER BY order_index ASC",
        )
        .bind(survey_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // A request row whose question insert never landed is treated as absent.
        if records.is_empty() {
            return Err(PortError::NotFound(format!(
                "Survey {} not found",
                survey_id
            )));
        }

        let rows = records
            .into_iter()
            .map(|r| r.to_domain())
            .collect::<PortResult<Vec<_>>>()?;
        Ok((request.to_domain(), rows))
    }

    async fn list_surveys(&self, user_id: Uuid) -> PortResult<Vec<SurveySummary>> {
        let records = sqlx::query_as::<_, SurveySummaryRecord>(
            "SELECT id, brand_name, created_at FROM survey_requests \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_survey(&self, user_id: Uuid, survey_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM survey_requests WHERE id = $1 AND user_id = $2")
            .bind(survey_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Survey {} not found",
                survey_id
            )));
        }
        Ok(())
    }
}
