use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::{NewResume, ResumeRow};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("resume {0} not found")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create/read/update access to resume records.
///
/// Carried in `AppState` as `Arc<dyn ResumeRepository>`. No locking is offered:
/// concurrent feedback updates to one id resolve as last-write-wins.
#[async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn create(&self, resume: NewResume) -> Result<ResumeRow, RepositoryError>;

    async fn get(&self, id: Uuid) -> Result<Option<ResumeRow>, RepositoryError>;

    /// Newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<ResumeRow>, RepositoryError>;

    /// Replaces any previous feedback wholesale.
    async fn update_feedback(&self, id: Uuid, feedback: &str)
        -> Result<ResumeRow, RepositoryError>;
}

#[derive(Clone)]
pub struct PgResumeRepository {
    pool: PgPool,
}

impl PgResumeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeRepository for PgResumeRepository {
    async fn create(&self, resume: NewResume) -> Result<ResumeRow, RepositoryError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes
                (id, owner_id, job_title, job_description, company_name, pdf_path, image_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(resume.owner_id)
        .bind(&resume.job_title)
        .bind(&resume.job_description)
        .bind(&resume.company_name)
        .bind(&resume.pdf_path)
        .bind(&resume.image_path)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted resume {} for owner {}", row.id, row.owner_id);
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ResumeRow>, RepositoryError> {
        Ok(
            sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<ResumeRow>, RepositoryError> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_feedback(
        &self,
        id: Uuid,
        feedback: &str,
    ) -> Result<ResumeRow, RepositoryError> {
        sqlx::query_as::<_, ResumeRow>(
            r#"
            UPDATE resumes
            SET feedback = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(feedback)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound(id))
    }
}
