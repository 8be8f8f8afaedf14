use thiserror::Error;

pub type Result<T> = std::result::Result<T, StormRiskError>;

#[derive(Error, Debug)]
pub enum StormRiskError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A page-level commit failure in the batch assessment driver. The run
    /// halts at this offset; re-invocation restarts from page 1 and relies on
    /// upsert idempotence.
    #[error("Page commit failed at offset {offset}: {source}")]
    PageCommit {
        offset: i64,
        #[source]
        source: sqlx::Error,
    },

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: crate::types::PipelineStage,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
