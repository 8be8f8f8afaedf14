use sqlx::PgPool;
use tracing::warn;

/// Append-only writer for the `system_logs` table, used for durable stage
/// success/failure records.
#[derive(Clone)]
pub struct SystemLog {
    pool: PgPool,
}

impl SystemLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a log row. Logs a warning on failure rather than propagating —
    /// a failed audit write shouldn't mask the outcome it was recording.
    pub async fn record(&self, level: &str, message: &str, context: serde_json::Value) {
        let result = sqlx::query(
            r#"
            INSERT INTO system_logs (level, message, context)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(level)
        .bind(message)
        .bind(&context)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            warn!(message, error = %e, "Failed to write system log record");
        }
    }
}
