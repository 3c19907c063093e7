use sqlx::{query, PgPool, Row};
use crate::middleware::error_handling::Result;

/// Named integer counters (one row per entity type) handing out ids.
pub struct SequenceRepository {
    pool: PgPool,
}

impl SequenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atomically increment `counter` and return the new value. The first call
    /// for a counter returns 1.
    pub async fn next(&self, counter: &str) -> Result<i64> {
        let row = query(
            r#"
            INSERT INTO counters (name, seq)
            VALUES ($1, 1)
            ON CONFLICT (name) DO UPDATE SET seq = counters.seq + 1
            RETURNING seq
            "#
        )
        .bind(counter)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("seq")?)
    }
}
