use sqlx::{Executor, Pool, Postgres};

// Embed SQL migrations at compile time for deterministic startup
const MIG_0001: &str = include_str!("../migrations/0001_create_users.sql");
const MIG_0002: &str = include_str!("../migrations/0002_create_listings.sql");
const MIG_0003: &str = include_str!("../migrations/0003_create_exchanges.sql");
const MIG_0004: &str = include_str!("../migrations/0004_create_messages.sql");

pub async fn run_all(db: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    // Run sequentially; each migration may contain multiple statements, so
    // they go through the unprepared text protocol
    for (i, sql) in [MIG_0001, MIG_0002, MIG_0003, MIG_0004]
        .into_iter()
        .enumerate()
    {
        let label = i + 1;
        match db.execute(sql).await {
            Ok(_) => tracing::info!(migration = %label, "exchange-service migration applied"),
            Err(e) => {
                tracing::warn!(migration = %label, error = %e, "migration may have been applied already");
            }
        }
    }
    Ok(())
}
