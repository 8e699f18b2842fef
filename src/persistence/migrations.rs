use crate::error::Result;
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

/// Schema migrations embedded from `migrations/`
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    info!(
        migrations = MIGRATOR.iter().count(),
        "Mission run schema is up to date"
    );
    Ok(())
}
