// viz-service/src/db.rs
use diesel::sql_query;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{pooled_connection::bb8::Pool, AsyncPgConnection, RunQueryDsl};

// Type alias pour le pool de connexions
pub type DbPool = Pool<AsyncPgConnection>;

// Fonction pour créer le pool de connexions
pub async fn create_pool(database_url: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(10) // Nombre maximum de connexions dans le pool
        .build(config)
        .await?;

    Ok(pool)
}

// One round trip through the pool so a bad DATABASE_URL surfaces at startup
// when the fail-fast posture is selected.
pub async fn ping(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = pool.get().await?;
    sql_query("SELECT 1").execute(&mut conn).await?;
    Ok(())
}
