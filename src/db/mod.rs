pub mod models;
pub mod repository;

pub use models::*;
pub use repository::{
    DeliveryLogRepository, OrderRepository, SubscriptionRepository, UserRepository,
};

#[cfg(test)]
pub(crate) mod test_util {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    /// In-memory database running the real migrations. Capped at one
    /// connection: each new `sqlite::memory:` connection would otherwise
    /// open a fresh, empty database.
    pub(crate) async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }
}
