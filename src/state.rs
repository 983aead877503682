use crate::classifier::{FoodClassifier, HeuristicClassifier, NutritionTable};
use crate::config::AppConfig;
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub classifier: Arc<dyn FoodClassifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let classifier = Arc::new(HeuristicClassifier::new(NutritionTable::embedded()?))
            as Arc<dyn FoodClassifier>;

        Ok(Self {
            db,
            config,
            classifier,
        })
    }

    /// Test state over an existing pool, with the embedded classifier.
    pub fn with_pool(db: PgPool) -> Self {
        let table = NutritionTable::embedded().expect("embedded nutrition table parses");
        let classifier = Arc::new(HeuristicClassifier::new(table)) as Arc<dyn FoodClassifier>;

        Self {
            db,
            config: Arc::new(AppConfig::for_tests()),
            classifier,
        }
    }

    /// State backed by a lazily connecting pool; nothing touches the
    /// database until a query actually runs.
    pub fn fake() -> Self {
        let config = AppConfig::for_tests();
        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .expect("lazy pool ok");

        Self::with_pool(db)
    }
}
