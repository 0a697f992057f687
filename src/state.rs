use crate::config::{AppConfig, StoreBackend};
use crate::enrichment::{NutritionCoach, OfflineCoach, OpenRouterCoach};
use crate::store::{EventStore, MemoryStore, PgEventStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn EventStore>,
    pub coach: Arc<dyn NutritionCoach>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match (config.store_backend, config.database_url.as_deref()) {
            (StoreBackend::Postgres, Some(url)) => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .acquire_timeout(config.store_timeout)
                    .connect(url)
                    .await?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    tracing::warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(PgEventStore::new(db)) as Arc<dyn EventStore>
            }
            (StoreBackend::Postgres, None) => anyhow::bail!("DATABASE_URL is not set"),
            (StoreBackend::Memory, _) => {
                tracing::warn!("using in-memory store; data is lost on restart");
                Arc::new(MemoryStore::new()) as Arc<dyn EventStore>
            }
        };

        let coach = match &config.openrouter_api_key {
            Some(key) => Arc::new(OpenRouterCoach::new(config.llm.clone(), key.clone())?)
                as Arc<dyn NutritionCoach>,
            None => {
                tracing::warn!("OPENROUTER_API_KEY not set; calorie estimates and tips use fallbacks");
                Arc::new(OfflineCoach) as Arc<dyn NutritionCoach>
            }
        };

        Ok(Self {
            config,
            store,
            coach,
        })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(Arc::new(MemoryStore::new()), Arc::new(OfflineCoach))
    }

    #[cfg(test)]
    pub fn fake_with(store: Arc<dyn EventStore>, coach: Arc<dyn NutritionCoach>) -> Self {
        use crate::config::{JwtConfig, LlmConfig};

        let config = Arc::new(AppConfig {
            store_backend: StoreBackend::Memory,
            database_url: None,
            store_timeout: std::time::Duration::from_millis(200),
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
            },
            llm: LlmConfig {
                base_url: "http://127.0.0.1:9".into(),
                model: "test".into(),
                app_url: "http://localhost".into(),
                timeout_secs: 1,
            },
            openrouter_api_key: None,
        });

        Self {
            config,
            store,
            coach,
        }
    }
}
