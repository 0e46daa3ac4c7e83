// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{
        gateway::{CatalogProvider, LineItemGateway, WorkOrderGateway},
        memory::Seed,
        CatalogRepository, InMemoryStore, QuoteRepository, WorkOrderRepository,
    },
    services::{composer_sessions::ComposerSessions, mutation::MutationRegistry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

// Tudo que vem do ambiente (.env)
#[derive(Debug, Clone)]
pub struct Settings {
    pub server_addr: String,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub memory_seed: Option<PathBuf>,
    pub composer_idle_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let storage = match env::var("STORAGE_BACKEND").unwrap_or_else(|_| "postgres".into()).as_str() {
            "postgres" => StorageBackend::Postgres,
            "memory" => StorageBackend::Memory,
            other => return Err(anyhow!("STORAGE_BACKEND inválido: '{}' (use 'postgres' ou 'memory')", other)),
        };

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            Err(_) => 5,
        };

        let composer_idle_secs: u64 = match env::var("COMPOSER_IDLE_SECS") {
            Ok(raw) => raw.parse().context("COMPOSER_IDLE_SECS deve ser um número")?,
            Err(_) => 1800,
        };
        if composer_idle_secs == 0 {
            return Err(anyhow!("COMPOSER_IDLE_SECS deve ser maior que zero"));
        }

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            storage,
            database_url: env::var("DATABASE_URL").ok(),
            db_max_connections,
            memory_seed: env::var("MEMORY_SEED").ok().map(PathBuf::from),
            composer_idle_timeout: Duration::from_secs(composer_idle_secs),
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub work_orders: Arc<dyn WorkOrderGateway>,
    pub composers: ComposerSessions,
    pub deletes: MutationRegistry,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        match settings.storage {
            StorageBackend::Memory => {
                tracing::warn!("⚠️ Usando armazenamento em memória: nada será persistido.");
                let store = InMemoryStore::new();
                if let Some(path) = &settings.memory_seed {
                    let raw = std::fs::read_to_string(path)
                        .with_context(|| format!("Falha ao ler MEMORY_SEED '{}'", path.display()))?;
                    let seed: Seed = serde_json::from_str(&raw).context("MEMORY_SEED não é um JSON válido")?;
                    store.load_seed(seed)?;
                }
                Ok(Self::in_memory(store))
            }
            StorageBackend::Postgres => {
                let database_url = settings
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("DATABASE_URL deve ser definida"))?;

                let db_pool = PgPoolOptions::new()
                    .max_connections(settings.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                // --- Monta o gráfico de dependências ---
                Ok(Self::from_gateways(
                    Arc::new(CatalogRepository::new(db_pool.clone())),
                    Arc::new(QuoteRepository::new(db_pool.clone())),
                    Arc::new(WorkOrderRepository::new(db_pool)),
                ))
            }
        }
    }

    pub fn in_memory(store: InMemoryStore) -> Self {
        Self::from_gateways(Arc::new(store.clone()), Arc::new(store.clone()), Arc::new(store))
    }

    pub fn from_gateways(
        catalog: Arc<dyn CatalogProvider>,
        line_items: Arc<dyn LineItemGateway>,
        work_orders: Arc<dyn WorkOrderGateway>,
    ) -> Self {
        Self {
            composers: ComposerSessions::new(catalog.clone(), line_items),
            catalog,
            work_orders,
            deletes: MutationRegistry::new(),
        }
    }
}
