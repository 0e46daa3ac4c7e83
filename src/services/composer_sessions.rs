// src/services/composer_sessions.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::gateway::{CatalogProvider, LineItemGateway},
    services::staging_service::LineItemStagingList,
};

struct Session {
    list: Arc<LineItemStagingList>,
    last_access: Instant,
}

// Uma lista de peças viva por editor de orçamento aberto.
// Fechar a sessão (ou deixá-la parada além do limite) descarta os rascunhos que ainda estiverem nela.
#[derive(Clone)]
pub struct ComposerSessions {
    catalog: Arc<dyn CatalogProvider>,
    gateway: Arc<dyn LineItemGateway>,
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl ComposerSessions {
    pub fn new(catalog: Arc<dyn CatalogProvider>, gateway: Arc<dyn LineItemGateway>) -> Self {
        Self {
            catalog,
            gateway,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn open(&self, quote_id: Option<Uuid>) -> (Uuid, Arc<LineItemStagingList>) {
        let session_id = Uuid::new_v4();
        let list = Arc::new(LineItemStagingList::new(
            quote_id,
            self.catalog.clone(),
            self.gateway.clone(),
        ));
        let session = Session { list: list.clone(), last_access: Instant::now() };
        self.sessions.write().await.insert(session_id, session);
        tracing::debug!("Sessão {} aberta ({:?})", session_id, list.mode());
        (session_id, list)
    }

    pub async fn get(&self, session_id: Uuid) -> Result<Arc<LineItemStagingList>, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&session_id).ok_or(AppError::SessionNotFound)?;
        session.last_access = Instant::now();
        Ok(session.list.clone())
    }

    pub async fn close(&self, session_id: Uuid) -> Result<(), AppError> {
        match self.sessions.write().await.remove(&session_id) {
            Some(session) => {
                let discarded = session.list.drafts().map(|d| d.len()).unwrap_or_default();
                tracing::debug!("Sessão {} fechada, {} rascunho(s) descartado(s)", session_id, discarded);
                Ok(())
            }
            None => Err(AppError::SessionNotFound),
        }
    }

    /// Remove as sessões sem acesso há mais de `max_idle`. Devolve quantas saíram.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_access.elapsed() <= max_idle);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!("{} sessão(ões) de orçamento expirada(s)", evicted);
        }
        evicted
    }

    // Editor fechado sem DELETE (aba fechada, queda do frontend) some sozinho
    pub fn spawn_idle_reaper(&self, max_idle: Duration) -> JoinHandle<()> {
        let sessions = self.clone();
        let period = max_idle.min(Duration::from_secs(60)).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                sessions.evict_idle(max_idle).await;
            }
        })
    }
}
