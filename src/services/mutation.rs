// src/services/mutation.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use uuid::Uuid;

use crate::common::error::AppError;

/// Estado "em andamento" de uma mutação (criar/excluir) contra o gateway.
/// Conta as chamadas em voo: `try_begin` só entra com o contador em zero,
/// `begin` sempre entra. Fica pendente até o último guard cair.
#[derive(Clone, Default)]
pub struct MutationState {
    in_flight: Arc<AtomicUsize>,
}

impl MutationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    pub fn try_begin(&self) -> Option<MutationGuard> {
        self.in_flight
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| MutationGuard { in_flight: self.in_flight.clone() })
    }

    pub fn begin(&self) -> MutationGuard {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        MutationGuard { in_flight: self.in_flight.clone() }
    }

    // Alguém além desta cópia ainda segura o estado (outro cartão ou um guard)
    fn is_shared(&self) -> bool {
        Arc::strong_count(&self.in_flight) > 1
    }
}

// Libera o estado no drop, inclusive se o future for abandonado no meio do caminho
pub struct MutationGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for MutationGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Um `MutationState` por id, compartilhado entre as requisições que montam
/// cartões da mesma OS.
#[derive(Clone, Default)]
pub struct MutationRegistry {
    states: Arc<Mutex<HashMap<Uuid, MutationState>>>,
}

impl MutationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_for(&self, id: Uuid) -> Result<MutationState, AppError> {
        let mut states = self
            .states
            .lock()
            .map_err(|e| AppError::InternalServerError(anyhow!("Registro de mutações envenenado: {}", e)))?;
        // Entradas que só o mapa segura não servem a ninguém
        states.retain(|_, state| state.is_shared());
        Ok(states.entry(id).or_default().clone())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.states.lock().map(|s| s.len()).unwrap_or_default()
    }
}
