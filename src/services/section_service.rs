// src/services/section_service.rs

use std::{collections::BTreeSet, sync::Arc};

use dashmap::DashMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    db::SectionStore,
    models::{
        asset::LogoType,
        auth::CurrentUser,
        rbac::{Action, Resource},
        section::HiddenSection,
    },
    services::optimistic::{MutationState, OptimisticUpdate},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub section_type: LogoType,
    pub hidden: bool,
}

/// Quais seções de logo o usuário enxerga.
/// Quem pode reexibir (ADMIN+) vê todas, marcadas; os demais só as visíveis.
pub fn visible_sections(user: &CurrentUser, hidden: &BTreeSet<LogoType>) -> Vec<SectionView> {
    let sees_hidden = user.can(Action::Delete, Resource::HiddenSections);

    LogoType::ALL
        .into_iter()
        .map(|section_type| SectionView {
            section_type,
            hidden: hidden.contains(&section_type),
        })
        .filter(|view| sees_hidden || !view.hidden)
        .collect()
}

#[derive(Clone)]
pub struct SectionService {
    store: Arc<dyn SectionStore>,
    // Estado local por cliente, atualizado de forma otimista
    cache: Arc<DashMap<i32, BTreeSet<LogoType>>>,
}

impl SectionService {
    pub fn new(store: Arc<dyn SectionStore>) -> Self {
        Self {
            store,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Lista do banco (fonte da verdade) e atualiza o cache.
    pub async fn list_hidden(&self, client_id: i32) -> Result<Vec<HiddenSection>, AppError> {
        let rows = self.store.list_hidden(client_id).await?;
        self.cache
            .insert(client_id, rows.iter().map(|r| r.section_type).collect());
        Ok(rows)
    }

    pub async fn hidden_set(&self, client_id: i32) -> Result<BTreeSet<LogoType>, AppError> {
        if let Some(cached) = self.cache.get(&client_id) {
            return Ok(cached.clone());
        }
        let rows = self.list_hidden(client_id).await?;
        Ok(rows.into_iter().map(|r| r.section_type).collect())
    }

    /// `visible → hidden` (hidden = true) ou `hidden → visible` (hidden = false).
    /// Aplica no cache antes de gravar. Se a gravação falhar, desfaz só esta
    /// alternância; mudanças concorrentes de outras seções ficam intactas.
    pub async fn set_visibility(
        &self,
        client_id: i32,
        section: LogoType,
        hidden: bool,
    ) -> Result<HiddenSection, AppError> {
        // Garante o cache carregado antes de mexer nele
        self.hidden_set(client_id).await?;

        // O guard do DashMap não pode atravessar o await abaixo
        let (update, changed) = {
            let mut set = self.cache.entry(client_id).or_default();
            let mut is_hidden = set.contains(&section);
            let update = OptimisticUpdate::begin(&mut is_hidden, |h| *h = hidden);
            let changed = toggle(&mut set, section, is_hidden);
            (update, changed)
        };

        match self.store.set_hidden(client_id, section, hidden).await {
            Ok(row) => {
                let state = update.commit();
                tracing::info!("Seção {:?} do cliente {} -> hidden={} ({:?})", section, client_id, hidden, state);
                Ok(row)
            }
            Err(e) => {
                let mut is_hidden = hidden;
                let state = update.rollback(&mut is_hidden);
                debug_assert_eq!(state, MutationState::RolledBack);
                if changed {
                    if let Some(mut set) = self.cache.get_mut(&client_id) {
                        toggle(&mut set, section, is_hidden);
                    }
                }
                tracing::warn!("Falha ao alternar seção {:?} do cliente {}; estado revertido", section, client_id);
                Err(e)
            }
        }
    }
}

/// Põe ou tira `section` do conjunto. Devolve se algo mudou.
fn toggle(set: &mut BTreeSet<LogoType>, section: LogoType, hidden: bool) -> bool {
    if hidden {
        set.insert(section)
    } else {
        set.remove(&section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use crate::models::auth::UserRole;

    #[derive(Default)]
    struct FakeStore {
        fail_writes: AtomicBool,
        rows: std::sync::Mutex<Vec<HiddenSection>>,
    }

    #[async_trait]
    impl SectionStore for FakeStore {
        async fn list_hidden(&self, client_id: i32) -> Result<Vec<HiddenSection>, AppError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.client_id == client_id && r.is_hidden)
                .cloned()
                .collect())
        }

        async fn set_hidden(&self, client_id: i32, section: LogoType, hidden: bool) -> Result<HiddenSection, AppError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AppError::InternalServerError(anyhow::anyhow!("banco fora do ar")));
            }
            let row = HiddenSection {
                client_id,
                section_type: section,
                is_hidden: hidden,
                updated_at: Utc::now(),
            };
            let mut rows = self.rows.lock().unwrap();
            rows.retain(|r| !(r.client_id == client_id && r.section_type == section));
            rows.push(row.clone());
            Ok(row)
        }
    }

    /// Grava com atraso; a seção em `fail` sempre falha.
    struct SlowStore {
        inner: FakeStore,
        fail: LogoType,
    }

    #[async_trait]
    impl SectionStore for SlowStore {
        async fn list_hidden(&self, client_id: i32) -> Result<Vec<HiddenSection>, AppError> {
            self.inner.list_hidden(client_id).await
        }

        async fn set_hidden(&self, client_id: i32, section: LogoType, hidden: bool) -> Result<HiddenSection, AppError> {
            if section == self.fail {
                tokio::time::sleep(Duration::from_millis(50)).await;
                return Err(AppError::InternalServerError(anyhow::anyhow!("timeout")));
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.inner.set_hidden(client_id, section, hidden).await
        }
    }

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser { id: 1, role }
    }

    #[tokio::test]
    async fn hide_then_show_updates_cache() {
        let service = SectionService::new(Arc::new(FakeStore::default()));

        service.set_visibility(9, LogoType::Favicon, true).await.unwrap();
        assert!(service.hidden_set(9).await.unwrap().contains(&LogoType::Favicon));

        service.set_visibility(9, LogoType::Favicon, false).await.unwrap();
        assert!(service.hidden_set(9).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_write_rolls_back_the_cache() {
        let store = Arc::new(FakeStore::default());
        let service = SectionService::new(store.clone());
        service.set_visibility(9, LogoType::Square, true).await.unwrap();

        store.fail_writes.store(true, Ordering::SeqCst);
        let result = service.set_visibility(9, LogoType::Favicon, true).await;

        assert!(result.is_err());
        let hidden = service.hidden_set(9).await.unwrap();
        assert_eq!(hidden, BTreeSet::from([LogoType::Square]));
    }

    #[tokio::test]
    async fn failed_toggle_keeps_concurrent_success() {
        let store = Arc::new(SlowStore {
            inner: FakeStore::default(),
            fail: LogoType::Favicon,
        });
        let service = SectionService::new(store.clone());
        service.hidden_set(9).await.unwrap();

        let (favicon, square) = tokio::join!(
            service.set_visibility(9, LogoType::Favicon, true),
            service.set_visibility(9, LogoType::Square, true),
        );
        assert!(favicon.is_err());
        assert!(square.is_ok());

        let db: BTreeSet<LogoType> = store
            .list_hidden(9)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.section_type)
            .collect();
        assert_eq!(db, BTreeSet::from([LogoType::Square]));
        assert_eq!(service.hidden_set(9).await.unwrap(), db);
    }

    #[tokio::test]
    async fn failed_noop_toggle_leaves_cache_alone() {
        let store = Arc::new(FakeStore::default());
        let service = SectionService::new(store.clone());
        service.set_visibility(9, LogoType::Square, true).await.unwrap();

        store.fail_writes.store(true, Ordering::SeqCst);
        assert!(service.set_visibility(9, LogoType::Square, true).await.is_err());

        assert_eq!(service.hidden_set(9).await.unwrap(), BTreeSet::from([LogoType::Square]));
    }

    #[test]
    fn non_admins_never_see_hidden_sections() {
        let hidden = BTreeSet::from([LogoType::Favicon]);

        let editor_view = visible_sections(&user(UserRole::Editor), &hidden);
        assert_eq!(editor_view.len(), LogoType::ALL.len() - 1);
        assert!(editor_view.iter().all(|v| v.section_type != LogoType::Favicon));

        let admin_view = visible_sections(&user(UserRole::Admin), &hidden);
        assert_eq!(admin_view.len(), LogoType::ALL.len());
        assert!(admin_view
            .iter()
            .any(|v| v.section_type == LogoType::Favicon && v.hidden));
    }
}
