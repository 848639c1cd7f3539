// src/services/stage_tracker.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProductStore,
    models::product::{
        dedup_partners, BoardColumn, CreateProductRequest, NewProduct, Product, ProductListEntry,
        Stage, StageHistoryEntry, StageTransition, UpdateProductRequest,
    },
};

/// Dias parado na mesma etapa a partir dos quais a lista sinaliza o produto.
pub const STAGE_OVERDUE_DAYS: i64 = 30;

const DEFAULT_SHELF_LIFE_MONTHS: i32 = 24;

#[derive(Debug)]
pub enum MoveOutcome {
    Moved(Product),
    /// Destino igual à etapa atual: nada foi gravado.
    Unchanged(Product),
}

/// Decisão tomada antes de tocar no banco.
#[derive(Debug)]
pub enum MovePlan {
    Unchanged,
    ConfirmationRequired,
    Apply(StageTransition),
}

pub fn plan_move(
    product: &Product,
    target: Stage,
    confirmed: bool,
    actor_id: Uuid,
    at: DateTime<Utc>,
    notes: Option<String>,
) -> MovePlan {
    if target == product.current_stage {
        return MovePlan::Unchanged;
    }
    if target.is_terminal() && !confirmed {
        return MovePlan::ConfirmationRequired;
    }

    MovePlan::Apply(StageTransition {
        product_id: product.id,
        from: product.current_stage,
        to: target,
        actor_id,
        at,
        notes,
        progress: target.is_terminal().then_some(100),
    })
}

/// Dias inteiros desde a entrada na etapa (nunca negativo).
pub fn days_in_stage(stage_entered_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - stage_entered_at).num_days().max(0)
}

/// Uma coluna por etapa, na ordem do catálogo, inclusive as vazias.
pub fn build_board(products: Vec<Product>) -> Vec<BoardColumn> {
    let mut columns: Vec<BoardColumn> = Stage::ALL
        .iter()
        .map(|stage| BoardColumn {
            stage: *stage,
            label: stage.label().to_string(),
            position: stage.index(),
            products: Vec::new(),
        })
        .collect();

    for product in products {
        columns[product.current_stage.index()].products.push(product);
    }
    columns
}

#[derive(Clone)]
pub struct StageTracker {
    store: Arc<dyn ProductStore>,
}

impl StageTracker {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    // --- CADASTRO ---

    pub async fn create_product(
        &self,
        actor_id: Uuid,
        request: CreateProductRequest,
    ) -> Result<Product, AppError> {
        let new = NewProduct {
            name: request.name,
            category: request.category,
            product_type: request.product_type,
            description: request.description,
            image_url: request.image_url,
            priority: request.priority,
            progress: request.progress,
            stage: request.initial_stage.unwrap_or(Stage::INITIAL),
            assigned_partners: dedup_partners(&request.assigned_partners),
            shelf_life_months: request.shelf_life_months.unwrap_or(DEFAULT_SHELF_LIFE_MONTHS),
            created_by: actor_id,
            created_at: Utc::now(),
        };

        let product = self.store.create_product(new).await?;
        tracing::info!("🧪 Produto '{}' criado na etapa {}", product.name, product.current_stage);
        Ok(product)
    }

    pub async fn update_product(
        &self,
        product_id: Uuid,
        request: &UpdateProductRequest,
    ) -> Result<Product, AppError> {
        self.store
            .update_product(product_id, request)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Produto".into()))
    }

    pub async fn get_product(&self, product_id: Uuid) -> Result<Product, AppError> {
        self.store
            .find_product(product_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Produto".into()))
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.store.list_products().await
    }

    pub async fn history(&self, product_id: Uuid) -> Result<Vec<StageHistoryEntry>, AppError> {
        // 404 em vez de lista vazia para produto inexistente
        self.get_product(product_id).await?;
        self.store.stage_history(product_id).await
    }

    // --- TRANSIÇÃO ---

    pub async fn move_product(
        &self,
        actor_id: Uuid,
        product_id: Uuid,
        target: Stage,
        confirmed: bool,
        notes: Option<String>,
    ) -> Result<MoveOutcome, AppError> {
        let product = self.get_product(product_id).await?;

        match plan_move(&product, target, confirmed, actor_id, Utc::now(), notes) {
            MovePlan::Unchanged => Ok(MoveOutcome::Unchanged(product)),
            MovePlan::ConfirmationRequired => Err(AppError::StageConfirmationRequired(target)),
            MovePlan::Apply(transition) => {
                let moved = self.store.apply_transition(&transition).await?;
                tracing::info!(
                    "➡️  Produto {} movido de {} para {}",
                    moved.id,
                    transition.from,
                    transition.to
                );
                Ok(MoveOutcome::Moved(moved))
            }
        }
    }

    pub async fn move_to_next_stage(
        &self,
        actor_id: Uuid,
        product_id: Uuid,
        confirmed: bool,
        notes: Option<String>,
    ) -> Result<MoveOutcome, AppError> {
        let product = self.get_product(product_id).await?;

        match product.current_stage.next() {
            None => Ok(MoveOutcome::Unchanged(product)),
            Some(next) => self.move_product(actor_id, product_id, next, confirmed, notes).await,
        }
    }

    // --- VISÕES ---

    pub async fn board(&self, assigned_to: Option<Uuid>) -> Result<Vec<BoardColumn>, AppError> {
        let products = self
            .store
            .list_products()
            .await?
            .into_iter()
            .filter(|p| assigned_to.is_none_or(|user| p.assigned_partners.contains(&user)))
            .collect();

        Ok(build_board(products))
    }

    pub async fn list_view(&self, now: DateTime<Utc>) -> Result<Vec<ProductListEntry>, AppError> {
        let entries = self
            .store
            .list_products()
            .await?
            .into_iter()
            .map(|product| {
                let days = days_in_stage(product.stage_entered_at, now);
                ProductListEntry {
                    product,
                    days_in_stage: days,
                    stage_overdue: days >= STAGE_OVERDUE_DAYS,
                }
            })
            .collect();

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use async_trait::async_trait;
    use chrono::Duration;

    use super::*;
    use crate::models::product::Priority;

    // Implementação em memória com as mesmas garantias do Postgres:
    // transição tudo-ou-nada e checagem da etapa de origem.
    #[derive(Default)]
    struct MemoryState {
        products: HashMap<Uuid, Product>,
        history: Vec<StageHistoryEntry>,
    }

    // Um único lock cobre produtos e histórico
    #[derive(Default)]
    struct MemoryStore {
        state: Mutex<MemoryState>,
    }

    impl MemoryStore {
        fn open_intervals(&self, product_id: Uuid) -> Vec<StageHistoryEntry> {
            self.state
                .lock()
                .unwrap()
                .history
                .iter()
                .filter(|h| h.product_id == product_id && h.is_open())
                .cloned()
                .collect()
        }

        fn backdate(&self, product_id: Uuid, days: i64) {
            let mut state = self.state.lock().unwrap();
            let p = state.products.get_mut(&product_id).unwrap();
            p.stage_entered_at -= Duration::days(days);
        }
    }

    #[async_trait]
    impl ProductStore for MemoryStore {
        async fn list_products(&self) -> Result<Vec<Product>, AppError> {
            let mut all: Vec<Product> = self.state.lock().unwrap().products.values().cloned().collect();
            all.sort_by_key(|p| p.stage_entered_at);
            Ok(all)
        }

        async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
            Ok(self.state.lock().unwrap().products.get(&id).cloned())
        }

        async fn create_product(&self, new: NewProduct) -> Result<Product, AppError> {
            let product = Product {
                id: Uuid::new_v4(),
                name: new.name,
                category: new.category,
                product_type: new.product_type,
                description: new.description,
                image_url: new.image_url,
                priority: new.priority,
                progress: new.progress,
                current_stage: new.stage,
                stage_entered_at: new.created_at,
                assigned_partners: new.assigned_partners,
                shelf_life_months: new.shelf_life_months,
                created_by: new.created_by,
                created_at: new.created_at,
                updated_at: new.created_at,
            };
            let mut state = self.state.lock().unwrap();
            state.history.push(StageHistoryEntry {
                id: Uuid::new_v4(),
                product_id: product.id,
                stage: product.current_stage,
                entered_at: product.stage_entered_at,
                exited_at: None,
                actor_id: new.created_by,
                notes: None,
            });
            state.products.insert(product.id, product.clone());
            Ok(product)
        }

        async fn update_product(
            &self,
            id: Uuid,
            changes: &UpdateProductRequest,
        ) -> Result<Option<Product>, AppError> {
            let mut state = self.state.lock().unwrap();
            let Some(p) = state.products.get_mut(&id) else {
                return Ok(None);
            };
            p.name = changes.name.clone();
            p.priority = changes.priority;
            p.progress = changes.progress;
            p.assigned_partners = dedup_partners(&changes.assigned_partners);
            p.shelf_life_months = changes.shelf_life_months;
            Ok(Some(p.clone()))
        }

        async fn apply_transition(&self, t: &StageTransition) -> Result<Product, AppError> {
            let mut state = self.state.lock().unwrap();
            let MemoryState { products, history } = &mut *state;

            let product = products
                .get_mut(&t.product_id)
                .ok_or_else(|| AppError::ResourceNotFound("Produto".into()))?;
            if product.current_stage != t.from {
                return Err(AppError::StageConflict);
            }

            for entry in history.iter_mut().filter(|h| h.product_id == t.product_id && h.is_open()) {
                entry.exited_at = Some(t.at);
            }
            product.current_stage = t.to;
            product.stage_entered_at = t.at;
            if let Some(progress) = t.progress {
                product.progress = progress;
            }
            history.push(StageHistoryEntry {
                id: Uuid::new_v4(),
                product_id: t.product_id,
                stage: t.to,
                entered_at: t.at,
                exited_at: None,
                actor_id: t.actor_id,
                notes: t.notes.clone(),
            });
            Ok(product.clone())
        }

        async fn stage_history(&self, product_id: Uuid) -> Result<Vec<StageHistoryEntry>, AppError> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .history
                .iter()
                .filter(|h| h.product_id == product_id)
                .cloned()
                .collect())
        }
    }

    fn setup() -> (Arc<MemoryStore>, StageTracker) {
        let store = Arc::new(MemoryStore::default());
        let tracker = StageTracker::new(store.clone());
        (store, tracker)
    }

    fn request(name: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            category: Some("Skincare".into()),
            product_type: None,
            description: None,
            image_url: None,
            priority: Priority::High,
            progress: 35,
            initial_stage: None,
            assigned_partners: vec![],
            shelf_life_months: None,
        }
    }

    fn product(outcome: MoveOutcome) -> Product {
        match outcome {
            MoveOutcome::Moved(p) | MoveOutcome::Unchanged(p) => p,
        }
    }

    #[tokio::test]
    async fn new_products_start_at_idea_with_one_open_interval() {
        let (store, tracker) = setup();
        let actor = Uuid::new_v4();

        let p = tracker.create_product(actor, request("Sérum")).await.unwrap();

        assert_eq!(p.current_stage, Stage::Idea);
        assert_eq!(p.shelf_life_months, 24);
        let open = store.open_intervals(p.id);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].stage, Stage::Idea);
    }

    #[tokio::test]
    async fn five_advances_from_idea_land_on_packaging() {
        let (store, tracker) = setup();
        let actor = Uuid::new_v4();
        let p = tracker.create_product(actor, request("Tônico")).await.unwrap();

        for _ in 0..5 {
            let outcome = tracker.move_to_next_stage(actor, p.id, false, None).await.unwrap();
            assert!(matches!(outcome, MoveOutcome::Moved(_)));
        }

        let current = tracker.get_product(p.id).await.unwrap();
        assert_eq!(current.current_stage, Stage::Packaging);
        assert_eq!(current.current_stage.index(), 4);

        // Intervalo aberto na criação + um por transição; só o último fica aberto
        let history = tracker.history(p.id).await.unwrap();
        assert_eq!(history.len(), 6);
        assert_eq!(history[0].stage, Stage::Idea);
        assert!(history[..5].iter().all(|h| h.exited_at.is_some()));
        assert!(history[5].is_open());
        assert_eq!(history[5].stage, Stage::Packaging);
        assert_eq!(store.open_intervals(p.id).len(), 1);
    }

    #[tokio::test]
    async fn moving_to_the_current_stage_is_a_no_op() {
        let (store, tracker) = setup();
        let actor = Uuid::new_v4();
        let p = tracker.create_product(actor, request("Máscara")).await.unwrap();
        let before = store.stage_history(p.id).await.unwrap();

        let outcome = tracker.move_product(actor, p.id, Stage::Idea, false, None).await.unwrap();

        assert!(matches!(outcome, MoveOutcome::Unchanged(_)));
        let after = store.stage_history(p.id).await.unwrap();
        assert_eq!(before.len(), after.len());
        assert!(after[0].is_open());
    }

    #[tokio::test]
    async fn launching_without_confirmation_changes_nothing() {
        let (store, tracker) = setup();
        let actor = Uuid::new_v4();
        let p = tracker.create_product(actor, request("Óleo")).await.unwrap();

        let err = tracker
            .move_product(actor, p.id, Stage::Launched, false, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StageConfirmationRequired(Stage::Launched)));
        let current = tracker.get_product(p.id).await.unwrap();
        assert_eq!(current.current_stage, Stage::Idea);
        assert_eq!(store.stage_history(p.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn confirmed_launch_sets_progress_to_100() {
        let (_, tracker) = setup();
        let actor = Uuid::new_v4();
        let p = tracker.create_product(actor, request("Batom")).await.unwrap();

        let launched = product(
            tracker
                .move_product(actor, p.id, Stage::Launched, true, Some("Lançamento".into()))
                .await
                .unwrap(),
        );

        assert_eq!(launched.current_stage, Stage::Launched);
        assert_eq!(launched.progress, 100);
    }

    #[tokio::test]
    async fn non_terminal_moves_keep_progress_and_may_go_backwards() {
        let (_, tracker) = setup();
        let actor = Uuid::new_v4();
        let p = tracker.create_product(actor, request("Creme")).await.unwrap();

        let forward = product(tracker.move_product(actor, p.id, Stage::Production, false, None).await.unwrap());
        assert_eq!(forward.progress, 35);

        let back = product(tracker.move_product(actor, p.id, Stage::Formula, false, None).await.unwrap());
        assert_eq!(back.current_stage, Stage::Formula);
        assert_eq!(back.progress, 35);
    }

    #[tokio::test]
    async fn advancing_a_launched_product_is_a_no_op() {
        let (store, tracker) = setup();
        let actor = Uuid::new_v4();
        let p = tracker.create_product(actor, request("Esfoliante")).await.unwrap();
        tracker.move_product(actor, p.id, Stage::Launched, true, None).await.unwrap();
        let entries = store.stage_history(p.id).await.unwrap().len();

        let outcome = tracker.move_to_next_stage(actor, p.id, true, None).await.unwrap();

        assert!(matches!(outcome, MoveOutcome::Unchanged(_)));
        assert_eq!(store.stage_history(p.id).await.unwrap().len(), entries);
    }

    #[tokio::test]
    async fn advancing_from_ready_still_requires_confirmation() {
        let (_, tracker) = setup();
        let actor = Uuid::new_v4();
        let mut req = request("Hidratante");
        req.initial_stage = Some(Stage::Ready);
        let p = tracker.create_product(actor, req).await.unwrap();

        let err = tracker.move_to_next_stage(actor, p.id, false, None).await.unwrap_err();
        assert!(matches!(err, AppError::StageConfirmationRequired(Stage::Launched)));
    }

    #[tokio::test]
    async fn stale_transition_is_rejected_as_conflict() {
        let (store, tracker) = setup();
        let actor = Uuid::new_v4();
        let p = tracker.create_product(actor, request("Gel")).await.unwrap();

        // Outra pessoa move antes
        tracker.move_product(actor, p.id, Stage::Research, false, None).await.unwrap();

        let stale = match plan_move(&p, Stage::Testing, false, actor, Utc::now(), None) {
            MovePlan::Apply(t) => t,
            other => panic!("plano inesperado: {other:?}"),
        };
        let err = store.apply_transition(&stale).await.unwrap_err();

        assert!(matches!(err, AppError::StageConflict));
        let open = store.open_intervals(p.id);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].stage, Stage::Research);
    }

    #[tokio::test]
    async fn open_interval_always_matches_current_stage() {
        let (store, tracker) = setup();
        let actor = Uuid::new_v4();
        let p = tracker.create_product(actor, request("Bruma")).await.unwrap();

        for target in [Stage::Testing, Stage::Idea, Stage::Printing, Stage::Printing, Stage::Ready] {
            let current = product(tracker.move_product(actor, p.id, target, false, None).await.unwrap());
            let open = store.open_intervals(p.id);
            assert_eq!(open.len(), 1);
            assert_eq!(open[0].stage, current.current_stage);
        }
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let (_, tracker) = setup();
        let err = tracker
            .move_product(Uuid::new_v4(), Uuid::new_v4(), Stage::Research, false, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));
    }

    #[tokio::test]
    async fn board_has_every_stage_in_catalog_order() {
        let (_, tracker) = setup();
        let actor = Uuid::new_v4();
        let partner = Uuid::new_v4();

        let mut mine = request("Sabonete");
        mine.assigned_partners = vec![partner, partner];
        let a = tracker.create_product(actor, mine).await.unwrap();
        assert_eq!(a.assigned_partners, vec![partner]);

        let b = tracker.create_product(actor, request("Shampoo")).await.unwrap();
        tracker.move_product(actor, b.id, Stage::Testing, false, None).await.unwrap();

        let board = tracker.board(None).await.unwrap();
        let stages: Vec<Stage> = board.iter().map(|c| c.stage).collect();
        assert_eq!(stages, Stage::ALL.to_vec());
        assert_eq!(board[Stage::Idea.index()].products.len(), 1);
        assert_eq!(board[Stage::Testing.index()].products.len(), 1);
        assert!(board[Stage::Launched.index()].products.is_empty());

        let filtered = tracker.board(Some(partner)).await.unwrap();
        let total: usize = filtered.iter().map(|c| c.products.len()).sum();
        assert_eq!(total, 1);
        assert_eq!(filtered[Stage::Idea.index()].products[0].id, a.id);
    }

    #[tokio::test]
    async fn list_view_flags_products_stuck_for_30_days() {
        let (store, tracker) = setup();
        let actor = Uuid::new_v4();
        let fresh = tracker.create_product(actor, request("Novo")).await.unwrap();
        let stuck = tracker.create_product(actor, request("Parado")).await.unwrap();
        store.backdate(stuck.id, 30);
        store.backdate(fresh.id, 29);

        let now = Utc::now();
        let list = tracker.list_view(now).await.unwrap();
        let by_id: HashMap<Uuid, &ProductListEntry> = list.iter().map(|e| (e.product.id, e)).collect();

        assert_eq!(by_id[&stuck.id].days_in_stage, 30);
        assert!(by_id[&stuck.id].stage_overdue);
        assert_eq!(by_id[&fresh.id].days_in_stage, 29);
        assert!(!by_id[&fresh.id].stage_overdue);
    }

    #[test]
    fn days_in_stage_truncates_and_never_goes_negative() {
        let now = Utc::now();
        assert_eq!(days_in_stage(now - Duration::hours(47), now), 1);
        assert_eq!(days_in_stage(now + Duration::hours(5), now), 0);
    }
}
