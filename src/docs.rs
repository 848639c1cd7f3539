// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Users ---
        handlers::users::get_me,
        handlers::users::list_users,

        // --- Products (pipeline de etapas) ---
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::get_board,
        handlers::products::get_list_view,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::move_product,
        handlers::products::advance_product,
        handlers::products::get_history,

        // --- Batches ---
        handlers::batches::list_batches,
        handlers::batches::create_batch,
        handlers::batches::get_batch,
        handlers::batches::adjust_units,
        handlers::batches::update_qc,
        handlers::batches::set_status,
        handlers::batches::trace_batch,
        handlers::batches::batch_label,

        // --- Ingredients ---
        handlers::ingredients::list_ingredients,
        handlers::ingredients::create_ingredient,
        handlers::ingredients::stock_overview,
        handlers::ingredients::stock_alerts,
        handlers::ingredients::list_lots,
        handlers::ingredients::add_lot,
        handlers::ingredients::consume_lot,

        // --- Licenses ---
        handlers::licenses::list_licenses,
        handlers::licenses::list_expiring,
        handlers::licenses::create_license,
        handlers::licenses::get_license,
        handlers::licenses::update_license,

        // --- Expenses ---
        handlers::expenses::list_expenses,
        handlers::expenses::get_summary,
        handlers::expenses::create_expense,
        handlers::expenses::review_expense,

        // --- Vendors ---
        handlers::vendors::list_vendors,
        handlers::vendors::create_vendor,
        handlers::vendors::get_vendor,
        handlers::vendors::update_vendor,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::unread_count,
        handlers::notifications::mark_read,
        handlers::notifications::mark_all_read,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::Profile,

            // --- Products ---
            models::product::Stage,
            models::product::Priority,
            models::product::Product,
            models::product::StageHistoryEntry,
            models::product::CreateProductRequest,
            models::product::UpdateProductRequest,
            models::product::MoveProductRequest,
            models::product::AdvanceProductRequest,
            models::product::MoveStatus,
            models::product::MoveResponse,
            models::product::BoardColumn,
            models::product::ProductListEntry,

            // --- Batches ---
            models::batch::BatchStatus,
            models::batch::QcChecklist,
            models::batch::Batch,
            models::batch::TracedLot,
            models::batch::BatchTrace,
            models::batch::IngredientUsage,
            models::batch::CreateBatchRequest,
            models::batch::AdjustUnitsRequest,
            models::batch::SetBatchStatusRequest,

            // --- Ingredients ---
            models::ingredient::LotStatus,
            models::ingredient::Ingredient,
            models::ingredient::StockLot,
            models::ingredient::IngredientStock,
            models::ingredient::CreateIngredientRequest,
            models::ingredient::CreateStockLotRequest,
            models::ingredient::ConsumeLotRequest,

            // --- Licenses ---
            models::license::ExpiryStatus,
            models::license::License,
            models::license::LicenseView,
            models::license::LicenseRequest,

            // --- Expenses ---
            models::expense::ExpenseStatus,
            models::expense::Expense,
            models::expense::CreateExpenseRequest,
            models::expense::ReviewDecision,
            models::expense::ReviewExpenseRequest,
            models::expense::CategoryTotal,
            models::expense::ExpenseSummary,

            // --- Vendors ---
            models::vendor::Vendor,
            models::vendor::VendorRequest,

            // --- Notifications ---
            models::notification::Notification,
            models::notification::UnreadCount,

            // --- Dashboard ---
            models::dashboard::StageCount,
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Users", description = "Perfil do usuário e sócios"),
        (name = "Products", description = "Produtos e o pipeline de etapas (quadro, lista, histórico)"),
        (name = "Batches", description = "Lotes de produção, controle de qualidade e rastreabilidade"),
        (name = "Ingredients", description = "Insumos e lotes de estoque"),
        (name = "Licenses", description = "Licenças e certificados com alerta de vencimento"),
        (name = "Expenses", description = "Despesas e aprovação"),
        (name = "Vendors", description = "Fornecedores"),
        (name = "Notifications", description = "Notificações do usuário"),
        (name = "Dashboard", description = "Indicadores gerais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_stage_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/products/{id}/move"));
        assert!(doc.paths.paths.contains_key("/api/products/board"));
        assert!(doc.paths.paths.contains_key("/api/notifications/unread-count"));
    }
}
