// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DashboardSummary, StageCount},
        license::alert_cutoff,
    },
};

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // Resumo geral. `products_by_stage` só traz as etapas com produtos;
    // o serviço completa as demais com zero. Datas chegam do serviço (UTC), não do relógio do banco.
    pub async fn get_summary<'e, E>(
        &self,
        executor: E,
        today: NaiveDate,
        month: (NaiveDate, NaiveDate),
    ) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Transação só de leitura: todos os números vêm do mesmo snapshot
        let mut tx = executor.begin().await?;

        // A. Produtos por etapa
        let products_by_stage = sqlx::query_as::<_, StageCount>(
            r#"
            SELECT current_stage AS stage, COUNT(*) AS total
            FROM products
            GROUP BY current_stage
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        // B. Produtos ainda não lançados
        let active_products = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE current_stage <> 'launched'",
        )
        .fetch_one(&mut *tx)
        .await?;

        // C. Lotes aguardando CQ
        let batches_in_quarantine = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM batches WHERE status = 'quarantine'",
        )
        .fetch_one(&mut *tx)
        .await?;

        // D. Licenças vencidas ou dentro da janela de renovação
        let license_alerts = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM licenses
            WHERE expiry_date IS NOT NULL
              AND expiry_date <= $1
            "#,
        )
        .bind(alert_cutoff(today))
        .fetch_one(&mut *tx)
        .await?;

        // E. Insumos abaixo do ponto de reposição
        let low_stock_ingredients = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM ingredients i
            WHERE i.reorder_level > COALESCE((
                SELECT SUM(l.quantity)
                FROM ingredient_stock_lots l
                WHERE l.ingredient_id = i.id AND l.status = 'available'
            ), 0)
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // F. Despesas aprovadas no mês corrente
        let expenses_this_month = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM expenses
            WHERE status = 'approved'
              AND expense_date >= $1
              AND expense_date < $2
            "#,
        )
        .bind(month.0)
        .bind(month.1)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            products_by_stage,
            active_products,
            batches_in_quarantine,
            license_alerts,
            low_stock_ingredients,
            expenses_this_month,
        })
    }
}
