// src/db/expense_repo.rs

use chrono::{NaiveDate, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::expense::{CreateExpenseRequest, Expense, ExpenseStatus},
};

#[derive(Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `period` é o intervalo semiaberto [início, fim); `None` lista tudo.
    pub async fn list_expenses(
        &self,
        period: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Expense>, AppError> {
        let (from, until) = period.unzip();

        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT * FROM expenses
            WHERE ($1::date IS NULL OR expense_date >= $1)
              AND ($2::date IS NULL OR expense_date < $2)
            ORDER BY expense_date DESC, created_at DESC
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    pub async fn create_expense<'e, E>(
        &self,
        executor: E,
        input: &CreateExpenseRequest,
        submitted_by: Uuid,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (
                description, amount, category, expense_date, vendor_id, bill_url, submitted_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&input.description)
        .bind(input.amount)
        .bind(&input.category)
        .bind(input.expense_date)
        .bind(input.vendor_id)
        .bind(&input.bill_url)
        .bind(submitted_by)
        .fetch_one(executor)
        .await?;

        Ok(expense)
    }

    pub async fn get_expense_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(expense)
    }

    pub async fn set_review<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: ExpenseStatus,
        reviewer: Uuid,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET status = $2, reviewed_by = $3, reviewed_at = $4, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reviewer)
        .bind(Utc::now())
        .fetch_one(executor)
        .await?;

        Ok(expense)
    }
}
