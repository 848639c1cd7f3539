// src/services/expense_service.rs

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ExpenseRepository, NotificationRepository},
    models::{
        auth::Profile,
        expense::{
            CategoryTotal, CreateExpenseRequest, Expense, ExpenseStatus, ExpenseSummary, ReviewDecision,
            ReviewExpenseRequest,
        },
        notification::NewNotification,
    },
};

/// `"AAAA-MM"` → intervalo semiaberto `[primeiro dia, primeiro dia do mês seguinte)`.
pub fn parse_month(month: &str) -> Result<(NaiveDate, NaiveDate), AppError> {
    let start = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .ok()
        .filter(|_| month.len() == 7)
        .ok_or_else(|| {
            let mut errors = validator::ValidationErrors::new();
            let mut err = validator::ValidationError::new("format");
            err.message = Some("Use o formato AAAA-MM.".into());
            errors.add("month", err);
            AppError::ValidationError(errors)
        })?;

    month_bounds(start)
}

/// Mês que contém `day`, como intervalo semiaberto.
pub fn month_bounds(day: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
    let start = day.with_day(1).unwrap_or(day);
    let end = start
        .checked_add_months(Months::new(1))
        .ok_or_else(|| anyhow::anyhow!("Mês fora do calendário: {start}"))?;

    Ok((start, end))
}

/// Totais por status e por categoria.
/// Despesas rejeitadas ficam fora de `total` e do detalhamento por categoria.
pub fn summarize_expenses(expenses: &[Expense]) -> ExpenseSummary {
    let mut approved = Decimal::ZERO;
    let mut pending = Decimal::ZERO;
    let mut rejected = Decimal::ZERO;
    let mut categories: HashMap<&str, Decimal> = HashMap::new();

    for expense in expenses {
        match expense.status {
            ExpenseStatus::Approved => approved += expense.amount,
            ExpenseStatus::Pending => pending += expense.amount,
            ExpenseStatus::Rejected => {
                rejected += expense.amount;
                continue;
            }
        }
        *categories.entry(expense.category.as_str()).or_insert(Decimal::ZERO) += expense.amount;
    }

    let total = approved + pending;
    let hundred = Decimal::ONE_HUNDRED;

    let mut by_category: Vec<CategoryTotal> = categories
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category: category.to_string(),
            total: amount,
            percentage: if total.is_zero() {
                Decimal::ZERO
            } else {
                (amount * hundred / total).round_dp(2)
            },
        })
        .collect();
    by_category.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));

    ExpenseSummary {
        total,
        approved,
        pending,
        rejected,
        count: expenses.len(),
        by_category,
    }
}

fn review_notification(expense: &Expense, decision: ReviewDecision, comment: Option<&str>) -> NewNotification {
    let (title, verb) = match decision {
        ReviewDecision::Approve => ("Despesa aprovada", "aprovada"),
        ReviewDecision::Reject => ("Despesa rejeitada", "rejeitada"),
    };

    let mut message = format!("'{}' (R$ {:.2}) foi {}.", expense.description, expense.amount, verb);
    if let Some(comment) = comment.filter(|c| !c.trim().is_empty()) {
        message.push_str(&format!(" Comentário: {comment}"));
    }

    NewNotification {
        user_id: expense.submitted_by,
        title: title.to_string(),
        message,
        kind: "expense_review",
        link: Some("/expenses".to_string()),
    }
}

#[derive(Clone)]
pub struct ExpenseService {
    repo: ExpenseRepository,
    notification_repo: NotificationRepository,
}

impl ExpenseService {
    pub fn new(repo: ExpenseRepository, notification_repo: NotificationRepository) -> Self {
        Self { repo, notification_repo }
    }

    pub async fn list(&self, month: Option<&str>) -> Result<Vec<Expense>, AppError> {
        let period = month.map(parse_month).transpose()?;
        self.repo.list_expenses(period).await
    }

    pub async fn summary(&self, month: Option<&str>) -> Result<ExpenseSummary, AppError> {
        let expenses = self.list(month).await?;
        Ok(summarize_expenses(&expenses))
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        submitted_by: Uuid,
        request: &CreateExpenseRequest,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_expense(executor, request, submitted_by).await
    }

    // Revisão + notificação ao autor na mesma transação
    pub async fn review<'e, E>(
        &self,
        executor: E,
        reviewer: &Profile,
        expense_id: Uuid,
        request: &ReviewExpenseRequest,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if !reviewer.is_admin() {
            return Err(AppError::Forbidden("admin"));
        }

        let mut tx = executor.begin().await?;

        let expense = self
            .repo
            .get_expense_for_update(&mut *tx, expense_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Despesa".into()))?;

        if expense.status != ExpenseStatus::Pending {
            return Err(AppError::ExpenseAlreadyReviewed);
        }

        let reviewed = self
            .repo
            .set_review(&mut *tx, expense_id, request.decision.status(), reviewer.id)
            .await?;

        let notification = review_notification(&reviewed, request.decision, request.comment.as_deref());
        self.notification_repo.insert(&mut *tx, &notification).await?;

        tx.commit().await?;

        tracing::info!("💸 Despesa {} revisada: {:?}", reviewed.id, reviewed.status);
        Ok(reviewed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn expense(category: &str, cents: i64, status: ExpenseStatus) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            description: "Compra".into(),
            amount: Decimal::new(cents, 2),
            category: category.into(),
            expense_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            vendor_id: None,
            bill_url: None,
            status,
            submitted_by: Uuid::new_v4(),
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn month_filter_is_a_half_open_range() {
        let (start, end) = parse_month("2024-12").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn current_month_bounds_contain_the_day() {
        let (start, end) = month_bounds(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn malformed_month_is_a_validation_error() {
        for bad in ["2024-13", "2024", "2024-1", "março"] {
            assert!(matches!(parse_month(bad), Err(AppError::ValidationError(_))), "{bad}");
        }
    }

    #[test]
    fn summary_splits_by_status_and_category() {
        let expenses = vec![
            expense("Embalagens", 60000, ExpenseStatus::Approved),
            expense("Insumos", 30000, ExpenseStatus::Pending),
            expense("Embalagens", 10000, ExpenseStatus::Approved),
            expense("Marketing", 99999, ExpenseStatus::Rejected),
        ];

        let summary = summarize_expenses(&expenses);

        assert_eq!(summary.total, Decimal::new(100000, 2));
        assert_eq!(summary.approved, Decimal::new(70000, 2));
        assert_eq!(summary.pending, Decimal::new(30000, 2));
        assert_eq!(summary.rejected, Decimal::new(99999, 2));
        assert_eq!(summary.count, 4);

        let categories: Vec<(&str, Decimal)> = summary
            .by_category
            .iter()
            .map(|c| (c.category.as_str(), c.percentage))
            .collect();
        assert_eq!(
            categories,
            vec![("Embalagens", Decimal::new(7000, 2)), ("Insumos", Decimal::new(3000, 2))]
        );
    }

    #[test]
    fn percentages_round_to_two_places() {
        let expenses = vec![
            expense("A", 100, ExpenseStatus::Approved),
            expense("B", 100, ExpenseStatus::Approved),
            expense("C", 100, ExpenseStatus::Approved),
        ];
        let summary = summarize_expenses(&expenses);
        assert!(summary.by_category.iter().all(|c| c.percentage == Decimal::new(3333, 2)));
    }

    #[test]
    fn empty_period_has_no_categories() {
        let summary = summarize_expenses(&[]);
        assert_eq!(summary.total, Decimal::ZERO);
        assert!(summary.by_category.is_empty());
    }

    #[test]
    fn review_notification_targets_the_submitter() {
        let e = expense("Insumos", 1250, ExpenseStatus::Approved);
        let n = review_notification(&e, ReviewDecision::Reject, Some("Sem nota fiscal"));
        assert_eq!(n.user_id, e.submitted_by);
        assert_eq!(n.title, "Despesa rejeitada");
        assert!(n.message.contains("Sem nota fiscal"));
        assert!(n.message.contains("12.50"));
    }
}
