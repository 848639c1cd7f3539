// src/services/license_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LicenseRepository,
    models::license::{License, LicenseRequest, LicenseView},
};

/// Mais urgente primeiro; empate pelo vencimento mais próximo.
pub fn sort_by_urgency(views: &mut [LicenseView]) {
    views.sort_by(|a, b| {
        a.expiry_status
            .cmp(&b.expiry_status)
            .then_with(|| a.days_until_expiry.cmp(&b.days_until_expiry))
            .then_with(|| a.license.license_type.cmp(&b.license.license_type))
    });
}

pub fn build_views(licenses: Vec<License>, today: NaiveDate) -> Vec<LicenseView> {
    let mut views: Vec<LicenseView> = licenses
        .into_iter()
        .map(|license| LicenseView::new(license, today))
        .collect();
    sort_by_urgency(&mut views);
    views
}

#[derive(Clone)]
pub struct LicenseService {
    repo: LicenseRepository,
}

impl LicenseService {
    pub fn new(repo: LicenseRepository) -> Self {
        Self { repo }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    pub async fn list(&self) -> Result<Vec<LicenseView>, AppError> {
        let licenses = self.repo.list_licenses().await?;
        Ok(build_views(licenses, Self::today()))
    }

    pub async fn expiring(&self) -> Result<Vec<LicenseView>, AppError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|v| v.expiry_status.needs_attention())
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<LicenseView, AppError> {
        let license = self
            .repo
            .get_license(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Licença".into()))?;
        Ok(LicenseView::new(license, Self::today()))
    }

    pub async fn create<'e, E>(&self, executor: E, request: &LicenseRequest) -> Result<LicenseView, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let license = self.repo.create_license(executor, request).await?;
        Ok(LicenseView::new(license, Self::today()))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        request: &LicenseRequest,
    ) -> Result<LicenseView, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let license = self
            .repo
            .update_license(executor, id, request)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Licença".into()))?;
        Ok(LicenseView::new(license, Self::today()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::license::ExpiryStatus;

    fn license(kind: &str, expiry: Option<NaiveDate>) -> License {
        License {
            id: Uuid::new_v4(),
            license_type: kind.into(),
            number: "0001".into(),
            issuing_authority: None,
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expiry_date: expiry,
            document_url: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn views_are_sorted_by_urgency() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let views = build_views(
            vec![
                license("Marca", None),
                license("AFE", Some(today + Duration::days(400))),
                license("Alvará", Some(today + Duration::days(20))),
                license("Bombeiros", Some(today - Duration::days(3))),
                license("CRQ", Some(today + Duration::days(5))),
            ],
            today,
        );

        let statuses: Vec<ExpiryStatus> = views.iter().map(|v| v.expiry_status).collect();
        assert_eq!(
            statuses,
            vec![
                ExpiryStatus::Expired,
                ExpiryStatus::Critical,
                ExpiryStatus::ExpiringSoon,
                ExpiryStatus::Active,
                ExpiryStatus::NoExpiry,
            ]
        );
        assert_eq!(views[0].days_until_expiry, Some(-3));
    }
}
