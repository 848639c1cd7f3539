// src/models/license.rs

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Limites (em dias até o vencimento) da classificação
pub const CRITICAL_DAYS: i64 = 7;
pub const EXPIRING_SOON_DAYS: i64 = 30;
pub const RENEWAL_DUE_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    // A ordem das variantes é a ordem de urgência
    Expired,
    Critical,
    ExpiringSoon,
    RenewalDue,
    Active,
    NoExpiry,
}

impl ExpiryStatus {
    pub fn classify(expiry_date: Option<NaiveDate>, today: NaiveDate) -> (Option<i64>, ExpiryStatus) {
        let Some(expiry) = expiry_date else {
            return (None, ExpiryStatus::NoExpiry);
        };

        let days = (expiry - today).num_days();
        let status = match days {
            d if d < 0 => ExpiryStatus::Expired,
            d if d <= CRITICAL_DAYS => ExpiryStatus::Critical,
            d if d <= EXPIRING_SOON_DAYS => ExpiryStatus::ExpiringSoon,
            d if d <= RENEWAL_DUE_DAYS => ExpiryStatus::RenewalDue,
            _ => ExpiryStatus::Active,
        };
        (Some(days), status)
    }

    pub fn needs_attention(self) -> bool {
        !matches!(self, ExpiryStatus::Active | ExpiryStatus::NoExpiry)
    }
}

/// Último vencimento que ainda gera alerta em `today` (vencidas inclusive).
pub fn alert_cutoff(today: NaiveDate) -> NaiveDate {
    today + Duration::days(RENEWAL_DUE_DAYS)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub id: Uuid,
    #[schema(example = "Alvará Sanitário")]
    pub license_type: String,
    #[schema(example = "AS-2025/00123")]
    pub number: String,
    #[schema(example = "Vigilância Sanitária Municipal")]
    pub issuing_authority: Option<String>,
    #[schema(value_type = String, format = Date)]
    pub issue_date: NaiveDate,
    /// `None` = sem vencimento.
    #[schema(value_type = Option<String>, format = Date)]
    pub expiry_date: Option<NaiveDate>,
    pub document_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LicenseView {
    #[serde(flatten)]
    pub license: License,
    pub days_until_expiry: Option<i64>,
    pub expiry_status: ExpiryStatus,
}

impl LicenseView {
    pub fn new(license: License, today: NaiveDate) -> Self {
        let (days_until_expiry, expiry_status) = ExpiryStatus::classify(license.expiry_date, today);
        Self {
            license,
            days_until_expiry,
            expiry_status,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRequest {
    #[validate(length(min = 1, message = "O tipo é obrigatório."))]
    pub license_type: String,
    #[validate(length(min = 1, message = "O número é obrigatório."))]
    pub number: String,
    pub issuing_authority: Option<String>,
    #[schema(value_type = String, format = Date)]
    pub issue_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub expiry_date: Option<NaiveDate>,
    pub document_url: Option<String>,
    pub notes: Option<String>,
}

impl LicenseRequest {
    pub fn validate_dates(&self) -> Result<(), validator::ValidationError> {
        match self.expiry_date {
            Some(expiry) if expiry < self.issue_date => {
                let mut err = validator::ValidationError::new("ExpiryBeforeIssue");
                err.message = Some("O vencimento não pode ser anterior à emissão.".into());
                Err(err)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn status_in(days: i64) -> ExpiryStatus {
        ExpiryStatus::classify(Some(today() + Duration::days(days)), today()).1
    }

    #[test]
    fn alert_cutoff_matches_the_classification() {
        for days in [-400, -1, 0, 7, 30, 89, 90, 91, 365] {
            let expiry = today() + Duration::days(days);
            assert_eq!(
                expiry <= alert_cutoff(today()),
                status_in(days).needs_attention(),
                "{days} dias"
            );
        }
    }

    #[test]
    fn ten_days_out_is_expiring_soon() {
        assert_eq!(
            ExpiryStatus::classify(Some(today() + Duration::days(10)), today()),
            (Some(10), ExpiryStatus::ExpiringSoon)
        );
    }

    #[test]
    fn no_expiry_date_means_no_expiry() {
        assert_eq!(ExpiryStatus::classify(None, today()), (None, ExpiryStatus::NoExpiry));
    }

    #[test]
    fn threshold_boundaries() {
        assert_eq!(status_in(-1), ExpiryStatus::Expired);
        assert_eq!(status_in(0), ExpiryStatus::Critical);
        assert_eq!(status_in(7), ExpiryStatus::Critical);
        assert_eq!(status_in(8), ExpiryStatus::ExpiringSoon);
        assert_eq!(status_in(30), ExpiryStatus::ExpiringSoon);
        assert_eq!(status_in(31), ExpiryStatus::RenewalDue);
        assert_eq!(status_in(90), ExpiryStatus::RenewalDue);
        assert_eq!(status_in(91), ExpiryStatus::Active);
    }

    #[test]
    fn only_active_and_no_expiry_are_quiet() {
        assert!(ExpiryStatus::Expired.needs_attention());
        assert!(ExpiryStatus::RenewalDue.needs_attention());
        assert!(!ExpiryStatus::Active.needs_attention());
        assert!(!ExpiryStatus::NoExpiry.needs_attention());
    }

    #[test]
    fn expiry_before_issue_is_rejected() {
        let req = LicenseRequest {
            license_type: "AFE".into(),
            number: "1".into(),
            issuing_authority: None,
            issue_date: today(),
            expiry_date: Some(today() - Duration::days(1)),
            document_url: None,
            notes: None,
        };
        assert!(req.validate_dates().is_err());
    }
}
