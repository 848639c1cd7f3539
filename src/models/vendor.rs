// src/models/vendor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: Uuid,
    #[schema(example = "Química Fina Ltda")]
    pub name: String,
    pub contact_name: Option<String>,
    #[schema(example = "vendas@quimicafina.com")]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[schema(example = "Matéria-prima")]
    pub category: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorRequest {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub contact_name: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VendorFilter {
    #[serde(default)]
    pub include_inactive: bool,
}
