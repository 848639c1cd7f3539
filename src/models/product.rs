// src/models/product.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- Catálogo de Etapas ---
// Ordem fixa do pipeline. A posição no enum é a posição na esteira.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "product_stage", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idea,
    Research,
    Formula,
    Testing,
    Packaging,
    Printing,
    Production,
    Ready,
    Launched,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::Idea,
        Stage::Research,
        Stage::Formula,
        Stage::Testing,
        Stage::Packaging,
        Stage::Printing,
        Stage::Production,
        Stage::Ready,
        Stage::Launched,
    ];

    pub const INITIAL: Stage = Stage::Idea;
    pub const TERMINAL: Stage = Stage::Launched;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Stage> {
        Stage::ALL.get(self.index() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::TERMINAL
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Idea => "idea",
            Stage::Research => "research",
            Stage::Formula => "formula",
            Stage::Testing => "testing",
            Stage::Packaging => "packaging",
            Stage::Printing => "printing",
            Stage::Production => "production",
            Stage::Ready => "ready",
            Stage::Launched => "launched",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Idea => "Idea",
            Stage::Research => "Research",
            Stage::Formula => "Formula",
            Stage::Testing => "Testing",
            Stage::Packaging => "Packaging",
            Stage::Printing => "Printing",
            Stage::Production => "Production",
            Stage::Ready => "Ready",
            Stage::Launched => "Launched",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownStage(pub String);

impl fmt::Display for UnknownStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "etapa desconhecida: {}", self.0)
    }
}

impl std::error::Error for UnknownStage {}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "product_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

// --- Produto ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Sérum de Vitamina C")]
    pub name: String,
    #[schema(example = "Skincare")]
    pub category: Option<String>,
    #[schema(example = "Sérum")]
    pub product_type: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub priority: Priority,
    #[schema(example = 40)]
    pub progress: i32,
    pub current_stage: Stage,
    pub stage_entered_at: DateTime<Utc>,
    pub assigned_partners: Vec<Uuid>,
    #[schema(example = 24)]
    pub shelf_life_months: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Histórico de Etapas ---
// `exited_at = None` marca o intervalo aberto (a etapa atual).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageHistoryEntry {
    pub id: Uuid,
    pub product_id: Uuid,
    pub stage: Stage,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
    pub actor_id: Uuid,
    pub notes: Option<String>,
}

impl StageHistoryEntry {
    pub fn is_open(&self) -> bool {
        self.exited_at.is_none()
    }
}

/// Produto pronto para ser gravado (payload já validado e resolvido).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: Option<String>,
    pub product_type: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub priority: Priority,
    pub progress: i32,
    pub stage: Stage,
    pub assigned_partners: Vec<Uuid>,
    pub shelf_life_months: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Uma transição já validada, aplicada de forma atômica pelo repositório.
#[derive(Debug, Clone)]
pub struct StageTransition {
    pub product_id: Uuid,
    pub from: Stage,
    pub to: Stage,
    pub actor_id: Uuid,
    pub at: DateTime<Utc>,
    pub notes: Option<String>,
    /// `Some(100)` ao entrar na etapa terminal; `None` preserva o progresso.
    pub progress: Option<i32>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório (até 200 caracteres)."))]
    #[schema(example = "Sérum de Vitamina C")]
    pub name: String,
    pub category: Option<String>,
    pub product_type: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[validate(range(min = 0, max = 100, message = "O progresso vai de 0 a 100."))]
    #[serde(default)]
    pub progress: i32,
    /// Etapa inicial; `idea` quando omitida.
    pub initial_stage: Option<Stage>,
    #[serde(default)]
    pub assigned_partners: Vec<Uuid>,
    #[validate(range(min = 1, max = 120, message = "A validade vai de 1 a 120 meses."))]
    pub shelf_life_months: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório (até 200 caracteres)."))]
    pub name: String,
    pub category: Option<String>,
    pub product_type: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub priority: Priority,
    #[validate(range(min = 0, max = 100, message = "O progresso vai de 0 a 100."))]
    pub progress: i32,
    #[serde(default)]
    pub assigned_partners: Vec<Uuid>,
    #[validate(range(min = 1, max = 120, message = "A validade vai de 1 a 120 meses."))]
    pub shelf_life_months: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveProductRequest {
    pub target_stage: Stage,
    /// Obrigatório para a etapa terminal (`launched`).
    #[serde(default)]
    pub confirmed: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceProductRequest {
    #[serde(default)]
    pub confirmed: bool,
    pub notes: Option<String>,
}

// --- Visões ---

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BoardFilter {
    /// Mostra só os produtos atribuídos a este sócio.
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
    Moved,
    Unchanged,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    pub status: MoveStatus,
    pub product: Product,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub stage: Stage,
    pub label: String,
    pub position: usize,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListEntry {
    #[serde(flatten)]
    pub product: Product,
    #[schema(example = 12)]
    pub days_in_stage: i64,
    /// Parado há 30 dias ou mais na mesma etapa (apenas sinalização visual).
    pub stage_overdue: bool,
}

/// Remove duplicatas preservando a primeira ocorrência; a ordem não tem significado.
pub fn dedup_partners(partners: &[Uuid]) -> Vec<Uuid> {
    let mut unique = Vec::with_capacity(partners.len());
    for id in partners {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_ordered_from_idea_to_launched() {
        assert_eq!(Stage::ALL.first(), Some(&Stage::INITIAL));
        assert_eq!(Stage::ALL.last(), Some(&Stage::TERMINAL));
        for (i, stage) in Stage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
        }
        assert_eq!(Stage::Packaging.index(), 4);
    }

    #[test]
    fn next_walks_the_catalog_and_stops_at_terminal() {
        assert_eq!(Stage::Idea.next(), Some(Stage::Research));
        assert_eq!(Stage::Ready.next(), Some(Stage::Launched));
        assert_eq!(Stage::Launched.next(), None);
        assert!(Stage::Launched.is_terminal());
        assert!(!Stage::Ready.is_terminal());
    }

    #[test]
    fn parses_only_catalog_names() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>(), Ok(stage));
        }
        assert_eq!("shipping".parse::<Stage>(), Err(UnknownStage("shipping".into())));
    }

    #[test]
    fn serde_uses_snake_case_and_rejects_unknown_stages() {
        assert_eq!(serde_json::to_string(&Stage::Production).unwrap(), "\"production\"");
        let parsed: MoveProductRequest =
            serde_json::from_str(r#"{"targetStage":"launched","confirmed":true}"#).unwrap();
        assert_eq!(parsed.target_stage, Stage::Launched);
        assert!(serde_json::from_str::<MoveProductRequest>(r#"{"targetStage":"archived"}"#).is_err());
    }

    #[test]
    fn dedup_partners_keeps_first_occurrence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup_partners(&[a, b, a, b]), vec![a, b]);
    }

    #[test]
    fn create_request_validates_progress_range() {
        let req: CreateProductRequest =
            serde_json::from_str(r#"{"name":"Bálsamo","progress":120}"#).unwrap();
        assert!(req.validate().is_err());
        let req: CreateProductRequest = serde_json::from_str(r#"{"name":"Bálsamo"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.priority, Priority::Medium);
    }
}
