// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        BatchRepository, DashboardRepository, ExpenseRepository, IngredientRepository, LicenseRepository,
        NotificationRepository, PgProductStore, UserRepository, VendorRepository,
    },
    services::{
        auth::AuthService, batch_service::BatchService, dashboard_service::DashboardService,
        expense_service::ExpenseService, ingredient_service::IngredientService,
        license_service::LicenseService, notification_service::NotificationService,
        stage_tracker::StageTracker, vendor_service::VendorService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_FONTS_DIR: &str = "./fonts";

// Variáveis de ambiente (ou .env)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub fonts_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {raw}"))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            max_connections,
            fonts_dir: env::var("FONTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_FONTS_DIR)),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub stage_tracker: StageTracker,
    pub batch_service: BatchService,
    pub ingredient_service: IngredientService,
    pub license_service: LicenseService,
    pub expense_service: ExpenseService,
    pub vendor_service: VendorService,
    pub notification_service: NotificationService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let i18n_store = Arc::new(I18nStore::load()?);

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let batch_repo = BatchRepository::new(db_pool.clone());
        let ingredient_repo = IngredientRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone());
        let stage_tracker = StageTracker::new(Arc::new(PgProductStore::new(db_pool.clone())));
        let batch_service = BatchService::new(batch_repo, ingredient_repo.clone(), config.fonts_dir.clone());
        let ingredient_service = IngredientService::new(ingredient_repo);
        let license_service = LicenseService::new(LicenseRepository::new(db_pool.clone()));
        let expense_service = ExpenseService::new(
            ExpenseRepository::new(db_pool.clone()),
            notification_repo.clone(),
        );
        let vendor_service = VendorService::new(VendorRepository::new(db_pool.clone()));
        let notification_service = NotificationService::new(notification_repo);
        let dashboard_service = DashboardService::new(DashboardRepository::new());

        Ok(Self {
            db_pool,
            i18n_store,
            auth_service,
            stage_tracker,
            batch_service,
            ingredient_service,
            license_service,
            expense_service,
            vendor_service,
            notification_service,
            dashboard_service,
        })
    }
}
