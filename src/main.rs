//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

fn api_routes(app_state: AppState) -> Router<AppState> {
    let user_routes = Router::new()
        .route("/me", get(handlers::users::get_me))
        .route("/", get(handlers::users::list_users));

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route("/board", get(handlers::products::get_board))
        .route("/list", get(handlers::products::get_list_view))
        .route(
            "/{id}",
            get(handlers::products::get_product).put(handlers::products::update_product),
        )
        .route("/{id}/move", post(handlers::products::move_product))
        .route("/{id}/advance", post(handlers::products::advance_product))
        .route("/{id}/history", get(handlers::products::get_history));

    let batch_routes = Router::new()
        .route(
            "/",
            get(handlers::batches::list_batches).post(handlers::batches::create_batch),
        )
        .route("/{id}", get(handlers::batches::get_batch))
        .route("/{id}/units", post(handlers::batches::adjust_units))
        .route("/{id}/qc", put(handlers::batches::update_qc))
        .route("/{id}/status", put(handlers::batches::set_status))
        .route("/{id}/trace", get(handlers::batches::trace_batch))
        .route("/{id}/label", get(handlers::batches::batch_label));

    let ingredient_routes = Router::new()
        .route(
            "/",
            get(handlers::ingredients::list_ingredients).post(handlers::ingredients::create_ingredient),
        )
        .route("/stock", get(handlers::ingredients::stock_overview))
        .route("/alerts", get(handlers::ingredients::stock_alerts))
        .route(
            "/{id}/lots",
            get(handlers::ingredients::list_lots).post(handlers::ingredients::add_lot),
        )
        .route("/lots/{lot_id}/consume", post(handlers::ingredients::consume_lot));

    let license_routes = Router::new()
        .route(
            "/",
            get(handlers::licenses::list_licenses).post(handlers::licenses::create_license),
        )
        .route("/expiring", get(handlers::licenses::list_expiring))
        .route(
            "/{id}",
            get(handlers::licenses::get_license).put(handlers::licenses::update_license),
        );

    let expense_routes = Router::new()
        .route(
            "/",
            get(handlers::expenses::list_expenses).post(handlers::expenses::create_expense),
        )
        .route("/summary", get(handlers::expenses::get_summary))
        .route("/{id}/review", post(handlers::expenses::review_expense));

    let vendor_routes = Router::new()
        .route(
            "/",
            get(handlers::vendors::list_vendors).post(handlers::vendors::create_vendor),
        )
        .route(
            "/{id}",
            get(handlers::vendors::get_vendor).put(handlers::vendors::update_vendor),
        );

    let notification_routes = Router::new()
        .route("/", get(handlers::notifications::list_notifications))
        .route("/unread-count", get(handlers::notifications::unread_count))
        .route("/{id}/read", post(handlers::notifications::mark_read))
        .route("/read-all", post(handlers::notifications::mark_all_read));

    let dashboard_routes = Router::new().route("/summary", get(handlers::dashboard::get_summary));

    // Tudo aqui exige token válido
    Router::new()
        .nest("/users", user_routes)
        .nest("/products", product_routes)
        .nest("/batches", batch_routes)
        .nest("/ingredients", ingredient_routes)
        .nest("/licenses", license_routes)
        .nest("/expenses", expense_routes)
        .nest("/vendors", vendor_routes)
        .nest("/notifications", notification_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(axum_middleware::from_fn_with_state(app_state, auth_guard))
}

#[tokio::main]
async fn main() {
    // Logger: nível via RUST_LOG (padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env().expect("Falha ao carregar a configuração.");

    let app_state = AppState::new(&config)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = Router::new()
        .route("/api/health", get(handlers::system::health))
        .nest("/api", api_routes(app_state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(handlers::system::not_found)
        .with_state(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
