use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use abac_decision_service::{config, features};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    config::init();
    let config = match config::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            if let Ok(s) = std::fs::read_to_string("config/default.toml") {
                match toml::from_str::<config::Config>(&s) {
                    Ok(cfg) => cfg,
                    Err(parse_err) => panic!("Failed to parse config/default.toml: {parse_err}"),
                }
            } else {
                panic!("Failed to load config: {e}");
            }
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(50)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .idle_timeout(std::time::Duration::from_secs(600))
        .max_lifetime(std::time::Duration::from_secs(1800))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database (connection timed out or refused)");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let schema_service = features::schemas::SchemaService::new(pool.clone());
    let action_service = features::actions::ActionService::new(pool.clone());
    let resource_service = features::resources::ResourceService::new(pool.clone());
    let subject_service = features::subjects::SubjectService::new(pool.clone());
    let attribute_store = features::attributes::AttributeStore::new(pool.clone());
    let policy_admin = features::policies::PolicyAdmin::new(pool.clone());
    let policy_catalogue = features::policies::PolicyCatalogue::new(pool.clone());
    let audit_writer = features::audit::AuditWriter::new(pool.clone());
    let audit_reader = features::audit::AuditReader::new(pool.clone());

    let access_control_facade = features::access_control::AccessControlFacade::with_timeouts(
        resource_service.clone(),
        attribute_store.clone(),
        policy_catalogue,
        audit_writer,
        std::time::Duration::from_secs(config.evaluation_timeout_secs),
        std::time::Duration::from_secs(config.audit_best_effort_timeout_secs),
    );

    let api_router = Router::new()
        .route("/health", get(health_check))
        .nest(
            "/schemas",
            features::schemas::routes::schema_routes().with_state(schema_service),
        )
        .nest(
            "/actions",
            features::actions::action_routes().with_state(action_service),
        )
        .nest(
            "/resources",
            features::resources::resource_routes().with_state(resource_service),
        )
        .nest(
            "/subjects",
            features::subjects::subject_routes().with_state(subject_service),
        )
        .nest(
            "/attributes",
            features::attributes::routes::attribute_routes().with_state(attribute_store),
        )
        .nest(
            "/policies",
            features::policies::policy_routes().with_state(policy_admin),
        )
        .nest(
            "/audit",
            features::audit::audit_routes().with_state(audit_reader),
        )
        .nest(
            "/access",
            features::access_control::access_control_routes().with_state(access_control_facade),
        );

    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PATCH,
                    axum::http::Method::DELETE,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "OK",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
