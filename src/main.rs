// src/main.rs
use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use log::{error, info};

use blog_be::config::{self, AppConfig, Backend};
use blog_be::repositories::{MemoryStore, PgStore};
use blog_be::{AppState, configure};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    dotenv::dotenv().ok();

    let cfg = AppConfig::from_env().context("invalid configuration")?;
    info!("Token settings: {:?}", cfg.tokens);

    let state = match cfg.backend {
        Backend::Postgres => {
            let pool = config::get_pg_pool()?;
            let store = PgStore::new(pool);
            if let Err(e) = store.bootstrap().await {
                error!("Failed to bootstrap schema: {}", e);
                return Err(e).context("schema bootstrap failed");
            }
            info!("Using postgres storage");
            AppState::with_store(store, &cfg.tokens)
        }
        Backend::Memory => {
            info!("Using in-memory storage; data is lost on exit");
            AppState::with_store(MemoryStore::new(), &cfg.tokens)
        }
    };

    let auth_data = web::Data::new(state.auth_service());
    let state = web::Data::new(state);

    let allowed_origins = cfg.allowed_origins.clone();
    let bind_address = format!("0.0.0.0:{}", cfg.port);
    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                "authorization",
                "content-type",
                "accept",
                "x-requested-with",
            ])
            .supports_credentials()
            .max_age(3600);

        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(auth_data.clone())
            .configure(configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("cannot bind {}", bind_address))?
    .run()
    .await
    .context("server error")
}
