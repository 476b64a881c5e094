use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::{self, Data};
use actix_web::{App, HttpServer};
use anyhow::Context;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ems::api::health;
use ems::config::Config;
use ems::db::init_db;
use ems::docs::ApiDoc;
use ems::{routes, schema};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to the database")?;

    if config.db_auto_migrate {
        schema::create_tables(&pool)
            .await
            .context("failed to create tables")?;
        let steps = schema::run_migrations(&pool)
            .await
            .context("failed to migrate schema")?;
        for step in &steps {
            info!(step = %step, "Migration");
        }
    } else {
        warn!("DB_AUTO_MIGRATE is off; assuming the schema is current");
    }

    if config.db_seed {
        schema::seed_initial_data(&pool)
            .await
            .context("failed to seed initial data")?;
        info!("Seed data ensured");
    }

    let limiter = routes::build_limiter(config.rate_api_per_min)?;
    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} so the UI's JS/CSS files match
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .service(health::index)
            .configure(|cfg| routes::configure(cfg, &config.api_prefix, limiter.clone()))
            .default_service(web::to(routes::not_found))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
