use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{info, warn};
use serde_json::json;
use std::sync::Arc;

mod comment;
mod database;
mod middleware;
mod router;
mod utils;

use comment::service::CommentService;
use database::{CommentGateway, MemoryCommentGateway, MongoCommentGateway, connect_to_mongo};
use middleware::not_found::not_found;
use router::index::routes;
use utils::config::{AppConfig, StoreKind};
use utils::helpers::service_name;
use utils::sensitive_filter::WordListFilter;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment service is running",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": service_name(),
    }))
}

async fn build_gateway(config: &AppConfig) -> std::io::Result<Arc<dyn CommentGateway>> {
    match config.store {
        StoreKind::Memory => {
            warn!("Using the in-memory comment store, comments will not survive a restart");
            Ok(Arc::new(MemoryCommentGateway::new()))
        }
        StoreKind::Mongo => {
            let client = connect_to_mongo(&config.mongodb_uri)
                .await
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            Ok(Arc::new(MongoCommentGateway::new(
                &client,
                &config.database_name,
                &config.comment_collection,
            )))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    let gateway = build_gateway(&config).await?;
    let filter = Arc::new(WordListFilter::new(&config.sensitive_words_path));

    let comment_service = web::Data::new(CommentService::new(gateway, filter));
    let app_config = web::Data::new(config.clone());

    info!("Starting server on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_config.clone())
            .app_data(comment_service.clone())
            .configure(routes)
            .wrap(ErrorHandlers::new().handler(StatusCode::NOT_FOUND, not_found))
            .service(default)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
