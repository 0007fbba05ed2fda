use crate::comment::index::comment_routes;
use crate::middleware::error_handler::extractor_errors;
use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(extractor_errors);
    cfg.configure(comment_routes);
}
