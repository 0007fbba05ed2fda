use super::controller::{
    create_comment, delete_comment, delete_document_comments, get_comment_count, get_total_count,
    list_all_comments, list_document_comments, search_documents, update_comment,
};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn comment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comments")
            .wrap(HttpAuthentication::with_fn(verify_token))
            .route("", web::post().to(create_comment))
            .route("/list", web::post().to(list_document_comments))
            .route("/all", web::get().to(list_all_comments))
            .route("/search", web::get().to(search_documents))
            .route("/total", web::get().to(get_total_count))
            .route("/count/{doc_id}", web::get().to(get_comment_count))
            .route("/doc/{doc_id}", web::delete().to(delete_document_comments))
            .route("/{comment_id}", web::put().to(update_comment))
            .route("/{comment_id}", web::delete().to(delete_comment)),
    );
}
