use crate::comment::model::{
    BasePageDto, Comment, CommentListDto, CreateCommentRequest, SearchQuery, UpdateCommentRequest,
};
use crate::comment::service::CommentService;
use crate::middleware::auth::claims_from_request;
use crate::utils::error::CustomError;
use crate::utils::helpers::service_name;
use actix_web::{HttpRequest, HttpResponse, web};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

fn parse_comment_id(raw: String) -> Result<ObjectId, CustomError> {
    ObjectId::parse_str(raw)
        .map_err(|_| CustomError::BadRequestError("Invalid comment ID".to_string()))
}

/// Create a new comment on a document
/// POST /comments
pub async fn create_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let claims = claims_from_request(&req)?;
    let body = body.into_inner();

    comment_service
        .insert(Comment {
            doc_id: body.doc_id,
            user_id: claims.id,
            user_name: claims.username,
            content: body.content,
            ..Comment::default()
        })
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Comment created successfully",
        "httpStatusCode": 201,
        "service": service_name(),
    })))
}

/// Update a comment
/// PUT /comments/{comment_id}
pub async fn update_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
    body: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let claims = claims_from_request(&req)?;
    let comment_id = parse_comment_id(path.into_inner())?;

    comment_service
        .update(Comment {
            id: Some(comment_id),
            user_id: claims.id,
            user_name: claims.username,
            content: body.into_inner().content,
            ..Comment::default()
        })
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment updated successfully",
        "httpStatusCode": 200,
        "service": service_name(),
    })))
}

/// Delete a comment
/// DELETE /comments/{comment_id}
pub async fn delete_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let claims = claims_from_request(&req)?;
    let comment_id = parse_comment_id(path.into_inner())?;

    let comment = Comment {
        id: Some(comment_id),
        user_id: claims.id.clone(),
        user_name: claims.username,
        ..Comment::default()
    };
    comment_service.remove(&comment, &claims.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment deleted successfully",
        "httpStatusCode": 200,
        "service": service_name(),
    })))
}

/// Page through the comments of a document
/// POST /comments/list
pub async fn list_document_comments(
    comment_service: web::Data<CommentService>,
    body: web::Json<CommentListDto>,
) -> Result<HttpResponse, CustomError> {
    let page = comment_service.query_by_id(&body).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comments retrieved successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "data": page
    })))
}

/// Page through every comment
/// GET /comments/all?page=&rows=
pub async fn list_all_comments(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    query: web::Query<BasePageDto>,
) -> Result<HttpResponse, CustomError> {
    let claims = claims_from_request(&req)?;
    let all = comment_service
        .query_all_comments(&query, &claims.id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comments retrieved successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "data": all
    })))
}

/// Get comment count for a document
/// GET /comments/count/{doc_id}
pub async fn get_comment_count(
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let count = comment_service.comment_num(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment count retrieved successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "count": count
    })))
}

/// Documents whose comments mention a keyword
/// GET /comments/search?keyword=
pub async fn search_documents(
    comment_service: web::Data<CommentService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, CustomError> {
    let doc_ids = comment_service
        .fuzzy_search_doc(query.keyword.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Search completed successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "data": doc_ids
    })))
}

/// Drop every comment of a document, e.g. when the document is deleted
/// DELETE /comments/doc/{doc_id}
pub async fn delete_document_comments(
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let removed = comment_service.remove_by_doc_id(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Document comments deleted successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "removed": removed
    })))
}

/// Estimated number of stored comments
/// GET /comments/total
pub async fn get_total_count(
    comment_service: web::Data<CommentService>,
) -> Result<HttpResponse, CustomError> {
    let count = comment_service.count_all_file().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment total retrieved successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "count": count
    })))
}
