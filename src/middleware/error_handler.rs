use crate::utils::error::CustomError;
use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{Error, HttpRequest, web};
use log::debug;

// Extractor failures are answered with the same envelope as service errors.

fn json_error(err: JsonPayloadError, req: &HttpRequest) -> Error {
    debug!("Bad JSON body on {}: {}", req.path(), err);
    CustomError::BadRequestError(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: QueryPayloadError, req: &HttpRequest) -> Error {
    debug!("Bad query string on {}: {}", req.path(), err);
    CustomError::BadRequestError(format!("Invalid query parameters: {}", err)).into()
}

fn path_error(err: PathError, req: &HttpRequest) -> Error {
    debug!("Bad path segment on {}: {}", req.path(), err);
    CustomError::BadRequestError(format!("Invalid path: {}", err)).into()
}

pub fn extractor_errors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error));
}
