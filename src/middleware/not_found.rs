use crate::utils::error::CustomError;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{ResponseError, Result, dev::ServiceResponse};

/// Replace the bare 404 of an unmatched route with a JSON envelope
pub fn not_found<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    let new_response = CustomError::NotFoundError(format!(
        "Route {} does not exist",
        res.request().path()
    ))
    .error_response();
    let (req, _) = res.into_parts();
    let res = ServiceResponse::new(req, new_response.map_into_right_body());

    Ok(ErrorHandlerResponse::Response(res))
}
