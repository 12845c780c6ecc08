use actix_web::http::header::{CACHE_CONTROL, LOCATION};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder};
use serde::Serialize;

use crate::edge::RedirectStatus;
use crate::types::response::CommonResponse;

pub const UPSTREAM_ERROR: &str = "Upstream unavailable";

/// A wrapper struct for HTTP responses produced by the edge itself.
pub struct Response {
    http_response: HttpResponse,
}

impl Response {
    /// Empty-body redirect. CR and LF never reach the `Location` header.
    pub fn redirect(location: &str, status: RedirectStatus) -> Self {
        let location: String = location
            .chars()
            .filter(|c| *c != '\r' && *c != '\n')
            .collect();
        let status =
            StatusCode::from_u16(status.code()).unwrap_or(StatusCode::TEMPORARY_REDIRECT);

        let mut resp = HttpResponseBuilder::new(status);
        resp.insert_header((LOCATION, location));
        resp.insert_header((CACHE_CONTROL, "no-store"));
        Self {
            http_response: resp.finish(),
        }
    }

    pub fn bad_gateway(message: impl AsRef<str>) -> Self {
        let message = format!("{UPSTREAM_ERROR}: {}", message.as_ref());
        Self::err_response(StatusCode::BAD_GATEWAY, message)
    }

    pub fn json<T: Serialize>(data: T) -> Self {
        Self {
            http_response: HttpResponse::Ok().json(data),
        }
    }

    fn err_response(status: StatusCode, message: String) -> Self {
        let resp = CommonResponse {
            code: status.into(),
            message: Some(message),
        };
        Self {
            http_response: HttpResponseBuilder::new(status).json(resp),
        }
    }
}

impl From<Response> for HttpResponse {
    fn from(val: Response) -> Self {
        val.http_response
    }
}
