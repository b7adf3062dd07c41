use crate::VERSION;
use http_body_util::{BodyExt, Full, combinators::BoxBody};
use hyper::{
    Method, Request, Response, StatusCode,
    body::{Body, Bytes},
    header::{CONTENT_TYPE, HeaderValue},
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use tracing::{trace, warn};

pub type ByteResponse = Response<BoxBody<Bytes, hyper::Error>>;

pub const VERSION_HEADER: &str = "x-testrun-version";

/// Body returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub name: String,
    pub status: String,
    pub version: String,
}

/// Top level handler function that is called for every incoming request from Hyper.
pub async fn handle_request<B>(req: Request<B>) -> anyhow::Result<ByteResponse>
where
    B: Body,
    B::Error: Error + Send + Sync + 'static,
{
    let (parts, body) = req.into_parts();
    let (method, path) = (parts.method, parts.uri.path());
    // drain the body so keep-alive connections stay usable
    body.collect().await?;
    trace!(%method, %path, "handling request");

    let resp = match (&method, path) {
        (&Method::GET | &Method::HEAD, "/ping") => {
            let mut resp = response(StatusCode::NO_CONTENT, Bytes::new());
            resp.headers_mut()
                .insert(VERSION_HEADER, HeaderValue::from_static(VERSION));
            resp
        }
        (&Method::GET, "/health") => {
            let health = Health {
                name: "testrun".to_owned(),
                status: "pass".to_owned(),
                version: VERSION.to_owned(),
            };
            let mut resp = response(StatusCode::OK, serde_json::to_vec(&health)?.into());
            resp.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            resp
        }

        // default to 404
        (method, path) => {
            warn!(%method, %path, "received unexpected request");
            response(StatusCode::NOT_FOUND, "Not found\n".into())
        }
    };

    Ok(resp)
}

fn response(status: StatusCode, body: Bytes) -> ByteResponse {
    let mut resp = Response::new(Full::new(body).map_err(|never| match never {}).boxed());
    *resp.status_mut() = status;
    resp
}
