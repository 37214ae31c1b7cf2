use std::{collections::BTreeMap, time::Duration};

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    pub request_value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    pub response_value: String,
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub body: Option<String>,
}

#[derive(Deserialize)]
pub struct BlobQuery {
    pub status: Option<u16>,
    /// Wrap the payload as `{"responseValue": ...}`.
    #[serde(default)]
    pub json: bool,
}

/// Body of `/invalid-utf8/{code}`.
pub const INVALID_UTF8: &[u8] = &[0xff, 0xfe, b'a'];

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/values", get(get_value).post(create_value))
        .route("/status/{code}", any(status))
        .route("/sleep/{millis}", get(sleep))
        .route("/redirect", get(redirect))
        .route("/headers", get(response_headers))
        .route("/malformed", get(malformed))
        .route("/blob/{size}", get(blob))
        .route("/invalid-utf8/{code}", get(invalid_utf8))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        seen.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    Json(Echo {
        method: method.to_string(),
        query: uri.query().map(str::to_string),
        headers: seen,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn get_value() -> Json<Output> {
    Json(Output {
        response_value: "someValueOut".to_string(),
    })
}

async fn create_value(Json(input): Json<Input>) -> (StatusCode, Json<Output>) {
    (
        StatusCode::CREATED,
        Json(Output {
            response_value: input.request_value,
        }),
    )
}

async fn status(Path(code): Path<u16>, Query(query): Query<StatusQuery>) -> Response {
    let Ok(status) = StatusCode::from_u16(code) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    (status, query.body.unwrap_or_default()).into_response()
}

async fn sleep(Path(millis): Path<u64>) -> Json<Output> {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    Json(Output {
        response_value: "slept".to_string(),
    })
}

async fn redirect() -> Response {
    (StatusCode::SEE_OTHER, [(header::LOCATION, "/////")]).into_response()
}

async fn response_headers() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("x-request-id", HeaderValue::from_static("abc"));
    headers.append("x-multi", HeaderValue::from_static("one"));
    headers.append("x-multi", HeaderValue::from_static("two"));
    (headers, Json(serde_json::json!({}))).into_response()
}

async fn malformed() -> &'static str {
    "not json"
}

async fn blob(Path(size): Path<usize>, Query(query): Query<BlobQuery>) -> Response {
    let Ok(status) = StatusCode::from_u16(query.status.unwrap_or(200)) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let payload = "x".repeat(size);
    if query.json {
        let body = Output {
            response_value: payload,
        };
        return (status, Json(body)).into_response();
    }
    (status, payload).into_response()
}

async fn invalid_utf8(Path(code): Path<u16>) -> Response {
    let Ok(status) = StatusCode::from_u16(code) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    (status, INVALID_UTF8.to_vec()).into_response()
}
