//! Turns `RequestParams` into a request ready for the transport.

use std::io::Read;

use ureq::http::header::{ACCEPT, CONTENT_TYPE};
use ureq::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response};
use ureq::{Body, SendBody};
use url::Url;

use crate::error::{BuildError, Error, Result};
use crate::http::{RequestBody, RequestParams};

const APPLICATION_JSON: &str = "application/json";

/// A request with method, URL and headers fixed, and its payload kept apart
/// until the agent sends it.
pub(crate) struct PreparedRequest {
    pub(crate) request: Request<()>,
    pub(crate) payload: Payload,
}

pub(crate) enum Payload {
    Empty,
    Bytes(Vec<u8>),
    Reader(Box<dyn Read + Send>),
}

impl PreparedRequest {
    pub(crate) fn send(self, agent: &ureq::Agent) -> std::result::Result<Response<Body>, ureq::Error> {
        let PreparedRequest { request, payload } = self;
        match payload {
            Payload::Empty => agent.run(request),
            Payload::Bytes(bytes) => agent.run(request.map(|()| bytes.as_slice())),
            Payload::Reader(mut reader) => {
                agent.run(request.map(|()| SendBody::from_reader(&mut *reader)))
            }
        }
    }
}

pub(crate) fn build_request(params: RequestParams) -> Result<PreparedRequest> {
    let RequestParams {
        url,
        method,
        headers,
        body,
        query,
        ..
    } = params;

    let payload = match body {
        None => Payload::Empty,
        Some(RequestBody::Reader(reader)) => Payload::Reader(reader),
        Some(RequestBody::Json(value)) => Payload::Bytes(value.to_json().map_err(Error::BodyEncoding)?),
    };

    let method = if method.is_empty() {
        Method::GET
    } else {
        Method::from_bytes(method.as_bytes())
            .map_err(|_| Error::RequestConstruction(BuildError::Method(method.clone())))?
    };

    let mut target = Url::parse(&url)
        .map_err(|source| Error::RequestConstruction(BuildError::Url { url: url.clone(), source }))?;
    if !query.is_empty() {
        let mut pairs = target.query_pairs_mut();
        for (name, value) in &query {
            pairs.append_pair(name, value);
        }
    }

    let mut header_map = HeaderMap::new();
    header_map.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
    header_map.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    for (name, value) in &headers {
        let invalid = || Error::RequestConstruction(BuildError::Header { name: name.clone() });
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        header_map.insert(header_name, header_value);
    }

    let mut request = Request::builder()
        .method(method)
        .uri(target.as_str())
        .body(())
        .map_err(|e| Error::RequestConstruction(e.into()))?;
    *request.headers_mut() = header_map;

    Ok(PreparedRequest { request, payload })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Input {
        request_value: String,
    }

    fn build(params: RequestParams) -> PreparedRequest {
        build_request(params).unwrap()
    }

    #[test]
    fn json_defaults_are_set() {
        let prepared = build(RequestParams::get("http://localhost:3000/echo"));
        let headers = prepared.request.headers();
        assert_eq!(headers[ACCEPT], APPLICATION_JSON);
        assert_eq!(headers[CONTENT_TYPE], APPLICATION_JSON);
        assert_eq!(prepared.request.method(), Method::GET);
        assert!(matches!(prepared.payload, Payload::Empty));
    }

    #[test]
    fn caller_headers_win_case_insensitively() {
        let prepared = build(
            RequestParams::get("http://localhost:3000")
                .header("content-type", "image/*")
                .header("Test-Header", "testHeaderValue"),
        );
        let headers = prepared.request.headers();
        assert_eq!(headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(headers[CONTENT_TYPE], "image/*");
        assert_eq!(headers["test-header"], "testHeaderValue");
        assert_eq!(headers[ACCEPT], APPLICATION_JSON);
    }

    #[test]
    fn empty_method_means_get() {
        let prepared = build(RequestParams {
            url: "http://localhost:3000".to_string(),
            ..RequestParams::default()
        });
        assert_eq!(prepared.request.method(), Method::GET);
    }

    #[test]
    fn query_is_appended_and_encoded() {
        let prepared = build(
            RequestParams::post("http://localhost:3000/echo?beenhere=before")
                .query("testKey", "testValue")
                .query("öä", "%&/"),
        );
        assert_eq!(
            prepared.request.uri().query(),
            Some("beenhere=before&testKey=testValue&%C3%B6%C3%A4=%25%26%2F")
        );
    }

    #[test]
    fn url_without_query_is_left_alone() {
        let prepared = build(RequestParams::get("http://localhost:3000/echo"));
        assert_eq!(prepared.request.uri().query(), None);
        assert_eq!(prepared.request.uri().path(), "/echo");
    }

    #[test]
    fn json_body_is_serialized() {
        let prepared = build(RequestParams::post("http://localhost:3000").json(Input {
            request_value: "someValueIn".to_string(),
        }));
        match prepared.payload {
            Payload::Bytes(bytes) => assert_eq!(bytes, br#"{"requestValue":"someValueIn"}"#),
            _ => panic!("expected a serialized body"),
        }
    }

    #[test]
    fn reader_body_is_passed_through() {
        let prepared = build(
            RequestParams::post("http://localhost:3000").reader(std::io::Cursor::new(b"raw".to_vec())),
        );
        match prepared.payload {
            Payload::Reader(mut reader) => {
                let mut buf = String::new();
                reader.read_to_string(&mut buf).unwrap();
                assert_eq!(buf, "raw");
            }
            _ => panic!("expected a reader body"),
        }
    }

    #[test]
    fn unserializable_body_is_an_encoding_error() {
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys are not json");
        let err = build_request(RequestParams::post("http://localhost:3000").json(map))
            .err()
            .unwrap();
        assert!(matches!(err, Error::BodyEncoding(_)));
        assert!(err.to_string().contains("failed to parse request body to json"));
    }

    #[test]
    fn bad_method_is_a_construction_error() {
        let err = build_request(RequestParams::new("some method", "http://localhost:3000"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::RequestConstruction(BuildError::Method(_))));
        assert!(err.to_string().contains("failed to create request"));
    }

    #[test]
    fn bad_url_is_a_construction_error() {
        let err = build_request(RequestParams::get("http://")).err().unwrap();
        assert!(matches!(err, Error::RequestConstruction(BuildError::Url { .. })));
    }

    #[test]
    fn bad_header_is_a_construction_error() {
        let err = build_request(RequestParams::get("http://localhost:3000").header("bad name", "x"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::RequestConstruction(BuildError::Header { .. })));
    }
}
