//! Specimen extractors.
//!
//! None of these reject: whatever cannot be read is handed to the assembler
//! as [`MalformedInput`] so the call is still sampled and answered with 400.

use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, MatchedPath, Query, Request},
    http::{header, request::Parts, HeaderMap},
    Json,
};
use mime::Mime;
use percent_encoding::percent_decode_str;

use parsegate_core::query::{CombinedParams, MalformedInput, UaRequest};

/// The catch-all tail of a `/parse/ua/{*ua}` or `/parse/ip/{*ip}` path,
/// percent-decoded. Invalid UTF-8 is replaced rather than rejected, the same
/// way query strings are decoded. `None` on the bare routes.
pub struct PathSpecimen(pub Option<String>);

impl<S> FromRequestParts<S> for PathSpecimen
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let specimen = parts
            .extensions
            .get::<MatchedPath>()
            .and_then(|matched| matched.as_str().split_once("{*"))
            .and_then(|(prefix, _)| parts.uri.path().strip_prefix(prefix))
            .map(|encoded| percent_decode_str(encoded).decode_utf8_lossy().into_owned());
        Ok(Self(specimen))
    }
}

/// `ua` and `ip` from the query string; the first value of a repeated key wins.
pub struct CombinedQueryParams(pub Result<CombinedParams, MalformedInput>);

impl<S> FromRequestParts<S> for CombinedQueryParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map(|Query(pairs)| CombinedParams::from_pairs(pairs))
            .map_err(|rejection| MalformedInput(rejection.body_text()));
        Ok(Self(params))
    }
}

/// The `POST /parse/ua-v4` body: JSON by default, or a `<parseUaV4Request>`
/// document when the content type is XML.
pub struct ClientHintsBody(pub Result<UaRequest, MalformedInput>);

impl<S> FromRequest<S> for ClientHintsBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let request = if is_xml(req.headers()) {
            match Bytes::from_request(req, state).await {
                Ok(bytes) => parse_xml(&bytes),
                Err(rejection) => Err(MalformedInput(rejection.body_text())),
            }
        } else {
            Json::<UaRequest>::from_request(req, state)
                .await
                .map(|Json(request)| request)
                .map_err(|rejection| MalformedInput(rejection.body_text()))
        };
        Ok(Self(request))
    }
}

fn is_xml(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Mime>().ok())
        .is_some_and(|content_type| {
            content_type.subtype() == mime::XML || content_type.suffix() == Some(mime::XML)
        })
}

fn parse_xml(bytes: &[u8]) -> Result<UaRequest, MalformedInput> {
    let xml = std::str::from_utf8(bytes).map_err(|e| MalformedInput(e.to_string()))?;
    quick_xml::de::from_str(xml).map_err(|e| MalformedInput(e.to_string()))
}
