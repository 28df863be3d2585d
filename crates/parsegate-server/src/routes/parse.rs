use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{
    error::{into_result, AppError},
    extract::{ClientHintsBody, CombinedQueryParams, PathSpecimen},
    format::{AnyFormat, Negotiated, NoXml, Rendered},
    state::AppState,
};

/// `GET /parse/ua/{*ua}`: classify a legacy User-Agent string.
///
/// Also mounted on the bare `/parse/ua`, where the missing specimen is a 400
/// that still counts towards statistics.
#[tracing::instrument(skip(state, negotiated, specimen))]
pub async fn parse_ua(
    State(state): State<Arc<AppState>>,
    negotiated: Negotiated<AnyFormat>,
    PathSpecimen(specimen): PathSpecimen,
) -> Result<Response, AppError> {
    let document = into_result(state.assembler().user_agent(Ok(specimen)).await)?;
    Ok(Rendered::Document {
        format: negotiated.format,
        root: "user_agent",
        document,
    }
    .into_response())
}

/// `POST /parse/ua-v4`: classify a User-Agent with Client Hints.
#[tracing::instrument(skip(state, negotiated, body))]
pub async fn parse_ua_v4(
    State(state): State<Arc<AppState>>,
    negotiated: Negotiated<NoXml>,
    ClientHintsBody(body): ClientHintsBody,
) -> Result<Response, AppError> {
    let document = into_result(state.assembler().client_hints(body).await)?;
    Ok(Rendered::Document {
        format: negotiated.format,
        root: "user_agent",
        document,
    }
    .into_response())
}

/// `GET /parse/ip/{*ip}`: classify an IP address or host name.
#[tracing::instrument(skip(state, negotiated, specimen))]
pub async fn parse_ip(
    State(state): State<Arc<AppState>>,
    negotiated: Negotiated<AnyFormat>,
    PathSpecimen(specimen): PathSpecimen,
) -> Result<Response, AppError> {
    let document = into_result(state.assembler().address(Ok(specimen)).await)?;
    Ok(Rendered::Document {
        format: negotiated.format,
        root: "ip_address",
        document,
    }
    .into_response())
}

/// `GET /parse?ua=..&ip=..`: classify either or both in one request.
#[tracing::instrument(skip(state, negotiated, params))]
pub async fn parse_ua_ip(
    State(state): State<Arc<AppState>>,
    negotiated: Negotiated<NoXml>,
    CombinedQueryParams(params): CombinedQueryParams,
) -> Result<Response, AppError> {
    let document = into_result(state.assembler().combined(params).await)?;
    Ok(Rendered::Combined {
        format: negotiated.format,
        document,
    }
    .into_response())
}
