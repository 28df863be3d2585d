//! Representation selection and rendering for parse results.
//!
//! JSON is the primary representation. XML and plain text mirror the JSON
//! key set and order: XML as one element per key, plain text as `key=value`
//! lines (combined documents prefix each key with its section name).

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use mime::{Mime, MimeIter, Name};

use parsegate_core::document::{CombinedDocument, Document};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
    Text,
}

const JSON_TYPES: &[(Name<'static>, Name<'static>)] = &[(mime::APPLICATION, mime::JSON)];
const XML_TYPES: &[(Name<'static>, Name<'static>)] =
    &[(mime::APPLICATION, mime::XML), (mime::TEXT, mime::XML)];
const TEXT_TYPES: &[(Name<'static>, Name<'static>)] = &[(mime::TEXT, mime::PLAIN)];

impl Format {
    /// Offered by the `GET` single-specimen endpoints.
    pub const ALL: &'static [Format] = &[Format::Json, Format::Text, Format::Xml];
    /// Offered by `POST /parse/ua-v4` and `GET /parse`.
    pub const JSON_OR_TEXT: &'static [Format] = &[Format::Json, Format::Text];

    fn content_type(self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Xml => "application/xml; charset=utf-8",
            Format::Text => "text/plain; charset=utf-8",
        }
    }

    fn media_types(self) -> &'static [(Name<'static>, Name<'static>)] {
        match self {
            Format::Json => JSON_TYPES,
            Format::Xml => XML_TYPES,
            Format::Text => TEXT_TYPES,
        }
    }

    /// Quality and specificity of the most specific range covering this
    /// format, or `None` when no range mentions it.
    fn preference(self, ranges: &[Mime]) -> Option<(f32, u8)> {
        ranges
            .iter()
            .filter_map(|range| {
                let specificity = self
                    .media_types()
                    .iter()
                    .filter_map(|(ty, subtype)| {
                        let (t, s) = (range.type_(), range.subtype());
                        if t == *ty && s == *subtype {
                            Some(2)
                        } else if t == *ty && s == mime::STAR {
                            Some(1)
                        } else if t == mime::STAR && s == mime::STAR {
                            Some(0)
                        } else {
                            None
                        }
                    })
                    .max()?;
                Some((quality(range), specificity))
            })
            // Earlier ranges win ties in specificity.
            .fold(None, |best: Option<(f32, u8)>, candidate| match best {
                Some(best) if best.1 >= candidate.1 => Some(best),
                _ => Some(candidate),
            })
    }
}

fn quality(range: &Mime) -> f32 {
    range
        .get_param("q")
        .and_then(|q| q.as_str().parse::<f32>().ok())
        .map(|q| q.clamp(0.0, 1.0))
        .unwrap_or(1.0)
}

/// Choose a representation from the `Accept` header.
///
/// Each offered format takes the quality of the most specific media range
/// that covers it, so an explicit `q=0` excludes a type even when a wildcard
/// admits it. The highest quality wins, then the more specific match, then
/// the offer order. A missing header, or one without a single parseable
/// range, selects the first offered format. Returns
/// [`AppError::NotAcceptable`] when nothing offered is acceptable.
pub fn negotiate(headers: &HeaderMap, offered: &[Format]) -> Result<Format, AppError> {
    let Some(&default) = offered.first() else {
        return Err(AppError::NotAcceptable);
    };
    let ranges: Vec<Mime> = headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(MimeIter::new)
        .filter_map(Result::ok)
        .collect();
    if ranges.is_empty() {
        return Ok(default);
    }

    offered
        .iter()
        .filter_map(|format| {
            let (q, specificity) = format.preference(&ranges)?;
            (q > 0.0).then_some((*format, q, specificity))
        })
        .fold(None, |best: Option<(Format, f32, u8)>, candidate| match best {
            Some(best) if (best.1, best.2) >= (candidate.1, candidate.2) => Some(best),
            _ => Some(candidate),
        })
        .map(|(format, _, _)| format)
        .ok_or(AppError::NotAcceptable)
}

/// The set of representations an endpoint offers, in preference order.
pub trait Offer {
    const FORMATS: &'static [Format];
}

/// JSON, XML and plain text.
pub struct AnyFormat;

impl Offer for AnyFormat {
    const FORMATS: &'static [Format] = Format::ALL;
}

/// JSON and plain text.
pub struct NoXml;

impl Offer for NoXml {
    const FORMATS: &'static [Format] = Format::JSON_OR_TEXT;
}

/// Extractor resolving the response format from `Accept`.
///
/// Rejects with 406 before the handler body runs, so an unacceptable request
/// never reaches the classifier and records no statistics.
pub struct Negotiated<O> {
    pub format: Format,
    offer: PhantomData<fn() -> O>,
}

impl<O, S> FromRequestParts<S> for Negotiated<O>
where
    O: Offer,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            format: negotiate(&parts.headers, O::FORMATS)?,
            offer: PhantomData,
        })
    }
}

/// A parse result ready to be written in the negotiated format.
pub enum Rendered {
    Document {
        format: Format,
        root: &'static str,
        document: Document,
    },
    Combined {
        format: Format,
        document: CombinedDocument,
    },
}

impl Rendered {
    fn format(&self) -> Format {
        match self {
            Rendered::Document { format, .. } | Rendered::Combined { format, .. } => *format,
        }
    }

    fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        match self {
            Rendered::Document { root, document, .. } => write_xml_element(&mut out, root, document),
            Rendered::Combined { document, .. } => {
                out.push_str("<parse>");
                if let Some(ua) = &document.user_agent {
                    write_xml_element(&mut out, "user_agent", ua);
                }
                if let Some(ip) = &document.ip_address {
                    write_xml_element(&mut out, "ip_address", ip);
                }
                out.push_str("</parse>");
            }
        }
        out
    }

    fn to_text(&self) -> String {
        let mut out = String::new();
        match self {
            Rendered::Document { document, .. } => write_text_lines(&mut out, "", document),
            Rendered::Combined { document, .. } => {
                if let Some(ua) = &document.user_agent {
                    write_text_lines(&mut out, "user_agent.", ua);
                }
                if let Some(ip) = &document.ip_address {
                    write_text_lines(&mut out, "ip_address.", ip);
                }
            }
        }
        out
    }
}

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        let format = self.format();
        let body = match format {
            Format::Json => {
                return match self {
                    Rendered::Document { document, .. } => Json(document).into_response(),
                    Rendered::Combined { document, .. } => Json(document).into_response(),
                }
            }
            Format::Xml => self.to_xml(),
            Format::Text => self.to_text(),
        };
        ([(header::CONTENT_TYPE, format.content_type())], body).into_response()
    }
}

fn write_xml_element(out: &mut String, name: &str, document: &Document) {
    out.push_str(&format!("<{name}>"));
    for (key, value) in document.iter() {
        let value = value.to_string();
        out.push_str(&format!("<{key}>{}</{key}>", quick_xml::escape::escape(&value)));
    }
    out.push_str(&format!("</{name}>"));
}

fn write_text_lines(out: &mut String, prefix: &str, document: &Document) {
    for (key, value) in document.iter() {
        let value = escape_text(&value.to_string());
        out.push_str(&format!("{prefix}{key}={value}\n"));
    }
}

/// Keep every value on its own line: backslashes and control characters are
/// written as escape sequences.
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            c if c.is_control() => escaped.extend(c.escape_default()),
            c => escaped.push(c),
        }
    }
    escaped
}
