//! Request normalization.
//!
//! Raw endpoint parameters are shaped into [`UaQuery`], [`IpQuery`] or
//! [`CombinedQuery`] before any classification happens. A specimen is present
//! iff it is non-empty; no trimming is applied here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The Client-Hint body accepted by `POST /parse/ua-v4`.
///
/// Every field is independently optional. Wire names are camelCase
/// (`uaString`, `secChUa`, `secChUaFullVersionList`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UaRequest {
    /// User-Agent override sent alongside the hints.
    pub ua_string: Option<String>,
    pub sec_ch_ua: Option<String>,
    pub sec_ch_ua_full_version_list: Option<String>,
    pub sec_ch_ua_mobile: Option<String>,
    pub sec_ch_ua_full_version: Option<String>,
    pub sec_ch_ua_platform: Option<String>,
    pub sec_ch_ua_platform_version: Option<String>,
    pub sec_ch_ua_model: Option<String>,
}

/// A User-Agent specimen in one of its two mutually exclusive shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UaQuery {
    /// A single free-text User-Agent string, never empty.
    Legacy(String),
    /// A Client-Hint request. Present even when every field is empty.
    Structured(UaRequest),
}

impl UaQuery {
    /// Normalize a free-text specimen; `None` when it is absent or empty.
    pub fn legacy(raw: Option<String>) -> Option<Self> {
        raw.filter(|s| !s.is_empty()).map(Self::Legacy)
    }

    /// The User-Agent string handed to the classifier.
    pub fn ua_string(&self) -> &str {
        match self {
            Self::Legacy(ua) => ua,
            Self::Structured(request) => request.ua_string.as_deref().unwrap_or(""),
        }
    }

    /// The value echoed back as `ua_string`. Structured requests carry no
    /// legacy specimen, so they always echo an empty string.
    pub fn echo(&self) -> &str {
        match self {
            Self::Legacy(ua) => ua,
            Self::Structured(_) => "",
        }
    }
}

impl From<UaRequest> for UaQuery {
    fn from(request: UaRequest) -> Self {
        Self::Structured(request)
    }
}

/// An IP literal or host name specimen, never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpQuery(String);

impl IpQuery {
    pub fn new(raw: Option<String>) -> Option<Self> {
        raw.filter(|s| !s.is_empty()).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The request could not be read at all: an undecodable path, an unreadable
/// query string or a body that is not a valid Client-Hint request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed request: {0}")]
pub struct MalformedInput(pub String);

/// Raw parameters of `GET /parse`, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedParams {
    pub ua: Option<String>,
    pub ip: Option<String>,
}

impl CombinedParams {
    /// Collect `ua` and `ip` from decoded query pairs. The first occurrence
    /// of a repeated key wins; unknown keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "ua" => &mut params.ua,
                "ip" => &mut params.ip,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

/// Returned when a request carries no usable specimen at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no user agent or ip address supplied")]
pub struct MissingInput;

/// The `GET /parse?ua=&ip=` shape: at least one side is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedQuery {
    ua: Option<UaQuery>,
    ip: Option<IpQuery>,
}

impl CombinedQuery {
    pub fn new(ua: Option<String>, ip: Option<String>) -> Result<Self, MissingInput> {
        let ua = UaQuery::legacy(ua);
        let ip = IpQuery::new(ip);
        if ua.is_none() && ip.is_none() {
            return Err(MissingInput);
        }
        Ok(Self { ua, ip })
    }

    pub fn ua(&self) -> Option<&UaQuery> {
        self.ua.as_ref()
    }

    pub fn ip(&self) -> Option<&IpQuery> {
        self.ip.as_ref()
    }
}
