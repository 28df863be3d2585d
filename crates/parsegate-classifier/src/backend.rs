use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use maxminddb::Reader;
use tracing::info;

use parsegate_core::{
    classifier::Classifier,
    config::Config,
    error::ClassifyError,
    query::UaQuery,
    result::{IpResult, UaResult},
};

use crate::{address, hints, user_agent};

/// A [`Classifier`] backed by in-process data: `woothee` for User-Agent
/// strings and MaxMind databases for addresses.
///
/// Both databases are optional. A missing file disables the corresponding
/// attributes (they render as empty strings); an unreadable file is an error
/// at open time.
pub struct LocalClassifier {
    city: Option<Reader<Vec<u8>>>,
    asn: Option<Reader<Vec<u8>>>,
    reserved: address::ReservedRanges,
    max_ua_length: usize,
    resolve_hostnames: bool,
}

fn open_optional(path: Option<&str>) -> Result<Option<Reader<Vec<u8>>>> {
    let Some(path) = path.filter(|p| Path::new(p).exists()) else {
        return Ok(None);
    };
    let reader = Reader::open_readfile(path)
        .with_context(|| format!("failed to open MaxMind database at {path}"))?;
    info!(path, "MaxMind database loaded");
    Ok(Some(reader))
}

impl LocalClassifier {
    pub fn open(config: &Config) -> Result<Self> {
        Ok(Self {
            city: open_optional(Some(config.geoip_path.as_str()))?,
            asn: open_optional(config.asn_path.as_deref())?,
            reserved: address::ReservedRanges::load()?,
            max_ua_length: config.max_ua_length,
            resolve_hostnames: config.resolve_hostnames,
        })
    }

    /// True when the GeoIP city database was found.
    pub fn has_geoip(&self) -> bool {
        self.city.is_some()
    }

    fn check_user_agent(&self, ua: &str) -> Result<(), ClassifyError> {
        if ua.len() > self.max_ua_length {
            return Err(ClassifyError::Rejected(format!(
                "user agent exceeds {} bytes",
                self.max_ua_length
            )));
        }
        if ua.chars().any(char::is_control) {
            return Err(ClassifyError::Rejected(
                "user agent contains control characters".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Classifier for LocalClassifier {
    async fn classify_user_agent(&self, query: &UaQuery) -> Result<UaResult, ClassifyError> {
        self.check_user_agent(query.ua_string())?;
        Ok(match query {
            UaQuery::Legacy(ua) => user_agent::classify(ua),
            UaQuery::Structured(request) => hints::classify(request),
        })
    }

    async fn classify_address(&self, ip: &str) -> Result<IpResult, ClassifyError> {
        let (addr, hostname) = address::resolve(ip, self.resolve_hostnames).await?;
        let mut result = address::base_result(&addr, hostname, &self.reserved);
        if let Some(reader) = &self.city {
            address::apply_city(reader, addr, &mut result)?;
        }
        if let Some(reader) = &self.asn {
            address::apply_asn(reader, addr, &mut result)?;
        }
        Ok(result)
    }
}
