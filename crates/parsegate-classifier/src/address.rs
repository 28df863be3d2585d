//! IP address and host name classification.

use std::net::IpAddr;

use anyhow::Context;
use ipnet::IpNet;
use maxminddb::{geoip2, Reader};

use parsegate_core::{error::ClassifyError, result::IpResult};

use crate::codes::slug;

/// Special-purpose ranges (RFC 6890). Everything else is "Unrecognized".
const RESERVED_RANGES: &[(&str, &str)] = &[
    ("0.0.0.0/8", "Reserved"),
    ("10.0.0.0/8", "Private network"),
    ("100.64.0.0/10", "Shared address space"),
    ("127.0.0.0/8", "Loopback"),
    ("169.254.0.0/16", "Link-local"),
    ("172.16.0.0/12", "Private network"),
    ("192.0.2.0/24", "Documentation"),
    ("192.168.0.0/16", "Private network"),
    ("198.51.100.0/24", "Documentation"),
    ("203.0.113.0/24", "Documentation"),
    ("224.0.0.0/4", "Multicast"),
    ("240.0.0.0/4", "Reserved"),
    ("::1/128", "Loopback"),
    ("2001:db8::/32", "Documentation"),
    ("fc00::/7", "Private network"),
    ("fe80::/10", "Link-local"),
    ("ff00::/8", "Multicast"),
];

const UNRECOGNIZED: &str = "Unrecognized";

/// Parsed [`RESERVED_RANGES`].
pub(crate) struct ReservedRanges(Vec<(IpNet, &'static str)>);

impl ReservedRanges {
    pub(crate) fn load() -> anyhow::Result<Self> {
        RESERVED_RANGES
            .iter()
            .map(|(cidr, name)| {
                cidr.parse::<IpNet>()
                    .map(|net| (net, *name))
                    .with_context(|| format!("invalid reserved range {cidr}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()
            .map(Self)
    }

    pub(crate) fn classify(&self, ip: &IpAddr) -> &'static str {
        self.0
            .iter()
            .find(|(net, _)| net.contains(ip))
            .map(|(_, name)| *name)
            .unwrap_or(UNRECOGNIZED)
    }
}

/// Turn a specimen into an address. Returns the host name alongside when the
/// specimen was not an IP literal.
pub(crate) async fn resolve(
    specimen: &str,
    resolve_hostnames: bool,
) -> Result<(IpAddr, Option<String>), ClassifyError> {
    let literal = specimen
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(specimen);
    if let Ok(ip) = literal.parse::<IpAddr>() {
        return Ok((canonical(ip), None));
    }
    if !resolve_hostnames {
        return Err(ClassifyError::UnknownHost(specimen.to_string()));
    }

    let mut addrs = tokio::net::lookup_host((specimen, 0))
        .await
        .map_err(|_| ClassifyError::UnknownHost(specimen.to_string()))?;
    let addr = addrs
        .next()
        .ok_or_else(|| ClassifyError::UnknownHost(specimen.to_string()))?;
    Ok((canonical(addr.ip()), Some(specimen.to_string())))
}

/// IPv4-mapped IPv6 addresses are classified as IPv4.
fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}

pub(crate) fn base_result(
    ip: &IpAddr,
    hostname: Option<String>,
    ranges: &ReservedRanges,
) -> IpResult {
    let classification = ranges.classify(ip);
    IpResult {
        ip_ver: if ip.is_ipv4() { 4 } else { 6 },
        ip_classification: classification.to_string(),
        ip_classification_code: slug(classification),
        ip_hostname: hostname.unwrap_or_default(),
        ..Default::default()
    }
}

/// Fill country and city from a GeoIP2/GeoLite2 City database.
pub(crate) fn apply_city(
    reader: &Reader<Vec<u8>>,
    ip: IpAddr,
    result: &mut IpResult,
) -> Result<(), ClassifyError> {
    let lookup = reader
        .lookup(ip)
        .map_err(|e| ClassifyError::Store(e.into()))?;
    let Some(city) = lookup
        .decode::<geoip2::City>()
        .map_err(|e| ClassifyError::Store(e.into()))?
    else {
        return Ok(());
    };
    result.ip_country = city.country.names.english.unwrap_or_default().to_string();
    result.ip_country_code = city.country.iso_code.unwrap_or_default().to_string();
    result.ip_city = city.city.names.english.unwrap_or_default().to_string();
    Ok(())
}

/// Fill datacenter attribution from a GeoLite2 ASN database.
pub(crate) fn apply_asn(
    reader: &Reader<Vec<u8>>,
    ip: IpAddr,
    result: &mut IpResult,
) -> Result<(), ClassifyError> {
    let lookup = reader
        .lookup(ip)
        .map_err(|e| ClassifyError::Store(e.into()))?;
    let organization = lookup
        .decode::<geoip2::Asn>()
        .map_err(|e| ClassifyError::Store(e.into()))?
        .and_then(|asn| asn.autonomous_system_organization);
    if let Some(organization) = organization {
        result.datacenter_name = organization.to_string();
        result.datacenter_name_code = slug(organization);
    }
    Ok(())
}
