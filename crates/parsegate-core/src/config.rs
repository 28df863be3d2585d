#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub geoip_path: String,
    /// Optional GeoLite2-ASN database used for datacenter attribution.
    pub asn_path: Option<String>,
    pub cors_origins: Vec<String>,
    /// User-Agent strings longer than this are rejected as malformed.
    pub max_ua_length: usize,
    /// When false, IP specimens that are not literals fail as unknown hosts
    /// without a DNS lookup.
    pub resolve_hostnames: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            geoip_path: "./GeoLite2-City.mmdb".to_string(),
            asn_path: None,
            cors_origins: Vec::new(),
            max_ua_length: 4096,
            resolve_hostnames: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        Ok(Self {
            port: std::env::var("PARSEGATE_PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            geoip_path: std::env::var("PARSEGATE_GEOIP_PATH").unwrap_or(defaults.geoip_path),
            asn_path: std::env::var("PARSEGATE_ASN_PATH")
                .ok()
                .filter(|v| !v.is_empty()),
            cors_origins: std::env::var("PARSEGATE_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            max_ua_length: std::env::var("PARSEGATE_MAX_UA_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_ua_length),
            resolve_hostnames: std::env::var("PARSEGATE_RESOLVE_HOSTNAMES")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.resolve_hostnames),
        })
    }
}
