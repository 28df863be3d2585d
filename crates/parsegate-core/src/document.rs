//! Result flattening.
//!
//! A [`Document`] is an ordered list of fixed keys and scalar values. Every
//! key is always emitted, in the same order, whatever the classifier filled
//! in; downstream consumers diff documents textually.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::result::{IpResult, UaResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Number(u64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Number(n) => serializer.serialize_u64(*n),
        }
    }
}

/// A flat, ordered mapping of fixed keys to scalar values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    fields: Vec<(&'static str, FieldValue)>,
}

impl Document {
    fn text(mut self, key: &'static str, value: &str) -> Self {
        self.fields.push((key, FieldValue::Text(value.to_string())));
        self
    }

    /// Client-Hint echoes: a missing value becomes an empty string.
    fn hint(self, key: &'static str, value: Option<&String>) -> Self {
        self.text(key, value.map(String::as_str).unwrap_or(""))
    }

    fn number(mut self, key: &'static str, value: u64) -> Self {
        self.fields.push((key, FieldValue::Number(value)));
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Payload of the combined endpoint. A side is present only when it was
/// requested and produced a result.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CombinedDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<Document>,
}

/// Flatten a User-Agent result. `ua_string` is the query's echo value.
pub fn flatten_ua(ua_string: &str, r: &UaResult) -> Document {
    Document::default()
        .text("ua_string", ua_string)
        .text("ua_class", &r.ua_class)
        .text("ua_class_code", &r.ua_class_code)
        .text("ua", &r.ua)
        .text("ua_engine", &r.ua_engine)
        .text("ua_version", &r.ua_version)
        .text("ua_version_major", &r.ua_version_major)
        .text("ua_uptodate_current_version", &r.ua_uptodate_current_version)
        .text("ua_family", &r.ua_family)
        .text("ua_family_code", &r.ua_family_code)
        .text("ua_family_homepage", &r.ua_family_homepage)
        .text("ua_family_vendor", &r.ua_family_vendor)
        .text("ua_family_vendor_code", &r.ua_family_vendor_code)
        .text("ua_family_vendor_homepage", &r.ua_family_vendor_homepage)
        .text("ua_family_icon", &r.ua_family_icon)
        .text("ua_family_icon_big", &r.ua_family_icon_big)
        .text("ua_family_info_url", &r.ua_family_info_url)
        .text("os", &r.os)
        .text("os_code", &r.os_code)
        .text("os_homepage", &r.os_homepage)
        .text("os_icon", &r.os_icon)
        .text("os_icon_big", &r.os_icon_big)
        .text("os_info_url", &r.os_info_url)
        .text("os_family", &r.os_family)
        .text("os_family_code", &r.os_family_code)
        .text("os_family_vendor", &r.os_family_vendor)
        .text("os_family_vendor_code", &r.os_family_vendor_code)
        .text("os_family_vendor_homepage", &r.os_family_vendor_homepage)
        .text("device_class", &r.device_class)
        .text("device_class_code", &r.device_class_code)
        .text("device_class_icon", &r.device_class_icon)
        .text("device_class_icon_big", &r.device_class_icon_big)
        .text("device_class_info_url", &r.device_class_info_url)
        .text("device_brand", &r.device_brand)
        .text("device_brand_code", &r.device_brand_code)
        .text("device_brand_homepage", &r.device_brand_homepage)
        .text("device_brand_icon", &r.device_brand_icon)
        .text("device_brand_icon_big", &r.device_brand_icon_big)
        .text("device_marketname", &r.device_marketname)
        .text("device_brand_info_url", &r.device_brand_info_url)
        .text("crawler_last_seen", &r.crawler_last_seen)
        .text("crawler_category", &r.crawler_category)
        .text("crawler_category_code", &r.crawler_category_code)
        .text("crawler_respect_robotstxt", &r.crawler_respect_robotstxt)
        .hint("sec_ch_ua", r.sec_ch_ua.as_ref())
        .hint(
            "sec_ch_ua_full_version_list",
            r.sec_ch_ua_full_version_list.as_ref(),
        )
        .hint("sec_ch_ua_mobile", r.sec_ch_ua_mobile.as_ref())
        .hint("sec_ch_ua_full_version", r.sec_ch_ua_full_version.as_ref())
        .hint("sec_ch_ua_platform", r.sec_ch_ua_platform.as_ref())
        .hint(
            "sec_ch_ua_platform_version",
            r.sec_ch_ua_platform_version.as_ref(),
        )
        .hint("sec_ch_ua_model", r.sec_ch_ua_model.as_ref())
}

/// Flatten an IP result. `ip` is echoed from the query.
pub fn flatten_ip(ip: &str, r: &IpResult) -> Document {
    Document::default()
        .text("ip", ip)
        .number("ip_ver", u64::from(r.ip_ver))
        .text("ip_classification", &r.ip_classification)
        .text("ip_classification_code", &r.ip_classification_code)
        .text("ip_hostname", &r.ip_hostname)
        .text("ip_last_seen", &r.ip_last_seen)
        .text("ip_country", &r.ip_country)
        .text("ip_country_code", &r.ip_country_code)
        .text("ip_city", &r.ip_city)
        .text("crawler_name", &r.crawler_name)
        .text("crawler_ver", &r.crawler_ver)
        .text("crawler_ver_major", &r.crawler_ver_major)
        .text("crawler_family", &r.crawler_family)
        .text("crawler_family_code", &r.crawler_family_code)
        .text("crawler_family_homepage", &r.crawler_family_homepage)
        .text("crawler_family_vendor", &r.crawler_family_vendor)
        .text("crawler_family_vendor_code", &r.crawler_family_vendor_code)
        .text(
            "crawler_family_vendor_homepage",
            &r.crawler_family_vendor_homepage,
        )
        .text("crawler_family_icon", &r.crawler_family_icon)
        .text("crawler_family_info_url", &r.crawler_family_info_url)
        .text("crawler_last_seen", &r.crawler_last_seen)
        .text("crawler_category", &r.crawler_category)
        .text("crawler_category_code", &r.crawler_category_code)
        .text("crawler_respect_robotstxt", &r.crawler_respect_robotstxt)
        .text("datacenter_name", &r.datacenter_name)
        .text("datacenter_name_code", &r.datacenter_name_code)
        .text("datacenter_homepage", &r.datacenter_homepage)
}
