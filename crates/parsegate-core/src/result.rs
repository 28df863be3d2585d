use serde::Serialize;

/// Attributes a [`Classifier`](crate::classifier::Classifier) reports for a
/// User-Agent specimen.
///
/// Unknown attributes are empty strings. The seven Client-Hint echoes are the
/// only optional fields: they mirror what the request carried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UaResult {
    pub ua_class: String,
    pub ua_class_code: String,
    /// Family plus version, e.g. `"Chrome 120.0.6099.130"`.
    pub ua: String,
    pub ua_engine: String,
    pub ua_version: String,
    pub ua_version_major: String,
    pub ua_uptodate_current_version: String,
    pub ua_family: String,
    pub ua_family_code: String,
    pub ua_family_homepage: String,
    pub ua_family_vendor: String,
    pub ua_family_vendor_code: String,
    pub ua_family_vendor_homepage: String,
    pub ua_family_icon: String,
    pub ua_family_icon_big: String,
    pub ua_family_info_url: String,

    pub os: String,
    pub os_code: String,
    pub os_homepage: String,
    pub os_icon: String,
    pub os_icon_big: String,
    pub os_info_url: String,
    pub os_family: String,
    pub os_family_code: String,
    pub os_family_vendor: String,
    pub os_family_vendor_code: String,
    pub os_family_vendor_homepage: String,

    pub device_class: String,
    pub device_class_code: String,
    pub device_class_icon: String,
    pub device_class_icon_big: String,
    pub device_class_info_url: String,
    pub device_brand: String,
    pub device_brand_code: String,
    pub device_brand_homepage: String,
    pub device_brand_icon: String,
    pub device_brand_icon_big: String,
    pub device_marketname: String,
    pub device_brand_info_url: String,

    pub crawler_last_seen: String,
    pub crawler_category: String,
    pub crawler_category_code: String,
    pub crawler_respect_robotstxt: String,

    pub sec_ch_ua: Option<String>,
    pub sec_ch_ua_full_version_list: Option<String>,
    pub sec_ch_ua_mobile: Option<String>,
    pub sec_ch_ua_full_version: Option<String>,
    pub sec_ch_ua_platform: Option<String>,
    pub sec_ch_ua_platform_version: Option<String>,
    pub sec_ch_ua_model: Option<String>,
}

/// Attributes a [`Classifier`](crate::classifier::Classifier) reports for an
/// IP address or host name specimen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IpResult {
    /// 4 or 6; 0 when unknown.
    pub ip_ver: u8,
    pub ip_classification: String,
    pub ip_classification_code: String,
    pub ip_hostname: String,
    pub ip_last_seen: String,
    pub ip_country: String,
    pub ip_country_code: String,
    pub ip_city: String,

    pub crawler_name: String,
    pub crawler_ver: String,
    pub crawler_ver_major: String,
    pub crawler_family: String,
    pub crawler_family_code: String,
    pub crawler_family_homepage: String,
    pub crawler_family_vendor: String,
    pub crawler_family_vendor_code: String,
    pub crawler_family_vendor_homepage: String,
    pub crawler_family_icon: String,
    pub crawler_family_info_url: String,
    pub crawler_last_seen: String,
    pub crawler_category: String,
    pub crawler_category_code: String,
    pub crawler_respect_robotstxt: String,

    pub datacenter_name: String,
    pub datacenter_name_code: String,
    pub datacenter_homepage: String,
}
