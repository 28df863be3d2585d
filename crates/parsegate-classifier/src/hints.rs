//! Client-Hint overlay for structured User-Agent requests.
//!
//! The request's `uaString` is classified first; hints then take precedence
//! for the attributes they describe. Hint values arrive in structured-header
//! form, e.g. `"Google Chrome";v="120.0.6099.130", "Not?A_Brand";v="99"`.

use parsegate_core::{query::UaRequest, result::UaResult};

use crate::user_agent::{self, engine, os_family, set_class, set_device, set_family, set_os};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Brand {
    pub name: String,
    pub version: String,
}

pub(crate) fn classify(request: &UaRequest) -> UaResult {
    let mut result = user_agent::classify(request.ua_string.as_deref().unwrap_or(""));
    let mobile = request.sec_ch_ua_mobile.as_deref().map(str::trim);

    let brand = request
        .sec_ch_ua_full_version_list
        .as_deref()
        .and_then(pick_brand)
        .or_else(|| request.sec_ch_ua.as_deref().and_then(pick_brand));
    if let Some(brand) = brand {
        let family = family_name(&brand.name);
        let version = match request.sec_ch_ua_full_version.as_deref().map(unquote) {
            Some(full) if !full.is_empty() && !brand.version.contains('.') => full.to_string(),
            _ => brand.version.clone(),
        };
        let vendor = brand_vendor(family);
        set_family(&mut result, family, &version, vendor);
        result.ua_engine = engine(family, "").to_string();
        if result.ua_class.is_empty() || result.ua_class == "Unrecognized" {
            set_class(
                &mut result,
                if mobile == Some("?1") {
                    "Mobile browser"
                } else {
                    "Browser"
                },
            );
        }
    }

    if let Some(platform) = request
        .sec_ch_ua_platform
        .as_deref()
        .map(unquote)
        .filter(|p| !p.is_empty())
    {
        let (family, vendor) = os_family(platform);
        let version = request
            .sec_ch_ua_platform_version
            .as_deref()
            .map(unquote)
            .unwrap_or("");
        set_os(&mut result, &os_name(family, version), family, vendor);
    }

    match mobile {
        Some("?1") => set_device(&mut result, "Smartphone", "", ""),
        Some("?0") if result.device_class != "Tablet" => set_device(&mut result, "Desktop", "", ""),
        _ => {}
    }
    if let Some(model) = request
        .sec_ch_ua_model
        .as_deref()
        .map(unquote)
        .filter(|m| !m.is_empty())
    {
        result.device_marketname = model.to_string();
    }

    result.sec_ch_ua = request.sec_ch_ua.clone();
    result.sec_ch_ua_full_version_list = request.sec_ch_ua_full_version_list.clone();
    result.sec_ch_ua_mobile = request.sec_ch_ua_mobile.clone();
    result.sec_ch_ua_full_version = request.sec_ch_ua_full_version.clone();
    result.sec_ch_ua_platform = request.sec_ch_ua_platform.clone();
    result.sec_ch_ua_platform_version = request.sec_ch_ua_platform_version.clone();
    result.sec_ch_ua_model = request.sec_ch_ua_model.clone();
    result
}

/// Parse a brand list such as `Sec-CH-UA` or `Sec-CH-UA-Full-Version-List`.
pub(crate) fn parse_brands(header: &str) -> Vec<Brand> {
    split_unquoted(header, ',')
        .into_iter()
        .filter_map(|item| {
            let mut parts = split_unquoted(item, ';').into_iter();
            let name = unquote(parts.next()?);
            if name.is_empty() {
                return None;
            }
            let version = parts
                .filter_map(|p| p.trim().strip_prefix("v="))
                .map(unquote)
                .next()
                .unwrap_or("");
            Some(Brand {
                name: name.to_string(),
                version: version.to_string(),
            })
        })
        .collect()
}

/// First meaningful brand: GREASE entries are skipped and the generic
/// "Chromium" entry only wins when nothing more specific is listed.
fn pick_brand(header: &str) -> Option<Brand> {
    let brands: Vec<Brand> = parse_brands(header)
        .into_iter()
        .filter(|b| !is_grease(&b.name))
        .collect();
    brands
        .iter()
        .find(|b| b.name != "Chromium")
        .or_else(|| brands.first())
        .cloned()
}

fn is_grease(name: &str) -> bool {
    name.contains("Not") && name.contains("Brand")
}

fn family_name(brand: &str) -> &str {
    match brand {
        "Google Chrome" => "Chrome",
        "Microsoft Edge" => "Edge",
        "Opera" | "Opera GX" => "Opera",
        "Samsung Internet" => "Samsung Internet",
        "Yandex" => "YandexBrowser",
        other => other,
    }
}

fn brand_vendor(family: &str) -> &'static str {
    match family {
        "Chrome" | "Chromium" => "Google",
        "Edge" => "Microsoft",
        "Opera" => "Opera",
        "Samsung Internet" => "Samsung",
        _ => "",
    }
}

fn os_name(family: &str, version: &str) -> String {
    if family == "Windows" {
        // Platform versions 13 and above are Windows 11.
        return match version.split('.').next().and_then(|m| m.parse::<u32>().ok()) {
            Some(m) if m >= 13 => "Windows 11".to_string(),
            Some(m) if m > 0 => "Windows 10".to_string(),
            _ => family.to_string(),
        };
    }
    if version.is_empty() {
        family.to_string()
    } else {
        format!("{family} {version}")
    }
}

fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(trimmed)
}

/// Split on `sep` outside double-quoted strings.
fn split_unquoted(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (idx, c) in input.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == sep && !in_quotes => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}
