//! Free-text User-Agent classification via `woothee`.

use parsegate_core::result::UaResult;

use crate::codes::{icons, known, major, slug, vendor_homepage};

/// Classify a raw User-Agent string. An unparseable string yields an
/// "Unrecognized" result rather than an error.
pub(crate) fn classify(user_agent: &str) -> UaResult {
    let mut result = UaResult::default();

    let parsed = if user_agent.is_empty() {
        None
    } else {
        woothee::parser::Parser::new().parse(user_agent)
    };
    let Some(parsed) = parsed else {
        set_class(&mut result, "Unrecognized");
        return result;
    };

    let category = known(parsed.category);
    let name = known(parsed.name);
    let version = known(parsed.version);
    let os = known(parsed.os);
    let os_version = known(&parsed.os_version).to_string();

    set_class(&mut result, ua_class(category));
    if !name.is_empty() {
        set_family(&mut result, name, version, known(parsed.vendor));
        result.ua_engine = engine(name, user_agent).to_string();
    }

    if category == "crawler" {
        result.crawler_category = "Uncategorised".to_string();
        result.crawler_category_code = slug(&result.crawler_category);
        result.crawler_respect_robotstxt = "unknown".to_string();
        return result;
    }

    if !os.is_empty() {
        let (family, vendor) = os_family(os);
        // Windows names already carry the release ("Windows 10").
        let base = match family {
            "iOS" | "macOS" => family,
            _ => os,
        };
        let os_name = if family == "Windows" || os_version.is_empty() {
            base.to_string()
        } else {
            format!("{base} {os_version}")
        };
        set_os(&mut result, &os_name, family, vendor);
    }

    let class = device_class(category, os, user_agent);
    let brand = match os {
        "iPhone" | "iPad" | "iPod" | "Mac OSX" => "Apple",
        _ => "",
    };
    let marketname = match os {
        "iPhone" | "iPad" | "iPod" => os,
        _ => "",
    };
    set_device(&mut result, class, brand, marketname);

    result
}

pub(crate) fn set_class(result: &mut UaResult, class: &str) {
    result.ua_class = class.to_string();
    result.ua_class_code = slug(class);
}

pub(crate) fn set_family(result: &mut UaResult, family: &str, version: &str, vendor: &str) {
    result.ua_family = family.to_string();
    result.ua_family_code = slug(family);
    (result.ua_family_icon, result.ua_family_icon_big) = icons(&result.ua_family_code);
    result.ua_version = version.to_string();
    result.ua_version_major = major(version).to_string();
    result.ua = if version.is_empty() {
        family.to_string()
    } else {
        format!("{family} {version}")
    };
    result.ua_family_vendor = vendor.to_string();
    result.ua_family_vendor_code = slug(vendor);
    result.ua_family_vendor_homepage = vendor_homepage(vendor).to_string();
}

pub(crate) fn set_os(result: &mut UaResult, os: &str, family: &str, vendor: &str) {
    result.os = os.to_string();
    result.os_code = slug(os);
    (result.os_icon, result.os_icon_big) = icons(&slug(family));
    result.os_family = family.to_string();
    result.os_family_code = slug(family);
    result.os_family_vendor = vendor.to_string();
    result.os_family_vendor_code = slug(vendor);
    result.os_family_vendor_homepage = vendor_homepage(vendor).to_string();
}

pub(crate) fn set_device(result: &mut UaResult, class: &str, brand: &str, marketname: &str) {
    result.device_class = class.to_string();
    result.device_class_code = slug(class);
    (result.device_class_icon, result.device_class_icon_big) = icons(&result.device_class_code);
    if !brand.is_empty() {
        result.device_brand = brand.to_string();
        result.device_brand_code = slug(brand);
        result.device_brand_homepage = vendor_homepage(brand).to_string();
        (result.device_brand_icon, result.device_brand_icon_big) =
            icons(&result.device_brand_code);
    }
    if !marketname.is_empty() {
        result.device_marketname = marketname.to_string();
    }
}

fn ua_class(category: &str) -> &'static str {
    match category {
        "pc" | "appliance" => "Browser",
        "smartphone" | "mobilephone" => "Mobile browser",
        "crawler" => "Crawler",
        "misc" => "Library",
        _ => "Unrecognized",
    }
}

pub(crate) fn engine(family: &str, user_agent: &str) -> &'static str {
    match family {
        "Chrome" | "Chromium" | "Opera" | "Vivaldi" | "YandexBrowser" | "Brave" | "Webview"
        | "Samsung Internet" => "WebKit/Blink",
        "Edge" if user_agent.contains("Edge/") => "EdgeHTML",
        "Edge" => "WebKit/Blink",
        "Firefox" => "Gecko",
        "Safari" => "WebKit",
        "Internet Explorer" => "Trident",
        _ => "",
    }
}

/// `(family, vendor)` for a woothee OS name or a Client-Hint platform.
pub(crate) fn os_family(os: &str) -> (&str, &'static str) {
    match os {
        o if o.starts_with("Windows Phone") => ("Windows Phone", "Microsoft"),
        o if o.starts_with("Windows") => ("Windows", "Microsoft"),
        "Mac OSX" | "macOS" => ("macOS", "Apple"),
        "iPhone" | "iPad" | "iPod" | "iOS" => ("iOS", "Apple"),
        "Android" => ("Android", "Google"),
        "ChromeOS" | "Chrome OS" => ("Chrome OS", "Google"),
        "Linux" => ("Linux", "Linux Foundation"),
        o if o.starts_with("BlackBerry") => ("BlackBerry OS", "BlackBerry"),
        "FreeBSD" | "NetBSD" | "OpenBSD" => ("BSD", ""),
        other => (other, ""),
    }
}

fn device_class(category: &str, os: &str, user_agent: &str) -> &'static str {
    match category {
        "pc" => "Desktop",
        "smartphone" if os == "iPad" => "Tablet",
        "smartphone" if os == "Android" && !user_agent.contains("Mobile") => "Tablet",
        "smartphone" => "Smartphone",
        "mobilephone" => "Feature phone",
        "appliance" if ["Nintendo", "PlayStation", "Xbox"].iter().any(|c| os.contains(c)) => {
            "Game console"
        }
        "appliance" => "Smart TV",
        _ => "",
    }
}
