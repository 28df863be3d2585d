/// Lowercase snake-case code for a display name: `"Mobile browser"` ->
/// `"mobile_browser"`, `"Internet Explorer 11"` -> `"internet_explorer_11"`.
pub(crate) fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// `(small, big)` icon file names for a code; empty for an empty code.
pub(crate) fn icons(code: &str) -> (String, String) {
    if code.is_empty() {
        return (String::new(), String::new());
    }
    (format!("{code}.png"), format!("{code}_big.png"))
}

pub(crate) fn vendor_homepage(vendor: &str) -> &'static str {
    match vendor {
        "Apple" => "https://www.apple.com/",
        "Google" => "https://www.google.com/",
        "Microsoft" => "https://www.microsoft.com/",
        "Mozilla" => "https://www.mozilla.org/",
        "Opera" => "https://www.opera.com/",
        "Linux Foundation" => "https://www.linuxfoundation.org/",
        "BlackBerry" => "https://www.blackberry.com/",
        "Samsung" => "https://www.samsung.com/",
        _ => "",
    }
}

/// woothee reports unknown attributes as `"UNKNOWN"`.
pub(crate) fn known(value: &str) -> &str {
    if value == "UNKNOWN" {
        ""
    } else {
        value
    }
}

/// Leading numeric component of a dotted version.
pub(crate) fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or("")
}
