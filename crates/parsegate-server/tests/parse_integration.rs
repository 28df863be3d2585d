use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use parsegate_core::classifier::Classifier;
use parsegate_core::config::Config;
use parsegate_core::error::ClassifyError;
use parsegate_core::query::UaQuery;
use parsegate_core::result::{IpResult, UaResult};
use parsegate_server::app::build_app;
use parsegate_server::state::AppState;

#[derive(Clone, Copy)]
enum Mode {
    Succeed,
    Reject,
    UnknownHost,
    StoreDown,
    Unclassified,
}

struct StubClassifier {
    mode: Mode,
    calls: Mutex<Vec<String>>,
}

impl StubClassifier {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock calls").clone()
    }

    fn fail(&self, specimen: &str) -> Option<ClassifyError> {
        match self.mode {
            Mode::Succeed => None,
            Mode::Reject => Some(ClassifyError::Rejected("bad specimen".to_string())),
            Mode::UnknownHost => Some(ClassifyError::UnknownHost(specimen.to_string())),
            Mode::StoreDown => Some(ClassifyError::Store(anyhow::anyhow!("db offline"))),
            Mode::Unclassified => Some(ClassifyError::Other(anyhow::anyhow!("index out of range"))),
        }
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify_user_agent(&self, query: &UaQuery) -> Result<UaResult, ClassifyError> {
        self.calls
            .lock()
            .expect("lock calls")
            .push(format!("ua:{}", query.ua_string()));
        if let Some(err) = self.fail(query.ua_string()) {
            return Err(err);
        }
        let mut result = UaResult {
            ua_class: "Browser".to_string(),
            ua_family: "Firefox".to_string(),
            ..Default::default()
        };
        if let UaQuery::Structured(request) = query {
            result.sec_ch_ua_mobile = request.sec_ch_ua_mobile.clone();
        }
        Ok(result)
    }

    async fn classify_address(&self, ip: &str) -> Result<IpResult, ClassifyError> {
        self.calls.lock().expect("lock calls").push(format!("ip:{ip}"));
        match self.fail(ip) {
            Some(err) => Err(err),
            None => Ok(IpResult {
                ip_ver: 4,
                ip_country: "Czechia".to_string(),
                ..Default::default()
            }),
        }
    }
}

fn test_config() -> Config {
    Config {
        port: 0,
        geoip_path: "/nonexistent/GeoLite2-City.mmdb".to_string(),
        resolve_hostnames: false,
        ..Config::default()
    }
}

fn setup(mode: Mode) -> (Arc<AppState>, Arc<StubClassifier>) {
    let classifier = Arc::new(StubClassifier::new(mode));
    let state = Arc::new(AppState::new(classifier.clone(), test_config()));
    (state, classifier)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

fn get_accepting(uri: &str, accept: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Accept", accept)
        .body(Body::empty())
        .expect("build request")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    post_raw(uri, "application/json", body.to_string())
}

fn post_raw(uri: &str, content_type: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", content_type)
        .body(Body::from(body.into()))
        .expect("build request")
}

async fn text_body(response: axum::http::Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&text_body(response).await).expect("parse JSON")
}

fn content_type(response: &axum::http::Response<Body>) -> String {
    response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// ============================================================
// GET /parse/ua/{ua}
// ============================================================

#[tokio::test]
async fn test_parse_ua_keeps_slashes_in_specimen() {
    let (state, classifier) = setup(Mode::Succeed);
    let app = build_app(state.clone());

    let response = app
        .oneshot(get("/parse/ua/Mozilla/5.0%20(X11;%20Linux)"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["ua_string"], "Mozilla/5.0 (X11; Linux)");
    assert_eq!(json["ua_class"], "Browser");
    assert_eq!(json["ua_family"], "Firefox");
    assert_eq!(json["sec_ch_ua"], "");
    assert_eq!(json["sec_ch_ua_model"], "");
    assert_eq!(classifier.calls(), vec!["ua:Mozilla/5.0 (X11; Linux)"]);

    let stats = state.stats.snapshot();
    assert_eq!(stats.ua.count, 1);
    assert_eq!(stats.ip.count, 0);
}

#[tokio::test]
async fn test_parse_ua_keys_are_ordered() {
    let (state, _) = setup(Mode::Succeed);
    let app = build_app(state);

    let response = app.oneshot(get("/parse/ua/curl/8.0")).await.expect("request");
    let body = text_body(response).await;
    let ua_string = body.find("\"ua_string\"").expect("ua_string key");
    let ua_class = body.find("\"ua_class\"").expect("ua_class key");
    let sec_ch_ua = body.find("\"sec_ch_ua\"").expect("sec_ch_ua key");
    assert!(ua_string < ua_class);
    assert!(ua_class < sec_ch_ua);
}

#[tokio::test]
async fn test_parse_ua_without_specimen_is_400_and_counted() {
    let (state, classifier) = setup(Mode::Succeed);
    let app = build_app(state.clone());

    let response = app.oneshot(get("/parse/ua")).await.expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(text_body(response).await, "");
    assert!(classifier.calls().is_empty());
    assert_eq!(state.stats.snapshot().ua.count, 1);
}

#[tokio::test]
async fn test_parse_ua_rejection_returns_message() {
    let (state, _) = setup(Mode::Reject);
    let app = build_app(state.clone());

    let response = app.oneshot(get("/parse/ua/bad")).await.expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(content_type(&response).starts_with("text/plain"));
    assert_eq!(text_body(response).await, "bad specimen");
    assert_eq!(state.stats.snapshot().ua.count, 1);
}

#[tokio::test]
async fn test_parse_ua_store_failure_is_500_with_empty_body() {
    let (state, _) = setup(Mode::StoreDown);
    let app = build_app(state.clone());

    let response = app.oneshot(get("/parse/ua/Mozilla")).await.expect("request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(text_body(response).await, "");
    assert_eq!(state.stats.snapshot().ua.count, 1);
}

#[tokio::test]
async fn test_parse_ua_unclassified_failure_is_500() {
    let (state, _) = setup(Mode::Unclassified);
    let app = build_app(state.clone());

    let response = app.oneshot(get("/parse/ua/Mozilla")).await.expect("request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(text_body(response).await, "");
    assert_eq!(state.stats.snapshot().ua.count, 1);
}

#[tokio::test]
async fn test_parse_ua_invalid_utf8_is_decoded_lossily_and_counted() {
    let (state, classifier) = setup(Mode::Succeed);
    let app = build_app(state.clone());

    let response = app.oneshot(get("/parse/ua/abc%FF")).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["ua_string"], "abc\u{FFFD}");
    assert_eq!(classifier.calls(), vec!["ua:abc\u{FFFD}"]);
    assert_eq!(state.stats.snapshot().ua.count, 1);
}

// ============================================================
// POST /parse/ua-v4
// ============================================================

#[tokio::test]
async fn test_parse_ua_v4_empty_body_is_still_classified() {
    let (state, classifier) = setup(Mode::Succeed);
    let app = build_app(state.clone());

    let response = app
        .oneshot(post_json("/parse/ua-v4", serde_json::json!({})))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["ua_string"], "");
    assert_eq!(json["sec_ch_ua_mobile"], "");
    assert_eq!(classifier.calls(), vec!["ua:"]);
    assert_eq!(state.stats.snapshot().ua.count, 1);
}

#[tokio::test]
async fn test_parse_ua_v4_echoes_hints() {
    let (state, classifier) = setup(Mode::Succeed);
    let app = build_app(state);

    let response = app
        .oneshot(post_json(
            "/parse/ua-v4",
            serde_json::json!({
                "uaString": "Mozilla/5.0 (Linux; Android 14)",
                "secChUaMobile": "?1"
            }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["ua_string"], "");
    assert_eq!(json["sec_ch_ua_mobile"], "?1");
    assert_eq!(classifier.calls(), vec!["ua:Mozilla/5.0 (Linux; Android 14)"]);
}

#[tokio::test]
async fn test_parse_ua_v4_accepts_xml_body() {
    let (state, classifier) = setup(Mode::Succeed);
    let app = build_app(state.clone());

    let response = app
        .oneshot(post_raw(
            "/parse/ua-v4",
            "application/xml",
            "<parseUaV4Request>\
               <uaString>Mozilla/5.0 (Linux; Android 14)</uaString>\
               <secChUaMobile>?1</secChUaMobile>\
             </parseUaV4Request>",
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["ua_string"], "");
    assert_eq!(json["sec_ch_ua_mobile"], "?1");
    assert_eq!(classifier.calls(), vec!["ua:Mozilla/5.0 (Linux; Android 14)"]);
    assert_eq!(state.stats.snapshot().ua.count, 1);
}

#[tokio::test]
async fn test_parse_ua_v4_malformed_body_is_400_and_counted() {
    let (state, classifier) = setup(Mode::Succeed);

    let json = build_app(state.clone())
        .oneshot(post_raw("/parse/ua-v4", "application/json", "{\"uaString\": "))
        .await
        .expect("request");
    assert_eq!(json.status(), StatusCode::BAD_REQUEST);
    assert_eq!(text_body(json).await, "");

    let xml = build_app(state.clone())
        .oneshot(post_raw("/parse/ua-v4", "text/xml", "<parseUaV4Request><uaString>"))
        .await
        .expect("request");
    assert_eq!(xml.status(), StatusCode::BAD_REQUEST);
    assert_eq!(text_body(xml).await, "");

    assert!(classifier.calls().is_empty());
    assert_eq!(state.stats.snapshot().ua.count, 2);
}

#[tokio::test]
async fn test_parse_ua_v4_text_output_escapes_line_breaks() {
    let (state, _) = setup(Mode::Succeed);
    let app = build_app(state);

    let request = Request::builder()
        .method("POST")
        .uri("/parse/ua-v4")
        .header("Content-Type", "application/json")
        .header("Accept", "text/plain")
        .body(Body::from(
            serde_json::json!({ "secChUaMobile": "?1\nip=6.6.6.6" }).to_string(),
        ))
        .expect("build request");

    let response = app.oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = text_body(response).await;
    assert!(body.contains("\nsec_ch_ua_mobile=?1\\nip=6.6.6.6\n"));
    assert!(!body.lines().any(|line| line.starts_with("ip=")));
}

#[tokio::test]
async fn test_parse_ua_v4_does_not_offer_xml() {
    let (state, classifier) = setup(Mode::Succeed);
    let app = build_app(state.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/parse/ua-v4")
        .header("Content-Type", "application/json")
        .header("Accept", "application/xml")
        .body(Body::from("{}"))
        .expect("build request");

    let response = app.oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    assert!(classifier.calls().is_empty());
    assert_eq!(state.stats.snapshot().ua.count, 0);
}

// ============================================================
// GET /parse/ip/{ip}
// ============================================================

#[tokio::test]
async fn test_parse_ip_returns_numeric_version() {
    let (state, _) = setup(Mode::Succeed);
    let app = build_app(state.clone());

    let response = app.oneshot(get("/parse/ip/1.2.3.4")).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["ip"], "1.2.3.4");
    assert_eq!(json["ip_ver"], 4);
    assert_eq!(json["ip_country"], "Czechia");

    let stats = state.stats.snapshot();
    assert_eq!(stats.ip.count, 1);
    assert_eq!(stats.ua.count, 0);
}

#[tokio::test]
async fn test_parse_ip_unknown_host_is_400_with_message() {
    let (state, _) = setup(Mode::UnknownHost);
    let app = build_app(state.clone());

    let response = app
        .oneshot(get("/parse/ip/not-a-real-host.invalid"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(text_body(response).await, "error: unknown host.");
    assert_eq!(state.stats.snapshot().ip.count, 1);
}

#[tokio::test]
async fn test_parse_ip_without_specimen_is_400_and_counted() {
    let (state, classifier) = setup(Mode::Succeed);
    let app = build_app(state.clone());

    let response = app.oneshot(get("/parse/ip")).await.expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(classifier.calls().is_empty());
    assert_eq!(state.stats.snapshot().ip.count, 1);
}

#[tokio::test]
async fn test_parse_ip_invalid_utf8_is_decoded_lossily_and_counted() {
    let (state, classifier) = setup(Mode::Succeed);
    let app = build_app(state.clone());

    let response = app.oneshot(get("/parse/ip/%FF")).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(classifier.calls(), vec!["ip:\u{FFFD}"]);
    assert_eq!(state.stats.snapshot().ip.count, 1);
}

#[tokio::test]
async fn test_parse_ip_renders_xml() {
    let (state, _) = setup(Mode::Succeed);
    let app = build_app(state);

    let response = app
        .oneshot(get_accepting("/parse/ip/1.2.3.4", "text/xml"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).starts_with("application/xml"));

    let body = text_body(response).await;
    assert!(body.starts_with("<?xml"));
    assert!(body.contains("<ip_address><ip>1.2.3.4</ip><ip_ver>4</ip_ver>"));
}

#[tokio::test]
async fn test_parse_ip_renders_plain_text() {
    let (state, _) = setup(Mode::Succeed);
    let app = build_app(state);

    let response = app
        .oneshot(get_accepting("/parse/ip/1.2.3.4", "text/plain"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).starts_with("text/plain"));

    let body = text_body(response).await;
    assert!(body.starts_with("ip=1.2.3.4\nip_ver=4\n"));
    assert!(body.contains("ip_country=Czechia\n"));
}

#[tokio::test]
async fn test_unsupported_accept_is_406() {
    let (state, classifier) = setup(Mode::Succeed);
    let app = build_app(state.clone());

    let response = app
        .oneshot(get_accepting("/parse/ip/1.2.3.4", "image/png"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    assert!(classifier.calls().is_empty());
    assert_eq!(state.stats.snapshot().ip.count, 0);
}

// ============================================================
// GET /parse?ua=..&ip=..
// ============================================================

#[tokio::test]
async fn test_combined_returns_both_sections() {
    let (state, classifier) = setup(Mode::Succeed);
    let app = build_app(state.clone());

    let response = app
        .oneshot(get("/parse?ua=Mozilla%2F5.0&ip=1.2.3.4"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["user_agent"]["ua_string"], "Mozilla/5.0");
    assert_eq!(json["ip_address"]["ip"], "1.2.3.4");
    assert_eq!(classifier.calls(), vec!["ua:Mozilla/5.0", "ip:1.2.3.4"]);

    let stats = state.stats.snapshot();
    assert_eq!(stats.ua.count, 1);
    assert_eq!(stats.ip.count, 1);
    assert_eq!(stats.ua.total_ms, stats.ip.total_ms);
}

#[tokio::test]
async fn test_combined_with_only_ip_omits_user_agent() {
    let (state, _) = setup(Mode::Succeed);
    let app = build_app(state);

    let response = app.oneshot(get("/parse?ip=1.2.3.4")).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert!(json.get("user_agent").is_none());
    assert_eq!(json["ip_address"]["ip_ver"], 4);
}

#[tokio::test]
async fn test_combined_with_nothing_is_400_and_counts_both() {
    let (state, classifier) = setup(Mode::Succeed);
    let app = build_app(state.clone());

    let response = app.oneshot(get("/parse?ua=&ip=")).await.expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(text_body(response).await, "");
    assert!(classifier.calls().is_empty());

    let stats = state.stats.snapshot();
    assert_eq!(stats.ua.count, 1);
    assert_eq!(stats.ip.count, 1);
}

#[tokio::test]
async fn test_combined_unknown_host_fails_whole_request() {
    let (state, _) = setup(Mode::UnknownHost);
    let app = build_app(state);

    let response = app
        .oneshot(get("/parse?ip=not-a-real-host.invalid"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(text_body(response).await, "error: unknown host.");
}

#[tokio::test]
async fn test_combined_renders_prefixed_plain_text() {
    let (state, _) = setup(Mode::Succeed);
    let app = build_app(state);

    let response = app
        .oneshot(get_accepting("/parse?ua=curl&ip=1.2.3.4", "text/plain"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = text_body(response).await;
    assert!(body.starts_with("user_agent.ua_string=curl\n"));
    assert!(body.contains("\nip_address.ip=1.2.3.4\n"));
}

#[tokio::test]
async fn test_combined_repeated_key_takes_the_first_value() {
    let (state, classifier) = setup(Mode::Succeed);
    let app = build_app(state.clone());

    let response = app.oneshot(get("/parse?ua=first&ua=second")).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["user_agent"]["ua_string"], "first");
    assert_eq!(classifier.calls(), vec!["ua:first"]);

    let stats = state.stats.snapshot();
    assert_eq!(stats.ua.count, 1);
    assert_eq!(stats.ip.count, 1);
}

#[tokio::test]
async fn test_combined_ua_rejection_skips_the_address() {
    let (state, classifier) = setup(Mode::Reject);
    let app = build_app(state.clone());

    let response = app
        .oneshot(get("/parse?ua=bad&ip=1.2.3.4"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(text_body(response).await, "bad specimen");
    assert_eq!(classifier.calls(), vec!["ua:bad"]);

    let stats = state.stats.snapshot();
    assert_eq!(stats.ua.count, 1);
    assert_eq!(stats.ip.count, 1);
}

#[tokio::test]
async fn test_combined_store_failure_is_500_and_samples_both() {
    let (state, _) = setup(Mode::StoreDown);
    let app = build_app(state.clone());

    let response = app
        .oneshot(get("/parse?ua=curl&ip=1.2.3.4"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(text_body(response).await, "");

    let stats = state.stats.snapshot();
    assert_eq!(stats.ua.count, 1);
    assert_eq!(stats.ip.count, 1);
}
