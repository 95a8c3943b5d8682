// End-to-end test of the production adapters against a mock HTTP server.
//
// Every outbound request (page, robots.txt, DNS-over-HTTPS, ip-api through the
// fetch proxy, PageSpeed, Gemini) is served by one httptest server, so this
// exercises `build_services` wiring as well as the orchestrator.

use httptest::{all_of, matchers::*, responders::*, Expectation, Server};
use serde_json::json;

use seo_analyzer::initialization::build_services;
use seo_analyzer::models::{ChatRole, RobotsTxtStatus};
use seo_analyzer::{AnalysisOrchestrator, Config, RunPhase};

const PAGE: &str = r#"<html><head>
<title>Example Domain</title>
<meta name="description" content="Example description">
<meta property="og:title" content="Example OG">
</head><body><h1>Example Domain</h1></body></html>"#;

fn gemini_text(text: &str) -> serde_json::Value {
    json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
}

fn expect_site(server: &Server) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/proxy"),
            request::query(url_decoded(contains(("url", "https://www.example.com")))),
        ])
        .respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/html; charset=utf-8")
                .insert_header("Server", "cloudflare")
                .insert_header("Strict-Transport-Security", "max-age=31536000")
                .body(PAGE),
        ),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/proxy"),
            request::query(url_decoded(contains(("url", "https://www.example.com/robots.txt")))),
        ])
        .respond_with(status_code(200).body("User-agent: *\nAllow: /\n")),
    );
}

fn expect_network(server: &Server) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/dns-query"),
            request::query(url_decoded(contains(("type", "A")))),
        ])
        .respond_with(json_encoded(json!({
            "Status": 0,
            "Answer": [{"name": "www.example.com", "type": 1, "TTL": 300, "data": "203.0.113.7"}]
        }))),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/dns-query"),
            request::query(url_decoded(contains(("type", "AAAA")))),
        ])
        .respond_with(json_encoded(json!({"Status": 0}))),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/proxy"),
            request::query(url_decoded(contains(("url", matches("/json/203\\.0\\.113\\.7"))))),
        ])
        .respond_with(json_encoded(json!({
            "status": "success",
            "country": "United States",
            "countryCode": "US",
            "isp": "Cloudflare, Inc.",
            "as": "AS13335 Cloudflare, Inc.",
            "query": "203.0.113.7"
        }))),
    );
}

fn expect_pagespeed(server: &Server) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/runPagespeed"),
            request::query(url_decoded(contains(("url", "https://www.example.com")))),
            request::query(url_decoded(contains(("category", "performance")))),
        ])
        .times(2)
        .respond_with(json_encoded(json!({
            "lighthouseResult": {
                "categories": { "performance": { "score": 0.82 } },
                "audits": {
                    "first-contentful-paint": { "displayValue": "1.1 s", "score": 0.9 },
                    "largest-contentful-paint": { "displayValue": "2.0 s", "score": 0.85 }
                }
            }
        }))),
    );
}

fn config_for(server: &Server) -> Config {
    Config {
        timeout_seconds: 5,
        proxy_prefix: Some(format!("{}?url=", server.url_str("/proxy"))),
        doh_endpoint: server.url_str("/dns-query"),
        ip_api_endpoint: server.url_str("/json"),
        psi_endpoint: server.url_str("/runPagespeed"),
        gemini_endpoint: server.url_str("/v1beta"),
        gemini_model: "gemini-test".to_string(),
        gemini_api_key: Some("test-key".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_analysis_and_chat_end_to_end() {
    let server = Server::run();
    expect_site(&server);
    expect_network(&server);
    expect_pagespeed(&server);
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/v1beta/models/gemini-test:generateContent"),
            request::headers(contains(key("x-goog-api-key"))),
        ])
        .respond_with(json_encoded(gemini_text("1. Add a canonical link."))),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/v1beta/models/gemini-test:streamGenerateContent"),
            request::query(url_decoded(contains(("alt", "sse")))),
        ])
        .respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/event-stream")
                .body(format!(
                    "data: {}\r\n\r\ndata: {}\r\n\r\n",
                    gemini_text("Your title "),
                    gemini_text("is fine.")
                )),
        ),
    );

    let services = build_services(&config_for(&server)).expect("services should build");
    let orchestrator = AnalysisOrchestrator::new(services);

    let snapshot = orchestrator.start_analysis("example.com").await;
    assert_eq!(snapshot.phase, RunPhase::Settled);
    assert!(snapshot.state.fatal_error.is_none(), "{:?}", snapshot.state.fatal_error);

    let result = snapshot.result.as_ref().expect("result");
    assert_eq!(result.url, "https://www.example.com");
    assert_eq!(result.meta_data.title, "Example Domain");
    assert_eq!(result.meta_data.description, "Example description");
    assert_eq!(result.meta_data.og_title.as_deref(), Some("Example OG"));
    assert_eq!(result.meta_data.robots_txt_status, RobotsTxtStatus::Found);

    let server_details = &result.server_details;
    assert_eq!(server_details.ip_address.as_deref(), Some("203.0.113.7"));
    assert!(server_details.ipv6_address.is_none());
    assert_eq!(server_details.hosting_provider.as_deref(), Some("Cloudflare, Inc."));
    let ip_details = server_details.ip_details.as_ref().expect("ip details");
    assert_eq!(ip_details.country_code.as_deref(), Some("US"));
    assert_eq!(ip_details.asn, Some(13335));
    assert_eq!(server_details.cdn_provider.as_deref(), Some("Cloudflare"));
    assert!(server_details.is_hsts_enabled);

    let psi = result.psi_data.as_ref().expect("performance data");
    for device in [psi.mobile.as_ref(), psi.desktop.as_ref()] {
        let device = device.expect("both devices scored");
        assert_eq!(device.score, 82);
        assert_eq!(device.metric_display("largest-contentful-paint"), Some("2.0 s"));
    }
    assert_eq!(result.seo_suggestions.as_deref(), Some("1. Add a canonical link."));
    assert!(snapshot.session.is_some());

    let json = serde_json::to_value(result).expect("result serializes");
    assert_eq!(json["serverDetails"]["ipDetails"]["country"], "United States");

    orchestrator
        .send_chat_message("Is my title OK?")
        .await
        .expect("message accepted");
    let snapshot = orchestrator.snapshot();
    let reply = snapshot.chat_turns().last().expect("reply turn");
    assert_eq!(reply.role, ChatRole::Model);
    assert_eq!(reply.content, "Your title is fine.");
}

#[tokio::test]
async fn test_missing_gemini_key_degrades_to_analysis_only() {
    let server = Server::run();
    expect_site(&server);
    expect_network(&server);
    expect_pagespeed(&server);

    let config = Config {
        gemini_api_key: None,
        ..config_for(&server)
    };
    let orchestrator = AnalysisOrchestrator::new(build_services(&config).expect("services should build"));

    let snapshot = orchestrator.start_analysis("example.com").await;
    let result = snapshot.result.as_ref().expect("result");

    assert!(snapshot.state.fatal_error.is_none());
    assert!(result.psi_data.is_some());
    assert!(result.seo_suggestions.is_none());
    assert!(result.suggestions_error.is_some());
}
