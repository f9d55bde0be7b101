use std::time::Duration;

use pretty_assertions::assert_eq;
use quill_api::{ApiClient, ApiConfig, ApiError};
use quill_widgets::{ArticleSource, Candidate, LinkChecker, LookupError, TagSource};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    let config = ApiConfig::new(&server.uri())
        .expect("mock server uri is valid")
        .with_timeout(Duration::from_secs(2));
    ApiClient::new(config).expect("client builds")
}

#[tokio::test]
async fn tag_suggestions_send_query_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags/suggestions"))
        .and(query_param("q", "c++"))
        .and(query_param("limit", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "suggestions": [
                {"tag": "c++", "color": "#00599c", "count": 3},
                {"tag": "c++20"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tags = client(&server).tag_suggestions("c++", 8).await.unwrap();
    assert_eq!(
        tags,
        vec![
            Candidate::new("c++").with_color("#00599c").with_count(3),
            Candidate::new("c++20"),
        ]
    );
}

#[tokio::test]
async fn article_titles_through_the_trait() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/autocomplete"))
        .and(query_param("q", "Py thon"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"suggestions": ["Python", "Python 3"]})),
        )
        .mount(&server)
        .await;

    let source: &dyn ArticleSource = &client(&server);
    let titles = source.autocomplete("Py thon", 8).await.unwrap();
    assert_eq!(
        titles.iter().map(|c| c.identity.as_str()).collect::<Vec<_>>(),
        vec!["Python", "Python 3"]
    );
}

#[tokio::test]
async fn malformed_suggestions_degrade_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags/suggestions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let tags = client(&server).suggest_tags("x", 8).await.unwrap();
    assert!(tags.is_empty());
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags/suggestions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).suggest_tags("x", 8).await.unwrap_err();
    assert!(matches!(err, LookupError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn error_status_maps_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/autocomplete"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client.article_titles("x", 8).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 503, .. }), "{err:?}");
    let err = client.autocomplete("x", 8).await.unwrap_err();
    assert_eq!(err, LookupError::Status(503));
}

#[tokio::test]
async fn validate_posts_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/links/validate"))
        .and(body_json(json!({"content": "See [[Go]] and [[Rust]]"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "has_missing": true,
            "missing": ["Go"],
            "valid": ["Rust"],
            "total": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server)
        .validate("See [[Go]] and [[Rust]]")
        .await
        .unwrap();
    assert!(result.has_missing);
    assert_eq!(result.missing, vec!["Go".to_string()]);
    assert_eq!(result.valid, vec!["Rust".to_string()]);
    assert_eq!(result.total, 2);
}

#[tokio::test]
async fn validate_without_has_missing_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/links/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"missing": ["Go"]})))
        .mount(&server)
        .await;

    let err = client(&server).validate("[[Go]]").await.unwrap_err();
    assert!(matches!(err, LookupError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn article_exists_reads_flag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/exists"))
        .and(query_param("title", "Rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"exists": true, "title": "Rust"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/articles/exists"))
        .and(query_param("title", "Go"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"exists": false})))
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(client.article_exists("Rust").await.unwrap());
    assert!(!client.article_exists("Go").await.unwrap());
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let config = ApiConfig::new("http://127.0.0.1:9")
        .unwrap()
        .with_timeout(Duration::from_millis(500));
    let client = ApiClient::new(config).unwrap();
    let err = client.validate("[[Go]]").await.unwrap_err();
    assert!(matches!(err, LookupError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/api/articles/exists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"exists": true})))
        .mount(&server)
        .await;

    let config = ApiConfig::new(&format!("{}/wiki", server.uri())).unwrap();
    let client = ApiClient::new(config).unwrap();
    assert!(client.article_exists("Anything").await.unwrap());
}
