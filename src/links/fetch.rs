// src/links/fetch.rs
// =============================================================================
// This module downloads the friend-link list.
//
// The source is a JSON document of the form:
//   { "link_list": [ { "name": ..., "link": ..., "avatar": ... }, ... ] }
//
// This is the one fatal step of a run: if the list can't be fetched there is
// nothing to check, so the error is propagated all the way to main().
// =============================================================================

use super::LinkRecord;
use anyhow::{anyhow, Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct LinkListDocument {
    #[serde(default)]
    link_list: Vec<LinkRecord>,
}

// Fetches and parses the link list
//
// Parameters:
//   client: reqwest HTTP client
//   url: URL of the JSON document
//
// Returns: every entry of `link_list`, each tagged with its position
pub async fn fetch_link_list(client: &Client, url: &str) -> Result<Vec<LinkRecord>> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch link list from {}", url))?;

    // Anything but a plain 200 means we don't trust the body
    if response.status() != StatusCode::OK {
        return Err(anyhow!(
            "Failed to fetch link list from {}: HTTP {}",
            url,
            response.status()
        ));
    }

    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read link list body from {}", url))?;

    parse_link_list(&body)
}

// Parses the JSON document and assigns each record its id
pub fn parse_link_list(body: &str) -> Result<Vec<LinkRecord>> {
    let document: LinkListDocument =
        serde_json::from_str(body).context("Link list is not valid JSON")?;

    Ok(document
        .link_list
        .into_iter()
        .enumerate()
        .map(|(id, record)| LinkRecord { id, ..record })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_assigns_ids_in_order() {
        let body = r#"{"link_list":[
            {"name":"A","link":"https://a.example","avatar":"https://a.example/a.png"},
            {"name":"B","link":"https://b.example"}
        ]}"#;
        let records = parse_link_list(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 0);
        assert_eq!(records[0].avatar, "https://a.example/a.png");
        assert_eq!(records[1].id, 1);
        assert_eq!(records[1].name, "B");
    }

    #[test]
    fn test_parse_null_avatar_keeps_every_record() {
        let body = r#"{"link_list":[
            {"name":"A","link":"https://a.example","avatar":null},
            {"name":"B","link":"https://b.example","avatar":"https://b.example/b.png"}
        ]}"#;
        let records = parse_link_list(body).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].avatar.is_null());
        assert_eq!(records[1].avatar, "https://b.example/b.png");
    }

    #[test]
    fn test_parse_missing_list_is_empty() {
        let records = parse_link_list(r#"{"other": 1}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(parse_link_list("not json").is_err());
    }

    #[tokio::test]
    async fn test_fetch_link_list_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flink.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"link_list":[{"name":"A","link":"https://ok.example"}]}"#,
            ))
            .mount(&server)
            .await;

        let url = format!("{}/flink.json", server.uri());
        let records = fetch_link_list(&Client::new(), &url).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].link, "https://ok.example");
    }

    #[tokio::test]
    async fn test_fetch_link_list_server_error_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = fetch_link_list(&Client::new(), &server.uri()).await;
        let message = result.unwrap_err().to_string();
        assert!(message.contains("500"), "unexpected error: {}", message);
    }
}
