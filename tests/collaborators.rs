//! Hosted collaborators against a local mock server.
//!
//! Covers the request shape each client sends and how responses map to
//! item state once they pass through the runner.

use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::json;
use std::io::Cursor;
use std::net::TcpListener;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, Request as MockRequest, ResponseTemplate,
};

use listing_studio::config::{RemoveBgConfig, StudioConfig, VisionConfig};
use listing_studio::error::CollaboratorErrorKind;
use listing_studio::processing::{self, Request};
use listing_studio::services::{Collaborators, RemoveBgClient, VisionClient};
use listing_studio::state::{Category, ItemStore, Operation, Priority, Status};
use listing_studio::upload::{accept_bytes, UploadLimits};

fn png(image: RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A small opaque product shot
fn product_png() -> Vec<u8> {
    png(RgbaImage::from_pixel(8, 8, Rgba([40, 90, 160, 255])))
}

/// What the removal service sends back: everything transparent
fn cutout_png() -> Vec<u8> {
    png(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0])))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

fn remove_bg_config(server: &MockServer, api_key: Option<&str>) -> RemoveBgConfig {
    RemoveBgConfig {
        api_key: api_key.map(str::to_string),
        endpoint: format!("{}/v1.0/removebg", server.uri()),
    }
}

fn vision_config(server: &MockServer, api_key: Option<&str>) -> VisionConfig {
    VisionConfig {
        api_key: api_key.map(str::to_string),
        endpoint: format!("{}/v1/chat/completions", server.uri()),
        model: "gpt-4o".to_string(),
        ..VisionConfig::default()
    }
}

fn review_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ]
    })
}

#[tokio::test]
async fn test_remove_bg_sends_multipart_with_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/removebg"))
        .and(header("X-Api-Key", "rb-key"))
        .and(|request: &MockRequest| {
            contains(&request.body, b"name=\"image_file\"") && contains(&request.body, b"name=\"size\"")
        })
        .respond_with(ResponseTemplate::new(200).set_body_bytes(cutout_png()))
        .expect(1)
        .mount(&server)
        .await;

    let client = RemoveBgClient::new(reqwest::Client::new(), &remove_bg_config(&server, Some("rb-key")));
    let body = client.remove_background(Bytes::from(product_png())).await.unwrap();
    assert_eq!(body, Bytes::from(cutout_png()));
}

#[tokio::test]
async fn test_remove_bg_rejection_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/removebg"))
        .respond_with(ResponseTemplate::new(402).set_body_string("insufficient credits"))
        .mount(&server)
        .await;

    let client = RemoveBgClient::new(reqwest::Client::new(), &remove_bg_config(&server, Some("rb-key")));
    let err = client
        .remove_background(Bytes::from(product_png()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), CollaboratorErrorKind::Rejected);
    assert_eq!(
        err.to_string(),
        "remove.bg rejected the request (402): insufficient credits"
    );
}

#[tokio::test]
async fn test_remove_bg_non_image_body_is_unparseable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = RemoveBgClient::new(reqwest::Client::new(), &remove_bg_config(&server, Some("rb-key")));
    let err = client
        .remove_background(Bytes::from(product_png()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CollaboratorErrorKind::Unparseable);
}

#[tokio::test]
async fn test_missing_keys_never_reach_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let remove_bg = RemoveBgClient::new(reqwest::Client::new(), &remove_bg_config(&server, None));
    let err = remove_bg
        .remove_background(Bytes::from(product_png()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CollaboratorErrorKind::Unavailable);

    let vision = VisionClient::new(reqwest::Client::new(), &vision_config(&server, None));
    let err = vision.review(Bytes::from(product_png())).await.unwrap_err();
    assert_eq!(err.kind(), CollaboratorErrorKind::Unavailable);
}

#[tokio::test]
async fn test_unreachable_service_is_unavailable() {
    // Bind then release a port so nothing is listening on it
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = RemoveBgConfig {
        api_key: Some("rb-key".to_string()),
        endpoint: format!("http://127.0.0.1:{port}/v1.0/removebg"),
    };

    let client = RemoveBgClient::new(reqwest::Client::new(), &config);
    let err = client
        .remove_background(Bytes::from(product_png()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CollaboratorErrorKind::Unavailable);
    assert_eq!(err.service(), "remove.bg");
}

#[tokio::test]
async fn test_vision_review_request_and_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer oa-key"))
        .and(body_partial_json(json!({ "model": "gpt-4o", "max_tokens": 500 })))
        .and(|request: &MockRequest| contains(&request.body, b"data:image/png;base64,"))
        .respond_with(ResponseTemplate::new(200).set_body_json(review_body(
            "The background is busy. Use a plain white backdrop.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = VisionClient::new(reqwest::Client::new(), &vision_config(&server, Some("oa-key")));
    let review = client.review(Bytes::from(product_png())).await.unwrap();
    assert_eq!(review, "The background is busy. Use a plain white backdrop.");
}

#[tokio::test]
async fn test_vision_rejection_and_bad_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("Authorization", "Bearer bad-key"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("Authorization", "Bearer oa-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let rejected = VisionClient::new(reqwest::Client::new(), &vision_config(&server, Some("bad-key")));
    let err = rejected.review(Bytes::from(product_png())).await.unwrap_err();
    assert_eq!(err.kind(), CollaboratorErrorKind::Rejected);

    let empty = VisionClient::new(reqwest::Client::new(), &vision_config(&server, Some("oa-key")));
    let err = empty.review(Bytes::from(product_png())).await.unwrap_err();
    assert_eq!(err.kind(), CollaboratorErrorKind::Unparseable);
}

#[tokio::test]
async fn test_configured_collaborators_drive_item_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/removebg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(cutout_png()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(review_body("Meets the guidelines.")))
        .mount(&server)
        .await;

    let config = StudioConfig {
        remove_bg: remove_bg_config(&server, Some("rb-key")),
        vision: vision_config(&server, Some("oa-key")),
        ..StudioConfig::default()
    };
    let collaborators = Collaborators::from_config(&config).unwrap();

    let mut store = ItemStore::new();
    let file = accept_bytes("Kurti Front.png", product_png(), &UploadLimits::default()).unwrap();
    let id = store.add(file);

    let status = processing::run(&mut store, id, Request::enhance(true), &collaborators)
        .await
        .unwrap();
    assert_eq!(status, Status::Done);

    let summary = processing::validate_all(&mut store, &collaborators).await;
    assert_eq!(summary.succeeded, 1);
    assert!(processing::all_enhanced(&store));
    assert!(processing::all_validated(&store));

    let item = store.get(id).unwrap();

    // The transparent cutout comes back flattened onto white as a JPEG
    let derived = image::load_from_memory(item.derived().unwrap().bytes()).unwrap();
    assert_eq!(
        image::guess_format(item.derived().unwrap().bytes()).unwrap(),
        ImageFormat::Jpeg
    );
    let pixel = derived.to_rgb8().get_pixel(4, 4).0;
    assert!(pixel.iter().all(|&c| c >= 250), "expected white, got {pixel:?}");

    let suggestions = item.suggestions();
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].category(), Category::Success);
    assert_eq!(suggestions[1].priority(), Priority::High);
    assert_eq!(suggestions[1].description(), "Meets the guidelines.");
    assert_eq!(item.status(Operation::Validate), Status::Done);
}

#[tokio::test]
async fn test_failed_removal_leaves_item_failed_without_suggestion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream error"))
        .mount(&server)
        .await;

    let config = StudioConfig {
        remove_bg: remove_bg_config(&server, Some("rb-key")),
        ..StudioConfig::default()
    };
    let collaborators = Collaborators::from_config(&config).unwrap();

    let mut store = ItemStore::new();
    let id = store.add(accept_bytes("saree.png", product_png(), &UploadLimits::default()).unwrap());

    let status = processing::run(&mut store, id, Request::enhance(true), &collaborators)
        .await
        .unwrap();
    assert_eq!(status, Status::Failed);

    let item = store.get(id).unwrap();
    assert!(item.derived().is_none());
    assert!(item.suggestions().is_empty());
    let failure = item.progress(Operation::Enhance).last_failure.as_ref().unwrap();
    assert_eq!(failure.kind(), CollaboratorErrorKind::Rejected);
    assert_eq!(failure.service(), "remove.bg");
}
