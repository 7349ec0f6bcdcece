
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use support::{post_json, post_text, send, FakeUpstream, UpstreamReply};

#[tokio::test]
async fn health_reports_model_and_metrics() {
    let upstream = FakeUpstream::start(vec![]).await;

    let (status, _, body) = send(
        upstream.app(),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["model"], "gpt-4-0613");
    assert!(payload["metrics"]["interpretations_total"].is_u64());
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn route_query_is_relayed_as_find_route() {
    let upstream = FakeUpstream::start(vec![UpstreamReply::FunctionCall {
        name: "findRoute",
        arguments: json!({
            "origin": "Paris",
            "destination": "Berlin",
            "travelMode": "DRIVING",
            "withDistance": true,
            "withTraffic": false
        }),
    }])
    .await;

    let (status, headers, body) = send(
        upstream.app(),
        post_json(
            "/interpret",
            json!({ "textQuery": "distance between Paris and Berlin by car" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let payload: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        payload,
        json!({
            "functionName": "findRoute",
            "origin": "Paris",
            "destination": "Berlin",
            "travelMode": "DRIVING",
            "withDistance": true,
            "withTraffic": false
        })
    );
}

#[tokio::test]
async fn upstream_request_carries_model_key_and_function_menu() {
    let upstream = FakeUpstream::start(vec![UpstreamReply::FunctionCall {
        name: "findNearby",
        arguments: json!({ "location": "Oslo", "type": "cafe" }),
    }])
    .await;

    let (status, _, body) = send(
        upstream.app(),
        post_json("/interpret", json!({ "textQuery": "coffee in Oslo" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({ "functionName": "findNearby", "location": "Oslo", "type": "cafe" })
    );

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    let captured = &requests[0];
    assert_eq!(captured.authorization.as_deref(), Some("Bearer sk-test-key"));
    assert_eq!(captured.body["model"], "gpt-4-0613");
    assert_eq!(captured.body["function_call"], "auto");
    assert!(captured.body.get("stream").is_none());

    let names: Vec<&str> = captured.body["functions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|function| function["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["invalidFunction", "findRoute", "findNearby"]);

    let messages = captured.body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[1]["content"], "coffee in Oslo");
}

#[tokio::test]
async fn query_without_location_is_reported_invalid() {
    let upstream = FakeUpstream::start(vec![UpstreamReply::FunctionCall {
        name: "invalidFunction",
        arguments: json!({
            "valid": false,
            "errorMessage": "Please specify a location to search for nearby restaurants."
        }),
    }])
    .await;

    let (status, _, body) = send(
        upstream.app(),
        post_json("/interpret", json!({ "textQuery": "nearby restaurants" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload["functionName"], "invalidFunction");
    assert_eq!(payload["valid"], false);
    let message = payload["errorMessage"].as_str().unwrap();
    assert!(message.contains("location"));
}

#[tokio::test]
async fn missing_text_query_fails_without_calling_upstream() {
    let upstream = FakeUpstream::start(vec![]).await;

    let (status, _, body) = send(
        upstream.app(),
        post_json("/interpret", json!({ "query": "Paris to Berlin" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn non_json_body_is_a_flat_500() {
    let upstream = FakeUpstream::start(vec![]).await;

    let request = Request::builder()
        .method("POST")
        .uri("/interpret")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, body) = send(upstream.app(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn plain_text_answer_is_a_protocol_error() {
    let upstream =
        FakeUpstream::start(vec![UpstreamReply::Text("Paris is about 1050 km from Berlin.")]).await;

    let (status, _, body) = send(
        upstream.app(),
        post_json("/interpret", json!({ "textQuery": "Paris to Berlin" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Incorrect LLM response");
}

#[tokio::test]
async fn upstream_rejection_is_hidden_behind_generic_500() {
    let upstream = FakeUpstream::start(vec![UpstreamReply::Failure(
        StatusCode::UNAUTHORIZED,
        "Incorrect API key provided",
    )])
    .await;

    let (status, _, body) = send(
        upstream.app(),
        post_json("/interpret", json!({ "textQuery": "Paris to Berlin" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
    assert!(!body.contains("API key"));
}

#[tokio::test]
async fn out_of_vocabulary_place_type_is_rejected() {
    let upstream = FakeUpstream::start(vec![UpstreamReply::FunctionCall {
        name: "findNearby",
        arguments: json!({ "location": "Oslo", "type": "sauna" }),
    }])
    .await;

    let (status, _, body) = send(
        upstream.app(),
        post_json("/interpret", json!({ "textQuery": "saunas in Oslo" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn unknown_function_name_is_a_generic_500() {
    let upstream = FakeUpstream::start(vec![UpstreamReply::FunctionCall {
        name: "findWeather",
        arguments: json!({ "location": "Oslo" }),
    }])
    .await;

    let (status, _, body) = send(
        upstream.app(),
        post_json("/interpret", json!({ "textQuery": "weather in Oslo" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn legacy_interpret_path_is_served() {
    let upstream = FakeUpstream::start(vec![UpstreamReply::FunctionCall {
        name: "findRoute",
        arguments: json!({
            "origin": "Lyon",
            "destination": "Nice",
            "travelMode": "TRANSIT",
            "withDistance": false,
            "withTraffic": false
        }),
    }])
    .await;

    let (status, _, body) = send(
        upstream.app(),
        post_json(
            "/api/textToLocationRequest",
            json!({ "textQuery": "train from Lyon to Nice" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload["functionName"], "findRoute");
    assert_eq!(payload["travelMode"], "TRANSIT");
}

#[tokio::test]
async fn plain_text_content_type_is_still_decoded() {
    let upstream = FakeUpstream::start(vec![UpstreamReply::FunctionCall {
        name: "findNearby",
        arguments: json!({ "location": "Oslo", "type": "cafe" }),
    }])
    .await;

    let (status, _, body) = send(
        upstream.app(),
        post_text("/interpret", json!({ "textQuery": "coffee in Oslo" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({ "functionName": "findNearby", "location": "Oslo", "type": "cafe" })
    );
    assert_eq!(upstream.requests().len(), 1);
}

#[tokio::test]
async fn extra_argument_keys_are_not_silently_dropped() {
    let upstream = FakeUpstream::start(vec![UpstreamReply::FunctionCall {
        name: "findNearby",
        arguments: json!({ "location": "Oslo", "type": "cafe", "radius": 500 }),
    }])
    .await;

    let (status, _, body) = send(
        upstream.app(),
        post_json("/interpret", json!({ "textQuery": "coffee within 500m of Oslo" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}
