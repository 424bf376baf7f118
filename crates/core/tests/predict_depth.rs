use depth_lens_core::{
    Config, DepthSession, InferenceResult, ModelChoice, RequestState, SelectedFile, SelectionSource,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_for(uri: &str) -> DepthSession {
    let config = Config::builder().with_api_url(uri).build().unwrap();
    DepthSession::new(&config).unwrap()
}

fn image(name: &str) -> SelectedFile {
    SelectedFile::new(name, "image/png", format!("fake-png-{name}").into_bytes())
}

async fn mount(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/predict-depth"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn success_response_is_captured_verbatim() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "depth_map": "X",
            "inference_time_s": 1.23,
            "model": "deeplearning"
        })),
    )
    .await;

    let mut session = session_for(&server.uri());
    session.select_file(image("room.png"), SelectionSource::Picker);

    assert_eq!(
        session.run_submit().await,
        &RequestState::Succeeded(InferenceResult {
            depth_map: "X".into(),
            inference_time_s: 1.23,
            model: "deeplearning".into(),
        })
    );
}

#[tokio::test]
async fn upload_carries_image_and_model_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict-depth"))
        .and(body_string_contains("name=\"image\"; filename=\"room.png\""))
        .and(body_string_contains("fake-png-room.png"))
        .and(body_string_contains("name=\"model\""))
        .and(body_string_contains("naive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "depth_map": "data:image/png;base64,AAAA",
            "inference_time_s": 0.02,
            "model": "naive"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server.uri());
    session.set_model(ModelChoice::NaiveBaseline);
    session.select_file(image("room.png"), SelectionSource::Drop);

    let state = session.run_submit().await;
    assert_eq!(state.result().map(|r| r.model.as_str()), Some("naive"));
}

#[tokio::test]
async fn service_error_message_is_surfaced() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(400).set_body_json(json!({ "error": "bad image" })),
    )
    .await;

    let mut session = session_for(&server.uri());
    session.select_file(image("room.png"), SelectionSource::Picker);

    assert_eq!(session.run_submit().await, &RequestState::Failed("bad image".into()));
}

#[tokio::test]
async fn service_error_without_message_uses_fallback() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(500).set_body_json(json!({}))).await;

    let mut session = session_for(&server.uri());
    session.select_file(image("room.png"), SelectionSource::Picker);

    assert_eq!(
        session.run_submit().await,
        &RequestState::Failed("Something went wrong.".into())
    );
}

#[tokio::test]
async fn empty_service_error_message_uses_fallback() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(400).set_body_json(json!({ "error": "" }))).await;

    let mut session = session_for(&server.uri());
    session.select_file(image("room.png"), SelectionSource::Picker);

    assert_eq!(
        session.run_submit().await,
        &RequestState::Failed("Something went wrong.".into())
    );
}

#[tokio::test]
async fn service_error_with_html_body_uses_fallback() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"),
    )
    .await;

    let mut session = session_for(&server.uri());
    session.select_file(image("room.png"), SelectionSource::Picker);

    assert_eq!(
        session.run_submit().await,
        &RequestState::Failed("Something went wrong.".into())
    );
}

#[tokio::test]
async fn unreachable_service_reports_transport_failure() {
    // Grab a free port and release it so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut session = session_for(&format!("http://127.0.0.1:{port}"));
    session.select_file(image("room.png"), SelectionSource::Picker);

    assert_eq!(
        session.run_submit().await,
        &RequestState::Failed("Could not reach the server. Please try again later.".into())
    );
}

#[tokio::test]
async fn timeout_counts_as_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict-depth"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "depth_map": "X", "inference_time_s": 1.0, "model": "naive" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = Config::builder()
        .with_api_url(server.uri())
        .with_timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let mut session = DepthSession::new(&config).unwrap();
    session.select_file(image("room.png"), SelectionSource::Picker);

    assert_eq!(
        session.run_submit().await.error(),
        Some("Could not reach the server. Please try again later.")
    );
}

#[tokio::test]
async fn malformed_success_body_reports_transport_failure() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_string("not json")).await;

    let mut session = session_for(&server.uri());
    session.select_file(image("room.png"), SelectionSource::Picker);

    assert_eq!(
        session.run_submit().await.error(),
        Some("Could not reach the server. Please try again later.")
    );
}

#[tokio::test]
async fn success_body_missing_fields_reports_transport_failure() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "inference_time_s": 1.0, "model": "naive" })),
    )
    .await;

    let mut session = session_for(&server.uri());
    session.select_file(image("room.png"), SelectionSource::Picker);

    let state = session.run_submit().await;
    assert!(state.result().is_none());
    assert_eq!(
        state.error(),
        Some("Could not reach the server. Please try again later.")
    );
}

#[tokio::test]
async fn invalid_declared_type_uploads_bytes_untyped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict-depth"))
        .and(body_string_contains("name=\"image\"; filename=\"scan\""))
        .and(body_string_contains("fake-png-scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "depth_map": "X",
            "inference_time_s": 0.5,
            "model": "deeplearning"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server.uri());
    let file = SelectedFile::new("scan", "not a media type", b"fake-png-scan".to_vec());
    session.select_file(file, SelectionSource::Picker);

    assert_eq!(session.run_submit().await.result().map(|r| r.depth_map.as_str()), Some("X"));
}

#[tokio::test]
async fn no_selection_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session_for(&server.uri());
    assert_eq!(session.run_submit().await, &RequestState::Idle);
}

#[tokio::test]
async fn response_for_replaced_selection_is_discarded() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "depth_map": "X",
            "inference_time_s": 1.23,
            "model": "deeplearning"
        })),
    )
    .await;

    let mut session = session_for(&server.uri());
    session.select_file(image("first.png"), SelectionSource::Picker);
    let (generation, request) = session.submit().unwrap().into_parts();

    session.select_file(image("second.png"), SelectionSource::Picker);
    assert_eq!(session.state(), &RequestState::Idle);

    let outcome = session.client().predict_depth(request).await;
    assert!(outcome.is_ok());
    assert!(!session.complete(generation, outcome));
    assert_eq!(session.state(), &RequestState::Idle);
}

#[tokio::test]
async fn retry_after_failure_can_succeed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict-depth"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "error": "busy" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/predict-depth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "depth_map": "https://maps.example/1.png",
            "inference_time_s": 3,
            "model": "deeplearning"
        })))
        .mount(&server)
        .await;

    let mut session = session_for(&server.uri());
    session.select_file(image("room.png"), SelectionSource::Picker);

    assert_eq!(session.run_submit().await, &RequestState::Failed("busy".into()));

    let state = session.run_submit().await;
    let result = state.result().unwrap();
    assert_eq!(result.depth_map, "https://maps.example/1.png");
    assert_eq!(result.inference_time_s, 3.0);
}
