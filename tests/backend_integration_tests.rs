use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use postsapp::api::{ApiError, HttpBackend, PostsBackend};
use postsapp::core::action::{Action, SESSION_EXPIRED_MESSAGE};
use postsapp::core::startup::{TokenRejected, spawn_token_check};
use postsapp::core::state::{SessionState, User};
use postsapp::core::storage::{
    AVATAR_KEY, ClientStorage, MemoryStorage, TOKEN_KEY, USERNAME_KEY,
};
use postsapp::core::store::Store;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(server.uri(), Duration::from_secs(5))
}

fn post_json(id: &str, title: &str, username: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "title": title,
        "body": format!("Body of {title}"),
        "createdDate": "2024-03-07T12:00:00.000Z",
        "author": { "username": username, "avatar": "https://gravatar.com/a.png" }
    })
}

fn signed_in_store() -> Store {
    let mut storage = MemoryStorage::default();
    storage.set(TOKEN_KEY, "stale-token").unwrap();
    storage.set(USERNAME_KEY, "brad").unwrap();
    storage.set(AVATAR_KEY, "av.png").unwrap();
    Store::open(Box::new(storage))
}

async fn mount_check_token(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/checkToken"))
        .and(body_json(json!({ "token": "stale-token" })))
        .respond_with(template)
        .mount(server)
        .await;
}

// ============================================================================
// HttpBackend
// ============================================================================

#[tokio::test]
async fn test_check_token_truthy_and_falsy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/checkToken"))
        .and(body_json(json!({ "token": "good" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/checkToken"))
        .and(body_json(json!({ "token": "bad" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
        .mount(&server)
        .await;

    let backend = backend(&server);
    assert!(backend.check_token("good").await.unwrap());
    assert!(!backend.check_token("bad").await.unwrap());
}

#[tokio::test]
async fn test_login_success_returns_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "username": "brad", "password": "qwerty" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-1",
            "username": "brad",
            "avatar": "https://gravatar.com/brad.png"
        })))
        .mount(&server)
        .await;

    let user = backend(&server).login("brad", "qwerty").await.unwrap().unwrap();
    assert_eq!(user.username, "brad");
    assert_eq!(user.token, "tok-1");
    assert_eq!(user.avatar, "https://gravatar.com/brad.png");
}

#[tokio::test]
async fn test_login_rejected_returns_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
        .mount(&server)
        .await;

    let result = backend(&server).login("brad", "wrong").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_profile_posts_parses_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile/brad/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            post_json("p1", "First", "brad"),
            { "_id": "p2" }
        ])))
        .mount(&server)
        .await;

    let posts = backend(&server).profile_posts("brad").await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, "p1");
    assert_eq!(posts[0].author.username, "brad");
    assert_eq!(posts[0].formatted_date(), "3/7/2024");
    assert_eq!(posts[1].id, "p2");
    assert!(posts[1].title.is_empty());
}

#[tokio::test]
async fn test_home_feed_sends_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/getHomeFeed"))
        .and(body_json(json!({ "token": "tok-1" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([post_json("f1", "Feed", "sue")])),
        )
        .mount(&server)
        .await;

    let posts = backend(&server).home_feed("tok-1").await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].author.username, "sue");
}

#[tokio::test]
async fn test_search_sends_search_term() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_json(json!({ "searchTerm": "rust" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([post_json("s1", "Rust tips", "sue")])),
        )
        .mount(&server)
        .await;

    let posts = backend(&server).search("rust").await.unwrap();
    assert_eq!(posts[0].title, "Rust tips");
}

#[tokio::test]
async fn test_single_post() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/post/abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(post_json("abc123", "Hello", "brad")),
        )
        .mount(&server)
        .await;

    let post = backend(&server).post("abc123").await.unwrap();
    assert_eq!(post.title, "Hello");
    assert_eq!(post.body, "Body of Hello");
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile/brad/posts"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Sorry, invalid user requested."))
        .mount(&server)
        .await;

    let err = backend(&server).profile_posts("brad").await.unwrap_err();
    match err {
        ApiError::Api { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("invalid user"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_maps_to_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = backend(&server).search("x").await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn test_create_post_returns_new_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-post"))
        .and(body_json(json!({ "title": "Hello", "body": "World", "token": "tok-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("65f0c0ffee")))
        .mount(&server)
        .await;

    let id = backend(&server)
        .create_post("Hello", "World", "tok-1")
        .await
        .unwrap();
    assert_eq!(id, "65f0c0ffee");
}

#[tokio::test]
async fn test_create_post_validation_errors_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-post"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["You must provide a title.", "You must provide post content."])),
        )
        .mount(&server)
        .await;

    let err = backend(&server).create_post("", "", "tok-1").await.unwrap_err();
    match err {
        ApiError::Rejected(message) => {
            assert_eq!(message, "You must provide a title. You must provide post content.")
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_edit_post_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/post/abc123/edit"))
        .and(body_json(json!({ "title": "New", "body": "Text", "token": "tok-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("success")))
        .mount(&server)
        .await;

    backend(&server)
        .edit_post("abc123", "New", "Text", "tok-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_edit_post_refused_by_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/post/abc123/edit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("no permission")))
        .mount(&server)
        .await;

    let err = backend(&server)
        .edit_post("abc123", "New", "Text", "bad-token")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Rejected(message) if message == "no permission"));
}

#[tokio::test]
async fn test_unreachable_backend_maps_to_network_error() {
    // Nothing listens on port 9 (discard) in the test environment
    let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(2));
    let err = backend.check_token("t").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}

// ============================================================================
// Startup token check over HTTP
// ============================================================================

#[tokio::test]
async fn test_rejected_token_signs_out_and_clears_storage() {
    let server = MockServer::start().await;
    mount_check_token(&server, ResponseTemplate::new(200).set_body_json(json!(false))).await;

    let mut store = signed_in_store();
    assert!(store.state().logged_in);

    let backend: Arc<dyn PostsBackend> = Arc::new(backend(&server));
    let (tx, rx) = mpsc::channel::<TokenRejected>();
    let _handle = spawn_token_check(backend, store.state(), tx).unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    for rejected in rx.try_iter() {
        for action in rejected.actions_for(store.state()) {
            store.dispatch(action);
        }
    }

    let state: &SessionState = store.state();
    assert!(!state.logged_in);
    assert_eq!(state.flash_messages, vec![SESSION_EXPIRED_MESSAGE]);
    assert!(store.storage().get(TOKEN_KEY).is_none());
    assert!(store.storage().get(USERNAME_KEY).is_none());
    assert!(store.storage().get(AVATAR_KEY).is_none());
}

#[tokio::test]
async fn test_valid_token_keeps_session() {
    let server = MockServer::start().await;
    mount_check_token(&server, ResponseTemplate::new(200).set_body_json(json!(true))).await;

    let store = signed_in_store();
    let backend: Arc<dyn PostsBackend> = Arc::new(backend(&server));
    let (tx, rx) = mpsc::channel::<TokenRejected>();
    let _handle = spawn_token_check(backend, store.state(), tx).unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(rx.try_iter().count(), 0);
    assert!(store.state().logged_in);
}

#[tokio::test]
async fn test_cancelled_token_check_dispatches_nothing() {
    let server = MockServer::start().await;
    mount_check_token(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!(false))
            .set_delay(Duration::from_millis(200)),
    )
    .await;

    let store = signed_in_store();
    let backend: Arc<dyn PostsBackend> = Arc::new(backend(&server));
    let (tx, rx) = mpsc::channel::<TokenRejected>();
    let handle = spawn_token_check(backend, store.state(), tx).unwrap();
    handle.cancel();

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(rx.try_iter().count(), 0);
    assert!(store.state().logged_in);
}

#[tokio::test]
async fn test_no_token_check_when_logged_out() {
    let server = MockServer::start().await;
    let store = Store::open(Box::new(MemoryStorage::default()));
    let backend: Arc<dyn PostsBackend> = Arc::new(backend(&server));
    let (tx, _rx) = mpsc::channel::<TokenRejected>();
    assert!(spawn_token_check(backend, store.state(), tx).is_none());
}

#[tokio::test]
async fn test_late_rejection_spares_a_fresh_login() {
    let server = MockServer::start().await;
    mount_check_token(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!(false))
            .set_delay(Duration::from_millis(200)),
    )
    .await;

    let mut store = signed_in_store();
    let backend: Arc<dyn PostsBackend> = Arc::new(backend(&server));
    let (tx, rx) = mpsc::channel::<TokenRejected>();
    let _handle = spawn_token_check(backend, store.state(), tx).unwrap();

    store.dispatch(Action::Logout);
    store.dispatch(Action::Login(User::new("sue", "sue.png", "fresh-token")));

    tokio::time::sleep(Duration::from_millis(400)).await;
    let rejected: Vec<TokenRejected> = rx.try_iter().collect();
    assert_eq!(rejected.len(), 1);
    for action in rejected[0].actions_for(store.state()) {
        store.dispatch(action);
    }

    assert!(store.state().logged_in);
    assert_eq!(store.storage().get(TOKEN_KEY).as_deref(), Some("fresh-token"));
    assert_eq!(store.storage().get(USERNAME_KEY).as_deref(), Some("sue"));
}
