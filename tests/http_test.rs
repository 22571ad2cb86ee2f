//! The REST backend and controller against a scripted local HTTP server.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretBox};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use mlm_console::api::{ApiClient, HttpCollection};
use mlm_console::auth::{StaticToken, TokenStore, login};
use mlm_console::controller::{CollectionController, ModalMode};
use mlm_console::entities::{Category, add_products_to_package, package_products};
use mlm_console::error::ConsoleError;
use mlm_console::notify::{NotificationLevel, NotificationLog};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    target: String,
    authorization: Option<String>,
    body: Value,
}

type Handler = Arc<dyn Fn(&Recorded) -> (u16, Value) + Send + Sync>;

struct TestServer {
    base_url: Url,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl TestServer {
    async fn start(handler: impl Fn(&Recorded) -> (u16, Value) + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Handler = Arc::new(handler);

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let log = Arc::clone(&log);
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    let Some(request) = read_request(&mut socket).await else {
                        return;
                    };
                    let (status, body) = handler(&request);
                    log.lock().push(request);

                    let body = if body.is_null() {
                        String::new()
                    } else {
                        body.to_string()
                    };
                    let response = format!(
                        "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        TestServer {
            base_url: Url::parse(&format!("http://{addr}/api")).unwrap(),
            requests,
        }
    }

    fn client(&self, token: StaticToken) -> Arc<ApiClient> {
        Arc::new(ApiClient::new(self.base_url.clone(), Arc::new(token)).unwrap())
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().ok()?,
                "authorization" => authorization = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = serde_json::from_slice(&buf[header_end..]).unwrap_or(Value::Null);

    Some(Recorded {
        method,
        target,
        authorization,
        body,
    })
}

#[tokio::test]
async fn test_add_category_end_to_end() {
    let created = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&created);
    let server = TestServer::start(move |request| {
        match (request.method.as_str(), request.target.split('?').next().unwrap_or("")) {
            ("GET", "/api/get_categories") => {
                let data = if flag.load(Ordering::SeqCst) {
                    json!([{ "id": 1, "name": "Soaps" }])
                } else {
                    json!([])
                };
                (200, json!({ "data": data, "total_pages": 1 }))
            }
            ("POST", "/api/post_category") => {
                flag.store(true, Ordering::SeqCst);
                (201, json!({ "id": 1, "name": "Soaps" }))
            }
            _ => (404, json!({ "detail": "Not found" })),
        }
    })
    .await;

    let log = NotificationLog::new();
    let controller = CollectionController::new(
        HttpCollection::<Category>::new(server.client(StaticToken::new("tok"))),
        Arc::new(log.clone()),
    );

    controller.fetch_page().await.unwrap();
    let state = controller.snapshot();
    assert_eq!(state.total_pages, Some(1));
    assert!(state.items.is_empty());

    controller.open_modal(ModalMode::Add, None).unwrap();
    controller
        .edit_form(|form| form.name = "Soaps".to_string())
        .unwrap();
    controller.submit().await.unwrap();

    let state = controller.snapshot();
    assert_eq!(state.modal, ModalMode::Closed);
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].name, "Soaps");
    assert!(!state.loading);
    assert!(!state.submitting);
    assert_eq!(log.latest().unwrap().message, "Category created successfully");

    let requests = server.requests();
    let methods: Vec<&str> = requests.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, vec!["GET", "POST", "GET"]);
    assert!(requests[0].target.contains("page=1"));
    assert!(requests[0].target.contains("page_size=10"));
    assert!(requests[0].target.contains("search="));
    assert_eq!(requests[1].body, json!({ "name": "Soaps" }));
    for request in &requests {
        assert_eq!(request.authorization.as_deref(), Some("Bearer tok"));
    }
}

#[tokio::test]
async fn test_failed_delete_uses_server_message() {
    let server = TestServer::start(|request| match request.method.as_str() {
        "GET" => (200, json!({ "data": [{ "id": 7, "name": "Oils" }], "total_pages": 1 })),
        "DELETE" => (500, json!({ "detail": "Category is in use" })),
        _ => (404, Value::Null),
    })
    .await;

    let log = NotificationLog::new();
    let controller = CollectionController::new(
        HttpCollection::<Category>::new(server.client(StaticToken::new("tok"))),
        Arc::new(log.clone()),
    );
    controller.fetch_page().await.unwrap();
    let before = controller.snapshot().items;

    let err = controller.remove(7).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Api { status: 500, .. }));
    assert_eq!(controller.snapshot().items, before);
    assert_eq!(log.count(NotificationLevel::Error), 1);
    assert_eq!(log.latest().unwrap().message, "Category is in use");

    let delete = server.requests().pop().unwrap();
    assert_eq!(delete.target, "/api/delete_category/7");
}

#[tokio::test]
async fn test_missing_token_fails_without_request() {
    let server = TestServer::start(|_| (200, json!([]))).await;

    let log = NotificationLog::new();
    let controller = CollectionController::new(
        HttpCollection::<Category>::new(server.client(StaticToken::none())),
        Arc::new(log.clone()),
    );

    let err = controller.fetch_page().await.unwrap_err();
    assert!(matches!(err, ConsoleError::Unauthenticated));
    assert!(server.requests().is_empty());
    assert!(log.latest().unwrap().message.contains("not logged in"));
}

#[tokio::test]
async fn test_unauthorized_is_session_expired() {
    let server = TestServer::start(|_| (401, json!({ "detail": "Token expired" }))).await;
    let collection = HttpCollection::<Category>::new(server.client(StaticToken::new("old")));
    let controller = CollectionController::new(collection, Arc::new(NotificationLog::new()));

    let err = controller.fetch_page().await.unwrap_err();
    assert!(matches!(err, ConsoleError::SessionExpired));
}

#[tokio::test]
async fn test_login_stores_access_token() {
    let server = TestServer::start(|request| {
        if request.body["password"] == "secret1" {
            (200, json!({ "access": "fresh-token", "refresh": "r" }))
        } else {
            (401, json!({ "detail": "No active account found" }))
        }
    })
    .await;
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join("token"));
    let client = server.client(StaticToken::none());

    let password = SecretBox::new(Box::new("wrong".to_string()));
    let err = login(&client, &store, "amina@example.com", &password)
        .await
        .unwrap_err();
    assert!(matches!(err, ConsoleError::Api { status: 401, .. }));
    assert!(store.stored().is_none());

    let password = SecretBox::new(Box::new("secret1".to_string()));
    login(&client, &store, "amina@example.com", &password)
        .await
        .unwrap();
    assert_eq!(store.stored().unwrap().expose_secret(), "fresh-token");

    let requests = server.requests();
    assert!(requests.iter().all(|r| r.authorization.is_none()));
    assert!(requests.iter().all(|r| r.target == "/api/token"));
}

#[tokio::test]
async fn test_package_links() {
    let server = TestServer::start(|request| {
        match (request.method.as_str(), request.target.split('?').next().unwrap_or("")) {
            ("GET", "/api/get_product_packages") => (
                200,
                json!([
                    { "id": 1, "product": { "id": 4, "name": "Soap" }, "package": 2 },
                    { "id": 2, "product": 5, "package": 2 }
                ]),
            ),
            ("POST", "/api/add-products-to-package") => {
                (201, json!({ "message": "2 products added" }))
            }
            _ => (404, Value::Null),
        }
    })
    .await;
    let client = server.client(StaticToken::new("tok"));

    assert_eq!(package_products(&client, 2).await.unwrap(), vec![4, 5]);
    assert_eq!(
        add_products_to_package(&client, &[4, 5], 2).await.unwrap(),
        "2 products added"
    );

    let requests = server.requests();
    assert_eq!(requests[0].target, "/api/get_product_packages?package__id=2");
    assert_eq!(requests[1].body, json!({ "product_ids": [4, 5], "package_id": 2 }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_create_sends_only_the_write() {
    let server = TestServer::start(|request| match request.method.as_str() {
        "POST" => (201, json!({ "id": 1, "name": "Soaps" })),
        _ => (500, json!({ "detail": "unexpected request" })),
    })
    .await;

    let home = TempDir::new().unwrap();
    let base_url = server.base_url.to_string();
    let output = tokio::task::spawn_blocking(move || {
        std::process::Command::new(env!("CARGO_BIN_EXE_mlm-console"))
            .args(["create", "categories", "--data", r#"{"name": "Soaps"}"#])
            .env("MLM_CONSOLE_CONFIG", home.path().join("config.yaml"))
            .env("HOME", home.path())
            .env("XDG_CONFIG_HOME", home.path().join("xdg"))
            .env("MLM_BACKEND_URL", base_url)
            .env("MLM_CONSOLE_TOKEN", "tok")
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");
    assert!(stderr.contains("Category created successfully"));
    assert!(!stderr.contains("fetch"));

    let requests = server.requests();
    let methods: Vec<&str> = requests.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, vec!["POST"]);
    assert_eq!(requests[0].target, "/api/post_category");
}
