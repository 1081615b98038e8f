//! Pages driven against the stub backend on an ephemeral port.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView, ImageFormat};
use tokio::net::TcpListener;

use classify_client::blob::SelectedFile;
use classify_client::notify::MemoryNotifier;
use classify_client::pages::{AppContext, LoginPage, Mount, SignPage, User1Page};
use classify_client::router::{History, Route};
use classify_client::widgets::{DisplayView, LoadStatus, SubmitOutcome};
use classify_client::{ApiClient, ClientConfig, ObjectUrlRegistry, Session};
use classify_stub::ServerConfig;

struct Client {
    ctx: AppContext,
    session: Session,
    registry: ObjectUrlRegistry,
    notifier: MemoryNotifier,
    history: History,
}

async fn start_stub() -> (SocketAddr, ServerConfig) {
    let server_config = ServerConfig::new("integration-secret").unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(classify_stub::serve(listener, server_config.clone()));
    (addr, server_config)
}

fn client(addr: SocketAddr) -> Client {
    let config = ClientConfig::default().with_base_url(format!("http://{addr}"));
    let session = Session::in_memory();
    let api = ApiClient::new(&config, session.clone()).unwrap();
    let registry = ObjectUrlRegistry::new("it");
    let notifier = MemoryNotifier::new();
    let history = History::default();
    let ctx = AppContext::new(
        api,
        registry.clone(),
        Arc::new(notifier.clone()),
        Arc::new(history.clone()),
    );
    Client {
        ctx,
        session,
        registry,
        notifier,
        history,
    }
}

async fn log_in(client: &Client) {
    let mut page = LoginPage::new(client.ctx.clone());
    page.set_username("user1");
    page.set_password("123");
    page.submit().await.unwrap();
}

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

#[tokio::test]
async fn login_then_upload_round_trip() {
    let (addr, server) = start_stub().await;
    let client = client(addr);
    log_in(&client).await;
    assert_eq!(client.history.current(), Route::User1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bottle.jpg");
    let upload = jpeg(800, 600);
    std::fs::write(&path, &upload).unwrap();

    let page = User1Page::mount(client.ctx.clone()).ready().unwrap();
    page.select_file(Some(SelectedFile::open(&path).await.unwrap()));
    assert!(page.open_preview());
    page.confirm_preview().unwrap();

    let SubmitOutcome::Completed(result) = page.submit().await else {
        panic!("upload did not complete");
    };

    assert_eq!(server.uploads.count(), 1);
    assert_eq!(server.uploads.last().unwrap(), upload);

    let blob = result.resolve().unwrap();
    assert_eq!(blob.content_type(), Some("image/png"));
    let classified = image::load_from_memory(blob.bytes()).unwrap();
    assert_eq!(classified.dimensions(), (640, 480));

    let DisplayView::Image { requested, status, .. } = page.result_view() else {
        panic!("result should be displayed");
    };
    assert_eq!(requested, result.as_str());
    assert_eq!(status, LoadStatus::Success);

    let preview = page.preview_url().unwrap().as_str().to_string();
    let result = {
        let url = result.as_str().to_string();
        drop(result);
        url
    };
    assert_ne!(preview, result);

    drop(page);
    assert_eq!(client.registry.live_count(), 0);
    assert_eq!(client.registry.release_count(&preview), 1);
    assert_eq!(client.registry.release_count(&result), 1);
}

#[tokio::test]
async fn upload_page_requires_login() {
    let (addr, server) = start_stub().await;
    let client = client(addr);

    let mount = User1Page::mount(client.ctx.clone());

    assert!(matches!(mount, Mount::Redirected(Route::Login)));
    assert_eq!(server.uploads.count(), 0);
}

#[tokio::test]
async fn wrong_password_is_reported() {
    let (addr, _server) = start_stub().await;
    let client = client(addr);
    let mut page = LoginPage::new(client.ctx.clone());
    page.set_username("user2");
    page.set_password("123");

    assert!(page.submit().await.is_err());

    assert!(!client.session.is_authenticated());
    assert_eq!(
        client.notifier.last().as_deref(),
        Some("Login failed: Invalid credentials!")
    );
}

#[tokio::test]
async fn register_then_duplicate_conflicts() {
    let (addr, server) = start_stub().await;
    let client = client(addr);
    let mut page = SignPage::new(client.ctx.clone());
    page.set_username("dora");
    page.set_password("pw-1");
    page.set_confirm_password("pw-1");

    page.submit().await.unwrap();
    assert!(client.session.is_authenticated());
    assert!(server.users.get_user("dora").is_some());
    assert_eq!(client.history.current(), Route::ROOT);

    client.ctx.logout().unwrap();
    assert!(page.submit().await.is_err());
    assert!(!client.session.is_authenticated());
    assert_eq!(
        client.notifier.last().as_deref(),
        Some("Registration failed: A user with that username already exists")
    );
}

#[tokio::test]
async fn non_image_upload_is_rejected_by_the_server() {
    let (addr, _server) = start_stub().await;
    let client = client(addr);
    log_in(&client).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.png");
    std::fs::write(&path, b"definitely not a png").unwrap();

    let page = User1Page::mount(client.ctx.clone()).ready().unwrap();
    page.select_file(Some(SelectedFile::open(&path).await.unwrap()));

    assert!(matches!(page.submit().await, SubmitOutcome::Failed(_)));
    assert_eq!(
        client.notifier.last().as_deref(),
        Some("Uploaded file is not a valid image")
    );
    assert!(page.result_url().is_none());
}
