use alt_core::render::{self, ERROR_CLASS, LABEL_EDIT, MISSING_CLASS};
use alt_core::{AssetBridge, AssetId, Auditor, BridgeError, EditorConfig, EditorError, InlineEditor};
use alt_http::{bind, HttpBridge, ServerConfig};
use alt_store::{AltTextService, AssetStore, NonceAuthorizer};
use alt_test_utils::{image_by_src, parse, seeded_store, SAMPLE_PAGE, UPLOADS};
use pretty_assertions::assert_eq;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

struct Running {
    endpoint: String,
    shutdown: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl Running {
    async fn stop(self) {
        self.shutdown.cancel();
        self.handle.await.unwrap();
    }
}

fn start(store: &Arc<AssetStore>, nonces: &[&str]) -> Running {
    let service = AltTextService::new(
        Arc::clone(store),
        Arc::new(NonceAuthorizer::new(nonces.iter().copied())),
    );
    let config = ServerConfig::new()
        .with_bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .with_path("wp-admin/admin-ajax.php");
    let shutdown = CancellationToken::new();
    let (addr, server) = bind(service, &config, shutdown.clone()).unwrap();
    Running {
        endpoint: format!("http://{addr}/wp-admin/admin-ajax.php"),
        shutdown,
        handle: tokio::spawn(server),
    }
}

#[tokio::test]
async fn editor_round_trip_over_http() {
    let store = seeded_store();
    let server = start(&store, &["n0nce"]);
    let bridge = Arc::new(HttpBridge::new(&server.endpoint).with_nonce("n0nce"));

    let mut doc = parse(SAMPLE_PAGE);
    Auditor::default().run(&mut doc).unwrap();
    let coast = image_by_src(&doc, "coast");

    let mut editor = InlineEditor::new(bridge, EditorConfig::default());
    let session = editor.open(&mut doc, coast).await.unwrap();
    assert_eq!(editor.session(session).unwrap().asset_id, Some(AssetId(43)));

    editor
        .save(&mut doc, session, "Waves breaking on the  coast\n")
        .await
        .unwrap();
    assert_eq!(doc.attr(coast, "alt"), Some("Waves breaking on the  coast\n"));
    assert!(!doc.has_class(coast, MISSING_CLASS));
    let button = render::button_of(&doc, coast).unwrap();
    assert_eq!(doc.text_content(button), LABEL_EDIT);
    assert_eq!(store.alt_text(AssetId(43)).unwrap(), "Waves breaking on the coast");

    server.stop().await;
}

#[tokio::test]
async fn bridge_operations() {
    let store = seeded_store();
    let server = start(&store, &["n0nce"]);
    let bridge = HttpBridge::new(&server.endpoint).with_nonce("n0nce");

    let asset = bridge
        .resolve(&format!("{UPLOADS}/2024/01/logo.png?ver=2"))
        .await
        .unwrap();
    assert_eq!(asset.id, AssetId(7));
    assert_eq!(asset.alt_text, "Cycling Club logo");

    bridge.set_alt_text(AssetId(7), "").await.unwrap();
    assert_eq!(bridge.get_alt_text(AssetId(7)).await.unwrap(), "");

    assert!(matches!(
        bridge.resolve("https://elsewhere.test/none.gif").await,
        Err(BridgeError::ResolutionNotFound { .. })
    ));
    assert_eq!(
        bridge.set_alt_text(AssetId(999), "x").await,
        Err(BridgeError::PersistenceNotFound(AssetId(999)))
    );

    server.stop().await;
}

#[tokio::test]
async fn wrong_nonce_is_authorization_error() {
    let store = seeded_store();
    let server = start(&store, &["n0nce"]);

    let mut doc = parse(SAMPLE_PAGE);
    let coast = image_by_src(&doc, "coast");
    let bridge = Arc::new(HttpBridge::new(&server.endpoint).with_nonce("expired"));
    let mut editor = InlineEditor::new(bridge, EditorConfig::default());

    let err = editor.open(&mut doc, coast).await.unwrap_err();
    assert_eq!(
        err,
        EditorError::Bridge(BridgeError::Authorization("Invalid security token".into()))
    );
    assert!(!doc.has_attr(coast, "alt"));
    assert_eq!(store.alt_text(AssetId(43)).unwrap(), "");

    server.stop().await;
}

#[tokio::test]
async fn blank_locator_resolves_to_not_found() {
    let store = seeded_store();
    let server = start(&store, &["n0nce"]);
    let bridge = HttpBridge::new(&server.endpoint).with_nonce("n0nce");

    for locator in ["", "   "] {
        assert_eq!(
            bridge.resolve(locator).await,
            Err(BridgeError::ResolutionNotFound {
                locator: locator.to_string()
            })
        );
    }

    server.stop().await;
}

#[tokio::test]
async fn non_success_status_is_transport_error() {
    let store = seeded_store();
    let server = start(&store, &[]);
    let bridge = HttpBridge::new(server.endpoint.replace("/wp-admin", ""));

    let err = bridge.get_alt_text(AssetId(7)).await.unwrap_err();
    assert_eq!(err, BridgeError::Transport("HTTP 404 Not Found".into()));

    server.stop().await;
}

#[tokio::test]
async fn failed_save_over_http_keeps_form_open() {
    let store = seeded_store();
    let server = start(&store, &["n0nce"]);
    let bridge = Arc::new(HttpBridge::new(&server.endpoint).with_nonce("n0nce"));

    let mut doc = parse(SAMPLE_PAGE);
    Auditor::default().run(&mut doc).unwrap();
    let coast = image_by_src(&doc, "coast");
    let mut editor = InlineEditor::new(bridge, EditorConfig::default());
    let session = editor.open(&mut doc, coast).await.unwrap();

    store.set_read_only(true);
    let err = editor.save(&mut doc, session, "Coast").await.unwrap_err();
    assert_eq!(
        err,
        EditorError::Bridge(BridgeError::Write("Failed to update alt text".into()))
    );
    let modal = editor.session(session).unwrap().modal.unwrap();
    let notice = doc.find_by_class(modal, ERROR_CLASS).unwrap();
    assert_eq!(doc.text_content(notice), "Failed to update alt text");
    assert_eq!(render::form_value(&doc, modal).as_deref(), Some("Coast"));

    server.stop().await;
}
