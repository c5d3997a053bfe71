use alt_core::render::{self, BADGE_CLASS, ERROR_CLASS, LABEL_ADD, LABEL_EDIT, MISSING_CLASS, MODAL_CLASS};
use alt_core::{
    AssetId, Auditor, BridgeError, Completion, EditorConfig, EditorError, InlineEditor, OpenStep,
    SessionState,
};
use alt_dom::{Document, NodeId};
use alt_store::{AltTextService, Credentials, LocalBridge, NonceAuthorizer};
use alt_test_utils::{
    image_by_src, local_bridge, page_with_images, parse, seeded_store, Call, ScriptedBridge,
    SAMPLE_PAGE,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn label(doc: &Document, image: NodeId) -> String {
    doc.text_content(render::button_of(doc, image).unwrap())
}

fn has_badge(doc: &Document, image: NodeId) -> bool {
    let container = render::container_of(doc, image).unwrap();
    doc.find_by_class(container, BADGE_CLASS).is_some()
}

#[tokio::test]
async fn red_bicycle_end_to_end() {
    let store = seeded_store();
    let mut doc = parse(SAMPLE_PAGE);

    let report = Auditor::default().run(&mut doc).unwrap();
    assert_eq!(report.audited_count(), 3);
    assert_eq!(report.missing_count(), 2);
    assert_eq!(report.skipped_chrome, 1);

    let bike = image_by_src(&doc, "bicycle");
    assert!(doc.has_class(bike, MISSING_CLASS));
    assert!(has_badge(&doc, bike));
    assert_eq!(label(&doc, bike), LABEL_ADD);

    // the click lands on the overlay button
    let button = render::button_of(&doc, bike).unwrap();
    let target = render::image_for_target(&doc, button).unwrap();

    let config = EditorConfig::default().with_trust_hints(false);
    let mut editor = InlineEditor::new(Arc::new(local_bridge(&store)), config);
    let session = editor.open(&mut doc, target).await.unwrap();
    assert_eq!(editor.session(session).unwrap().asset_id, Some(AssetId(42)));
    assert_eq!(editor.session(session).unwrap().pending, "");

    editor.save(&mut doc, session, "A red bicycle").await.unwrap();

    assert_eq!(doc.attr(bike, "alt"), Some("A red bicycle"));
    assert!(!doc.has_class(bike, MISSING_CLASS));
    assert!(!has_badge(&doc, bike));
    assert_eq!(label(&doc, bike), LABEL_EDIT);
    assert_eq!(store.alt_text(AssetId(42)).unwrap(), "A red bicycle");
}

#[tokio::test]
async fn hinted_open_writes_the_resolved_asset() {
    let store = seeded_store();
    let mut doc = parse(SAMPLE_PAGE);
    Auditor::default().run(&mut doc).unwrap();
    let bike = image_by_src(&doc, "bicycle");

    let mut editor = InlineEditor::new(Arc::new(local_bridge(&store)), EditorConfig::default());
    let OpenStep::Ready(session) = editor.begin_open(&mut doc, bike).unwrap() else {
        panic!("wp-image hint should open without resolving");
    };
    editor.save(&mut doc, session, "Bike").await.unwrap();
    assert_eq!(store.alt_text(AssetId(42)).unwrap(), "Bike");
}

#[tokio::test]
async fn unresolvable_locator_never_writes_hinted_asset() {
    let store = seeded_store();
    let mut doc = parse(r#"<body><img src="https://elsewhere.test/stock.jpg" data-id="7"></body>"#);
    Auditor::default().run(&mut doc).unwrap();
    let stock = image_by_src(&doc, "stock");

    let mut editor = InlineEditor::new(Arc::new(local_bridge(&store)), EditorConfig::default());
    let OpenStep::Ready(session) = editor.begin_open(&mut doc, stock).unwrap() else {
        panic!("data-id hint should open without resolving");
    };
    let err = editor
        .save(&mut doc, session, "Stock photo of a beach")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::Bridge(BridgeError::ResolutionNotFound { .. })
    ));

    assert_eq!(store.alt_text(AssetId(7)).unwrap(), "Cycling Club logo");
    assert!(!doc.has_attr(stock, "alt"));
    let state = editor.session(session).unwrap();
    assert_eq!(state.state, SessionState::Editing);
    assert_eq!(state.pending, "Stock photo of a beach");
    let modal = state.modal.unwrap();
    let error = doc.find_by_class(modal, ERROR_CLASS).unwrap();
    assert!(doc.text_content(error).contains("media library"));
}

#[tokio::test]
async fn saving_empty_text_marks_missing_again() {
    let store = seeded_store();
    let mut doc = parse(SAMPLE_PAGE);
    Auditor::default().run(&mut doc).unwrap();
    let logo = image_by_src(&doc, "logo");
    assert_eq!(label(&doc, logo), LABEL_EDIT);

    let mut editor = InlineEditor::new(Arc::new(local_bridge(&store)), EditorConfig::default());
    let session = editor.open(&mut doc, logo).await.unwrap();
    assert_eq!(editor.session(session).unwrap().pending, "Cycling Club logo");

    editor.save(&mut doc, session, "").await.unwrap();
    assert_eq!(store.alt_text(AssetId(7)).unwrap(), "");
    assert_eq!(doc.attr(logo, "alt"), Some(""));
    assert!(doc.has_class(logo, MISSING_CLASS));
    assert!(has_badge(&doc, logo));
    assert_eq!(label(&doc, logo), LABEL_ADD);

    let report = Auditor::default().scan(&parse(&doc.to_html()));
    assert_eq!(report.skipped_wrapped, 3);
}

#[tokio::test]
async fn unresolvable_image_never_opens_a_form() {
    let store = seeded_store();
    let mut doc = parse(&page_with_images(&[("https://elsewhere.test/stock.jpg", None)]));
    Auditor::default().run(&mut doc).unwrap();
    let image = image_by_src(&doc, "stock");

    let mut editor = InlineEditor::new(Arc::new(local_bridge(&store)), EditorConfig::default());
    let err = editor.open(&mut doc, image).await.unwrap_err();
    assert!(matches!(
        err,
        EditorError::Bridge(BridgeError::ResolutionNotFound { .. })
    ));
    assert!(doc.all_by_class(doc.root(), MODAL_CLASS).is_empty());
    assert_eq!(editor.listener_count(), 0);
    assert_eq!(editor.drain_notices().len(), 1);
}

#[tokio::test]
async fn unauthorized_caller_leaves_image_untouched() {
    let store = seeded_store();
    let service = AltTextService::new(Arc::clone(&store), Arc::new(NonceAuthorizer::new(["s3cret"])));
    let bridge = LocalBridge::new(service, Credentials::with_nonce("stale"));
    let mut doc = parse(SAMPLE_PAGE);
    let bike = image_by_src(&doc, "bicycle");

    let config = EditorConfig::default().with_trust_hints(false);
    let mut editor = InlineEditor::new(Arc::new(bridge), config);
    let err = editor.open(&mut doc, bike).await.unwrap_err();
    assert_eq!(
        err,
        EditorError::Bridge(BridgeError::Authorization("Invalid security token".into()))
    );
    assert_eq!(editor.drain_notices()[0].message, "Invalid security token");
    assert_eq!(doc.attr(bike, "alt"), Some(""));
}

#[tokio::test]
async fn sessions_on_different_images_are_independent() {
    let bridge = Arc::new(ScriptedBridge::new());
    bridge.push_resolved(1, "");
    bridge.push_resolved(2, "");
    bridge.push_save(Ok(()));
    bridge.push_save(Err(BridgeError::Write("Failed to update alt text".into())));

    let mut doc = parse(&page_with_images(&[("a.jpg", None), ("b.jpg", None)]));
    Auditor::default().run(&mut doc).unwrap();
    let a = image_by_src(&doc, "a.jpg");
    let b = image_by_src(&doc, "b.jpg");

    let mut editor = InlineEditor::new(Arc::clone(&bridge), EditorConfig::default());
    let sa = editor.open(&mut doc, a).await.unwrap();
    let sb = editor.open(&mut doc, b).await.unwrap();
    editor.set_pending(&mut doc, sa, "Alt A").unwrap();
    editor.set_pending(&mut doc, sb, "typed B").unwrap();

    let pa = editor.begin_save(&mut doc, sa).unwrap();
    let pb = editor.begin_save(&mut doc, sb).unwrap();
    let (oa, ob) = tokio::join!(pa, pb);

    // B answers first and fails; A is still saving
    assert!(matches!(
        editor.complete_save(&mut doc, ob).unwrap(),
        Completion::Failed(BridgeError::Write(_))
    ));
    assert_eq!(editor.session(sa).unwrap().state, SessionState::Saving);

    assert_eq!(editor.complete_save(&mut doc, oa).unwrap(), Completion::Applied);
    assert_eq!(doc.attr(a, "alt"), Some("Alt A"));

    let b_session = editor.session(sb).unwrap();
    assert_eq!(b_session.state, SessionState::Editing);
    assert_eq!(b_session.pending, "typed B");
    let b_modal = b_session.modal.unwrap();
    assert_eq!(render::form_value(&doc, b_modal).as_deref(), Some("typed B"));
    assert!(doc.find_by_class(b_modal, ERROR_CLASS).is_some());
    assert!(!doc.has_attr(b, "alt"));

    let a_modal = editor.session(sa).unwrap().modal.unwrap();
    assert!(doc.find_by_class(a_modal, ERROR_CLASS).is_none());
    assert_eq!(
        bridge.saves(),
        vec![(AssetId(1), "Alt A".to_string()), (AssetId(2), "typed B".to_string())]
    );
}

#[tokio::test]
async fn late_save_response_after_cancel_is_ignored() {
    let bridge = Arc::new(ScriptedBridge::new());
    bridge.push_resolved(5, "");
    let gate = bridge.push_save_gated(Ok(()));

    let mut doc = parse(&page_with_images(&[("a.jpg", Some(""))]));
    Auditor::default().run(&mut doc).unwrap();
    let image = image_by_src(&doc, "a.jpg");
    let before = doc.to_html();

    let mut editor = InlineEditor::new(Arc::clone(&bridge), EditorConfig::default());
    let session = editor.open(&mut doc, image).await.unwrap();
    editor.set_pending(&mut doc, session, "Too late").unwrap();
    let in_flight = tokio::spawn(editor.begin_save(&mut doc, session).unwrap());

    editor.cancel(&mut doc, session).unwrap();
    assert_eq!(editor.listener_count(), 0);
    gate.open();

    let outcome = in_flight.await.unwrap();
    assert!(outcome.result.is_ok());
    assert_eq!(editor.complete_save(&mut doc, outcome).unwrap(), Completion::Ignored);
    assert_eq!(doc.to_html(), before);
    assert!(bridge.calls().contains(&Call::Set(AssetId(5), "Too late".into())));
}

#[tokio::test]
async fn late_save_response_does_not_touch_a_reopened_session() {
    let bridge = Arc::new(ScriptedBridge::new());
    bridge.push_resolved(5, "");
    bridge.push_resolved(5, "");
    let gate = bridge.push_save_gated(Ok(()));

    let mut doc = parse(&page_with_images(&[("a.jpg", None)]));
    let image = image_by_src(&doc, "a.jpg");
    let mut editor = InlineEditor::new(Arc::clone(&bridge), EditorConfig::default());

    let first = editor.open(&mut doc, image).await.unwrap();
    editor.set_pending(&mut doc, first, "old").unwrap();
    let in_flight = tokio::spawn(editor.begin_save(&mut doc, first).unwrap());
    editor.cancel(&mut doc, first).unwrap();

    let second = editor.open(&mut doc, image).await.unwrap();
    gate.open();
    let outcome = in_flight.await.unwrap();
    assert_eq!(editor.complete_save(&mut doc, outcome).unwrap(), Completion::Ignored);
    assert_eq!(editor.session(second).unwrap().state, SessionState::Editing);
    assert!(!doc.has_attr(image, "alt"));
}

#[tokio::test(start_paused = true)]
async fn slow_save_times_out_and_can_be_retried() {
    let bridge = Arc::new(ScriptedBridge::new());
    bridge.push_resolved(9, "");
    bridge.push_save_delayed(Ok(()), Duration::from_secs(30));
    bridge.push_save(Ok(()));

    let mut doc = parse(&page_with_images(&[("a.jpg", None)]));
    Auditor::default().run(&mut doc).unwrap();
    let image = image_by_src(&doc, "a.jpg");

    let config = EditorConfig::default().with_request_timeout(Duration::from_secs(2));
    let mut editor = InlineEditor::new(Arc::clone(&bridge), config);
    let session = editor.open(&mut doc, image).await.unwrap();

    let err = editor.save(&mut doc, session, "Slow").await.unwrap_err();
    assert_eq!(err, EditorError::Bridge(BridgeError::Timeout { millis: 2000 }));
    let state = editor.session(session).unwrap();
    assert_eq!(state.state, SessionState::Editing);
    assert_eq!(state.pending, "Slow");
    let modal = state.modal.unwrap();
    let error = doc.find_by_class(modal, ERROR_CLASS).unwrap();
    assert!(doc.text_content(error).contains("took too long"));
    assert!(!doc.has_attr(image, "alt"));

    editor.save(&mut doc, session, "Slow").await.unwrap();
    assert_eq!(doc.attr(image, "alt"), Some("Slow"));
    assert!(doc.find_by_class(modal, ERROR_CLASS).is_none());
}

#[tokio::test(start_paused = true)]
async fn slow_resolve_times_out_without_form() {
    let bridge = Arc::new(ScriptedBridge::new());
    let gate = bridge.push_resolve_gated(Ok(alt_core::ResolvedAsset {
        id: AssetId(1),
        alt_text: String::new(),
    }));

    let mut doc = parse(&page_with_images(&[("a.jpg", None)]));
    let image = image_by_src(&doc, "a.jpg");
    let mut editor = InlineEditor::new(Arc::clone(&bridge), EditorConfig::default());

    let err = editor.open(&mut doc, image).await.unwrap_err();
    assert_eq!(err, EditorError::Bridge(BridgeError::Timeout { millis: 10_000 }));
    assert!(doc.all_by_class(doc.root(), MODAL_CLASS).is_empty());
    assert!(editor.session_for(image).is_none());
    drop(gate);
}
