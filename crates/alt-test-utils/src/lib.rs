//! Testing utilities for the alt text workspace
//!
//! Shared fixtures: sample pages, seeded stores and a scripted bridge whose
//! answers and timing are under the test's control.

#![allow(missing_docs)]

use alt_core::{AssetBridge, AssetId, BridgeError, ResolvedAsset};
use alt_dom::{Document, NodeId};
use alt_store::{AllowAll, AltTextService, AssetRecord, AssetStore, Credentials, LocalBridge};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

pub const UPLOADS: &str = "https://site.test/wp-content/uploads";

/// Rendered post with admin bar, one captioned image missing alt text,
/// one compliant logo and one image with no alt attribute at all
pub const SAMPLE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Weekend ride &ndash; Cycling Club</title>
</head>
<body class="single-post">
  <div id="wpadminbar"><a href="/wp-admin/"><img src="https://site.test/avatar.png" alt=""></a></div>
  <header><img src="https://site.test/wp-content/uploads/2024/01/logo.png" alt="Cycling Club logo"></header>
  <article>
    <figure class="wp-block-image"><img src="https://site.test/wp-content/uploads/2024/05/bicycle-300x200.jpg" alt="" class="wp-image-42"></figure>
    <p>We rode to the coast.</p>
    <img src="https://site.test/wp-content/uploads/2024/05/coast.jpg">
  </article>
</body>
</html>
"#;

/// Page of bare images built from `(src, alt)` pairs
pub fn page_with_images(images: &[(&str, Option<&str>)]) -> String {
    let mut html = String::from("<body>\n");
    for (src, alt) in images {
        match alt {
            Some(alt) => html.push_str(&format!("<img src=\"{src}\" alt=\"{alt}\">\n")),
            None => html.push_str(&format!("<img src=\"{src}\">\n")),
        }
    }
    html.push_str("</body>\n");
    html
}

pub fn parse(html: &str) -> Document {
    Document::parse(html).unwrap()
}

/// Image nodes in document order
pub fn images(doc: &Document) -> Vec<NodeId> {
    doc.elements_by_tag("img")
}

/// First image whose `src` contains `needle`
pub fn image_by_src(doc: &Document, needle: &str) -> NodeId {
    images(doc)
        .into_iter()
        .find(|n| doc.attr(*n, "src").is_some_and(|s| s.contains(needle)))
        .unwrap()
}

/// Store matching [`SAMPLE_PAGE`]: bicycle (42), logo (7), coast (43)
pub fn seeded_store() -> Arc<AssetStore> {
    let store = AssetStore::new(UPLOADS);
    for (id, file, alt) in [
        (7, "2024/01/logo.png", "Cycling Club logo"),
        (42, "2024/05/bicycle.jpg", ""),
        (43, "2024/05/coast.jpg", ""),
    ] {
        store
            .insert_record(AssetRecord {
                id: AssetId(id),
                file: file.to_string(),
                alt_text: alt.to_string(),
            })
            .unwrap();
    }
    Arc::new(store)
}

/// Open service and in-process bridge over `store`
pub fn local_bridge(store: &Arc<AssetStore>) -> LocalBridge {
    LocalBridge::new(
        AltTextService::new(Arc::clone(store), Arc::new(AllowAll)),
        Credentials::anonymous(),
    )
}

/// Bridge call recorded by [`ScriptedBridge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Resolve(String),
    Get(AssetId),
    Set(AssetId, String),
}

/// Releases a gated scripted answer
#[derive(Debug)]
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn open(self) {
        let _ = self.0.send(());
    }
}

#[derive(Debug)]
struct Step<T> {
    result: Result<T, BridgeError>,
    gate: Option<oneshot::Receiver<()>>,
    delay: Option<Duration>,
}

impl<T> Step<T> {
    fn now(result: Result<T, BridgeError>) -> Self {
        Self {
            result,
            gate: None,
            delay: None,
        }
    }

    async fn play(self) -> Result<T, BridgeError> {
        if let Some(gate) = self.gate {
            let _ = gate.await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result
    }
}

#[derive(Debug, Default)]
struct Script {
    resolves: VecDeque<Step<ResolvedAsset>>,
    gets: VecDeque<Step<String>>,
    saves: VecDeque<Step<()>>,
    calls: Vec<Call>,
}

/// Bridge answering from queued scripts
///
/// Unscripted calls answer: resolve `ResolutionNotFound`, get `""`, save `Ok`.
#[derive(Debug, Default)]
pub struct ScriptedBridge {
    script: Mutex<Script>,
}

impl ScriptedBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_resolve(&self, result: Result<ResolvedAsset, BridgeError>) {
        self.script.lock().resolves.push_back(Step::now(result));
    }

    pub fn push_resolved(&self, id: u64, alt_text: &str) {
        self.push_resolve(Ok(ResolvedAsset {
            id: AssetId(id),
            alt_text: alt_text.to_string(),
        }));
    }

    pub fn push_get(&self, result: Result<String, BridgeError>) {
        self.script.lock().gets.push_back(Step::now(result));
    }

    pub fn push_save(&self, result: Result<(), BridgeError>) {
        self.script.lock().saves.push_back(Step::now(result));
    }

    /// Save answer held back until the returned gate opens
    pub fn push_save_gated(&self, result: Result<(), BridgeError>) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.script.lock().saves.push_back(Step {
            result,
            gate: Some(rx),
            delay: None,
        });
        Gate(tx)
    }

    /// Resolve answer held back until the returned gate opens
    pub fn push_resolve_gated(&self, result: Result<ResolvedAsset, BridgeError>) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.script.lock().resolves.push_back(Step {
            result,
            gate: Some(rx),
            delay: None,
        });
        Gate(tx)
    }

    /// Save answer delivered after `delay`
    pub fn push_save_delayed(&self, result: Result<(), BridgeError>, delay: Duration) {
        self.script.lock().saves.push_back(Step {
            result,
            gate: None,
            delay: Some(delay),
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().calls.clone()
    }

    pub fn saves(&self) -> Vec<(AssetId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Set(id, value) => Some((id, value)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl AssetBridge for ScriptedBridge {
    async fn resolve(&self, locator: &str) -> Result<ResolvedAsset, BridgeError> {
        let step = {
            let mut script = self.script.lock();
            script.calls.push(Call::Resolve(locator.to_string()));
            script.resolves.pop_front()
        };
        match step {
            Some(step) => step.play().await,
            None => Err(BridgeError::ResolutionNotFound {
                locator: locator.to_string(),
            }),
        }
    }

    async fn get_alt_text(&self, id: AssetId) -> Result<String, BridgeError> {
        let step = {
            let mut script = self.script.lock();
            script.calls.push(Call::Get(id));
            script.gets.pop_front()
        };
        match step {
            Some(step) => step.play().await,
            None => Ok(String::new()),
        }
    }

    async fn set_alt_text(&self, id: AssetId, alt_text: &str) -> Result<(), BridgeError> {
        let step = {
            let mut script = self.script.lock();
            script.calls.push(Call::Set(id, alt_text.to_string()));
            script.saves.pop_front()
        };
        match step {
            Some(step) => step.play().await,
            None => Ok(()),
        }
    }
}
