//! Subcommand implementations
//!
//! Each command takes the [`AppContext`] and writes its primary output to
//! the supplied writer; diagnostics go through `tracing`.

use crate::context::AppContext;
use alt_core::{render, AssetBridge, AssetId, AuditEntry, EditorError, InlineEditor};
use alt_dom::{Document, NodeId};
use alt_http::HttpBridge;
use anyhow::Context;
use serde::Serialize;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Options for `alttext scan`
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// HTML document to audit
    pub input: PathBuf,
    /// Print JSON instead of a table
    pub json: bool,
    /// Write the annotated document here
    pub annotate: Option<PathBuf>,
}

/// Result of a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Images audited
    pub audited: usize,
    /// Images missing alt text
    pub missing: usize,
    /// Images skipped inside host chrome
    pub skipped_chrome: usize,
    /// Images skipped because they were already annotated
    pub skipped_wrapped: usize,
    /// Per-image detail
    pub images: Vec<AuditEntry>,
}

/// Audit a document, optionally writing an annotated copy
///
/// # Errors
/// Fails on unreadable input, a disabled editor when annotating, or write
/// errors.
pub fn scan(ctx: &AppContext, options: &ScanOptions, out: &mut dyn Write) -> anyhow::Result<ScanSummary> {
    let mut doc = read_document(&options.input)?;
    let auditor = ctx.auditor();

    let report = match &options.annotate {
        Some(target) => {
            ctx.ensure_enabled("annotate")?;
            let report = auditor.run(&mut doc).context("failed to annotate document")?;
            write_document(&doc, target)?;
            report
        }
        None => auditor.scan(&doc),
    };

    let summary = ScanSummary {
        audited: report.audited_count(),
        missing: report.missing_count(),
        skipped_chrome: report.skipped_chrome,
        skipped_wrapped: report.skipped_wrapped,
        images: report.entries(),
    };

    if options.json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
    } else {
        for entry in &summary.images {
            let status = if entry.missing { "MISSING" } else { "ok" };
            match entry.alt.as_deref().filter(|a| !a.trim().is_empty()) {
                Some(alt) => writeln!(out, "{:>4}  {status:<7}  {}  {alt:?}", entry.index, entry.src)?,
                None => writeln!(out, "{:>4}  {status:<7}  {}", entry.index, entry.src)?,
            }
        }
        writeln!(
            out,
            "{} images audited, {} missing alt text ({} skipped as host chrome, {} already annotated)",
            summary.audited, summary.missing, summary.skipped_chrome, summary.skipped_wrapped
        )?;
    }
    Ok(summary)
}

/// Which image `alttext edit` targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSelector {
    /// Position as printed by `scan`
    Index(usize),
    /// First image whose `src` contains the text
    Src(String),
}

impl FromStr for ImageSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim()
            .parse()
            .map_or_else(|_| Self::Src(s.to_string()), Self::Index))
    }
}

/// Options for `alttext edit`
#[derive(Debug, Clone)]
pub struct EditOptions {
    /// HTML document holding the image
    pub input: PathBuf,
    /// Target image
    pub image: ImageSelector,
    /// New alt text, may be empty
    pub alt: String,
    /// Remote endpoint; the in-process store is used when absent
    pub endpoint: Option<String>,
    /// Request token for the remote endpoint
    pub nonce: Option<String>,
    /// Write the updated document here instead of the output writer
    pub output: Option<PathBuf>,
}

/// Result of an edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Asset the text was written to
    pub asset_id: Option<AssetId>,
    /// Source of the edited image
    pub src: String,
}

/// Resolve an image, write its alt text and emit the updated document
///
/// # Errors
/// Fails when disabled, when the image is not found, or when the bridge
/// refuses the change.
pub async fn edit(ctx: &AppContext, options: &EditOptions, out: &mut dyn Write) -> anyhow::Result<EditOutcome> {
    ctx.ensure_enabled("edit")?;
    let mut doc = read_document(&options.input)?;
    ctx.auditor().run(&mut doc).context("failed to annotate document")?;
    let image = select_image(&doc, &options.image)?;
    let src = doc.attr(image, "src").unwrap_or_default().to_string();

    let bridge: Arc<dyn AssetBridge> = match &options.endpoint {
        Some(endpoint) => {
            let bridge = HttpBridge::new(endpoint.as_str());
            Arc::new(match &options.nonce {
                Some(nonce) => bridge.with_nonce(nonce.as_str()),
                None => bridge,
            })
        }
        None => Arc::new(ctx.local_bridge()),
    };

    let mut editor = InlineEditor::new(bridge, ctx.editor_config());
    let session = editor.open(&mut doc, image).await.map_err(user_facing)?;
    editor
        .save(&mut doc, session, &options.alt)
        .await
        .map_err(user_facing)?;
    let asset_id = editor.session(session).and_then(|s| s.asset_id);
    if let Some(at) = editor.next_close() {
        editor.close_expired(&mut doc, at).map_err(user_facing)?;
    }
    tracing::info!(src = %src, asset_id = ?asset_id, "alt text written");

    match &options.output {
        Some(path) => write_document(&doc, path)?,
        None => out.write_all(doc.to_html().as_bytes())?,
    }
    Ok(EditOutcome { asset_id, src })
}

fn user_facing(error: EditorError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}

fn select_image(doc: &Document, selector: &ImageSelector) -> anyhow::Result<NodeId> {
    let candidates: Vec<NodeId> = doc
        .elements_by_tag("img")
        .into_iter()
        .filter(|n| render::container_of(doc, *n).is_some())
        .collect();
    let found = match selector {
        ImageSelector::Index(index) => candidates.get(*index).copied(),
        ImageSelector::Src(needle) => candidates
            .into_iter()
            .find(|n| doc.attr(*n, "src").is_some_and(|s| s.contains(needle.as_str()))),
    };
    found.with_context(|| format!("no auditable image matches {selector:?}"))
}

/// Serve the endpoint until `shutdown` is cancelled
///
/// # Errors
/// Fails when disabled or when the server cannot start.
pub async fn serve(ctx: &AppContext, bind: Option<SocketAddr>, shutdown: CancellationToken) -> anyhow::Result<()> {
    ctx.ensure_enabled("serve")?;
    let mut config = ctx.config().server.clone();
    if let Some(bind) = bind {
        config.bind = bind;
    }
    tracing::info!(assets = ctx.store().len(), "starting alt text endpoint");
    alt_http::serve(ctx.service().clone(), &config, shutdown)
        .await
        .context("alt text endpoint failed")
}

fn read_document(path: &Path) -> anyhow::Result<Document> {
    let html = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Document::parse(&html).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_document(doc: &Document, path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, doc.to_html()).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_parsing() {
        assert_eq!("3".parse::<ImageSelector>().unwrap(), ImageSelector::Index(3));
        assert_eq!(
            "bicycle".parse::<ImageSelector>().unwrap(),
            ImageSelector::Src("bicycle".into())
        );
    }
}
