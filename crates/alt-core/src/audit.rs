//! Image Auditor
//!
//! Discovery walks the document, classification is pure, annotation is
//! delegated to [`crate::render`].

use crate::config::AuditConfig;
use crate::hint::sniff_asset_id;
use crate::render;
use crate::types::{is_missing_alt, AuditReport, AuditResult, ImageElement};
use alt_dom::{Document, DomError, NodeId};

/// Images found by a discovery pass
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Images to audit, in document order
    pub images: Vec<ImageElement>,
    /// Images inside host chrome or editor UI
    pub skipped_chrome: usize,
    /// Images already wrapped by a previous pass
    pub skipped_wrapped: usize,
}

/// Snapshot an `<img>` node
#[must_use]
pub fn image_element(doc: &Document, node: NodeId) -> Option<ImageElement> {
    let el = doc.element(node).filter(|el| el.tag() == "img")?;
    Some(ImageElement {
        node,
        source_locator: el.attr("src").unwrap_or_default().to_string(),
        current_alt: el.attr("alt").map(str::to_string),
        known_asset_id: sniff_asset_id(el),
    })
}

fn in_chrome(doc: &Document, node: NodeId, config: &AuditConfig) -> bool {
    doc.closest(node, |el| {
        el.has_class(render::MODAL_CLASS)
            || el
                .attr("id")
                .is_some_and(|id| config.host_chrome_ids.iter().any(|c| c == id))
    })
    .is_some()
}

/// Collect auditable images
#[must_use]
pub fn discover(doc: &Document, config: &AuditConfig) -> Discovery {
    let mut discovery = Discovery::default();

    for node in doc.elements_by_tag("img") {
        if in_chrome(doc, node, config) {
            discovery.skipped_chrome += 1;
            continue;
        }
        if render::container_of(doc, node).is_some() {
            discovery.skipped_wrapped += 1;
            continue;
        }
        if let Some(image) = image_element(doc, node) {
            discovery.images.push(image);
        }
    }

    discovery
}

/// Classify images; no document access
#[must_use]
pub fn audit(images: &[ImageElement]) -> Vec<AuditResult> {
    images
        .iter()
        .map(|image| AuditResult {
            is_missing_alt: is_missing_alt(image.current_alt.as_deref()),
            image: image.clone(),
        })
        .collect()
}

/// Discover, classify and annotate in one pass
#[derive(Debug, Clone, Default)]
pub struct Auditor {
    config: AuditConfig,
}

impl Auditor {
    /// Create auditor
    #[must_use]
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Audit without touching the document
    #[must_use]
    pub fn scan(&self, doc: &Document) -> AuditReport {
        let discovery = discover(doc, &self.config);
        let results = audit(&discovery.images);
        self.log(&results, &discovery);
        AuditReport {
            results,
            skipped_chrome: discovery.skipped_chrome,
            skipped_wrapped: discovery.skipped_wrapped,
        }
    }

    /// Audit and annotate; safe to repeat on a growing document
    ///
    /// # Errors
    /// - `DomError` if annotation fails
    pub fn run(&self, doc: &mut Document) -> Result<AuditReport, DomError> {
        let report = self.scan(doc);
        render::annotate(doc, &report.results)?;
        Ok(report)
    }

    fn log(&self, results: &[AuditResult], discovery: &Discovery) {
        for result in results {
            if result.is_missing_alt {
                tracing::warn!(
                    src = %result.image.source_locator,
                    asset_id = ?result.image.known_asset_id,
                    "image missing alt text"
                );
            } else {
                tracing::debug!(src = %result.image.source_locator, "image has alt text");
            }
        }
        tracing::info!(
            audited = results.len(),
            missing = results.iter().filter(|r| r.is_missing_alt).count(),
            skipped_chrome = discovery.skipped_chrome,
            skipped_wrapped = discovery.skipped_wrapped,
            "alt text scan complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetId;
    use proptest::prelude::*;

    const PAGE: &str = r#"<body>
<div id="wpadminbar"><img src="avatar.png"></div>
<img src="a.jpg" alt="">
<img src="b.jpg" alt="Dog" class="wp-image-9">
<img src="c.jpg">
</body>"#;

    #[test]
    fn discovers_outside_chrome() {
        let doc = Document::parse(PAGE).unwrap();
        let found = discover(&doc, &AuditConfig::default());
        let srcs: Vec<_> = found.images.iter().map(|i| i.source_locator.as_str()).collect();
        assert_eq!(srcs, vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(found.skipped_chrome, 1);
        assert_eq!(found.images[1].known_asset_id, Some(AssetId(9)));
    }

    #[test]
    fn chrome_ids_are_configurable() {
        let doc = Document::parse(PAGE).unwrap();
        let found = discover(&doc, &AuditConfig::new().with_host_chrome_ids(Vec::<String>::new()));
        assert_eq!(found.images.len(), 4);
        assert_eq!(found.skipped_chrome, 0);
    }

    #[test]
    fn classification() {
        let doc = Document::parse(PAGE).unwrap();
        let results = audit(&discover(&doc, &AuditConfig::default()).images);
        let missing: Vec<_> = results.iter().map(|r| r.is_missing_alt).collect();
        assert_eq!(missing, vec![true, false, true]);
    }

    #[test]
    fn run_is_idempotent() {
        let mut doc = Document::parse(PAGE).unwrap();
        let auditor = Auditor::default();

        let first = auditor.run(&mut doc).unwrap();
        assert_eq!(first.audited_count(), 3);
        assert_eq!(first.missing_count(), 2);
        let snapshot = doc.to_html();

        let second = auditor.run(&mut doc).unwrap();
        assert_eq!(second.audited_count(), 0);
        assert_eq!(second.skipped_wrapped, 3);
        assert_eq!(doc.to_html(), snapshot);
    }

    #[test]
    fn scan_leaves_document_alone() {
        let doc = Document::parse(PAGE).unwrap();
        let report = Auditor::default().scan(&doc);
        assert_eq!(report.missing_count(), 2);
        assert_eq!(doc.to_html(), PAGE);
    }

    #[test]
    fn editor_modal_images_are_skipped() {
        let doc = Document::parse(
            r#"<div class="alt-text-modal"><img src="preview.jpg"></div><img src="a.jpg">"#,
        )
        .unwrap();
        let found = discover(&doc, &AuditConfig::default());
        assert_eq!(found.images.len(), 1);
        assert_eq!(found.skipped_chrome, 1);
    }

    proptest! {
        #[test]
        fn audit_matches_trim_rule(alts in proptest::collection::vec(proptest::option::of("[ a-z\t]{0,8}"), 0..8)) {
            let images: Vec<ImageElement> = alts
                .iter()
                .map(|alt| ImageElement {
                    node: Document::new().root(),
                    source_locator: "x.jpg".into(),
                    current_alt: alt.clone(),
                    known_asset_id: None,
                })
                .collect();
            let results = audit(&images);
            prop_assert_eq!(results.len(), alts.len());
            for (result, alt) in results.iter().zip(&alts) {
                let expected = alt.as_ref().map_or(true, |a| a.trim().is_empty());
                prop_assert_eq!(result.is_missing_alt, expected);
            }
        }
    }
}
