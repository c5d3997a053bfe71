//! Render layer: every document side effect of auditing and editing
//!
//! Detection lives in [`crate::audit`]; this module only turns results and
//! session events into markup.

use crate::types::{is_missing_alt, AuditResult, SessionId};
use alt_dom::{Document, DomError, NodeId};

/// Positioning wrapper around each audited image
pub const CONTAINER_CLASS: &str = "alt-text-image-container";
/// Red outline on images lacking alt text
pub const MISSING_CLASS: &str = "missing-alt-image";
/// `MISSING ALT` badge
pub const BADGE_CLASS: &str = "alt-text-overlay-missing";
/// Hover overlay holding the edit button
pub const OVERLAY_CLASS: &str = "alt-text-edit-overlay";
/// Edit button
pub const BUTTON_CLASS: &str = "alt-text-edit-button";
/// Edit form root
pub const MODAL_CLASS: &str = "alt-text-modal";
/// Text input inside the form
pub const INPUT_CLASS: &str = "alt-text-input";
/// Button row inside the form
pub const BUTTONS_CLASS: &str = "alt-text-modal-buttons";
/// Save button
pub const SAVE_CLASS: &str = "alt-text-save-button";
/// Cancel button
pub const CANCEL_CLASS: &str = "alt-text-cancel-button";
/// Success notice
pub const SUCCESS_CLASS: &str = "alt-text-success-message";
/// Error notice
pub const ERROR_CLASS: &str = "alt-text-error-message";
/// `id` of the injected stylesheet
pub const STYLESHEET_ID: &str = "alt-text-editor-styles";
/// Attribute tying a form to its session
pub const SESSION_ATTR: &str = "data-alt-text-session";

/// Badge text
pub const BADGE_TEXT: &str = "MISSING ALT";
/// Button label when alt text is missing
pub const LABEL_ADD: &str = "ADD ALT TEXT";
/// Button label when alt text is present
pub const LABEL_EDIT: &str = "EDIT ALT TEXT";
/// Success notice text
pub const SUCCESS_TEXT: &str = "Alt text updated successfully!";

const SAVE_LABEL: &str = "Save Changes";
const SAVING_LABEL: &str = "Saving...";

const STYLESHEET: &str = "
.alt-text-image-container { position: relative; display: inline-block; }
.missing-alt-image { border: 3px solid red !important; }
.alt-text-edit-overlay {
  position: absolute; top: 0; left: 0; width: 100%; height: 100%;
  background-color: rgba(0, 115, 170, 0.3); opacity: 0; transition: opacity 0.2s;
  cursor: pointer; display: flex; align-items: center; justify-content: center; z-index: 9999;
}
.alt-text-edit-overlay:hover { opacity: 1; }
.alt-text-edit-button {
  background-color: #0073aa; color: white; border: none; border-radius: 3px;
  padding: 8px 12px; font-size: 14px; font-weight: bold; text-transform: uppercase; cursor: pointer;
}
.alt-text-overlay-missing {
  position: absolute; top: 0; right: 0; background-color: red; color: white;
  padding: 3px 6px; font-size: 10px; border-radius: 0 0 0 3px;
}
.alt-text-modal {
  position: fixed; top: 50%; left: 50%; transform: translate(-50%, -50%);
  background-color: white; padding: 20px; border-radius: 5px;
  box-shadow: 0 0 20px rgba(0,0,0,0.3); z-index: 999999; max-width: 500px; width: 90%;
}
.alt-text-modal h2 { margin-top: 0; color: #23282d; }
.alt-text-modal img { max-width: 100%; max-height: 200px; display: block; margin: 10px 0; }
.alt-text-modal input { width: 100%; padding: 8px; margin: 10px 0; border: 1px solid #ddd; }
.alt-text-modal-buttons { margin-top: 15px; display: flex; justify-content: space-between; }
.alt-text-modal-buttons button { padding: 8px 15px; border: none; border-radius: 3px; cursor: pointer; }
.alt-text-save-button { background-color: #46b450; color: white; }
.alt-text-cancel-button { background-color: #ddd; color: #333; }
.alt-text-success-message, .alt-text-error-message {
  color: white; padding: 10px; margin-top: 15px; border-radius: 3px; text-align: center;
}
.alt-text-success-message { background-color: #46b450; }
.alt-text-error-message { background-color: #dc3232; }
";

/// Kind of inline form notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Green confirmation
    Success,
    /// Red error
    Error,
}

impl NoticeKind {
    fn class(self) -> &'static str {
        match self {
            Self::Success => SUCCESS_CLASS,
            Self::Error => ERROR_CLASS,
        }
    }
}

// ---------------------------------------------------------------
// Audit annotations
// ---------------------------------------------------------------

/// Insert the stylesheet unless one is already present
///
/// # Errors
/// - `DomError` if the document refuses the insertion
pub fn ensure_stylesheet(doc: &mut Document) -> Result<NodeId, DomError> {
    if let Some(existing) = doc.find_by_id(STYLESHEET_ID) {
        return Ok(existing);
    }
    let style = doc.create_element("style");
    doc.set_attr(style, "id", STYLESHEET_ID)?;
    let css = doc.create_text(STYLESHEET);
    doc.append_child(style, css)?;
    let parent = doc.head().unwrap_or_else(|| doc.body_or_root());
    doc.append_child(parent, style)?;
    Ok(style)
}

/// Positioning container directly wrapping `image`
#[must_use]
pub fn container_of(doc: &Document, image: NodeId) -> Option<NodeId> {
    doc.parent(image)
        .filter(|p| doc.has_class(*p, CONTAINER_CLASS))
}

/// Edit button belonging to `image`
#[must_use]
pub fn button_of(doc: &Document, image: NodeId) -> Option<NodeId> {
    container_of(doc, image).and_then(|c| doc.find_by_class(c, BUTTON_CLASS))
}

/// Image an edit button (or anything inside its container) belongs to
#[must_use]
pub fn image_for_target(doc: &Document, target: NodeId) -> Option<NodeId> {
    let container = doc.closest(target, |el| el.has_class(CONTAINER_CLASS))?;
    doc.children(container)
        .iter()
        .copied()
        .find(|c| doc.is_tag(*c, "img"))
}

/// Wrap `image` in a container unless it already sits in one
///
/// # Errors
/// - `DomError` if `image` is detached
pub fn wrap_image(doc: &mut Document, image: NodeId) -> Result<NodeId, DomError> {
    if let Some(container) = container_of(doc, image) {
        return Ok(container);
    }
    let container = doc.create_element("div");
    doc.add_class(container, CONTAINER_CLASS)?;
    doc.set_attr(container, "style", "position: relative; display: inline-block;")?;
    doc.wrap(image, container)?;
    Ok(container)
}

/// Bring outline, badge and button label in line with `missing`
///
/// # Errors
/// - `DomError` if `image` is detached
pub fn apply_status(doc: &mut Document, image: NodeId, missing: bool) -> Result<(), DomError> {
    let container = wrap_image(doc, image)?;
    let badge = doc.find_by_class(container, BADGE_CLASS);

    if missing {
        doc.add_class(image, MISSING_CLASS)?;
        if badge.is_none() {
            let badge = doc.create_element("div");
            doc.add_class(badge, BADGE_CLASS)?;
            doc.set_text(badge, BADGE_TEXT)?;
            doc.append_child(container, badge)?;
        }
    } else {
        doc.remove_class(image, MISSING_CLASS)?;
        if let Some(badge) = badge {
            doc.detach(badge);
        }
    }

    let label = if missing { LABEL_ADD } else { LABEL_EDIT };
    match doc.find_by_class(container, BUTTON_CLASS) {
        Some(button) => doc.set_text(button, label)?,
        None => {
            let overlay = doc.create_element("div");
            doc.add_class(overlay, OVERLAY_CLASS)?;
            let button = doc.create_element("button");
            doc.set_attr(button, "type", "button")?;
            doc.add_class(button, BUTTON_CLASS)?;
            doc.set_text(button, label)?;
            doc.append_child(overlay, button)?;
            doc.append_child(container, overlay)?;
        }
    }
    Ok(())
}

/// Apply audit results to the document
///
/// # Errors
/// - `DomError` if an audited image was detached in the meantime
pub fn annotate(doc: &mut Document, results: &[AuditResult]) -> Result<(), DomError> {
    if results.is_empty() {
        return Ok(());
    }
    ensure_stylesheet(doc)?;
    for result in results {
        apply_status(doc, result.image.node, result.is_missing_alt)?;
    }
    Ok(())
}

/// Write a confirmed alt value onto the image and refresh its status
///
/// # Errors
/// - `DomError` if `image` is not an attached element
pub fn apply_alt(doc: &mut Document, image: NodeId, alt: &str) -> Result<(), DomError> {
    doc.set_attr(image, "alt", alt)?;
    apply_status(doc, image, is_missing_alt(Some(alt)))
}

// ---------------------------------------------------------------
// Edit form
// ---------------------------------------------------------------

/// `id` of the text input for a session
#[must_use]
pub fn input_id(session: SessionId) -> String {
    format!("{INPUT_CLASS}-{session}")
}

/// Build and attach the edit form for a session
///
/// # Errors
/// - `DomError` if the document refuses the insertion
pub fn mount_form(
    doc: &mut Document,
    session: SessionId,
    image_src: &str,
    value: &str,
) -> Result<NodeId, DomError> {
    let modal = doc.create_element("div");
    doc.add_class(modal, MODAL_CLASS)?;
    doc.set_attr(modal, SESSION_ATTR, session.to_string())?;
    doc.set_attr(modal, "role", "dialog")?;

    let heading = doc.create_element("h2");
    doc.set_text(heading, "Edit Alt Text")?;
    doc.append_child(modal, heading)?;

    let help = doc.create_element("p");
    doc.set_text(
        help,
        "Update the alternative text for this image. Good alt text describes \
         the image content for screen readers and helps with SEO.",
    )?;
    doc.append_child(modal, help)?;

    let preview = doc.create_element("img");
    doc.set_attr(preview, "src", image_src)?;
    doc.set_attr(preview, "alt", value)?;
    doc.append_child(modal, preview)?;

    let id = input_id(session);
    let label = doc.create_element("label");
    doc.set_attr(label, "for", id.as_str())?;
    doc.set_text(label, "Alt Text:")?;
    doc.append_child(modal, label)?;

    let input = doc.create_element("input");
    doc.set_attr(input, "type", "text")?;
    doc.set_attr(input, "id", id)?;
    doc.add_class(input, INPUT_CLASS)?;
    doc.set_attr(input, "value", value)?;
    doc.set_attr(input, "placeholder", "Describe this image...")?;
    doc.append_child(modal, input)?;

    let row = doc.create_element("div");
    doc.add_class(row, BUTTONS_CLASS)?;
    for (class, label) in [(SAVE_CLASS, SAVE_LABEL), (CANCEL_CLASS, "Cancel")] {
        let button = doc.create_element("button");
        doc.set_attr(button, "type", "button")?;
        doc.add_class(button, class)?;
        doc.set_text(button, label)?;
        doc.append_child(row, button)?;
    }
    doc.append_child(modal, row)?;

    let parent = doc.body_or_root();
    doc.append_child(parent, modal)?;
    Ok(modal)
}

/// Value currently held by the form input
#[must_use]
pub fn form_value(doc: &Document, modal: NodeId) -> Option<String> {
    let input = doc.find_by_class(modal, INPUT_CLASS)?;
    doc.attr(input, "value").map(str::to_string)
}

/// Replace the form input's value
///
/// # Errors
/// - `DomError::NotAnElement` if `modal` holds no input
pub fn set_form_value(doc: &mut Document, modal: NodeId, value: &str) -> Result<(), DomError> {
    let input = doc
        .find_by_class(modal, INPUT_CLASS)
        .ok_or(DomError::NotAnElement(modal))?;
    doc.set_attr(input, "value", value)
}

/// Toggle the save button between idle and in-flight
///
/// # Errors
/// - `DomError::NotAChild` when entering the in-flight state for a form
///   that is no longer on the page
/// - `DomError` if the button cannot be updated
pub fn set_saving(doc: &mut Document, modal: NodeId, saving: bool) -> Result<(), DomError> {
    if saving && !doc.is_attached(modal) {
        return Err(DomError::NotAChild {
            parent: doc.root(),
            child: modal,
        });
    }
    let Some(button) = doc.find_by_class(modal, SAVE_CLASS) else {
        return Ok(());
    };
    if saving {
        doc.set_attr(button, "disabled", "")?;
        doc.set_text(button, SAVING_LABEL)
    } else {
        doc.remove_attr(button, "disabled")?;
        doc.set_text(button, SAVE_LABEL)
    }
}

/// Show a single notice in the form, replacing any previous one
///
/// # Errors
/// - `DomError` if the notice cannot be attached
pub fn show_form_message(
    doc: &mut Document,
    modal: NodeId,
    kind: NoticeKind,
    text: &str,
) -> Result<NodeId, DomError> {
    clear_form_messages(doc, modal);
    let notice = doc.create_element("div");
    doc.add_class(notice, kind.class())?;
    doc.set_text(notice, text)?;
    doc.append_child(modal, notice)?;
    Ok(notice)
}

/// Remove every notice from the form
pub fn clear_form_messages(doc: &mut Document, modal: NodeId) {
    let mut stale = doc.all_by_class(modal, SUCCESS_CLASS);
    stale.extend(doc.all_by_class(modal, ERROR_CLASS));
    for notice in stale {
        doc.detach(notice);
    }
}

/// Detach the form from the document
pub fn unmount_form(doc: &mut Document, modal: NodeId) {
    doc.detach(modal);
}
