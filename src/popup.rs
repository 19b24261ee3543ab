use crate::config::PopupCopy;
use crate::dom::Dom;

pub const POPUP_ID: &str = "popup";
pub const OVERLAY_ID: &str = "popupOverlay";
pub const TITLE_ID: &str = "popupTitle";
pub const MESSAGE_ID: &str = "popupMessage";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PopupKind {
    #[default]
    Success,
    Error,
}

impl PopupKind {
    /// Anything other than `"error"` is treated as success.
    pub fn from_label(label: &str) -> Self {
        if label == "error" {
            PopupKind::Error
        } else {
            PopupKind::Success
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            PopupKind::Success => "success",
            PopupKind::Error => "error",
        }
    }

    fn title(self, copy: &PopupCopy) -> &str {
        match self {
            PopupKind::Success => &copy.success_title,
            PopupKind::Error => &copy.error_title,
        }
    }

    fn default_message(self, copy: &PopupCopy) -> &str {
        match self {
            PopupKind::Success => &copy.success_message,
            PopupKind::Error => &copy.error_message,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PopupState {
    #[default]
    Hidden,
    Visible { kind: PopupKind, message: String },
}

/// Fills and displays the popup. Returns `None` without touching the page
/// when any of the four popup elements is missing.
pub fn show<D: Dom>(dom: &D, copy: &PopupCopy, message: Option<&str>, kind: PopupKind) -> Option<PopupState> {
    let popup = dom.element_by_id(POPUP_ID)?;
    let overlay = dom.element_by_id(OVERLAY_ID)?;
    let title = dom.element_by_id(TITLE_ID)?;
    let body = dom.element_by_id(MESSAGE_ID)?;

    dom.remove_class(&popup, PopupKind::Success.css_class());
    dom.remove_class(&popup, PopupKind::Error.css_class());
    dom.add_class(&popup, kind.css_class());

    let message = message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| kind.default_message(copy));
    dom.set_text(&title, kind.title(copy));
    dom.set_text(&body, message);

    dom.set_style(&popup, "display", "block");
    dom.set_style(&overlay, "display", "block");
    dom.set_body_style("overflow", "hidden");

    Some(PopupState::Visible {
        kind,
        message: message.to_string(),
    })
}

/// Hides the popup and gives scrolling back to the page. Returns false when
/// the popup or overlay is missing.
pub fn close<D: Dom>(dom: &D) -> bool {
    let (Some(popup), Some(overlay)) = (dom.element_by_id(POPUP_ID), dom.element_by_id(OVERLAY_ID)) else {
        return false;
    };
    dom.set_style(&popup, "display", "none");
    dom.set_style(&overlay, "display", "none");
    dom.set_body_style("overflow", "");
    true
}
