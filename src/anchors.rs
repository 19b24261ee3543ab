use crate::dom::Dom;

/// What a click on a link did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorOutcome {
    /// Not a same-page fragment; the browser navigates as usual.
    Ignored,
    Scrolled,
    /// Fragment with no matching element. Navigation is still suppressed.
    MissingTarget,
}

impl AnchorOutcome {
    pub fn prevents_default(self) -> bool {
        !matches!(self, AnchorOutcome::Ignored)
    }
}

/// Returns the id a same-page fragment link points at, e.g. `about` for `#about`.
pub fn fragment_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

pub fn follow<D: Dom>(dom: &D, href: &str) -> AnchorOutcome {
    let Some(id) = fragment_target(href) else {
        return AnchorOutcome::Ignored;
    };
    match dom.element_by_id(id) {
        Some(target) => {
            dom.scroll_into_view(&target);
            AnchorOutcome::Scrolled
        }
        None => {
            tracing::debug!(target_id = id, "fragment link has no target");
            AnchorOutcome::MissingTarget
        }
    }
}
