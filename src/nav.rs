use crate::dom::{Dom, Selector};

/// Picks the section considered in view: the last one, in document order,
/// whose top is at most `lookahead` below the scroll position.
pub fn active_section<'a, I>(sections: I, scroll_y: f64, lookahead: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    sections
        .into_iter()
        .filter(|(_, top)| scroll_y >= top - lookahead)
        .map(|(id, _)| id)
        .last()
}

/// Recomputes the active section and moves the active class onto its nav link.
pub fn update<D: Dom>(dom: &D, lookahead: f64, active_class: &str) -> Option<String> {
    let sections: Vec<(String, f64)> = dom
        .query_all(Selector::IdentifiedSections)
        .iter()
        .filter_map(|section| Some((dom.attribute(section, "id")?, dom.offset_top(section))))
        .collect();

    let scroll_y = dom.scroll_y();
    let current = active_section(
        sections.iter().map(|(id, top)| (id.as_str(), *top)),
        scroll_y,
        lookahead,
    )
    .map(str::to_string);

    sync_links(dom, current.as_deref(), active_class);
    current
}

pub fn sync_links<D: Dom>(dom: &D, current: Option<&str>, active_class: &str) {
    let wanted = current.map(|id| format!("#{}", id));
    for link in dom.query_all(Selector::NavLinks) {
        dom.remove_class(&link, active_class);
        let href = dom.attribute(&link, "href").unwrap_or_default();
        if wanted.as_deref() == Some(href.as_str()) {
            dom.add_class(&link, active_class);
        }
    }
}
