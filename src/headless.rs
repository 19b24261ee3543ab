//! In-memory document used to drive the controller without a browser.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::dom::{Dom, Selector};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Default)]
struct NodeData {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    style: BTreeMap<String, String>,
    value: String,
    offset_top: f64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Default)]
struct Tree {
    nodes: Vec<NodeData>,
    body_style: BTreeMap<String, String>,
    scroll_y: f64,
    scrolled_to: Vec<NodeId>,
    resets: Vec<NodeId>,
}

impl Tree {
    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    /// Descendants of `root` in document order, `root` excluded.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(root).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    fn has_ancestor(&self, id: NodeId, pred: impl Fn(&NodeData) -> bool) -> bool {
        let mut cursor = self.node(id).parent;
        while let Some(parent) = cursor {
            if pred(self.node(parent)) {
                return true;
            }
            cursor = self.node(parent).parent;
        }
        false
    }

    fn matches(&self, id: NodeId, selector: Selector<'_>) -> bool {
        let data = self.node(id);
        match selector {
            Selector::FragmentLinks => {
                data.tag == "a" && data.attrs.get("href").is_some_and(|href| href.starts_with('#'))
            }
            Selector::IdentifiedSections => data.tag == "section" && data.attrs.contains_key("id"),
            Selector::NavLinks => data.tag == "a" && self.has_ancestor(id, |n| n.tag == "nav"),
            Selector::PopupCloseControls => data.classes.iter().any(|c| c == "popup-close"),
            Selector::ContactForms => {
                data.tag == "form"
                    && self.has_ancestor(id, |n| n.classes.iter().any(|c| c == "contact-form"))
            }
            Selector::ErrorAnnotations => data.classes.iter().any(|c| c == "error-text"),
            Selector::Field(name) => data.attrs.get("name").is_some_and(|n| n == name),
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|child| *child != id);
        }
    }
}

pub struct HeadlessDom {
    tree: RefCell<Tree>,
    body: NodeId,
}

impl Default for HeadlessDom {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDom {
    pub fn new() -> Self {
        let mut tree = Tree::default();
        tree.nodes.push(NodeData {
            tag: "body".to_string(),
            ..NodeData::default()
        });
        Self {
            tree: RefCell::new(tree),
            body: NodeId(0),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn alloc(&self, tag: &str) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        tree.nodes.push(NodeData {
            tag: tag.to_ascii_lowercase(),
            ..NodeData::default()
        });
        NodeId(tree.nodes.len() - 1)
    }

    /// Creates `tag` as the last child of `parent`.
    pub fn append(&self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.alloc(tag);
        self.append_child(&parent, &id);
        id
    }

    /// `class` is split into the class list; `value` also seeds the control's current value.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        let mut tree = self.tree.borrow_mut();
        let data = tree.node_mut(node);
        match name {
            "class" => data.classes = value.split_whitespace().map(str::to_string).collect(),
            "value" => {
                data.value = value.to_string();
                data.attrs.insert(name.to_string(), value.to_string());
            }
            _ => {
                data.attrs.insert(name.to_string(), value.to_string());
            }
        }
    }

    /// What a user typed into the control.
    pub fn set_value(&self, node: NodeId, value: &str) {
        self.tree.borrow_mut().node_mut(node).value = value.to_string();
    }

    pub fn set_offset_top(&self, node: NodeId, top: f64) {
        self.tree.borrow_mut().node_mut(node).offset_top = top;
    }

    pub fn set_scroll_y(&self, y: f64) {
        self.tree.borrow_mut().scroll_y = y;
    }

    pub fn text(&self, node: NodeId) -> String {
        self.tree.borrow().node(node).text.clone()
    }

    pub fn value(&self, node: NodeId) -> String {
        self.tree.borrow().node(node).value.clone()
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.tree.borrow().node(node).style.get(property).cloned()
    }

    pub fn body_style(&self, property: &str) -> Option<String> {
        self.tree.borrow().body_style.get(property).cloned()
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.tree.borrow().node(node).classes.clone()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.borrow().node(node).children.clone()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().node(node).parent
    }

    /// Nodes passed to `scroll_into_view`, oldest first.
    pub fn scrolled_to(&self) -> Vec<NodeId> {
        self.tree.borrow().scrolled_to.clone()
    }

    pub fn reset_count(&self, form: NodeId) -> usize {
        self.tree.borrow().resets.iter().filter(|id| **id == form).count()
    }
}

fn is_successful_control(data: &NodeData) -> bool {
    if !matches!(data.tag.as_str(), "input" | "select" | "textarea") {
        return false;
    }
    if data.attrs.get("name").map_or(true, |name| name.is_empty()) || data.attrs.contains_key("disabled") {
        return false;
    }
    match data.attrs.get("type").map(String::as_str) {
        Some("submit" | "button" | "reset" | "file" | "image") => false,
        Some("checkbox" | "radio") => data.attrs.contains_key("checked"),
        _ => true,
    }
}

impl Dom for HeadlessDom {
    type Node = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree.borrow();
        tree.descendants(self.body)
            .into_iter()
            .find(|node| tree.node(*node).attrs.get("id").is_some_and(|v| v == id))
    }

    fn query_all(&self, selector: Selector<'_>) -> Vec<NodeId> {
        self.query_within(&self.body, selector)
    }

    fn query_within(&self, root: &NodeId, selector: Selector<'_>) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        tree.descendants(*root)
            .into_iter()
            .filter(|node| tree.matches(*node, selector))
            .collect()
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        let data = tree.node(*node);
        if name == "class" {
            return (!data.classes.is_empty()).then(|| data.classes.join(" "));
        }
        data.attrs.get(name).cloned()
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        let mut tree = self.tree.borrow_mut();
        let classes = &mut tree.node_mut(*node).classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.tree.borrow_mut().node_mut(*node).classes.retain(|c| c != class);
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.tree.borrow().node(*node).classes.iter().any(|c| c == class)
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        let mut tree = self.tree.borrow_mut();
        let children = std::mem::take(&mut tree.node_mut(*node).children);
        for child in children {
            tree.node_mut(child).parent = None;
        }
        tree.node_mut(*node).text = text.to_string();
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        let mut tree = self.tree.borrow_mut();
        let style = &mut tree.node_mut(*node).style;
        if value.is_empty() {
            style.remove(property);
        } else {
            style.insert(property.to_string(), value.to_string());
        }
    }

    fn set_body_style(&self, property: &str, value: &str) {
        let mut tree = self.tree.borrow_mut();
        if value.is_empty() {
            tree.body_style.remove(property);
        } else {
            tree.body_style.insert(property.to_string(), value.to_string());
        }
    }

    fn offset_top(&self, node: &NodeId) -> f64 {
        self.tree.borrow().node(*node).offset_top
    }

    fn scroll_y(&self) -> f64 {
        self.tree.borrow().scroll_y
    }

    fn scroll_into_view(&self, node: &NodeId) {
        let mut tree = self.tree.borrow_mut();
        let top = tree.node(*node).offset_top;
        tree.scroll_y = top;
        tree.scrolled_to.push(*node);
    }

    fn field_value(&self, node: &NodeId) -> String {
        let tree = self.tree.borrow();
        let data = tree.node(*node);
        match data.tag.as_str() {
            "input" | "select" | "textarea" => data.value.clone(),
            _ => String::new(),
        }
    }

    fn form_fields(&self, form: &NodeId) -> Vec<(String, String)> {
        let tree = self.tree.borrow();
        tree.descendants(*form)
            .into_iter()
            .map(|id| tree.node(id))
            .filter(|data| is_successful_control(data))
            .filter_map(|data| {
                let name = data.attrs.get("name")?.clone();
                let value = match data.attrs.get("type").map(String::as_str) {
                    Some("checkbox" | "radio") if data.value.is_empty() => "on".to_string(),
                    _ => data.value.clone(),
                };
                Some((name, value))
            })
            .collect()
    }

    fn form_action(&self, form: &NodeId) -> String {
        self.attribute(form, "action").unwrap_or_default()
    }

    fn reset_form(&self, form: &NodeId) {
        let mut tree = self.tree.borrow_mut();
        for id in tree.descendants(*form) {
            let data = tree.node_mut(id);
            if matches!(data.tag.as_str(), "input" | "select" | "textarea") {
                data.value = data.attrs.get("value").cloned().unwrap_or_default();
            }
        }
        tree.resets.push(*form);
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        Some(self.alloc(tag))
    }

    fn insert_after(&self, reference: &NodeId, node: &NodeId) {
        let mut tree = self.tree.borrow_mut();
        let Some(parent) = tree.node(*reference).parent else {
            return;
        };
        tree.detach(*node);
        let siblings = &mut tree.node_mut(parent).children;
        let index = siblings.iter().position(|id| id == reference).map_or(siblings.len(), |i| i + 1);
        siblings.insert(index, *node);
        tree.node_mut(*node).parent = Some(parent);
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        let mut tree = self.tree.borrow_mut();
        tree.detach(*child);
        tree.node_mut(*parent).children.push(*child);
        tree.node_mut(*child).parent = Some(*parent);
    }

    fn remove(&self, node: &NodeId) {
        self.tree.borrow_mut().detach(*node);
    }
}
