/// Every query the page controller makes against the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selector<'a> {
    /// Links whose href starts with `#`.
    FragmentLinks,
    /// `section` elements carrying an id, in document order.
    IdentifiedSections,
    NavLinks,
    PopupCloseControls,
    /// Forms nested in a `.contact-form` container.
    ContactForms,
    /// Error annotations injected by the validator.
    ErrorAnnotations,
    /// A form control by its `name` attribute.
    Field(&'a str),
}

impl Selector<'_> {
    pub fn css(&self) -> String {
        match self {
            Selector::FragmentLinks => r##"a[href^="#"]"##.to_string(),
            Selector::IdentifiedSections => "section[id]".to_string(),
            Selector::NavLinks => "nav a".to_string(),
            Selector::PopupCloseControls => ".popup-close".to_string(),
            Selector::ContactForms => ".contact-form form".to_string(),
            Selector::ErrorAnnotations => ".error-text".to_string(),
            Selector::Field(name) => format!(r#"[name="{}"]"#, name),
        }
    }
}

/// The slice of the document the controller works with. The browser
/// implementation lives in `web`; tests use `headless::HeadlessDom`.
pub trait Dom {
    type Node: Clone + PartialEq;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;
    fn query_all(&self, selector: Selector<'_>) -> Vec<Self::Node>;
    fn query_within(&self, root: &Self::Node, selector: Selector<'_>) -> Vec<Self::Node>;

    fn query_first_within(&self, root: &Self::Node, selector: Selector<'_>) -> Option<Self::Node> {
        self.query_within(root, selector).into_iter().next()
    }

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn set_text(&self, node: &Self::Node, text: &str);
    /// An empty value clears the property.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    fn set_body_style(&self, property: &str, value: &str);

    fn offset_top(&self, node: &Self::Node) -> f64;
    fn scroll_y(&self) -> f64;
    /// Smoothly scrolls so the node's top edge meets the viewport top.
    fn scroll_into_view(&self, node: &Self::Node);

    /// Current value of an input, textarea or select. Empty for anything else.
    fn field_value(&self, node: &Self::Node) -> String;
    /// Successful controls of a form as name/value pairs in document order.
    fn form_fields(&self, form: &Self::Node) -> Vec<(String, String)>;
    fn form_action(&self, form: &Self::Node) -> String;
    fn reset_form(&self, form: &Self::Node);

    fn create_element(&self, tag: &str) -> Option<Self::Node>;
    fn insert_after(&self, reference: &Self::Node, node: &Self::Node);
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    fn remove(&self, node: &Self::Node);
}
