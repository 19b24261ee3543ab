use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ErrorStyle;
use crate::dom::{Dom, Selector};

pub const ERROR_CLASS: &str = "error-text";

// Same set as `is_form_whitespace`.
const FORM_WHITESPACE_CLASS: &str =
    r"\t\n\x0B\x0C\r \xA0\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

// One "@", something on each side, and a dot somewhere after it.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let part = format!("[^@{}]+", FORM_WHITESPACE_CLASS);
    Regex::new(&format!(r"^{part}@{part}\.{part}$")).expect("email pattern compiles")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    pub fn name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }

    pub fn error_message(self) -> &'static str {
        match self {
            Field::Name => "Please enter your name",
            Field::Email => "Please enter a valid email",
            Field::Message => "Please enter a message (at least 10 characters)",
        }
    }

    /// `None` means the field is not in the form at all.
    pub fn accepts(self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            Field::Name => input_length(value) >= 2,
            Field::Email => EMAIL_PATTERN.is_match(value),
            Field::Message => input_length(value) >= 10,
        }
    }
}

// Browser whitespace for trimming: WhiteSpace plus LineTerminator. Unlike
// `char::is_whitespace` this includes U+FEFF and excludes U+0085.
fn is_form_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{b}' | '\u{c}' | '\r' | ' ' | '\u{a0}' | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{2028}' | '\u{2029}' | '\u{202f}' | '\u{205f}' | '\u{3000}' | '\u{feff}'
    )
}

/// Length of the trimmed value as the browser reports it, in UTF-16 code units.
fn input_length(value: &str) -> usize {
    value.trim_matches(is_form_whitespace).encode_utf16().count()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub failed: Vec<Field>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Clears old annotations, checks the three contact fields and annotates each
/// failure right after its field (or at the end of the form if the field is missing).
pub fn validate_form<D: Dom>(dom: &D, form: &D::Node, style: &ErrorStyle) -> ValidationReport {
    for stale in dom.query_within(form, Selector::ErrorAnnotations) {
        dom.remove(&stale);
    }

    let mut report = ValidationReport::default();
    for field in Field::ALL {
        let control = dom.query_first_within(form, Selector::Field(field.name()));
        let value = control.as_ref().map(|node| dom.field_value(node));
        if field.accepts(value.as_deref()) {
            continue;
        }
        report.failed.push(field);
        annotate(dom, form, control.as_ref(), field.error_message(), style);
    }

    if !report.is_valid() {
        tracing::debug!(failed = ?report.failed, "contact form rejected");
    }
    report
}

fn annotate<D: Dom>(dom: &D, form: &D::Node, control: Option<&D::Node>, text: &str, style: &ErrorStyle) {
    let Some(note) = dom.create_element("div") else {
        return;
    };
    dom.add_class(&note, ERROR_CLASS);
    dom.set_style(&note, "color", &style.color);
    dom.set_style(&note, "margin-top", &style.margin_top);
    dom.set_style(&note, "font-size", &style.font_size);
    dom.set_text(&note, text);
    match control {
        Some(control) => dom.insert_after(control, &note),
        None => dom.append_child(form, &note),
    }
}
