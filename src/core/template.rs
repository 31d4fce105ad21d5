//! Named-placeholder rendering for header and banner templates.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)(?::([^{}]*))?\}").unwrap());

#[derive(Debug, Clone)]
pub enum TemplateValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        TemplateValue::Text(value.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(value: String) -> Self {
        TemplateValue::Text(value)
    }
}

impl From<usize> for TemplateValue {
    fn from(value: usize) -> Self {
        TemplateValue::Int(value as i64)
    }
}

impl From<i64> for TemplateValue {
    fn from(value: i64) -> Self {
        TemplateValue::Int(value)
    }
}

impl From<f64> for TemplateValue {
    fn from(value: f64) -> Self {
        TemplateValue::Float(value)
    }
}

#[derive(Debug, Default, Clone)]
pub struct TemplateContext {
    values: HashMap<String, TemplateValue>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<TemplateValue>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Replaces `{name}`, `{name:,}` and `{name:.1f}` style placeholders.
    /// Placeholders with no value are left as written.
    pub fn render(&self, template: &str) -> String {
        RE_PLACEHOLDER
            .replace_all(template, |caps: &Captures| {
                let name = &caps[1];
                let format_spec = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                match self.values.get(name) {
                    Some(value) => format_value(value, format_spec),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

fn format_value(value: &TemplateValue, format_spec: &str) -> String {
    let grouped = format_spec.contains(',');
    let precision = format_spec
        .split_once('.')
        .and_then(|(_, rest)| rest.trim_end_matches('f').parse::<usize>().ok());

    match value {
        TemplateValue::Text(text) => text.clone(),
        TemplateValue::Int(n) => match precision {
            Some(p) => format_float(*n as f64, p, grouped),
            None if grouped => group_thousands(&n.to_string()),
            None => n.to_string(),
        },
        TemplateValue::Float(f) => format_float(*f, precision.unwrap_or(6), grouped),
    }
}

fn format_float(value: f64, precision: usize, grouped: bool) -> String {
    let rendered = format!("{:.*}", precision, value);
    if !grouped {
        return rendered;
    }
    match rendered.split_once('.') {
        Some((int_part, frac)) => format!("{}.{}", group_thousands(int_part), frac),
        None => group_thousands(&rendered),
    }
}

/// Inserts `,` between groups of three digits.
pub fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("{}{}", sign, out)
}
