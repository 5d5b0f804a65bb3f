//! Document assembly
//!
//! Merges a template with resolved field values into a standalone HTML page.
//! Assembly never fails: unresolved variables render as a visible `[KEY]`
//! placeholder so incomplete drafts can still be previewed.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use shared_types::{is_filled, BlockStyle, BlockType, ContentBlock, FieldValues, Template};
use tracing::debug;

use super::conditions::evaluate_condition;

lazy_static! {
    /// `{{ key }}` tokens; anything between the braces is treated as the key
    static ref VARIABLE_PATTERN: Regex = Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").unwrap();
}

const DOCUMENT_STYLE: &str = "\
body { font-family: 'Helvetica Neue', Arial, sans-serif; font-size: 11pt; line-height: 1.5; color: #111; }
.document { max-width: 18cm; margin: 2cm auto; }
.block { margin: 0 0 1em 0; }
.address { white-space: normal; }
.header { font-size: 12pt; margin-top: 1.5em; }
.signature { margin-top: 3em; }
.footer { font-size: 9pt; color: #555; margin: 0; }
.document-footer { margin-top: 3em; font-size: 8pt; color: #999; }
@media print { .document { margin: 0; } .document-footer { display: none; } }";

/// Assemble a document stamped with the current time
pub fn assemble_document(template: &Template, data: &FieldValues) -> String {
    assemble_document_at(template, data, Utc::now())
}

/// Assemble a document with an explicit generation timestamp.
///
/// Identical inputs always produce byte-identical output.
pub fn assemble_document_at(
    template: &Template,
    data: &FieldValues,
    generated_at: DateTime<Utc>,
) -> String {
    let mut html = render_prologue(template, generated_at);
    let mut rendered = 0usize;

    for (index, block) in template.content.iter().enumerate() {
        if let Some(condition) = &block.condition {
            if !evaluate_condition(condition, data) {
                debug!(
                    template = %template.id,
                    block = index,
                    field = %condition.field,
                    "Block guard false, skipping"
                );
                continue;
            }
        }
        html.push_str(&render_block(block, data));
        html.push('\n');
        rendered += 1;
    }

    html.push_str(&render_epilogue(template));
    debug!(
        template = %template.id,
        blocks = rendered,
        skipped = template.content.len() - rendered,
        "Document assembled"
    );
    html
}

/// Render one block whose guard already passed
pub fn render_block(block: &ContentBlock, data: &FieldValues) -> String {
    let body = substitute_variables(&block.content, data);
    let class = block.block_type.css_class();
    let style = style_attribute(block.style.as_ref());

    match block.block_type {
        BlockType::List => {
            let items: String = body
                .lines()
                .map(|line| line.trim().trim_start_matches(['-', '•', '*']).trim())
                .filter(|line| !line.is_empty())
                .map(|line| format!("<li>{}</li>", line))
                .collect();
            format!("<ul class=\"block {}\"{}>{}</ul>", class, style, items)
        }
        BlockType::Header => format!(
            "<h2 class=\"block {}\"{}>{}</h2>",
            class,
            style,
            newlines_to_breaks(&body)
        ),
        BlockType::Paragraph => format!(
            "<p class=\"block {}\"{}>{}</p>",
            class,
            style,
            newlines_to_breaks(&body)
        ),
        BlockType::Signature | BlockType::Footer | BlockType::Address => format!(
            "<div class=\"block {}\"{}>{}</div>",
            class,
            style,
            newlines_to_breaks(&body)
        ),
    }
}

/// Replace every `{{key}}` token, HTML-escaping both literal text and values.
///
/// Braces are escaped too, so the result never contains a raw `{{...}}`.
pub fn substitute_variables(text: &str, data: &FieldValues) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    let mut last = 0;

    for caps in VARIABLE_PATTERN.captures_iter(text) {
        let (Some(token), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&escape_html(&text[last..token.start()]));
        let key = key.as_str().trim();
        let value = data
            .get(key)
            .and_then(value_to_text)
            .unwrap_or_else(|| placeholder(key));
        out.push_str(&escape_html(&value));
        last = token.end();
    }

    out.push_str(&escape_html(&text[last..]));
    out
}

/// Variable keys referenced by a piece of template text, in order of appearance
pub fn template_variables(text: &str) -> Vec<String> {
    VARIABLE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .collect()
}

/// Visible marker for a missing value
pub fn placeholder(key: &str) -> String {
    format!("[{}]", key.to_uppercase())
}

/// Text rendering of a field value; `None` when the value is not filled
pub fn value_to_text(value: &Value) -> Option<String> {
    if !is_filled(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(true) => Some("oui".to_string()),
        Value::Bool(false) => Some("non".to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_to_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Object(_) => Some(value.to_string()),
        Value::Null => None,
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    out
}

fn newlines_to_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "<br>")
}

fn style_attribute(style: Option<&BlockStyle>) -> String {
    let Some(style) = style else {
        return String::new();
    };

    let mut rules = Vec::new();
    if let Some(alignment) = style.alignment {
        rules.push(format!("text-align: {}", alignment.as_css()));
    }
    if style.bold {
        rules.push("font-weight: bold".to_string());
    }
    if style.italic {
        rules.push("font-style: italic".to_string());
    }
    if let Some(size) = &style.font_size {
        rules.push(format!("font-size: {}", escape_html(size)));
    }

    if rules.is_empty() {
        String::new()
    } else {
        format!(" style=\"{};\"", rules.join("; "))
    }
}

fn render_prologue(template: &Template, generated_at: DateTime<Utc>) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"generated-at\" content=\"{generated}\">\n<title>{title}</title>\n\
         <style>\n{style}\n</style>\n</head>\n<body>\n<div class=\"document\">\n",
        lang = escape_html(&template.metadata.language),
        generated = generated_at.to_rfc3339(),
        title = escape_html(&template.name),
        style = DOCUMENT_STYLE,
    )
}

fn render_epilogue(template: &Template) -> String {
    format!(
        "<div class=\"document-footer\">Modèle {} version {}</div>\n</div>\n</body>\n</html>\n",
        escape_html(&template.id),
        escape_html(&template.metadata.version)
    )
}
