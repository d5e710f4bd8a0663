//! Template personalization over the flattened contact record.

use std::collections::BTreeMap;

use mailwave_domain::contact::Contact;

const TOKEN_PREFIX: &str = "{contact_";

/// Substitute `{contact_<field>}` tokens and prepend the hidden preview block.
///
/// Unknown tokens resolve to the empty string — a typo in a template must not
/// leak a literal placeholder to recipients, and must not fail the dispatch.
/// An empty or absent preview text prepends nothing.
pub fn personalize(html: &str, preview_text: Option<&str>, contact: &Contact) -> String {
    let fields = contact.flattened();
    let substituted = substitute_tokens(html, &fields);
    match preview_text {
        Some(preview) if !preview.is_empty() => {
            format!("{}{}", preview_block(preview), substituted)
        }
        _ => substituted,
    }
}

fn substitute_tokens(html: &str, fields: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find(TOKEN_PREFIX) {
        out.push_str(&rest[..start]);
        let after = &rest[start + TOKEN_PREFIX.len()..];
        match after.find('}') {
            Some(end) => {
                if let Some(value) = fields.get(&after[..end]) {
                    out.push_str(value);
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated brace is not a token; keep it literally.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Zero-height, zero-opacity block mail clients read for the inbox snippet.
fn preview_block(preview: &str) -> String {
    format!(
        "<div style=\"display:none;font-size:1px;line-height:1px;max-height:0;max-width:0;opacity:0;overflow:hidden;\">{preview}</div>"
    )
}
