//! Click-redirect rewriting and open-pixel injection.

use url::form_urlencoded;
use uuid::Uuid;

use mailwave_domain::tracking::UtmParams;

/// Identifying parameters carried by every rewritten link and by the pixel.
#[derive(Debug, Clone)]
pub struct TrackingParams<'a> {
    /// Public base, e.g. `https://api.example.com/marketing-email/tracking`.
    pub base_url: &'a str,
    pub campaign_id: Uuid,
    pub contact_id: Uuid,
    pub utm: &'a UtmParams,
}

/// Anchor hrefs that are never rewritten.
const SKIP_PREFIXES: [&str; 3] = ["mailto:", "tel:", "#"];

/// Rewrite every anchor href into an opaque click-redirect URL and append a
/// 1×1 open-tracking pixel. Pure string transform.
pub fn inject_tracking(html: &str, params: &TrackingParams<'_>) -> String {
    append_pixel(rewrite_anchor_hrefs(html, params), params)
}

/// The redirect URL whose `url` query parameter percent-encodes `original`.
pub fn click_url(params: &TrackingParams<'_>, original: &str) -> String {
    let mut query = identifying_query(params);
    query.append_pair("url", original);
    format!("{}/click?{}", params.base_url, query.finish())
}

/// The pixel URL carrying the same identifying parameters, minus `url`.
pub fn open_url(params: &TrackingParams<'_>) -> String {
    format!("{}/open?{}", params.base_url, identifying_query(params).finish())
}

fn identifying_query(params: &TrackingParams<'_>) -> form_urlencoded::Serializer<'static, String> {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("meid", &params.campaign_id.to_string());
    query.append_pair("cid", &params.contact_id.to_string());
    for (key, value) in params.utm.pairs() {
        query.append_pair(key, value);
    }
    query
}

fn rewrite_anchor_hrefs(html: &str, params: &TrackingParams<'_>) -> String {
    let lower = html.to_ascii_lowercase();
    let mut out = String::with_capacity(html.len() * 2);
    let mut i = 0;
    while let Some(rel) = lower[i..].find("<a") {
        let tag_start = i + rel;
        // Require a delimiter after "<a" so "<abbr>" is not treated as an anchor.
        let is_anchor = matches!(
            lower.as_bytes().get(tag_start + 2),
            Some(b' ' | b'\t' | b'\n' | b'\r' | b'>')
        );
        let Some(end_rel) = lower[tag_start..].find('>') else {
            break;
        };
        let tag_end = tag_start + end_rel + 1;
        out.push_str(&html[i..tag_start]);
        let tag = &html[tag_start..tag_end];
        if is_anchor {
            out.push_str(&rewrite_tag(tag, params));
        } else {
            out.push_str(tag);
        }
        i = tag_end;
    }
    out.push_str(&html[i..]);
    out
}

/// Position of the `href` attribute name inside a lowercased tag. Matches
/// only a standalone attribute (preceded by whitespace, followed by `=` or
/// whitespace) so `data-href`, `hreflang` or `title="href"` never hit.
fn find_href_attr(lower: &str) -> Option<usize> {
    let bytes = lower.as_bytes();
    let mut from = 0;
    while let Some(rel) = lower[from..].find("href") {
        let at = from + rel;
        let before = at.checked_sub(1).map(|i| bytes[i]);
        let after = bytes.get(at + 4);
        if matches!(before, Some(b' ' | b'\t' | b'\n' | b'\r'))
            && matches!(after, Some(b'=' | b' ' | b'\t' | b'\n' | b'\r'))
        {
            return Some(at);
        }
        from = at + 4;
    }
    None
}

fn rewrite_tag(tag: &str, params: &TrackingParams<'_>) -> String {
    let lower = tag.to_ascii_lowercase();
    let Some(attr_start) = find_href_attr(&lower) else {
        return tag.to_owned();
    };
    let mut value_start = None;
    let mut quote = '"';
    for (offset, c) in tag[attr_start + 4..].char_indices() {
        match c {
            ' ' | '\t' | '\n' | '\r' | '=' => continue,
            '"' | '\'' => {
                quote = c;
                value_start = Some(attr_start + 4 + offset + 1);
                break;
            }
            // Unquoted or malformed href: leave the tag alone.
            _ => return tag.to_owned(),
        }
    }
    let Some(value_start) = value_start else {
        return tag.to_owned();
    };
    let Some(value_len) = tag[value_start..].find(quote) else {
        return tag.to_owned();
    };
    let original = &tag[value_start..value_start + value_len];
    if SKIP_PREFIXES.iter().any(|p| original.starts_with(p)) {
        return tag.to_owned();
    }
    format!(
        "{}{}{}",
        &tag[..value_start],
        click_url(params, original),
        &tag[value_start + value_len..]
    )
}

fn append_pixel(html: String, params: &TrackingParams<'_>) -> String {
    let pixel = format!(
        "<img src=\"{}\" width=\"1\" height=\"1\" style=\"display:none;border:0;\" alt=\"\" />",
        open_url(params)
    );
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(idx) => format!("{}{}{}", &html[..idx], pixel, &html[idx..]),
        None => format!("{html}{pixel}"),
    }
}
