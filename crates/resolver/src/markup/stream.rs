// ABOUTME: Single-pass streaming rewriter for origins with flat comment bodies.
// ABOUTME: Tracks only block-level tags and turns img tags into placeholder links.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::escape_attr;
use crate::error::ResolveError;

/// Rewrite a flat rich-text body without building a tree.
///
/// These origins never nest inline elements, so a single pass that passes
/// block tags through and flattens lists is enough. Text arrives already
/// entity-escaped and is forwarded untouched.
pub fn rewrite_stream(html: &str) -> Result<String, ResolveError> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut out = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => handle_open(e, &mut out)?,
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "blockquote" | "code" | "pre" => {
                        out.push('<');
                        out.push('/');
                        out.push_str(&name);
                        out.push('>');
                    }
                    "ul" | "ol" | "p" => out.push('\n'),
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .decode()
                    .map_err(|err| ResolveError::Markup(err.to_string()))?;
                out.push_str(&text);
            }
            Ok(Event::GeneralRef(ref e)) => {
                // Keep entity references escaped in the output.
                out.push('&');
                out.push_str(&String::from_utf8_lossy(e.as_ref()));
                out.push(';');
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(ResolveError::Markup(err.to_string())),
        }
    }

    Ok(out.trim().to_string())
}

fn handle_open(e: &BytesStart<'_>, out: &mut String) -> Result<(), ResolveError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    match name.as_str() {
        "blockquote" | "code" | "pre" => {
            out.push('<');
            out.push_str(&name);
            out.push('>');
        }
        "img" => {
            let src = e
                .try_get_attribute("src")
                .map_err(|err| ResolveError::Markup(err.to_string()))?;
            if let Some(attr) = src {
                let value = attr
                    .unescape_value()
                    .map_err(|err| ResolveError::Markup(err.to_string()))?;
                out.push_str(&format!(
                    "<a href=\"{}\">🖼 Image</a>\n",
                    escape_attr(&value)
                ));
            }
        }
        "ul" | "ol" => out.push('\n'),
        "li" => out.push_str("- "),
        _ => {}
    }
    Ok(())
}
