//! Converts legacy `attrs`/`states` view attributes into Odoo 18 boolean
//! expressions.
//!
//! The only pass that works on a parsed XML document instead of raw text.
//! Files are re-serialized pretty-printed with an XML declaration, and only
//! persisted after the caller-supplied confirmer agrees (the CLI prompts on
//! stdin, `--auto-replace` and tests use [`AutoConfirm`]).

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use crate::filesystem;
use crate::literal::{self, PyValue};

/// Attribute names the legacy `attrs` dictionary may target.
const NEW_ATTRS: [&str; 4] = ["invisible", "required", "readonly", "column_invisible"];

/// Decides whether a rewritten file may be persisted.
pub trait ReplaceConfirmer {
    fn confirm(&mut self, path: &Path, original: &str, updated: &str) -> Result<bool>;
}

/// Confirms every rewrite; used for `--auto-replace`.
pub struct AutoConfirm;

impl ReplaceConfirmer for AutoConfirm {
    fn confirm(&mut self, _path: &Path, _original: &str, _updated: &str) -> Result<bool> {
        Ok(true)
    }
}

#[derive(Debug, Clone)]
pub struct PassError {
    pub path: PathBuf,
    pub detail: String,
}

#[derive(Debug, Default)]
pub struct AttrsStatesReport {
    /// Files rewritten and persisted.
    pub rewritten: Vec<PathBuf>,
    /// Files with pending changes the confirmer declined.
    pub declined: Vec<PathBuf>,
    /// Whole-file failures (XML parse or I/O); the file was skipped.
    pub xml_errors: Vec<PassError>,
    /// Per-element `attrs` values that could not be converted; the original
    /// attribute was kept.
    pub attrs_errors: Vec<PassError>,
}

pub fn run(root: &Path, confirmer: &mut dyn ReplaceConfirmer) -> Result<AttrsStatesReport> {
    let mut report = AttrsStatesReport::default();
    for path in filesystem::files_with_extension(root, "xml")? {
        let content = match filesystem::read_file(&path) {
            Ok(content) => content,
            Err(err) => {
                report.xml_errors.push(PassError {
                    path,
                    detail: format!("{err:#}"),
                });
                continue;
            }
        };
        let outcome = match rewrite_document(&content) {
            Ok(outcome) => outcome,
            Err(err) => {
                report.xml_errors.push(PassError {
                    path,
                    detail: format!("{err:#}"),
                });
                continue;
            }
        };
        for detail in outcome.attr_errors {
            report.attrs_errors.push(PassError {
                path: path.clone(),
                detail,
            });
        }
        let Some(updated) = outcome.updated else {
            continue;
        };
        if confirmer.confirm(&path, &content, &updated)? {
            match filesystem::write_file(&path, &updated) {
                Ok(()) => report.rewritten.push(path),
                Err(err) => report.xml_errors.push(PassError {
                    path,
                    detail: format!("{err:#}"),
                }),
            }
        } else {
            report.declined.push(path);
        }
    }
    Ok(report)
}

pub(crate) struct DocumentRewrite {
    /// New serialized content, present only when something changed.
    pub updated: Option<String>,
    /// Conversion failures for individual `attrs` values.
    pub attr_errors: Vec<String>,
}

/// Parses the document and rewrites `attrs`/`states` on every element.
/// Returns `Err` only for whole-document failures (malformed XML).
pub(crate) fn rewrite_document(content: &str) -> Result<DocumentRewrite> {
    let mut reader = Reader::from_str(content);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("failed to write XML declaration")?;

    let mut modified = false;
    let mut attr_errors = Vec::new();
    loop {
        match reader.read_event().context("failed to parse XML")? {
            Event::Eof => break,
            // The declaration is re-emitted above.
            Event::Decl(_) => {}
            Event::Start(elem) => {
                let rewrite = rewrite_element(&elem, &mut attr_errors)?;
                modified |= rewrite.changed;
                writer
                    .write_event(Event::Start(rewrite.element))
                    .context("failed to serialize element")?;
            }
            Event::Empty(elem) => {
                let rewrite = rewrite_element(&elem, &mut attr_errors)?;
                modified |= rewrite.changed;
                writer
                    .write_event(Event::Empty(rewrite.element))
                    .context("failed to serialize element")?;
            }
            // Indentation whitespace is dropped and regenerated by the
            // writer; text with actual content passes through verbatim.
            Event::Text(text) if text.as_ref().iter().all(u8::is_ascii_whitespace) => {}
            other => writer
                .write_event(other)
                .context("failed to serialize XML")?,
        }
    }

    if !modified {
        return Ok(DocumentRewrite {
            updated: None,
            attr_errors,
        });
    }
    let mut updated =
        String::from_utf8(writer.into_inner()).context("serialized XML is not valid UTF-8")?;
    updated.push('\n');
    Ok(DocumentRewrite {
        updated: Some(updated),
        attr_errors,
    })
}

struct ElementRewrite {
    element: BytesStart<'static>,
    changed: bool,
}

fn rewrite_element(elem: &BytesStart, errors: &mut Vec<String>) -> Result<ElementRewrite> {
    let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    let mut attributes: Vec<(String, String)> = Vec::new();
    for attr in elem.attributes() {
        let attr = attr.context("malformed attribute")?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .context("malformed attribute value")?
            .into_owned();
        attributes.push((key, value));
    }

    let mut changed = false;
    if let Some(pos) = attributes.iter().position(|(key, _)| key == "attrs") {
        let raw = attributes[pos].1.clone();
        let (derived, error) = derive_new_attrs(&raw);
        if let Some(error) = error {
            errors.push(error);
        }
        // The legacy attribute goes away only if something was derived.
        if !derived.is_empty() {
            attributes.remove(pos);
            for (key, value) in derived {
                set_attribute(&mut attributes, key, value);
            }
            changed = true;
        }
    }
    if let Some(pos) = attributes
        .iter()
        .position(|(key, value)| key == "states" && !value.is_empty())
    {
        let state = attributes.remove(pos).1;
        set_attribute(
            &mut attributes,
            "invisible".to_string(),
            format!("state != '{state}'"),
        );
        changed = true;
    }

    let mut element = BytesStart::new(name);
    for (key, value) in &attributes {
        element.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Owned(escape_attribute(value).into_bytes()),
        });
    }
    Ok(ElementRewrite { element, changed })
}

/// Escapes an attribute value for serialization inside double quotes.
/// Apostrophes stay literal so synthesized expressions like
/// `state == 'draft'` remain readable.
fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Replaces the attribute in place when the key already exists, otherwise
/// appends it, mirroring how a tree API's `set` behaves.
fn set_attribute(attributes: &mut Vec<(String, String)>, key: String, value: String) {
    match attributes.iter_mut().find(|(existing, _)| *existing == key) {
        Some(entry) => entry.1 = value,
        None => attributes.push((key, value)),
    }
}

/// Converts a legacy `attrs` dictionary into `(attribute, expression)`
/// pairs. A failure partway through keeps whatever was already derived and
/// reports one error carrying the raw attribute text, matching the legacy
/// tool's behavior.
fn derive_new_attrs(raw: &str) -> (Vec<(String, String)>, Option<String>) {
    let mut derived = Vec::new();
    // Source files sometimes double-escape comparison operators; decode the
    // residual entities left over after the XML parser's own unescape.
    let raw = raw.replace("&lt;", "<").replace("&gt;", ">");
    let parsed = match literal::parse(raw.trim()) {
        Ok(value) => value,
        Err(err) => return (derived, Some(format!("{raw} -> {err}"))),
    };
    let PyValue::Dict(entries) = parsed else {
        return (derived, Some(format!("{raw} -> expected a dict literal")));
    };
    for (key, value) in &entries {
        let PyValue::Str(target) = key else {
            // Non-string keys can never name a known attribute.
            continue;
        };
        if !NEW_ATTRS.contains(&target.as_str()) {
            continue;
        }
        let conditions = match value {
            PyValue::List(items) | PyValue::Tuple(items) => items,
            other => {
                return (
                    derived,
                    Some(format!(
                        "{raw} -> conditions for `{target}` are not a list: {}",
                        other.repr()
                    )),
                );
            }
        };
        let mut parts = Vec::new();
        for condition in conditions {
            let (field, operator, operand) = match condition {
                PyValue::List(items) | PyValue::Tuple(items) if items.len() >= 3 => {
                    (&items[0], &items[1], &items[2])
                }
                other => {
                    return (
                        derived,
                        Some(format!("{raw} -> malformed condition: {}", other.repr())),
                    );
                }
            };
            parts.push(format!(
                "{} {} {}",
                field.as_bare(),
                convert_operator(&operator.as_bare()),
                render_operand(operand)
            ));
        }
        derived.push((target.clone(), parts.join(" and ")));
    }
    (derived, None)
}

fn convert_operator(operator: &str) -> String {
    if operator == "=" {
        "==".to_string()
    } else {
        operator.to_string()
    }
}

fn render_operand(value: &PyValue) -> String {
    match value {
        PyValue::Str(text) => format!("'{text}'"),
        other => other.repr(),
    }
}
