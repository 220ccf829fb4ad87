//! Template tags inside WordprocessingML
//!
//! Supported tags, a subset of what docxtpl understands:
//!
//! - `{{ key }}` prints a record value
//! - `{% if key %}`, `{% if not key %}`, `{% else %}`, `{% endif %}`
//! - `{%p ... %}` the same statements, replacing their whole paragraph
//!
//! Word freely splits typed text into several runs, so a tag can arrive as
//! `{{ obje</w:t></w:r><w:r><w:t>to }}`. Markup inside tags is stripped
//! before parsing.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use shared_types::{RecordValue, SubmissionRecord};

use super::errors::RenderError;

lazy_static! {
    /// `{` and `{`/`%` separated by run boundaries
    static ref SPLIT_OPEN: Regex = Regex::new(r"\{(?:<[^>]*>)+([\{%])").unwrap();

    /// `}`/`%` and `}` separated by run boundaries
    static ref SPLIT_CLOSE: Regex = Regex::new(r"([\}%])(?:<[^>]*>)+\}").unwrap();

    /// Any complete tag, possibly with markup inside
    static ref TAG: Regex = Regex::new(r"(?s)\{([\{%])(.*?)([\}%])\}").unwrap();

    static ref MARKUP: Regex = Regex::new(r"<[^>]*>").unwrap();

    static ref PARAGRAPH_TAG: Regex = Regex::new(r"\{%p\s(.*?)%\}").unwrap();

    static ref IDENT: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

const PARAGRAPH_END: &str = "</w:p>";

/// Parsed template node
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    /// Literal XML
    Xml(String),
    Var(String),
    If {
        key: String,
        negated: bool,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

/// An open `{% if %}` while parsing
struct Frame {
    key: String,
    negated: bool,
    then: Vec<Node>,
    otherwise: Option<Vec<Node>>,
}

impl Frame {
    fn body(&mut self) -> &mut Vec<Node> {
        match self.otherwise.as_mut() {
            Some(otherwise) => otherwise,
            None => &mut self.then,
        }
    }

    fn close(self) -> Node {
        Node::If {
            key: self.key,
            negated: self.negated,
            then: self.then,
            otherwise: self.otherwise.unwrap_or_default(),
        }
    }
}

/// One XML part parsed into literal text and tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePart {
    nodes: Vec<Node>,
}

impl TemplatePart {
    pub fn parse(xml: &str) -> Result<Self, RenderError> {
        let normalized = normalize(xml)?;
        let nodes = parse_nodes(&normalized)?;
        Ok(Self { nodes })
    }

    /// Every key the part prints or tests
    pub fn referenced_keys(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        collect_keys(&self.nodes, &mut keys);
        keys
    }

    /// Fill the part; any key the taken branches need must be in `record`
    pub fn render(&self, record: &SubmissionRecord) -> Result<String, RenderError> {
        let mut out = String::new();
        render_nodes(&self.nodes, record, &mut out)?;
        Ok(out)
    }
}

/// Undo run splitting inside tags and hoist paragraph-level tags
fn normalize(xml: &str) -> Result<String, RenderError> {
    let joined = SPLIT_OPEN.replace_all(xml, "{$1");
    let joined = SPLIT_CLOSE.replace_all(&joined, "$1}");
    let cleaned = TAG.replace_all(&joined, |caps: &Captures| {
        format!(
            "{{{}{}{}}}",
            &caps[1],
            MARKUP.replace_all(&caps[2], ""),
            &caps[3]
        )
    });
    hoist_paragraph_tags(&cleaned)
}

/// Replace each paragraph holding a `{%p ... %}` tag by the bare statement
fn hoist_paragraph_tags(xml: &str) -> Result<String, RenderError> {
    let mut out = xml.to_string();

    while let Some(tag) = PARAGRAPH_TAG.find(&out) {
        let statement = tag.as_str()["{%p".len()..tag.as_str().len() - "%}".len()]
            .trim()
            .to_string();

        let start = paragraph_start(&out[..tag.start()]).ok_or_else(|| {
            RenderError::Syntax(format!("'{{%p {} %}}' is not inside a paragraph", statement))
        })?;
        let end = out[tag.end()..]
            .find(PARAGRAPH_END)
            .map(|offset| tag.end() + offset + PARAGRAPH_END.len())
            .ok_or_else(|| {
                RenderError::Syntax(format!("paragraph of '{{%p {} %}}' is never closed", statement))
            })?;

        out.replace_range(start..end, &format!("{{% {} %}}", statement));
    }

    Ok(out)
}

/// Offset of the last `<w:p>` or `<w:p ...>` opening tag
fn paragraph_start(before: &str) -> Option<usize> {
    [before.rfind("<w:p>"), before.rfind("<w:p ")]
        .into_iter()
        .flatten()
        .max()
}

fn parse_nodes(xml: &str) -> Result<Vec<Node>, RenderError> {
    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut cursor = 0;

    for caps in TAG.captures_iter(xml) {
        let (Some(whole), open, inner, close) = (caps.get(0), &caps[1], caps[2].trim(), &caps[3])
        else {
            continue;
        };

        if whole.start() > cursor {
            push(&mut root, &mut stack, Node::Xml(xml[cursor..whole.start()].to_string()));
        }
        cursor = whole.end();

        match (open, close) {
            ("{", "}") => {
                if !IDENT.is_match(inner) {
                    return Err(RenderError::Syntax(format!(
                        "unsupported expression '{{{{ {} }}}}'",
                        inner
                    )));
                }
                push(&mut root, &mut stack, Node::Var(inner.to_string()));
            }
            ("%", "%") => {
                let words: Vec<&str> = inner.split_whitespace().collect();
                match words.as_slice() {
                    ["if", key] => stack.push(open_frame(key, false)?),
                    ["if", "not", key] => stack.push(open_frame(key, true)?),
                    ["else"] => {
                        let frame = stack.last_mut().ok_or_else(|| {
                            RenderError::Syntax("'{% else %}' without '{% if %}'".to_string())
                        })?;
                        if frame.otherwise.is_some() {
                            return Err(RenderError::Syntax(format!(
                                "second '{{% else %}}' in block of '{}'",
                                frame.key
                            )));
                        }
                        frame.otherwise = Some(Vec::new());
                    }
                    ["endif"] => {
                        let frame = stack.pop().ok_or_else(|| {
                            RenderError::Syntax("'{% endif %}' without '{% if %}'".to_string())
                        })?;
                        push(&mut root, &mut stack, frame.close());
                    }
                    _ => {
                        return Err(RenderError::Syntax(format!(
                            "unsupported statement '{{% {} %}}'",
                            inner
                        )))
                    }
                }
            }
            _ => {
                return Err(RenderError::Syntax(format!(
                    "mismatched delimiters in '{}'",
                    whole.as_str()
                )))
            }
        }
    }

    if let Some(frame) = stack.last() {
        return Err(RenderError::Syntax(format!(
            "'{{% if {} %}}' is never closed",
            frame.key
        )));
    }

    if cursor < xml.len() {
        root.push(Node::Xml(xml[cursor..].to_string()));
    }
    Ok(root)
}

fn open_frame(key: &str, negated: bool) -> Result<Frame, RenderError> {
    if !IDENT.is_match(key) {
        return Err(RenderError::Syntax(format!("invalid condition '{}'", key)));
    }
    Ok(Frame {
        key: key.to_string(),
        negated,
        then: Vec::new(),
        otherwise: None,
    })
}

fn push(root: &mut Vec<Node>, stack: &mut [Frame], node: Node) {
    match stack.last_mut() {
        Some(frame) => frame.body().push(node),
        None => root.push(node),
    }
}

fn collect_keys(nodes: &[Node], keys: &mut BTreeSet<String>) {
    for node in nodes {
        match node {
            Node::Xml(_) => {}
            Node::Var(key) => {
                keys.insert(key.clone());
            }
            Node::If {
                key,
                then,
                otherwise,
                ..
            } => {
                keys.insert(key.clone());
                collect_keys(then, keys);
                collect_keys(otherwise, keys);
            }
        }
    }
}

fn lookup<'r>(record: &'r SubmissionRecord, key: &str) -> Result<&'r RecordValue, RenderError> {
    record
        .get(key)
        .ok_or_else(|| RenderError::UndefinedKey(key.to_string()))
}

fn render_nodes(
    nodes: &[Node],
    record: &SubmissionRecord,
    out: &mut String,
) -> Result<(), RenderError> {
    for node in nodes {
        match node {
            Node::Xml(xml) => out.push_str(xml),
            Node::Var(key) => {
                let rendered = render_value(lookup(record, key)?);
                if rendered.contains(LINE_BREAK) {
                    preserve_open_text(out);
                }
                out.push_str(&rendered);
            }
            Node::If {
                key,
                negated,
                then,
                otherwise,
            } => {
                let branch = if lookup(record, key)?.is_truthy() != *negated {
                    then
                } else {
                    otherwise
                };
                render_nodes(branch, record, out)?;
            }
        }
    }
    Ok(())
}

const LINE_BREAK: &str = "</w:t><w:br/><w:t xml:space=\"preserve\">";

/// Escape a value for a `<w:t>` element; line breaks become `<w:br/>`
fn render_value(value: &RecordValue) -> String {
    escape_xml(&value.to_string())
        .replace("\r\n", "\n")
        .replace('\n', LINE_BREAK)
}

/// Keep the spaces of the first line of a multi-line value: the bare
/// `<w:t>` it opens in gets `xml:space="preserve"`
fn preserve_open_text(out: &mut String) {
    const BARE: &str = "<w:t>";
    if let Some(start) = out.rfind(BARE) {
        if !out[start..].contains("</w:t>") {
            out.replace_range(start..start + BARE.len(), "<w:t xml:space=\"preserve\">");
        }
    }
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
