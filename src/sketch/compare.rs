//! Structural comparison of node graphs.
//!
//! The comparator walks two graphs in parallel and records every point where
//! they differ. It never fails; an empty result means the graphs are
//! structurally equivalent under the configured ignore list.

use std::fmt;

use serde_json::Value;

use crate::sketch::config::CompareOptions;
use crate::sketch::file::SketchFile;
use crate::sketch::node::{CLASS_KEY, LAYERS_KEY, Layer, Node, Page};

/// How two graphs differ at one location.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscrepancyKind {
    /// Nodes with different class tags.
    ClassMismatch { left: String, right: String },
    /// Values of different JSON types.
    TypeMismatch {
        left: &'static str,
        right: &'static str,
    },
    /// A key present on the left only.
    MissingKey(String),
    /// A node key or page present on the right only.
    ExtraKey(String),
    /// Sequences of different lengths.
    LengthMismatch { left: usize, right: usize },
    /// Scalars that differ. Numbers compare strictly, so `1` and `1.0` differ.
    ValueMismatch { left: Value, right: Value },
}

/// One difference, located by a dotted path such as
/// `pages[ID].layers[0].frame.width`.
#[derive(Debug, Clone, PartialEq)]
pub struct Discrepancy {
    pub path: String,
    pub kind: DiscrepancyKind,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiscrepancyKind::ClassMismatch { left, right } => {
                write!(f, "{}: class {} != {}", self.path, left, right)
            },
            DiscrepancyKind::TypeMismatch { left, right } => {
                write!(f, "{}: {} != {}", self.path, left, right)
            },
            DiscrepancyKind::MissingKey(key) => write!(f, "{}: missing key {}", self.path, key),
            DiscrepancyKind::ExtraKey(key) => write!(f, "{}: unexpected key {}", self.path, key),
            DiscrepancyKind::LengthMismatch { left, right } => {
                write!(f, "{}: length {} != {}", self.path, left, right)
            },
            DiscrepancyKind::ValueMismatch { left, right } => {
                write!(f, "{}: {} != {}", self.path, left, right)
            },
        }
    }
}

/// Recursive structural comparator.
///
/// # Examples
///
/// ```rust
/// use sketchpack::sketch::{Comparator, CompareOptions, SketchFile};
///
/// let file = SketchFile::new();
/// let comparator = Comparator::new(CompareOptions::default());
/// assert!(comparator.compare_files(&file, &file.clone()).is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    options: CompareOptions,
}

impl Comparator {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Compare two whole files: document, user and meta members, then pages.
    ///
    /// Pages pair by identifier, or by document order when identifiers are
    /// ignored.
    pub fn compare_files(&self, left: &SketchFile, right: &SketchFile) -> Vec<Discrepancy> {
        let mut out = Vec::new();
        self.walk_nodes(&left.document, &right.document, "document", &mut out);
        self.walk_nodes(&left.user, &right.user, "user", &mut out);
        self.walk_nodes(&left.meta, &right.meta, "meta", &mut out);

        if self.options.ignores_object_ids() {
            let (lp, rp) = (left.ordered_pages(), right.ordered_pages());
            if lp.len() != rp.len() {
                push(&mut out, "pages", DiscrepancyKind::LengthMismatch {
                    left: lp.len(),
                    right: rp.len(),
                });
                return out;
            }
            for (i, (l, r)) in lp.iter().zip(&rp).enumerate() {
                self.walk_nodes(*l, *r, &format!("pages[{}]", i), &mut out);
            }
        } else {
            for page in left.ordered_pages() {
                match right.pages.get(page.id()) {
                    Some(other) => {
                        self.walk_nodes(page, other, &page_path(page), &mut out)
                    },
                    None => push(&mut out, "pages", DiscrepancyKind::MissingKey(page.id().to_string())),
                }
            }
            for page in right.ordered_pages() {
                if !left.pages.contains_key(page.id()) {
                    push(&mut out, "pages", DiscrepancyKind::ExtraKey(page.id().to_string()));
                }
            }
        }
        out
    }

    /// Compare two nodes and everything below them.
    pub fn compare_nodes(&self, left: &dyn Node, right: &dyn Node) -> Vec<Discrepancy> {
        let mut out = Vec::new();
        self.walk_nodes(left, right, left.class(), &mut out);
        out
    }

    /// Compare two JSON values.
    pub fn compare_values(&self, left: &Value, right: &Value) -> Vec<Discrepancy> {
        let mut out = Vec::new();
        self.walk_values(left, right, "$", &mut out);
        out
    }

    fn walk_nodes(&self, left: &dyn Node, right: &dyn Node, path: &str, out: &mut Vec<Discrepancy>) {
        if left.class() != right.class() {
            push(out, path, DiscrepancyKind::ClassMismatch {
                left: left.class().to_string(),
                right: right.class().to_string(),
            });
            return;
        }

        let left_fields = left.fields();
        let right_fields = right.fields();

        for &key in left.declared_fields() {
            if key == CLASS_KEY || key == LAYERS_KEY || self.options.is_ignored(key) {
                continue;
            }
            match (left_fields.get(key), right_fields.get(key)) {
                (Some(l), Some(r)) => self.walk_values(l, r, &field_path(path, key), out),
                (Some(_), None) => push(out, path, DiscrepancyKind::MissingKey(key.to_string())),
                (None, Some(_)) => push(out, path, DiscrepancyKind::ExtraKey(key.to_string())),
                (None, None) => {},
            }
        }

        for (key, l) in left.unknown_fields() {
            if self.options.is_ignored(key) {
                continue;
            }
            match right_fields.get(key) {
                Some(r) => self.walk_values(l, r, &field_path(path, key), out),
                None => push(out, path, DiscrepancyKind::MissingKey(key.clone())),
            }
        }
        for key in right.unknown_fields().keys() {
            if !self.options.is_ignored(key) && !left_fields.contains_key(key) {
                push(out, path, DiscrepancyKind::ExtraKey(key.clone()));
            }
        }

        let (lc, rc) = (left.children(), right.children());
        if lc.len() != rc.len() {
            push(out, &field_path(path, LAYERS_KEY), DiscrepancyKind::LengthMismatch {
                left: lc.len(),
                right: rc.len(),
            });
            return;
        }
        for (i, (l, r)) in lc.iter().zip(rc).enumerate() {
            self.walk_nodes(l, r, &format!("{}.{}[{}]", path, LAYERS_KEY, i), out);
        }
    }

    fn walk_values(&self, left: &Value, right: &Value, path: &str, out: &mut Vec<Discrepancy>) {
        match (left, right) {
            (Value::Object(l), Value::Object(r)) => {
                for (key, lv) in l {
                    if self.options.is_ignored(key) {
                        continue;
                    }
                    match r.get(key) {
                        Some(rv) => self.walk_values(lv, rv, &field_path(path, key), out),
                        None => push(out, path, DiscrepancyKind::MissingKey(key.clone())),
                    }
                }
            },
            (Value::Array(l), Value::Array(r)) => {
                if l.len() != r.len() {
                    push(out, path, DiscrepancyKind::LengthMismatch {
                        left: l.len(),
                        right: r.len(),
                    });
                    return;
                }
                for (i, (lv, rv)) in l.iter().zip(r).enumerate() {
                    self.walk_values(lv, rv, &format!("{}[{}]", path, i), out);
                }
            },
            (l, r) if type_name(l) != type_name(r) => {
                push(out, path, DiscrepancyKind::TypeMismatch {
                    left: type_name(l),
                    right: type_name(r),
                });
            },
            (l, r) => {
                if l != r {
                    push(out, path, DiscrepancyKind::ValueMismatch {
                        left: l.clone(),
                        right: r.clone(),
                    });
                }
            },
        }
    }
}

fn push(out: &mut Vec<Discrepancy>, path: &str, kind: DiscrepancyKind) {
    out.push(Discrepancy {
        path: path.to_string(),
        kind,
    });
}

fn field_path(path: &str, key: &str) -> String {
    format!("{}.{}", path, key)
}

fn page_path(page: &Page) -> String {
    format!("pages[{}]", page.id())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Indented outline of a file: one line per page and layer, children
/// indented by a tab.
pub fn pretty_print(file: &SketchFile) -> String {
    let mut out = String::new();
    for page in file.ordered_pages() {
        out.push_str(&format!("page {:?} {}\n", page.name(), page.id()));
        for layer in &page.layers {
            outline(layer, 1, &mut out);
        }
    }
    out
}

fn outline(layer: &Layer, depth: usize, out: &mut String) {
    out.push_str(&"\t".repeat(depth));
    out.push_str(&format!("{} {:?}", layer.class(), layer.name()));
    if let Some(frame) = layer.frame() {
        out.push_str(&format!(
            " {}x{} at {},{}",
            frame.width, frame.height, frame.x, frame.y
        ));
    }
    if let Some(reference) = layer.as_bitmap().and_then(|b| b.asset_ref()) {
        out.push_str(&format!(" -> {}", reference));
    }
    out.push('\n');
    for child in layer.children() {
        outline(child, depth + 1, out);
    }
}
