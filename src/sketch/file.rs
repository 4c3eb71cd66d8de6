//! In-memory form of a whole archive.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::sketch::node::{self, Bitmap, Document, FileReference, Layer, Meta, Node, Page, User};
use crate::sketch::{FILE_EXTENSION, SIDECAR_SUFFIX};

/// Document, bookkeeping members and pages of one archive.
///
/// Pages are keyed by object identifier. Display order comes from the
/// document's page references, see [`SketchFile::ordered_pages`].
#[derive(Debug, Clone, Default)]
pub struct SketchFile {
    /// Archive path this file was read from, if any.
    pub path: Option<PathBuf>,
    pub document: Document,
    pub user: User,
    pub meta: Meta,
    pub pages: BTreeMap<String, Page>,
}

impl SketchFile {
    /// An empty file with fresh document, user and meta members.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page, appending a reference to the document's page list when it
    /// does not have one yet. Returns the page identifier.
    pub fn add_page(&mut self, page: Page) -> String {
        let id = page.id().to_string();
        if !self.document.page_ids().any(|p| p == id) {
            self.document.pages.push(FileReference::page(&id));
        }
        self.pages.insert(id.clone(), page);
        id
    }

    /// Remove a page and its document reference.
    pub fn remove_page(&mut self, id: &str) -> Option<Page> {
        self.document.pages.retain(|r| r.page_id() != Some(id));
        self.pages.remove(id)
    }

    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.get(id)
    }

    pub fn page_mut(&mut self, id: &str) -> Option<&mut Page> {
        self.pages.get_mut(id)
    }

    /// Pages in document order, followed by any pages the document does not
    /// reference, in identifier order.
    pub fn ordered_pages(&self) -> Vec<&Page> {
        let mut ordered = Vec::with_capacity(self.pages.len());
        for id in self.document.page_ids() {
            if let Some(page) = self.pages.get(id) {
                if !ordered.iter().any(|p: &&Page| p.id() == id) {
                    ordered.push(page);
                }
            }
        }
        for page in self.pages.values() {
            if !ordered.iter().any(|p| p.id() == page.id()) {
                ordered.push(page);
            }
        }
        ordered
    }

    /// Every layer of every page, pre-order, pages in document order.
    pub fn walk_layers<'a>(&'a self, visit: &mut dyn FnMut(&'a Page, &'a Layer)) {
        for page in self.ordered_pages() {
            node::walk(&page.layers, &mut |layer| visit(page, layer));
        }
    }

    /// Layers matching a query, in traversal order.
    pub fn find(&self, query: &LayerQuery) -> Vec<&Layer> {
        let mut found = Vec::new();
        self.walk_layers(&mut |_, layer| {
            if query.matches(layer) {
                found.push(layer);
            }
        });
        found
    }

    /// Every bitmap layer, in traversal order.
    pub fn bitmaps(&self) -> Vec<&Bitmap> {
        let mut bitmaps = Vec::new();
        self.walk_layers(&mut |_, layer| {
            if let Some(bitmap) = layer.as_bitmap() {
                bitmaps.push(bitmap);
            }
        });
        bitmaps
    }

    /// `(reference, layer)` for every bitmap layer holding an image
    /// reference, including bitmaps kept untyped.
    pub fn asset_references(&self) -> Vec<(&str, &Layer)> {
        let mut refs = Vec::new();
        self.walk_layers(&mut |_, layer| {
            if let Some(reference) = layer.asset_ref() {
                refs.push((reference, layer));
            }
        });
        refs
    }

    /// Layers by object identifier.
    pub fn layers_by_id(&self) -> BTreeMap<&str, &Layer> {
        let mut index = BTreeMap::new();
        self.walk_layers(&mut |_, layer| {
            if let Some(id) = layer.object_id() {
                index.insert(id, layer);
            }
        });
        index
    }

    /// Extent of all top-level artboards, `(max x + width, max y + height)`.
    pub fn size(&self) -> (f64, f64) {
        let mut width: f64 = 0.0;
        let mut height: f64 = 0.0;
        for page in self.pages.values() {
            for artboard in page.artboards() {
                width = width.max(artboard.props.frame.max_x());
                height = height.max(artboard.props.frame.max_y());
            }
        }
        (width, height)
    }

    /// Sidecar asset directory for this file's path.
    pub fn images_dir(&self) -> Option<PathBuf> {
        self.path.as_deref().map(sidecar_dir)
    }
}

/// Sidecar directory for an archive path.
///
/// `/a/b/design.sketch` maps to `/a/b/design_images`; any other path gets an
/// `_images` directory inside it.
pub fn sidecar_dir(path: &Path) -> PathBuf {
    let is_archive = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(FILE_EXTENSION));
    match (is_archive, path.file_stem().and_then(|s| s.to_str())) {
        (true, Some(stem)) => path.with_file_name(format!("{}{}", stem, SIDECAR_SUFFIX)),
        _ => path.join(SIDECAR_SUFFIX),
    }
}

/// Layer selection by class tag, exact name, or name substring.
///
/// A layer matches when any one of the set criteria holds.
///
/// # Examples
///
/// ```rust
/// use sketchpack::sketch::LayerQuery;
///
/// let query = LayerQuery::new().class("bitmap").pattern("Logo");
/// ```
#[derive(Debug, Clone, Default)]
pub struct LayerQuery {
    pub class: Option<String>,
    pub name: Option<String>,
    pub pattern: Option<String>,
}

impl LayerQuery {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    #[inline]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn matches(&self, layer: &Layer) -> bool {
        self.class.as_deref().is_some_and(|c| layer.class() == c)
            || self.name.as_deref().is_some_and(|n| layer.name() == n)
            || self.pattern.as_deref().is_some_and(|p| layer.name().contains(p))
    }
}
