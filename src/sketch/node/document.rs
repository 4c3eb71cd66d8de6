//! Top-level archive members: `document.json`, `user.json` and `meta.json`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{ClassTag, FieldMap, FileReference, Page, class};
use crate::common::new_object_id;
use crate::sketch::{APP_ID, APP_VERSION};

/// The `document.json` entry point: shared resources and the page list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_class", default)]
    class: ClassTag<Document>,
    #[serde(rename = "do_objectID", default = "new_object_id")]
    pub object_id: String,
    #[serde(default)]
    pub color_space: i64,
    #[serde(default)]
    pub current_page_index: i64,
    /// Page references, in display order.
    #[serde(default)]
    pub pages: Vec<FileReference>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(Document => class::DOCUMENT, id: object_id, [
    "_class", "do_objectID", "colorSpace", "currentPageIndex", "pages",
]);

fn shared_container(class: &str) -> Value {
    json!({ "_class": class, "objects": [] })
}

impl Document {
    /// An empty document with the shared-resource containers a consumer
    /// application expects to find.
    pub fn new() -> Self {
        let mut extra = FieldMap::new();
        extra.insert(
            "assets".to_string(),
            json!({
                "_class": "assetCollection",
                "do_objectID": new_object_id(),
                "colorAssets": [],
                "gradientAssets": [],
                "imageCollection": { "_class": "imageCollection", "images": {} },
                "colors": [],
                "gradients": [],
                "images": []
            }),
        );
        extra.insert("foreignLayerStyles".to_string(), json!([]));
        extra.insert("foreignSymbols".to_string(), json!([]));
        extra.insert("foreignTextStyles".to_string(), json!([]));
        extra.insert("layerStyles".to_string(), shared_container("sharedStyleContainer"));
        extra.insert("layerSymbols".to_string(), shared_container("symbolContainer"));
        extra.insert("layerTextStyles".to_string(), shared_container("sharedTextStyleContainer"));
        Self {
            class: ClassTag::new(),
            object_id: new_object_id(),
            color_space: 0,
            current_page_index: 0,
            pages: Vec::new(),
            extra,
        }
    }

    /// Page identifiers named by the page references, in order.
    pub fn page_ids(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().filter_map(FileReference::page_id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// The `user.json` member: per-user view state, keyed by page or document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(User => class::USER, []);

impl User {
    pub fn new() -> Self {
        let mut extra = FieldMap::new();
        extra.insert("document".to_string(), json!({ "pageListHeight": 118 }));
        Self { extra }
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}

/// The `meta.json` member: producing application and a page/artboard index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default)]
    pub commit: String,
    /// `{pageId: {name, artboards: {artboardId: {name}}}}`
    #[serde(default)]
    pub pages_and_artboards: FieldMap,
    #[serde(default = "format_version")]
    pub version: i64,
    #[serde(default)]
    pub fonts: Vec<Value>,
    #[serde(default = "compatibility_version")]
    pub compatibility_version: i64,
    #[serde(default = "app_id")]
    pub app: String,
    #[serde(default)]
    pub autosaved: i64,
    #[serde(default)]
    pub variant: String,
    #[serde(default = "app_version")]
    pub app_version: String,
    #[serde(default)]
    pub build: i64,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(Meta => class::META, [
    "commit", "pagesAndArtboards", "version", "fonts", "compatibilityVersion",
    "app", "autosaved", "variant", "appVersion", "build",
]);

fn format_version() -> i64 {
    121
}

fn compatibility_version() -> i64 {
    99
}

fn app_id() -> String {
    APP_ID.to_string()
}

fn app_version() -> String {
    APP_VERSION.to_string()
}

impl Meta {
    pub fn new() -> Self {
        Self {
            commit: String::new(),
            pages_and_artboards: FieldMap::new(),
            version: format_version(),
            fonts: Vec::new(),
            compatibility_version: compatibility_version(),
            app: app_id(),
            autosaved: 0,
            variant: String::new(),
            app_version: app_version(),
            build: 0,
            extra: FieldMap::new(),
        }
    }

    /// Rebuild the `pagesAndArtboards` index from a set of pages.
    pub fn refresh_pages_and_artboards<'a>(&mut self, pages: impl IntoIterator<Item = &'a Page>) {
        let mut index = FieldMap::new();
        for page in pages {
            let mut artboards = FieldMap::new();
            for artboard in page.artboards() {
                artboards.insert(
                    artboard.props.object_id.clone(),
                    json!({ "name": artboard.props.name }),
                );
            }
            index.insert(
                page.id().to_string(),
                json!({ "name": page.name(), "artboards": artboards }),
            );
        }
        self.pages_and_artboards = index;
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::new()
    }
}
