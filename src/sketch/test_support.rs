//! Zip fixtures for unit tests.

use std::io::{Cursor, Write};

use serde_json::{Value, json};
use zip::write::{SimpleFileOptions, ZipWriter};

/// Builds an in-memory archive member by member.
pub(crate) struct ArchiveBuilder {
    zip_writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl ArchiveBuilder {
    pub(crate) fn new() -> Self {
        Self {
            zip_writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// An archive with `document.json` listing `pages`, and one member per
    /// page.
    pub(crate) fn with_document(pages: &[(&str, Value)]) -> Self {
        let refs: Vec<Value> = pages
            .iter()
            .map(|(id, _)| {
                json!({
                    "_class": "MSJSONFileReference",
                    "_ref_class": "MSImmutablePage",
                    "_ref": format!("pages/{}", id)
                })
            })
            .collect();
        let document = json!({
            "_class": "document",
            "do_objectID": "DOC-0001",
            "assets": {"_class": "assetCollection", "colors": []},
            "colorSpace": 0,
            "currentPageIndex": 0,
            "foreignSymbols": [],
            "layerStyles": {"_class": "sharedStyleContainer", "objects": []},
            "pages": refs
        });
        let mut builder = Self::new().json("document.json", &document);
        for (id, page) in pages {
            builder = builder.json(&format!("pages/{}.json", id), page);
        }
        builder
    }

    pub(crate) fn member(mut self, name: &str, data: &[u8]) -> Self {
        self.zip_writer
            .start_file(name, SimpleFileOptions::default())
            .unwrap();
        self.zip_writer.write_all(data).unwrap();
        self
    }

    pub(crate) fn json(self, name: &str, value: &Value) -> Self {
        self.member(name, value.to_string().as_bytes())
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.zip_writer.finish().unwrap().into_inner()
    }
}

pub(crate) fn rect(x: f64, y: f64, width: f64, height: f64) -> Value {
    json!({
        "_class": "rect",
        "constrainProportions": false,
        "height": height,
        "width": width,
        "x": x,
        "y": y
    })
}

fn bitmap(id: &str, name: &str, reference: &str) -> Value {
    json!({
        "_class": "bitmap",
        "do_objectID": id,
        "name": name,
        "frame": rect(20.0, 20.0, 200.0, 150.0),
        "isVisible": true,
        "image": {
            "_class": "MSJSONFileReference",
            "_ref_class": "MSImageData",
            "_ref": reference
        },
        "clippingMask": "{{0, 0}, {1, 1}}",
        "intendedDPI": 72
    })
}

fn rectangle(id: &str, name: &str, y: f64) -> Value {
    json!({
        "_class": "rectangle",
        "do_objectID": id,
        "name": name,
        "frame": rect(20.0, y, 100.0, 40.0),
        "fixedRadius": 4,
        "isClosed": true,
        "points": []
    })
}

fn page(artboard_layers: Vec<Value>) -> Value {
    json!({
        "_class": "page",
        "do_objectID": "PAGE-0001",
        "name": "Page 1",
        "frame": rect(0.0, 0.0, 0.0, 0.0),
        "layers": [{
            "_class": "artboard",
            "do_objectID": "ARTBOARD-0001",
            "name": "Artboard1",
            "frame": rect(0.0, 0.0, 576.0, 783.0),
            "hasBackgroundColor": false,
            "layers": artboard_layers
        }]
    })
}

/// One page, one 576×783 artboard holding a bitmap and two rectangles, the
/// bitmap's image and a preview.
pub(crate) fn scenario_archive() -> Vec<u8> {
    let layers = vec![
        bitmap("BITMAP-0001", "Photo", "images/abc.png"),
        rectangle("RECT-0001", "Header", 200.0),
        rectangle("RECT-0002", "Footer", 700.0),
    ];
    ArchiveBuilder::with_document(&[("PAGE-0001", page(layers))])
        .json("meta.json", &json!({"app": "com.bohemiancoding.sketch3", "version": 121}))
        .json("user.json", &json!({"document": {"pageListHeight": 118}}))
        .member("images/abc.png", b"PNG-abc")
        .member("previews/preview.png", b"PNG-preview")
        .finish()
}

/// A bitmap whose image member is absent from the archive.
pub(crate) fn missing_asset_archive() -> Vec<u8> {
    let layers = vec![bitmap("BITMAP-0002", "Ghost", "images/missing.png")];
    ArchiveBuilder::with_document(&[("PAGE-0001", page(layers))]).finish()
}
