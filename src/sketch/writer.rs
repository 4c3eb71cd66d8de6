//! Archive writer.
//!
//! Every member is planned before any output is produced, so a missing
//! asset or an invalid page identifier fails the write without touching the
//! target path. The archive itself is assembled in a temporary file beside
//! the target and renamed into place once complete.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Seek, Write};
use std::path::{Component, Path};

use log::{debug, warn};
use serde::Serialize;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::common::{Error, Result};
use crate::sketch::assets::AssetStore;
use crate::sketch::config::WriteOptions;
use crate::sketch::file::SketchFile;
use crate::sketch::{
    DOCUMENT_JSON, IMAGES_DIR, META_JSON, PAGES_DIR, PREVIEW_NAME, PREVIEWS_DIR, USER_JSON,
};

/// What a write produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Archive members, in the order they were written.
    pub members: Vec<String>,
    /// Asset store key to the member its content was written to.
    pub asset_keys: BTreeMap<String, String>,
}

/// A member ready to be written.
struct PlannedMember<'a> {
    name: String,
    data: Cow<'a, [u8]>,
    compress: bool,
}

/// Thin layer over [`ZipWriter`] that records member names.
struct PackageWriter<W: Write + Seek> {
    zip_writer: ZipWriter<W>,
    members: Vec<String>,
}

impl<W: Write + Seek> PackageWriter<W> {
    fn new(writer: W) -> Self {
        Self {
            zip_writer: ZipWriter::new(writer),
            members: Vec::new(),
        }
    }

    fn add_member(&mut self, name: &str, content: &[u8], compress: bool) -> Result<()> {
        let method = if compress {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        };
        let options = SimpleFileOptions::default().compression_method(method);
        self.zip_writer.start_file(name, options)?;
        self.zip_writer.write_all(content)?;
        self.members.push(name.to_string());
        Ok(())
    }

    fn finish(self) -> Result<(W, Vec<String>)> {
        let writer = self.zip_writer.finish()?;
        Ok((writer, self.members))
    }
}

/// Writes a [`SketchFile`] and its [`AssetStore`] as a `.sketch` archive.
#[derive(Debug, Clone, Default)]
pub struct ArchiveWriter {
    options: WriteOptions,
}

impl ArchiveWriter {
    pub fn new(options: WriteOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Write an archive to `path`, replacing any existing file only once the
    /// new archive is complete.
    pub fn write<P: AsRef<Path>>(
        &self,
        path: P,
        file: &SketchFile,
        assets: &AssetStore,
    ) -> Result<WriteReport> {
        let path = path.as_ref();
        let (members, mut report) = self.plan(file, assets)?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::Builder::new()
            .prefix(".sketchpack")
            .suffix(".tmp")
            .tempfile_in(parent)?;

        let mut package = PackageWriter::new(tmp.as_file_mut());
        for member in &members {
            package.add_member(&member.name, &member.data, member.compress)?;
        }
        let (_, written) = package.finish()?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;

        report.members = written;
        debug!("Wrote {} members to {}", report.members.len(), path.display());
        Ok(report)
    }

    /// Build the archive in memory.
    pub fn to_bytes(&self, file: &SketchFile, assets: &AssetStore) -> Result<(Vec<u8>, WriteReport)> {
        let (members, mut report) = self.plan(file, assets)?;
        let mut package = PackageWriter::new(Cursor::new(Vec::new()));
        for member in &members {
            package.add_member(&member.name, &member.data, member.compress)?;
        }
        let (cursor, written) = package.finish()?;
        report.members = written;
        Ok((cursor.into_inner(), report))
    }

    /// Write using the assets in the file's sidecar directory.
    pub fn write_from_sidecar<P: AsRef<Path>>(&self, path: P, file: &SketchFile) -> Result<WriteReport> {
        let dir = file
            .images_dir()
            .ok_or_else(|| Error::Other("file has no source path to locate its sidecar".to_string()))?;
        let assets = AssetStore::load_dir(&dir)?;
        self.write(path, file, &assets)
    }

    fn plan<'a>(
        &self,
        file: &SketchFile,
        assets: &'a AssetStore,
    ) -> Result<(Vec<PlannedMember<'a>>, WriteReport)> {
        let mut members = vec![
            self.json_member(DOCUMENT_JSON.to_string(), &file.document)?,
            self.json_member(USER_JSON.to_string(), &file.user)?,
            self.json_member(META_JSON.to_string(), &file.meta)?,
        ];

        for page in file.ordered_pages() {
            validate_page_id(page.id())?;
            if !file.document.page_ids().any(|id| id == page.id()) {
                warn!("Page {} is not listed in document.json", page.id());
            }
            members.push(self.json_member(format!("{}{}.json", PAGES_DIR, page.id()), page)?);
        }

        let mut report = WriteReport::default();
        let mut planned: BTreeSet<String> = members.iter().map(|m| m.name.clone()).collect();
        let mut claimed = BTreeSet::new();

        for (reference, layer) in file.asset_references() {
            if planned.contains(reference) {
                continue;
            }
            if !is_safe_member(reference) {
                return Err(Error::InvalidNode(format!(
                    "bitmap \"{}\" has an unusable image reference {:?}",
                    layer.name(),
                    reference
                )));
            }
            let (key, data) = assets.resolve(reference, layer.name()).ok_or_else(|| {
                Error::MissingAssetContent {
                    reference: reference.to_string(),
                    layer: layer.name().to_string(),
                }
            })?;
            claimed.insert(key);
            report
                .asset_keys
                .entry(key.to_string())
                .or_insert_with(|| reference.to_string());
            planned.insert(reference.to_string());
            members.push(PlannedMember {
                name: reference.to_string(),
                data: Cow::Borrowed(data),
                compress: self.options.compress_images,
            });
        }

        for (key, data) in assets.iter() {
            if claimed.contains(key) {
                continue;
            }
            let name = unclaimed_member(key);
            if !is_safe_member(&name) || planned.contains(&name) {
                warn!("Asset {} not written: member {} unavailable", key, name);
                continue;
            }
            debug!("Unreferenced asset {} written to {}", key, name);
            report.asset_keys.insert(key.to_string(), name.clone());
            planned.insert(name.clone());
            members.push(PlannedMember {
                name,
                data: Cow::Borrowed(data),
                compress: self.options.compress_images,
            });
        }

        Ok((members, report))
    }

    fn json_member<'a, T: Serialize>(&self, name: String, value: &T) -> Result<PlannedMember<'a>> {
        let data = if self.options.pretty_json {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Ok(PlannedMember {
            name,
            data: Cow::Owned(data),
            compress: true,
        })
    }
}

/// Member path for a store entry no bitmap claimed.
fn unclaimed_member(key: &str) -> String {
    if key == PREVIEW_NAME {
        format!("{}{}", PREVIEWS_DIR, PREVIEW_NAME)
    } else if key.starts_with(IMAGES_DIR) || key.starts_with(PREVIEWS_DIR) {
        key.to_string()
    } else {
        format!("{}{}", IMAGES_DIR, key)
    }
}

/// Page identifiers become member names, so they must be a single path
/// segment.
fn validate_page_id(id: &str) -> Result<()> {
    if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
        return Err(Error::InvalidNode(format!(
            "page identifier {:?} cannot name an archive member",
            id
        )));
    }
    Ok(())
}

fn is_safe_member(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('\\')
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::node::{Artboard, Bitmap, Layer, Page, Rect};

    fn file_with_bitmap(reference: &str) -> SketchFile {
        let mut file = SketchFile::new();
        let mut page = Page::new("Page 1");
        let mut artboard = Artboard::new("Board", Rect::new(0.0, 0.0, 100.0, 100.0));
        artboard.push_layer(Bitmap::new("Photo", Rect::new(0.0, 0.0, 10.0, 10.0), reference));
        page.push_layer(artboard);
        file.add_page(page);
        file
    }

    #[test]
    fn test_member_layout() {
        let file = file_with_bitmap("images/abc.png");
        let mut assets = AssetStore::new();
        assets.insert("abc.png", b"png".to_vec());
        assets.insert("preview.png", b"preview".to_vec());
        assets.insert("extra.jpg", b"jpg".to_vec());
        assets.insert("previews/thumb.png", b"thumb".to_vec());

        let (_, report) = ArchiveWriter::default().to_bytes(&file, &assets).unwrap();
        let page_id = file.document.page_ids().next().unwrap().to_string();
        assert_eq!(
            report.members,
            [
                "document.json".to_string(),
                "user.json".to_string(),
                "meta.json".to_string(),
                format!("pages/{}.json", page_id),
                "images/abc.png".to_string(),
                "images/extra.jpg".to_string(),
                "previews/preview.png".to_string(),
                "previews/thumb.png".to_string(),
            ]
        );
        assert_eq!(report.asset_keys["abc.png"], "images/abc.png");
        assert_eq!(report.asset_keys["preview.png"], "previews/preview.png");
        assert_eq!(report.asset_keys.len(), assets.len());
    }

    #[test]
    fn test_resolution_prefers_binding() {
        let file = file_with_bitmap("images/abc.png");
        let mut assets = AssetStore::new();
        assets.insert("Photo.png", b"by layer".to_vec());
        assets.insert("custom", b"bound".to_vec());
        assets.bind("images/abc.png", "custom");

        let (data, report) = ArchiveWriter::default().to_bytes(&file, &assets).unwrap();
        assert_eq!(report.asset_keys["custom"], "images/abc.png");
        // The layer-named entry is unclaimed and lands beside it.
        assert_eq!(report.asset_keys["Photo.png"], "images/Photo.png");

        let mut zip = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        let mut content = Vec::new();
        std::io::Read::read_to_end(&mut zip.by_name("images/abc.png").unwrap(), &mut content)
            .unwrap();
        assert_eq!(content, b"bound");
    }

    #[test]
    fn test_missing_asset_is_fatal() {
        let file = file_with_bitmap("images/missing.png");
        let err = ArchiveWriter::default()
            .to_bytes(&file, &AssetStore::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAssetContent { ref reference, ref layer }
                if reference == "images/missing.png" && layer == "Photo"
        ));
    }

    fn file_with_untyped_bitmap(reference: &str) -> SketchFile {
        let layer: Layer = serde_json::from_value(serde_json::json!({
            "_class": "bitmap",
            "do_objectID": "B1",
            "name": "Scan",
            "image": {"_class": "MSJSONOriginalDataReference", "_ref_class": "MSImageData", "_ref": reference}
        }))
        .unwrap();
        assert!(matches!(layer, Layer::Opaque(_)));
        let mut file = SketchFile::new();
        let mut page = Page::new("Page 1");
        page.push_layer(layer);
        file.add_page(page);
        file
    }

    #[test]
    fn test_untyped_bitmap_needs_its_asset() {
        let file = file_with_untyped_bitmap("images/scan.png");
        let err = ArchiveWriter::default()
            .to_bytes(&file, &AssetStore::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAssetContent { ref reference, ref layer }
                if reference == "images/scan.png" && layer == "Scan"
        ));

        let mut assets = AssetStore::new();
        assets.insert("Scan.png", b"scan".to_vec());
        let (_, report) = ArchiveWriter::default().to_bytes(&file, &assets).unwrap();
        assert_eq!(report.asset_keys["Scan.png"], "images/scan.png");
    }

    #[test]
    fn test_shared_layer_name_keeps_images_apart() {
        let mut file = file_with_bitmap("images/a.png");
        let page_id = file.document.page_ids().next().unwrap().to_string();
        file.page_mut(&page_id).unwrap().push_layer(Bitmap::new(
            "Photo",
            Rect::new(0.0, 0.0, 10.0, 10.0),
            "images/b.png",
        ));
        // "Photo.png" is bound to the first image; the second bitmap must
        // not take it through its layer name.
        let mut assets = AssetStore::new();
        assets.insert("Photo.png", b"AAAA".to_vec());
        assets.insert("b.png", b"BBBB".to_vec());
        assets.bind("images/a.png", "Photo.png");

        let (data, report) = ArchiveWriter::default().to_bytes(&file, &assets).unwrap();
        assert_eq!(report.asset_keys["Photo.png"], "images/a.png");
        assert_eq!(report.asset_keys["b.png"], "images/b.png");

        let mut zip = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        for (member, expected) in [("images/a.png", b"AAAA"), ("images/b.png", b"BBBB")] {
            let mut content = Vec::new();
            std::io::Read::read_to_end(&mut zip.by_name(member).unwrap(), &mut content).unwrap();
            assert_eq!(content, expected);
        }
    }

    #[test]
    fn test_failed_write_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.sketch");
        std::fs::write(&target, b"previous").unwrap();

        let file = file_with_bitmap("images/missing.png");
        assert!(ArchiveWriter::default().write(&target, &file, &AssetStore::new()).is_err());
        assert_eq!(std::fs::read(&target).unwrap(), b"previous");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_invalid_page_identifier() {
        let mut file = SketchFile::new();
        let mut page = Page::new("Bad");
        page.props.object_id = "../escape".to_string();
        file.add_page(page);
        assert!(matches!(
            ArchiveWriter::default().to_bytes(&file, &AssetStore::new()),
            Err(Error::InvalidNode(_))
        ));
    }

    #[test]
    fn test_write_from_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = file_with_bitmap("images/abc.png");
        file.path = Some(dir.path().join("design.sketch"));
        let sidecar = dir.path().join("design_images");
        std::fs::create_dir_all(&sidecar).unwrap();
        std::fs::write(sidecar.join("Photo.png"), b"png").unwrap();

        let target = dir.path().join("copy.sketch");
        let report = ArchiveWriter::default().write_from_sidecar(&target, &file).unwrap();
        assert_eq!(report.asset_keys["Photo.png"], "images/abc.png");
        assert!(target.is_file());

        file.path = None;
        assert!(matches!(
            ArchiveWriter::default().write_from_sidecar(&target, &file),
            Err(Error::Other(_))
        ));
    }

    #[test]
    fn test_pretty_json_option() {
        let writer = ArchiveWriter::new(WriteOptions::new().with_pretty_json(true));
        let (data, _) = writer.to_bytes(&SketchFile::new(), &AssetStore::new()).unwrap();
        let mut zip = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        let mut text = String::new();
        std::io::Read::read_to_string(&mut zip.by_name("document.json").unwrap(), &mut text)
            .unwrap();
        assert!(text.contains("\n  \""));
    }
}
