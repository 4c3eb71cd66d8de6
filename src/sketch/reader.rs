//! Archive reader.
//!
//! Reading is all-or-nothing: a missing `document.json`, an unreadable zip
//! index, or a page that is not valid JSON aborts the read with an error.
//! Problems that leave the graph usable are returned as [`Warning`]s
//! alongside the result.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::common::{Error, Result, Warning};
use crate::sketch::assets::{AssetStore, layer_asset_key, reference_key};
use crate::sketch::config::ReadOptions;
use crate::sketch::file::{SketchFile, sidecar_dir};
use crate::sketch::node::{self, Layer, Node, Page};
use crate::sketch::{
    DOCUMENT_JSON, IMAGES_DIR, META_JSON, PAGES_DIR, PREVIEW_NAME, PREVIEWS_DIR, USER_JSON,
};

/// Largest buffer reserved up front for a single member.
const MAX_PREALLOC: usize = 1 << 20;

/// Result of a successful read.
#[derive(Debug, Clone)]
pub struct LoadedArchive {
    pub file: SketchFile,
    pub assets: AssetStore,
    pub warnings: Vec<Warning>,
}

impl LoadedArchive {
    /// References recorded as unresolved during the read.
    pub fn unresolved_references(&self) -> Vec<&str> {
        self.warnings
            .iter()
            .filter_map(|w| match w {
                Warning::UnresolvedAsset { reference, .. } => Some(reference.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Reads `.sketch` archives into a [`SketchFile`] and an [`AssetStore`].
#[derive(Debug, Clone, Default)]
pub struct ArchiveReader {
    options: ReadOptions,
}

impl ArchiveReader {
    pub fn new(options: ReadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Read an archive from a path.
    ///
    /// When sidecar materialization is enabled the asset store is also
    /// written out: into the configured assets directory, alongside what is
    /// already there, or else into the sidecar directory (see
    /// [`sidecar_dir`]), whose previous content is replaced.
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<LoadedArchive> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ArchiveNotFound(path.to_path_buf()));
        }
        debug!("Reading archive {}", path.display());
        let data = fs::read(path)?;
        let mut loaded = self.decode(&data)?;
        loaded.file.path = Some(path.to_path_buf());

        if self.options.materialize_sidecar {
            match &self.options.assets_dir {
                Some(dir) => loaded.assets.save_to_dir(dir)?,
                None => loaded.assets.replace_dir(&sidecar_dir(path))?,
            };
        }
        Ok(loaded)
    }

    /// Read an archive held in memory.
    ///
    /// Assets are materialized only when an explicit assets directory is
    /// configured.
    pub fn read_bytes(&self, data: &[u8]) -> Result<LoadedArchive> {
        let loaded = self.decode(data)?;
        if let (true, Some(dir)) = (self.options.materialize_sidecar, &self.options.assets_dir) {
            loaded.assets.save_to_dir(dir)?;
        }
        Ok(loaded)
    }

    fn decode(&self, data: &[u8]) -> Result<LoadedArchive> {
        let mut zip = ZipArchive::new(Cursor::new(data))
            .map_err(|e| Error::ArchiveCorrupt(format!("not a zip container: {}", e)))?;
        let mut members: Vec<String> = zip.file_names().map(str::to_string).collect();
        members.sort();

        let mut warnings = Vec::new();

        let document = read_member(&mut zip, DOCUMENT_JSON)?.ok_or(Error::MissingDocumentManifest)?;
        let document = parse_required(DOCUMENT_JSON, &document)?;
        let user = parse_optional(&mut zip, USER_JSON, &mut warnings)?.unwrap_or_default();
        let meta = parse_optional(&mut zip, META_JSON, &mut warnings)?.unwrap_or_default();

        let mut file = SketchFile {
            path: None,
            document,
            user,
            meta,
            pages: BTreeMap::new(),
        };

        for member in members.iter().filter(|m| is_page_member(m)) {
            let Some(bytes) = read_member(&mut zip, member)? else {
                continue;
            };
            let page: Page = parse_required(member, &bytes)?;
            let base = &member[PAGES_DIR.len()..member.len() - ".json".len()];
            if base != page.id() {
                warn!("Page member {} holds page {}", member, page.id());
                warnings.push(Warning::PageNameMismatch {
                    member: member.clone(),
                    object_id: page.id().to_string(),
                });
            }
            if file.pages.contains_key(page.id()) {
                return Err(Error::ArchiveCorrupt(format!(
                    "page {} appears in more than one member",
                    page.id()
                )));
            }
            debug!("Read page {} ({} layers)", page.id(), page.layers.len());
            file.pages.insert(page.id().to_string(), page);
        }

        report_untyped_layers(&file, &mut warnings);

        let assets = self.collect_assets(&mut zip, &members, &file, &mut warnings)?;
        debug!(
            "Read {} pages, {} assets, {} warnings",
            file.pages.len(),
            assets.len(),
            warnings.len()
        );
        Ok(LoadedArchive {
            file,
            assets,
            warnings,
        })
    }

    /// Populate the asset store: referenced images first, then previews,
    /// then images no bitmap references.
    fn collect_assets<R: Read + Seek>(
        &self,
        zip: &mut ZipArchive<R>,
        members: &[String],
        file: &SketchFile,
        warnings: &mut Vec<Warning>,
    ) -> Result<AssetStore> {
        let images: BTreeSet<&str> = members
            .iter()
            .map(String::as_str)
            .filter(|m| m.starts_with(IMAGES_DIR) && !m.ends_with('/'))
            .collect();
        // Names a layer-derived key must not take.
        let mut reserved: BTreeSet<&str> = images.iter().copied().map(reference_key).collect();
        reserved.insert(PREVIEW_NAME);

        let mut store = AssetStore::new();
        let mut reported = BTreeSet::new();

        for (reference, layer) in file.asset_references() {
            if store.binding(reference).is_some() {
                continue;
            }
            if !images.contains(reference) {
                if reported.insert((reference, layer.name())) {
                    warn!("Layer {:?} references missing asset {}", layer.name(), reference);
                    warnings.push(Warning::UnresolvedAsset {
                        reference: reference.to_string(),
                        layer: layer.name().to_string(),
                    });
                }
                continue;
            }
            let key = self
                .options
                .name_assets_by_layer
                .then(|| layer_asset_key(layer.name(), reference))
                .flatten()
                .filter(|k| !store.contains(k) && !reserved.contains(k.as_str()))
                .unwrap_or_else(|| reference_key(reference).to_string());
            if let Some(data) = read_member(zip, reference)? {
                debug!("Asset {} stored as {}", reference, key);
                store.insert(key.clone(), data);
                store.bind(reference, key);
            }
        }

        for member in members.iter().filter(|m| m.starts_with(PREVIEWS_DIR) && !m.ends_with('/')) {
            let key = if member[PREVIEWS_DIR.len()..] == *PREVIEW_NAME {
                PREVIEW_NAME.to_string()
            } else {
                member.clone()
            };
            if let Some(data) = read_member(zip, member)? {
                store.insert(key, data);
            }
        }

        for member in images {
            if store.binding(member).is_some() {
                continue;
            }
            let mut key = reference_key(member).to_string();
            if store.contains(&key) {
                key = member.to_string();
            }
            if let Some(data) = read_member(zip, member)? {
                debug!("Unreferenced asset {} stored as {}", member, key);
                store.insert(key, data);
                warnings.push(Warning::OrphanAsset {
                    member: member.to_string(),
                });
            }
        }

        Ok(store)
    }
}

fn is_page_member(name: &str) -> bool {
    name.len() > PAGES_DIR.len() + ".json".len()
        && name.starts_with(PAGES_DIR)
        && name.ends_with(".json")
        && !name[PAGES_DIR.len()..].contains('/')
}

/// Read a member in full, or `None` if the archive has no such member.
fn read_member<R: Read + Seek>(zip: &mut ZipArchive<R>, name: &str) -> Result<Option<Vec<u8>>> {
    let mut entry = match zip.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut data = Vec::with_capacity(prealloc_size(entry.size()));
    entry.read_to_end(&mut data)?;
    Ok(Some(data))
}

/// Initial buffer size for a member whose header declares `declared` bytes.
/// The header is not trusted beyond [`MAX_PREALLOC`].
fn prealloc_size(declared: u64) -> usize {
    usize::try_from(declared).map_or(MAX_PREALLOC, |size| size.min(MAX_PREALLOC))
}

fn parse_required<T: DeserializeOwned>(member: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::corrupt_member(member, e))
}

/// Parse an optional member. Absence yields `None`; a parse failure is
/// recorded as a warning and also yields `None`.
fn parse_optional<T: DeserializeOwned, R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    member: &str,
    warnings: &mut Vec<Warning>,
) -> Result<Option<T>> {
    let Some(bytes) = read_member(zip, member)? else {
        return Ok(None);
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("{} ignored: {}", member, e);
            warnings.push(Warning::DegradedMember {
                member: member.to_string(),
                reason: e.to_string(),
            });
            Ok(None)
        },
    }
}

fn report_untyped_layers(file: &SketchFile, warnings: &mut Vec<Warning>) {
    for page in file.ordered_pages() {
        node::walk(&page.layers, &mut |layer| {
            let Layer::Opaque(opaque) = layer else {
                return;
            };
            let object_id = opaque.object_id().map(str::to_string);
            if opaque.has_typed_class() {
                warnings.push(Warning::DegradedMember {
                    member: format!("{}{}.json", PAGES_DIR, page.id()),
                    reason: format!(
                        "{} layer {} kept untyped",
                        opaque.class(),
                        object_id.as_deref().unwrap_or("<no id>")
                    ),
                });
            } else {
                debug!("Unknown class tag {:?} kept as opaque layer", opaque.class());
                warnings.push(Warning::UnknownClassTag {
                    class: opaque.class().to_string(),
                    object_id,
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::test_support::{ArchiveBuilder, missing_asset_archive, scenario_archive};
    use serde_json::json;

    fn reader() -> ArchiveReader {
        ArchiveReader::new(ReadOptions::new().with_sidecar(false))
    }

    #[test]
    fn test_scenario_archive() {
        let loaded = reader().read_bytes(&scenario_archive()).unwrap();
        assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
        assert_eq!(loaded.file.pages.len(), 1);
        let page = loaded.file.ordered_pages()[0];
        let artboards: Vec<_> = page.artboards().collect();
        assert_eq!(artboards.len(), 1);
        assert_eq!(artboards[0].width(), 576.0);
        assert_eq!(artboards[0].height(), 783.0);
        let classes: Vec<_> = artboards[0].layers().iter().map(|l| l.class()).collect();
        assert_eq!(classes, ["bitmap", "rectangle", "rectangle"]);

        // Layer-named key, bound back to the reference.
        assert_eq!(loaded.assets.binding("images/abc.png"), Some("Photo.png"));
        assert_eq!(loaded.assets.get("Photo.png"), Some(&b"PNG-abc"[..]));
        assert_eq!(loaded.assets.get("preview.png"), Some(&b"PNG-preview"[..]));
    }

    #[test]
    fn test_reference_keys_when_layer_names_disabled() {
        let reader = ArchiveReader::new(
            ReadOptions::new().with_sidecar(false).with_layer_names(false),
        );
        let loaded = reader.read_bytes(&scenario_archive()).unwrap();
        assert_eq!(loaded.assets.binding("images/abc.png"), Some("abc.png"));
    }

    #[test]
    fn test_missing_asset_is_warning() {
        let loaded = reader().read_bytes(&missing_asset_archive()).unwrap();
        assert_eq!(loaded.unresolved_references(), ["images/missing.png"]);
        assert!(loaded.assets.is_empty());
        let bitmap = loaded.file.bitmaps()[0];
        assert_eq!(bitmap.asset_ref(), Some("images/missing.png"));
    }

    #[test]
    fn test_missing_document_manifest() {
        let data = ArchiveBuilder::new().member("meta.json", b"{}").finish();
        assert!(matches!(reader().read_bytes(&data), Err(Error::MissingDocumentManifest)));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            reader().read_bytes(b"definitely not a zip"),
            Err(Error::ArchiveCorrupt(_))
        ));
    }

    #[test]
    fn test_archive_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.sketch");
        assert!(matches!(reader().read(&path), Err(Error::ArchiveNotFound(p)) if p == path));
    }

    #[test]
    fn test_corrupt_page_aborts() {
        let data = ArchiveBuilder::with_document(&[("P1", json!({"_class": "page", "do_objectID": "P1"}))])
            .member("pages/P2.json", b"{ not json")
            .finish();
        assert!(matches!(reader().read_bytes(&data), Err(Error::ArchiveCorrupt(_))));
    }

    #[test]
    fn test_degraded_optional_members() {
        let data = ArchiveBuilder::with_document(&[])
            .member("meta.json", b"[1, 2")
            .member("user.json", b"{\"document\": {\"pageListHeight\": 200}}")
            .finish();
        let loaded = reader().read_bytes(&data).unwrap();
        assert_eq!(loaded.file.meta.app, crate::sketch::APP_ID);
        assert_eq!(loaded.file.user.extra["document"]["pageListHeight"], json!(200));
        assert!(matches!(
            &loaded.warnings[..],
            [Warning::DegradedMember { member, .. }] if member == "meta.json"
        ));
    }

    #[test]
    fn test_pages_keyed_by_identifier() {
        let data = ArchiveBuilder::with_document(&[])
            .member(
                "pages/renamed.json",
                json!({"_class": "page", "do_objectID": "REAL", "name": "P"}).to_string().as_bytes(),
            )
            .finish();
        let loaded = reader().read_bytes(&data).unwrap();
        assert!(loaded.file.pages.contains_key("REAL"));
        assert_eq!(
            loaded.warnings,
            [Warning::PageNameMismatch {
                member: "pages/renamed.json".to_string(),
                object_id: "REAL".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicate_page_identifier() {
        let page = json!({"_class": "page", "do_objectID": "SAME"}).to_string();
        let data = ArchiveBuilder::with_document(&[])
            .member("pages/SAME.json", page.as_bytes())
            .member("pages/copy.json", page.as_bytes())
            .finish();
        assert!(matches!(reader().read_bytes(&data), Err(Error::ArchiveCorrupt(_))));
    }

    #[test]
    fn test_orphans_and_unknown_classes() {
        let page = json!({
            "_class": "page", "do_objectID": "P1",
            "layers": [{"_class": "hotspot", "do_objectID": "H1"}]
        });
        let data = ArchiveBuilder::with_document(&[("P1", page)])
            .member("images/stray.png", b"stray")
            .member("images/preview.png", b"not the preview")
            .member("previews/preview.png", b"preview")
            .member("previews/extra.png", b"extra")
            .finish();
        let loaded = reader().read_bytes(&data).unwrap();
        let keys: Vec<_> = loaded.assets.keys().collect();
        assert_eq!(
            keys,
            ["images/preview.png", "preview.png", "previews/extra.png", "stray.png"]
        );
        assert_eq!(loaded.assets.get("preview.png"), Some(&b"preview"[..]));
        assert!(loaded.warnings.contains(&Warning::UnknownClassTag {
            class: "hotspot".to_string(),
            object_id: Some("H1".to_string()),
        }));
        assert!(loaded.warnings.contains(&Warning::OrphanAsset {
            member: "images/stray.png".to_string()
        }));
    }

    #[test]
    fn test_read_materializes_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("design.sketch");
        std::fs::write(&path, scenario_archive()).unwrap();
        let loaded = ArchiveReader::default().read(&path).unwrap();
        assert_eq!(loaded.file.path.as_deref(), Some(path.as_path()));
        let sidecar = dir.path().join("design_images");
        assert_eq!(std::fs::read(sidecar.join("Photo.png")).unwrap(), b"PNG-abc");
        assert_eq!(std::fs::read(sidecar.join("preview.png")).unwrap(), b"PNG-preview");
    }

    #[test]
    fn test_untyped_bitmap_references_are_collected() {
        let scan = |reference: &str| {
            json!({
                "_class": "page", "do_objectID": "P",
                "layers": [{
                    "_class": "bitmap", "do_objectID": "B1", "name": "Scan",
                    "image": {"_class": "MSJSONOriginalDataReference", "_ref_class": "MSImageData", "_ref": reference}
                }]
            })
        };

        let data = ArchiveBuilder::with_document(&[("P", scan("images/missing.png"))]).finish();
        let loaded = reader().read_bytes(&data).unwrap();
        assert_eq!(loaded.unresolved_references(), ["images/missing.png"]);
        assert!(loaded.warnings.contains(&Warning::DegradedMember {
            member: "pages/P.json".to_string(),
            reason: "bitmap layer B1 kept untyped".to_string(),
        }));

        let data = ArchiveBuilder::with_document(&[("P", scan("images/scan.png"))])
            .member("images/scan.png", b"SCAN")
            .finish();
        let loaded = reader().read_bytes(&data).unwrap();
        assert!(loaded.unresolved_references().is_empty());
        assert_eq!(loaded.assets.binding("images/scan.png"), Some("Scan.png"));
        assert!(!loaded.warnings.iter().any(|w| matches!(w, Warning::OrphanAsset { .. })));
    }

    #[test]
    fn test_reread_replaces_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("design.sketch");
        let sidecar = dir.path().join("design_images");

        let old = ArchiveBuilder::with_document(&[]).member("images/old.png", b"old").finish();
        std::fs::write(&path, old).unwrap();
        ArchiveReader::default().read(&path).unwrap();
        assert!(sidecar.join("old.png").is_file());

        std::fs::write(&path, scenario_archive()).unwrap();
        ArchiveReader::default().read(&path).unwrap();
        assert!(!sidecar.join("old.png").exists());
        assert_eq!(std::fs::read(sidecar.join("Photo.png")).unwrap(), b"PNG-abc");
    }

    #[test]
    fn test_prealloc_is_capped() {
        assert_eq!(prealloc_size(512), 512);
        assert_eq!(prealloc_size(u64::MAX), MAX_PREALLOC);
        assert_eq!(prealloc_size(MAX_PREALLOC as u64 + 1), MAX_PREALLOC);
    }
}
