//! Source layout checks, image discovery and image/label pairing.
//!
//! A source dataset is a directory with `images/` and `labels/` children.
//! Images may be nested arbitrarily deep under `images/`; labels are looked up
//! flat as `labels/<stem>.txt`.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{preview_names, YoloSplitError};

pub const IMAGES_DIR: &str = "images";
pub const LABELS_DIR: &str = "labels";
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];
pub const LABEL_EXTENSION: &str = "txt";

/// How many offending names an error message lists before eliding the rest.
pub const PREVIEW_LIMIT: usize = 5;

/// A validated source dataset root.
#[derive(Clone, Debug)]
pub struct SourceLayout {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
}

/// An image and the annotation file that shares its stem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetPair {
    pub image: PathBuf,
    pub label: PathBuf,
}

impl DatasetPair {
    /// The image file name, as it will appear in the output tree.
    pub fn image_name(&self) -> String {
        file_name_lossy(&self.image)
    }
}

/// Check that `root` has `images/` and `labels/` directories.
///
/// `root` is expected to be canonical already.
pub fn check_layout(root: &Path) -> Result<SourceLayout, YoloSplitError> {
    if !root.is_dir() {
        return Err(YoloSplitError::InvalidLayout {
            path: root.to_path_buf(),
            message: "dataset root must be a directory".to_string(),
        });
    }

    let images_dir = root.join(IMAGES_DIR);
    if !images_dir.is_dir() {
        return Err(YoloSplitError::InvalidLayout {
            path: images_dir,
            message: "missing images/ directory".to_string(),
        });
    }

    let labels_dir = root.join(LABELS_DIR);
    if !labels_dir.is_dir() {
        return Err(YoloSplitError::InvalidLayout {
            path: labels_dir,
            message: "missing labels/ directory".to_string(),
        });
    }

    Ok(SourceLayout {
        root: root.to_path_buf(),
        images_dir,
        labels_dir,
    })
}

/// Recursively collect image files under `images/`, sorted by relative path.
pub fn discover_images(layout: &SourceLayout) -> Result<Vec<PathBuf>, YoloSplitError> {
    let mut image_files = collect_files_with_extensions(&layout.images_dir, &IMAGE_EXTENSIONS)?;
    image_files.sort_by_cached_key(|image_path| rel_string(&layout.images_dir, image_path));

    if image_files.is_empty() {
        return Err(YoloSplitError::NoImages {
            path: layout.images_dir.clone(),
        });
    }

    Ok(image_files)
}

/// Pair every image with `labels/<stem>.txt`.
///
/// Pairing is all-or-nothing: a single unlabeled image fails the whole call.
/// Images sharing a stem are rejected too, since they would share one label
/// file and could land in different subsets.
pub fn pair_images(
    layout: &SourceLayout,
    image_files: &[PathBuf],
) -> Result<Vec<DatasetPair>, YoloSplitError> {
    let mut pairs = Vec::with_capacity(image_files.len());
    let mut missing = Vec::new();

    for image_path in image_files {
        let label_path = label_path_for(&layout.labels_dir, image_path);
        if label_path.is_file() {
            pairs.push(DatasetPair {
                image: image_path.clone(),
                label: label_path,
            });
        } else {
            missing.push(file_name_lossy(image_path));
        }
    }

    if !missing.is_empty() {
        return Err(YoloSplitError::MissingLabels {
            count: missing.len(),
            preview: preview_names(&missing, PREVIEW_LIMIT),
        });
    }

    check_unique_stems(layout, &pairs)?;

    if pairs.is_empty() {
        return Err(YoloSplitError::NoPairs {
            path: layout.root.clone(),
        });
    }

    Ok(pairs)
}

fn check_unique_stems(layout: &SourceLayout, pairs: &[DatasetPair]) -> Result<(), YoloSplitError> {
    let mut by_label: BTreeMap<&Path, Vec<String>> = BTreeMap::new();
    for pair in pairs {
        by_label
            .entry(pair.label.as_path())
            .or_default()
            .push(rel_string(&layout.images_dir, &pair.image));
    }

    let collisions: Vec<String> = by_label
        .into_values()
        .filter(|images| images.len() > 1)
        .map(|images| images.join(" & "))
        .collect();

    if collisions.is_empty() {
        Ok(())
    } else {
        Err(YoloSplitError::AmbiguousStems {
            count: collisions.len(),
            preview: preview_names(&collisions, PREVIEW_LIMIT),
        })
    }
}

fn label_path_for(labels_dir: &Path, image_path: &Path) -> PathBuf {
    let mut label_name: OsString = image_path
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_default();
    label_name.push(".");
    label_name.push(LABEL_EXTENSION);
    labels_dir.join(label_name)
}

fn collect_files_with_extensions(
    root: &Path,
    extensions: &[&str],
) -> Result<Vec<PathBuf>, YoloSplitError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| YoloSplitError::InvalidLayout {
            path: root.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok(files)
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

pub(crate) fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

pub(crate) fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
