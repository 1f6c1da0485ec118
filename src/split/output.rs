//! Output tree creation and file copying.

use std::collections::BTreeMap;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;

use super::layout::{DatasetPair, SourceLayout, IMAGES_DIR, LABELS_DIR};
use crate::error::YoloSplitError;

pub const TRAIN_DIR: &str = "train";
pub const VAL_DIR: &str = "val";
pub const OUTPUT_SUFFIX: &str = "_split";

/// The four leaf directories of a split dataset.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub images_train: PathBuf,
    pub images_val: PathBuf,
    pub labels_train: PathBuf,
    pub labels_val: PathBuf,
}

impl OutputLayout {
    /// Output layout for a source root: its sibling named `<name>_split`.
    pub fn for_source(source_root: &Path) -> Result<Self, YoloSplitError> {
        let name = source_root
            .file_name()
            .ok_or_else(|| YoloSplitError::InvalidLayout {
                path: source_root.to_path_buf(),
                message: "dataset root has no directory name to derive the output from"
                    .to_string(),
            })?;

        let mut output_name = name.to_os_string();
        output_name.push(OUTPUT_SUFFIX);
        Ok(Self::at(source_root.with_file_name(output_name)))
    }

    /// Output layout rooted at `root`.
    pub fn at(root: PathBuf) -> Self {
        Self {
            images_train: root.join(IMAGES_DIR).join(TRAIN_DIR),
            images_val: root.join(IMAGES_DIR).join(VAL_DIR),
            labels_train: root.join(LABELS_DIR).join(TRAIN_DIR),
            labels_val: root.join(LABELS_DIR).join(VAL_DIR),
            root,
        }
    }

    /// Create all four directories. Existing directories are reused.
    pub fn create(&self) -> Result<(), YoloSplitError> {
        for dir in [
            &self.images_train,
            &self.images_val,
            &self.labels_train,
            &self.labels_val,
        ] {
            fs::create_dir_all(dir).map_err(YoloSplitError::Io)?;
        }
        Ok(())
    }
}

/// Copy each pair's image into `image_dst` and label into `label_dst`.
///
/// Stops at the first failure; files copied before it stay in place.
pub fn copy_pairs(
    pairs: &[DatasetPair],
    image_dst: &Path,
    label_dst: &Path,
) -> Result<(), YoloSplitError> {
    for pair in pairs {
        copy_into(&pair.image, image_dst)?;
        copy_into(&pair.label, label_dst)?;
    }
    Ok(())
}

fn copy_into(from: &Path, dst_dir: &Path) -> Result<(), YoloSplitError> {
    let to = match from.file_name() {
        Some(name) => dst_dir.join(name),
        None => {
            return Err(YoloSplitError::InvalidLayout {
                path: from.to_path_buf(),
                message: "source file has no file name".to_string(),
            })
        }
    };

    copy_preserving_metadata(from, &to).map_err(|source| YoloSplitError::CopyFailed {
        from: from.to_path_buf(),
        to: to.clone(),
        source,
    })?;
    debug!("copied {} -> {}", from.display(), to.display());
    Ok(())
}

/// Duplicate `from` at `to`, carrying over timestamps and permissions.
pub fn copy_preserving_metadata(from: &Path, to: &Path) -> io::Result<()> {
    let mut reader = File::open(from)?;
    let metadata = reader.metadata()?;

    // A previous run may have left a read-only copy here.
    match fs::remove_file(to) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    let mut writer = File::create(to)?;
    io::copy(&mut reader, &mut writer)?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Err(err) = writer.set_times(times) {
        warn!("could not preserve timestamps on {}: {}", to.display(), err);
    }
    drop(writer);

    // Permissions last, so a read-only source does not block the timestamp update.
    fs::set_permissions(to, metadata.permissions())
}

/// Gaps allowed in a `names` index mapping before it is treated as malformed.
const MAX_UNNAMED_CLASSES: usize = 1024;

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

/// Class names for a generated `data.yaml`.
///
/// Taken from the source's `data.yaml` when present, else `classes.txt`.
pub fn read_class_names(layout: &SourceLayout) -> Result<Vec<String>, YoloSplitError> {
    let data_yaml = layout.root.join("data.yaml");
    if data_yaml.is_file() {
        return read_data_yaml_names(&data_yaml);
    }

    let classes_txt = layout.root.join("classes.txt");
    if classes_txt.is_file() {
        return read_classes_txt(&classes_txt);
    }

    Err(YoloSplitError::ClassNamesMissing {
        path: layout.root.clone(),
    })
}

fn read_data_yaml_names(path: &Path) -> Result<Vec<String>, YoloSplitError> {
    let data = fs::read_to_string(path).map_err(YoloSplitError::Io)?;
    let parsed: DataYaml =
        serde_yaml::from_str(&data).map_err(|source| YoloSplitError::DataYamlParse {
            path: path.to_path_buf(),
            source,
        })?;

    let names = match parsed.names {
        DataYamlNames::Sequence(names) => names,
        DataYamlNames::Mapping(mapping) => {
            let Some(max_index) = mapping.keys().max().copied() else {
                return Ok(Vec::new());
            };
            let len = max_index
                .checked_add(1)
                .filter(|len| *len <= mapping.len().saturating_add(MAX_UNNAMED_CLASSES))
                .ok_or_else(|| YoloSplitError::InvalidLayout {
                    path: path.to_path_buf(),
                    message: format!(
                        "class index {} leaves more than {} classes unnamed",
                        max_index, MAX_UNNAMED_CLASSES
                    ),
                })?;
            let mut names = vec![String::new(); len];
            for (index, name) in mapping {
                names[index] = name;
            }
            for (index, name) in names.iter_mut().enumerate() {
                if name.trim().is_empty() {
                    *name = format!("class_{}", index);
                }
            }
            names
        }
    };

    Ok(names)
}

fn read_classes_txt(path: &Path) -> Result<Vec<String>, YoloSplitError> {
    let data = fs::read_to_string(path).map_err(YoloSplitError::Io)?;
    let mut names = Vec::new();

    for (line_idx, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(YoloSplitError::InvalidLayout {
                path: path.to_path_buf(),
                message: format!("classes.txt line {} is empty", line_idx + 1),
            });
        }
        names.push(trimmed.to_string());
    }

    Ok(names)
}

/// Write a training `data.yaml` pointing at the split directories.
pub fn write_data_yaml(layout: &OutputLayout, names: &[String]) -> Result<(), YoloSplitError> {
    let mut yaml = format!(
        "path: {}\ntrain: {}/{}\nval: {}/{}\nnames:\n",
        yaml_single_quoted(&layout.root.to_string_lossy()),
        IMAGES_DIR,
        TRAIN_DIR,
        IMAGES_DIR,
        VAL_DIR
    );
    for (idx, name) in names.iter().enumerate() {
        yaml.push_str(&format!("  {}: {}\n", idx, yaml_single_quoted(name)));
    }

    let path = layout.root.join("data.yaml");
    fs::write(&path, yaml).map_err(YoloSplitError::Io)
}

fn yaml_single_quoted(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}
