use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of [`YoloSplitError`] variants.
///
/// Callers that only care about *why* a split was refused (rather than the
/// exact variant) can match on this instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source root (or a required input) does not exist.
    NotFound,
    /// A caller-supplied parameter is out of range or unusable for this corpus.
    InvalidParameter,
    /// The source tree does not have the expected shape.
    InvalidStructure,
    /// One or more images have no annotation file.
    MissingLabels,
    /// An underlying filesystem or serialization operation failed.
    Io,
}

/// The main error type for yolosplit operations.
#[derive(Debug, Error)]
pub enum YoloSplitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset root not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Invalid train ratio {ratio}: must be between 0 and 1 (exclusive)")]
    InvalidRatio { ratio: f64 },

    #[error(
        "Train ratio {ratio} yields an empty split for {total} pair(s) ({train} train / {val} val); adjust the ratio or add more data"
    )]
    EmptySplit {
        ratio: f64,
        total: usize,
        train: usize,
        val: usize,
    },

    #[error("Invalid dataset layout at {path}: {message}")]
    InvalidLayout { path: PathBuf, message: String },

    #[error("No image files found in {path}")]
    NoImages { path: PathBuf },

    #[error("No matching image/label pairs found in {path}")]
    NoPairs { path: PathBuf },

    #[error("Missing label files for {count} image(s): {preview}")]
    MissingLabels { count: usize, preview: String },

    #[error("{count} image stem(s) are shared by more than one image: {preview}")]
    AmbiguousStems { count: usize, preview: String },

    #[error("Failed to copy {from} to {to}: {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse data.yaml at {path}: {source}")]
    DataYamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("No class names for data.yaml: expected data.yaml or classes.txt in {path}")]
    ClassNamesMissing { path: PathBuf },

    #[error("Invalid capture parameters: {message}")]
    InvalidCaptureParams { message: String },

    #[error("Frame source failed: {message}")]
    FrameSource { message: String },

    #[error("Failed to serialize split report: {0}")]
    ReportSerialize(#[from] serde_json::Error),
}

impl YoloSplitError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidRatio { .. }
            | Self::EmptySplit { .. }
            | Self::InvalidCaptureParams { .. } => ErrorKind::InvalidParameter,
            Self::InvalidLayout { .. }
            | Self::NoImages { .. }
            | Self::NoPairs { .. }
            | Self::AmbiguousStems { .. }
            | Self::ClassNamesMissing { .. }
            | Self::DataYamlParse { .. } => ErrorKind::InvalidStructure,
            Self::MissingLabels { .. } => ErrorKind::MissingLabels,
            Self::Io(_)
            | Self::CopyFailed { .. }
            | Self::FrameSource { .. }
            | Self::ReportSerialize(_) => ErrorKind::Io,
        }
    }
}

/// Render at most `limit` names, followed by `...` when some were left out.
pub(crate) fn preview_names(names: &[String], limit: usize) -> String {
    let shown = names
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if names.len() > limit {
        format!("{shown}...")
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("img{i}.jpg")).collect()
    }

    #[test]
    fn preview_is_capped_with_ellipsis() {
        assert_eq!(
            preview_names(&names(7), 5),
            "img0.jpg, img1.jpg, img2.jpg, img3.jpg, img4.jpg..."
        );
    }

    #[test]
    fn preview_without_overflow_has_no_ellipsis() {
        assert_eq!(preview_names(&names(2), 5), "img0.jpg, img1.jpg");
    }

    #[test]
    fn kinds_cover_the_split_failures() {
        let err = YoloSplitError::EmptySplit {
            ratio: 0.5,
            total: 1,
            train: 0,
            val: 1,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        let err = YoloSplitError::MissingLabels {
            count: 1,
            preview: "a.jpg".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::MissingLabels);
        assert!(err.to_string().contains("1 image(s): a.jpg"));
    }
}
