//! Train/val partitioning of YOLO-style datasets.
//!
//! A source root with `images/` and `labels/` is checked, its images are
//! paired with `labels/<stem>.txt`, the pairs are shuffled and cut at
//! `floor(total * train_ratio)`, and the two subsets are copied into a
//! sibling `<name>_split/{images,labels}/{train,val}` tree. The source is
//! only ever read.
//!
//! Membership is random unless a seed (or an explicit generator) is given.
//! A failure during copying leaves whatever was copied so far on disk.

pub mod layout;
pub mod output;
pub mod report;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::YoloSplitError;
pub use layout::DatasetPair;
use layout::SourceLayout;
pub use output::OutputLayout;
pub use report::{SplitCounts, SplitReport};

/// Default fraction of pairs assigned to training.
pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;

/// Split options.
#[derive(Clone, Debug)]
pub struct SplitOptions {
    pub train_ratio: f64,
    /// Seed for a reproducible split; `None` uses the thread-local RNG.
    pub seed: Option<u64>,
    /// Plan the split and report it without touching the filesystem.
    pub dry_run: bool,
    /// Write a `data.yaml` at the output root.
    pub write_data_yaml: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            train_ratio: DEFAULT_TRAIN_RATIO,
            seed: None,
            dry_run: false,
            write_data_yaml: false,
        }
    }
}

/// Pairs assigned to each subset.
#[derive(Clone, Debug, Default)]
pub struct SplitPlan {
    pub train: Vec<DatasetPair>,
    pub val: Vec<DatasetPair>,
}

impl SplitPlan {
    pub fn total(&self) -> usize {
        self.train.len() + self.val.len()
    }
}

/// Split `source_dir` with an unseeded shuffle and return the output root.
pub fn partition(source_dir: &Path, train_ratio: f64) -> Result<PathBuf, YoloSplitError> {
    let mut rng = rand::rng();
    partition_with_rng(source_dir, train_ratio, &mut rng)
}

/// Split `source_dir` using `rng` for the shuffle and return the output root.
pub fn partition_with_rng<R: Rng + ?Sized>(
    source_dir: &Path,
    train_ratio: f64,
    rng: &mut R,
) -> Result<PathBuf, YoloSplitError> {
    let opts = SplitOptions {
        train_ratio,
        ..Default::default()
    };
    run_split(source_dir, &opts, rng).map(|report| report.output)
}

/// Split `source_dir` according to `opts` and describe the result.
pub fn split_dataset(source_dir: &Path, opts: &SplitOptions) -> Result<SplitReport, YoloSplitError> {
    if let Some(seed) = opts.seed {
        let mut rng = StdRng::seed_from_u64(seed);
        run_split(source_dir, opts, &mut rng)
    } else {
        let mut rng = rand::rng();
        run_split(source_dir, opts, &mut rng)
    }
}

/// Check that a ratio leaves room for both subsets, i.e. lies in `(0, 1)`.
pub fn validate_train_ratio(train_ratio: f64) -> Result<(), YoloSplitError> {
    if 0.0 < train_ratio && train_ratio < 1.0 {
        Ok(())
    } else {
        Err(YoloSplitError::InvalidRatio { ratio: train_ratio })
    }
}

/// Number of pairs assigned to training: `floor(total * train_ratio)`.
pub fn train_count(total: usize, train_ratio: f64) -> usize {
    ((total as f64) * train_ratio).floor() as usize
}

/// Shuffle `pairs` and cut them into train and val subsets.
///
/// Fails if either subset would be empty. Subset sizes depend only on the
/// pair count, so the check runs before the shuffle; the outcome is the
/// same as shuffling first.
pub fn plan_split<R: Rng + ?Sized>(
    mut pairs: Vec<DatasetPair>,
    train_ratio: f64,
    rng: &mut R,
) -> Result<SplitPlan, YoloSplitError> {
    validate_train_ratio(train_ratio)?;

    let total = pairs.len();
    let train = train_count(total, train_ratio);
    if train == 0 || train >= total {
        return Err(YoloSplitError::EmptySplit {
            ratio: train_ratio,
            total,
            train: train.min(total),
            val: total.saturating_sub(train),
        });
    }

    pairs.shuffle(rng);
    let val = pairs.split_off(train);
    Ok(SplitPlan { train: pairs, val })
}

fn run_split<R: Rng + ?Sized>(
    source_dir: &Path,
    opts: &SplitOptions,
    rng: &mut R,
) -> Result<SplitReport, YoloSplitError> {
    let root = canonical_root(source_dir)?;
    validate_train_ratio(opts.train_ratio)?;

    let source = layout::check_layout(&root)?;
    let images = layout::discover_images(&source)?;
    let pairs = layout::pair_images(&source, &images)?;
    info!(
        "found {} labeled image(s) under {}",
        pairs.len(),
        source.images_dir.display()
    );

    let plan = plan_split(pairs, opts.train_ratio, rng)?;
    info!("split: {} train, {} val", plan.train.len(), plan.val.len());

    let out = OutputLayout::for_source(&root)?;
    let class_names = if opts.write_data_yaml {
        Some(output::read_class_names(&source)?)
    } else {
        None
    };

    if !opts.dry_run {
        materialize(&out, &plan)?;
        if let Some(names) = &class_names {
            output::write_data_yaml(&out, names)?;
        }
        info!("wrote split dataset to {}", out.root.display());
    }

    Ok(build_report(&source, out, opts, &plan))
}

fn canonical_root(source_dir: &Path) -> Result<PathBuf, YoloSplitError> {
    fs::canonicalize(source_dir).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => YoloSplitError::SourceNotFound {
            path: source_dir.to_path_buf(),
        },
        _ => YoloSplitError::Io(err),
    })
}

fn materialize(out: &OutputLayout, plan: &SplitPlan) -> Result<(), YoloSplitError> {
    out.create()?;
    output::copy_pairs(&plan.train, &out.images_train, &out.labels_train)?;
    output::copy_pairs(&plan.val, &out.images_val, &out.labels_val)?;
    Ok(())
}

fn build_report(
    source: &SourceLayout,
    out: OutputLayout,
    opts: &SplitOptions,
    plan: &SplitPlan,
) -> SplitReport {
    SplitReport {
        source: source.root.clone(),
        output: out.root,
        train_ratio: opts.train_ratio,
        seed: opts.seed,
        dry_run: opts.dry_run,
        data_yaml: opts.write_data_yaml && !opts.dry_run,
        counts: SplitCounts {
            total: plan.total(),
            train: plan.train.len(),
            val: plan.val.len(),
        },
        train: sorted_names(&plan.train),
        val: sorted_names(&plan.val),
    }
}

fn sorted_names(pairs: &[DatasetPair]) -> Vec<String> {
    let mut names: Vec<String> = pairs.iter().map(DatasetPair::image_name).collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn make_pairs(n: usize) -> Vec<DatasetPair> {
        (0..n)
            .map(|i| DatasetPair {
                image: PathBuf::from(format!("/data/images/img{i}.jpg")),
                label: PathBuf::from(format!("/data/labels/img{i}.txt")),
            })
            .collect()
    }

    #[test]
    fn validate_ratio_rejects_bounds_and_nan() {
        assert!(validate_train_ratio(0.0).is_err());
        assert!(validate_train_ratio(1.0).is_err());
        assert!(validate_train_ratio(-0.2).is_err());
        assert!(validate_train_ratio(f64::NAN).is_err());
        assert!(validate_train_ratio(0.5).is_ok());
    }

    #[test]
    fn train_count_floors() {
        assert_eq!(train_count(10, 0.8), 8);
        assert_eq!(train_count(7, 0.5), 3);
        assert_eq!(train_count(3, 0.3), 0);
    }

    #[test]
    fn plan_ten_pairs_at_point_eight() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan = plan_split(make_pairs(10), 0.8, &mut rng).expect("plan");
        assert_eq!(plan.train.len(), 8);
        assert_eq!(plan.val.len(), 2);

        let train: HashSet<_> = plan.train.iter().map(|p| p.image.clone()).collect();
        assert!(plan.val.iter().all(|p| !train.contains(&p.image)));
    }

    #[test]
    fn plan_is_deterministic_with_seed() {
        let a = plan_split(make_pairs(20), 0.7, &mut StdRng::seed_from_u64(42)).expect("plan");
        let b = plan_split(make_pairs(20), 0.7, &mut StdRng::seed_from_u64(42)).expect("plan");
        assert_eq!(a.train, b.train);
        assert_eq!(a.val, b.val);
    }

    #[test]
    fn plan_rejects_empty_train_or_val() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = plan_split(make_pairs(3), 0.2, &mut rng).unwrap_err();
        assert!(matches!(err, YoloSplitError::EmptySplit { train: 0, val: 3, .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidParameter);

        let err = plan_split(make_pairs(1), 0.99, &mut rng).unwrap_err();
        assert!(matches!(err, YoloSplitError::EmptySplit { train: 0, val: 1, .. }));

        let plan = plan_split(make_pairs(3), 0.99, &mut rng).expect("plan");
        assert_eq!((plan.train.len(), plan.val.len()), (2, 1));
    }

    #[test]
    fn ratio_just_below_one_never_fills_train() {
        let ratio = 1.0 - f64::EPSILON / 2.0;
        assert!(validate_train_ratio(ratio).is_ok());
        for total in [1usize, 2, 3, 10, 1_000_000] {
            assert!(train_count(total, ratio) < total, "total {total}");
        }

        let mut rng = StdRng::seed_from_u64(3);
        let plan = plan_split(make_pairs(3), ratio, &mut rng).expect("plan");
        assert_eq!((plan.train.len(), plan.val.len()), (2, 1));

        let err = plan_split(make_pairs(1), ratio, &mut rng).unwrap_err();
        assert!(matches!(err, YoloSplitError::EmptySplit { train: 0, val: 1, .. }));
    }
}
