#![allow(dead_code)]

use std::path::PathBuf;

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use yolosplit::split::DatasetPair;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// `n` pairs with distinct stems `s0..s{n-1}`.
pub fn make_pairs(n: usize) -> Vec<DatasetPair> {
    (0..n)
        .map(|i| DatasetPair {
            image: PathBuf::from(format!("/corpus/images/s{i}.png")),
            label: PathBuf::from(format!("/corpus/labels/s{i}.txt")),
        })
        .collect()
}

/// Ratios strictly inside (0, 1).
pub fn arb_ratio() -> impl Strategy<Value = f64> {
    (1u32..1000).prop_map(|permille| permille as f64 / 1000.0)
}
