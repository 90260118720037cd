#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use pattern_symbols::prelude::{Generation, Pattern, PatternConfig, TypedSpec};
use serde_json::Value;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);
pub const SEED: u64 = 0xC0FFEE;

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// A static, seeded pattern on a 1000x1000 container.
pub fn pattern(symbol: Value) -> Pattern {
    let spec: TypedSpec = serde_json::from_value(symbol).expect("valid symbol");
    let config = PatternConfig::new(spec)
        .with_generation(Generation::Static)
        .with_seed(SEED);
    Pattern::new(config).expect("pattern builds")
}
