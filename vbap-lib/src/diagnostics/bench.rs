//! Synthetic benchmarks for gain-table generation.

use rand::Rng;

use crate::error::VbapError;
use crate::geometry::Direction;
use crate::settings::VbapSettings;
use crate::table::generate_gain_table_3d;

/// Configuration parameters for a table benchmark run.
#[derive(Debug, Clone, Copy)]
pub struct TableBenchConfig {
    pub num_loudspeakers: usize,
    pub az_res_deg: f32,
    pub el_res_deg: f32,
    pub spread_deg: f32,
    pub iterations: usize,
}

/// Timing results from a benchmark run.
#[derive(Debug, Clone, Copy)]
pub struct TableBenchResult {
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub num_sources: usize,
    pub num_groups: usize,
    /// Average time per source direction in microseconds.
    pub per_source_us: f64,
}

/// Loudspeakers drawn uniformly over the sphere.
pub fn random_layout(num_loudspeakers: usize) -> Vec<Direction> {
    let mut rng = rand::thread_rng();
    (0..num_loudspeakers)
        .map(|_| {
            let azimuth = rng.gen_range(-180.0_f32..180.0_f32);
            let elevation = rng.gen_range(-1.0_f32..1.0_f32).asin().to_degrees();
            Direction::new(azimuth, elevation)
        })
        .collect()
}

/// Time full-grid table generation for one random layout.
pub fn bench_gain_table(config: TableBenchConfig) -> Result<TableBenchResult, VbapError> {
    let layout = random_layout(config.num_loudspeakers);
    let settings = VbapSettings::default().with_spread(config.spread_deg);
    let mut times: Vec<f64> = Vec::with_capacity(config.iterations.max(1));
    let mut num_sources = 0;
    let mut num_groups = 0;

    for _ in 0..config.iterations.max(1) {
        let start = std::time::Instant::now();
        let table = generate_gain_table_3d(&layout, config.az_res_deg, config.el_res_deg, &settings)?;
        let elapsed = start.elapsed().as_secs_f64() * 1000.0;
        times.push(elapsed);
        if let Some(table) = table {
            num_sources = table.num_sources;
            num_groups = table.num_groups;
        }
    }

    let min_ms = times
        .iter()
        .copied()
        .fold(f64::INFINITY, |a, b| a.min(b));
    let max_ms = times.iter().copied().fold(0.0_f64, |a, b| a.max(b));
    let avg_ms = times.iter().sum::<f64>() / times.len() as f64;
    let per_source_us = if num_sources > 0 {
        avg_ms * 1000.0 / num_sources as f64
    } else {
        0.0
    };

    Ok(TableBenchResult {
        avg_ms,
        min_ms: if min_ms.is_finite() { min_ms } else { 0.0 },
        max_ms,
        num_sources,
        num_groups,
        per_source_us,
    })
}

/// Run a sweep of layout sizes using a shared base configuration.
pub fn bench_gain_table_sweep(
    base: TableBenchConfig,
    layout_sizes: &[usize],
) -> Result<Vec<(usize, TableBenchResult)>, VbapError> {
    let mut results = Vec::new();
    for &num_loudspeakers in layout_sizes {
        let config = TableBenchConfig {
            num_loudspeakers,
            ..base
        };
        results.push((num_loudspeakers, bench_gain_table(config)?));
    }
    Ok(results)
}
