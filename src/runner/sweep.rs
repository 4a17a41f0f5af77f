use crate::config::RunnerConfig;
use crate::utilities::math::logrange_u64;

/// Arguments of one benchmark invocation: `<program> <nmax> <repeats> <count>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchParams {
    /// Keys are drawn uniformly from `0..nmax`
    pub nmax: u64,
    /// Operations per measurement
    pub repeats: u64,
    /// Measurements per operation
    pub count: u64,
}

/// Key ranges to sweep, log-spaced between the configured bounds.
pub fn nmax_values(config: &RunnerConfig) -> Vec<u64> {
    logrange_u64(
        config.nmax_min as f64,
        config.nmax_max as f64,
        config.nmax_points,
    )
}

/// Measurement counts tried for `nmax`.
///
/// After `count` measurements the map holds roughly `count * repeats` draws from `nmax`
/// keys, so sweeping `count` around `nmax / repeats` moves the lookups across the point
/// where hits and misses are equally likely.
pub fn count_values(nmax: u64, repeats: u64, points: usize) -> Vec<u64> {
    let centre = nmax as f64 / repeats.max(1) as f64;
    logrange_u64(centre * 0.5, centre * 2.0, points)
        .into_iter()
        .map(|count| count.max(1))
        .collect()
}

/// Every `(nmax, repeats, count)` triple of the sweep, in execution order.
pub fn sweep(config: &RunnerConfig) -> Vec<BenchParams> {
    nmax_values(config)
        .into_iter()
        .flat_map(|nmax| {
            count_values(nmax, config.repeats, config.count_points)
                .into_iter()
                .map(move |count| BenchParams {
                    nmax,
                    repeats: config.repeats,
                    count,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sweep_covers_configured_range() {
        let config = RunnerConfig::default();
        let nmaxs = nmax_values(&config);
        assert_eq!(nmaxs.len(), 100);
        assert_eq!(nmaxs[0], 16);
        assert_eq!(nmaxs[99], 500_000);
        assert!(nmaxs.windows(2).all(|w| w[0] <= w[1]));

        let params = sweep(&config);
        assert_eq!(params.len(), 400);
        assert!(params.iter().all(|p| p.repeats == 3 && p.count >= 1));
    }

    #[test]
    fn counts_straddle_half_occupancy() {
        let counts = count_values(3000, 3, 4);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts[0], 500);
        assert_eq!(counts[3], 2000);
        assert!(counts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn counts_never_drop_to_zero() {
        assert!(count_values(1, 3, 4).iter().all(|&count| count == 1));
    }
}
