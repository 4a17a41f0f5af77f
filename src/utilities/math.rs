/// Returns `n` logarithmically spaced points between `lo` and `hi`, both inclusive.
///
/// Both bounds must be positive; the points are `10^(log10(lo) + i * step)`, with the
/// endpoints reproduced exactly.
pub fn logrange(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let start = lo.log10();
            let step = (hi.log10() - start) / (n - 1) as f64;
            let mut points: Vec<f64> = (0..n)
                .map(|i| 10f64.powf(start + step * i as f64))
                .collect();

            // Pin the endpoints so truncation never lands just below an integer bound.
            points[0] = lo;
            points[n - 1] = hi;
            points
        }
    }
}

/// Same as [`logrange`], with every point truncated towards zero.
pub fn logrange_u64(lo: f64, hi: f64, n: usize) -> Vec<u64> {
    logrange(lo, hi, n).into_iter().map(|x| x as u64).collect()
}
