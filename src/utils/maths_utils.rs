use argminmax::ArgMinMax;

/// Percentile rank of `value` within an ascending-sorted slice, in [0, 100].
/// Mirrors a bisect-left lookup: rank = count of elements strictly below
/// `value`, scaled by the list length. Zero/negative values and empty lists
/// rank at 0 (no volume means no liquidity standing).
pub fn percentile_rank(sorted: &[f64], value: f64) -> f64 {
    if sorted.is_empty() || value <= 0.0 {
        return 0.0;
    }
    let rank = sorted.partition_point(|&v| v < value);
    (rank as f64 / sorted.len() as f64) * 100.0
}

/// Ordinary-least-squares slope of `values` against their index positions
/// 0..n-1. Returns None for fewer than 2 points (slope undefined) or a
/// degenerate x-spread.
pub fn ols_slope(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = values.iter().sum::<f64>() / n as f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        numerator += dx * (y - mean_y);
        denominator += dx * dx;
    }

    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

pub fn get_max(vec: &[f64]) -> f64 {
    let max_index: usize = vec.argmax();
    vec[max_index]
}

pub fn get_min(vec: &[f64]) -> f64 {
    let min_index: usize = vec.argmin();
    vec[min_index]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn percentile_rank_bisect_semantics() {
        let sorted = vec![10.0, 20.0, 30.0, 40.0];
        assert!(approx_eq(percentile_rank(&sorted, 5.0), 0.0));
        assert!(approx_eq(percentile_rank(&sorted, 25.0), 50.0));
        assert!(approx_eq(percentile_rank(&sorted, 100.0), 100.0));
        // Equal values rank below (strictly-less count)
        assert!(approx_eq(percentile_rank(&sorted, 20.0), 25.0));
    }

    #[test]
    fn percentile_rank_degenerate_inputs() {
        assert_eq!(percentile_rank(&[], 50.0), 0.0);
        assert_eq!(percentile_rank(&[1.0, 2.0], 0.0), 0.0);
    }

    #[test]
    fn ols_slope_signs_match_direction() {
        let rising = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let falling = vec![5.0, 4.0, 3.0, 2.0, 1.0];
        assert!(approx_eq(ols_slope(&rising).unwrap(), 1.0));
        assert!(approx_eq(ols_slope(&falling).unwrap(), -1.0));
    }

    #[test]
    fn ols_slope_needs_two_points() {
        assert!(ols_slope(&[3.0]).is_none());
        assert!(ols_slope(&[]).is_none());
    }

    #[test]
    fn flat_series_has_zero_slope() {
        assert!(approx_eq(ols_slope(&[2.0, 2.0, 2.0]).unwrap(), 0.0));
    }
}
