//! Unicode sparklines for loss curves and learning-rate sweeps

/// Block characters from lowest to highest.
pub const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render `values` as a sparkline of at most `width` characters.
///
/// Longer series are subsampled. The scale spans the finite values only;
/// non-finite values (a diverged loss) render as `·`.
///
/// ```
/// use aprendiz::train::tui::sparkline;
///
/// assert_eq!(sparkline(&[0.0, 1.0, f32::NAN], 10), "▁█·");
/// ```
pub fn sparkline(values: &[f32], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    let sampled: Vec<f32> = if values.len() > width {
        let stride = values.len() as f32 / width as f32;
        (0..width)
            .map(|i| values[((i as f32 * stride) as usize).min(values.len() - 1)])
            .collect()
    } else {
        values.to_vec()
    };

    let finite = sampled.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let range = max - min;

    sampled
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                '·'
            } else if range < f32::EPSILON {
                SPARK_CHARS[4]
            } else {
                let idx = ((v - min) / range * 7.0).round() as usize;
                SPARK_CHARS[idx.min(7)]
            }
        })
        .collect()
}
