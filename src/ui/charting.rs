use wavequiz::util::percent_of;

/// Per-wave accuracy points: x is the wave number, y the percentage.
pub fn wave_accuracy_points(wave_results: &[u32], questions_per_wave: u32) -> Vec<(f64, f64)> {
    wave_results
        .iter()
        .enumerate()
        .map(|(i, &correct)| {
            (
                (i + 1) as f64,
                percent_of(correct as f64, questions_per_wave as f64),
            )
        })
        .collect()
}

/// X (waves) and Y (accuracy) bounds for the summary chart
pub fn compute_chart_params(points: &[(f64, f64)]) -> (f64, f64) {
    let last_wave = points.last().map_or(1.0, |p| p.0).max(2.0);
    let highest = points.iter().map(|p| p.1).fold(0.0, f64::max);
    (last_wave, highest.max(1.0).round())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
