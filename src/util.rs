/// Integer accuracy: `round(100 * correct / total)`, 0 when nothing was asked.
pub fn accuracy_percent(correct: u32, total: u32) -> u32 {
    match total {
        positive if positive > 0 => ((correct as f64 / total as f64) * 100.0).round() as u32,
        _ => 0,
    }
}

/// Share of `value` in `[0, max]` as a percentage, clamped to `[0, 100]`.
pub fn percent_of(value: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    ((value / max) * 100.0).clamp(0.0, 100.0)
}

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}
