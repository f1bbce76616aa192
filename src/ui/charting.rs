/// Upper axis bound for a series: the largest value rounded up, never below `min`
pub fn axis_max(values: impl IntoIterator<Item = f64>, min: f64) -> f64 {
    values.into_iter().fold(min, f64::max).ceil()
}

/// X (position) and Y (correct answers) bounds for the line chart
pub fn line_bounds(points: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let x_max = axis_max(points.iter().map(|p| p.0), 2.0);
    let y_max = axis_max(points.iter().map(|p| p.1), 1.0);
    ([1.0, x_max], [0.0, y_max])
}

/// Bounds for the attempted-vs-correct scatter plot, starting at the origin
pub fn scatter_bounds(points: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let x_max = axis_max(points.iter().map(|p| p.0), 1.0);
    let y_max = axis_max(points.iter().map(|p| p.1), 1.0);
    ([0.0, x_max], [0.0, y_max])
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
