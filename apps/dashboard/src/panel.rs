//! Text shown next to the trajectory.

use model::{Session, SessionStats};

pub fn session_label(s: &Session) -> String {
    let model = s.vehicle_model.as_deref().filter(|m| !m.is_empty()).unwrap_or("Session");
    match s.created_at.as_deref() {
        Some(at) => format!("{} - {}", model, at),
        None => model.to_string(),
    }
}

/// `(label, value)` rows of the statistics panel.
pub fn stats_rows(st: &SessionStats) -> Vec<(&'static str, String)> {
    let b = &st.bounds;
    vec![
        ("Data points", st.total_points.to_string()),
        ("Duration", format!("{:.2}s", st.duration_ms as f64 / 1000.0)),
        ("UWB coverage", format!("{:.1}%", st.uwb_coverage)),
        ("IMU coverage", format!("{:.1}%", st.imu_coverage)),
        ("Steering coverage", format!("{:.1}%", st.steering_coverage)),
        (
            "Bounds",
            format!("X: [{:.2}, {:.2}]\nY: [{:.2}, {:.2}]", b.min_x, b.max_x, b.min_y, b.max_y),
        ),
    ]
}

pub fn format_stats(st: &SessionStats) -> String {
    let mut out = String::new();
    for (label, value) in stats_rows(st) {
        let mut lines = value.lines();
        out.push_str(&format!("{:<18} {}\n", label, lines.next().unwrap_or("")));
        for more in lines {
            out.push_str(&format!("{:<18} {}\n", "", more));
        }
    }
    out
}
