use model::{Bounds, TrajectoryPoint};
use tracing::warn;

/// Picks the extent used to scale a trajectory.
///
/// Supplied bounds win when present. Without them the extrema of the
/// points are used. A trajectory without a single finite point yields
/// `None`: there is nothing to draw, and that is not an error.
pub fn resolve_bounds(points: &[TrajectoryPoint], supplied: Option<&Bounds>) -> Option<Bounds> {
    if !points.iter().any(TrajectoryPoint::is_finite) {
        return None;
    }
    match supplied {
        Some(b) if b.is_ordered() => Some(*b),
        Some(b) => {
            warn!(?b, "supplied bounds are not finite and ordered, using point extrema");
            Bounds::of_points(points)
        }
        None => Bounds::of_points(points),
    }
}
