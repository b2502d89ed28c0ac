use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct TrajectoryPoint {
    pub x: f64,
    pub y: f64,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steering_angle: Option<f64>,
}

impl TrajectoryPoint {
    pub fn new(x: f64, y: f64, timestamp: i64) -> Self {
        Self { x, y, timestamp, steering_angle: None }
    }

    /// Both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Min/max over the finite points. `None` when there are none.
    pub fn of_points(points: &[TrajectoryPoint]) -> Option<Self> {
        let mut finite = points.iter().filter(|p| p.is_finite());
        let first = finite.next()?;
        let mut b = Bounds { min_x: first.x, max_x: first.x, min_y: first.y, max_y: first.y };
        for p in finite {
            if p.x < b.min_x { b.min_x = p.x; }
            if p.x > b.max_x { b.max_x = p.x; }
            if p.y < b.min_y { b.min_y = p.y; }
            if p.y > b.max_y { b.max_y = p.y; }
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// All four edges finite and `min <= max` on both axes.
    pub fn is_ordered(&self) -> bool {
        [self.min_x, self.max_x, self.min_y, self.max_y].iter().all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SessionStats {
    pub session_id: String,
    pub total_points: u64,
    pub duration_ms: i64,
    pub uwb_coverage: f64,
    pub imu_coverage: f64,
    pub steering_coverage: f64,
    pub bounds: Bounds,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub vehicle_model: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub padding: f64,
}

impl Default for Surface {
    fn default() -> Self {
        Self { width: 600, height: 600, padding: 40.0 }
    }
}

impl Surface {
    pub fn drawable_width(&self) -> f64 {
        (self.width as f64 - 2.0 * self.padding).max(0.0)
    }

    pub fn drawable_height(&self) -> f64 {
        (self.height as f64 - 2.0 * self.padding).max(0.0)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

// auth payloads

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_model: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct UserMetadata {
    #[serde(default)]
    pub vehicle_model: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct AuthUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_metadata: Option<UserMetadata>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct AuthResponse {
    pub user: AuthUser,
    #[serde(default)]
    pub session: Option<TokenPair>,
    #[serde(default)]
    pub message: String,
}
