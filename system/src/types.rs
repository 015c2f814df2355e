use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub type ConnectionId = u32;
pub type StrokeId = String;
pub type UserId = String;

/// Canvas coordinate normalized to `[0, 1]` relative to the canvas size at
/// the time the point was captured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Pixel position on a `width` x `height` canvas to normalized space.
    /// A zero-sized canvas maps everything to the origin.
    pub fn normalize(px: f64, py: f64, width: f64, height: f64) -> Self {
        let x = if width > 0.0 { px / width } else { 0.0 };
        let y = if height > 0.0 { py / height } else { 0.0 };
        Self { x, y }
    }

    pub fn to_canvas(&self, width: f64, height: f64) -> (f64, f64) {
        (self.x * width, self.y * height)
    }
}

/// One continuous pen gesture.
///
/// The relay only reads `strokeId` and `userId`. Everything else a client
/// put in the stroke (`id`, `color`, `size`, `points`, ...) is kept in
/// `body` as received and written back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub stroke_id: StrokeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Stroke {
    pub fn new(
        stroke_id: impl Into<StrokeId>,
        user_id: impl Into<UserId>,
        color: impl Into<String>,
        size: f64,
    ) -> Self {
        let user_id = user_id.into();
        let mut body = Map::new();
        body.insert("id".into(), Value::String(user_id.clone()));
        body.insert("color".into(), Value::String(color.into()));
        body.insert("size".into(), json!(size));
        body.insert("points".into(), Value::Array(Vec::new()));
        Self {
            stroke_id: stroke_id.into(),
            user_id: Some(user_id),
            body,
        }
    }

    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        let points = points.iter().map(point_value).collect();
        self.body.insert("points".into(), Value::Array(points));
        self
    }

    pub fn push_point(&mut self, point: Point) {
        match self.body.get_mut("points") {
            Some(Value::Array(points)) => points.push(point_value(&point)),
            _ => {
                self.body
                    .insert("points".into(), Value::Array(vec![point_value(&point)]));
            }
        }
    }

    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }

    pub fn color(&self) -> Option<&str> {
        self.body.get("color").and_then(Value::as_str)
    }

    pub fn size(&self) -> Option<f64> {
        self.body.get("size").and_then(Value::as_f64)
    }

    pub fn point_count(&self) -> usize {
        self.body
            .get("points")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Points that parse as `{x, y}`. Anything else in the array is skipped.
    pub fn points(&self) -> Vec<Point> {
        self.body
            .get("points")
            .and_then(Value::as_array)
            .map(|points| {
                points
                    .iter()
                    .filter_map(|p| Point::deserialize(p).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn point_value(point: &Point) -> Value {
    json!({ "x": point.x, "y": point.y })
}

/// Chat line. Relayed exactly as the sender wrote it, whatever fields it has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl ChatMessage {
    pub fn new(
        text: impl Into<String>,
        username: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        let mut body = Map::new();
        body.insert("text".into(), Value::String(text.into()));
        body.insert("username".into(), Value::String(username.into()));
        body.insert("timestamp".into(), Value::String(timestamp.into()));
        Self { body }
    }

    pub fn text(&self) -> Option<&str> {
        self.body.get("text").and_then(Value::as_str)
    }

    pub fn username(&self) -> Option<&str> {
        self.body.get("username").and_then(Value::as_str)
    }
}
