use crate::message::{ClientMessage, RelayMessage};
use crate::types::{Point, Stroke, UserId};

/// What a single client keeps of the shared canvas.
///
/// Undo and redo only ever touch strokes this client authored; remote
/// strokes arrive through [`CanvasReplica::apply`].
pub struct CanvasReplica {
    user_id: UserId,
    strokes: Vec<Stroke>,
    current: Option<Stroke>,
    undo_stack: Vec<Stroke>,
    redo_stack: Vec<Stroke>,
}

impl CanvasReplica {
    pub fn new() -> Self {
        Self::with_user_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_user_id(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            strokes: Vec::new(),
            current: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    pub fn begin_stroke(&mut self, color: impl Into<String>, size: f64) {
        let stroke_id = uuid::Uuid::new_v4().to_string();
        self.current = Some(Stroke::new(stroke_id, self.user_id.clone(), color, size));
    }

    pub fn extend_stroke(&mut self, point: Point) {
        if let Some(stroke) = self.current.as_mut() {
            stroke.push_point(point);
        }
    }

    /// Commits the stroke in progress. A stroke without points is discarded.
    pub fn finish_stroke(&mut self) -> Option<ClientMessage> {
        let stroke = self.current.take()?;
        if stroke.point_count() == 0 {
            return None;
        }
        self.strokes.push(stroke.clone());
        self.undo_stack.push(stroke.clone());
        self.redo_stack.clear();
        Some(ClientMessage::Drawing { stroke })
    }

    pub fn undo(&mut self) -> Option<ClientMessage> {
        let stroke = self.undo_stack.pop()?;
        self.strokes.retain(|s| s.stroke_id != stroke.stroke_id);
        let stroke_id = stroke.stroke_id.clone();
        self.redo_stack.push(stroke);
        Some(ClientMessage::Undo { stroke_id })
    }

    pub fn redo(&mut self) -> Option<ClientMessage> {
        let stroke = self.redo_stack.pop()?;
        let stroke_id = stroke.stroke_id.clone();
        self.push_unique(stroke.clone());
        self.undo_stack.push(stroke);
        Some(ClientMessage::Redo { stroke_id })
    }

    /// Removes this client's strokes. Other authors' strokes stay, matching
    /// what peers do when they receive the `clear`.
    pub fn clear_mine(&mut self) -> ClientMessage {
        let user_id = self.user_id.clone();
        self.strokes.retain(|s| !s.is_authored_by(&user_id));
        self.undo_stack.clear();
        self.redo_stack.clear();
        ClientMessage::Clear { user_id }
    }

    pub fn apply(&mut self, message: RelayMessage) {
        match message {
            RelayMessage::Init { strokes } => self.strokes = strokes,
            RelayMessage::Drawing { stroke } | RelayMessage::Redo { stroke, .. } => {
                self.push_unique(stroke)
            }
            RelayMessage::Undo { stroke_id } => self.strokes.retain(|s| s.stroke_id != stroke_id),
            RelayMessage::Clear { user_id } => self.strokes.retain(|s| !s.is_authored_by(&user_id)),
            RelayMessage::UsersCount { .. } | RelayMessage::Chat(_) => {}
        }
    }

    fn push_unique(&mut self, stroke: Stroke) {
        if !self.strokes.iter().any(|s| s.stroke_id == stroke.stroke_id) {
            self.strokes.push(stroke);
        }
    }
}

impl Default for CanvasReplica {
    fn default() -> Self {
        Self::new()
    }
}
