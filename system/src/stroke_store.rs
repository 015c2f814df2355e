use crate::types::{Stroke, StrokeId};

/// Authoritative canvas state held by the relay.
///
/// `active` is what is currently on the canvas, in arrival order. `history`
/// keeps every stroke ever appended so a redo can recover the full geometry
/// after the stroke has been undone or cleared.
#[derive(Debug, Default)]
pub struct StrokeStore {
    active: Vec<Stroke>,
    history: Vec<Stroke>,
}

impl StrokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to both the active set and history. Returns `false` and
    /// stores nothing if a stroke with the same id is already active.
    pub fn append(&mut self, stroke: Stroke) -> bool {
        if self.is_active(&stroke.stroke_id) {
            return false;
        }
        self.history.push(stroke.clone());
        self.active.push(stroke);
        true
    }

    pub fn remove_active(&mut self, stroke_id: &str) -> Option<Stroke> {
        self.active
            .iter()
            .position(|s| s.stroke_id == stroke_id)
            .map(|pos| self.active.remove(pos))
    }

    /// Removes every active stroke authored by `user_id`, returning how many
    /// were removed.
    pub fn remove_active_where(&mut self, user_id: &str) -> usize {
        let before = self.active.len();
        self.active.retain(|s| !s.is_authored_by(user_id));
        before - self.active.len()
    }

    /// Latest stored geometry for `stroke_id`. A reused id that was drawn
    /// again after an undo resolves to the newer stroke.
    pub fn find_in_history(&self, stroke_id: &str) -> Option<&Stroke> {
        self.history.iter().rev().find(|s| s.stroke_id == stroke_id)
    }

    /// Puts a previously stored stroke back on the canvas. `None` when the id
    /// was never stored or is already active.
    pub fn restore(&mut self, stroke_id: &str) -> Option<Stroke> {
        if self.is_active(stroke_id) {
            return None;
        }
        let stroke = self.find_in_history(stroke_id)?.clone();
        self.active.push(stroke.clone());
        Some(stroke)
    }

    pub fn is_active(&self, stroke_id: &str) -> bool {
        self.active.iter().any(|s| s.stroke_id == stroke_id)
    }

    pub fn snapshot(&self) -> Vec<Stroke> {
        self.active.clone()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.history.is_empty()
    }

    pub fn reset(&mut self) {
        self.active.clear();
        self.history.clear();
    }

    pub fn active_ids(&self) -> Vec<StrokeId> {
        self.active.iter().map(|s| s.stroke_id.clone()).collect()
    }
}
