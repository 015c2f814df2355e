/// Live session count. The relay keeps no per-session identity beyond the
/// transport handle, so the count is all the membership state there is.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    count: usize,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self) -> usize {
        self.count += 1;
        self.count
    }

    /// Saturates at zero so a stray leave can't underflow the count.
    pub fn leave(&mut self) -> usize {
        self.count = self.count.saturating_sub(1);
        self.count
    }

    pub fn count(&self) -> usize {
        self.count
    }
}
