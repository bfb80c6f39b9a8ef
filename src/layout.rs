//! Available vertical space for the conversation and trace panes.

/// Vertical space reserved for the header, input row, and footer, in pixels.
pub const RESERVED_MARGIN: u32 = 200;

/// Returns the space left for the panes once the reserved margin is taken.
///
/// Viewports shorter than the margin leave no space.
pub fn available_height(viewport_height: u32) -> u32 {
    viewport_height.saturating_sub(RESERVED_MARGIN)
}

/// Tracks the latest available height as the viewport is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportHeight {
    available: u32,
}

impl ViewportHeight {
    /// Starts tracking from the initial viewport height.
    pub fn new(viewport_height: u32) -> Self {
        Self {
            available: available_height(viewport_height),
        }
    }

    /// Recomputes the available height after a resize and returns it.
    pub fn resize(&mut self, viewport_height: u32) -> u32 {
        self.available = available_height(viewport_height);
        self.available
    }

    /// The latest available height.
    pub fn available(&self) -> u32 {
        self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtracts_margin() {
        assert_eq!(available_height(900), 700);
        assert_eq!(available_height(200), 0);
        assert_eq!(available_height(50), 0);
    }

    #[test]
    fn resize_updates_latest() {
        let mut height = ViewportHeight::new(1080);
        assert_eq!(height.available(), 880);
        assert_eq!(height.resize(720), 520);
        assert_eq!(height.available(), 520);
    }
}
