//! Panel width layout

use tracing::debug;

pub const MIN_PANEL_WIDTH: u32 = 280;
pub const MAX_PANEL_WIDTH: u32 = 600;
pub const DEFAULT_PANEL_WIDTH: u32 = 320;

/// Messages the panel sends up to its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMessage {
    Resize { width: u32 },
}

/// Width of the side panel, owned by the app shell and passed down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    width: u32,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            width: DEFAULT_PANEL_WIDTH,
        }
    }
}

impl PanelLayout {
    pub fn new(width: u32) -> Self {
        Self {
            width: clamp_width(width),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Apply a message; returns `true` when the width changed
    pub fn update(&mut self, message: PanelMessage) -> bool {
        match message {
            PanelMessage::Resize { width } => {
                let width = clamp_width(width);
                if width == self.width {
                    return false;
                }
                debug!("Panel width {} -> {}", self.width, width);
                self.width = width;
                true
            }
        }
    }
}

fn clamp_width(width: u32) -> u32 {
    width.clamp(MIN_PANEL_WIDTH, MAX_PANEL_WIDTH)
}

/// Resize message for a drag handle on the panel's left edge
///
/// The panel is docked right, so its width is the distance from the pointer
/// to the right edge of the viewport.
pub fn drag_resize(viewport_width: u32, pointer_x: u32) -> PanelMessage {
    PanelMessage::Resize {
        width: viewport_width.saturating_sub(pointer_x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_width() {
        assert_eq!(PanelLayout::default().width(), 320);
    }

    #[test]
    fn test_width_clamped() {
        assert_eq!(PanelLayout::new(100).width(), MIN_PANEL_WIDTH);
        assert_eq!(PanelLayout::new(5000).width(), MAX_PANEL_WIDTH);

        let mut layout = PanelLayout::default();
        assert!(layout.update(PanelMessage::Resize { width: 10 }));
        assert_eq!(layout.width(), 280);
        assert!(!layout.update(PanelMessage::Resize { width: 0 }));
    }

    #[test]
    fn test_drag_resize() {
        let mut layout = PanelLayout::default();
        assert!(layout.update(drag_resize(1200, 800)));
        assert_eq!(layout.width(), 400);

        // Pointer past the right edge
        layout.update(drag_resize(1200, 1300));
        assert_eq!(layout.width(), MIN_PANEL_WIDTH);
    }
}
