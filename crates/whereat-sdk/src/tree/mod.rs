//! Client-side org panel: arena, state machine, async controller and layout

mod arena;
mod controller;
mod panel;
mod state;

pub use arena::{NodeIndex, NodeRole, TreeArena, TreeNode};
pub use controller::TreeController;
pub use panel::{drag_resize, PanelLayout, PanelMessage, DEFAULT_PANEL_WIDTH, MAX_PANEL_WIDTH, MIN_PANEL_WIDTH};
pub use state::{role_badge, FetchTicket, FocusMode, PanelRow, Selection, ToggleOutcome, TreeState};
