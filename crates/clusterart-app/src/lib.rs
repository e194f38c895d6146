//! clusterart-app - Layout, coloring and session orchestration for Cluster Art
//!
//! This crate implements the layout and color strategies, the session state
//! with its URL hash codec, and time travel through historical snapshots. State
//! changes follow the TEA (The Elm Architecture) pattern; the Engine runs the
//! update loop and dispatches fetches to a snapshot source.

pub mod actions;
pub mod coloring;
pub mod config;
pub mod engine;
pub mod engine_event;
pub mod frame;
pub mod handler;
pub mod layout;
pub mod message;
pub mod state;
pub mod time_travel;
pub mod url_state;

// Re-export primary types
pub use coloring::{ColorCaches, ColorMode, ColorStrategy, LegendItem};
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use frame::{Frame, SlotView};
pub use handler::{TimepointsFollowUp, UpdateAction, UpdateResult};
pub use layout::{GridPos, GridSize, LayoutMode};
pub use message::Message;
pub use state::SessionState;
pub use url_state::UrlState;
