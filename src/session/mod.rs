// Session module.
// Event plumbing, the refresh scheduler, snapshot persistence, and the
// controller state machine that ties them together.

pub mod controller;
pub mod events;
pub mod scheduler;
pub mod snapshot;

pub use controller::{
    Command, FocusArea, Keybindings, LoadingState, Overlay, SessionController, Toast, ToastLevel,
};
pub use events::{AppEvent, EventHandler};
pub use scheduler::RefreshScheduler;
pub use snapshot::{Snapshot, SnapshotStore, ViewMode};
