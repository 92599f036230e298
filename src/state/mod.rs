//! Shared client-side stores.

pub mod entity;
pub mod panels;
pub mod toast;

pub use entity::{EntityState, EntityStore};
pub use panels::{PanelId, PanelLayout, PanelPosition, PanelSize, PanelStore, Viewport};
pub use toast::{Toast, ToastAction, ToastDuration, ToastKind, ToastQueue, Toaster};
