//! Editor services driving the gizmos.

pub mod physics_bodies;
pub mod picking_service;
pub mod transform_controls;

pub use physics_bodies::PhysicsBodies;
pub use picking_service::{PickerEntry, PickerHit, PickingService};
pub use transform_controls::{DragSession, InteractionState, TransformControls};
