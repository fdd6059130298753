//! # Scene Editor Backend
//!
//! Transform gizmo subsystem for the VR training scene editor. It builds the
//! translate/rotate/scale manipulators, hit-tests pointer input against their
//! picker volumes and turns 2D pointer movement into constrained 3D object
//! transforms.
//!
//! The renderer only reads from this crate: handle meshes, material state and
//! container transforms. Everything that mutates the scene goes through
//! [`TransformControls`].

pub mod camera;
pub mod config;
pub mod error;
pub mod events;
pub mod gizmo;
pub mod input;
pub mod scene;
pub mod services;

pub use camera::ViewportCamera;
pub use config::GizmoSettings;
pub use error::{ConfigError, GizmoError};
pub use events::{CursorStyle, GizmoEvent, GizmoEventBus};
pub use gizmo::types::{
    GizmoAxis, GizmoColor, GizmoPlane, GizmoTarget, HandleRole, HandleTag, TransformMode,
    TransformSpace,
};
pub use gizmo::{GizmoVariant, TransformGizmo};
pub use input::{InputEvent, PointerButton, PointerEvent, PointerSource};
pub use scene::{ObjectId, ObjectKind, SceneDb, SceneObjectSnapshot, TransformSnapshot};
pub use services::{DragSession, InteractionState, PhysicsBodies, PickingService, TransformControls};
