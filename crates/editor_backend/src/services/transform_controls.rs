//! Transform controls: pointer input to gizmo manipulation.
//!
//! Handles:
//! - Hover detection (ray casts against the live gizmo's pickers)
//! - Press, drag and release of a handle
//! - Mode, space and size changes
//! - Keeping the object, its rigid body and the gizmo in sync while dragging

use std::sync::Arc;

use glam::{Quat, Vec2, Vec3};

use super::{PhysicsBodies, PickerEntry, PickerHit, PickingService};
use crate::camera::ViewportCamera;
use crate::config::GizmoSettings;
use crate::error::{ConfigError, GizmoError};
use crate::events::{CursorStyle, GizmoEvent, GizmoEventBus};
use crate::gizmo::geometry::{GeometryBuilder, ProceduralGeometry};
use crate::gizmo::layer::{ensure_overlay_layer, LayerId, LayerStack};
use crate::gizmo::manipulation;
use crate::gizmo::types::{GizmoPlane, GizmoTarget, TransformMode, TransformSpace};
use crate::gizmo::{ActivePlane, GizmoSet, GizmoVariant};
use crate::input::{InputEvent, PointerEvent};
use crate::scene::{ObjectId, SceneDb, TransformSnapshot};

/// Plane patches whose normal is closer than this to perpendicular with the
/// eye vector cannot be picked.
const PLANE_EDGE_ON_THRESHOLD: f32 = 0.2;

/// State of gizmo interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Hovering(GizmoTarget),
    Dragging(GizmoTarget),
}

/// Stores state for the active drag. Lives from press to release.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub object: ObjectId,
    pub target: GizmoTarget,
    pub mode: TransformMode,
    pub space: TransformSpace,
    pub before: TransformSnapshot,
    /// Where the press ray met the active plane.
    pub offset_start_point: Vec3,
    /// Unit vector from the gizmo towards the camera at press time.
    pub eye: Vec3,
    /// Gizmo container rotation at press time.
    pub frame: Quat,
    /// Gizmo center at press time.
    pub center: Vec3,
}

/// Controller for gizmo interactions
pub struct TransformControls {
    settings: GizmoSettings,
    mode: TransformMode,
    space: TransformSpace,
    size: f32,
    translation_snap: Option<f32>,
    rotation_snap: Option<f32>,

    gizmos: GizmoSet,
    layer: LayerId,
    scene: SceneDb,
    camera: ViewportCamera,
    picking: Arc<PickingService>,
    physics: Option<Arc<PhysicsBodies>>,
    events: GizmoEventBus,

    state: InteractionState,
    drag: Option<DragSession>,
    selected: Option<ObjectId>,
    cursor: CursorStyle,
}

impl TransformControls {
    pub fn new(
        scene: SceneDb,
        camera: ViewportCamera,
        layers: &mut LayerStack,
        settings: GizmoSettings,
    ) -> Result<Self, GizmoError> {
        Self::with_geometry(scene, camera, layers, settings, &ProceduralGeometry::default())
    }

    pub fn with_geometry(
        scene: SceneDb,
        mut camera: ViewportCamera,
        layers: &mut LayerStack,
        settings: GizmoSettings,
        geometry: &dyn GeometryBuilder,
    ) -> Result<Self, GizmoError> {
        settings.validate()?;
        let layer = ensure_overlay_layer(layers, &mut camera, &settings.layer_name)?;

        let picking = Arc::new(PickingService::new());
        let mut gizmos = GizmoSet::new(geometry, layer, &settings);
        for gizmo in gizmos.iter_mut() {
            gizmo.core_mut().register_pickers(&picking);
        }

        let mode = settings.initial_mode;
        let space = match mode {
            TransformMode::Scale => TransformSpace::Local,
            _ => settings.initial_space,
        };

        tracing::info!(
            "[CONTROLS] ✓ Transform controls ready: {} pickers, mode {}",
            picking.len(),
            mode.name()
        );

        let mut controls = Self {
            size: settings.size,
            translation_snap: settings.translation_snap,
            rotation_snap: settings.rotation_snap,
            settings,
            mode,
            space,
            gizmos,
            layer,
            scene,
            camera,
            picking,
            physics: None,
            events: GizmoEventBus::new(),
            state: InteractionState::Idle,
            drag: None,
            selected: None,
            cursor: CursorStyle::Default,
        };
        controls.update();
        Ok(controls)
    }

    /// Keep rigid bodies of dragged objects in sync.
    pub fn with_physics(mut self, physics: Arc<PhysicsBodies>) -> Self {
        self.physics = Some(physics);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn space(&self) -> TransformSpace {
        self.space
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn translation_snap(&self) -> Option<f32> {
        self.translation_snap
    }

    pub fn rotation_snap(&self) -> Option<f32> {
        self.rotation_snap
    }

    pub fn settings(&self) -> &GizmoSettings {
        &self.settings
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn selected(&self) -> Option<&ObjectId> {
        self.selected.as_ref()
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn scene(&self) -> &SceneDb {
        &self.scene
    }

    pub fn camera(&self) -> &ViewportCamera {
        &self.camera
    }

    pub fn picking(&self) -> &Arc<PickingService> {
        &self.picking
    }

    pub fn gizmo(&self, mode: TransformMode) -> &dyn GizmoVariant {
        self.gizmos.get(mode)
    }

    /// Gizmo of the current mode.
    pub fn active_gizmo(&self) -> &dyn GizmoVariant {
        self.gizmos.get(self.mode)
    }

    /// Current screen scale of the live gizmo.
    pub fn gizmo_scale(&self) -> f32 {
        self.active_gizmo().core().container().scale
    }

    pub fn subscribe(&self) -> flume::Receiver<GizmoEvent> {
        self.events.subscribe()
    }

    // ── Properties ────────────────────────────────────────────────────────

    /// Switch the live gizmo. Scale always works in local space.
    pub fn set_mode(&mut self, mode: TransformMode) {
        if self.drag.is_some() {
            self.release();
        }
        self.mode = mode;
        if mode == TransformMode::Scale {
            self.space = TransformSpace::Local;
        }
        self.refresh_visibility();
        self.update();
        tracing::debug!("[CONTROLS] Mode set to {}", mode.name());
        self.emit_changed();
    }

    /// Set the reference frame. Ignored in scale mode, which stays local.
    pub fn set_space(&mut self, space: TransformSpace) {
        self.space = match self.mode {
            TransformMode::Scale => TransformSpace::Local,
            _ => space,
        };
        self.update();
        self.emit_changed();
    }

    pub fn set_size(&mut self, size: f32) -> Result<(), GizmoError> {
        if !(size.is_finite() && size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "size",
                reason: format!("must be a positive number, got {size}"),
            }
            .into());
        }
        self.size = size;
        self.update();
        self.emit_changed();
        Ok(())
    }

    pub fn set_translation_snap(&mut self, step: Option<f32>) {
        self.translation_snap = step.filter(|s| *s > 0.0);
    }

    pub fn set_rotation_snap(&mut self, step: Option<f32>) {
        self.rotation_snap = step.filter(|s| *s > 0.0);
    }

    /// Replace the camera, e.g. after the host's orbit controller moved it.
    pub fn set_camera(&mut self, mut camera: ViewportCamera) {
        camera.add_layer(self.layer);
        self.camera = camera;
        self.update();
    }

    pub fn look_from(&mut self, position: Vec3, target: Vec3) {
        self.camera.look_at(position, target);
        self.update();
    }

    /// Canvas resize.
    pub fn set_viewport(&mut self, viewport: Vec2) -> Result<(), GizmoError> {
        self.camera.set_viewport(viewport)?;
        self.update();
        Ok(())
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// Attach to `id`, or detach for `None`, unknown ids and gizmo geometry.
    pub fn select(&mut self, id: Option<ObjectId>) {
        if self.drag.is_some() {
            self.release();
        }

        let Some(id) = id else {
            self.detach();
            return;
        };

        match self.scene.get_entry(&id) {
            Some(entry) if entry.kind.is_selectable() => {
                let position = entry.get_position();
                self.attach(id, position);
            }
            Some(_) => {
                tracing::debug!("[CONTROLS] Ignoring selection of gizmo geometry {}", id);
                self.detach();
            }
            None => {
                tracing::debug!("[CONTROLS] Ignoring selection of unknown object {}", id);
                self.detach();
            }
        }
    }

    fn attach(&mut self, id: ObjectId, position: Vec3) {
        for gizmo in self.gizmos.iter_mut() {
            gizmo.core_mut().set_selected_object(Some((id.clone(), position)));
        }
        self.scene.select_object(Some(id.clone()));
        tracing::info!("[CONTROLS] Attached to {}", id);
        self.selected = Some(id);
        self.refresh_visibility();
        self.update();
    }

    fn detach(&mut self) {
        if let Some(id) = self.selected.take() {
            tracing::info!("[CONTROLS] Detached from {}", id);
            self.scene.select_object(None);
        }
        for gizmo in self.gizmos.iter_mut() {
            gizmo.core_mut().set_selected_object(None);
        }
        self.state = InteractionState::Idle;
        self.refresh_visibility();
        self.set_cursor(CursorStyle::Default);
        self.update();
    }

    fn refresh_visibility(&mut self) {
        let live = self.selected.as_ref().map(|_| self.mode);
        for gizmo in self.gizmos.iter_mut() {
            let visible = live == Some(gizmo.mode());
            gizmo.core_mut().set_visible(visible);
        }
    }

    // ── Update ────────────────────────────────────────────────────────────

    /// Move every gizmo onto the selected object, rescale it for the current
    /// camera distance and sync the picker colliders.
    pub fn update(&mut self) {
        let transform = self.selected.as_ref().map(|id| self.scene.transform(id));
        if let Some(None) = transform {
            tracing::debug!("[CONTROLS] Selected object vanished from the scene");
            self.detach();
            return;
        }
        let transform = transform.flatten();

        let camera_position = self.camera.position;
        let reference_distance = self.settings.reference_distance;
        let (size, space) = (self.size, self.space);

        for gizmo in self.gizmos.iter_mut() {
            if let Some(t) = &transform {
                let rotation = gizmo.container_rotation(t.rotation, space);
                gizmo.core_mut().place(t.position, rotation);
            }
            gizmo.core_mut().update(camera_position, size, reference_distance);
            gizmo.core().sync_pickers(&self.picking);
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────

    /// Dispatch a host input event. Returns `true` when the event changed
    /// hover, drag or selection state.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::PointerDown(pointer) => self.pointer_down(&pointer),
            InputEvent::PointerMove(pointer) => self.pointer_move(&pointer),
            InputEvent::PointerUp(_) | InputEvent::PointerLeave | InputEvent::TouchCancel => {
                self.release()
            }
            InputEvent::Wheel { .. } => self.wheel(),
            InputEvent::ObjectSelected(id) => {
                self.select(id);
                true
            }
        }
    }

    /// Start a drag when the press lands on a picker of the live gizmo.
    pub fn pointer_down(&mut self, event: &PointerEvent) -> bool {
        let Some(object) = self.selected.clone() else {
            return false;
        };
        if self.drag.is_some() || !event.can_start_drag() {
            return false;
        }

        self.update();
        let Some(hit) = self.pick(event.position) else {
            return false;
        };
        let target = hit.entry.tag.target;
        let Some(before) = self.scene.transform(&object) else {
            return false;
        };

        let mode = self.mode;
        let container = *self.gizmos.get(mode).core().container();
        let eye = (self.camera.position - container.position)
            .try_normalize()
            .unwrap_or(-self.camera.forward());

        let Some(plane) = self.gizmos.get_mut(mode).set_active_plane(target, eye) else {
            tracing::debug!("[CONTROLS] {} gizmo cannot drag {}", mode.name(), target.label());
            return false;
        };

        let (origin, direction) = self.camera.ray(event.position);
        let Some(start) = plane.intersect_ray(origin, direction) else {
            tracing::debug!("[CONTROLS] Press ray misses the {} plane", plane.kind.label());
            self.gizmos.get_mut(mode).core_mut().clear_active_plane();
            return false;
        };

        self.gizmos.get_mut(mode).core_mut().highlight(Some(target));
        self.drag = Some(DragSession {
            object: object.clone(),
            target,
            mode,
            space: self.space,
            before,
            offset_start_point: start,
            eye,
            frame: container.rotation,
            center: container.position,
        });
        self.state = InteractionState::Dragging(target);

        tracing::info!(
            "[CONTROLS] 🎯 Drag start: {} {} on {} plane",
            mode.name(),
            target.label(),
            plane.kind.label()
        );
        self.events.emit(GizmoEvent::OrbitCamera { enabled: false });
        self.events.emit(GizmoEvent::DragStarted {
            object,
            target,
            before,
        });
        true
    }

    pub fn pointer_move(&mut self, event: &PointerEvent) -> bool {
        if self.drag.is_some() {
            self.drag_to(event.position)
        } else {
            self.hover(event.position)
        }
    }

    /// End the drag, if any. Safe to call at any time.
    pub fn release(&mut self) -> bool {
        let finished = match self.drag.take() {
            Some(session) => {
                self.gizmos.get_mut(session.mode).core_mut().clear_active_plane();
                let after = self.scene.transform(&session.object).unwrap_or(session.before);
                tracing::info!(
                    "[CONTROLS] ✓ Drag end: {} {} on {}",
                    session.mode.name(),
                    session.target.label(),
                    session.object
                );
                self.events.emit(GizmoEvent::DragFinished {
                    object: session.object,
                    target: session.target,
                    before: session.before,
                    after,
                });
                true
            }
            None => false,
        };

        for gizmo in self.gizmos.iter_mut() {
            gizmo.core_mut().highlight(None);
        }
        self.state = InteractionState::Idle;
        if self.selected.is_some() {
            self.events.emit(GizmoEvent::OrbitCamera { enabled: true });
        }
        finished
    }

    fn wheel(&mut self) -> bool {
        if self.selected.is_none() {
            return false;
        }
        self.update();
        true
    }

    fn hover(&mut self, screen: Vec2) -> bool {
        if self.selected.is_none() || self.drag.is_some() {
            return false;
        }

        let target = self.pick(screen).map(|hit| hit.entry.tag.target);
        self.gizmos.get_mut(self.mode).core_mut().highlight(target);

        match target {
            Some(target) => {
                self.state = InteractionState::Hovering(target);
                self.set_cursor(CursorStyle::Pointer);
            }
            None => {
                self.state = InteractionState::Idle;
                self.set_cursor(CursorStyle::Default);
            }
        }
        target.is_some()
    }

    fn drag_to(&mut self, screen: Vec2) -> bool {
        let Some(session) = self.drag.clone() else {
            return false;
        };

        let Some(plane) = self
            .gizmos
            .get_mut(session.mode)
            .set_active_plane(session.target, session.eye)
        else {
            return false;
        };

        // Pinned to the press-time center so a moving object does not drag
        // its own plane along.
        let plane = ActivePlane {
            origin: session.center,
            ..plane
        };
        let (origin, direction) = self.camera.ray(screen);
        let Some(point) = plane.intersect_ray(origin, direction) else {
            return false;
        };
        let Some(after) = self.manipulate(&session, point) else {
            return false;
        };

        self.scene.apply_transform(&session.object, &after);
        self.sync_body(&session.object, &after);
        self.update();
        true
    }

    /// Object transform for the drag point `point` on the active plane.
    fn manipulate(&self, session: &DragSession, point: Vec3) -> Option<TransformSnapshot> {
        let before = session.before;
        let delta = point - session.offset_start_point;
        let mut after = before;

        match session.mode {
            TransformMode::Translate => {
                after.position = manipulation::translate(
                    before.position,
                    delta,
                    session.target,
                    session.frame,
                    self.translation_snap,
                );
            }
            TransformMode::Scale => {
                after.scale = manipulation::scale(
                    before.scale,
                    session.frame.inverse() * delta,
                    session.target,
                    self.settings.min_scale,
                );
            }
            TransformMode::Rotate => {
                let GizmoTarget::Axis(axis) = session.target else {
                    return None;
                };
                let to_local = session.frame.inverse();
                after.rotation = manipulation::rotate(
                    before.rotation,
                    axis,
                    to_local * (session.offset_start_point - session.center),
                    to_local * (point - session.center),
                    session.space,
                    self.rotation_snap,
                );
            }
        }
        Some(after)
    }

    fn sync_body(&self, object: &str, transform: &TransformSnapshot) {
        let Some(physics) = &self.physics else {
            return;
        };
        let Some(body) = self.scene.body_of(object) else {
            tracing::trace!("[CONTROLS] {} has no rigid body", object);
            return;
        };
        if !physics.teleport(body, transform.position, transform.rotation) {
            tracing::warn!("[CONTROLS] Rigid body of {} is missing", object);
        }
    }

    /// Closest picker of the live gizmo under `screen`. The center handle
    /// wins whenever the ray touches it; plane patches seen edge-on are
    /// skipped.
    fn pick(&self, screen: Vec2) -> Option<PickerHit> {
        if !self.camera.has_layer(self.layer) {
            return None;
        }
        let from = self.camera.position;
        let to = self.camera.screen_to_world(screen, self.settings.pick_distance);
        let (mode, layer) = (self.mode, self.layer);
        let ours = |entry: &PickerEntry| entry.mode == mode && entry.layer == layer;

        let center = GizmoTarget::Plane(GizmoPlane::XYZ);
        if let Some(hit) = self
            .picking
            .raycast_first(from, to, |entry| ours(entry) && entry.tag.target == center)
        {
            return Some(hit);
        }

        let container = *self.gizmos.get(mode).core().container();
        let eye = (self.camera.position - container.position)
            .try_normalize()
            .unwrap_or(-self.camera.forward());
        self.picking.raycast_first(from, to, |entry| {
            ours(entry) && !plane_is_edge_on(entry.tag.target, container.rotation, eye)
        })
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        if self.cursor != cursor {
            self.cursor = cursor;
            self.events.emit(GizmoEvent::Cursor(cursor));
        }
    }

    fn emit_changed(&self) {
        self.events.emit(GizmoEvent::Changed {
            mode: self.mode,
            space: self.space,
            size: self.size,
        });
    }
}

impl Drop for TransformControls {
    fn drop(&mut self) {
        for gizmo in self.gizmos.iter_mut() {
            gizmo.core_mut().unregister_pickers(&self.picking);
        }
        tracing::debug!("[CONTROLS] Torn down, {} pickers left", self.picking.len());
    }
}

/// Whether `target` is a plane patch whose plane is nearly parallel to the
/// eye vector.
fn plane_is_edge_on(target: GizmoTarget, frame: Quat, eye: Vec3) -> bool {
    let GizmoTarget::Plane(plane) = target else {
        return false;
    };
    plane
        .normal_axis()
        .is_some_and(|axis| (frame * axis.unit()).dot(eye).abs() < PLANE_EDGE_ON_THRESHOLD)
}
