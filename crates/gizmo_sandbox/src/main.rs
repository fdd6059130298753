//! Gizmo sandbox
//
// Drives the transform controls through a scripted editing session: select an
// avatar, drag it along X, spin it about Y and stretch it along Z, logging
// every event the controls emit. No window, the pointer is simulated by
// projecting world points onto the canvas.

use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use editor_backend::gizmo::layer::LayerStack;
use editor_backend::{
    GizmoEvent, GizmoSettings, InputEvent, ObjectKind, PhysicsBodies, PointerButton, PointerEvent,
    SceneDb, SceneObjectSnapshot, TransformControls, TransformMode, ViewportCamera,
};
use glam::{Quat, Vec2, Vec3};

mod args;
mod logging;

const CANVAS: Vec2 = Vec2::new(1280.0, 720.0);

fn main() -> Result<()> {
    let args = args::Args::parse();
    logging::init(args.verbose);

    let settings = match &args.settings {
        Some(path) => GizmoSettings::load(path)
            .with_context(|| format!("loading gizmo settings from {}", path.display()))?,
        None => GizmoSettings::default(),
    };

    let scene = SceneDb::new();
    let avatar = scene.add_object(
        SceneObjectSnapshot::new("Trainee", ObjectKind::Avatar).at(Vec3::new(0.0, 0.0, 0.0)),
    );
    scene.add_object(
        SceneObjectSnapshot::new("Workbench", ObjectKind::Prop)
            .at(Vec3::new(3.0, 0.0, -2.0))
            .rotated(Quat::from_rotation_y(0.6)),
    );
    let helper = scene.add_object(SceneObjectSnapshot::new("Arrow", ObjectKind::GizmoGeometry));

    let physics = Arc::new(PhysicsBodies::new());
    let body = physics.insert_dynamic(Vec3::ZERO, Quat::IDENTITY);
    scene.attach_body(&avatar, body);

    let camera = ViewportCamera::new(CANVAS)?.looking_at(Vec3::new(0.0, 4.0, 10.0), Vec3::ZERO);
    let mut layers = LayerStack::default();
    let mut controls = TransformControls::new(scene.clone(), camera, &mut layers, settings)
        .context("creating transform controls")?
        .with_physics(physics.clone());

    let events = controls.subscribe();
    let listener = thread::Builder::new()
        .name("gizmo-events".into())
        .spawn(move || {
            for event in events.iter() {
                log_event(&event);
            }
        })
        .context("spawning event listener")?;

    // Gizmo geometry is never selectable.
    controls.handle_input(InputEvent::ObjectSelected(Some(helper)));
    tracing::info!("[SANDBOX] Selecting helper geometry leaves selection at {:?}", controls.selected());

    controls.handle_input(InputEvent::ObjectSelected(Some(avatar.clone())));

    let s = controls.gizmo_scale();
    drag(&mut controls, Vec3::new(0.9 * s, 0.0, 0.0), Vec3::new(0.9 * s + 2.0, 0.0, 0.0));

    controls.set_mode(TransformMode::Rotate);
    let r = 0.5 * controls.gizmo_scale() * std::f32::consts::FRAC_1_SQRT_2;
    let center = controls.active_gizmo().core().container().position;
    drag(
        &mut controls,
        center + Vec3::new(r, 0.0, r),
        center + Vec3::new(-r, 0.0, r),
    );

    controls.set_mode(TransformMode::Scale);
    let s = controls.gizmo_scale();
    let center = controls.active_gizmo().core().container().position;
    let z_axis = controls.active_gizmo().core().container().rotation * Vec3::Z;
    drag(
        &mut controls,
        center + z_axis * 0.9 * s,
        center + z_axis * (0.9 * s + 0.5),
    );

    controls.handle_input(InputEvent::ObjectSelected(None));

    if let Some(object) = scene.get_object(&avatar) {
        let t = object.transform;
        tracing::info!(
            "[SANDBOX] ✓ {} ends at {:?}, rotation {:?}, scale {:?}",
            object.name,
            t.position,
            t.rotation,
            t.scale
        );
    }
    if let Some((position, _)) = physics.pose(body) {
        tracing::info!("[SANDBOX] Rigid body at {:?}", position);
    }

    drop(controls);
    if listener.join().is_err() {
        tracing::error!("[SANDBOX] Event listener panicked");
    }
    Ok(())
}

/// Press on `from`, move to `to` in a few steps, release.
fn drag(controls: &mut TransformControls, from: Vec3, to: Vec3) {
    const STEPS: usize = 4;

    let Some(start) = controls.camera().world_to_screen(from) else {
        tracing::warn!("[SANDBOX] {:?} is behind the camera", from);
        return;
    };
    controls.handle_input(InputEvent::PointerMove(PointerEvent::mouse(start, None)));
    let pressed = controls.handle_input(InputEvent::PointerDown(PointerEvent::mouse(
        start,
        Some(PointerButton::Primary),
    )));
    if !pressed {
        tracing::warn!("[SANDBOX] Press at {:?} missed the {} gizmo", start, controls.mode().name());
        return;
    }

    let mut last = start;
    for step in 1..=STEPS {
        let point = from.lerp(to, step as f32 / STEPS as f32);
        if let Some(screen) = controls.camera().world_to_screen(point) {
            controls.handle_input(InputEvent::PointerMove(PointerEvent::mouse(screen, None)));
            last = screen;
        }
    }
    controls.handle_input(InputEvent::PointerUp(PointerEvent::mouse(
        last,
        Some(PointerButton::Primary),
    )));
}

fn log_event(event: &GizmoEvent) {
    match event {
        GizmoEvent::Changed { mode, space, size } => {
            tracing::info!("[SANDBOX] Gizmo changed: {} / {:?} / size {}", mode.name(), space, size)
        }
        GizmoEvent::OrbitCamera { enabled } => {
            tracing::debug!("[SANDBOX] Orbit camera enabled: {}", enabled)
        }
        GizmoEvent::Cursor(style) => tracing::debug!("[SANDBOX] Cursor {:?}", style),
        GizmoEvent::DragStarted { object, target, .. } => {
            tracing::info!("[SANDBOX] Drag started on {} ({})", object, target.label())
        }
        GizmoEvent::DragFinished {
            object,
            target,
            before,
            after,
        } => tracing::info!(
            "[SANDBOX] Drag finished on {} ({}): {:?} -> {:?}",
            object,
            target.label(),
            before.position,
            after.position
        ),
    }
}
