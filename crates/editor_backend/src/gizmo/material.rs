use super::types::GizmoColor;

/// Opacity used while a handle is highlighted, unless overridden.
pub const DEFAULT_HIGHLIGHT_OPACITY: f32 = 0.5;

/// Unlit overlay material owned by a single gizmo handle.
///
/// Gizmo materials draw on top of the scene: depth test and depth write are
/// always off. Every mutation bumps [`GizmoMaterial::revision`] so the
/// renderer knows to re-upload the uniforms.
#[derive(Debug, Clone, PartialEq)]
pub struct GizmoMaterial {
    name: String,
    color: GizmoColor,
    previous_color: GizmoColor,
    /// Opacity restored when the highlight is removed.
    stored_opacity: f32,
    highlight_opacity: f32,
    highlighted: bool,
    revision: u64,
}

impl GizmoMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_color(name, GizmoColor::GRAY)
    }

    pub fn with_color(name: impl Into<String>, color: GizmoColor) -> Self {
        Self {
            name: name.into(),
            color,
            previous_color: color,
            stored_opacity: color.a,
            highlight_opacity: DEFAULT_HIGHLIGHT_OPACITY,
            highlighted: false,
            revision: 0,
        }
    }

    pub fn with_highlight_opacity(mut self, opacity: f32) -> Self {
        self.highlight_opacity = opacity;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> GizmoColor {
        self.color
    }

    pub fn previous_color(&self) -> GizmoColor {
        self.previous_color
    }

    pub fn opacity(&self) -> f32 {
        self.color.a
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn depth_test(&self) -> bool {
        false
    }

    pub fn depth_write(&self) -> bool {
        false
    }

    /// Alpha blending is needed for anything not fully opaque.
    pub fn is_blended(&self) -> bool {
        self.color.a != 1.0
    }

    /// Apply `color`, keeping the current one for [`GizmoMaterial::revert_color`].
    /// The new alpha becomes the opacity restored after a highlight.
    pub fn change_color(&mut self, color: GizmoColor) {
        self.previous_color = self.color;
        self.stored_opacity = color.a;
        self.color = if self.highlighted {
            color.with_alpha(self.highlight_opacity)
        } else {
            color
        };
        self.touch();
    }

    pub fn revert_color(&mut self) {
        let previous = self.previous_color;
        self.change_color(previous);
    }

    pub fn highlight(&mut self, active: bool) {
        if self.highlighted == active {
            return;
        }
        self.highlighted = active;
        let alpha = if active { self.highlight_opacity } else { self.stored_opacity };
        self.color = self.color.with_alpha(alpha);
        self.touch();
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material_is_gray() {
        let material = GizmoMaterial::new("shaft");
        assert_eq!(material.color(), GizmoColor::new(0.5, 0.5, 0.5, 0.9));
        assert!(material.is_blended());
        assert!(!material.depth_test());
        assert!(!material.depth_write());
    }

    #[test]
    fn test_highlight_restores_opacity() {
        let mut material = GizmoMaterial::with_color("x", GizmoColor::RED);
        material.highlight(true);
        assert_eq!(material.opacity(), 0.5);
        assert!(material.is_highlighted());

        material.highlight(false);
        assert_eq!(material.opacity(), 0.9);
        assert_eq!(material.color(), GizmoColor::RED);
    }

    #[test]
    fn test_repeated_highlight_is_idempotent() {
        let mut material = GizmoMaterial::with_color("x", GizmoColor::RED);
        material.highlight(true);
        let revision = material.revision();
        material.highlight(true);
        assert_eq!(material.revision(), revision);
        material.highlight(false);
        material.highlight(false);
        assert_eq!(material.opacity(), 0.9);
    }

    #[test]
    fn test_change_color_is_revertible() {
        let mut material = GizmoMaterial::new("patch");
        material.change_color(GizmoColor::BLUE);
        assert_eq!(material.color(), GizmoColor::BLUE);
        assert_eq!(material.previous_color(), GizmoColor::GRAY);

        material.revert_color();
        assert_eq!(material.color(), GizmoColor::GRAY);
    }

    #[test]
    fn test_change_color_while_highlighted_keeps_highlight() {
        let mut material = GizmoMaterial::new("patch").with_highlight_opacity(0.3);
        material.highlight(true);
        material.change_color(GizmoColor::GREEN);
        assert_eq!(material.opacity(), 0.3);

        material.highlight(false);
        assert_eq!(material.color(), GizmoColor::GREEN);
    }

    #[test]
    fn test_invisible_picker_material_stays_invisible() {
        let mut material = GizmoMaterial::with_color("picker", GizmoColor::WHITE.with_alpha(0.0));
        material.highlight(true);
        material.highlight(false);
        assert_eq!(material.opacity(), 0.0);
    }
}
