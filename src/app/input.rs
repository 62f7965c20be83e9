use super::state::MyEguiApp;
use crate::config::{ROTATION_SENSITIVITY_FACTOR, SCALING_SENSITIVITY_FACTOR, STRETCH_STEP};
use eframe::egui::{Context, Key};

impl MyEguiApp {
    pub fn mouse_wheel_scaling(&mut self, ctx: &Context) {
        // Масштабирование работает только если курсор над окном просмотра
        if !self.viewport_has_pointer {
            return;
        }
        let scroll_delta = ctx.input(|i| i.raw_scroll_delta);
        if scroll_delta.x == 0.0 && scroll_delta.y == 0.0 {
            return;
        }
        let scaling_factor =
            (1. + scroll_delta.y.max(-200.) * SCALING_SENSITIVITY_FACTOR).max(f32::EPSILON);

        self.apply_button_scale(scaling_factor.into());
    }

    pub fn mouse_drag_rotation(&mut self, ctx: &Context) {
        if ctx.input(|i| i.pointer.primary_down()) {
            let delta = ctx.input(|i| i.pointer.delta());

            if delta.x == 0.0 && delta.y == 0.0 {
                return;
            }

            let rotation_x = (delta.y * ROTATION_SENSITIVITY_FACTOR) as f64;
            let rotation_y = (delta.x * ROTATION_SENSITIVITY_FACTOR) as f64;

            self.apply_button_rotation(rotation_x, rotation_y, 0.);
        }
    }

    /// Клавиатурные привязки деформации: R — случайный сдвиг узла,
    /// X/Z — растяжение/сжатие вдоль X, пробел — сброс решётки.
    pub fn handle_keyboard(&mut self, ctx: &Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.key_pressed(Key::R)) {
            self.apply_random_deform();
        }
        if ctx.input(|i| i.key_pressed(Key::X)) {
            self.apply_stretch(STRETCH_STEP);
        }
        if ctx.input(|i| i.key_pressed(Key::Z)) {
            self.apply_stretch(1. / STRETCH_STEP);
        }
        if ctx.input(|i| i.key_pressed(Key::Space)) {
            self.reset_lattice();
        }
    }
}
