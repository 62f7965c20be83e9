// Модуль графического приложения - объединяет состояние, UI и обработку ввода
pub mod input;
pub mod state;
pub mod ui;

pub use state::MyEguiApp;

use eframe::{App, Frame};
use egui::Context;

impl App for MyEguiApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        self.update_fps();
        self.handle_keyboard(ctx);
        self.mouse_wheel_scaling(ctx);
        self.mouse_drag_rotation(ctx);
        self.render_ui(ctx);

        // Просим egui перерисовать экран, чтобы получить плавную анимацию
        ctx.request_repaint();
    }
}
