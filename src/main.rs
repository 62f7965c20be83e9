use eframe::NativeOptions;
use ffd::app::MyEguiApp;

fn main() -> Result<(), eframe::Error> {
    let app = MyEguiApp::default();
    let native_options = NativeOptions::default();
    eframe::run_native(
        "Свободная деформация (FFD)",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
