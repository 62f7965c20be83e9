use crate::objects::camera::Camera;
use crate::objects::light::LightSource;

/// Камера и источник света. Единственный интерактивный объект хранится в
/// состоянии приложения и передаётся рендереру отдельно.
pub struct Scene {
    pub camera: Camera,
    pub light_source: LightSource,
}
