use nalgebra::Point3;

pub mod camera;
pub mod deform_box;
pub mod light;
pub mod model3d;
pub mod triangle_mesh;

pub type Point = Point3<f64>;
