pub mod lattice_overlay;
pub mod z_buffer;

use crate::config::{AMBIENT_INTENSITY, LIGHT_SCATTERING};
use crate::objects::camera::Camera;
use crate::objects::light::LightSource;
use crate::objects::model3d::{Material, Model3D};
use image::{Rgb, RgbImage};
use nalgebra::{Point3, Vector3};

fn compute_reflection(
    light_direction: &Vector3<f64>,
    surface_normal: &Vector3<f64>,
) -> Vector3<f64> {
    let beta = 2. * light_direction.dot(surface_normal);
    (-1. * light_direction) + (beta * surface_normal)
}

fn calculate_color(
    material: &Material,
    normal: &Vector3<f64>,
    surface_point: &Point3<f64>,
    light_source: &LightSource,
    eye_pos: &Point3<f64>,
) -> Rgb<u8> {
    let mut light_direction = light_source.pos - surface_point;
    let dist = light_direction.norm();

    light_direction.normalize_mut();
    let view_direction = (eye_pos - surface_point).normalize();

    let reflection_direction = compute_reflection(&light_direction, normal);

    let light_intensity = light_source.intensity / (dist + LIGHT_SCATTERING);

    let diffuse_intensity = material.diffuse_reflectance_factor
        * light_intensity
        * normal.dot(&light_direction).max(0.)
        + AMBIENT_INTENSITY;
    let specular_intensity = material.specular_reflectance_factor
        * light_intensity
        * reflection_direction
            .dot(&view_direction)
            .max(0.)
            .powf(material.gloss);

    let channel = |m: u8, l: u8| {
        (m as f64 * diffuse_intensity + l as f64 * specular_intensity).clamp(0., 255.)
    };
    let r = channel(material.color[0], light_source.color[0]);
    let g = channel(material.color[1], light_source.color[1]);
    let b = channel(material.color[2], light_source.color[2]);

    Rgb([r.round() as u8, g.round() as u8, b.round() as u8])
}

pub trait Renderer {
    fn render_single_object(
        &mut self,
        image: &mut RgbImage,
        object: &dyn Model3D,
        camera: &Camera,
        light: &LightSource,
    );

    /// Плоская закраска по нормалям граней вместо интерполяции по вершинам.
    fn set_flat_shading(&mut self, _flat: bool) {}
}
