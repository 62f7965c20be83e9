use crate::objects::Point;
use image::Rgb;
use nalgebra::{Matrix4, Vector4};

pub type Triangle = (usize, usize, usize);

pub trait Model3D {
    /// List of triangle faces
    fn triangles(&self) -> &Vec<Triangle>;

    /// Нормали граней в мировых координатах
    fn face_normals(&self) -> &Vec<Vector4<f64>>;

    /// Вершинные нормали в мировых координатах
    fn vertex_normals(&self) -> &Vec<Vector4<f64>>;

    /// List of vertices
    fn vertices(&self) -> &Vec<Point>;

    /// List of vertices multiplied by transformation matrix
    fn vertices_world(&self) -> &Vec<Point>;

    /// Return material
    fn material(&self) -> &Material;

    /// Return true if normals were calculated otherwise - false
    fn has_normals(&self) -> bool;

    /// Пересчитать нормали граней и вершин по текущим вершинам
    fn compute_normals(&mut self);

    /// Get model's transformation matrix
    fn model_matrix(&self) -> &Matrix4<f64>;
}

pub trait Rotate {
    fn rotate(&mut self, axis_angle_radians: (f64, f64, f64));
}

pub trait Scale {
    fn scale(&mut self, scaling: f64);
}

pub trait InteractiveModel: Model3D + Rotate + Scale {
    fn reset_transformations(&mut self);
}

#[derive(Clone)]
pub struct Material {
    pub diffuse_reflectance_factor: f64,
    pub specular_reflectance_factor: f64,
    pub gloss: f64,
    pub color: Rgb<u8>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_reflectance_factor: 0.45,
            specular_reflectance_factor: 0.02,
            gloss: 3.,
            color: Rgb([208, 43, 43]),
        }
    }
}
