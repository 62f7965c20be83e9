use crate::objects::Point;
use crate::objects::model3d::{InteractiveModel, Material, Model3D, Rotate, Scale, Triangle};
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use std::error::Error;
use std::f64::consts::{PI, TAU};
use std::fs;
use std::io::{BufRead, BufReader};

const EPS: f64 = 1e-12;

/// Ограничивающий параллелепипед, выровненный по осям.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn center(&self) -> Point {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Нормализует точку в координаты [0, 1]^3 относительно параллелепипеда.
    ///
    /// Вырожденная ось (нулевая протяжённость) отображается в параметр 0,
    /// чтобы не порождать деление на ноль.
    pub fn normalize(&self, p: &Point) -> Vector3<f64> {
        let extent = self.extent();
        let component = |value: f64, min: f64, size: f64| {
            if size.abs() < EPS { 0.0 } else { (value - min) / size }
        };
        Vector3::new(
            component(p.x, self.min.x, extent.x),
            component(p.y, self.min.y, extent.y),
            component(p.z, self.min.z, extent.z),
        )
    }
}

#[derive(Clone)]
pub struct TriangleMesh {
    vertices: Vec<Point>,
    vertices_world: Vec<Point>, // Вершины умноженные на матрицу преобразования
    face_normals: Vec<Vector4<f64>>,
    face_normals_world: Vec<Vector4<f64>>,
    vertex_normals: Vec<Vector4<f64>>,
    vertex_normals_world: Vec<Vector4<f64>>,
    triangles: Vec<Triangle>,
    pub material: Material,

    model_matrix: Matrix4<f64>,
    normals_need_update: bool,
    vertices_need_update: bool,
}

impl Default for TriangleMesh {
    fn default() -> Self {
        TriangleMesh {
            vertices: Vec::new(),
            vertices_world: Vec::new(),
            face_normals: Vec::new(),
            face_normals_world: Vec::new(),
            vertex_normals: Vec::new(),
            vertex_normals_world: Vec::new(),
            triangles: Vec::new(),
            material: Material::default(),
            model_matrix: Matrix4::identity(),
            normals_need_update: false,
            vertices_need_update: false,
        }
    }
}

impl TriangleMesh {
    /// Собирает сетку из готовых вершин и треугольников и сразу считает нормали.
    pub fn new(vertices: Vec<Point>, triangles: Vec<Triangle>) -> Self {
        let mut mesh = TriangleMesh {
            vertices_world: vertices.clone(),
            vertices,
            triangles,
            model_matrix: Matrix4::identity(),
            ..TriangleMesh::default()
        };
        mesh.compute_normals();
        mesh
    }

    /// UV-сфера радиуса `radius` с полюсами вдоль оси Y.
    pub fn uv_sphere(radius: f64, segments: usize, rings: usize) -> Self {
        assert!(segments >= 3 && rings >= 2);

        let mut vertices = vec![Point::new(0., radius, 0.)];
        for ring in 1..rings {
            let theta = PI * ring as f64 / rings as f64;
            for seg in 0..segments {
                let phi = TAU * seg as f64 / segments as f64;
                vertices.push(Point::new(
                    radius * theta.sin() * phi.cos(),
                    radius * theta.cos(),
                    radius * theta.sin() * phi.sin(),
                ));
            }
        }
        vertices.push(Point::new(0., -radius, 0.));
        let south = vertices.len() - 1;

        let mut triangles: Vec<Triangle> = Vec::new();
        // Верхняя шапка
        for seg in 0..segments {
            triangles.push((0, 1 + (seg + 1) % segments, 1 + seg));
        }
        // Пояса между кольцами
        for ring in 0..rings.saturating_sub(2) {
            let row0 = 1 + ring * segments;
            let row1 = row0 + segments;
            for seg in 0..segments {
                let next = (seg + 1) % segments;
                triangles.push((row0 + seg, row0 + next, row1 + seg));
                triangles.push((row0 + next, row1 + next, row1 + seg));
            }
        }
        // Нижняя шапка
        let row0 = 1 + (rings - 2) * segments;
        for seg in 0..segments {
            triangles.push((row0 + seg, row0 + (seg + 1) % segments, south));
        }

        Self::new(vertices, triangles)
    }

    /// Ограничивающий параллелепипед по локальным вершинам.
    ///
    /// `None` для пустой сетки.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.vertices.first()?;
        let mut bounds = BoundingBox { min: *first, max: *first };
        for v in &self.vertices[1..] {
            bounds.min = Point3::new(bounds.min.x.min(v.x), bounds.min.y.min(v.y), bounds.min.z.min(v.z));
            bounds.max = Point3::new(bounds.max.x.max(v.x), bounds.max.y.max(v.y), bounds.max.z.max(v.z));
        }
        Some(bounds)
    }

    pub fn update_normals_world(&mut self) {
        if self.normals_need_update {
            let model_matrix = self.model_matrix;
            let transform = |n: &Vector4<f64>| {
                let world = model_matrix * n;
                if world.norm() > EPS { world.normalize() } else { world }
            };
            self.face_normals_world = self.face_normals.iter().map(transform).collect();
            self.vertex_normals_world = self.vertex_normals.iter().map(transform).collect();
            self.normals_need_update = false;
        }
    }

    pub fn update_vertices_world(&mut self) {
        if self.vertices_need_update {
            for i in 0..self.vertices.len() {
                self.vertices_world[i] =
                    Point3::from_homogeneous(self.model_matrix * self.vertices[i].to_homogeneous())
                        .expect("Perspective division failed.")
            }
            self.vertices_need_update = false;
        }
    }

    /// Сдвигает сетку так, чтобы центр ограничивающего параллелепипеда
    /// оказался в начале координат.
    fn centerify(&mut self) {
        if let Some(bounds) = self.bounding_box() {
            let center = bounds.center().coords;
            for v in &mut self.vertices {
                *v -= center;
            }
        }
    }

    /// Helper function for parsing faces.
    /// Parses a single component of a face line (`v`, `v/vt`, `v//vn`, `v/vt/vn`)
    /// and validates the vertex and normal indices against the already parsed lists.
    fn parse_face_part(
        part: &str,
        total_vertices: usize,
        total_normals: usize,
        line_number: usize,
    ) -> Result<(usize, Option<usize>), Box<dyn Error>> {
        let mut indices = part.split('/');

        let v_idx = indices
            .next()
            .ok_or_else(|| format!("Invalid face format on line {}", line_number))?
            .parse::<usize>()?
            - 1;
        if v_idx >= total_vertices {
            return Err(format!("Invalid vertex index {} on line {}", v_idx + 1, line_number).into());
        }

        // Texture index (second component) is ignored; normal index is third.
        let n_idx = match indices.nth(1) {
            Some(n_str) if !n_str.is_empty() => {
                let n_idx = n_str.parse::<usize>()? - 1;
                if n_idx >= total_normals {
                    return Err(
                        format!("Invalid normal index {} on line {}", n_idx + 1, line_number).into()
                    );
                }
                Some(n_idx)
            }
            _ => None,
        };

        Ok((v_idx, n_idx))
    }

    /// Read from .obj file
    ///
    /// Faces with more than three vertices are fan-triangulated. `vn` normals,
    /// when present for every vertex, are kept; otherwise normals are
    /// recomputed from the geometry.
    pub fn from_obj(path: &str) -> Result<Self, Box<dyn Error>> {
        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);

        let mut vertices: Vec<Point> = Vec::new();
        let mut triangles: Vec<Triangle> = Vec::new();
        let mut temp_normals: Vec<Vector4<f64>> = Vec::new();
        let mut normal_of_vertex: Vec<Option<usize>> = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let parts: Vec<&str> = line.split_whitespace().collect();

            if parts.is_empty() {
                continue;
            }

            match parts[0] {
                // `v x y z`
                "v" => {
                    let x = parts[1].parse::<f64>()?;
                    let y = parts[2].parse::<f64>()?;
                    let z = parts[3].parse::<f64>()?;
                    vertices.push(Point::new(x, y, z));
                    normal_of_vertex.push(None);
                }
                // `vn x y z`
                "vn" => {
                    let x = parts[1].parse::<f64>()?;
                    let y = parts[2].parse::<f64>()?;
                    let z = parts[3].parse::<f64>()?;
                    temp_normals.push(Vector4::new(x, y, z, 0.).normalize());
                }
                // `f p1 p2 p3 [p4 ...]`
                "f" => {
                    if parts.len() < 4 {
                        return Err(format!("Face with < 3 vertices on line {}", i + 1).into());
                    }

                    let corners: Vec<(usize, Option<usize>)> = parts[1..]
                        .iter()
                        .map(|part| {
                            Self::parse_face_part(part, vertices.len(), temp_normals.len(), i + 1)
                        })
                        .collect::<Result<_, _>>()?;

                    for (v_idx, n_idx) in &corners {
                        if n_idx.is_some() {
                            normal_of_vertex[*v_idx] = *n_idx;
                        }
                    }

                    // Веерная триангуляция многоугольной грани
                    for corner in 1..corners.len() - 1 {
                        triangles.push((corners[0].0, corners[corner].0, corners[corner + 1].0));
                    }
                }
                // Ignore other lines like `g` (group) or comments (`#`)
                _ => {}
            }
        }

        let file_normals: Option<Vec<Vector4<f64>>> = normal_of_vertex
            .iter()
            .map(|n_idx| n_idx.map(|n| temp_normals[n]))
            .collect();

        let mut mesh = Self::new(vertices, triangles);
        if let Some(normals) = file_normals {
            if !normals.is_empty() {
                mesh.vertex_normals_world = normals.clone();
                mesh.vertex_normals = normals;
            }
        }
        mesh.centerify();
        mesh.vertices_world = mesh.vertices.clone();

        Ok(mesh)
    }

    pub fn vertices_mut(&mut self) -> &mut Vec<Point> {
        &mut self.vertices
    }

    pub(crate) fn set_model_matrix(&mut self, model_matrix: Matrix4<f64>) {
        self.model_matrix = model_matrix;
        self.vertices_need_update = true;
        self.normals_need_update = true;
        self.update_vertices_world();
        self.update_normals_world();
    }
}

impl Model3D for TriangleMesh {
    fn triangles(&self) -> &Vec<Triangle> {
        &self.triangles
    }

    fn face_normals(&self) -> &Vec<Vector4<f64>> {
        &self.face_normals_world
    }

    fn vertex_normals(&self) -> &Vec<Vector4<f64>> {
        &self.vertex_normals_world
    }

    fn vertices(&self) -> &Vec<Point> {
        &self.vertices
    }

    fn vertices_world(&self) -> &Vec<Point> {
        &self.vertices_world
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn has_normals(&self) -> bool {
        !self.face_normals.is_empty()
    }

    fn compute_normals(&mut self) {
        // Нормали граней: нормированное векторное произведение рёбер.
        // Вырожденная грань получает нулевую нормаль.
        let mut face_normals = Vec::with_capacity(self.triangles.len());
        let mut vertex_acc = vec![Vector3::zeros(); self.vertices.len()];

        for tri in &self.triangles {
            let edge1 = self.vertices[tri.1] - self.vertices[tri.0];
            let edge2 = self.vertices[tri.2] - self.vertices[tri.0];
            let cross = edge1.cross(&edge2);

            // Накапливаем ненормированное произведение: вклад грани в
            // вершинную нормаль взвешен её площадью.
            vertex_acc[tri.0] += cross;
            vertex_acc[tri.1] += cross;
            vertex_acc[tri.2] += cross;

            let normal = if cross.norm() > EPS { cross.normalize() } else { cross };
            face_normals.push(normal.to_homogeneous());
        }

        self.face_normals = face_normals;
        self.vertex_normals = vertex_acc
            .into_iter()
            .map(|acc| {
                let n = if acc.norm() > EPS { acc.normalize() } else { acc };
                n.to_homogeneous()
            })
            .collect();

        self.vertices_world.resize(self.vertices.len(), Point3::origin());
        self.vertices_need_update = true;
        self.update_vertices_world();
        self.normals_need_update = true;
        self.update_normals_world();
    }

    fn model_matrix(&self) -> &Matrix4<f64> {
        &self.model_matrix
    }
}

impl Rotate for TriangleMesh {
    fn rotate(&mut self, axis_angle_radians: (f64, f64, f64)) {
        let rotation_matrix = Matrix4::new_rotation(Vector3::new(
            axis_angle_radians.0,
            axis_angle_radians.1,
            axis_angle_radians.2,
        ));
        self.set_model_matrix(self.model_matrix * rotation_matrix);
    }
}

impl Scale for TriangleMesh {
    fn scale(&mut self, scaling: f64) {
        self.set_model_matrix(self.model_matrix * Matrix4::new_scaling(scaling));
    }
}

impl InteractiveModel for TriangleMesh {
    fn reset_transformations(&mut self) {
        self.set_model_matrix(Matrix4::identity());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn unit_quad() -> TriangleMesh {
        // Два треугольника в плоскости z = 0
        TriangleMesh::new(
            vec![
                Point::new(0., 0., 0.),
                Point::new(1., 0., 0.),
                Point::new(1., 1., 0.),
                Point::new(0., 1., 0.),
            ],
            vec![(0, 1, 2), (0, 2, 3)],
        )
    }

    #[test]
    fn bounding_box_of_quad() {
        let bounds = unit_quad().bounding_box().unwrap();
        assert_relative_eq!(bounds.min, Point::new(0., 0., 0.));
        assert_relative_eq!(bounds.max, Point::new(1., 1., 0.));
        assert_relative_eq!(bounds.center(), Point::new(0.5, 0.5, 0.));
    }

    #[test]
    fn bounding_box_of_empty_mesh_is_none() {
        assert!(TriangleMesh::default().bounding_box().is_none());
    }

    #[test]
    fn normalize_maps_degenerate_axis_to_zero() {
        let bounds = unit_quad().bounding_box().unwrap();
        let u = bounds.normalize(&Point::new(0.5, 1., 0.));
        assert_relative_eq!(u, nalgebra::Vector3::new(0.5, 1., 0.));
    }

    #[test]
    fn quad_normals_point_along_z() {
        let mesh = unit_quad();
        for n in mesh.face_normals() {
            assert_relative_eq!(n.xyz(), Vector3::new(0., 0., 1.), epsilon = 1e-12);
        }
        for n in mesh.vertex_normals() {
            assert_relative_eq!(n.xyz(), Vector3::new(0., 0., 1.), epsilon = 1e-12);
        }
    }

    #[test]
    fn uv_sphere_vertices_lie_on_sphere() {
        let mesh = TriangleMesh::uv_sphere(2., 12, 8);
        assert!(!mesh.triangles().is_empty());
        for v in mesh.vertices() {
            assert_relative_eq!(v.coords.norm(), 2., epsilon = 1e-12);
        }
    }

    #[test]
    fn from_obj_triangulates_quad_faces() {
        let path = std::env::temp_dir().join("ffd_quad_test.obj");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "v 0 0 0\nv 2 0 0\nv 2 2 0\nv 0 2 0\nf 1 2 3 4").unwrap();

        let mesh = TriangleMesh::from_obj(path.to_str().unwrap()).unwrap();
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.triangles().len(), 2);
        // Центрирование: центр ограничивающего параллелепипеда в нуле
        let bounds = mesh.bounding_box().unwrap();
        assert_relative_eq!(bounds.center(), Point::new(0., 0., 0.));

        fs::remove_file(path).ok();
    }
}
