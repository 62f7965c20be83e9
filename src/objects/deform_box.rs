use crate::config::{DEFAULT_LATTICE_DEGREE, RANDOM_SHIFT_DISTANCE, RANDOM_SHIFT_MAX_ANGLE};
use crate::objects::Point;
use crate::objects::model3d::{InteractiveModel, Material, Model3D, Rotate, Scale, Triangle};
use crate::objects::triangle_mesh::{BoundingBox, TriangleMesh};
use crate::utils::math::{BinomialTable, lerp};
use itertools::iproduct;
use nalgebra::{Matrix4, Point3, Rotation3, Vector3, Vector4};
use rand::Rng;

/// Состояние решётки относительно деформированной сетки.
///
/// Мутаторы переводят решётку в `Dirty`, `get_result` возвращает её в
/// `Clean`, один раз пересчитав геометрию.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LatticeState {
    Clean,
    Dirty,
}

/// Решётка из (degree + 1)^3 контрольных точек, описанная вокруг
/// ограничивающего параллелепипеда исходной сетки.
///
/// Каждая вершина сетки нормализуется в [0, 1]^3 относительно исходного
/// параллелепипеда и отображается трёхмерным тензорным объёмом Безье в
/// новое положение. Пересчёт ленивый: выполняется при чтении результата,
/// а не при каждом сдвиге контрольной точки.
pub struct DeformBox {
    base_mesh: TriangleMesh,
    deformed_mesh: TriangleMesh,
    degree: usize,
    bounds: BoundingBox,
    control_points: Vec<Point>,
    state: LatticeState,
    bernstein: BinomialTable,
    recompute_count: usize,
}

impl DeformBox {
    pub fn new(mesh: TriangleMesh, degree: usize) -> Result<Self, String> {
        if degree == 0 {
            return Err("Степень решётки должна быть положительной".into());
        }
        let bounds = mesh
            .bounding_box()
            .ok_or("Нельзя построить решётку вокруг пустой сетки")?;

        let control_points = Self::generate_control_points(&bounds, degree);

        Ok(DeformBox {
            deformed_mesh: mesh.clone(),
            base_mesh: mesh,
            degree,
            bounds,
            control_points,
            state: LatticeState::Clean,
            bernstein: BinomialTable::new(),
            recompute_count: 0,
        })
    }

    pub fn with_default_degree(mesh: TriangleMesh) -> Result<Self, String> {
        Self::new(mesh, DEFAULT_LATTICE_DEGREE)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn base_mesh(&self) -> &TriangleMesh {
        &self.base_mesh
    }

    /// Контрольные точки единым срезом, индексация через `lattice_index`.
    pub fn control_points(&self) -> &[Point] {
        &self.control_points
    }

    /// Количество пересчётов геометрии за время жизни объекта.
    pub fn recompute_count(&self) -> usize {
        self.recompute_count
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.deformed_mesh.material
    }

    /// Индекс узла (i, j, k) в плоском массиве контрольных точек.
    fn lattice_index(&self, i: usize, j: usize, k: usize) -> usize {
        let nodes = self.degree + 1;
        (i * nodes + j) * nodes + k
    }

    fn check_index(&self, i: usize, j: usize, k: usize) -> Result<(), String> {
        if i > self.degree || j > self.degree || k > self.degree {
            return Err(format!(
                "Узел ({}, {}, {}) вне решётки степени {}",
                i, j, k, self.degree
            ));
        }
        Ok(())
    }

    /// Равномерная тензорная решётка по ограничивающему параллелепипеду:
    /// оси независимы, узлы делят каждую сторону на `degree` равных частей.
    fn generate_control_points(bounds: &BoundingBox, degree: usize) -> Vec<Point> {
        iproduct!(0..=degree, 0..=degree, 0..=degree)
            .map(|(i, j, k)| {
                Point::new(
                    lerp(bounds.min.x, bounds.max.x, i as f64 / degree as f64),
                    lerp(bounds.min.y, bounds.max.y, j as f64 / degree as f64),
                    lerp(bounds.min.z, bounds.max.z, k as f64 / degree as f64),
                )
            })
            .collect()
    }

    /// Положение контрольной точки (i, j, k).
    pub fn control(&self, i: usize, j: usize, k: usize) -> Result<Point, String> {
        self.check_index(i, j, k)?;
        Ok(self.control_points[self.lattice_index(i, j, k)])
    }

    /// Переставляет контрольную точку (i, j, k) в `point`.
    pub fn set_control(&mut self, i: usize, j: usize, k: usize, point: Point) -> Result<(), String> {
        self.check_index(i, j, k)?;
        let index = self.lattice_index(i, j, k);
        self.control_points[index] = point;
        self.state = LatticeState::Dirty;
        Ok(())
    }

    /// Применяет `f` к каждой контрольной точке решётки.
    ///
    /// Общий примитив для составных правок, чтобы не плодить тройные циклы.
    pub fn map_control_points<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Point),
    {
        for pt in &mut self.control_points {
            f(pt);
        }
        self.state = LatticeState::Dirty;
    }

    /// Растягивает решётку вдоль оси X в `scale` раз относительно центра
    /// исходного параллелепипеда. Чисто линейное преобразование без сдвига.
    pub fn stretch_x(&mut self, scale: f64) {
        let center = self.bounds.center().coords;
        let transform = Matrix4::new_translation(&center)
            * Matrix4::new_nonuniform_scaling(&Vector3::new(scale, 1., 1.))
            * Matrix4::new_translation(&-center);

        self.map_control_points(|pt| {
            *pt = Point3::from_homogeneous(transform * pt.to_homogeneous())
                .expect("Perspective division failed.");
        });
    }

    /// Выдёргивает случайный узел решётки: точка на расстоянии
    /// `RANDOM_SHIFT_DISTANCE` от начала координат в случайном направлении.
    ///
    /// Диапазон индексов берётся из фактической степени решётки.
    pub fn deform_random(&mut self) {
        let mut rng = rand::rng();
        let i = rng.random_range(0..=self.degree);
        let j = rng.random_range(0..=self.degree);
        let k = rng.random_range(0..=self.degree);

        let mut angle = || rng.random_range(-RANDOM_SHIFT_MAX_ANGLE..=RANDOM_SHIFT_MAX_ANGLE);
        let rotation = Rotation3::from_euler_angles(angle(), angle(), angle());
        let point = Point3::from(rotation * Vector3::new(RANDOM_SHIFT_DISTANCE, 0., 0.));

        let index = self.lattice_index(i, j, k);
        self.control_points[index] = point;
        self.state = LatticeState::Dirty;
    }

    /// Перестраивает решётку с новой степенью, сбрасывая деформацию.
    pub fn set_degree(&mut self, degree: usize) -> Result<(), String> {
        if degree == 0 {
            return Err("Степень решётки должна быть положительной".into());
        }
        self.degree = degree;
        self.reset();
        Ok(())
    }

    /// Возвращает решётку в равномерное состояние и сетку — в исходную
    /// форму. Накопленное видовое преобразование сохраняется, степень
    /// решётки не меняется.
    pub fn reset(&mut self) {
        self.control_points = Self::generate_control_points(&self.bounds, self.degree);
        let model_matrix = *self.deformed_mesh.model_matrix();
        let material = self.deformed_mesh.material.clone();
        self.deformed_mesh = self.base_mesh.clone();
        self.deformed_mesh.material = material;
        self.deformed_mesh.set_model_matrix(model_matrix);
        self.state = LatticeState::Clean;
    }

    /// Деформированная сетка по текущему положению контрольных точек.
    ///
    /// Пересчёт запускается только если решётка менялась с прошлого чтения.
    pub fn get_result(&mut self) -> &TriangleMesh {
        if self.state == LatticeState::Dirty {
            self.recompute_geometry();
        }
        &self.deformed_mesh
    }

    /// Положение точки объёма Безье для нормализованной координаты `u`.
    fn evaluate(&mut self, u: Vector3<f64>) -> Point {
        let n = self.degree;

        // Базисные значения по каждой оси считаются один раз на вершину
        let basis = |t: f64, table: &mut BinomialTable| -> Vec<f64> {
            (0..=n)
                .map(|i| table.bernstein(i, n, t).expect("basis index out of range"))
                .collect()
        };
        let bu = basis(u.x, &mut self.bernstein);
        let bv = basis(u.y, &mut self.bernstein);
        let bw = basis(u.z, &mut self.bernstein);

        let mut result = Vector3::zeros();
        for (i, j, k) in iproduct!(0..=n, 0..=n, 0..=n) {
            let weight = bu[i] * bv[j] * bw[k];
            result += self.control_points[self.lattice_index(i, j, k)].coords * weight;
        }
        Point3::from(result)
    }

    /// Пересчитывает все вершины деформированной сетки и её нормали.
    ///
    /// Стоимость O(вершины * (degree + 1)^3) — основная статья расходов,
    /// ради которой пересчёт отложен до чтения результата.
    fn recompute_geometry(&mut self) {
        let params: Vec<Vector3<f64>> = self
            .base_mesh
            .vertices()
            .iter()
            .map(|v| self.bounds.normalize(v))
            .collect();

        let positions: Vec<Point> = params.into_iter().map(|u| self.evaluate(u)).collect();

        *self.deformed_mesh.vertices_mut() = positions;
        self.deformed_mesh.compute_normals();

        self.recompute_count += 1;
        self.state = LatticeState::Clean;
    }
}

impl Model3D for DeformBox {
    fn triangles(&self) -> &Vec<Triangle> {
        self.deformed_mesh.triangles()
    }

    fn face_normals(&self) -> &Vec<Vector4<f64>> {
        self.deformed_mesh.face_normals()
    }

    fn vertex_normals(&self) -> &Vec<Vector4<f64>> {
        self.deformed_mesh.vertex_normals()
    }

    fn vertices(&self) -> &Vec<Point> {
        self.deformed_mesh.vertices()
    }

    fn vertices_world(&self) -> &Vec<Point> {
        self.deformed_mesh.vertices_world()
    }

    fn material(&self) -> &Material {
        self.deformed_mesh.material()
    }

    fn has_normals(&self) -> bool {
        self.deformed_mesh.has_normals()
    }

    fn compute_normals(&mut self) {
        self.deformed_mesh.compute_normals()
    }

    fn model_matrix(&self) -> &Matrix4<f64> {
        self.deformed_mesh.model_matrix()
    }
}

impl Rotate for DeformBox {
    fn rotate(&mut self, axis_angle_radians: (f64, f64, f64)) {
        self.deformed_mesh.rotate(axis_angle_radians);
    }
}

impl Scale for DeformBox {
    fn scale(&mut self, scaling: f64) {
        self.deformed_mesh.scale(scaling);
    }
}

impl InteractiveModel for DeformBox {
    fn reset_transformations(&mut self) {
        self.deformed_mesh.reset_transformations();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Сетка из восьми вершин куба [-1, 1]^3.
    fn cube_mesh() -> TriangleMesh {
        let vertices = iproduct!([-1., 1.], [-1., 1.], [-1., 1.])
            .map(|(x, y, z)| Point::new(x, y, z))
            .collect();
        // Пара граней достаточна: остальные тесты смотрят только на вершины
        TriangleMesh::new(vertices, vec![(0, 1, 3), (0, 3, 2)])
    }

    /// Сетка, вершины которой стоят во всех узлах равномерной решётки
    /// степени `degree` внутри куба [0, 1]^3.
    fn grid_mesh(degree: usize) -> TriangleMesh {
        let vertices: Vec<Point> = iproduct!(0..=degree, 0..=degree, 0..=degree)
            .map(|(i, j, k)| {
                Point::new(
                    i as f64 / degree as f64,
                    j as f64 / degree as f64,
                    k as f64 / degree as f64,
                )
            })
            .collect();
        TriangleMesh::new(vertices, vec![(0, 1, 2)])
    }

    #[test]
    fn rejects_zero_degree_and_empty_mesh() {
        assert!(DeformBox::new(cube_mesh(), 0).is_err());
        assert!(DeformBox::new(TriangleMesh::default(), 3).is_err());
    }

    #[test]
    fn lattice_has_expected_node_count() {
        for degree in 1..=4 {
            let deform = DeformBox::new(cube_mesh(), degree).unwrap();
            assert_eq!(deform.control_points().len(), (degree + 1).pow(3));
        }
    }

    #[test]
    fn identity_lattice_reproduces_source_mesh() {
        let mesh = TriangleMesh::uv_sphere(1., 12, 8);
        let original = mesh.vertices().clone();
        let mut deform = DeformBox::with_default_degree(mesh).unwrap();

        // Принудительный пересчёт через фиктивную правку
        deform.map_control_points(|_| {});
        let result = deform.get_result();

        for (v, expected) in result.vertices().iter().zip(&original) {
            assert_relative_eq!(v, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn uniform_lattice_reproduces_grid_nodes() {
        // Для равномерной решётки объём Безье совпадает с аффинным
        // отображением параллелепипеда: каждый узел сетки остаётся на месте
        for degree in 1..=4 {
            let mesh = grid_mesh(degree);
            let original = mesh.vertices().clone();
            let mut deform = DeformBox::new(mesh, degree).unwrap();
            deform.map_control_points(|_| {});

            for (v, expected) in deform.get_result().vertices().iter().zip(&original) {
                assert_relative_eq!(v, expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn moved_corner_is_reproduced_exactly() {
        // Сценарий спецификации: степень 1, куб [-1, 1]^3, угол (1,1,1)
        // переносится в (2,2,2)
        let mesh = cube_mesh();
        let mut deform = DeformBox::new(mesh, 1).unwrap();
        deform.set_control(1, 1, 1, Point::new(2., 2., 2.)).unwrap();

        let result = deform.get_result();
        // Вершины cube_mesh перечислены в порядке iproduct: (1,1,1) последняя
        let moved = result.vertices().last().unwrap();
        assert_relative_eq!(moved, &Point::new(2., 2., 2.), epsilon = 1e-12);
        // Противоположный угол (-1,-1,-1) не затронут
        assert_relative_eq!(&result.vertices()[0], &Point::new(-1., -1., -1.), epsilon = 1e-12);
    }

    #[test]
    fn corner_weights_collapse_for_arbitrary_lattice() {
        // В восьми крайних углах базис Бернштейна вырождается в выбор
        // одного узла при любой конфигурации решётки
        for degree in 1..=4 {
            let mut deform = DeformBox::new(cube_mesh(), degree).unwrap();
            deform.map_control_points(|pt| *pt = Point::new(pt.x * 1.7, pt.y - 0.3, pt.z + 0.9));

            for (i, j, k) in iproduct!([0, degree], [0, degree], [0, degree]) {
                let expected = deform.control(i, j, k).unwrap();
                let u = Vector3::new(
                    (i / degree) as f64,
                    (j / degree) as f64,
                    (k / degree) as f64,
                );
                assert_relative_eq!(deform.evaluate(u), expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn get_result_is_lazy_and_idempotent() {
        let mut deform = DeformBox::new(cube_mesh(), 2).unwrap();
        assert_eq!(deform.recompute_count(), 0);

        deform.set_control(1, 1, 1, Point::new(0.5, 0.5, 0.5)).unwrap();
        // Ещё одна правка до чтения не должна добавить пересчёт
        deform.set_control(0, 0, 0, Point::new(-2., -2., -2.)).unwrap();

        let first = deform.get_result().vertices().clone();
        assert_eq!(deform.recompute_count(), 1);

        let second = deform.get_result().vertices().clone();
        assert_eq!(deform.recompute_count(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn reset_restores_mesh_and_lattice() {
        let mesh = cube_mesh();
        let original = mesh.vertices().clone();
        let mut deform = DeformBox::new(mesh, 2).unwrap();

        deform.deform_random();
        deform.stretch_x(3.);
        deform.set_control(0, 1, 2, Point::new(9., 9., 9.)).unwrap();
        deform.get_result();

        deform.reset();
        let uniform = DeformBox::new(cube_mesh(), 2).unwrap();
        assert_eq!(deform.control_points(), uniform.control_points());

        for (v, expected) in deform.get_result().vertices().iter().zip(&original) {
            assert_relative_eq!(v, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn set_degree_rebuilds_uniform_lattice() {
        let mut deform = DeformBox::new(cube_mesh(), 2).unwrap();
        deform.deform_random();
        deform.get_result();

        deform.set_degree(3).unwrap();
        assert_eq!(deform.degree(), 3);
        assert_eq!(deform.control_points().len(), 4 * 4 * 4);
        let uniform = DeformBox::new(cube_mesh(), 3).unwrap();
        assert_eq!(deform.control_points(), uniform.control_points());

        assert!(deform.set_degree(0).is_err());
    }

    #[test]
    fn stretch_is_multiplicative() {
        let mut twice = DeformBox::new(cube_mesh(), 3).unwrap();
        twice.stretch_x(1.5);
        twice.stretch_x(2.);

        let mut once = DeformBox::new(cube_mesh(), 3).unwrap();
        once.stretch_x(3.);

        for (a, b) in twice.control_points().iter().zip(once.control_points()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn set_control_rejects_out_of_range_index() {
        let mut deform = DeformBox::new(cube_mesh(), 2).unwrap();
        assert!(deform.set_control(3, 0, 0, Point::origin()).is_err());
        assert!(deform.control(0, 0, 5).is_err());
        // Решётка не изменилась и не помечена грязной
        assert_eq!(deform.recompute_count(), 0);
        let before = deform.control_points().to_vec();
        deform.get_result();
        assert_eq!(deform.recompute_count(), 0);
        assert_eq!(before, deform.control_points());
    }

    #[test]
    fn deform_random_respects_actual_degree() {
        // Степень 1: допустимы только индексы 0 и 1. До исправления индекс
        // брался из фиксированного диапазона 5x5x5 и ронял бы эту решётку
        for _ in 0..50 {
            let mut deform = DeformBox::new(cube_mesh(), 1).unwrap();
            deform.deform_random();

            let uniform = DeformBox::new(cube_mesh(), 1).unwrap();
            let moved: Vec<usize> = deform
                .control_points()
                .iter()
                .zip(uniform.control_points())
                .enumerate()
                .filter(|(_, (a, b))| a != b)
                .map(|(idx, _)| idx)
                .collect();

            // Ровно один узел переставлен, и он на расстоянии сдвига от нуля
            assert_eq!(moved.len(), 1);
            let point = deform.control_points()[moved[0]];
            assert_relative_eq!(point.coords.norm(), RANDOM_SHIFT_DISTANCE, epsilon = 1e-12);
        }
    }

    #[test]
    fn flat_mesh_deforms_without_nan() {
        // Плоская сетка: нулевая протяжённость по Z
        let mesh = TriangleMesh::new(
            vec![
                Point::new(0., 0., 0.),
                Point::new(1., 0., 0.),
                Point::new(0., 1., 0.),
            ],
            vec![(0, 1, 2)],
        );
        let mut deform = DeformBox::new(mesh, 2).unwrap();
        deform.stretch_x(2.);

        for v in deform.get_result().vertices() {
            assert!(v.coords.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn vertex_count_is_preserved() {
        let mesh = TriangleMesh::uv_sphere(1., 10, 6);
        let count = mesh.vertices().len();
        let mut deform = DeformBox::with_default_degree(mesh).unwrap();

        deform.deform_random();
        assert_eq!(deform.get_result().vertices().len(), count);
        deform.stretch_x(0.5);
        assert_eq!(deform.get_result().vertices().len(), count);
    }
}
