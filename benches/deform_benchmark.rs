use criterion::{Criterion, criterion_group, criterion_main};
use ffd::objects::Point;
use ffd::objects::deform_box::DeformBox;
use ffd::objects::model3d::Model3D;
use ffd::objects::triangle_mesh::TriangleMesh;
use std::hint::black_box;

const SPHERES: &[(&str, usize, usize)] = &[
    ("сфера 20x20", 20, 20),
    ("сфера 40x40", 40, 40),
];

const DEGREES: &[usize] = &[2, 4, 6];

fn deform_stages_benchmark(c: &mut Criterion) {
    for (mesh_name, segments, rings) in SPHERES {
        let mesh = TriangleMesh::uv_sphere(1., *segments, *rings);

        // --- Своя группа для каждой сетки ---
        let group_name = format!("FFD: {}", mesh_name);
        let mut group = c.benchmark_group(&group_name);

        for degree in DEGREES {
            // --- Этап 1: Полный пересчёт геометрии ---
            // Каждая итерация начинает с грязной решётки
            group.bench_function(format!("Пересчёт, степень {}", degree), |b| {
                b.iter_with_setup(
                    || {
                        let mut deform = DeformBox::new(mesh.clone(), *degree).unwrap();
                        deform
                            .set_control(0, 0, 0, Point::new(2., 2., 2.))
                            .unwrap();
                        deform
                    },
                    |mut deform| {
                        black_box(deform.get_result().vertices().len());
                    },
                )
            });
        }

        // --- Этап 2: Ленивое чтение чистой решётки ---
        // Пересчёта нет, только возврат готовой сетки
        let mut clean = DeformBox::with_default_degree(mesh.clone()).unwrap();
        clean.deform_random();
        clean.get_result();
        group.bench_function("Чтение без пересчёта", |b| {
            b.iter(|| black_box(clean.get_result().vertices().len()))
        });

        // --- Этап 3: Построение решётки ---
        group.bench_function("Построение объекта", |b| {
            b.iter(|| black_box(DeformBox::with_default_degree(mesh.clone()).unwrap()))
        });

        group.finish();
    }
}

criterion_group!(benches, deform_stages_benchmark);
criterion_main!(benches);
