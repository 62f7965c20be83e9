use rfd::FileDialog;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{
    ASPECT_RATIO, BACKGROUND_COLOR, DEFAULT_LATTICE_DEGREE, FAR_PLANE, FOV_DEGREES, NEAR_PLANE,
};
use crate::objects::camera::Camera;
use crate::objects::deform_box::DeformBox;
use crate::objects::light::LightSource;
use crate::objects::model3d::{InteractiveModel, Rotate, Scale};
use crate::objects::triangle_mesh::TriangleMesh;
use crate::render::Renderer;
use crate::render::lattice_overlay::LatticeOverlay;
use crate::render::z_buffer::ZBufferPerformer;
use crate::scene::Scene;
use eframe::egui::{Context, TextureHandle};
use image::{Rgb, RgbImage};
use imageproc::definitions::HasWhite;
use nalgebra::{Point3, Vector3};

const IMG_WIDTH: u32 = 1000;
const IMG_HEIGHT: u32 = 1000;

pub struct MyEguiApp {
    pub texture: Option<TextureHandle>,
    pub frame: RgbImage,
    pub scene: Scene,
    pub renderer: Box<dyn Renderer>,

    pub fps: f64,
    pub last_frame_time: Instant,

    // UI state
    pub selected_file: String,
    pub lattice_degree: usize,
    pub stretch_scale: f64,
    pub show_lattice: bool,
    pub flat_shading: bool,
    // Флаг: курсор находится над окном просмотра
    pub viewport_has_pointer: bool,

    // Object state
    pub deform_box: Option<DeformBox>,

    // Error handling
    pub error_message: Option<String>,

    // Флаг необходимости перерисовки
    pub needs_redraw: bool,

    // Текущие размеры viewport
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for MyEguiApp {
    fn default() -> Self {
        let camera = Camera::new(
            Point3::new(0., 0., 3.),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            FOV_DEGREES.to_radians(),
            ASPECT_RATIO,
            NEAR_PLANE,
            FAR_PLANE,
        );
        let light_source = LightSource {
            pos: Point3::new(0., 0., 3.),
            intensity: 15.,
            color: Rgb::white(),
        };
        let scene = Scene {
            camera,
            light_source,
        };

        // Стартовая сцена: единичная сфера в решётке степени по умолчанию
        let sphere = TriangleMesh::uv_sphere(1., 20, 20);
        let deform_box =
            DeformBox::with_default_degree(sphere).expect("sphere mesh is not degenerate");

        Self {
            texture: None,
            frame: RgbImage::from_pixel(IMG_WIDTH, IMG_HEIGHT, BACKGROUND_COLOR),
            scene,
            renderer: Box::new(ZBufferPerformer::new(IMG_WIDTH, IMG_HEIGHT)),
            fps: 0.0,
            last_frame_time: Instant::now(),
            selected_file: "сфера (встроенная)".into(),
            lattice_degree: DEFAULT_LATTICE_DEGREE,
            stretch_scale: 1.5,
            show_lattice: true,
            flat_shading: false,
            viewport_has_pointer: false,
            deform_box: Some(deform_box),
            error_message: None,
            needs_redraw: true,
            viewport_width: IMG_WIDTH,
            viewport_height: IMG_HEIGHT,
        }
    }
}

impl MyEguiApp {
    pub fn update_frame(&mut self, ctx: &Context) {
        // Перерисовываем только по необходимости
        if !self.needs_redraw {
            if self.texture.is_some() {
                return;
            }
            self.needs_redraw = true;
        }

        if let Some(deform) = self.deform_box.as_mut() {
            // Результат деформации запрашивается один раз на кадр;
            // при чистой решётке это чтение без пересчёта
            let mesh = deform.get_result();
            self.renderer.render_single_object(
                &mut self.frame,
                mesh,
                &self.scene.camera,
                &self.scene.light_source,
            );
            if self.show_lattice {
                LatticeOverlay::draw(&mut self.frame, &self.scene.camera, deform);
            }
        } else {
            self.frame
                .pixels_mut()
                .for_each(|px| *px = BACKGROUND_COLOR);
        }

        let egui_image = egui::ColorImage::from_rgb(
            [self.frame.width() as usize, self.frame.height() as usize],
            self.frame.as_raw(),
        );

        if self.texture.is_none() {
            self.texture = Some(ctx.load_texture("rendered_image", egui_image, Default::default()));
        } else {
            self.texture
                .as_mut()
                .unwrap()
                .set(egui_image, Default::default());
        }

        self.needs_redraw = false;
    }

    pub fn update_fps(&mut self) {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time).as_secs_f64();
        self.last_frame_time = now;
        self.fps = 1.0 / frame_time;
    }

    pub fn load_mesh_from_path(&mut self, file_path: &str) {
        let loaded = TriangleMesh::from_obj(file_path)
            .map_err(|e| e.to_string())
            .and_then(|mesh| DeformBox::new(mesh, self.lattice_degree));

        match loaded {
            Ok(deform) => {
                self.deform_box = Some(deform);
                if let Some(file_name) = PathBuf::from(file_path).file_name() {
                    self.selected_file = file_name.to_string_lossy().to_string();
                }
                self.needs_redraw = true;
            }
            Err(e) => {
                eprintln!("Ошибка загрузки модели {}: {}", file_path, e);
                self.error_message = Some(format!("Ошибка загрузки модели {}: {}", file_path, e));
            }
        }
    }

    pub fn open_file_dialog(&mut self) {
        if let Some(path) = FileDialog::new()
            .add_filter("OBJ файлы", &["obj"])
            .set_directory("./data")
            .pick_file()
        {
            let path_str = path.to_string_lossy().to_string();
            self.load_mesh_from_path(&path_str);
        }
    }

    pub fn load_builtin_sphere(&mut self) {
        let sphere = TriangleMesh::uv_sphere(1., 20, 20);
        match DeformBox::new(sphere, self.lattice_degree) {
            Ok(deform) => {
                self.deform_box = Some(deform);
                self.selected_file = "сфера (встроенная)".into();
                self.needs_redraw = true;
            }
            Err(e) => self.error_message = Some(e),
        }
    }

    /// Перестроение решётки под выбранную в UI степень.
    pub fn rebuild_lattice(&mut self) {
        let degree = self.lattice_degree;
        if let Some(deform) = self.deform_box.as_mut() {
            if let Err(e) = deform.set_degree(degree) {
                self.error_message = Some(e);
                return;
            }
            self.needs_redraw = true;
        }
    }

    pub fn apply_random_deform(&mut self) {
        if let Some(deform) = self.deform_box.as_mut() {
            deform.deform_random();
            self.needs_redraw = true;
        }
    }

    pub fn apply_stretch(&mut self, scale: f64) {
        if let Some(deform) = self.deform_box.as_mut() {
            deform.stretch_x(scale);
            self.needs_redraw = true;
        }
    }

    pub fn reset_lattice(&mut self) {
        if let Some(deform) = self.deform_box.as_mut() {
            deform.reset();
            self.needs_redraw = true;
        }
    }

    pub fn reset_current_object(&mut self) {
        if let Some(deform) = self.deform_box.as_mut() {
            deform.reset_transformations();
            self.needs_redraw = true;
        }
    }

    pub fn apply_button_rotation(&mut self, x: f64, y: f64, z: f64) {
        if let Some(deform) = self.deform_box.as_mut() {
            deform.rotate((x.to_radians(), y.to_radians(), z.to_radians()));
            self.needs_redraw = true;
        }
    }

    pub fn apply_button_scale(&mut self, factor: f64) {
        if let Some(deform) = self.deform_box.as_mut() {
            deform.scale(factor);
            self.needs_redraw = true;
        }
    }

    pub fn update_viewport_size(&mut self, width: u32, height: u32) {
        if self.viewport_width != width || self.viewport_height != height {
            self.viewport_width = width;
            self.viewport_height = height;

            self.frame = RgbImage::from_pixel(width, height, BACKGROUND_COLOR);
            self.scene
                .camera
                .set_aspect_ratio(width as f64 / height as f64);

            self.needs_redraw = true;
        }
    }
}
