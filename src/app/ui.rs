use super::state::MyEguiApp;
use crate::config::STRETCH_STEP;
use crate::objects::model3d::{Material, Model3D};
use eframe::egui::{CentralPanel, Color32, Context, ScrollArea, SidePanel, Ui, Vec2};

impl MyEguiApp {
    pub fn render_ui(&mut self, ctx: &Context) {
        self.setup_custom_styles(ctx);

        // Правая панель с элементами управления
        SidePanel::right("controls_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        ui.style_mut().spacing.slider_width = 235.0;
                        ui.heading("⚙ Управление");
                        ui.add_space(10.0);

                        self.render_file_selection(ui);
                        self.render_lattice_controls(ui);
                        self.render_display_options(ui);
                        self.render_transform_controls(ui);
                        self.render_material_controls(ui);

                        ui.add_space(10.0);
                    });
            });

        // Центральная панель с окном просмотра
        CentralPanel::default().show(ctx, |ui| {
            ui.heading("📦 Свободная деформация (FFD)");
            ui.add_space(5.0);
            self.render_stats_line(ui);
            self.render_viewport(ui);
        });

        // Модальное окно с ошибкой
        if let Some(error_msg) = &self.error_message.clone() {
            egui::Window::new("⚠ Ошибка")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(error_msg);
                    ui.separator();
                    if self.styled_button(ui, "OK", Vec2::new(120.0, 32.0)).clicked() {
                        self.error_message = None;
                    }
                });
        }

        // Обновляем кадр
        self.update_frame(ctx);
    }

    fn setup_custom_styles(&self, ctx: &Context) {
        let mut style = (*ctx.style()).clone();

        style.text_styles.insert(
            egui::TextStyle::Heading,
            egui::FontId::new(20.0, egui::FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::new(15.0, egui::FontFamily::Proportional),
        );

        style.spacing.button_padding = Vec2::new(10.0, 6.0);
        style.spacing.item_spacing = Vec2::new(8.0, 8.0);

        ctx.set_style(style);
    }

    // Вспомогательная функция для создания стилизованных кнопок
    fn styled_button(&self, ui: &mut Ui, text: &str, min_size: Vec2) -> egui::Response {
        ui.add_sized(min_size, egui::Button::new(text))
    }

    fn render_file_selection(&mut self, ui: &mut Ui) {
        ui.separator();
        ui.add_space(5.0);
        ui.label("📂 Модель:");
        ui.add_space(8.0);

        ui.group(|ui| {
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    ui.label("Текущая:");
                    ui.add_space(5.0);
                    ui.label(self.selected_file.clone());
                });

                if self
                    .styled_button(ui, "📁 Выбрать OBJ файл...", Vec2::new(ui.available_width(), 36.0))
                    .clicked()
                {
                    self.open_file_dialog();
                }
                if self
                    .styled_button(ui, "⚪ Встроенная сфера", Vec2::new(ui.available_width(), 36.0))
                    .clicked()
                {
                    self.load_builtin_sphere();
                }
            });
        });
    }

    fn render_lattice_controls(&mut self, ui: &mut Ui) {
        ui.separator();
        ui.add_space(10.0);
        ui.label("🔶 Решётка деформации:");
        ui.add_space(5.0);

        if self.deform_box.is_none() {
            ui.colored_label(Color32::from_rgb(200, 100, 100), "⚠ Загрузите объект");
            return;
        }

        ui.group(|ui| {
            ui.vertical(|ui| {
                ui.label("Степень решётки:");
                ui.add_space(3.0);
                let old_degree = self.lattice_degree;
                ui.add_sized(
                    Vec2::new(ui.available_width(), 20.0),
                    egui::Slider::new(&mut self.lattice_degree, 1..=8),
                );
                if old_degree != self.lattice_degree {
                    self.rebuild_lattice();
                }
            });
        });

        ui.add_space(8.0);

        ui.group(|ui| {
            ui.vertical(|ui| {
                if self
                    .styled_button(ui, "🎲 Случайная деформация (R)", Vec2::new(ui.available_width(), 36.0))
                    .clicked()
                {
                    self.apply_random_deform();
                }

                ui.add_space(5.0);
                ui.label("Растяжение вдоль X:");
                ui.add_space(3.0);
                ui.add_sized(
                    Vec2::new(ui.available_width(), 20.0),
                    egui::Slider::new(&mut self.stretch_scale, 0.1..=3.0)
                        .step_by(0.05)
                        .fixed_decimals(2),
                );
                ui.horizontal(|ui| {
                    if self.styled_button(ui, "↔ Применить", Vec2::new(140.0, 32.0)).clicked() {
                        let scale = self.stretch_scale;
                        self.apply_stretch(scale);
                    }
                    if self.styled_button(ui, "↔ Шаг (X)", Vec2::new(140.0, 32.0)).clicked() {
                        self.apply_stretch(STRETCH_STEP);
                    }
                });

                ui.add_space(5.0);
                if self
                    .styled_button(ui, "🔄 Сбросить деформацию (пробел)", Vec2::new(ui.available_width(), 36.0))
                    .clicked()
                {
                    self.reset_lattice();
                }
            });
        });
    }

    fn render_display_options(&mut self, ui: &mut Ui) {
        ui.separator();
        ui.add_space(10.0);
        ui.label("👁 Отображение:");
        ui.add_space(5.0);

        ui.group(|ui| {
            ui.vertical(|ui| {
                if ui.checkbox(&mut self.show_lattice, "Показывать решётку").changed() {
                    self.needs_redraw = true;
                }
                if ui.checkbox(&mut self.flat_shading, "Плоская закраска").changed() {
                    self.renderer.set_flat_shading(self.flat_shading);
                    self.needs_redraw = true;
                }
            });
        });
    }

    fn render_transform_controls(&mut self, ui: &mut Ui) {
        ui.separator();
        ui.add_space(10.0);
        ui.label("🎯 Управление объектом:");
        ui.add_space(5.0);

        if self.deform_box.is_none() {
            ui.colored_label(Color32::from_rgb(200, 100, 100), "⚠ Загрузите объект");
            return;
        }

        // Поворот
        ui.group(|ui| {
            ui.vertical(|ui| {
                ui.label("🔄 Поворот (градусы):");
                ui.add_space(5.0);

                for (axis, label_pos, label_neg) in [
                    (0, "↺ X +15°", "↻ X -15°"),
                    (1, "↺ Y +15°", "↻ Y -15°"),
                    (2, "↺ Z +15°", "↻ Z -15°"),
                ] {
                    ui.horizontal(|ui| {
                        let mut angles = [0.0; 3];
                        if self.styled_button(ui, label_pos, Vec2::new(140.0, 32.0)).clicked() {
                            angles[axis] = 15.0;
                        }
                        if self.styled_button(ui, label_neg, Vec2::new(140.0, 32.0)).clicked() {
                            angles[axis] = -15.0;
                        }
                        if angles[axis] != 0.0 {
                            self.apply_button_rotation(angles[0], angles[1], angles[2]);
                        }
                    });
                }
            });
        });

        ui.add_space(8.0);

        // Масштабирование
        ui.group(|ui| {
            ui.horizontal(|ui| {
                if self.styled_button(ui, "➕ Увеличить x1.1", Vec2::new(140.0, 32.0)).clicked() {
                    self.apply_button_scale(1.1);
                }
                if self.styled_button(ui, "➖ Уменьшить x0.9", Vec2::new(140.0, 32.0)).clicked() {
                    self.apply_button_scale(0.9);
                }
            });
        });

        ui.add_space(8.0);

        if self
            .styled_button(ui, "🔄 Сбросить преобразования", Vec2::new(ui.available_width(), 36.0))
            .clicked()
        {
            self.reset_current_object();
        }
    }

    fn render_material_controls(&mut self, ui: &mut Ui) {
        ui.separator();
        ui.add_space(10.0);
        ui.label("🎨 Параметры материала:");
        ui.add_space(5.0);

        let mut material_changed = false;
        if let Some(deform) = self.deform_box.as_mut() {
            ui.group(|ui| {
                ui.vertical(|ui| {
                    material_changed = Self::render_material_sliders(ui, deform.material_mut());
                });
            });
        }

        if material_changed {
            self.needs_redraw = true;
        }
    }

    fn render_material_sliders(ui: &mut Ui, material: &mut Material) -> bool {
        let mut changed = false;

        ui.label("Цвет:");
        let mut color = [
            material.color.0[0] as f32 / 255.0,
            material.color.0[1] as f32 / 255.0,
            material.color.0[2] as f32 / 255.0,
        ];
        if ui.color_edit_button_rgb(&mut color).changed() {
            material.color = image::Rgb([
                (color[0] * 255.0) as u8,
                (color[1] * 255.0) as u8,
                (color[2] * 255.0) as u8,
            ]);
            changed = true;
        }

        ui.add_space(5.0);

        for (label, value, range) in [
            ("Диффузное отражение:", &mut material.diffuse_reflectance_factor, 0.0..=1.0),
            ("Зеркальное отражение:", &mut material.specular_reflectance_factor, 0.0..=1.0),
            ("Глянцевость:", &mut material.gloss, 0.1..=15.0),
        ] {
            ui.label(label);
            if ui
                .add_sized(
                    Vec2::new(ui.available_width(), 20.0),
                    egui::Slider::new(value, range).step_by(0.01).fixed_decimals(2),
                )
                .changed()
            {
                changed = true;
            }
            ui.add_space(3.0);
        }

        changed
    }

    fn render_stats_line(&mut self, ui: &mut Ui) {
        ui.separator();
        ui.horizontal(|ui| {
            if let Some(deform) = self.deform_box.as_ref() {
                ui.label(format!(
                    "Вершин: {} | Граней: {} | Узлов решётки: {} | Пересчётов: {}",
                    deform.vertices().len(),
                    deform.triangles().len(),
                    deform.control_points().len(),
                    deform.recompute_count(),
                ));
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("FPS: {}", self.fps as u32));
                ui.label("📊");
            });
        });
        ui.add_space(5.0);
    }

    fn render_viewport(&mut self, ui: &mut Ui) {
        ui.separator();

        let available_size = ui.available_size();

        // Размер изображения в физических пикселях
        let pixels_per_point = ui.ctx().pixels_per_point();
        let viewport_width = (available_size.x * pixels_per_point) as u32;
        let viewport_height = (available_size.y * pixels_per_point) as u32;

        if viewport_width > 0 && viewport_height > 0 {
            self.update_viewport_size(viewport_width, viewport_height);
        }

        if let Some(texture) = &self.texture {
            let resp = ui.image((texture.id(), available_size));
            self.viewport_has_pointer = resp.hovered();
        } else {
            self.viewport_has_pointer = false;
        }
    }
}
