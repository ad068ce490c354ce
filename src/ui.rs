use glam::Vec3;

use crate::scene::{SceneState, MAX_LIGHTS};

/// Draws the settings window. Edits land directly in `scene` and take
/// effect on the next frame's update and draw steps.
pub fn draw_settings(ctx: &egui::Context, scene: &mut SceneState) {
    egui::Window::new("Settings").show(ctx, |ui| {
        ui.collapsing("Camera", |ui| {
            drag_vec3(ui, "Position", &mut scene.camera.position, 0.1);
            drag_vec3(ui, "Target", &mut scene.camera.target, 0.1);
            ui.checkbox(&mut scene.camera.orthographic, "Orthographic");
            if scene.camera.orthographic {
                ui.add(
                    egui::DragValue::new(&mut scene.camera.ortho_height)
                        .prefix("Ortho Height: ")
                        .speed(0.1),
                );
            } else {
                ui.add(
                    egui::Slider::new(&mut scene.camera.fov_degrees, 0.0..=180.0).text("FOV"),
                );
            }
            ui.add(
                egui::DragValue::new(&mut scene.camera.near_plane)
                    .prefix("Near Plane: ")
                    .speed(0.1),
            );
            ui.add(
                egui::DragValue::new(&mut scene.camera.far_plane)
                    .prefix("Far Plane: ")
                    .speed(0.1),
            );
            ui.add(
                egui::DragValue::new(&mut scene.controller.move_speed)
                    .prefix("Move Speed: ")
                    .speed(0.1),
            );
            ui.add(
                egui::DragValue::new(&mut scene.controller.sprint_move_speed)
                    .prefix("Sprint Speed: ")
                    .speed(0.1),
            );
            if ui.button("Reset").clicked() {
                scene.camera.reset(&mut scene.controller);
            }
        });

        color_edit(ui, "BG Color", &mut scene.background);
        ui.add(egui::Slider::new(&mut scene.light_count, 0..=MAX_LIGHTS).text("Light Count"));
        ui.checkbox(&mut scene.lights_orbit, "Orbiting Lights");
        ui.add(
            egui::DragValue::new(&mut scene.orbit_radius)
                .prefix("Orbit Radius: ")
                .speed(0.1)
                .range(0.5..=f32::INFINITY),
        );

        for index in 0..scene.light_count.min(MAX_LIGHTS) {
            ui.push_id(index, |ui| {
                ui.collapsing(format!("Light {index}"), |ui| {
                    drag_vec3(
                        ui,
                        "Position",
                        &mut scene.light_transforms[index].position,
                        0.1,
                    );
                    color_edit(ui, "Color", &mut scene.lights[index].color);
                });
            });
        }

        ui.collapsing("Material", |ui| {
            color_edit(ui, "Light Color", &mut scene.material.light_tint);
            ui.add(egui::Slider::new(&mut scene.material.ambient_k, 0.0..=1.0).text("Ambient"));
            ui.add(egui::Slider::new(&mut scene.material.diffuse_k, 0.0..=1.0).text("Diffuse"));
            ui.add(
                egui::Slider::new(&mut scene.material.specular_k, 0.0..=1.0).text("Specular"),
            );
            ui.add(
                egui::Slider::new(&mut scene.material.shininess, 2.0..=100.0).text("Shininess"),
            );
        });

        ui.collapsing("Particles", |ui| {
            ui.checkbox(&mut scene.emit_particles, "Emit");
            ui.add(
                egui::DragValue::new(&mut scene.particles_per_second)
                    .prefix("Rate: ")
                    .speed(1.0)
                    .range(0.0..=1000.0),
            );
            drag_vec3(ui, "Emitter", &mut scene.emitter_position, 0.1);
        });
    });
}

fn drag_vec3(ui: &mut egui::Ui, label: &str, value: &mut Vec3, speed: f32) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::DragValue::new(&mut value.x).prefix("X: ").speed(speed));
        ui.add(egui::DragValue::new(&mut value.y).prefix("Y: ").speed(speed));
        ui.add(egui::DragValue::new(&mut value.z).prefix("Z: ").speed(speed));
    });
}

fn color_edit(ui: &mut egui::Ui, label: &str, value: &mut Vec3) {
    ui.horizontal(|ui| {
        ui.label(label);
        let mut rgb = value.to_array();
        if ui.color_edit_button_rgb(&mut rgb).changed() {
            *value = Vec3::from(rgb);
        }
    });
}
