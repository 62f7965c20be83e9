use image::Rgb;
use std::f64::consts::FRAC_PI_2;

pub const BACKGROUND_COLOR: Rgb<u8> = Rgb([70, 70, 70]);
pub const LATTICE_COLOR: Rgb<u8> = Rgb([235, 200, 60]);

// Camera settings
pub const FOV_DEGREES: f64 = 60.0;
pub const ASPECT_RATIO: f64 = 1.0;
pub const NEAR_PLANE: f64 = 0.1;
pub const FAR_PLANE: f64 = 1000.0;

// Light behavior settings
pub const AMBIENT_INTENSITY: f64 = 0.05;
pub const LIGHT_SCATTERING: f64 = 0.1;

// User interaction settings
pub const SCALING_SENSITIVITY_FACTOR: f32 = 0.002;
pub const ROTATION_SENSITIVITY_FACTOR: f32 = 0.2;

// Lattice settings
pub const DEFAULT_LATTICE_DEGREE: usize = 4;
pub const RANDOM_SHIFT_DISTANCE: f64 = 2.0;
pub const RANDOM_SHIFT_MAX_ANGLE: f64 = FRAC_PI_2;
pub const STRETCH_STEP: f64 = 1.1;
