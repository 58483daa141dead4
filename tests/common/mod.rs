#![allow(dead_code)]

pub mod synthetic_image;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}
