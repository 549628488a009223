//! Transformed demo variant.

use std::process::ExitCode;

use glow_triangle_demo::{app, DemoConfig, Variant};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    app::launch(DemoConfig::new(Variant::Transformed))
}
