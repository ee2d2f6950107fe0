#[macro_use]
extern crate rocket;

pub mod cache;
pub mod color;
pub mod compositor;
pub mod config;
pub mod contrast;
pub mod encoder;
pub mod error;
pub mod layout;
pub mod logo;
pub mod models;
pub mod qr;
pub mod raster;
pub mod routes;
pub mod shapes;
pub mod surface;
pub mod verify;

pub use color::Color;
pub use config::{CornerStyle, DotStyle, ErrorCorrectionLevel, LogoShape, StyleConfig};
pub use error::{RenderError, Result};
pub use qr::{generate, generate_png, generate_svg, Rendered};
