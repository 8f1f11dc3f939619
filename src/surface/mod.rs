//! Raster surface primitives shared by every effect category.

pub mod blur;
pub mod composite;
pub mod frame;
pub mod history;
pub mod mask;
pub mod painter;
pub mod text;
