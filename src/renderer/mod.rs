//! Rendering module
//!
//! `scene` projects the session into a screen-space triangle list; `raster`
//! turns that list into pixels on the CPU.

pub mod raster;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use raster::{Canvas, rasterize};
pub use scene::{Frame, build_frame};
pub use vertex::Vertex;
