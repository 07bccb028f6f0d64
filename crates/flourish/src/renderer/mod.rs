pub mod instance;

pub use instance::{RenderBuffer, RenderInstance, ShapeVertex};
