pub mod color;
pub mod node;

pub use color::{Color, PALETTE};
pub use node::{Node, Visual};
