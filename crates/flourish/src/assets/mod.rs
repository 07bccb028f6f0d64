pub mod textures;

pub use textures::{star_outline, TextureDesc, TextureId};
