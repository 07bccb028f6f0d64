pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod assets;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::config::{FlashConfig, FxConfig, RaysConfig, ShakeConfig};
pub use api::error::{FxError, FxResult};
pub use api::types::{EffectId, NodeId, TweenId};
pub use assets::textures::{TextureDesc, TextureId};
pub use components::color::{Color, PALETTE};
pub use components::node::{Node, Visual};
pub use crate::core::cancel::CancelToken;
pub use crate::core::clock::FrameClock;
pub use crate::core::completion::Completion;
pub use crate::core::scene::Scene;
pub use renderer::instance::{RenderBuffer, RenderInstance, ShapeVertex};
pub use systems::effects::{
    EffectHandle, FadeMode, Particle, ParticleKind, ParticleSystem, Range, Rng, SpawnOverrides, SpawnParams,
    SpawnTable,
};
pub use systems::render::build_render_buffer;

// Extensions: tweening, usable without the particle system
pub use extensions::{ease, lerp, Easing, Tween, TweenHandle, TweenScheduler};
