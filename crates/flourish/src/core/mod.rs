pub mod cancel;
pub mod clock;
pub mod completion;
pub mod scene;
