pub mod animation;
pub mod frame;
pub mod palette;

pub use animation::{sort_frames, AnimationEncoder};
pub use frame::{Frame, FrameRenderer};
pub use palette::{ColorDomain, Palette};
