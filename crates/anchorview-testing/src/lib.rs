//! Testing utilities and harness for Anchorview

pub mod assertions;
pub mod compositor;
pub mod recording;
pub mod testing;

// Re-export testing utilities
pub use compositor::ScriptedCompositor;
pub use recording::{RecordedCall, RecordingRenderer};
pub use testing::*;

pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::compositor::ScriptedCompositor;
    pub use crate::recording::{RecordedCall, RecordingRenderer};
    pub use crate::testing::*;
}
