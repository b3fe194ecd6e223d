//! Video frames shared by the capture source and the mascot compositor.
//!
//! * [`VideoSource`]: play/pause/end state plus "copy the current frame".
//! * [`FrameSequence`]: a decoded list of frames loaded with `image`.
//! * [`StillImage`]: a JPEG-encoded snapshot ready for the wire.

pub mod sequence;
pub mod still;

pub use sequence::{FrameSequence, SourceError, VideoSource};
pub use still::StillImage;
