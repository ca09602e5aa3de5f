//! Audio capture: device access, the `AudioSource` seam, and framing.
//!
//! The capture side's only job is to hand fixed-size PCM frames to the
//! session driver's queue; everything downstream treats audio as opaque
//! bytes.

pub mod capture;
pub mod framer;
pub mod source;

pub use capture::{CpalAudioSource, list_devices};
pub use framer::{AudioFrame, Framer, FramerHandle};
pub use source::{AudioSource, MockAudioSource};
