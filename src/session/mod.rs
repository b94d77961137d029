//! Session: one clock, an optional sheet and the surface they drive.

pub mod beat_session;

pub use beat_session::{BeatSession, BeatSessionOpts, FrameReport};
