//! Pulsegrid is a beat-synchronized pixel-grid animation engine.
//!
//! A musical clock turns host time into bar/beat/sub-beat positions, a sheet maps those
//! positions to actions, and a dispatcher applies the actions to a two-layer cell grid:
//!
//! - Fit a [`GridLayout`] to a viewport and mount a [`RenderSurface`]
//! - Load a [`Sheet`] from JSON or build one with [`SheetBuilder`]
//! - Drive a [`BeatSession`] one frame at a time, or rasterize it with [`rasterize`]
#![forbid(unsafe_code)]

/// Typed actions and the dispatcher that applies them.
pub mod action;
/// Meter math, pulse palettes and the per-session clock.
pub mod clock;
pub mod foundation;
/// Segment and bitmap fonts.
pub mod glyph;
/// Viewport to grid fitting.
pub mod layout;
pub mod program;
pub mod session;
/// Sheet model, JSON loading and the builder API.
pub mod sheet;
/// Cell state, the render-surface seam and the in-memory surface.
pub mod surface;

pub use crate::action::dispatch::{DispatchCtx, Dispatcher};
pub use crate::action::grammar::Action;
pub use crate::clock::meter::{MeterConfig, MusicalPosition};
pub use crate::clock::palette::{PaletteMode, PulseStyle};
pub use crate::clock::scheduler::{ClockHandle, ClockState, StartOpts};
pub use crate::foundation::core::{CellCoord, Color, Shadow, Viewport};
pub use crate::foundation::error::{PulseError, PulseResult};
pub use crate::layout::grid::{GridLayout, compute_grid_layout};
pub use crate::session::{BeatSession, BeatSessionOpts, FrameReport};
pub use crate::sheet::builder::{SheetBuilder, create_sheet};
pub use crate::sheet::loader::load_sheet;
pub use crate::sheet::model::{Sheet, SheetEvent};
pub use crate::sheet::parse::parse_sheet_json;
pub use crate::surface::raster::{RasterOpts, rasterize};
pub use crate::surface::{GridSurface, RenderSurface};
