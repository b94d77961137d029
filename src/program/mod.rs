//! Overlay programs that own fine cells: the pixel writer and the ring.

pub mod frame_loop;
pub mod ring;
pub mod writer;

use crate::surface::{Layer, ProgramTag, RenderSurface};

/// Unmark every fine cell owned by `tag`. Returns how many were cleared.
pub(crate) fn clear_owned(surface: &mut dyn RenderSurface, tag: ProgramTag) -> usize {
    let mut cleared = 0;
    for at in surface.layer_coords(Layer::Fine) {
        if let Some(paint) = surface.cell_mut(Layer::Fine, at)
            && paint.unmark(tag)
        {
            cleared += 1;
        }
    }
    cleared
}
