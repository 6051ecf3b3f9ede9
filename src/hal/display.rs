//! Graphics console interface.
//!
//! Rendering is a collaborator concern; the core only needs colored
//! text output, so the boundary is `ufmt::uWrite` plus color and clear
//! controls.

use ufmt::uWrite;

#[derive(Debug, Copy, Clone, PartialEq, Eq, defmt::Format)]
pub enum Color {
    White,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Violet,
    /// Used for downgraded, non-selectable menu entries.
    Gray,
}

pub trait TextDisplay: uWrite {
    fn set_color(&mut self, color: Color);
    fn clear(&mut self);
}
