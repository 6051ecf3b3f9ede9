//! Menu model and the interface to the full-screen menu driver.
//!
//! Items are a sum type rather than a mutable polymorphic record: an
//! action can be downgraded to a non-selectable caption (used to gray
//! out an option whose backing device is unavailable), and the
//! transition is explicit and one-way.

use crate::hal::display::{Color, TextDisplay};
use alloc::string::String;
use alloc::vec::Vec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem<A> {
    /// Selectable entry dispatching `action`.
    Action { caption: String, color: Color, action: A },
    /// Non-selectable text entry.
    Caption { caption: String, color: Color },
    Separator,
}

impl<A: Copy> MenuItem<A> {
    pub fn action(caption: &str, color: Color, action: A) -> Self {
        MenuItem::Action { caption: caption.into(), color, action }
    }

    pub fn caption(caption: &str, color: Color) -> Self {
        MenuItem::Caption { caption: caption.into(), color }
    }

    /// Downgrades an action to a gray, non-selectable caption. Captions
    /// and separators are unaffected.
    pub fn disable(&mut self) {
        if let MenuItem::Action { caption, .. } = self {
            *self = MenuItem::Caption { caption: core::mem::take(caption), color: Color::Gray };
        }
    }

    pub fn action_target(&self) -> Option<A> {
        match self {
            MenuItem::Action { action, .. } => Some(*action),
            _ => None,
        }
    }

    pub fn caption_text(&self) -> Option<&str> {
        match self {
            MenuItem::Action { caption, .. } | MenuItem::Caption { caption, .. } => Some(caption),
            MenuItem::Separator => None,
        }
    }
}

/// An ordered menu. The end of the collection is the end of the menu;
/// no terminator entry is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu<A> {
    items: Vec<MenuItem<A>>,
}

impl<A: Copy> Menu<A> {
    pub fn new() -> Self { Self { items: Vec::new() } }

    pub fn push(&mut self, item: MenuItem<A>) { self.items.push(item); }

    pub fn items(&self) -> &[MenuItem<A>] { &self.items }

    /// Action dispatched by the item at `index`, if it is selectable.
    pub fn action_at(&self, index: usize) -> Option<A> {
        self.items.get(index).and_then(MenuItem::action_target)
    }

    pub fn disable(&mut self, index: usize) {
        if let Some(item) = self.items.get_mut(index) {
            item.disable();
        }
    }

    pub fn caption_mut(&mut self, index: usize) -> Option<&mut String> {
        match self.items.get_mut(index) {
            Some(MenuItem::Action { caption, .. }) | Some(MenuItem::Caption { caption, .. }) => {
                Some(caption)
            }
            _ => None,
        }
    }
}

impl<A: Copy> Default for Menu<A> {
    fn default() -> Self { Self::new() }
}

/// The full-screen menu driver collaborator. Presenting a menu blocks
/// on user input and yields the selected action; `None` means the
/// driver itself gave up, which the orchestrator treats as terminal.
pub trait MenuDriver: TextDisplay {
    fn present<A: Copy>(&mut self, menu: &Menu<A>) -> Option<A>;
}

#[cfg(not(target_arch = "arm"))]
#[doc(hidden)]
pub mod doubles {
    use super::*;
    use crate::hal::doubles::display::FakeDisplay;
    use std::collections::VecDeque;
    use ufmt::uWrite;

    /// Menu driver scripted with item indices to "select". An exhausted
    /// script, a `None` entry, or an index without an action all present
    /// as driver exit.
    #[derive(Debug, Default)]
    pub struct FakeMenuDriver {
        pub display: FakeDisplay,
        pub script: VecDeque<Option<usize>>,
    }

    impl FakeMenuDriver {
        pub fn with_script(selections: &[Option<usize>]) -> Self {
            Self { display: FakeDisplay::default(), script: selections.iter().copied().collect() }
        }
    }

    impl uWrite for FakeMenuDriver {
        type Error = core::convert::Infallible;

        fn write_str(&mut self, text: &str) -> Result<(), Self::Error> {
            self.display.write_str(text)
        }
    }

    impl crate::hal::display::TextDisplay for FakeMenuDriver {
        fn set_color(&mut self, color: Color) { self.display.set_color(color); }
        fn clear(&mut self) { self.display.clear(); }
    }

    impl MenuDriver for FakeMenuDriver {
        fn present<A: Copy>(&mut self, menu: &Menu<A>) -> Option<A> {
            self.script.pop_front().flatten().and_then(|index| menu.action_at(index))
        }
    }
}
