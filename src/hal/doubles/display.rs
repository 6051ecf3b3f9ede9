use crate::hal::display::{Color, TextDisplay};
use core::convert::Infallible;
use ufmt::uWrite;

#[derive(Debug, Default)]
pub struct FakeDisplay {
    pub text: String,
    pub colors: Vec<Color>,
    pub clears: u32,
}

impl uWrite for FakeDisplay {
    type Error = Infallible;

    fn write_str(&mut self, text: &str) -> Result<(), Self::Error> {
        self.text.push_str(text);
        Ok(())
    }
}

impl TextDisplay for FakeDisplay {
    fn set_color(&mut self, color: Color) { self.colors.push(color); }

    fn clear(&mut self) {
        self.clears += 1;
        self.text.clear();
    }
}
