//! Convenience macros for printing to an abstract text display.
#![macro_use]

/// Prints to an abstract text display.
#[macro_export]
macro_rules! cprint {
    ($display:expr, $($args:tt)*) => {
        ufmt::uwrite!($display, $($args)*).ok().unwrap()
    };
}

/// Prints to an abstract text display, with newline.
#[macro_export]
macro_rules! cprintln {
    ($display:expr, $($args:tt)*) => {
        ufmt::uwriteln!($display, $($args)*).ok().unwrap()
    };
}

#[cfg(test)]
mod test {
    use crate::hal::doubles::display::FakeDisplay;

    #[test]
    fn cprint_macro_writes_text_with_no_newline() {
        // Given
        let mut display = FakeDisplay::default();
        let arbitrary_message = "Hello world!";

        // When
        cprint!(display, "{}", arbitrary_message);

        // Then
        assert_eq!(arbitrary_message, display.text);
    }

    #[test]
    fn cprintln_macro_appends_newline() {
        // Given
        let mut display = FakeDisplay::default();

        // When
        cprintln!(display, "{}", "Hello world with newline!");

        // Then
        assert_eq!("Hello world with newline!\n", display.text);
    }
}
