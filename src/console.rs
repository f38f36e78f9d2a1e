//! Global console sink behind `print!` and `println!`.

use core::fmt::{self, Write};

use spin::Mutex;

type Sink = &'static mut (dyn Write + Send);

static CONSOLE: Mutex<Option<Sink>> = Mutex::new(None);

#[doc(hidden)]
pub fn __write_console(args: fmt::Arguments) {
    if let Some(console) = CONSOLE.lock().as_mut() {
        console.write_fmt(args).ok();
    }
}

#[doc(hidden)]
pub fn __write_console_literal(message: &'static str) {
    if let Some(console) = CONSOLE.lock().as_mut() {
        console.write_str(message).ok();
    }
}

#[macro_export]
macro_rules! print {
    ($message:literal) => {
        $crate::console::__write_console_literal($message)
    };
    ($($arg:tt)+) => {
        $crate::console::__write_console(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! println {
    () => {
        $crate::console::__write_console_literal("\r\n")
    };
    ($message:literal) => ({
        $crate::console::__write_console_literal($message);
        $crate::console::__write_console_literal("\r\n");
    });
    ($($arg:tt)+) => ({
        $crate::console::__write_console(format_args!($($arg)+));
        $crate::console::__write_console_literal("\r\n");
    });
}

/// Replaces the console writer, returning the previous one.
pub fn init(writer: Sink) -> Option<Sink> {
    CONSOLE.lock().replace(writer)
}

pub fn take() -> Option<Sink> {
    CONSOLE.lock().take()
}

#[cfg(test)]
mod test {
    use core::fmt;
    use std::boxed::Box;
    use std::string::String;
    use std::sync::Mutex;
    use std::vec;

    static CAPTURED: Mutex<String> = Mutex::new(String::new());

    struct Capture;

    impl fmt::Write for Capture {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            CAPTURED.lock().unwrap().push_str(s);
            Ok(())
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_println() {
        super::init(Box::leak(Box::new(Capture)));
        print!("status: ");
        println!("{}", -1);
        println!("done");
        assert!(super::take().is_some());
        println!("dropped");
        assert_eq!(*CAPTURED.lock().unwrap(), "status: -1\r\ndone\r\n");
    }
}
