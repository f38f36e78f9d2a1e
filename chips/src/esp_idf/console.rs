use core::fmt;

use super::newlib;

const STDOUT: i32 = 1;

/// Standard output of the IDF console, usually UART0 or USB serial JTAG.
#[derive(Copy, Clone, Debug, Default)]
pub struct Console;

impl fmt::Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            let written = unsafe { newlib::write(STDOUT, bytes.as_ptr() as *const _, bytes.len()) };
            if written <= 0 {
                return Err(fmt::Error);
            }
            bytes = &bytes[written as usize..];
        }
        Ok(())
    }
}
