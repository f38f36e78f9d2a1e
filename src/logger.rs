use core::fmt::{self, Display, Formatter, Write};
use core::str::from_utf8;

use heapless::String;
use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

pub const MAX_LINE: usize = 256;

/// Milliseconds since boot
pub type Clock = fn() -> u64;
/// Receives every formatted line without line terminator
pub type Sink = fn(&str);

/// Ring of the most recent log output, oldest bytes are overwritten first.
#[derive(Default)]
pub struct LogBuffer {
    buffer: Option<&'static mut [u8]>,
    index: usize,
}

impl LogBuffer {
    pub fn new(buffer: &'static mut [u8]) -> Self {
        Self { buffer: Some(buffer), index: 0 }
    }

    fn segments(&self) -> (&[u8], &[u8]) {
        let buffer = match self.buffer.as_deref() {
            Some(buffer) if !buffer.is_empty() => buffer,
            _ => return (&[], &[]),
        };
        if self.index <= buffer.len() {
            return (&buffer[..self.index], &[]);
        }
        let split = self.index % buffer.len();
        let (head, tail) = buffer.split_at(split);
        // drop a character cut by wrapping
        let start = tail.iter().position(|b| b & 0xC0 != 0x80).unwrap_or(tail.len());
        (&tail[start..], head)
    }

    pub fn len(&self) -> usize {
        let (first, second) = self.segments();
        first.len() + second.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index == 0
    }
}

impl Write for LogBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let buffer = match self.buffer.as_deref_mut() {
            Some(buffer) if !buffer.is_empty() => buffer,
            _ => return Ok(()),
        };
        let size = buffer.len();
        let mut bytes = s.as_bytes();
        if bytes.len() > size {
            self.index += bytes.len() - size;
            bytes = &bytes[bytes.len() - size..];
        }
        let index = self.index % size;
        self.index += bytes.len();
        if size - index >= bytes.len() {
            buffer[index..index + bytes.len()].copy_from_slice(bytes);
            return Ok(());
        }
        let partial_size = size - index;
        buffer[index..].copy_from_slice(&bytes[..partial_size]);
        buffer[..bytes.len() - partial_size].copy_from_slice(&bytes[partial_size..]);
        Ok(())
    }
}

impl Display for LogBuffer {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let (first, second) = self.segments();
        for segment in [first, second] {
            match from_utf8(segment) {
                Ok(text) => f.write_str(text)?,
                Err(e) => f.write_str(from_utf8(&segment[..e.valid_up_to()]).unwrap_or(""))?,
            }
        }
        Ok(())
    }
}

#[derive(Copy, Clone)]
struct Settings {
    clock: Clock,
    sink: Option<Sink>,
}

fn since_boot() -> u64 {
    0
}

static LOG_BUFFER: Mutex<LogBuffer> = Mutex::new(LogBuffer { buffer: None, index: 0 });
static SETTINGS: Mutex<Settings> = Mutex::new(Settings { clock: since_boot, sink: None });

pub struct Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let settings = *SETTINGS.lock();
        let millis = (settings.clock)();
        let mut line: String<MAX_LINE> = String::new();
        let (secs, millis) = (millis / 1000, millis % 1000);
        let (level, target) = (record.level(), record.target());
        write!(line, "[{:5}.{:03}] {:<5} {}: {}", secs, millis, level, target, record.args()).ok();
        if let Some(sink) = settings.sink {
            sink(&line);
        }
        writeln!(LOG_BUFFER.lock(), "{}", line).ok();
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;

/// Writes the retained log history into `writer`
pub fn dump<W: Write>(writer: &mut W) -> fmt::Result {
    write!(writer, "{}", *LOG_BUFFER.lock())
}

pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}

pub fn init(buffer: &'static mut [u8], level: LevelFilter, clock: Clock, sink: Option<Sink>) {
    *LOG_BUFFER.lock() = LogBuffer::new(buffer);
    *SETTINGS.lock() = Settings { clock, sink };
    log::set_max_level(level);
    log::set_logger(&LOGGER).ok();
}
