//! joltwallet/littlefs component mounted into the IDF VFS.

use core::ffi::{c_char, c_int, c_void};
use core::fmt;
use core::ptr;

use hal::fs::{FileSystem, MountConfig, Usage};
use heapless::Vec;

use super::newlib::{self, F_OK, O_CREAT, O_RDONLY, O_TRUNC, O_WRONLY};
use super::{c_string, esp_err_t, EspError};

pub const MAX_PATH: usize = 64;
const MAX_LABEL: usize = 17;

const FORMAT_IF_MOUNT_FAILED: u8 = 1 << 0;
const READ_ONLY: u8 = 1 << 1;
const GROW_ON_MOUNT: u8 = 1 << 3;

#[repr(C)]
struct esp_vfs_littlefs_conf_t {
    base_path: *const c_char,
    partition_label: *const c_char,
    partition: *const c_void,
    flags: u8,
}

extern "C" {
    fn esp_vfs_littlefs_register(conf: *const esp_vfs_littlefs_conf_t) -> esp_err_t;
    fn esp_vfs_littlefs_unregister(partition_label: *const c_char) -> esp_err_t;
    fn esp_littlefs_mounted(partition_label: *const c_char) -> bool;
    fn esp_littlefs_info(partition_label: *const c_char, total: *mut usize, used: *mut usize) -> esp_err_t;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Esp(EspError),
    /// errno of the failed file call
    Io(c_int),
    NotMounted,
    PathTooLong,
    BufferTooSmall,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Esp(e) => write!(f, "{}", e),
            Self::Io(errno) => write!(f, "io error {}", errno),
            Self::NotMounted => write!(f, "not mounted"),
            Self::PathTooLong => write!(f, "path too long"),
            Self::BufferTooSmall => write!(f, "buffer too small"),
        }
    }
}

type Path = Vec<u8, MAX_PATH>;

fn path(path: &str) -> Result<Path, Error> {
    c_string(path).ok_or(Error::PathTooLong)
}

struct Fd(c_int);

impl Fd {
    fn open(path: &Path, flags: c_int) -> Result<Self, Error> {
        let fd = unsafe { newlib::open(path.as_ptr() as *const c_char, flags, 0o644 as c_int) };
        match fd {
            fd if fd < 0 => Err(Error::Io(newlib::errno())),
            fd => Ok(Self(fd)),
        }
    }
}

impl Drop for Fd {
    fn drop(&mut self) {
        unsafe { newlib::close(self.0) };
    }
}

#[derive(Default)]
pub struct LittleFs {
    label: Option<Vec<u8, MAX_LABEL>>,
}

impl LittleFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn label(&self) -> Result<*const c_char, Error> {
        self.label.as_ref().map(|label| label.as_ptr() as *const c_char).ok_or(Error::NotMounted)
    }
}

impl FileSystem for LittleFs {
    type Error = Error;

    fn mount(&mut self, config: &MountConfig) -> Result<(), Error> {
        let base_path: Vec<u8, MAX_PATH> = c_string(config.base_path).ok_or(Error::PathTooLong)?;
        let label: Vec<u8, MAX_LABEL> = c_string(config.partition_label).ok_or(Error::PathTooLong)?;
        let mut flags = 0;
        if config.format_if_mount_failed {
            flags |= FORMAT_IF_MOUNT_FAILED;
        }
        if config.read_only {
            flags |= READ_ONLY;
        }
        if config.grow_on_mount {
            flags |= GROW_ON_MOUNT;
        }
        let conf = esp_vfs_littlefs_conf_t {
            base_path: base_path.as_ptr() as *const c_char,
            partition_label: label.as_ptr() as *const c_char,
            partition: ptr::null(),
            flags,
        };
        crate::esp!(esp_vfs_littlefs_register(&conf)).map_err(Error::Esp)?;
        info!("Mounted partition {} on {}", config.partition_label, config.base_path);
        self.label = Some(label);
        Ok(())
    }

    fn unmount(&mut self) -> Result<(), Error> {
        let label = self.label()?;
        crate::esp!(esp_vfs_littlefs_unregister(label)).map_err(Error::Esp)?;
        self.label = None;
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        match self.label() {
            Ok(label) => unsafe { esp_littlefs_mounted(label) },
            Err(_) => false,
        }
    }

    fn exists(&self, file: &str) -> Result<bool, Error> {
        self.label()?;
        let file = path(file)?;
        Ok(unsafe { newlib::access(file.as_ptr() as *const c_char, F_OK) } == 0)
    }

    fn read(&self, file: &str, buf: &mut [u8]) -> Result<usize, Error> {
        self.label()?;
        let fd = Fd::open(&path(file)?, O_RDONLY)?;
        let mut size = 0;
        loop {
            let remain = &mut buf[size..];
            if remain.is_empty() {
                let mut probe = [0u8; 1];
                return match unsafe { newlib::read(fd.0, probe.as_mut_ptr() as *mut c_void, 1) } {
                    0 => Ok(size),
                    _ => Err(Error::BufferTooSmall),
                };
            }
            let count = unsafe { newlib::read(fd.0, remain.as_mut_ptr() as *mut c_void, remain.len()) };
            match count {
                0 => return Ok(size),
                count if count < 0 => return Err(Error::Io(newlib::errno())),
                count => size += count as usize,
            }
        }
    }

    fn write(&mut self, file: &str, mut bytes: &[u8]) -> Result<(), Error> {
        self.label()?;
        let fd = Fd::open(&path(file)?, O_WRONLY | O_CREAT | O_TRUNC)?;
        while !bytes.is_empty() {
            let count = unsafe { newlib::write(fd.0, bytes.as_ptr() as *const c_void, bytes.len()) };
            if count <= 0 {
                return Err(Error::Io(newlib::errno()));
            }
            bytes = &bytes[count as usize..];
        }
        Ok(())
    }

    fn remove(&mut self, file: &str) -> Result<(), Error> {
        self.label()?;
        match unsafe { newlib::unlink(path(file)?.as_ptr() as *const c_char) } {
            0 => Ok(()),
            _ => Err(Error::Io(newlib::errno())),
        }
    }

    fn usage(&self) -> Result<Usage, Error> {
        let label = self.label()?;
        let (mut total, mut used) = (0usize, 0usize);
        crate::esp!(esp_littlefs_info(label, &mut total, &mut used)).map_err(Error::Esp)?;
        Ok(Usage { total, used })
    }
}
