//! POSIX file calls provided by newlib and routed through the IDF VFS.

use core::ffi::{c_char, c_int, c_void};

pub const O_RDONLY: c_int = 0;
pub const O_WRONLY: c_int = 1;
pub const O_CREAT: c_int = 0x0200;
pub const O_TRUNC: c_int = 0x0400;
pub const F_OK: c_int = 0;

pub const ENOENT: c_int = 2;

extern "C" {
    pub fn open(path: *const c_char, flags: c_int, ...) -> c_int;
    pub fn read(fd: c_int, buf: *mut c_void, count: usize) -> isize;
    pub fn write(fd: c_int, buf: *const c_void, count: usize) -> isize;
    pub fn close(fd: c_int) -> c_int;
    pub fn unlink(path: *const c_char) -> c_int;
    pub fn access(path: *const c_char, mode: c_int) -> c_int;
    fn __errno() -> *mut c_int;
}

pub fn errno() -> c_int {
    unsafe { *__errno() }
}
