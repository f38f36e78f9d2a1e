#![no_std]

//! Bootstrap boundary between the native runtime and the application.
//!
//! [`boot`] hands control to the foreign entry point, [`capabilities`] exposes the
//! peripheral interfaces selected by cargo features, [`app`] is what the entry point runs.

#[cfg(test)]
extern crate std;

#[macro_use]
extern crate log;

#[macro_use]
pub mod console;
pub mod app;
pub mod boot;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod logger;

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;
