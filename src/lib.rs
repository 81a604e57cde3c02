//! Bit-banged I2C master over two GPIO lines.
//!
//! Both lines are driven open-drain: a line is pulled low by switching it to
//! output with its latch set low, and released by switching it back to input
//! so the pull-up brings it high. The pins are reached through the [`Wire`]
//! trait; [`PinWire`] adapts `embedded-hal` pins, [`trace::LoggingWire`] and
//! [`trace::DetachedWire`] help with debugging.
//!
//! [`I2cMaster`] offers byte-level primitives, block transfers framed
//! according to [`BusConfig`], and implements [`embedded_hal::i2c::I2c`] so
//! drivers such as [`m24sr::NfcTag`] can run on top of it.
//!
//! ```ignore
//! let wire = PinWire::new(&BusConfig::default(), scl, sda);
//! let mut master = I2cMaster::with_defaults(wire, delay);
//! master.write_block(0x50, &[0x00, 0x10])?;
//! ```
#![cfg_attr(not(test), no_std)]
mod fmt;

mod config;
mod error;
mod hal;
pub mod m24sr;
mod master;
mod primitive;
#[cfg(test)]
mod sim;
pub mod trace;
mod wire;

pub use config::{BusConfig, Line};
pub use error::{Error, ErrorKind, TagError};
pub use master::I2cMaster;
pub use wire::{PinWire, Wire};
