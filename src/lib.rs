// Copyright 2026 The pic18f4620-hal authors.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Interrupt subsystem for the PIC18F4620
//!
//! The PIC18F4620 has one interrupt vector, or two once the priority feature is enabled, shared
//! by nineteen sources. This crate multiplexes those vectors onto per-source callbacks and
//! provides the register and GPIO plumbing the interrupt drivers need, including an
//! implementation of the [`embedded-hal`] digital traits.
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal
//!
//! # Usage
//!
//! Hardware is reached through the [`RegisterFile`](registers::RegisterFile) trait.
//! [`Pic18`](registers::Pic18) maps it onto the special function registers, and
//! [`SimulatedRegisters`](sim::SimulatedRegisters) keeps it in memory so the drivers can run
//! on a host.
//!
//! ```rust
//! use pic18f4620_hal::interrupt::{Config, InterruptManager, OnChangeConfig, OnChangePin};
//! use pic18f4620_hal::sim::SimulatedRegisters;
//! use pic18f4620_hal::Error;
//!
//! static MANAGER: InterruptManager<SimulatedRegisters> =
//!     InterruptManager::new(SimulatedRegisters::new(), Config::priority());
//!
//! fn pressed() {}
//! fn released() {}
//!
//! let button = OnChangeConfig::new(OnChangePin::Rb4, Some(released), Some(pressed));
//! match MANAGER.init_on_change(&button) {
//!     Ok(()) => {}
//!     // Built without the `ext-on-change` feature.
//!     Err(Error::SourceDisabled) => {}
//!     Err(e) => panic!("{}", e),
//! }
//!
//! // Bound to the high priority vector by the application:
//! MANAGER.on_high_priority();
//! ```
//!
//! ## Cargo features
//!
//! Each interrupt source has a feature, all on by default. A source whose feature is disabled
//! is left out of the dispatch table and its initialisation returns
//! [`Error::SourceDisabled`].

#![no_std]
#![deny(rustdoc::broken_intra_doc_links)]

use core::fmt;

pub mod gpio;
pub mod interrupt;
pub mod prelude;
pub mod registers;
pub mod sim;

/// Errors returned by the drivers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// A pin or priority the source cannot use.
    InvalidArgument,
    /// The source is not part of the dispatch table.
    SourceDisabled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => f.write_str("invalid argument"),
            Error::SourceDisabled => f.write_str("interrupt source not in the dispatch table"),
        }
    }
}
