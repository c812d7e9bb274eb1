// Copyright 2026 The pic18f4620-hal authors.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Interrupt subsystem
//!
//! The PIC18F4620 funnels every interrupt source into one vector (flat mode) or two
//! (priority mode). This module multiplexes those vectors back onto per-source callbacks:
//!
//! - [`config`]: the global architecture and master enable bits.
//! - [`internal`]: the enable/disable/clear/priority façade for every source and the
//!   [`InterruptService`] contract for peripheral drivers.
//! - [`external`]: INT0..INT2 and the RB4..RB7 on-change group, including the software edge
//!   inference the shared RBIF flag needs.
//! - [`manager`]: the [`InterruptManager`] that owns all callback slots and whose
//!   `on_*` methods are meant to be called from the hardware vectors.
//!
//! ```rust
//! use pic18f4620_hal::interrupt::{Config, Edge, ExternalSource, InterruptManager, IntxConfig};
//! use pic18f4620_hal::sim::SimulatedRegisters;
//! use pic18f4620_hal::Error;
//!
//! static MANAGER: InterruptManager<SimulatedRegisters> =
//!     InterruptManager::new(SimulatedRegisters::new(), Config::flat());
//!
//! fn button_pressed() {}
//!
//! let button = IntxConfig::new(ExternalSource::Int0, Edge::Falling, Some(button_pressed));
//! match MANAGER.init_intx(&button) {
//!     Ok(()) => {}
//!     // Built without the `ext-intx` feature.
//!     Err(Error::SourceDisabled) => {}
//!     Err(e) => panic!("{}", e),
//! }
//!
//! // Bound to the interrupt vector by the application:
//! MANAGER.on_interrupt();
//! ```

pub mod config;
pub mod external;
pub mod internal;
pub mod manager;
mod source;

pub use config::{Architecture, Config, GlobalInterrupts};
pub use external::{EdgeState, ExternalSource, IntxConfig, OnChangeConfig, OnChangePin};
pub use internal::{InterruptControl, InterruptService, PeripheralHandler};
pub use manager::{DispatchEntry, DispatchTable, InterruptManager};
pub use source::{Source, SourceKind, SourceSet};

/// A parameterless interrupt callback.
pub type Handler = fn();

/// Interrupt priority level, meaningful in [`Architecture::Priority`] only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority {
    Low,
    High,
}

/// Signal edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Falling,
    Rising,
}
