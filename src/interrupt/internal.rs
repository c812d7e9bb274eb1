// Copyright 2026 The pic18f4620-hal authors.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-source interrupt control and the contract between the dispatcher and peripheral
//! drivers.

use core::cell::Cell;

use critical_section::Mutex;

use crate::registers::RegisterFile;
use crate::Error;

use super::source::Source;
use super::{Handler, Priority};

/// Stateless bit-level control of every interrupt source.
pub struct InterruptControl<'a, R> {
    regs: &'a R,
}

impl<'a, R: RegisterFile> InterruptControl<'a, R> {
    pub fn new(regs: &'a R) -> Self {
        InterruptControl { regs }
    }

    pub fn enable(&self, source: Source) {
        self.regs.set_bit(source.enable_bit());
    }

    pub fn disable(&self, source: Source) {
        self.regs.clear_bit(source.enable_bit());
    }

    /// Acknowledges a pending event. A no-op for flags only the hardware can clear.
    pub fn clear_flag(&self, source: Source) {
        if source.flag_is_software_clearable() {
            self.regs.clear_bit(source.flag_bit());
        }
    }

    /// Routes the source to the high or low vector.
    ///
    /// INT0 has no priority bit; asking for [`Priority::Low`] on it is an
    /// [`Error::InvalidArgument`].
    pub fn set_priority(&self, source: Source, level: Priority) -> Result<(), Error> {
        match (source.priority_bit(), level) {
            (Some(bit), level) => {
                self.regs.write_bit(bit, level == Priority::High);
                Ok(())
            }
            (None, Priority::High) => Ok(()),
            (None, Priority::Low) => Err(Error::InvalidArgument),
        }
    }

    pub fn is_enabled(&self, source: Source) -> bool {
        self.regs.is_set(source.enable_bit())
    }

    pub fn is_pending(&self, source: Source) -> bool {
        self.regs.is_set(source.flag_bit())
    }

    pub fn priority(&self, source: Source) -> Priority {
        match source.priority_bit() {
            Some(bit) if !self.regs.is_set(bit) => Priority::Low,
            _ => Priority::High,
        }
    }

    /// Enabled and pending: the dispatcher has to service it.
    #[inline]
    pub fn is_active(&self, source: Source) -> bool {
        self.is_enabled(source) && self.is_pending(source)
    }
}

/// Implemented by peripheral drivers that want to be serviced by the
/// [`InterruptManager`](super::InterruptManager).
///
/// The manager clears the source's flag before calling [`on_interrupt`]; the driver does its
/// own leaf work there and invokes its own callback.
///
/// [`on_interrupt`]: InterruptService::on_interrupt
pub trait InterruptService: Sync {
    fn on_interrupt(&self);
}

/// The simplest possible [`InterruptService`]: one callback slot and nothing else.
pub struct PeripheralHandler {
    handler: Mutex<Cell<Option<Handler>>>,
}

impl PeripheralHandler {
    pub const fn new() -> Self {
        PeripheralHandler {
            handler: Mutex::new(Cell::new(None)),
        }
    }

    pub const fn with_handler(handler: Handler) -> Self {
        PeripheralHandler {
            handler: Mutex::new(Cell::new(Some(handler))),
        }
    }

    pub fn set_handler(&self, handler: Option<Handler>) {
        critical_section::with(|cs| self.handler.borrow(cs).set(handler));
    }

    pub fn handler(&self) -> Option<Handler> {
        critical_section::with(|cs| self.handler.borrow(cs).get())
    }
}

impl Default for PeripheralHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptService for PeripheralHandler {
    fn on_interrupt(&self) {
        if let Some(handler) = self.handler() {
            handler();
        }
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::registers::{bits, Sfr};
    use crate::sim::SimulatedRegisters;

    #[test]
    fn enable_disable_clear() {
        let regs = SimulatedRegisters::new();
        let control = InterruptControl::new(&regs);

        control.enable(Source::Timer1);
        assert!(regs.is_set(bits::TMR1IE));
        regs.raise_source(Source::Timer1);
        assert!(control.is_active(Source::Timer1));

        control.clear_flag(Source::Timer1);
        assert!(!control.is_pending(Source::Timer1));
        control.disable(Source::Timer1);
        assert_eq!(regs.read(Sfr::Pie1), 0);
    }

    #[test]
    fn hardware_cleared_flags_stay_set() {
        let regs = SimulatedRegisters::new();
        let control = InterruptControl::new(&regs);
        regs.raise_source(Source::EusartTx);
        control.clear_flag(Source::EusartTx);
        assert!(regs.is_set(bits::TXIF));
    }

    #[test]
    fn priority_bits() {
        let regs = SimulatedRegisters::new();
        let control = InterruptControl::new(&regs);

        assert_eq!(control.priority(Source::Ccp2), Priority::Low);
        control.set_priority(Source::Ccp2, Priority::High).unwrap();
        assert!(regs.is_set(bits::CCP2IP));
        assert_eq!(control.priority(Source::Ccp2), Priority::High);

        assert_eq!(control.set_priority(Source::Int0, Priority::High), Ok(()));
        assert_eq!(
            control.set_priority(Source::Int0, Priority::Low),
            Err(Error::InvalidArgument)
        );
        assert_eq!(control.priority(Source::Int0), Priority::High);
    }

    #[test]
    fn peripheral_handler_calls_its_slot() {
        static CALLS: AtomicU32 = AtomicU32::new(0);
        fn count() {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        let handler = PeripheralHandler::new();
        handler.on_interrupt();
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);

        handler.set_handler(Some(count));
        handler.on_interrupt();
        handler.on_interrupt();
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
        assert!(handler.handler().is_some());
    }
}
