// Copyright 2026 The pic18f4620-hal authors.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Simulated register file
//!
//! An in-memory [`RegisterFile`] for running the drivers on a host. Every register starts at
//! zero. Input levels are driven with [`drive_pin`](SimulatedRegisters::drive_pin) and
//! hardware events are raised with [`raise`](SimulatedRegisters::raise); everything else
//! behaves like plain memory.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::gpio::{PinState, Port};
use crate::interrupt::Source;
use crate::registers::{Bit, RegisterFile, Sfr, SFR_COUNT};

/// Register file backed by atomics, so it can live in a `static` shared by both vectors.
pub struct SimulatedRegisters {
    regs: [AtomicU8; SFR_COUNT],
}

impl SimulatedRegisters {
    pub const fn new() -> Self {
        SimulatedRegisters {
            regs: [const { AtomicU8::new(0) }; SFR_COUNT],
        }
    }

    /// Sets the level the port reads back for `pin`, as an external driver would.
    pub fn drive_pin(&self, port: Port, pin: u8, level: PinState) {
        self.write_bit(Bit::new(port.port_register(), pin), level == PinState::High);
    }

    /// Sets a hardware flag bit.
    pub fn raise(&self, bit: Bit) {
        self.set_bit(bit);
    }

    /// Sets the interrupt flag of `source`.
    pub fn raise_source(&self, source: Source) {
        self.raise(source.flag_bit());
    }
}

impl Default for SimulatedRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile for SimulatedRegisters {
    fn read(&self, sfr: Sfr) -> u8 {
        self.regs[sfr.index()].load(Ordering::SeqCst)
    }

    fn write(&self, sfr: Sfr, value: u8) {
        self.regs[sfr.index()].store(value, Ordering::SeqCst)
    }

    fn set_bit(&self, bit: Bit) {
        self.regs[bit.sfr.index()].fetch_or(bit.mask(), Ordering::SeqCst);
    }

    fn clear_bit(&self, bit: Bit) {
        self.regs[bit.sfr.index()].fetch_and(!bit.mask(), Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::registers::bits;

    #[test]
    fn starts_cleared() {
        let regs = SimulatedRegisters::new();
        assert_eq!(regs.read(Sfr::Intcon), 0);
        assert_eq!(regs.read(Sfr::TrisB), 0);
    }

    #[test]
    fn bit_helpers_only_touch_their_bit() {
        let regs = SimulatedRegisters::new();
        regs.write(Sfr::Intcon, 0b0101_0000);
        regs.set_bit(bits::RBIF);
        assert_eq!(regs.read(Sfr::Intcon), 0b0101_0001);
        regs.clear_bit(bits::INT0IE);
        assert_eq!(regs.read(Sfr::Intcon), 0b0100_0001);
        assert!(regs.is_set(bits::PEIE));
        assert!(!regs.is_set(bits::GIE));
    }

    #[test]
    fn driven_levels_show_on_the_port() {
        let regs = SimulatedRegisters::new();
        regs.drive_pin(Port::B, 5, PinState::High);
        assert_eq!(regs.read(Sfr::PortB), 0b0010_0000);
        regs.drive_pin(Port::B, 5, PinState::Low);
        assert_eq!(regs.read(Sfr::PortB), 0);
    }

    #[test]
    fn clearing_a_flag_keeps_flags_raised_meanwhile() {
        let regs = SimulatedRegisters::new();
        std::thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..10_000 {
                    regs.raise(bits::TMR2IF);
                }
            });
            for _ in 0..10_000 {
                regs.clear_bit(bits::TMR1IF);
            }
        });
        assert!(regs.is_set(bits::TMR2IF));
        assert!(!regs.is_set(bits::TMR1IF));
    }
}
