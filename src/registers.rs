// Copyright 2026 The pic18f4620-hal authors.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Special function registers
//!
//! The interrupt subsystem and the GPIO driver only ever touch a handful of 8-bit special
//! function registers (SFRs). They are named by [`Sfr`] and accessed through the
//! [`RegisterFile`] trait, so the same driver code runs against the real data memory
//! ([`Pic18`]) or against [`SimulatedRegisters`](crate::sim::SimulatedRegisters) on a host.
//!
//! Individual bits are plain data ([`Bit`]); the named bits the drivers use live in [`bits`].

use core::sync::atomic::{AtomicBool, Ordering};

/// Number of registers named by [`Sfr`].
pub const SFR_COUNT: usize = Sfr::Intcon as usize + 1;

/// Special function registers used by this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sfr {
    PortA,
    PortB,
    PortC,
    PortD,
    PortE,
    LatA,
    LatB,
    LatC,
    LatD,
    LatE,
    TrisA,
    TrisB,
    TrisC,
    TrisD,
    TrisE,
    Pie1,
    Pir1,
    Ipr1,
    Pie2,
    Pir2,
    Ipr2,
    Rcon,
    Intcon3,
    Intcon2,
    Intcon,
}

impl Sfr {
    /// Data memory address of the register on the PIC18F4620.
    pub const fn address(self) -> usize {
        match self {
            Sfr::PortA => 0xF80,
            Sfr::PortB => 0xF81,
            Sfr::PortC => 0xF82,
            Sfr::PortD => 0xF83,
            Sfr::PortE => 0xF84,
            Sfr::LatA => 0xF89,
            Sfr::LatB => 0xF8A,
            Sfr::LatC => 0xF8B,
            Sfr::LatD => 0xF8C,
            Sfr::LatE => 0xF8D,
            Sfr::TrisA => 0xF92,
            Sfr::TrisB => 0xF93,
            Sfr::TrisC => 0xF94,
            Sfr::TrisD => 0xF95,
            Sfr::TrisE => 0xF96,
            Sfr::Pie1 => 0xF9D,
            Sfr::Pir1 => 0xF9E,
            Sfr::Ipr1 => 0xF9F,
            Sfr::Pie2 => 0xFA0,
            Sfr::Pir2 => 0xFA1,
            Sfr::Ipr2 => 0xFA2,
            Sfr::Rcon => 0xFD0,
            Sfr::Intcon3 => 0xFF0,
            Sfr::Intcon2 => 0xFF1,
            Sfr::Intcon => 0xFF2,
        }
    }

    /// Position of the register in a dense register array.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A single bit of a special function register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bit {
    pub sfr: Sfr,
    pub index: u8,
}

impl Bit {
    pub const fn new(sfr: Sfr, index: u8) -> Self {
        Bit { sfr, index }
    }

    #[inline(always)]
    pub const fn mask(self) -> u8 {
        1 << self.index
    }
}

/// Named bits, as listed in the PIC18F4620 data sheet.
pub mod bits {
    use super::{Bit, Sfr};

    // INTCON
    pub const GIE: Bit = Bit::new(Sfr::Intcon, 7);
    pub const GIEH: Bit = GIE;
    pub const PEIE: Bit = Bit::new(Sfr::Intcon, 6);
    pub const GIEL: Bit = PEIE;
    pub const TMR0IE: Bit = Bit::new(Sfr::Intcon, 5);
    pub const INT0IE: Bit = Bit::new(Sfr::Intcon, 4);
    pub const RBIE: Bit = Bit::new(Sfr::Intcon, 3);
    pub const TMR0IF: Bit = Bit::new(Sfr::Intcon, 2);
    pub const INT0IF: Bit = Bit::new(Sfr::Intcon, 1);
    pub const RBIF: Bit = Bit::new(Sfr::Intcon, 0);

    // INTCON2
    pub const RBPU: Bit = Bit::new(Sfr::Intcon2, 7);
    pub const INTEDG0: Bit = Bit::new(Sfr::Intcon2, 6);
    pub const INTEDG1: Bit = Bit::new(Sfr::Intcon2, 5);
    pub const INTEDG2: Bit = Bit::new(Sfr::Intcon2, 4);
    pub const TMR0IP: Bit = Bit::new(Sfr::Intcon2, 2);
    pub const RBIP: Bit = Bit::new(Sfr::Intcon2, 0);

    // INTCON3
    pub const INT2IP: Bit = Bit::new(Sfr::Intcon3, 7);
    pub const INT1IP: Bit = Bit::new(Sfr::Intcon3, 6);
    pub const INT2IE: Bit = Bit::new(Sfr::Intcon3, 4);
    pub const INT1IE: Bit = Bit::new(Sfr::Intcon3, 3);
    pub const INT2IF: Bit = Bit::new(Sfr::Intcon3, 1);
    pub const INT1IF: Bit = Bit::new(Sfr::Intcon3, 0);

    // RCON
    pub const IPEN: Bit = Bit::new(Sfr::Rcon, 7);

    // PIE1 / PIR1 / IPR1 share one layout.
    pub const ADIE: Bit = Bit::new(Sfr::Pie1, 6);
    pub const RCIE: Bit = Bit::new(Sfr::Pie1, 5);
    pub const TXIE: Bit = Bit::new(Sfr::Pie1, 4);
    pub const SSPIE: Bit = Bit::new(Sfr::Pie1, 3);
    pub const CCP1IE: Bit = Bit::new(Sfr::Pie1, 2);
    pub const TMR2IE: Bit = Bit::new(Sfr::Pie1, 1);
    pub const TMR1IE: Bit = Bit::new(Sfr::Pie1, 0);

    pub const ADIF: Bit = Bit::new(Sfr::Pir1, 6);
    pub const RCIF: Bit = Bit::new(Sfr::Pir1, 5);
    pub const TXIF: Bit = Bit::new(Sfr::Pir1, 4);
    pub const SSPIF: Bit = Bit::new(Sfr::Pir1, 3);
    pub const CCP1IF: Bit = Bit::new(Sfr::Pir1, 2);
    pub const TMR2IF: Bit = Bit::new(Sfr::Pir1, 1);
    pub const TMR1IF: Bit = Bit::new(Sfr::Pir1, 0);

    pub const ADIP: Bit = Bit::new(Sfr::Ipr1, 6);
    pub const RCIP: Bit = Bit::new(Sfr::Ipr1, 5);
    pub const TXIP: Bit = Bit::new(Sfr::Ipr1, 4);
    pub const SSPIP: Bit = Bit::new(Sfr::Ipr1, 3);
    pub const CCP1IP: Bit = Bit::new(Sfr::Ipr1, 2);
    pub const TMR2IP: Bit = Bit::new(Sfr::Ipr1, 1);
    pub const TMR1IP: Bit = Bit::new(Sfr::Ipr1, 0);

    // PIE2 / PIR2 / IPR2
    pub const BCLIE: Bit = Bit::new(Sfr::Pie2, 3);
    pub const TMR3IE: Bit = Bit::new(Sfr::Pie2, 1);
    pub const CCP2IE: Bit = Bit::new(Sfr::Pie2, 0);

    pub const BCLIF: Bit = Bit::new(Sfr::Pir2, 3);
    pub const TMR3IF: Bit = Bit::new(Sfr::Pir2, 1);
    pub const CCP2IF: Bit = Bit::new(Sfr::Pir2, 0);

    pub const BCLIP: Bit = Bit::new(Sfr::Ipr2, 3);
    pub const TMR3IP: Bit = Bit::new(Sfr::Ipr2, 1);
    pub const CCP2IP: Bit = Bit::new(Sfr::Ipr2, 0);
}

/// Byte-wide access to the special function registers.
///
/// Implementors only provide [`read`](RegisterFile::read) and [`write`](RegisterFile::write).
/// The single-bit helpers may be overridden where the backing store has a cheaper atomic
/// operation.
pub trait RegisterFile {
    fn read(&self, sfr: Sfr) -> u8;

    fn write(&self, sfr: Sfr, value: u8);

    #[inline]
    fn modify(&self, sfr: Sfr, f: impl FnOnce(u8) -> u8) {
        let value = self.read(sfr);
        self.write(sfr, f(value));
    }

    #[inline]
    fn set_bit(&self, bit: Bit) {
        self.modify(bit.sfr, |r| r | bit.mask());
    }

    #[inline]
    fn clear_bit(&self, bit: Bit) {
        self.modify(bit.sfr, |r| r & !bit.mask());
    }

    #[inline]
    fn write_bit(&self, bit: Bit, value: bool) {
        if value {
            self.set_bit(bit)
        } else {
            self.clear_bit(bit)
        }
    }

    #[inline]
    fn is_set(&self, bit: Bit) -> bool {
        self.read(bit.sfr) & bit.mask() != 0
    }
}

static TAKEN: AtomicBool = AtomicBool::new(false);

/// The memory-mapped special function registers of the running PIC18F4620.
///
/// Single-bit writes are byte-wide read-modify-write sequences run inside a critical
/// section. The critical section keeps the other vector out, but not the peripherals: a flag
/// the hardware raises in the same register between the read and the write is written back
/// as it was read, i.e. cleared, and that event is lost. Clearing a flag in INTCON, INTCON3,
/// PIR1 or PIR2 while another source of the same register is active has this window.
pub struct Pic18 {
    _private: (),
}

impl Pic18 {
    /// Returns the register file the first time it is called, `None` afterwards.
    pub fn take() -> Option<Self> {
        critical_section::with(|_| {
            if TAKEN.load(Ordering::Relaxed) {
                None
            } else {
                TAKEN.store(true, Ordering::Relaxed);
                Some(unsafe { Self::steal() })
            }
        })
    }

    /// Unchecked version of [`take`](Pic18::take).
    ///
    /// # Safety
    ///
    /// The caller must make sure that no other code configures the same registers in a way
    /// that races with the drivers holding this instance.
    pub unsafe fn steal() -> Self {
        Pic18 { _private: () }
    }
}

impl RegisterFile for Pic18 {
    #[inline(always)]
    fn read(&self, sfr: Sfr) -> u8 {
        // NOTE(unsafe) volatile read of a fixed, always mapped SFR address
        unsafe { core::ptr::read_volatile(sfr.address() as *const u8) }
    }

    #[inline(always)]
    fn write(&self, sfr: Sfr, value: u8) {
        // NOTE(unsafe) volatile write of a fixed, always mapped SFR address
        unsafe { core::ptr::write_volatile(sfr.address() as *mut u8, value) }
    }

    // Both interrupt vectors clear flags in INTCON; a high priority vector must not land
    // between the read and the write of a low priority read-modify-write.
    fn set_bit(&self, bit: Bit) {
        critical_section::with(|_| self.modify(bit.sfr, |r| r | bit.mask()));
    }

    fn clear_bit(&self, bit: Bit) {
        critical_section::with(|_| self.modify(bit.sfr, |r| r & !bit.mask()));
    }
}
