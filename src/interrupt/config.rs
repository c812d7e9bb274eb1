// Copyright 2026 The pic18f4620-hal authors.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Global interrupt architecture and master enables.
//!
//! In flat mode `GIE` and `PEIE` gate every source and everything lands on one vector. With
//! `IPEN` set the same two INTCON bits become `GIEH` and `GIEL`, and each source is routed
//! to the high or the low vector by its priority bit.

use crate::registers::{bits, RegisterFile};

use super::source::SourceSet;

/// Which vector layout the application uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Architecture {
    /// One vector, `GIE` + `PEIE`.
    Flat,
    /// Two vectors, `IPEN` + `GIEH` + `GIEL`.
    Priority,
}

/// Startup configuration of an [`InterruptManager`](super::InterruptManager).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub architecture: Architecture,
    /// Sources in the dispatch table. Never wider than [`SourceSet::compiled`].
    pub sources: SourceSet,
}

impl Config {
    pub const fn flat() -> Self {
        Config {
            architecture: Architecture::Flat,
            sources: SourceSet::compiled(),
        }
    }

    pub const fn priority() -> Self {
        Config {
            architecture: Architecture::Priority,
            sources: SourceSet::compiled(),
        }
    }

    /// Narrows the dispatch table. Sources whose feature is not compiled in are dropped.
    pub const fn with_sources(mut self, sources: SourceSet) -> Self {
        self.sources = sources.intersection(SourceSet::compiled());
        self
    }

    pub const fn is_priority(&self) -> bool {
        matches!(self.architecture, Architecture::Priority)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::flat()
    }
}

/// Master interrupt enables.
pub struct GlobalInterrupts<'a, R> {
    regs: &'a R,
}

impl<'a, R: RegisterFile> GlobalInterrupts<'a, R> {
    pub fn new(regs: &'a R) -> Self {
        GlobalInterrupts { regs }
    }

    pub fn enable_priority_feature(&self) {
        self.regs.set_bit(bits::IPEN);
    }

    /// Back to the single vector, PIC16 compatible mode.
    pub fn disable_priority_feature(&self) {
        self.regs.clear_bit(bits::IPEN);
    }

    pub fn enable_global(&self) {
        self.regs.set_bit(bits::GIE);
    }

    pub fn disable_global(&self) {
        self.regs.clear_bit(bits::GIE);
    }

    pub fn enable_peripheral(&self) {
        self.regs.set_bit(bits::PEIE);
    }

    pub fn disable_peripheral(&self) {
        self.regs.clear_bit(bits::PEIE);
    }

    pub fn enable_global_high(&self) {
        self.regs.set_bit(bits::GIEH);
    }

    pub fn disable_global_high(&self) {
        self.regs.clear_bit(bits::GIEH);
    }

    pub fn enable_global_low(&self) {
        self.regs.set_bit(bits::GIEL);
    }

    pub fn disable_global_low(&self) {
        self.regs.clear_bit(bits::GIEL);
    }

    pub fn is_priority_enabled(&self) -> bool {
        self.regs.is_set(bits::IPEN)
    }

    /// Sets every enable `architecture` needs. Idempotent.
    pub fn arm(&self, architecture: Architecture) {
        match architecture {
            Architecture::Flat => {
                self.enable_global();
                self.enable_peripheral();
            }
            Architecture::Priority => {
                self.enable_priority_feature();
                self.enable_global_high();
                self.enable_global_low();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::Sfr;
    use crate::sim::SimulatedRegisters;

    #[test]
    fn flat_arms_gie_and_peie() {
        let regs = SimulatedRegisters::new();
        let globals = GlobalInterrupts::new(&regs);
        globals.arm(Architecture::Flat);
        assert_eq!(regs.read(Sfr::Intcon), 0b1100_0000);
        assert!(!globals.is_priority_enabled());
        globals.arm(Architecture::Flat);
        assert_eq!(regs.read(Sfr::Intcon), 0b1100_0000);
    }

    #[test]
    fn priority_arms_ipen_gieh_giel() {
        let regs = SimulatedRegisters::new();
        let globals = GlobalInterrupts::new(&regs);
        globals.arm(Architecture::Priority);
        assert!(globals.is_priority_enabled());
        assert!(regs.is_set(bits::GIEH));
        assert!(regs.is_set(bits::GIEL));

        globals.disable_global_low();
        assert!(regs.is_set(bits::GIEH));
        assert!(!regs.is_set(bits::PEIE));
        globals.disable_priority_feature();
        assert_eq!(regs.read(Sfr::Rcon), 0);
    }

    #[test]
    fn narrowing_never_widens() {
        let config = Config::priority().with_sources(SourceSet::INT1 | SourceSet::ADC);
        assert_eq!(
            config.sources,
            (SourceSet::INT1 | SourceSet::ADC) & SourceSet::compiled()
        );
        assert_eq!(
            Config::flat().with_sources(SourceSet::all()).sources,
            SourceSet::compiled()
        );
        assert!(config.is_priority());
        assert_eq!(Config::default(), Config::flat());
    }
}
