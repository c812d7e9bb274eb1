// Copyright 2026 The pic18f4620-hal authors.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # General purpose I/O
//!
//! Two ways in: [`PinConfig`] descriptors handled by [`Gpio`], which is what the interrupt
//! drivers use to bind their pins, and typed [`Pin`] handles implementing the
//! [`embedded-hal`] digital traits.
//!
//! Every port has a `PORTx` (pin level), `LATx` (output latch) and `TRISx` (direction, `1` is
//! input) register.
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal

use core::convert::Infallible;
use core::marker::PhantomData;

use embedded_hal::digital::v2::{InputPin, OutputPin, StatefulOutputPin, ToggleableOutputPin};

use crate::registers::{Bit, RegisterFile, Sfr};
use crate::Error;

/// I/O ports of the PIC18F4620.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
}

impl Port {
    /// Number of pins the port has; PORTE only has RE0..RE2 as general purpose I/O.
    pub const fn pin_count(self) -> u8 {
        match self {
            Port::E => 3,
            _ => 8,
        }
    }

    pub const fn port_register(self) -> Sfr {
        match self {
            Port::A => Sfr::PortA,
            Port::B => Sfr::PortB,
            Port::C => Sfr::PortC,
            Port::D => Sfr::PortD,
            Port::E => Sfr::PortE,
        }
    }

    pub const fn latch_register(self) -> Sfr {
        match self {
            Port::A => Sfr::LatA,
            Port::B => Sfr::LatB,
            Port::C => Sfr::LatC,
            Port::D => Sfr::LatD,
            Port::E => Sfr::LatE,
        }
    }

    pub const fn direction_register(self) -> Sfr {
        match self {
            Port::A => Sfr::TrisA,
            Port::B => Sfr::TrisB,
            Port::C => Sfr::TrisC,
            Port::D => Sfr::TrisD,
            Port::E => Sfr::TrisE,
        }
    }

    const fn mask(self) -> u8 {
        match self {
            Port::E => 0b0000_0111,
            _ => 0xFF,
        }
    }
}

/// Digital pin level
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PinState {
    High,
    Low,
}

impl PinState {
    fn from_bit(set: bool) -> Self {
        if set {
            PinState::High
        } else {
            PinState::Low
        }
    }
}

impl From<bool> for PinState {
    fn from(high: bool) -> Self {
        PinState::from_bit(high)
    }
}

/// Pin direction, as encoded in `TRISx`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    Output,
    Input,
}

/// Description of one pin: where it is, which way it points and, for outputs, its initial
/// level.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PinConfig {
    pub port: Port,
    pub pin: u8,
    pub direction: Direction,
    pub logic: PinState,
}

impl PinConfig {
    pub const fn input(port: Port, pin: u8) -> Self {
        PinConfig {
            port,
            pin,
            direction: Direction::Input,
            logic: PinState::Low,
        }
    }

    pub const fn output(port: Port, pin: u8, logic: PinState) -> Self {
        PinConfig {
            port,
            pin,
            direction: Direction::Output,
            logic,
        }
    }

    fn check(&self) -> Result<(), Error> {
        if self.pin < self.port.pin_count() {
            Ok(())
        } else {
            Err(Error::InvalidArgument)
        }
    }

    fn bit(&self, sfr: Sfr) -> Bit {
        Bit::new(sfr, self.pin)
    }
}

/// Descriptor based access to the I/O ports.
pub struct Gpio<'a, R> {
    regs: &'a R,
}

impl<'a, R: RegisterFile> Gpio<'a, R> {
    pub fn new(regs: &'a R) -> Self {
        Gpio { regs }
    }

    /// Programs the direction bit of the pin.
    pub fn configure_direction(&self, config: &PinConfig) -> Result<(), Error> {
        config.check()?;
        self.regs.write_bit(
            config.bit(config.port.direction_register()),
            config.direction == Direction::Input,
        );
        Ok(())
    }

    pub fn direction(&self, config: &PinConfig) -> Result<Direction, Error> {
        config.check()?;
        if self.regs.is_set(config.bit(config.port.direction_register())) {
            Ok(Direction::Input)
        } else {
            Ok(Direction::Output)
        }
    }

    /// Writes the output latch of the pin.
    pub fn write(&self, config: &PinConfig, logic: PinState) -> Result<(), Error> {
        config.check()?;
        self.regs.write_bit(
            config.bit(config.port.latch_register()),
            logic == PinState::High,
        );
        Ok(())
    }

    /// Reads the level present on the pin.
    pub fn read(&self, config: &PinConfig) -> Result<PinState, Error> {
        config.check()?;
        Ok(PinState::from_bit(
            self.regs.is_set(config.bit(config.port.port_register())),
        ))
    }

    pub fn toggle(&self, config: &PinConfig) -> Result<(), Error> {
        config.check()?;
        let latch = config.port.latch_register();
        let mask = config.bit(latch).mask();
        self.regs.modify(latch, |r| r ^ mask);
        Ok(())
    }

    /// Sets the direction and, for outputs, drives the initial level.
    pub fn initialize(&self, config: &PinConfig) -> Result<(), Error> {
        config.check()?;
        if config.direction == Direction::Output {
            // Latch first so the pin never glitches to the previous level.
            self.write(config, config.logic)?;
        }
        self.configure_direction(config)
    }

    /// Writes the whole `TRISx` register; set bits are inputs.
    pub fn set_port_direction(&self, port: Port, directions: u8) {
        self.regs
            .write(port.direction_register(), directions & port.mask());
    }

    pub fn port_direction(&self, port: Port) -> u8 {
        self.regs.read(port.direction_register()) & port.mask()
    }

    pub fn write_port(&self, port: Port, logic: u8) {
        self.regs.write(port.latch_register(), logic & port.mask());
    }

    pub fn read_port(&self, port: Port) -> u8 {
        self.regs.read(port.port_register()) & port.mask()
    }

    pub fn toggle_port(&self, port: Port) {
        let mask = port.mask();
        self.regs.modify(port.latch_register(), |r| r ^ mask);
    }

    /// Takes a typed handle to a pin, configured as an input.
    pub fn pin(&self, port: Port, pin: u8) -> Result<Pin<'a, R, Input>, Error> {
        let config = PinConfig::input(port, pin);
        self.configure_direction(&config)?;
        Ok(Pin::new(self.regs, port, pin))
    }
}

pub trait PinExt {
    type Mode;

    /// Return pin number
    fn pin_id(&self) -> u8;

    /// Return port number
    fn port_id(&self) -> u8;
}

/// Marker trait for active states.
pub trait Active {}

/// Input mode (type state)
#[derive(Default)]
pub struct Input;
impl Active for Input {}

/// Output mode (type state)
#[derive(Default)]
pub struct Output;
impl Active for Output {}

mod sealed {
    pub trait PinMode: Default {
        const INPUT: bool;
    }
}

use sealed::PinMode;

impl PinMode for Input {
    const INPUT: bool = true;
}

impl PinMode for Output {
    const INPUT: bool = false;
}

/// Typed pin handle.
///
/// - `R` is the register file the pin lives in.
/// - `MODE` is [`Input`] or [`Output`].
pub struct Pin<'a, R, MODE = Input> {
    regs: &'a R,
    port: Port,
    pin: u8,
    _mode: PhantomData<MODE>,
}

impl<'a, R, MODE> Pin<'a, R, MODE> {
    fn new(regs: &'a R, port: Port, pin: u8) -> Self {
        Pin {
            regs,
            port,
            pin,
            _mode: PhantomData,
        }
    }
}

impl<'a, R, MODE> PinExt for Pin<'a, R, MODE> {
    type Mode = MODE;

    #[inline(always)]
    fn pin_id(&self) -> u8 {
        self.pin
    }

    #[inline(always)]
    fn port_id(&self) -> u8 {
        self.port as u8
    }
}

// Internal helper functions

// NOTE: these are callable in either mode. Writing the latch of an input is harmless and is
// how the level is preset before switching to an output.
impl<'a, R: RegisterFile, MODE> Pin<'a, R, MODE> {
    #[inline(always)]
    fn _set_state(&mut self, state: PinState) {
        match state {
            PinState::High => self._set_high(),
            PinState::Low => self._set_low(),
        }
    }

    #[inline(always)]
    fn _set_high(&mut self) {
        self.regs
            .set_bit(Bit::new(self.port.latch_register(), self.pin))
    }

    #[inline(always)]
    fn _set_low(&mut self) {
        self.regs
            .clear_bit(Bit::new(self.port.latch_register(), self.pin))
    }

    #[inline(always)]
    fn _is_set_low(&self) -> bool {
        !self
            .regs
            .is_set(Bit::new(self.port.latch_register(), self.pin))
    }

    #[inline(always)]
    fn _is_low(&self) -> bool {
        !self
            .regs
            .is_set(Bit::new(self.port.port_register(), self.pin))
    }

    fn mode<M: PinMode>(&mut self) {
        self.regs.write_bit(
            Bit::new(self.port.direction_register(), self.pin),
            M::INPUT,
        );
    }
}

impl<'a, R: RegisterFile, MODE: Active> Pin<'a, R, MODE> {
    /// Configures the pin to operate as an input pin
    #[inline]
    pub fn into_input(mut self) -> Pin<'a, R, Input> {
        self.mode::<Input>();
        Pin::new(self.regs, self.port, self.pin)
    }

    /// Configures the pin to operate as a push-pull output pin.
    /// Initial state will be low.
    #[inline]
    pub fn into_push_pull_output(self) -> Pin<'a, R, Output> {
        self.into_push_pull_output_with_state(PinState::Low)
    }

    /// Configures the pin to operate as a push-pull output pin.
    /// `initial_state` specifies whether the pin should be initially high or low.
    #[inline]
    pub fn into_push_pull_output_with_state(
        mut self,
        initial_state: PinState,
    ) -> Pin<'a, R, Output> {
        self._set_state(initial_state);
        self.mode::<Output>();
        Pin::new(self.regs, self.port, self.pin)
    }
}

impl<'a, R: RegisterFile> Pin<'a, R, Output> {
    #[inline]
    pub fn set_high(&mut self) {
        self._set_high()
    }

    #[inline]
    pub fn set_low(&mut self) {
        self._set_low()
    }

    #[inline(always)]
    pub fn get_state(&self) -> PinState {
        if self._is_set_low() {
            PinState::Low
        } else {
            PinState::High
        }
    }

    #[inline(always)]
    pub fn set_state(&mut self, state: PinState) {
        self._set_state(state)
    }

    #[inline]
    pub fn is_set_high(&self) -> bool {
        !self._is_set_low()
    }

    #[inline]
    pub fn is_set_low(&self) -> bool {
        self._is_set_low()
    }

    #[inline]
    pub fn toggle(&mut self) {
        if self._is_set_low() {
            self._set_high()
        } else {
            self._set_low()
        }
    }
}

impl<'a, R: RegisterFile> OutputPin for Pin<'a, R, Output> {
    type Error = Infallible;

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_high();
        Ok(())
    }

    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_low();
        Ok(())
    }
}

impl<'a, R: RegisterFile> StatefulOutputPin for Pin<'a, R, Output> {
    #[inline]
    fn is_set_high(&self) -> Result<bool, Self::Error> {
        Ok(self.is_set_high())
    }

    #[inline]
    fn is_set_low(&self) -> Result<bool, Self::Error> {
        Ok(self.is_set_low())
    }
}

impl<'a, R: RegisterFile> ToggleableOutputPin for Pin<'a, R, Output> {
    type Error = Infallible;

    #[inline(always)]
    fn toggle(&mut self) -> Result<(), Self::Error> {
        self.toggle();
        Ok(())
    }
}

impl<'a, R: RegisterFile> Pin<'a, R, Input> {
    #[inline]
    pub fn is_high(&self) -> bool {
        !self._is_low()
    }

    #[inline]
    pub fn is_low(&self) -> bool {
        self._is_low()
    }
}

impl<'a, R: RegisterFile> InputPin for Pin<'a, R, Input> {
    type Error = Infallible;

    #[inline]
    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.is_high())
    }

    #[inline]
    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(self.is_low())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedRegisters;

    #[test]
    fn direction_follows_config() {
        let regs = SimulatedRegisters::new();
        let gpio = Gpio::new(&regs);
        let rb4 = PinConfig::input(Port::B, 4);
        gpio.configure_direction(&rb4).unwrap();
        assert_eq!(regs.read(Sfr::TrisB), 0b0001_0000);
        assert_eq!(gpio.direction(&rb4), Ok(Direction::Input));

        let rb4_out = PinConfig::output(Port::B, 4, PinState::Low);
        gpio.configure_direction(&rb4_out).unwrap();
        assert_eq!(regs.read(Sfr::TrisB), 0);
        assert_eq!(gpio.direction(&rb4), Ok(Direction::Output));
    }

    #[test]
    fn rejects_missing_pins() {
        let regs = SimulatedRegisters::new();
        let gpio = Gpio::new(&regs);
        assert_eq!(
            gpio.configure_direction(&PinConfig::input(Port::C, 8)),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            gpio.read(&PinConfig::input(Port::E, 3)),
            Err(Error::InvalidArgument)
        );
        assert!(gpio.pin(Port::E, 2).is_ok());
    }

    #[test]
    fn initialize_presets_the_latch() {
        let regs = SimulatedRegisters::new();
        regs.write(Sfr::TrisD, 0xFF);
        let gpio = Gpio::new(&regs);
        let led = PinConfig::output(Port::D, 2, PinState::High);
        gpio.initialize(&led).unwrap();
        assert_eq!(regs.read(Sfr::LatD), 0b0000_0100);
        assert_eq!(regs.read(Sfr::TrisD), 0b1111_1011);

        gpio.toggle(&led).unwrap();
        assert_eq!(regs.read(Sfr::LatD), 0);
    }

    #[test]
    fn read_reports_the_pin_level() {
        let regs = SimulatedRegisters::new();
        let gpio = Gpio::new(&regs);
        let rb7 = PinConfig::input(Port::B, 7);
        assert_eq!(gpio.read(&rb7), Ok(PinState::Low));
        regs.drive_pin(Port::B, 7, PinState::High);
        assert_eq!(gpio.read(&rb7), Ok(PinState::High));
    }

    #[test]
    fn port_wide_access_is_masked() {
        let regs = SimulatedRegisters::new();
        let gpio = Gpio::new(&regs);
        gpio.set_port_direction(Port::E, 0xFF);
        assert_eq!(gpio.port_direction(Port::E), 0b111);
        gpio.write_port(Port::C, 0xA5);
        gpio.toggle_port(Port::C);
        assert_eq!(regs.read(Sfr::LatC), 0x5A);
        regs.write(Sfr::PortA, 0x3C);
        assert_eq!(gpio.read_port(Port::A), 0x3C);
    }

    #[test]
    fn typed_pins_implement_embedded_hal() {
        let regs = SimulatedRegisters::new();
        let gpio = Gpio::new(&regs);

        let button = gpio.pin(Port::B, 0).unwrap();
        assert_eq!(InputPin::is_low(&button), Ok(true));
        regs.drive_pin(Port::B, 0, PinState::High);
        assert_eq!(InputPin::is_high(&button), Ok(true));

        let mut led = gpio
            .pin(Port::D, 1)
            .unwrap()
            .into_push_pull_output_with_state(PinState::High);
        assert_eq!(regs.read(Sfr::TrisD) & 0b10, 0);
        assert_eq!(StatefulOutputPin::is_set_high(&led), Ok(true));
        ToggleableOutputPin::toggle(&mut led).unwrap();
        assert_eq!(led.get_state(), PinState::Low);
        OutputPin::set_high(&mut led).unwrap();
        assert_eq!(regs.read(Sfr::LatD), 0b10);
        assert_eq!(led.port_id(), 3);
        assert_eq!(led.pin_id(), 1);

        let input = led.into_input();
        assert_eq!(regs.read(Sfr::TrisD) & 0b10, 0b10);
        assert!(input.is_low());
    }
}
