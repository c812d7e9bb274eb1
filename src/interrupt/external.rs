// Copyright 2026 The pic18f4620-hal authors.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # External interrupts
//!
//! INT0..INT2 sit on RB0..RB2 and latch one configured edge each, so their callbacks can be
//! called directly.
//!
//! RB4..RB7 share a single "port changed" flag that says neither which pin moved nor in which
//! direction. The manager keeps the last level seen on every pin of the group and infers the
//! edge from it, see [`EdgeState::next`]. The first sample after reset only primes that memory:
//! a pin first seen low reports nothing, a pin first seen high reports a rising edge.

use log::{debug, trace};

use crate::gpio::{Direction, PinConfig, PinState, Port};
use crate::registers::{bits, Bit, RegisterFile};
use crate::Error;

use super::manager::InterruptManager;
use super::source::Source;
use super::{Edge, Handler, Priority};

/// The three edge-triggered external interrupts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExternalSource {
    Int0,
    Int1,
    Int2,
}

impl ExternalSource {
    pub const ALL: [ExternalSource; 3] = [
        ExternalSource::Int0,
        ExternalSource::Int1,
        ExternalSource::Int2,
    ];

    pub const fn source(self) -> Source {
        match self {
            ExternalSource::Int0 => Source::Int0,
            ExternalSource::Int1 => Source::Int1,
            ExternalSource::Int2 => Source::Int2,
        }
    }

    /// The PORTB pin the interrupt is wired to.
    pub const fn pin(self) -> u8 {
        self as u8
    }

    const fn edge_bit(self) -> Bit {
        match self {
            ExternalSource::Int0 => bits::INTEDG0,
            ExternalSource::Int1 => bits::INTEDG1,
            ExternalSource::Int2 => bits::INTEDG2,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Initialisation record of one INTx source.
#[derive(Clone, Copy, Debug)]
pub struct IntxConfig {
    pub source: ExternalSource,
    pub edge: Edge,
    /// Ignored in flat mode. INT0 only accepts [`Priority::High`].
    pub priority: Priority,
    /// Must be the source's own pin; its direction is forced to input.
    pub pin: PinConfig,
    pub handler: Option<Handler>,
}

impl IntxConfig {
    pub const fn new(source: ExternalSource, edge: Edge, handler: Option<Handler>) -> Self {
        IntxConfig {
            source,
            edge,
            priority: Priority::High,
            pin: PinConfig::input(Port::B, source.pin()),
            handler,
        }
    }

    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// A pin of the RB4..RB7 on-change group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OnChangePin {
    Rb4,
    Rb5,
    Rb6,
    Rb7,
}

impl OnChangePin {
    /// Scan order of the group.
    pub const ALL: [OnChangePin; 4] = [
        OnChangePin::Rb4,
        OnChangePin::Rb5,
        OnChangePin::Rb6,
        OnChangePin::Rb7,
    ];

    pub const fn source(self) -> Source {
        match self {
            OnChangePin::Rb4 => Source::Rb4,
            OnChangePin::Rb5 => Source::Rb5,
            OnChangePin::Rb6 => Source::Rb6,
            OnChangePin::Rb7 => Source::Rb7,
        }
    }

    pub const fn pin(self) -> u8 {
        self as u8 + 4
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<&PinConfig> for OnChangePin {
    type Error = Error;

    fn try_from(config: &PinConfig) -> Result<Self, Error> {
        match (config.port, config.pin) {
            (Port::B, 4) => Ok(OnChangePin::Rb4),
            (Port::B, 5) => Ok(OnChangePin::Rb5),
            (Port::B, 6) => Ok(OnChangePin::Rb6),
            (Port::B, 7) => Ok(OnChangePin::Rb7),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// Initialisation record of one on-change pin.
#[derive(Clone, Copy, Debug)]
pub struct OnChangeConfig {
    /// Must be one of RB4..RB7; its direction is forced to input.
    pub pin: PinConfig,
    /// Ignored in flat mode. Shared by the whole group: the last initialised pin wins.
    pub priority: Priority,
    pub rising: Option<Handler>,
    pub falling: Option<Handler>,
}

impl OnChangeConfig {
    pub const fn new(pin: OnChangePin, rising: Option<Handler>, falling: Option<Handler>) -> Self {
        OnChangeConfig {
            pin: PinConfig::input(Port::B, pin.pin()),
            priority: Priority::High,
            rising,
            falling,
        }
    }

    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Last level observed on an on-change pin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeState {
    /// Nothing sampled since reset.
    #[default]
    Unknown,
    Low,
    High,
}

impl EdgeState {
    /// Feeds a new sample through the edge detector.
    ///
    /// Returns the new memory and the edge to report, if any.
    pub const fn next(self, level: PinState) -> (EdgeState, Option<Edge>) {
        match (self, level) {
            (EdgeState::High, PinState::High) => (EdgeState::High, None),
            (_, PinState::High) => (EdgeState::High, Some(Edge::Rising)),
            (EdgeState::High, PinState::Low) => (EdgeState::Low, Some(Edge::Falling)),
            (_, PinState::Low) => (EdgeState::Low, None),
        }
    }

    pub(super) const fn into_bits(self) -> u8 {
        self as u8
    }

    pub(super) const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => EdgeState::Low,
            2 => EdgeState::High,
            _ => EdgeState::Unknown,
        }
    }
}

impl<R: RegisterFile> InterruptManager<R> {
    /// Configures and enables one INTx source.
    ///
    /// Any pending event is discarded, so an edge that happened before the call never reaches
    /// the new callback.
    pub fn init_intx(&self, config: &IntxConfig) -> Result<(), Error> {
        let external = config.source;
        let source = external.source();
        let priority = self.config().is_priority();
        if config.pin.port != Port::B
            || config.pin.pin != external.pin()
            || (priority && source.priority_bit().is_none() && config.priority == Priority::Low)
        {
            return Err(Error::InvalidArgument);
        }
        self.check_source(source)?;

        let control = self.control();
        control.disable(source);
        self.registers()
            .write_bit(external.edge_bit(), config.edge == Edge::Rising);
        if priority {
            control.set_priority(source, config.priority)?;
        }
        self.arm();
        self.gpio().configure_direction(&PinConfig {
            direction: Direction::Input,
            ..config.pin
        })?;
        self.registry.intx[external.index()].set(config.handler);
        control.clear_flag(source);
        control.enable(source);

        debug!(
            "{:?} on {:?} edge, priority {:?}",
            external, config.edge, config.priority
        );
        Ok(())
    }

    /// Disables one INTx source. Its callback stays registered for a later
    /// [`init_intx`](Self::init_intx).
    pub fn deinit_intx(&self, source: ExternalSource) -> Result<(), Error> {
        self.check_source(source.source())?;
        self.control().disable(source.source());
        debug!("{:?} disabled", source);
        Ok(())
    }

    pub fn intx_handler(&self, source: ExternalSource) -> Option<Handler> {
        self.registry.intx[source.index()].get()
    }

    /// Registers the callbacks of one on-change pin and enables the group.
    ///
    /// The group flag is cleared, which also drops pending events of the other pins.
    pub fn init_on_change(&self, config: &OnChangeConfig) -> Result<(), Error> {
        let pin = OnChangePin::try_from(&config.pin)?;
        let source = pin.source();
        self.check_source(source)?;

        let control = self.control();
        control.disable(source);
        if self.config().is_priority() {
            control.set_priority(source, config.priority)?;
        }
        self.arm();
        self.gpio().configure_direction(&PinConfig {
            direction: Direction::Input,
            ..config.pin
        })?;
        let slots = &self.registry.on_change[pin.index()];
        slots.rising.set(config.rising);
        slots.falling.set(config.falling);
        control.clear_flag(source);
        control.enable(source);

        debug!("{:?} on change, priority {:?}", pin, config.priority);
        Ok(())
    }

    /// Disables the on-change group. The enable bit is shared, so this silences all four pins;
    /// callbacks and edge memory are kept.
    pub fn deinit_on_change(&self, pin: OnChangePin) -> Result<(), Error> {
        self.check_source(pin.source())?;
        self.control().disable(pin.source());
        debug!("on-change group disabled by {:?}", pin);
        Ok(())
    }

    /// `(rising, falling)` callbacks registered for `pin`.
    pub fn on_change_handlers(&self, pin: OnChangePin) -> (Option<Handler>, Option<Handler>) {
        let slots = &self.registry.on_change[pin.index()];
        (slots.rising.get(), slots.falling.get())
    }

    pub fn edge_state(&self, pin: OnChangePin) -> EdgeState {
        self.registry.on_change[pin.index()].edge()
    }

    pub(super) fn service_intx(&self, source: ExternalSource) {
        self.control().clear_flag(source.source());
        trace!("servicing {:?}", source);
        if let Some(handler) = self.intx_handler(source) {
            handler();
        }
    }

    pub(super) fn service_on_change(&self) {
        // Reading PORTB ends the mismatch condition, only then can RBIF be cleared.
        let levels = self.gpio().read_port(Port::B);
        self.control().clear_flag(Source::Rb4);

        for pin in OnChangePin::ALL {
            if !self.table().contains(pin.source()) {
                continue;
            }
            let slots = &self.registry.on_change[pin.index()];
            let level = PinState::from(levels & (1 << pin.pin()) != 0);
            let (state, edge) = slots.edge().next(level);
            slots.set_edge(state);

            let handler = match edge {
                Some(Edge::Rising) => slots.rising.get(),
                Some(Edge::Falling) => slots.falling.get(),
                None => continue,
            };
            trace!("{:?} {:?} edge", pin, edge);
            if let Some(handler) = handler {
                handler();
            }
        }
    }
}
