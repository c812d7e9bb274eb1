// Copyright 2026 The pic18f4620-hal authors.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Interrupt manager
//!
//! [`InterruptManager`] owns every callback slot and the on-change edge memory, and provides
//! the functions the hardware vectors call:
//!
//! - [`on_interrupt`](InterruptManager::on_interrupt) in flat mode,
//! - [`on_high_priority`](InterruptManager::on_high_priority) and
//!   [`on_low_priority`](InterruptManager::on_low_priority) in priority mode.
//!
//! Each of them walks the [`DispatchTable`] in its fixed order and services every entry whose
//! enable and flag bits are both set. Servicing always clears the flag before any callback
//! runs.
//!
//! All methods take `&self`, so a single `static` manager is shared by both vectors. A slot
//! is only locked long enough to copy it out; callbacks run outside any critical section, so
//! the high vector can still preempt a low priority callback.

use core::cell::Cell;
use core::sync::atomic::{AtomicU8, Ordering};

use critical_section::Mutex;
use log::{debug, trace};

use crate::gpio::Gpio;
use crate::registers::RegisterFile;
use crate::Error;

use super::config::{Config, GlobalInterrupts};
use super::external::{EdgeState, ExternalSource};
use super::internal::{InterruptControl, InterruptService};
use super::source::{Source, SourceKind, SourceSet};
use super::{Handler, Priority};

const MAX_ENTRIES: usize = 16;

/// One row of the dispatch table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchEntry {
    External(ExternalSource),
    /// The whole RB4..RB7 group; it has a single enable/flag pair.
    OnChange,
    Peripheral(Source),
}

impl DispatchEntry {
    /// The source whose enable, flag and priority bits gate this entry.
    pub const fn source(self) -> Source {
        match self {
            DispatchEntry::External(source) => source.source(),
            DispatchEntry::OnChange => Source::Rb4,
            DispatchEntry::Peripheral(source) => source,
        }
    }
}

/// The ordered list of entries a vector scans, resolved once from a [`SourceSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchTable {
    entries: [Option<DispatchEntry>; MAX_ENTRIES],
    sources: SourceSet,
}

impl DispatchTable {
    pub const fn new(sources: SourceSet) -> Self {
        let mut entries = [None; MAX_ENTRIES];
        let mut len = 0;
        let mut on_change = false;
        let mut i = 0;
        while i < Source::ALL.len() {
            let source = Source::ALL[i];
            i += 1;
            if !sources.has(source) {
                continue;
            }
            let entry = match source.kind() {
                SourceKind::External => DispatchEntry::External(match source {
                    Source::Int0 => ExternalSource::Int0,
                    Source::Int1 => ExternalSource::Int1,
                    _ => ExternalSource::Int2,
                }),
                SourceKind::OnChange => {
                    if on_change {
                        continue;
                    }
                    on_change = true;
                    DispatchEntry::OnChange
                }
                SourceKind::Peripheral => DispatchEntry::Peripheral(source),
            };
            entries[len] = Some(entry);
            len += 1;
        }
        DispatchTable { entries, sources }
    }

    /// Entries in scan order.
    pub fn entries(&self) -> impl Iterator<Item = DispatchEntry> + '_ {
        self.entries.iter().map_while(|entry| *entry)
    }

    pub const fn sources(&self) -> SourceSet {
        self.sources
    }

    pub const fn contains(&self, source: Source) -> bool {
        self.sources.has(source)
    }
}

pub(super) struct HandlerSlot(Mutex<Cell<Option<Handler>>>);

impl HandlerSlot {
    const fn new() -> Self {
        HandlerSlot(Mutex::new(Cell::new(None)))
    }

    pub(super) fn get(&self) -> Option<Handler> {
        critical_section::with(|cs| self.0.borrow(cs).get())
    }

    pub(super) fn set(&self, handler: Option<Handler>) {
        critical_section::with(|cs| self.0.borrow(cs).set(handler));
    }
}

/// Callbacks and edge memory of one on-change pin.
pub(super) struct OnChangeSlots {
    pub(super) rising: HandlerSlot,
    pub(super) falling: HandlerSlot,
    edge: AtomicU8,
}

impl OnChangeSlots {
    const fn new() -> Self {
        OnChangeSlots {
            rising: HandlerSlot::new(),
            falling: HandlerSlot::new(),
            edge: AtomicU8::new(EdgeState::Unknown.into_bits()),
        }
    }

    // Only the vector owning the group writes this, so plain load/store is enough.
    pub(super) fn edge(&self) -> EdgeState {
        EdgeState::from_bits(self.edge.load(Ordering::Relaxed))
    }

    pub(super) fn set_edge(&self, state: EdgeState) {
        self.edge.store(state.into_bits(), Ordering::Relaxed);
    }
}

type ServiceRef = &'static dyn InterruptService;

struct ServiceSlot(Mutex<Cell<Option<ServiceRef>>>);

impl ServiceSlot {
    const fn new() -> Self {
        ServiceSlot(Mutex::new(Cell::new(None)))
    }

    fn get(&self) -> Option<ServiceRef> {
        critical_section::with(|cs| self.0.borrow(cs).get())
    }

    fn set(&self, service: Option<ServiceRef>) {
        critical_section::with(|cs| self.0.borrow(cs).set(service));
    }
}

/// Every callback slot, indexed by source.
pub(super) struct Registry {
    pub(super) intx: [HandlerSlot; 3],
    pub(super) on_change: [OnChangeSlots; 4],
    services: [ServiceSlot; Source::PERIPHERALS.len()],
}

impl Registry {
    const fn new() -> Self {
        Registry {
            intx: [const { HandlerSlot::new() }; 3],
            on_change: [const { OnChangeSlots::new() }; 4],
            services: [const { ServiceSlot::new() }; Source::PERIPHERALS.len()],
        }
    }

    fn service(&self, source: Source) -> Option<ServiceRef> {
        source
            .peripheral_index()
            .and_then(|index| self.services[index].get())
    }
}

/// The interrupt subsystem: configuration, callback registry and vector entry points.
pub struct InterruptManager<R> {
    regs: R,
    config: Config,
    table: DispatchTable,
    pub(super) registry: Registry,
}

impl<R> InterruptManager<R> {
    /// Builds the manager and resolves its dispatch table. Nothing touches the hardware until
    /// a source is initialised.
    pub const fn new(regs: R, config: Config) -> Self {
        InterruptManager {
            regs,
            config,
            table: DispatchTable::new(config.sources),
            registry: Registry::new(),
        }
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }
}

impl<R: RegisterFile> InterruptManager<R> {
    pub fn control(&self) -> InterruptControl<'_, R> {
        InterruptControl::new(&self.regs)
    }

    pub fn globals(&self) -> GlobalInterrupts<'_, R> {
        GlobalInterrupts::new(&self.regs)
    }

    pub fn gpio(&self) -> Gpio<'_, R> {
        Gpio::new(&self.regs)
    }

    /// Sets the global enables of the configured architecture.
    pub fn arm(&self) {
        self.globals().arm(self.config.architecture);
    }

    pub(super) fn check_source(&self, source: Source) -> Result<(), Error> {
        if self.table.contains(source) {
            Ok(())
        } else {
            Err(Error::SourceDisabled)
        }
    }

    /// Registers a peripheral driver's leaf routine under `source` and enables the source.
    ///
    /// `priority` only matters in priority mode.
    pub fn bind(
        &self,
        source: Source,
        service: &'static dyn InterruptService,
        priority: Priority,
    ) -> Result<(), Error> {
        let index = source.peripheral_index().ok_or(Error::InvalidArgument)?;
        self.check_source(source)?;

        let control = self.control();
        control.disable(source);
        control.clear_flag(source);
        self.registry.services[index].set(Some(service));
        if self.config.is_priority() {
            control.set_priority(source, priority)?;
        }
        self.arm();
        control.enable(source);
        debug!("{:?} bound, priority {:?}", source, priority);
        Ok(())
    }

    /// Disables a peripheral source. The bound service stays registered.
    pub fn unbind(&self, source: Source) -> Result<(), Error> {
        source.peripheral_index().ok_or(Error::InvalidArgument)?;
        self.check_source(source)?;
        self.control().disable(source);
        debug!("{:?} disabled", source);
        Ok(())
    }

    /// Whether a service is registered for `source`.
    pub fn is_bound(&self, source: Source) -> bool {
        self.registry.service(source).is_some()
    }

    /// Flat mode vector: services every active entry in table order.
    pub fn on_interrupt(&self) {
        for entry in self.table.entries() {
            if self.control().is_active(entry.source()) {
                self.service(entry);
            }
        }
    }

    /// High priority vector.
    pub fn on_high_priority(&self) {
        self.dispatch_level(Priority::High);
    }

    /// Low priority vector.
    pub fn on_low_priority(&self) {
        self.dispatch_level(Priority::Low);
    }

    fn dispatch_level(&self, level: Priority) {
        let control = self.control();
        for entry in self.table.entries() {
            let source = entry.source();
            if control.priority(source) == level && control.is_active(source) {
                self.service(entry);
            }
        }
    }

    fn service(&self, entry: DispatchEntry) {
        match entry {
            DispatchEntry::External(source) => self.service_intx(source),
            DispatchEntry::OnChange => self.service_on_change(),
            DispatchEntry::Peripheral(source) => self.service_peripheral(source),
        }
    }

    fn service_peripheral(&self, source: Source) {
        let service = self.registry.service(source);
        if service.is_none() {
            // SPI and I2C share SSPIE/SSPIF; leave the event to whichever mode is bound.
            if let Some(alias) = source.alias() {
                if self.table.contains(alias) && self.registry.service(alias).is_some() {
                    return;
                }
            }
        }

        self.control().clear_flag(source);
        trace!("servicing {:?}", source);
        if let Some(service) = service {
            service.on_interrupt();
        }
    }
}
