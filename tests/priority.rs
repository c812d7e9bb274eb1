// Copyright 2026 The pic18f4620-hal authors.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-vector dispatch.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use pic18f4620_hal::interrupt::{
    Config, Edge, ExternalSource, InterruptManager, IntxConfig, OnChangeConfig, OnChangePin,
    PeripheralHandler, Priority, Source,
};
use pic18f4620_hal::registers::{bits, RegisterFile};
use pic18f4620_hal::sim::SimulatedRegisters;
use pic18f4620_hal::Error;

type Manager = InterruptManager<SimulatedRegisters>;

#[test]
fn init_arms_priority_mode() {
    static M: Manager = Manager::new(SimulatedRegisters::new(), Config::priority());

    M.init_intx(&IntxConfig::new(ExternalSource::Int1, Edge::Rising, None))
        .unwrap();
    let regs = M.registers();
    assert!(regs.is_set(bits::IPEN));
    assert!(regs.is_set(bits::GIEH));
    assert!(regs.is_set(bits::GIEL));
    assert!(regs.is_set(bits::INT1IP));
}

#[test]
fn each_vector_services_its_own_level() {
    static M: Manager = Manager::new(SimulatedRegisters::new(), Config::priority());
    static LOW: AtomicU32 = AtomicU32::new(0);
    static HIGH: AtomicU32 = AtomicU32::new(0);
    fn low() {
        LOW.fetch_add(1, Ordering::SeqCst);
    }
    fn high() {
        HIGH.fetch_add(1, Ordering::SeqCst);
    }

    M.init_intx(
        &IntxConfig::new(ExternalSource::Int1, Edge::Falling, Some(low))
            .with_priority(Priority::Low),
    )
    .unwrap();
    M.init_intx(&IntxConfig::new(ExternalSource::Int2, Edge::Falling, Some(high)))
        .unwrap();

    M.registers().raise_source(Source::Int1);
    M.registers().raise_source(Source::Int2);

    M.on_high_priority();
    assert_eq!(HIGH.load(Ordering::SeqCst), 1);
    assert_eq!(LOW.load(Ordering::SeqCst), 0);
    assert!(M.registers().is_set(bits::INT1IF));

    M.on_low_priority();
    assert_eq!(LOW.load(Ordering::SeqCst), 1);
    assert!(!M.registers().is_set(bits::INT1IF));
}

#[test]
fn int0_is_always_high_priority() {
    static M: Manager = Manager::new(SimulatedRegisters::new(), Config::priority());
    static COUNT: AtomicU32 = AtomicU32::new(0);
    fn int0() {
        COUNT.fetch_add(1, Ordering::SeqCst);
    }

    let config = IntxConfig::new(ExternalSource::Int0, Edge::Rising, Some(int0));
    assert_eq!(
        M.init_intx(&config.with_priority(Priority::Low)),
        Err(Error::InvalidArgument)
    );
    M.init_intx(&config).unwrap();

    M.registers().raise_source(Source::Int0);
    M.on_low_priority();
    assert_eq!(COUNT.load(Ordering::SeqCst), 0);
    M.on_high_priority();
    assert_eq!(COUNT.load(Ordering::SeqCst), 1);
}

#[test]
fn on_change_priority_is_shared_by_the_group() {
    static M: Manager = Manager::new(SimulatedRegisters::new(), Config::priority());

    M.init_on_change(&OnChangeConfig::new(OnChangePin::Rb4, None, None))
        .unwrap();
    assert!(M.registers().is_set(bits::RBIP));
    M.init_on_change(
        &OnChangeConfig::new(OnChangePin::Rb5, None, None).with_priority(Priority::Low),
    )
    .unwrap();
    assert!(!M.registers().is_set(bits::RBIP));
}

#[test]
fn high_priority_event_preempts_low_priority_callback() {
    static M: Manager = Manager::new(SimulatedRegisters::new(), Config::priority());
    static LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());
    static TIMER1: PeripheralHandler = PeripheralHandler::with_handler(timer1);
    fn timer1() {
        LOG.lock().unwrap().push("low start");
        // The high vector fires while the low callback is running.
        M.registers().raise_source(Source::Int0);
        M.on_high_priority();
        LOG.lock().unwrap().push("low end");
    }
    fn int0() {
        LOG.lock().unwrap().push("high");
    }

    M.bind(Source::Timer1, &TIMER1, Priority::Low).unwrap();
    assert!(!M.registers().is_set(bits::TMR1IP));
    M.init_intx(&IntxConfig::new(ExternalSource::Int0, Edge::Falling, Some(int0)))
        .unwrap();

    M.registers().raise_source(Source::Timer1);
    M.on_low_priority();

    assert_eq!(*LOG.lock().unwrap(), ["low start", "high", "low end"]);
    assert!(!M.registers().is_set(bits::TMR1IF));
    assert!(!M.registers().is_set(bits::INT0IF));
}

#[test]
fn flat_mode_ignores_priority_settings() {
    static M: Manager = Manager::new(SimulatedRegisters::new(), Config::flat());
    static TIMER3: PeripheralHandler = PeripheralHandler::new();

    M.bind(Source::Timer3, &TIMER3, Priority::Low).unwrap();
    assert!(!M.registers().is_set(bits::IPEN));
    assert!(!M.registers().is_set(bits::TMR3IP));
    assert!(M.registers().is_set(bits::TMR3IE));
}
