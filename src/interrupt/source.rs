// Copyright 2026 The pic18f4620-hal authors.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interrupt sources and where their control bits live.

use bitflags::bitflags;

use crate::registers::{bits, Bit};

/// Every interrupt source the dispatcher knows about, in dispatch order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    Int0,
    Int1,
    Int2,
    Rb4,
    Rb5,
    Rb6,
    Rb7,
    Adc,
    Timer0,
    Timer1,
    Timer2,
    Timer3,
    Ccp1,
    Ccp2,
    EusartTx,
    EusartRx,
    Spi,
    I2c,
    I2cBusCollision,
}

/// How a source is serviced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// INT0..INT2, one callback each.
    External,
    /// One pin of the shared RB4..RB7 group.
    OnChange,
    /// An internal peripheral served by its own driver.
    Peripheral,
}

impl Source {
    pub const ALL: [Source; 19] = [
        Source::Int0,
        Source::Int1,
        Source::Int2,
        Source::Rb4,
        Source::Rb5,
        Source::Rb6,
        Source::Rb7,
        Source::Adc,
        Source::Timer0,
        Source::Timer1,
        Source::Timer2,
        Source::Timer3,
        Source::Ccp1,
        Source::Ccp2,
        Source::EusartTx,
        Source::EusartRx,
        Source::Spi,
        Source::I2c,
        Source::I2cBusCollision,
    ];

    /// The peripheral sources, in dispatch order.
    pub const PERIPHERALS: [Source; 12] = [
        Source::Adc,
        Source::Timer0,
        Source::Timer1,
        Source::Timer2,
        Source::Timer3,
        Source::Ccp1,
        Source::Ccp2,
        Source::EusartTx,
        Source::EusartRx,
        Source::Spi,
        Source::I2c,
        Source::I2cBusCollision,
    ];

    pub const fn kind(self) -> SourceKind {
        match self {
            Source::Int0 | Source::Int1 | Source::Int2 => SourceKind::External,
            Source::Rb4 | Source::Rb5 | Source::Rb6 | Source::Rb7 => SourceKind::OnChange,
            _ => SourceKind::Peripheral,
        }
    }

    pub const fn enable_bit(self) -> Bit {
        match self {
            Source::Int0 => bits::INT0IE,
            Source::Int1 => bits::INT1IE,
            Source::Int2 => bits::INT2IE,
            Source::Rb4 | Source::Rb5 | Source::Rb6 | Source::Rb7 => bits::RBIE,
            Source::Adc => bits::ADIE,
            Source::Timer0 => bits::TMR0IE,
            Source::Timer1 => bits::TMR1IE,
            Source::Timer2 => bits::TMR2IE,
            Source::Timer3 => bits::TMR3IE,
            Source::Ccp1 => bits::CCP1IE,
            Source::Ccp2 => bits::CCP2IE,
            Source::EusartTx => bits::TXIE,
            Source::EusartRx => bits::RCIE,
            Source::Spi | Source::I2c => bits::SSPIE,
            Source::I2cBusCollision => bits::BCLIE,
        }
    }

    pub const fn flag_bit(self) -> Bit {
        match self {
            Source::Int0 => bits::INT0IF,
            Source::Int1 => bits::INT1IF,
            Source::Int2 => bits::INT2IF,
            Source::Rb4 | Source::Rb5 | Source::Rb6 | Source::Rb7 => bits::RBIF,
            Source::Adc => bits::ADIF,
            Source::Timer0 => bits::TMR0IF,
            Source::Timer1 => bits::TMR1IF,
            Source::Timer2 => bits::TMR2IF,
            Source::Timer3 => bits::TMR3IF,
            Source::Ccp1 => bits::CCP1IF,
            Source::Ccp2 => bits::CCP2IF,
            Source::EusartTx => bits::TXIF,
            Source::EusartRx => bits::RCIF,
            Source::Spi | Source::I2c => bits::SSPIF,
            Source::I2cBusCollision => bits::BCLIF,
        }
    }

    /// `None` for INT0, which is always serviced at high priority.
    pub const fn priority_bit(self) -> Option<Bit> {
        match self {
            Source::Int0 => None,
            Source::Int1 => Some(bits::INT1IP),
            Source::Int2 => Some(bits::INT2IP),
            Source::Rb4 | Source::Rb5 | Source::Rb6 | Source::Rb7 => Some(bits::RBIP),
            Source::Adc => Some(bits::ADIP),
            Source::Timer0 => Some(bits::TMR0IP),
            Source::Timer1 => Some(bits::TMR1IP),
            Source::Timer2 => Some(bits::TMR2IP),
            Source::Timer3 => Some(bits::TMR3IP),
            Source::Ccp1 => Some(bits::CCP1IP),
            Source::Ccp2 => Some(bits::CCP2IP),
            Source::EusartTx => Some(bits::TXIP),
            Source::EusartRx => Some(bits::RCIP),
            Source::Spi | Source::I2c => Some(bits::SSPIP),
            Source::I2cBusCollision => Some(bits::BCLIP),
        }
    }

    /// TXIF and RCIF are read-only; the EUSART clears them when TXREG is written or RCREG
    /// is read.
    pub const fn flag_is_software_clearable(self) -> bool {
        !matches!(self, Source::EusartTx | Source::EusartRx)
    }

    /// The other source sharing this source's enable and flag bits.
    pub const fn alias(self) -> Option<Source> {
        match self {
            Source::Spi => Some(Source::I2c),
            Source::I2c => Some(Source::Spi),
            _ => None,
        }
    }

    /// Position among [`Source::PERIPHERALS`].
    pub(crate) const fn peripheral_index(self) -> Option<usize> {
        match self.kind() {
            SourceKind::Peripheral => Some(self as usize - Source::Adc as usize),
            _ => None,
        }
    }

    pub const fn as_set(self) -> SourceSet {
        SourceSet::from_bits_retain(1 << self as u32)
    }
}

bitflags! {
    /// A set of interrupt sources.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SourceSet: u32 {
        const INT0 = 1 << 0;
        const INT1 = 1 << 1;
        const INT2 = 1 << 2;
        const RB4 = 1 << 3;
        const RB5 = 1 << 4;
        const RB6 = 1 << 5;
        const RB7 = 1 << 6;
        const ADC = 1 << 7;
        const TIMER0 = 1 << 8;
        const TIMER1 = 1 << 9;
        const TIMER2 = 1 << 10;
        const TIMER3 = 1 << 11;
        const CCP1 = 1 << 12;
        const CCP2 = 1 << 13;
        const EUSART_TX = 1 << 14;
        const EUSART_RX = 1 << 15;
        const SPI = 1 << 16;
        const I2C = 1 << 17;
        const I2C_BUS_COLLISION = 1 << 18;

        const EXTERNAL = Self::INT0.bits() | Self::INT1.bits() | Self::INT2.bits();
        const ON_CHANGE = Self::RB4.bits() | Self::RB5.bits() | Self::RB6.bits() | Self::RB7.bits();
    }
}

impl SourceSet {
    /// The sources whose Cargo feature is enabled.
    pub const fn compiled() -> Self {
        let mut set = SourceSet::empty();
        if cfg!(feature = "ext-intx") {
            set = set.union(SourceSet::EXTERNAL);
        }
        if cfg!(feature = "ext-on-change") {
            set = set.union(SourceSet::ON_CHANGE);
        }
        if cfg!(feature = "adc") {
            set = set.union(SourceSet::ADC);
        }
        if cfg!(feature = "timer0") {
            set = set.union(SourceSet::TIMER0);
        }
        if cfg!(feature = "timer1") {
            set = set.union(SourceSet::TIMER1);
        }
        if cfg!(feature = "timer2") {
            set = set.union(SourceSet::TIMER2);
        }
        if cfg!(feature = "timer3") {
            set = set.union(SourceSet::TIMER3);
        }
        if cfg!(feature = "ccp1") {
            set = set.union(SourceSet::CCP1);
        }
        if cfg!(feature = "ccp2") {
            set = set.union(SourceSet::CCP2);
        }
        if cfg!(feature = "eusart-tx") {
            set = set.union(SourceSet::EUSART_TX);
        }
        if cfg!(feature = "eusart-rx") {
            set = set.union(SourceSet::EUSART_RX);
        }
        if cfg!(feature = "mssp-spi") {
            set = set.union(SourceSet::SPI);
        }
        if cfg!(feature = "mssp-i2c") {
            set = set.union(SourceSet::I2C);
        }
        if cfg!(feature = "mssp-i2c-bus-collision") {
            set = set.union(SourceSet::I2C_BUS_COLLISION);
        }
        set
    }

    pub const fn has(self, source: Source) -> bool {
        self.contains(source.as_set())
    }

    /// Iterates over the member sources in dispatch order.
    pub fn sources(self) -> impl Iterator<Item = Source> {
        Source::ALL.into_iter().filter(move |s| self.has(*s))
    }
}

impl From<Source> for SourceSet {
    fn from(source: Source) -> Self {
        source.as_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::Sfr;

    #[test]
    fn set_bits_follow_declaration_order() {
        assert_eq!(Source::Int0.as_set(), SourceSet::INT0);
        assert_eq!(Source::Rb6.as_set(), SourceSet::RB6);
        assert_eq!(Source::Timer3.as_set(), SourceSet::TIMER3);
        assert_eq!(Source::I2cBusCollision.as_set(), SourceSet::I2C_BUS_COLLISION);
        assert_eq!(SourceSet::all().sources().count(), Source::ALL.len());
    }

    #[test]
    fn peripherals_are_the_tail_of_the_table() {
        for (i, source) in Source::PERIPHERALS.iter().enumerate() {
            assert_eq!(source.kind(), SourceKind::Peripheral);
            assert_eq!(source.peripheral_index(), Some(i));
        }
        assert_eq!(Source::Rb7.peripheral_index(), None);
    }

    #[test]
    fn descriptor_spot_checks() {
        assert_eq!(Source::Int0.priority_bit(), None);
        assert_eq!(Source::Int1.enable_bit(), Bit::new(Sfr::Intcon3, 3));
        assert_eq!(Source::Timer0.flag_bit(), Bit::new(Sfr::Intcon, 2));
        assert_eq!(Source::Rb5.flag_bit(), Source::Rb7.flag_bit());
        assert_eq!(Source::Ccp2.priority_bit(), Some(Bit::new(Sfr::Ipr2, 0)));
        assert!(!Source::EusartRx.flag_is_software_clearable());
        assert!(Source::Adc.flag_is_software_clearable());
        assert_eq!(Source::Spi.flag_bit(), Source::I2c.flag_bit());
        assert_eq!(Source::I2c.alias(), Some(Source::Spi));
        assert_eq!(Source::Adc.alias(), None);
    }

    #[test]
    #[cfg(all(
        feature = "ext-intx",
        feature = "ext-on-change",
        feature = "adc",
        feature = "timer0",
        feature = "timer1",
        feature = "timer2",
        feature = "timer3",
        feature = "ccp1",
        feature = "ccp2",
        feature = "eusart-tx",
        feature = "eusart-rx",
        feature = "mssp-spi",
        feature = "mssp-i2c",
        feature = "mssp-i2c-bus-collision"
    ))]
    fn default_features_compile_every_source() {
        assert_eq!(SourceSet::compiled(), SourceSet::all());
    }

    #[test]
    fn compiled_set_follows_features() {
        let compiled = SourceSet::compiled();
        let expected = [
            (SourceSet::EXTERNAL, cfg!(feature = "ext-intx")),
            (SourceSet::ON_CHANGE, cfg!(feature = "ext-on-change")),
            (SourceSet::ADC, cfg!(feature = "adc")),
            (SourceSet::TIMER0, cfg!(feature = "timer0")),
            (SourceSet::TIMER1, cfg!(feature = "timer1")),
            (SourceSet::TIMER2, cfg!(feature = "timer2")),
            (SourceSet::TIMER3, cfg!(feature = "timer3")),
            (SourceSet::CCP1, cfg!(feature = "ccp1")),
            (SourceSet::CCP2, cfg!(feature = "ccp2")),
            (SourceSet::EUSART_TX, cfg!(feature = "eusart-tx")),
            (SourceSet::EUSART_RX, cfg!(feature = "eusart-rx")),
            (SourceSet::SPI, cfg!(feature = "mssp-spi")),
            (SourceSet::I2C, cfg!(feature = "mssp-i2c")),
            (SourceSet::I2C_BUS_COLLISION, cfg!(feature = "mssp-i2c-bus-collision")),
        ];
        for (set, enabled) in expected {
            if enabled {
                assert!(compiled.contains(set), "{:?}", set);
            } else {
                assert!(!compiled.intersects(set), "{:?}", set);
            }
        }
    }

    #[test]
    fn iterates_in_dispatch_order() {
        let set = SourceSet::TIMER1 | SourceSet::INT2 | SourceSet::RB4;
        let mut it = set.sources();
        assert_eq!(it.next(), Some(Source::Int2));
        assert_eq!(it.next(), Some(Source::Rb4));
        assert_eq!(it.next(), Some(Source::Timer1));
        assert_eq!(it.next(), None);
    }
}
