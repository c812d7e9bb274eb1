// Copyright 2026 The pic18f4620-hal authors.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

pub use embedded_hal::digital::v2::InputPin as _embedded_hal_digital_InputPin;
pub use embedded_hal::digital::v2::OutputPin as _embedded_hal_digital_OutputPin;
pub use embedded_hal::digital::v2::StatefulOutputPin as _embedded_hal_digital_StatefulOutputPin;
pub use embedded_hal::digital::v2::ToggleableOutputPin as _embedded_hal_digital_ToggleableOutputPin;

pub use crate::gpio::PinExt as _pic18f4620_hal_gpio_PinExt;
pub use crate::registers::RegisterFile as _pic18f4620_hal_registers_RegisterFile;
