//! This module defines the `HalError` and `HalErrorLevel` enumerations and their associated
//! functionality. It provides a structured way to represent hardware abstraction layer (HAL)
//! errors raised at the register boundary, with a severity level and a formatted message.

use crate::HalError::{InvalidBusId, InvalidPeripheralId, InvalidPinId, InvalidPortId};
use crate::HalErrorLevel::{Critical, Error};
use heapless::{String, format};

pub type HalResult<T> = Result<T, HalError>;

/// Represents the severity levels of hardware abstraction layer (HAL) errors.
///
/// # Variants
///
/// - `Critical`
///   The requested peripheral could not be reached; the feature depending on it is lost.
///
/// - `Error`
///   A recoverable misuse of the HAL, the call had no effect.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HalErrorLevel {
    Critical,
    Error,
}

impl HalErrorLevel {
    /// Converts the `HalErrorLevel` enum variant into a corresponding string slice representation.
    ///
    /// This textual prefix is used in front of every formatted [`HalError`] message.
    pub fn as_str(&self) -> &str {
        match self {
            Critical => "HAL Critical error : ",
            Error => "HAL Error : ",
        }
    }
}

/// Errors returned by the register-level drivers.
///
/// `InvalidBusId` and `InvalidPeripheralId` are raised by the peripheral clock
/// control when an identifier is outside the range the RCC enable registers can address.
/// `InvalidPortId` and `InvalidPinId` are the GPIO counterparts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HalError {
    InvalidBusId(u8),
    InvalidPeripheralId(u8),
    InvalidPortId(u8),
    InvalidPinId(u8),
}

impl HalError {
    /// Converts the error into a formatted string with a maximum size of 256 characters.
    ///
    /// The message is prefixed with the severity string returned by
    /// [`HalErrorLevel::as_str`].
    pub fn to_string(&self) -> String<256> {
        let mut l_msg = String::new();
        l_msg.push_str(self.severity().as_str()).unwrap();
        match self {
            InvalidBusId(l_id) => {
                l_msg
                    .push_str(format!(60; "Bus ID {} does not exist", l_id).unwrap().as_str())
                    .unwrap();
            }
            InvalidPeripheralId(l_id) => {
                l_msg
                    .push_str(
                        format!(60; "Peripheral ID {} is out of range", l_id)
                            .unwrap()
                            .as_str(),
                    )
                    .unwrap();
            }
            InvalidPortId(l_id) => {
                l_msg
                    .push_str(format!(60; "GPIO port {} does not exist", l_id).unwrap().as_str())
                    .unwrap();
            }
            InvalidPinId(l_id) => {
                l_msg
                    .push_str(format!(60; "GPIO pin {} does not exist", l_id).unwrap().as_str())
                    .unwrap();
            }
        }
        l_msg
    }

    /// Returns the severity level of the `HalError` instance.
    pub fn severity(&self) -> HalErrorLevel {
        match self {
            InvalidBusId(_) => Critical,
            InvalidPeripheralId(_) => Critical,
            InvalidPortId(_) => Error,
            InvalidPinId(_) => Error,
        }
    }
}
