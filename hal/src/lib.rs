//! Hardware Abstraction Layer (HAL) for embedded systems
//!
//! This crate provides vendor-agnostic traits for the countdown timer and the
//! interrupt controller, and the register access capability their drivers are
//! written against.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod error;
pub mod interrupt;
pub mod register;
pub mod timer;

// Re-export commonly used types
pub use error::{HalError, HalResult};
pub use register::{Reg, RegisterBank};
