//! # Typed `X86_64` Control Registers
//!
//! Only the registers the interrupt path consumes are modelled here. Reading
//! them is privileged, so access goes through [`LoadRegisterUnsafe`].

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

#[cfg(feature = "cr2")]
pub mod cr2;

pub trait LoadRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety requirements.
    /// For example, the register access might be privileged and require kernel mode (Ring 0).
    unsafe fn load_unsafe() -> Self;
}
