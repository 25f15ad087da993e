//! # Fault reporting
//!
//! Every CPU exception is fatal. The reporter prints the trap frame to a
//! diagnostic sink in a fixed line format and the dispatcher then halts:
//!
//! ```text
//! Exception (13) occured
//! error_code=0
//! rip=0xFFFFFFFF80101234
//! rflags=0x10086
//! cs=0x8
//! rsp=0xFFFF800000F0FF58
//! ss=0x10
//! cr2=0x0
//! ```
//!
//! Decimal for the vector and the error code, `0x`-prefixed uppercase hex
//! for everything else.

use core::fmt::{self, Write};

/// Saved CPU state handed over by a fault trampoline.
///
/// Field order is the contract with the trampolines; they lay the frame out
/// exactly like this in memory.
#[repr(C)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct TrapFrame {
    pub vector: u64,
    /// The CPU-pushed error code, or 0 for vectors without one.
    pub error_code: u64,
    pub rip: u64,
    pub rflags: u64,
    pub cs: u64,
    pub rsp: u64,
    pub ss: u64,
}

const _: () = assert!(size_of::<TrapFrame>() == 7 * 8);

/// Write the fault diagnostic for `frame` to `sink`.
///
/// `fault_address` is the sampled CR2 value; it is printed for every vector
/// and only meaningful for page faults.
///
/// # Errors
/// Propagates the sink's [`fmt::Error`].
pub fn report<W>(frame: &TrapFrame, fault_address: u64, sink: &mut W) -> fmt::Result
where
    W: Write + ?Sized,
{
    writeln!(sink, "Exception ({}) occured", frame.vector)?;
    writeln!(sink, "error_code={}", frame.error_code)?;
    writeln!(sink, "rip={:#X}", frame.rip)?;
    writeln!(sink, "rflags={:#X}", frame.rflags)?;
    writeln!(sink, "cs={:#X}", frame.cs)?;
    writeln!(sink, "rsp={:#X}", frame.rsp)?;
    writeln!(sink, "ss={:#X}", frame.ss)?;
    writeln!(sink, "cr2={fault_address:#X}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reports_fields_in_order() {
        let frame = TrapFrame {
            vector: 14,
            error_code: 2,
            rip: 0xFFFF_FFFF_8010_1234,
            rflags: 0x10086,
            cs: 0x8,
            rsp: 0xFFFF_8000_00F0_FF58,
            ss: 0x10,
        };
        let mut out = String::new();
        report(&frame, 0xDEAD_B000, &mut out).unwrap();

        assert_eq!(
            out,
            "Exception (14) occured\n\
             error_code=2\n\
             rip=0xFFFFFFFF80101234\n\
             rflags=0x10086\n\
             cs=0x8\n\
             rsp=0xFFFF800000F0FF58\n\
             ss=0x10\n\
             cr2=0xDEADB000\n"
        );
    }

    #[test]
    fn zero_prints_without_padding() {
        let mut out = String::new();
        report(&TrapFrame::default(), 0, &mut out).unwrap();
        assert!(out.contains("rip=0x0\n"));
        assert!(out.ends_with("cr2=0x0\n"));
    }
}
