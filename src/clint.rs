//! Core-local interruptor: machine software interrupts and the machine timer.
//!
//! ```text
//! 0x0000 + 4 * hart   msip
//! 0x4000 + 8 * hart   mtimecmp
//! 0xBFF8              mtime
//! ```
//!
//! On RV64 the 64-bit registers are accessed in one bus transaction. On RV32
//! they are split into two words and sequenced so that the timer never sees a
//! transient value that would fire early.

use axaddrspace::{device::AccessWidth, HostPhysAddr};
use axerrno::{ax_err, AxResult};
use log::{debug, trace};

use crate::consts::*;
use crate::hw::HwAccess;
use crate::utils::reg_addr;

const WIDE_BUS: bool = cfg!(target_pointer_width = "64");

pub struct Clint<B: HwAccess> {
    hw: B,
    base: HostPhysAddr,
    harts: usize,
}

impl<B: HwAccess> Clint<B> {
    pub fn new(hw: B, base: HostPhysAddr, harts: usize) -> Self {
        Self { hw, base, harts }
    }

    /// The single-hart CLINT of the MDR parts.
    pub fn mdr(hw: B) -> Self {
        Self::new(hw, HostPhysAddr::from_usize(MDR_CLINT_BASE), 1)
    }

    pub fn harts(&self) -> usize {
        self.harts
    }

    fn check_hart(&self, hart: usize) -> AxResult {
        if hart >= self.harts {
            return ax_err!(InvalidInput, "hart id beyond the CLINT");
        }
        Ok(())
    }

    fn read32(&self, offset: usize) -> AxResult<u32> {
        let val = self.hw.mmio_read(reg_addr(self.base, offset), AccessWidth::Dword)? as u32;
        trace!("clint read {offset:#x} -> {val:#x}");
        Ok(val)
    }

    fn write32(&self, offset: usize, val: u32) -> AxResult {
        trace!("clint write {offset:#x} <- {val:#x}");
        self.hw.mmio_write(reg_addr(self.base, offset), AccessWidth::Dword, val as usize)
    }

    fn read64(&self, offset: usize) -> AxResult<u64> {
        if WIDE_BUS {
            Ok(self.hw.mmio_read(reg_addr(self.base, offset), AccessWidth::Qword)? as u64)
        } else {
            self.read_split(offset)
        }
    }

    /// Reads a 64-bit counter as two words, retrying if the high word moved.
    fn read_split(&self, offset: usize) -> AxResult<u64> {
        loop {
            let hi = self.read32(offset + 4)?;
            let lo = self.read32(offset)?;
            if hi == self.read32(offset + 4)? {
                return Ok(((hi as u64) << 32) | lo as u64);
            }
        }
    }

    /// mtimecmp as two words: park the high word at its maximum first so the
    /// intermediate value can never be reached.
    fn write_compare_split(&self, offset: usize, val: u64) -> AxResult {
        self.write32(offset + 4, u32::MAX)?;
        self.write32(offset, val as u32)?;
        self.write32(offset + 4, (val >> 32) as u32)
    }

    /// mtime as two words: zero the low word first so it cannot carry into
    /// the new high word.
    fn write_time_split(&self, offset: usize, val: u64) -> AxResult {
        self.write32(offset, 0)?;
        self.write32(offset + 4, (val >> 32) as u32)?;
        self.write32(offset, val as u32)
    }

    /// Raises or clears the machine software interrupt of `hart`.
    pub fn set_software_irq(&self, hart: usize, pending: bool) -> AxResult {
        self.check_hart(hart)?;
        self.write32(CLINT_MSIP_OFFSET + hart * 4, pending as u32)
    }

    pub fn software_irq(&self, hart: usize) -> AxResult<bool> {
        self.check_hart(hart)?;
        Ok(self.read32(CLINT_MSIP_OFFSET + hart * 4)? & 1 != 0)
    }

    pub fn set_compare(&self, hart: usize, val: u64) -> AxResult {
        self.check_hart(hart)?;
        let offset = CLINT_MTIMECMP_OFFSET + hart * 8;
        if WIDE_BUS {
            self.hw.mmio_write(reg_addr(self.base, offset), AccessWidth::Qword, val as usize)?;
        } else {
            self.write_compare_split(offset, val)?;
        }
        debug!("hart {hart} mtimecmp <- {val:#x}");
        Ok(())
    }

    pub fn compare(&self, hart: usize) -> AxResult<u64> {
        self.check_hart(hart)?;
        self.read64(CLINT_MTIMECMP_OFFSET + hart * 8)
    }

    pub fn set_time(&self, val: u64) -> AxResult {
        if WIDE_BUS {
            self.hw.mmio_write(
                reg_addr(self.base, CLINT_MTIME_OFFSET),
                AccessWidth::Qword,
                val as usize,
            )?;
        } else {
            self.write_time_split(CLINT_MTIME_OFFSET, val)?;
        }
        debug!("mtime <- {val:#x}");
        Ok(())
    }

    pub fn time(&self) -> AxResult<u64> {
        self.read64(CLINT_MTIME_OFFSET)
    }
}
