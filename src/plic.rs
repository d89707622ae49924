//! Flat platform-level interrupt controller, context 0.
//!
//! Interrupt numbers are zero-based; PLIC source 0 is reserved, so line `irq`
//! is hardware source `irq + 1` everywhere (priority slot, pending / enable
//! bit, claim value).

use axaddrspace::{device::AccessWidth, HostPhysAddr};
use axerrno::{ax_err, AxResult};
use bitmaps::Bitmap;
use log::{debug, trace};
use spin::Mutex;

use crate::consts::*;
use crate::hw::HwAccess;
use crate::profile::{PlicProfile, PrivilegeMode};
use crate::utils::reg_addr;

/// Core-local interrupt classes gated by the xie CSRs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreInterrupt {
    Software,
    Timer,
    External,
}

impl CoreInterrupt {
    /// The xie bit of this interrupt for `mode`, e.g. MTIE for
    /// `(Timer, Machine)`.
    pub const fn mask(self, mode: PrivilegeMode) -> usize {
        let base = match self {
            Self::Software => 0,
            Self::Timer => 4,
            Self::External => 8,
        };
        1 << (base + mode.bits() as usize)
    }
}

const fn ie_csr(mode: PrivilegeMode) -> u16 {
    match mode {
        PrivilegeMode::Machine => CSR_MIE,
        PrivilegeMode::Supervisor => CSR_SIE,
        PrivilegeMode::User => CSR_UIE,
    }
}

pub struct Plic<B: HwAccess> {
    hw: B,
    profile: PlicProfile,
    /// Lines claimed and not yet completed.
    claimed: Mutex<Bitmap<MAX_LINES>>,
}

impl<B: HwAccess> Plic<B> {
    pub fn new(hw: B, profile: PlicProfile) -> AxResult<Self> {
        // source numbers are one above the line numbers
        if profile.num_lines == 0 || profile.num_lines >= MAX_LINES {
            return ax_err!(InvalidInput, "PLIC line count out of range");
        }
        Ok(Self {
            hw,
            profile,
            claimed: Mutex::new(Bitmap::new()),
        })
    }

    pub fn profile(&self) -> &PlicProfile {
        &self.profile
    }

    fn check_irq(&self, irq: usize) -> AxResult {
        if irq >= self.profile.num_lines {
            return ax_err!(InvalidInput, "interrupt number beyond the PLIC");
        }
        Ok(())
    }

    fn addr(&self, offset: usize) -> HostPhysAddr {
        reg_addr(self.profile.base, offset)
    }

    fn read(&self, offset: usize) -> AxResult<u32> {
        let val = self.hw.mmio_read(self.addr(offset), AccessWidth::Dword)? as u32;
        trace!("plic read {offset:#x} -> {val:#x}");
        Ok(val)
    }

    fn write(&self, offset: usize, val: u32) -> AxResult {
        trace!("plic write {offset:#x} <- {val:#x}");
        self.hw.mmio_write(self.addr(offset), AccessWidth::Dword, val as usize)
    }

    /// Word offset within a bit array and the bit of line `irq`.
    const fn source_bit(irq: usize) -> (usize, u32) {
        let source = irq + 1;
        ((source / 32) * 4, 1 << (source % 32))
    }

    pub fn set_priority(&self, irq: usize, priority: u32) -> AxResult {
        self.check_irq(irq)?;
        if priority > PLIC_MAX_PRIORITY {
            return ax_err!(InvalidInput, "PLIC priority out of range");
        }
        self.write(PLIC_PRIORITY_OFFSET + (irq + 1) * 4, priority)
    }

    pub fn priority(&self, irq: usize) -> AxResult<u32> {
        self.check_irq(irq)?;
        self.read(PLIC_PRIORITY_OFFSET + (irq + 1) * 4)
    }

    pub fn enable_line(&self, irq: usize) -> AxResult {
        self.check_irq(irq)?;
        let (word, bit) = Self::source_bit(irq);
        self.hw.critical_section(|| -> AxResult {
            let val = self.read(PLIC_ENABLE_OFFSET + word)?;
            self.write(PLIC_ENABLE_OFFSET + word, val | bit)
        })
    }

    pub fn disable_line(&self, irq: usize) -> AxResult {
        self.check_irq(irq)?;
        let (word, bit) = Self::source_bit(irq);
        self.hw.critical_section(|| -> AxResult {
            let val = self.read(PLIC_ENABLE_OFFSET + word)?;
            self.write(PLIC_ENABLE_OFFSET + word, val & !bit)
        })
    }

    pub fn is_line_enabled(&self, irq: usize) -> AxResult<bool> {
        self.check_irq(irq)?;
        let (word, bit) = Self::source_bit(irq);
        Ok(self.read(PLIC_ENABLE_OFFSET + word)? & bit != 0)
    }

    pub fn is_pending(&self, irq: usize) -> AxResult<bool> {
        self.check_irq(irq)?;
        let (word, bit) = Self::source_bit(irq);
        Ok(self.read(PLIC_PENDING_OFFSET + word)? & bit != 0)
    }

    /// Lines with a priority at or below `threshold` are masked.
    pub fn set_threshold(&self, threshold: u32) -> AxResult {
        if threshold > PLIC_MAX_PRIORITY {
            return ax_err!(InvalidInput, "PLIC threshold out of range");
        }
        self.write(PLIC_CONTEXT_CTRL_OFFSET + PLIC_CONTEXT_THRESHOLD_OFFSET, threshold)
    }

    pub fn threshold(&self) -> AxResult<u32> {
        self.read(PLIC_CONTEXT_CTRL_OFFSET + PLIC_CONTEXT_THRESHOLD_OFFSET)
    }

    /// Claims the highest-priority pending line, `None` if nothing is pending.
    pub fn claim(&self) -> AxResult<Option<usize>> {
        let source = self.read(PLIC_CONTEXT_CTRL_OFFSET + PLIC_CONTEXT_CLAIM_COMPLETE_OFFSET)?;
        if source == 0 {
            return Ok(None);
        }
        let irq = source as usize - 1;
        if irq >= self.profile.num_lines {
            return ax_err!(InvalidData, "PLIC claimed a source it does not have");
        }
        self.claimed.lock().set(irq, true);
        trace!("plic claimed line {irq}");
        Ok(Some(irq))
    }

    /// Signals the end of handling of a line returned by [`claim`](Self::claim).
    pub fn complete(&self, irq: usize) -> AxResult {
        self.check_irq(irq)?;
        let mut claimed = self.claimed.lock();
        if !claimed.get(irq) {
            return ax_err!(InvalidInput, "completing a PLIC line that was not claimed");
        }
        self.write(
            PLIC_CONTEXT_CTRL_OFFSET + PLIC_CONTEXT_CLAIM_COMPLETE_OFFSET,
            (irq + 1) as u32,
        )?;
        claimed.set(irq, false);
        Ok(())
    }

    fn check_mode(&self, mode: PrivilegeMode) -> AxResult {
        if !self.profile.modes.contains(mode) {
            return ax_err!(InvalidInput, "privilege mode not routed through this PLIC");
        }
        Ok(())
    }

    /// Unmasks a core interrupt class for `mode` in its xie CSR.
    pub fn enable_core_irq(&self, mode: PrivilegeMode, irq: CoreInterrupt) -> AxResult {
        self.check_mode(mode)?;
        self.hw.csr_set_bits(ie_csr(mode), irq.mask(mode))?;
        debug!("{irq:?} interrupts enabled for {mode:?}");
        Ok(())
    }

    pub fn disable_core_irq(&self, mode: PrivilegeMode, irq: CoreInterrupt) -> AxResult {
        self.check_mode(mode)?;
        self.hw.csr_clear_bits(ie_csr(mode), irq.mask(mode))?;
        debug!("{irq:?} interrupts disabled for {mode:?}");
        Ok(())
    }
}
