//! Typed view of the CLIC register block.
//!
//! ```text
//! +----------+---------+------------------------------------------+
//! | Offset   | Size    | Description                              |
//! +----------+---------+------------------------------------------+
//! | 0x0000   | 1       | cliccfg                                  |
//! | 0x0004   | 4       | clicinfo                                 |
//! | 0x0040   | 4*32    | clicinttrig[0..32]                       |
//! | 0x1000   | 4*N     | {ip, ie, attr, ctl} per interrupt line   |
//! +----------+---------+------------------------------------------+
//! ```

use axaddrspace::{device::AccessWidth, HostPhysAddr};
use axerrno::AxResult;
use log::trace;

use crate::consts::*;
use crate::hw::HwAccess;
use crate::utils::reg_addr;

/// Register-level accessors over one CLIC block. No validation happens here.
pub struct RegisterView<'a, B: HwAccess> {
    hw: &'a B,
    base: HostPhysAddr,
}

impl<'a, B: HwAccess> RegisterView<'a, B> {
    pub fn new(hw: &'a B, base: HostPhysAddr) -> Self {
        Self { hw, base }
    }

    fn read(&self, offset: usize, width: AccessWidth) -> AxResult<usize> {
        let val = self.hw.mmio_read(reg_addr(self.base, offset), width)?;
        trace!("clic read {offset:#x} -> {val:#x}");
        Ok(val)
    }

    fn write(&self, offset: usize, width: AccessWidth, val: usize) -> AxResult {
        trace!("clic write {offset:#x} <- {val:#x}");
        self.hw.mmio_write(reg_addr(self.base, offset), width, val)
    }

    fn line_offset(irq: usize, field: usize) -> usize {
        CLIC_INT_OFFSET + irq * 4 + field
    }

    pub fn cfg(&self) -> AxResult<u8> {
        self.read(CLIC_CFG_OFFSET, AccessWidth::Byte).map(|v| v as u8)
    }

    pub fn set_cfg(&self, val: u8) -> AxResult {
        self.write(CLIC_CFG_OFFSET, AccessWidth::Byte, val as usize)
    }

    pub fn info(&self) -> AxResult<u32> {
        self.read(CLIC_INFO_OFFSET, AccessWidth::Dword).map(|v| v as u32)
    }

    pub fn inttrig(&self, index: usize) -> AxResult<u32> {
        self.read(CLIC_INTTRIG_OFFSET + index * 4, AccessWidth::Dword)
            .map(|v| v as u32)
    }

    /// The whole quad of line `irq`, IP in the low byte.
    pub fn line(&self, irq: usize) -> AxResult<u32> {
        self.read(Self::line_offset(irq, CLIC_INT_IP), AccessWidth::Dword)
            .map(|v| v as u32)
    }

    pub fn set_line(&self, irq: usize, val: u32) -> AxResult {
        self.write(Self::line_offset(irq, CLIC_INT_IP), AccessWidth::Dword, val as usize)
    }

    pub fn ip(&self, irq: usize) -> AxResult<u8> {
        self.read(Self::line_offset(irq, CLIC_INT_IP), AccessWidth::Byte).map(|v| v as u8)
    }

    pub fn set_ip(&self, irq: usize, val: u8) -> AxResult {
        self.write(Self::line_offset(irq, CLIC_INT_IP), AccessWidth::Byte, val as usize)
    }

    pub fn ie(&self, irq: usize) -> AxResult<u8> {
        self.read(Self::line_offset(irq, CLIC_INT_IE), AccessWidth::Byte).map(|v| v as u8)
    }

    pub fn set_ie(&self, irq: usize, val: u8) -> AxResult {
        self.write(Self::line_offset(irq, CLIC_INT_IE), AccessWidth::Byte, val as usize)
    }

    pub fn attr(&self, irq: usize) -> AxResult<u8> {
        self.read(Self::line_offset(irq, CLIC_INT_ATTR), AccessWidth::Byte).map(|v| v as u8)
    }

    pub fn ctl(&self, irq: usize) -> AxResult<u8> {
        self.read(Self::line_offset(irq, CLIC_INT_CTL), AccessWidth::Byte).map(|v| v as u8)
    }

    pub fn set_ctl(&self, irq: usize, val: u8) -> AxResult {
        self.write(Self::line_offset(irq, CLIC_INT_CTL), AccessWidth::Byte, val as usize)
    }
}
