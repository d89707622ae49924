//! Vector table, trap vector and level threshold CSRs, per privilege mode.

use axerrno::{ax_err, AxResult};
use log::debug;

use crate::consts::*;
use crate::hw::HwAccess;
use crate::profile::PrivilegeMode;
use crate::Clic;

/// How a hart enters the trap handler, the low bits of xtvec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TrapMode {
    NonVectored = 0b00,
    Vectored = 0b01,
    Clic = 0b11,
}

impl TrapMode {
    pub const fn bits(self) -> usize {
        self as usize
    }

    /// `0b10` is reserved.
    pub const fn from_bits(bits: usize) -> Option<Self> {
        match bits & CSR_XTVEC_MODE_MSK {
            0b00 => Some(Self::NonVectored),
            0b01 => Some(Self::Vectored),
            0b11 => Some(Self::Clic),
            _ => None,
        }
    }
}

/// The CLIC CSRs of one privilege mode.
struct ModeCsrs {
    tvec: u16,
    tvt: u16,
    intstatus: u16,
    intthresh: u16,
    /// Position of this mode's active-level byte in xintstatus.
    status_pos: u32,
}

static MACHINE_CSRS: ModeCsrs = ModeCsrs {
    tvec: CSR_MTVEC,
    tvt: CSR_MTVT,
    intstatus: CSR_MINTSTATUS,
    intthresh: CSR_MINTTHRESH,
    status_pos: CSR_XINTSTATUS_MIL_POS,
};

static SUPERVISOR_CSRS: ModeCsrs = ModeCsrs {
    tvec: CSR_STVEC,
    tvt: CSR_STVT,
    intstatus: CSR_SINTSTATUS,
    intthresh: CSR_SINTTHRESH,
    status_pos: CSR_XINTSTATUS_SIL_POS,
};

static USER_CSRS: ModeCsrs = ModeCsrs {
    tvec: CSR_UTVEC,
    tvt: CSR_UTVT,
    intstatus: CSR_UINTSTATUS,
    intthresh: CSR_UINTTHRESH,
    status_pos: CSR_XINTSTATUS_UIL_POS,
};

fn mode_csrs(mode: PrivilegeMode) -> &'static ModeCsrs {
    match mode {
        PrivilegeMode::Machine => &MACHINE_CSRS,
        PrivilegeMode::Supervisor => &SUPERVISOR_CSRS,
        PrivilegeMode::User => &USER_CSRS,
    }
}

impl<B: HwAccess> Clic<B> {
    fn mode_csrs(&self, mode: PrivilegeMode) -> AxResult<&'static ModeCsrs> {
        self.check_mode(mode)?;
        Ok(mode_csrs(mode))
    }

    fn check_vector_addr(&self, addr: usize) -> AxResult {
        if addr & !self.profile.vector_mask() != 0 {
            return ax_err!(BadAddress, "vector address not aligned to the CLIC vector alignment");
        }
        Ok(())
    }

    /// Points xtvt of `mode` at a hardware vector table.
    pub fn set_vector_table(&self, mode: PrivilegeMode, addr: usize) -> AxResult {
        let csrs = self.mode_csrs(mode)?;
        self.check_vector_addr(addr)?;
        self.hw.csr_write(csrs.tvt, addr & self.profile.vector_mask())?;
        debug!("CLIC {mode:?} vector table at {addr:#x}");
        Ok(())
    }

    pub fn vector_table(&self, mode: PrivilegeMode) -> AxResult<usize> {
        let csrs = self.mode_csrs(mode)?;
        Ok(self.hw.csr_read(csrs.tvt)? & self.profile.vector_mask())
    }

    /// Sets the common trap handler base in xtvec. The mode bits are kept.
    pub fn set_trap_vector(&self, mode: PrivilegeMode, addr: usize) -> AxResult {
        let csrs = self.mode_csrs(mode)?;
        self.check_vector_addr(addr)?;
        let mask = self.profile.vector_mask();
        self.hw.critical_section(|| -> AxResult {
            self.hw.csr_clear_bits(csrs.tvec, mask)?;
            self.hw.csr_set_bits(csrs.tvec, addr & mask)
        })?;
        debug!("CLIC {mode:?} trap vector at {addr:#x}");
        Ok(())
    }

    pub fn trap_vector(&self, mode: PrivilegeMode) -> AxResult<usize> {
        let csrs = self.mode_csrs(mode)?;
        Ok(self.hw.csr_read(csrs.tvec)? & self.profile.vector_mask())
    }

    /// Selects the trap entry mode in xtvec. The base is kept.
    pub fn set_trap_mode(&self, mode: PrivilegeMode, trap_mode: TrapMode) -> AxResult {
        let csrs = self.mode_csrs(mode)?;
        self.hw.critical_section(|| -> AxResult {
            self.hw.csr_clear_bits(csrs.tvec, CSR_XTVEC_MODE_MSK)?;
            self.hw.csr_set_bits(csrs.tvec, trap_mode.bits())
        })?;
        debug!("CLIC {mode:?} trap mode {trap_mode:?}");
        Ok(())
    }

    /// Current trap entry mode, `None` for the reserved encoding.
    pub fn trap_mode(&self, mode: PrivilegeMode) -> AxResult<Option<TrapMode>> {
        let csrs = self.mode_csrs(mode)?;
        Ok(TrapMode::from_bits(self.hw.csr_read(csrs.tvec)?))
    }

    /// Level of the interrupt currently being serviced in `mode`.
    pub fn active_level(&self, mode: PrivilegeMode) -> AxResult<u8> {
        let csrs = self.mode_csrs(mode)?;
        let raw = (self.hw.csr_read(csrs.intstatus)? >> csrs.status_pos) as u8;
        let nlbits = self.nlbits()?;
        Ok(self.codec.threshold_to_level(raw, nlbits))
    }

    /// Holds back interrupts of `mode` whose level is at or below `level`.
    pub fn set_threshold(&self, mode: PrivilegeMode, level: u8) -> AxResult {
        let csrs = self.mode_csrs(mode)?;
        let nlbits = self.nlbits()?;
        self.check_level(level, nlbits)?;
        let raw = self.codec.level_to_threshold(level, nlbits);
        self.hw.csr_write(csrs.intthresh, raw as usize)
    }

    pub fn threshold(&self, mode: PrivilegeMode) -> AxResult<u8> {
        let csrs = self.mode_csrs(mode)?;
        let raw = self.hw.csr_read(csrs.intthresh)? as u8;
        let nlbits = self.nlbits()?;
        Ok(self.codec.threshold_to_level(raw, nlbits))
    }
}
