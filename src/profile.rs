//! Device capability profiles.
//!
//! A profile captures what the silicon implements (base address, number of
//! lines, control bits, vector alignment, privilege modes) and which
//! interrupt numbers are wired, so one code path serves every part.

use axaddrspace::HostPhysAddr;
use axerrno::{ax_err, AxResult};
use bitmaps::Bitmap;

use crate::consts::*;

/// Privilege mode of an interrupt line, encoded as in `clicintattr.mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PrivilegeMode {
    User = 0b00,
    Supervisor = 0b01,
    Machine = 0b11,
}

impl PrivilegeMode {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes a two-bit mode field. `0b10` is reserved.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0b11 {
            0b00 => Some(Self::User),
            0b01 => Some(Self::Supervisor),
            0b11 => Some(Self::Machine),
            _ => None,
        }
    }
}

/// Privilege modes a controller was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeModes {
    /// Machine mode only.
    M,
    /// Machine and user modes.
    MU,
    /// Machine, supervisor and user modes.
    MSU,
}

impl PrivilegeModes {
    pub const fn modes(self) -> &'static [PrivilegeMode] {
        match self {
            Self::M => &[PrivilegeMode::Machine],
            Self::MU => &[PrivilegeMode::Machine, PrivilegeMode::User],
            Self::MSU => &[
                PrivilegeMode::Machine,
                PrivilegeMode::Supervisor,
                PrivilegeMode::User,
            ],
        }
    }

    pub fn contains(self, mode: PrivilegeMode) -> bool {
        self.modes().contains(&mode)
    }
}

/// Privilege levels enabled for interrupts, written to `cliccfg.nmbits`.
///
/// Which selections exist depends on [`PrivilegeModes`]: `MU` on M/U parts,
/// `MS` and `MSU` on M/S/U parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeLevels {
    M,
    MU,
    MS,
    MSU,
}

impl PrivilegeLevels {
    pub const fn nmbits(self) -> u8 {
        match self {
            Self::M => 0,
            Self::MU | Self::MS => 1,
            Self::MSU => 2,
        }
    }

    pub const fn is_supported_by(self, modes: PrivilegeModes) -> bool {
        matches!(
            (self, modes),
            (Self::M, _)
                | (Self::MU, PrivilegeModes::MU)
                | (Self::MS, PrivilegeModes::MSU)
                | (Self::MSU, PrivilegeModes::MSU)
        )
    }

    pub const fn from_nmbits(nmbits: u8, modes: PrivilegeModes) -> Option<Self> {
        match (nmbits, modes) {
            (0, _) => Some(Self::M),
            (1, PrivilegeModes::MU) => Some(Self::MU),
            (1, PrivilegeModes::MSU) => Some(Self::MS),
            (2, PrivilegeModes::MSU) => Some(Self::MSU),
            _ => None,
        }
    }
}

/// Number of interrupt levels, written to `cliccfg.nlbits` as its log2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum MaxLevels {
    L1 = 0,
    L2 = 1,
    L4 = 2,
    L8 = 3,
    L16 = 4,
    L32 = 5,
    L64 = 6,
    L128 = 7,
    L256 = 8,
}

impl MaxLevels {
    pub const fn level_bits(self) -> u8 {
        self as u8
    }

    pub const fn count(self) -> u16 {
        1 << self.level_bits()
    }

    pub const fn from_level_bits(bits: u8) -> Option<Self> {
        Some(match bits {
            0 => Self::L1,
            1 => Self::L2,
            2 => Self::L4,
            3 => Self::L8,
            4 => Self::L16,
            5 => Self::L32,
            6 => Self::L64,
            7 => Self::L128,
            8 => Self::L256,
            _ => return None,
        })
    }
}

/// What a CLIC instance implements.
#[derive(Debug, Clone)]
pub struct ClicProfile {
    base: HostPhysAddr,
    num_lines: usize,
    ctl_bits: u8,
    tvec_align: u8,
    modes: PrivilegeModes,
    lines: Bitmap<MAX_LINES>,
}

impl ClicProfile {
    /// Creates a profile with every line in `0..num_lines` wired.
    ///
    /// `tvec_align` is the log2 of the vector / trap base alignment.
    pub fn new(
        base: HostPhysAddr,
        num_lines: usize,
        ctl_bits: u8,
        tvec_align: u8,
        modes: PrivilegeModes,
    ) -> AxResult<Self> {
        if ctl_bits > 8 {
            return ax_err!(InvalidInput, "clicintctl has at most 8 implemented bits");
        }
        if num_lines == 0 || num_lines > MAX_LINES {
            return ax_err!(InvalidInput, "line count out of range");
        }
        // the two low xtvec bits hold the trap mode
        if tvec_align < 2 || tvec_align as u32 >= usize::BITS {
            return ax_err!(InvalidInput, "vector alignment out of range");
        }
        Ok(Self {
            base,
            num_lines,
            ctl_bits,
            tvec_align,
            modes,
            lines: Bitmap::mask(num_lines),
        })
    }

    /// MDR1206: 48 lines, 4 control bits, 64-byte vector alignment, M/U.
    pub fn mdr1206() -> Self {
        Self {
            base: HostPhysAddr::from_usize(MDR1206_CLIC_BASE),
            num_lines: MDR1206_CLIC_NUM_INTERRUPTS,
            ctl_bits: MDR1206_CLIC_CTL_BITS,
            tvec_align: MDR1206_CLIC_TVEC_ALIGN,
            modes: PrivilegeModes::MU,
            lines: Bitmap::mask(MDR1206_CLIC_NUM_INTERRUPTS),
        }
    }

    /// Restricts the wired lines to `lines`.
    pub fn with_lines(mut self, lines: &[usize]) -> AxResult<Self> {
        let mut wired = Bitmap::<MAX_LINES>::new();
        for &irq in lines {
            if irq >= self.num_lines {
                return ax_err!(InvalidInput, "wired line beyond the controller");
            }
            wired.set(irq, true);
        }
        self.lines = wired;
        Ok(self)
    }

    pub fn base(&self) -> HostPhysAddr {
        self.base
    }

    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    pub fn ctl_bits(&self) -> u8 {
        self.ctl_bits
    }

    pub fn modes(&self) -> PrivilegeModes {
        self.modes
    }

    pub fn is_valid_line(&self, irq: usize) -> bool {
        irq < self.num_lines && self.lines.get(irq)
    }

    pub fn vector_align(&self) -> usize {
        1 << self.tvec_align
    }

    /// Mask of the base-address bits in xtvt / xtvec.
    pub fn vector_mask(&self) -> usize {
        !(self.vector_align() - 1)
    }
}

/// What a PLIC instance implements.
#[derive(Debug, Clone, Copy)]
pub struct PlicProfile {
    pub base: HostPhysAddr,
    pub num_lines: usize,
    pub modes: PrivilegeModes,
}

impl PlicProfile {
    /// MDR32F02: 32 sources routed to machine mode.
    pub fn mdr32f02() -> Self {
        Self {
            base: HostPhysAddr::from_usize(MDR32F02_PLIC_BASE),
            num_lines: MDR32F02_PLIC_NUM_INTERRUPTS,
            modes: PrivilegeModes::M,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axerrno::AxError;

    #[test]
    fn levels_selection_follows_built_modes() {
        assert!(PrivilegeLevels::M.is_supported_by(PrivilegeModes::M));
        assert!(PrivilegeLevels::MU.is_supported_by(PrivilegeModes::MU));
        assert!(!PrivilegeLevels::MU.is_supported_by(PrivilegeModes::MSU));
        assert!(!PrivilegeLevels::MS.is_supported_by(PrivilegeModes::MU));
        assert_eq!(PrivilegeLevels::from_nmbits(1, PrivilegeModes::MSU), Some(PrivilegeLevels::MS));
        assert_eq!(PrivilegeLevels::from_nmbits(1, PrivilegeModes::MU), Some(PrivilegeLevels::MU));
        assert_eq!(PrivilegeLevels::from_nmbits(3, PrivilegeModes::MSU), None);
    }

    #[test]
    fn wired_lines() {
        let profile = ClicProfile::mdr1206().with_lines(&[3, 7, 16]).unwrap();
        assert!(profile.is_valid_line(16));
        assert!(!profile.is_valid_line(4));
        assert!(!profile.is_valid_line(48));
        assert_eq!(
            ClicProfile::mdr1206().with_lines(&[48]).unwrap_err(),
            AxError::InvalidInput
        );
    }

    #[test]
    fn rejects_impossible_hardware() {
        let base = HostPhysAddr::from_usize(0x1000_0000);
        assert!(ClicProfile::new(base, 32, 9, 6, PrivilegeModes::M).is_err());
        assert!(ClicProfile::new(base, 0, 4, 6, PrivilegeModes::M).is_err());
        assert!(ClicProfile::new(base, 32, 4, 1, PrivilegeModes::M).is_err());
        let profile = ClicProfile::new(base, 32, 4, 6, PrivilegeModes::M).unwrap();
        assert_eq!(profile.vector_align(), 64);
        assert_eq!(profile.vector_mask() & 0xFFFF_FFFF, 0xFFFF_FFC0);
    }
}
