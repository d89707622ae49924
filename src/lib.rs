//! RISC-V interrupt controller configuration layer.
//!
//! The centrepiece is [`Clic`], a driver for a CLIC-style controller whose
//! per-line control byte is split at runtime into a level and a priority
//! field. [`Plic`] and [`Clint`] cover the flat external controller and the
//! timer / software interrupt block found on the simpler parts.
//!
//! All hardware access goes through an injected [`HwAccess`] handle.
//!
//! ```ignore
//! let clic = Clic::new(BareMetal, ClicProfile::mdr1206());
//! clic.init(&ClicInit::default_for(clic.profile()))?;
//! clic.configure_line(UART1_IRQ, &LineConfig { enabled: true, level: 2, ..Default::default() })?;
//! clic.set_vector_table(PrivilegeMode::Machine, vector_table as usize)?;
//! ```

#![cfg_attr(not(test), no_std)]

mod consts;
mod utils;

pub mod clint;
pub mod codec;
pub mod hw;
pub mod line;
pub mod plic;
pub mod profile;
pub mod regs;
pub mod vector;

#[cfg(test)]
mod mock;

pub use consts::*;

pub use clint::Clint;
pub use codec::LevelPriorityCodec;
pub use hw::HwAccess;
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
pub use hw::BareMetal;
pub use line::{LineAttr, LineConfig, TriggerKind};
pub use plic::{CoreInterrupt, Plic};
pub use profile::{ClicProfile, MaxLevels, PlicProfile, PrivilegeLevels, PrivilegeMode, PrivilegeModes};
pub use regs::RegisterView;
pub use vector::TrapMode;

use axerrno::{ax_err, AxResult};
use log::debug;

/// Global CLIC setup, written once to `cliccfg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClicInit {
    pub privilege_levels: PrivilegeLevels,
    pub max_levels: MaxLevels,
}

impl ClicInit {
    /// Machine mode only, and about half of the control bits as level bits.
    pub fn default_for(profile: &ClicProfile) -> Self {
        let level_bits = (profile.ctl_bits() + 1) / 2;
        Self {
            privilege_levels: PrivilegeLevels::M,
            max_levels: MaxLevels::from_level_bits(level_bits).unwrap_or(MaxLevels::L1),
        }
    }
}

/// Capabilities and the configuration currently in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClicConfig {
    /// `None` if `nmbits` holds a value the controller was not built for.
    pub privilege_levels: Option<PrivilegeLevels>,
    pub vectoring: bool,
    /// Control bits reported by `clicinfo`.
    pub ctl_bits: u8,
    pub level_bits: u8,
    pub priority_bits: u8,
    pub max_levels: u16,
    pub max_priorities: u16,
    pub num_triggers: u8,
    pub num_interrupts: u16,
    pub impl_version: u8,
    pub arch_version: u8,
}

/// One `clicinttrig` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClicTrigger {
    pub irq: usize,
    pub enabled: bool,
}

/// A CLIC instance.
///
/// Changing the level split with [`init`](Self::init) changes the meaning of
/// every line's control byte; reprogram the lines afterwards.
pub struct Clic<B: HwAccess> {
    hw: B,
    profile: ClicProfile,
    codec: LevelPriorityCodec,
}

impl<B: HwAccess> Clic<B> {
    pub fn new(hw: B, profile: ClicProfile) -> Self {
        let codec = LevelPriorityCodec::new(profile.ctl_bits());
        Self { hw, profile, codec }
    }

    pub fn profile(&self) -> &ClicProfile {
        &self.profile
    }

    pub fn codec(&self) -> &LevelPriorityCodec {
        &self.codec
    }

    pub fn hw(&self) -> &B {
        &self.hw
    }

    pub fn regs(&self) -> RegisterView<'_, B> {
        RegisterView::new(&self.hw, self.profile.base())
    }

    /// Selects the privilege levels and the level / priority split.
    pub fn init(&self, init: &ClicInit) -> AxResult {
        if !init.privilege_levels.is_supported_by(self.profile.modes()) {
            return ax_err!(InvalidInput, "privilege levels not built into this CLIC");
        }
        if init.max_levels.level_bits() > self.profile.ctl_bits() {
            return ax_err!(InvalidInput, "level split wider than the implemented control bits");
        }

        let regs = self.regs();
        self.hw.critical_section(|| -> AxResult {
            // nvbits is a capability flag, keep whatever the hardware reports
            let cfg = (regs.cfg()? & CLIC_CFG_NVBITS_MSK)
                | (init.privilege_levels.nmbits() << CLIC_CFG_NMBITS_POS)
                | (init.max_levels.level_bits() << CLIC_CFG_NLBITS_POS);
            regs.set_cfg(cfg)
        })?;

        debug!(
            "CLIC init: {:?}, {} levels, {} priorities",
            init.privilege_levels,
            init.max_levels.count(),
            self.codec.max_priorities(init.max_levels.level_bits())
        );
        Ok(())
    }

    /// Reads back capabilities and the effective level / priority split.
    pub fn config(&self) -> AxResult<ClicConfig> {
        let regs = self.regs();
        let info = regs.info()?;
        let cfg = regs.cfg()?;
        let nlbits = (cfg & CLIC_CFG_NLBITS_MSK) >> CLIC_CFG_NLBITS_POS;
        let nmbits = (cfg & CLIC_CFG_NMBITS_MSK) >> CLIC_CFG_NMBITS_POS;

        Ok(ClicConfig {
            privilege_levels: PrivilegeLevels::from_nmbits(nmbits, self.profile.modes()),
            vectoring: cfg & CLIC_CFG_NVBITS_MSK != 0,
            ctl_bits: ((info & CLIC_INFO_CTLBITS_MSK) >> CLIC_INFO_CTLBITS_POS) as u8,
            level_bits: self.codec.level_bits(nlbits),
            priority_bits: self.codec.priority_bits(nlbits),
            max_levels: self.codec.max_levels(nlbits),
            max_priorities: self.codec.max_priorities(nlbits),
            num_triggers: ((info & CLIC_INFO_NUM_TRIGGER_MSK) >> CLIC_INFO_NUM_TRIGGER_POS) as u8,
            num_interrupts: ((info & CLIC_INFO_NUM_INTERRUPT_MSK) >> CLIC_INFO_NUM_INTERRUPT_POS)
                as u16,
            impl_version: ((info & CLIC_INFO_IMPL_VERSION_MSK) >> CLIC_INFO_IMPL_VERSION_POS) as u8,
            arch_version: ((info & CLIC_INFO_ARCH_VERSION_MSK) >> CLIC_INFO_ARCH_VERSION_POS) as u8,
        })
    }

    /// Reads interrupt trigger `index` (0..32).
    pub fn trigger(&self, index: usize) -> AxResult<ClicTrigger> {
        if index >= CLIC_NUM_TRIGGERS {
            return ax_err!(InvalidInput, "clicinttrig index out of range");
        }
        let raw = self.regs().inttrig(index)?;
        Ok(ClicTrigger {
            irq: (raw & CLIC_INTTRIG_IRQ_MSK) as usize,
            enabled: raw >> CLIC_INTTRIG_ENABLE_POS != 0,
        })
    }

    /// Raw `nlbits`, read fresh: the split may change between calls.
    pub(crate) fn nlbits(&self) -> AxResult<u8> {
        Ok((self.regs().cfg()? & CLIC_CFG_NLBITS_MSK) >> CLIC_CFG_NLBITS_POS)
    }

    pub(crate) fn check_line(&self, irq: usize) -> AxResult {
        if !self.profile.is_valid_line(irq) {
            return ax_err!(InvalidInput, "interrupt number not wired on this device");
        }
        Ok(())
    }

    pub(crate) fn check_mode(&self, mode: PrivilegeMode) -> AxResult {
        if !self.profile.modes().contains(mode) {
            return ax_err!(InvalidInput, "privilege mode not built into this CLIC");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHw;
    use axaddrspace::HostPhysAddr;
    use axerrno::AxError;

    const BASE: usize = 0x0D00_0000;

    fn clic(hw: &MockHw, modes: PrivilegeModes) -> Clic<&MockHw> {
        let profile = ClicProfile::new(HostPhysAddr::from_usize(BASE), 48, 4, 6, modes).unwrap();
        Clic::new(hw, profile)
    }

    #[test]
    fn init_writes_cfg() {
        let hw = MockHw::new();
        hw.poke8(BASE, CLIC_CFG_NVBITS_MSK);
        let clic = clic(&hw, PrivilegeModes::MU);

        clic.init(&ClicInit { privilege_levels: PrivilegeLevels::MU, max_levels: MaxLevels::L4 })
            .unwrap();
        // nmbits = 1, nlbits = 2, nvbits kept
        assert_eq!(hw.peek8(BASE), 0b0010_0101);
        assert_eq!(hw.masked_writes(), 1);
    }

    #[test]
    fn init_rejects_unsupported_selection() {
        let hw = MockHw::new();
        let clic = clic(&hw, PrivilegeModes::MU);

        let ms = ClicInit { privilege_levels: PrivilegeLevels::MS, max_levels: MaxLevels::L4 };
        assert_eq!(clic.init(&ms), Err(AxError::InvalidInput));
        let wide = ClicInit { privilege_levels: PrivilegeLevels::M, max_levels: MaxLevels::L32 };
        assert_eq!(clic.init(&wide), Err(AxError::InvalidInput));
        assert_eq!(hw.peek8(BASE), 0);
    }

    #[test]
    fn default_init_per_control_width() {
        let expect = [1u16, 2, 2, 4, 4, 8, 8, 16, 16];
        for (ctl, levels) in expect.iter().enumerate() {
            let profile = ClicProfile::new(
                HostPhysAddr::from_usize(BASE),
                8,
                ctl as u8,
                6,
                PrivilegeModes::M,
            )
            .unwrap();
            let init = ClicInit::default_for(&profile);
            assert_eq!(init.max_levels.count(), *levels);
            assert_eq!(init.privilege_levels, PrivilegeLevels::M);
        }
    }

    #[test]
    fn config_reads_back_effective_split() {
        let hw = MockHw::new();
        let clic = clic(&hw, PrivilegeModes::MSU);
        // 48 interrupts, impl 2, arch 1, 4 ctl bits, 32 triggers
        let info = 48 | (2 << 13) | (1 << 17) | (4 << 21) | (32 << 25);
        hw.poke32(BASE + CLIC_INFO_OFFSET, info);

        clic.init(&ClicInit { privilege_levels: PrivilegeLevels::MSU, max_levels: MaxLevels::L4 })
            .unwrap();
        let cfg = clic.config().unwrap();
        assert_eq!(cfg.privilege_levels, Some(PrivilegeLevels::MSU));
        assert!(!cfg.vectoring);
        assert_eq!(cfg.num_interrupts, 48);
        assert_eq!(cfg.impl_version, 2);
        assert_eq!(cfg.arch_version, 1);
        assert_eq!(cfg.ctl_bits, 4);
        assert_eq!(cfg.num_triggers, 32);
        assert_eq!((cfg.level_bits, cfg.priority_bits), (2, 2));
        assert_eq!((cfg.max_levels, cfg.max_priorities), (4, 4));

        // a split wider than the implemented bits is clamped on read-back
        hw.poke8(BASE, 8 << CLIC_CFG_NLBITS_POS);
        let cfg = clic.config().unwrap();
        assert_eq!((cfg.level_bits, cfg.priority_bits), (4, 0));
        assert_eq!((cfg.max_levels, cfg.max_priorities), (16, 1));
    }

    #[test]
    fn trigger_words() {
        let hw = MockHw::new();
        let clic = clic(&hw, PrivilegeModes::M);
        hw.poke32(BASE + CLIC_INTTRIG_OFFSET + 4 * 3, (1 << 31) | 17);

        assert_eq!(clic.trigger(3).unwrap(), ClicTrigger { irq: 17, enabled: true });
        assert_eq!(clic.trigger(0).unwrap(), ClicTrigger { irq: 0, enabled: false });
        assert_eq!(clic.trigger(32), Err(AxError::InvalidInput));
    }
}
