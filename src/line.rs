//! Per-line configuration: enable, pending, attributes and level / priority.
//!
//! Level and priority are always interpreted with the split currently
//! programmed in `cliccfg`, read fresh on every call.

use axerrno::{ax_err, AxResult};
use log::{debug, trace};

use crate::consts::*;
use crate::hw::HwAccess;
use crate::profile::PrivilegeMode;
use crate::Clic;

/// Trigger type and polarity, encoded as in `clicintattr.trig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TriggerKind {
    LevelHigh = 0b00,
    EdgeRising = 0b01,
    LevelLow = 0b10,
    EdgeFalling = 0b11,
}

impl TriggerKind {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::LevelHigh,
            0b01 => Self::EdgeRising,
            0b10 => Self::LevelLow,
            _ => Self::EdgeFalling,
        }
    }

    /// Only edge-triggered lines latch software pend / clear.
    pub const fn is_edge(self) -> bool {
        matches!(self, Self::EdgeRising | Self::EdgeFalling)
    }
}

/// Everything [`Clic::configure_line`] programs in one go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    pub enabled: bool,
    /// Hardware vectoring through xtvt instead of the common trap vector.
    pub vectored: bool,
    pub trigger: TriggerKind,
    pub mode: PrivilegeMode,
    pub level: u8,
    pub priority: u8,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            vectored: true,
            trigger: TriggerKind::EdgeRising,
            mode: PrivilegeMode::Machine,
            level: 1,
            priority: 1,
        }
    }
}

impl LineConfig {
    /// The `clicintattr` byte.
    pub const fn attr(&self) -> u8 {
        ((self.vectored as u8) << CLIC_ATTR_SHV_POS)
            | (self.trigger.bits() << CLIC_ATTR_TRIG_POS)
            | (self.mode.bits() << CLIC_ATTR_MODE_POS)
    }
}

/// Decoded `clicintattr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAttr {
    pub vectored: bool,
    pub trigger: TriggerKind,
    /// `None` for the reserved mode encoding.
    pub mode: Option<PrivilegeMode>,
}

impl LineAttr {
    pub const fn from_bits(attr: u8) -> Self {
        Self {
            vectored: attr & CLIC_ATTR_SHV_MSK != 0,
            trigger: TriggerKind::from_bits((attr & CLIC_ATTR_TRIG_MSK) >> CLIC_ATTR_TRIG_POS),
            mode: PrivilegeMode::from_bits((attr & CLIC_ATTR_MODE_MSK) >> CLIC_ATTR_MODE_POS),
        }
    }
}

impl<B: HwAccess> Clic<B> {
    pub(crate) fn check_level(&self, level: u8, nlbits: u8) -> AxResult {
        if level as u16 >= self.codec.max_levels(nlbits) {
            return ax_err!(InvalidInput, "level exceeds the configured level count");
        }
        Ok(())
    }

    fn check_priority(&self, priority: u8, nlbits: u8) -> AxResult {
        // nothing to check when the priority is going to be dropped anyway
        if self.codec.priority_bits(nlbits) > 0
            && priority as u16 >= self.codec.max_priorities(nlbits)
        {
            return ax_err!(InvalidInput, "priority exceeds the configured priority count");
        }
        Ok(())
    }

    /// The 32-bit image of a line quad: IP cleared, IE, ATTR, CTL.
    fn line_word(&self, cfg: &LineConfig) -> AxResult<u32> {
        self.check_mode(cfg.mode)?;
        let nlbits = self.nlbits()?;
        self.check_level(cfg.level, nlbits)?;
        self.check_priority(cfg.priority, nlbits)?;

        let ctl = self.codec.encode(cfg.level, cfg.priority, nlbits);
        Ok(((cfg.enabled as u32) << (CLIC_INT_IE * 8))
            | ((cfg.attr() as u32) << (CLIC_INT_ATTR * 8))
            | ((ctl as u32) << (CLIC_INT_CTL * 8)))
    }

    /// Programs a line with a single 32-bit store, so the hardware never sees
    /// a mix of old and new fields.
    pub fn configure_line(&self, irq: usize, cfg: &LineConfig) -> AxResult {
        self.check_line(irq)?;
        let word = self.line_word(cfg)?;
        self.regs().set_line(irq, word)?;
        debug!("CLIC line {irq}: {cfg:?} -> {word:#010x}");
        Ok(())
    }

    /// Programs every line of the controller with the same configuration.
    pub fn configure_all_lines(&self, cfg: &LineConfig) -> AxResult {
        let word = self.line_word(cfg)?;
        let regs = self.regs();
        for irq in 0..self.profile.num_lines() {
            regs.set_line(irq, word)?;
        }
        debug!("CLIC all {} lines: {cfg:?}", self.profile.num_lines());
        Ok(())
    }

    pub fn enable_line(&self, irq: usize) -> AxResult {
        self.check_line(irq)?;
        self.regs().set_ie(irq, 1)
    }

    pub fn disable_line(&self, irq: usize) -> AxResult {
        self.check_line(irq)?;
        self.regs().set_ie(irq, 0)
    }

    pub fn is_line_enabled(&self, irq: usize) -> AxResult<bool> {
        self.check_line(irq)?;
        Ok(self.regs().ie(irq)? != 0)
    }

    /// Pends a line from software. Level-triggered lines follow their input
    /// and may ignore this.
    pub fn set_pending(&self, irq: usize) -> AxResult {
        self.check_line(irq)?;
        self.regs().set_ip(irq, 1)
    }

    pub fn clear_pending(&self, irq: usize) -> AxResult {
        self.check_line(irq)?;
        self.regs().set_ip(irq, 0)
    }

    pub fn is_pending(&self, irq: usize) -> AxResult<bool> {
        self.check_line(irq)?;
        Ok(self.regs().ip(irq)? != 0)
    }

    pub fn line_attr(&self, irq: usize) -> AxResult<LineAttr> {
        self.check_line(irq)?;
        Ok(LineAttr::from_bits(self.regs().attr(irq)?))
    }

    /// Sets the level of a line, keeping its priority.
    pub fn set_level(&self, irq: usize, level: u8) -> AxResult {
        self.check_line(irq)?;
        let regs = self.regs();
        self.hw.critical_section(|| -> AxResult {
            let nlbits = self.nlbits()?;
            self.check_level(level, nlbits)?;
            let ctl = regs.ctl(irq)?;
            regs.set_ctl(irq, self.codec.with_level(ctl, level, nlbits))
        })
    }

    pub fn level(&self, irq: usize) -> AxResult<u8> {
        self.check_line(irq)?;
        let nlbits = self.nlbits()?;
        Ok(self.codec.level_of(self.regs().ctl(irq)?, nlbits))
    }

    /// Sets the priority of a line, keeping its level.
    ///
    /// When every implemented control bit is a level bit there is no
    /// priority to set and the call does nothing.
    pub fn set_priority(&self, irq: usize, priority: u8) -> AxResult {
        self.check_line(irq)?;
        let regs = self.regs();
        self.hw.critical_section(|| -> AxResult {
            let nlbits = self.nlbits()?;
            if self.codec.priority_bits(nlbits) == 0 {
                trace!("CLIC line {irq}: no priority bits, priority {priority} dropped");
                return Ok(());
            }
            self.check_priority(priority, nlbits)?;
            let ctl = regs.ctl(irq)?;
            regs.set_ctl(irq, self.codec.with_priority(ctl, priority, nlbits))
        })
    }

    /// Priority of a line; 0 when no priority bits are left.
    pub fn priority(&self, irq: usize) -> AxResult<u8> {
        self.check_line(irq)?;
        let nlbits = self.nlbits()?;
        Ok(self.codec.priority_of(self.regs().ctl(irq)?, nlbits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHw;
    use crate::profile::{ClicProfile, MaxLevels, PrivilegeLevels, PrivilegeModes};
    use crate::ClicInit;
    use axaddrspace::HostPhysAddr;
    use axerrno::AxError;
    use proptest::prelude::*;

    const BASE: usize = 0x0D00_0000;

    fn line_addr(irq: usize) -> usize {
        BASE + CLIC_INT_OFFSET + irq * 4
    }

    fn clic_with_levels(hw: &MockHw, max_levels: MaxLevels) -> Clic<&MockHw> {
        let profile =
            ClicProfile::new(HostPhysAddr::from_usize(BASE), 48, 4, 6, PrivilegeModes::MU)
                .unwrap()
                .with_lines(&[0, 1, 5, 16, 17, 47])
                .unwrap();
        let clic = Clic::new(hw, profile);
        clic.init(&ClicInit { privilege_levels: PrivilegeLevels::MU, max_levels })
            .unwrap();
        clic
    }

    #[test]
    fn machine_edge_rising_vectored_attr() {
        let cfg = LineConfig {
            enabled: true,
            vectored: true,
            trigger: TriggerKind::EdgeRising,
            mode: PrivilegeMode::Machine,
            level: 1,
            priority: 0,
        };
        assert_eq!(cfg.attr(), 0b1100_0011);

        let user_level_low = LineConfig {
            vectored: false,
            trigger: TriggerKind::LevelLow,
            mode: PrivilegeMode::User,
            ..cfg
        };
        assert_eq!(user_level_low.attr(), 0b0000_0100);
    }

    #[test]
    fn configure_line_is_one_store() {
        let hw = MockHw::new();
        let clic = clic_with_levels(&hw, MaxLevels::L4);
        hw.poke8(line_addr(5), 1); // stale pending

        let cfg = LineConfig { enabled: true, level: 3, priority: 1, ..Default::default() };
        clic.configure_line(5, &cfg).unwrap();

        assert_eq!(hw.peek32(line_addr(5)), 0xD0C3_0100);
        assert_eq!(clic.level(5).unwrap(), 3);
        assert_eq!(clic.priority(5).unwrap(), 1);
        assert!(clic.is_line_enabled(5).unwrap());
        assert!(!clic.is_pending(5).unwrap());
        assert_eq!(
            clic.line_attr(5).unwrap(),
            LineAttr {
                vectored: true,
                trigger: TriggerKind::EdgeRising,
                mode: Some(PrivilegeMode::Machine),
            }
        );
        assert_eq!(hw.peek32(line_addr(4)), 0);
    }

    #[test]
    fn configure_all_lines_fills_every_quad() {
        let hw = MockHw::new();
        let clic = clic_with_levels(&hw, MaxLevels::L4);
        clic.configure_all_lines(&LineConfig::default()).unwrap();

        // disabled, vectored, rising edge, machine, level 1, priority 1
        for irq in 0..48 {
            assert_eq!(hw.peek32(line_addr(irq)), 0x50C3_0000);
        }
        assert_eq!(hw.peek32(line_addr(48)), 0);
    }

    #[test]
    fn contract_violations_are_errors() {
        let hw = MockHw::new();
        let clic = clic_with_levels(&hw, MaxLevels::L4);

        assert_eq!(clic.enable_line(2), Err(AxError::InvalidInput));
        assert_eq!(clic.set_pending(48), Err(AxError::InvalidInput));

        let too_high = LineConfig { level: 4, ..Default::default() };
        assert_eq!(clic.configure_line(5, &too_high), Err(AxError::InvalidInput));
        let too_fine = LineConfig { priority: 4, ..Default::default() };
        assert_eq!(clic.configure_line(5, &too_fine), Err(AxError::InvalidInput));
        let supervisor = LineConfig { mode: PrivilegeMode::Supervisor, ..Default::default() };
        assert_eq!(clic.configure_line(5, &supervisor), Err(AxError::InvalidInput));
        assert_eq!(clic.set_level(5, 4), Err(AxError::InvalidInput));
        assert_eq!(clic.set_priority(5, 4), Err(AxError::InvalidInput));

        assert_eq!(hw.peek32(line_addr(5)), 0);
    }

    #[test]
    fn set_priority_without_priority_bits_is_a_no_op() {
        let hw = MockHw::new();
        let clic = clic_with_levels(&hw, MaxLevels::L16);
        clic.configure_line(16, &LineConfig { level: 9, ..Default::default() }).unwrap();
        let before = hw.peek8(line_addr(16) + CLIC_INT_CTL);
        let writes = hw.masked_writes();

        clic.set_priority(16, 2).unwrap();
        // a priority that would not even fit is dropped as well
        clic.set_priority(16, 200).unwrap();

        assert_eq!(hw.peek8(line_addr(16) + CLIC_INT_CTL), before);
        assert_eq!(hw.masked_writes(), writes);
        assert_eq!(clic.priority(16).unwrap(), 0);
        assert_eq!(clic.level(16).unwrap(), 9);
    }

    #[test]
    fn enable_and_pending_bytes() {
        let hw = MockHw::new();
        let clic = clic_with_levels(&hw, MaxLevels::L4);

        clic.enable_line(17).unwrap();
        clic.set_pending(17).unwrap();
        assert_eq!(hw.peek32(line_addr(17)), 0x0000_0101);
        clic.disable_line(17).unwrap();
        assert!(!clic.is_line_enabled(17).unwrap());
        assert!(clic.is_pending(17).unwrap());
        clic.clear_pending(17).unwrap();
        assert_eq!(hw.peek32(line_addr(17)), 0);
    }

    #[test]
    fn level_and_priority_updates_run_masked() {
        let hw = MockHw::new();
        let clic = clic_with_levels(&hw, MaxLevels::L4);
        let before = hw.masked_writes();
        let sections = hw.critical_sections();

        clic.set_level(0, 2).unwrap();
        clic.set_priority(0, 3).unwrap();
        assert_eq!(hw.masked_writes(), before + 2);
        assert_eq!(hw.critical_sections(), sections + 2);
        assert_eq!(hw.peek8(line_addr(0) + CLIC_INT_CTL), 0b1011_0000);
    }

    #[test]
    fn split_change_reinterprets_control_bytes() {
        let hw = MockHw::new();
        let clic = clic_with_levels(&hw, MaxLevels::L4);
        clic.configure_line(1, &LineConfig { level: 2, priority: 3, ..Default::default() })
            .unwrap();

        clic.init(&ClicInit { privilege_levels: PrivilegeLevels::M, max_levels: MaxLevels::L2 })
            .unwrap();
        // 0b10_11_0000 read as 1 level bit and 3 priority bits
        assert_eq!(clic.level(1).unwrap(), 1);
        assert_eq!(clic.priority(1).unwrap(), 0b011);
    }

    proptest! {
        #[test]
        fn setters_keep_the_other_field(
            level_bits in 0u8..=4,
            level in any::<u8>(),
            priority in any::<u8>(),
            next_level in any::<u8>(),
            next_priority in any::<u8>(),
        ) {
            let hw = MockHw::new();
            let clic = clic_with_levels(&hw, MaxLevels::from_level_bits(level_bits).unwrap());
            let max_levels = 1u16 << level_bits;
            let max_priorities = 1u16 << (4 - level_bits);
            let level = (level as u16 % max_levels) as u8;
            let next_level = (next_level as u16 % max_levels) as u8;
            let priority = (priority as u16 % max_priorities) as u8;
            let next_priority = (next_priority as u16 % max_priorities) as u8;
            let expected_priority = if level_bits == 4 { 0 } else { priority };

            clic.configure_line(47, &LineConfig { level, priority, ..Default::default() }).unwrap();
            clic.set_level(47, next_level).unwrap();
            prop_assert_eq!(clic.priority(47).unwrap(), expected_priority);
            prop_assert_eq!(clic.level(47).unwrap(), next_level);

            clic.set_priority(47, next_priority).unwrap();
            prop_assert_eq!(clic.level(47).unwrap(), next_level);
            let expected_next = if level_bits == 4 { 0 } else { next_priority };
            prop_assert_eq!(clic.priority(47).unwrap(), expected_next);
        }
    }
}
