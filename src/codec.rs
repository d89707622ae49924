//! Level / priority packing of `clicintctl`.
//!
//! A CLIC implements `ctl_bits` bits of each 8-bit control register, always
//! the most significant ones. `cliccfg.nlbits` hands the top `level_bits` of
//! them to the interrupt level; the remaining implemented bits below it hold
//! the priority:
//!
//! ```text
//!   7                                       0
//!  +-----------------+----------------+------+
//!  |  level (LB)     | priority (PB)  | zero |
//!  +-----------------+----------------+------+
//!                    ^ 8 - LB         ^ 8 - CTL
//! ```
//!
//! With `ctl_bits = 4, level_bits = 2`, level 3 / priority 1 packs as `0xD0`.
//!
//! Values wider than their field are truncated; range checks live with the
//! callers that know the configured split.

/// Packs and unpacks control bytes for a controller with `ctl_bits`
/// implemented control bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelPriorityCodec {
    ctl_bits: u8,
}

/// `width` ones starting at bit `shift`, within a byte.
#[inline]
const fn field_mask(width: u8, shift: u8) -> u8 {
    (((1u32 << width) - 1) << shift) as u8
}

impl LevelPriorityCodec {
    /// `ctl_bits` is clamped to 8.
    pub const fn new(ctl_bits: u8) -> Self {
        Self {
            ctl_bits: if ctl_bits > 8 { 8 } else { ctl_bits },
        }
    }

    pub const fn ctl_bits(&self) -> u8 {
        self.ctl_bits
    }

    /// Level bits in force for a raw `nlbits` value. Settings beyond the
    /// implemented bits behave as if every implemented bit were a level bit.
    pub const fn level_bits(&self, nlbits: u8) -> u8 {
        if nlbits < self.ctl_bits {
            nlbits
        } else {
            self.ctl_bits
        }
    }

    pub const fn priority_bits(&self, nlbits: u8) -> u8 {
        self.ctl_bits - self.level_bits(nlbits)
    }

    pub const fn max_levels(&self, nlbits: u8) -> u16 {
        1 << self.level_bits(nlbits)
    }

    pub const fn max_priorities(&self, nlbits: u8) -> u16 {
        1 << self.priority_bits(nlbits)
    }

    /// Bits of the control byte backed by hardware.
    pub const fn implemented_mask(&self) -> u8 {
        field_mask(self.ctl_bits, 8 - self.ctl_bits)
    }

    pub const fn level_mask(&self, nlbits: u8) -> u8 {
        let lb = self.level_bits(nlbits);
        field_mask(lb, 8 - lb)
    }

    pub const fn priority_mask(&self, nlbits: u8) -> u8 {
        field_mask(self.priority_bits(nlbits), self.priority_shift())
    }

    #[inline]
    const fn priority_shift(&self) -> u8 {
        8 - self.ctl_bits
    }

    #[inline]
    const fn level_field(&self, level: u8, nlbits: u8) -> u8 {
        let lb = self.level_bits(nlbits);
        (((level as u32) << (8 - lb)) as u8) & self.level_mask(nlbits)
    }

    #[inline]
    const fn priority_field(&self, priority: u8, nlbits: u8) -> u8 {
        (((priority as u32) << self.priority_shift()) as u8) & self.priority_mask(nlbits)
    }

    /// Packs `level` and `priority`. The priority is dropped when no
    /// priority bits are left.
    pub const fn encode(&self, level: u8, priority: u8, nlbits: u8) -> u8 {
        self.level_field(level, nlbits) | self.priority_field(priority, nlbits)
    }

    /// Unpacks a control byte into `(level, priority)`.
    pub const fn decode(&self, raw: u8, nlbits: u8) -> (u8, u8) {
        (self.level_of(raw, nlbits), self.priority_of(raw, nlbits))
    }

    pub const fn level_of(&self, raw: u8, nlbits: u8) -> u8 {
        let lb = self.level_bits(nlbits);
        ((raw & self.level_mask(nlbits)) as u32 >> (8 - lb)) as u8
    }

    pub const fn priority_of(&self, raw: u8, nlbits: u8) -> u8 {
        ((raw & self.priority_mask(nlbits)) as u32 >> self.priority_shift()) as u8
    }

    /// Replaces the level field of `raw`, leaving every other bit alone.
    pub const fn with_level(&self, raw: u8, level: u8, nlbits: u8) -> u8 {
        (raw & !self.level_mask(nlbits)) | self.level_field(level, nlbits)
    }

    /// Replaces the priority field of `raw`, leaving every other bit alone.
    /// A no-op when no priority bits are left.
    pub const fn with_priority(&self, raw: u8, priority: u8, nlbits: u8) -> u8 {
        (raw & !self.priority_mask(nlbits)) | self.priority_field(priority, nlbits)
    }

    /// Scales a level to the 8-bit form used by xintstatus / xintthresh.
    pub const fn level_to_threshold(&self, level: u8, nlbits: u8) -> u8 {
        self.level_field(level, nlbits)
    }

    /// Inverse of [`level_to_threshold`](Self::level_to_threshold).
    pub const fn threshold_to_level(&self, raw: u8, nlbits: u8) -> u8 {
        self.level_of(raw, nlbits)
    }
}
