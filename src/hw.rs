//! Hardware access handle.
//!
//! Every controller in this crate talks to the hart and to its memory-mapped
//! blocks only through an [`HwAccess`] value supplied by the caller. On
//! target this is [`BareMetal`]; tests plug in an in-memory register model.

use axaddrspace::{device::AccessWidth, HostPhysAddr};
use axerrno::AxResult;

/// Raw register primitives and the interrupt-masking critical section.
pub trait HwAccess {
    /// Reads a memory-mapped register.
    fn mmio_read(&self, addr: HostPhysAddr, width: AccessWidth) -> AxResult<usize>;

    /// Writes a memory-mapped register.
    fn mmio_write(&self, addr: HostPhysAddr, width: AccessWidth, val: usize) -> AxResult;

    /// Reads the control and status register numbered `csr`.
    fn csr_read(&self, csr: u16) -> AxResult<usize>;

    /// Writes the control and status register numbered `csr`.
    fn csr_write(&self, csr: u16, val: usize) -> AxResult;

    /// Sets the bits of `mask` in `csr`.
    fn csr_set_bits(&self, csr: u16, mask: usize) -> AxResult {
        let val = self.csr_read(csr)?;
        self.csr_write(csr, val | mask)
    }

    /// Clears the bits of `mask` in `csr`.
    fn csr_clear_bits(&self, csr: u16, mask: usize) -> AxResult {
        let val = self.csr_read(csr)?;
        self.csr_write(csr, val & !mask)
    }

    /// Runs `f` with interrupts masked on the current hart.
    ///
    /// Read-modify-write sequences on controller state go through here so an
    /// interrupt handler cannot observe or clobber a half-updated register.
    fn critical_section<R>(&self, f: impl FnOnce() -> R) -> R;
}

impl<T: HwAccess> HwAccess for &T {
    fn mmio_read(&self, addr: HostPhysAddr, width: AccessWidth) -> AxResult<usize> {
        (**self).mmio_read(addr, width)
    }

    fn mmio_write(&self, addr: HostPhysAddr, width: AccessWidth, val: usize) -> AxResult {
        (**self).mmio_write(addr, width, val)
    }

    fn csr_read(&self, csr: u16) -> AxResult<usize> {
        (**self).csr_read(csr)
    }

    fn csr_write(&self, csr: u16, val: usize) -> AxResult {
        (**self).csr_write(csr, val)
    }

    fn csr_set_bits(&self, csr: u16, mask: usize) -> AxResult {
        (**self).csr_set_bits(csr, mask)
    }

    fn csr_clear_bits(&self, csr: u16, mask: usize) -> AxResult {
        (**self).csr_clear_bits(csr, mask)
    }

    fn critical_section<R>(&self, f: impl FnOnce() -> R) -> R {
        (**self).critical_section(f)
    }
}

#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
pub use bare_metal::BareMetal;

#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
mod bare_metal {
    use core::arch::asm;

    use axaddrspace::{device::AccessWidth, HostPhysAddr};
    use axerrno::{ax_err, AxResult};

    use super::HwAccess;
    use crate::consts::*;
    use crate::utils::{perform_mmio_read, perform_mmio_write};

    /// Direct access from machine mode, with identity-mapped device blocks.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct BareMetal;

    // CSR numbers are encoded in the instruction, so each CSR reachable at
    // runtime needs its own arm. xtvec and xie go through the same table as
    // the CLIC-only CSRs so every caller can pick the CSR by number.
    macro_rules! csr_insn {
        ($insn:literal, $csr:literal, read) => {{
            let val: usize;
            unsafe { asm!(concat!($insn, " {0}, ", $csr), out(reg) val) };
            val
        }};
        ($insn:literal, $csr:literal, $val:expr) => {
            unsafe { asm!(concat!($insn, " ", $csr, ", {0}"), in(reg) $val) }
        };
    }

    macro_rules! with_csr {
        ($csr:expr, $insn:literal, $arg:tt) => {
            match $csr {
                CSR_MTVEC => Ok(csr_insn!($insn, "0x305", $arg)),
                CSR_MTVT => Ok(csr_insn!($insn, "0x307", $arg)),
                CSR_MINTSTATUS => Ok(csr_insn!($insn, "0x346", $arg)),
                CSR_MINTTHRESH => Ok(csr_insn!($insn, "0x347", $arg)),
                CSR_MIE => Ok(csr_insn!($insn, "0x304", $arg)),
                CSR_STVEC => Ok(csr_insn!($insn, "0x105", $arg)),
                CSR_STVT => Ok(csr_insn!($insn, "0x107", $arg)),
                CSR_SINTSTATUS => Ok(csr_insn!($insn, "0x146", $arg)),
                CSR_SINTTHRESH => Ok(csr_insn!($insn, "0x147", $arg)),
                CSR_SIE => Ok(csr_insn!($insn, "0x104", $arg)),
                CSR_UTVEC => Ok(csr_insn!($insn, "0x005", $arg)),
                CSR_UTVT => Ok(csr_insn!($insn, "0x007", $arg)),
                CSR_UINTSTATUS => Ok(csr_insn!($insn, "0x046", $arg)),
                CSR_UINTTHRESH => Ok(csr_insn!($insn, "0x047", $arg)),
                CSR_UIE => Ok(csr_insn!($insn, "0x004", $arg)),
                _ => ax_err!(Unsupported, "CSR not reachable through BareMetal"),
            }
        };
    }

    impl HwAccess for BareMetal {
        fn mmio_read(&self, addr: HostPhysAddr, width: AccessWidth) -> AxResult<usize> {
            unsafe { perform_mmio_read(addr, width) }
        }

        fn mmio_write(&self, addr: HostPhysAddr, width: AccessWidth, val: usize) -> AxResult {
            unsafe { perform_mmio_write(addr, width, val) }
        }

        fn csr_read(&self, csr: u16) -> AxResult<usize> {
            with_csr!(csr, "csrr", read)
        }

        fn csr_write(&self, csr: u16, val: usize) -> AxResult {
            with_csr!(csr, "csrw", val)
        }

        fn csr_set_bits(&self, csr: u16, mask: usize) -> AxResult {
            with_csr!(csr, "csrs", mask)
        }

        fn csr_clear_bits(&self, csr: u16, mask: usize) -> AxResult {
            with_csr!(csr, "csrc", mask)
        }

        fn critical_section<R>(&self, f: impl FnOnce() -> R) -> R {
            riscv::interrupt::free(|_| f())
        }
    }
}
