use core::result::Result::Ok;
use axaddrspace::{device::AccessWidth, HostPhysAddr};
use axerrno::{ax_err, AxResult};

#[inline]
pub(crate) fn reg_addr(base: HostPhysAddr, offset: usize) -> HostPhysAddr {
    HostPhysAddr::from_usize(base.as_usize() + offset)
}

/// Volatile read of an identity-mapped device register.
///
/// # Safety
///
/// `addr` must point to a readable register (or memory) of at least `width`
/// bytes, naturally aligned.
#[cfg_attr(not(any(target_arch = "riscv32", target_arch = "riscv64")), allow(dead_code))]
pub(crate) unsafe fn perform_mmio_read(addr: HostPhysAddr, width: AccessWidth) -> AxResult<usize> {
    let addr = addr.as_usize() as *const u8;

    match width {
        AccessWidth::Byte => Ok(addr.read_volatile() as _),
        AccessWidth::Word => Ok((addr as *const u16).read_volatile() as _),
        AccessWidth::Dword => Ok((addr as *const u32).read_volatile() as _),
        AccessWidth::Qword if cfg!(target_pointer_width = "64") => {
            Ok((addr as *const u64).read_volatile() as _)
        }
        AccessWidth::Qword => ax_err!(Unsupported, "64-bit MMIO read on a 32-bit hart"),
    }
}

/// Volatile write of an identity-mapped device register.
///
/// # Safety
///
/// `addr` must point to a writable register (or memory) of at least `width`
/// bytes, naturally aligned.
#[cfg_attr(not(any(target_arch = "riscv32", target_arch = "riscv64")), allow(dead_code))]
pub(crate) unsafe fn perform_mmio_write(
    addr: HostPhysAddr,
    width: AccessWidth,
    val: usize,
) -> AxResult<()> {
    let addr = addr.as_usize() as *mut u8;

    match width {
        AccessWidth::Byte => addr.write_volatile(val as _),
        AccessWidth::Word => (addr as *mut u16).write_volatile(val as _),
        AccessWidth::Dword => (addr as *mut u32).write_volatile(val as _),
        AccessWidth::Qword if cfg!(target_pointer_width = "64") => {
            (addr as *mut u64).write_volatile(val as _)
        }
        AccessWidth::Qword => return ax_err!(Unsupported, "64-bit MMIO write on a 32-bit hart"),
    }

    Ok(())
}
