//! In-memory register model used by the unit tests.

use core::sync::atomic::{AtomicUsize, Ordering};

use std::collections::BTreeMap;

use axaddrspace::{device::AccessWidth, HostPhysAddr};
use axerrno::AxResult;
use spin::Mutex;

use crate::hw::HwAccess;

/// Sparse little-endian byte memory plus a CSR file. Unwritten cells read 0.
#[derive(Default)]
pub(crate) struct MockHw {
    mem: Mutex<BTreeMap<usize, u8>>,
    csrs: Mutex<BTreeMap<u16, usize>>,
    /// Every MMIO write as `(addr, value)`, in order.
    log: Mutex<Vec<(usize, usize)>>,
    depth: AtomicUsize,
    /// Critical sections entered so far.
    pub(crate) critical_sections: AtomicUsize,
    /// Register writes performed with interrupts masked.
    pub(crate) masked_writes: AtomicUsize,
}

fn width_bytes(width: AccessWidth) -> usize {
    match width {
        AccessWidth::Byte => 1,
        AccessWidth::Word => 2,
        AccessWidth::Dword => 4,
        AccessWidth::Qword => 8,
    }
}

impl MockHw {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn load(&self, addr: usize, len: usize) -> u64 {
        let mem = self.mem.lock();
        (0..len).fold(0u64, |acc, i| {
            acc | (*mem.get(&(addr + i)).unwrap_or(&0) as u64) << (8 * i)
        })
    }

    fn store(&self, addr: usize, len: usize, val: u64) {
        let mut mem = self.mem.lock();
        for i in 0..len {
            mem.insert(addr + i, (val >> (8 * i)) as u8);
        }
    }

    fn note_write(&self) {
        if self.depth.load(Ordering::SeqCst) > 0 {
            self.masked_writes.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub(crate) fn peek8(&self, addr: usize) -> u8 {
        self.load(addr, 1) as u8
    }

    pub(crate) fn peek32(&self, addr: usize) -> u32 {
        self.load(addr, 4) as u32
    }

    pub(crate) fn poke8(&self, addr: usize, val: u8) {
        self.store(addr, 1, val as u64)
    }

    pub(crate) fn poke32(&self, addr: usize, val: u32) {
        self.store(addr, 4, val as u64)
    }

    pub(crate) fn csr(&self, csr: u16) -> usize {
        *self.csrs.lock().get(&csr).unwrap_or(&0)
    }

    pub(crate) fn set_csr(&self, csr: u16, val: usize) {
        self.csrs.lock().insert(csr, val);
    }

    pub(crate) fn masked_writes(&self) -> usize {
        self.masked_writes.load(Ordering::SeqCst)
    }

    pub(crate) fn critical_sections(&self) -> usize {
        self.critical_sections.load(Ordering::SeqCst)
    }

    pub(crate) fn mmio_log(&self) -> Vec<(usize, usize)> {
        self.log.lock().clone()
    }
}

impl HwAccess for MockHw {
    fn mmio_read(&self, addr: HostPhysAddr, width: AccessWidth) -> AxResult<usize> {
        Ok(self.load(addr.as_usize(), width_bytes(width)) as usize)
    }

    fn mmio_write(&self, addr: HostPhysAddr, width: AccessWidth, val: usize) -> AxResult {
        self.note_write();
        self.log.lock().push((addr.as_usize(), val));
        self.store(addr.as_usize(), width_bytes(width), val as u64);
        Ok(())
    }

    fn csr_read(&self, csr: u16) -> AxResult<usize> {
        Ok(self.csr(csr))
    }

    fn csr_write(&self, csr: u16, val: usize) -> AxResult {
        self.note_write();
        self.set_csr(csr, val);
        Ok(())
    }

    fn critical_section<R>(&self, f: impl FnOnce() -> R) -> R {
        self.critical_sections.fetch_add(1, Ordering::SeqCst);
        self.depth.fetch_add(1, Ordering::SeqCst);
        let ret = f();
        self.depth.fetch_sub(1, Ordering::SeqCst);
        ret
    }
}
