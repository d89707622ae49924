// Register map of the CLIC block, the per-mode CLIC CSRs, and the PLIC/CLINT
// windows used on MDR1206 / MDR32F02 class parts.

/// Largest number of interrupt lines a profile can describe.
pub const MAX_LINES: usize = 1024;

// --- CLIC block offsets (relative to CLIC_BASE) ---

/// Global configuration byte (`cliccfg`).
pub const CLIC_CFG_OFFSET: usize = 0x0000;

/// Read-only information word (`clicinfo`).
pub const CLIC_INFO_OFFSET: usize = 0x0004;

/// First of the 32 interrupt trigger words (`clicinttrig[i]`).
pub const CLIC_INTTRIG_OFFSET: usize = 0x0040;

/// Number of interrupt trigger words.
pub const CLIC_NUM_TRIGGERS: usize = 32;

/// First per-line register quad. Line N lives at: CLIC_INT_OFFSET + N * 4
pub const CLIC_INT_OFFSET: usize = 0x1000;

/// Byte offsets inside one line quad.
pub const CLIC_INT_IP: usize = 0;
pub const CLIC_INT_IE: usize = 1;
pub const CLIC_INT_ATTR: usize = 2;
pub const CLIC_INT_CTL: usize = 3;

// --- cliccfg fields ---

pub const CLIC_CFG_NVBITS_POS: u8 = 0;
pub const CLIC_CFG_NVBITS_MSK: u8 = 0x1 << CLIC_CFG_NVBITS_POS;
pub const CLIC_CFG_NLBITS_POS: u8 = 1;
pub const CLIC_CFG_NLBITS_MSK: u8 = 0xF << CLIC_CFG_NLBITS_POS;
pub const CLIC_CFG_NMBITS_POS: u8 = 5;
pub const CLIC_CFG_NMBITS_MSK: u8 = 0x3 << CLIC_CFG_NMBITS_POS;

// --- clicinfo fields ---

pub const CLIC_INFO_NUM_INTERRUPT_POS: u32 = 0;
pub const CLIC_INFO_NUM_INTERRUPT_MSK: u32 = 0x1FFF << CLIC_INFO_NUM_INTERRUPT_POS;
pub const CLIC_INFO_IMPL_VERSION_POS: u32 = 13;
pub const CLIC_INFO_IMPL_VERSION_MSK: u32 = 0xF << CLIC_INFO_IMPL_VERSION_POS;
pub const CLIC_INFO_ARCH_VERSION_POS: u32 = 17;
pub const CLIC_INFO_ARCH_VERSION_MSK: u32 = 0xF << CLIC_INFO_ARCH_VERSION_POS;
pub const CLIC_INFO_CTLBITS_POS: u32 = 21;
pub const CLIC_INFO_CTLBITS_MSK: u32 = 0xF << CLIC_INFO_CTLBITS_POS;
pub const CLIC_INFO_NUM_TRIGGER_POS: u32 = 25;
pub const CLIC_INFO_NUM_TRIGGER_MSK: u32 = 0x3F << CLIC_INFO_NUM_TRIGGER_POS;

// --- clicinttrig fields ---

pub const CLIC_INTTRIG_IRQ_MSK: u32 = 0x1FFF;
pub const CLIC_INTTRIG_ENABLE_POS: u32 = 31;

// --- clicintattr fields ---

pub const CLIC_ATTR_SHV_POS: u8 = 0;
pub const CLIC_ATTR_SHV_MSK: u8 = 0x1 << CLIC_ATTR_SHV_POS;
pub const CLIC_ATTR_TRIG_POS: u8 = 1;
pub const CLIC_ATTR_TRIG_MSK: u8 = 0x3 << CLIC_ATTR_TRIG_POS;
pub const CLIC_ATTR_MODE_POS: u8 = 6;
pub const CLIC_ATTR_MODE_MSK: u8 = 0x3 << CLIC_ATTR_MODE_POS;

// --- CLIC CSRs ---

pub const CSR_MTVEC: u16 = 0x305;
pub const CSR_MTVT: u16 = 0x307;
pub const CSR_MINTSTATUS: u16 = 0x346;
pub const CSR_MINTTHRESH: u16 = 0x347;

pub const CSR_STVEC: u16 = 0x105;
pub const CSR_STVT: u16 = 0x107;
pub const CSR_SINTSTATUS: u16 = 0x146;
pub const CSR_SINTTHRESH: u16 = 0x147;

pub const CSR_UTVEC: u16 = 0x005;
pub const CSR_UTVT: u16 = 0x007;
pub const CSR_UINTSTATUS: u16 = 0x046;
pub const CSR_UINTTHRESH: u16 = 0x047;

/// Interrupt-enable CSRs, used by the PLIC for the core interrupt bits.
pub const CSR_MIE: u16 = 0x304;
pub const CSR_SIE: u16 = 0x104;
pub const CSR_UIE: u16 = 0x004;

/// Active interrupt level fields inside xINTSTATUS.
pub const CSR_XINTSTATUS_MIL_POS: u32 = 24;
pub const CSR_XINTSTATUS_SIL_POS: u32 = 8;
pub const CSR_XINTSTATUS_UIL_POS: u32 = 0;

/// xTVEC mode field. The base lives above the vector alignment.
pub const CSR_XTVEC_MODE_MSK: usize = 0x3;

// --- PLIC (riscv-plic-1.0.0 memory map, context 0 only) ---

/// Priority for source N is at: PLIC_PRIORITY_OFFSET + N * 4
pub const PLIC_PRIORITY_OFFSET: usize = 0x000000;

/// Word index W covers sources [W*32, W*32+31].
pub const PLIC_PENDING_OFFSET: usize = 0x001000;

/// Enable bits for context 0.
pub const PLIC_ENABLE_OFFSET: usize = 0x002000;

/// Threshold & claim/complete for context 0.
pub const PLIC_CONTEXT_CTRL_OFFSET: usize = 0x200000;
pub const PLIC_CONTEXT_THRESHOLD_OFFSET: usize = 0x00;
pub const PLIC_CONTEXT_CLAIM_COMPLETE_OFFSET: usize = 0x04;

/// Highest priority / threshold value implemented on MDR32F02.
pub const PLIC_MAX_PRIORITY: u32 = 7;

// --- CLINT ---

pub const CLINT_MSIP_OFFSET: usize = 0x0000;
pub const CLINT_MTIMECMP_OFFSET: usize = 0x4000;
pub const CLINT_MTIME_OFFSET: usize = 0xBFF8;

// --- MDR parts ---

pub const MDR_CLINT_BASE: usize = 0x0200_0000;

pub const MDR1206_CLIC_BASE: usize = 0x0D00_0000;
pub const MDR1206_CLIC_NUM_INTERRUPTS: usize = 48;
pub const MDR1206_CLIC_CTL_BITS: u8 = 4;
pub const MDR1206_CLIC_TVEC_ALIGN: u8 = 6;

pub const MDR32F02_PLIC_BASE: usize = 0x0C00_0000;
pub const MDR32F02_PLIC_NUM_INTERRUPTS: usize = 32;
