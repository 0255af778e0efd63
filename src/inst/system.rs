//! System instructions: hints, exceptions, barriers, system registers, and
//! cache maintenance.

use crate::args::{BarrierScope, DataCacheOp, InsnCacheOp, SystemReg};
use crate::regs::{zero_reg, Reg};
use crate::result::{EmitError, EmitResult};
use crate::Assembler;

fn enc_hint(op: u32) -> u32 {
    0xd503201f | op << 5
}

/// `dc`/`ic` are forms of `sys` with CRn = 7.
fn enc_cache_op(bits: u32, rt: u32) -> u32 {
    0xd508_7000 | bits << 5 | rt
}

impl Assembler {
    /// `nop`.
    pub fn nop(&mut self) -> EmitResult<()> {
        self.emit(enc_hint(0))
    }

    /// `yield`.
    pub fn r#yield(&mut self) -> EmitResult<()> {
        self.emit(enc_hint(1))
    }

    /// `wfe`: wait for event.
    pub fn wfe(&mut self) -> EmitResult<()> {
        self.emit(enc_hint(2))
    }

    /// `wfi`: wait for interrupt.
    pub fn wfi(&mut self) -> EmitResult<()> {
        self.emit(enc_hint(3))
    }

    /// `sev`: send event.
    pub fn sev(&mut self) -> EmitResult<()> {
        self.emit(enc_hint(4))
    }

    /// `sevl`: send event local.
    pub fn sevl(&mut self) -> EmitResult<()> {
        self.emit(enc_hint(5))
    }

    /// `csdb`: consumption of speculative data barrier.
    pub fn csdb(&mut self) -> EmitResult<()> {
        self.emit(enc_hint(20))
    }

    /// `brk #imm16`: breakpoint.
    pub fn brk(&mut self, imm16: u16) -> EmitResult<()> {
        self.emit(0xd420_0000 | u32::from(imm16) << 5)
    }

    /// `svc #imm16`: supervisor call.
    pub fn svc(&mut self, imm16: u16) -> EmitResult<()> {
        self.emit(0xd400_0001 | u32::from(imm16) << 5)
    }

    /// `hlt #imm16`: halt.
    pub fn hlt(&mut self, imm16: u16) -> EmitResult<()> {
        self.emit(0xd440_0000 | u32::from(imm16) << 5)
    }

    /// `dmb <scope>`: data memory barrier.
    pub fn dmb(&mut self, scope: BarrierScope) -> EmitResult<()> {
        self.emit(0xd503_30bf | scope.bits() << 8)
    }

    /// `dsb <scope>`: data synchronization barrier.
    pub fn dsb(&mut self, scope: BarrierScope) -> EmitResult<()> {
        self.emit(0xd503_309f | scope.bits() << 8)
    }

    /// `isb`: instruction synchronization barrier (full system).
    pub fn isb(&mut self) -> EmitResult<()> {
        self.emit(0xd503_3fdf)
    }

    /// `clrex`: clear the local exclusive monitor.
    pub fn clrex(&mut self) -> EmitResult<()> {
        self.emit(0xd503_3f5f)
    }

    /// `sb`: speculation barrier.
    pub fn sb(&mut self) -> EmitResult<()> {
        self.emit(0xd503_30ff)
    }

    /// `sys #op1, <crn>, <crm>, #op2, rt`: generic system instruction. Pass
    /// [`zero_reg`](crate::zero_reg) when the form takes no register.
    pub fn sys(&mut self, op1: u8, crn: u8, crm: u8, op2: u8, rt: Reg) -> EmitResult<()> {
        if op1 > 7 || crn > 15 || crm > 15 || op2 > 7 {
            return Err(EmitError::InvalidOperand("sys"));
        }
        self.emit(
            0xd508_0000
                | u32::from(op1) << 16
                | u32::from(crn) << 12
                | u32::from(crm) << 8
                | u32::from(op2) << 5
                | rt.enc(),
        )
    }

    /// `mrs rt, <sysreg>`: read a system register.
    pub fn mrs(&mut self, rt: Reg, reg: SystemReg) -> EmitResult<()> {
        self.emit(0xd530_0000 | reg.bits() << 5 | rt.enc())
    }

    /// `msr <sysreg>, rt`: write a system register.
    pub fn msr(&mut self, reg: SystemReg, rt: Reg) -> EmitResult<()> {
        self.emit(0xd510_0000 | reg.bits() << 5 | rt.enc())
    }

    /// `dc <op>, rt`: data cache maintenance by VA.
    pub fn dc(&mut self, op: DataCacheOp, rt: Reg) -> EmitResult<()> {
        self.emit(enc_cache_op(op.bits(), rt.enc()))
    }

    /// `ic <op>` / `ic ivau, rt`: instruction cache maintenance. Ops without
    /// a VA operand ignore `rt`; pass [`zero_reg`](crate::zero_reg).
    pub fn ic(&mut self, op: InsnCacheOp, rt: Reg) -> EmitResult<()> {
        let rt = if op.has_operand() {
            rt.enc()
        } else {
            zero_reg().enc()
        };
        self.emit(enc_cache_op(op.bits(), rt))
    }
}
