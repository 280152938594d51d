//! Flag-only instructions: DAA, CPL, SCF, CCF, the four rotate-A forms,
//! and the EI/DI interrupt-enable toggles.

use crate::sm83::Cpu;

impl Cpu {
    // DAA: decimal-adjust A after a BCD add/sub, using the current N/H/C
    // flags to pick a correction.
    pub(super) fn daa(&mut self) {
        let n = self.registers.subtract();
        let h = self.registers.half_carry();
        let c_in = self.registers.carry();
        let a = self.registers.a;

        let mut correction = 0u8;
        let mut c_out = c_in;

        if !n {
            if h || (a & 0x0F) > 9 {
                correction |= 0x06;
            }
            if c_in || a > 0x99 {
                correction |= 0x60;
                c_out = true;
            }
        } else {
            if h {
                correction |= 0x06;
            }
            if c_in {
                correction |= 0x60;
            }
        }

        let result = if n { a.wrapping_sub(correction) } else { a.wrapping_add(correction) };

        self.registers.a = result;
        self.registers.set_half_carry(false);
        self.registers.set_carry(c_out);
        self.registers.set_zero(result == 0);
    }

    // CPL: complement A.
    pub(super) fn cpl(&mut self) {
        self.registers.a = !self.registers.a;
        self.registers.set_subtract(true);
        self.registers.set_half_carry(true);
    }

    // SCF: set carry flag.
    pub(super) fn scf(&mut self) {
        self.registers.set_subtract(false);
        self.registers.set_half_carry(false);
        self.registers.set_carry(true);
    }

    // CCF: complement carry flag.
    pub(super) fn ccf(&mut self) {
        self.registers.set_subtract(false);
        self.registers.set_half_carry(false);
        self.registers.set_carry(!self.registers.carry());
    }

    // RLCA/RRCA/RLA/RRA: rotate A, forcing Z to 0 (unlike the CB-prefixed
    // rotates, which set Z from the result).
    pub(super) fn rlca(&mut self) {
        let carry = self.registers.a & 0x80 != 0;
        self.registers.a = self.registers.a.rotate_left(1);
        self.set_rotate_a_flags(carry);
    }

    pub(super) fn rrca(&mut self) {
        let carry = self.registers.a & 0x01 != 0;
        self.registers.a = self.registers.a.rotate_right(1);
        self.set_rotate_a_flags(carry);
    }

    pub(super) fn rla(&mut self) {
        let carry_in = u8::from(self.registers.carry());
        let carry_out = self.registers.a & 0x80 != 0;
        self.registers.a = (self.registers.a << 1) | carry_in;
        self.set_rotate_a_flags(carry_out);
    }

    pub(super) fn rra(&mut self) {
        let carry_in = u8::from(self.registers.carry());
        let carry_out = self.registers.a & 0x01 != 0;
        self.registers.a = (self.registers.a >> 1) | (carry_in << 7);
        self.set_rotate_a_flags(carry_out);
    }

    fn set_rotate_a_flags(&mut self, carry_out: bool) {
        self.registers.set_zero(false);
        self.registers.set_subtract(false);
        self.registers.set_half_carry(false);
        self.registers.set_carry(carry_out);
    }

    // DI: disable interrupts immediately; also cancels a not-yet-applied EI.
    pub(super) fn di(&mut self) {
        self.ime = false;
        self.ime_pending = false;
    }

    // EI: arms the one-instruction-delayed interrupt enable.
    pub(super) fn ei(&mut self) {
        self.ime_pending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpl_twice_restores_a_and_sets_n_h() {
        let mut cpu = Cpu::new();
        cpu.registers.a = 0x3C;
        cpu.cpl();
        cpu.cpl();
        assert_eq!(cpu.registers.a, 0x3C);
        assert!(cpu.registers.subtract());
        assert!(cpu.registers.half_carry());
    }

    #[test]
    fn rl_c_via_cb_table_not_here_rla_forces_zero_clear() {
        let mut cpu = Cpu::new();
        cpu.registers.a = 0x80;
        cpu.registers.set_carry(false);
        cpu.rla();
        assert_eq!(cpu.registers.a, 0x00);
        assert!(!cpu.registers.zero());
        assert!(cpu.registers.carry());
    }

    #[test]
    fn scf_sets_carry_preserves_zero() {
        let mut cpu = Cpu::new();
        cpu.registers.set_zero(true);
        cpu.scf();
        assert!(cpu.registers.carry());
        assert!(cpu.registers.zero());
    }

    #[test]
    fn ei_then_di_cancels_pending_enable() {
        let mut cpu = Cpu::new();
        cpu.ei();
        assert!(cpu.ime_pending);
        cpu.di();
        assert!(!cpu.ime_pending);
        assert!(!cpu.ime);
    }
}
