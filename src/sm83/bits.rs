//! The CB-prefixed opcode table: rotates/shifts, BIT, RES, SET.

use crate::sm83::bus::MemoryBus;
use crate::sm83::Cpu;

impl Cpu {
    /// Fetches and executes one CB-prefixed opcode. The returned cost
    /// already includes the CB prefix byte itself.
    pub(super) fn execute_cb(&mut self, bus: &mut impl MemoryBus) -> u32 {
        let opcode = self.fetch_byte(bus);
        let cb_x = opcode >> 6;
        let cb_y = (opcode >> 3) & 7;
        let cb_z = opcode & 7;

        match cb_x {
            0 => self.cb_rotate_shift(bus, cb_y, cb_z),
            1 => self.cb_bit(bus, cb_y, cb_z),
            2 => self.cb_res(bus, cb_y, cb_z),
            3 => self.cb_set(bus, cb_y, cb_z),
            _ => unreachable!("cb_x is 2 bits"),
        }
    }

    fn cb_rotate_shift(&mut self, bus: &mut impl MemoryBus, cb_y: u8, cb_z: u8) -> u32 {
        let value = self.read_r(bus, cb_z);
        let (result, carry) = match cb_y {
            0 => (value.rotate_left(1), value & 0x80 != 0), // RLC
            1 => (value.rotate_right(1), value & 0x01 != 0), // RRC
            2 => {
                // RL
                let carry_in = u8::from(self.registers.carry());
                ((value << 1) | carry_in, value & 0x80 != 0)
            }
            3 => {
                // RR
                let carry_in = u8::from(self.registers.carry());
                ((value >> 1) | (carry_in << 7), value & 0x01 != 0)
            }
            4 => (value << 1, value & 0x80 != 0), // SLA
            5 => ((value >> 1) | (value & 0x80), value & 0x01 != 0), // SRA
            6 => (value.rotate_left(4), false), // SWAP
            7 => (value >> 1, value & 0x01 != 0), // SRL
            _ => unreachable!("cb_y is 3 bits"),
        };

        self.write_r(bus, cb_z, result);
        self.registers.set_zero(result == 0);
        self.registers.set_subtract(false);
        self.registers.set_half_carry(false);
        self.registers.set_carry(carry);

        if cb_z == super::REG_HL_INDIRECT { 16 } else { 8 }
    }

    fn cb_bit(&mut self, bus: &mut impl MemoryBus, cb_y: u8, cb_z: u8) -> u32 {
        let value = self.read_r(bus, cb_z);
        self.registers.set_zero(value & (1 << cb_y) == 0);
        self.registers.set_subtract(false);
        self.registers.set_half_carry(true);

        if cb_z == super::REG_HL_INDIRECT { 12 } else { 8 }
    }

    fn cb_res(&mut self, bus: &mut impl MemoryBus, cb_y: u8, cb_z: u8) -> u32 {
        let value = self.read_r(bus, cb_z);
        self.write_r(bus, cb_z, value & !(1 << cb_y));
        if cb_z == super::REG_HL_INDIRECT { 16 } else { 8 }
    }

    fn cb_set(&mut self, bus: &mut impl MemoryBus, cb_y: u8, cb_z: u8) -> u32 {
        let value = self.read_r(bus, cb_z);
        self.write_r(bus, cb_z, value | (1 << cb_y));
        if cb_z == super::REG_HL_INDIRECT { 16 } else { 8 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Cartridge;
    use crate::memory::Memory;

    fn test_memory() -> Memory {
        Memory::new(Cartridge::load(vec![0u8; 0x8000].into_boxed_slice()).unwrap())
    }

    #[test]
    fn rl_c_with_msb_set_and_no_carry_in_yields_zero_and_carry() {
        let mut cpu = Cpu::new();
        let mut mem = test_memory();
        cpu.registers.c = 0x80;
        cpu.registers.set_carry(false);
        cpu.cb_rotate_shift(&mut mem, 2, super::super::REG_C);
        assert_eq!(cpu.registers.c, 0x00);
        assert_eq!(cpu.registers.f, 0x90);
    }

    #[test]
    fn swap_twice_restores_value() {
        let mut cpu = Cpu::new();
        let mut mem = test_memory();
        cpu.registers.a = 0x12;
        cpu.cb_rotate_shift(&mut mem, 6, super::super::REG_A);
        assert_eq!(cpu.registers.a, 0x21);
        cpu.cb_rotate_shift(&mut mem, 6, super::super::REG_A);
        assert_eq!(cpu.registers.a, 0x12);
    }

    #[test]
    fn bit_clear_sets_zero_flag() {
        let mut cpu = Cpu::new();
        let mut mem = test_memory();
        cpu.registers.b = 0x00;
        cpu.cb_bit(&mut mem, 3, super::super::REG_B);
        assert!(cpu.registers.zero());
        assert!(cpu.registers.half_carry());
    }

    #[test]
    fn res_then_set_round_trips() {
        let mut cpu = Cpu::new();
        let mut mem = test_memory();
        cpu.registers.d = 0xFF;
        cpu.cb_res(&mut mem, 5, super::super::REG_D);
        assert_eq!(cpu.registers.d, 0xDF);
        cpu.cb_set(&mut mem, 5, super::super::REG_D);
        assert_eq!(cpu.registers.d, 0xFF);
    }
}
