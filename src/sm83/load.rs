//! LD family: register/memory moves that aren't part of the ALU or
//! control-flow quadrants.

use crate::num::U16Ext;
use crate::sm83::bus::MemoryBus;
use crate::sm83::Cpu;

impl Cpu {
    // LD rp,nn
    pub(super) fn ld_rp_nn(&mut self, bus: &mut impl MemoryBus, p: u8) -> u32 {
        let value = self.fetch_u16(bus);
        self.registers.set_rp(p, value);
        12
    }

    // LD (nn),SP
    pub(super) fn ld_nn_sp(&mut self, bus: &mut impl MemoryBus) -> u32 {
        let addr = self.fetch_u16(bus);
        bus.write(addr, self.registers.sp.lsb());
        bus.write(addr.wrapping_add(1), self.registers.sp.msb());
        20
    }

    // LD (BC/DE/HL+/HL-),A and LD A,(BC/DE/HL+/HL-), selected by p/q.
    pub(super) fn ld_indirect_a(&mut self, bus: &mut impl MemoryBus, p: u8, q: u8) -> u32 {
        let addr = match p {
            0 => self.registers.bc(),
            1 => self.registers.de(),
            2 | 3 => self.registers.hl(),
            _ => unreachable!("p is 2 bits"),
        };

        if q == 0 {
            bus.write(addr, self.registers.a);
        } else {
            self.registers.a = bus.read(addr);
        }

        match p {
            2 => self.registers.set_hl(addr.wrapping_add(1)),
            3 => self.registers.set_hl(addr.wrapping_sub(1)),
            _ => {}
        }

        8
    }

    // LD r,n
    pub(super) fn ld_r_imm(&mut self, bus: &mut impl MemoryBus, y: u8) -> u32 {
        let value = self.fetch_byte(bus);
        self.write_r(bus, y, value);
        if y == super::REG_HL_INDIRECT { 12 } else { 8 }
    }

    // LDH (n),A
    pub(super) fn ldh_n_a(&mut self, bus: &mut impl MemoryBus) -> u32 {
        let offset = self.fetch_byte(bus);
        bus.write(0xFF00 | u16::from(offset), self.registers.a);
        12
    }

    // LDH A,(n)
    pub(super) fn ldh_a_n(&mut self, bus: &mut impl MemoryBus) -> u32 {
        let offset = self.fetch_byte(bus);
        self.registers.a = bus.read(0xFF00 | u16::from(offset));
        12
    }

    // LD (C),A
    pub(super) fn ld_c_a(&mut self, bus: &mut impl MemoryBus) -> u32 {
        bus.write(0xFF00 | u16::from(self.registers.c), self.registers.a);
        8
    }

    // LD A,(C)
    pub(super) fn ld_a_c(&mut self, bus: &mut impl MemoryBus) -> u32 {
        self.registers.a = bus.read(0xFF00 | u16::from(self.registers.c));
        8
    }

    // LD (nn),A
    pub(super) fn ld_nn_a(&mut self, bus: &mut impl MemoryBus) -> u32 {
        let addr = self.fetch_u16(bus);
        bus.write(addr, self.registers.a);
        16
    }

    // LD A,(nn)
    pub(super) fn ld_a_nn(&mut self, bus: &mut impl MemoryBus) -> u32 {
        let addr = self.fetch_u16(bus);
        self.registers.a = bus.read(addr);
        16
    }

    // LD HL,SP+e8
    pub(super) fn ld_hl_sp_e8(&mut self, bus: &mut impl MemoryBus) -> u32 {
        let result = self.sp_plus_e8(bus);
        self.registers.set_hl(result);
        12
    }

    // LD SP,HL
    pub(super) fn ld_sp_hl(&mut self) -> u32 {
        self.registers.sp = self.registers.hl();
        8
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
    fn ld_hl_plus_a_increments_hl() {
        let mut cpu = Cpu::new();
        let mut mem = test_memory();
        cpu.registers.set_hl(0xC000);
        cpu.registers.a = 0x42;
        cpu.ld_indirect_a(&mut mem, 2, 0);
        assert_eq!(mem.read(0xC000), 0x42);
        assert_eq!(cpu.registers.hl(), 0xC001);
    }

    #[test]
    fn ldh_round_trips_through_high_page() {
        let mut cpu = Cpu::new();
        let mut mem = test_memory();
        mem.write(0x0100, 0x80); // operand byte for ldh
        cpu.registers.pc = 0x0100;
        cpu.registers.a = 0x7F;
        cpu.ldh_n_a(&mut mem);
        assert_eq!(mem.read(0xFF80), 0x7F);
    }
}
