//! Top-level Game Boy core: wires the CPU, memory router, timer, and PPU
//! together and drives them one step at a time. There is no audio, no save
//! states, and no CGB mode here — just the DMG pipeline the memory map,
//! timer, PPU, and SM83 modules describe.

use crate::cartridge::{Cartridge, CartridgeError};
use crate::inputs::{self, GameBoyInputs};
use crate::memory::Memory;
use crate::ppu::{self, Ppu};
use crate::sm83::Cpu;
use crate::timer::Timer;
use thiserror::Error;

/// PC entering 0xFEA0-0xFEFF (the OAM-adjacent unusable region) is
/// undefined on real hardware; this core treats it as a diagnostic halt
/// rather than guessing at behavior.
const ILLEGAL_EXECUTION_START: u16 = 0xFEA0;
const ILLEGAL_EXECUTION_END: u16 = 0xFEFF;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("cartridge load failed: {0}")]
    CartridgeLoad(#[from] CartridgeError),
    #[error("PC entered the illegal execution region at {0:#06X}")]
    IllegalExecutionRegion(u16),
}

/// A DMG core instance: one cartridge, one CPU, one memory router, one
/// timer, one PPU. Nothing outlives a `GameBoy` and nothing is shared
/// across instances.
pub struct GameBoy {
    cpu: Cpu,
    memory: Memory,
    ppu: Ppu,
    timer: Timer,
}

impl GameBoy {
    /// # Errors
    ///
    /// Returns an error if `rom` fails the cartridge length check (not a
    /// power-of-two multiple of 16 KiB, or shorter than one bank).
    pub fn create(rom: Box<[u8]>) -> Result<Self, CoreError> {
        let cartridge = Cartridge::load(rom)?;
        Ok(Self { cpu: Cpu::new(), memory: Memory::new(cartridge), ppu: Ppu::new(), timer: Timer::new() })
    }

    /// Applies the host's current button state to JOYP (0xFF00). Call
    /// between frames, before the next `step`/`run_frame`.
    pub fn set_inputs(&mut self, inputs: &GameBoyInputs) {
        inputs::apply(self.memory.raw(), inputs);
    }

    /// Executes one step — an interrupt dispatch, or a fetch+execute of one
    /// instruction — and credits its T-cycle cost to the timer and then the
    /// PPU, in that order. Returns `true` exactly when this step completed
    /// the PPU's frame (the 143 -> 144 scanline boundary).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalExecutionRegion`] if PC is sitting in
    /// 0xFEA0-0xFEFF when the step begins.
    pub fn step(&mut self) -> Result<bool, CoreError> {
        let pc = self.cpu.registers.pc;
        if (ILLEGAL_EXECUTION_START..=ILLEGAL_EXECUTION_END).contains(&pc) {
            log::error!("PC entered illegal execution region at {pc:#06X}");
            return Err(CoreError::IllegalExecutionRegion(pc));
        }

        let cycles = self.cpu.step(&mut self.memory);
        self.timer.step(self.memory.raw(), cycles);
        let frame_ready = self.ppu.step(self.memory.raw(), cycles);
        Ok(frame_ready)
    }

    /// Steps until a frame completes, then returns the rendered buffer:
    /// 160x144 bytes, each a 2-bit DMG palette index, row-major,
    /// top-to-bottom and left-to-right.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`GameBoy::step`].
    pub fn run_frame(&mut self) -> Result<&[u8; ppu::FRAME_BUFFER_LEN], CoreError> {
        while !self.step()? {}
        Ok(self.ppu.frame_buffer())
    }

    /// The most recently rendered frame, without advancing emulation.
    pub fn frame_buffer(&self) -> &[u8; ppu::FRAME_BUFFER_LEN] {
        self.ppu.frame_buffer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom(len: usize) -> Box<[u8]> {
        vec![0u8; len].into_boxed_slice()
    }

    #[test]
    fn create_rejects_undersized_rom() {
        let result = GameBoy::create(rom(0x1000));
        assert!(matches!(result, Err(CoreError::CartridgeLoad(_))));
    }

    #[test]
    fn run_frame_produces_exactly_one_frame_buffer_update() {
        let mut rom = vec![0u8; 0x8000];
        rom[0x0100] = 0x00; // NOP, then falls through into the zeroed rest of the image
        let mut gb = GameBoy::create(rom.into_boxed_slice()).unwrap();
        gb.set_inputs(&GameBoyInputs::default());

        let frame = gb.run_frame().unwrap();
        assert_eq!(frame.len(), ppu::FRAME_BUFFER_LEN);
    }

    #[test]
    fn stepping_into_the_unusable_region_is_reported() {
        let mut gb = GameBoy::create(rom(0x8000)).unwrap();
        gb.cpu.registers.pc = 0xFEB0;
        let result = gb.step();
        assert!(matches!(result, Err(CoreError::IllegalExecutionRegion(0xFEB0))));
    }
}
