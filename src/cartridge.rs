//! Cartridge image handling.
//!
//! Unlike a full multi-mapper implementation this only supports the single
//! bank-select scheme the memory map calls for: a write anywhere in
//! 0x0000-0x7FFF selects a 16 KiB ROM bank and that bank is copied into the
//! live 0x4000-0x7FFF window. There is no RAM-enable gating and no banking
//! mode register; cartridges at or below 32 KiB have no live ROM banking at
//! all, which matches most CPU/PPU conformance test ROMs.

use thiserror::Error;

const BANK_LEN: usize = 16 * 1024;
const ROM_WINDOW_LEN: usize = 32 * 1024;

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("cartridge image is {0} bytes, smaller than one 16 KiB bank")]
    RomTooSmall(usize),
    #[error("cartridge image length {0} is not 2^k * 16 KiB for k >= 1")]
    RomLengthNotPowerOfTwo(usize),
}

#[derive(Debug, Clone)]
pub struct Cartridge {
    rom: Box<[u8]>,
}

impl Cartridge {
    pub fn load(rom: Box<[u8]>) -> Result<Self, CartridgeError> {
        if rom.len() < BANK_LEN {
            return Err(CartridgeError::RomTooSmall(rom.len()));
        }
        let banks = rom.len() / BANK_LEN;
        if rom.len() % BANK_LEN != 0 || banks < 2 || !banks.is_power_of_two() {
            return Err(CartridgeError::RomLengthNotPowerOfTwo(rom.len()));
        }

        log::info!(
            "Loaded cartridge: {} bytes ({} bank{})",
            rom.len(),
            banks,
            if banks == 1 { "" } else { "s" }
        );

        Ok(Self { rom })
    }

    pub fn len(&self) -> usize {
        self.rom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rom.is_empty()
    }

    /// Whether writes to 0x0000-0x7FFF should have any effect, per the
    /// memory map's "if cart size > 0x8000" rule.
    pub fn has_bank_switching(&self) -> bool {
        self.rom.len() > ROM_WINDOW_LEN
    }

    /// The bytes copied into 0x0000-0x7FFF at power-on.
    pub fn boot_window(&self) -> &[u8] {
        let len = self.rom.len().min(ROM_WINDOW_LEN);
        &self.rom[..len]
    }

    /// The 16 KiB bank selected by a ROM-bank-select write, per `max(value & 0x1F, 1)`.
    pub fn bank(&self, requested: u8) -> &[u8] {
        let bank = (requested & 0x1F).max(1) as usize;
        let bank_count = self.rom.len() / BANK_LEN;
        let bank = bank % bank_count.max(1);
        let start = bank * BANK_LEN;
        &self.rom[start..start + BANK_LEN]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_sub_bank_roms() {
        let rom = vec![0u8; 100].into_boxed_slice();
        assert!(matches!(Cartridge::load(rom), Err(CartridgeError::RomTooSmall(100))));
    }

    #[test]
    fn rejects_non_power_of_two_bank_counts() {
        let rom = vec![0u8; BANK_LEN * 3].into_boxed_slice();
        assert!(matches!(Cartridge::load(rom), Err(CartridgeError::RomLengthNotPowerOfTwo(_))));
    }

    #[test]
    fn rejects_exactly_one_bank() {
        // spec.md requires length 2^k * 16 KiB with k >= 1; a single bank is k=0.
        let rom = vec![0u8; BANK_LEN].into_boxed_slice();
        assert!(matches!(Cartridge::load(rom), Err(CartridgeError::RomLengthNotPowerOfTwo(BANK_LEN))));
    }

    #[test]
    fn small_cart_has_no_bank_switching() {
        let rom = vec![0u8; ROM_WINDOW_LEN].into_boxed_slice();
        let cart = Cartridge::load(rom).unwrap();
        assert!(!cart.has_bank_switching());
    }

    #[test]
    fn bank_zero_selects_bank_one() {
        let mut bytes = vec![0u8; BANK_LEN * 4];
        bytes[BANK_LEN..BANK_LEN + 1].copy_from_slice(&[0xAB]);
        let cart = Cartridge::load(bytes.into_boxed_slice()).unwrap();
        assert_eq!(cart.bank(0)[0], 0xAB);
    }
}
