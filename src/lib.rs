pub mod api;
mod cartridge;
mod dma;
mod graphics;
pub mod inputs;
mod interrupts;
mod memory;
mod num;
mod ppu;
mod sm83;
mod timer;

pub use api::{CoreError, GameBoy};
pub use cartridge::CartridgeError;
pub use graphics::Palette;
pub use inputs::GameBoyInputs;
pub use ppu::FRAME_BUFFER_LEN;
pub use sm83::{Cpu, MemoryBus, Registers};
