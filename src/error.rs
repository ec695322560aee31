//! Error handling.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal emulation errors.
///
/// The emulator cannot recover from program state that depends on undefined
/// behavior, so every variant aborts the current run. The driver prints the
/// error and exits non-zero.
#[derive(Error, Debug)]
#[must_use]
pub enum Error {
    #[error("invalid nes cartridge: {0}")]
    CartridgeLoad(String),
    #[error("unsupported mapper number: {0}")]
    UnsupportedMapper(u16),
    #[error("illegal opcode ${opcode:02X} at PC ${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
    #[error("address ${addr:04X} is outside every mapped range")]
    InvalidBusAddress { addr: u16 },
    #[error("write of ${val:02X} to read-only memory at ${addr:04X}")]
    MapperWriteViolation { addr: u16, val: u8 },
    #[error("{context}: {source:?}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(source: std::io::Error, context: impl Into<String>) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
