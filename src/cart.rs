//! iNES cartridge images.
//!
//! <http://wiki.nesdev.com/w/index.php/INES>

use crate::{
    error::{Error, Result},
    mapper::Mirroring,
};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use tracing::info;

pub const PRG_ROM_BANK_SIZE: usize = 0x4000; // 16K
pub const CHR_ROM_BANK_SIZE: usize = 0x2000; // 8K

/// A parsed 16-byte iNES header.
///
/// Layout: `NES\x1A`, PRG-ROM 16K bank count, CHR-ROM 8K bank count, Flags 6,
/// Flags 7, PRG-RAM 8K bank count, Flags 9, Flags 10, then five zero bytes.
#[derive(Default, Debug, Copy, Clone)]
#[must_use]
pub struct INesHeader {
    pub prg_rom_banks: u8,
    pub chr_rom_banks: u8,
    pub flags6: u8,
    pub flags7: u8,
    pub prg_ram_banks: u8,
}

impl INesHeader {
    fn from_bytes(header: &[u8; 16]) -> Result<Self> {
        if header[0..4] != *b"NES\x1A" {
            return Err(Error::CartridgeLoad(
                "iNES header signature not found".to_string(),
            ));
        }
        Ok(Self {
            prg_rom_banks: header[4],
            chr_rom_banks: header[5],
            flags6: header[6],
            flags7: header[7],
            prg_ram_banks: header[8],
        })
    }

    /// The mapper number, assembled from the high nibbles of flags 7 and 6.
    #[must_use]
    pub const fn mapper_num(&self) -> u16 {
        ((self.flags6 >> 4) | (self.flags7 & 0xF0)) as u16
    }

    /// Hardware nametable mirroring soldered onto the board.
    pub const fn mirroring(&self) -> Mirroring {
        if self.flags6 & 0x01 == 0x01 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }

    /// Whether the board carries battery-backed PRG-RAM.
    #[must_use]
    pub const fn battery_backed(&self) -> bool {
        self.flags6 & 0x02 == 0x02
    }
}

/// A loaded cartridge: the parsed header plus the raw PRG and CHR payloads.
///
/// A `chr_rom_banks` count of zero means the board uses writable CHR-RAM
/// supplied by the mapper instead of CHR-ROM.
#[derive(Default, Clone)]
#[must_use]
pub struct Cartridge {
    pub header: INesHeader,
    pub prg_rom: Vec<u8>,
    pub chr_rom: Vec<u8>,
}

impl Cartridge {
    /// Loads a cartridge from a `.nes` file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a valid iNES
    /// image.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut rom = BufReader::new(
            File::open(path)
                .map_err(|err| Error::io(err, format!("failed to open rom {path:?}")))?,
        );
        Self::from_rom(&mut rom)
    }

    /// Loads a cartridge from any iNES byte stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is corrupted or the PRG/CHR payloads
    /// are shorter than the header promises.
    pub fn from_rom<F: Read>(rom: &mut F) -> Result<Self> {
        let mut header = [0u8; 16];
        rom.read_exact(&mut header)
            .map_err(|err| Error::io(err, "failed to read ines header"))?;
        let header = INesHeader::from_bytes(&header)?;

        let mut prg_rom = vec![0u8; header.prg_rom_banks as usize * PRG_ROM_BANK_SIZE];
        rom.read_exact(&mut prg_rom).map_err(|_| {
            Error::CartridgeLoad(format!(
                "expected {} prg-rom banks ({} bytes)",
                header.prg_rom_banks,
                prg_rom.len(),
            ))
        })?;

        let mut chr_rom = vec![0u8; header.chr_rom_banks as usize * CHR_ROM_BANK_SIZE];
        rom.read_exact(&mut chr_rom).map_err(|_| {
            Error::CartridgeLoad(format!(
                "expected {} chr-rom banks ({} bytes)",
                header.chr_rom_banks,
                chr_rom.len(),
            ))
        })?;

        info!(
            "loaded cartridge - mapper: {}, PRG-ROM: {}K, CHR-ROM: {}K, mirroring: {:?}",
            header.mapper_num(),
            prg_rom.len() / 0x0400,
            chr_rom.len() / 0x0400,
            header.mirroring(),
        );
        Ok(Self {
            header,
            prg_rom,
            chr_rom,
        })
    }
}

impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartridge")
            .field("header", &self.header)
            .field("prg_rom", &self.prg_rom.len())
            .field("chr_rom", &self.chr_rom.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds an in-memory iNES image for tests.
    pub(crate) fn build_rom(
        prg_banks: u8,
        chr_banks: u8,
        mapper_num: u8,
        flags6_low: u8,
    ) -> Vec<u8> {
        let mut rom = Vec::new();
        rom.extend_from_slice(b"NES\x1A");
        rom.push(prg_banks);
        rom.push(chr_banks);
        rom.push((mapper_num << 4) | (flags6_low & 0x0F));
        rom.push(mapper_num & 0xF0);
        rom.extend_from_slice(&[0x00; 8]);
        // Tag the first byte of every PRG bank with its bank number.
        for bank in 0..prg_banks {
            let mut data = vec![0x00; PRG_ROM_BANK_SIZE];
            data[0] = bank;
            rom.extend_from_slice(&data);
        }
        rom.extend_from_slice(&vec![0x00; chr_banks as usize * CHR_ROM_BANK_SIZE]);
        rom
    }

    #[test]
    fn parse_header() {
        let rom = build_rom(2, 1, 1, 0x01);
        let cart = Cartridge::from_rom(&mut &rom[..]).expect("valid cart");
        assert_eq!(cart.header.prg_rom_banks, 2);
        assert_eq!(cart.header.chr_rom_banks, 1);
        assert_eq!(cart.header.mapper_num(), 1);
        assert_eq!(cart.header.mirroring(), Mirroring::Vertical);
        assert_eq!(cart.prg_rom.len(), 2 * PRG_ROM_BANK_SIZE);
        assert_eq!(cart.chr_rom.len(), CHR_ROM_BANK_SIZE);
    }

    #[test]
    fn reject_bad_magic() {
        let mut rom = build_rom(1, 1, 0, 0x00);
        rom[3] = 0x00;
        assert!(Cartridge::from_rom(&mut &rom[..]).is_err());
    }

    #[test]
    fn reject_truncated_payload() {
        let rom = build_rom(2, 0, 0, 0x00);
        let truncated = &rom[..16 + PRG_ROM_BANK_SIZE];
        assert!(Cartridge::from_rom(&mut &truncated[..]).is_err());
    }

    #[test]
    fn horizontal_mirroring_default() {
        let rom = build_rom(1, 1, 0, 0x00);
        let cart = Cartridge::from_rom(&mut &rom[..]).expect("valid cart");
        assert_eq!(cart.header.mirroring(), Mirroring::Horizontal);
    }
}
