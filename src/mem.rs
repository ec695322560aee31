//! Power-up memory state.

use rand::Rng;
use std::str::FromStr;

/// Contents of RAM at power-on.
///
/// Real hardware comes up with unpredictable RAM contents. Most test ROMs
/// expect zeroes, so that is the default, but a handful of games rely on
/// non-zero garbage for seeding RNGs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[must_use]
pub enum RamState {
    AllZeros,
    AllOnes,
    Random,
}

impl RamState {
    #[must_use]
    pub fn filled(capacity: usize, state: Self) -> Vec<u8> {
        let mut ram = vec![0x00; capacity];
        Self::fill(&mut ram, state);
        ram
    }

    pub fn fill(ram: &mut [u8], state: Self) {
        match state {
            Self::AllZeros => ram.fill(0x00),
            Self::AllOnes => ram.fill(0xFF),
            Self::Random => {
                let mut rng = rand::thread_rng();
                for val in ram {
                    *val = rng.gen();
                }
            }
        }
    }
}

impl Default for RamState {
    fn default() -> Self {
        Self::AllZeros
    }
}

impl FromStr for RamState {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all-zeros" => Ok(Self::AllZeros),
            "all-ones" => Ok(Self::AllOnes),
            "random" => Ok(Self::Random),
            _ => Err("valid options: `all-zeros`, `all-ones`, or `random`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_states() {
        assert!(RamState::filled(32, RamState::AllZeros)
            .iter()
            .all(|&b| b == 0x00));
        assert!(RamState::filled(32, RamState::AllOnes)
            .iter()
            .all(|&b| b == 0xFF));
        assert_eq!(RamState::filled(32, RamState::Random).len(), 32);
    }
}
