use crate::error::PresentError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trigger code shown by the sync patch, always within `0..=16`.
///
/// Codes above 15 only matter for the pulse-interval protocol; the static
/// quadrant patch carries the low four bits, so 16 shows up as 0 there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct TriggerCode(u8);

impl TriggerCode {
    pub const MAX: u8 = 16;

    /// No trigger: the patch stays dark.
    pub const NONE: TriggerCode = TriggerCode(0);
    /// Brackets a whole session (start and stop screens).
    pub const SESSION_MARK: TriggerCode = TriggerCode(13);
    /// Tells the acquisition side to start/stop recording.
    pub const RECORDING_MARK: TriggerCode = TriggerCode(5);

    pub fn new(value: i64) -> Result<Self, PresentError> {
        if (0..=Self::MAX as i64).contains(&value) {
            Ok(TriggerCode(value as u8))
        } else {
            Err(PresentError::TriggerOutOfRange(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// The four bits rendered by the quadrant patch
    pub const fn bits(self) -> u8 {
        self.0 & 0b1111
    }

    /// Bit 0 is the vsync trigger bit, bits 1..=3 carry metadata.
    pub const fn bit(self, index: usize) -> bool {
        index < 4 && (self.bits() >> index) & 1 == 1
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<i64> for TriggerCode {
    type Error = PresentError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        TriggerCode::new(value)
    }
}

impl From<TriggerCode> for u8 {
    fn from(code: TriggerCode) -> u8 {
        code.0
    }
}

impl fmt::Display for TriggerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_range() {
        for value in 0..=16 {
            assert_eq!(TriggerCode::new(value).unwrap().value() as i64, value);
        }
    }

    #[test]
    fn rejects_out_of_range_instead_of_masking() {
        assert!(matches!(
            TriggerCode::new(17),
            Err(PresentError::TriggerOutOfRange(17))
        ));
        assert!(matches!(
            TriggerCode::new(-1),
            Err(PresentError::TriggerOutOfRange(-1))
        ));
    }

    #[test]
    fn sixteen_aliases_zero_bits() {
        let code = TriggerCode::new(16).unwrap();
        assert_eq!(code.bits(), 0);
        assert!(!code.is_none());
        assert!((0..4).all(|i| !code.bit(i)));
    }

    #[test]
    fn bit_zero_is_lowest() {
        let code = TriggerCode::new(0b1001).unwrap();
        assert!(code.bit(0));
        assert!(!code.bit(1));
        assert!(!code.bit(2));
        assert!(code.bit(3));
        assert!(!code.bit(4));
    }

    #[test]
    fn serde_validates_range() {
        let code: TriggerCode = serde_json::from_str("13").unwrap();
        assert_eq!(code, TriggerCode::SESSION_MARK);
        assert_eq!(serde_json::to_string(&code).unwrap(), "13");
        assert!(serde_json::from_str::<TriggerCode>("42").is_err());
    }
}
