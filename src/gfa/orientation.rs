#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Represents segment orientation/strand
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum Orientation {
    #[default]
    Forward,
    Backward,
}

impl Orientation {
    /// Orientation from the lowest bit of a packed value, where 0 is
    /// Forward, 1 is Backward
    #[inline]
    pub fn from_bit(bit: u32) -> Self {
        if bit & 1 == 0 {
            Orientation::Forward
        } else {
            Orientation::Backward
        }
    }

    #[inline]
    pub fn bit(&self) -> u32 {
        match self {
            Self::Forward => 0,
            Self::Backward => 1,
        }
    }

    #[inline]
    pub fn flip(&self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// Backward if exactly one of the two orientations is Backward
    #[inline]
    pub fn relative_to(&self, other: Orientation) -> Self {
        Self::from_bit(self.bit() ^ other.bit())
    }

    #[inline]
    pub fn is_reverse(&self) -> bool {
        matches!(self, Self::Backward)
    }
}

/// Display maps `Forward` to "+", `Backward` to "-". If the alternate
/// format flag is used, i.e. `{:#}`, `Forward` will be mapped to ">",
/// `Backward` to "<", as in walk notation.
///
/// # Examples
///
/// ```
/// use gfamap::gfa::Orientation as O;
///
/// assert_eq!(&format!("{}", O::Forward), "+");
/// assert_eq!(&format!("{}", O::Backward), "-");
/// assert_eq!(&format!("{:#}", O::Forward), ">");
/// assert_eq!(&format!("{:#}", O::Backward), "<");
/// ```
impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sym = match (self, f.alternate()) {
            (Self::Forward, false) => '+',
            (Self::Backward, false) => '-',
            (Self::Forward, true) => '>',
            (Self::Backward, true) => '<',
        };
        write!(f, "{}", sym)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_and_flips() {
        use Orientation::*;
        assert_eq!(Orientation::from_bit(0), Forward);
        assert_eq!(Orientation::from_bit(3), Backward);
        assert_eq!(Forward.flip(), Backward);
        assert_eq!(Backward.bit(), 1);
        assert_eq!(Backward.relative_to(Backward), Forward);
        assert_eq!(Forward.relative_to(Backward), Backward);
        assert!(Forward < Backward);
    }
}
