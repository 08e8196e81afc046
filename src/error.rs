use std::{error, fmt};

use bstr::BString;

pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised when building or editing a graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// An arc referred to a segment index past the end of the
    /// segment vector.
    SegmentOutOfRange(u32),
    /// Tried to add a segment whose name is already in use.
    DuplicateSegment(BString),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use GraphError as GE;
        match self {
            GE::SegmentOutOfRange(id) => {
                write!(f, "Segment {} does not exist in the graph", id)
            }
            GE::DuplicateSegment(name) => {
                write!(f, "Segment name `{}` is already in use", name)
            }
        }
    }
}

impl error::Error for GraphError {}

/// A mapping option holds a value the pipeline can't work with.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionError {
    /// The field must lie within the given inclusive range.
    OutOfRange(&'static str, f32, f32),
    /// The field must be strictly positive.
    NonPositive(&'static str),
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use OptionError as OE;
        match self {
            OE::OutOfRange(field, lo, hi) => {
                write!(f, "Option `{}` must be within [{}, {}]", field, lo, hi)
            }
            OE::NonPositive(field) => {
                write!(f, "Option `{}` must be positive", field)
            }
        }
    }
}

impl error::Error for OptionError {}
