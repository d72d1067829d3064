/*! Utility types: the shared pointer alias and the crate's error taxonomy.*/

use std::rc::Rc;

/// The reference counting pointer type used throughout the back end.
pub type Ptr<A> = Rc<A>;

/// Everything that can go wrong while shipping a document. I/O failures come
/// from the byte sink; the structural variants indicate a sequencing error in
/// the caller or a broken traversal invariant.
#[derive(thiserror::Error, Debug)]
pub enum ShipoutError {
    #[error("output stream error: {0}")]
    Io(#[from] std::io::Error),
    /// A `pop` was emitted with no matching `push`. The traversal keeps
    /// push/pop balanced by construction, so this indicates a logic error.
    #[error("device register stack underflow")]
    StackUnderflow,
    /// The postamble was requested while a page was still open, or a second
    /// preamble was about to be written.
    #[error("output stream in invalid state: {0}")]
    StreamState(&'static str),
}

pub type Res<A> = Result<A, ShipoutError>;
