//! Output handling: decoding raw bytes from the shell and keeping the
//! bounded transcript that the UI renders.

mod decoder;
mod transcript;

pub use decoder::{ByteDecoder, Codepage};
pub use transcript::{DEFAULT_MAX_LINES, ERROR_MARKER, Transcript};
