// Compressed stream layout.
//
// - `header`: fixed 14-byte header (magic, size, CRC32, window)
// - `token`: literal / escaped literal / match token coding
// - `cursor`: bounded output cursor used by the encoder

pub mod cursor;
pub mod header;
pub mod token;

pub use cursor::{CursorError, OutputCursor};
pub use header::{HEADER_SIZE, Header, MAGIC};
pub use token::{Token, Tokens};
