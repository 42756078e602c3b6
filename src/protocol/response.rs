//! Output formatting
//!
//! Byte-exact formats written to `.out` and `.bck` files.

use bytes::{BufMut, BytesMut};

/// Value shown by `READ` for an absent key
pub const KVS_ERROR: &str = "KVSERROR";

/// Value shown by `DELETE` for an absent key
pub const KVS_MISSING: &str = "KVSMISSING";

/// Line written before a `WAIT` sleeps
pub const WAITING: &str = "Waiting...\n";

/// Usage text printed by `HELP`
pub const HELP_TEXT: &str = "Available commands:\n\
    \x20 WRITE [(key,value),(key2,value2),...]\n\
    \x20 READ [key,key2,...]\n\
    \x20 DELETE [key,key2,...]\n\
    \x20 SHOW\n\
    \x20 WAIT <delay_ms>\n\
    \x20 BACKUP\n\
    \x20 HELP\n";

/// Builder for one bracketed result line: `[(k,v)(k2,v2)]\n`
#[derive(Debug, Default)]
pub struct ResultLine {
    buf: BytesMut,
    items: usize,
}

impl ResultLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `(key,value)` with no separator
    pub fn push(&mut self, key: &str, value: &str) {
        if self.items == 0 {
            self.buf.put_u8(b'[');
        }
        self.buf.put_u8(b'(');
        self.buf.put_slice(key.as_bytes());
        self.buf.put_u8(b',');
        self.buf.put_slice(value.as_bytes());
        self.buf.put_u8(b')');
        self.items += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    /// Close the line. An empty builder yields `[]\n`.
    pub fn finish(mut self) -> BytesMut {
        if self.items == 0 {
            self.buf.put_u8(b'[');
        }
        self.buf.put_slice(b"]\n");
        self.buf
    }
}

/// Append one `SHOW`/backup line: `(key, value)\n`
pub fn put_entry_line(buf: &mut BytesMut, key: &str, value: &str) {
    buf.reserve(key.len() + value.len() + 5);
    buf.put_u8(b'(');
    buf.put_slice(key.as_bytes());
    buf.put_slice(b", ");
    buf.put_slice(value.as_bytes());
    buf.put_slice(b")\n");
}
