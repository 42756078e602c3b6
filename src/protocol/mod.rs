//! Protocol Module
//!
//! Job file commands and the output formats they produce.
//!
//! ## Job File Format
//! Line oriented text, one command per line:
//! ```text
//! WRITE [(a,1)(b,2)]
//! READ [b,a]
//! DELETE [a]
//! SHOW
//! WAIT 500
//! BACKUP
//! ```
//!
//! ## Output Formats
//! - READ:   `[(a,1)(b,KVSERROR)]`
//! - DELETE: `[(a,KVSMISSING)]` (only when some key was absent)
//! - SHOW:   one `(key, value)` line per entry
//! - WAIT:   `Waiting...`

mod command;
mod response;
pub mod parser;

pub use command::{Command, CommandType};
pub use response::{put_entry_line, ResultLine, HELP_TEXT, KVS_ERROR, KVS_MISSING, WAITING};
pub use parser::{parse_line, CommandReader, Limits};
