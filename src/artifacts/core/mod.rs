//! Core utilities and shared types
//!
//! This module contains shared utilities used across the application.

use derive_new::new;
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::{self, Write};

/// Set (to any value) to print history straight to stdout
pub const NO_PAGER_ENV: &str = "NO_PAGER";

/// Wrapper that implements `Write` for the minus pager
///
/// The minus pager doesn't implement `std::io::Write` directly, so this wrapper
/// adapts it to be compatible with Rust's standard I/O traits. This allows
/// using the pager as a drop-in replacement for stdout in commands that produce
/// long output.
///
/// ## Usage
///
/// ```ignore
/// let pager = Pager::new();
/// let mut writer = PagerWriter::new(pager.clone());
/// writeln!(writer, "Some long output...")?;
/// page_all(pager)?;
/// ```
#[derive(new)]
pub struct PagerWriter {
    pager: Pager,
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s =
            std::str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.pager.push_str(s).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Page long output only for an interactive terminal that did not opt out
pub fn should_page() -> bool {
    io::stdout().is_terminal() && std::env::var_os(NO_PAGER_ENV).is_none()
}

/// Writer for a history command, plus the pager to hand it to once the
/// command finishes (`None` when writing straight to stdout)
pub fn history_writer() -> (Box<dyn Write>, Option<Pager>) {
    if should_page() {
        let pager = Pager::new();
        (Box::new(PagerWriter::new(pager.clone())), Some(pager))
    } else {
        (Box::new(io::stdout()), None)
    }
}

/// Show everything pushed to the pager and wait for the user to quit it
pub fn page_all(pager: Pager) -> anyhow::Result<()> {
    minus::page_all(pager)?;
    Ok(())
}
