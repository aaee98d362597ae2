//! Address-to-name table used by the disassembler, with the same
//! label-file text format and truncation rules as `sim65`'s `-l` option
//! (see `read_labels` in `sim65.c`).

use std::collections::HashMap;
use std::io::BufRead;

use crate::error::SimError;

/// Maps addresses to symbolic names for disassembly output.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    names: HashMap<u16, String>,
}

impl Labels {
    pub fn new() -> Labels {
        Labels {
            names: HashMap::new(),
        }
    }

    pub fn insert(&mut self, address: u16, name: impl Into<String>) {
        self.names.insert(address, name.into());
    }

    pub fn get(&self, address: u16) -> Option<&str> {
        self.names.get(&address).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u16, &String)> {
        self.names.iter()
    }

    /// Parses a label file in either of the two formats `load_labels`
    /// accepts: a `ca65`-style `"al %06x .NAME"` dump, or the simpler
    /// `"%02x %04x NAME"` page/address/name triple (only page `00` is
    /// honored). Invalid lines are skipped with a `log::warn!`
    /// diagnostic rather than aborting the whole parse -- one malformed
    /// line shouldn't cost every label after it. This is the
    /// "label-file parsing" piece that is in scope even though the
    /// distilled spec treats it as a non-goal for *host-level file I/O*
    /// -- this function takes an already-open reader, so no
    /// filesystem access happens in this crate.
    pub fn parse(reader: impl BufRead) -> Result<Labels, SimError> {
        let mut labels = Labels::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| SimError::User(e.to_string()))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match Self::parse_line(line) {
                Some((address, name)) => labels.insert(address, name),
                None => log::warn!("skipping unrecognized label line {}: {:?}", lineno + 1, line),
            }
        }
        Ok(labels)
    }

    fn parse_line(line: &str) -> Option<(u16, String)> {
        if let Some(rest) = line.strip_prefix("al ") {
            let mut parts = rest.splitn(2, char::is_whitespace);
            let addr_hex = parts.next()?;
            let name = parts.next()?.trim().trim_start_matches('.');
            if name.is_empty() {
                return None;
            }
            let address = (u32::from_str_radix(addr_hex, 16).ok()? & 0xFFFF) as u16;
            return Some((address, name.to_string()));
        }

        let mut parts = line.split_whitespace();
        let page_hex = parts.next()?;
        let addr_hex = parts.next()?;
        let name = parts.next()?;
        if parts.next().is_some() || name.is_empty() {
            return None;
        }
        let page = u8::from_str_radix(page_hex, 16).ok()?;
        if page != 0 {
            return None;
        }
        let address = u16::from_str_radix(addr_hex, 16).ok()?;
        Some((address, name.to_string()))
    }

    /// Truncates a label to fit one of the disassembler's three column
    /// widths, marking truncation with a leading `?` the way `sim65`'s
    /// `print_label` does. `width` is the full column width including
    /// the trailing colon/space the caller adds separately.
    pub fn truncate_for_column(name: &str, width: usize) -> String {
        if name.len() <= width {
            name.to_string()
        } else {
            let keep = width.saturating_sub(1);
            format!("?{}", &name[name.len() - keep..])
        }
    }
}

pub const LABEL_WIDTH_FULL: usize = 24;
pub const LABEL_WIDTH_OPERAND: usize = 16;
pub const LABEL_WIDTH_COMMENT: usize = 14;
