// src/message.rs

use eyre::{eyre, Result};
use mailparse::{addrparse, parse_headers, MailAddr};

use crate::utils::{is_valid_field_name, unfold};

/// Sender used on envelope lines when the From header yields no address.
pub const MAILER_DAEMON: &str = "MAILER-DAEMON";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: &str, value: &str) -> Self {
        Header {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A message split into an ordered header list and its body.
///
/// Header lookups ignore case, duplicate names keep their positions, and the
/// original spelling of each name is preserved for output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    headers: Vec<Header>,
    body: String,
}

impl ParsedMessage {
    /// Parse a message's text. Fails when the header section cannot be read or
    /// contains a line that is not a `Name: value` field.
    pub fn parse(raw: &str) -> Result<Self> {
        let (parsed, body_offset) =
            parse_headers(raw.as_bytes()).map_err(|e| eyre!("Unparseable header block: {}", e))?;

        let mut headers = Vec::with_capacity(parsed.len());
        for header in &parsed {
            // obsolete syntax allows whitespace before the colon
            let key = header.get_key();
            let name = key.trim_end_matches([' ', '\t']).to_string();
            if !is_valid_field_name(&name) {
                return Err(eyre!("Invalid header field name '{}'", name));
            }
            let value = String::from_utf8_lossy(header.get_value_raw());
            headers.push(Header {
                name,
                value: value.trim().to_string(),
            });
        }
        if headers.is_empty() {
            return Err(eyre!("Message has no header section"));
        }

        let body = raw.get(body_offset..).unwrap_or_default().to_string();
        Ok(ParsedMessage { headers, body })
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// First value for `name`, as written (folding included).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.is(name))
            .map(|h| h.value.as_str())
    }

    /// First value for `name` joined onto a single line.
    pub fn get_unfolded(&self, name: &str) -> Option<String> {
        self.get(name).map(unfold)
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|h| h.is(name))
            .map(|h| h.value.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h.is(name))
    }

    /// Replace the value of the first `name` header. Returns false when absent.
    pub fn replace(&mut self, name: &str, value: &str) -> bool {
        match self.headers.iter_mut().find(|h| h.is(name)) {
            Some(header) => {
                header.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Replace the first `name` header in place, or append it if missing.
    pub fn set(&mut self, name: &str, value: &str) {
        if !self.replace(name, value) {
            self.append(name, value);
        }
    }

    pub fn append(&mut self, name: &str, value: &str) {
        self.headers.push(Header::new(name, value));
    }

    /// Remove every header whose name satisfies `pred`, returning the removed
    /// headers in their original order.
    pub fn remove_where<F>(&mut self, mut pred: F) -> Vec<Header>
    where
        F: FnMut(&str) -> bool,
    {
        let (removed, kept): (Vec<Header>, Vec<Header>) =
            self.headers.drain(..).partition(|h| pred(&h.name));
        self.headers = kept;
        removed
    }

    /// Envelope sender: the first address of the From header, or
    /// `MAILER-DAEMON` when there is none.
    pub fn sender_address(&self) -> String {
        self.get_unfolded("From")
            .and_then(|from| first_address(&from))
            .unwrap_or_else(|| MAILER_DAEMON.to_string())
    }

    /// Header section, blank line, body; every line LF-terminated.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for header in &self.headers {
            out.push_str(&header.name);
            out.push(':');
            if !header.value.is_empty() {
                out.push(' ');
                out.push_str(&header.value);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out
    }
}

fn first_address(field: &str) -> Option<String> {
    let addrs = addrparse(field).ok()?;
    let first = addrs.iter().find_map(|addr| match addr {
        MailAddr::Single(info) => Some(info.addr.clone()),
        MailAddr::Group(group) => group.addrs.first().map(|info| info.addr.clone()),
    })?;
    let first = first.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}
