// tests/harness/takeout_archive.rs
//
// Builds archives in the webmail export layout: numeric marker lines in place
// of envelope lines, provider metadata headers first.

/// One message destined for a Takeout-style archive.
#[derive(Debug, Clone)]
pub struct TakeoutMessage {
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TakeoutMessage {
    /// Create a message with the headers every export carries.
    pub fn new(from: &str, subject: &str) -> Self {
        Self {
            headers: vec![
                ("From".to_string(), from.to_string()),
                ("Subject".to_string(), subject.to_string()),
            ],
            body: "Hello.\n".to_string(),
        }
    }

    /// A message with no From header at all.
    pub fn anonymous(subject: &str) -> Self {
        Self {
            headers: vec![("Subject".to_string(), subject.to_string())],
            body: "Hello.\n".to_string(),
        }
    }

    pub fn with_date(self, date: &str) -> Self {
        self.with_header("Date", date)
    }

    pub fn with_message_id(self, message_id: &str) -> Self {
        self.with_header("Message-ID", message_id)
    }

    pub fn with_in_reply_to(self, in_reply_to: &str) -> Self {
        self.with_header("In-Reply-To", in_reply_to)
    }

    /// References are folded one per line, the way clients write long chains.
    pub fn with_references(self, refs: &[&str]) -> Self {
        let folded = refs.join("\n ");
        self.with_header("References", &folded)
    }

    /// Provider metadata, placed ahead of the regular headers.
    pub fn with_google_metadata(mut self) -> Self {
        let metadata = [
            ("X-GM-THRID", "1852322999435237597"),
            ("X-Gmail-Labels", "Inbox,Opened"),
            ("X-Google-Smtp-Source", "AGHT+IFsf3kq0examplesource"),
            ("X-Google-DKIM-Signature", "v=1; a=rsa-sha256; c=relaxed/relaxed"),
        ];
        for (i, (name, value)) in metadata.iter().enumerate() {
            self.headers.insert(i, (name.to_string(), value.to_string()));
        }
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.headers {
            out.push_str(&format!("{}: {}\n", name, value));
        }
        out.push('\n');
        out.push_str(&self.body);
        out
    }
}

/// An archive under construction.
#[derive(Debug, Default)]
pub struct TakeoutArchive {
    entries: Vec<String>,
    next_marker: i64,
}

impl TakeoutArchive {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_marker: 1852322999435237597,
        }
    }

    /// Append a message under a positive marker line.
    pub fn add_message(&mut self, message: TakeoutMessage) -> &mut Self {
        let marker = self.next_marker;
        self.next_marker += 1;
        self.add_raw(marker, &message.render())
    }

    /// Append raw text under an explicit marker, e.g. a negative one.
    pub fn add_raw(&mut self, marker: i64, text: &str) -> &mut Self {
        self.entries.push(format!("From {}\n{}", marker, text));
        self
    }

    pub fn render(&self) -> String {
        self.entries.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_layout() {
        let mut archive = TakeoutArchive::new();
        archive
            .add_message(TakeoutMessage::new("a@b.com", "one"))
            .add_raw(-42, "Subject: two\n\nbody\n");
        let text = archive.render();
        assert!(text.starts_with("From 1852322999435237597\nFrom: a@b.com\nSubject: one\n\nHello.\n"));
        assert!(text.contains("\n\nFrom -42\nSubject: two\n"));
    }

    #[test]
    fn test_metadata_goes_first() {
        let rendered = TakeoutMessage::new("a@b.com", "s").with_google_metadata().render();
        assert!(rendered.starts_with("X-GM-THRID: "));
        assert!(rendered.contains("X-Google-DKIM-Signature: v=1;"));
    }
}
