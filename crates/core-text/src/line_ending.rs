//! Line break styles and their rewrite to LF.
//!
//! The buffer stores LF only. The dominant style seen while loading is kept so
//! a persistence layer can write the document back the way it came in.
//!
//! Loading may arrive in chunks, so the rewrite is incremental: a chunk that
//! ends in `\r` is emitted as a line break straight away, and a `\n` opening
//! the next chunk is recognised as the second half of that CRLF.

/// Line ending style detected from source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    Cr,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::Crlf => "\r\n",
        }
    }
}

/// Incremental CR / CRLF to LF rewriter that tallies each style it sees.
#[derive(Debug, Clone, Copy, Default)]
pub struct LfNormalizer {
    crlf: usize,
    lf: usize,
    cr: usize,
    /// The last chunk ended in a `\r` already emitted as `\n`.
    pending_cr: bool,
}

impl LfNormalizer {
    /// Rewrite one chunk. Call repeatedly for consecutive pieces of one text.
    pub fn push(&mut self, chunk: &str) -> String {
        if chunk.is_empty() {
            return String::new();
        }
        let mut out = String::with_capacity(chunk.len());
        let mut chars = chunk.chars().peekable();
        if std::mem::take(&mut self.pending_cr) && chars.peek() == Some(&'\n') {
            chars.next();
            self.cr -= 1;
            self.crlf += 1;
        }
        while let Some(c) = chars.next() {
            match c {
                '\r' if chars.peek() == Some(&'\n') => {
                    chars.next();
                    self.crlf += 1;
                    out.push('\n');
                }
                '\r' => {
                    self.cr += 1;
                    self.pending_cr = chars.peek().is_none();
                    out.push('\n');
                }
                '\n' => {
                    self.lf += 1;
                    out.push('\n');
                }
                c => out.push(c),
            }
        }
        out
    }

    /// Stop treating a leading `\n` of the next chunk as part of a CRLF. Used
    /// when the text was edited in between.
    pub fn break_run(&mut self) {
        self.pending_cr = false;
    }

    /// Majority style so far; ties go CRLF, then LF, then CR. LF when no break was seen.
    pub fn ending(&self) -> LineEnding {
        [
            (LineEnding::Crlf, self.crlf),
            (LineEnding::Lf, self.lf),
            (LineEnding::Cr, self.cr),
        ]
        .into_iter()
        .fold((LineEnding::Lf, 0), |best, (style, n)| if n > best.1 { (style, n) } else { best })
        .0
    }

    /// More than one style was seen.
    pub fn is_mixed(&self) -> bool {
        [self.crlf, self.lf, self.cr].iter().filter(|n| **n > 0).count() > 1
    }
}

/// A whole text rewritten to LF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    pub ending: LineEnding,
    pub mixed: bool,
}

/// Rewrite `input` to LF-only line breaks, reporting the style it used.
pub fn normalize_line_endings(input: &str) -> NormalizedText {
    let mut n = LfNormalizer::default();
    let text = n.push(input);
    NormalizedText {
        text,
        ending: n.ending(),
        mixed: n.is_mixed(),
    }
}
