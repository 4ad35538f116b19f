use log::debug;

/// Kind of a non-destructive annotation over a text range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Navigable link; payload holds the href.
    Link,
    /// Block quote, rendered with an accent bar and tinted card.
    Quote,
    /// Footnote marker; payload holds the target href.
    Footnote,
}

/// An annotation over the half-open char range `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub kind: SpanKind,
    pub start: usize,
    pub end: usize,
    /// Target href for `Link` and `Footnote` spans.
    pub payload: Option<String>,
}

impl Span {
    pub fn link(start: usize, end: usize, href: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Link,
            start,
            end,
            payload: Some(href.into()),
        }
    }

    pub fn quote(start: usize, end: usize) -> Self {
        Self {
            kind: SpanKind::Quote,
            start,
            end,
            payload: None,
        }
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Immutable text buffer for one chapter resource, plus offset-range
/// annotations produced by the upstream markup converter.
///
/// Offsets everywhere in this crate are indices into the flat char sequence.
/// The buffer is replaced wholesale on chapter navigation; it is never
/// mutated in place.
#[derive(Debug, Clone)]
pub struct StyledText {
    chars: Vec<char>,
    spans: Vec<Span>,
}

/// Footnote markers are short: trimmed label of at most this many chars.
const FOOTNOTE_MAX_LABEL: usize = 5;

impl StyledText {
    /// Plain text with no annotations.
    pub fn plain(text: &str) -> Self {
        Self::with_spans(text, Vec::new())
    }

    /// Text plus converter-supplied spans. Ranges are clamped to the buffer
    /// and empty ranges dropped. Link spans whose visible label looks like a
    /// footnote marker (short, contains a digit) are reclassified as
    /// `Footnote` so the renderer can superscript them.
    pub fn with_spans(text: &str, spans: Vec<Span>) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut kept = Vec::with_capacity(spans.len());
        for mut span in spans {
            span.start = span.start.min(len);
            span.end = span.end.min(len);
            if span.start >= span.end {
                debug!("dropping empty span {:?} [{}, {})", span.kind, span.start, span.end);
                continue;
            }
            if span.kind == SpanKind::Link {
                let label: String = chars[span.start..span.end].iter().collect();
                let label = label.trim();
                if label.chars().count() <= FOOTNOTE_MAX_LABEL
                    && label.chars().any(|c| c.is_ascii_digit())
                {
                    span.kind = SpanKind::Footnote;
                }
            }
            kept.push(span);
        }
        Self { chars, spans: kept }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// True when there is nothing worth laying out.
    pub fn is_blank(&self) -> bool {
        self.chars.iter().all(|c| c.is_whitespace())
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).copied()
    }

    /// Extract `[start, end)`, clamped to the buffer.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let start = start.min(self.chars.len());
        let end = end.clamp(start, self.chars.len());
        self.chars[start..end].iter().collect()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn spans_of(&self, kind: SpanKind) -> impl Iterator<Item = &Span> {
        self.spans.iter().filter(move |s| s.kind == kind)
    }

    /// Topmost link or footnote span covering `offset`. Spans may overlap;
    /// the last-applied one wins, so the scan runs back to front.
    pub fn link_at(&self, offset: usize) -> Option<&Span> {
        self.spans
            .iter()
            .rev()
            .find(|s| matches!(s.kind, SpanKind::Link | SpanKind::Footnote) && s.contains(offset))
    }

    /// Topmost span of `kind` covering `offset`, last-applied wins.
    pub fn span_at(&self, kind: SpanKind, offset: usize) -> Option<&Span> {
        self.spans
            .iter()
            .rev()
            .find(|s| s.kind == kind && s.contains(offset))
    }
}

/// CJK ideographs (plus kana and fullwidth forms) take their own selection
/// and line-break boundaries: each char is a unit.
pub fn is_cjk(ch: char) -> bool {
    matches!(ch,
        '\u{3040}'..='\u{30FF}'   // hiragana, katakana
        | '\u{3400}'..='\u{4DBF}' // CJK extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK unified
        | '\u{F900}'..='\u{FAFF}' // compatibility ideographs
        | '\u{FF00}'..='\u{FF60}' // fullwidth forms
    )
}

/// Word characters for Latin-style selection expansion.
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() && !is_cjk(ch) || ch == '\''
}
