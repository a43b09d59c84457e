//! Splits a document into heading-delimited sections.
//!
//! A section starts at a line beginning with `"# "`. Deeper headings
//! (`"## "`, ...) stay in the body, and lines inside fenced code blocks are
//! never treated as headings. Anything before the first heading is dropped.

const MARKER: &str = "# ";

/// A heading-delimited fragment of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    /// Text of the heading line after the marker.
    pub title: &'a str,
    /// Everything between the heading line and the next heading.
    pub body: &'a str,
}

impl Section<'_> {
    fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.body.trim().is_empty()
    }
}

/// An open fenced code block: its marker character and run length.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Fence {
    marker: char,
    len: usize,
}

/// Indentation from which a line is an indented code line, not a fence.
const CODE_INDENT: usize = 4;

/// Split a line into its fence marker run and what follows, if it starts
/// with one.
fn marker_run(line: &str) -> Option<(char, usize, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent >= CODE_INDENT {
        return None;
    }
    let rest = &line[indent..];
    let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = rest.len() - rest.trim_start_matches(marker).len();
    (len >= 3).then(|| (marker, len, &rest[len..]))
}

impl Fence {
    fn opening(line: &str) -> Option<Self> {
        let (marker, len, info) = marker_run(line)?;
        // A backtick info string cannot hold backticks; such a line is
        // inline code.
        if marker == '`' && info.contains('`') {
            return None;
        }
        Some(Fence { marker, len })
    }

    fn closed_by(&self, line: &str) -> bool {
        matches!(
            marker_run(line),
            Some((marker, len, rest))
                if marker == self.marker && len >= self.len && rest.trim().is_empty()
        )
    }
}

/// Partition `document` into sections, in document order.
///
/// Sections whose title and body are both blank are discarded.
pub fn split_sections(document: &str) -> Vec<Section<'_>> {
    let mut sections = Vec::new();
    // (title, body start offset) of the section being collected
    let mut open: Option<(&str, usize)> = None;
    let mut fence: Option<Fence> = None;
    let mut offset = 0;

    for raw in document.split_inclusive('\n') {
        let line_start = offset;
        offset += raw.len();
        let line = raw.strip_suffix('\n').unwrap_or(raw);

        if let Some(current) = fence {
            if current.closed_by(line) {
                fence = None;
            }
            continue;
        }
        if let Some(opened) = Fence::opening(line) {
            fence = Some(opened);
            continue;
        }

        let Some(title) = line.strip_prefix(MARKER) else {
            continue;
        };

        if let Some((prev_title, body_start)) = open.take() {
            // The newline ending the previous body belongs to the separator.
            let end = line_start.saturating_sub(1).max(body_start);
            let body = &document[body_start..end];
            push(&mut sections, prev_title, body.strip_suffix('\r').unwrap_or(body));
        }
        open = Some((title.strip_suffix('\r').unwrap_or(title), offset));
    }

    if let Some((title, body_start)) = open {
        push(&mut sections, title, &document[body_start..]);
    }

    sections
}

fn push<'a>(sections: &mut Vec<Section<'a>>, title: &'a str, body: &'a str) {
    let section = Section { title, body };
    if !section.is_empty() {
        sections.push(section);
    }
}
