//! Section scanning for report documents.
//!
//! A report is read line by line through a two-state machine. Text starts in
//! [`Section::Body`]; a second-level heading equal to the references heading
//! (`## References` by default) switches to [`Section::References`], and any
//! other second-level heading switches back to [`Section::Body`].
//!
//! ```plain
//! Intro text citing [1].          Body
//! ## References                   References
//! [1] Title — https://a.com/      References
//! ## Appendix                     Body (tail)
//! ```
//!
//! The references heading is also recognised when it closes a line of body
//! text (`See [1]. ## References`); the text before it stays in the body.

use itertools::Itertools;
use std::borrow::Cow;
use std::ops::Range;

/// Which part of the document a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Body,
    References,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Text,
    /// A second-level heading other than the references heading.
    Heading,
    ReferencesHeading,
}

/// One line (or, for a trailing references heading, part of a line) of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub(crate) section: Section,
    pub(crate) kind: LineKind,
    /// 1-based line number in the document.
    pub(crate) number: usize,
    /// Byte offset of `text` in the document.
    pub(crate) start: usize,
    /// Line content without its terminator.
    pub(crate) text: &'a str,
}

/// An [Iterator] over the [Line]s of a document, tagged with their [Section].
pub(crate) struct Lines<'a> {
    text: &'a str,
    heading: &'a str,
    offset: usize,
    number: usize,
    section: Section,
    pending: Option<Line<'a>>,
}

impl<'a> Lines<'a> {
    pub(crate) fn new(text: &'a str, heading: &'a str) -> Self {
        Self {
            text,
            heading,
            offset: 0,
            number: 0,
            section: Section::Body,
            pending: None,
        }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(line) = self.pending.take() {
            return Some(line);
        }
        let text = self.text;
        let rest = &text[self.offset..];
        let raw = rest.split_inclusive('\n').next()?;
        let content = raw.trim_end_matches('\n').trim_end_matches('\r');
        let start = self.offset;
        self.offset += raw.len();
        self.number += 1;

        let number = self.number;
        let line = |section: Section, kind: LineKind, start: usize, text: &'a str| Line {
            section,
            kind,
            number,
            start,
            text,
        };

        match classify(content, self.heading) {
            LineKind::Heading => {
                self.section = Section::Body;
                Some(line(Section::Body, LineKind::Heading, start, content))
            }
            LineKind::ReferencesHeading => {
                let at = references_heading_offset(content, self.heading).unwrap_or(0);
                let heading = line(
                    Section::References,
                    LineKind::ReferencesHeading,
                    start + at,
                    &content[at..],
                );
                let lead = line(self.section, LineKind::Text, start, &content[..at]);
                self.section = Section::References;
                if at == 0 {
                    Some(heading)
                } else {
                    self.pending = Some(heading);
                    Some(lead)
                }
            }
            LineKind::Text => Some(line(self.section, LineKind::Text, start, content)),
        }
    }
}

/// Title of a second-level heading (`## Title`), or `None` if `line` is not one.
fn heading_title(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("##")?;
    rest.starts_with([' ', '\t']).then(|| rest.trim())
}

fn classify(line: &str, heading: &str) -> LineKind {
    match heading_title(line) {
        Some(title) if title == heading => LineKind::ReferencesHeading,
        Some(_) => LineKind::Heading,
        None if references_heading_offset(line, heading).is_some() => {
            LineKind::ReferencesHeading
        }
        None => LineKind::Text,
    }
}

/// Byte offset of a references heading that ends `line`, if any.
fn references_heading_offset(line: &str, heading: &str) -> Option<usize> {
    if heading_title(line) == Some(heading) {
        return Some(0);
    }
    let at = line.rfind("##")?;
    let preceded_by_space = line[..at].ends_with(char::is_whitespace);
    (preceded_by_space && heading_title(&line[at..]) == Some(heading)).then_some(at)
}

/// Byte ranges of the body, first reference section, and tail of a document.
///
/// The tail holds the body-state spans after the first reference section;
/// later reference sections fall between its ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) body: Range<usize>,
    pub(crate) references: Range<usize>,
    pub(crate) tail: Vec<Range<usize>>,
}

impl Layout {
    /// Locates the first reference section, or `None` if the document has no
    /// references heading.
    pub(crate) fn locate(text: &str, heading: &str) -> Option<Self> {
        let lines = Lines::new(text, heading).collect_vec();
        let first = lines
            .iter()
            .position(|line| line.kind == LineKind::ReferencesHeading)?;
        let extent = |index: usize| {
            lines[index].start..lines.get(index + 1).map_or(text.len(), |next| next.start)
        };

        let mut tail: Vec<Range<usize>> = Vec::new();
        for (index, line) in lines.iter().enumerate().skip(first + 1) {
            if line.section != Section::Body {
                continue;
            }
            let span = extent(index);
            match tail.last_mut() {
                Some(last) if last.end == span.start => last.end = span.end,
                _ => tail.push(span),
            }
        }

        let body_end = lines[first].start;
        let references_end = tail.first().map_or(text.len(), |span| span.start);
        Some(Self {
            body: 0..body_end,
            references: body_end..references_end,
            tail,
        })
    }

    /// The tail text, with any later reference sections left out.
    pub(crate) fn tail_text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self.tail.as_slice() {
            [] => Cow::Borrowed(""),
            [span] => Cow::Borrowed(&text[span.clone()]),
            spans => Cow::Owned(spans.iter().map(|span| &text[span.clone()]).collect()),
        }
    }
}
