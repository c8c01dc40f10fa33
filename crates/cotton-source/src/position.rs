use serde::Serialize;

/// A byte offset within a text document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Offset(u32);

impl Offset {
    #[must_use]
    pub fn new(offset: u32) -> Self {
        Self(offset)
    }

    #[must_use]
    pub fn from_usize(offset: usize) -> Self {
        Self(u32::try_from(offset).unwrap_or(u32::MAX))
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// A zero-based line and column position within a text document.
///
/// The unit of `column` depends on the [`PositionEncoding`] it was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineCol {
    line: u32,
    column: u32,
}

impl LineCol {
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }
}

/// Unit used to count columns, negotiated with the client at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositionEncoding {
    Utf8,
    #[default]
    Utf16,
    Utf32,
}

impl PositionEncoding {
    fn width(self, c: char) -> u32 {
        let width = match self {
            PositionEncoding::Utf8 => c.len_utf8(),
            PositionEncoding::Utf16 => c.len_utf16(),
            PositionEncoding::Utf32 => 1,
        };
        u32::try_from(width).unwrap_or(1)
    }
}

/// Byte offsets of every line start, for position/offset conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    length: u32,
}

impl LineIndex {
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }

        Self {
            line_starts,
            length: u32::try_from(text.len()).unwrap_or(u32::MAX),
        }
    }

    #[must_use]
    pub fn line_start(&self, line: u32) -> Option<Offset> {
        self.line_starts.get(line as usize).copied().map(Offset::new)
    }

    /// The line containing `offset`, zero-based.
    #[must_use]
    pub fn line_of(&self, offset: Offset) -> u32 {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset.get())
            .saturating_sub(1);
        u32::try_from(line).unwrap_or(0)
    }

    /// Byte range of `line`, excluding its line terminator.
    fn line_bounds(&self, line: u32, text: &str) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(line as usize)? as usize;
        let next = self
            .line_starts
            .get(line as usize + 1)
            .copied()
            .unwrap_or(self.length) as usize;

        let mut end = next.min(text.len());
        let bytes = text.as_bytes();
        if end > start && bytes.get(end - 1) == Some(&b'\n') {
            end -= 1;
        }
        if end > start && bytes.get(end - 1) == Some(&b'\r') {
            end -= 1;
        }
        Some((start, end))
    }

    /// Convert a line/column in the given encoding to a byte offset.
    ///
    /// Columns past the end of the line clamp to the line end. Returns `None`
    /// when the line does not exist.
    #[must_use]
    pub fn offset(&self, line_col: LineCol, text: &str, encoding: PositionEncoding) -> Option<Offset> {
        let (start, end) = self.line_bounds(line_col.line(), text)?;
        let line_text = text.get(start..end)?;

        let mut units = 0;
        let mut bytes = 0;
        for c in line_text.chars() {
            if units >= line_col.column() {
                break;
            }
            units += encoding.width(c);
            bytes += c.len_utf8();
        }

        Some(Offset::from_usize(start + bytes))
    }

    /// Convert a byte offset to a line/column in the given encoding.
    #[must_use]
    pub fn line_col(&self, offset: Offset, text: &str, encoding: PositionEncoding) -> LineCol {
        let offset = offset.get().min(self.length);
        let line = self.line_of(Offset::new(offset));
        let line_start = self.line_starts[line as usize] as usize;

        let prefix = text.get(line_start..offset as usize).unwrap_or_default();
        let column = match encoding {
            PositionEncoding::Utf8 => u32::try_from(prefix.len()).unwrap_or(u32::MAX),
            PositionEncoding::Utf16 | PositionEncoding::Utf32 => {
                prefix.chars().map(|c| encoding.width(c)).sum()
            }
        };

        LineCol::new(line, column)
    }
}
