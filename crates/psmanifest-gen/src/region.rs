// crates/psmanifest-gen/src/region.rs
// ============================================================================
// Module: Region File
// Description: Lossless text document partitioned into named regions.
// Purpose: Replace generated blocks while leaving user text untouched.
// Dependencies: none
// ============================================================================

//! ## Overview
//! A [`RegionFile`] splits a text file into unmanaged text and named regions
//! delimited by `# region <name>` / `# endregion` marker lines. Generators
//! overwrite region bodies through [`RegionFile::set_region`]; everything
//! outside a region is carried through byte-for-byte.
//!
//! ### Format
//! - Markers are recognized after trimming; `#region` and `#endregion` are
//!   accepted as well as the spaced forms.
//! - Regions do not nest. A marker line inside a region body is body text.
//! - An open marker with no matching close marker is unmanaged text.
//! - `RegionFile::parse(text).text() == text` for every input.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Spaces emitted per indentation level.
pub const INDENT_WIDTH: usize = 2;

/// Starting shape for an empty module manifest.
pub const PSD_SKELETON: &str = "@{\n}\n";

/// Keyword opening a region marker.
const REGION_OPEN: &str = "region";

/// Keyword closing a region marker.
const REGION_CLOSE: &str = "endregion";

// ============================================================================
// SECTION: Types
// ============================================================================

/// A generated line with its indentation level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Indentation level, in units of [`INDENT_WIDTH`] spaces.
    pub level: usize,
    /// Line text without indentation or line ending.
    pub text: String,
}

impl Line {
    /// Creates a line at the given indentation level.
    #[must_use]
    pub fn new(level: usize, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    /// Creates a line at one indentation level.
    #[must_use]
    pub fn indented(text: impl Into<String>) -> Self {
        Self::new(1, text)
    }

    /// Renders the line with indentation and the given line ending.
    fn render(&self, newline: &str) -> String {
        format!("{}{}{newline}", indentation(self.level), self.text)
    }
}

/// Where a newly created region is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionPlacement {
    /// After the opening `@{` line, or at the start of the document.
    Start,
    /// Before the closing `}` line, or at the end of the document.
    #[default]
    End,
}

/// A named, delimited block of text.
///
/// # Invariants
/// - `open` and `close` are complete marker lines including line endings
///   (except a final `close` at end of file without a trailing newline).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Region {
    /// Region name taken from the open marker.
    name: String,
    /// Open marker line as written.
    open: String,
    /// Body text between the markers.
    body: String,
    /// Close marker line as written.
    close: String,
}

/// Document segment: unmanaged lines or a region.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Unmanaged lines, each including its line ending.
    Text(Vec<String>),
    /// Managed region.
    Region(Region),
}

/// Text document with independently replaceable named regions.
///
/// # Invariants
/// - No two `Segment::Text` entries are adjacent.
/// - Serialization reproduces every unmanaged byte as parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFile {
    /// Ordered document segments.
    segments: Vec<Segment>,
    /// Line ending used for generated lines.
    newline: &'static str,
}

// ============================================================================
// SECTION: Parsing and Serialization
// ============================================================================

impl RegionFile {
    /// Parses text into unmanaged segments and regions.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut open: Option<(String, String, Vec<String>)> = None;
        for line in text.split_inclusive('\n') {
            match open.take() {
                Some((name, open_line, body)) if is_close_marker(line) => {
                    segments.push(Segment::Region(Region {
                        name,
                        open: open_line,
                        body: body.concat(),
                        close: line.to_string(),
                    }));
                }
                Some((name, open_line, mut body)) => {
                    body.push(line.to_string());
                    open = Some((name, open_line, body));
                }
                None => match open_marker_name(line) {
                    Some(name) => open = Some((name.to_string(), line.to_string(), Vec::new())),
                    None => push_text(&mut segments, vec![line.to_string()]),
                },
            }
        }
        if let Some((_, open_line, body)) = open {
            let mut lines = Vec::with_capacity(body.len() + 1);
            lines.push(open_line);
            lines.extend(body);
            push_text(&mut segments, lines);
        }
        Self {
            segments,
            newline: detect_newline(text),
        }
    }

    /// Parses a module manifest, starting from [`PSD_SKELETON`] when the
    /// existing text is empty or whitespace-only.
    #[must_use]
    pub fn psd(text: &str) -> Self {
        if text.trim().is_empty() { Self::parse(PSD_SKELETON) } else { Self::parse(text) }
    }

    /// Serializes the full document.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(lines) => {
                    for line in lines {
                        out.push_str(line);
                    }
                }
                Segment::Region(region) => {
                    out.push_str(&region.open);
                    out.push_str(&region.body);
                    out.push_str(&region.close);
                }
            }
        }
        out
    }

    // ========================================================================
    // SECTION: Queries
    // ========================================================================

    /// Returns true when a region with the given name exists.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.region(name).is_some()
    }

    /// Returns the raw body text of the first region with the given name.
    #[must_use]
    pub fn region_body(&self, name: &str) -> Option<&str> {
        self.region(name).map(|region| region.body.as_str())
    }

    /// Lists region names in document order.
    #[must_use]
    pub fn region_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Region(region) => Some(region.name.as_str()),
                Segment::Text(_) => None,
            })
            .collect()
    }

    /// Finds the first region with the given name.
    fn region(&self, name: &str) -> Option<&Region> {
        self.segments.iter().find_map(|segment| match segment {
            Segment::Region(region) if region.name == name => Some(region),
            _ => None,
        })
    }

    // ========================================================================
    // SECTION: Mutation
    // ========================================================================

    /// Replaces the body of region `name`, creating it at `placement` when
    /// absent. Only the first region with a matching name is replaced.
    pub fn set_region(&mut self, name: &str, lines: &[Line], placement: RegionPlacement) {
        let body: String = lines.iter().map(|line| line.render(self.newline)).collect();
        for segment in &mut self.segments {
            if let Segment::Region(region) = segment
                && region.name == name
            {
                region.body = body;
                return;
            }
        }
        let region = Region {
            name: name.to_string(),
            open: format!("{}# {REGION_OPEN} {name}{}", indentation(1), self.newline),
            body,
            close: format!("{}# {REGION_CLOSE}{}", indentation(1), self.newline),
        };
        match placement {
            RegionPlacement::End => self.insert_at_end(region),
            RegionPlacement::Start => self.insert_at_start(region),
        }
    }

    /// Inserts a region before the closing hashtable brace.
    fn insert_at_end(&mut self, region: Region) {
        let Some((segment_index, line_index)) = self.find_text_line_rev(|line| line.trim() == "}")
        else {
            self.ensure_trailing_newline();
            if self.has_region_before(self.segments.len()) {
                push_text(&mut self.segments, vec![self.newline.to_string()]);
            }
            self.segments.push(Segment::Region(region));
            return;
        };
        let (before, after) = self.split_text(segment_index, line_index);
        let separator = self.has_region_before(segment_index)
            && before.last().is_none_or(|line| !line.trim().is_empty());
        let mut replacement = Vec::with_capacity(4);
        let mut leading = before;
        if separator {
            leading.push(self.newline.to_string());
        }
        if !leading.is_empty() {
            replacement.push(Segment::Text(leading));
        }
        replacement.push(Segment::Region(region));
        replacement.push(Segment::Text(after));
        self.replace_segment(segment_index, replacement);
    }

    /// Inserts a region after the opening `@{` line.
    fn insert_at_start(&mut self, region: Region) {
        let Some((segment_index, line_index)) =
            self.find_text_line(|line| line.trim_start().starts_with("@{"))
        else {
            self.segments.insert(0, Segment::Region(region));
            return;
        };
        let (before, after) = self.split_text(segment_index, line_index + 1);
        let mut replacement = vec![Segment::Text(before), Segment::Region(region)];
        if !after.is_empty() {
            replacement.push(Segment::Text(after));
        }
        self.replace_segment(segment_index, replacement);
    }

    /// Finds the first unmanaged line matching `predicate`.
    fn find_text_line(&self, predicate: impl Fn(&str) -> bool) -> Option<(usize, usize)> {
        self.segments.iter().enumerate().find_map(|(segment_index, segment)| match segment {
            Segment::Text(lines) => lines
                .iter()
                .position(|line| predicate(line.as_str()))
                .map(|line_index| (segment_index, line_index)),
            Segment::Region(_) => None,
        })
    }

    /// Finds the last unmanaged line matching `predicate`.
    fn find_text_line_rev(&self, predicate: impl Fn(&str) -> bool) -> Option<(usize, usize)> {
        self.segments.iter().enumerate().rev().find_map(|(segment_index, segment)| match segment {
            Segment::Text(lines) => lines
                .iter()
                .rposition(|line| predicate(line.as_str()))
                .map(|line_index| (segment_index, line_index)),
            Segment::Region(_) => None,
        })
    }

    /// Splits a text segment's lines at `line_index`.
    fn split_text(&self, segment_index: usize, line_index: usize) -> (Vec<String>, Vec<String>) {
        match self.segments.get(segment_index) {
            Some(Segment::Text(lines)) => {
                let (before, after) = lines.split_at(line_index.min(lines.len()));
                (before.to_vec(), after.to_vec())
            }
            _ => (Vec::new(), Vec::new()),
        }
    }

    /// Replaces one segment with a sequence of segments.
    fn replace_segment(&mut self, segment_index: usize, replacement: Vec<Segment>) {
        let tail = self.segments.split_off(segment_index + 1);
        self.segments.truncate(segment_index);
        self.segments.extend(replacement);
        self.segments.extend(tail);
    }

    /// Returns true when any region precedes `segment_index`.
    fn has_region_before(&self, segment_index: usize) -> bool {
        self.segments
            .iter()
            .take(segment_index)
            .any(|segment| matches!(segment, Segment::Region(_)))
    }

    /// Terminates the final line so appended text starts on a new line.
    fn ensure_trailing_newline(&mut self) {
        let newline = self.newline;
        match self.segments.last_mut() {
            Some(Segment::Text(lines)) => {
                if let Some(last) = lines.last_mut()
                    && !last.ends_with('\n')
                {
                    last.push_str(newline);
                }
            }
            Some(Segment::Region(region)) => {
                if !region.close.ends_with('\n') {
                    region.close.push_str(newline);
                }
            }
            None => {}
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Appends unmanaged lines, merging with a trailing text segment.
fn push_text(segments: &mut Vec<Segment>, lines: Vec<String>) {
    if let Some(Segment::Text(existing)) = segments.last_mut() {
        existing.extend(lines);
    } else {
        segments.push(Segment::Text(lines));
    }
}

/// Returns the region name when `line` is an open marker.
fn open_marker_name(line: &str) -> Option<&str> {
    let rest = marker_keyword(line)?.strip_prefix(REGION_OPEN)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.trim();
    (!name.is_empty()).then_some(name)
}

/// Returns true when `line` is a close marker.
fn is_close_marker(line: &str) -> bool {
    marker_keyword(line)
        .and_then(|rest| rest.strip_prefix(REGION_CLOSE))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Strips indentation and the comment leader from a marker candidate.
fn marker_keyword(line: &str) -> Option<&str> {
    line.trim().strip_prefix('#').map(str::trim_start)
}

/// Detects the document's line ending from its first line.
fn detect_newline(text: &str) -> &'static str {
    match text.find('\n') {
        Some(index) if index > 0 && text.as_bytes().get(index - 1) == Some(&b'\r') => "\r\n",
        _ => "\n",
    }
}

/// Returns the indentation prefix for a level.
fn indentation(level: usize) -> String {
    " ".repeat(level * INDENT_WIDTH)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn open_marker_accepts_spaced_and_compact_forms() {
        assert_eq!(open_marker_name("  # region definition\n"), Some("definition"));
        assert_eq!(open_marker_name("#region persistent data\r\n"), Some("persistent data"));
        assert_eq!(open_marker_name("# regional settings\n"), None);
        assert_eq!(open_marker_name("# region\n"), None);
        assert_eq!(open_marker_name("RootModule = 'x'\n"), None);
    }

    #[test]
    fn close_marker_requires_keyword_boundary() {
        assert!(is_close_marker("  # endregion\n"));
        assert!(is_close_marker("#endregion"));
        assert!(!is_close_marker("# endregions\n"));
        assert!(!is_close_marker("# region x\n"));
    }

    #[test]
    fn detect_newline_reads_first_line() {
        assert_eq!(detect_newline("@{\r\n}\r\n"), "\r\n");
        assert_eq!(detect_newline("@{\n}\r\n"), "\n");
        assert_eq!(detect_newline(""), "\n");
        assert_eq!(detect_newline("\n"), "\n");
    }

    #[test]
    fn unterminated_region_is_unmanaged_text() {
        let text = "@{\n  # region definition\n  A = 'b'\n}\n";
        let file = RegionFile::parse(text);
        assert!(!file.has("definition"));
        assert_eq!(file.text(), text);
        assert_eq!(file.segments.len(), 1);
    }

    #[test]
    fn nested_open_marker_is_body_text() {
        let text = "# region outer\n# region inner\nx\n# endregion\n";
        let file = RegionFile::parse(text);
        assert_eq!(file.region_names(), vec!["outer"]);
        assert_eq!(file.region_body("outer"), Some("# region inner\nx\n"));
    }

    #[test]
    fn start_placement_follows_hashtable_open() {
        let mut file = RegionFile::psd("");
        file.set_region("first", &[Line::indented("A = 'a'")], RegionPlacement::Start);
        assert_eq!(file.text(), "@{\n  # region first\n  A = 'a'\n  # endregion\n}\n");
    }

    #[test]
    fn start_placement_without_hashtable_prepends() {
        let mut file = RegionFile::parse("tail\n");
        file.set_region("head", &[Line::new(0, "x")], RegionPlacement::Start);
        assert_eq!(file.text(), "  # region head\nx\n  # endregion\ntail\n");
    }

    #[test]
    fn end_placement_without_brace_terminates_last_line() {
        let mut file = RegionFile::parse("no newline");
        file.set_region("r", &[Line::new(0, "x")], RegionPlacement::End);
        assert_eq!(file.text(), "no newline\n  # region r\nx\n  # endregion\n");
    }

    #[test]
    fn duplicate_region_names_replace_first_only() {
        let mut file = RegionFile::parse("# region a\nx\n# endregion\n# region a\ny\n# endregion\n");
        assert!(file.has("a"));
        file.set_region("a", &[Line::new(0, "z")], RegionPlacement::End);
        assert!(file.has("a"));
        assert_eq!(file.region_names(), vec!["a", "a"]);
        assert_eq!(file.text(), "# region a\nz\n# endregion\n# region a\ny\n# endregion\n");
    }
}
