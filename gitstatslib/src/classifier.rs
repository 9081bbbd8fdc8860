//! Line classification.
//!
//! Each line of a file is tagged as empty, comment or code. The classifier
//! is a small state machine driven by the comment markers of a language:
//! a line marker (`//`), and an optional block pair (`/*`, `*/`).
//!
//! Block markers are handled in one of two ways:
//!
//! - **free-form**: markers may appear anywhere on a line, and a line is code
//!   as soon as any non-blank text sits outside a comment
//! - **anchored**: markers only count at the start of the trimmed line
//!   (TeX `\begin{comment}` environments)

use std::fmt;

use serde::Serialize;

/// Category of a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum LineType {
    Empty,
    Comment,
    Code,
}

impl LineType {
    /// All line types, in report order.
    pub const ALL: [LineType; 3] = [LineType::Code, LineType::Comment, LineType::Empty];

    /// Name used as the dimension value.
    pub fn name(self) -> &'static str {
        match self {
            LineType::Empty => "Empty",
            LineType::Comment => "Comment",
            LineType::Code => "Code",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Empty" => Some(LineType::Empty),
            "Comment" => Some(LineType::Comment),
            "Code" => Some(LineType::Code),
            _ => None,
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comment markers of a language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentSyntax {
    /// Marker starting a comment that runs to the end of the line
    pub line: Option<String>,
    /// Begin and end markers of a block comment
    pub block: Option<(String, String)>,
    /// Block markers only count at the start of a line
    pub anchored: bool,
}

impl CommentSyntax {
    /// A language with no comments at all: every non-blank line is code.
    pub fn none() -> Self {
        Self::default()
    }

    /// Line comments only.
    pub fn line(marker: &str) -> Self {
        Self {
            line: Some(marker.to_string()),
            ..Self::default()
        }
    }

    /// Block comments only.
    pub fn block(begin: &str, end: &str) -> Self {
        Self {
            block: Some((begin.to_string(), end.to_string())),
            ..Self::default()
        }
    }

    /// Block and line comments.
    pub fn block_and_line(begin: &str, end: &str, line: &str) -> Self {
        Self {
            line: Some(line.to_string()),
            block: Some((begin.to_string(), end.to_string())),
            anchored: false,
        }
    }

    /// Make the block markers count only at the start of a line.
    pub fn anchored(mut self) -> Self {
        self.anchored = true;
        self
    }

    /// Create a classifier for one file.
    pub fn classifier(&self) -> LineClassifier<'_> {
        LineClassifier::new(self)
    }
}

/// How block markers are matched, chosen once per classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
    None,
    Anchored,
    FreeForm,
}

/// Per-file classifier. Feed it the lines of one file in order.
#[derive(Debug, Clone)]
pub struct LineClassifier<'a> {
    syntax: &'a CommentSyntax,
    policy: Policy,
    inside_comment: bool,
}

impl<'a> LineClassifier<'a> {
    pub fn new(syntax: &'a CommentSyntax) -> Self {
        let policy = match (&syntax.block, syntax.anchored) {
            (None, _) => Policy::None,
            (Some(_), true) => Policy::Anchored,
            (Some(_), false) => Policy::FreeForm,
        };
        Self {
            syntax,
            policy,
            inside_comment: false,
        }
    }

    /// True while a block comment opened on a previous line is still open.
    pub fn is_inside_comment(&self) -> bool {
        self.inside_comment
    }

    /// Classify the next line of the file.
    pub fn classify(&mut self, line: &str) -> LineType {
        let line = line.trim();
        if line.is_empty() {
            return LineType::Empty;
        }

        if let Some(marker) = &self.syntax.line {
            if line.starts_with(marker.as_str()) {
                return LineType::Comment;
            }
        }

        let Some((begin, end)) = &self.syntax.block else {
            return LineType::Code;
        };

        match self.policy {
            Policy::None => LineType::Code,
            Policy::Anchored => self.classify_anchored(line, begin, end),
            Policy::FreeForm => self.classify_free_form(line, begin, end),
        }
    }

    fn classify_anchored(&mut self, line: &str, begin: &str, end: &str) -> LineType {
        if self.inside_comment {
            return match line.strip_prefix(end) {
                Some(rest) => {
                    self.inside_comment = false;
                    if rest.is_empty() {
                        LineType::Comment
                    } else {
                        LineType::Code
                    }
                }
                None => LineType::Comment,
            };
        }

        if line.starts_with(begin) {
            self.inside_comment = true;
            LineType::Comment
        } else {
            LineType::Code
        }
    }

    fn classify_free_form(&mut self, line: &str, begin: &str, end: &str) -> LineType {
        let mut has_code = false;
        let mut has_comment = false;
        let mut pos = 0;

        while pos < line.len() {
            let rest = &line[pos..];
            if self.inside_comment {
                has_comment = true;
                match rest.find(end) {
                    Some(i) => {
                        pos += i + end.len();
                        self.inside_comment = false;
                    }
                    None => pos = line.len(),
                }
            } else {
                match rest.find(begin) {
                    Some(i) => {
                        has_code |= !rest[..i].trim().is_empty();
                        has_comment = true;
                        pos += i + begin.len();
                        self.inside_comment = true;
                    }
                    None => {
                        has_code |= !rest.trim().is_empty();
                        pos = line.len();
                    }
                }
            }
        }

        if has_code || !has_comment {
            LineType::Code
        } else {
            LineType::Comment
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LineType::*;

    fn c_syntax() -> CommentSyntax {
        CommentSyntax::block_and_line("/*", "*/", "//")
    }

    fn tex_syntax() -> CommentSyntax {
        CommentSyntax::block_and_line("\\begin{comment}", "\\end{comment}", "%").anchored()
    }

    fn classify_all(syntax: &CommentSyntax, lines: &[&str]) -> Vec<LineType> {
        let mut classifier = syntax.classifier();
        lines.iter().map(|l| classifier.classify(l)).collect()
    }

    #[test]
    fn test_empty_and_code() {
        let c = c_syntax();
        assert_eq!(classify_all(&c, &["", "   \t", "a"]), vec![Empty, Empty, Code]);
    }

    #[test]
    fn test_line_comment() {
        let c = c_syntax();
        assert_eq!(classify_all(&c, &["//a"]), vec![Comment]);
        assert_eq!(classify_all(&c, &["  // indented"]), vec![Comment]);
        assert_eq!(classify_all(&c, &["a //a"]), vec![Code]);
    }

    #[test]
    fn test_block_start() {
        let c = c_syntax();
        assert_eq!(classify_all(&c, &["/*a"]), vec![Comment]);
        assert_eq!(classify_all(&c, &["a/*a"]), vec![Code]);
    }

    #[test]
    fn test_block_spanning_lines() {
        let c = c_syntax();
        assert_eq!(classify_all(&c, &["/*", "a", "*/"]), vec![Comment, Comment, Comment]);
        assert_eq!(
            classify_all(&c, &["/*", "a", "*/", "a"]),
            vec![Comment, Comment, Comment, Code]
        );
        assert_eq!(classify_all(&c, &["/*", "a", "*/b"]), vec![Comment, Comment, Code]);
        assert_eq!(classify_all(&c, &["/*", "*/a"]), vec![Comment, Code]);
    }

    #[test]
    fn test_several_blocks_on_one_line() {
        let c = c_syntax();
        assert_eq!(classify_all(&c, &["/**//**//**/"]), vec![Comment]);
        assert_eq!(classify_all(&c, &["  /* x*/\t/*b*/ /* a */"]), vec![Comment]);
        assert_eq!(classify_all(&c, &["/**/a/**/"]), vec![Code]);
    }

    #[test]
    fn test_code_between_blocks() {
        let c = c_syntax();
        assert_eq!(classify_all(&c, &["/*", "*/a/*", "*/"]), vec![Comment, Code, Comment]);
    }

    #[test]
    fn test_nested_begin_is_ignored() {
        let c = c_syntax();
        let mut classifier = c.classifier();
        assert_eq!(classifier.classify("/*a/*b*/"), Comment);
        assert!(!classifier.is_inside_comment());
    }

    #[test]
    fn test_end_before_begin() {
        let c = c_syntax();
        let mut classifier = c.classifier();
        assert_eq!(classifier.classify("*//*"), Code);
        assert!(classifier.is_inside_comment());
    }

    #[test]
    fn test_same_begin_and_end_marker() {
        let python = CommentSyntax::block_and_line("\"\"\"", "\"\"\"", "#");
        assert_eq!(
            classify_all(&python, &["\"\"\"doc\"\"\"", "x = 1", "\"\"\"", "text", "\"\"\""]),
            vec![Comment, Code, Comment, Comment, Comment]
        );
    }

    #[test]
    fn test_anchored_block() {
        let tex = tex_syntax();
        assert_eq!(classify_all(&tex, &["a"]), vec![Code]);
        assert_eq!(classify_all(&tex, &["a\\begin{comment}"]), vec![Code]);
        assert_eq!(
            classify_all(&tex, &["\\begin{comment}", "a", "\\end{comment}", "a"]),
            vec![Comment, Comment, Comment, Code]
        );
        assert_eq!(
            classify_all(&tex, &["\\begin{comment}", "\\end{comment}a"]),
            vec![Comment, Code]
        );
    }

    #[test]
    fn test_anchored_markers_mid_line() {
        let syntax = CommentSyntax::block("[[comment]]", "[[/comment]]").anchored();
        assert_eq!(
            classify_all(&syntax, &["[[comment]]", "a", "[[/comment]]"]),
            vec![Comment, Comment, Comment]
        );
        assert_eq!(classify_all(&syntax, &["a[[comment]]"]), vec![Code]);
        // End marker not at the start keeps the comment open
        assert_eq!(
            classify_all(&syntax, &["[[comment]]", "a[[/comment]]", "b"]),
            vec![Comment, Comment, Comment]
        );
    }

    #[test]
    fn test_anchored_line_comment() {
        let tex = tex_syntax();
        assert_eq!(classify_all(&tex, &["%a"]), vec![Comment]);
        assert_eq!(classify_all(&tex, &["a%a"]), vec![Code]);
    }

    #[test]
    fn test_no_markers() {
        let none = CommentSyntax::none();
        assert_eq!(classify_all(&none, &["// x", "/* y */", ""]), vec![Code, Code, Empty]);
    }

    #[test]
    fn test_line_type_names() {
        for t in LineType::ALL {
            assert_eq!(LineType::from_name(t.name()), Some(t));
            assert_eq!(t.to_string(), t.name());
        }
        assert_eq!(LineType::from_name("code"), None);
    }
}
