//! Language detection and per-language comment syntax.
//!
//! [`LanguageTable`] is built once at startup and shared by reference with
//! the pipeline workers. Detection looks, in order, at the lowercased file
//! name (`Makefile`, `pom.xml`), the double extension (`sproc.sql`) and the
//! plain extension.

use std::collections::HashMap;
use std::path::Path;

use crate::classifier::{CommentSyntax, LineClassifier};

const C_FAMILY: &[&str] = &[
    "C",
    "C++",
    "C/C++ Header",
    "Java",
    "PHP",
    "OpenGL Shading Language",
    "Javascript",
    "TypeScript",
    "Scala",
    "C#",
    "Go",
    "Rust",
    "Kotlin",
    "Swift",
    "Groovy",
    "Dart",
    "CSS",
];

const MARKUP: &[&str] = &["HTML", "JSP", "XML", "Ant", "Maven"];

const SQL: &[&str] = &["SQL", "SQL Stored Procedure", "SQL Data"];

const HASH_COMMENTS: &[&str] = &[
    "Perl",
    "GNU Gettext",
    "Bourne Shell",
    "Bourne Again Shell",
    "C Shell",
    "Korn Shell",
    "make",
    "CMake",
    "YAML",
    "TOML",
    "R",
];

const EXTENSIONS: &[(&str, &str)] = &[
    ("ada", "Ada"),
    ("adb", "Ada"),
    ("ads", "Ada"),
    ("bash", "Bourne Again Shell"),
    ("c", "C"),
    ("cc", "C++"),
    ("cpp", "C++"),
    ("cxx", "C++"),
    ("cmake", "CMake"),
    ("cs", "C#"),
    ("csh", "C Shell"),
    ("css", "CSS"),
    ("dart", "Dart"),
    ("data.sql", "SQL Data"),
    ("frag", "OpenGL Shading Language"),
    ("glsl", "OpenGL Shading Language"),
    ("go", "Go"),
    ("groovy", "Groovy"),
    ("h", "C/C++ Header"),
    ("hh", "C/C++ Header"),
    ("hpp", "C/C++ Header"),
    ("hs", "Haskell"),
    ("htm", "HTML"),
    ("html", "HTML"),
    ("java", "Java"),
    ("js", "Javascript"),
    ("jsp", "JSP"),
    ("kt", "Kotlin"),
    ("ksh", "Korn Shell"),
    ("lhs", "Haskell"),
    ("ml", "ML"),
    ("mli", "ML"),
    ("php", "PHP"),
    ("php3", "PHP"),
    ("php4", "PHP"),
    ("php5", "PHP"),
    ("pl", "Perl"),
    ("pm", "Perl"),
    ("po", "GNU Gettext"),
    ("pot", "GNU Gettext"),
    ("psql", "SQL"),
    ("py", "Python"),
    ("r", "R"),
    ("rb", "Ruby"),
    ("rs", "Rust"),
    ("scala", "Scala"),
    ("sh", "Bourne Shell"),
    ("spc.sql", "SQL Stored Procedure"),
    ("sproc.sql", "SQL Stored Procedure"),
    ("sql", "SQL"),
    ("swift", "Swift"),
    ("tex", "Tex"),
    ("toml", "TOML"),
    ("ts", "TypeScript"),
    ("udf.sql", "SQL Stored Procedure"),
    ("vert", "OpenGL Shading Language"),
    ("xml", "XML"),
    ("yaml", "YAML"),
    ("yml", "YAML"),
];

const FILENAMES: &[(&str, &str)] = &[
    ("makefile", "make"),
    ("gnumakefile", "make"),
    ("cmakelists.txt", "CMake"),
    ("build.xml", "Ant"),
    ("pom.xml", "Maven"),
];

/// Maps file names to languages and languages to comment syntax.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    syntaxes: HashMap<String, CommentSyntax>,
    extensions: HashMap<String, String>,
    filenames: HashMap<String, String>,
    plain: CommentSyntax,
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LanguageTable {
    /// A table with no languages.
    pub fn empty() -> Self {
        Self {
            syntaxes: HashMap::new(),
            extensions: HashMap::new(),
            filenames: HashMap::new(),
            plain: CommentSyntax::none(),
        }
    }

    /// The built-in languages.
    pub fn builtin() -> Self {
        let mut table = Self::empty();

        let c = CommentSyntax::block_and_line("/*", "*/", "//");
        for lang in C_FAMILY {
            table = table.with_language(lang, c.clone());
        }
        let markup = CommentSyntax::block("<!--", "-->");
        for lang in MARKUP {
            table = table.with_language(lang, markup.clone());
        }
        let sql = CommentSyntax::block_and_line("/*", "*/", "--");
        for lang in SQL {
            table = table.with_language(lang, sql.clone());
        }
        for lang in HASH_COMMENTS {
            table = table.with_language(lang, CommentSyntax::line("#"));
        }

        table = table
            .with_language("Haskell", CommentSyntax::block_and_line("{-", "-}", "--"))
            .with_language("Python", CommentSyntax::block_and_line("\"\"\"", "\"\"\"", "#"))
            .with_language("Ruby", CommentSyntax::block_and_line("=begin", "=end", "#"))
            .with_language(
                "Tex",
                CommentSyntax::block_and_line("\\begin{comment}", "\\end{comment}", "%").anchored(),
            )
            .with_language("Ada", CommentSyntax::line("--"))
            .with_language("ML", CommentSyntax::block("(*", "*)"));

        for (ext, lang) in EXTENSIONS {
            table = table.with_extension(ext, lang);
        }
        for (name, lang) in FILENAMES {
            table.filenames.insert(name.to_string(), lang.to_string());
        }

        table
    }

    /// Register (or replace) the comment syntax of a language.
    pub fn with_language(mut self, language: &str, syntax: CommentSyntax) -> Self {
        self.syntaxes.insert(language.to_string(), syntax);
        self
    }

    /// Map an extension (without the leading dot, case-insensitive) to a
    /// language. Unknown languages are allowed; their lines have no comments.
    pub fn with_extension(mut self, extension: &str, language: &str) -> Self {
        let extension = extension.trim_start_matches('.').to_lowercase();
        self.extensions.insert(extension, language.to_string());
        self
    }

    /// Language of a file, if known.
    pub fn detect(&self, path: &str) -> Option<&str> {
        let name = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path)
            .to_lowercase();

        if let Some(lang) = self.filenames.get(&name) {
            return Some(lang.as_str());
        }

        let mut dots = name.rmatch_indices('.').map(|(i, _)| i);
        let last = dots.next()?;
        if let Some(previous) = dots.next() {
            if let Some(lang) = self.extensions.get(&name[previous + 1..]) {
                return Some(lang.as_str());
            }
        }
        self.extensions.get(&name[last + 1..]).map(String::as_str)
    }

    /// True if the file belongs to a known language.
    pub fn is_known_type(&self, path: &str) -> bool {
        self.detect(path).is_some()
    }

    /// Comment syntax of a language. Unknown languages have none.
    pub fn syntax(&self, language: &str) -> &CommentSyntax {
        self.syntaxes.get(language).unwrap_or(&self.plain)
    }

    /// A fresh classifier for a language.
    pub fn classifier(&self, language: &str) -> LineClassifier<'_> {
        LineClassifier::new(self.syntax(language))
    }
}
