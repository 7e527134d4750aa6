//! Fenced code block extraction.
//!
//! Grammar, line oriented:
//!
//! ```text
//! block    := fence-open body fence-close?
//! fence-open  := ws* "```" lang? (ws+ name-comment)? "\n"
//! fence-close := ws* "```" ...
//! body     := (name-comment "\n")? code
//! ```
//!
//! A name comment is `# name`, `// name`, `-- name`, `/* name */` or
//! `<!-- name -->` where `name` uses only `[A-Za-z0-9_./-]` and carries an
//! extension.
//! An unclosed block runs to the end of the text. A fence line with no
//! newline after it is not a block.

/// A file recovered from a fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFile {
    pub name: String,
    pub content: String,
}

impl CodeFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, PartialEq)]
struct FencedBlock<'a> {
    lang: Option<&'a str>,
    name: Option<&'a str>,
    code: &'a str,
}

/// Extract every fenced block as a named file.
///
/// Blocks without a name comment are named after their language tag: the
/// first one becomes `main.<ext>`, later ones `file<i>.<ext>` where `i` is
/// the block's position. When two blocks resolve to the same name the later
/// block's content wins.
pub fn extract_code_files(text: &str) -> Vec<CodeFile> {
    let mut files: Vec<CodeFile> = Vec::new();
    let mut main_assigned = false;

    for (index, block) in fenced_blocks(text).into_iter().enumerate() {
        let name = match block.name {
            Some(name) => name.to_string(),
            None => {
                let ext = extension_for(block.lang);
                if main_assigned {
                    format!("file{}.{}", index, ext)
                } else {
                    main_assigned = true;
                    format!("main.{}", ext)
                }
            }
        };
        let content = block.code.trim().to_string();

        match files.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.content = content,
            None => files.push(CodeFile::new(name, content)),
        }
    }

    files
}

/// Default file extension for a fence language tag.
pub fn extension_for(lang: Option<&str>) -> &'static str {
    let Some(lang) = lang else {
        return "txt";
    };
    match lang.to_ascii_lowercase().as_str() {
        "python" | "py" => "py",
        "javascript" | "js" | "node" => "js",
        "typescript" | "ts" => "ts",
        "html" => "html",
        "css" => "css",
        "java" => "java",
        "cpp" | "c++" => "cpp",
        "c" => "c",
        "rust" | "rs" => "rs",
        "sh" | "bash" | "shell" => "sh",
        "json" => "json",
        _ => "txt",
    }
}

fn fenced_blocks(text: &str) -> Vec<FencedBlock<'_>> {
    let mut blocks = Vec::new();
    let mut remaining = text;

    while let Some(fence_start) = find_code_fence_start(remaining) {
        let after_fence = &remaining[fence_start..];
        match parse_code_block(after_fence) {
            Some((block, end_pos)) => {
                blocks.push(block);
                remaining = &after_fence[end_pos..];
            }
            None => remaining = &after_fence[3..],
        }
    }

    blocks
}

/// Position of the first ``` that begins a line (after leading whitespace).
fn find_code_fence_start(text: &str) -> Option<usize> {
    let mut pos = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            return Some(pos + (line.len() - trimmed.len()));
        }
        pos += line.len();
    }
    None
}

/// Parse a block starting at its opening fence. Returns the block and the
/// offset just past the closing fence line.
fn parse_code_block(text: &str) -> Option<(FencedBlock<'_>, usize)> {
    let first_line_end = text.find('\n')?;
    let info = text[3..first_line_end].trim();
    let (lang, mut name) = parse_fence_info(info);

    let mut body_start = first_line_end + 1;
    if name.is_none() {
        let body = &text[body_start..];
        let first_body_line = body.split('\n').next().unwrap_or("");
        if let Some(found) = filename_from_comment(first_body_line) {
            name = Some(found);
            body_start += (first_body_line.len() + 1).min(body.len());
        }
    }

    let body = &text[body_start..];
    let mut search_pos = 0;
    for line in body.split_inclusive('\n') {
        if line.trim_start().starts_with("```") {
            let code = &body[..search_pos];
            let end = body_start + search_pos + line.len();
            return Some((FencedBlock { lang, name, code }, end));
        }
        search_pos += line.len();
    }

    // Unclosed: the rest of the text is code.
    Some((FencedBlock { lang, name, code: body }, text.len()))
}

/// Split the text after the opening backticks into a language tag and an
/// optional name comment.
fn parse_fence_info(info: &str) -> (Option<&str>, Option<&str>) {
    if info.is_empty() {
        return (None, None);
    }
    if let Some(name) = filename_from_comment(info) {
        return (None, Some(name));
    }

    let mut parts = info.splitn(2, char::is_whitespace);
    let lang = parts.next().filter(|l| !l.is_empty());
    let name = parts.next().and_then(|rest| filename_from_comment(rest.trim()));
    (lang, name)
}

/// The filename in a comment such as `# main.py` or `<!-- index.html -->`.
fn filename_from_comment(line: &str) -> Option<&str> {
    let line = line.trim();
    let inner = if let Some(rest) = line.strip_prefix("<!--") {
        rest.strip_suffix("-->")?
    } else if let Some(rest) = line.strip_prefix("/*") {
        rest.strip_suffix("*/")?
    } else if let Some(rest) = line.strip_prefix("//") {
        rest
    } else if let Some(rest) = line.strip_prefix("--") {
        rest
    } else if let Some(rest) = line.strip_prefix('#') {
        rest
    } else {
        return None;
    };

    let candidate = inner.trim();
    if candidate.is_empty() || !candidate.chars().all(is_filename_char) {
        return None;
    }

    let file_name = candidate.rsplit('/').next().unwrap_or(candidate);
    match file_name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < file_name.len() => Some(candidate),
        _ => None,
    }
}

fn is_filename_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-')
}
