use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::problem::{
    CodeCapture, Difficulty, EditorModelSnapshot, Platform, ProblemModel, RawPageSnapshot,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("page produced no readable content")]
    EmptyPage,
    #[error("unsupported page: {0}")]
    UnsupportedPage(String),
}

const TUF_STATEMENT_MIN_LEN: usize = 80;
const TUF_PARAGRAPH_MIN_LEN: usize = 20;
const TUF_GREEDY_CHILD_CAP: usize = 20;
const TUF_GREEDY_SIZE_BOUND: usize = 5000;
const TUF_DESCRIPTION_CAP_CHARS: usize = 800;
const TUF_TAG_CAP: usize = 10;

/// Build a normalized problem model from a page snapshot. Individual fields
/// degrade silently to their documented defaults; the whole extraction fails
/// only when the platform cannot be identified or the page carries no
/// readable text at all.
pub fn extract(snapshot: &RawPageSnapshot) -> Result<ProblemModel, ExtractError> {
    let platform = Platform::detect(&snapshot.url)
        .ok_or_else(|| ExtractError::UnsupportedPage(snapshot.url.clone()))?;
    let document = Html::parse_document(&snapshot.html);
    if page_is_empty(&document) {
        return Err(ExtractError::EmptyPage);
    }

    let (title, difficulty, statement, tags) = match platform {
        Platform::LeetCode => (
            leetcode_title(&document),
            leetcode_difficulty(&document),
            leetcode_statement(&document),
            leetcode_tags(&document),
        ),
        Platform::TakeUForward => (
            tuf_title(&document),
            tuf_difficulty(&document),
            tuf_statement(&document),
            tuf_tags(&document),
        ),
    };

    let (description, examples, constraints) = match statement {
        Some(raw) => partition_statement(&raw, platform),
        None => (String::new(), Vec::new(), None),
    };

    let capture = capture_code(snapshot, &document);
    Ok(ProblemModel {
        platform,
        title,
        difficulty,
        description,
        examples,
        constraints,
        tags,
        user_code: capture.user_code,
        language: capture.language,
    })
}

/// Re-run only the code+language branch for a mid-session re-read. The caller
/// merges the capture into its existing model.
pub fn extract_code_refresh(snapshot: &RawPageSnapshot) -> CodeCapture {
    let document = Html::parse_document(&snapshot.html);
    capture_code(snapshot, &document)
}

fn page_is_empty(document: &Html) -> bool {
    let Some(body) = select_first(document, "body") else {
        return true;
    };
    element_text(body).trim().is_empty()
}

// ---------------------------------------------------------------------------
// Selector plumbing
// ---------------------------------------------------------------------------

fn select_first<'a>(document: &'a Html, raw: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(raw).ok()?;
    document.select(&selector).next()
}

/// Ordered candidate lookup: first selector that yields non-empty text wins.
fn first_non_empty_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        if let Some(element) = select_first(document, raw) {
            let text = element_text(element).trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Visible-text approximation: descendant text nodes with newlines at block
/// boundaries, scripts and styles skipped.
fn element_text(element: ElementRef) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    collapse_blank_runs(&out)
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if name == "script" || name == "style" {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if is_block_tag(name) && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "li"
            | "ul"
            | "ol"
            | "pre"
            | "blockquote"
            | "section"
            | "article"
            | "tr"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
    )
}

fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
        } else {
            blank_run = 0;
            out.push_str(trimmed);
            out.push('\n');
        }
    }
    out.trim_end().to_string()
}

fn page_title(document: &Html) -> Option<String> {
    let element = select_first(document, "title")?;
    let text = element.text().collect::<String>().trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

// ---------------------------------------------------------------------------
// LeetCode ruleset
// ---------------------------------------------------------------------------

fn leetcode_title(document: &Html) -> String {
    first_non_empty_text(
        document,
        &[r#"[data-cy="question-title"]"#, "h1", ".text-title-large"],
    )
    .or_else(|| {
        page_title(document).map(|title| title.replace(" - LeetCode", "").trim().to_string())
    })
    .unwrap_or_default()
}

fn leetcode_difficulty(document: &Html) -> Difficulty {
    first_non_empty_text(
        document,
        &[
            ".text-difficulty-easy",
            ".text-difficulty-medium",
            ".text-difficulty-hard",
            r#"[class*="difficulty"]"#,
        ],
    )
    .map(|label| Difficulty::from_label(&label))
    .unwrap_or(Difficulty::Unknown)
}

fn leetcode_statement(document: &Html) -> Option<String> {
    first_non_empty_text(
        document,
        &[
            r#"[data-track-load="description_content"]"#,
            ".elfjS",
            ".question-content__JfgR",
            r#"[class*="question-content"]"#,
        ],
    )
}

fn leetcode_tags(document: &Html) -> Vec<String> {
    let mut tags = Vec::new();
    for raw in [r#"[class*="topic-tag"]"#, r#"a[href*="/tag/"]"#] {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element_text(element).trim().to_string();
            if !text.is_empty() && !tags.contains(&text) {
                tags.push(text);
            }
        }
    }
    tags
}

// ---------------------------------------------------------------------------
// TakeUForward ruleset
// ---------------------------------------------------------------------------

fn tuf_title(document: &Html) -> String {
    let heading = Selector::parse("h1, h2").ok().and_then(|selector| {
        document.select(&selector).find_map(|element| {
            let text = element_text(element).trim().to_string();
            let len = text.chars().count();
            if len > 2 && len < 120 { Some(text) } else { None }
        })
    });
    heading
        .or_else(|| {
            page_title(document).map(|title| {
                let cut = title.find(['-', '|']).unwrap_or(title.len());
                title[..cut].trim().to_string()
            })
        })
        .unwrap_or_default()
}

/// Scan leaf elements for an exact easy/medium/hard label; larger containers
/// would match incidental prose.
fn tuf_difficulty(document: &Html) -> Difficulty {
    let Ok(selector) = Selector::parse("span, p, div, button, li") else {
        return Difficulty::Unknown;
    };
    for element in document.select(&selector) {
        if element.children().any(|child| child.value().is_element()) {
            continue;
        }
        match element_text(element).trim().to_lowercase().as_str() {
            "easy" => return Difficulty::Easy,
            "medium" => return Difficulty::Medium,
            "hard" => return Difficulty::Hard,
            _ => {}
        }
    }
    Difficulty::Unknown
}

fn tuf_statement(document: &Html) -> Option<String> {
    let candidates = [
        r#"[class*="problem-statement"]"#,
        r#"[class*="problemStatement"]"#,
        r#"[class*="prose"]"#,
        r#"[class*="description"]"#,
        r#"[class*="markdown"]"#,
        "article",
    ];
    for raw in candidates {
        if let Some(element) = select_first(document, raw) {
            let text = element_text(element).trim().to_string();
            if text.chars().count() > TUF_STATEMENT_MIN_LEN {
                return Some(text);
            }
        }
    }
    tuf_statement_from_paragraphs(document).or_else(|| tuf_statement_greedy(document))
}

fn tuf_statement_from_paragraphs(document: &Html) -> Option<String> {
    let main = select_first(document, r#"main, [role="main"]"#)?;
    let paragraph = Selector::parse("p").ok()?;
    let paragraphs: Vec<String> = main
        .select(&paragraph)
        .map(|p| element_text(p).trim().to_string())
        .filter(|text| text.chars().count() > TUF_PARAGRAPH_MIN_LEN)
        .collect();
    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n\n"))
    }
}

/// Last resort: the largest text block under a shallow child-count cap,
/// bounded above to reject whole-page containers.
fn tuf_statement_greedy(document: &Html) -> Option<String> {
    let selector = Selector::parse("div").ok()?;
    let mut best: Option<String> = None;
    let mut best_len = 0usize;
    for element in document.select(&selector) {
        let child_elements = element
            .children()
            .filter(|child| child.value().is_element())
            .count();
        if child_elements > TUF_GREEDY_CHILD_CAP {
            continue;
        }
        let text = element_text(element).trim().to_string();
        let len = text.chars().count();
        if len > best_len && len < TUF_GREEDY_SIZE_BOUND {
            best_len = len;
            best = Some(text);
        }
    }
    best.filter(|text| !text.is_empty())
}

fn tuf_tags(document: &Html) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for raw in [
        r#"[class*="tag"]"#,
        r#"[class*="chip"]"#,
        r#"[class*="badge"]"#,
        r#"[class*="topic"]"#,
    ] {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element_text(element).trim().to_string();
            let len = text.chars().count();
            if len > 1 && len < 40 && !text.chars().all(|c| c.is_ascii_digit())
                && !tags.contains(&text)
            {
                tags.push(text);
            }
        }
    }
    tags.truncate(TUF_TAG_CAP);
    tags
}

// ---------------------------------------------------------------------------
// Statement partitioning
// ---------------------------------------------------------------------------

/// Split a raw statement into (description, examples, constraints). The
/// description ends at the first example or constraints marker, so the three
/// parts partition the source text rather than duplicating it.
fn partition_statement(
    raw: &str,
    platform: Platform,
) -> (String, Vec<String>, Option<String>) {
    let (example_marker, description_marker, constraints_marker, terminator, trailer) =
        match platform {
            Platform::LeetCode => (
                r"(?i)Example \d+\s*:",
                r"(?im)^\s*Example \d",
                r"(?i)Constraints\s*:",
                r"(?i)Constraints\s*:",
                r"(?i)follow[ -]?up",
            ),
            Platform::TakeUForward => (
                r"(?i)Example\s*\d*\s*:",
                r"(?im)^\s*(Example\s*\d*\s*:|Input\s*:)",
                r"(?i)Constraints\s*:",
                r"(?i)(Constraints\s*:|Note\s*:)",
                r"(?im)^\s*(Note|Follow[ -]?up)\s*:",
            ),
        };

    let example_re = compile(example_marker);
    let description_re = compile(description_marker);
    let constraints_re = compile(constraints_marker);
    let terminator_re = compile(terminator);
    let trailer_re = compile(trailer);

    let description = {
        let example_cut = description_re.find(raw).map(|m| m.start());
        let constraints_cut = constraints_re.find(raw).map(|m| m.start());
        let cut = match (example_cut, constraints_cut) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        match cut {
            Some(index) => raw[..index].trim().to_string(),
            None if platform == Platform::TakeUForward => {
                truncate_chars(raw.trim(), TUF_DESCRIPTION_CAP_CHARS)
            }
            None => raw.trim().to_string(),
        }
    };

    let examples = collect_examples(raw, &example_re, &terminator_re, platform);
    let constraints = collect_constraints(raw, &constraints_re, &trailer_re);
    (description, examples, constraints)
}

/// Each example runs from its marker to the next marker, a terminator
/// ("Constraints:", and for TUF also "Note:"), or end of text.
fn collect_examples(
    raw: &str,
    marker: &Regex,
    terminator: &Regex,
    platform: Platform,
) -> Vec<String> {
    let starts: Vec<(usize, usize)> = marker
        .find_iter(raw)
        .map(|m| (m.start(), m.end()))
        .collect();
    let mut out = Vec::new();
    for (index, &(start, marker_end)) in starts.iter().enumerate() {
        let hard_end = starts
            .get(index + 1)
            .map(|&(next_start, _)| next_start)
            .unwrap_or(raw.len());
        let tail = &raw[marker_end..hard_end];
        let end = terminator
            .find(tail)
            .map(|m| marker_end + m.start())
            .unwrap_or(hard_end);
        let block = raw[start..end].trim().to_string();
        let keep = match platform {
            Platform::LeetCode => !block.is_empty(),
            Platform::TakeUForward => block.chars().count() > 5,
        };
        if keep {
            out.push(block);
        }
    }
    out
}

fn collect_constraints(raw: &str, marker: &Regex, trailer: &Regex) -> Option<String> {
    let m = marker.find(raw)?;
    let tail = raw[m.end()..].trim();
    let cut = trailer.find(tail).map(|t| t.start()).unwrap_or(tail.len());
    let text = tail[..cut].trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static statement pattern should compile")
}

fn truncate_chars(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((index, _)) => text[..index].trim().to_string(),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Code + language
// ---------------------------------------------------------------------------

/// Code lookup order: structured editor models from the host, then a raw
/// Monaco textarea, then CodeMirror line elements, then rendered view lines.
/// The language rides along with the editor model; otherwise a handful of
/// language-selector-looking controls are probed.
fn capture_code(snapshot: &RawPageSnapshot, document: &Html) -> CodeCapture {
    let mut user_code: Option<String> = None;
    let mut language: Option<String> = None;

    if let Some(best) = largest_editor_model(&snapshot.editor_models) {
        if !best.contents.trim().is_empty() {
            user_code = Some(best.contents.clone());
            language = best.language.clone();
        }
    }

    if user_code.is_none() {
        if let Some(element) = select_first(document, ".monaco-editor textarea") {
            let value = element.text().collect::<String>();
            if !value.trim().is_empty() {
                user_code = Some(value);
            }
        }
    }

    if user_code.is_none() {
        user_code = joined_lines(document, ".CodeMirror .CodeMirror-line");
    }

    if user_code.is_none() {
        user_code = joined_lines(document, ".view-line");
    }

    let resolved = language
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty() && lang != "unknown")
        .or_else(|| probe_language(document));

    CodeCapture {
        user_code,
        language: resolved.unwrap_or_else(|| "unknown".to_string()),
    }
}

fn largest_editor_model(models: &[EditorModelSnapshot]) -> Option<&EditorModelSnapshot> {
    models.iter().max_by_key(|model| model.contents.len())
}

fn joined_lines(document: &Html, raw: &str) -> Option<String> {
    let selector = Selector::parse(raw).ok()?;
    let lines: Vec<String> = document
        .select(&selector)
        .map(|line| line.text().collect::<String>())
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn probe_language(document: &Html) -> Option<String> {
    let candidates = [
        r#"[data-cy="lang-select"]"#,
        r#"button[class*="lang"]"#,
        r#"[class*="language"] button"#,
        r#"select[class*="lang"]"#,
    ];
    for raw in candidates {
        if let Some(element) = select_first(document, raw) {
            let text = element_text(element).trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "../tests/unit/extract_tests.rs"]
mod tests;
