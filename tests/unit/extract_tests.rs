use super::*;
use crate::problem::{Difficulty, EditorModelSnapshot, Platform, RawPageSnapshot};

const LEETCODE_URL: &str = "https://leetcode.com/problems/two-sum/";
const TUF_URL: &str = "https://takeuforward.org/plus/dsa/problems/reverse-linked-list";

const LEETCODE_PAGE: &str = r#"<html>
<head><title>Two Sum - LeetCode</title></head>
<body>
  <div data-cy="question-title">1. Two Sum</div>
  <div class="text-difficulty-easy">Easy</div>
  <div data-track-load="description_content">
    <p>Given an array of integers nums and an integer target, return indices of the two numbers such that they add up to target.</p>
    <p>You may assume that each input would have exactly one solution.</p>
    <p>Example 1:</p>
    <p>Input: nums = [2,7,11,15], target = 9</p>
    <p>Output: [0,1]</p>
    <p>Example 2:</p>
    <p>Input: nums = [3,2,4], target = 6</p>
    <p>Output: [1,2]</p>
    <p>Constraints:</p>
    <p>2 &lt;= nums.length &lt;= 10000</p>
    <p>Follow up: Can you come up with an algorithm that is less than O(n^2) time complexity?</p>
  </div>
  <a href="/tag/array/">Array</a>
  <a href="/tag/hash-table/">Hash Table</a>
  <span class="topic-tag__x1">Array</span>
</body>
</html>"#;

const TUF_PAGE: &str = r#"<html>
<head><title>Reverse Linked List | TakeUForward</title></head>
<body>
<main>
  <h2>Reverse Linked List</h2>
  <span>Medium</span>
  <div class="problem-statement">
    <p>Given the head of a singly linked list, reverse the list in place and return the head of the reversed list without allocating any extra nodes.</p>
    <p>Example 1:</p>
    <p>Input: head = [1,2,3]</p>
    <p>Output: [3,2,1]</p>
    <p>Constraints:</p>
    <p>1 &lt;= n &lt;= 5000</p>
    <p>Note: Try to do it in O(1) extra space.</p>
  </div>
  <span class="chip">Linked List</span>
  <span class="chip">Pointers</span>
  <span class="badge">42</span>
</main>
</body>
</html>"#;

fn snapshot(url: &str, html: &str) -> RawPageSnapshot {
    RawPageSnapshot {
        url: url.to_string(),
        html: html.to_string(),
        editor_models: Vec::new(),
    }
}

#[test]
fn leetcode_page_partitions_description_examples_and_constraints() {
    let model = extract(&snapshot(LEETCODE_URL, LEETCODE_PAGE)).expect("extract");

    assert_eq!(model.platform, Platform::LeetCode);
    assert_eq!(model.title, "1. Two Sum");
    assert_eq!(model.difficulty, Difficulty::Easy);

    assert!(model.description.contains("return indices of the two numbers"));
    assert!(model.description.contains("exactly one solution"));
    assert!(!model.description.contains("Example 1:"));
    assert!(!model.description.contains("Constraints:"));
    assert!(!model.description.contains("nums.length"));

    assert_eq!(model.examples.len(), 2);
    assert!(model.examples[0].starts_with("Example 1:"));
    assert!(model.examples[0].contains("target = 9"));
    assert!(!model.examples[0].contains("Example 2:"));
    assert!(model.examples[1].starts_with("Example 2:"));
    assert!(!model.examples[1].contains("Constraints"));

    let constraints = model.constraints.expect("constraints");
    assert!(constraints.contains("2 <= nums.length <= 10000"));
    assert!(!constraints.to_lowercase().contains("follow up"));
}

#[test]
fn leetcode_tags_are_deduplicated_in_first_seen_order() {
    let model = extract(&snapshot(LEETCODE_URL, LEETCODE_PAGE)).expect("extract");
    assert_eq!(model.tags, vec!["Array".to_string(), "Hash Table".to_string()]);
}

#[test]
fn leetcode_title_falls_back_to_page_title_with_suffix_stripped() {
    let html = r#"<html><head><title>Two Sum - LeetCode</title></head>
        <body><div data-track-load="description_content"><p>Some text here.</p></div></body></html>"#;
    let model = extract(&snapshot(LEETCODE_URL, html)).expect("extract");
    assert_eq!(model.title, "Two Sum");
}

#[test]
fn missing_difficulty_degrades_to_unknown() {
    let html = r#"<html><head><title>X - LeetCode</title></head>
        <body><div data-track-load="description_content"><p>Statement text.</p></div></body></html>"#;
    let model = extract(&snapshot(LEETCODE_URL, html)).expect("extract");
    assert_eq!(model.difficulty, Difficulty::Unknown);
    assert!(model.examples.is_empty());
    assert!(model.constraints.is_none());
}

#[test]
fn tuf_page_partitions_with_note_trailer_stripped() {
    let model = extract(&snapshot(TUF_URL, TUF_PAGE)).expect("extract");

    assert_eq!(model.platform, Platform::TakeUForward);
    assert_eq!(model.title, "Reverse Linked List");
    assert_eq!(model.difficulty, Difficulty::Medium);

    assert!(model.description.contains("reverse the list in place"));
    assert!(!model.description.contains("Example 1:"));

    assert_eq!(model.examples.len(), 1);
    assert!(model.examples[0].starts_with("Example 1:"));
    assert!(model.examples[0].contains("Output: [3,2,1]"));
    assert!(!model.examples[0].contains("Constraints"));

    let constraints = model.constraints.expect("constraints");
    assert!(constraints.contains("1 <= n <= 5000"));
    assert!(!constraints.contains("Note:"));
}

#[test]
fn tuf_tags_filter_numeric_tokens() {
    let model = extract(&snapshot(TUF_URL, TUF_PAGE)).expect("extract");
    assert!(model.tags.contains(&"Linked List".to_string()));
    assert!(model.tags.contains(&"Pointers".to_string()));
    assert!(!model.tags.contains(&"42".to_string()));
    assert!(model.tags.len() <= 10);
}

#[test]
fn tuf_statement_falls_back_to_main_paragraphs() {
    let html = r#"<html><head><title>Kth Largest | TUF</title></head><body>
      <main>
        <h2>Kth Largest Element</h2>
        <p>Given an unsorted array, find the kth largest element in the array.</p>
        <p>Input: arr = [3,2,1,5,6,4], k = 2</p>
      </main>
    </body></html>"#;
    let model = extract(&snapshot(TUF_URL, html)).expect("extract");
    assert!(model.description.contains("kth largest element"));
    assert!(!model.description.contains("Input:"));
}

#[test]
fn tuf_statement_greedy_fallback_rejects_whole_page_blocks() {
    let filler = "word ".repeat(1200); // beyond the greedy size bound
    let html = format!(
        r#"<html><head><title>Something | TUF</title></head><body>
          <div>{filler}</div>
          <div><span>Given a number n, print all divisors of n in increasing order without duplicates.</span></div>
        </body></html>"#
    );
    let model = extract(&snapshot(TUF_URL, &html)).expect("extract");
    assert!(model.description.contains("print all divisors"));
    assert!(!model.description.starts_with("word"));
}

#[test]
fn tuf_description_without_markers_is_capped() {
    let long_text = "a".repeat(2000);
    let html = format!(
        r#"<html><head><title>Long | TUF</title></head><body>
          <div class="problem-statement"><p>{long_text}</p></div>
        </body></html>"#
    );
    let model = extract(&snapshot(TUF_URL, &html)).expect("extract");
    assert_eq!(model.description.chars().count(), 800);
}

#[test]
fn unsupported_url_is_a_hard_failure() {
    let err = extract(&snapshot("https://example.com/x", "<html><body>hi</body></html>"))
        .expect_err("should fail");
    assert!(matches!(err, ExtractError::UnsupportedPage(_)));
}

#[test]
fn empty_page_is_a_hard_failure() {
    let err = extract(&snapshot(LEETCODE_URL, "<html><body></body></html>"))
        .expect_err("should fail");
    assert_eq!(err, ExtractError::EmptyPage);
    let err = extract(&snapshot(LEETCODE_URL, "")).expect_err("should fail");
    assert_eq!(err, ExtractError::EmptyPage);
}

#[test]
fn largest_editor_model_wins_and_carries_its_language() {
    let mut snap = snapshot(LEETCODE_URL, LEETCODE_PAGE);
    snap.editor_models = vec![
        EditorModelSnapshot {
            contents: "short".to_string(),
            language: Some("cpp".to_string()),
        },
        EditorModelSnapshot {
            contents: "fn two_sum(nums: Vec<i32>, target: i32) -> Vec<i32> { vec![] }".to_string(),
            language: Some("rust".to_string()),
        },
    ];
    let model = extract(&snap).expect("extract");
    assert!(model.user_code.expect("code").contains("two_sum"));
    assert_eq!(model.language, "rust");
}

#[test]
fn textarea_fallback_is_used_when_no_editor_models_exist() {
    let html = r#"<html><head><title>X - LeetCode</title></head><body>
      <div data-track-load="description_content"><p>Statement.</p></div>
      <div class="monaco-editor"><textarea>class Solution:
    pass</textarea></div>
      <button class="lang-select-btn">Python3</button>
    </body></html>"#;
    let model = extract(&snapshot(LEETCODE_URL, html)).expect("extract");
    assert!(model.user_code.expect("code").contains("class Solution"));
    assert_eq!(model.language, "Python3");
}

#[test]
fn rendered_view_lines_are_joined_with_newlines() {
    let html = r#"<html><head><title>X - LeetCode</title></head><body>
      <div data-track-load="description_content"><p>Statement.</p></div>
      <div class="view-line">int main() {</div>
      <div class="view-line">    return 0;</div>
      <div class="view-line">}</div>
    </body></html>"#;
    let model = extract(&snapshot(LEETCODE_URL, html)).expect("extract");
    assert_eq!(
        model.user_code.expect("code"),
        "int main() {\n    return 0;\n}"
    );
    assert_eq!(model.language, "unknown");
}

#[test]
fn codemirror_lines_take_priority_over_view_lines() {
    let html = r#"<html><head><title>X - LeetCode</title></head><body>
      <div data-track-load="description_content"><p>Statement.</p></div>
      <div class="CodeMirror"><pre class="CodeMirror-line">print("hello")</pre></div>
      <div class="view-line">stale</div>
    </body></html>"#;
    let model = extract(&snapshot(LEETCODE_URL, html)).expect("extract");
    assert_eq!(model.user_code.expect("code"), "print(\"hello\")");
}

#[test]
fn absent_code_yields_none_with_unknown_language() {
    let model = extract(&snapshot(LEETCODE_URL, LEETCODE_PAGE)).expect("extract");
    assert!(model.user_code.is_none());
    assert_eq!(model.language, "unknown");
}

#[test]
fn code_refresh_reruns_only_the_code_branch() {
    let initial = extract(&snapshot(LEETCODE_URL, LEETCODE_PAGE)).expect("extract");

    // Same page re-read after the student typed into the editor; the
    // statement areas changed shape but only the code branch is re-run.
    let mut reread = snapshot(LEETCODE_URL, LEETCODE_PAGE);
    reread.editor_models = vec![EditorModelSnapshot {
        contents: "impl Solution { fn two_sum() {} }".to_string(),
        language: Some("rust".to_string()),
    }];
    let capture = extract_code_refresh(&reread);
    assert_eq!(capture.language, "rust");

    let mut merged = initial.clone();
    merged.apply_code_refresh(capture);

    assert_eq!(merged.user_code.as_deref(), Some("impl Solution { fn two_sum() {} }"));
    assert_eq!(merged.language, "rust");
    assert_eq!(merged.title, initial.title);
    assert_eq!(merged.description, initial.description);
    assert_eq!(merged.examples, initial.examples);
    assert_eq!(merged.constraints, initial.constraints);
    assert_eq!(merged.tags, initial.tags);
}
