//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// A saved Claude conversation page with two turns, a thinking trace, a web
/// search trace, a document link and sensitive-shaped content.
pub const CLAUDE_FIXTURE: &str = r#"<html>
<head><title>Planning session</title></head>
<body>
<main>
  <div data-testid="conversation">
    <div data-testid="user-message">
      <div class="message-content">Explain recursion. My email is jane.doe@example.com and my key is sk-abcdef1234567890. Call me at +1 (415) 555-0100.</div>
      <a href="/files/notes.pdf">notes.pdf</a>
    </div>
    <div data-testid="assistant-message">
      <details><summary>Thought for 12s</summary>Let me think about this carefully before answering.</details>
      <details><summary>Searched the web</summary>Searched the web for "recursion basics"
3 results
Recursion - Wikipedia
en.wikipedia.org
Understanding Recursion
stackoverflow.com</details>
      <div class="message-content">Recursion is a function calling itself until a base case stops it.</div>
      <a href="https://en.wikipedia.org/wiki/Recursion">Recursion article</a>
    </div>
  </div>
</main>
</body>
</html>"#;

/// Six alternating turns, no traces. Used by scoping tests.
pub fn six_turn_page() -> String {
    let mut turns = String::new();
    for i in 1..=6 {
        let role = if i % 2 == 1 { "user" } else { "assistant" };
        turns.push_str(&format!(
            r#"<div data-testid="{role}-message"><div class="message-content">Turn number {i} content.</div></div>"#,
        ));
    }
    format!(
        r#"<html><head><title>Long chat</title></head><body><main>
        <div data-testid="conversation">{turns}</div>
        </main></body></html>"#
    )
}

/// Write a fixture page into a temp dir and return (dir, file path). The dir
/// must stay alive for the path to remain valid.
pub fn write_page(html: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("page.html");
    fs::write(&path, html).expect("failed to write fixture page");
    (dir, path)
}
