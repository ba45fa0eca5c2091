#[derive(Debug, Clone)]
pub struct WrappedText {
    pub rendered: String,
    /// `(line, column)` for every char boundary, including the end position;
    /// used to map the input cursor onto wrapped rows.
    pub positions: Vec<(u16, u16)>,
    pub line_count: u16,
}

/// Wrap at word boundaries where a word fits on a line of its own, breaking
/// longer words mid-run. Explicit newlines always start a new row.
pub fn wrap_word_with_positions(text: &str, width: u16) -> WrappedText {
    let width = width.max(1);
    let chars: Vec<char> = text.chars().collect();
    let word_lengths = word_length_table(&chars);

    let mut rendered = String::new();
    let mut positions = Vec::with_capacity(chars.len() + 1);
    let mut line = 0u16;
    let mut col = 0u16;
    positions.push((line, col));

    for (idx, ch) in chars.iter().copied().enumerate() {
        if ch == '\n' {
            rendered.push('\n');
            line = line.saturating_add(1);
            col = 0;
            positions.push((line, col));
            continue;
        }

        let starts_word = !ch.is_whitespace()
            && (idx == 0 || chars[idx - 1].is_whitespace() || chars[idx - 1] == '\n');
        let word_len = word_lengths[idx];
        let word_would_overflow =
            starts_word && col > 0 && word_len <= width && col.saturating_add(word_len) > width;

        if word_would_overflow || col >= width {
            rendered.push('\n');
            line = line.saturating_add(1);
            col = 0;
        }

        rendered.push(ch);
        col = col.saturating_add(1);
        if col >= width {
            rendered.push('\n');
            line = line.saturating_add(1);
            col = 0;
        }
        positions.push((line, col));
    }

    let line_count = positions
        .iter()
        .map(|(l, _)| *l)
        .max()
        .unwrap_or(0)
        .saturating_add(1);

    WrappedText {
        rendered,
        positions,
        line_count,
    }
}

/// For every index, the length of the whitespace-delimited word starting
/// there (0 when the char is whitespace or mid-word).
fn word_length_table(chars: &[char]) -> Vec<u16> {
    let mut lengths = vec![0u16; chars.len()];
    let mut idx = 0;
    while idx < chars.len() {
        if chars[idx].is_whitespace() {
            idx += 1;
            continue;
        }
        let mut end = idx;
        while end < chars.len() && !chars[end].is_whitespace() {
            end += 1;
        }
        lengths[idx] = (end - idx).min(u16::MAX as usize) as u16;
        idx = end;
    }
    lengths
}
