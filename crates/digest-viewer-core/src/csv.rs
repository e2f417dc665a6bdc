//! Best-effort CSV tokenizer.
//!
//! Converts raw text into rows of string fields. Fields are separated by
//! `,` and rows by `\n`; a `\r` outside quotes is dropped. Double-quoted
//! sections may contain commas and newlines, and `""` inside quotes is a
//! literal quote.
//!
//! The tokenizer never fails: an unterminated quote simply runs to the end
//! of input. Rows whose fields are all blank are skipped.

/// Split `text` into rows of fields.
pub fn tokenize(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\n' => {
                row.push(std::mem::take(&mut field));
                push_row(&mut rows, std::mem::take(&mut row));
            }
            '\r' => {}
            _ => field.push(c),
        }
    }

    // Trailing row without a final newline
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        push_row(&mut rows, row);
    }

    rows
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    if row.iter().any(|cell| !cell.trim().is_empty()) {
        rows.push(row);
    }
}
