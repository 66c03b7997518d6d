//! Block-math delimiter normalization.
//!
//! Every `$$` token is moved onto its own line with exactly one blank line
//! between the block and the surrounding prose. Inline `$...$` math is never
//! touched: the scanner only recognizes the literal two-byte `$$` token.

/// Block-math delimiter token.
const BLOCK_DELIMITER: &str = "$$";

/// Rewrite `text` so every block-math delimiter sits on its own line.
///
/// Whitespace around each `$$` is consumed, content inside a block is
/// trimmed, runs of three or more newlines collapse to two, and the result is
/// trimmed. An odd number of delimiters leaves the last block open: its `$$`
/// is emitted on its own line followed by the remaining content, and no
/// closing delimiter is invented (see [`has_unterminated_block`]).
///
/// Idempotent: normalizing already-normalized text returns it unchanged.
pub fn normalize(text: &str) -> String {
    let parts = split_on_delimiters(text.trim());
    let unterminated = parts.len() % 2 == 0;
    let last = parts.len() - 1;

    let mut out = String::with_capacity(text.len() + parts.len() * 4);
    for (idx, part) in parts.iter().enumerate() {
        if idx % 2 == 0 {
            out.push_str(part);
            continue;
        }
        out.push_str("\n\n");
        out.push_str(BLOCK_DELIMITER);
        out.push('\n');
        out.push_str(part.trim());
        if !(unterminated && idx == last) {
            out.push('\n');
            out.push_str(BLOCK_DELIMITER);
            out.push_str("\n\n");
        }
    }

    collapse_blank_runs(&out).trim().to_string()
}

/// True when `text` has an odd number of `$$` tokens, i.e. a block that is
/// opened and never closed.
pub fn has_unterminated_block(text: &str) -> bool {
    delimiter_count(text) % 2 == 1
}

/// Number of `$$` tokens, scanned left to right without overlap.
pub fn delimiter_count(text: &str) -> usize {
    // n tokens split the text into n + 1 parts.
    split_on_delimiters(text).len() - 1
}

/// Split `text` on `$$` tokens, consuming the whitespace on both sides of each
/// token. Always returns at least one part; even indices lie outside blocks,
/// odd indices inside.
fn split_on_delimiters(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'$' && bytes[i + 1] == b'$' {
            parts.push(text[start..i].trim_end());
            let rest = &text[i + BLOCK_DELIMITER.len()..];
            let skipped = rest.len() - rest.trim_start().len();
            i += BLOCK_DELIMITER.len() + skipped;
            start = i;
        } else {
            i += 1;
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Collapse every run of three or more `\n` down to exactly two.
pub(crate) fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "   \n\t ",
        "plain prose",
        "Some text\n\n  $$\\text{formula}$$\n\nMore text",
        "First part\n$$\n  A=B  \n$$ and second part\n\n  $$C=D$$",
        "inline $a$ and $b$ only",
        "$$a$$ $$b$$",
        "$$$$",
        "$$$x$$",
        "$$x$$$",
        "$$ $a$ $$",
        "open $$ never closed",
        "trailing open $$",
        "$$$$$$",
        "a\n\n\n\n\nb $$\n\n\nx\n\n\n\ny\n$$ c",
        "### 1. Step\n<a id=\"step-1\"></a>Let $$x^2$$ be given.\n\n\n\nDone.",
        "unicode café $$ α + β $$ fin",
        "\u{00a0}$$x$$\u{00a0}",
    ];

    #[test]
    fn normalize_isolates_block_with_surrounding_blank_lines() {
        assert_eq!(
            normalize("Some text\n\n  $$\\text{formula}$$\n\nMore text"),
            "Some text\n\n$$\n\\text{formula}\n$$\n\nMore text"
        );
    }

    #[test]
    fn normalize_handles_adjacent_blocks_and_inline_continuation() {
        assert_eq!(
            normalize("First part\n$$\n  A=B  \n$$ and second part\n\n  $$C=D$$"),
            "First part\n\n$$\nA=B\n$$\n\nand second part\n\n$$\nC=D\n$$"
        );
    }

    #[test]
    fn normalize_empty_and_whitespace_yield_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  \n\n\t "), "");
    }

    #[test]
    fn normalize_back_to_back_blocks_get_one_blank_line() {
        assert_eq!(normalize("$$a$$ $$b$$"), "$$\na\n$$\n\n$$\nb\n$$");
    }

    #[test]
    fn normalize_empty_block_keeps_both_delimiters() {
        assert_eq!(normalize("x $$  $$ y"), "x\n\n$$\n\n$$\n\ny");
    }

    #[test]
    fn normalize_leaves_inline_math_untouched() {
        let input = "Let $a$ and $b$ be reals with $a<b$.\nThen $$ is not here.";
        // One stray `$$` on purpose: only the literal pair is a delimiter.
        assert_eq!(delimiter_count(input), 1);
        let inline_only = "Let $a$ and $b$ be reals, so $a \\cdot b$ is real.";
        assert_eq!(normalize(inline_only), inline_only);
    }

    #[test]
    fn normalize_single_dollars_separated_by_space_are_not_a_delimiter() {
        let input = "cost $5 $ 6";
        assert_eq!(delimiter_count(input), 0);
        assert_eq!(normalize(input), input);
    }

    #[test]
    fn normalize_inline_only_equals_trimmed_collapse() {
        let input = "  \nA $x$\n\n\n\nB $y$ and $z$\n\n";
        assert_eq!(normalize(input), collapse_blank_runs(input).trim());
        assert_eq!(normalize(input), "A $x$\n\nB $y$ and $z$");
    }

    #[test]
    fn normalize_triple_dollar_takes_first_pair() {
        assert_eq!(normalize("$$$x$$"), "$$\n$x\n$$");
        assert_eq!(normalize("$$x$$$"), "$$\nx\n$$\n\n$");
    }

    #[test]
    fn normalize_unterminated_block_keeps_content_without_closing() {
        let out = normalize("Intro $$ x + y");
        assert_eq!(out, "Intro\n\n$$\nx + y");
        assert!(has_unterminated_block(&out));
    }

    #[test]
    fn normalize_unterminated_block_at_end_of_input() {
        assert_eq!(normalize("Intro\n$$"), "Intro\n\n$$");
    }

    #[test]
    fn normalize_collapses_blank_runs_inside_and_outside_blocks() {
        assert_eq!(
            normalize("a\n\n\n\nb $$\n\n\nx\n\n\n\ny\n$$ c"),
            "a\n\nb\n\n$$\nx\n\ny\n$$\n\nc"
        );
    }

    #[test]
    fn normalize_handles_multibyte_text() {
        assert_eq!(
            normalize("unicode café $$ α + β $$ fin"),
            "unicode café\n\n$$\nα + β\n$$\n\nfin"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        for sample in SAMPLES {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn normalize_never_leaves_three_newlines() {
        for sample in SAMPLES {
            assert!(!normalize(sample).contains("\n\n\n"), "input {:?}", sample);
        }
    }

    #[test]
    fn normalize_has_no_outer_whitespace() {
        for sample in SAMPLES {
            let out = normalize(sample);
            assert_eq!(out.trim(), out, "input {:?}", sample);
        }
    }

    #[test]
    fn normalize_delimiters_sit_on_their_own_lines() {
        for sample in SAMPLES {
            let out = normalize(sample);
            let bytes = out.as_bytes();
            let mut i = 0;
            while i + 1 < bytes.len() {
                if bytes[i] == b'$' && bytes[i + 1] == b'$' {
                    assert!(i == 0 || bytes[i - 1] == b'\n', "{:?} -> {:?}", sample, out);
                    let after = i + 2;
                    assert!(
                        after == bytes.len() || bytes[after] == b'\n',
                        "{:?} -> {:?}",
                        sample,
                        out
                    );
                    i += 2;
                } else {
                    i += 1;
                }
            }
        }
    }

    #[test]
    fn normalize_preserves_delimiter_parity() {
        for sample in SAMPLES {
            assert_eq!(
                has_unterminated_block(&normalize(sample)),
                has_unterminated_block(sample.trim()),
                "input {:?}",
                sample
            );
        }
    }

    #[test]
    fn collapse_blank_runs_keeps_single_blank_line() {
        assert_eq!(collapse_blank_runs("a\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_runs("a\n\n\n\n\nb\n\n\nc"), "a\n\nb\n\nc");
        assert_eq!(collapse_blank_runs("a\n \n \nb"), "a\n \n \nb");
    }
}
