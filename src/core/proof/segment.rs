//! Splitting a proof document into step pages along `<a id="step-N"></a>` anchors.

const ANCHOR_OPEN: &str = "<a id=\"step-";
const ANCHOR_CLOSE: &str = "\"></a>";

/// A first page shorter than this many lines may be an introduction.
const INTRO_MAX_LINES: usize = 5;
/// A first page containing this marker is a real step and is never merged.
const HEADER_MARKER: &str = "###";

/// A piece of the document: either a step anchor or the text between anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part<'a> {
    Anchor(&'a str),
    Text(&'a str),
}

/// Split `full_proof` into pages, one per step anchor.
///
/// Text before the first anchor becomes its own (trimmed) page. Each anchor
/// starts a page holding the anchor followed by the text up to the next
/// anchor, with the text's leading whitespace removed and its trailing
/// whitespace kept. A short first page without a `###` header is folded into
/// the next page, then blank pages are dropped. A document without anchors
/// comes back as a single page, as-is.
pub fn segment(full_proof: &str) -> Vec<String> {
    if full_proof.is_empty() {
        return Vec::new();
    }

    let parts = split_keeping_anchors(full_proof);
    if parts.len() <= 1 {
        return vec![full_proof.to_string()];
    }

    let mut pages: Vec<String> = Vec::with_capacity(parts.len() / 2 + 1);
    let mut rest = parts.as_slice();
    let mut has_preamble = false;
    // A blank preamble still takes the first slot; the merge below folds it away.
    if let Some((Part::Text(preamble), tail)) = rest.split_first() {
        pages.push(preamble.trim().to_string());
        has_preamble = true;
        rest = tail;
    }

    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            Part::Anchor(anchor) => {
                let mut page = anchor.to_string();
                if let Some(Part::Text(content)) = rest.get(i + 1) {
                    page.push_str(content.trim_start());
                    i += 1;
                }
                pages.push(page);
            }
            // Text never follows text; each run after an anchor is consumed with it.
            Part::Text(_) => {}
        }
        i += 1;
    }

    if pages.len() >= 2 && is_short_intro(&pages[0]) {
        let intro = pages.remove(0);
        pages[0] = format!("{}\n\n{}", intro, pages[0]);
        log::debug!(
            "Merged {} introduction into first step",
            if has_preamble { "preamble" } else { "short first step" }
        );
    }

    pages.retain(|p| !p.trim().is_empty());
    pages
}

fn is_short_intro(page: &str) -> bool {
    page.split('\n').count() < INTRO_MAX_LINES && !page.contains(HEADER_MARKER)
}

/// Step number of the anchor a page starts with, if it starts with one.
///
/// For display only; pages are ordered by their position in the document, not
/// by this number.
pub fn step_number(page: &str) -> Option<u64> {
    // A merged blank preamble leaves the page starting with "\n\n".
    let page = page.trim_start();
    let len = anchor_len_at(page, 0)?;
    page[ANCHOR_OPEN.len()..len - ANCHOR_CLOSE.len()].parse().ok()
}

/// Page `number` (1-indexed) of `pages`, or `None` when out of range.
pub fn page_at(pages: &[String], number: usize) -> Option<&str> {
    number
        .checked_sub(1)
        .and_then(|idx| pages.get(idx))
        .map(String::as_str)
}

/// Split on anchors, keeping each anchor as its own part and dropping empty text.
fn split_keeping_anchors(text: &str) -> Vec<Part<'_>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut search = 0;
    while let Some(offset) = text[search..].find(ANCHOR_OPEN) {
        let at = search + offset;
        match anchor_len_at(text, at) {
            Some(len) => {
                if at > start {
                    parts.push(Part::Text(&text[start..at]));
                }
                parts.push(Part::Anchor(&text[at..at + len]));
                start = at + len;
                search = start;
            }
            None => search = at + ANCHOR_OPEN.len(),
        }
    }
    if start < text.len() {
        parts.push(Part::Text(&text[start..]));
    }
    parts
}

/// Length of the anchor starting at byte `at`, if a well-formed one starts there.
fn anchor_len_at(text: &str, at: usize) -> Option<usize> {
    let rest = text.get(at..)?.strip_prefix(ANCHOR_OPEN)?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || !rest[digits..].starts_with(ANCHOR_CLOSE) {
        return None;
    }
    Some(ANCHOR_OPEN.len() + digits + ANCHOR_CLOSE.len())
}
