//! Incremental sentence segmentation for streamed text.
//!
//! A [`Segmenter`] owns the pending buffer of one stream. Each call to
//! [`Segmenter::feed`] appends a fragment and hands back the sentences that the
//! new text completed; [`Segmenter::flush`] returns whatever is left once the
//! stream ends.
//!
//! ## Boundary rule
//!
//! A split happens at a whitespace character that directly follows `.` or `?`,
//! unless the text before it looks like one of two abbreviation shapes:
//!
//! | Shape            | Example        | Split after the dot? |
//! |------------------|----------------|----------------------|
//! | `\b\w\.`         | `x.`, `U.S.`   | no                   |
//! | `[A-Z][a-z]\.`   | `Dr.`, `Mr.`   | no                   |
//! | anything else    | `home.`, `you?`| yes                  |
//!
//! Whitespace is Unicode `White_Space` plus the separators U+001C to U+001F. The
//! whitespace character at the split point is consumed; everything else is kept.
//! Nothing outside the table is recognised, so `Mrs. ` and `... ` both end a sentence.
//! A word character is anything alphabetic or numeric, or `_`; combining marks such as
//! U+0903 count as word characters.

/// A split point inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Boundary {
    /// Byte offset where the completed sentence ends (the consumed whitespace starts here).
    pub end: usize,
    /// Byte offset where the remainder starts (just past the consumed whitespace).
    pub resume: usize,
}

fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `\b\w\.` ending right before the whitespace: a one-character word and its dot.
fn is_initial(before_word: Option<char>, word: char, dot: char) -> bool {
    dot == '.' && is_word(word) && !before_word.is_some_and(is_word)
}

/// `[A-Z][a-z]\.` ending right before the whitespace.
fn is_title(upper: Option<char>, lower: char, dot: char) -> bool {
    dot == '.' && lower.is_ascii_lowercase() && upper.is_some_and(|c| c.is_ascii_uppercase())
}

/// Finds the first sentence boundary in `text`.
pub(crate) fn next_boundary(text: &str) -> Option<Boundary> {
    // The three characters preceding the current one, nearest last.
    let mut window: [Option<char>; 3] = [None; 3];

    for (offset, c) in text.char_indices() {
        if is_space(c) {
            if let [third, Some(second), Some(terminal)] = window {
                let candidate = matches!(terminal, '.' | '?');
                if candidate
                    && !is_initial(third, second, terminal)
                    && !is_title(third, second, terminal)
                {
                    return Some(Boundary {
                        end: offset,
                        resume: offset + c.len_utf8(),
                    });
                }
            } else if let [_, None, Some(terminal)] = window {
                // Only one character precedes: `.` or `?` at the very start.
                if matches!(terminal, '.' | '?') {
                    return Some(Boundary {
                        end: offset,
                        resume: offset + c.len_utf8(),
                    });
                }
            }
        }
        window = [window[1], window[2], Some(c)];
    }
    None
}

/// Per-stream segmentation state: the text received since the last emitted sentence.
///
/// # Examples
///
/// ```
/// use sentstream::llm::Segmenter;
///
/// let mut segmenter = Segmenter::new();
/// let done: Vec<String> = segmenter.feed("Hello world. How are").collect();
/// assert_eq!(done, vec!["Hello world."]);
///
/// let done: Vec<String> = segmenter.feed(" you? ").collect();
/// assert_eq!(done, vec!["How are you?"]);
/// assert_eq!(segmenter.pending(), "");
/// assert_eq!(segmenter.flush(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    pending: String,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `fragment` and returns the sentences it completed, in order.
    ///
    /// The returned iterator is lazy: each sentence is cut from the buffer when it is
    /// pulled. Dropping the iterator early leaves the remaining complete sentences in
    /// the buffer, where the next `feed` or `flush` will find them.
    pub fn feed(&mut self, fragment: &str) -> Sentences<'_> {
        self.pending.push_str(fragment);
        Sentences { segmenter: self }
    }

    /// Takes the pending buffer as the final sentence, trimmed.
    ///
    /// Returns `None` when nothing but whitespace is pending, even though the buffer
    /// itself is not empty: an all-whitespace tail never becomes an empty sentence.
    pub fn flush(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        let sentence = rest.trim_matches(is_space);
        (!sentence.is_empty()).then(|| sentence.to_owned())
    }

    /// The text received since the last emitted sentence.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    fn split_next(&mut self) -> Option<String> {
        let Boundary { end, resume } = next_boundary(&self.pending)?;
        let sentence = self.pending[..end].trim_matches(is_space).to_owned();
        self.pending.replace_range(..resume, "");
        Some(sentence)
    }
}

/// Completed sentences produced by one [`Segmenter::feed`] call.
#[derive(Debug)]
pub struct Sentences<'a> {
    segmenter: &'a mut Segmenter,
}

impl Iterator for Sentences<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.segmenter.split_next()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn feed_all(segmenter: &mut Segmenter, fragment: &str) -> Vec<String> {
        segmenter.feed(fragment).collect()
    }

    #[test]
    fn two_sentences_in_one_fragment() {
        let mut s = Segmenter::new();
        let out = feed_all(&mut s, "Hello world. How are you? ");
        assert_eq!(out, vec!["Hello world.", "How are you?"]);
        assert_eq!(s.pending(), "");
    }

    #[test]
    fn no_boundary_only_grows_buffer() {
        let mut s = Segmenter::new();
        assert!(feed_all(&mut s, "Nice to ").is_empty());
        assert!(feed_all(&mut s, "meet you").is_empty());
        assert_eq!(s.pending(), "Nice to meet you");
    }

    #[test]
    fn boundary_needs_following_whitespace() {
        let mut s = Segmenter::new();
        assert!(feed_all(&mut s, "Done.").is_empty());
        assert_eq!(feed_all(&mut s, " Next"), vec!["Done."]);
        assert_eq!(s.pending(), "Next");
    }

    #[test]
    fn single_character_word_is_not_a_boundary() {
        let mut s = Segmenter::new();
        let out = feed_all(&mut s, "I saw x. That was odd. ");
        assert_eq!(out, vec!["I saw x. That was odd."]);
    }

    #[test]
    fn title_abbreviation_is_not_a_boundary() {
        let mut s = Segmenter::new();
        let out = feed_all(&mut s, "Dr. Smith went home. ");
        assert_eq!(out, vec!["Dr. Smith went home."]);
    }

    #[test]
    fn dotted_initials_are_not_boundaries() {
        let mut s = Segmenter::new();
        let out = feed_all(&mut s, "The U.S. economy grew. Then");
        assert_eq!(out, vec!["The U.S. economy grew."]);
        assert_eq!(s.pending(), "Then");
    }

    #[test]
    fn question_mark_ignores_abbreviation_guards() {
        let mut s = Segmenter::new();
        assert_eq!(feed_all(&mut s, "x? y"), vec!["x?"]);
    }

    #[test]
    fn longer_abbreviations_still_split() {
        // Known limitation: only the two guarded shapes are recognised.
        let mut s = Segmenter::new();
        assert_eq!(feed_all(&mut s, "Mrs. Jones"), vec!["Mrs."]);
    }

    #[test]
    fn exclamation_is_not_a_terminator() {
        let mut s = Segmenter::new();
        assert!(feed_all(&mut s, "Wow! Great").is_empty());
    }

    #[test]
    fn only_one_whitespace_is_consumed() {
        let mut s = Segmenter::new();
        assert_eq!(feed_all(&mut s, "One.\n\nTwo"), vec!["One."]);
        assert_eq!(s.pending(), "\nTwo");
        assert_eq!(s.flush().as_deref(), Some("Two"));
    }

    #[test]
    fn guard_sees_text_split_across_fragments() {
        let mut s = Segmenter::new();
        assert!(feed_all(&mut s, "Ask D").is_empty());
        assert!(feed_all(&mut s, "r.").is_empty());
        assert!(feed_all(&mut s, " Who").is_empty());
        assert_eq!(s.pending(), "Ask Dr. Who");
    }

    #[test]
    fn leading_terminator_splits() {
        let mut s = Segmenter::new();
        assert_eq!(feed_all(&mut s, ". a"), vec!["."]);
    }

    #[test]
    fn unicode_text_is_handled_on_char_boundaries() {
        let mut s = Segmenter::new();
        let out = feed_all(&mut s, "Ça va très bien. Merci\u{a0}beaucoup? Oui");
        assert_eq!(out, vec!["Ça va très bien.", "Merci\u{a0}beaucoup?"]);
        assert_eq!(s.pending(), "Oui");
    }

    #[test]
    fn dropped_iterator_keeps_remaining_sentences() {
        let mut s = Segmenter::new();
        let first = s.feed("A is one. B is two. ").next();
        assert_eq!(first.as_deref(), Some("A is one."));
        assert_eq!(feed_all(&mut s, ""), vec!["B is two."]);
    }

    #[test]
    fn flush_trims_and_empties() {
        let mut s = Segmenter::new();
        let _ = feed_all(&mut s, "  trailing words  ");
        assert_eq!(s.flush().as_deref(), Some("trailing words"));
        assert_eq!(s.pending(), "");
        assert_eq!(s.flush(), None);
    }

    #[test]
    fn information_separators_are_whitespace() {
        let mut s = Segmenter::new();
        assert_eq!(feed_all(&mut s, "\n.\u{1c}\tsX"), vec!["."]);
        assert_eq!(s.pending(), "\tsX");

        let mut s = Segmenter::new();
        assert_eq!(feed_all(&mut s, "\u{1f}Hi there.\u{1e}Next"), vec!["Hi there."]);
        assert_eq!(s.pending(), "Next");
    }

    #[test]
    fn flush_trims_information_separators() {
        let mut s = Segmenter::new();
        let _ = feed_all(&mut s, "\u{1d} tail \u{1f}");
        assert_eq!(s.flush().as_deref(), Some("tail"));

        let _ = feed_all(&mut s, "\u{1c}\u{1e}");
        assert_eq!(s.flush(), None);
    }

    #[test]
    fn flush_skips_whitespace_only_buffer() {
        let mut s = Segmenter::new();
        let _ = feed_all(&mut s, "Fine.  ");
        assert_eq!(s.pending(), " ");
        assert_eq!(s.flush(), None);
    }

    /// Cuts `text` at every boundary, keeping segments untrimmed.
    fn raw_split(text: &str) -> (Vec<(&str, &str)>, &str) {
        let mut parts = Vec::new();
        let mut rest = text;
        while let Some(Boundary { end, resume }) = next_boundary(rest) {
            parts.push((&rest[..end], &rest[end..resume]));
            rest = &rest[resume..];
        }
        (parts, rest)
    }

    proptest! {
        #[test]
        fn segments_reconstruct_input(text in "[a-zA-Z .?!,\n\t]{0,120}") {
            let (parts, rest) = raw_split(&text);
            let mut rebuilt = String::new();
            for (segment, whitespace) in &parts {
                prop_assert_eq!(whitespace.chars().count(), 1);
                rebuilt.push_str(segment);
                rebuilt.push_str(whitespace);
            }
            rebuilt.push_str(rest);
            prop_assert_eq!(rebuilt, text);
        }

        #[test]
        fn fragmentation_does_not_change_output(
            text in "[a-zA-Z .?]{0,80}",
            cuts in proptest::collection::vec(0usize..80, 0..6),
        ) {
            let mut whole = Segmenter::new();
            let mut expected: Vec<String> = whole.feed(&text).collect();
            expected.extend(whole.flush());

            let mut cuts: Vec<usize> = cuts.into_iter().filter(|&c| c <= text.len()).collect();
            cuts.sort_unstable();
            cuts.dedup();

            let mut pieces = Segmenter::new();
            let mut actual = Vec::new();
            let mut start = 0;
            for cut in cuts.into_iter().chain(std::iter::once(text.len())) {
                actual.extend(pieces.feed(&text[start..cut]));
                start = cut;
            }
            actual.extend(pieces.flush());

            prop_assert_eq!(actual, expected);
        }
    }
}
