/// A piece of highlighted text: either plain or part of a query match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSegment {
    Plain(String),
    Match(String),
}

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Splits `text` around every case-insensitive, literal occurrence of
/// `keyword`. Concatenating the segments gives back `text`.
///
/// Matching walks characters rather than byte offsets of a lower-cased copy,
/// since lower-casing can change byte lengths.
pub fn highlight(text: &str, keyword: &str) -> Vec<MatchSegment> {
    let needle: Vec<char> = keyword.chars().collect();
    if needle.is_empty() {
        return if text.is_empty() {
            Vec::new()
        } else {
            vec![MatchSegment::Plain(text.to_string())]
        };
    }

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i + needle.len() <= chars.len() {
        let window = &chars[i..i + needle.len()];
        if window
            .iter()
            .zip(&needle)
            .all(|((_, a), b)| same_letter(*a, *b))
        {
            let start = chars[i].0;
            let end = chars
                .get(i + needle.len())
                .map_or(text.len(), |(offset, _)| *offset);
            if plain_start < start {
                segments.push(MatchSegment::Plain(text[plain_start..start].to_string()));
            }
            segments.push(MatchSegment::Match(text[start..end].to_string()));
            plain_start = end;
            i += needle.len();
        } else {
            i += 1;
        }
    }

    if plain_start < text.len() {
        segments.push(MatchSegment::Plain(text[plain_start..].to_string()));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use MatchSegment::{Match, Plain};

    fn joined(segments: &[MatchSegment]) -> String {
        segments
            .iter()
            .map(|s| match s {
                Plain(t) | Match(t) => t.as_str(),
            })
            .collect()
    }

    #[test]
    fn marks_every_occurrence_preserving_case() {
        let segs = highlight("Java and JAVA", "java");
        assert_eq!(
            segs,
            vec![
                Match("Java".into()),
                Plain(" and ".into()),
                Match("JAVA".into())
            ]
        );
    }

    #[test]
    fn empty_keyword_returns_text() {
        assert_eq!(highlight("abc", ""), vec![Plain("abc".into())]);
        assert!(highlight("", "").is_empty());
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let segs = highlight("C++ (and c++)", "c++");
        assert_eq!(segs.iter().filter(|s| matches!(s, Match(_))).count(), 2);
    }

    #[test]
    fn non_ascii_text_round_trips() {
        let text = "Über Straße und ÜBER";
        let segs = highlight(text, "über");
        assert_eq!(joined(&segs), text);
        assert_eq!(segs.iter().filter(|s| matches!(s, Match(_))).count(), 2);
    }

    #[test]
    fn no_match_is_single_plain_segment() {
        assert_eq!(highlight("Spring", "rust"), vec![Plain("Spring".into())]);
    }
}
