use serde::Serialize;

/// Counts shown in the status bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub bytes: usize,
    pub chars: usize,
    pub words: usize,
    pub lines: usize,
    pub paragraphs: usize,
}

impl Statistics {
    pub fn of(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }

        Self {
            bytes: text.len(),
            chars: text.chars().count(),
            words: text.split_whitespace().count(),
            lines: text.split('\n').count(),
            paragraphs: count_paragraphs(text),
        }
    }
}

/// Paragraphs are separated by lines holding only whitespace
fn count_paragraphs(text: &str) -> usize {
    let mut count = 0;
    let mut in_paragraph = false;
    for line in text.split('\n') {
        if line.trim().is_empty() {
            in_paragraph = false;
        } else if !in_paragraph {
            in_paragraph = true;
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_text() {
        assert_eq!(Statistics::of(""), Statistics::default());
    }

    #[test]
    fn test_counts() {
        let stats = Statistics::of("# Title\n\nfirst paragraph here\nstill first\n\n  \nsecond é");

        assert_eq!(
            stats,
            Statistics {
                bytes: 55,
                chars: 54,
                words: 9,
                lines: 7,
                paragraphs: 3,
            }
        );
    }

    #[test]
    fn test_trailing_newline_counts_a_line() {
        assert_eq!(Statistics::of("one\n").lines, 2);
    }
}
