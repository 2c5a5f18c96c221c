use std::collections::VecDeque;

pub const DEFAULT_CHUNK_SIZE: usize = 2000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Paragraph, line, sentence, word, character.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Splits text into chunks of at most `chunk_size` characters, preferring the
/// coarsest separator that yields pieces small enough. Neighbouring chunks
/// share up to `chunk_overlap` characters.
#[derive(Debug, Clone)]
pub struct RecursiveTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveTextSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl RecursiveTextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).map(String::as_str).unwrap_or("");
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, separator));
                fitting.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, remaining));
            }
        }
        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, separator));
        }
        chunks
    }

    /// Greedily packs pieces into chunks, carrying a tail of at most
    /// `chunk_overlap` characters into the next chunk.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for &piece in pieces {
            let len = char_len(piece);
            let joined_len = |current: &VecDeque<&str>| {
                if current.is_empty() {
                    0
                } else {
                    separator_len
                }
            };

            if total + len + joined_len(&current) > self.chunk_size && !current.is_empty() {
                push_chunk(&mut chunks, &current, separator);
                while total > self.chunk_overlap
                    || (total > 0 && total + len + joined_len(&current) > self.chunk_size)
                {
                    let Some(front) = current.pop_front() else {
                        break;
                    };
                    total -= char_len(front) + if current.is_empty() { 0 } else { separator_len };
                }
            }

            total += len + joined_len(&current);
            current.push_back(piece);
        }
        push_chunk(&mut chunks, &current, separator);
        chunks
    }
}

fn push_chunk(chunks: &mut Vec<String>, current: &VecDeque<&str>, separator: &str) {
    let chunk = current.iter().copied().collect::<Vec<_>>().join(separator);
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        chunks.push(chunk.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = RecursiveTextSplitter::default();
        let chunks = splitter.split_text("Title\n\nA short article body.");
        assert_eq!(chunks, vec!["Title\n\nA short article body."]);
    }

    #[test]
    fn test_chunks_respect_size() {
        let paragraph = "The chip routes light through waveguides. ".repeat(20);
        let text = vec![paragraph; 6].join("\n\n");
        let splitter = RecursiveTextSplitter::new(500, 50);
        let chunks = splitter.split_text(&text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| !c.is_empty() && c.chars().count() <= 500));
    }

    #[test]
    fn test_paragraphs_stay_whole_when_they_fit() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let splitter = RecursiveTextSplitter::new(40, 0);
        let chunks = splitter.split_text(text);
        assert_eq!(
            chunks,
            vec!["First paragraph.\n\nSecond paragraph.", "Third paragraph."]
        );
    }

    #[test]
    fn test_neighbouring_chunks_overlap() {
        let text = (0..40).map(|i| format!("w{:02}", i)).collect::<Vec<_>>().join(" ");
        let splitter = RecursiveTextSplitter::new(20, 8);
        let chunks = splitter.split_text(&text);
        assert_eq!(chunks[0], "w00 w01 w02 w03 w04");
        assert_eq!(chunks[1], "w03 w04 w05 w06 w07");
        for pair in chunks.windows(2) {
            let first_word = pair[1].split(' ').next().unwrap();
            assert!(pair[0].contains(first_word));
        }
    }

    #[test]
    fn test_never_splits_inside_a_code_point() {
        let text = "é".repeat(50);
        let splitter = RecursiveTextSplitter::new(16, 4);
        let chunks = splitter.split_text(&text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 16 && c.chars().all(|ch| ch == 'é')));
    }
}
