use rand::Rng;

use crate::config::TypistSettings;

/// How source text is cut into reveal units
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRules {
    pub max_unsplit_word: usize,
    pub min_piece: usize,
    pub max_piece: usize,
}

impl Default for ChunkRules {
    fn default() -> Self {
        Self::from(&TypistSettings::default())
    }
}

impl From<&TypistSettings> for ChunkRules {
    fn from(s: &TypistSettings) -> Self {
        let min_piece = s.min_piece.max(1);
        Self {
            max_unsplit_word: s.max_unsplit_word,
            min_piece,
            max_piece: s.max_piece.max(min_piece),
        }
    }
}

/// Split `text` on whitespace into chunks.
///
/// Short words become `"word "`. Longer words are cut into pieces whose
/// sizes are drawn from `min_piece..=max_piece` (the last piece takes what
/// is left) and are followed by a lone `" "` chunk.
pub fn chunk_text<R: Rng + ?Sized>(text: &str, rules: &ChunkRules, rng: &mut R) -> Vec<String> {
    let mut chunks = Vec::new();

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() <= rules.max_unsplit_word {
            chunks.push(format!("{word} "));
            continue;
        }

        let mut start = 0;
        while start < chars.len() {
            let size = rng.gen_range(rules.min_piece..=rules.max_piece);
            let end = (start + size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            start = end;
        }
        chunks.push(" ".to_string());
    }

    chunks
}

/// Length of a chunk as the typist counts it
pub fn chunk_len(chunk: &str) -> usize {
    chunk.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_short_words_stay_whole() {
        let rules = ChunkRules::default();
        for word in ["a", "to", "cat", "hello", "rusty!"] {
            assert_eq!(chunk_text(word, &rules, &mut rng(0)), vec![format!("{word} ")]);
        }
    }

    #[test]
    fn test_long_words_are_pieced() {
        let rules = ChunkRules::default();
        let words = ["extraordinary", "abcdefg", "pneumonoultramicroscopic", "häagen-dazs"];

        for seed in 0..50 {
            for word in words {
                let chunks = chunk_text(word, &rules, &mut rng(seed));
                let (space, pieces) = chunks.split_last().unwrap();

                assert_eq!(space, " ");
                assert_eq!(pieces.concat(), word);

                let (last, leading) = pieces.split_last().unwrap();
                for piece in leading {
                    assert!((3..=8).contains(&chunk_len(piece)), "{piece:?}");
                }
                assert!((1..=8).contains(&chunk_len(last)), "{last:?}");
            }
        }
    }

    #[test]
    fn test_hello_extraordinary() {
        for seed in 0..20 {
            let chunks = chunk_text("Hello extraordinary", &ChunkRules::default(), &mut rng(seed));

            assert_eq!(chunks[0], "Hello ");
            assert_eq!(chunks.last().unwrap(), " ");
            assert_eq!(chunks.concat(), "Hello extraordinary ");
            assert_eq!(chunks.iter().map(|c| chunk_len(c)).sum::<usize>(), 20);

            let middle = &chunks[1..chunks.len() - 1];
            assert!((2..=5).contains(&middle.len()), "{middle:?}");
            assert_eq!(middle.iter().map(|c| chunk_len(c)).sum::<usize>(), 13);
        }
    }

    #[test]
    fn test_whitespace_is_normalised() {
        let chunks = chunk_text("  one\ttwo\n\nthree  ", &ChunkRules::default(), &mut rng(1));
        assert_eq!(chunks, vec!["one ", "two ", "three "]);
        assert!(chunk_text(" \n ", &ChunkRules::default(), &mut rng(1)).is_empty());
    }

    #[test]
    fn test_same_seed_same_chunks() {
        let text = "determinism matters considerably";
        let rules = ChunkRules::default();
        assert_eq!(
            chunk_text(text, &rules, &mut rng(8)),
            chunk_text(text, &rules, &mut rng(8))
        );
    }

    #[test]
    fn test_rules_are_sanitised() {
        let settings = TypistSettings {
            min_piece: 0,
            max_piece: 0,
            ..TypistSettings::default()
        };
        let rules = ChunkRules::from(&settings);
        assert_eq!((rules.min_piece, rules.max_piece), (1, 1));
    }
}
