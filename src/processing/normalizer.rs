//! Text normalization: lowercase, Portuguese stemming, accent stripping

use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Extra stem/strip rounds allowed per token, on top of one per character,
/// while looking for a fixed point.
const EXTRA_STEM_PASSES: usize = 4;

pub struct TextNormalizer {
    stemmer: Stemmer,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::Portuguese),
        }
    }

    /// Canonical bag-of-words form of `text`.
    ///
    /// Each whitespace-separated token is lowercased, has its edge punctuation
    /// trimmed, is stemmed and loses its diacritics; empty tokens are dropped
    /// and the rest are joined with single spaces. Stemming is repeated until
    /// the token stops changing, so `normalize(normalize(t)) == normalize(t)`.
    pub fn normalize(&self, text: &str) -> String {
        text.split_whitespace()
            .filter_map(|token| self.normalize_token(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn normalize_token(&self, token: &str) -> Option<String> {
        let mut current = self.reduce(token);
        let max_passes = current.chars().count() + EXTRA_STEM_PASSES;
        for _ in 0..max_passes {
            let next = self.reduce(&current);
            if next == current {
                break;
            }
            current = next;
        }
        (!current.is_empty()).then_some(current)
    }

    fn reduce(&self, token: &str) -> String {
        let lowered = token.to_lowercase();
        let trimmed = lowered.trim_matches(|c: char| !c.is_alphanumeric());
        if trimmed.is_empty() {
            return String::new();
        }
        strip_accents(&self.stemmer.stem(trimmed))
    }
}

/// Remove diacritics: decompose, drop combining marks, recompose.
pub fn strip_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_accents() {
        assert_eq!(strip_accents("ação técnica pública"), "acao tecnica publica");
        assert_eq!(strip_accents("Über naïve"), "Uber naive");
    }

    #[test]
    fn test_empty_and_blank_input() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("  \n\t  "), "");
        assert_eq!(normalizer.normalize(" - , ."), "");
    }

    #[test]
    fn test_case_accents_and_punctuation_do_not_matter() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("GESTÃO"), normalizer.normalize("gestão"));
        assert_eq!(normalizer.normalize("python,"), normalizer.normalize("Python"));
        assert_eq!(normalizer.normalize("(experiência)"), normalizer.normalize("experiência"));
    }

    #[test]
    fn test_output_is_plain_and_single_spaced() {
        let normalizer = TextNormalizer::new();
        let normalized = normalizer.normalize("Experiência   em gestão\nde  equipes técnicas");

        assert!(normalized.is_ascii());
        assert!(!normalized.contains("  "));
        assert_eq!(normalized.split(' ').count(), 6);
    }

    #[test]
    fn test_inflections_share_a_stem() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("engenheiro"), normalizer.normalize("engenheiros"));
        assert_eq!(normalizer.normalize("vendedora"), normalizer.normalize("vendedoras"));
    }

    #[test]
    fn test_idempotent_on_samples() {
        let normalizer = TextNormalizer::new();
        let samples = [
            "Engenheiro de Software experiência Python",
            "Vendedor experiência varejo",
            "Atendimento ao cliente, organização e comunicação!",
            "Análise de dados com SQL; relatórios gerenciais.",
            "Desenvolvedora backend (Rust/Go) — microsserviços",
        ];

        for sample in samples {
            let once = normalizer.normalize(sample);
            assert_eq!(normalizer.normalize(&once), once, "not idempotent for {sample:?}");
        }
    }
}
