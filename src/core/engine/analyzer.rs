//! Language-aware text analysis.
//!
//! Every language maps to a tantivy analyzer: simple word splitting,
//! lowercasing, stop word removal and Snowball stemming. `none` skips the
//! last two steps.

use std::fmt;
use std::str::FromStr;
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer, TokenStream,
};

/// Tokens longer than this are dropped.
const MAX_TOKEN_LEN: usize = 40;

/// Languages supported by text indexes and text queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextLanguage {
    None,
    Danish,
    Dutch,
    English,
    Finnish,
    French,
    German,
    Hungarian,
    Italian,
    Norwegian,
    Portuguese,
    Romanian,
    Russian,
    Spanish,
    Swedish,
    Turkish,
}

impl TextLanguage {
    pub const ALL: [TextLanguage; 16] = [
        TextLanguage::None,
        TextLanguage::Danish,
        TextLanguage::Dutch,
        TextLanguage::English,
        TextLanguage::Finnish,
        TextLanguage::French,
        TextLanguage::German,
        TextLanguage::Hungarian,
        TextLanguage::Italian,
        TextLanguage::Norwegian,
        TextLanguage::Portuguese,
        TextLanguage::Romanian,
        TextLanguage::Russian,
        TextLanguage::Spanish,
        TextLanguage::Swedish,
        TextLanguage::Turkish,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TextLanguage::None => "none",
            TextLanguage::Danish => "danish",
            TextLanguage::Dutch => "dutch",
            TextLanguage::English => "english",
            TextLanguage::Finnish => "finnish",
            TextLanguage::French => "french",
            TextLanguage::German => "german",
            TextLanguage::Hungarian => "hungarian",
            TextLanguage::Italian => "italian",
            TextLanguage::Norwegian => "norwegian",
            TextLanguage::Portuguese => "portuguese",
            TextLanguage::Romanian => "romanian",
            TextLanguage::Russian => "russian",
            TextLanguage::Spanish => "spanish",
            TextLanguage::Swedish => "swedish",
            TextLanguage::Turkish => "turkish",
        }
    }

    /// Two-letter ISO 639-1 code, `None` for the `none` language.
    pub fn iso_code(self) -> Option<&'static str> {
        let code = match self {
            TextLanguage::None => return None,
            TextLanguage::Danish => "da",
            TextLanguage::Dutch => "nl",
            TextLanguage::English => "en",
            TextLanguage::Finnish => "fi",
            TextLanguage::French => "fr",
            TextLanguage::German => "de",
            TextLanguage::Hungarian => "hu",
            TextLanguage::Italian => "it",
            TextLanguage::Norwegian => "nb",
            TextLanguage::Portuguese => "pt",
            TextLanguage::Romanian => "ro",
            TextLanguage::Russian => "ru",
            TextLanguage::Spanish => "es",
            TextLanguage::Swedish => "sv",
            TextLanguage::Turkish => "tr",
        };
        Some(code)
    }

    fn stemmer_language(self) -> Option<Language> {
        let language = match self {
            TextLanguage::None => return None,
            TextLanguage::Danish => Language::Danish,
            TextLanguage::Dutch => Language::Dutch,
            TextLanguage::English => Language::English,
            TextLanguage::Finnish => Language::Finnish,
            TextLanguage::French => Language::French,
            TextLanguage::German => Language::German,
            TextLanguage::Hungarian => Language::Hungarian,
            TextLanguage::Italian => Language::Italian,
            TextLanguage::Norwegian => Language::Norwegian,
            TextLanguage::Portuguese => Language::Portuguese,
            TextLanguage::Romanian => Language::Romanian,
            TextLanguage::Russian => Language::Russian,
            TextLanguage::Spanish => Language::Spanish,
            TextLanguage::Swedish => Language::Swedish,
            TextLanguage::Turkish => Language::Turkish,
        };
        Some(language)
    }

    /// Name the analyzer is registered under in a tantivy index.
    pub fn tokenizer_name(self) -> String {
        format!("doctext_{}", self.name())
    }

    /// Build the analyzer for this language.
    pub fn analyzer(self) -> TextAnalyzer {
        let Some(language) = self.stemmer_language() else {
            return TextAnalyzer::builder(SimpleTokenizer::default())
                .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
                .filter(LowerCaser)
                .build();
        };

        match StopWordFilter::new(language) {
            Some(stop_words) => TextAnalyzer::builder(SimpleTokenizer::default())
                .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
                .filter(LowerCaser)
                .filter(stop_words)
                .filter(Stemmer::new(language))
                .build(),
            None => TextAnalyzer::builder(SimpleTokenizer::default())
                .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
                .filter(LowerCaser)
                .filter(Stemmer::new(language))
                .build(),
        }
    }

    /// Run `text` through this language's analyzer.
    pub fn terms(self, text: &str) -> Vec<String> {
        let mut analyzer = self.analyzer();
        let mut stream = analyzer.token_stream(text);
        let mut terms = Vec::new();
        while stream.advance() {
            terms.push(stream.token().text.clone());
        }
        terms
    }
}

impl fmt::Display for TextLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TextLanguage::ALL
            .into_iter()
            .find(|language| {
                language.name() == wanted || language.iso_code() == Some(wanted.as_str())
            })
            .ok_or_else(|| format!("language override unsupported: {s}"))
    }
}
