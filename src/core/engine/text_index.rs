//! Tantivy-backed text index over one collection.
//!
//! Each indexed document carries its position in the collection; the
//! string values of every indexed field go into a single multi-valued
//! `content` field analyzed with the index language.

use super::analyzer::TextLanguage;
use super::filter::resolve_path;
use crate::core::error::{DoctextError, Result};
use crate::core::types::RawDocument;
use serde_json::Value as JsonValue;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, STORED,
};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

/// Smallest heap tantivy accepts for a single indexing thread.
const WRITER_HEAP_BYTES: usize = 15_000_000;

/// A parsed text search string, before analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextQuery {
    /// Words that may match (includes the words of every phrase)
    pub terms: Vec<String>,
    /// Words prefixed with `-`
    pub negated: Vec<String>,
    /// Quoted phrases that must appear verbatim (case-insensitive)
    pub phrases: Vec<String>,
}

impl TextQuery {
    pub fn parse(search: &str) -> Self {
        let mut query = TextQuery::default();
        let mut rest = search;

        while let Some(start) = rest.find('"') {
            query.push_words(&rest[..start]);
            let after = &rest[start + 1..];
            let (phrase, remaining) = match after.find('"') {
                Some(end) => (&after[..end], &after[end + 1..]),
                None => (after, ""),
            };
            let phrase = phrase.trim();
            if !phrase.is_empty() {
                query.terms.push(phrase.to_string());
                query.phrases.push(phrase.to_string());
            }
            rest = remaining;
        }
        query.push_words(rest);

        query
    }

    fn push_words(&mut self, text: &str) {
        for word in text.split_whitespace() {
            match word.strip_prefix('-') {
                Some(negated) if !negated.is_empty() => self.negated.push(negated.to_string()),
                Some(_) => {}
                None => self.terms.push(word.to_string()),
            }
        }
    }

    /// Analyzed positive and negated terms, deduplicated in query order.
    pub fn analyze(&self, language: TextLanguage) -> (Vec<String>, Vec<String>) {
        (
            analyze_words(&self.terms, language),
            analyze_words(&self.negated, language),
        )
    }
}

fn analyze_words(words: &[String], language: TextLanguage) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for word in words {
        for term in language.terms(word) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
    }
    terms
}

/// Text index for a single collection
pub struct TextIndex {
    index: Index,
    reader: IndexReader,
    content: Field,
    position: Field,
    fields: Vec<String>,
    language: TextLanguage,
}

impl std::fmt::Debug for TextIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextIndex")
            .field("fields", &self.fields)
            .field("language", &self.language)
            .finish()
    }
}

impl TextIndex {
    /// Create an empty in-memory index over `fields`
    pub fn create(fields: Vec<String>, language: TextLanguage) -> Result<Self> {
        let tokenizer = language.tokenizer_name();

        let mut builder = Schema::builder();
        let content_options = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(&tokenizer)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        );
        let content = builder.add_text_field("content", content_options);
        let position = builder.add_u64_field("position", STORED);
        let schema = builder.build();

        let index = Index::create_in_ram(schema);
        index.tokenizers().register(&tokenizer, language.analyzer());

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| DoctextError::Engine(format!("Failed to create reader: {e}")))?;

        Ok(Self {
            index,
            reader,
            content,
            position,
            fields,
            language,
        })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn language(&self) -> TextLanguage {
        self.language
    }

    /// String values of the indexed fields, array elements flattened
    pub fn indexed_values<'a>(&self, document: &'a RawDocument) -> Vec<&'a str> {
        let mut values = Vec::new();
        for field in &self.fields {
            for value in resolve_path(document, field) {
                match value {
                    JsonValue::String(text) => values.push(text.as_str()),
                    JsonValue::Array(items) => {
                        values.extend(items.iter().filter_map(JsonValue::as_str))
                    }
                    _ => {}
                }
            }
        }
        values
    }

    /// Index documents keyed by their collection position, then commit
    pub fn add_documents<'a>(
        &self,
        documents: impl IntoIterator<Item = (u64, &'a RawDocument)>,
    ) -> Result<()> {
        let mut writer: IndexWriter = self
            .index
            .writer_with_num_threads(1, WRITER_HEAP_BYTES)
            .map_err(|e| DoctextError::Engine(format!("Failed to create writer: {e}")))?;

        for (position, document) in documents {
            let mut entry = TantivyDocument::default();
            entry.add_u64(self.position, position);
            for text in self.indexed_values(document) {
                entry.add_text(self.content, text);
            }
            writer
                .add_document(entry)
                .map_err(|e| DoctextError::Engine(format!("Failed to add document: {e}")))?;
        }

        writer
            .commit()
            .map_err(|e| DoctextError::Engine(format!("Failed to commit: {e}")))?;
        self.reader
            .reload()
            .map_err(|e| DoctextError::Engine(format!("Failed to reload reader: {e}")))?;

        Ok(())
    }

    /// BM25 search: any of `terms`, none of `negated`.
    ///
    /// Returns `(score, position)` pairs, best first, ties broken by
    /// position.
    pub fn search(
        &self,
        terms: &[String],
        negated: &[String],
        max_hits: usize,
    ) -> Result<Vec<(f32, u64)>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for term in terms {
            clauses.push((Occur::Should, self.term_query(term)));
        }
        for term in negated {
            clauses.push((Occur::MustNot, self.term_query(term)));
        }
        let query = BooleanQuery::new(clauses);

        let searcher = self.reader.searcher();
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(max_hits.max(1)))
            .map_err(|e| DoctextError::Engine(format!("Search failed: {e}")))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| DoctextError::Engine(format!("Failed to retrieve document: {e}")))?;
            if let Some(position) = doc.get_first(self.position).and_then(|v| v.as_u64()) {
                hits.push((score, position));
            }
        }

        hits.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        Ok(hits)
    }

    fn term_query(&self, term: &str) -> Box<dyn Query> {
        Box::new(TermQuery::new(
            Term::from_field_text(self.content, term),
            IndexRecordOption::WithFreqs,
        ))
    }
}
