//! Read-only queries over the persisted indexes. Nothing here takes a lock or
//! writes to the store.
use std::collections::HashMap;

use fuzzy_matcher::{skim::SkimMatcherV2, FuzzyMatcher};
use log::{debug, info, trace};

use crate::{normalize_tag, DateRange, NoteRecord, NoteStorage, Result, TagRecord};

/// A query hit together with its relevance score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredNote {
    pub record: NoteRecord,
    pub score: i64,
}

/// Which timestamp a date query looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateField {
    Created,
    #[default]
    Modified,
}

impl NoteStorage {
    /// Notes whose title contains `query`, ignoring case. Every hit scores 1.
    pub fn search_by_title(&self, query: &str) -> Vec<ScoredNote> {
        let needle = query.to_lowercase();
        let hits: Vec<ScoredNote> = self
            .load_index()
            .into_iter()
            .filter(|(title, _)| title.to_lowercase().contains(&needle))
            .map(|(_, record)| ScoredNote { record, score: 1 })
            .collect();

        info!("Title search '{}' matched {} notes", query, hits.len());
        hits
    }

    /// Fuzzy title search, best match first.
    pub fn fuzzy_search_titles(&self, query: &str) -> Vec<ScoredNote> {
        let matcher = SkimMatcherV2::default();

        let mut hits: Vec<ScoredNote> = self
            .load_index()
            .into_values()
            .filter_map(|record| {
                matcher
                    .fuzzy_match(&record.title, query)
                    .map(|score| ScoredNote { record, score })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.record.title.cmp(&b.record.title))
        });
        hits
    }

    /// Scores each note by how many of `tags` it carries, highest first.
    /// Notes carrying none of them are left out.
    pub fn search_by_tags(&self, tags: &[String]) -> Result<Vec<ScoredNote>> {
        let tag_index = self.load_tag_index()?;
        let by_path: HashMap<String, NoteRecord> = self
            .load_index()
            .into_values()
            .map(|record| (record.file_path.clone(), record))
            .collect();

        let mut scores: HashMap<&str, i64> = HashMap::new();
        let wanted = normalized(tags);
        for tag in &wanted {
            match tag_index.get(tag) {
                Some(entry) => {
                    for path in &entry.notes {
                        *scores.entry(path.as_str()).or_insert(0) += 1;
                    }
                }
                None => trace!("No notes tagged '{}'", tag),
            }
        }

        let mut hits: Vec<ScoredNote> = scores
            .into_iter()
            .filter_map(|(path, score)| {
                by_path.get(path).map(|record| ScoredNote {
                    record: record.clone(),
                    score,
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.record.title.cmp(&b.record.title))
        });

        debug!("Tag search {:?} matched {} notes", wanted, hits.len());
        Ok(hits)
    }

    /// Notes carrying every one of `tags`.
    pub fn filter_by_all_tags(&self, tags: &[String]) -> Vec<NoteRecord> {
        let wanted = normalized(tags);
        self.load_index()
            .into_values()
            .filter(|record| wanted.iter().all(|tag| record.tags.contains(tag)))
            .collect()
    }

    /// Notes whose `field` timestamp lies in `range`. Empty timestamps never match.
    pub fn search_by_date(&self, range: &DateRange, field: DateField) -> Vec<NoteRecord> {
        let hits: Vec<NoteRecord> = self
            .load_index()
            .into_values()
            .filter(|record| {
                let stamp = match field {
                    DateField::Created => &record.created,
                    DateField::Modified => &record.modified,
                };
                range.contains(stamp)
            })
            .collect();

        debug!(
            "Date search {}..{} on {:?} matched {} notes",
            range.start,
            range.end,
            field,
            hits.len()
        );
        hits
    }

    /// Most recently visited (or, failing that, modified) notes first.
    pub fn recent_notes(&self, limit: usize) -> Vec<NoteRecord> {
        let mut notes = self.list_notes();
        notes.sort_by(|a, b| recency_key(b).cmp(recency_key(a)));
        notes.truncate(limit);
        notes
    }

    /// Tags ordered by how many notes carry them.
    pub fn popular_tags(&self, limit: usize) -> Result<Vec<TagRecord>> {
        let tags = self.load_tag_index()?;
        Ok(rank_by_count(
            tags.into_values().map(|t| (t.count, t)).collect(),
            limit,
        ))
    }
}

fn recency_key(record: &NoteRecord) -> &str {
    record.last_visited.as_deref().unwrap_or(&record.modified)
}

fn normalized(tags: &[String]) -> Vec<String> {
    let mut wanted: Vec<String> = Vec::new();
    for tag in tags.iter().filter_map(|t| normalize_tag(t)) {
        if !wanted.contains(&tag) {
            wanted.push(tag);
        }
    }
    wanted
}

/// Sorts items by a descending count, keeping insertion order among equals,
/// and keeps the first `limit`.
pub fn rank_by_count<T>(mut items: Vec<(usize, T)>, limit: usize) -> Vec<T> {
    items.sort_by(|a, b| b.0.cmp(&a.0));
    items.into_iter().take(limit).map(|(_, item)| item).collect()
}
