//! Candidate accumulation and ranked selection.

use std::collections::HashSet;

use crate::repository::PageRecord;
use crate::scoring::KeywordSet;
use crate::types::{Candidate, ImageResult};
use crate::{DiagramError, Result};

/// Order candidates by score (highest first) and keep the first `limit`
/// distinct images.
///
/// The sort is stable, so equal scores keep discovery order.
pub fn rank(mut candidates: Vec<Candidate>, limit: usize) -> Vec<ImageResult> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.image.full_url.clone()))
        .take(limit)
        .map(|c| c.image)
        .collect()
}

/// Running state of one aggregation across primary and fallback searches.
pub(crate) struct SearchPass<'a> {
    keywords: &'a KeywordSet,
    candidates: Vec<Candidate>,
    seen: HashSet<String>,
    attempts: usize,
    failures: usize,
    last_error: Option<DiagramError>,
}

impl<'a> SearchPass<'a> {
    pub(crate) fn new(keywords: &'a KeywordSet) -> Self {
        Self {
            keywords,
            candidates: Vec::new(),
            seen: HashSet::new(),
            attempts: 0,
            failures: 0,
            last_error: None,
        }
    }

    /// Unique images accepted so far.
    pub(crate) fn accepted(&self) -> usize {
        self.candidates.len()
    }

    /// Score and keep every new image among `records`.
    ///
    /// Non-image records and URLs already accepted are skipped. Returns the
    /// number of images newly accepted.
    pub(crate) fn absorb(&mut self, records: &[PageRecord]) -> usize {
        self.attempts += 1;
        let before = self.candidates.len();
        for record in records {
            let Some(image) = record.to_image() else {
                continue;
            };
            if !self.seen.insert(image.full_url.clone()) {
                continue;
            }
            let score = self.keywords.score(&image.title, &record.description());
            self.candidates.push(Candidate::new(image, score));
        }
        self.candidates.len() - before
    }

    pub(crate) fn record_failure(&mut self, err: DiagramError) {
        self.attempts += 1;
        self.failures += 1;
        self.last_error = Some(err);
    }

    /// Rank the accepted images, or fail when every search failed.
    pub(crate) fn finish(self, query: &str, limit: usize) -> Result<Vec<ImageResult>> {
        if self.failures == self.attempts
            && let Some(last) = self.last_error
        {
            return Err(DiagramError::AggregationFailed {
                query: query.to_string(),
                attempts: self.attempts,
                source: Box::new(last),
            });
        }
        Ok(rank(self.candidates, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::StopWords;
    use serde_json::json;

    fn image(url: &str) -> ImageResult {
        ImageResult {
            title: url.to_string(),
            thumb_url: url.to_string(),
            full_url: url.to_string(),
            mime: "image/png".into(),
            author: "Unknown".into(),
            license: "Unknown license".into(),
            license_url: String::new(),
        }
    }

    fn record(title: &str, url: &str, mime: &str) -> PageRecord {
        serde_json::from_value(json!({
            "title": format!("File:{title}"),
            "imageinfo": [{ "url": url, "mime": mime }]
        }))
        .unwrap()
    }

    #[test]
    fn rank_orders_by_score_and_keeps_ties_stable() {
        let ranked = rank(
            vec![
                Candidate::new(image("a"), 1),
                Candidate::new(image("b"), 3),
                Candidate::new(image("c"), 1),
                Candidate::new(image("d"), 3),
            ],
            8,
        );
        let urls: Vec<&str> = ranked.iter().map(|i| i.full_url.as_str()).collect();
        assert_eq!(urls, ["b", "d", "a", "c"]);
    }

    #[test]
    fn rank_truncates_and_dedups() {
        let ranked = rank(
            vec![
                Candidate::new(image("a"), 2),
                Candidate::new(image("a"), 1),
                Candidate::new(image("b"), 0),
                Candidate::new(image("c"), 0),
            ],
            2,
        );
        let urls: Vec<&str> = ranked.iter().map(|i| i.full_url.as_str()).collect();
        assert_eq!(urls, ["a", "b"]);
    }

    #[test]
    fn absorb_filters_and_dedups() {
        let keywords = KeywordSet::extract("heart", &StopWords::default());
        let mut pass = SearchPass::new(&keywords);
        let added = pass.absorb(&[
            record("Heart.svg", "u1", "image/svg+xml"),
            record("Notes.pdf", "u2", "application/pdf"),
            record("Heart copy.svg", "u1", "image/svg+xml"),
            record("Valve.png", "u3", "image/png"),
        ]);
        assert_eq!(added, 2);
        assert_eq!(pass.accepted(), 2);

        let images = pass.finish("heart", 8).unwrap();
        assert_eq!(images[0].full_url, "u1");
        assert_eq!(images[1].full_url, "u3");
    }

    #[test]
    fn finish_fails_only_when_every_search_failed() {
        let keywords = KeywordSet::default();

        let mut all_failed = SearchPass::new(&keywords);
        all_failed.record_failure(DiagramError::Http("reset".into()));
        all_failed.record_failure(DiagramError::Http("reset again".into()));
        match all_failed.finish("heart", 8) {
            Err(DiagramError::AggregationFailed { attempts, .. }) => assert_eq!(attempts, 2),
            other => panic!("expected aggregation failure, got {other:?}"),
        }

        let mut partly_failed = SearchPass::new(&keywords);
        partly_failed.record_failure(DiagramError::Http("reset".into()));
        partly_failed.absorb(&[]);
        assert!(partly_failed.finish("heart", 8).unwrap().is_empty());
    }
}
