//! Candidate scan: who, if anyone, is in the live photo.

use crate::errors::{AppError, AppResult};
use crate::faces::comparer::FaceComparer;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How the scanner picks among verified candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// Stop at the first verified candidate in stored order.
    #[default]
    FirstMatch,
    /// Scan everyone, keep the verified candidate with the smallest distance.
    BestMatch,
}

/// Uploaded photo plus its declared content type.
#[derive(Debug, Clone, Copy)]
pub struct LivePhoto<'a> {
    pub bytes: &'a [u8],
    pub content_type: &'a str,
}

/// One registered identity as seen by the scanner.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub identity_id: i64,
    pub reference: Option<&'a [u8]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchOutcome {
    Matched { identity_id: i64, distance: f64 },
    NoMatch,
}

/// Size floor and `image/*` content type, shared by live and reference photos.
pub fn check_photo(photo: &LivePhoto, min_bytes: usize) -> AppResult<()> {
    if photo.bytes.is_empty() {
        return Err(AppError::InvalidImage("empty upload".into()));
    }
    if photo.bytes.len() < min_bytes {
        return Err(AppError::InvalidImage(format!(
            "{} bytes, at least {} expected",
            photo.bytes.len(),
            min_bytes
        )));
    }
    if !photo.content_type.trim().to_lowercase().starts_with("image/") {
        return Err(AppError::InvalidImage(format!(
            "content type '{}' is not an image",
            photo.content_type
        )));
    }
    Ok(())
}

pub struct FaceMatchScanner<'a> {
    comparer: &'a dyn FaceComparer,
    policy: MatchPolicy,
    min_bytes: usize,
}

impl<'a> FaceMatchScanner<'a> {
    pub fn new(comparer: &'a dyn FaceComparer, policy: MatchPolicy, min_bytes: usize) -> Self {
        Self {
            comparer,
            policy,
            min_bytes,
        }
    }

    /// Cheap corruption check before any comparison runs.
    pub fn validate(&self, photo: &LivePhoto) -> AppResult<()> {
        check_photo(photo, self.min_bytes)
    }

    /// Sequential O(n) scan in candidate order.
    ///
    /// Candidates without a reference are skipped; a comparer failure counts
    /// as "not verified" for that candidate only.
    pub fn find_match<'c, I>(&self, photo: &LivePhoto, candidates: I) -> AppResult<MatchOutcome>
    where
        I: IntoIterator<Item = Candidate<'c>>,
    {
        self.validate(photo)?;

        let mut best = MatchOutcome::NoMatch;
        for candidate in candidates {
            let Some(reference) = candidate.reference.filter(|r| !r.is_empty()) else {
                tracing::debug!(identity_id = candidate.identity_id, "no reference image, skipped");
                continue;
            };

            let verification = match self.comparer.compare(reference, photo.bytes) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(identity_id = candidate.identity_id, error = %e, "comparison failed, treated as no match");
                    continue;
                }
            };
            tracing::trace!(
                identity_id = candidate.identity_id,
                distance = verification.distance,
                verified = verification.verified
            );
            if !verification.verified {
                continue;
            }

            let found = MatchOutcome::Matched {
                identity_id: candidate.identity_id,
                distance: verification.distance,
            };
            match self.policy {
                MatchPolicy::FirstMatch => return Ok(found),
                MatchPolicy::BestMatch => {
                    let closer = match best {
                        MatchOutcome::Matched { distance, .. } => verification.distance < distance,
                        MatchOutcome::NoMatch => true,
                    };
                    if closer {
                        best = found;
                    }
                }
            }
        }

        Ok(best)
    }
}
