use std::cmp::Ordering;

use super::MediaTypeError;
use super::range::{AcceptHeader, MediaRange, parse_accept_header, parse_media_range};

/// How well one concrete media type fits a parsed `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub fitness: i32,
    pub quality: f64,
}

impl CandidateScore {
    pub const NO_MATCH: CandidateScore = CandidateScore {
        fitness: -1,
        quality: 0.0,
    };

    /// A score the client is willing to receive.
    pub fn is_acceptable(&self) -> bool {
        self.fitness >= 0 && self.quality > 0.0
    }

    fn rank(&self, other: &Self) -> Ordering {
        self.fitness
            .cmp(&other.fitness)
            .then(self.quality.total_cmp(&other.quality))
    }
}

/// Score `candidate` against every range and keep the most specific match.
///
/// Ranges are visited in header order; on equal fitness the earlier range wins.
pub fn fitness_and_quality(candidate: &MediaRange, ranges: &[MediaRange]) -> CandidateScore {
    let mut best = CandidateScore::NO_MATCH;

    for range in ranges {
        let type_matches = range.type_ == candidate.type_
            || range.is_wildcard_type()
            || candidate.is_wildcard_type();
        let subtype_matches = range.subtype == candidate.subtype
            || range.is_wildcard_subtype()
            || candidate.is_wildcard_subtype();

        if !(type_matches && subtype_matches) {
            continue;
        }

        let param_matches = candidate
            .params
            .iter()
            .filter(|(key, value)| key != "q" && range.param(key) == Some(value.as_str()))
            .count() as i32;

        let mut fitness = param_matches;
        if range.type_ == candidate.type_ {
            fitness += 100;
        }
        if range.subtype == candidate.subtype {
            fitness += 10;
        }

        if fitness > best.fitness {
            best = CandidateScore {
                fitness,
                quality: range.quality(),
            };
        }
    }

    best
}

/// Score a list of candidate strings, dropping the ones that do not parse.
fn score_all<'a, S: AsRef<str>>(
    candidates: &'a [S],
    accept: &AcceptHeader,
) -> Vec<(&'a str, CandidateScore)> {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter_map(|candidate| match parse_media_range(candidate) {
            Ok(parsed) => Some((candidate, fitness_and_quality(&parsed, &accept.ranges))),
            Err(err) => {
                tracing::warn!(%candidate, error = %err, "Skipping unparsable candidate media type");
                None
            }
        })
        .collect()
}

/// Pick the single best candidate.
///
/// Equal scores resolve to the candidate that comes later in `candidates`,
/// the same element a stable ascending sort would leave last.
pub fn best_match<'a, S: AsRef<str>>(candidates: &'a [S], accept: &AcceptHeader) -> Option<&'a str> {
    let mut best: Option<(&str, CandidateScore)> = None;

    for (candidate, score) in score_all(candidates, accept) {
        match best {
            Some((_, current)) if score.rank(&current) == Ordering::Less => {}
            _ => best = Some((candidate, score)),
        }
    }

    best.filter(|(_, score)| score.is_acceptable())
        .map(|(candidate, _)| candidate)
}

/// Every candidate tied for the best score, in input order.
pub fn all_best_matches<'a, S: AsRef<str>>(
    candidates: &'a [S],
    accept: &AcceptHeader,
) -> Vec<&'a str> {
    let scored = score_all(candidates, accept);

    let Some(top) = scored
        .iter()
        .map(|(_, score)| *score)
        .max_by(|a, b| a.rank(b))
    else {
        return Vec::new();
    };

    if !top.is_acceptable() {
        return Vec::new();
    }

    scored
        .into_iter()
        .filter(|(_, score)| score.rank(&top) == Ordering::Equal)
        .map(|(candidate, _)| candidate)
        .collect()
}

/// Quality of `media_type` under a raw `Accept` header string.
pub fn quality(media_type: &str, header: &str) -> Result<f64, MediaTypeError> {
    let accept = parse_accept_header(header)?;
    let candidate = parse_media_range(media_type)?;
    Ok(fitness_and_quality(&candidate, &accept.ranges).quality)
}

/// [`best_match`] over a raw `Accept` header string.
pub fn best_match_str<'a, S: AsRef<str>>(
    candidates: &'a [S],
    header: &str,
) -> Result<Option<&'a str>, MediaTypeError> {
    let accept = parse_accept_header(header)?;
    Ok(best_match(candidates, &accept))
}
