//! Source diffing for channel settle
//!
//! Matching is by identity `(playlist id, stream name)` within the channel,
//! never by value: a stored source whose upstream URL has since changed is
//! still reused as-is, keeping its row id and mux uuid.

use std::collections::{HashMap, HashSet};

use crate::errors::{AppError, AppResult};
use crate::models::{ChannelSource, NewChannelSource, PlannedSource, SourceKey, SourceRequest};
use crate::sources::SourceResolver;

/// Outcome of diffing a channel's stored sources against a requested list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDiff {
    /// The new source list in request order
    pub planned: Vec<PlannedSource>,
    /// Stored sources absent from the request
    pub orphaned: Vec<ChannelSource>,
}

impl SourceDiff {
    pub fn reused(&self) -> impl Iterator<Item = &ChannelSource> {
        self.planned.iter().filter_map(|planned| match planned {
            PlannedSource::Reuse(source) => Some(source),
            PlannedSource::Create(_) => None,
        })
    }

    pub fn created(&self) -> impl Iterator<Item = &NewChannelSource> {
        self.planned.iter().filter_map(|planned| match planned {
            PlannedSource::Create(source) => Some(source),
            PlannedSource::Reuse(_) => None,
        })
    }

    /// Ids of orphaned rows, for the store commit
    pub fn orphaned_ids(&self) -> Vec<i32> {
        self.orphaned.iter().map(|source| source.id).collect()
    }

    /// Orphans whose mux must be deleted on Tvheadend before the row goes
    pub fn orphaned_muxes(&self) -> impl Iterator<Item = (&ChannelSource, &str)> {
        self.orphaned.iter().filter_map(|source| {
            source
                .tvh_uuid
                .as_deref()
                .filter(|uuid| !uuid.is_empty())
                .map(|uuid| (source, uuid))
        })
    }
}

/// Diff `existing` (one channel's stored sources) against `requested`.
///
/// New entries resolve their stream URL through `resolver`; a stream missing
/// from its playlist's cached listing fails the whole plan with
/// [`AppError::Resolution`]. A request naming the same source twice is
/// rejected as a validation error.
pub fn plan_sources<R>(
    existing: &[ChannelSource],
    requested: &[SourceRequest],
    resolver: &R,
) -> AppResult<SourceDiff>
where
    R: SourceResolver + ?Sized,
{
    let by_key: HashMap<SourceKey, &ChannelSource> = existing
        .iter()
        .map(|source| (source.key(), source))
        .collect();

    let mut seen: HashSet<SourceKey> = HashSet::with_capacity(requested.len());
    let mut kept: HashSet<i32> = HashSet::with_capacity(existing.len());
    let mut planned = Vec::with_capacity(requested.len());

    for request in requested {
        let key = request.key();
        if !seen.insert(key.clone()) {
            return Err(AppError::validation(format!(
                "source {key} is listed more than once"
            )));
        }

        match by_key.get(&key) {
            Some(source) => {
                kept.insert(source.id);
                planned.push(PlannedSource::Reuse((*source).clone()));
            }
            None => {
                let listing = resolver.listing(request.playlist_id).ok_or_else(|| {
                    AppError::resolution(
                        request.playlist_id,
                        &request.stream_name,
                        "playlist has no cached listing",
                    )
                })?;
                let entry = listing.get(&request.stream_name).ok_or_else(|| {
                    AppError::resolution(
                        request.playlist_id,
                        &request.stream_name,
                        "stream is not in the playlist listing",
                    )
                })?;
                planned.push(PlannedSource::Create(NewChannelSource {
                    playlist_id: request.playlist_id,
                    stream_name: request.stream_name.clone(),
                    stream_url: entry.url.clone(),
                }));
            }
        }
    }

    let orphaned = existing
        .iter()
        .filter(|source| !kept.contains(&source.id))
        .cloned()
        .collect();

    Ok(SourceDiff { planned, orphaned })
}
