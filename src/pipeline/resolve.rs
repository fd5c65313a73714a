use std::collections::BTreeSet;

use crate::error::PipelineError;
use crate::models::{GroupReference, ResolvedGroupMetadata};

use super::SocialNetwork;

/// Fields requested from the batch lookup.
pub const GROUP_FIELDS: [&str; 9] = [
    "id",
    "name",
    "screen_name",
    "type",
    "photo_200",
    "description",
    "place",
    "public_date_label",
    "start_date",
];

/// Looks up every reference in one call and keeps only event communities.
///
/// An empty reference set never reaches the network.
pub fn resolve_events<N>(
    network: &N,
    references: &BTreeSet<GroupReference>,
) -> Result<Vec<ResolvedGroupMetadata>, PipelineError>
where
    N: SocialNetwork + ?Sized,
{
    if references.is_empty() {
        tracing::debug!("no community mentions, skipping group lookup");
        return Ok(Vec::new());
    }

    let ids = references
        .iter()
        .map(|reference| reference.as_str().to_string())
        .collect::<Vec<_>>();
    let groups = network
        .get_groups_by_id(&ids, &GROUP_FIELDS)
        .map_err(|err| PipelineError::ResolutionFailed(err.to_string()))?;

    let total = groups.len();
    let events = groups
        .into_iter()
        .filter(ResolvedGroupMetadata::is_event)
        .collect::<Vec<_>>();
    tracing::debug!(requested = ids.len(), total, events = events.len(), "resolved groups");
    Ok(events)
}
