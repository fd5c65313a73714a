use crate::error::PipelineError;
use crate::models::RawPost;

use super::SocialNetwork;

/// Reads up to `count` posts from the wall of community `community_id`.
pub fn fetch_posts<N>(
    network: &N,
    community_id: i64,
    count: u32,
) -> Result<Vec<RawPost>, PipelineError>
where
    N: SocialNetwork + ?Sized,
{
    network
        .get_posts(-community_id, count)
        .map_err(|err| PipelineError::FetchFailed(err.to_string()))
}
