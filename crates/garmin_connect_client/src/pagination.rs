//! Lazy paging over the activity list.

use crate::{ActivityRef, GarminConnect, GarminError};
use futures_util::stream::{self, Stream, TryStreamExt};
use tracing::debug;

pub const DEFAULT_BATCH_SIZE: u32 = 100;

type Batch = stream::Iter<std::vec::IntoIter<Result<ActivityRef, GarminError>>>;

async fn next_batch<C>(
    client: &C,
    start: u32,
    batch_size: u32,
) -> Result<Option<(Batch, u32)>, GarminError>
where
    C: GarminConnect + ?Sized,
{
    debug!(
        "fetching activities {} through {} ...",
        start,
        start.saturating_add(batch_size - 1)
    );
    let batch = client.fetch_activity_batch(start, batch_size).await?;
    if batch.is_empty() {
        return Ok(None);
    }
    debug!("got {} activities", batch.len());
    let items: Vec<_> = batch.into_iter().map(Ok).collect();
    Ok(Some((stream::iter(items), start.saturating_add(batch_size))))
}

/// Every activity of the account, most recent first, in the order upstream
/// returns them.
///
/// Batches are requested one after another at increasing offsets until an
/// empty batch comes back. Each call starts over from offset zero.
pub fn list_activities<'a, C>(
    client: &'a C,
    batch_size: u32,
) -> impl Stream<Item = Result<ActivityRef, GarminError>> + 'a
where
    C: GarminConnect + ?Sized + 'a,
{
    let batch_size = batch_size.max(1);
    stream::try_unfold(0u32, move |start| next_batch(client, start, batch_size)).try_flatten()
}

/// Collect [`list_activities`] into a vector.
pub async fn list_all_activities<C>(
    client: &C,
    batch_size: u32,
) -> Result<Vec<ActivityRef>, GarminError>
where
    C: GarminConnect + ?Sized,
{
    list_activities(client, batch_size).try_collect().await
}
