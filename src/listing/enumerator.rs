// glacier-restore/src/listing/enumerator.rs
use futures::stream::{self, Stream, TryStreamExt};

use crate::errors::StoreError;
use crate::storage::ArchiveStore;
use crate::storage::types::ObjectDescriptor;

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazily pages through every object under `prefix`.
///
/// Each page is fetched only when the previous one has been consumed, using
/// its continuation cursor. The stream ends when a page comes back without a
/// cursor (an empty cursor counts as none). A failed page fetch is yielded as
/// an error and ends the stream; nothing is retried.
pub fn enumerate<'a>(
    store: &'a dyn ArchiveStore,
    container: &'a str,
    prefix: &'a str,
) -> impl Stream<Item = Result<ObjectDescriptor, StoreError>> + 'a {
    stream::try_unfold(Cursor::Start, move |cursor| async move {
        let token = match cursor {
            Cursor::Done => return Ok::<_, StoreError>(None),
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
        };
        let page = store.list_page(container, prefix, token).await?;
        let next = match page.next_cursor {
            Some(token) if !token.is_empty() => Cursor::Next(token),
            _ => Cursor::Done,
        };
        Ok::<_, StoreError>(Some((page.objects, next)))
    })
    .map_ok(|objects| stream::iter(objects.into_iter().map(Ok::<_, StoreError>)))
    .try_flatten()
}
