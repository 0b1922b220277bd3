// glacier-restore/src/restore/tier.rs
use crate::errors::ResolutionError;
use crate::storage::types::{RetrievalTier, StorageTier, TierRequest};

/// Picks the retrieval tier for a restore.
///
/// A concrete tier passes through untouched. `Fastest` maps each storage class
/// to the quickest retrieval it actually offers: Expedited for STANDARD_IA,
/// Standard for GLACIER (Flexible Retrieval has no Expedited without
/// provisioned capacity) and Bulk for DEEP_ARCHIVE. Any other class has no
/// defined target.
pub fn resolve(
    current: &StorageTier,
    requested: TierRequest,
) -> Result<RetrievalTier, ResolutionError> {
    match requested {
        TierRequest::Fixed(tier) => Ok(tier),
        TierRequest::Fastest => match current {
            StorageTier::StandardIa => Ok(RetrievalTier::Expedited),
            StorageTier::Glacier => Ok(RetrievalTier::Standard),
            StorageTier::DeepArchive => Ok(RetrievalTier::Bulk),
            other => Err(ResolutionError {
                tier: other.clone(),
            }),
        },
    }
}
