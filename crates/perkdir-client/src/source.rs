use std::future::Future;

use perkdir_core::PerkRecord;

use crate::error::ClientError;

/// Anything that can produce the public perk collection in one call.
///
/// [`crate::PerksClient`] is the HTTP implementation; tests substitute an
/// in-memory source.
pub trait PerkSource: Send + Sync + 'static {
    fn fetch_public_perks(
        &self,
    ) -> impl Future<Output = Result<Vec<PerkRecord>, ClientError>> + Send;
}
