use async_trait::async_trait;

use crate::address::{AddressId, AddressLevel, AddressOption};
use crate::api::ApiError;

#[async_trait]
pub trait AddressLookupPort: Send + Sync {
    /// Lists `level` entries, filtered by the parent selection when given.
    async fn list(
        &self,
        level: AddressLevel,
        parent: Option<(AddressLevel, AddressId)>,
    ) -> Result<Vec<AddressOption>, ApiError>;
}
