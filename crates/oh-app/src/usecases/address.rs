use std::sync::Arc;

use tracing::{debug, info_span, Instrument};

use oh_core::address::{AddressLevel, AddressOption, AddressSelection, ParentFilter};
use oh_core::api::ApiError;
use oh_core::ports::AddressLookupPort;

/// Loads the options of one address level for the current selection.
pub struct ListAddressOptions {
    lookup: Arc<dyn AddressLookupPort>,
}

impl ListAddressOptions {
    pub fn new(lookup: Arc<dyn AddressLookupPort>) -> Self {
        Self { lookup }
    }

    /// Returns an empty list, without a request, while the parent level is unselected.
    pub async fn execute(
        &self,
        level: AddressLevel,
        selection: &AddressSelection,
    ) -> Result<Vec<AddressOption>, ApiError> {
        let span = info_span!("usecase.list_address_options.execute", ?level);

        async {
            let parent = match selection.parent_filter(level) {
                ParentFilter::Root => None,
                ParentFilter::Parent(parent, id) => Some((parent, id)),
                ParentFilter::Unselected(parent) => {
                    debug!(?parent, "parent level unselected, skipping lookup");
                    return Ok(Vec::new());
                }
            };
            let options = self.lookup.list(level, parent).await?;
            debug!(count = options.len(), "address options loaded");
            Ok(options)
        }
        .instrument(span)
        .await
    }
}
