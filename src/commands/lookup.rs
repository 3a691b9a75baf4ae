//! Read-only lookups: address options and parent accounts.

use oh_core::address::{AddressLevel, AddressSelection};
use tracing::{info_span, Instrument};

use crate::bootstrap::AppRuntime;

/// Selection with only the parent of `level` chosen.
fn selection_for(level: AddressLevel, parent: Option<u64>) -> AddressSelection {
    let mut selection = AddressSelection::default();
    if let (Some(parent_level), Some(id)) = (level.parent(), parent) {
        selection.select(parent_level, id);
    }
    selection
}

pub async fn address(
    runtime: &AppRuntime,
    level: AddressLevel,
    parent: Option<u64>,
) -> anyhow::Result<()> {
    let span = info_span!("command.lookup.address", ?level, ?parent);
    async {
        let options = runtime
            .usecases()
            .list_address_options()
            .execute(level, &selection_for(level, parent))
            .await?;
        if options.is_empty() && parent.is_none() && level.parent().is_some() {
            println!("{level:?} options depend on a selected parent; pass --parent <id>");
        }
        for option in options {
            println!("{:>6}  {}", option.id, option.name);
        }
        Ok(())
    }
    .instrument(span)
    .await
}

pub async fn search_parent(runtime: &AppRuntime, term: &str) -> anyhow::Result<()> {
    let span = info_span!("command.lookup.search_parent", term);
    async {
        let parents = runtime
            .usecases()
            .search_parent_accounts()
            .execute(term)
            .await?;
        if parents.is_empty() {
            println!("No matching accounts.");
        }
        for parent in parents {
            let contact = parent
                .contact()
                .map(|c| c.to_string())
                .unwrap_or_default();
            println!(
                "{:>6}  {:<30} {:<25} {} sub-accounts",
                parent.id,
                parent.full_name(),
                contact,
                parent.child_count
            );
        }
        Ok(())
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use oh_core::address::ParentFilter;

    #[test]
    fn parent_id_selects_the_parent_level_only() {
        let selection = selection_for(AddressLevel::Village, Some(40));

        assert_eq!(selection.union, Some(40));
        assert_eq!(
            selection.parent_filter(AddressLevel::Village),
            ParentFilter::Parent(AddressLevel::Union, 40)
        );
        assert_eq!(
            selection.parent_filter(AddressLevel::Para),
            ParentFilter::Unselected(AddressLevel::Village)
        );
    }

    #[test]
    fn root_level_ignores_parent() {
        let selection = selection_for(AddressLevel::Division, Some(7));
        assert_eq!(selection, AddressSelection::default());
    }
}
