//! Container discovery: the flat set of task lists to query under a scope.
//!
//! Two independent upstream listings are combined: folders with their
//! nested lists, flattened to one container per list and tagged with the
//! owning folder, plus standalone/hidden lists with no folder tag. The
//! union is a plain concatenation. A list surfacing in both listings is
//! kept twice; the resulting double-query is idempotent.

use crate::api::UpstreamApi;
use crate::error::Result;
use crate::types::Container;

/// Discover every task container under a scope.
pub async fn discover_containers<A: UpstreamApi>(
    api: &A,
    scope_id: &str,
) -> Result<Vec<Container>> {
    let folders = api.fetch_folders(scope_id).await?;
    let mut containers: Vec<Container> = Vec::new();

    for folder in &folders {
        for list in &folder.lists {
            containers.push(Container {
                id: list.id.clone(),
                name: list.name.clone(),
                folder_id: Some(folder.id.clone()),
                folder_name: Some(folder.name.clone()),
            });
        }
    }
    let from_folders = containers.len();

    let loose = api.fetch_lists(scope_id).await?;
    containers.extend(loose.into_iter().map(|list| Container {
        id: list.id,
        name: list.name,
        folder_id: None,
        folder_name: None,
    }));

    tracing::debug!(
        scope_id,
        from_folders,
        loose = containers.len() - from_folders,
        "containers discovered"
    );
    Ok(containers)
}
