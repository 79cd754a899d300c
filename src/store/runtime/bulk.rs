use super::super::Store;
use super::super::action::{Action, AsyncAction};
use super::{describe, spawn};
use crate::application::bulk::BulkOperation;
use crate::domain::EntityKind;

pub fn load_property_definitions(store: &mut Store, org: String) {
    let github = store.services.github.clone();
    spawn(store, async move {
        let result = github
            .get_org_custom_property_definitions(&org)
            .await
            .map_err(describe);
        vec![Action::Async(AsyncAction::PropertyDefinitionsLoaded { org, result })]
    });
}

pub fn run_bulk(
    store: &mut Store,
    org: String,
    kind: EntityKind,
    targets: Vec<String>,
    operation: BulkOperation,
) {
    let bulk = store.services.bulk.clone();
    spawn(store, async move {
        let result = bulk.run(&org, kind, &targets, operation).await;
        vec![Action::Async(AsyncAction::BulkFinished { org, result })]
    });
}
