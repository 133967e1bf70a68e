//! Resource waiter catalog
//!
//! One constructor per (resource, operation) pair. Each captures the API
//! client and identifiers, installs the probe shape with its state sets and
//! sets the resource's default timeout. Callers may still override timing on
//! the returned handler.

pub mod dbflex;
pub mod iaas;
pub mod intake;
pub mod object_storage;

use std::time::Duration;

use futures::FutureExt;

use crate::shape::Fetch;

const fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

pub const INTAKE_RUNNER_TIMEOUT: Duration = minutes(15);
pub const INTAKE_TIMEOUT: Duration = minutes(10);
pub const INTAKE_USER_TIMEOUT: Duration = minutes(5);
pub const SERVER_TIMEOUT: Duration = minutes(15);
pub const VOLUME_TIMEOUT: Duration = minutes(10);
pub const NETWORK_TIMEOUT: Duration = minutes(10);
pub const DB_CREATE_TIMEOUT: Duration = minutes(45);
pub const DB_UPDATE_TIMEOUT: Duration = minutes(30);
pub const DB_DELETE_TIMEOUT: Duration = minutes(30);

/// Discard the snapshot; deletion only cares whether the lookup succeeded
fn presence_of<'a, T: Send + 'a>(mut fetch: Fetch<'a, T>) -> Fetch<'a, ()> {
    Box::new(move || {
        let lookup = fetch();
        async move { lookup.await.map(|_| ()) }.boxed()
    })
}
