//! Waiters for object storage buckets
//!
//! Buckets carry no state field, so creation completes as soon as the bucket
//! can be fetched. Both waiters keep the engine's default timeout.

use futures::FutureExt;
use stratus_api::{Bucket, RegionScope};
use stratus_client::ObjectStorageApi;

use super::presence_of;
use crate::handler::AsyncActionHandler;
use crate::shape::{DeletionProbe, DeletionWaiter, Fetch, PresenceProbe, PresenceWaiter};

fn bucket_fetch<'a, C>(client: &'a C, scope: &RegionScope, bucket_name: &str) -> Fetch<'a, Bucket>
where
    C: ObjectStorageApi + ?Sized,
{
    let scope = scope.clone();
    let bucket_name = bucket_name.to_string();
    Box::new(move || {
        let (scope, bucket_name) = (scope.clone(), bucket_name.clone());
        async move { client.get_bucket(&scope, &bucket_name).await }.boxed()
    })
}

pub fn create_bucket<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    bucket_name: &str,
) -> PresenceWaiter<'a, Bucket>
where
    C: ObjectStorageApi + ?Sized,
{
    let resource = format!("bucket {bucket_name}");
    let probe = PresenceProbe::new(bucket_fetch(client, scope, bucket_name), resource.clone());
    AsyncActionHandler::new(probe).labelled(resource)
}

pub fn delete_bucket<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    bucket_name: &str,
) -> DeletionWaiter<'a>
where
    C: ObjectStorageApi + ?Sized,
{
    let resource = format!("bucket {bucket_name}");
    let probe = DeletionProbe::new(
        presence_of(bucket_fetch(client, scope, bucket_name)),
        resource.clone(),
    );
    AsyncActionHandler::new(probe).labelled(resource)
}
