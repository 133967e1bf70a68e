//! Scripted in-memory API clients shared by the integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use stratus_api::{
    Bucket, DatabaseFamily, DbInstance, Intake, IntakeRunner, IntakeUser, Network, RegionScope,
    Server, Volume,
};
use stratus_client::{ClientError, DbFlexApi, IaasApi, IntakeApi, ObjectStorageApi, Result};

/// One scripted API answer
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Status(u16),
    Empty,
}

impl<T> Reply<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Status(status) => Err(ClientError::Api {
                status,
                message: format!("scripted status {status}"),
            }),
            Reply::Empty => Err(ClientError::EmptyResponse),
        }
    }
}

/// Replies handed out in order; the last one repeats forever
#[derive(Debug)]
pub struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
    calls: AtomicU32,
}

impl<T: Clone> Script<T> {
    pub fn new(replies: Vec<Reply<T>>) -> Self {
        assert!(!replies.is_empty(), "script needs at least one reply");
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn next(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().unwrap()
        };
        reply.into_result()
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Mock client keyed by resource id, implementing every service trait
#[derive(Default)]
pub struct MockCloud {
    pub runners: HashMap<String, Script<IntakeRunner>>,
    pub intakes: HashMap<String, Script<Intake>>,
    pub users: HashMap<String, Script<IntakeUser>>,
    pub servers: HashMap<String, Script<Server>>,
    pub volumes: HashMap<String, Script<Volume>>,
    pub networks: HashMap<String, Script<Network>>,
    pub buckets: HashMap<String, Script<Bucket>>,
    pub instances: HashMap<String, Script<DbInstance>>,
    pub seen_scopes: Mutex<Vec<RegionScope>>,
    pub seen_families: Mutex<Vec<DatabaseFamily>>,
}

fn lookup<T: Clone>(scripts: &HashMap<String, Script<T>>, id: &str) -> Result<T> {
    match scripts.get(id) {
        Some(script) => script.next(),
        None => Err(ClientError::Api {
            status: 404,
            message: format!("{id} not found"),
        }),
    }
}

impl MockCloud {
    fn record(&self, scope: &RegionScope) {
        self.seen_scopes.lock().unwrap().push(scope.clone());
    }
}

#[async_trait]
impl IntakeApi for MockCloud {
    async fn get_intake_runner(
        &self,
        scope: &RegionScope,
        runner_id: &str,
    ) -> Result<IntakeRunner> {
        self.record(scope);
        lookup(&self.runners, runner_id)
    }

    async fn get_intake(&self, scope: &RegionScope, intake_id: &str) -> Result<Intake> {
        self.record(scope);
        lookup(&self.intakes, intake_id)
    }

    async fn get_intake_user(
        &self,
        scope: &RegionScope,
        intake_id: &str,
        user_id: &str,
    ) -> Result<IntakeUser> {
        self.record(scope);
        lookup(&self.users, &format!("{intake_id}/{user_id}"))
    }
}

#[async_trait]
impl IaasApi for MockCloud {
    async fn get_server(&self, scope: &RegionScope, server_id: &str) -> Result<Server> {
        self.record(scope);
        lookup(&self.servers, server_id)
    }

    async fn get_volume(&self, scope: &RegionScope, volume_id: &str) -> Result<Volume> {
        self.record(scope);
        lookup(&self.volumes, volume_id)
    }

    async fn get_network(&self, scope: &RegionScope, network_id: &str) -> Result<Network> {
        self.record(scope);
        lookup(&self.networks, network_id)
    }
}

#[async_trait]
impl ObjectStorageApi for MockCloud {
    async fn get_bucket(&self, scope: &RegionScope, bucket_name: &str) -> Result<Bucket> {
        self.record(scope);
        lookup(&self.buckets, bucket_name)
    }
}

#[async_trait]
impl DbFlexApi for MockCloud {
    async fn get_db_instance(
        &self,
        family: DatabaseFamily,
        scope: &RegionScope,
        instance_id: &str,
    ) -> Result<DbInstance> {
        self.record(scope);
        self.seen_families.lock().unwrap().push(family);
        lookup(&self.instances, instance_id)
    }
}

pub fn scope() -> RegionScope {
    RegionScope::new("pid", "eu01")
}
