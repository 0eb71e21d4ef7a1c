//! In-memory [`ArchiveApi`] for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use ona_archive_client::{Error as ApiError, Quality};
use ona_protocol::{
    ArchivingStatus, Head, Id, ObjectInstance, ObjectInstances, ObjectRef, Objects, SizeAndId,
    Status,
};

use crate::api::{ApiFuture, ArchiveApi};

pub(crate) struct MockApi {
    pub(crate) duplicates: Vec<ObjectRef>,
    pub(crate) existing: ObjectRef,
    pub(crate) instances: Vec<ObjectInstance>,
    pub(crate) capacity_message: String,
    pub(crate) resulting: i64,
    pub(crate) needed: i64,
    pub(crate) job_id: String,
    /// Successive `get_status` answers; the last one repeats. `None` fails.
    pub(crate) statuses: Mutex<VecDeque<Option<Status>>>,
    /// Operation that answers with a 500.
    pub(crate) failing: Option<&'static str>,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl MockApi {
    pub(crate) fn new() -> Self {
        Self {
            duplicates: Vec::new(),
            existing: ObjectRef::default(),
            instances: Vec::new(),
            capacity_message: String::new(),
            resulting: 0,
            needed: 0,
            job_id: "job-1".into(),
            statuses: Mutex::new(VecDeque::from([Some(Status::Archived)])),
            failing: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_duplicate(mut self, id: &str) -> Self {
        self.duplicates.push(ObjectRef {
            id: id.into(),
            signature: String::new(),
        });
        self
    }

    pub(crate) fn with_existing_signature(mut self, signature: &str) -> Self {
        self.existing = ObjectRef {
            id: "o-existing".into(),
            signature: signature.into(),
        };
        self
    }

    pub(crate) fn with_instance(mut self, path: &str, object_id: &str) -> Self {
        self.instances.push(ObjectInstance {
            id: format!("i{}", self.instances.len() + 1),
            path: path.into(),
            object_id: object_id.into(),
            ..Default::default()
        });
        self
    }

    pub(crate) fn with_capacity_message(mut self, message: &str) -> Self {
        self.capacity_message = message.into();
        self
    }

    pub(crate) fn with_quality(mut self, resulting: i64, needed: i64) -> Self {
        self.resulting = resulting;
        self.needed = needed;
        self
    }

    pub(crate) fn with_statuses(self, statuses: &[Option<&str>]) -> Self {
        *self.statuses.lock().unwrap() = statuses.iter().map(|s| s.map(Status::from)).collect();
        self
    }

    pub(crate) fn failing(mut self, operation: &'static str) -> Self {
        self.failing = Some(operation);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.split(' ').next() == Some(operation))
            .count()
    }

    fn record(&self, operation: &'static str, detail: String) -> Result<(), ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{operation} {detail}").trim_end().to_string());
        if self.failing == Some(operation) {
            return Err(ApiError::Api {
                status: 500,
                body: format!("{operation} unavailable"),
            });
        }
        Ok(())
    }

    fn next_status(&self) -> Option<Status> {
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().flatten()
        } else {
            statuses.front().cloned().flatten()
        }
    }
}

impl ArchiveApi for MockApi {
    fn objects_by_checksum<'a>(&'a self, checksum: &'a str) -> ApiFuture<'a, Objects> {
        Box::pin(async move {
            self.record("objects_by_checksum", checksum.into())?;
            Ok(Objects {
                objects: self.duplicates.clone(),
            })
        })
    }

    fn object_by_signature<'a>(&'a self, signature: &'a str) -> ApiFuture<'a, ObjectRef> {
        Box::pin(async move {
            self.record("object_by_signature", signature.into())?;
            Ok(self.existing.clone())
        })
    }

    fn object_instances_by_name<'a>(&'a self, name: &'a str) -> ApiFuture<'a, ObjectInstances> {
        Box::pin(async move {
            self.record("object_instances_by_name", name.into())?;
            Ok(ObjectInstances {
                object_instances: self.instances.clone(),
            })
        })
    }

    fn object_instance_by_signature_and_location<'a>(
        &'a self,
        signature: &'a str,
        location: &'a str,
    ) -> ApiFuture<'a, ObjectInstance> {
        Box::pin(async move {
            self.record(
                "object_instance_by_signature_and_location",
                format!("{signature} {location}"),
            )?;
            Ok(self.instances.first().cloned().unwrap_or_default())
        })
    }

    fn storage_location_status<'a>(
        &'a self,
        collection_alias: &'a str,
        size: i64,
        signature: &'a str,
        head: Head,
    ) -> ApiFuture<'a, Id> {
        Box::pin(async move {
            self.record(
                "storage_location_status",
                format!("{collection_alias} {size} {signature} {head}"),
            )?;
            Ok(Id {
                id: self.capacity_message.clone(),
            })
        })
    }

    fn quality_for_object<'a>(
        &'a self,
        object_id: &'a str,
        quality: Quality,
    ) -> ApiFuture<'a, SizeAndId> {
        Box::pin(async move {
            self.record("quality_for_object", format!("{object_id} {quality}"))?;
            let size = match quality {
                Quality::Resulting => self.resulting,
                Quality::Needed => self.needed,
            };
            Ok(SizeAndId {
                size,
                id: object_id.into(),
            })
        })
    }

    fn create_status<'a>(&'a self, status: &'a ArchivingStatus) -> ApiFuture<'a, ArchivingStatus> {
        Box::pin(async move {
            self.record("create_status", status.status.to_string())?;
            Ok(ArchivingStatus {
                id: self.job_id.clone(),
                status: status.status.clone(),
            })
        })
    }

    fn get_status<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ArchivingStatus> {
        Box::pin(async move {
            self.record("get_status", id.into())?;
            match self.next_status() {
                Some(status) => Ok(ArchivingStatus {
                    id: id.into(),
                    status,
                }),
                None => Err(ApiError::Api {
                    status: 503,
                    body: "try again".into(),
                }),
            }
        })
    }

    fn bearer(&self) -> Result<String, ApiError> {
        Ok("Bearer test-token".into())
    }
}
