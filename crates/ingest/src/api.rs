//! Archive-management API seam.
//!
//! `ArchiveApi` is implemented for [`ona_archive_client::Client`]; tests
//! substitute an in-memory implementation.

use std::future::Future;
use std::pin::Pin;

use ona_archive_client::{Client, Error as ApiError, Quality};
use ona_protocol::{
    ArchivingStatus, Head, Id, ObjectInstance, ObjectInstances, ObjectRef, Objects, SizeAndId,
};

/// Boxed future returned by [`ArchiveApi`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Remote operations the pipeline and storage commands depend on.
pub trait ArchiveApi: Send + Sync {
    fn objects_by_checksum<'a>(&'a self, checksum: &'a str) -> ApiFuture<'a, Objects>;

    fn object_by_signature<'a>(&'a self, signature: &'a str) -> ApiFuture<'a, ObjectRef>;

    fn object_instances_by_name<'a>(&'a self, name: &'a str) -> ApiFuture<'a, ObjectInstances>;

    fn object_instance_by_signature_and_location<'a>(
        &'a self,
        signature: &'a str,
        location: &'a str,
    ) -> ApiFuture<'a, ObjectInstance>;

    fn storage_location_status<'a>(
        &'a self,
        collection_alias: &'a str,
        size: i64,
        signature: &'a str,
        head: Head,
    ) -> ApiFuture<'a, Id>;

    fn quality_for_object<'a>(
        &'a self,
        object_id: &'a str,
        quality: Quality,
    ) -> ApiFuture<'a, SizeAndId>;

    fn create_status<'a>(&'a self, status: &'a ArchivingStatus) -> ApiFuture<'a, ArchivingStatus>;

    fn get_status<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ArchivingStatus>;

    /// `Authorization` value for the transfer endpoint.
    fn bearer(&self) -> Result<String, ApiError>;
}

impl ArchiveApi for Client {
    fn objects_by_checksum<'a>(&'a self, checksum: &'a str) -> ApiFuture<'a, Objects> {
        Box::pin(Client::objects_by_checksum(self, checksum))
    }

    fn object_by_signature<'a>(&'a self, signature: &'a str) -> ApiFuture<'a, ObjectRef> {
        Box::pin(Client::object_by_signature(self, signature))
    }

    fn object_instances_by_name<'a>(&'a self, name: &'a str) -> ApiFuture<'a, ObjectInstances> {
        Box::pin(Client::object_instances_by_name(self, name))
    }

    fn object_instance_by_signature_and_location<'a>(
        &'a self,
        signature: &'a str,
        location: &'a str,
    ) -> ApiFuture<'a, ObjectInstance> {
        Box::pin(Client::object_instance_by_signature_and_location(
            self, signature, location,
        ))
    }

    fn storage_location_status<'a>(
        &'a self,
        collection_alias: &'a str,
        size: i64,
        signature: &'a str,
        head: Head,
    ) -> ApiFuture<'a, Id> {
        Box::pin(Client::storage_location_status(
            self,
            collection_alias,
            size,
            signature,
            head,
        ))
    }

    fn quality_for_object<'a>(
        &'a self,
        object_id: &'a str,
        quality: Quality,
    ) -> ApiFuture<'a, SizeAndId> {
        Box::pin(Client::quality_for_object(self, object_id, quality))
    }

    fn create_status<'a>(&'a self, status: &'a ArchivingStatus) -> ApiFuture<'a, ArchivingStatus> {
        Box::pin(Client::create_status(self, status))
    }

    fn get_status<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ArchivingStatus> {
        Box::pin(Client::get_status(self, id))
    }

    fn bearer(&self) -> Result<String, ApiError> {
        Ok(self.tokens().bearer()?)
    }
}
