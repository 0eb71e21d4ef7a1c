//! Storage report for an archived file name.

use ona_archive_client::Quality;
use tracing::debug;

use crate::api::ArchiveApi;
use crate::error::IngestError;

/// Where and how well a file is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageReport {
    pub name: String,
    /// Number of object instances holding the file.
    pub locations: usize,
    pub resulting_quality: i64,
    pub needed_quality: i64,
}

impl StorageReport {
    /// Stored at least once with the quality its collection requires.
    pub fn is_sufficient(&self) -> bool {
        self.locations > 0 && self.resulting_quality >= self.needed_quality
    }
}

/// Builds the [`StorageReport`] for `name`.
///
/// Quality is looked up for the object of the first instance; a name with
/// no instances reports zero locations and no quality.
pub async fn storage_report(api: &dyn ArchiveApi, name: &str) -> Result<StorageReport, IngestError> {
    let instances = api
        .object_instances_by_name(name)
        .await
        .map_err(IngestError::remote("object-instance lookup by name"))?
        .object_instances;

    let Some(first) = instances.first() else {
        return Ok(StorageReport {
            name: name.to_string(),
            locations: 0,
            resulting_quality: 0,
            needed_quality: 0,
        });
    };

    let resulting = api
        .quality_for_object(&first.object_id, Quality::Resulting)
        .await
        .map_err(IngestError::remote("resulting-quality lookup"))?;
    let needed = api
        .quality_for_object(&first.object_id, Quality::Needed)
        .await
        .map_err(IngestError::remote("needed-quality lookup"))?;
    debug!(
        name = %name,
        object_id = %first.object_id,
        locations = instances.len(),
        resulting = resulting.size,
        needed = needed.size,
        "storage report"
    );

    Ok(StorageReport {
        name: name.to_string(),
        locations: instances.len(),
        resulting_quality: resulting.size,
        needed_quality: needed.size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockApi;

    #[tokio::test]
    async fn unknown_name_has_no_locations() {
        let api = MockApi::new();
        let report = storage_report(&api, "a.zip").await.unwrap();
        assert_eq!(report.locations, 0);
        assert!(!report.is_sufficient());
        assert_eq!(api.call_count("quality_for_object"), 0);
    }

    #[tokio::test]
    async fn quality_of_first_instance() {
        let api = MockApi::new()
            .with_instance("vol1/a.zip", "o1")
            .with_instance("vol2/a.zip", "o1")
            .with_quality(3, 2);
        let report = storage_report(&api, "a.zip").await.unwrap();
        assert_eq!(
            report,
            StorageReport {
                name: "a.zip".into(),
                locations: 2,
                resulting_quality: 3,
                needed_quality: 2,
            }
        );
        assert!(report.is_sufficient());
        assert_eq!(
            api.calls()[1..],
            ["quality_for_object o1 resulting-quality", "quality_for_object o1 needed-quality"]
        );
    }

    #[tokio::test]
    async fn below_needed_quality_is_insufficient() {
        let api = MockApi::new().with_instance("vol1/a.zip", "o1").with_quality(1, 2);
        let report = storage_report(&api, "a.zip").await.unwrap();
        assert!(!report.is_sufficient());
    }

    #[tokio::test]
    async fn lookup_failure_is_remote_error() {
        let api = MockApi::new()
            .with_instance("vol1/a.zip", "o1")
            .failing("quality_for_object");
        let err = storage_report(&api, "a.zip").await.unwrap_err();
        assert!(matches!(err, IngestError::RemoteApi { .. }));
    }
}
