//! Package metadata root: the document an OCFL metadata export produces.
//!
//! Shape:
//!
//! ```json
//! { "Objects": { "<internal id>": {
//!     "ID": "...",
//!     "Files": { "<digest>": { "InternalName": ["..."], "Extension": { "NNNN-indexer": {...} } } },
//!     "Extension": { "NNNN-metafile": { "signature": "...", ... } }
//! } } }
//! ```
//!
//! Operator-supplied JSON is either this document or a flat [`Object`];
//! [`MetadataDocument::from_slice`] tells them apart by probing for the
//! `Objects` key.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use crate::types::{File, Object, nullable};

/// Errors raised while turning a package metadata root into an [`Object`].
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("expected exactly one object in package metadata, found {0}")]
    ObjectCount(usize),

    #[error("object has no NNNN-metafile extension block")]
    MissingMetafile,

    #[error("required metadata field missing: {0}")]
    MissingField(&'static str),
}

/// Minimal probe holding only the discriminating key.
#[derive(Debug, Deserialize)]
struct ShapeProbe {
    #[serde(rename = "Objects", default)]
    objects: Option<IgnoredAny>,
}

/// Operator-supplied metadata, decoded into one of its two shapes.
#[derive(Debug, Clone)]
pub enum MetadataDocument {
    /// Package metadata root; the file itself travels with the content.
    PackageRoot(PackageMetadata),
    /// Flat object record.
    Flat(Object),
}

impl MetadataDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let probe: ShapeProbe = serde_json::from_slice(bytes)?;
        if probe.objects.is_some() {
            Ok(Self::PackageRoot(serde_json::from_slice(bytes)?))
        } else {
            Ok(Self::Flat(serde_json::from_slice(bytes)?))
        }
    }
}

/// Top level of a package metadata export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageMetadata {
    #[serde(rename = "Objects", default, deserialize_with = "nullable")]
    pub objects: BTreeMap<String, ObjectMetadata>,
}

impl PackageMetadata {
    /// Returns the one object entry a package is expected to hold.
    pub fn single_object(&self) -> Result<&ObjectMetadata, PackageError> {
        if self.objects.len() != 1 {
            return Err(PackageError::ObjectCount(self.objects.len()));
        }
        self.objects
            .values()
            .next()
            .ok_or(PackageError::ObjectCount(0))
    }

    /// Descriptive object plus per-file technical metadata.
    pub fn resolve(&self) -> Result<(Object, Vec<File>), PackageError> {
        let entry = self.single_object()?;
        let object = entry.to_object()?;
        Ok((object, entry.files()))
    }
}

/// One object inside the package metadata root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectMetadata {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Head", default)]
    pub head: String,
    #[serde(rename = "Files", default, deserialize_with = "nullable")]
    pub files: BTreeMap<String, FileMetadata>,
    #[serde(rename = "Extension", default, deserialize_with = "nullable")]
    pub extension: ObjectExtensions,
}

impl ObjectMetadata {
    pub fn to_object(&self) -> Result<Object, PackageError> {
        let meta = self
            .extension
            .metafile
            .clone()
            .ok_or(PackageError::MissingMetafile)?;
        Object::try_from(meta)
    }

    /// Technical metadata for each file, keyed by content digest.
    pub fn files(&self) -> Vec<File> {
        self.files
            .iter()
            .map(|(digest, meta)| {
                let idx = meta.extension.indexer.clone().unwrap_or_default();
                File {
                    checksum: digest.clone(),
                    name: meta.internal_name.clone(),
                    size: idx.size,
                    mime_type: idx.mimetype,
                    pronom: idx.pronom,
                    width: idx.width,
                    height: idx.height,
                    duration: idx.duration,
                    ..Default::default()
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectExtensions {
    #[serde(rename = "NNNN-metafile", default)]
    pub metafile: Option<MetafileExtension>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileMetadata {
    #[serde(rename = "InternalName", default, deserialize_with = "nullable")]
    pub internal_name: Vec<String>,
    #[serde(rename = "Extension", default, deserialize_with = "nullable")]
    pub extension: FileExtensions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileExtensions {
    #[serde(rename = "NNNN-indexer", default)]
    pub indexer: Option<IndexerInfo>,
}

/// Output of the content indexer for one file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndexerInfo {
    pub size: i64,
    pub mimetype: String,
    pub pronom: String,
    pub width: i64,
    pub height: i64,
    pub duration: i64,
}

/// Decodes a field that must be present but may be `null`.
///
/// `None` means the key was absent; `Some(v)` holds the value or its default.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?.unwrap_or_default()))
}

/// Descriptive fields of the metafile extension block.
///
/// Required fields are `Option` so that absence can be reported by name
/// during conversion; optional fields fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetafileExtension {
    pub address: Option<String>,
    pub organisation: Option<String>,
    pub organisation_address: Option<String>,
    pub organisation_id: Option<String>,
    pub collection: Option<String>,
    pub collection_id: Option<String>,
    pub created: Option<String>,
    pub last_changed: Option<String>,
    pub ingest_workflow: Option<String>,
    pub signature: Option<String>,
    pub title: Option<String>,
    pub user: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub identifiers: Option<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    pub references: Option<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    pub sets: Option<Vec<String>>,

    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub holding: Option<String>,
    #[serde(default)]
    pub expiration: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub alternative_titles: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub keywords: BTreeSet<String>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, PackageError> {
    value.ok_or(PackageError::MissingField(field))
}

impl TryFrom<MetafileExtension> for Object {
    type Error = PackageError;

    fn try_from(m: MetafileExtension) -> Result<Self, Self::Error> {
        Ok(Object {
            address: required(m.address, "address")?,
            organisation_address: required(m.organisation_address, "organisation_address")?,
            collection: required(m.collection, "collection")?,
            collection_id: required(m.collection_id, "collection_id")?,
            created: required(m.created, "created")?,
            identifiers: required(m.identifiers, "identifiers")?,
            ingest_workflow: required(m.ingest_workflow, "ingest_workflow")?,
            last_changed: required(m.last_changed, "last_changed")?,
            organisation: required(m.organisation, "organisation")?,
            organisation_id: required(m.organisation_id, "organisation_id")?,
            references: required(m.references, "references")?,
            sets: required(m.sets, "sets")?,
            signature: required(m.signature, "signature")?,
            title: required(m.title, "title")?,
            user: required(m.user, "user")?,
            description: m.description.unwrap_or_default(),
            holding: m.holding,
            expiration: m.expiration,
            alternative_titles: m.alternative_titles,
            authors: m.authors,
            keywords: m.keywords,
            ..Default::default()
        })
    }
}
