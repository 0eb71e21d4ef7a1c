//! External package-metadata extraction.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;

use ona_protocol::PackageMetadata;
use tracing::{debug, warn};

use crate::error::IngestError;

/// Placeholder in extractor arguments replaced by the package path.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Produces the package metadata root of a content package.
pub trait MetadataExtractor: Send + Sync {
    fn extract<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<PackageMetadata, IngestError>> + Send + 'a>>;
}

/// Extractor command line. An empty `program` means none is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub program: String,
    /// Arguments; `{path}` is replaced by the package path. Without a
    /// placeholder the path is appended as the last argument.
    pub args: Vec<String>,
}

/// Runs an external program and decodes its stdout as package metadata.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    config: ExtractorConfig,
}

impl CommandExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    fn args_for(&self, path: &Path) -> Vec<String> {
        let path = path.to_string_lossy();
        let mut substituted = false;
        let mut args: Vec<String> = self
            .config
            .args
            .iter()
            .map(|arg| {
                if arg.contains(PATH_PLACEHOLDER) {
                    substituted = true;
                    arg.replace(PATH_PLACEHOLDER, &path)
                } else {
                    arg.clone()
                }
            })
            .collect();
        if !substituted {
            args.push(path.into_owned());
        }
        args
    }

    async fn run(&self, path: &Path) -> Result<PackageMetadata, IngestError> {
        if self.config.program.is_empty() {
            return Err(IngestError::MetadataExtractionFailed(
                "no metadata extractor configured; supply the metadata JSON".into(),
            ));
        }
        let args = self.args_for(path);
        debug!(program = %self.config.program, ?args, "running metadata extractor");

        let output = tokio::process::Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                IngestError::MetadataExtractionFailed(format!(
                    "cannot run {}: {e}",
                    self.config.program
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(program = %self.config.program, status = %output.status, "metadata extractor failed");
            return Err(IngestError::MetadataExtractionFailed(format!(
                "{} exited with {}: {}",
                self.config.program,
                output.status,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            IngestError::MetadataExtractionFailed(format!("undecodable extractor output: {e}"))
        })
    }
}

impl MetadataExtractor for CommandExtractor {
    fn extract<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<PackageMetadata, IngestError>> + Send + 'a>> {
        Box::pin(self.run(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(program: &str, args: &[&str]) -> CommandExtractor {
        CommandExtractor::new(ExtractorConfig {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        })
    }

    #[test]
    fn placeholder_substituted() {
        let e = extractor("ocfl", &["extract", "--object={path}", "--format", "json"]);
        assert_eq!(
            e.args_for(Path::new("/data/a.zip")),
            ["extract", "--object=/data/a.zip", "--format", "json"]
        );
    }

    #[test]
    fn path_appended_without_placeholder() {
        let e = extractor("ocfl", &["extract"]);
        assert_eq!(e.args_for(Path::new("/data/a.zip")), ["extract", "/data/a.zip"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn decodes_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        std::fs::write(
            &path,
            r#"{"Objects":{"id:1":{"ID":"id:1","Extension":{"NNNN-metafile":{"signature":"s1"}}}}}"#,
        )
        .unwrap();

        let meta = extractor("cat", &[]).extract(&path).await.unwrap();
        assert_eq!(meta.objects.len(), 1);
        assert!(meta.objects.contains_key("id:1"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_fails() {
        let err = extractor("sh", &["-c", "echo broken >&2; exit 3", "{path}"])
            .extract(Path::new("/data/a.zip"))
            .await
            .unwrap_err();
        match err {
            IngestError::MetadataExtractionFailed(msg) => assert!(msg.contains("broken")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn garbage_output_fails() {
        let err = extractor("echo", &["not json"])
            .extract(Path::new("/data/a.zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::MetadataExtractionFailed(_)));
    }

    #[tokio::test]
    async fn unconfigured_extractor_fails() {
        let err = CommandExtractor::new(ExtractorConfig::default())
            .extract(Path::new("/data/a.zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::MetadataExtractionFailed(msg) if msg.contains("JSON")));
    }

    #[tokio::test]
    async fn missing_program_fails() {
        let err = extractor("/nonexistent/ona-extractor", &[])
            .extract(Path::new("/data/a.zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::MetadataExtractionFailed(_)));
        assert_eq!(err.exit_code(), 13);
    }
}
