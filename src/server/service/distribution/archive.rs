//! Fixed archive backend.
//!
//! Downloads one zip archive per script and expands it in memory. The version label is
//! configured rather than read from upstream, so every caller on another label receives the
//! archive contents.

use std::io::{Cursor, Read};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use url::{form_urlencoded, Url};
use zip::ZipArchive;

use crate::server::{
    error::distribution::DistributionError,
    model::distribution::DistributionFile,
    service::distribution::{github, DistributionSource},
};

/// Placeholder in the URL template replaced by the script name.
const SCRIPT_PLACEHOLDER: &str = "{script}";

pub struct ArchiveSource {
    http: reqwest::Client,
    url_template: String,
    version: String,
}

impl ArchiveSource {
    pub fn new(
        http: reqwest::Client,
        url_template: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            http,
            url_template: url_template.into(),
            version: version.into(),
        }
    }

    fn archive_url(&self, script_name: &str) -> Result<Url, DistributionError> {
        let encoded: String = form_urlencoded::byte_serialize(script_name.as_bytes()).collect();
        let url = self.url_template.replace(SCRIPT_PLACEHOLDER, &encoded);

        Url::parse(&url).map_err(|e| {
            DistributionError::MalformedManifest(format!("archive URL for {}: {}", script_name, e))
        })
    }
}

#[async_trait]
impl DistributionSource for ArchiveSource {
    fn name(&self) -> &'static str {
        "archive"
    }

    async fn current_version(&self, _script_name: &str) -> Result<String, DistributionError> {
        Ok(self.version.clone())
    }

    async fn fetch_files(
        &self,
        script_name: &str,
        _version: &str,
    ) -> Result<Vec<DistributionFile>, DistributionError> {
        let url = self.archive_url(script_name)?;
        let bytes = github::get_anonymous(&self.http, url).await?.bytes().await?;

        tokio::task::spawn_blocking(move || expand_archive(Cursor::new(bytes))).await?
    }
}

/// Reads every file entry of a zip archive, base64-encoding its contents.
///
/// Directory entries and entries whose names escape the archive root are skipped.
fn expand_archive<R>(reader: R) -> Result<Vec<DistributionFile>, DistributionError>
where
    R: Read + std::io::Seek,
{
    let mut archive = ZipArchive::new(reader)?;
    let mut files = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }

        let Some(path) = entry.enclosed_name() else {
            tracing::warn!("Skipping archive entry with unsafe name {}", entry.name());
            continue;
        };
        let path = path.to_string_lossy().replace('\\', "/");

        // Declared sizes are untrusted.
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;

        files.push(DistributionFile::new(path, STANDARD.encode(&data)));
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };
    use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

    use super::*;

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        writer.add_directory("web/", options).unwrap();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }

    fn source(server: &MockServer) -> ArchiveSource {
        ArchiveSource::new(
            reqwest::Client::new(),
            format!("{}/archives/{{script}}.zip", server.uri()),
            "3.0.0",
        )
    }

    #[test]
    fn substitutes_script_name() {
        let source = ArchiveSource::new(
            reqwest::Client::new(),
            "https://cdn.example.com/{script}/latest.zip",
            "1.0.0",
        );

        assert_eq!(
            source.archive_url("my garage").unwrap().as_str(),
            "https://cdn.example.com/my+garage/latest.zip"
        );
    }

    #[test]
    fn expands_file_entries() {
        let bytes = zip_bytes(&[
            ("fxmanifest.lua", b"fx_version 'cerulean'"),
            ("web/index.html", b"<html></html>"),
        ]);

        let mut files = expand_archive(Cursor::new(bytes)).unwrap();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(
            files,
            vec![
                DistributionFile::new("fxmanifest.lua", STANDARD.encode("fx_version 'cerulean'")),
                DistributionFile::new("web/index.html", STANDARD.encode("<html></html>")),
            ]
        );
    }

    #[test]
    fn ignores_inflated_declared_size() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file("server/main.lua", options).unwrap();
        writer.write_all(b"print('hi')").unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();

        let central = bytes
            .windows(4)
            .position(|window| window == [0x50, 0x4b, 0x01, 0x02])
            .unwrap();
        bytes[central + 24..central + 28].copy_from_slice(&0x7fff_0000u32.to_le_bytes());

        let files = expand_archive(Cursor::new(bytes)).unwrap();

        assert_eq!(
            files,
            vec![DistributionFile::new("server/main.lua", STANDARD.encode("print('hi')"))]
        );
    }

    #[test]
    fn rejects_corrupt_archive() {
        let result = expand_archive(Cursor::new(b"not a zip".to_vec()));

        assert!(matches!(result, Err(DistributionError::Archive(_))));
    }

    #[tokio::test]
    async fn downloads_without_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/archives/garage.zip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(zip_bytes(&[("server/main.lua", b"print('hi')")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let source = source(&server);
        let files = source.fetch_files("garage", "3.0.0").await.unwrap();

        assert_eq!(
            files,
            vec![DistributionFile::new("server/main.lua", STANDARD.encode("print('hi')"))]
        );
        assert_eq!(source.current_version("garage").await.unwrap(), "3.0.0");

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn missing_archive_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/archives/garage.zip"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = source(&server).fetch_files("garage", "3.0.0").await;

        assert!(matches!(result, Err(DistributionError::UpstreamStatus { .. })));
    }
}
