//! Companion file API
//!
//! Contents go through `{base}files/…`, directory listings and path creation
//! through GraphQL on `{base}graphql`. Companion errors are passed on as they
//! are.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use cloudws_session::{SessionRegistry, WRITE_FILE_FORM_KEY};

use crate::error::FileError;
use crate::path::is_root;
use crate::tree::FileSystemNode;
use crate::Result;

const LIST_FILES: &str = "query ListFiles($path: String!) {
  listFiles(path: $path) {
    path
    size
  }
}";

const CREATE_FILE: &str = "mutation CreateFile($path: String!) {
  createFile(path: $path)
}";

const CREATE_DIRECTORY: &str = "mutation CreateDirectory($path: String!) {
  createDirectory(path: $path)
}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PathKind {
    File,
    Directory,
}

impl PathKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathKind::File => "FILE",
            PathKind::Directory => "DIRECTORY",
        }
    }
}

#[async_trait]
pub trait FileApi: Send + Sync {
    /// One directory level, not recursive
    async fn list_files(&self, path: &str) -> Result<Vec<FileSystemNode>>;

    async fn create_path(&self, path: &str, kind: PathKind) -> Result<()>;

    async fn delete_path(&self, path: &str) -> Result<()>;

    async fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    async fn write_file(&self, path: &str, contents: Vec<u8>) -> Result<()>;
}

pub struct HttpFileApi {
    client: reqwest::Client,
    registry: SessionRegistry,
}

impl HttpFileApi {
    pub fn new(client: reqwest::Client, registry: SessionRegistry) -> Self {
        Self { client, registry }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    async fn graphql(&self, query: &str, variables: Value) -> Result<Value> {
        let url = self.registry.graphql_http_url();
        let response = self
            .client
            .post(&url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;
        let body: Value = check_status(response, &url)?.json().await?;

        if let Some(errors) = body["errors"].as_array().filter(|e| !e.is_empty()) {
            let message = errors
                .iter()
                .map(|e| e["message"].as_str().unwrap_or("unknown error"))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FileError::Graphql(message));
        }

        Ok(body["data"].clone())
    }
}

#[async_trait]
impl FileApi for HttpFileApi {
    async fn list_files(&self, path: &str) -> Result<Vec<FileSystemNode>> {
        let path = if is_root(path) { "/" } else { path };
        let data = self.graphql(LIST_FILES, json!({ "path": path })).await?;
        let nodes: Vec<FileSystemNode> = serde_json::from_value(data["listFiles"].clone())
            .map_err(|e| FileError::Graphql(format!("malformed listFiles response: {}", e)))?;

        tracing::debug!(path = %path, entries = nodes.len(), "Listed directory");
        Ok(nodes)
    }

    async fn create_path(&self, path: &str, kind: PathKind) -> Result<()> {
        let query = match kind {
            PathKind::File => CREATE_FILE,
            PathKind::Directory => CREATE_DIRECTORY,
        };
        self.graphql(query, json!({ "path": path })).await?;

        tracing::info!(path = %path, kind = kind.as_str(), "Created path");
        Ok(())
    }

    async fn delete_path(&self, path: &str) -> Result<()> {
        let url = self.registry.file_url(path);
        let response = self.client.delete(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(FileError::NotFound(path.to_string()));
        }
        check_status(response, &url)?;

        tracing::info!(path = %path, "Deleted path");
        Ok(())
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.registry.file_url(path);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(FileError::NotFound(path.to_string()));
        }
        let bytes = check_status(response, &url)?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn write_file(&self, path: &str, contents: Vec<u8>) -> Result<()> {
        let url = self.registry.upload_url();
        let size = contents.len();
        let form = Form::new().part(
            WRITE_FILE_FORM_KEY,
            Part::bytes(contents).file_name(path.to_string()),
        );
        let response = self.client.post(&url).multipart(form).send().await?;
        check_status(response, &url)?;

        tracing::debug!(path = %path, bytes = size, "Wrote file");
        Ok(())
    }
}

fn check_status(response: Response, url: &str) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(FileError::Status {
            status: response.status().as_u16(),
            url: url.to_string(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn api(server: &MockServer) -> HttpFileApi {
        let registry = SessionRegistry::new(&format!("{}/ws-abc", server.uri())).unwrap();
        HttpFileApi::new(reqwest::Client::new(), registry)
    }

    #[tokio::test]
    async fn test_read_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ws-abc/files/main.py"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"print(1)".to_vec()))
            .mount(&server)
            .await;

        let api = api(&server).await;
        assert_eq!(api.read_file("main.py").await.unwrap(), b"print(1)".to_vec());
        assert_eq!(api.read_file("/main.py").await.unwrap(), b"print(1)".to_vec());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let api = api(&server).await;
        assert!(matches!(
            api.read_file("nope.txt").await,
            Err(FileError::NotFound(p)) if p == "nope.txt"
        ));
    }

    #[tokio::test]
    async fn test_write_file_uses_form_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ws-abc/files"))
            .and(body_string_contains("name=\"files\""))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let api = api(&server).await;
        api.write_file("main.py", b"print(2)".to_vec()).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_files() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ws-abc/graphql"))
            .and(body_partial_json(json!({ "variables": { "path": "/" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "listFiles": [
                        { "path": "/src", "size": null },
                        { "path": "/main.py", "size": 8 }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let api = api(&server).await;
        let nodes = api.list_files("").await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].size, None);
        assert_eq!(nodes[1].size, Some(8));
    }

    #[tokio::test]
    async fn test_graphql_errors_are_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ws-abc/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{ "message": "Path /src already exists" }]
            })))
            .mount(&server)
            .await;

        let api = api(&server).await;
        match api.create_path("/src", PathKind::Directory).await {
            Err(FileError::Graphql(message)) => assert_eq!(message, "Path /src already exists"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/ws-abc/files/src"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = api(&server).await;
        assert!(matches!(
            api.delete_path("src").await,
            Err(FileError::Status { status: 500, .. })
        ));
    }
}
