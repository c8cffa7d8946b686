//! Common test utilities for E2E tests

use std::net::SocketAddr;

use followgraph::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server after adjusting the default test configuration
    pub async fn with_config(configure: impl FnOnce(&mut config::AppConfig)) -> Self {
        // Create temporary directory for client stores and plots
        let temp_dir = TempDir::new().unwrap();

        // Create test configuration
        let mut config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                max_upload_bytes: 64 * 1024,
            },
            storage: config::StorageConfig {
                data_dir: temp_dir.path().join("clients"),
                plots_dir: temp_dir.path().join("plots"),
                max_open_stores: 16,
                store_idle_secs: 600,
                max_plots: 100,
                plot_max_age_secs: 3600,
                sweep_interval_secs: 60,
            },
            analysis: config::AnalysisConfig {
                threshold: 1,
                following_weight: 0.5,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        configure(&mut config);

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = followgraph::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// POST an urlencoded form, returning status and body
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> (u16, String) {
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }

    /// Add one record through the add form
    pub async fn add_record(&self, graph: &str, account: &str, followers: &str, following: &str) {
        let (status, _) = self
            .post_form(
                "/accounts",
                &[
                    ("graph", graph),
                    ("account", account),
                    ("followers", followers),
                    ("following", following),
                ],
            )
            .await;
        assert_eq!(status, 200);
    }

    /// Upload a CSV document through the import form
    pub async fn upload_csv(&self, csv: &str) -> (u16, String) {
        let part = reqwest::multipart::Part::bytes(csv.as_bytes().to_vec())
            .file_name("records.csv")
            .mime_str("text/csv")
            .unwrap();
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }
}

/// Text between `<span id="{id}">` and the next `</span>`
pub fn span_text(html: &str, id: &str) -> Option<String> {
    let open = format!("<span id=\"{id}\">");
    let start = html.find(&open)? + open.len();
    let end = html[start..].find("</span>")? + start;
    Some(html[start..end].to_string())
}

/// Id of the artifact embedded in a result page
pub fn plot_src(html: &str) -> Option<String> {
    let marker = "<iframe src=\"";
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')? + start;
    Some(html[start..end].to_string())
}
