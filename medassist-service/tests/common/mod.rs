#![allow(dead_code)]

use medassist_service::config::{GoogleConfig, MedassistConfig, OpenAiConfig, UploadConfig};
use medassist_service::services::providers::mock::{
    MockGenerativeProvider, MockPrescriptionProvider,
};
use medassist_service::startup::{Application, Providers};
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const DEFAULT_DIAGNOSIS: &str = "**Diagnosis:** *Common cold*";
pub const DEFAULT_EXTRACTION: &str = "Paracetamol 500mg, twice daily";

pub struct TestApp {
    pub address: String,
    pub upload_dir: PathBuf,
    pub generative: Arc<MockGenerativeProvider>,
    pub prescription: Arc<MockPrescriptionProvider>,
    pub client: reqwest::Client,
    shutdown: CancellationToken,
}

pub fn test_config() -> MedassistConfig {
    MedassistConfig {
        common: CoreConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0, // Random port for testing
        },
        google: GoogleConfig {
            api_key: Secret::new("test-google-key".to_string()),
            api_base: "http://127.0.0.1:1".to_string(),
            text_model: "gemini-1.5-flash".to_string(),
        },
        openai: OpenAiConfig {
            api_key: Secret::new("test-openai-key".to_string()),
            api_base: "http://127.0.0.1:1".to_string(),
            vision_model: "gpt-4o-2024-11-20".to_string(),
        },
        uploads: UploadConfig {
            dir: PathBuf::from(format!("target/test-uploads-{}", Uuid::new_v4())),
            retain: true,
            max_bytes: 1024 * 1024,
        },
        provider_timeout: Duration::from_secs(5),
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(
            test_config(),
            MockGenerativeProvider::new(DEFAULT_DIAGNOSIS),
            MockPrescriptionProvider::new(DEFAULT_EXTRACTION),
        )
        .await
    }

    pub async fn spawn_with(
        config: MedassistConfig,
        generative: MockGenerativeProvider,
        prescription: MockPrescriptionProvider,
    ) -> Self {
        let upload_dir = config.uploads.dir.clone();
        let generative = Arc::new(generative);
        let prescription = Arc::new(prescription);

        let app = Application::build_with_providers(
            config,
            Providers {
                generative: generative.clone(),
                prescription: prescription.clone(),
            },
        )
        .await
        .expect("Failed to build test application");

        let address = format!("http://127.0.0.1:{}", app.port());
        let shutdown = app.shutdown_token();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client
                .get(format!("{}/health", address))
                .send()
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            upload_dir,
            generative,
            prescription,
            client,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Stop the server and remove the upload directory.
    pub async fn cleanup(&self) {
        self.shutdown.cancel();
        let _ = tokio::fs::remove_dir_all(&self.upload_dir).await;
    }
}

pub fn image_part(bytes: &[u8], file_name: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(bytes.to_vec())
        .file_name(file_name.to_string())
        .mime_str("image/png")
        .expect("valid mime type")
}
