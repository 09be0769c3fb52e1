//! LLM API reachability probe: `GET {api_base}/models` with the configured key.

use std::time::Duration;

use researchflow_core::config::LlmConfig;

#[derive(Debug, thiserror::Error)]
pub enum ApiProbeError {
    #[error("API returned HTTP {0}")]
    Status(u16),

    #[error("cannot reach {url}: {message}")]
    Transport { url: String, message: String },
}

/// Extension point so the doctor can be exercised without the network.
pub trait ApiProbe {
    fn probe(&self, cfg: &LlmConfig) -> Result<(), ApiProbeError>;
}

/// Blocking HTTP probe with 10 s connect/read timeouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpApiProbe;

fn make_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(10))
        .timeout_read(Duration::from_secs(10))
        .build()
}

pub fn models_url(api_base: &str) -> String {
    format!("{}/models", api_base.trim_end_matches('/'))
}

impl ApiProbe for HttpApiProbe {
    fn probe(&self, cfg: &LlmConfig) -> Result<(), ApiProbeError> {
        let url = models_url(&cfg.api_base);
        let response = make_agent()
            .get(&url)
            .set("Authorization", &format!("Bearer {}", cfg.api_key))
            .set("Content-Type", "application/json")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => ApiProbeError::Status(code),
                ureq::Error::Transport(t) => ApiProbeError::Transport {
                    url: url.clone(),
                    message: t.to_string(),
                },
            })?;
        if response.status() != 200 {
            return Err(ApiProbeError::Status(response.status()));
        }
        Ok(())
    }
}
