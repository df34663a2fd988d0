//! HTTP implementations of the generation ports.
//!
//! The generation service is assumed co-located with this process (the
//! default is a localhost server), so image attachments travel as file
//! paths rather than inline payloads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use atelier_kernel::config::ServiceSettings;
use atelier_kernel::ports::{
    EventSink, GenerationPort, GenerationRequest, ImageGenPort, PortError,
};
use serde_json::{Value, json};

// Generating a whole application in one call can take a while.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

pub struct HttpGeneration {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl HttpGeneration {
    pub fn new(service: &ServiceSettings) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PortError::Backend(e.to_string()))?;

        Ok(HttpGeneration {
            base_url: service.base_url.trim_end_matches('/').to_string(),
            model: service.model.clone(),
            client,
        })
    }

    fn body(&self, request: &GenerationRequest) -> Value {
        json!({
            "model": self.model,
            "system": request.system,
            "prompt": request.prompt,
            "images": request.images,
            "temperature": request.options.temperature,
            "top_k": request.options.top_k,
            "top_p": request.options.top_p,
            "max_tokens": request.options.max_tokens,
        })
    }
}

impl GenerationPort for HttpGeneration {
    fn generate(
        &self,
        request: GenerationRequest,
        events: &dyn EventSink,
    ) -> Result<String, PortError> {
        let body = self.body(&request);

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .map_err(|e| PortError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Backend(format!(
                "generation service answered {status}"
            )));
        }

        let value: Value = response
            .json()
            .map_err(|e| PortError::Backend(e.to_string()))?;
        let text = first_string(&value, &["text", "response", "content"])
            .ok_or_else(|| PortError::Backend("malformed generation response".to_string()))?;

        if text.trim().is_empty() {
            return Err(PortError::EmptyResponse);
        }

        events.progress(&text);
        Ok(text)
    }
}

pub struct HttpImageGen {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpImageGen {
    pub fn new(base_url: &str) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PortError::Backend(e.to_string()))?;

        Ok(HttpImageGen {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl ImageGenPort for HttpImageGen {
    fn generate_image(&self, prompt: &str, dest: &Path) -> Result<PathBuf, PortError> {
        let response = self
            .client
            .post(format!("{}/api/images", self.base_url))
            .json(&json!({ "prompt": prompt }))
            .send()
            .map_err(|e| PortError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Backend(format!(
                "image service answered {status}"
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| PortError::Backend(e.to_string()))?;
        if bytes.is_empty() {
            return Err(PortError::EmptyResponse);
        }

        std::fs::write(dest, &bytes)?;
        Ok(dest.to_path_buf())
    }
}

/// First non-empty string under any of `keys`, top level only. Generation
/// servers disagree on the field name; we take whichever is present.
fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(key))
        .find_map(|v| v.as_str().map(|s| s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_string_takes_whichever_field_exists() {
        let value = json!({ "response": "hello" });
        assert_eq!(
            first_string(&value, &["text", "response", "content"]),
            Some("hello".to_string())
        );
    }

    #[test]
    fn first_string_rejects_non_strings() {
        let value = json!({ "text": 42 });
        assert_eq!(first_string(&value, &["text"]), None);
    }

    #[test]
    fn request_body_carries_image_attachments() {
        let port = HttpGeneration::new(&ServiceSettings::default()).expect("build");
        let request = GenerationRequest::new("system", "describe this icon")
            .with_images(vec![PathBuf::from("icon.png")]);
        let body = port.body(&request);
        assert_eq!(body["images"][0], "icon.png");
        assert_eq!(body["prompt"], "describe this icon");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let service = ServiceSettings {
            base_url: "http://localhost:9600/".to_string(),
            ..ServiceSettings::default()
        };
        let port = HttpGeneration::new(&service).expect("build");
        assert_eq!(port.base_url, "http://localhost:9600");
    }
}
