use std::path::{Path, PathBuf};

/// Failure surface shared by every injected capability.
///
/// Callers in the workflow layer treat all of these as recoverable: a port
/// error terminates the current step with a status message, never the
/// process.
#[derive(Debug)]
pub enum PortError {
    /// The backing service answered with an error or garbage.
    Backend(String),
    Io(std::io::Error),
    /// The model produced nothing usable.
    EmptyResponse,
}

impl std::fmt::Display for PortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortError::Backend(msg) => write!(f, "backend error: {msg}"),
            PortError::Io(err) => write!(f, "io error: {err}"),
            PortError::EmptyResponse => write!(f, "the model returned an empty response"),
        }
    }
}

impl std::error::Error for PortError {}

impl From<std::io::Error> for PortError {
    fn from(err: std::io::Error) -> Self {
        PortError::Io(err)
    }
}

/// Sampling knobs forwarded verbatim to the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_tokens: Option<u32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        // Low-temperature defaults: every caller here wants deterministic
        // code or structured records, not prose.
        GenerationOptions {
            temperature: 0.1,
            top_k: 10,
            top_p: 0.98,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    /// Optional image attachments for multimodal backends.
    pub images: Vec<PathBuf>,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        GenerationRequest {
            system: system.into(),
            prompt: prompt.into(),
            images: Vec::new(),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_images(mut self, images: Vec<PathBuf>) -> Self {
        self.images = images;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Progress/status surface handed to every port call. Streaming backends
/// push chunks through `progress`; the workflow narrates steps through
/// `info`/`warn`.
pub trait EventSink {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn progress(&self, message: &str);

    /// Framing around each named workflow step. No-ops by default; sinks
    /// that render progress override these.
    fn step_start(&self, _name: &str) {}
    fn step_end(&self, _name: &str, _ok: bool) {}
}

/// A sink that swallows everything. Handy for tests and for callers that
/// only care about the final string.
pub struct NullSink;

impl EventSink for NullSink {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn progress(&self, _message: &str) {}
}

/// Text generation. One call per workflow step; the call blocks until the
/// full response is available even when the backend streams.
pub trait GenerationPort {
    fn generate(
        &self,
        request: GenerationRequest,
        events: &dyn EventSink,
    ) -> Result<String, PortError>;
}

/// Image synthesis for project icons. `dest` is where the caller wants the
/// final file; implementations may download/copy into it.
pub trait ImageGenPort {
    fn generate_image(&self, prompt: &str, dest: &Path) -> Result<PathBuf, PortError>;
}
