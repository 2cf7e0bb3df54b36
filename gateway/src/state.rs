use std::sync::Arc;

use asr_engine::backend::accelerator::{self, AcceleratorBackend};
use asr_engine::backend::primary::PrimaryBackend;
use asr_engine::{AsrBackend, ModelCache};
use whisper_common::{Backend, TranscriptionProfile};

use crate::config::Config;
use crate::error::GatewayError;

/// Process-wide state: one model cache per backend, matching spec.md §4.1's
/// "each backend maintains a mapping model_id -> loaded_model". No
/// cross-process sharing, per spec.md §9.
pub struct AppState {
    pub config: Config,
    primary_models: ModelCache<PrimaryBackend>,
    accelerator_models: ModelCache<AcceleratorBackend>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            primary_models: ModelCache::new(),
            accelerator_models: ModelCache::new(),
        }
    }

    /// Whether the accelerator backend can actually be used right now: the
    /// cargo feature must be compiled in, the config must not have disabled
    /// it, and the model directory for it must exist.
    pub fn accelerator_available(&self) -> bool {
        accelerator::is_available() && self.config.accelerator_enabled
    }

    /// Resolve the backend a profile should run on, applying the transparent
    /// fallback to `primary` when `accelerator` was requested but is
    /// unavailable (spec.md §4.1).
    pub fn resolve_backend(&self, profile: TranscriptionProfile) -> Backend {
        let wanted = profile.spec().backend;
        if wanted == Backend::Accelerator && !self.accelerator_available() {
            tracing::warn!(profile = profile.as_str(), "accelerator backend unavailable, falling back to primary");
            return Backend::Primary;
        }
        wanted
    }

    pub async fn primary_backend(&self, model_id: &str) -> Result<Arc<PrimaryBackend>, GatewayError> {
        let model_path = self.config.model_path(model_id);
        let model_id = model_id.to_string();
        self.primary_models
            .get_or_load(&model_id, || async {
                PrimaryBackend::load(&model_path, &model_id)
            })
            .await
            .map_err(GatewayError::Engine)
    }

    pub async fn accelerator_backend(&self, model_id: &str) -> Result<Arc<AcceleratorBackend>, GatewayError> {
        let model_path = self.config.model_path(model_id);
        let model_id = model_id.to_string();
        self.accelerator_models
            .get_or_load(&model_id, || async {
                AcceleratorBackend::load(&model_path, &model_id)
            })
            .await
            .map_err(GatewayError::Engine)
    }

    /// Load (or confirm cached) a backend for `profile`, following the same
    /// fallback rule as [`Self::resolve_backend`]. Returns the backend
    /// actually used, which may differ from the profile's nominal backend.
    pub async fn backend_for_profile(
        &self,
        profile: TranscriptionProfile,
    ) -> Result<(Backend, Arc<dyn AsrBackend>), GatewayError> {
        let spec = profile.spec();
        match self.resolve_backend(profile) {
            Backend::Accelerator => {
                let backend = self.accelerator_backend(spec.model_id).await?;
                Ok((Backend::Accelerator, backend as Arc<dyn AsrBackend>))
            }
            Backend::Primary => {
                let backend = self.primary_backend(spec.model_id).await?;
                Ok((Backend::Primary, backend as Arc<dyn AsrBackend>))
            }
        }
    }

    pub async fn model_state(&self, backend: Backend, model_id: &str) -> asr_engine::ModelState {
        match backend {
            Backend::Primary => self.primary_models.state(model_id).await,
            Backend::Accelerator => self.accelerator_models.state(model_id).await,
        }
    }
}
