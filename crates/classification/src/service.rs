//! Asynchronous classifier facade
//!
//! [`ImageClassifier`] owns the loaded model and label table behind one
//! mutex-guarded state slot and schedules every operation (model load,
//! classify, close) on tokio's blocking worker pool, so callers await
//! completion instead of blocking. Loads serialize on the slot, classify
//! only ever observes a fully installed model, and a load failure leaves
//! the classifier uninitialized rather than half-built.
//!
//! Operation ordering across the pool is not guaranteed; callers should
//! await a load before issuing a classify.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use image::RgbImage;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ClassifierError;
use crate::labels::LabelTable;
use crate::model::{LoadedModel, FLOAT_BYTES};
use crate::rank::{self, Classification};
use crate::tensor;

/// Label resource expected next to the model artifacts.
pub const LABEL_FILE: &str = "labels.txt";

enum State {
    Uninitialized,
    Loading,
    Ready {
        model: LoadedModel,
        labels: LabelTable,
    },
    Closed,
}

/// Image classifier facade over an assets directory.
pub struct ImageClassifier {
    assets_dir: PathBuf,
    state: Arc<Mutex<State>>,
}

impl ImageClassifier {
    /// Create a classifier over a directory of model artifacts.
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            state: Arc::new(Mutex::new(State::Uninitialized)),
        }
    }

    /// Whether a model is loaded and ready to classify.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state
            .lock()
            .map(|slot| matches!(&*slot, State::Ready { .. }))
            .unwrap_or(false)
    }

    /// Load a model by file name from the assets directory.
    ///
    /// # Errors
    /// See [`load_model`](Self::load_model).
    pub async fn load_model_from_assets(&self, name: &str) -> Result<(), ClassifierError> {
        self.load_model(self.assets_dir.join(name)).await
    }

    /// Load a model from an explicit path.
    ///
    /// Replaces any previously loaded model; the old session is dropped
    /// before the new one is built. Labels come from `labels.txt` in the
    /// assets directory; if that fails the synthetic table is substituted
    /// and the load still succeeds.
    ///
    /// # Errors
    /// Returns [`ClassifierError::ModelNotFound`] or
    /// [`ClassifierError::ModelLoad`] on failure, after which the
    /// classifier is uninitialized. Returns [`ClassifierError::Closed`]
    /// once the classifier has been closed.
    pub async fn load_model(&self, path: impl AsRef<Path>) -> Result<(), ClassifierError> {
        let path = path.as_ref().to_path_buf();
        let labels_path = self.assets_dir.join(LABEL_FILE);
        let state = Arc::clone(&self.state);

        spawn_worker(move || {
            {
                let mut slot = lock_state(&state)?;
                if matches!(&*slot, State::Closed) {
                    return Err(ClassifierError::Closed);
                }
                // Release the old handle before building the replacement.
                *slot = State::Loading;
            }

            match LoadedModel::load(&path) {
                Ok(model) => {
                    let labels = LabelTable::load(&labels_path).unwrap_or_else(|e| {
                        warn!("Could not load labels ({e}), using generic labels");
                        LabelTable::synthetic()
                    });
                    info!(
                        "Model {:?} ready ({}x{} input, {} classes)",
                        path,
                        model.input_width(),
                        model.input_height(),
                        labels.class_count()
                    );

                    let mut slot = lock_state(&state)?;
                    if matches!(&*slot, State::Closed) {
                        return Err(ClassifierError::Closed);
                    }
                    *slot = State::Ready { model, labels };
                    Ok(())
                }
                Err(e) => {
                    let mut slot = lock_state(&state)?;
                    if !matches!(&*slot, State::Closed) {
                        *slot = State::Uninitialized;
                    }
                    Err(e)
                }
            }
        })
        .await
    }

    /// Classify a decoded image against the loaded model.
    ///
    /// The state slot stays locked for the whole pack-run-rank sequence, so
    /// a concurrent load cannot swap the session mid-inference.
    ///
    /// # Errors
    /// Returns [`ClassifierError::Uninitialized`] unless a model load has
    /// completed, [`ClassifierError::Closed`] after close, and
    /// [`ClassifierError::Inference`] if the runtime call fails.
    pub async fn classify(&self, image: RgbImage) -> Result<Classification, ClassifierError> {
        let state = Arc::clone(&self.state);

        spawn_worker(move || {
            let mut slot = lock_state(&state)?;
            let (model, labels) = match &mut *slot {
                State::Ready { model, labels } => (model, labels),
                State::Closed => return Err(ClassifierError::Closed),
                State::Uninitialized | State::Loading => {
                    return Err(ClassifierError::Uninitialized)
                }
            };

            let input = tensor::pack(&image, model.input_width(), model.input_height());
            debug_assert_eq!(input.len() * FLOAT_BYTES, model.input_bytes());

            let started = Instant::now();
            let scores = model.run(&input)?;
            let inference_time_ms = started.elapsed().as_millis() as u64;

            debug!("Inference time: {inference_time_ms}ms");
            if scores.len() != labels.class_count() {
                debug!(
                    "Model produced {} scores for {} known classes",
                    scores.len(),
                    labels.class_count()
                );
            }

            Ok(rank::rank(&scores, labels, inference_time_ms))
        })
        .await
    }

    /// Release the inference session.
    ///
    /// The release runs as one more scheduled task; the returned handle can
    /// be awaited or dropped. Subsequent operations fail with
    /// [`ClassifierError::Closed`].
    pub fn close(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        tokio::task::spawn_blocking(move || {
            if let Ok(mut slot) = state.lock() {
                *slot = State::Closed;
                debug!("Classifier closed");
            }
        })
    }
}

async fn spawn_worker<T, F>(job: F) -> Result<T, ClassifierError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ClassifierError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ClassifierError::Worker(format!("Task join error: {e}")))?
}

fn lock_state(state: &Mutex<State>) -> Result<MutexGuard<'_, State>, ClassifierError> {
    state
        .lock()
        .map_err(|e| ClassifierError::Worker(format!("State lock poisoned: {e}")))
}
