//! Deduction scorer with lazy model loading.

use std::fmt;
use std::sync::{Arc, RwLock};

use taxbot_inference::{Classifier, ModelStore, RandomForest};
use tracing::{debug, info, warn};

use crate::models::deduction::ScorerKind;

/// Scorer used for one recommendation call.
#[derive(Clone)]
pub enum Scorer {
    /// Fitted probabilistic classifier.
    Trained(Arc<dyn Classifier>),
    /// Fixed fallback recommendations.
    Default,
}

impl Scorer {
    pub fn kind(&self) -> ScorerKind {
        match self {
            Scorer::Trained(_) => ScorerKind::Trained,
            Scorer::Default => ScorerKind::Default,
        }
    }
}

impl fmt::Debug for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scorer::Trained(model) => f
                .debug_struct("Trained")
                .field("classes", &model.class_names())
                .finish(),
            Scorer::Default => f.write_str("Default"),
        }
    }
}

/// Owns the lazily loaded model.
///
/// The model is read from the store on first use. A failed load yields
/// [`Scorer::Default`] for that call only; the next call tries again.
pub struct ScorerCell {
    store: Option<Arc<dyn ModelStore>>,
    model: RwLock<Option<Arc<dyn Classifier>>>,
}

impl ScorerCell {
    /// Cell loading from `store` on first use.
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        Self {
            store: Some(store),
            model: RwLock::new(None),
        }
    }

    /// Cell with a model already in place.
    pub fn with_model(model: Arc<dyn Classifier>) -> Self {
        Self {
            store: None,
            model: RwLock::new(Some(model)),
        }
    }

    /// Cell that always yields the default scorer until a model is installed.
    pub fn default_only() -> Self {
        Self {
            store: None,
            model: RwLock::new(None),
        }
    }

    /// Scorer for the current call.
    pub fn current(&self) -> Scorer {
        {
            let guard = self.model.read().unwrap_or_else(|e| e.into_inner());
            if let Some(model) = guard.as_ref() {
                return Scorer::Trained(Arc::clone(model));
            }
        }

        let Some(store) = &self.store else {
            debug!("No model store configured, using default scorer");
            return Scorer::Default;
        };

        let mut guard = self.model.write().unwrap_or_else(|e| e.into_inner());
        if let Some(model) = guard.as_ref() {
            return Scorer::Trained(Arc::clone(model));
        }

        match RandomForest::load(store.as_ref()) {
            Ok(forest) => {
                info!(
                    "Loaded deduction model from {} ({} trees)",
                    store.location(),
                    forest.n_trees()
                );
                let model: Arc<dyn Classifier> = Arc::new(forest);
                *guard = Some(Arc::clone(&model));
                Scorer::Trained(model)
            }
            Err(e) => {
                warn!("Deduction model unavailable, using defaults: {}", e);
                Scorer::Default
            }
        }
    }

    /// Replace the model used by subsequent calls.
    pub fn install(&self, model: Arc<dyn Classifier>) {
        let mut guard = self.model.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(model);
    }

    /// Drop the loaded model so the next call reloads from the store.
    pub fn reload(&self) {
        let mut guard = self.model.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.model
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use taxbot_inference::{FeatureMatrix, ForestParams, MemoryModelStore};

    struct CountingStore {
        inner: MemoryModelStore,
        loads: AtomicUsize,
    }

    impl ModelStore for CountingStore {
        fn load(&self) -> taxbot_inference::Result<Vec<u8>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load()
        }

        fn save(&self, bytes: &[u8]) -> taxbot_inference::Result<()> {
            self.inner.save(bytes)
        }

        fn location(&self) -> String {
            self.inner.location()
        }
    }

    fn tiny_forest() -> RandomForest {
        let x = FeatureMatrix::from_rows(&[vec![0.0], vec![1.0]]).unwrap();
        RandomForest::fit(
            ForestParams::default().with_estimators(3),
            &x,
            &[0, 1],
            vec!["f".to_string()],
            vec!["a".to_string(), "b".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_missing_model_falls_back() {
        let cell = ScorerCell::new(Arc::new(MemoryModelStore::new()));
        assert_eq!(cell.current().kind(), ScorerKind::Default);
        assert!(!cell.is_loaded());
    }

    #[test]
    fn test_retries_until_model_appears() {
        let store = Arc::new(MemoryModelStore::new());
        let cell = ScorerCell::new(store.clone());
        assert_eq!(cell.current().kind(), ScorerKind::Default);

        tiny_forest().persist(store.as_ref()).unwrap();
        assert_eq!(cell.current().kind(), ScorerKind::Trained);
        assert!(cell.is_loaded());
    }

    #[test]
    fn test_concurrent_first_use_loads_once() {
        let inner = MemoryModelStore::new();
        tiny_forest().persist(&inner).unwrap();
        let store = Arc::new(CountingStore {
            inner,
            loads: AtomicUsize::new(0),
        });
        let cell = ScorerCell::new(store.clone());

        const THREADS: usize = 8;
        let barrier = Barrier::new(THREADS);
        let kinds: Vec<ScorerKind> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        cell.current().kind()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(kinds.iter().all(|k| *k == ScorerKind::Trained));
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_corrupt_model_falls_back() {
        let cell = ScorerCell::new(Arc::new(MemoryModelStore::with_bytes(b"{not json".to_vec())));
        assert_eq!(cell.current().kind(), ScorerKind::Default);
    }

    #[test]
    fn test_install_and_reload() {
        let cell = ScorerCell::default_only();
        assert_eq!(cell.current().kind(), ScorerKind::Default);

        cell.install(Arc::new(tiny_forest()));
        assert_eq!(cell.current().kind(), ScorerKind::Trained);

        cell.reload();
        assert_eq!(cell.current().kind(), ScorerKind::Default);
    }
}
