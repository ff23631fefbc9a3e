pub mod loader;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch, RwLock};

use crate::form::{BindingRegistry, SharedForm};

pub use loader::{ComponentLoader, Fragment};

/// Page-wide announcements that should trigger a re-scan for forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSignal {
    /// Initial document is ready.
    Loaded,
    /// Shared header/footer fragments have finished loading.
    ComponentsLoaded,
}

#[derive(Debug, Clone)]
pub struct PageEvents {
    tx: broadcast::Sender<PageSignal>,
}

impl PageEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PageSignal> {
        self.tx.subscribe()
    }

    /// Returns the number of listeners that will see the signal.
    pub fn announce(&self, signal: PageSignal) -> usize {
        match self.tx.send(signal) {
            Ok(listeners) => listeners,
            Err(_) => {
                tracing::debug!("No listeners for {signal:?}");
                0
            }
        }
    }
}

/// A rendered page: its location, the forms on it, and named placeholders
/// that fragments are injected into.
#[derive(Debug)]
pub struct Page {
    location: String,
    forms: RwLock<Vec<SharedForm>>,
    placeholders: RwLock<HashMap<String, Option<String>>>,
}

impl Page {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            forms: RwLock::new(Vec::new()),
            placeholders: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_placeholder(mut self, id: impl Into<String>) -> Self {
        self.placeholders.get_mut().insert(id.into(), None);
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub async fn add_form(&self, form: SharedForm) {
        self.forms.write().await.push(form);
    }

    pub async fn forms(&self) -> Vec<SharedForm> {
        self.forms.read().await.clone()
    }

    /// Fill a declared placeholder. Returns false when the page has no such
    /// placeholder.
    pub async fn inject(&self, placeholder: &str, html: String) -> bool {
        match self.placeholders.write().await.get_mut(placeholder) {
            Some(slot) => {
                *slot = Some(html);
                true
            }
            None => false,
        }
    }

    pub async fn fragment(&self, placeholder: &str) -> Option<String> {
        self.placeholders
            .read()
            .await
            .get(placeholder)
            .cloned()
            .flatten()
    }
}

/// Re-scan `page` for forms on every signal until shutdown or until the
/// signal channel closes.
pub async fn run_binder(
    registry: Arc<BindingRegistry>,
    page: Arc<Page>,
    mut signals: broadcast::Receiver<PageSignal>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            signal = signals.recv() => {
                match signal {
                    Ok(signal) => {
                        let bound = registry.scan(&page.forms().await).await;
                        tracing::debug!("{signal:?} on {}: bound {bound} new form(s)", page.location());
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Binder skipped {skipped} page signal(s); rescanning");
                        registry.scan(&page.forms().await).await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!("Binder for {} stopped", page.location());
}
