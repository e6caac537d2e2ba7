use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::chart::tooth::EntityKey;
use crate::encode::export::EncodedImage;
use crate::foundation::error::{AnnotateError, AnnotateResult};

/// What an export hands to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnotationUpdate {
    /// Full composite at canonical resolution.
    Composite(EncodedImage),
    /// The annotation was cleared; the key should read as absent.
    Cleared,
}

impl AnnotationUpdate {
    /// Stored string form: the encoded image, or empty for a cleared annotation.
    pub fn as_stored(&self) -> &str {
        match self {
            Self::Composite(img) => img.as_str(),
            Self::Cleared => "",
        }
    }
}

/// Receiver of every export a session performs.
///
/// Calls arrive in mutation order for a given key. An error here is surfaced to the caller of the
/// operation that triggered the export.
pub trait PersistSink {
    fn persist(&mut self, key: &EntityKey, update: &AnnotationUpdate) -> AnnotateResult<()>;
}

impl<S: PersistSink + ?Sized> PersistSink for Box<S> {
    fn persist(&mut self, key: &EntityKey, update: &AnnotationUpdate) -> AnnotateResult<()> {
        (**self).persist(key, update)
    }
}

/// Shared sinks, so a host can keep reading a store the engine writes to.
impl<S: PersistSink + ?Sized> PersistSink for Rc<RefCell<S>> {
    fn persist(&mut self, key: &EntityKey, update: &AnnotationUpdate) -> AnnotateResult<()> {
        self.borrow_mut().persist(key, update)
    }
}

/// Adapter for closures.
pub struct CallbackSink<F>(pub F);

impl<F> std::fmt::Debug for CallbackSink<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CallbackSink")
    }
}

impl<F> PersistSink for CallbackSink<F>
where
    F: FnMut(&EntityKey, &AnnotationUpdate) -> AnnotateResult<()>,
{
    fn persist(&mut self, key: &EntityKey, update: &AnnotationUpdate) -> AnnotateResult<()> {
        (self.0)(key, update)
    }
}

/// In-memory last-write-wins map from entity key to its latest composite.
///
/// Serializes as a flat JSON object, the form embedded in patient records.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AnnotationStore {
    entries: BTreeMap<EntityKey, EncodedImage>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest composite for `key`, if any.
    pub fn get(&self, key: &EntityKey) -> Option<&EncodedImage> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &EncodedImage)> {
        self.entries.iter()
    }

    /// Apply one update: overwrite on a composite, remove on clear.
    pub fn apply(&mut self, key: &EntityKey, update: &AnnotationUpdate) {
        match update {
            AnnotationUpdate::Composite(img) => {
                self.entries.insert(key.clone(), img.clone());
            }
            AnnotationUpdate::Cleared => {
                self.entries.remove(key);
            }
        }
    }

    /// Parse the JSON object form. Blank values are dropped as absent.
    pub fn from_json_str(text: &str) -> AnnotateResult<Self> {
        let raw: BTreeMap<EntityKey, String> = serde_json::from_str(text)
            .map_err(|e| AnnotateError::persist(format!("annotation store JSON: {e}")))?;
        let entries = raw
            .into_iter()
            .filter_map(|(k, v)| EncodedImage::from_stored(v).map(|img| (k, img)))
            .collect();
        Ok(Self { entries })
    }

    pub fn to_json_string(&self) -> AnnotateResult<String> {
        serde_json::to_string(self)
            .map_err(|e| AnnotateError::persist(format!("annotation store JSON: {e}")))
    }
}

impl PersistSink for AnnotationStore {
    fn persist(&mut self, key: &EntityKey, update: &AnnotationUpdate) -> AnnotateResult<()> {
        self.apply(key, update);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
