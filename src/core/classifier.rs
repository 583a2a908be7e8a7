use std::path::Path;

/// Label produced by [`StubClassifier`] when none is configured.
pub const PLACEHOLDER_LABEL: &str = "thing";

/// Assigns a class label to an image file.
///
/// Implementations must be pure: the same path gives the same label and
/// nothing is written anywhere. The indexer only ever sees this trait, so a
/// real model can replace the stub without touching scanning or storage.
pub trait Classifier {
    fn classify(&self, path: &Path) -> String;
}

/// Object detection is not implemented yet; every image gets one constant label.
#[derive(Debug, Clone)]
pub struct StubClassifier {
    label: String,
}

impl StubClassifier {
    pub fn new() -> Self {
        Self::with_label(PLACEHOLDER_LABEL)
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for StubClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for StubClassifier {
    fn classify(&self, _path: &Path) -> String {
        self.label.clone()
    }
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn classify(&self, path: &Path) -> String {
        (**self).classify(path)
    }
}
