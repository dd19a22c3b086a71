//! Lazily evaluated strings for labels, texts and commands.

use std::fmt;
use std::sync::Arc;

/// A string produced on demand. Literals are wrapped as constant providers, so callers always invoke.
#[derive(Clone)]
pub struct Text(Arc<dyn Fn() -> String + Send + Sync>);

impl Text {
    /// Wraps a provider evaluated on every [`Text::get`].
    pub fn provider(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn get(&self) -> String {
        (self.0)()
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Self::provider(move || value.clone())
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Text").field(&self.get()).finish()
    }
}
