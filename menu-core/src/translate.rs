//! Optional translation of built-in labels ("Back", "Exit", "ON", ...).

/// Translation backend supplied by the host.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str) -> String;
}

/// Returns the text unchanged. Used when the host supplies no translator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranslation;

impl Translator for NoTranslation {
    fn translate(&self, text: &str) -> String {
        text.to_string()
    }
}

impl<F> Translator for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn translate(&self, text: &str) -> String {
        self(text)
    }
}
