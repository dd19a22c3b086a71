//! Field descriptors: the declarative description of one editable value.
//!
//! A [`FieldDescriptor`] carries a [`FieldKind`] (string, number, boolean or list), presence,
//! editability, a default, and the hook set evaluated around every change. Each kind implements
//! [`Editable`]: it renders the status shown on the field's button and turns a candidate into the
//! value to store.

use menu_core::{Translator, ValidationError};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

use crate::layout::LayoutSettings;

/// Shown on a field's button while it has no value.
pub const UNSET: &str = "?";

/// Called before a change with (current record, key, candidate record, path). `false` vetoes.
///
/// Both records are whole objects: the candidate is the current record with `key` set to the new
/// value and every `on_set_reset` sibling set to null. The new value is `candidate[key]`.
pub type BeforeSetHook = Arc<dyn Fn(&Value, &str, &Value, &FieldPath) -> bool + Send + Sync>;
/// Called after a committed change with (record, key, path, live layout settings).
pub type AfterSetHook = Arc<dyn Fn(&Value, &str, &FieldPath, &mut LayoutSettings) + Send + Sync>;
/// Produces list entries (key, label) on demand.
pub type ListProvider = Arc<dyn Fn() -> Vec<(String, String)> + Send + Sync>;

/// Location of a field inside the host data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    pub data_id: String,
    /// Item index for array sections.
    pub index: Option<usize>,
    pub key: String,
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}].{}", self.data_id, index, self.key),
            None => write!(f, "{}.{}", self.data_id, self.key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    #[default]
    Mandatory,
    Optional,
}

/// Hooks evaluated around every attempted change of a field.
#[derive(Clone, Default)]
pub struct FieldHooks {
    pub on_set_before: Option<BeforeSetHook>,
    pub on_set_after: Option<AfterSetHook>,
    /// Sibling keys reverted to unset whenever this field commits.
    pub on_set_reset: Vec<String>,
}

/// Status rendering and candidate validation shared by every field kind.
pub trait Editable {
    /// Status of a set value (unset values are rendered as [`UNSET`] by the caller).
    fn status(&self, value: &Value, translator: &dyn Translator) -> String;

    /// Turns a raw candidate into the value to store. Empty input yields `Null` for optional fields.
    fn parse(&self, raw: &str, presence: Presence) -> Result<Value, ValidationError>;

    /// Whether editing goes through a typed reply.
    fn takes_input(&self) -> bool {
        false
    }
}

fn empty_input(raw: &str, presence: Presence) -> Option<Result<Value, ValidationError>> {
    if raw.trim().is_empty() {
        Some(match presence {
            Presence::Mandatory => Err(ValidationError::Empty),
            Presence::Optional => Ok(Value::Null),
        })
    } else {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringField;

impl Editable for StringField {
    fn status(&self, value: &Value, _translator: &dyn Translator) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn parse(&self, raw: &str, presence: Presence) -> Result<Value, ValidationError> {
        if let Some(result) = empty_input(raw, presence) {
            return result;
        }
        Ok(Value::String(raw.to_string()))
    }

    fn takes_input(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct NumberField {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub integer: bool,
}

impl Editable for NumberField {
    fn status(&self, value: &Value, _translator: &dyn Translator) -> String {
        value.to_string()
    }

    fn parse(&self, raw: &str, presence: Presence) -> Result<Value, ValidationError> {
        if let Some(result) = empty_input(raw, presence) {
            return result;
        }
        let trimmed = raw.trim();
        let value: f64 = trimmed
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| ValidationError::NotANumber(trimmed.to_string()))?;
        if self.integer && value.fract() != 0.0 {
            return Err(ValidationError::NotANumber(trimmed.to_string()));
        }
        let min = self.min.unwrap_or(f64::MIN);
        let max = self.max.unwrap_or(f64::MAX);
        if value < min || value > max {
            return Err(ValidationError::OutOfRange { value, min, max });
        }
        if let Some(step) = self.step.filter(|s| *s > 0.0) {
            let steps = (value - self.min.unwrap_or(0.0)) / step;
            if (steps - steps.round()).abs() > 1e-9 {
                return Err(ValidationError::Step { value, step });
            }
        }
        if self.integer {
            Ok(json!(value as i64))
        } else {
            Ok(json!(value))
        }
    }

    fn takes_input(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct BooleanField;

impl Editable for BooleanField {
    fn status(&self, value: &Value, translator: &dyn Translator) -> String {
        if value.as_bool().unwrap_or(false) {
            translator.translate("ON")
        } else {
            translator.translate("OFF")
        }
    }

    fn parse(&self, raw: &str, presence: Presence) -> Result<Value, ValidationError> {
        if let Some(result) = empty_input(raw, presence) {
            return result;
        }
        match raw.trim().to_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(Value::Bool(true)),
            "false" | "off" | "no" | "0" => Ok(Value::Bool(false)),
            other => Err(ValidationError::UnknownChoice(other.to_string())),
        }
    }
}

#[derive(Clone)]
pub enum ListSource {
    Static(Vec<(String, String)>),
    Dynamic(ListProvider),
}

/// Field whose value is a key picked from a list of (key, label) entries.
#[derive(Clone)]
pub struct ListField {
    source: ListSource,
    cache: Option<Vec<(String, String)>>,
}

impl ListField {
    pub fn new(source: ListSource) -> Self {
        Self {
            source,
            cache: None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.source, ListSource::Dynamic(_))
    }

    /// Current entries. Dynamic sources are invoked on first use and again when `force` is set.
    pub fn load(&mut self, force: bool) -> &[(String, String)] {
        match &self.source {
            ListSource::Static(entries) => entries,
            ListSource::Dynamic(provider) => {
                if force || self.cache.is_none() {
                    self.cache = Some(provider());
                }
                self.cache.as_deref().unwrap_or(&[])
            }
        }
    }

    /// Entries already known without invoking a provider.
    pub fn entries(&self) -> &[(String, String)] {
        match &self.source {
            ListSource::Static(entries) => entries,
            ListSource::Dynamic(_) => self.cache.as_deref().unwrap_or(&[]),
        }
    }

    pub fn label_of(&self, key: &str) -> Option<&str> {
        self.entries()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, label)| label.as_str())
    }
}

impl Editable for ListField {
    fn status(&self, value: &Value, _translator: &dyn Translator) -> String {
        let key = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.label_of(&key).map(str::to_string).unwrap_or(key)
    }

    fn parse(&self, raw: &str, presence: Presence) -> Result<Value, ValidationError> {
        if let Some(result) = empty_input(raw, presence) {
            return result;
        }
        if self.label_of(raw).is_some() {
            Ok(Value::String(raw.to_string()))
        } else {
            Err(ValidationError::UnknownChoice(raw.to_string()))
        }
    }
}

#[derive(Clone)]
pub enum FieldKind {
    String(StringField),
    Number(NumberField),
    Boolean(BooleanField),
    List(ListField),
}

impl FieldKind {
    pub fn editable(&self) -> &dyn Editable {
        match self {
            FieldKind::String(f) => f,
            FieldKind::Number(f) => f,
            FieldKind::Boolean(f) => f,
            FieldKind::List(f) => f,
        }
    }
}

/// Declarative description of one editable value.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub(crate) kind: FieldKind,
    pub(crate) presence: Presence,
    pub(crate) editable: bool,
    pub(crate) default: Option<Value>,
    pub(crate) hooks: FieldHooks,
    pub(crate) label: String,
    pub(crate) text: Option<String>,
}

impl FieldDescriptor {
    fn with_kind(kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            presence: Presence::Mandatory,
            editable: true,
            default: None,
            hooks: FieldHooks::default(),
            label: label.into(),
            text: None,
        }
    }

    pub fn string(label: impl Into<String>) -> Self {
        Self::with_kind(FieldKind::String(StringField), label)
    }

    pub fn number(label: impl Into<String>, min: f64, max: f64, step: f64) -> Self {
        Self::with_kind(
            FieldKind::Number(NumberField {
                min: Some(min),
                max: Some(max),
                step: Some(step),
                integer: false,
            }),
            label,
        )
    }

    pub fn integer(label: impl Into<String>, min: i64, max: i64, step: i64) -> Self {
        Self::with_kind(
            FieldKind::Number(NumberField {
                min: Some(min as f64),
                max: Some(max as f64),
                step: Some(step as f64),
                integer: true,
            }),
            label,
        )
    }

    pub fn boolean(label: impl Into<String>) -> Self {
        Self::with_kind(FieldKind::Boolean(BooleanField), label)
    }

    /// List field over a static map of (key, label).
    pub fn list<K, L>(label: impl Into<String>, entries: impl IntoIterator<Item = (K, L)>) -> Self
    where
        K: Into<String>,
        L: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, l)| (k.into(), l.into()))
            .collect();
        Self::with_kind(
            FieldKind::List(ListField::new(ListSource::Static(entries))),
            label,
        )
    }

    /// List field whose entries come from `provider`, refreshed on `$extra=refresh`.
    pub fn dynamic_list(
        label: impl Into<String>,
        provider: impl Fn() -> Vec<(String, String)> + Send + Sync + 'static,
    ) -> Self {
        Self::with_kind(
            FieldKind::List(ListField::new(ListSource::Dynamic(Arc::new(provider)))),
            label,
        )
    }

    /// Message text shown while the field is open; defaults to the label.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Guards every change; see [`BeforeSetHook`] for the arguments.
    pub fn on_set_before(
        mut self,
        hook: impl Fn(&Value, &str, &Value, &FieldPath) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_set_before = Some(Arc::new(hook));
        self
    }

    pub fn on_set_after(
        mut self,
        hook: impl Fn(&Value, &str, &FieldPath, &mut LayoutSettings) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_set_after = Some(Arc::new(hook));
        self
    }

    pub fn on_set_reset<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hooks.on_set_reset = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn hooks(&self) -> &FieldHooks {
        &self.hooks
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub(crate) fn prompt(&self) -> &str {
        self.text.as_deref().unwrap_or(&self.label)
    }

    pub(crate) fn list_mut(&mut self) -> Option<&mut ListField> {
        match &mut self.kind {
            FieldKind::List(list) => Some(list),
            _ => None,
        }
    }

    /// Status shown on the field's button: [`UNSET`] or the kind-specific rendering.
    pub fn status(&self, value: Option<&Value>, translator: &dyn Translator) -> String {
        match value {
            None | Some(Value::Null) => UNSET.to_string(),
            Some(value) => self.kind.editable().status(value, translator),
        }
    }

    /// Validates a candidate for this field.
    pub fn parse(&self, raw: &str) -> Result<Value, ValidationError> {
        self.kind.editable().parse(raw, self.presence)
    }

    pub fn takes_input(&self) -> bool {
        self.kind.editable().takes_input()
    }
}
