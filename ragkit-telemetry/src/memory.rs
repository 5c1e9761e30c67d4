//! In-memory span capture, keyed by invocation id.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;
use tracing::span::{Attributes, Id, Record};
use tracing::{Subscriber, field::Field};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

/// Field name that groups spans into one trace.
pub const INVOCATION_ID: &str = "invocation_id";

/// A closed span.
#[derive(Debug, Clone, Serialize)]
pub struct SpanData {
    /// The span name, e.g. `rag_pipeline`.
    pub name: String,
    /// Name of the parent span, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Wall-clock start, nanoseconds since the Unix epoch.
    pub start_time: u128,
    /// Wall-clock end, nanoseconds since the Unix epoch.
    pub end_time: u128,
    /// Recorded fields, including those inherited from the parent.
    pub attributes: HashMap<String, Value>,
}

impl SpanData {
    /// Span duration in nanoseconds.
    pub fn duration_nanos(&self) -> u128 {
        self.end_time.saturating_sub(self.start_time)
    }
}

/// Shared storage for captured spans.
#[derive(Debug, Clone, Default)]
pub struct SharedTraceStorage {
    traces: Arc<RwLock<HashMap<String, Vec<SpanData>>>>,
}

impl SharedTraceStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spans recorded under `invocation_id`, in close order.
    pub fn get_trace(&self, invocation_id: &str) -> Option<Vec<SpanData>> {
        self.traces.read().unwrap_or_else(PoisonError::into_inner).get(invocation_id).cloned()
    }

    /// Every invocation id seen so far.
    pub fn invocation_ids(&self) -> Vec<String> {
        self.traces.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect()
    }

    fn add_span(&self, invocation_id: String, span: SpanData) {
        self.traces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(invocation_id)
            .or_default()
            .push(span);
    }
}

/// A tracing layer that stores closed spans carrying an `invocation_id`.
///
/// Child spans inherit the id from their parent, so every stage span of one
/// pipeline run lands in the same trace.
pub struct InMemoryTraceLayer {
    storage: SharedTraceStorage,
}

impl InMemoryTraceLayer {
    /// Create a layer writing into `storage`.
    pub fn new(storage: SharedTraceStorage) -> Self {
        Self { storage }
    }
}

struct StartTime(u128);

#[derive(Clone, Default)]
struct SpanFields(HashMap<String, Value>);

fn now_nanos() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos()
}

impl<S> Layer<S> for InMemoryTraceLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };

        let mut visitor = JsonVisitor::default();
        attrs.record(&mut visitor);
        let mut fields = visitor.0;

        if !fields.contains_key(INVOCATION_ID) {
            let inherited = span.parent().and_then(|parent| {
                parent.extensions().get::<SpanFields>().and_then(|f| f.0.get(INVOCATION_ID).cloned())
            });
            if let Some(value) = inherited {
                fields.insert(INVOCATION_ID.to_string(), value);
            }
        }

        let mut extensions = span.extensions_mut();
        extensions.insert(StartTime(now_nanos()));
        extensions.insert(SpanFields(fields));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut extensions = span.extensions_mut();
        if let Some(fields) = extensions.get_mut::<SpanFields>() {
            let mut visitor = JsonVisitor::default();
            values.record(&mut visitor);
            fields.0.extend(visitor.0);
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else { return };
        let extensions = span.extensions();

        let fields = extensions.get::<SpanFields>().cloned().unwrap_or_default().0;
        let Some(invocation_id) = fields.get(INVOCATION_ID).and_then(Value::as_str).map(str::to_string)
        else {
            return;
        };

        let data = SpanData {
            name: span.name().to_string(),
            parent: span.parent().map(|p| p.name().to_string()),
            start_time: extensions.get::<StartTime>().map(|s| s.0).unwrap_or(0),
            end_time: now_nanos(),
            attributes: fields,
        };
        self.storage.add_span(invocation_id, data);
    }
}

#[derive(Default)]
struct JsonVisitor(HashMap<String, Value>);

impl tracing::field::Visit for JsonVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().to_string(), Value::Bool(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON number form.
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.0.insert(field.name().to_string(), value);
    }
}
