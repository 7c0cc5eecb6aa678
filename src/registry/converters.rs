use std::sync::Arc;

use crate::negotiate::{ResponseHead, Value};

/// Turns a value of one kind into a new value for one target media type.
///
/// The output goes back through negotiation, so a converter may return text,
/// bytes, a stream, another typed value or an error. Failures are reported as
/// [`Value::Error`] rather than panics.
pub trait Converter: Send + Sync {
    fn convert(&self, value: Value, head: &mut ResponseHead) -> Value;
}

struct FnConverter<F>(F);

impl<F> Converter for FnConverter<F>
where
    F: Fn(Value, &mut ResponseHead) -> Value + Send + Sync,
{
    fn convert(&self, value: Value, head: &mut ResponseHead) -> Value {
        (self.0)(value, head)
    }
}

/// Wrap a closure as a shareable converter.
pub fn convert_with<F>(f: F) -> Arc<dyn Converter>
where
    F: Fn(Value, &mut ResponseHead) -> Value + Send + Sync + 'static,
{
    Arc::new(FnConverter(f))
}
