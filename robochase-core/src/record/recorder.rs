use super::Record;

/// Sink for the diagnostic records produced while a policy runs.
pub trait Recorder {
    /// Consumes one record, typically the diagnostics of a single step.
    fn write(&mut self, record: Record);
}
