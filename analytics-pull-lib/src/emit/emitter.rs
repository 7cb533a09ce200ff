use super::{OutputQueue, Record};
use crate::report::ReportError;
use crate::transform::{CellValue, OutputRecord, RecordMetrics, strip_namespace};
use serde_json::Value;

const LOG_TARGET: &str = "   emitter";

/// Default value of the `type` field on emitted records
pub const DEFAULT_EVENT_TYPE: &str = "google_analytics_daily";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maps [`OutputRecord`]s into the host record shape and pushes them to a queue.
#[derive(Debug)]
pub struct Emitter<Q> {
    queue: Q,
    event_type: String,
    emitted: u64,
}

impl<Q: OutputQueue> Emitter<Q> {
    pub fn new(queue: Q, event_type: impl Into<String>) -> Self {
        Self {
            queue,
            event_type: event_type.into(),
            emitted: 0,
        }
    }

    /// Push one record; a rejection from the sink is returned as-is.
    pub async fn emit(&mut self, record: OutputRecord) -> Result<(), ReportError> {
        let mapped = to_record(&record, &self.event_type);
        self.queue.push(mapped).await?;
        self.emitted += 1;
        Ok(())
    }

    /// Number of records accepted by the queue so far.
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        self.emitted
    }

    #[must_use]
    pub const fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn into_queue(self) -> Q {
        self.queue
    }
}

/// Flatten a record into dotted field names.
///
/// Metric and dimension names that collide once their namespace is stripped
/// (`ga:city` and `city`) share one field; the later column wins.
#[expect(unused_results, reason = "Map::insert return values are not needed")]
#[must_use]
pub fn to_record(record: &OutputRecord, event_type: &str) -> Record {
    let mut fields = Record::new();

    fields.insert("type".to_string(), Value::String(event_type.to_string()));
    fields.insert("ga.date".to_string(), Value::String(record.date.format(DATE_FORMAT).to_string()));
    fields.insert("ga.contains_sampled_data".to_string(), Value::Bool(record.contains_sampled_data));

    if let Some(query) = &record.query {
        fields.insert("ga.query".to_string(), Value::String(query.clone()));
    }

    if let Some(profile_info) = &record.profile_info {
        fields.insert("ga.profile_info".to_string(), profile_info.clone());
    }

    match &record.metrics {
        RecordMetrics::Single { name, value } => {
            fields.insert("ga.metric.name".to_string(), Value::String(name.clone()));
            fields.insert(
                "ga.metric.value".to_string(),
                value.as_ref().map_or(Value::Null, CellValue::to_json),
            );
        }
        RecordMetrics::All(metrics) => {
            for metric in metrics {
                insert_column(&mut fields, &format!("ga.metrics.{}", strip_namespace(&metric.name)), &metric.value);
            }
        }
    }

    for (name, value) in record.dimension_fields() {
        insert_column(&mut fields, &format!("ga.dimensions.{name}"), value);
    }

    fields
}

fn insert_column(fields: &mut Record, key: &str, value: &CellValue) {
    if let Some(previous) = fields.insert(key.to_string(), value.to_json()) {
        log::debug!(target: LOG_TARGET, "Field '{key}' appears more than once, replacing {previous} with the later column");
    }
}
