use crate::error::DecodeError;
use serde::Deserialize;
use serde_json::Value;

/// Stats document of a Jiva controller (`GET /v1/stats`).
///
/// Controllers encode most counters as JSON strings and some as numbers; both are accepted. A
/// field that is missing, `null` or of an unexpected shape reads as zero without affecting the
/// other fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VolumeStats {
    #[serde(rename = "Name", deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(rename = "ReadIOPS", deserialize_with = "lenient::unsigned")]
    pub read_iops: u64,
    #[serde(rename = "WriteIOPS", deserialize_with = "lenient::unsigned")]
    pub write_iops: u64,
    #[serde(rename = "ReplicaCounter", deserialize_with = "lenient::unsigned")]
    pub replica_counter: u64,
    #[serde(rename = "RevisionCounter", deserialize_with = "lenient::unsigned")]
    pub revision_counter: u64,
    /// Bytes per block.
    #[serde(rename = "SectorSize", deserialize_with = "lenient::unsigned")]
    pub sector_size: u64,
    /// Provisioned size in bytes.
    #[serde(rename = "Size", deserialize_with = "lenient::unsigned")]
    pub size: u64,
    #[serde(rename = "TotalReadBlockCount", deserialize_with = "lenient::unsigned")]
    pub total_read_block_count: u64,
    // The controller has always spelled this key this way.
    #[serde(rename = "TotatWriteBlockCount", deserialize_with = "lenient::unsigned")]
    pub total_write_block_count: u64,
    /// Milliseconds, may be fractional.
    #[serde(rename = "TotalReadTime", deserialize_with = "lenient::float")]
    pub total_read_time: f64,
    /// Milliseconds, may be fractional.
    #[serde(rename = "TotalWriteTime", deserialize_with = "lenient::float")]
    pub total_write_time: f64,
    /// Seconds.
    #[serde(rename = "UpTime", deserialize_with = "lenient::float")]
    pub up_time: f64,
    #[serde(rename = "UsedBlocks", deserialize_with = "lenient::unsigned")]
    pub used_blocks: u64,
    #[serde(rename = "UsedLogicalBlocks", deserialize_with = "lenient::unsigned")]
    pub used_logical_blocks: u64,
}

impl VolumeStats {
    /// Decodes a stats body. Fails only when the body is not a JSON object.
    pub fn from_slice(body: &[u8]) -> Result<Self, DecodeError> {
        let document: Value = serde_json::from_slice(body)?;
        if !document.is_object() {
            return Err(DecodeError::NotAnObject {
                found: json_type(&document),
            });
        }
        Ok(Self::deserialize(document)?)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

mod lenient {
    use serde::{
        Deserialize,
        Deserializer,
    };
    use serde_json::Value;

    pub(super) fn unsigned<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        Ok(as_unsigned(&Value::deserialize(deserializer)?))
    }

    pub(super) fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(as_float(&Value::deserialize(deserializer)?))
    }

    pub(super) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
    }

    fn as_unsigned(value: &Value) -> u64 {
        match value {
            Value::Number(n) => n.as_u64().unwrap_or_else(|| truncate(n.as_f64().unwrap_or_default())),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<u64>()
                    .unwrap_or_else(|_| s.parse::<f64>().map(truncate).unwrap_or_default())
            }
            _ => 0,
        }
    }

    fn as_float(value: &Value) -> f64 {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|v| v.is_finite()).unwrap_or_default()
    }

    /// Negative and non-finite values read as zero.
    fn truncate(value: f64) -> u64 {
        if value.is_finite() && value > 0.0 {
            value as u64
        } else {
            0
        }
    }
}
