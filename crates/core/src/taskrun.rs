//! Extract raw results from a Tekton TaskRun object.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::project::project;
use crate::status::{Projection, RawResult};

const TASKRUN_KIND: &str = "TaskRun";

/// `status.taskResults` on v1beta1, `status.results` on v1.
const RESULT_FIELDS: [&str; 2] = ["taskResults", "results"];

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Collect string results from a TaskRun in document order.
///
/// A TaskRun without status or results yields an empty list. Array and object
/// results are skipped; a missing or null value counts as the empty string.
pub fn results_from_taskrun(taskrun: &Value) -> Result<Vec<RawResult>> {
    if let Some(kind) = taskrun.get("kind") {
        match kind.as_str() {
            Some(TASKRUN_KIND) => {}
            Some(other) => return Err(Error::UnexpectedKind(other.to_string())),
            None => return Err(Error::UnexpectedKind(kind.to_string())),
        }
    }

    let Some(entries) = taskrun
        .get("status")
        .and_then(|status| RESULT_FIELDS.iter().find_map(|field| status.get(field)))
    else {
        return Ok(Vec::new());
    };
    let entries = entries
        .as_array()
        .ok_or_else(|| Error::Malformed(format!("status results is {}, expected array", value_kind(entries))))?;

    let mut out = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Malformed(format!("result #{idx} has no string name")))?;
        match entry.get("value") {
            Some(Value::String(v)) => out.push(RawResult::new(name, v.as_str())),
            None | Some(Value::Null) => out.push(RawResult::new(name, "")),
            Some(other) => debug!(name, kind = value_kind(other), "skipping non-string task result"),
        }
    }
    Ok(out)
}

pub fn project_taskrun(taskrun: &Value) -> Result<Projection> {
    Ok(project(&results_from_taskrun(taskrun)?))
}

/// Parse a TaskRun from JSON text.
pub fn parse_taskrun(json: &str) -> Result<Value> {
    Ok(serde_json::from_str(json)?)
}
