//! brs kubehub – TaskRun fetch and watch wiring

#![forbid(unsafe_code)]

use anyhow::{anyhow, Context, Result};
use futures::TryStreamExt;
use kube::{
    api::{Api, ListParams},
    core::{ApiResource, DynamicObject, GroupVersionKind},
    runtime::watcher::{self, Event},
    Client,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use brs_core::Projection;

/// Group/version/kind of the objects carrying task results.
pub const TASKRUN_GVK: (&str, &str, &str) = ("tekton.dev", "v1beta1", "TaskRun");

/// Label the build controller puts on every TaskRun it creates for a BuildRun.
pub const BUILDRUN_LABEL: &str = "buildrun.shipwright.io/name";

fn taskrun_api(client: Client, namespace: Option<&str>) -> Api<DynamicObject> {
    let (group, version, kind) = TASKRUN_GVK;
    let ar = ApiResource::from_gvk(&GroupVersionKind::gvk(group, version, kind));
    match namespace {
        Some(ns) => Api::namespaced_with(client, ns, &ar),
        None => Api::default_namespaced_with(client, &ar),
    }
}

fn strip_managed_fields(v: &mut Value) {
    if let Some(meta) = v.get_mut("metadata").and_then(Value::as_object_mut) {
        meta.remove("managedFields");
    }
}

fn to_json(obj: &DynamicObject) -> Result<Value> {
    let mut raw = serde_json::to_value(obj).context("serializing DynamicObject")?;
    strip_managed_fields(&mut raw);
    Ok(raw)
}

/// BuildRun that owns a TaskRun, from its labels.
pub fn buildrun_of(taskrun: &Value) -> Option<&str> {
    taskrun.pointer("/metadata/labels")?.get(BUILDRUN_LABEL)?.as_str()
}

fn creation_ts(taskrun: &Value) -> i64 {
    taskrun
        .pointer("/metadata/creationTimestamp")
        .and_then(Value::as_str)
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}

fn name_of(taskrun: &Value) -> &str {
    taskrun.pointer("/metadata/name").and_then(Value::as_str).unwrap_or("")
}

/// Newest TaskRun by creation time; ties go to the greater name.
pub fn newest_taskrun(taskruns: Vec<Value>) -> Option<Value> {
    taskruns
        .into_iter()
        .max_by(|a, b| creation_ts(a).cmp(&creation_ts(b)).then_with(|| name_of(a).cmp(name_of(b))))
}

pub async fn fetch_taskrun(namespace: Option<&str>, name: &str) -> Result<Value> {
    let client = Client::try_default().await?;
    let api = taskrun_api(client, namespace);
    let obj = api.get(name).await.with_context(|| format!("getting TaskRun {name}"))?;
    to_json(&obj)
}

/// Most recent TaskRun created for `buildrun`, if any.
pub async fn fetch_last_taskrun(namespace: Option<&str>, buildrun: &str) -> Result<Option<Value>> {
    let client = Client::try_default().await?;
    let api = taskrun_api(client, namespace);
    let lp = ListParams::default().labels(&format!("{BUILDRUN_LABEL}={buildrun}"));
    let list = api.list(&lp).await.with_context(|| format!("listing TaskRuns for BuildRun {buildrun}"))?;
    debug!(buildrun, count = list.items.len(), "listed taskruns");
    let items = list.items.iter().map(to_json).collect::<Result<Vec<_>>>()?;
    Ok(newest_taskrun(items))
}

fn project_event(obj: &DynamicObject) -> Result<Option<(String, Projection)>> {
    let raw = to_json(obj)?;
    let Some(buildrun) = buildrun_of(&raw) else { return Ok(None) };
    let projection = brs_core::project_taskrun(&raw)
        .map_err(|e| anyhow!("TaskRun {}: {e}", name_of(&raw)))?;
    Ok(Some((buildrun.to_string(), projection)))
}

/// List+watch BuildRun-owned TaskRuns and send `(buildrun, projection)` for every applied object.
/// Returns when the receiver is dropped or the watch stream ends.
pub async fn watch_projections(namespace: Option<&str>, tx: mpsc::Sender<(String, Projection)>) -> Result<()> {
    let client = Client::try_default().await?;
    let api = taskrun_api(client, namespace);
    let cfg = watcher::Config::default().labels(BUILDRUN_LABEL);
    let stream = watcher::watcher(api, cfg);
    futures::pin_mut!(stream);
    info!(ns = ?namespace, "taskrun watcher started");

    while let Some(ev) = stream.try_next().await? {
        let objs = match ev {
            Event::Applied(o) => vec![o],
            Event::Deleted(_) => continue,
            Event::Restarted(list) => {
                debug!(count = list.len(), "watch restart");
                list
            }
        };
        for o in objs.iter() {
            match project_event(o) {
                Ok(Some(item)) => {
                    if tx.send(item).await.is_err() {
                        debug!("projection receiver dropped; stopping watcher");
                        return Ok(());
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "skipping taskrun"),
            }
        }
    }
    warn!("taskrun watch stream ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tr(name: &str, ts: &str) -> Value {
        json!({ "metadata": { "name": name, "creationTimestamp": ts, "labels": { "buildrun.shipwright.io/name": "br-1" } } })
    }

    #[test]
    fn newest_taskrun_prefers_latest_creation() {
        let picked = newest_taskrun(vec![
            tr("a", "2024-01-01T00:00:02Z"),
            tr("b", "2024-01-01T00:00:05Z"),
            tr("c", "2024-01-01T00:00:01Z"),
        ]);
        assert_eq!(picked.as_ref().map(name_of), Some("b"));
        assert!(newest_taskrun(Vec::new()).is_none());
    }

    #[test]
    fn newest_taskrun_breaks_ties_by_name() {
        let picked = newest_taskrun(vec![tr("x-2", "2024-01-01T00:00:00Z"), tr("x-1", "2024-01-01T00:00:00Z")]);
        assert_eq!(picked.as_ref().map(name_of), Some("x-2"));
    }

    #[test]
    fn buildrun_label_lookup() {
        assert_eq!(buildrun_of(&tr("a", "2024-01-01T00:00:00Z")), Some("br-1"));
        assert_eq!(buildrun_of(&json!({ "metadata": {} })), None);
    }

    #[test]
    fn managed_fields_are_stripped() {
        let mut v = json!({ "metadata": { "name": "a", "managedFields": [{}] } });
        strip_managed_fields(&mut v);
        assert_eq!(v, json!({ "metadata": { "name": "a" } }));
    }
}
