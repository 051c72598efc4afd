use crate::domain::model::{DomainObject, Progress, SubmitMode};
use crate::domain::ports::ObjectSubmitter;
use crate::utils::error::{Result, UploadError};
use futures::future::try_join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use std::collections::HashMap;

/// Submit one homogeneous chunk: every member is posted concurrently and the
/// chunk fails as a whole on the first member failure.
///
/// The route is checked before any network call, so an unmapped type never
/// issues a POST. Chunk homogeneity is an internal invariant of the batch
/// orchestrator; violating it here is a bug, hence the assertions.
pub async fn submit_chunk<S>(
    submitter: &S,
    objs: &[DomainObject],
    mode: SubmitMode,
) -> Result<Vec<Value>>
where
    S: ObjectSubmitter + ?Sized,
{
    assert!(!objs.is_empty(), "chunk must not be empty");
    let type_tag = &objs[0].type_tag;
    assert!(
        objs.iter().all(|obj| obj.type_tag == *type_tag),
        "chunk must be homogeneous, found types other than '{type_tag}'"
    );

    if !submitter.has_route(type_tag, mode) {
        return Err(UploadError::UnknownType {
            type_tag: type_tag.clone(),
        });
    }

    try_join_all(objs.iter().map(|obj| submitter.submit_one(obj, mode))).await
}

/// Submit a heterogeneous collection.
///
/// Objects are grouped by type tag regardless of input order, each group is
/// split into `chunk_size` chunks, and every chunk is scheduled at once. The
/// aggregate result is collected in completion order, calling `reporter`
/// after each finished chunk with the finishing type as label. The first
/// chunk failure propagates; chunks still pending at that point are dropped,
/// which cancels their in-flight requests.
///
/// An empty input returns immediately without touching the network or the
/// reporter.
pub async fn submit_all<S, R>(
    submitter: &S,
    objs: &[DomainObject],
    mode: SubmitMode,
    chunk_size: usize,
    mut reporter: R,
) -> Result<Vec<Value>>
where
    S: ObjectSubmitter + ?Sized,
    R: FnMut(&Progress),
{
    if objs.is_empty() {
        return Ok(Vec::new());
    }

    let total = objs.len();
    let groups = group_by_type(objs);
    tracing::debug!(
        objects = total,
        types = groups.len(),
        chunk_size,
        "submitting batch"
    );

    let mut pending = FuturesUnordered::new();
    for (label, members) in &groups {
        for chunk in members.chunks(chunk_size.max(1)) {
            pending.push(async move {
                let outcome = submit_chunk(submitter, chunk, mode).await;
                (label, chunk.len(), outcome)
            });
        }
    }

    let mut results = Vec::with_capacity(total);
    let mut completed = 0usize;
    while let Some((label, chunk_len, outcome)) = pending.next().await {
        results.extend(outcome?);
        completed += chunk_len;
        reporter(&Progress {
            total,
            completed,
            label: label.clone(),
        });
    }

    Ok(results)
}

// Groups by type identity, not adjacency; group order follows first
// appearance in the input.
fn group_by_type(objs: &[DomainObject]) -> Vec<(String, Vec<DomainObject>)> {
    let mut order: Vec<String> = Vec::new();
    let mut members: HashMap<String, Vec<DomainObject>> = HashMap::new();

    for obj in objs {
        if !members.contains_key(&obj.type_tag) {
            order.push(obj.type_tag.clone());
        }
        members
            .entry(obj.type_tag.clone())
            .or_default()
            .push(obj.clone());
    }

    order
        .into_iter()
        .map(|tag| {
            let group = members.remove(&tag).unwrap_or_default();
            (tag, group)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockSubmitter {
        routed: Vec<String>,
        submitted: AtomicUsize,
        fail_tag: Option<String>,
    }

    impl MockSubmitter {
        fn routing(tags: &[&str]) -> Self {
            Self {
                routed: tags.iter().map(|t| t.to_string()).collect(),
                submitted: AtomicUsize::new(0),
                fail_tag: None,
            }
        }

        fn failing_on(tag: &str, routed: &[&str]) -> Self {
            let mut mock = Self::routing(routed);
            mock.fail_tag = Some(tag.to_string());
            mock
        }

        fn submissions(&self) -> usize {
            self.submitted.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ObjectSubmitter for MockSubmitter {
        fn has_route(&self, type_tag: &str, _mode: SubmitMode) -> bool {
            self.routed.iter().any(|t| t == type_tag)
        }

        async fn submit_one(&self, obj: &DomainObject, _mode: SubmitMode) -> Result<Value> {
            self.submitted.fetch_add(1, Ordering::SeqCst);
            if self.fail_tag.as_deref() == Some(obj.type_tag.as_str()) {
                return Err(UploadError::BackendValidation {
                    status: 422,
                    message: "rejected".into(),
                });
            }
            Ok(json!({"type": obj.type_tag}))
        }
    }

    fn objects(tag: &str, count: usize) -> Vec<DomainObject> {
        (0..count)
            .map(|i| DomainObject::new(tag).with_field("n", i as i64))
            .collect()
    }

    #[tokio::test]
    async fn one_chunk_submission_per_ceil_division() {
        let mock = MockSubmitter::routing(&["employee"]);
        let objs = objects("employee", 25);
        let mut chunks_seen = 0usize;

        let results = submit_all(&mock, &objs, SubmitMode::Create, 10, |_| chunks_seen += 1)
            .await
            .unwrap();

        assert_eq!(results.len(), 25);
        assert_eq!(chunks_seen, 3);
        assert_eq!(mock.submissions(), 25);
    }

    #[tokio::test]
    async fn progress_counts_objects_and_labels_types() {
        let mock = MockSubmitter::routing(&["a", "b"]);
        let mut objs = objects("a", 3);
        objs.extend(objects("b", 2));
        let mut snapshots: Vec<(usize, usize, String)> = Vec::new();

        submit_all(&mock, &objs, SubmitMode::Create, 100, |p| {
            snapshots.push((p.completed, p.total, p.label.clone()))
        })
        .await
        .unwrap();

        assert_eq!(snapshots.len(), 2);
        assert!(snapshots.iter().all(|(_, total, _)| *total == 5));
        assert_eq!(snapshots.last().map(|(done, _, _)| *done), Some(5));
        let labels: Vec<&str> = snapshots.iter().map(|(_, _, l)| l.as_str()).collect();
        assert!(labels.contains(&"a") && labels.contains(&"b"));
    }

    #[tokio::test]
    async fn groups_interleaved_input_by_type_identity() {
        let mock = MockSubmitter::routing(&["a", "b"]);
        let objs = vec![
            DomainObject::new("a"),
            DomainObject::new("b"),
            DomainObject::new("a"),
            DomainObject::new("b"),
        ];
        let mut chunks_seen = 0usize;

        let results = submit_all(&mock, &objs, SubmitMode::Create, 10, |_| chunks_seen += 1)
            .await
            .unwrap();

        // One chunk per type, not one per adjacent run.
        assert_eq!(chunks_seen, 2);
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn empty_input_short_circuits() {
        let mock = MockSubmitter::routing(&[]);
        let mut reported = false;

        let results = submit_all(&mock, &[], SubmitMode::Create, 10, |_| reported = true)
            .await
            .unwrap();

        assert!(results.is_empty());
        assert!(!reported);
        assert_eq!(mock.submissions(), 0);
    }

    #[tokio::test]
    async fn unmapped_type_fails_without_submissions() {
        let mock = MockSubmitter::routing(&[]);
        let objs = objects("widget", 3);

        let err = submit_chunk(&mock, &objs, SubmitMode::Create).await.unwrap_err();

        assert!(matches!(err, UploadError::UnknownType { type_tag } if type_tag == "widget"));
        assert_eq!(mock.submissions(), 0);
    }

    #[tokio::test]
    async fn chunk_failure_fails_the_batch() {
        let mock = MockSubmitter::failing_on("bad", &["good", "bad"]);
        let mut objs = objects("good", 2);
        objs.extend(objects("bad", 1));

        let err = submit_all(&mock, &objs, SubmitMode::Create, 10, |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::BackendValidation { status: 422, .. }));
    }

    #[tokio::test]
    #[should_panic(expected = "homogeneous")]
    async fn mixed_chunk_is_an_internal_invariant_violation() {
        let mock = MockSubmitter::routing(&["a", "b"]);
        let objs = vec![DomainObject::new("a"), DomainObject::new("b")];
        let _ = submit_chunk(&mock, &objs, SubmitMode::Create).await;
    }

    #[test]
    fn grouping_preserves_first_seen_order() {
        let objs = vec![
            DomainObject::new("z"),
            DomainObject::new("a"),
            DomainObject::new("z"),
        ];
        let groups = group_by_type(&objs);
        let tags: Vec<&str> = groups.iter().map(|(tag, _)| tag.as_str()).collect();
        assert_eq!(tags, vec!["z", "a"]);
        assert_eq!(groups[0].1.len(), 2);
    }
}
