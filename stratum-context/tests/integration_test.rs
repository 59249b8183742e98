//! Integration tests for stratum-context

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use stratum_context::{AmbientContext, ContextPropagatingExecutor, ExecutorConfig, context};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_submissions_each_see_their_own_context() {
    let executor = Arc::new(ContextPropagatingExecutor::new(ExecutorConfig::new(4)));

    let mut handles = Vec::new();
    for request in 0..32 {
        let executor = Arc::clone(&executor);
        let ambient = AmbientContext::new()
            .with_diagnostic("correlation-id", format!("req-{request}"))
            .with_attribute("partition-id", "acme");

        let handle = context::scope(ambient, async move {
            executor.submit(async move {
                let observed = context::current();
                (
                    request,
                    observed
                        .diagnostic("correlation-id")
                        .map(str::to_string),
                )
            })
        })
        .await;
        handles.push(handle);
    }

    for handle in handles {
        let (request, correlation) = handle.join().await.unwrap();
        assert_eq!(correlation, Some(format!("req-{request}")));
    }
}

#[tokio::test]
async fn test_failures_do_not_poison_the_pool() {
    let executor = ContextPropagatingExecutor::new(ExecutorConfig::new(1));
    let completed = Arc::new(AtomicU32::new(0));

    let panicking = executor.submit(async { panic!("first task fails") });
    let counter = Arc::clone(&completed);
    let surviving = executor.submit(async move {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(panicking.join().await.is_err());
    surviving.join().await.unwrap();
    assert_eq!(completed.load(Ordering::SeqCst), 1);

    executor.shutdown().await;
}

#[tokio::test]
async fn test_attribute_bag_travels_with_the_task() {
    let executor = ContextPropagatingExecutor::new(ExecutorConfig::default());

    let ambient = AmbientContext::new().with_attribute("caller", "svc-ingest");
    let handle = context::scope(ambient, async {
        executor.submit(async { context::current().attribute("caller").map(str::to_string) })
    })
    .await;

    assert_eq!(handle.join().await.unwrap(), Some("svc-ingest".to_string()));
}
