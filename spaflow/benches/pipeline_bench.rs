//! Benchmarks for pipeline execution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spaflow::cache::PageCache;
use spaflow::config::SpaConfig;
use spaflow::events::NoOpEventSink;
use spaflow::pipeline::SpaPipeline;
use spaflow::testing::TestSite;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn pipeline_benchmark(c: &mut Criterion) {
    let Ok(runtime) = Runtime::new() else {
        return;
    };
    let site = TestSite::new();
    let Ok(pipeline) = SpaPipeline::standard(&site.services(), &SpaConfig::default(), Arc::new(NoOpEventSink)) else {
        return;
    };

    runtime.block_on(async {
        let _ = pipeline.run(&mut TestSite::request("/about/")).await;
    });

    c.bench_function("cache_hit", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let mut request = TestSite::request("/about/");
                black_box(pipeline.run(&mut request).await.ok())
            })
        });
    });

    c.bench_function("cache_miss", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let _ = site.cache().clear().await;
                let mut request = TestSite::request("/contact/");
                black_box(pipeline.run(&mut request).await.ok())
            })
        });
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
