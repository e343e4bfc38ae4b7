use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use statecraft::effect::Effect;
use statecraft::event::{DynEvent, Event, EventError};
use statecraft::response::Response;
use statecraft::store::Store;

const BATCH_SIZES: &[usize] = &[64, 256, 1024];

struct Bump;

impl Event<i64, ()> for Bump {
    fn handle(&self, state: i64, _effects: &()) -> Result<Response<i64, ()>, EventError> {
        Ok(Response::state_update(state + 1))
    }
}

struct DeferredBump;

impl Event<i64, ()> for DeferredBump {
    fn handle(&self, _state: i64, _effects: &()) -> Result<Response<i64, ()>, EventError> {
        Ok(Response::side_effect(Effect::deferred(|| async {
            Ok(vec![Box::new(Bump) as DynEvent<i64, ()>])
        })))
    }
}

fn pure_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("pure_dispatch");

    for &batch in BATCH_SIZES {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &size| {
            b.iter(|| {
                let store = Store::new(0_i64, ());
                for _ in 0..size {
                    store.dispatch(Bump).expect("pure dispatch");
                }
                assert_eq!(store.read(), size as i64);
            });
        });
    }

    group.finish();
}

fn deferred_dispatch(c: &mut Criterion) {
    let runtime = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("deferred_dispatch");

    for &batch in BATCH_SIZES {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &size| {
            b.to_async(&runtime).iter(|| async move {
                let store = Store::new(0_i64, ());
                let mut pending = Vec::with_capacity(size);
                for _ in 0..size {
                    pending.push(store.dispatch(DeferredBump).expect("dispatch"));
                }
                for outcome in pending {
                    outcome.settle().await.expect("effect resolves");
                }
                assert_eq!(store.read(), size as i64);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, pure_dispatch, deferred_dispatch);
criterion_main!(benches);
