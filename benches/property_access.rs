//! Benchmarks for metadata resolution and property access.
//!
//! - Resolution: cached `BeanClass` lookups
//! - Handles: cached and first-time property resolution on a wrapper
//! - Access: typed and untyped reads/writes, indexed access
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use beans::prelude::*;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

#[derive(Default)]
struct Order {
    customer: String,
    total: f64,
    paid: bool,
    lines: Vec<u32>,
}

impl Bean for Order {
    fn describe(surface: &mut AccessorSurface<Self>) {
        surface
            .default_constructor()
            .reader("get_customer", |o: &Order| o.customer.clone())
            .writer("set_customer", |o: &mut Order, customer: String| o.customer = customer)
            .reader("get_total", |o: &Order| o.total)
            .writer("set_total", |o: &mut Order, total: f64| o.total = total)
            .reader("is_paid", |o: &Order| o.paid)
            .writer("set_paid", |o: &mut Order, paid: bool| o.paid = paid)
            .indexed_reader("get_lines", |o: &Order, i| o.lines.get(i).copied())
            .indexed_writer("set_lines", |o: &mut Order, i, line: u32| {
                o.lines.get_mut(i).map(|slot| *slot = line)
            });
    }
}

fn order() -> Order {
    Order {
        customer: "ACME".to_string(),
        total: 12.5,
        paid: false,
        lines: (0..64).collect(),
    }
}

fn resolution_benchmarks(c: &mut Criterion) {
    setup_profiler();
    BeanClass::<Order>::get().unwrap();

    let mut group = c.benchmark_group("resolution");
    group.bench_function("cached_bean_class", |b| {
        b.iter(|| black_box(BeanClass::<Order>::get().unwrap()));
    });
    group.bench_function("wrapper_new", |b| {
        b.iter(|| black_box(BeanWrapper::new(order()).unwrap()));
    });
    group.finish();
}

fn handle_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("handles");

    let wrapper = BeanWrapper::new(order()).unwrap();
    wrapper.property("total").unwrap();
    group.bench_function("cached_property", |b| {
        b.iter(|| black_box(wrapper.property(black_box("total")).unwrap()));
    });

    for name in ["customer", "lines"] {
        group.bench_with_input(BenchmarkId::new("first_property", name), name, |b, name| {
            b.iter(|| {
                let wrapper = BeanWrapper::new(order()).unwrap();
                black_box(wrapper.property(name).unwrap());
                end_profiling_frame();
            });
        });
    }

    group.finish();
}

fn access_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("access");

    let wrapper = BeanWrapper::new(order()).unwrap();
    let total = wrapper.property("total").unwrap();
    let lines = wrapper.indexed_property("lines").unwrap();

    group.bench_function("typed_get", |b| {
        b.iter(|| black_box(total.get::<f64>().unwrap()));
    });
    group.bench_function("typed_set", |b| {
        b.iter(|| total.set(black_box(99.0f64)).unwrap());
    });
    group.bench_function("untyped_get", |b| {
        b.iter(|| black_box(total.get_value().unwrap()));
    });
    group.bench_function("indexed_get", |b| {
        b.iter(|| black_box(lines.get_at::<u32>(black_box(32)).unwrap()));
    });
    group.bench_function("indexed_set", |b| {
        b.iter(|| lines.set_at(black_box(32), 7u32).unwrap());
    });

    group.finish();
}

criterion_group!(benches, resolution_benchmarks, handle_benchmarks, access_benchmarks);
criterion_main!(benches);
