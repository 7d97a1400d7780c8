use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flight_search_proxy::normalizer::{sort_by_price, OfferNormalizer};
use rand::{thread_rng, Rng};
use serde_json::{json, Value};

// Supplier page with a share of malformed records mixed in
fn supplier_page(size: usize) -> Vec<Value> {
    let mut rng = thread_rng();

    (0..size)
        .map(|i| {
            if rng.gen_bool(0.1) {
                return json!({"id": i.to_string(), "itineraries": []});
            }

            let stops = rng.gen_range(1..=3);
            let segments: Vec<Value> = (0..stops)
                .map(|s| {
                    json!({
                        "departure": {"iataCode": "LHR", "at": format!("2025-06-01T{:02}:00:00", 6 + s * 3)},
                        "arrival": {"iataCode": "JFK", "at": format!("2025-06-01T{:02}:30:00", 8 + s * 3)},
                        "carrierCode": "BA",
                        "number": format!("{}", 100 + s)
                    })
                })
                .collect();

            json!({
                "id": i.to_string(),
                "validatingAirlineCodes": ["BA"],
                "itineraries": [{"duration": "PT7H55M", "segments": segments}],
                "price": {"currency": "USD", "grandTotal": format!("{:.2}", rng.gen_range(50.0..2000.0))}
            })
        })
        .collect()
}

pub fn normalize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("offer_normalization");
    let normalizer = OfferNormalizer::new();

    // 25 is the supplier page cap; larger sizes show scaling
    for size in [25usize, 250, 2500].iter() {
        let page = supplier_page(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &page, |b, page| {
            b.iter(|| {
                let batch = normalizer.normalize_batch(page.clone());
                let mut offers = batch.offers;
                sort_by_price(&mut offers);
                black_box(offers)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, normalize_benchmark);
criterion_main!(benches);
