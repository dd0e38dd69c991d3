use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{seq::SliceRandom, thread_rng, Rng};
use stay_booking_client::pricing::{compute_total, PricingStrategy};
use stay_booking_client::validation::validate;
use stay_booking_client::{BookingDraft, DateRange};

// The booking page recomputes the total on every keystroke, so this is the
// hot path of the form.
pub fn pricing_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("booking_total");

    let prices = ["Rs. 2,500", "2500", "$ 1,999", "LKR 18,750.00", "on request"];
    let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    for stay_nights in [1u64, 7, 30].iter() {
        let mut rng = thread_rng();
        let ranges = (0..64)
            .map(|i| {
                let check_in = start + chrono::Days::new(i);
                DateRange::from_days(check_in, check_in + chrono::Days::new(*stay_nights))
            })
            .collect::<Vec<_>>();
        let guests = (0..64)
            .map(|_| rng.gen_range(1..=8).to_string())
            .collect::<Vec<_>>();

        for strategy in [PricingStrategy::PerGuestPerNight, PricingStrategy::PerNight] {
            group.bench_with_input(
                BenchmarkId::new(strategy.as_str(), stay_nights),
                stay_nights,
                |b, _| {
                    let mut rng = thread_rng();
                    b.iter(|| {
                        let price = prices.choose(&mut rng).unwrap();
                        let range = ranges.choose(&mut rng).unwrap();
                        let guests = guests.choose(&mut rng).unwrap();
                        black_box(compute_total(price, range, guests, strategy))
                    });
                },
            );
        }
    }

    group.finish();
}

pub fn validation_benchmark(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let complete = BookingDraft {
        full_name: "Nimal Perera".to_string(),
        phone: "0771234567".to_string(),
        guests: "2".to_string(),
        dates: DateRange::from_days(start, start + chrono::Days::new(3)),
    };
    let blank = BookingDraft::new();

    c.bench_function("validate_complete_draft", |b| {
        b.iter(|| black_box(validate(black_box(&complete))))
    });
    c.bench_function("validate_blank_draft", |b| {
        b.iter(|| black_box(validate(black_box(&blank))))
    });
}

criterion_group!(benches, pricing_benchmark, validation_benchmark);
criterion_main!(benches);
