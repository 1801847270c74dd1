//! Property sweep over the cat's bounce oscillator.

use courtyard::scene::Bounce;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[test]
fn bounce_holds_its_bounds_under_random_stepping() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xB0B);
    for _ in 0..200 {
        let speed = rng.random_range(0.01..2.0);
        let start = rng.random_range(5.0..20.0);
        let mut b = Bounce::new(start, 5.0, 20.0, speed);
        for _ in 0..500 {
            let step = rng.random_range(0.1..3.0);
            b.step(step);
            assert!(
                (5.0..=20.0).contains(&b.pos),
                "speed {speed} step escaped bounds: {}",
                b.pos
            );
        }
    }
}

#[test]
fn bounce_keeps_moving() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..50 {
        let speed = rng.random_range(0.05..1.0);
        let mut b = Bounce::new(10.0, 5.0, 20.0, speed);
        let mut distinct = std::collections::BTreeSet::new();
        for _ in 0..200 {
            b.step(1.0);
            distinct.insert(b.pos.to_bits());
        }
        assert!(distinct.len() > 10, "oscillator stalled at speed {speed}");
    }
}
