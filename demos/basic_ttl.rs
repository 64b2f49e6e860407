use std::time::Duration;

use sectorkit::clock::ManualClock;
use sectorkit::policy::sector_ttl::SectorTtlCache;

fn main() {
    let clock = ManualClock::new();
    let mut cache = SectorTtlCache::with_clock(Duration::from_millis(100), 1_000, 4, clock.clone());

    cache.insert("session", 42);
    println!("rotates every {:?}", cache.sector_expiration());

    clock.advance(Duration::from_millis(75));
    println!("after 75ms: {:?}", cache.get(&"session"));

    clock.advance(Duration::from_millis(75));
    println!("after 150ms: {:?}", cache.get(&"session"));
    println!("timer pending? {}", cache.next_rotation_at().is_some());
}

// Expected output:
// rotates every 33.333333ms
// after 75ms: Some(42)
// after 150ms: None
// timer pending? false
//
// Explanation: 100ms spread over the 3 cold sectors gives one rotation every
// ~33ms. After 150ms four rotations have run, the entry fell off the ring and
// the empty cache cancelled its timer.
