use sectorkit::policy::sector_lru::SectorLruCache;

fn main() {
    let mut cache: SectorLruCache<u32, String> = SectorLruCache::new(2, 2);

    cache.insert(1, "alpha".to_string());
    cache.insert(2, "beta".to_string());
    cache.insert(3, "gamma".to_string());

    if let Some(value) = cache.get(&1) {
        println!("hit 1: {}", value);
    }

    cache.insert(4, "delta".to_string());

    println!("contains 2? {}", cache.contains(&2));
    println!("resident: {}", cache.len());
}

// Expected output:
// hit 1: alpha
// contains 2? false
// resident: 3
//
// Explanation: sector_max_item=2, sector_count=2. Inserting key 3 rotates the
// ring, so keys 1 and 2 become cold. get(&1) moves key 1 back into the hot
// sector next to key 3. Inserting key 4 rotates once more and drops the
// generation still holding key 2.
