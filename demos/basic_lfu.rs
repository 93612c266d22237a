use lfukit::policy::lfu::LfuCache;
use lfukit::traits::{CoreCache, LfuCacheTrait};

fn main() {
    let mut cache: LfuCache<&str, String> = LfuCache::new(2);

    cache.put("a", "alpha".to_string());
    cache.put("b", "beta".to_string());

    cache.get(&"a");
    cache.put("c", "gamma".to_string());

    println!("contains a? {}", cache.contains(&"a"));
    println!("contains b? {}", cache.contains(&"b"));
    println!("frequency of a: {:?}", cache.frequency(&"a"));
    println!("next victim: {:?}", cache.peek_lfu().map(|(key, _)| *key));
}

// Expected output:
// contains a? true
// contains b? false
// frequency of a: Some(2)
// next victim: Some("c")
//
// Explanation: capacity=2; "a" is read before inserting "c", so "b" is the
// only key left at frequency 1 and is evicted.
