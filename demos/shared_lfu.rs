use std::thread;

use lfukit::builder::LfuCacheBuilder;

fn main() {
    let cache = match LfuCacheBuilder::new()
        .capacity(8)
        .try_build_concurrent::<u32, String>()
    {
        Ok(cache) => cache,
        Err(err) => {
            eprintln!("invalid cache config: {err}");
            return;
        },
    };

    cache.put(0, "pinned".to_string());
    cache.get(&0);

    let handles: Vec<_> = (0..4u32)
        .map(|worker| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..4u32 {
                    let key = worker * 4 + i;
                    cache.put(key, format!("worker {worker} item {i}"));
                    cache.get(&0);
                }
            })
        })
        .collect();
    for handle in handles {
        if handle.join().is_err() {
            eprintln!("worker panicked");
        }
    }

    println!("entries: {}", cache.len());
    println!("key 0 resident? {}", cache.contains(&0));
}

// Expected output:
// entries: 8
// key 0 resident? true
