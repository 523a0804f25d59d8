use clap::Parser;
use shift_map::HashMap;
use shift_map::sizing::DEFAULT_LOAD_FACTOR;
use shift_map::strategy::DefaultStrategy;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'l', long = "load_factor", default_value_t = DEFAULT_LOAD_FACTOR)]
    load_factor: f32,

    /// Fraction of the entries to remove after filling the map.
    #[arg(short = 'r', long = "remove_fraction", default_value_t = 0.5)]
    remove_fraction: f64,
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashMap with target capacity {} at load factor {}",
        args.target_capacity, args.load_factor
    );

    let mut map: HashMap<u64, u64> = match HashMap::try_with_capacity_and_load_factor(
        args.target_capacity,
        args.load_factor,
        DefaultStrategy::new(),
    ) {
        Ok(map) => map,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    println!(
        "Table size: {}, capacity: {}",
        map.table_size(),
        map.capacity()
    );
    println!("Filling map with u64 keys...");

    let num_values = map.capacity() as u64;
    for i in 0..num_values {
        map.put(i, i);
    }

    println!("Inserted {} values into map", map.len());
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.table_size() as f64) * 100.0
    );

    map.probe_histogram().print();
    map.debug_stats().print();

    let to_remove = (num_values as f64 * args.remove_fraction.clamp(0.0, 1.0)) as u64;
    println!("Removing {to_remove} values...");
    for i in 0..to_remove {
        map.remove(&i);
    }
    println!(
        "{} values left, table size {} (never below {})",
        map.len(),
        map.table_size(),
        map.debug_stats().min_capacity
    );

    map.probe_histogram().print();
    map.debug_stats().print();

    if map.trim() {
        println!("Trimmed table to {} slots", map.table_size());
        map.debug_stats().print();
    }
}
