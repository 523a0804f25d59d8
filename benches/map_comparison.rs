use core::hash::BuildHasher;
use core::hash::Hash;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap as HashbrownMap;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::distr;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use shift_map::HashMap as ShiftMap;
use shift_map::strategy::DefaultStrategy;
use siphasher::sip::SipHasher;

#[derive(Clone, Copy, Default)]
struct SipBuilder;

impl BuildHasher for SipBuilder {
    type Hasher = SipHasher;

    fn build_hasher(&self) -> SipHasher {
        SipHasher::new()
    }
}

type Shift<K> = ShiftMap<K, u64, DefaultStrategy<SipBuilder>>;
type Hashbrown<K> = HashbrownMap<K, u64, SipBuilder>;

trait BenchKey: Clone + Hash + Eq {
    fn new(key: u64) -> Self;
}

impl BenchKey for u64 {
    fn new(key: u64) -> Self {
        black_box(key)
    }
}

impl BenchKey for String {
    fn new(key: u64) -> Self {
        black_box(format!("key_{key:016X}"))
    }
}

fn shift_map<K: BenchKey>(capacity: usize) -> Shift<K> {
    ShiftMap::with_capacity_and_strategy(capacity, DefaultStrategy::with_hasher(SipBuilder))
}

fn hashbrown_map<K: BenchKey>(capacity: usize) -> Hashbrown<K> {
    HashbrownMap::with_capacity_and_hasher(capacity, SipBuilder)
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Remove,
    Find,
}

fn bench_insert_random<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("insert_random_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let mut rng = OsRng;

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = (0..size)
            .map(|_| K::new(rng.try_next_u64().unwrap()))
            .collect::<Vec<K>>();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function("shift_map", |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut map = shift_map::<K>(0);
                    for (i, key) in keys.into_iter().enumerate() {
                        black_box(map.put(key, i as u64));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function("hashbrown", |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut map = hashbrown_map::<K>(0);
                    for (i, key) in keys.into_iter().enumerate() {
                        black_box(map.insert(key, i as u64));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_zipf<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("find_zipf_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    // Half of the key space is never inserted, so popular misses are measured too.
    const KEY_SPACE_MULTIPLIER: usize = 2;

    for &size in SIZES[..=MAX_SIZE].iter() {
        let mut rng = SmallRng::from_os_rng();
        let distr = Zipf::new((size * KEY_SPACE_MULTIPLIER) as f32 - 1.0, 1.0).unwrap();
        let lookups = (0..size)
            .map(|_| K::new(rng.sample(distr) as u64))
            .collect::<Vec<K>>();

        let mut shift = shift_map::<K>(size);
        let mut hashbrown = hashbrown_map::<K>(size);
        for i in 0..size as u64 {
            shift.put(K::new(i * KEY_SPACE_MULTIPLIER as u64), i);
            hashbrown.insert(K::new(i * KEY_SPACE_MULTIPLIER as u64), i);
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function("shift_map", |b| {
            b.iter(|| {
                for key in &lookups {
                    black_box(shift.find(key));
                }
            })
        });

        group.bench_function("hashbrown", |b| {
            b.iter(|| {
                for key in &lookups {
                    black_box(hashbrown.get(key));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = (0..size as u64).map(K::new).collect::<Vec<K>>();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function("shift_map", |b| {
            b.iter_batched(
                || {
                    let mut map = shift_map::<K>(0);
                    map.put_all(keys.iter().cloned().zip(0..));
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    (map, keys)
                },
                |(mut map, keys)| {
                    for key in &keys {
                        black_box(map.remove_entry(key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function("hashbrown", |b| {
            b.iter_batched(
                || {
                    let mut map = hashbrown_map::<K>(0);
                    map.extend(keys.iter().cloned().zip(0..));
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    (map, keys)
                },
                |(mut map, keys)| {
                    for key in &keys {
                        black_box(map.remove_entry(key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_iteration<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("iteration_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let mut shift = shift_map::<K>(0);
        let mut hashbrown = hashbrown_map::<K>(0);
        for i in 0..size as u64 {
            shift.put(K::new(i), i);
            hashbrown.insert(K::new(i), i);
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function("shift_map", |b| {
            b.iter(|| black_box(shift.values().fold(0u64, |acc, v| acc.wrapping_add(v))))
        });

        group.bench_function("hashbrown", |b| {
            b.iter(|| black_box(hashbrown.values().fold(0u64, |acc, v| acc.wrapping_add(*v))))
        });
    }

    group.finish();
}

fn bench_mixed_probabilistic_zipf<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "mixed_probabilistic_zipf_{}",
        core::any::type_name::<K>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    const KEY_SPACE_MULTIPLIER: usize = 2;

    for &size in SIZES[..=MAX_SIZE].iter() {
        let mut rng = SmallRng::from_os_rng();
        let insert_distr = Zipf::new(size as f32 - 1.0, 1.0).unwrap();
        let find_remove_distr = Zipf::new((size * KEY_SPACE_MULTIPLIER) as f32 - 1.0, 1.0).unwrap();

        let operations = (0..size * 3)
            .map(|_| {
                let op_choice: f64 = rng.sample(distr::Uniform::new(0.0, 1.0).unwrap());
                if op_choice < 0.5 {
                    (Operation::Find, K::new(rng.sample(find_remove_distr) as u64))
                } else if op_choice < 0.75 {
                    (Operation::Insert, K::new(rng.sample(insert_distr) as u64))
                } else {
                    (Operation::Remove, K::new(rng.sample(find_remove_distr) as u64))
                }
            })
            .collect::<Vec<(Operation, K)>>();

        group.throughput(Throughput::Elements(operations.len() as u64));
        group.bench_function("shift_map", |b| {
            b.iter_batched(
                || operations.clone(),
                |operations| {
                    let mut map = shift_map::<K>(0);
                    for (operation, key) in operations {
                        match operation {
                            Operation::Insert => black_box(map.add_to(key, 1)),
                            Operation::Remove => black_box(map.remove(&key)),
                            Operation::Find => black_box(map.get(&key)),
                        };
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function("hashbrown", |b| {
            b.iter_batched(
                || operations.clone(),
                |operations| {
                    let mut map = hashbrown_map::<K>(0);
                    for (operation, key) in operations {
                        match operation {
                            Operation::Insert => {
                                *black_box(map.entry(key).or_insert(0)) += 1;
                            }
                            Operation::Remove => {
                                black_box(map.remove(&key));
                            }
                            Operation::Find => {
                                black_box(map.get(&key));
                            }
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_churn<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("churn_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        // Every key appears twice: the first occurrence inserts, the second removes.
        let keys = (0..size as u64)
            .flat_map(|i| [K::new(i), K::new(i)])
            .collect::<Vec<K>>();

        group.throughput(Throughput::Elements(keys.len() as u64));
        group.bench_function("shift_map", |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut map = shift_map::<K>(0);
                    for key in keys {
                        if map.remove_entry(&key).is_none() {
                            map.put(key, 1);
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function("hashbrown", |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut map = hashbrown_map::<K>(0);
                    for key in keys {
                        if map.remove_entry(&key).is_none() {
                            map.insert(key, 1);
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_mixed_probabilistic_zipf::<u64, 4>,
    bench_mixed_probabilistic_zipf::<String, 3>,
    bench_churn::<u64, 4>,
    bench_churn::<String, 3>,
    bench_insert_random::<u64, 4>,
    bench_insert_random::<String, 3>,
    bench_find_zipf::<u64, 4>,
    bench_find_zipf::<String, 3>,
    bench_remove::<u64, 4>,
    bench_remove::<String, 3>,
    bench_iteration::<u64, 4>,
    bench_iteration::<String, 3>,
);

criterion_main!(benches);
