//! Performance benchmark comparing the key encodings and the chunk codec

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use sparse_life::domain::{CellKey, ChunkCodec, Coord, PackedKey, StringKey, World, run};

const DENSITY: f64 = 0.3;
const SEED: u64 = 0x5EED_1234_ABCD_EF01;

fn soup<K: CellKey>(size: u32) -> World<K> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let half = size as i64 / 2;
    World::random_soup(&mut rng, (-half, -half), size, size, DENSITY)
        .unwrap_or_else(|e| panic!("soup of side {size} does not fit: {e}"))
}

fn benchmark_steps<K: CellKey>(size: u32, generations: u64) -> (f64, usize) {
    let world: World<K> = soup(size);
    let start = Instant::now();
    let result = run(&world, generations);
    let ms = start.elapsed().as_secs_f64() * 1000.0 / generations as f64;
    (ms, result.population())
}

fn benchmark_chunks(size: u32) -> (f64, f64, usize) {
    let codec = ChunkCodec::default();
    let world: World<PackedKey> = soup(size);

    let start = Instant::now();
    let chunks = codec.to_chunks(&world);
    let encode_ms = start.elapsed().as_secs_f64() * 1000.0;

    let start = Instant::now();
    let restored: World<PackedKey> = codec
        .from_chunks(&chunks)
        .unwrap_or_else(|e| panic!("chunk decode failed: {e}"));
    let decode_ms = start.elapsed().as_secs_f64() * 1000.0;

    assert_eq!(restored, world, "chunk round trip changed the world");
    (encode_ms, decode_ms, chunks.len())
}

fn main() {
    println!("=== Sparse Life Step Benchmark ===\n");

    let sizes = [64, 128, 256, 512, 1024];
    let generations = 20;

    println!(
        "{:>10} {:>12} {:>12} {:>12} {:>12}",
        "Size", "Tuple", "Packed", "String", "Population"
    );
    println!("{:-<64}", "");

    for size in sizes {
        let (tuple_ms, tuple_pop) = benchmark_steps::<Coord>(size, generations);
        let (packed_ms, packed_pop) = benchmark_steps::<PackedKey>(size, generations);
        // String keys allocate per neighbor; skip the largest soup.
        let string_str = if size <= 512 {
            let (ms, pop) = benchmark_steps::<StringKey>(size, generations);
            assert_eq!(pop, tuple_pop, "string encoding diverged at {size}");
            format!("{:>12.2}", ms)
        } else {
            format!("{:>12}", "-")
        };
        assert_eq!(tuple_pop, packed_pop, "packed encoding diverged at {size}");

        println!(
            "{:>10} {:>12.2} {:>12.2} {} {:>12}",
            format!("{}x{}", size, size),
            tuple_ms,
            packed_ms,
            string_str,
            tuple_pop
        );
    }

    println!("\n=== Chunk Codec (64x64 chunks) ===\n");
    println!("{:>10} {:>12} {:>12} {:>10}", "Size", "Encode ms", "Decode ms", "Chunks");
    println!("{:-<48}", "");
    for size in [256, 1024, 4096] {
        let (encode_ms, decode_ms, chunks) = benchmark_chunks(size);
        println!(
            "{:>10} {:>12.2} {:>12.2} {:>10}",
            format!("{}x{}", size, size),
            encode_ms,
            decode_ms,
            chunks
        );
    }
}
