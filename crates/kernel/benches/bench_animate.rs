use std::cell::RefCell;
use std::hint::black_box;
use std::rc::Rc;
use std::time::Instant;

use cubefield_kernel::{AnimationRegistry, EntityGrid, Palette};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn bench_generate(size: u32, iterations: usize) {
    let palette = Palette::default();
    let mut rng = SmallRng::seed_from_u64(7);

    let start = Instant::now();
    for _ in 0..iterations {
        let grid = EntityGrid::generate(black_box(size), &palette, &mut rng);
        black_box(grid.map(|g| g.len()).unwrap_or_default());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    let count = size * size * size;
    println!(
        "  generate ({count} entities, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_update(size: u32, iterations: usize) {
    let mut rng = SmallRng::seed_from_u64(7);
    let mut grid = match EntityGrid::generate(size, &Palette::default(), &mut rng) {
        Ok(grid) => grid,
        Err(e) => {
            println!("  skipped update bench: {e}");
            return;
        }
    };

    let start = Instant::now();
    for frame in 0..iterations {
        grid.update(black_box(frame as f64 / 60.0));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  update ({} entities, {iterations} frames): {per_iter:?}/frame, total {elapsed:?}",
        grid.len()
    );
}

fn bench_registry(grids: usize, iterations: usize) {
    let owned: Vec<Rc<RefCell<EntityGrid>>> = (0..grids)
        .map(|i| Rc::new(RefCell::new(EntityGrid::with_seed(i as u64))))
        .collect();
    let mut registry = AnimationRegistry::new();
    for grid in &owned {
        registry.add(grid);
    }

    let start = Instant::now();
    for frame in 0..iterations {
        black_box(registry.animate(black_box(frame as f64 / 60.0)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  registry ({grids} grids, {iterations} frames): {per_iter:?}/frame, total {elapsed:?}"
    );
}

fn main() {
    println!("=== bench_animate ===");
    bench_generate(10, 200);
    bench_generate(20, 20);
    bench_update(10, 1_000);
    bench_update(20, 200);
    bench_registry(4, 500);
}
