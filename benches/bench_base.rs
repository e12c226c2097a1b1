use criterion::{BatchSize, Bencher};
use rand::Rng;
use voronoi_fortune::{BoundingBox, Point, VoronoiBuilder};

pub fn create_random_sites(size: usize) -> Vec<Point> {
    let mut rng = rand::thread_rng();
    let bbox = BoundingBox::default();

    let x_range = rand::distributions::Uniform::new(-bbox.width() / 2.0, bbox.width() / 2.0);
    let y_range = rand::distributions::Uniform::new(-bbox.height() / 2.0, bbox.height() / 2.0);
    (0..size)
        .map(|_| Point { x: rng.sample(x_range), y: rng.sample(y_range) })
        .collect()
}

pub fn create_random_builder(size: usize) -> VoronoiBuilder {
    VoronoiBuilder::default()
        .set_bounding_box(BoundingBox::default())
        .set_sites(create_random_sites(size))
}

pub fn create_benchmark_fn(b: &mut Bencher, size: usize) {
    b.iter_batched(
        || create_random_builder(size),
        |b| b.build(),
        BatchSize::SmallInput);
}
