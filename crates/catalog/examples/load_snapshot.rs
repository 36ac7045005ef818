use catalog::CatalogIndex;
use std::path::Path;
use std::time::Instant;

fn main() {
    let path = Path::new("data/snapshot.dat");

    println!("Loading catalog snapshot...\n");

    let start = Instant::now();
    let index = CatalogIndex::load_from_file(path).expect("Failed to load snapshot");
    let elapsed = start.elapsed();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Movies: {}", index.len());
    println!("Genres:");
    for genre in index.genre_universe() {
        println!("  {:<12} {}", genre.label(), index.get_movies_by_genre(genre).len());
    }
}
