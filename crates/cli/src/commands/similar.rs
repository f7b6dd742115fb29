use std::path::Path;

use anyhow::Result;

use crate::load;

pub fn run(dir: &Path, name: &str, threshold: f64) -> Result<()> {
    let images = load::load_directory(dir)?;
    let desk = load::desk_from(&images)?;
    let matrix = desk.build_matrix()?;

    let id = load::find_by_name(&images, name)?;
    let similar = desk.similar_to(id, &matrix, threshold);

    if similar.is_empty() {
        println!("Nothing similar to {name} at threshold {threshold:.2}.");
        return Ok(());
    }

    println!("{:<8} Image", "Score");
    println!("{}", "-".repeat(60));
    for (other, score) in similar {
        println!("{:<8.3} {}", score, load::display_path(&images, other));
    }

    Ok(())
}
