use std::path::Path;

use anyhow::Result;

use crate::load;

pub fn run(dir: &Path, threshold: f64, json: bool) -> Result<()> {
    let images = load::load_directory(dir)?;
    let desk = load::desk_from(&images)?;
    let matrix = desk.build_matrix()?;
    let duplicates = desk.duplicates(&matrix, threshold);

    if json {
        println!("{}", serde_json::to_string_pretty(&duplicates)?);
        return Ok(());
    }

    if duplicates.is_empty() {
        println!("No duplicates found at threshold {threshold:.2}.");
        return Ok(());
    }

    for (index, group) in duplicates.iter().enumerate() {
        println!(
            "Set #{} ({} copies, avg similarity {:.3})",
            index + 1,
            group.members.len(),
            group.avg_similarity,
        );
        for &id in &group.members {
            println!("  {}", load::display_path(&images, id));
        }
    }

    Ok(())
}
