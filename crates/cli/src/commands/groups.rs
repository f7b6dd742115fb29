use std::path::Path;

use anyhow::Result;

use crate::load;

pub fn run(dir: &Path, threshold: f64, json: bool) -> Result<()> {
    let images = load::load_directory(dir)?;
    let desk = load::desk_from(&images)?;
    let matrix = desk.build_matrix()?;
    let groups = desk.arrange(&matrix, threshold);

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    println!(
        "{:<7} {:<8} {:<8} First member",
        "Group", "Members", "Avg sim"
    );
    println!("{}", "-".repeat(72));

    for (index, group) in groups.iter().enumerate() {
        let first = group
            .members
            .first()
            .map(|&id| load::display_path(&images, id))
            .unwrap_or_else(|| "?".to_string());
        println!(
            "{:<7} {:<8} {:<8.3} {}",
            index + 1,
            group.members.len(),
            group.avg_similarity,
            first,
        );
        for &id in group.members.iter().skip(1) {
            println!("{:<25} {}", "", load::display_path(&images, id));
        }
    }

    Ok(())
}
