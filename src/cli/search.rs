use super::ui;
use crate::core::quote::SymbolSearchProvider;
use anyhow::Result;

/// Free-text ticker search against the provider.
pub async fn run(provider: &dyn SymbolSearchProvider, query: &str) -> Result<()> {
    let matches = provider.search(query).await?;
    if matches.is_empty() {
        println!(
            "{}",
            ui::style_text(&format!("No matches for '{query}'."), ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Name"),
        ui::header_cell("Exchange"),
        ui::header_cell("Type"),
    ]);
    for m in &matches {
        table.add_row(vec![
            comfy_table::Cell::new(&m.symbol),
            comfy_table::Cell::new(&m.name),
            comfy_table::Cell::new(&m.exchange),
            comfy_table::Cell::new(&m.kind),
        ]);
    }

    println!("{table}");
    Ok(())
}
