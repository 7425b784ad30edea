//! Terminal table rendering

use seoscout_core::Table;

/// Widest a column is allowed to grow
const MAX_COLUMN_WIDTH: usize = 42;

/// Print a result table as aligned columns
pub fn print_table(table: &Table) {
    if table.is_empty() {
        println!("(no results)");
        return;
    }

    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            table
                .rows
                .iter()
                .map(|row| row.get(col).map(|c| c.chars().count()).unwrap_or(0))
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let header_line: Vec<String> = table
        .headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| format!("{:<width$}", truncate(header, *width), width = width))
        .collect();
    println!("{}", header_line.join("  "));

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", separator.join("  "));

    for row in &table.rows {
        let line: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(col, width)| {
                let cell = row.get(col).map(String::as_str).unwrap_or("");
                format!("{:<width$}", truncate(cell, *width), width = width)
            })
            .collect();
        println!("{}", line.join("  ").trim_end());
    }
}

/// Print a block of narrative text under a header
pub fn print_narrative(header: &str, text: &str) {
    println!("\n{}", header);
    println!("{}", "=".repeat(header.chars().count()));
    println!("{}", text);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long cell value", 10), "a very ...");
        assert_eq!(truncate("a very long cell value", 10).chars().count(), 10);
    }
}
