//! Plain-text tables for `--format table`.

/// Layout options taken from the terminal.
#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    /// Narrow text columns until the table fits.
    pub max_width: Option<usize>,
    /// Colour sync outcomes, statuses and categories.
    pub color: bool,
}

const GAP: &str = "  ";
const MIN_WIDTH: usize = 4;

/// Render `rows` under `headers`.
///
/// A column whose cells all parse as numbers (coordinates, zoom, counts) is
/// right-aligned and never truncated. When the terminal is too narrow the
/// widest text column (usually the location name) gives way first.
#[must_use]
pub fn render(headers: &[String], rows: &[Vec<String>], options: TableOptions) -> String {
    let numeric: Vec<bool> = (0..headers.len())
        .map(|i| {
            !rows.is_empty()
                && rows
                    .iter()
                    .all(|row| row.get(i).is_some_and(|cell| cell.parse::<f64>().is_ok()))
        })
        .collect();
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .fold(header.chars().count(), usize::max)
        })
        .collect();
    if let Some(limit) = options.max_width {
        shrink_to(&mut widths, &numeric, limit);
    }

    let total = widths.iter().sum::<usize>() + GAP.len() * widths.len().saturating_sub(1);
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(line(headers.iter().map(String::as_str), &widths, &numeric, false));
    lines.push("-".repeat(total));
    for row in rows {
        let cells = (0..widths.len()).map(|i| row.get(i).map_or("-", String::as_str));
        lines.push(line(cells, &widths, &numeric, options.color));
    }
    lines.join("\n")
}

fn line<'a>(
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
    numeric: &[bool],
    color: bool,
) -> String {
    let joined = cells
        .zip(widths.iter().zip(numeric))
        .map(|(cell, (&width, &right))| {
            let text = fit(cell, width);
            // Padding is measured before colour codes are added.
            let pad = " ".repeat(width.saturating_sub(text.chars().count()));
            let shown = if color { paint(&text) } else { text };
            if right {
                format!("{pad}{shown}")
            } else {
                format!("{shown}{pad}")
            }
        })
        .collect::<Vec<_>>()
        .join(GAP);
    joined.trim_end().to_string()
}

fn shrink_to(widths: &mut [usize], numeric: &[bool], limit: usize) {
    let gaps = GAP.len() * widths.len().saturating_sub(1);
    while widths.iter().sum::<usize>() + gaps > limit {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|&(i, &width)| !numeric[i] && width > MIN_WIDTH)
            .max_by_key(|&(_, &width)| width)
            .map(|(i, _)| i);
        match widest {
            Some(i) => widths[i] -= 1,
            None => break,
        }
    }
}

fn fit(cell: &str, width: usize) -> String {
    if cell.chars().count() <= width {
        return cell.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = cell.chars().take(width - 1).collect();
    out.push('…');
    out
}

/// Terminal colour for a cell. Categories use the nearest terminal colour to
/// their marker colour.
fn paint(value: &str) -> String {
    let code = match value {
        "applied" | "idle" | "true" => "32",
        "superseded" | "syncing" | "stale" => "33",
        "false" | "null" => "2",
        "food" => "31",
        "lecture-hall" => "34",
        "hostel" => "92",
        "admin" => "93",
        "recreation" => "36",
        _ => return value.to_string(),
    };
    format!("\u{1b}[{code}m{value}\u{1b}[0m")
}
