use std::io::{self, Write};

use membrane_topology::{Frame, Snapshot};

use crate::util::text::{compact_ranges, truncate};

const INDENT: &str = "      ";
const TABLE_WIDTH: usize = 56;
const MAX_AGGREGATE_ROWS: usize = 12;

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Column {
    header: &'static str,
    width: usize,
    align: Align,
}

impl Column {
    const fn left(header: &'static str, width: usize) -> Self {
        Self { header, width, align: Align::Left }
    }

    const fn right(header: &'static str, width: usize) -> Self {
        Self { header, width, align: Align::Right }
    }

    fn cell(&self, text: &str) -> String {
        let text = truncate(text, self.width);
        let width = self.width;
        match self.align {
            Align::Left => format!(" {text:<width$} "),
            Align::Right => format!(" {text:>width$} "),
        }
    }
}

/// A titled, box-drawn table written to stderr.
struct Grid {
    title: &'static str,
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Grid {
    fn new(title: &'static str, columns: Vec<Column>) -> Self {
        Self { title, columns, rows: Vec::new() }
    }

    fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn border(&self, left: char, joint: char, right: char) -> String {
        let segments: Vec<String> = self.columns.iter().map(|c| "─".repeat(c.width + 2)).collect();
        format!("{INDENT}{left}{}{right}", segments.join(&joint.to_string()))
    }

    fn line<'a>(&self, cells: impl IntoIterator<Item = &'a str>) -> String {
        let body: Vec<String> = self
            .columns
            .iter()
            .zip(cells)
            .map(|(column, text)| column.cell(text))
            .collect();
        format!("{INDENT}│{}│", body.join("│"))
    }

    fn render(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{INDENT}┌─ {} ─┐", self.title)?;
        writeln!(out, "{}", self.border('┌', '┬', '┐'))?;
        writeln!(out, "{}", self.line(self.columns.iter().map(|c| c.header)))?;
        writeln!(out, "{}", self.border('├', '┼', '┤'))?;
        for row in &self.rows {
            writeln!(out, "{}", self.line(row.iter().map(String::as_str)))?;
        }
        writeln!(out, "{}", self.border('└', '┴', '┘'))
    }

    fn print(&self) {
        let _ = self.render(&mut io::stderr().lock());
    }
}

pub fn print_frame_info(frame: &Frame) {
    let mut grid = Grid::new(
        "Frame",
        vec![Column::left("Property", 16), Column::right("Value", TABLE_WIDTH - 16 - 7)],
    );
    for (key, value) in frame_rows(frame) {
        grid.row(vec![key.to_string(), value]);
    }
    grid.print();
}

fn frame_rows(frame: &Frame) -> Vec<(&'static str, String)> {
    let mut rows = vec![("Particles", frame.particle_count().to_string())];

    let simbox = &frame.simbox;
    if !simbox.is_periodic() {
        rows.push(("Box", "open".to_string()));
        return rows;
    }

    let [a, b, c] = simbox.lengths();
    rows.push(("Box", format!("{a:.2} × {b:.2} × {c:.2}")));
    if !simbox.is_orthorhombic() {
        let [alpha, beta, gamma] = box_angles(&simbox.vectors);
        rows.push(("Angles (α β γ)", format!("{alpha:.1}° {beta:.1}° {gamma:.1}°")));
    }
    let axes: String = "xyz"
        .chars()
        .zip(simbox.periodic)
        .filter_map(|(axis, periodic)| periodic.then_some(axis))
        .collect();
    rows.push(("Periodic", axes));
    rows
}

pub fn print_membranes(snapshot: &Snapshot) {
    aggregate_grid(snapshot).print();

    if snapshot.membranes().is_empty() {
        eprintln!("{INDENT}No membrane found.");
        return;
    }
    membrane_grid(snapshot).print();
}

fn aggregate_grid(snapshot: &Snapshot) -> Grid {
    let bar_width = 20;
    let mut grid = Grid::new(
        "Aggregates",
        vec![
            Column::left("Aggregate", 9),
            Column::right("Size", 7),
            Column::left("Share", bar_width + 8),
            Column::left("Membrane", 8),
        ],
    );

    let total = snapshot.particle_count().max(1) as f64;
    let mut order: Vec<usize> = (0..snapshot.aggregates().len()).collect();
    order.sort_by_key(|&id| std::cmp::Reverse(snapshot.aggregates()[id].size()));

    for &id in order.iter().take(MAX_AGGREGATE_ROWS) {
        let size = snapshot.aggregates()[id].size();
        let share = size as f64 / total;
        let membrane = snapshot
            .membranes()
            .iter()
            .position(|m| m.aggregates().contains(&id))
            .map_or_else(|| "-".to_string(), |m| format!("#{m}"));
        grid.row(vec![
            format!("#{id}"),
            size.to_string(),
            format!("{} {:>5.1}%", share_bar(share, bar_width), share * 100.0),
            membrane,
        ]);
    }
    if order.len() > MAX_AGGREGATE_ROWS {
        let hidden = order.len() - MAX_AGGREGATE_ROWS;
        grid.row(vec!["…".into(), String::new(), format!("{hidden} smaller not shown"), String::new()]);
    }
    grid
}

fn membrane_grid(snapshot: &Snapshot) -> Grid {
    let mut grid = Grid::new(
        "Membranes",
        vec![
            Column::left("#", 2),
            Column::left("Shape", 8),
            Column::right("Upper", 6),
            Column::right("Lower", 6),
            Column::right("Pivots", 6),
            Column::left("From", 7),
        ],
    );

    for (id, membrane) in snapshot.membranes().iter().enumerate() {
        let mut sources = membrane.aggregates().to_vec();
        sources.sort_unstable();
        grid.row(vec![
            id.to_string(),
            membrane.shape().to_string(),
            membrane[0].size().to_string(),
            membrane[1].size().to_string(),
            membrane.pivots().len().to_string(),
            compact_ranges(&sources),
        ]);
    }
    grid
}

fn share_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction * width as f64).round() as usize).min(width);
    format!("{}{}", "▰".repeat(filled), "▱".repeat(width - filled))
}

fn box_angles(vectors: &[[f64; 3]; 3]) -> [f64; 3] {
    let angle = |u: [f64; 3], v: [f64; 3]| {
        let dot: f64 = u.iter().zip(v).map(|(x, y)| x * y).sum();
        let norm = |w: [f64; 3]| w.iter().map(|x| x * x).sum::<f64>().sqrt();
        (dot / (norm(u) * norm(v))).clamp(-1.0, 1.0).acos().to_degrees()
    };
    let [a, b, c] = *vectors;
    [angle(b, c), angle(a, c), angle(a, b)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use membrane_topology::SimBox;

    #[test]
    fn grid_lines_have_equal_width() {
        let mut grid = Grid::new("Test", vec![Column::left("Name", 6), Column::right("N", 4)]);
        grid.row(vec!["a much longer name".into(), "12".into()]);
        let mut buffer = Vec::new();
        grid.render(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let widths: Vec<usize> = text.lines().skip(1).map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{widths:?}");
    }

    #[test]
    fn share_bar_is_clamped() {
        assert_eq!(share_bar(0.5, 4), "▰▰▱▱");
        assert_eq!(share_bar(1.5, 3), "▰▰▰");
    }

    #[test]
    fn frame_rows_skip_angles_for_rectangular_boxes() {
        let frame = Frame::new(vec![[0.0; 3]], SimBox::orthorhombic([10.0, 10.0, 20.0]));
        let rows = frame_rows(&frame);
        assert!(rows.iter().all(|(key, _)| !key.starts_with("Angles")));
        assert_eq!(rows.last().map(|(_, v)| v.as_str()), Some("xyz"));

        let tilted = Frame::new(
            vec![[0.0; 3]],
            SimBox::from_lengths_angles([10.0, 10.0, 10.0], [90.0, 90.0, 60.0]),
        );
        let angles = frame_rows(&tilted)
            .into_iter()
            .find(|(key, _)| key.starts_with("Angles"))
            .map(|(_, v)| v);
        assert_eq!(angles.as_deref(), Some("90.0° 90.0° 60.0°"));
    }
}
