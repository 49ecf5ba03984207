//! Table detection
//!
//! Tables are found from their drawn borders, the way pdfplumber's
//! default "lines" strategy does it:
//!
//! 1. Axis-aligned path segments become horizontal or vertical edges.
//! 2. Edges closer than the snap tolerance are moved onto a common line,
//!    and collinear pieces with small gaps are joined.
//! 3. Every crossing of a horizontal and a vertical edge is a corner.
//! 4. A cell is the smallest rectangle whose four corners exist and whose
//!    sides are drawn.
//! 5. Cells sharing corners form a table; a lone cell is just a box.
//!
//! Text is placed in the cell containing the centre of each glyph. Text
//! without drawn borders never forms a table, so columns of prose and
//! label/value forms are left alone.

use std::collections::HashMap;

use crate::pdf::{BBox, Segment, TextLine};

const SNAP_TOLERANCE: f32 = 3.0;
const JOIN_TOLERANCE: f32 = 3.0;
const EDGE_MIN_LENGTH: f32 = 3.0;
const INTERSECTION_TOLERANCE: f32 = 3.0;

/// Largest drift across a segment that still counts as axis-aligned
const AXIS_TOLERANCE: f32 = 0.5;

/// A detected table, rows top to bottom, all rows the same width
///
/// Positions covered by a merged cell hold an empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub bbox: BBox,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Whether a line's centre falls inside the table
    pub fn contains(&self, line: &TextLine) -> bool {
        let (cx, cy) = (line.bbox.center_x(), line.bbox.center_y());
        cx >= self.bbox.x0 && cx < self.bbox.x1 && cy >= self.bbox.y0 && cy < self.bbox.y1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Horizontal,
    Vertical,
}

/// A ruling line: `position` is y for horizontal edges and x for vertical
/// ones, `start..end` the extent along the other axis
#[derive(Debug, Clone, Copy, PartialEq)]
struct Edge {
    orientation: Orientation,
    position: f32,
    start: f32,
    end: f32,
}

impl Edge {
    fn from_segment(s: &Segment) -> Option<Self> {
        let dx = (s.x1 - s.x0).abs();
        let dy = (s.y1 - s.y0).abs();

        if dy <= AXIS_TOLERANCE && dx > dy {
            Some(Edge {
                orientation: Orientation::Horizontal,
                position: (s.y0 + s.y1) / 2.0,
                start: s.x0.min(s.x1),
                end: s.x0.max(s.x1),
            })
        } else if dx <= AXIS_TOLERANCE && dy > dx {
            Some(Edge {
                orientation: Orientation::Vertical,
                position: (s.x0 + s.x1) / 2.0,
                start: s.y0.min(s.y1),
                end: s.y0.max(s.y1),
            })
        } else {
            None
        }
    }

    fn length(&self) -> f32 {
        self.end - self.start
    }
}

#[derive(Debug)]
struct Corner {
    x: f32,
    y: f32,
    verticals: Vec<usize>,
    horizontals: Vec<usize>,
}

type CornerKey = (u32, u32);

fn key(x: f32, y: f32) -> CornerKey {
    (x.to_bits(), y.to_bits())
}

/// Detect the tables ruled by `segments` and fill them with `lines`
pub fn detect_tables<'a, I>(lines: I, segments: &[Segment]) -> Vec<Table>
where
    I: IntoIterator<Item = &'a TextLine>,
{
    let (horizontals, verticals) = edges(segments);
    if horizontals.is_empty() || verticals.is_empty() {
        return Vec::new();
    }

    let corners = intersections(&verticals, &horizontals);
    let cells = find_cells(&corners);
    let groups = group_cells(cells);
    if groups.is_empty() {
        return Vec::new();
    }

    let mut lines: Vec<&TextLine> = lines.into_iter().collect();
    lines.sort_by(|a, b| a.bbox.center_y().total_cmp(&b.bbox.center_y()));

    groups
        .into_iter()
        .map(|cells| build_table(&cells, &lines))
        .collect()
}

/// Snapped, joined and length-filtered edges, split by orientation
fn edges(segments: &[Segment]) -> (Vec<Edge>, Vec<Edge>) {
    let (mut horizontals, mut verticals): (Vec<Edge>, Vec<Edge>) = segments
        .iter()
        .filter_map(Edge::from_segment)
        .partition(|e| e.orientation == Orientation::Horizontal);

    snap(&mut horizontals);
    snap(&mut verticals);

    let keep = |edges: Vec<Edge>| -> Vec<Edge> {
        join(edges)
            .into_iter()
            .filter(|e| e.length() >= EDGE_MIN_LENGTH)
            .collect()
    };

    (keep(horizontals), keep(verticals))
}

/// Move edges of one orientation within the snap tolerance onto their mean
fn snap(edges: &mut [Edge]) {
    let mut order: Vec<usize> = (0..edges.len()).collect();
    order.sort_by(|&a, &b| edges[a].position.total_cmp(&edges[b].position));

    let mut cluster: Vec<usize> = Vec::new();
    for index in order {
        if let Some(&last) = cluster.last() {
            if edges[index].position - edges[last].position > SNAP_TOLERANCE {
                settle(edges, &cluster);
                cluster.clear();
            }
        }
        cluster.push(index);
    }
    settle(edges, &cluster);
}

fn settle(edges: &mut [Edge], cluster: &[usize]) {
    if cluster.is_empty() {
        return;
    }
    let mean = cluster.iter().map(|&i| edges[i].position).sum::<f32>() / cluster.len() as f32;
    for &i in cluster {
        edges[i].position = mean;
    }
}

/// Merge collinear edges that overlap or nearly touch
fn join(mut edges: Vec<Edge>) -> Vec<Edge> {
    edges.sort_by(|a, b| {
        a.position
            .total_cmp(&b.position)
            .then(a.start.total_cmp(&b.start))
    });

    let mut joined: Vec<Edge> = Vec::with_capacity(edges.len());
    for edge in edges {
        match joined.last_mut() {
            Some(last) if last.position == edge.position && edge.start <= last.end + JOIN_TOLERANCE => {
                last.end = last.end.max(edge.end);
            }
            _ => joined.push(edge),
        }
    }
    joined
}

fn intersections(verticals: &[Edge], horizontals: &[Edge]) -> Vec<Corner> {
    let mut corners: Vec<Corner> = Vec::new();
    let mut index: HashMap<CornerKey, usize> = HashMap::new();

    for (vi, v) in verticals.iter().enumerate() {
        for (hi, h) in horizontals.iter().enumerate() {
            let crosses = v.start <= h.position + INTERSECTION_TOLERANCE
                && v.end >= h.position - INTERSECTION_TOLERANCE
                && v.position >= h.start - INTERSECTION_TOLERANCE
                && v.position <= h.end + INTERSECTION_TOLERANCE;
            if !crosses {
                continue;
            }

            let at = *index.entry(key(v.position, h.position)).or_insert_with(|| {
                corners.push(Corner {
                    x: v.position,
                    y: h.position,
                    verticals: Vec::new(),
                    horizontals: Vec::new(),
                });
                corners.len() - 1
            });

            let corner = &mut corners[at];
            if !corner.verticals.contains(&vi) {
                corner.verticals.push(vi);
            }
            if !corner.horizontals.contains(&hi) {
                corner.horizontals.push(hi);
            }
        }
    }

    corners
}

fn shares(a: &[usize], b: &[usize]) -> bool {
    a.iter().any(|edge| b.contains(edge))
}

/// Smallest drawn rectangle hanging off each corner
fn find_cells(corners: &[Corner]) -> Vec<BBox> {
    let lookup: HashMap<CornerKey, usize> = corners
        .iter()
        .enumerate()
        .map(|(i, c)| (key(c.x, c.y), i))
        .collect();

    let mut order: Vec<usize> = (0..corners.len()).collect();
    order.sort_by(|&a, &b| {
        corners[a]
            .x
            .total_cmp(&corners[b].x)
            .then(corners[a].y.total_cmp(&corners[b].y))
    });

    let mut cells = Vec::new();

    for (i, &pi) in order.iter().enumerate() {
        let p = &corners[pi];
        let rest = &order[i + 1..];

        let below: Vec<&Corner> = rest.iter().map(|&j| &corners[j]).filter(|c| c.x == p.x).collect();
        let mut right: Vec<&Corner> = rest.iter().map(|&j| &corners[j]).filter(|c| c.y == p.y).collect();
        right.sort_by(|a, b| a.x.total_cmp(&b.x));

        'search: for b in &below {
            if !shares(&p.verticals, &b.verticals) {
                continue;
            }
            for r in &right {
                if !shares(&p.horizontals, &r.horizontals) {
                    continue;
                }
                let Some(&k) = lookup.get(&key(r.x, b.y)) else {
                    continue;
                };
                let opposite = &corners[k];
                if shares(&opposite.verticals, &r.verticals) && shares(&opposite.horizontals, &b.horizontals) {
                    cells.push(BBox::new(p.x, p.y, r.x, b.y));
                    break 'search;
                }
            }
        }
    }

    cells
}

fn cell_corners(cell: &BBox) -> [CornerKey; 4] {
    [
        key(cell.x0, cell.y0),
        key(cell.x1, cell.y0),
        key(cell.x0, cell.y1),
        key(cell.x1, cell.y1),
    ]
}

/// Connected groups of cells, top to bottom, dropping single boxes
fn group_cells(mut remaining: Vec<BBox>) -> Vec<Vec<BBox>> {
    let mut groups = Vec::new();

    while !remaining.is_empty() {
        let seed = remaining.remove(0);
        let mut corners: Vec<CornerKey> = cell_corners(&seed).to_vec();
        let mut members = vec![seed];

        loop {
            let before = members.len();
            let mut i = 0;
            while i < remaining.len() {
                let candidate = cell_corners(&remaining[i]);
                if candidate.iter().any(|c| corners.contains(c)) {
                    corners.extend_from_slice(&candidate);
                    members.push(remaining.remove(i));
                } else {
                    i += 1;
                }
            }
            if members.len() == before {
                break;
            }
        }

        if members.len() > 1 {
            groups.push(members);
        }
    }

    groups.sort_by(|a, b| {
        let (ba, bb) = (bounds(a), bounds(b));
        ba.y0.total_cmp(&bb.y0).then(ba.x0.total_cmp(&bb.x0))
    });
    groups
}

fn bounds(cells: &[BBox]) -> BBox {
    cells.iter().fold(
        BBox::new(f32::MAX, f32::MAX, f32::MIN, f32::MIN),
        |acc, c| BBox::new(acc.x0.min(c.x0), acc.y0.min(c.y0), acc.x1.max(c.x1), acc.y1.max(c.y1)),
    )
}

/// Lay cells out by their top and left edges and read their text
fn build_table(cells: &[BBox], lines: &[&TextLine]) -> Table {
    let mut columns: Vec<f32> = cells.iter().map(|c| c.x0).collect();
    columns.sort_by(f32::total_cmp);
    columns.dedup();

    let mut tops: Vec<f32> = cells.iter().map(|c| c.y0).collect();
    tops.sort_by(f32::total_cmp);
    tops.dedup();

    let rows = tops
        .iter()
        .map(|&top| {
            columns
                .iter()
                .map(|&x| {
                    cells
                        .iter()
                        .find(|c| c.y0 == top && c.x0 == x)
                        .map(|cell| cell_text(cell, lines))
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Table {
        bbox: bounds(cells),
        rows,
    }
}

/// Glyphs centred inside `cell`, one output line per text line
fn cell_text(cell: &BBox, lines: &[&TextLine]) -> String {
    let mut parts = Vec::new();

    for line in lines {
        let cy = line.bbox.center_y();
        if cy < cell.y0 || cy >= cell.y1 {
            continue;
        }

        let text: String = line
            .glyphs
            .iter()
            .filter(|g| {
                let cx = (g.x0 + g.x1) / 2.0;
                cx >= cell.x0 && cx < cell.x1
            })
            .map(|g| g.ch)
            .collect();

        let text = text.trim();
        if !text.is_empty() {
            parts.push(text.to_string());
        }
    }

    parts.join("\n")
}
