//! Spatial-Index (KD-Tree) für das Picking von Board-Items.

use glam::Vec2;
use kiddo::{KdTree, SquaredEuclidean};

use super::board::{BoardDocument, NetNumber};
use super::BBox;

/// Items mit größerer halber Diagonale landen nicht im KD-Tree,
/// sondern werden linear geprüft (Zonen, lange Tracks).
const LARGE_ITEM_HALF_DIAGONAL_MM: f32 = 5.0;

/// Referenz auf ein pickbares Item (Indizes ins `BoardDocument`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickTarget {
    /// Leiterbahnsegment
    Segment(usize),
    /// Leiterbahnbogen
    Arc(usize),
    /// Via
    Via(usize),
    /// Pad eines Footprints
    Pad {
        /// Footprint-Index
        footprint: usize,
        /// Pad-Index im Footprint
        pad: usize,
    },
    /// Footprint-Körper (ohne Pad getroffen)
    Footprint(usize),
    /// Zone
    Zone(usize),
}

impl PickTarget {
    /// Netznummer des Ziels (0 für Footprints und netzlose Items).
    pub fn net(&self, board: &BoardDocument) -> NetNumber {
        match *self {
            Self::Segment(i) => board.segments.get(i).map_or(0, |s| s.net),
            Self::Arc(i) => board.arcs.get(i).map_or(0, |a| a.net),
            Self::Via(i) => board.vias.get(i).map_or(0, |v| v.net),
            Self::Pad { footprint, pad } => board
                .footprints
                .get(footprint)
                .and_then(|f| f.pads.get(pad))
                .map_or(0, |p| p.net_number()),
            Self::Footprint(_) => 0,
            Self::Zone(i) => board.zones.get(i).map_or(0, |z| z.net),
        }
    }

    /// Index des zugehörigen Footprints (Pad oder Footprint-Körper).
    pub fn footprint(&self) -> Option<usize> {
        match *self {
            Self::Pad { footprint, .. } | Self::Footprint(footprint) => Some(footprint),
            _ => None,
        }
    }

    /// Picking-Priorität: kleinere Werte gewinnen.
    fn priority(&self) -> u8 {
        match self {
            Self::Via(_) => 0,
            Self::Pad { .. } => 1,
            Self::Segment(_) | Self::Arc(_) => 2,
            Self::Footprint(_) => 3,
            Self::Zone(_) => 4,
        }
    }
}

/// Ergebnis einer Pick-Abfrage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickMatch {
    /// Getroffenes Item
    pub target: PickTarget,
    /// Distanz vom Suchpunkt zum Item-Anker
    pub distance: f32,
}

#[derive(Debug, Clone)]
struct IndexedItem {
    target: PickTarget,
    bbox: BBox,
}

/// Read-only Spatial-Index über allen pickbaren Items eines Boards.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
    small: Vec<IndexedItem>,
    large: Vec<IndexedItem>,
    max_small_half_diagonal: f32,
}

impl SpatialIndex {
    /// Erstellt einen leeren Spatial-Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 2]>::new()).into(),
            small: Vec::new(),
            large: Vec::new(),
            max_small_half_diagonal: 0.0,
        }
    }

    /// Baut einen neuen Index aus allen Items des Boards.
    pub fn from_board(board: &BoardDocument) -> Self {
        let mut items = Vec::with_capacity(board.item_count());
        items.extend(
            board
                .segments
                .iter()
                .enumerate()
                .map(|(i, s)| (PickTarget::Segment(i), s.bbox())),
        );
        items.extend(
            board
                .arcs
                .iter()
                .enumerate()
                .map(|(i, a)| (PickTarget::Arc(i), a.bbox())),
        );
        items.extend(
            board
                .vias
                .iter()
                .enumerate()
                .map(|(i, v)| (PickTarget::Via(i), v.bbox())),
        );
        for (fi, fp) in board.footprints.iter().enumerate() {
            items.push((PickTarget::Footprint(fi), fp.bbox()));
            items.extend(fp.pads.iter().enumerate().map(|(pi, pad)| {
                (
                    PickTarget::Pad {
                        footprint: fi,
                        pad: pi,
                    },
                    pad.bbox(),
                )
            }));
        }
        items.extend(
            board
                .zones
                .iter()
                .enumerate()
                .map(|(i, z)| (PickTarget::Zone(i), z.bbox())),
        );

        let mut small = Vec::new();
        let mut large = Vec::new();
        let mut max_small_half_diagonal = 0.0_f32;
        for (target, bbox) in items {
            if bbox.is_empty() {
                continue;
            }
            let half_diagonal = Vec2::new(bbox.width(), bbox.height()).length() * 0.5;
            let item = IndexedItem { target, bbox };
            if half_diagonal > LARGE_ITEM_HALF_DIAGONAL_MM {
                large.push(item);
            } else {
                max_small_half_diagonal = max_small_half_diagonal.max(half_diagonal);
                small.push(item);
            }
        }

        let entries: Vec<[f64; 2]> = small
            .iter()
            .map(|item| {
                let c = item.bbox.center();
                [c.x as f64, c.y as f64]
            })
            .collect();
        let tree: KdTree<f64, 2> = (&entries).into();

        log::debug!(
            "Spatial-Index gebaut: {} kleine, {} große Items",
            small.len(),
            large.len()
        );

        Self {
            tree,
            small,
            large,
            max_small_half_diagonal,
        }
    }

    /// Gibt die Anzahl indexierter Items zurück.
    pub fn len(&self) -> usize {
        self.small.len() + self.large.len()
    }

    /// Gibt `true` zurück, wenn keine Items im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Findet alle Items, deren Geometrie den Punkt trifft, nach Priorität sortiert.
    pub fn pick(&self, board: &BoardDocument, query: Vec2, tolerance: f32) -> Vec<PickMatch> {
        if self.is_empty() {
            return Vec::new();
        }

        let radius = self.max_small_half_diagonal + tolerance;
        let mut results: Vec<PickMatch> = self
            .tree
            .within::<SquaredEuclidean>(&[query.x as f64, query.y as f64], (radius * radius) as f64)
            .into_iter()
            .filter_map(|entry| {
                let item = self.small.get(entry.item as usize)?;
                Some(PickMatch {
                    target: item.target,
                    distance: (entry.distance as f32).sqrt(),
                })
            })
            .chain(self.large.iter().map(|item| PickMatch {
                target: item.target,
                distance: item.bbox.center().distance(query),
            }))
            .filter(|m| hit_test(board, m.target, query, tolerance))
            .collect();

        results.sort_by(|a, b| {
            a.target
                .priority()
                .cmp(&b.target.priority())
                .then(a.distance.total_cmp(&b.distance))
        });
        results
    }

    /// Bestes Pick-Ergebnis an einer Position.
    pub fn pick_first(&self, board: &BoardDocument, query: Vec2, tolerance: f32) -> Option<PickMatch> {
        self.pick(board, query, tolerance).into_iter().next()
    }
}

/// Exakte Trefferprüfung nach dem KD-Tree-Vorfilter.
fn hit_test(board: &BoardDocument, target: PickTarget, p: Vec2, tolerance: f32) -> bool {
    match target {
        PickTarget::Segment(i) => board.segments.get(i).is_some_and(|s| s.hit_test(p, tolerance)),
        PickTarget::Arc(i) => board.arcs.get(i).is_some_and(|a| a.hit_test(p, tolerance)),
        PickTarget::Via(i) => board
            .vias
            .get(i)
            .is_some_and(|v| v.position.distance(p) <= v.diameter * 0.5 + tolerance),
        PickTarget::Pad { footprint, pad } => board
            .footprints
            .get(footprint)
            .and_then(|f| f.pads.get(pad))
            .is_some_and(|pad| pad.bbox().grow(tolerance).contains_point(p)),
        PickTarget::Footprint(i) => board
            .footprints
            .get(i)
            .is_some_and(|f| f.bbox().grow(tolerance).contains_point(p)),
        PickTarget::Zone(i) => board
            .zones
            .get(i)
            .is_some_and(|z| point_in_polygon(p, &z.outline)),
    }
}

/// Ray-Casting-Test für einfache Polygone.
fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
