//! Abgeleitete Indizes: Netz-Referenzen und Designatoren.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::core::{BoardDocument, SchematicDocument};

/// Herkunft einer Netz-Referenz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetRefKind {
    /// Kupfer-Item oder Pad auf einem Board
    BoardItem,
    /// Netz-Label in einem Schaltplan
    SchematicLabel,
}

/// Verweis auf ein Item, das zu einem Netz gehört.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetRef {
    /// Herkunft
    pub kind: NetRefKind,
    /// Datei
    pub filename: String,
    /// UUID des Items
    pub uuid: String,
    /// Netzname
    pub net_name: String,
}

/// Herkunft eines Designators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignatorKind {
    /// Footprint auf einem Board
    Footprint,
    /// Symbol in einem Schaltplan
    Symbol,
}

/// Verweis auf ein Bauteil.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignatorRef {
    /// Herkunft
    pub kind: DesignatorKind,
    /// Datei
    pub filename: String,
    /// UUID des Footprints/Symbols
    pub uuid: String,
}

/// Alle abgeleiteten Netz- und Designator-Indizes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectIndices {
    /// UUID → Netz-Referenz
    pub net_item_refs: IndexMap<String, NetRef>,
    /// Label-/Netzname → Referenzen
    pub label_name_refs: IndexMap<String, Vec<NetRef>>,
    /// Designator → Referenzen
    pub designator_refs: IndexMap<String, Vec<DesignatorRef>>,
}

impl ProjectIndices {
    /// Baut die Indizes über alle Boards und Schaltpläne.
    pub fn build(boards: &[Arc<BoardDocument>], schematics: &[Arc<SchematicDocument>]) -> Self {
        let mut indices = Self::default();
        for board in boards {
            indices.add_board(board);
        }
        for schematic in schematics {
            indices.add_schematic(schematic);
        }
        log::debug!(
            "Indizes: {} Netz-Items, {} Labels, {} Designatoren",
            indices.net_item_refs.len(),
            indices.label_name_refs.len(),
            indices.designator_refs.len()
        );
        indices
    }

    fn push_net_ref(&mut self, net_ref: NetRef) {
        if net_ref.uuid.is_empty() || net_ref.net_name.is_empty() {
            return;
        }
        self.label_name_refs
            .entry(net_ref.net_name.clone())
            .or_default()
            .push(net_ref.clone());
        self.net_item_refs.insert(net_ref.uuid.clone(), net_ref);
    }

    fn add_board(&mut self, board: &BoardDocument) {
        let board_ref = |uuid: &str, net: u32| -> Option<NetRef> {
            Some(NetRef {
                kind: NetRefKind::BoardItem,
                filename: board.filename.clone(),
                uuid: uuid.to_string(),
                net_name: board.net_name(net)?.to_string(),
            })
        };

        let copper = board
            .segments
            .iter()
            .map(|s| (s.uuid.as_str(), s.net))
            .chain(board.arcs.iter().map(|a| (a.uuid.as_str(), a.net)))
            .chain(board.vias.iter().map(|v| (v.uuid.as_str(), v.net)))
            .chain(board.zones.iter().map(|z| (z.uuid.as_str(), z.net)));
        let refs: Vec<NetRef> = copper
            .filter(|(_, net)| *net != 0)
            .filter_map(|(uuid, net)| board_ref(uuid, net))
            .collect();
        for r in refs {
            self.push_net_ref(r);
        }

        for fp in &board.footprints {
            for pad in &fp.pads {
                if let (Some(uuid), Some(net)) = (&pad.uuid, &pad.net) {
                    if net.number != 0 {
                        self.push_net_ref(NetRef {
                            kind: NetRefKind::BoardItem,
                            filename: board.filename.clone(),
                            uuid: uuid.clone(),
                            net_name: net.name.clone(),
                        });
                    }
                }
            }
            if !fp.reference.is_empty() {
                self.designator_refs
                    .entry(fp.reference.clone())
                    .or_default()
                    .push(DesignatorRef {
                        kind: DesignatorKind::Footprint,
                        filename: board.filename.clone(),
                        uuid: fp.uuid.clone(),
                    });
            }
        }
    }

    fn add_schematic(&mut self, schematic: &SchematicDocument) {
        for label in &schematic.labels {
            self.push_net_ref(NetRef {
                kind: NetRefKind::SchematicLabel,
                filename: schematic.filename.clone(),
                uuid: label.uuid.clone(),
                net_name: label.text.clone(),
            });
        }
        for symbol in schematic.symbols.iter().filter(|s| !s.is_virtual()) {
            for designator in symbol.designators() {
                self.designator_refs
                    .entry(designator.to_string())
                    .or_default()
                    .push(DesignatorRef {
                        kind: DesignatorKind::Symbol,
                        filename: schematic.filename.clone(),
                        uuid: symbol.uuid.clone(),
                    });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Net, NetLabel, LabelKind, TrackSegment};
    use glam::Vec2;

    #[test]
    fn board_and_schematic_refs_share_label_names() {
        let mut board = BoardDocument::new("b.kicad_pcb");
        board.nets = vec![Net {
            number: 3,
            name: "VCC".into(),
        }];
        board.segments.push(TrackSegment {
            uuid: "seg".into(),
            start: Vec2::ZERO,
            end: Vec2::X,
            width: 0.2,
            layer: "F.Cu".into(),
            net: 3,
        });
        let mut sch = SchematicDocument::new("s.kicad_sch", "root");
        sch.labels.push(NetLabel {
            uuid: "lbl".into(),
            text: "VCC".into(),
            kind: LabelKind::Global,
            position: Vec2::ZERO,
            rotation: 0.0,
        });

        let idx = ProjectIndices::build(&[Arc::new(board)], &[Arc::new(sch)]);
        assert_eq!(idx.label_name_refs.get("VCC").map(Vec::len), Some(2));
        assert_eq!(
            idx.net_item_refs.get("seg").map(|r| r.kind),
            Some(NetRefKind::BoardItem)
        );
        assert_eq!(
            idx.net_item_refs.get("lbl").map(|r| r.filename.as_str()),
            Some("s.kicad_sch")
        );
    }
}
