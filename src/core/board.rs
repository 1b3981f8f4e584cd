//! Platinen-Dokument: Layer-Stack, Netze, Footprints, Tracks, Vias, Zonen.
//!
//! Das Dokument ist nach dem Parsen read-only und wird als `Arc<BoardDocument>`
//! zwischen Viewer-Instanzen geteilt. Einzige erlaubte Mutation ist der lazy
//! Render-Cache an Text-Items (`OnceLock`).

use super::geometry::{arc_through_points, point_segment_distance};
use super::BBox;
use glam::Vec2;
use std::sync::OnceLock;

/// Netznummer; 0 bedeutet "kein Netz".
pub type NetNumber = u32;

/// Art eines deklarierten Layers im Stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Signal-Kupferlage
    Signal,
    /// Versorgungslage
    Power,
    /// Gemischte Lage
    Mixed,
    /// Jumper-Lage
    Jumper,
    /// Technische Lage (Silk, Fab, Mask, Edge …)
    User,
}

impl LayerKind {
    /// Liest die Layer-Art aus dem KiCad-Token.
    pub fn from_token(token: &str) -> Self {
        match token {
            "signal" => Self::Signal,
            "power" => Self::Power,
            "mixed" => Self::Mixed,
            "jumper" => Self::Jumper,
            _ => Self::User,
        }
    }
}

/// Ein im Board deklarierter Layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDecl {
    /// KiCad-Ordinalzahl
    pub ordinal: i32,
    /// Kanonischer Name, z.B. `F.Cu`
    pub name: String,
    /// Layer-Art
    pub kind: LayerKind,
    /// Optionaler Benutzername
    pub user_name: Option<String>,
}

impl LayerDecl {
    /// Gibt `true` zurück für Kupferlagen.
    pub fn is_copper(&self) -> bool {
        is_copper_layer_name(&self.name)
    }
}

/// Prüft ob ein Layer-Name eine Kupferlage bezeichnet.
pub fn is_copper_layer_name(name: &str) -> bool {
    name.ends_with(".Cu") && !name.starts_with('*')
}

/// Position einer Kupferlage im physischen Stack (F.Cu oben, B.Cu unten).
pub fn copper_stack_position(name: &str) -> i32 {
    match name {
        "F.Cu" => 0,
        "B.Cu" => i32::MAX,
        other => other
            .strip_prefix("In")
            .and_then(|rest| rest.strip_suffix(".Cu"))
            .and_then(|n| n.parse::<i32>().ok())
            .unwrap_or(i32::MAX - 1),
    }
}

/// Netz-Deklaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Net {
    /// Netznummer
    pub number: NetNumber,
    /// Vollständiger Netzname (inkl. hierarchischem Pfad)
    pub name: String,
}

/// Pad-Typ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadKind {
    /// Durchkontaktiert
    ThroughHole,
    /// Nicht durchkontaktierte Bohrung
    NpThroughHole,
    /// Oberflächenmontiert
    Smd,
    /// Kontakt ohne Paste
    Connect,
}

impl PadKind {
    /// Liest den Pad-Typ aus dem KiCad-Token.
    pub fn from_token(token: &str) -> Self {
        match token {
            "thru_hole" => Self::ThroughHole,
            "np_thru_hole" => Self::NpThroughHole,
            "connect" => Self::Connect,
            _ => Self::Smd,
        }
    }
}

/// Pad-Form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadShape {
    /// Kreis
    Circle,
    /// Rechteck
    Rect,
    /// Langloch
    Oval,
    /// Rechteck mit abgerundeten Ecken
    RoundRect,
    /// Trapez
    Trapezoid,
    /// Freiform
    Custom,
}

impl PadShape {
    /// Liest die Pad-Form aus dem KiCad-Token.
    pub fn from_token(token: &str) -> Self {
        match token {
            "circle" => Self::Circle,
            "oval" => Self::Oval,
            "roundrect" => Self::RoundRect,
            "trapezoid" => Self::Trapezoid,
            "custom" => Self::Custom,
            _ => Self::Rect,
        }
    }
}

/// Netzzuordnung eines Pads.
#[derive(Debug, Clone, PartialEq)]
pub struct PadNet {
    /// Netznummer
    pub number: NetNumber,
    /// Netzname
    pub name: String,
}

/// Ein Pad mit absoluter Position.
#[derive(Debug, Clone, PartialEq)]
pub struct Pad {
    /// Pad-Nummer (kann leer sein)
    pub number: String,
    /// Pad-Typ
    pub kind: PadKind,
    /// Pad-Form
    pub shape: PadShape,
    /// Absolute Position (mm)
    pub position: Vec2,
    /// Größe im Pad-Koordinatensystem (mm)
    pub size: Vec2,
    /// Absolute Rotation (Grad)
    pub rotation: f32,
    /// Layer-Namen (inkl. Wildcards wie `*.Cu`)
    pub layers: Vec<String>,
    /// Netzzuordnung
    pub net: Option<PadNet>,
    /// Bohrdurchmesser (mm)
    pub drill: Option<f32>,
    /// UUID (KiCad 8+)
    pub uuid: Option<String>,
}

impl Pad {
    /// Gibt `true` zurück für Pads, die alle Kupferlagen durchdringen.
    pub fn is_through_hole(&self) -> bool {
        matches!(self.kind, PadKind::ThroughHole | PadKind::NpThroughHole)
    }

    /// Gibt `true` zurück, wenn das Pad auf der gegebenen Kupferlage liegt.
    pub fn on_layer(&self, layer: &str) -> bool {
        self.layers.iter().any(|l| {
            l == layer
                || (l == "*.Cu" && is_copper_layer_name(layer))
                || (l == "F&B.Cu" && (layer == "F.Cu" || layer == "B.Cu"))
        })
    }

    /// Netznummer (0 = kein Netz).
    pub fn net_number(&self) -> NetNumber {
        self.net.as_ref().map_or(0, |n| n.number)
    }

    /// Effektive Ausdehnung in Weltachsen (Rotation in 90°-Schritten berücksichtigt).
    pub fn world_size(&self) -> Vec2 {
        let quarter_turns = (self.rotation / 90.0).round() as i32;
        let is_axis_aligned = (self.rotation - quarter_turns as f32 * 90.0).abs() < 0.01;
        if is_axis_aligned && quarter_turns.rem_euclid(2) == 1 {
            Vec2::new(self.size.y, self.size.x)
        } else if is_axis_aligned {
            self.size
        } else {
            Vec2::splat(self.size.max_element())
        }
    }

    /// Bounding Box des Pads.
    pub fn bbox(&self) -> BBox {
        let half = self.world_size() * 0.5;
        BBox::from_corners(self.position - half, self.position + half)
    }
}

/// Platziertes Bauteil.
#[derive(Debug, Clone)]
pub struct Footprint {
    /// UUID
    pub uuid: String,
    /// Bibliotheks-ID, z.B. `Resistor_SMD:R_0603`
    pub lib_id: String,
    /// Referenz-Designator
    pub reference: String,
    /// Wert
    pub value: String,
    /// Platzierungs-Layer (`F.Cu` oder `B.Cu`)
    pub layer: String,
    /// Absolute Position
    pub position: Vec2,
    /// Rotation (Grad)
    pub rotation: f32,
    /// "Do not populate"
    pub dnp: bool,
    /// Aus der Stückliste ausgeschlossen
    pub exclude_from_bom: bool,
    /// Pads mit absoluten Positionen
    pub pads: Vec<Pad>,
    /// Grafische Elemente (absolute Koordinaten)
    pub graphics: Vec<GraphicItem>,
    /// Texte (absolute Koordinaten)
    pub texts: Vec<BoardText>,
}

impl Footprint {
    /// Gibt `true` zurück, wenn das Bauteil auf der Rückseite liegt.
    pub fn is_back(&self) -> bool {
        self.layer.starts_with("B.")
    }

    /// Bounding Box über Pads und Grafik; Fallback 1x1 mm um die Position.
    pub fn bbox(&self) -> BBox {
        let mut bbox = BBox::empty();
        for pad in &self.pads {
            bbox.expand_bbox(&pad.bbox());
        }
        for g in &self.graphics {
            bbox.expand_bbox(&g.bbox());
        }
        if bbox.is_empty() {
            bbox = BBox::from_corners(self.position, self.position).grow(0.5);
        }
        bbox
    }

    /// Gibt `true` zurück, wenn mindestens ein Pad auf dem Netz liegt.
    pub fn touches_net(&self, net: NetNumber) -> bool {
        net != 0 && self.pads.iter().any(|p| p.net_number() == net)
    }
}

/// Gerades Leiterbahnsegment.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSegment {
    /// UUID
    pub uuid: String,
    /// Startpunkt
    pub start: Vec2,
    /// Endpunkt
    pub end: Vec2,
    /// Breite (mm)
    pub width: f32,
    /// Kupferlage
    pub layer: String,
    /// Netznummer
    pub net: NetNumber,
}

impl TrackSegment {
    /// Länge des Segments.
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Bounding Box inkl. halber Breite.
    pub fn bbox(&self) -> BBox {
        BBox::from_corners(self.start, self.end).grow(self.width * 0.5)
    }

    /// Prüft ob ein Punkt auf dem Segment liegt.
    pub fn hit_test(&self, p: Vec2, tolerance: f32) -> bool {
        point_segment_distance(p, self.start, self.end) <= self.width * 0.5 + tolerance
    }
}

/// Leiterbahnbogen durch drei Punkte.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackArc {
    /// UUID
    pub uuid: String,
    /// Startpunkt
    pub start: Vec2,
    /// Punkt auf dem Bogen
    pub mid: Vec2,
    /// Endpunkt
    pub end: Vec2,
    /// Breite (mm)
    pub width: f32,
    /// Kupferlage
    pub layer: String,
    /// Netznummer
    pub net: NetNumber,
}

impl TrackArc {
    /// Polylinien-Approximation des Bogens.
    pub fn points(&self) -> Vec<Vec2> {
        arc_through_points(self.start, self.mid, self.end, 16)
    }

    /// Bounding Box inkl. halber Breite.
    pub fn bbox(&self) -> BBox {
        BBox::from_points(&self.points()).grow(self.width * 0.5)
    }

    /// Prüft ob ein Punkt auf dem Bogen liegt.
    pub fn hit_test(&self, p: Vec2, tolerance: f32) -> bool {
        self.points()
            .windows(2)
            .any(|w| point_segment_distance(p, w[0], w[1]) <= self.width * 0.5 + tolerance)
    }
}

/// Via-Typ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViaKind {
    /// Durchgehend
    Through,
    /// Blind/Buried
    BlindBuried,
    /// Microvia
    Micro,
}

/// Durchkontaktierung.
#[derive(Debug, Clone, PartialEq)]
pub struct Via {
    /// UUID
    pub uuid: String,
    /// Via-Typ
    pub kind: ViaKind,
    /// Position
    pub position: Vec2,
    /// Außendurchmesser (mm)
    pub diameter: f32,
    /// Bohrdurchmesser (mm)
    pub drill: f32,
    /// Start- und End-Kupferlage
    pub layers: (String, String),
    /// Netznummer
    pub net: NetNumber,
}

impl Via {
    /// Bounding Box.
    pub fn bbox(&self) -> BBox {
        BBox::from_corners(self.position, self.position).grow(self.diameter * 0.5)
    }
}

/// Kupferzone.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    /// UUID
    pub uuid: String,
    /// Netznummer
    pub net: NetNumber,
    /// Netzname
    pub net_name: String,
    /// Layer der Zone
    pub layers: Vec<String>,
    /// Umriss
    pub outline: Vec<Vec2>,
    /// Gefüllte Polygone pro Layer
    pub filled: Vec<(String, Vec<Vec2>)>,
}

impl Zone {
    /// Bounding Box des Umrisses.
    pub fn bbox(&self) -> BBox {
        let mut bbox = BBox::from_points(&self.outline);
        for (_, poly) in &self.filled {
            bbox.expand_bbox(&BBox::from_points(poly));
        }
        bbox
    }
}

/// Geometrie eines Grafik-Elements.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicShape {
    /// Linie
    Line {
        /// Start
        start: Vec2,
        /// Ende
        end: Vec2,
    },
    /// Rechteck
    Rect {
        /// Ecke
        start: Vec2,
        /// Gegenüberliegende Ecke
        end: Vec2,
    },
    /// Kreis
    Circle {
        /// Mittelpunkt
        center: Vec2,
        /// Radius
        radius: f32,
    },
    /// Bogen durch drei Punkte
    Arc {
        /// Start
        start: Vec2,
        /// Punkt auf dem Bogen
        mid: Vec2,
        /// Ende
        end: Vec2,
    },
    /// Polygon
    Polygon {
        /// Eckpunkte
        points: Vec<Vec2>,
    },
}

/// Grafisches Element (Board-Ebene oder Footprint).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicItem {
    /// Geometrie
    pub shape: GraphicShape,
    /// Layer
    pub layer: String,
    /// Strichbreite
    pub width: f32,
    /// Gefüllt
    pub filled: bool,
}

impl GraphicItem {
    /// Bounding Box der Geometrie.
    pub fn bbox(&self) -> BBox {
        let bbox = match &self.shape {
            GraphicShape::Line { start, end } | GraphicShape::Rect { start, end } => {
                BBox::from_corners(*start, *end)
            }
            GraphicShape::Circle { center, radius } => {
                BBox::from_corners(*center, *center).grow(*radius)
            }
            GraphicShape::Arc { start, mid, end } => {
                BBox::from_points(&arc_through_points(*start, *mid, *end, 16))
            }
            GraphicShape::Polygon { points } => BBox::from_points(points),
        };
        bbox.grow(self.width * 0.5)
    }
}

/// Lazy berechnete Render-Daten eines Texts.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRenderCache {
    /// Anzahl Glyphen
    pub glyph_count: usize,
    /// Anzahl Glyphen ohne Strichdefinition
    pub unstrokable: usize,
    /// Geschätzte Bounding Box
    pub bbox: BBox,
}

/// Text auf der Platine.
#[derive(Debug, Clone)]
pub struct BoardText {
    /// Textinhalt
    pub text: String,
    /// Position
    pub position: Vec2,
    /// Schrifthöhe (mm)
    pub size: f32,
    /// Rotation (Grad)
    pub rotation: f32,
    /// Layer
    pub layer: String,
    /// Unsichtbar (z.B. versteckte Properties)
    pub hidden: bool,
    /// Lazy Render-Cache, gesetzt vom Text-Painter
    pub render_cache: OnceLock<TextRenderCache>,
}

impl BoardText {
    /// Erstellt einen Text ohne Render-Cache.
    pub fn new(text: impl Into<String>, position: Vec2, size: f32, layer: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position,
            size,
            rotation: 0.0,
            layer: layer.into(),
            hidden: false,
            render_cache: OnceLock::new(),
        }
    }
}

/// Referenz auf ein Item des Boards für die Painter-Dispatch.
#[derive(Debug, Clone, Copy)]
pub enum BoardItem<'a> {
    /// Leiterbahnsegment
    Segment(&'a TrackSegment),
    /// Leiterbahnbogen
    Arc(&'a TrackArc),
    /// Via
    Via(&'a Via),
    /// Zone
    Zone(&'a Zone),
    /// Footprint inkl. Pads
    Footprint(&'a Footprint),
    /// Board-Grafik
    Graphic(&'a GraphicItem),
    /// Board-Text
    Text(&'a BoardText),
}

impl BoardItem<'_> {
    /// Netznummer des Items (Footprints: keine eigene Netznummer).
    pub fn net(&self) -> Option<NetNumber> {
        match self {
            Self::Segment(s) => Some(s.net),
            Self::Arc(a) => Some(a.net),
            Self::Via(v) => Some(v.net),
            Self::Zone(z) => Some(z.net),
            _ => None,
        }
    }
}

/// Vollständiges Platinen-Dokument.
#[derive(Debug, Clone, Default)]
pub struct BoardDocument {
    /// Dateiname
    pub filename: String,
    /// Format-Version
    pub version: Option<String>,
    /// Titel aus dem Title-Block
    pub title: Option<String>,
    /// Deklarierter Layer-Stack
    pub layers: Vec<LayerDecl>,
    /// Netze
    pub nets: Vec<Net>,
    /// Bauteile
    pub footprints: Vec<Footprint>,
    /// Leiterbahnsegmente
    pub segments: Vec<TrackSegment>,
    /// Leiterbahnbögen
    pub arcs: Vec<TrackArc>,
    /// Vias
    pub vias: Vec<Via>,
    /// Zonen
    pub zones: Vec<Zone>,
    /// Board-Grafik
    pub graphics: Vec<GraphicItem>,
    /// Board-Texte
    pub texts: Vec<BoardText>,
}

impl BoardDocument {
    /// Erstellt ein leeres Board.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    /// Kupferlagen in physischer Reihenfolge (F.Cu zuerst, B.Cu zuletzt).
    pub fn copper_layers(&self) -> Vec<&str> {
        let mut copper: Vec<&str> = self
            .layers
            .iter()
            .filter(|l| l.is_copper())
            .map(|l| l.name.as_str())
            .collect();
        copper.sort_by_key(|name| copper_stack_position(name));
        copper
    }

    /// Index einer Kupferlage im physischen Stack.
    pub fn copper_index(&self, layer: &str) -> Option<usize> {
        self.copper_layers().iter().position(|l| *l == layer)
    }

    /// Kupferlagen, die ein Via durchdringt (inklusive Start- und Endlage).
    pub fn via_span(&self, via: &Via) -> Vec<&str> {
        let copper = self.copper_layers();
        let (Some(a), Some(b)) = (
            copper.iter().position(|l| *l == via.layers.0),
            copper.iter().position(|l| *l == via.layers.1),
        ) else {
            return Vec::new();
        };
        let (lo, hi) = (a.min(b), a.max(b));
        copper[lo..=hi].to_vec()
    }

    /// Netzname zu einer Netznummer.
    pub fn net_name(&self, number: NetNumber) -> Option<&str> {
        self.nets
            .iter()
            .find(|n| n.number == number)
            .map(|n| n.name.as_str())
    }

    /// Netznummer zu einem Netznamen.
    pub fn net_by_name(&self, name: &str) -> Option<NetNumber> {
        self.nets.iter().find(|n| n.name == name).map(|n| n.number)
    }

    /// Findet ein Bauteil anhand seines Designators.
    pub fn find_footprint(&self, reference: &str) -> Option<&Footprint> {
        self.footprints.iter().find(|f| f.reference == reference)
    }

    /// Iteriert alle Items in Zeichenreihenfolge.
    pub fn items(&self) -> impl Iterator<Item = BoardItem<'_>> {
        self.zones
            .iter()
            .map(BoardItem::Zone)
            .chain(self.graphics.iter().map(BoardItem::Graphic))
            .chain(self.texts.iter().map(BoardItem::Text))
            .chain(self.segments.iter().map(BoardItem::Segment))
            .chain(self.arcs.iter().map(BoardItem::Arc))
            .chain(self.footprints.iter().map(BoardItem::Footprint))
            .chain(self.vias.iter().map(BoardItem::Via))
    }

    /// Anzahl aller Items (Pads zählen mit).
    pub fn item_count(&self) -> usize {
        self.zones.len()
            + self.graphics.len()
            + self.texts.len()
            + self.segments.len()
            + self.arcs.len()
            + self.vias.len()
            + self
                .footprints
                .iter()
                .map(|f| 1 + f.pads.len())
                .sum::<usize>()
    }

    /// Bounding Box des Boards: Edge.Cuts falls vorhanden, sonst alle Items.
    pub fn bbox(&self) -> BBox {
        let mut edge = BBox::empty();
        for g in self.graphics.iter().filter(|g| g.layer == "Edge.Cuts") {
            edge.expand_bbox(&g.bbox());
        }
        if !edge.is_empty() {
            return edge;
        }

        let mut bbox = BBox::empty();
        for s in &self.segments {
            bbox.expand_bbox(&s.bbox());
        }
        for v in &self.vias {
            bbox.expand_bbox(&v.bbox());
        }
        for f in &self.footprints {
            bbox.expand_bbox(&f.bbox());
        }
        for z in &self.zones {
            bbox.expand_bbox(&z.bbox());
        }
        bbox
    }

    /// Bounding Box aller Kupfer-Items eines Netzes.
    pub fn net_bbox(&self, net: NetNumber) -> BBox {
        let mut bbox = BBox::empty();
        if net == 0 {
            return bbox;
        }
        for s in self.segments.iter().filter(|s| s.net == net) {
            bbox.expand_bbox(&s.bbox());
        }
        for a in self.arcs.iter().filter(|a| a.net == net) {
            bbox.expand_bbox(&a.bbox());
        }
        for v in self.vias.iter().filter(|v| v.net == net) {
            bbox.expand_bbox(&v.bbox());
        }
        for z in self.zones.iter().filter(|z| z.net == net) {
            bbox.expand_bbox(&z.bbox());
        }
        for pad in self
            .footprints
            .iter()
            .flat_map(|f| f.pads.iter())
            .filter(|p| p.net_number() == net)
        {
            bbox.expand_bbox(&pad.bbox());
        }
        bbox
    }

    /// Alle Texte (Board und Footprints) für Glyph-Analysen.
    pub fn all_texts(&self) -> impl Iterator<Item = &BoardText> {
        self.texts
            .iter()
            .chain(self.footprints.iter().flat_map(|f| f.texts.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(ordinal: i32, name: &str, kind: LayerKind) -> LayerDecl {
        LayerDecl {
            ordinal,
            name: name.to_string(),
            kind,
            user_name: None,
        }
    }

    #[test]
    fn copper_layers_follow_physical_stack() {
        let mut board = BoardDocument::new("test.kicad_pcb");
        // KiCad 9 listet B.Cu vor den Innenlagen
        board.layers = vec![
            layer(0, "F.Cu", LayerKind::Signal),
            layer(2, "B.Cu", LayerKind::Signal),
            layer(4, "In1.Cu", LayerKind::Power),
            layer(6, "In2.Cu", LayerKind::Power),
            layer(37, "F.SilkS", LayerKind::User),
        ];
        assert_eq!(board.copper_layers(), vec!["F.Cu", "In1.Cu", "In2.Cu", "B.Cu"]);
    }

    #[test]
    fn via_span_covers_inner_layers() {
        let mut board = BoardDocument::new("test.kicad_pcb");
        board.layers = vec![
            layer(0, "F.Cu", LayerKind::Signal),
            layer(1, "In1.Cu", LayerKind::Signal),
            layer(2, "In2.Cu", LayerKind::Signal),
            layer(31, "B.Cu", LayerKind::Signal),
        ];
        let via = Via {
            uuid: "v".into(),
            kind: ViaKind::BlindBuried,
            position: Vec2::ZERO,
            diameter: 0.6,
            drill: 0.3,
            layers: ("In2.Cu".into(), "F.Cu".into()),
            net: 1,
        };
        assert_eq!(board.via_span(&via), vec!["F.Cu", "In1.Cu", "In2.Cu"]);
    }

    #[test]
    fn pad_world_size_swaps_on_quarter_turn() {
        let pad = Pad {
            number: "1".into(),
            kind: PadKind::Smd,
            shape: PadShape::Rect,
            position: Vec2::ZERO,
            size: Vec2::new(2.0, 1.0),
            rotation: 90.0,
            layers: vec!["F.Cu".into()],
            net: None,
            drill: None,
            uuid: None,
        };
        assert_eq!(pad.world_size(), Vec2::new(1.0, 2.0));
        assert!(pad.on_layer("F.Cu"));
        assert!(!pad.on_layer("B.Cu"));
    }
}
