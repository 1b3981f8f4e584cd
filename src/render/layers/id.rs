//! Geschlossene Menge der Layer-Identitäten.
//!
//! Physische Layer tragen ihren KiCad-Namen; abgeleitete Layer sind eigene
//! Varianten statt per String-Konvention zusammengesetzter Namen.

use std::fmt;
use std::str::FromStr;

use crate::core::ViaKind;

/// Seite eines Pad-Layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadSide {
    /// Durchkontaktierte Pads (alle Kupferlagen)
    Global,
    /// SMD-Pads vorne
    Front,
    /// SMD-Pads hinten
    Back,
}

impl PadSide {
    fn token(&self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Front => "Front",
            Self::Back => "Back",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "Global" => Some(Self::Global),
            "Front" => Some(Self::Front),
            "Back" => Some(Self::Back),
            _ => None,
        }
    }

    /// Kupferlage, von deren Sichtbarkeit die Seite abhängt.
    pub fn copper_layer(&self) -> Option<&'static str> {
        match self {
            Self::Global => None,
            Self::Front => Some("F.Cu"),
            Self::Back => Some("B.Cu"),
        }
    }
}

/// Overlay-Layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    /// Auswahl / Bauteil-Isolation
    Selection,
    /// Net-Fokus: abgeblendete Items
    FocusBackground,
    /// Net-Fokus: hervorgehobene Items
    FocusForeground,
}

impl OverlayKind {
    fn token(&self) -> &'static str {
        match self {
            Self::Selection => "Selection",
            Self::FocusBackground => "FocusBackground",
            Self::FocusForeground => "FocusForeground",
        }
    }
}

fn via_token(kind: ViaKind) -> &'static str {
    match kind {
        ViaKind::Through => "Through",
        ViaKind::BlindBuried => "BlindBuried",
        ViaKind::Micro => "Micro",
    }
}

/// Identität eines Layers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayerId {
    /// Physischer Layer aus dem Board (`F.Cu`, `B.SilkS`, `Edge.Cuts` …)
    Physical(String),
    /// Zonenfüllung einer Kupferlage
    Zones(String),
    /// Track-Netznamen einer Kupferlage
    TrackNetName(String),
    /// Vias eines Typs
    Vias(ViaKind),
    /// Via-Bohrungen
    ViaHoles,
    /// Pad-Bohrungen
    PadHoles,
    /// Pads einer Seite
    Pads(PadSide),
    /// Pad-Nummern einer Seite
    PadNumbers(PadSide),
    /// Pad-Netznamen einer Seite
    PadNetNames(PadSide),
    /// Via-Netznamen (ein gemeinsamer Layer)
    ViaNetNames,
    /// Raster
    Grid,
    /// Overlay
    Overlay(OverlayKind),
}

impl LayerId {
    /// Kurzform für physische Layer.
    pub fn physical(name: impl Into<String>) -> Self {
        Self::Physical(name.into())
    }

    /// Gibt `true` zurück für Overlay-Layer.
    pub fn is_overlay(&self) -> bool {
        matches!(self, Self::Overlay(_))
    }

    /// Gibt `true` zurück für Layer, die im dynamischen Pass neu erzeugt werden.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::TrackNetName(_) | Self::ViaNetNames)
    }

    /// Kupferlage eines kupferbezogenen Layers.
    pub fn copper_layer(&self) -> Option<&str> {
        match self {
            Self::Physical(name) | Self::Zones(name) | Self::TrackNetName(name)
                if crate::core::board::is_copper_layer_name(name) =>
            {
                Some(name)
            }
            _ => None,
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Physical(name) => f.write_str(name),
            Self::Zones(name) => write!(f, ":Zones:{name}"),
            Self::TrackNetName(name) => write!(f, ":TrackNetName:{name}"),
            Self::Vias(kind) => write!(f, ":Via:{}", via_token(*kind)),
            Self::ViaHoles => f.write_str(":Via:Holes"),
            Self::PadHoles => f.write_str(":Pad:Holes"),
            Self::Pads(side) => write!(f, ":Pads:{}", side.token()),
            Self::PadNumbers(side) => write!(f, ":PadNumbers:{}", side.token()),
            Self::PadNetNames(side) => write!(f, ":PadNetNames:{}", side.token()),
            Self::ViaNetNames => f.write_str(":ViaNetNames"),
            Self::Grid => f.write_str(":Grid"),
            Self::Overlay(kind) => write!(f, ":Overlay:{}", kind.token()),
        }
    }
}

/// Fehler beim Lesen eines Layer-Namens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unbekannter Layer-Name: {0}")]
pub struct UnknownLayerName(pub String);

impl FromStr for LayerId {
    type Err = UnknownLayerName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownLayerName(s.to_string());
        let Some(rest) = s.strip_prefix(':') else {
            if s.is_empty() {
                return Err(unknown());
            }
            return Ok(Self::Physical(s.to_string()));
        };

        let (group, arg) = match rest.split_once(':') {
            Some((g, a)) => (g, Some(a)),
            None => (rest, None),
        };
        let side = || arg.and_then(PadSide::from_token).ok_or_else(unknown);

        match (group, arg) {
            ("Zones", Some(name)) if !name.is_empty() => Ok(Self::Zones(name.to_string())),
            ("TrackNetName", Some(name)) if !name.is_empty() => {
                Ok(Self::TrackNetName(name.to_string()))
            }
            ("Via", Some("Holes")) => Ok(Self::ViaHoles),
            ("Via", Some("Through")) => Ok(Self::Vias(ViaKind::Through)),
            ("Via", Some("BlindBuried")) => Ok(Self::Vias(ViaKind::BlindBuried)),
            ("Via", Some("Micro")) => Ok(Self::Vias(ViaKind::Micro)),
            ("Pad", Some("Holes")) => Ok(Self::PadHoles),
            ("Pads", _) => Ok(Self::Pads(side()?)),
            ("PadNumbers", _) => Ok(Self::PadNumbers(side()?)),
            ("PadNetNames", _) => Ok(Self::PadNetNames(side()?)),
            ("ViaNetNames", None) => Ok(Self::ViaNetNames),
            ("Grid", None) => Ok(Self::Grid),
            ("Overlay", Some("Selection")) => Ok(Self::Overlay(OverlayKind::Selection)),
            ("Overlay", Some("FocusBackground")) => Ok(Self::Overlay(OverlayKind::FocusBackground)),
            ("Overlay", Some("FocusForeground")) => Ok(Self::Overlay(OverlayKind::FocusForeground)),
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_agree() {
        let ids = [
            LayerId::physical("F.Cu"),
            LayerId::Zones("In1.Cu".into()),
            LayerId::TrackNetName("B.Cu".into()),
            LayerId::Vias(ViaKind::Micro),
            LayerId::ViaHoles,
            LayerId::PadHoles,
            LayerId::Pads(PadSide::Front),
            LayerId::PadNumbers(PadSide::Global),
            LayerId::PadNetNames(PadSide::Back),
            LayerId::ViaNetNames,
            LayerId::Grid,
            LayerId::Overlay(OverlayKind::FocusForeground),
        ];
        for id in ids {
            let name = id.to_string();
            assert_eq!(name.parse::<LayerId>(), Ok(id), "Name {name}");
        }
    }

    #[test]
    fn rejects_malformed_names() {
        assert!("".parse::<LayerId>().is_err());
        assert!(":Pads:Left".parse::<LayerId>().is_err());
        assert!(":Zones:".parse::<LayerId>().is_err());
        assert!(":Nope".parse::<LayerId>().is_err());
    }

    #[test]
    fn copper_layer_of_derived_ids() {
        assert_eq!(LayerId::TrackNetName("F.Cu".into()).copper_layer(), Some("F.Cu"));
        assert_eq!(LayerId::physical("F.SilkS").copper_layer(), None);
        assert!(LayerId::ViaNetNames.is_dynamic());
    }
}
