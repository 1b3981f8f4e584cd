//! Geometrie-Hilfsfunktionen (Rotation, Bögen, Abstände).

use glam::Vec2;

/// Dreht einen Vektor um `angle_deg` Grad (mathematisch positiv).
pub fn rotate_deg(v: Vec2, angle_deg: f32) -> Vec2 {
    if angle_deg == 0.0 {
        return v;
    }
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Transformiert eine footprint-lokale Position in Weltkoordinaten.
///
/// KiCad dreht im Uhrzeigersinn bei Y-nach-unten, daher negativer Winkel.
pub fn local_to_world(local: Vec2, origin: Vec2, rotation_deg: f32) -> Vec2 {
    origin + rotate_deg(local, -rotation_deg)
}

/// Normalisiert einen Winkel (Grad) auf den lesbaren Bereich (-90, 90].
pub fn normalize_label_angle(angle_deg: f32) -> f32 {
    let mut a = angle_deg % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    if a > 90.0 {
        a -= 180.0;
    } else if a <= -90.0 {
        a += 180.0;
    }
    a
}

/// Kürzester Abstand eines Punkts zu einer Strecke.
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Approximiert einen Kreisbogen durch drei Punkte als Polylinie.
///
/// Bei kollinearen Punkten wird die direkte Strecke geliefert.
pub fn arc_through_points(start: Vec2, mid: Vec2, end: Vec2, segments: usize) -> Vec<Vec2> {
    let Some(center) = circle_center(start, mid, end) else {
        return vec![start, end];
    };
    let radius = start.distance(center);
    let a0 = (start - center).to_angle();
    let a1 = (mid - center).to_angle();
    let a2 = (end - center).to_angle();

    let ccw_span = |from: f32, to: f32| (to - from).rem_euclid(std::f32::consts::TAU);
    let sweep = if ccw_span(a0, a1) <= ccw_span(a0, a2) {
        ccw_span(a0, a2)
    } else {
        -ccw_span(a2, a0)
    };

    let segments = segments.max(2);
    (0..=segments)
        .map(|i| {
            let a = a0 + sweep * (i as f32 / segments as f32);
            center + Vec2::from_angle(a) * radius
        })
        .collect()
}

fn circle_center(a: Vec2, b: Vec2, c: Vec2) -> Option<Vec2> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-9 {
        return None;
    }
    let a2 = a.length_squared();
    let b2 = b.length_squared();
    let c2 = c.length_squared();
    Some(Vec2::new(
        (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    ))
}

/// Sortiert Strings "natürlich": Ziffernfolgen werden numerisch verglichen.
///
/// `"10"` liegt damit hinter `"9"` und nicht vor `"2"`.
pub fn natural_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();
    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let na = take_digits(&mut ai);
                let nb = take_digits(&mut bi);
                let ta = na.trim_start_matches('0');
                let tb = nb.trim_start_matches('0');
                let ord = ta.len().cmp(&tb.len()).then_with(|| ta.cmp(tb));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(ca), Some(cb)) => {
                let ord = ca
                    .to_lowercase()
                    .cmp(cb.to_lowercase())
                    .then_with(|| ca.cmp(&cb));
                if ord != Ordering::Equal {
                    return ord;
                }
                ai.next();
                bi.next();
            }
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = it.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        it.next();
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn label_angle_is_kept_readable() {
        assert_relative_eq!(normalize_label_angle(0.0), 0.0);
        assert_relative_eq!(normalize_label_angle(180.0), 0.0);
        assert_relative_eq!(normalize_label_angle(135.0), -45.0);
        assert_relative_eq!(normalize_label_angle(-90.0), 90.0);
        assert_relative_eq!(normalize_label_angle(270.0), 90.0);
    }

    #[test]
    fn natural_cmp_orders_numbers_numerically() {
        let mut pages = vec!["2", "10", "1"];
        pages.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(pages, vec!["1", "2", "10"]);

        let mut refs = vec!["R10", "R2", "C1", "R1"];
        refs.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(refs, vec!["C1", "R1", "R2", "R10"]);
    }

    #[test]
    fn arc_through_points_hits_endpoints() {
        let pts = arc_through_points(
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(-1.0, 0.0),
            8,
        );
        let first = pts.first().copied().expect("Punkte erwartet");
        let last = pts.last().copied().expect("Punkte erwartet");
        assert_relative_eq!(first.x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(last.x, -1.0, epsilon = 1e-4);
        // Bogen verläuft über den Mittelpunkt (0, 1)
        assert!(pts.iter().any(|p| (p.y - 1.0).abs() < 1e-3));
    }

    #[test]
    fn point_segment_distance_clamps_to_endpoints() {
        let d = point_segment_distance(Vec2::new(-3.0, 4.0), Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert_relative_eq!(d, 5.0);
    }
}
