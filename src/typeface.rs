//! three.js "typeface JSON" fonts: outline parsing, curve flattening and
//! extrusion into wireframe edges.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use serde::Deserialize;

use crate::error::{Result, SceneError};
use crate::geometry::{Aabb, EDGE_THRESHOLD_DEG};

/// Segments per quadratic/cubic curve.
pub const CURVE_SEGMENTS: usize = 12;

#[derive(Deserialize)]
struct RawTypeface {
    glyphs: HashMap<String, RawGlyph>,
    resolution: f32,
    #[serde(rename = "familyName", default)]
    family_name: String,
}

#[derive(Deserialize)]
struct RawGlyph {
    #[serde(default)]
    ha: f32,
    #[serde(default)]
    o: String,
}

/// Flattened glyph outline in font units.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub advance: f32,
    pub contours: Vec<Vec<Vec2>>,
}

#[derive(Clone, Debug)]
pub struct Typeface {
    family: String,
    resolution: f32,
    glyphs: HashMap<char, Glyph>,
}

impl Typeface {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTypeface = serde_json::from_str(json)?;
        if !(raw.resolution > 0.0) {
            return Err(SceneError::Typeface(format!("bad resolution {}", raw.resolution)));
        }
        let mut glyphs = HashMap::with_capacity(raw.glyphs.len());
        for (key, g) in raw.glyphs {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                log::debug!("skipping multi-char glyph key {key:?}");
                continue;
            };
            let contours = parse_outline(&g.o)
                .map_err(|e| SceneError::Typeface(format!("glyph {ch:?}: {e}")))?;
            glyphs.insert(ch, Glyph { advance: g.ha, contours });
        }
        Ok(Self { family: raw.family_name, resolution: raw.resolution, glyphs })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    /// Glyph for `ch`, falling back to `?`.
    pub fn glyph(&self, ch: char) -> Result<&Glyph> {
        self.glyphs
            .get(&ch)
            .or_else(|| self.glyphs.get(&'?'))
            .ok_or(SceneError::MissingGlyph(ch))
    }

    /// Wireframe edges of `ch` extruded from z = 0 to z = `depth`, scaled so
    /// one em is `size` world units. Returned as segment endpoint pairs.
    pub fn extruded_edges(&self, ch: char, size: f32, depth: f32) -> Result<Vec<Vec3>> {
        let glyph = self.glyph(ch)?;
        let scale = size / self.resolution;
        let cos_threshold = EDGE_THRESHOLD_DEG.to_radians().cos();
        let mut out = Vec::new();

        for contour in &glyph.contours {
            let pts: Vec<Vec2> = contour.iter().map(|p| *p * scale).collect();
            let n = pts.len();
            for i in 0..n {
                let a = pts[i];
                let b = pts[(i + 1) % n];
                out.push(a.extend(0.0));
                out.push(b.extend(0.0));
                if depth > 0.0 {
                    out.push(a.extend(depth));
                    out.push(b.extend(depth));

                    let prev = pts[(i + n - 1) % n];
                    let d0 = (a - prev).normalize_or_zero();
                    let d1 = (b - a).normalize_or_zero();
                    if d0.dot(d1) <= cos_threshold {
                        out.push(a.extend(0.0));
                        out.push(a.extend(depth));
                    }
                }
            }
        }
        Ok(out)
    }

    /// Bounding box of the extruded glyph, before any centering.
    pub fn glyph_bounds(&self, ch: char, size: f32, depth: f32) -> Result<Aabb> {
        Ok(Aabb::from_points(&self.extruded_edges(ch, size, depth)?))
    }
}

/// Parse `m`/`l`/`q`/`b` outline commands into closed, flattened contours.
///
/// As in three.js, `q` and `b` list the end point first and the control
/// points after it.
fn parse_outline(o: &str) -> std::result::Result<Vec<Vec<Vec2>>, String> {
    let mut tokens = o.split_whitespace();
    let mut contours = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();
    let mut pen = Vec2::ZERO;

    let point = |tokens: &mut std::str::SplitWhitespace<'_>| -> std::result::Result<Vec2, String> {
        let mut coord = || -> std::result::Result<f32, String> {
            let t = tokens.next().ok_or("truncated outline")?;
            t.parse::<f32>().map_err(|_| format!("bad number {t:?}"))
        };
        Ok(Vec2::new(coord()?, coord()?))
    };

    while let Some(cmd) = tokens.next() {
        match cmd {
            "m" => {
                close_contour(&mut current, &mut contours);
                pen = point(&mut tokens)?;
                current.push(pen);
            }
            "l" => {
                pen = point(&mut tokens)?;
                current.push(pen);
            }
            "q" => {
                let end = point(&mut tokens)?;
                let c = point(&mut tokens)?;
                for s in 1..=CURVE_SEGMENTS {
                    let t = s as f32 / CURVE_SEGMENTS as f32;
                    let u = 1.0 - t;
                    current.push(pen * (u * u) + c * (2.0 * u * t) + end * (t * t));
                }
                pen = end;
            }
            "b" => {
                let end = point(&mut tokens)?;
                let c1 = point(&mut tokens)?;
                let c2 = point(&mut tokens)?;
                for s in 1..=CURVE_SEGMENTS {
                    let t = s as f32 / CURVE_SEGMENTS as f32;
                    let u = 1.0 - t;
                    current.push(
                        pen * (u * u * u)
                            + c1 * (3.0 * u * u * t)
                            + c2 * (3.0 * u * t * t)
                            + end * (t * t * t),
                    );
                }
                pen = end;
            }
            "z" => close_contour(&mut current, &mut contours),
            other => return Err(format!("unknown outline command {other:?}")),
        }
    }
    close_contour(&mut current, &mut contours);
    Ok(contours)
}

fn close_contour(current: &mut Vec<Vec2>, contours: &mut Vec<Vec<Vec2>>) {
    let mut pts = std::mem::take(current);
    pts.dedup_by(|b, a| a.abs_diff_eq(*b, 1e-6));
    if pts.len() > 1 && pts[0].abs_diff_eq(pts[pts.len() - 1], 1e-6) {
        pts.pop();
    }
    if pts.len() >= 3 {
        contours.push(pts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACE: &str = r#"{
        "familyName": "Test",
        "resolution": 1000,
        "glyphs": {
            "I": { "ha": 200, "o": "m 0 0 l 0 1000 l 200 1000 l 200 0 l 0 0" },
            "C": { "ha": 500, "o": "m 0 0 q 500 500 500 0 l 0 500" },
            " ": { "ha": 300 }
        }
    }"#;

    #[test]
    fn parses_lines_and_closes_contours() {
        let tf = Typeface::from_json(FACE).unwrap();
        assert_eq!(tf.family(), "Test");
        let i = tf.glyph('I').unwrap();
        assert_eq!(i.contours.len(), 1);
        assert_eq!(i.contours[0].len(), 4);
        assert!(tf.glyph(' ').unwrap().contours.is_empty());
    }

    #[test]
    fn quadratic_curves_are_flattened() {
        let tf = Typeface::from_json(FACE).unwrap();
        let c = &tf.glyph('C').unwrap().contours[0];
        // start + 12 curve points + closing line point
        assert_eq!(c.len(), 1 + CURVE_SEGMENTS + 1);
        assert!(c[CURVE_SEGMENTS].abs_diff_eq(Vec2::new(500.0, 500.0), 1e-3));
    }

    #[test]
    fn extruded_box_glyph_has_twelve_edges() {
        let tf = Typeface::from_json(FACE).unwrap();
        let edges = tf.extruded_edges('I', 3.0, 0.2).unwrap();
        assert_eq!(edges.len() / 2, 12);
        let bounds = tf.glyph_bounds('I', 3.0, 0.2).unwrap();
        assert!(bounds.size().abs_diff_eq(Vec3::new(0.6, 3.0, 0.2), 1e-5));
    }

    #[test]
    fn missing_glyph_without_fallback_is_an_error() {
        let tf = Typeface::from_json(FACE).unwrap();
        assert!(matches!(tf.glyph('Z'), Err(SceneError::MissingGlyph('Z'))));
    }

    #[test]
    fn malformed_outline_is_rejected() {
        let bad = r#"{ "resolution": 1000, "glyphs": { "X": { "o": "m 0 0 l 10" } } }"#;
        assert!(matches!(Typeface::from_json(bad), Err(SceneError::Typeface(_))));
        let bad_res = r#"{ "resolution": 0, "glyphs": {} }"#;
        assert!(Typeface::from_json(bad_res).is_err());
    }
}
