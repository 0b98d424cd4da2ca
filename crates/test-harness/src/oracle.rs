//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics.
//! This lets a test collect all failures in one pass.

use std::collections::HashSet;

use construction_engine::Diagram;
use geo_kernel::{Circle2d, Line2d, Point2d};
use serde::Serialize;

/// The result of a single oracle check.
#[derive(Debug, Clone, Serialize)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn pass_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: Some(value),
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn fail_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: Some(value),
        }
    }

    fn measured(name: &str, ok: bool, detail: String, value: f64) -> Self {
        if ok {
            Self::pass_val(name, detail, value)
        } else {
            Self::fail_val(name, detail, value)
        }
    }
}

// ── Structural Oracles ──────────────────────────────────────────────────────

/// Every shape sits strictly above each of its dependencies.
pub fn check_levels_increase(diagram: &Diagram) -> OracleVerdict {
    let mut bad = Vec::new();
    for (_, shape) in diagram.iter() {
        for &dep in &shape.dependencies {
            match diagram.get(dep) {
                Some(d) if d.level < shape.level => {}
                Some(d) => bad.push(format!("{}({}) <= {}({})", shape.name, shape.level, d.name, d.level)),
                None => bad.push(format!("{} -> missing dependency", shape.name)),
            }
        }
    }
    if bad.is_empty() {
        OracleVerdict::pass(
            "levels_increase",
            format!("{} shapes ordered by level", diagram.len()),
        )
    } else {
        OracleVerdict::fail(
            "levels_increase",
            format!("{} violations: {:?}", bad.len(), &bad[..bad.len().min(5)]),
        )
    }
}

/// No two live shapes share a name.
pub fn check_unique_names(diagram: &Diagram) -> OracleVerdict {
    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = diagram
        .iter()
        .map(|(_, s)| s.name.as_str())
        .filter(|n| !seen.insert(*n))
        .collect();
    if duplicates.is_empty() {
        OracleVerdict::pass("unique_names", format!("{} distinct names", seen.len()))
    } else {
        OracleVerdict::fail("unique_names", format!("duplicated: {:?}", duplicates))
    }
}

/// Dependency and child lists mirror each other.
pub fn check_children_consistent(diagram: &Diagram) -> OracleVerdict {
    let mut bad = Vec::new();
    for (id, shape) in diagram.iter() {
        for &dep in &shape.dependencies {
            if diagram.get(dep).is_some_and(|d| !d.children.contains(&id)) {
                bad.push(format!("{} missing from children of its dependency", shape.name));
            }
        }
        for &child in &shape.children {
            if diagram.get(child).is_some_and(|c| !c.dependencies.contains(&id)) {
                bad.push(format!("{} lists a child that does not depend on it", shape.name));
            }
        }
    }
    if bad.is_empty() {
        OracleVerdict::pass("children_consistent", "dependency/child links agree".into())
    } else {
        OracleVerdict::fail("children_consistent", bad.join("; "))
    }
}

/// No shape survives an update while marked for removal.
pub fn check_no_removed(diagram: &Diagram) -> OracleVerdict {
    let removed: Vec<&str> = diagram
        .iter()
        .filter(|(_, s)| s.removed)
        .map(|(_, s)| s.name.as_str())
        .collect();
    if removed.is_empty() {
        OracleVerdict::pass("no_removed", "no pending removals".into())
    } else {
        OracleVerdict::fail("no_removed", format!("still marked: {:?}", removed))
    }
}

/// The structural oracles, in one pass.
pub fn check_structure(diagram: &Diagram) -> Vec<OracleVerdict> {
    vec![
        check_levels_increase(diagram),
        check_unique_names(diagram),
        check_children_consistent(diagram),
        check_no_removed(diagram),
    ]
}

// ── Geometric Oracles ───────────────────────────────────────────────────────

/// `p` lies on `circle`.
pub fn check_on_circle(p: &Point2d, circle: &Circle2d, tol: f64) -> OracleVerdict {
    let dev = (p.distance_to(&circle.center) - circle.radius).abs();
    OracleVerdict::measured(
        "on_circle",
        dev <= tol,
        format!("|dist - r| = {:.3e} (tol {:.0e})", dev, tol),
        dev,
    )
}

/// `p` lies on the carrier of `line`.
pub fn check_on_line(p: &Point2d, line: &Line2d, tol: f64) -> OracleVerdict {
    let dev = line.distance_to_point(p);
    OracleVerdict::measured(
        "on_line",
        dev <= tol,
        format!("distance to line = {:.3e} (tol {:.0e})", dev, tol),
        dev,
    )
}

/// The directions of `a` and `b` are orthogonal.
pub fn check_perpendicular(a: &Line2d, b: &Line2d, tol: f64) -> OracleVerdict {
    match (a.unit_direction(), b.unit_direction()) {
        (Some(u), Some(v)) => {
            let dot = u.dot(&v).abs();
            OracleVerdict::measured(
                "perpendicular",
                dot <= tol,
                format!("|cos angle| = {:.3e}", dot),
                dot,
            )
        }
        _ => OracleVerdict::fail("perpendicular", "degenerate direction".into()),
    }
}

/// The directions of `a` and `b` are parallel.
pub fn check_parallel(a: &Line2d, b: &Line2d, tol: f64) -> OracleVerdict {
    match (a.unit_direction(), b.unit_direction()) {
        (Some(u), Some(v)) => {
            let cross = u.cross(&v).abs();
            OracleVerdict::measured(
                "parallel",
                cross <= tol,
                format!("|sin angle| = {:.3e}", cross),
                cross,
            )
        }
        _ => OracleVerdict::fail("parallel", "degenerate direction".into()),
    }
}

/// `line` touches `circle`: the center is one radius away from it.
pub fn check_tangent(line: &Line2d, circle: &Circle2d, tol: f64) -> OracleVerdict {
    let dev = (line.distance_to_point(&circle.center) - circle.radius).abs();
    OracleVerdict::measured(
        "tangent",
        dev <= tol,
        format!("|d(center, line) - r| = {:.3e}", dev),
        dev,
    )
}

/// Every point in `points` is the same distance from `center`.
pub fn check_equidistant(center: &Point2d, points: &[Point2d], tol: f64) -> OracleVerdict {
    let dists: Vec<f64> = points.iter().map(|p| p.distance_to(center)).collect();
    let (lo, hi) = dists
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &d| (lo.min(d), hi.max(d)));
    if dists.is_empty() {
        return OracleVerdict::pass("equidistant", "no points".into());
    }
    let spread = hi - lo;
    OracleVerdict::measured(
        "equidistant",
        spread <= tol,
        format!("distances {:?}, spread {:.3e}", dists, spread),
        spread,
    )
}

/// Two circles touch at a single point, externally or internally.
pub fn check_circles_tangent(a: &Circle2d, b: &Circle2d, tol: f64) -> OracleVerdict {
    let d = a.center.distance_to(&b.center);
    let external = (d - (a.radius + b.radius)).abs();
    let internal = (d - (a.radius - b.radius).abs()).abs();
    let dev = external.min(internal);
    OracleVerdict::measured(
        "circles_tangent",
        dev <= tol,
        format!("external {:.3e}, internal {:.3e}", external, internal),
        dev,
    )
}
