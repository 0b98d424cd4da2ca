use tracing::debug;

use crate::graph::Diagram;
use crate::types::{CircleKind, LineKind, ShapeId, ShapeKind};

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Syntax check for a user-supplied point name.
///
/// Accepted forms: an upper-case letter followed by `[A-Z0-9]*`, a prime
/// (`A'`), or a one-character subscript (`A_1`, `A_b`).
pub fn is_valid_point_name(name: &str) -> bool {
    let chars: Vec<char> = name.chars().collect();
    let Some(first) = chars.first() else {
        return false;
    };
    if !first.is_ascii_uppercase() {
        return false;
    }
    if chars
        .iter()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return true;
    }
    match chars.as_slice() {
        [_, '\''] => true,
        [_, '_', sub] => sub.is_ascii_alphanumeric(),
        _ => false,
    }
}

/// Name of a line or circle from its kind and its dependencies' names.
/// Points are named by the user and yield `None`.
pub fn derived_name(kind: &ShapeKind, deps: &[&str]) -> Option<String> {
    let prefix = match kind {
        ShapeKind::Point(_) => return None,
        ShapeKind::Line(k) => match k {
            LineKind::Segment => "seg",
            LineKind::Through => "line",
            LineKind::Parallel => "par",
            LineKind::Perpendicular => "per",
            LineKind::AngleBisector => "ab",
            LineKind::PerpBisector => "pb",
            LineKind::Tangent { identifier: true } => "tl",
            LineKind::Tangent { identifier: false } => "tl2",
        },
        ShapeKind::Circle(k) => match k {
            CircleKind::ByRadiusPoint => "circ",
            CircleKind::Circumcircle => "cc",
            CircleKind::Incircle => "ic",
            CircleKind::Tangent { identifier: true } => "tc",
            CircleKind::Tangent { identifier: false } => "tc2",
        },
    };
    Some(format!("{prefix}{}", deps.join("_")))
}

impl Diagram {
    /// First unused name of `length` letters (A..Z, then AA, AB, ...),
    /// moving on to longer names once every name of that length is taken.
    pub fn next_free_name(&self, length: usize) -> String {
        let mut len = length.max(1);
        loop {
            let count = 26usize.saturating_pow(len as u32);
            for index in 0..count {
                let candidate = base26(index, len);
                if self.is_name_available(&candidate) {
                    return candidate;
                }
            }
            len += 1;
        }
    }

    /// `base` if no other live shape holds it, otherwise the first free
    /// `base_2`, `base_3`, ... A shape never blocks its own name.
    pub fn unique_name(&self, base: &str, owner: Option<ShapeId>) -> String {
        let free = |name: &str| {
            self.find_by_name(name)
                .map_or(true, |holder| Some(holder) == owner)
        };
        if free(base) {
            return base.to_string();
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{base}_{suffix}");
            if free(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Re-derive the names of every line and circle downstream of `id`.
    /// A derived name held by an unrelated shape gets a numeric suffix.
    pub fn refresh_names(&mut self, id: ShapeId) {
        let mut closure = self.descendants(id);
        closure.sort_by_key(|node| self.shapes[*node].level);
        for node in closure {
            let Some(shape) = self.shapes.get(node) else {
                continue;
            };
            let deps: Vec<&str> = shape
                .dependencies
                .iter()
                .filter_map(|&d| self.name_of(d))
                .collect();
            let Some(base) = derived_name(&shape.kind, &deps) else {
                continue;
            };
            let name = self.unique_name(&base, Some(node));
            if name != self.shapes[node].name {
                debug!(old = %self.shapes[node].name, new = %name, "derived name changed");
                self.shapes[node].name = name;
            }
        }
    }

    /// Put back names captured earlier, without re-deriving anything.
    pub fn restore_names(&mut self, names: Vec<(ShapeId, String)>) {
        for (id, name) in names {
            if let Some(shape) = self.shapes.get_mut(id) {
                shape.name = name;
            }
        }
    }
}

/// `index` as a `len`-digit base-26 numeral over A..Z.
fn base26(mut index: usize, len: usize) -> String {
    let mut digits = vec![b'A'; len];
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[index % 26];
        index /= 26;
    }
    digits.into_iter().map(char::from).collect()
}
