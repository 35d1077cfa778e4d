//! Silent-correction validation.
//!
//! [`validate`] never fails: every malformed or out-of-range value is
//! replaced or clamped according to the schema, and each correction is
//! reported back so callers can log or assert on it.

use serde_json::{Map, Value};

use crate::schema::{self, FieldKind};
use crate::{BoundaryConditions, ShapeType, SimulationConfig};

/// One corrective action applied during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub field: &'static str,
    pub fix: Fix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fix {
    /// The whole field was replaced with its schema default.
    Defaulted(Reason),
    /// A scalar was clamped into its declared bounds.
    Clamped,
    /// A single vector component was clamped; the rest kept their values.
    ComponentClamped(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Missing,
    TypeMismatch,
    LengthMismatch,
    UnknownKeyword,
}

impl std::fmt::Display for Correction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.fix {
            Fix::Defaulted(reason) => {
                let why = match reason {
                    Reason::Missing => "missing",
                    Reason::TypeMismatch => "wrong type",
                    Reason::LengthMismatch => "wrong length",
                    Reason::UnknownKeyword => "unknown value",
                };
                write!(f, "{}: {why}, replaced with default", self.field)
            }
            Fix::Clamped => write!(f, "{}: clamped into bounds", self.field),
            Fix::ComponentClamped(i) => {
                write!(f, "{}[{i}]: clamped into bounds", self.field)
            }
        }
    }
}

/// Validates a raw configuration mapping against the declared schema.
///
/// Always returns a usable configuration. Scalars clamp, categorical values
/// outside the allowed set fall back to the default, and fixed-length
/// vectors substitute wholesale on a length mismatch but clamp component by
/// component otherwise.
pub fn validate(map: &Map<String, Value>) -> (SimulationConfig, Vec<Correction>) {
    let mut fixes = Vec::new();

    let grid = int_vec(map, "grid_resolution", &mut fixes);
    let shape = match keyword(map, "initial_shape_type", &mut fixes) {
        "vortex" => ShapeType::Vortex,
        "circle_burst" => ShapeType::CircleBurst,
        _ => ShapeType::Crescent,
    };
    // Only one boundary family exists; validation still records corrections
    // for unknown or missing values.
    keyword(map, "boundary_conditions", &mut fixes);
    let bounds = BoundaryConditions::NoSlipWalls;

    let config = SimulationConfig {
        grid_resolution: [grid[0] as usize, grid[1] as usize],
        time_steps: int(map, "time_steps", &mut fixes) as usize,
        viscosity: float(map, "viscosity", &mut fixes),
        initial_shape_type: shape,
        initial_shape_position: float_vec(map, "initial_shape_position", &mut fixes),
        initial_shape_size: float(map, "initial_shape_size", &mut fixes),
        initial_velocity: float_vec(map, "initial_velocity", &mut fixes),
        boundary_conditions: bounds,
        vortex_strength: float(map, "vortex_strength", &mut fixes),
        source_strength: float(map, "source_strength", &mut fixes),
    };

    (config, fixes)
}

fn kind_of(name: &'static str) -> FieldKind {
    schema::field(name)
        .unwrap_or_else(|| panic!("{name} is not a declared schema field"))
        .kind
}

fn default_fix(name: &'static str, reason: Reason, fixes: &mut Vec<Correction>) {
    fixes.push(Correction {
        field: name,
        fix: Fix::Defaulted(reason),
    });
}

fn int(map: &Map<String, Value>, name: &'static str, fixes: &mut Vec<Correction>) -> i64 {
    let FieldKind::Int { min, max, default } = kind_of(name) else {
        panic!("{name} is not an integer field");
    };

    let value = match map.get(name) {
        None => {
            default_fix(name, Reason::Missing, fixes);
            return default;
        }
        Some(v) => v,
    };

    let Some(n) = value.as_i64() else {
        default_fix(name, Reason::TypeMismatch, fixes);
        return default;
    };

    if n < min || n > max {
        fixes.push(Correction {
            field: name,
            fix: Fix::Clamped,
        });
        n.clamp(min, max)
    } else {
        n
    }
}

fn float(map: &Map<String, Value>, name: &'static str, fixes: &mut Vec<Correction>) -> f64 {
    let FieldKind::Float { min, max, default } = kind_of(name) else {
        panic!("{name} is not a float field");
    };

    let value = match map.get(name) {
        None => {
            default_fix(name, Reason::Missing, fixes);
            return default;
        }
        Some(v) => v,
    };

    let Some(x) = value.as_f64() else {
        default_fix(name, Reason::TypeMismatch, fixes);
        return default;
    };

    if x < min || x > max {
        fixes.push(Correction {
            field: name,
            fix: Fix::Clamped,
        });
        x.clamp(min, max)
    } else {
        x
    }
}

fn keyword(
    map: &Map<String, Value>,
    name: &'static str,
    fixes: &mut Vec<Correction>,
) -> &'static str {
    let FieldKind::Keyword { allowed, default } = kind_of(name) else {
        panic!("{name} is not a keyword field");
    };

    let value = match map.get(name) {
        None => {
            default_fix(name, Reason::Missing, fixes);
            return default;
        }
        Some(v) => v,
    };

    let Some(s) = value.as_str() else {
        default_fix(name, Reason::TypeMismatch, fixes);
        return default;
    };

    match allowed.iter().find(|&&a| a == s) {
        Some(&a) => a,
        None => {
            default_fix(name, Reason::UnknownKeyword, fixes);
            default
        }
    }
}

fn int_vec(map: &Map<String, Value>, name: &'static str, fixes: &mut Vec<Correction>) -> [i64; 2] {
    let FieldKind::IntVec { min, max, default } = kind_of(name) else {
        panic!("{name} is not an integer vector field");
    };

    let value = match map.get(name) {
        None => {
            default_fix(name, Reason::Missing, fixes);
            return default;
        }
        Some(v) => v,
    };

    let Some(items) = value.as_array() else {
        default_fix(name, Reason::TypeMismatch, fixes);
        return default;
    };

    // Length is checked for the vector as a whole; components are then
    // corrected independently rather than resetting the entire vector.
    if items.len() != 2 {
        default_fix(name, Reason::LengthMismatch, fixes);
        return default;
    }

    let mut components = [0i64; 2];
    for (i, item) in items.iter().enumerate() {
        match item.as_i64() {
            Some(n) => components[i] = n,
            None => {
                default_fix(name, Reason::TypeMismatch, fixes);
                return default;
            }
        }
    }

    let mut out = [0i64; 2];
    for (i, &n) in components.iter().enumerate() {
        out[i] = if n < min || n > max {
            fixes.push(Correction {
                field: name,
                fix: Fix::ComponentClamped(i),
            });
            n.clamp(min, max)
        } else {
            n
        };
    }

    out
}

fn float_vec(map: &Map<String, Value>, name: &'static str, fixes: &mut Vec<Correction>) -> [f64; 2] {
    let FieldKind::FloatVec { min, max, default } = kind_of(name) else {
        panic!("{name} is not a float vector field");
    };

    let value = match map.get(name) {
        None => {
            default_fix(name, Reason::Missing, fixes);
            return default;
        }
        Some(v) => v,
    };

    let Some(items) = value.as_array() else {
        default_fix(name, Reason::TypeMismatch, fixes);
        return default;
    };

    if items.len() != 2 {
        default_fix(name, Reason::LengthMismatch, fixes);
        return default;
    }

    let mut components = [0f64; 2];
    for (i, item) in items.iter().enumerate() {
        match item.as_f64() {
            Some(x) => components[i] = x,
            None => {
                default_fix(name, Reason::TypeMismatch, fixes);
                return default;
            }
        }
    }

    let mut out = [0f64; 2];
    for (i, &x) in components.iter().enumerate() {
        out[i] = if x < min || x > max {
            fixes.push(Correction {
                field: name,
                fix: Fix::ComponentClamped(i),
            });
            x.clamp(min, max)
        } else {
            x
        };
    }

    out
}
