//! Declarative configuration schema.
//!
//! One static, ordered table of field descriptors drives both validation and
//! merging. Nothing mutates it after startup.

/// How a field is typed, bounded, and defaulted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Integer scalar clamped into `[min, max]`.
    Int { min: i64, max: i64, default: i64 },
    /// Floating-point scalar clamped into `[min, max]`.
    Float { min: f64, max: f64, default: f64 },
    /// Categorical string drawn from a fixed allowed set.
    Keyword {
        allowed: &'static [&'static str],
        default: &'static str,
    },
    /// Fixed-length integer vector; components clamp independently.
    IntVec {
        min: i64,
        max: i64,
        default: [i64; 2],
    },
    /// Fixed-length float vector; components clamp independently.
    FloatVec {
        min: f64,
        max: f64,
        default: [f64; 2],
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Every declared configuration field, in serialization order.
pub static SCHEMA: &[FieldSpec] = &[
    FieldSpec {
        name: "grid_resolution",
        kind: FieldKind::IntVec {
            min: 8,
            max: 1024,
            default: [81, 81],
        },
    },
    FieldSpec {
        name: "time_steps",
        kind: FieldKind::Int {
            min: 1,
            max: 100_000,
            default: 1000,
        },
    },
    FieldSpec {
        name: "viscosity",
        kind: FieldKind::Float {
            min: 1e-4,
            max: 1.0,
            default: 0.01,
        },
    },
    FieldSpec {
        name: "initial_shape_type",
        kind: FieldKind::Keyword {
            allowed: &["vortex", "crescent", "circle_burst"],
            default: "crescent",
        },
    },
    FieldSpec {
        name: "initial_shape_position",
        kind: FieldKind::FloatVec {
            min: 0.0,
            max: 2.0,
            default: [0.5, 0.5],
        },
    },
    FieldSpec {
        name: "initial_shape_size",
        kind: FieldKind::Float {
            min: 0.01,
            max: 1.0,
            default: 0.3,
        },
    },
    FieldSpec {
        name: "initial_velocity",
        kind: FieldKind::FloatVec {
            min: -5.0,
            max: 5.0,
            default: [0.0, 3.0],
        },
    },
    FieldSpec {
        name: "boundary_conditions",
        kind: FieldKind::Keyword {
            allowed: &["no_slip_walls"],
            default: "no_slip_walls",
        },
    },
    FieldSpec {
        name: "vortex_strength",
        kind: FieldKind::Float {
            min: 0.0,
            max: 5.0,
            default: 0.0,
        },
    },
    FieldSpec {
        name: "source_strength",
        kind: FieldKind::Float {
            min: 0.0,
            max: 5.0,
            default: 2.0,
        },
    },
];

/// Looks up a field descriptor by name.
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    SCHEMA.iter().find(|spec| spec.name == name)
}
