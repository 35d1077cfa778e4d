use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod schema;
pub mod validate;

pub use validate::{validate, Correction, Fix, Reason};

/// Validated solver configuration. Built once per run, frozen afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid resolution as `[nx, ny]`.
    pub grid_resolution: [usize; 2],
    pub time_steps: usize,
    pub viscosity: f64,
    pub initial_shape_type: ShapeType,
    pub initial_shape_position: [f64; 2],
    pub initial_shape_size: f64,
    pub initial_velocity: [f64; 2],
    pub boundary_conditions: BoundaryConditions,
    pub vortex_strength: f64,
    pub source_strength: f64,
}

impl SimulationConfig {
    /// Domain extent in both directions, in meters.
    pub const DOMAIN_SIZE: f64 = 2.0;
    /// Fixed time increment per step.
    pub const DT: f64 = 1e-3;
    /// Fluid density.
    pub const DENSITY: f64 = 1.0;
    /// Jacobi sweeps per pressure solve.
    pub const PRESSURE_ITERS: usize = 50;
    /// A snapshot is emitted every this many steps.
    pub const SNAPSHOT_INTERVAL: usize = 10;

    pub fn nx(&self) -> usize {
        self.grid_resolution[0]
    }

    pub fn ny(&self) -> usize {
        self.grid_resolution[1]
    }

    /// The configuration as a JSON mapping, keyed by schema field names.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => unreachable!("config serializes to an object"),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_resolution: [81, 81],
            time_steps: 1000,
            viscosity: 0.01,
            initial_shape_type: ShapeType::Crescent,
            initial_shape_position: [0.5, 0.5],
            initial_shape_size: 0.3,
            initial_velocity: [0.0, 3.0],
            boundary_conditions: BoundaryConditions::NoSlipWalls,
            vortex_strength: 0.0,
            source_strength: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeType {
    Vortex,
    Crescent,
    CircleBurst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryConditions {
    NoSlipWalls,
}

/// Visualization metadata. Passed through to the downstream consumer,
/// never read by the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationParams {
    pub visualization_type: String,
    pub arrow_color: [f64; 3],
    pub arrow_scale_factor: f64,
    pub arrow_density: usize,
}

impl Default for VisualizationParams {
    fn default() -> Self {
        Self {
            visualization_type: "arrows".into(),
            arrow_color: [0.0, 0.0, 1.0],
            arrow_scale_factor: 1.0,
            arrow_density: 10,
        }
    }
}

/// Output of keyword inference: a solver baseline plus visualization hints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resolved {
    pub sim: SimulationConfig,
    pub viz: VisualizationParams,
}

/// Derives a baseline configuration from free-form effect keywords.
///
/// Tokens are expected lowercase; matching is substring containment, so a
/// compound token like `"swirling vortex"` triggers the vortex rule. Rules
/// apply in fixed order and later rules overwrite only the fields they
/// touch.
pub fn infer<'a, I>(keywords: I) -> Resolved
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sim = SimulationConfig::default();
    let mut viz = VisualizationParams::default();

    let tokens: Vec<&str> = keywords.into_iter().collect();
    let has = |needle: &str| tokens.iter().any(|t| t.contains(needle));

    if has("vortex") || has("swirling") {
        sim.initial_shape_type = ShapeType::Vortex;
        sim.vortex_strength = 0.8;
        sim.initial_velocity = [0.0, 0.0];
        sim.viscosity = 0.03;
        sim.time_steps = 1500;
    }

    if has("red") {
        viz.arrow_color = [1.0, 0.0, 0.0];
    }
    if has("green") {
        viz.arrow_color = [0.0, 1.0, 0.0];
    }

    if has("fast") {
        sim.initial_velocity = [1.0, 0.2];
        sim.viscosity = 0.02;
    }
    if has("slow") {
        sim.initial_velocity = [0.1, 0.05];
        sim.viscosity = 0.1;
    }

    if has("explosion") || has("burst") {
        sim.initial_shape_type = ShapeType::CircleBurst;
        sim.initial_velocity = [0.0, 0.0];
        sim.source_strength = 0.5;
        sim.time_steps = 1200;
    }

    Resolved { sim, viz }
}

/// Overlays explicit overrides onto an inferred baseline.
///
/// Field-by-field: a present override always wins, absent fields keep the
/// baseline value. Keys outside the schema are dropped. The result is a raw
/// mapping; pass it through [`validate`] to obtain a usable configuration.
pub fn merge(baseline: &SimulationConfig, overrides: &Map<String, Value>) -> Map<String, Value> {
    let mut map = baseline.to_map();

    for spec in schema::SCHEMA {
        if let Some(value) = overrides.get(spec.name) {
            map.insert(spec.name.to_string(), value.clone());
        }
    }

    map
}

/// Overlays explicit visualization overrides onto the inferred parameters.
///
/// Same precedence as [`merge`]: a present override always wins, absent
/// fields keep the inferred value. Visualization values are metadata, so a
/// value that fails to parse keeps the baseline instead of erroring.
pub fn merge_viz(
    baseline: &VisualizationParams,
    overrides: &Map<String, Value>,
) -> VisualizationParams {
    let mut viz = baseline.clone();

    if let Some(s) = overrides.get("visualization_type").and_then(Value::as_str) {
        viz.visualization_type = s.to_string();
    }

    if let Some(items) = overrides.get("arrow_color").and_then(Value::as_array) {
        if items.len() == 3 {
            if let (Some(r), Some(g), Some(b)) =
                (items[0].as_f64(), items[1].as_f64(), items[2].as_f64())
            {
                viz.arrow_color = [r, g, b];
            }
        }
    }

    if let Some(x) = overrides.get("arrow_scale_factor").and_then(Value::as_f64) {
        viz.arrow_scale_factor = x;
    }

    if let Some(n) = overrides.get("arrow_density").and_then(Value::as_u64) {
        viz.arrow_density = n as usize;
    }

    viz
}
