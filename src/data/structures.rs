//! Hydraulic structures located on branches.
//!
//! The mesh builder only needs where a structure sits (branch id and
//! chainage); that shared capability is the [`StructureLocation`] trait. The
//! per-kind records keep the attributes the downstream model writer needs,
//! but the crate does not interpret them.

use serde::{Deserialize, Serialize};

use crate::mesh_error::ReachMeshError;

/// Where a structure sits on the network.
///
/// An empty `branch_id` means the structure is not assigned to any branch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructureChainage {
    pub structure_id: String,
    pub branch_id: String,
    pub chainage: f64,
}

impl StructureChainage {
    pub fn new(
        structure_id: impl Into<String>,
        branch_id: impl Into<String>,
        chainage: f64,
    ) -> Self {
        Self {
            structure_id: structure_id.into(),
            branch_id: branch_id.into(),
            chainage,
        }
    }

    /// Whether the structure is tied to a branch.
    #[inline]
    pub fn is_assigned(&self) -> bool {
        !self.branch_id.is_empty()
    }
}

/// Shared capability of every structure kind used during mesh generation.
pub trait StructureLocation {
    fn id(&self) -> &str;
    fn branch_id(&self) -> &str;
    fn chainage(&self) -> f64;

    /// Location record consumed by the offset generator.
    fn location(&self) -> StructureChainage {
        StructureChainage::new(self.id(), self.branch_id(), self.chainage())
    }
}

/// Allowed flow direction through a structure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowDirection {
    #[default]
    Both,
    Positive,
    Negative,
    None,
}

/// A pump with its suction-side switching levels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pump {
    pub id: String,
    pub branch_id: String,
    pub chainage: f64,
    /// Capacity in m³/s.
    pub capacity: f64,
    pub start_level_suction_side: f64,
    pub stop_level_suction_side: f64,
}

/// A simple weir.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weir {
    pub id: String,
    pub branch_id: String,
    pub chainage: f64,
    pub crest_level: f64,
    pub crest_width: f64,
    pub discharge_coeff: f64,
    pub lateral_discharge_coeff: f64,
    pub allowed_flow_dir: FlowDirection,
}

/// Closed cross-section of a culvert.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum CulvertShape {
    Circle { diameter: f64 },
    Rectangle { width: f64, height: f64 },
}

/// A culvert between two invert levels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Culvert {
    pub id: String,
    pub branch_id: String,
    pub chainage: f64,
    pub left_level: f64,
    pub right_level: f64,
    pub length: f64,
    pub inlet_loss_coeff: f64,
    pub outlet_loss_coeff: f64,
    pub allowed_flow_dir: FlowDirection,
    pub shape: CulvertShape,
}

/// Any structure the network can carry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Structure {
    Pump(Pump),
    Weir(Weir),
    Culvert(Culvert),
}

macro_rules! impl_location {
    ($($ty:ty),*) => {$(
        impl StructureLocation for $ty {
            fn id(&self) -> &str { &self.id }
            fn branch_id(&self) -> &str { &self.branch_id }
            fn chainage(&self) -> f64 { self.chainage }
        }
    )*};
}

impl_location!(Pump, Weir, Culvert);

impl Structure {
    fn inner(&self) -> &dyn StructureLocation {
        match self {
            Structure::Pump(p) => p,
            Structure::Weir(w) => w,
            Structure::Culvert(c) => c,
        }
    }

    /// Short kind name, as used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Structure::Pump(_) => "pump",
            Structure::Weir(_) => "weir",
            Structure::Culvert(_) => "culvert",
        }
    }
}

impl StructureLocation for Structure {
    fn id(&self) -> &str {
        self.inner().id()
    }
    fn branch_id(&self) -> &str {
        self.inner().branch_id()
    }
    fn chainage(&self) -> f64 {
        self.inner().chainage()
    }
}

/// Location records for a set of structures, in input order.
pub fn structure_chainages<'a, S, I>(structures: I) -> Vec<StructureChainage>
where
    S: StructureLocation + 'a,
    I: IntoIterator<Item = &'a S>,
{
    structures.into_iter().map(|s| s.location()).collect()
}

/// Water-level controller attached to a pump or to its pumping station.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PumpControl {
    pub id: String,
    /// Id of the pump or pumping station this controller steers.
    pub controlled_object: String,
    pub target_level: f64,
    pub upper_margin: f64,
    pub lower_margin: f64,
}

impl PumpControl {
    /// `(start, stop)` suction-side levels implied by the target and margins.
    pub fn suction_levels(&self) -> (f64, f64) {
        (
            self.target_level + self.upper_margin,
            self.target_level - self.lower_margin,
        )
    }
}

/// Lookup of controllers by the object they steer.
#[derive(Clone, Debug, Default)]
pub struct ControlTable {
    controls: Vec<PumpControl>,
}

impl ControlTable {
    pub fn new(controls: Vec<PumpControl>) -> Self {
        Self { controls }
    }

    fn controlling(&self, object: &str) -> Vec<&PumpControl> {
        self.controls
            .iter()
            .filter(|c| c.controlled_object == object)
            .collect()
    }

    /// Find the single controller of `pump_id`.
    ///
    /// A controller attached to the pump itself wins. Otherwise the pump's
    /// `station` must match exactly one code in `stations`, and that station
    /// must have exactly one controller. Anything else is reported as
    /// [`ReachMeshError::AmbiguousStructureAssignment`].
    pub fn resolve_pump(
        &self,
        pump_id: &str,
        station: Option<&str>,
        stations: &[String],
    ) -> Result<&PumpControl, ReachMeshError> {
        let ambiguous = |reason: String| ReachMeshError::AmbiguousStructureAssignment {
            structure: pump_id.to_owned(),
            reason,
        };

        if let [only] = self.controlling(pump_id).as_slice() {
            return Ok(*only);
        }

        let station = station.ok_or_else(|| {
            ambiguous("no unique controller and no pumping station to fall back on".into())
        })?;
        let matching = stations.iter().filter(|code| *code == station).count();
        if matching != 1 {
            return Err(ambiguous(format!(
                "{matching} pumping stations found with code `{station}`"
            )));
        }
        match self.controlling(station).as_slice() {
            [only] => Ok(*only),
            other => Err(ambiguous(format!(
                "{} controllers found for pumping station `{station}`",
                other.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(id: &str, object: &str) -> PumpControl {
        PumpControl {
            id: id.into(),
            controlled_object: object.into(),
            target_level: 1.0,
            upper_margin: 0.2,
            lower_margin: 0.1,
        }
    }

    #[test]
    fn direct_controller_wins() {
        let table = ControlTable::new(vec![control("c1", "pump1"), control("c2", "st1")]);
        let c = table.resolve_pump("pump1", Some("st1"), &["st1".into()]).unwrap();
        assert_eq!(c.id, "c1");
        let (start, stop) = c.suction_levels();
        assert!((start - 1.2).abs() < 1e-12);
        assert!((stop - 0.9).abs() < 1e-12);
    }

    #[test]
    fn falls_back_to_station() {
        let table = ControlTable::new(vec![control("c2", "st1")]);
        let c = table.resolve_pump("pump1", Some("st1"), &["st1".into()]).unwrap();
        assert_eq!(c.id, "c2");
    }

    #[test]
    fn duplicate_station_is_ambiguous() {
        let table = ControlTable::new(vec![control("c2", "st1")]);
        let err = table
            .resolve_pump("pump1", Some("st1"), &["st1".into(), "st1".into()])
            .unwrap_err();
        assert!(matches!(
            err,
            ReachMeshError::AmbiguousStructureAssignment { ref structure, .. }
                if structure == "pump1"
        ));
    }

    #[test]
    fn missing_station_controller_is_ambiguous() {
        let table = ControlTable::new(vec![control("c1", "st1"), control("c2", "st1")]);
        assert!(table.resolve_pump("pump1", Some("st1"), &["st1".into()]).is_err());
        assert!(table.resolve_pump("pump1", None, &[]).is_err());
    }

    #[test]
    fn structures_expose_locations() {
        let structures = vec![
            Structure::Weir(Weir {
                id: "w1".into(),
                branch_id: "b1".into(),
                chainage: 12.5,
                crest_level: 0.4,
                crest_width: 3.0,
                discharge_coeff: 1.0,
                lateral_discharge_coeff: 1.0,
                allowed_flow_dir: FlowDirection::Both,
            }),
            Structure::Culvert(Culvert {
                id: "c1".into(),
                branch_id: String::new(),
                chainage: 3.0,
                left_level: 0.0,
                right_level: 0.0,
                length: 10.0,
                inlet_loss_coeff: 0.6,
                outlet_loss_coeff: 1.0,
                allowed_flow_dir: FlowDirection::Positive,
                shape: CulvertShape::Circle { diameter: 0.8 },
            }),
        ];
        let locs = structure_chainages(&structures);
        assert_eq!(locs[0], StructureChainage::new("w1", "b1", 12.5));
        assert!(!locs[1].is_assigned());
        assert_eq!(structures[1].kind(), "culvert");

        let json = serde_json::to_value(&structures[0]).unwrap();
        assert_eq!(json["type"], "weir");
    }
}
