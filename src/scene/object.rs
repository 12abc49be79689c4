use cgmath::{InnerSpace, Quaternion, Vector3};

/// The closed set of object kinds a scene can contain.
///
/// Each kind maps one-to-one onto an XML element tag in the serialized
/// scene description; unknown kinds are unrepresentable by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    HospitalBuilding,
    PostOfficeBuilding,
    SztakiLandingZone,
    Pole,
    LandingZone,
    Airport,
    ParkingLot,
    Drone,
}

impl ObjectKind {
    /// All kinds, in the order they are offered to the operator.
    pub const ALL: [ObjectKind; 8] = [
        ObjectKind::HospitalBuilding,
        ObjectKind::PostOfficeBuilding,
        ObjectKind::SztakiLandingZone,
        ObjectKind::Pole,
        ObjectKind::LandingZone,
        ObjectKind::Airport,
        ObjectKind::ParkingLot,
        ObjectKind::Drone,
    ];

    /// Element tag used for this kind in the serialized scene.
    pub fn xml_tag(self) -> &'static str {
        match self {
            ObjectKind::HospitalBuilding => "Hospital",
            ObjectKind::PostOfficeBuilding => "PostOffice",
            ObjectKind::SztakiLandingZone => "SztakiLandingZone",
            ObjectKind::Pole => "Pole",
            ObjectKind::LandingZone => "LandingZone",
            ObjectKind::Airport => "Airport",
            ObjectKind::ParkingLot => "ParkingLot",
            ObjectKind::Drone => "Drone",
        }
    }

    /// Whether objects of this kind receive their pose from the capture feed.
    pub fn is_drone(self) -> bool {
        matches!(self, ObjectKind::Drone)
    }
}

/// A placed entity in the scene.
///
/// Static objects keep the pose they were created with; `Drone`-kind objects
/// have their pose overwritten by the ingestion loop once bound to a rigid
/// body. `orientation` is kept normalized at all times.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub kind: ObjectKind,
    pub name: String,
    pub position: Vector3<f64>,
    pub orientation: Quaternion<f64>,
}

impl SceneObject {
    /// Create an object at the given position with identity orientation.
    pub fn new(kind: ObjectKind, name: impl Into<String>, position: Vector3<f64>) -> Self {
        Self {
            kind,
            name: name.into(),
            position,
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }

    /// Create an object with an explicit orientation (renormalized on entry).
    pub fn with_orientation(
        kind: ObjectKind,
        name: impl Into<String>,
        position: Vector3<f64>,
        orientation: Quaternion<f64>,
    ) -> Self {
        let mut object = Self::new(kind, name, position);
        object.set_pose(position, orientation);
        object
    }

    /// Overwrite position and orientation, renormalizing the quaternion to
    /// absorb numeric drift from the capture feed.
    pub fn set_pose(&mut self, position: Vector3<f64>, orientation: Quaternion<f64>) {
        self.position = position;
        self.orientation = normalize_or_identity(orientation);
    }
}

/// Renormalize a quaternion, substituting identity for degenerate input
/// (zero magnitude or non-finite components) instead of producing NaNs.
pub(crate) fn normalize_or_identity(q: Quaternion<f64>) -> Quaternion<f64> {
    let mag2 = q.magnitude2();
    if mag2 > 0.0 && mag2.is_finite() {
        q / mag2.sqrt()
    } else {
        log::debug!("degenerate quaternion {:?} replaced with identity", q);
        Quaternion::new(1.0, 0.0, 0.0, 0.0)
    }
}
