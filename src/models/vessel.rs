use serde::{Deserialize, Serialize};

use super::VesselId;

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Vessel {
    pub id: VesselId,
    pub size: u32,
    pub name: String,
}

// The fleet every board has to deploy before the shooting starts. Ids match sizes.
pub const FLEET: [(VesselId, &str, u32); 5] = [
    (1, "Patrol Boat", 1),
    (2, "Destroyer", 2),
    (3, "Submarine", 3),
    (4, "Battleship", 4),
    (5, "Carrier", 5),
];

/// Read-only vessel reference data shared by every game.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    vessels: Vec<Vessel>,
}

impl Catalog {
    /// The standard five-vessel fleet.
    pub fn standard() -> Self {
        Self::new(
            FLEET
                .iter()
                .map(|&(id, name, size)| Vessel { id, size, name: name.to_string() })
                .collect(),
        )
    }

    pub fn new(mut vessels: Vec<Vessel>) -> Self {
        vessels.sort_by_key(|v| v.id);
        vessels.dedup_by_key(|v| v.id);
        Self { vessels }
    }

    pub fn get(&self, id: VesselId) -> Option<&Vessel> {
        self.vessels.iter().find(|v| v.id == id)
    }

    pub fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    pub fn len(&self) -> usize {
        self.vessels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vessels.is_empty()
    }
}
