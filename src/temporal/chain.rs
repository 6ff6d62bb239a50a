//! Temporal chain: year-ordered observations of one object.

use crate::core::SourceId;

/// What an observation says about the object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObservationKind {
    /// Registry record of the construction year
    RegistryStart {
        /// Priority rank of the registry source (lower wins)
        priority: u8,
    },
    /// Registry record of the demolition year
    RegistryEnd {
        /// Priority rank of the registry source (lower wins)
        priority: u8,
    },
    /// Map snapshot shows the object
    Present {
        /// Independence key (map sheet or source id)
        group: String,
    },
    /// Map snapshot covers the location but does not show the object
    Absent,
    /// Object exists in the modern baseline
    BaselinePresent,
    /// Baseline covers the location but lacks the object
    BaselineAbsent,
}

impl ObservationKind {
    /// Evidence that the object existed in that year.
    pub fn is_presence(&self) -> bool {
        matches!(
            self,
            ObservationKind::RegistryStart { .. }
                | ObservationKind::Present { .. }
                | ObservationKind::BaselinePresent
        )
    }

    /// Evidence that the object did not exist in that year.
    pub fn is_absence(&self) -> bool {
        matches!(self, ObservationKind::Absent | ObservationKind::BaselineAbsent)
    }

    fn sort_key(&self) -> u8 {
        match self {
            ObservationKind::RegistryStart { .. } => 0,
            ObservationKind::Present { .. } => 1,
            ObservationKind::BaselinePresent => 2,
            ObservationKind::Absent => 3,
            ObservationKind::BaselineAbsent => 4,
            ObservationKind::RegistryEnd { .. } => 5,
        }
    }
}

/// One dated statement about an object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    /// Year the statement refers to
    pub year: i32,
    /// Source making the statement
    pub source: SourceId,
    /// The statement
    pub kind: ObservationKind,
}

/// Observations of one object, kept sorted by year.
///
/// Built incrementally while the orchestrator walks an object's members
/// and the covering snapshots; discarded after inference.
#[derive(Clone, Debug, Default)]
pub struct TemporalChain {
    observations: Vec<Observation>,
}

impl TemporalChain {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an observation, keeping year order.
    pub fn push(&mut self, year: i32, source: impl Into<SourceId>, kind: ObservationKind) {
        let obs = Observation {
            year,
            source: source.into(),
            kind,
        };
        let key = (obs.year, obs.kind.sort_key());
        let pos = self
            .observations
            .partition_point(|o| (o.year, o.kind.sort_key()) <= key);
        self.observations.insert(pos, obs);
    }

    /// Registry construction record.
    pub fn registry_start(&mut self, year: i32, source: impl Into<SourceId>, priority: u8) {
        self.push(year, source, ObservationKind::RegistryStart { priority });
    }

    /// Registry demolition record.
    pub fn registry_end(&mut self, year: i32, source: impl Into<SourceId>, priority: u8) {
        self.push(year, source, ObservationKind::RegistryEnd { priority });
    }

    /// Snapshot presence confirmation.
    pub fn present(&mut self, year: i32, source: impl Into<SourceId>, group: impl Into<String>) {
        self.push(
            year,
            source,
            ObservationKind::Present {
                group: group.into(),
            },
        );
    }

    /// Snapshot absence confirmation.
    pub fn absent(&mut self, year: i32, source: impl Into<SourceId>) {
        self.push(year, source, ObservationKind::Absent);
    }

    /// Baseline presence (`true`) or absence (`false`).
    pub fn baseline(&mut self, year: i32, source: impl Into<SourceId>, present: bool) {
        let kind = if present {
            ObservationKind::BaselinePresent
        } else {
            ObservationKind::BaselineAbsent
        };
        self.push(year, source, kind);
    }

    /// Observations in year order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Iterate observations in year order.
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// No observations at all.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
