use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::edges::{EdgeSet, EdgeSetKind, EdgeSets};
use crate::record::{Ordinal, Record};

pub const ACTIVE_SIZE_SCALE: f32 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "ordinal", rename_all = "snake_case")]
pub enum InteractionState {
    #[default]
    Idle,
    Active(Ordinal),
}

impl InteractionState {
    pub fn active(self) -> Option<Ordinal> {
        match self {
            Self::Idle => None,
            Self::Active(o) => Some(o),
        }
    }

    fn from_hit(hit: Option<Ordinal>) -> Self {
        hit.map_or(Self::Idle, Self::Active)
    }
}

/// One change of the active entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub deactivated: Option<Ordinal>,
    pub activated: Option<Ordinal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    Normal,
    Active,
    Related,
    Dimmed,
}

impl Highlight {
    pub fn opacity_factor(self) -> f32 {
        match self {
            Self::Normal | Self::Active | Self::Related => 0.95,
            Self::Dimmed => 0.25,
        }
    }

    pub fn size_scale(self) -> f32 {
        match self {
            Self::Active => ACTIVE_SIZE_SCALE,
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeEmphasis {
    Normal,
    Emphasized,
    Muted,
}

pub type Observer = Box<dyn FnMut(Option<Ordinal>) + Send + Sync>;

/// Hover state with hysteresis: repeated hits on the same entity (or
/// repeated misses) are no-ops.
#[derive(Default)]
pub struct InteractionMachine {
    state: InteractionState,
    observer: Option<Observer>,
}

impl fmt::Debug for InteractionMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionMachine")
            .field("state", &self.state)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn active(&self) -> Option<Ordinal> {
        self.state.active()
    }

    /// Registers the callback fired once per transition with the new active
    /// entity. Replaces any earlier observer.
    pub fn on_active_change<F>(&mut self, f: F)
    where
        F: FnMut(Option<Ordinal>) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(f));
    }

    pub fn pointer(&mut self, hit: Option<Ordinal>) -> Option<Transition> {
        let next = InteractionState::from_hit(hit);
        if next == self.state {
            return None;
        }
        let transition = Transition {
            deactivated: self.state.active(),
            activated: next.active(),
        };
        self.state = next;
        if let Some(observer) = self.observer.as_mut() {
            observer(transition.activated);
        }
        Some(transition)
    }

    pub fn leave(&mut self) -> Option<Transition> {
        self.pointer(None)
    }

    /// Drops the active entity if it is not among `present`.
    pub fn retain(&mut self, present: impl Fn(Ordinal) -> bool) -> Option<Transition> {
        match self.state {
            InteractionState::Active(o) if !present(o) => self.pointer(None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHighlight {
    pub ordinal: Ordinal,
    pub highlight: Highlight,
}

/// Highlight for every record, in ordinal order.
///
/// `records` must be sorted by ordinal; chronological neighbors are the
/// adjacent records in that order.
pub fn highlights(records: &[Record], active: Option<Ordinal>) -> Vec<EntityHighlight> {
    let tag = |r: &Record, highlight| EntityHighlight {
        ordinal: r.ordinal,
        highlight,
    };

    let Some(pos) = active.and_then(|a| records.iter().position(|r| r.ordinal == a)) else {
        return records.iter().map(|r| tag(r, Highlight::Normal)).collect();
    };

    let focus = &records[pos];
    let speaker = focus.speaker_key();
    let category = focus.category_key();

    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let h = if i == pos {
                Highlight::Active
            } else if i + 1 == pos
                || i == pos + 1
                || r.category_key() == category
                || r.speaker_key() == speaker
            {
                Highlight::Related
            } else {
                Highlight::Dimmed
            };
            tag(r, h)
        })
        .collect()
}

/// Emphasis per edge, parallel to each set's `edges`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeHighlights {
    pub chronological: Vec<EdgeEmphasis>,
    pub by_speaker: Vec<EdgeEmphasis>,
    pub by_category: Vec<EdgeEmphasis>,
}

impl EdgeHighlights {
    pub fn get(&self, kind: EdgeSetKind) -> &[EdgeEmphasis] {
        match kind {
            EdgeSetKind::Chronological => &self.chronological,
            EdgeSetKind::BySpeaker => &self.by_speaker,
            EdgeSetKind::ByCategory => &self.by_category,
        }
    }
}

pub fn edge_emphasis(sets: &EdgeSets, active: Option<Ordinal>) -> EdgeHighlights {
    let Some(a) = active else {
        let normal = |set: &EdgeSet| vec![EdgeEmphasis::Normal; set.len()];
        return EdgeHighlights {
            chronological: normal(&sets.chronological),
            by_speaker: normal(&sets.by_speaker),
            by_category: normal(&sets.by_category),
        };
    };

    let mark = |hit: bool| {
        if hit {
            EdgeEmphasis::Emphasized
        } else {
            EdgeEmphasis::Muted
        }
    };
    // whole group lights up, not just the edges touching the active entity
    let grouped = |set: &EdgeSet| {
        let members: HashSet<Ordinal> = set
            .group_of(a)
            .map(|g| g.members.iter().copied().collect())
            .unwrap_or_default();
        set.edges
            .iter()
            .map(|e| mark(members.contains(&e.from) && members.contains(&e.to)))
            .collect()
    };

    EdgeHighlights {
        chronological: sets
            .chronological
            .edges
            .iter()
            .map(|e| mark(e.touches(a)))
            .collect(),
        by_speaker: grouped(&sets.by_speaker),
        by_category: grouped(&sets.by_category),
    }
}
