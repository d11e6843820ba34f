use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::edges::{build_edges, EdgeSets};
use crate::interaction::{
    edge_emphasis, highlights, EdgeHighlights, EntityHighlight, InteractionMachine, Transition,
};
use crate::layout::{
    layout, viewport_projection, Guide, LayoutParams, PositionedEntity, StrategyKind,
};
use crate::record::{order_records, Ordinal, Record, RecordError};
use crate::spatial::{Ray, SpatialIndex, DEFAULT_SCREEN_TOLERANCE, DEFAULT_TOLERANCE};

/// Generation number handed out when a record load starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoadTicket(pub u64);

/// Outcome of a full rebuild.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rebuild {
    /// Records rejected while ordering (duplicate ordinals).
    pub dropped: Vec<RecordError>,
    /// Set when the active entity vanished and the state reset to idle.
    pub transition: Option<Transition>,
}

/// Everything a renderer needs to draw one frame of the current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPayload {
    pub strategy: StrategyKind,
    pub guide: Guide,
    pub entities: Vec<PositionedEntity>,
    pub edges: EdgeSets,
    pub highlights: Vec<EntityHighlight>,
    pub edge_highlights: EdgeHighlights,
    pub active: Option<Ordinal>,
}

/// Owns the record set and all state derived from it.
///
/// Any change to records, params or guide recomputes entities, edges and
/// the spatial index together, so they never disagree.
#[derive(Debug)]
pub struct VisualizationSession {
    params: LayoutParams,
    guide: Guide,
    tolerance: f32,
    records: Vec<Record>,
    entities: Vec<PositionedEntity>,
    edges: EdgeSets,
    index: SpatialIndex,
    interaction: InteractionMachine,
    issued: u64,
}

impl Default for VisualizationSession {
    fn default() -> Self {
        Self::new(LayoutParams::default())
    }
}

impl VisualizationSession {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            params,
            guide: Guide::default(),
            tolerance: DEFAULT_TOLERANCE,
            records: Vec::new(),
            entities: Vec::new(),
            edges: EdgeSets::default(),
            index: SpatialIndex::default(),
            interaction: InteractionMachine::new(),
            issued: 0,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self.index = SpatialIndex::build(&self.entities, tolerance);
        self
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn guide(&self) -> &Guide {
        &self.guide
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn entities(&self) -> &[PositionedEntity] {
        &self.entities
    }

    pub fn edges(&self) -> &EdgeSets {
        &self.edges
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn active(&self) -> Option<Ordinal> {
        self.interaction.active()
    }

    pub fn on_active_change<F>(&mut self, f: F)
    where
        F: FnMut(Option<Ordinal>) + Send + Sync + 'static,
    {
        self.interaction.on_active_change(f);
    }

    pub fn set_records(&mut self, records: Vec<Record>) -> Rebuild {
        let (records, dropped) = order_records(records);
        self.records = records;
        Rebuild {
            dropped,
            transition: self.rebuild(),
        }
    }

    pub fn set_params(&mut self, params: LayoutParams) -> Rebuild {
        self.params = params;
        self.rebuild_only()
    }

    pub fn set_strategy(&mut self, kind: StrategyKind) -> Rebuild {
        self.params.strategy = kind;
        self.rebuild_only()
    }

    pub fn set_guide(&mut self, guide: Guide) -> Rebuild {
        self.guide = guide;
        self.rebuild_only()
    }

    pub fn pointer_ray(&mut self, ray: &Ray) -> Option<Transition> {
        let hit = self.index.nearest(ray);
        self.interaction.pointer(hit)
    }

    /// Hit test in viewport pixels, for strategies laid out in screen space.
    pub fn pointer_screen<F>(&mut self, cursor: Vec2, project: F) -> Option<Transition>
    where
        F: Fn(Vec3) -> Option<Vec2>,
    {
        let hit = self
            .index
            .nearest_screen(cursor, DEFAULT_SCREEN_TOLERANCE, project);
        self.interaction.pointer(hit)
    }

    /// Cursor in viewport pixels. Only the golden-angle layout lives in
    /// viewport space; under the helix the cursor is ignored and callers
    /// send a world ray instead.
    pub fn pointer_viewport(&mut self, cursor: Vec2) -> Option<Transition> {
        match self.params.strategy {
            StrategyKind::GoldenAngle => self.pointer_screen(cursor, viewport_projection),
            StrategyKind::Helix => None,
        }
    }

    pub fn pointer_leave(&mut self) -> Option<Transition> {
        self.interaction.leave()
    }

    pub fn payload(&self) -> RenderPayload {
        let active = self.active();
        RenderPayload {
            strategy: self.params.strategy,
            guide: self.guide,
            entities: self.entities.clone(),
            edges: self.edges.clone(),
            highlights: highlights(&self.records, active),
            edge_highlights: edge_emphasis(&self.edges, active),
            active,
        }
    }

    /// Starts a record load. Only the newest ticket may complete.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    pub fn latest_ticket(&self) -> LoadTicket {
        LoadTicket(self.issued)
    }

    /// Applies `records` unless a newer load has started since `ticket` was
    /// issued; a stale completion is discarded and yields `None`.
    pub fn complete_load(&mut self, ticket: LoadTicket, records: Vec<Record>) -> Option<Rebuild> {
        if ticket.0 != self.issued {
            return None;
        }
        Some(self.set_records(records))
    }

    /// Like `complete_load`, but also swaps in the guide that was loaded
    /// alongside the records. One rebuild covers both.
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        guide: Guide,
        records: Vec<Record>,
    ) -> Option<Rebuild> {
        if ticket.0 != self.issued {
            return None;
        }
        self.guide = guide;
        Some(self.set_records(records))
    }

    fn rebuild_only(&mut self) -> Rebuild {
        Rebuild {
            dropped: Vec::new(),
            transition: self.rebuild(),
        }
    }

    fn rebuild(&mut self) -> Option<Transition> {
        self.entities = layout(&self.records, &self.params, &self.guide);
        self.edges = build_edges(&self.entities, &self.records);
        self.index = SpatialIndex::build(&self.entities, self.tolerance);
        let index = &self.index;
        self.interaction.retain(|o| index.position_of(o).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::Highlight;
    use crate::record::Intensity;
    use std::sync::{Arc, Mutex};

    fn records(n: u32) -> Vec<Record> {
        (1..=n)
            .map(|i| Record::new(i, "grief", Intensity::new(0.8)).with_speaker(&format!("s{i}")))
            .collect()
    }

    fn ray_at(session: &VisualizationSession, o: u32) -> Ray {
        let p = session.index().position_of(Ordinal(o)).unwrap();
        Ray::new(p + Vec3::new(0.0, 0.0, 20.0), Vec3::new(0.0, 0.0, -1.0)).unwrap()
    }

    #[test]
    fn rebuild_keeps_derived_state_consistent() {
        let mut s = VisualizationSession::default();
        s.set_records(records(10));
        assert_eq!(s.entities().len(), 10);
        assert_eq!(s.index().len(), 10);
        assert_eq!(s.edges().chronological.len(), 9);

        s.set_strategy(StrategyKind::GoldenAngle);
        assert_eq!(s.entities().len(), 10);
        assert!(s.entities().iter().all(|e| e.position.z == 0.0));
    }

    #[test]
    fn duplicates_are_reported_and_dropped() {
        let mut s = VisualizationSession::default();
        let mut recs = records(3);
        recs.push(Record::new(2, "hope", Intensity::new(0.1)));
        let out = s.set_records(recs);
        assert_eq!(out.dropped.len(), 1);
        assert_eq!(s.records().len(), 3);
    }

    #[test]
    fn pointer_ray_drives_payload_highlights() {
        let mut s = VisualizationSession::default();
        s.set_records(records(10));
        let t = s.pointer_ray(&ray_at(&s, 5)).unwrap();
        assert_eq!(t.activated, Some(Ordinal(5)));
        assert!(s.pointer_ray(&ray_at(&s, 5)).is_none());

        let payload = s.payload();
        assert_eq!(payload.active, Some(Ordinal(5)));
        let h = |o: u32| {
            payload
                .highlights
                .iter()
                .find(|h| h.ordinal == Ordinal(o))
                .unwrap()
                .highlight
        };
        assert_eq!(h(5), Highlight::Active);
        // every record shares the category
        assert_eq!(h(1), Highlight::Related);

        assert!(s.pointer_leave().is_some());
        assert_eq!(s.payload().active, None);
    }

    #[test]
    fn active_entity_vanishing_resets_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut s = VisualizationSession::default();
        s.on_active_change(move |o| sink.lock().unwrap().push(o));
        s.set_records(records(10));
        s.pointer_ray(&ray_at(&s, 9));

        let out = s.set_records(records(5));
        assert_eq!(
            out.transition,
            Some(Transition {
                deactivated: Some(Ordinal(9)),
                activated: None
            })
        );
        assert_eq!(s.active(), None);
        assert_eq!(*seen.lock().unwrap(), vec![Some(Ordinal(9)), None]);

        // still present after a rebuild: no notification
        s.pointer_ray(&ray_at(&s, 2));
        assert!(s.set_guide(Guide::default()).transition.is_none());
        assert_eq!(s.active(), Some(Ordinal(2)));
    }

    #[test]
    fn stale_loads_are_discarded() {
        let mut s = VisualizationSession::default();
        let first = s.begin_load();
        let second = s.begin_load();
        assert!(second > first);

        assert!(s.complete_load(second, records(4)).is_some());
        assert!(s.complete_load(first, records(9)).is_none());
        assert_eq!(s.records().len(), 4);
        assert_eq!(s.latest_ticket(), second);
    }

    #[test]
    fn golden_layout_hovers_by_viewport_cursor() {
        let mut s = VisualizationSession::default();
        s.set_records(records(10));
        let p = s.index().position_of(Ordinal(4)).unwrap();
        let cursor = Vec2::new(p.x, p.y);
        // the helix cannot be picked from a bare cursor
        assert!(s.pointer_viewport(cursor).is_none());

        s.set_strategy(StrategyKind::GoldenAngle);
        let p = s.index().position_of(Ordinal(4)).unwrap();
        let t = s.pointer_viewport(Vec2::new(p.x + 3.0, p.y)).unwrap();
        assert_eq!(t.activated, Some(Ordinal(4)));
        assert!(s.pointer_viewport(Vec2::new(p.x, p.y)).is_none());

        let t = s.pointer_viewport(Vec2::new(-500.0, -500.0)).unwrap();
        assert_eq!(t.deactivated, Some(Ordinal(4)));
        assert_eq!(s.active(), None);
    }

    #[test]
    fn apply_load_swaps_guide_and_records_together() {
        let mut s = VisualizationSession::default();
        let stale = s.begin_load();
        let ticket = s.begin_load();
        let tall = Guide::fit(Vec3::new(-1.0, -3.0, -1.0), Vec3::new(1.0, 3.0, 1.0), 5.0).unwrap();

        assert!(s.apply_load(stale, tall, records(9)).is_none());
        assert_eq!(s.guide(), &Guide::default());
        assert!(s.records().is_empty());

        assert!(s.apply_load(ticket, tall, records(3)).is_some());
        assert_eq!(s.guide(), &tall);
        assert_eq!(s.entities().len(), 3);
    }

    #[test]
    fn empty_session_is_inert() {
        let mut s = VisualizationSession::default();
        s.set_records(Vec::new());
        assert!(s.entities().is_empty());
        assert_eq!(s.edges().total(), 0);
        let ray = Ray::new(Vec3::Z, -Vec3::Z).unwrap();
        assert!(s.pointer_ray(&ray).is_none());
        assert!(s.payload().highlights.is_empty());
    }
}
