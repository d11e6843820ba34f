use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::color::Color;
use crate::layout::PositionedEntity;
use crate::record::{Ordinal, Record};

/// Speaker threads use a lighter tint of the earlier endpoint's color.
pub const SPEAKER_LIGHTEN: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeSetKind {
    Chronological,
    BySpeaker,
    ByCategory,
}

impl EdgeSetKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Chronological => "chronological",
            Self::BySpeaker => "by-speaker",
            Self::ByCategory => "by-category",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blending {
    Normal,
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub width: f32,
    pub opacity: f32,
    /// Dash and gap lengths; `None` draws a solid line.
    pub dash: Option<[f32; 2]>,
    pub blending: Blending,
}

impl EdgeStyle {
    pub fn for_kind(kind: EdgeSetKind) -> Self {
        match kind {
            EdgeSetKind::Chronological => Self {
                width: 1.0,
                opacity: 0.35,
                dash: None,
                blending: Blending::Normal,
            },
            EdgeSetKind::BySpeaker => Self {
                width: 1.4,
                opacity: 0.28,
                dash: Some([6.0, 6.0]),
                blending: Blending::Normal,
            },
            EdgeSetKind::ByCategory => Self {
                width: 1.0,
                opacity: 0.12,
                dash: None,
                blending: Blending::Additive,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: Ordinal,
    pub to: Ordinal,
    pub color: Color,
}

impl Edge {
    pub fn touches(&self, o: Ordinal) -> bool {
        self.from == o || self.to == o
    }
}

/// Members of one group, ascending by ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeGroup {
    pub key: String,
    pub members: Vec<Ordinal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSet {
    pub kind: EdgeSetKind,
    pub style: EdgeStyle,
    pub edges: Vec<Edge>,
    pub groups: Vec<EdgeGroup>,
}

impl EdgeSet {
    pub fn empty(kind: EdgeSetKind) -> Self {
        Self {
            kind,
            style: EdgeStyle::for_kind(kind),
            edges: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn group_of(&self, o: Ordinal) -> Option<&EdgeGroup> {
        self.groups.iter().find(|g| g.members.contains(&o))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSets {
    pub chronological: EdgeSet,
    pub by_speaker: EdgeSet,
    pub by_category: EdgeSet,
}

impl Default for EdgeSets {
    fn default() -> Self {
        Self {
            chronological: EdgeSet::empty(EdgeSetKind::Chronological),
            by_speaker: EdgeSet::empty(EdgeSetKind::BySpeaker),
            by_category: EdgeSet::empty(EdgeSetKind::ByCategory),
        }
    }
}

impl EdgeSets {
    pub fn get(&self, kind: EdgeSetKind) -> &EdgeSet {
        match kind {
            EdgeSetKind::Chronological => &self.chronological,
            EdgeSetKind::BySpeaker => &self.by_speaker,
            EdgeSetKind::ByCategory => &self.by_category,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EdgeSet> {
        [&self.chronological, &self.by_speaker, &self.by_category].into_iter()
    }

    pub fn total(&self) -> usize {
        self.iter().map(EdgeSet::len).sum()
    }
}

struct Node<'a> {
    ordinal: Ordinal,
    color: Color,
    record: &'a Record,
}

/// Builds all three edge sets from positioned entities.
///
/// Entities are matched to their records by ordinal; an entity without a
/// record is ignored.
pub fn build_edges(entities: &[PositionedEntity], records: &[Record]) -> EdgeSets {
    let by_ordinal: HashMap<Ordinal, &Record> = records.iter().map(|r| (r.ordinal, r)).collect();
    let mut nodes: Vec<Node<'_>> = entities
        .iter()
        .filter_map(|e| {
            by_ordinal.get(&e.ordinal).map(|record| Node {
                ordinal: e.ordinal,
                color: e.color,
                record,
            })
        })
        .collect();
    nodes.sort_by_key(|n| n.ordinal);

    EdgeSets {
        chronological: chronological(&nodes),
        by_speaker: by_speaker(&nodes),
        by_category: by_category(&nodes),
    }
}

fn chronological(nodes: &[Node<'_>]) -> EdgeSet {
    let mut set = EdgeSet::empty(EdgeSetKind::Chronological);
    set.edges = nodes
        .windows(2)
        .map(|w| Edge {
            from: w[0].ordinal,
            to: w[1].ordinal,
            color: w[0].color,
        })
        .collect();
    set
}

fn by_speaker(nodes: &[Node<'_>]) -> EdgeSet {
    let mut set = EdgeSet::empty(EdgeSetKind::BySpeaker);
    for (key, members) in group_by(nodes, |n| n.record.speaker_key()) {
        if members.len() < 2 {
            continue;
        }
        for w in members.windows(2) {
            let (a, b) = (&nodes[w[0]], &nodes[w[1]]);
            set.edges.push(Edge {
                from: a.ordinal,
                to: b.ordinal,
                color: a.color.lighten(SPEAKER_LIGHTEN),
            });
        }
        set.groups.push(EdgeGroup {
            key,
            members: members.iter().map(|&i| nodes[i].ordinal).collect(),
        });
    }
    set
}

fn by_category(nodes: &[Node<'_>]) -> EdgeSet {
    let mut set = EdgeSet::empty(EdgeSetKind::ByCategory);
    for (key, members) in group_by(nodes, |n| n.record.category_key().to_string()) {
        if members.len() < 2 {
            continue;
        }
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                set.edges.push(Edge {
                    from: nodes[a].ordinal,
                    to: nodes[b].ordinal,
                    color: nodes[a].color,
                });
            }
        }
        set.groups.push(EdgeGroup {
            key,
            members: members.iter().map(|&i| nodes[i].ordinal).collect(),
        });
    }
    set
}

/// Groups node indices by key, in order of first appearance.
fn group_by<F>(nodes: &[Node<'_>], key: F) -> Vec<(String, Vec<usize>)>
where
    F: Fn(&Node<'_>) -> String,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (i, n) in nodes.iter().enumerate() {
        let k = key(n);
        match slots.get(&k) {
            Some(&slot) => groups[slot].1.push(i),
            None => {
                slots.insert(k.clone(), groups.len());
                groups.push((k, vec![i]));
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout, Guide, LayoutParams};
    use crate::record::Intensity;

    fn build(records: &[Record]) -> EdgeSets {
        let entities = layout(records, &LayoutParams::default(), &Guide::default());
        build_edges(&entities, records)
    }

    fn rec(i: u32, category: &str, speaker: &str) -> Record {
        Record::new(i, category, Intensity::new(0.8)).with_speaker(speaker)
    }

    #[test]
    fn empty_input_gives_empty_sets() {
        let sets = build(&[]);
        assert!(sets.iter().all(EdgeSet::is_empty));
        assert_eq!(sets.total(), 0);
    }

    #[test]
    fn chronological_is_a_path() {
        for n in [1u32, 2, 10, 33] {
            let recs: Vec<_> = (1..=n).map(|i| rec(i, "hope", "Victor")).collect();
            let sets = build(&recs);
            assert_eq!(sets.chronological.len(), n as usize - 1);
            for (i, e) in sets.chronological.edges.iter().enumerate() {
                assert_eq!(e.from, Ordinal(i as u32 + 1));
                assert_eq!(e.to, Ordinal(i as u32 + 2));
            }
        }
    }

    #[test]
    fn shared_category_forms_triangle_distinct_speakers_none() {
        let recs = vec![
            rec(1, "grief", "Victor"),
            rec(2, "grief", "Elizabeth"),
            rec(3, "grief", "Creature"),
        ];
        let sets = build(&recs);
        assert_eq!(sets.by_category.len(), 3);
        assert_eq!(sets.by_speaker.len(), 0);
        assert!(sets.by_speaker.groups.is_empty());
    }

    #[test]
    fn group_sizes_give_expected_counts() {
        // speakers: victor x4, walton x1; categories: dread x4, hope x1
        let recs = vec![
            rec(1, "dread", "Victor"),
            rec(2, "dread", "victor"),
            rec(3, "hope", "Walton"),
            rec(4, "dread", "VICTOR"),
            rec(5, "dread", "Victor"),
        ];
        let sets = build(&recs);
        assert_eq!(sets.by_speaker.len(), 3);
        assert_eq!(sets.by_category.len(), 6);

        let thread: Vec<(u32, u32)> = sets
            .by_speaker
            .edges
            .iter()
            .map(|e| (e.from.0, e.to.0))
            .collect();
        assert_eq!(thread, vec![(1, 2), (2, 4), (4, 5)]);
        assert_eq!(
            sets.by_category.group_of(Ordinal(4)).map(|g| g.key.as_str()),
            Some("dread")
        );
        assert!(sets.by_category.group_of(Ordinal(3)).is_none());
    }

    #[test]
    fn colors_come_from_earlier_endpoint() {
        let recs = vec![rec(1, "grief", "Victor"), rec(2, "hope", "Victor")];
        let sets = build(&recs);
        let grief = crate::color::resolve_color("grief");
        assert_eq!(sets.chronological.edges[0].color, grief);
        assert_eq!(sets.by_speaker.edges[0].color, grief.lighten(SPEAKER_LIGHTEN));
        assert_eq!(sets.by_category.style.blending, Blending::Additive);
        assert_eq!(sets.by_speaker.style.dash, Some([6.0, 6.0]));
    }

    #[test]
    fn input_order_does_not_matter() {
        let recs = vec![rec(3, "grief", "A"), rec(1, "grief", "A"), rec(2, "hope", "B")];
        let entities = layout(&recs, &LayoutParams::default(), &Guide::default());
        let sets = build_edges(&entities, &recs);
        let chrono: Vec<(u32, u32)> = sets
            .chronological
            .edges
            .iter()
            .map(|e| (e.from.0, e.to.0))
            .collect();
        assert_eq!(chrono, vec![(1, 2), (2, 3)]);
        assert_eq!(sets.by_speaker.edges[0].from, Ordinal(1));
    }
}
