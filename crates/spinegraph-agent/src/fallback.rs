//! Bundled scene table used when no CSV can be read.

use spinegraph_core::{Intensity, Record};

pub const NARRATOR: &str = "Narrator";
const MAX_SECONDARY: usize = 3;

struct Scene {
    id: u32,
    title: &'static str,
    emotion: &'static str,
    intensity: f32,
    emotions: &'static [&'static str],
    notes: &'static str,
}

pub fn fallback_records() -> Vec<Record> {
    SCENES
        .iter()
        .map(|s| {
            // authoring scale is tenths; clamp keeps 0.1..=1.0
            let intensity = Intensity::from_scale10((s.intensity * 10.0).round());
            Record::new(s.id, s.emotion, intensity)
                .with_speaker(NARRATOR)
                .with_secondary(s.emotions.iter().take(MAX_SECONDARY))
                .with_text(s.notes, s.title)
        })
        .collect()
}

static SCENES: [Scene; 33] = [
    Scene {
        id: 1,
        title: "Arctic prologue, the ice-trapped ship",
        emotion: "dread",
        intensity: 0.90,
        emotions: &["confusion", "tension", "danger", "suspense", "dread"],
        notes: "Ship stuck in ice, Victor half-frozen, shadowy creature attacking from the blizzard.",
    },
    Scene {
        id: 2,
        title: "Victor on the brink, agreeing to tell his story",
        emotion: "foreboding",
        intensity: 0.70,
        emotions: &["curiosity", "doom"],
        notes: "Victor, mangled and hollow-eyed, admits he created the Creature and begins his confession.",
    },
    Scene {
        id: 3,
        title: "Mother's death caused by William's birth",
        emotion: "grief",
        intensity: 1.00,
        emotions: &["sadness", "unfairness", "sympathy", "grief"],
        notes: "Victor's mother dies in childbirth; father's affection shifts to William and Victor is pushed aside.",
    },
    Scene {
        id: 4,
        title: "Young Victor at medical school",
        emotion: "unease",
        intensity: 0.75,
        emotions: &["unease", "fascination", "discomfort"],
        notes: "Victor excels at anatomy, lingers too long over cadavers with an obsessive, bright-eyed focus.",
    },
    Scene {
        id: 5,
        title: "The reanimation tribunal in Edinburgh",
        emotion: "shock",
        intensity: 0.85,
        emotions: &["shock", "embarrassment"],
        notes: "Victor's reanimation demo horrifies the board; he is expelled as a blasphemer in front of everyone.",
    },
    Scene {
        id: 6,
        title: "Father's rejection",
        emotion: "humiliation",
        intensity: 0.85,
        emotions: &["anger", "empathy", "humiliation"],
        notes: "At home, his father denounces him as a failure and moral disgrace while William remains the golden child.",
    },
    Scene {
        id: 7,
        title: "Dinner with Harlander, first intro of Elizabeth",
        emotion: "anticipation",
        intensity: 0.60,
        emotions: &["intrigue", "romantic tension", "unease", "anticipation"],
        notes: "Harlander offers Victor an isolated tower lab; Victor meets Elizabeth, William's fiancée, and the triangle is seeded.",
    },
    Scene {
        id: 8,
        title: "Constructing the tower lab",
        emotion: "awe",
        intensity: 0.80,
        emotions: &["awe", "loss of control"],
        notes: "Montage of brothers building the lab, lightning rods, anatomical sketches, spine diagrams that echo the project.",
    },
    Scene {
        id: 9,
        title: "Victor's awkward advance toward Elizabeth",
        emotion: "tension",
        intensity: 0.75,
        emotions: &["discomfort", "embarrassment", "tension"],
        notes: "Victor's feelings slip in the lab; Elizabeth senses it, and the air becomes thick with secondhand embarrassment.",
    },
    Scene {
        id: 10,
        title: "Harvesting body parts",
        emotion: "revulsion",
        intensity: 0.90,
        emotions: &["revulsion", "moral unease", "pity", "disgust"],
        notes: "Rain, mud, gallows, battlefields; Victor collects limbs and organs while trying to stay emotionally numb.",
    },
    Scene {
        id: 11,
        title: "Harlander's demand and death",
        emotion: "horror",
        intensity: 0.85,
        emotions: &["horror", "panic", "relief", "moral confusion"],
        notes: "Harlander demands his brain be used; he and Victor struggle and Harlander falls to his death from a high ledge.",
    },
    Scene {
        id: 12,
        title: "The storm and apparent failure",
        emotion: "despair",
        intensity: 0.85,
        emotions: &["dread", "despair", "anticlimax", "pity"],
        notes: "On the stormy night, lightning surges through the stitched body, but it appears lifeless; Victor collapses in despair.",
    },
    Scene {
        id: 13,
        title: "First awakening at dawn",
        emotion: "awe",
        intensity: 0.80,
        emotions: &["surprise", "fear", "awe"],
        notes: "In quiet morning light, a hand twitches and an eye opens; the Creature is alive and unnervingly present.",
    },
    Scene {
        id: 14,
        title: "Training the Creature",
        emotion: "anxiety",
        intensity: 0.80,
        emotions: &["anxiety", "sympathy", "disgust with Victor"],
        notes: "Victor keeps the Creature chained, forcing speech drills and lashing out when he fails; the Creature is confused and sad.",
    },
    Scene {
        id: 15,
        title: "Elizabeth's kindness",
        emotion: "hope",
        intensity: 0.80,
        emotions: &["hope", "warmth", "fear"],
        notes: "Elizabeth approaches gently, introduces herself, and gets the Creature to repeat her name; a fragile bond forms under Victor's shadow.",
    },
    Scene {
        id: 16,
        title: "Victor's lie",
        emotion: "betrayal",
        intensity: 0.95,
        emotions: &["betrayal", "anger", "impending doom", "outrage"],
        notes: "Victor lies that the Creature killed Harlander, sends William and Elizabeth away, and secretly plans to destroy the lab with the Creature inside.",
    },
    Scene {
        id: 17,
        title: "Tower fire and explosion",
        emotion: "horror",
        intensity: 0.95,
        emotions: &["horror", "regret", "shock"],
        notes: "The lab burns as the Creature cries \"Victor\"; Victor hesitates before the tower explodes, mangling his leg and scattering his experiment.",
    },
    Scene {
        id: 18,
        title: "Creature boards the ship",
        emotion: "curiosity",
        intensity: 0.70,
        emotions: &["surprise", "curiosity", "intrigue"],
        notes: "The narrative catches up; the Creature climbs aboard and asserts his right to tell his side in front of the crew.",
    },
    Scene {
        id: 19,
        title: "The escape",
        emotion: "anxiety",
        intensity: 0.80,
        emotions: &["empathy", "anxiety", "survival instinct"],
        notes: "He escapes the ruins through smoke and ash into a dark forest, wounded but alive and driven by survival.",
    },
    Scene {
        id: 20,
        title: "First contact with the hunter's family (unseen)",
        emotion: "loneliness",
        intensity: 0.85,
        emotions: &["melancholy", "yearning", "curiosity", "loneliness"],
        notes: "Hiding in the mill's gears, he watches the family argue, eat, and laugh, feeling what he lacks through cracks in the wall.",
    },
    Scene {
        id: 21,
        title: "Spirit of the forest",
        emotion: "bittersweet",
        intensity: 0.80,
        emotions: &["bittersweet warmth", "pride", "fear"],
        notes: "He chops wood and repairs things at night; the family thanks their unseen guardian, unaware their 'spirit' is the Creature.",
    },
    Scene {
        id: 22,
        title: "Learning language through the wall",
        emotion: "wonder",
        intensity: 0.80,
        emotions: &["wonder", "tenderness", "admiration", "hope"],
        notes: "He mimics the blind grandfather's reading lessons with the granddaughter, slowly sounding out words in the dark.",
    },
    Scene {
        id: 23,
        title: "First direct meeting with the grandpa",
        emotion: "anxiety",
        intensity: 0.75,
        emotions: &["anxiety", "relief", "nervousness", "joy"],
        notes: "After the family leaves for winter, the Creature steps out; the blind man accepts him by the fire, and tension melts into cautious joy.",
    },
    Scene {
        id: 24,
        title: "The blind man's touch",
        emotion: "relief",
        intensity: 0.90,
        emotions: &["emotional release", "empathy", "warmth", "hope"],
        notes: "The blind man touches his face, speaks to him as a person, and gives him language to name his pain.",
    },
    Scene {
        id: 25,
        title: "Discovering the ruins of the lab and Victor's notes",
        emotion: "dread",
        intensity: 0.90,
        emotions: &["dread", "empathy", "anxiety", "shock"],
        notes: "He finds the destroyed tower and Victor's journals, realizing he was assembled, labeled, and abandoned like a project.",
    },
    Scene {
        id: 26,
        title: "Wolves and the blind man's death",
        emotion: "devastation",
        intensity: 1.00,
        emotions: &["heartbreak", "rage", "grief", "devastation"],
        notes: "He fights wolves to protect the blind man, holds him as he dies, and is then driven away in terror by the returning family.",
    },
    Scene {
        id: 27,
        title: "Failed attempts to die",
        emotion: "despair",
        intensity: 1.00,
        emotions: &["existential horror", "claustrophobia", "deep sorrow", "despair"],
        notes: "He tries to freeze, drown, fall—yet his body refuses to die; immortality becomes a prison without companionship.",
    },
    Scene {
        id: 28,
        title: "Night of the wedding",
        emotion: "desperation",
        intensity: 0.90,
        emotions: &["conflict", "tension", "desperation"],
        notes: "At William and Elizabeth's wedding, the Creature confronts Victor, begging for a companion amid the decadence.",
    },
    Scene {
        id: 29,
        title: "Elizabeth's death",
        emotion: "grief",
        intensity: 1.00,
        emotions: &["shock", "grief", "anger", "pity", "sadness", "lost hope"],
        notes: "Victor calls the Creature an abomination and fires; Elizabeth steps between them and is shot.",
    },
    Scene {
        id: 30,
        title: "Wedding chaos",
        emotion: "guilt",
        intensity: 0.85,
        emotions: &["moral clarity", "sorrow", "guilt"],
        notes: "Violence erupts at the celebration; in his last moments, William calls Victor the real monster.",
    },
    Scene {
        id: 31,
        title: "Cave of mourning with Elizabeth",
        emotion: "grief",
        intensity: 1.00,
        emotions: &["unbearable sadness", "sympathy", "grief", "sorrow"],
        notes: "The Creature carries Elizabeth into a cave, trying to comfort her as she dies, cradling her body in the cold.",
    },
    Scene {
        id: 32,
        title: "Long pursuit across the Arctic",
        emotion: "revenge",
        intensity: 0.80,
        emotions: &["fatigue", "revenge", "emptiness"],
        notes: "Victor hunts the Creature across the Arctic with dynamite; both are exhausted shadows driven only by obsession.",
    },
    Scene {
        id: 33,
        title: "Final reconciliation",
        emotion: "bittersweet",
        intensity: 0.80,
        emotions: &["bittersweet", "lingering sadness", "melancholy", "closure"],
        notes: "Back on the ship, Victor apologizes and dies; the Creature forgives him and frees the ship from the ice, ending the cycle of revenge.",
    },
];
