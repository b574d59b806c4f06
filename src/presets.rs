//! Built-in rule sets.
//!
//! The four stochastic bushes favour lateral branching over vertical growth.
//! Each starts from `F`, turns by 22.5 degrees and runs two generations.

use crate::grammar::{ProductionRule, RuleSet};

const PRESET_ANGLE: f32 = 22.5;
const PRESET_ITERATIONS: u32 = 2;

fn preset(name: &str, rules: impl IntoIterator<Item = (char, &'static str, f32)>) -> RuleSet {
    RuleSet::new(name, "F")
        .with_angle(PRESET_ANGLE)
        .with_iterations(PRESET_ITERATIONS)
        .with_rules(
            rules
                .into_iter()
                .map(|(p, s, w)| ProductionRule::new(p, s, w)),
        )
}

pub fn classic_bush() -> RuleSet {
    preset(
        "ClassicBush",
        [
            ('X', "F[+X][-X]F[+F]", 0.6),
            ('X', "F[&X][^X]F[-F]", 0.4),
            ('F', "FF", 0.3),
            ('F', "F[+FX][-FX]", 0.4),
            ('F', "F[&F][^F]", 0.3),
        ],
    )
}

pub fn tall_pine() -> RuleSet {
    preset(
        "TallPine",
        [
            ('A', "F[&AFA][-AFA]", 0.6),
            ('A', "F[+A][-A]F", 0.4),
            ('F', "FF", 0.3),
            ('F', "F[+A][-A]", 0.4),
            ('F', "F[&A][^A]", 0.3),
            ('S', "F[-S][+S]S", 1.0),
        ],
    )
}

pub fn ground_cover() -> RuleSet {
    preset(
        "GroundCover_UpwardVariant",
        [
            ('S', "F[+S][-S]FS", 0.7),
            ('S', "F[&S][^S]FS", 0.3),
            ('F', "F[+S][-S]", 0.6),
            ('F', "FS", 0.4),
        ],
    )
}

pub fn wild_asymmetric_bush() -> RuleSet {
    preset(
        "WildAsymmetricBush",
        [
            ('W', "F[++W][--W]F[+W]F", 0.3),
            ('W', "F[&F[W]][^F[W]]F", 0.4),
            ('W', "FF[+W][-W]W", 0.3),
            ('F', "FW", 0.4),
            ('F', "F[+W]F[-W]", 0.3),
            ('F', "F[&W]F[^W]", 0.3),
        ],
    )
}

/// The classic deterministic bracketed plant `F -> F[+F]F[-F]F` at 25 degrees.
pub fn binary_plant() -> RuleSet {
    RuleSet::new("BinaryPlant", "F")
        .with_angle(25.0)
        .with_iterations(2)
        .with_rule(ProductionRule::certain('F', "F[+F]F[-F]F"))
}

/// The stochastic library a generator picks from by default.
pub fn default_library() -> Vec<RuleSet> {
    vec![
        classic_bush(),
        tall_pine(),
        ground_cover(),
        wild_asymmetric_bush(),
    ]
}
