//! Turtle interpretation of an expanded symbol string.
//!
//! The turtle walks the string once, left to right. Growth symbols append a
//! [`BranchNode`](crate::tree::BranchNode) under the current parent, turn
//! symbols rotate the heading in the turtle's own frame, and brackets save and
//! restore the full state. Anything else is ignored.
//!
//! Rotations compose on the right (`orientation * delta`): yaw turns about the
//! local Y axis, pitch about local X and roll about local Z. Angles are given
//! in degrees.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{FloraError, Result};
use crate::tree::{BranchId, PlantTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnAxis {
    Yaw,
    Pitch,
    Roll,
}

impl TurnAxis {
    pub fn local_axis(self) -> Vec3 {
        match self {
            TurnAxis::Yaw => Vec3::Y,
            TurnAxis::Pitch => Vec3::X,
            TurnAxis::Roll => Vec3::Z,
        }
    }
}

/// What a single symbol asks the turtle to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurtleCommand {
    Grow,
    /// `sign` is `1.0` or `-1.0`, multiplied with the angle step.
    Turn { axis: TurnAxis, sign: f32 },
    Push,
    Pop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnBinding {
    pub symbol: char,
    pub axis: TurnAxis,
    pub positive: bool,
}

impl TurnBinding {
    const fn new(symbol: char, axis: TurnAxis, positive: bool) -> Self {
        Self {
            symbol,
            axis,
            positive,
        }
    }
}

/// Maps symbols to turtle commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alphabet {
    /// Every symbol here grows one segment.
    pub growth: String,
    pub turns: Vec<TurnBinding>,
    pub push: char,
    pub pop: char,
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            growth: "FGSWA".to_string(),
            turns: vec![
                TurnBinding::new('+', TurnAxis::Yaw, true),
                TurnBinding::new('-', TurnAxis::Yaw, false),
                TurnBinding::new('&', TurnAxis::Pitch, true),
                TurnBinding::new('^', TurnAxis::Pitch, false),
                TurnBinding::new('<', TurnAxis::Roll, true),
                TurnBinding::new('>', TurnAxis::Roll, false),
                TurnBinding::new('/', TurnAxis::Roll, true),
                TurnBinding::new('\\', TurnAxis::Roll, false),
            ],
            push: '[',
            pop: ']',
        }
    }
}

impl Alphabet {
    pub fn command(&self, symbol: char) -> Option<TurtleCommand> {
        if symbol == self.push {
            return Some(TurtleCommand::Push);
        }
        if symbol == self.pop {
            return Some(TurtleCommand::Pop);
        }
        if self.growth.contains(symbol) {
            return Some(TurtleCommand::Grow);
        }
        self.turns
            .iter()
            .find(|b| b.symbol == symbol)
            .map(|b| TurtleCommand::Turn {
                axis: b.axis,
                sign: if b.positive { 1.0 } else { -1.0 },
            })
    }

    pub fn is_growth(&self, symbol: char) -> bool {
        self.growth.contains(symbol)
    }

    /// Number of growth symbols in `symbols`; an upper bound on node count.
    pub fn count_growth(&self, symbols: &str) -> usize {
        symbols.chars().filter(|c| self.is_growth(*c)).count()
    }
}

/// Multiplicative range applied to each segment's length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthJitter {
    pub min: f32,
    pub max: f32,
}

impl Default for LengthJitter {
    fn default() -> Self {
        Self { min: 0.8, max: 1.2 }
    }
}

impl LengthJitter {
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min < 0.0 || self.min > self.max
        {
            return Err(FloraError::InvalidJitter {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }
}

/// Numeric inputs to one interpretation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TurtleParams {
    pub length: f32,
    /// Degrees per turn symbol.
    pub angle_step: f32,
    /// Growth is suppressed once the turtle's y reaches this.
    pub max_height: f32,
    pub length_jitter: Option<LengthJitter>,
    /// Starting position and heading.
    pub origin: Transform,
}

impl Default for TurtleParams {
    fn default() -> Self {
        Self {
            length: 1.0,
            angle_step: 25.0,
            max_height: f32::INFINITY,
            length_jitter: None,
            origin: Transform::IDENTITY,
        }
    }
}

/// Position, heading and attachment point of the turtle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurtleState {
    pub position: Vec3,
    pub orientation: Quat,
    pub parent: Option<BranchId>,
}

impl TurtleState {
    pub fn at(origin: &Transform) -> Self {
        Self {
            position: origin.translation,
            orientation: origin.rotation,
            parent: None,
        }
    }

    pub fn heading(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }
}

/// Builds a [`PlantTree`] from a symbol string.
#[derive(Debug, Clone, Default)]
pub struct TurtleInterpreter {
    params: TurtleParams,
    alphabet: Alphabet,
}

impl TurtleInterpreter {
    pub fn new(params: TurtleParams) -> Self {
        Self {
            params,
            alphabet: Alphabet::default(),
        }
    }

    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    pub fn params(&self) -> &TurtleParams {
        &self.params
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Interprets `symbols` in a single pass.
    ///
    /// Never fails: unknown symbols are skipped, an unmatched pop is ignored
    /// and growth at or above `max_height` is dropped. The random source is
    /// only consulted when length jitter is enabled.
    pub fn build<R: Rng + ?Sized>(&self, symbols: &str, rng: &mut R) -> PlantTree {
        let params = &self.params;
        let mut tree = PlantTree::with_capacity(self.alphabet.count_growth(symbols));
        let mut state = TurtleState::at(&params.origin);
        let mut stack: Vec<TurtleState> = Vec::new();

        for symbol in symbols.chars() {
            let Some(command) = self.alphabet.command(symbol) else {
                continue;
            };
            match command {
                TurtleCommand::Grow => {
                    if state.position.y >= params.max_height {
                        continue;
                    }
                    let length = match &params.length_jitter {
                        Some(jitter) => params.length * jitter.sample(rng),
                        None => params.length,
                    };
                    let id = tree.grow(state.parent, state.position, state.orientation, length);
                    state.position += state.heading() * length;
                    state.parent = Some(id);
                }
                TurtleCommand::Turn { axis, sign } => {
                    let delta = Quat::from_axis_angle(
                        axis.local_axis(),
                        (sign * params.angle_step).to_radians(),
                    );
                    state.orientation = (state.orientation * delta).normalize();
                }
                TurtleCommand::Push => stack.push(state),
                TurtleCommand::Pop => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
            }
        }

        tree
    }
}
