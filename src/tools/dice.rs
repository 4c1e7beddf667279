//! roll_dice tool - standard `NdM` dice notation

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;

use super::Tool;
use crate::error::{Result, RoutrError};

const MAX_DICE: u32 = 100;
const MAX_SIDES: u32 = 1000;
const MAX_REPEATS: u32 = 20;

static NOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d*)\s*d\s*(\d+)\s*(?:x\s*(\d+))?\s*$").expect("dice notation regex is valid")
});

/// A parsed dice expression: `count` dice with `sides` faces, rolled `repeats` times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    pub count: u32,
    pub sides: u32,
    pub repeats: u32,
}

impl DiceRoll {
    /// Roll every repeat, returning the individual dice of each
    pub fn roll_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Vec<u32>> {
        (0..self.repeats)
            .map(|_| (0..self.count).map(|_| rng.random_range(1..=self.sides)).collect())
            .collect()
    }

    /// Render rolls as one line per repeat
    pub fn describe(&self, rolls: &[Vec<u32>]) -> String {
        rolls
            .iter()
            .enumerate()
            .map(|(i, dice)| {
                let total: u32 = dice.iter().sum();
                let faces: Vec<String> = dice.iter().map(|d| d.to_string()).collect();
                format!("Roll {} ({}): [{}] = {}", i + 1, self, faces.join(", "), total)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

impl FromStr for DiceRoll {
    type Err = RoutrError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || RoutrError::Tool(format!("Invalid dice notation: '{}' (expected e.g. 2d6 or d20 x3)", s));

        let caps = NOTATION.captures(s).ok_or_else(invalid)?;
        let parse = |idx: usize, default: u32| -> Result<u32> {
            match caps.get(idx).map(|m| m.as_str()).filter(|m| !m.is_empty()) {
                Some(text) => text.parse::<u32>().map_err(|_| invalid()),
                None => Ok(default),
            }
        };

        let roll = DiceRoll {
            count: parse(1, 1)?,
            sides: parse(2, 0)?,
            repeats: parse(3, 1)?,
        };

        if !(1..=MAX_DICE).contains(&roll.count)
            || !(2..=MAX_SIDES).contains(&roll.sides)
            || !(1..=MAX_REPEATS).contains(&roll.repeats)
        {
            return Err(invalid());
        }

        Ok(roll)
    }
}

/// Roll dice from notation such as `2d6`, `d20`, or `3d8 x2`
pub struct RollDiceTool;

#[async_trait]
impl Tool for RollDiceTool {
    fn name(&self) -> &'static str {
        "roll_dice"
    }

    fn description(&self) -> &'static str {
        "Roll dice using NdM notation, optionally repeated with xK (e.g. '2d6', 'd20 x3')"
    }

    async fn invoke(&self, query: &str) -> Result<String> {
        let roll: DiceRoll = query.parse()?;
        let rolls = roll.roll_with(&mut rand::rng());
        Ok(roll.describe(&rolls))
    }
}
