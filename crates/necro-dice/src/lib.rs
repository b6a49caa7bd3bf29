#![forbid(unsafe_code)]

//! Attack and damage rolls for a necromancer's minions.
//!
//! Every roll takes an explicit [`rand::Rng`], so callers choose between a
//! thread RNG and a seeded one.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for rolling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("a die needs at least one side")]
    InvalidDieSize,

    #[error("{requested} attacks in one round; at most {max} are rolled")]
    TooManyAttacks { requested: u64, max: u32 },
}

/// Most attacks [`roll_minions`] rolls in one round.
pub const MAX_ATTACKS: u32 = 1_000;

/// What a unit attacks with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackProfile {
    pub desc: String,
    pub hit_mod: i32,
    pub damage_mod: i32,
}

impl AttackProfile {
    /// Shortbow: +4 to hit, 1d6+6.
    #[must_use]
    pub fn skeleton() -> Self {
        Self {
            desc: "Skeleton (shortbow)".to_string(),
            hit_mod: 4,
            damage_mod: 6,
        }
    }

    /// Bash: +3 to hit, 1d6+3.
    #[must_use]
    pub fn zombie() -> Self {
        Self {
            desc: "Zombie (bash)".to_string(),
            hit_mod: 3,
            damage_mod: 3,
        }
    }
}

/// Damage dice and advantage for one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollArgs {
    pub sides: u32,
    pub number_of_dice: u32,
    pub advantage: bool,
}

impl RollArgs {
    /// `number_of_dice` d`sides`, no advantage.
    #[must_use]
    pub fn new(sides: u32, number_of_dice: u32) -> Self {
        Self {
            sides,
            number_of_dice,
            advantage: false,
        }
    }

    #[must_use]
    pub fn with_advantage(mut self, advantage: bool) -> Self {
        self.advantage = advantage;
        self
    }
}

/// One rendered line of a roll: the dice kept together plus the modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollLine {
    pub dice: Vec<u32>,
    pub modifier: i32,
    pub total: i32,
    /// This line produced the kept result.
    pub best: bool,
}

/// The outcome of one attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollResult {
    pub desc: String,
    pub hit_mod: i32,
    pub damage_mod: i32,
    pub hit_roll: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adv_hit_roll: Option<u32>,
    pub damage_roll: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adv_damage_roll: Option<Vec<u32>>,
}

fn sum(dice: &[u32]) -> i32 {
    dice.iter().map(|&d| d as i32).sum()
}

impl RollResult {
    /// The kept d20, before modifiers.
    #[must_use]
    pub fn kept_hit_die(&self) -> u32 {
        self.hit_roll.max(self.adv_hit_roll.unwrap_or(0))
    }

    /// Attack total: best d20 plus the hit modifier.
    #[must_use]
    pub fn hit(&self) -> i32 {
        self.kept_hit_die() as i32 + self.hit_mod
    }

    /// Damage total: best damage set plus the damage modifier.
    #[must_use]
    pub fn damage(&self) -> i32 {
        let adv = self.adv_damage_roll.as_deref().map_or(0, sum);
        sum(&self.damage_roll).max(adv) + self.damage_mod
    }

    /// Natural 20 on the kept die.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.kept_hit_die() == 20
    }

    /// Whether a d20 showing `die` is the one that counts.
    #[must_use]
    pub fn is_best_hit(&self, die: u32) -> bool {
        die as i32 + self.hit_mod == self.hit()
    }

    /// To-hit lines: the first roll, then the advantage roll if any.
    #[must_use]
    pub fn hit_lines(&self) -> Vec<RollLine> {
        let hit = self.hit();
        std::iter::once(self.hit_roll)
            .chain(self.adv_hit_roll)
            .map(|die| {
                let total = die as i32 + self.hit_mod;
                RollLine {
                    dice: vec![die],
                    modifier: self.hit_mod,
                    total,
                    best: total == hit,
                }
            })
            .collect()
    }

    /// Damage lines: the first set, then the advantage set if any.
    #[must_use]
    pub fn damage_lines(&self) -> Vec<RollLine> {
        let damage = self.damage();
        std::iter::once(&self.damage_roll)
            .chain(self.adv_damage_roll.as_ref())
            .map(|dice| {
                let total = sum(dice) + self.damage_mod;
                RollLine {
                    dice: dice.clone(),
                    modifier: self.damage_mod,
                    total,
                    best: total == damage,
                }
            })
            .collect()
    }
}

fn roll_damage<R: Rng + ?Sized>(sides: u32, number_of_dice: u32, rng: &mut R) -> Vec<u32> {
    (0..number_of_dice).map(|_| rng.gen_range(1..=sides)).collect()
}

/// Roll one attack: a d20 to hit and the damage dice, each twice with
/// advantage.
pub fn roll<R: Rng + ?Sized>(
    profile: &AttackProfile,
    args: RollArgs,
    rng: &mut R,
) -> Result<RollResult, DiceError> {
    if args.sides == 0 {
        return Err(DiceError::InvalidDieSize);
    }
    let hit_roll = rng.gen_range(1..=20);
    let adv_hit_roll = args.advantage.then(|| rng.gen_range(1..=20));
    let damage_roll = roll_damage(args.sides, args.number_of_dice, rng);
    let adv_damage_roll = args
        .advantage
        .then(|| roll_damage(args.sides, args.number_of_dice, rng));
    Ok(RollResult {
        desc: profile.desc.clone(),
        hit_mod: profile.hit_mod,
        damage_mod: profile.damage_mod,
        hit_roll,
        adv_hit_roll,
        damage_roll,
        adv_damage_roll,
    })
}

/// How many of each minion are on the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinionCounts {
    pub skeletons: u32,
    pub skeleton_weapons: u32,
    pub zombies: u32,
}

impl MinionCounts {
    /// Skeletons holding a weapon.
    #[must_use]
    pub fn attacking_skeletons(&self) -> u32 {
        self.skeletons.min(self.skeleton_weapons)
    }

    /// Unarmed skeletons; each grants one attacker advantage.
    #[must_use]
    pub fn helper_skeletons(&self) -> u32 {
        self.skeletons.saturating_sub(self.skeleton_weapons)
    }
}

/// Every attack of one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinionRolls {
    pub skeleton_roll: Vec<RollResult>,
    pub zombie_roll: Vec<RollResult>,
}

impl MinionRolls {
    /// All attacks, skeletons first.
    pub fn iter(&self) -> impl Iterator<Item = &RollResult> {
        self.skeleton_roll.iter().chain(&self.zombie_roll)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skeleton_roll.is_empty() && self.zombie_roll.is_empty()
    }
}

/// Roll a round for `counts`.
///
/// Armed skeletons attack with shortbows; the first `helper_skeletons` of
/// them roll with advantage. Every zombie attacks. Rounds of more than
/// [`MAX_ATTACKS`] attacks are refused before anything is rolled.
pub fn roll_minions<R: Rng + ?Sized>(counts: MinionCounts, rng: &mut R) -> Result<MinionRolls, DiceError> {
    let requested = u64::from(counts.attacking_skeletons()) + u64::from(counts.zombies);
    if requested > u64::from(MAX_ATTACKS) {
        return Err(DiceError::TooManyAttacks {
            requested,
            max: MAX_ATTACKS,
        });
    }

    let skeleton = AttackProfile::skeleton();
    let zombie = AttackProfile::zombie();
    let helpers = counts.helper_skeletons();

    let skeleton_roll = (0..counts.attacking_skeletons())
        .map(|i| roll(&skeleton, RollArgs::new(6, 1).with_advantage(i < helpers), rng))
        .collect::<Result<Vec<_>, _>>()?;
    let zombie_roll = (0..counts.zombies)
        .map(|_| roll(&zombie, RollArgs::new(6, 1), rng))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MinionRolls {
        skeleton_roll,
        zombie_roll,
    })
}
