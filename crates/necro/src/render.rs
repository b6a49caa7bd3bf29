#![forbid(unsafe_code)]

//! Plain-text roll results.
//!
//! A line reads `<total> (<dice> + <mod>)`. The line that counts is marked
//! with `*`; with advantage both lines are shown.

use std::fmt::Write as _;

use necro_dice::{MinionRolls, RollLine, RollResult};

fn line(line: &RollLine) -> String {
    let parts: Vec<String> = line
        .dice
        .iter()
        .map(u32::to_string)
        .chain(std::iter::once(line.modifier.to_string()))
        .collect();
    let mark = if line.best { "*" } else { " " };
    format!("{mark}{} ({})", line.total, parts.join(" + "))
}

fn lines(lines: &[RollLine]) -> String {
    lines.iter().map(line).collect::<Vec<_>>().join("   ")
}

/// One attack: to-hit and damage rows.
#[must_use]
pub fn render_roll(result: &RollResult) -> String {
    let crit = if result.is_critical() { "  CRIT" } else { "" };
    format!(
        "  to hit  {}{crit}\n  damage  {}",
        lines(&result.hit_lines()),
        lines(&result.damage_lines())
    )
}

/// A round, grouped under each unit description.
#[must_use]
pub fn render_rolls(rolls: &MinionRolls) -> String {
    if rolls.is_empty() {
        return "No attacks: arm some skeletons or raise some zombies.".to_string();
    }
    let mut out = String::new();
    let mut current: Option<&str> = None;
    for (index, result) in rolls.iter().enumerate() {
        if current != Some(result.desc.as_str()) {
            if current.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "{}", result.desc);
            current = Some(result.desc.as_str());
        }
        let _ = writeln!(out, " #{}", index + 1);
        out.push_str(&render_roll(result));
        out.push('\n');
    }
    out
}
