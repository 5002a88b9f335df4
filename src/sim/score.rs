//! Scoring rules and outcome grading

use serde::{Deserialize, Serialize};

use super::entity::ObstacleKind;

/// How a session is won or lost on score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreRule {
    /// Play the clock out; reaching `win_at` by the end wins
    Threshold { win_at: u32 },
    /// Collect `total` items before the clock runs out
    CollectAll { total: u32 },
    /// Graded on hits / spawned when the clock runs out
    Ratio,
}

/// What ended a session by contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hazard {
    Virus,
    Obstacle(ObstacleKind),
}

/// Ratio-based grade tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    Loser,
    Mediocre,
    PrettyGood,
    Kickass,
}

impl Grade {
    /// 100% → Kickass, ≥60% → PrettyGood, ≥30% → Mediocre, else Loser.
    /// Nothing spawned grades as Loser.
    pub fn from_ratio(hits: u32, total: u32) -> Self {
        if total == 0 {
            return Grade::Loser;
        }
        let hits = hits as u64 * 100;
        let total = total as u64;
        if hits >= total * 100 {
            Grade::Kickass
        } else if hits >= total * 60 {
            Grade::PrettyGood
        } else if hits >= total * 30 {
            Grade::Mediocre
        } else {
            Grade::Loser
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Grade::Kickass => "KICKASS!",
            Grade::PrettyGood => "Pretty GOOD!",
            Grade::Mediocre => "MEDIOCRE",
            Grade::Loser => "LOSER!",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Grade::Kickass => "You are a kickassamazin person all around",
            Grade::PrettyGood => "need improvement on your kickassamezingness",
            Grade::Mediocre => "stop being a mediocre loser",
            Grade::Loser => "obviously you suck at life",
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Threshold met by the end of the clock
    Victory,
    /// Every collectible eaten before the clock ran out
    AllCollected { total: u32 },
    /// Clock ran out with some, but not enough, points
    PartialCredit { score: u32 },
    /// Ended without a single point
    ZeroScore,
    /// Touched a hazard
    Busted { hazard: Hazard },
    /// Clock ran out before everything was collected
    TimeUp { score: u32 },
    /// Ratio grading at the end of the clock
    Graded { grade: Grade, hits: u32, total: u32 },
}

impl Outcome {
    pub fn is_win(&self) -> bool {
        match self {
            Outcome::Victory | Outcome::AllCollected { .. } => true,
            Outcome::Graded { grade, .. } => *grade >= Grade::PrettyGood,
            _ => false,
        }
    }

    /// Success percentage for graded outcomes (0 when nothing spawned)
    pub fn percentage(&self) -> Option<u32> {
        match self {
            Outcome::Graded { hits, total, .. } if *total > 0 => {
                Some(((*hits as f32 / *total as f32) * 100.0).round() as u32)
            }
            Outcome::Graded { .. } => Some(0),
            _ => None,
        }
    }

    /// Player-facing line for the end screen
    pub fn message(&self) -> String {
        match self {
            Outcome::Victory => "Congrats".to_string(),
            Outcome::AllCollected { total } => format!("Dood got to eat all {} clouds!", total),
            Outcome::PartialCredit { score } => format!("Time's up! You downloaded {} files!", score),
            Outcome::ZeroScore => "why you so bad at dis".to_string(),
            Outcome::Busted {
                hazard: Hazard::Virus,
            } => "BUSTED! You downloaded a virus and got caught!".to_string(),
            Outcome::Busted {
                hazard: Hazard::Obstacle(kind),
            } => format!("CRAP!! Dood hit a {}!", kind.as_str()),
            Outcome::TimeUp { score } => format!("Time's up! Dood only ate {} clouds!", score),
            Outcome::Graded { grade, hits, total } => {
                format!("{} You hit {} out of {} doods!", grade.message(), hits, total)
            }
        }
    }
}

impl ScoreRule {
    /// Decide whether the session is over.
    ///
    /// The score test runs before the clock test, so meeting the threshold on
    /// the same tick the timer hits zero is a win.
    pub fn evaluate(&self, score: u32, total: u32, time_expired: bool) -> Option<Outcome> {
        match *self {
            ScoreRule::Threshold { win_at } => {
                if !time_expired {
                    None
                } else if score >= win_at {
                    Some(Outcome::Victory)
                } else if score == 0 {
                    Some(Outcome::ZeroScore)
                } else {
                    Some(Outcome::PartialCredit { score })
                }
            }
            ScoreRule::CollectAll { total: needed } => {
                if score >= needed {
                    Some(Outcome::AllCollected { total: needed })
                } else if time_expired {
                    Some(Outcome::TimeUp { score })
                } else {
                    None
                }
            }
            ScoreRule::Ratio => time_expired.then(|| Outcome::Graded {
                grade: Grade::from_ratio(score, total),
                hits: score,
                total,
            }),
        }
    }

    /// Outcome of touching a hazard; a pointless run gets its own tier
    pub fn on_hazard(&self, score: u32, hazard: Hazard) -> Outcome {
        if score == 0 {
            Outcome::ZeroScore
        } else {
            Outcome::Busted { hazard }
        }
    }
}

/// Running tallies for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreKeeper {
    pub score: u32,
    /// Entities of the scoring kind spawned so far
    pub total_spawned: u32,
}

impl ScoreKeeper {
    pub fn collect(&mut self) -> u32 {
        self.score += 1;
        self.score
    }

    pub fn record_spawn(&mut self) {
        self.total_spawned += 1;
    }

    pub fn evaluate(&self, rule: &ScoreRule, time_expired: bool) -> Option<Outcome> {
        rule.evaluate(self.score, self.total_spawned, time_expired)
    }
}
