//! Rank tiers and the derived gamification status shown next to a user

use std::fmt;

use serde::{Serialize, Serializer};

/// `next_rank` value once the top tier is reached
pub const MAX_LEVEL: &str = "Max Level";

/// Rank tier, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RankTier {
    Pendatang,
    Warga,
    Aktivis,
    Tokoh,
    Sepuh,
    Legenda,
}

impl RankTier {
    /// All tiers in ascending order
    pub const ALL: [RankTier; 6] = [
        Self::Pendatang,
        Self::Warga,
        Self::Aktivis,
        Self::Tokoh,
        Self::Sepuh,
        Self::Legenda,
    ];

    /// Minimum all-time points for the tier
    pub const fn threshold(self) -> i64 {
        match self {
            Self::Pendatang => 0,
            Self::Warga => 100,
            Self::Aktivis => 600,
            Self::Tokoh => 3000,
            Self::Sepuh => 8000,
            Self::Legenda => 20000,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Pendatang => "Pendatang",
            Self::Warga => "Warga",
            Self::Aktivis => "Aktivis",
            Self::Tokoh => "Tokoh",
            Self::Sepuh => "Sepuh",
            Self::Legenda => "Legenda",
        }
    }

    /// Highest tier whose threshold is at or below `points`
    pub fn for_points(points: i64) -> Self {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|tier| points >= tier.threshold())
            .unwrap_or(Self::Pendatang)
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pendatang => Some(Self::Warga),
            Self::Warga => Some(Self::Aktivis),
            Self::Aktivis => Some(Self::Tokoh),
            Self::Tokoh => Some(Self::Sepuh),
            Self::Sepuh => Some(Self::Legenda),
            Self::Legenda => None,
        }
    }
}

impl fmt::Display for RankTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for RankTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Activity label from trailing 7-day points. Cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeeklyLabel {
    OnFire,
    Trending,
    Active,
    Quiet,
}

impl WeeklyLabel {
    pub fn for_points(weekly_points: i64) -> Self {
        match weekly_points {
            p if p >= 100 => Self::OnFire,
            p if p >= 50 => Self::Trending,
            p if p >= 20 => Self::Active,
            _ => Self::Quiet,
        }
    }

    /// Display text; empty for quiet users
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnFire => "🔥 On Fire!",
            Self::Trending => "⚡ Trending",
            Self::Active => "📈 Active",
            Self::Quiet => "",
        }
    }
}

impl Serialize for WeeklyLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Rank and progress derived from all-time points, plus the weekly activity label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GamificationStatus {
    pub rank_name: RankTier,
    pub next_rank: String,
    pub current_points: i64,
    pub target_points: i64,
    pub progress: f64,
    pub weekly_points: i64,
    pub weekly_label: WeeklyLabel,
}

impl GamificationStatus {
    /// Derive the status. Rank depends on `all_time_points` only.
    pub fn calculate(all_time_points: i64, weekly_points: i64) -> Self {
        let tier = RankTier::for_points(all_time_points);
        let (next_rank, target_points, progress) = match tier.next() {
            Some(next) => {
                let target = next.threshold();
                let raw = all_time_points as f64 / target as f64 * 100.0;
                (next.name().to_string(), target, (raw * 100.0).round() / 100.0)
            }
            None => (MAX_LEVEL.to_string(), tier.threshold(), 100.0),
        };

        Self {
            rank_name: tier,
            next_rank,
            current_points: all_time_points,
            target_points,
            progress,
            weekly_points,
            weekly_label: WeeklyLabel::for_points(weekly_points),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RankTier::for_points(0), RankTier::Pendatang);
        assert_eq!(RankTier::for_points(99), RankTier::Pendatang);
        assert_eq!(RankTier::for_points(100), RankTier::Warga);
        assert_eq!(RankTier::for_points(599), RankTier::Warga);
        assert_eq!(RankTier::for_points(600), RankTier::Aktivis);
        assert_eq!(RankTier::for_points(3000), RankTier::Tokoh);
        assert_eq!(RankTier::for_points(7999), RankTier::Tokoh);
        assert_eq!(RankTier::for_points(8000), RankTier::Sepuh);
        assert_eq!(RankTier::for_points(19999), RankTier::Sepuh);
        assert_eq!(RankTier::for_points(20000), RankTier::Legenda);
        assert_eq!(RankTier::for_points(-5), RankTier::Pendatang);
    }

    #[test]
    fn test_progress_rounding() {
        let status = GamificationStatus::calculate(150, 0);
        assert_eq!(status.rank_name, RankTier::Warga);
        assert_eq!(status.next_rank, "Aktivis");
        assert_eq!(status.target_points, 600);
        assert!((status.progress - 25.0).abs() < f64::EPSILON);

        let status = GamificationStatus::calculate(1, 0);
        assert!((status.progress - 1.0).abs() < f64::EPSILON);

        let status = GamificationStatus::calculate(7, 0);
        // 7 / 100 * 100 = 7.000000000000001 before rounding
        assert!((status.progress - 7.0).abs() < f64::EPSILON);

        let status = GamificationStatus::calculate(1000, 0);
        // 1000 / 3000 * 100 = 33.333...
        assert!((status.progress - 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_fresh_user() {
        let status = GamificationStatus::calculate(0, 0);
        assert_eq!(status.rank_name, RankTier::Pendatang);
        assert_eq!(status.next_rank, "Warga");
        assert_eq!(status.target_points, 100);
        assert!(status.progress.abs() < f64::EPSILON);
        assert_eq!(status.weekly_label, WeeklyLabel::Quiet);
    }

    #[test]
    fn test_exactly_at_top_threshold() {
        let status = GamificationStatus::calculate(20_000, 0);
        assert_eq!(status.rank_name, RankTier::Legenda);
        assert_eq!(status.next_rank, MAX_LEVEL);
        assert_eq!(status.target_points, 20_000);
        assert!((status.progress - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_max_level() {
        let status = GamificationStatus::calculate(25_000, 0);
        assert_eq!(status.rank_name, RankTier::Legenda);
        assert_eq!(status.next_rank, MAX_LEVEL);
        assert_eq!(status.target_points, 20_000);
        assert!((status.progress - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weekly_label_never_affects_rank() {
        let status = GamificationStatus::calculate(10, 500);
        assert_eq!(status.rank_name, RankTier::Pendatang);
        assert_eq!(status.weekly_label, WeeklyLabel::OnFire);
    }

    #[test]
    fn test_weekly_label_thresholds() {
        assert_eq!(WeeklyLabel::for_points(100).as_str(), "🔥 On Fire!");
        assert_eq!(WeeklyLabel::for_points(99).as_str(), "⚡ Trending");
        assert_eq!(WeeklyLabel::for_points(50).as_str(), "⚡ Trending");
        assert_eq!(WeeklyLabel::for_points(20).as_str(), "📈 Active");
        assert_eq!(WeeklyLabel::for_points(19).as_str(), "");
    }
}
