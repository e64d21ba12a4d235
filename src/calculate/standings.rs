//! Swiss standings per draft.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use super::to_percent;
use crate::models::{
    DraftId, MatchKind, MatchRecord, Outcome, PlayerId, SeasonCalendar, SeasonId, Seat,
    StandingsRow, UNKNOWN_SEASON_ID,
};

/// Match points for a match win or bye.
pub const MATCH_WIN_POINTS: u32 = 3;
/// Match points for a drawn match.
pub const MATCH_DRAW_POINTS: u32 = 1;
/// Game points for a game win.
pub const GAME_WIN_POINTS: u32 = 3;
/// Game points for a drawn game.
pub const GAME_DRAW_POINTS: u32 = 1;
/// Lower bound applied to each opponent's MWP and GWP.
pub const OPPONENT_FLOOR: f64 = 0.33;

/// A bye counts as a 2-0 match win.
const BYE_GAMES: u32 = 2;

/// Accumulated results of one player at one draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub match_points: u32,
    pub game_points: u32,
    pub matches_played: u32,
    pub games_played: u32,
    pub byes: u32,
    pub opponents: BTreeSet<PlayerId>,
}

impl PlayerStats {
    fn record_bye(&mut self) {
        self.match_points += MATCH_WIN_POINTS;
        self.game_points += BYE_GAMES * GAME_WIN_POINTS;
        self.games_played += BYE_GAMES;
        self.matches_played += 1;
        self.byes += 1;
    }

    fn record_match(&mut self, m: &MatchRecord, seat: Seat) {
        self.matches_played += 1;
        self.games_played += m.total_games();
        self.game_points += m.wins(seat) * GAME_WIN_POINTS + m.draws * GAME_DRAW_POINTS;
        self.match_points += match m.outcome(seat) {
            Outcome::Win => MATCH_WIN_POINTS,
            Outcome::Draw => MATCH_DRAW_POINTS,
            Outcome::Loss => 0,
        };
        self.opponents.insert(m.player(seat.other()).clone());
    }

    /// Match-win fraction, 0 when no matches were played.
    pub fn mwp(&self) -> f64 {
        ratio(self.match_points, self.matches_played * MATCH_WIN_POINTS)
    }

    /// Game-win fraction, 0 when no games were played.
    pub fn gwp(&self) -> f64 {
        ratio(self.game_points, self.games_played * GAME_WIN_POINTS)
    }
}

fn ratio(points: u32, max_points: u32) -> f64 {
    if max_points == 0 {
        0.0
    } else {
        points as f64 / max_points as f64
    }
}

/// (season, draft, player)
pub type StatsKey = (SeasonId, DraftId, PlayerId);

fn stats_entry<'a>(
    stats: &'a mut BTreeMap<StatsKey, PlayerStats>,
    season: &SeasonId,
    m: &MatchRecord,
    seat: Seat,
) -> &'a mut PlayerStats {
    stats
        .entry((season.clone(), m.draft_id.clone(), m.player(seat).clone()))
        .or_default()
}

/// Accumulate per-player stats, resolving each match's season from its draft date.
pub fn accumulate_player_stats(
    matches: &[MatchRecord],
    calendar: &SeasonCalendar,
) -> BTreeMap<StatsKey, PlayerStats> {
    let mut stats: BTreeMap<StatsKey, PlayerStats> = BTreeMap::new();
    let mut last_season: Option<SeasonId> = None;

    for m in matches {
        let season = match calendar.resolve_draft(&m.draft_id) {
            Some(season) => {
                last_season = Some(season.clone());
                season
            }
            None => {
                let fallback = last_season.clone().unwrap_or_else(|| {
                    if m.season_id.is_empty() {
                        SeasonId::from(UNKNOWN_SEASON_ID)
                    } else {
                        m.season_id.clone()
                    }
                });
                warn!(
                    "Draft ID {:?} is not a YYYYMMDD date, using season {}",
                    m.draft_id.as_str(),
                    fallback
                );
                fallback
            }
        };

        match m.kind() {
            MatchKind::Bye(seat) => stats_entry(&mut stats, &season, m, seat).record_bye(),
            MatchKind::Played => {
                for seat in [Seat::Player1, Seat::Player2] {
                    stats_entry(&mut stats, &season, m, seat).record_match(m, seat);
                }
            }
        }
    }

    stats
}

/// Mean of floored opponent metrics over opponents with at least one match
/// and one game. 0 when there are none.
fn opponent_average<F>(
    stats: &BTreeMap<StatsKey, PlayerStats>,
    season: &SeasonId,
    draft: &DraftId,
    player: &PlayerStats,
    metric: F,
) -> f64
where
    F: Fn(&PlayerStats) -> f64,
{
    let values: Vec<f64> = player
        .opponents
        .iter()
        .filter_map(|opponent| stats.get(&(season.clone(), draft.clone(), opponent.clone())))
        .filter(|opp| opp.matches_played > 0 && opp.games_played > 0)
        .map(|opp| metric(opp).max(OPPONENT_FLOOR))
        .collect();

    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Descending comparison on the ranking tuple (match points, OMP, GWP, OGP).
fn compare_rank(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.match_points
        .cmp(&a.match_points)
        .then_with(|| b.omp.total_cmp(&a.omp))
        .then_with(|| b.gwp.total_cmp(&a.gwp))
        .then_with(|| b.ogp.total_cmp(&a.ogp))
}

/// Sort a draft's rows and assign competition ranks: tied rows share the
/// best rank, and the next row ranks one past the number of rows above it.
fn assign_standings(rows: &mut [StandingsRow]) {
    rows.sort_by(|a, b| compare_rank(a, b).then_with(|| a.player.cmp(&b.player)));

    let mut standing = 0;
    for i in 0..rows.len() {
        if i == 0 || compare_rank(&rows[i - 1], &rows[i]) != Ordering::Equal {
            standing = i as u32 + 1;
        }
        rows[i].standing = standing;
    }
}

/// Compute standings for every (season, draft, player).
///
/// Rows are grouped by season then draft, and sorted by standing within
/// each draft.
pub fn calculate_standings(matches: &[MatchRecord], calendar: &SeasonCalendar) -> Vec<StandingsRow> {
    let stats = accumulate_player_stats(matches, calendar);

    let mut groups: BTreeMap<(&SeasonId, &DraftId), Vec<StandingsRow>> = BTreeMap::new();
    for ((season, draft, player), player_stats) in &stats {
        let omp = opponent_average(&stats, season, draft, player_stats, PlayerStats::mwp);
        let ogp = opponent_average(&stats, season, draft, player_stats, PlayerStats::gwp);

        groups.entry((season, draft)).or_default().push(StandingsRow {
            season_id: season.clone(),
            draft_id: draft.clone(),
            player: player.clone(),
            match_points: player_stats.match_points,
            standing: 0,
            game_points: player_stats.game_points,
            matches_played: player_stats.matches_played,
            games_played: player_stats.games_played,
            byes: player_stats.byes,
            mwp: to_percent(player_stats.mwp()),
            omp: to_percent(omp),
            gwp: to_percent(player_stats.gwp()),
            ogp: to_percent(ogp),
        });
    }

    let draft_count = groups.len();
    let mut standings = Vec::with_capacity(stats.len());
    for (_, mut rows) in groups {
        assign_standings(&mut rows);
        standings.extend(rows);
    }

    info!(
        "Calculated standings for {} players across {} drafts",
        standings.len(),
        draft_count
    );
    standings
}
