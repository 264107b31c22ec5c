use crate::stats_fetch::TeamStats;

/// Pick the team to display: the preferred name when it matches, otherwise
/// the team with the largest contributed score. A preferred name that
/// matches nothing falls through to the default rule.
pub fn select_team<'a>(
    teams: &'a [TeamStats],
    preferred: Option<&str>,
) -> Option<&'a TeamStats> {
    if teams.is_empty() {
        return None;
    }

    if let Some(wanted) = preferred.map(str::trim).filter(|s| !s.is_empty()) {
        let wanted = wanted.to_lowercase();
        let found = teams.iter().find(|team| {
            team.name
                .as_deref()
                .is_some_and(|name| name.to_lowercase() == wanted)
        });
        if found.is_some() {
            return found;
        }
    }

    // Stable left-to-right max so an all-zero list keeps the first entry.
    let mut best = &teams[0];
    let mut best_score = best.score.unwrap_or(0);
    for team in &teams[1..] {
        let score = team.score.unwrap_or(0);
        if score > best_score {
            best = team;
            best_score = score;
        }
    }
    Some(best)
}
