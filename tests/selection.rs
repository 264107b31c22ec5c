use fah_terminal::stats_fetch::TeamStats;
use fah_terminal::team_select::select_team;

fn team(name: &str, score: u64) -> TeamStats {
    TeamStats {
        name: Some(name.to_string()),
        score: Some(score),
        ..TeamStats::default()
    }
}

#[test]
fn empty_list_selects_nothing() {
    assert!(select_team(&[], Some("x")).is_none());
    assert!(select_team(&[], None).is_none());
}

#[test]
fn default_rule_takes_largest_contribution() {
    let teams = vec![team("Alpha", 10), team("Beta", 50)];
    let picked = select_team(&teams, None).expect("non-empty list");
    assert_eq!(picked.name.as_deref(), Some("Beta"));
}

#[test]
fn preferred_name_matches_case_insensitively() {
    let teams = vec![team("Alpha", 10), team("Beta", 50)];
    let picked = select_team(&teams, Some("alpha")).expect("non-empty list");
    assert_eq!(picked.name.as_deref(), Some("Alpha"));
}

#[test]
fn unknown_preferred_name_falls_back_to_max_score() {
    let teams = vec![team("Alpha", 10), team("Beta", 50)];
    let picked = select_team(&teams, Some("Gamma")).expect("non-empty list");
    assert_eq!(picked.name.as_deref(), Some("Beta"));
}

#[test]
fn ties_keep_the_first_team_in_list_order() {
    let teams = vec![team("First", 50), team("Second", 50)];
    let picked = select_team(&teams, None).expect("non-empty list");
    assert_eq!(picked.name.as_deref(), Some("First"));
}

#[test]
fn all_zero_scores_keep_the_first_team() {
    let teams = vec![team("First", 0), team("Second", 0)];
    let picked = select_team(&teams, None).expect("non-empty list");
    assert_eq!(picked.name.as_deref(), Some("First"));
}

#[test]
fn missing_scores_count_as_zero() {
    let teams = vec![
        TeamStats {
            name: Some("NoScore".to_string()),
            ..TeamStats::default()
        },
        team("Scored", 1),
    ];
    let picked = select_team(&teams, None).expect("non-empty list");
    assert_eq!(picked.name.as_deref(), Some("Scored"));
}

#[test]
fn nameless_teams_never_match_a_preferred_name() {
    let teams = vec![
        TeamStats {
            score: Some(99),
            ..TeamStats::default()
        },
        team("Named", 1),
    ];
    let picked = select_team(&teams, Some("Named")).expect("non-empty list");
    assert_eq!(picked.name.as_deref(), Some("Named"));
}
