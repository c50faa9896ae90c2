//! Optional match commentary and pairing suggestions from a text-generation service.
//!
//! Nothing here touches tournament state: prompts are built from already-stored data and
//! a failed call only means the commentary is not shown.

mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};

use crate::models::{GameMatch, MatchAction, Team, TournamentError};
use async_trait::async_trait;

/// Capability interface for a text-completion backend.
#[async_trait]
pub trait NarrativeService: Send + Sync {
    /// Complete `prompt`. Failures come back as `TournamentError::NarrativeService`.
    async fn generate(&self, prompt: &str) -> Result<String, TournamentError>;
}

/// Backslash-escape markdown emphasis characters in user-supplied names.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '~') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Prompt asking for commentary on a completed match.
pub fn match_analysis_prompt(game: &GameMatch) -> Result<String, TournamentError> {
    game.status.apply(MatchAction::Analyze)?;
    let score = game.score.as_ref().ok_or(TournamentError::InvalidMatchState {
        status: game.status,
        action: MatchAction::Analyze,
    })?;

    let t1 = &game.team1;
    let t2 = &game.team2;
    let team1_name = escape_markdown(&t1.team_name);
    let team2_name = escape_markdown(&t2.team_name);
    let (winner, loser) = if score.winner_team_id == t1.team_id {
        (&team1_name, &team2_name)
    } else {
        (&team2_name, &team1_name)
    };

    Ok(format!(
        "Analyze the following tennis match and provide insightful commentary.

Match Details:
Team 1: {team1_name} (Players: {t1p1} and {t1p2}, Combined Handicap: {t1sum})
Team 2: {team2_name} (Players: {t2p1} and {t2p2}, Combined Handicap: {t2sum})
Final Score: {score} (Winner: {winner}, Loser: {loser})

Consider the following for your analysis:
1. **Handicap Expectation**: Given their handicaps, which team was theoretically expected to perform better or worse? A lower handicap sum indicates a stronger team.
   * Team 1's combined handicap: {t1sum}
   * Team 2's combined handicap: {t2sum}
2. **Actual Outcome vs. Expectation**: Did the match outcome align with the handicap expectations? Were there any upsets?
3. **Performance Highlights**: Based on the score, what can be inferred about key moments? Were there dominant sets, close sets, or comebacks?
4. **Overall Match Summary**: Provide a concise summary of the match, highlighting its most notable aspects.

Structure your analysis clearly with headings for each point. Be concise and professional.
",
        t1p1 = escape_markdown(&t1.player1_name),
        t1p2 = escape_markdown(&t1.player2_name),
        t2p1 = escape_markdown(&t2.player1_name),
        t2p2 = escape_markdown(&t2.player2_name),
        t1sum = t1.handicap_sum,
        t2sum = t2.handicap_sum,
        score = score.final_score_string,
    ))
}

/// Prompt asking for one round of balanced pairings between the current teams.
pub fn optimal_pairings_prompt(teams: &[Team]) -> Result<String, TournamentError> {
    if teams.len() < 2 {
        return Err(TournamentError::InvalidScheduleConfig(
            "need at least 2 teams to suggest pairings".into(),
        ));
    }
    let team_lines: Vec<String> = teams
        .iter()
        .map(|t| {
            format!(
                "- {} (Players: {}, {}, Combined Handicap: {})",
                escape_markdown(&t.name),
                escape_markdown(&t.player1_name),
                escape_markdown(&t.player2_name),
                t.handicap_sum
            )
        })
        .collect();

    Ok(format!(
        "You are an expert tennis tournament scheduler. Given the following teams and their combined handicaps, suggest the most optimal pairings for a round of doubles matches. The goal is to create competitive and balanced matches where possible, but also to ensure variety.

Teams:
{teams}

Guidelines for Optimal Pairings:
1. **Balance**: Try to pair teams with similar combined handicaps for competitive matches.
2. **Variety**: Try to mix up who plays whom.
3. **Format**: Suggest as many unique matches as possible for one round. Each team should ideally play once in this round.
4. **Output**: List the pairings clearly, indicating the teams involved and their combined handicaps, with a brief rationale based on handicaps for each match.
5. **Structure**: Provide the pairings in a clear, readable list format.
",
        teams = team_lines.join("\n")
    ))
}
