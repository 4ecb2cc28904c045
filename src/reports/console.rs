use super::{
    AnalysisReport, EducationCorrelation, SeatSwing, TurnoutLeaders, VoteShareTrend, WomenShare,
};
use crate::analysis::share::{Correlation, ShareShift, DISPLAY_DECIMALS};
use crate::model::election::{display_state, MarginRecord, FIRST_YEAR, LAST_YEAR};
use colored::*;

/// Margins need more precision than other percentages to tell close races apart.
const MARGIN_DECIMALS: usize = 4;
const DETAILED_MARGINS: usize = 5;

/// `12.34%`, or `n/a` when the percentage is undefined.
pub fn percent(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}%", decimals, v),
        None => "n/a".to_string(),
    }
}

pub fn signed(change: i64) -> String {
    if change > 0 {
        format!("+{}", change)
    } else {
        change.to_string()
    }
}

fn signed_points(change: Option<f64>) -> String {
    match change {
        Some(v) if v > 0.0 => format!("+{:.*}", DISPLAY_DECIMALS, v),
        Some(v) => format!("{:.*}", DISPLAY_DECIMALS, v),
        None => "n/a".to_string(),
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// Truncates on characters, not bytes, for fixed-width columns.
fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn heading(question: &str) {
    println!("\n{}", "=".repeat(80).bright_cyan());
    println!("{}", question.bright_white().bold());
    println!("{}", "=".repeat(80).bright_cyan());
}

fn rule() {
    println!("{}", "-".repeat(80));
}

fn answer(text: String) {
    println!("\n{} {}", "✓ ANSWER:".bright_green().bold(), text);
}

pub fn print_report(report: &AnalysisReport) {
    println!("\n{}", "=".repeat(80).bright_cyan());
    println!("{}", "📊 ELECTION INSIGHTS".bright_cyan().bold());
    println!(
        "Indian General Election Data Analysis ({}-{})",
        FIRST_YEAR, LAST_YEAR
    );
    println!(
        "Generated {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    match &report.turnout {
        Some(turnout) => print_turnout(turnout),
        None => {
            heading("a. Which state had the highest voter turnout in the latest general election?");
            println!("{}", "❌ No election data on record".red());
        }
    }
    match &report.seat_change {
        Some(swing) => print_seat_change(swing),
        None => {
            heading("b. Which party gained or lost the most seats between two consecutive elections?");
            println!("{}", "❌ Need at least 2 years of data".red());
        }
    }
    print_women(&report.women);
    print_margins(&report.narrowest_margins);
    print_vote_share(&report.vote_share);
    print_education(&report.education);

    println!("\n{}", "=".repeat(80).bright_cyan());
    println!("{}", "✅ Analysis complete".bright_green().bold());
}

fn print_turnout(turnout: &TurnoutLeaders) {
    heading("a. Which state had the highest voter turnout in the latest general election?");
    println!(
        "\nLatest election year ({}-{}): {}",
        FIRST_YEAR,
        LAST_YEAR,
        turnout.year.to_string().bright_yellow()
    );

    println!("\nTop {} States by Average Voter Turnout:", turnout.states.len());
    rule();
    for (i, state) in turnout.states.iter().enumerate() {
        println!(
            "{}. {:<30} Average Turnout: {} (Max: {}, Min: {}) [{} constituencies]",
            i + 1,
            display_state(&state.state_name),
            percent(state.avg_turnout, DISPLAY_DECIMALS),
            percent(state.max_turnout, DISPLAY_DECIMALS),
            percent(state.min_turnout, DISPLAY_DECIMALS),
            state.constituencies
        );
    }

    match turnout.leader() {
        Some(leader) => answer(format!(
            "{} had the highest voter turnout ({}) in {}",
            display_state(&leader.state_name).bright_green(),
            percent(leader.avg_turnout, DISPLAY_DECIMALS),
            turnout.year
        )),
        None => println!("\n{}", "No turnout figures recorded for this year".yellow()),
    }
}

fn print_seat_change(swing: &SeatSwing) {
    heading("b. Which party gained or lost the most seats between two consecutive elections?");
    println!("\nComparing elections: {} → {}", swing.year1, swing.year2);

    println!("\nTop {} Party Seat Changes:", swing.changes.len());
    rule();
    println!(
        "{:<25} {:<15} {:<15} {:<10}",
        "Party",
        format!("Seats {}", swing.year1),
        format!("Seats {}", swing.year2),
        "Change"
    );
    rule();
    for change in &swing.changes {
        let delta = signed(change.change);
        let delta = if change.change > 0 {
            delta.green()
        } else if change.change < 0 {
            delta.red()
        } else {
            delta.normal()
        };
        println!(
            "{:<25} {:<15} {:<15} {}",
            change.party, change.year1_seats, change.year2_seats, delta
        );
    }

    let (Some(gain), Some(loss), Some(largest)) =
        (&swing.biggest_gain, &swing.biggest_loss, &swing.largest_change)
    else {
        println!("\n{}", "No seats were won in either election".yellow());
        return;
    };

    println!("\n{}", "✓ ANSWER:".bright_green().bold());
    println!(
        "  • Biggest Gain: {} gained {} seats ({} → {} seats)",
        gain.party.bright_green(),
        gain.change,
        gain.year1_seats,
        gain.year2_seats
    );
    println!(
        "  • Biggest Loss: {} lost {} seats ({} → {} seats)",
        loss.party.bright_red(),
        loss.change.abs(),
        loss.year1_seats,
        loss.year2_seats
    );
    println!(
        "  • Largest Absolute Change: {} ({} seats)",
        largest.party.bright_yellow(),
        signed(largest.change)
    );
}

fn print_women(women: &WomenShare) {
    heading("c. What is the percentage of women candidates across all elections?");

    println!("\nOverall Statistics ({}-{}):", FIRST_YEAR, LAST_YEAR);
    rule();
    println!("Total Candidates: {}", women.total_candidates);
    println!(
        "Women Candidates: {} ({})",
        women.women_candidates,
        percent(women.women_percentage, DISPLAY_DECIMALS)
    );
    println!(
        "Men Candidates:   {} ({})",
        women.men_candidates,
        percent(women.men_percentage, DISPLAY_DECIMALS)
    );

    println!("\nYear-wise Breakdown:");
    rule();
    println!(
        "{:<8} {:<12} {:<12} {:<12} {:<10}",
        "Year", "Total", "Women", "Women %", "Trend"
    );
    rule();
    for year in &women.by_year {
        println!(
            "{:<8} {:<12} {:<12} {:<12} {}",
            year.year,
            year.total_candidates,
            year.women_candidates,
            percent(year.women_percentage, DISPLAY_DECIMALS),
            year.trend.map_or("", |t| t.arrow())
        );
    }

    answer(format!(
        "Across all elections ({}-{}), women candidates represent {} of total candidates ({} out of {} candidates)",
        FIRST_YEAR,
        LAST_YEAR,
        percent(women.women_percentage, DISPLAY_DECIMALS).bright_green(),
        women.women_candidates,
        women.total_candidates
    ));
}

fn print_margins(margins: &[MarginRecord]) {
    heading("d. Which constituencies had the narrowest victory margins?");

    println!(
        "\nTop {} Constituencies with Narrowest Victory Margins:",
        margins.len()
    );
    rule();
    println!(
        "{:<6} {:<6} {:<20} {:<30} {:<12} {:<12}",
        "Rank", "Year", "State", "Constituency", "Margin %", "Margin Votes"
    );
    rule();
    for (i, record) in margins.iter().enumerate() {
        let state = display_state(record.state_name.as_deref().unwrap_or_default());
        println!(
            "{:<6} {:<6} {:<20} {:<30} {:<12} {:<12}",
            i + 1,
            record.year,
            clip(&state, 18),
            clip(record.constituency_name.as_deref().unwrap_or_default(), 28),
            percent(record.margin_percentage, MARGIN_DECIMALS),
            optional(record.margin)
        );
    }

    println!("\nDetailed Information (Top {}):", DETAILED_MARGINS);
    rule();
    for (i, record) in margins.iter().take(DETAILED_MARGINS).enumerate() {
        println!(
            "\n{}. {} ({})",
            i + 1,
            optional(record.constituency_name.as_deref()).bright_white().bold(),
            record.year
        );
        println!(
            "   State: {}",
            display_state(record.state_name.as_deref().unwrap_or_default())
        );
        println!(
            "   Winner: {} ({})",
            optional(record.candidate.as_deref()),
            optional(record.party.as_deref())
        );
        println!(
            "   Margin: {} ({} votes)",
            percent(record.margin_percentage, MARGIN_DECIMALS),
            optional(record.margin)
        );
        println!("   Winner Votes: {}", optional(record.votes));
        println!("   Total Valid Votes: {}", optional(record.valid_votes));
    }

    match margins.first() {
        Some(narrowest) => answer(format!(
            "The constituency with the narrowest victory margin is {} ({}) in {} with a margin of {} ({} votes)",
            optional(narrowest.constituency_name.as_deref()).bright_green(),
            narrowest.year,
            display_state(narrowest.state_name.as_deref().unwrap_or_default()),
            percent(narrowest.margin_percentage, MARGIN_DECIMALS),
            optional(narrowest.margin)
        )),
        None => println!("\n{}", "No recorded victory margins".yellow()),
    }
}

fn print_shift(label: &str, shift: &ShareShift) {
    println!(
        "{}: {} → {} ({} change)",
        label,
        percent(shift.first, DISPLAY_DECIMALS),
        percent(shift.last, DISPLAY_DECIMALS),
        signed_points(shift.change)
    );
}

fn print_vote_share(trend: &VoteShareTrend) {
    heading("e. How has the vote share of national vs regional parties changed over time?");

    println!("\nVote Share Trends ({}-{}):", FIRST_YEAR, LAST_YEAR);
    rule();
    println!(
        "{:<8} {:<25} {:<25} {:<15}",
        "Year", "National Parties", "Regional Parties", "Difference"
    );
    println!(
        "{:<8} {:<12} {:<12} {:<12} {:<12} {:<15}",
        "", "% Vote", "Seats", "% Vote", "Seats", "(Nat-Reg)"
    );
    rule();
    for year in &trend.series {
        println!(
            "{:<8} {:>11} {:>10} {:>11} {:>10} {:>13}",
            year.year,
            percent(year.national, DISPLAY_DECIMALS),
            year.national_seats,
            percent(year.regional, DISPLAY_DECIMALS),
            year.regional_seats,
            percent(year.gap(), DISPLAY_DECIMALS)
        );
    }

    let (Some(national), Some(regional)) = (&trend.national, &trend.regional) else {
        println!("\n{}", "No party-type vote totals recorded".yellow());
        return;
    };

    println!("\nTrend Analysis:");
    rule();
    println!("Period: {} → {}", national.first_year, national.last_year);
    print_shift("National Parties", national);
    print_shift("Regional Parties", regional);

    println!("\n{}", "✓ ANSWER:".bright_green().bold());
    for (name, shift) in [("National", national), ("Regional", regional)] {
        println!(
            "  • {} parties vote share changed from {} ({}) to {} ({}), a change of {} percentage points",
            name,
            percent(shift.first, DISPLAY_DECIMALS),
            shift.first_year,
            percent(shift.last, DISPLAY_DECIMALS),
            shift.last_year,
            signed_points(shift.change).bright_yellow()
        );
    }
    if let (Some(nat), Some(reg)) = (national.change, regional.change) {
        if nat.abs() > reg.abs() {
            println!("  • The trend shows a stronger change in National parties' vote share");
        }
    }
}

fn print_education(education: &EducationCorrelation) {
    heading("f. What correlation exists between education level and the winning chances of candidates?");

    let (Some(column), Some(summary)) = (education.column, &education.summary) else {
        println!("\n{}", "❌ Education data is NOT available in the dataset.".red());
        println!("   The dataset does not contain education level information for candidates.");
        answer("data not available for this analysis".to_string());
        return;
    };

    println!("\nWin Rate by Education Level ({}):", column);
    rule();
    println!(
        "{:<30} {:<12} {:<12} {:<15} {:<15}",
        "Education Level", "Total", "Winners", "Win Rate %", "Avg Vote Share %"
    );
    rule();
    for level in &summary.levels {
        println!(
            "{:<30} {:<12} {:<12} {:<15} {:<15}",
            level.level,
            level.total_candidates,
            level.winners,
            percent(level.win_percentage, DISPLAY_DECIMALS),
            percent(level.avg_vote_share, DISPLAY_DECIMALS)
        );
    }

    let (Some(highest), Some(lowest)) = (&summary.highest, &summary.lowest) else {
        answer("no candidates have an education level recorded".to_string());
        return;
    };

    println!(
        "\nHighest Win Rate: {} ({})",
        highest.level.bright_green(),
        percent(highest.win_percentage, DISPLAY_DECIMALS)
    );
    println!(
        "Lowest Win Rate:  {} ({})",
        lowest.level.bright_red(),
        percent(lowest.win_percentage, DISPLAY_DECIMALS)
    );
    println!(
        "\nOverall Win Rate (across all education levels): {}",
        percent(summary.overall_win_percentage, DISPLAY_DECIMALS)
    );

    let direction = match summary.correlation {
        Some(Correlation::Positive) => "a positive",
        Some(Correlation::Negative) => "a negative",
        None => "no measurable",
    };
    answer(format!(
        "There is {} correlation between education level and winning chances (range: {} - {})",
        direction,
        percent(lowest.win_percentage, DISPLAY_DECIMALS),
        percent(highest.win_percentage, DISPLAY_DECIMALS)
    ));
}
