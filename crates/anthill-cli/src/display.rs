//! Terminal rendering of frames, statistics and shutdown summaries.

use anthill::prelude::{AgentSnapshot, ColonyStats, Frame, IterationReport, ShutdownReport};
use colored::Colorize;

const RULE_WIDTH: usize = 40;

pub fn banner(title: &str) -> String {
    format!("\n{} {} {}\n", "-----".dimmed(), title.white().bold(), "-----".dimmed())
}

pub fn rule() -> String {
    "═".repeat(RULE_WIDTH).dimmed().to_string()
}

/// One spawned ant, as logged at startup.
pub fn spawned(agent: &AgentSnapshot) -> String {
    format!("  {} {}", "✓".green(), agent)
}

pub fn stats(stats: &ColonyStats) -> String {
    let state = if stats.is_active() {
        "ACTIVE".green().bold()
    } else {
        "INACTIVE".red().bold()
    };
    let mut out = String::new();
    out.push_str(&format!("  Active ants:      {}\n", stats.agents_alive.to_string().cyan()));
    out.push_str(&format!(
        "  Update interval:  {} ms\n",
        stats.update_interval_ms.to_string().cyan()
    ));
    out.push_str(&format!(
        "  Nest at:          X = {} Y = {}\n",
        stats.nest.x.to_string().cyan(),
        stats.nest.y.to_string().cyan()
    ));
    out.push_str(&format!(
        "  Moves:            {} committed, {} rejected\n",
        stats.moves_committed.to_string().green(),
        stats.moves_rejected.to_string().yellow()
    ));
    out.push_str(&format!("  State:            {}", state));
    out
}

/// Map plus statistics for one observed frame.
pub fn frame(frame: &Frame) -> String {
    format!(
        "{}\n{}{}\n{}",
        banner(&format!("FRAME {}", frame.iteration)),
        frame.view,
        rule(),
        stats(&frame.stats)
    )
}

/// Tally of a manual stepping run.
pub fn iterations(report: &IterationReport) -> String {
    format!(
        "{} {} iterations: {} attempts, {} moved, {} rejected (edge {}, nest {}, occupied {})",
        "✓".green().bold(),
        report.iterations.to_string().cyan(),
        report.attempted,
        report.moved.to_string().green(),
        report.rejected().to_string().yellow(),
        report.rejected_out_of_bounds,
        report.rejected_nest,
        report.rejected_occupied
    )
}

pub fn shutdown(report: &ShutdownReport) -> String {
    let mut out = format!(
        "{} Stopped {} ants, joined {} tasks",
        "✓".green().bold(),
        report.stopped.to_string().cyan(),
        report.joined.to_string().cyan()
    );
    for id in &report.timed_out {
        out.push_str(&format!("\n  {} {} did not finish in time", "•".yellow(), id));
    }
    for id in &report.failed {
        out.push_str(&format!("\n  {} {} ended abnormally", "✗".red(), id));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anthill::prelude::{AgentId, Position};

    fn plain() {
        colored::control::set_override(false);
    }

    fn sample_stats(alive: usize) -> ColonyStats {
        ColonyStats {
            agents_total: 5,
            agents_alive: alive,
            agents_stopped: 5 - alive,
            moves_committed: 12,
            moves_rejected: 3,
            width: 10,
            height: 10,
            nest: Position::new(5, 5),
            update_interval_ms: 100,
        }
    }

    #[test]
    fn stats_show_nest_and_state() {
        plain();
        let text = stats(&sample_stats(5));
        assert!(text.contains("Active ants:      5"));
        assert!(text.contains("Update interval:  100 ms"));
        assert!(text.contains("Nest at:          X = 5 Y = 5"));
        assert!(text.contains("State:            ACTIVE"));

        let idle = stats(&sample_stats(0));
        assert!(idle.contains("INACTIVE"));
    }

    #[test]
    fn iterations_break_down_rejections() {
        plain();
        let report = IterationReport {
            iterations: 2,
            attempted: 10,
            moved: 6,
            rejected_out_of_bounds: 1,
            rejected_nest: 1,
            rejected_occupied: 2,
        };
        let text = iterations(&report);
        assert!(text.contains("2 iterations: 10 attempts, 6 moved, 4 rejected"));
        assert!(text.contains("(edge 1, nest 1, occupied 2)"));
    }

    #[test]
    fn shutdown_lists_stragglers() {
        plain();
        let report = ShutdownReport {
            stopped: 2,
            joined: 1,
            timed_out: vec![AgentId::new("QUEEN_1")],
            failed: vec![],
        };
        let text = shutdown(&report);
        assert!(text.contains("Stopped 2 ants, joined 1 tasks"));
        assert!(text.contains("QUEEN_1 did not finish in time"));
    }
}
