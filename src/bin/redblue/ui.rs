//! Terminal rendering for the engine monitor.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use redblue::alloc::PlayMode;

use super::app::MonitorSnapshot;

pub fn render(frame: &mut Frame, snap: &MonitorSnapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Length(4), // Voice pitch CVs
            Constraint::Length(4), // Modulation CVs
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_status(frame, chunks[0], snap);
    render_voices(frame, chunks[1], snap);
    render_mods(frame, chunks[2], snap);

    let help = Paragraph::new(" [Q] Quit").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}

fn render_status(frame: &mut Frame, area: Rect, snap: &MonitorSnapshot) {
    let mode = match snap.mode {
        PlayMode::Unison => "UNISON",
        PlayMode::Duophonic => "DUOPHONIC",
    };

    let (held, count) = snap.held;
    let held: Vec<String> = held[..count].iter().map(|n| n.to_string()).collect();

    let stats = match snap.report {
        Some(report) => format!(
            "{} ticks/s  avg {:?}  max {:?}",
            report.ticks_per_second, report.avg_tick, report.max_tick
        ),
        None => "warming up...".to_string(),
    };

    let line = format!(
        " mode {}  held [{}]  |  {}",
        mode,
        held.join(" "),
        stats
    );
    let block = Block::default().title(" redblue ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_voices(frame: &mut Frame, area: Rect, snap: &MonitorSnapshot) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let voices = [
        ("RED", Color::Red, 0usize),
        ("BLUE", Color::Blue, 1usize),
    ];

    for (label, color, i) in voices {
        let volts = snap.frame.pitch[i];
        let gate = if snap.frame.gate[i] { "GATE" } else { "    " };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            // Pitch CVs span roughly -1 V to +6 V over the MIDI range.
            .ratio((((volts + 1.0) / 7.0) as f64).clamp(0.0, 1.0))
            .label(format!("{label} {volts:+.2} V {gate}"));
        frame.render_widget(gauge, rows[i]);
    }
}

fn render_mods(frame: &mut Frame, area: Rect, snap: &MonitorSnapshot) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let jacks = [("CV C", snap.frame.mod_c, 0usize), ("CV D", snap.frame.mod_d, 1usize)];

    for (label, volts, i) in jacks {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta))
            // Modulation jacks swing -5 V to +8 V across their ranges.
            .ratio((((volts + 5.0) / 13.0) as f64).clamp(0.0, 1.0))
            .label(format!("{label} {volts:+.2} V"));
        frame.render_widget(gauge, rows[i]);
    }
}
