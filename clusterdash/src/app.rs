//! App state and main loop: input handling, applying poll results, and drawing.

use std::{
    io,
    time::{Duration, Instant},
};

use clusterdash_core::{ChartScale, Reconciler, Tab, WidgetData, WidgetId, WidgetKey};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Paragraph,
    Terminal,
};
use tokio::sync::mpsc::{error::TryRecvError, UnboundedReceiver};
use tokio::time::sleep;
use tracing::info;

use crate::poller::PollEvent;
use crate::surface::TuiSurface;
use crate::ui::{
    buckets::draw_buckets,
    charts::{draw_chart_tab, grid_rows},
    clusters::draw_cluster_list,
    header::{draw_banner, draw_header},
    nodes::draw_nodes,
    stats::draw_stats,
    tabs::{draw_badges, draw_tab_bar},
    theme::MUTED,
};

const FRAME: Duration = Duration::from_millis(100);

pub struct App {
    reconciler: Reconciler<TuiSurface>,
    endpoint: String,
    chart_scroll: usize,
    should_quit: bool,
}

impl App {
    pub fn new(endpoint: impl Into<String>, throttle: Duration) -> Self {
        Self {
            reconciler: Reconciler::with_throttle(TuiSurface::new(), throttle),
            endpoint: endpoint.into(),
            chart_scroll: 0,
            should_quit: false,
        }
    }

    pub fn reconciler(&self) -> &Reconciler<TuiSurface> {
        &self.reconciler
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn chart_scroll(&self) -> usize {
        self.chart_scroll
    }

    pub async fn run(&mut self, mut events: UnboundedReceiver<PollEvent>) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal, &mut events).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &mut UnboundedReceiver<PollEvent>,
    ) -> anyhow::Result<()> {
        loop {
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    if k.kind == KeyEventKind::Press {
                        self.handle_key(k, Instant::now());
                    }
                }
            }
            if self.should_quit {
                break;
            }

            let now = Instant::now();
            loop {
                match events.try_recv() {
                    Ok(ev) => self.apply(ev, now),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => anyhow::bail!("poller stopped"),
                }
            }
            self.reconciler.run_deferred(now);
            self.reconciler.tick(now);

            terminal.draw(|f| self.draw(f))?;
            sleep(FRAME).await;
        }
        info!("quit requested");
        Ok(())
    }

    pub fn apply(&mut self, ev: PollEvent, now: Instant) {
        match ev {
            PollEvent::Snapshots { seq, clusters } => {
                self.reconciler.ingest(seq, clusters, now);
            }
            PollEvent::Failed { seq, error } => {
                self.reconciler.report_transport_error(seq, error.to_string());
            }
        }
    }

    pub fn handle_key(&mut self, k: KeyEvent, now: Instant) {
        match k.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => self.move_focus(-1),
            KeyCode::Down => self.move_focus(1),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.show_tab(Tab::ALL[idx]);
            }
            KeyCode::Tab => {
                let current = self.focused_tab();
                self.show_tab(current.next());
            }
            KeyCode::Char('[') => self.step_bucket(-1, now),
            KeyCode::Char(']') => self.step_bucket(1, now),
            KeyCode::Char('l') | KeyCode::Char('L') => {
                if let Some(id) = self.reconciler.focused().cloned() {
                    let scale = self.reconciler.scale(&id).toggled();
                    self.reconciler.set_scale(&id, scale);
                }
            }
            KeyCode::PageDown => {
                self.chart_scroll = (self.chart_scroll + 1).min(grid_rows().saturating_sub(1));
            }
            KeyCode::PageUp => self.chart_scroll = self.chart_scroll.saturating_sub(1),
            _ => {}
        }
    }

    fn move_focus(&mut self, delta: isize) {
        if self.reconciler.cycle_focus(delta).is_some() {
            self.chart_scroll = 0;
        }
    }

    fn focused_tab(&self) -> Tab {
        self.reconciler
            .focused()
            .and_then(|id| self.reconciler.visible_tab(id))
            .unwrap_or(Tab::DEFAULT)
    }

    fn show_tab(&mut self, tab: Tab) {
        if let Some(id) = self.reconciler.focused().cloned() {
            self.reconciler.set_active_tab(&id, tab);
        }
    }

    fn step_bucket(&mut self, delta: isize, now: Instant) {
        let Some(id) = self.reconciler.focused().cloned() else {
            return;
        };
        let current = self.reconciler.selected_bucket(&id) as isize;
        let next = (current + delta).max(0) as usize;
        self.reconciler.select_bucket(&id, next, now);
    }

    pub fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();
        let banner = self.reconciler.banner();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),                                  // header
                Constraint::Length(if banner.is_some() { 1 } else { 0 }), // banner
                Constraint::Min(8),                                     // body
            ])
            .split(area);

        let surface = self.reconciler.surface();
        draw_header(
            f,
            rows[0],
            &self.endpoint,
            surface.order().len(),
            self.reconciler.last_updated(),
        );
        if let Some(b) = banner {
            draw_banner(f, rows[1], &b.message);
        }

        let Some(focused) = self.reconciler.focused() else {
            f.render_widget(
                Paragraph::new(format!("Waiting for clusters from {}", self.endpoint))
                    .style(Style::default().fg(MUTED)),
                rows[2],
            );
            return;
        };

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(40)])
            .split(rows[2]);
        draw_cluster_list(f, body[0], surface, Some(focused));

        let panel = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // badges
                Constraint::Length(1), // tab bar
                Constraint::Min(6),    // tab content
            ])
            .split(body[1]);

        let key = |w: WidgetId| WidgetKey::new(focused.clone(), w);
        draw_badges(
            f,
            panel[0],
            surface.data(&key(WidgetId::HealthBadge)),
            surface.data(&key(WidgetId::CapacityBadge)),
        );
        let tab = self.focused_tab();
        draw_tab_bar(f, panel[1], tab);

        let content = panel[2];
        match tab {
            Tab::Nodes => {
                let nodes = match surface.data(&key(WidgetId::NodesTable)) {
                    Some(WidgetData::Nodes(n)) => Some(n.as_slice()),
                    _ => None,
                };
                draw_nodes(f, content, nodes);
            }
            Tab::Buckets => {
                let buckets = match surface.data(&key(WidgetId::BucketsTable)) {
                    Some(WidgetData::Buckets(b)) => Some(b.as_slice()),
                    _ => None,
                };
                draw_buckets(f, content, buckets);
            }
            Tab::Stats => {
                let groups = match surface.data(&key(WidgetId::SystemStats)) {
                    Some(WidgetData::Stats(g)) => Some(g.as_slice()),
                    _ => None,
                };
                draw_stats(f, content, groups);
            }
            Tab::Charts => draw_chart_tab(f, content, surface, focused, self.chart_scroll),
        }
    }

    /// Current chart scale of the focused cluster.
    pub fn focused_scale(&self) -> ChartScale {
        self.reconciler
            .focused()
            .map(|id| self.reconciler.scale(id))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterdash_core::types::BucketStatSeries;
    use clusterdash_core::{ClusterId, ClusterSnapshot, Phase};
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn press(app: &mut App, code: KeyCode, now: Instant) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), now);
    }

    fn snap(id: &str, index: usize, buckets: &[&str]) -> ClusterSnapshot {
        let mut s = ClusterSnapshot::new(id);
        s.display_index = index;
        for name in buckets {
            let mut b = BucketStatSeries {
                name: name.to_string(),
                ..Default::default()
            };
            b.samples.insert("timestamp".into(), vec![1.0, 2.0, 3.0]);
            b.samples.insert("mem_used".into(), vec![1.0, f64::NAN, 3.0]);
            s.bucket_stats.push(b);
        }
        s
    }

    fn loaded_app(now: Instant) -> App {
        let mut app = App::new("http://dash/api/clusters", Duration::ZERO);
        app.apply(
            PollEvent::Snapshots {
                seq: 1,
                clusters: vec![snap("a", 0, &["beer", "travel"]), snap("b", 1, &[])].into(),
            },
            now,
        );
        app
    }

    #[test]
    fn tab_keys_activate_lazy_groups_on_next_turn() {
        let now = Instant::now();
        let mut app = loaded_app(now);
        let a = ClusterId::from("a");
        press(&mut app, KeyCode::Char('4'), now);
        assert_eq!(app.reconciler().visible_tab(&a), Some(Tab::Charts));
        let header = WidgetKey::new(a.clone(), WidgetId::BucketHeader);
        assert_eq!(app.reconciler().registry().phase(&header), Some(Phase::Deferred));

        app.reconciler.run_deferred(now);
        assert_eq!(app.reconciler().registry().phase(&header), Some(Phase::Live));
    }

    #[test]
    fn arrows_move_focus_and_brackets_pick_buckets() {
        let now = Instant::now();
        let mut app = loaded_app(now);
        let a = ClusterId::from("a");
        press(&mut app, KeyCode::Char(']'), now);
        assert_eq!(app.reconciler().selected_bucket(&a), 1);
        press(&mut app, KeyCode::Char('['), now);
        press(&mut app, KeyCode::Char('['), now);
        assert_eq!(app.reconciler().selected_bucket(&a), 0);

        press(&mut app, KeyCode::Down, now);
        assert_eq!(app.reconciler().focused(), Some(&ClusterId::from("b")));
    }

    #[test]
    fn scale_toggle_and_quit() {
        let now = Instant::now();
        let mut app = loaded_app(now);
        press(&mut app, KeyCode::Char('l'), now);
        assert_eq!(app.focused_scale(), ChartScale::Logarithmic);
        press(&mut app, KeyCode::Char('q'), now);
        assert!(app.should_quit());
    }

    #[test]
    fn transport_failure_shows_banner() {
        let now = Instant::now();
        let mut app = loaded_app(now);
        app.apply(
            PollEvent::Failed {
                seq: 2,
                error: crate::poller::PollError::Decode("bad".into()),
            },
            now,
        );
        assert!(app.reconciler().banner().is_some());
        assert_eq!(app.reconciler().clusters().len(), 2);
    }

    #[test]
    fn every_tab_draws_without_panicking() {
        let now = Instant::now();
        let mut app = loaded_app(now);
        let mut terminal = Terminal::new(TestBackend::new(120, 60)).unwrap();
        for code in ['1', '2', '3', '4'] {
            press(&mut app, KeyCode::Char(code), now);
            app.reconciler.run_deferred(now);
            terminal.draw(|f| app.draw(f)).unwrap();
        }
        press(&mut app, KeyCode::PageDown, now);
        press(&mut app, KeyCode::Char('l'), now);
        terminal.draw(|f| app.draw(f)).unwrap();
        let empty = App::new("http://dash/api/clusters", Duration::ZERO);
        terminal.draw(|f| empty.draw(f)).unwrap();
    }
}
