//! Reactive Binder
//! Re-runs the pipeline on a worker thread whenever the selection changes.

use super::pipeline::{DashboardFigures, Pipeline, PipelineSettings};
use crate::data::{IncidentTable, Selection};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderState {
    Idle,
    Computing,
}

/// Observes the selection and emits complete chart bundles.
///
/// At most one computation runs at a time. A selection made while one is
/// running is kept as pending; newer selections overwrite older pending
/// ones, and the pending selection starts once the running one has been
/// collected.
pub struct ReactiveBinder {
    table: Arc<IncidentTable>,
    settings: PipelineSettings,
    state: BinderState,
    result_rx: Option<Receiver<DashboardFigures>>,
    in_flight: Option<Selection>,
    pending: Option<Selection>,
    displayed: Option<Selection>,
}

impl ReactiveBinder {
    pub fn new(table: Arc<IncidentTable>, settings: PipelineSettings) -> Self {
        Self {
            table,
            settings,
            state: BinderState::Idle,
            result_rx: None,
            in_flight: None,
            pending: None,
            displayed: None,
        }
    }

    pub fn state(&self) -> BinderState {
        self.state
    }

    pub fn pending(&self) -> Option<&Selection> {
        self.pending.as_ref()
    }

    /// React to a selector change.
    pub fn select(&mut self, selection: Selection) {
        match self.state {
            BinderState::Idle => {
                if self.displayed.as_ref() != Some(&selection) {
                    self.start(selection);
                }
            }
            BinderState::Computing => {
                if self.in_flight.as_ref() == Some(&selection) {
                    self.pending = None;
                } else {
                    debug!(region = %selection.region, month = selection.month, "selection queued");
                    self.pending = Some(selection);
                }
            }
        }
    }

    /// Non-blocking check for a finished bundle.
    pub fn poll(&mut self) -> Option<DashboardFigures> {
        let received = self.result_rx.as_ref()?.try_recv();
        match received {
            Ok(figures) => Some(self.finish(figures)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.abandon();
                None
            }
        }
    }

    /// Block until the running computation finishes.
    pub fn wait(&mut self) -> Option<DashboardFigures> {
        let received = self.result_rx.as_ref()?.recv();
        match received {
            Ok(figures) => Some(self.finish(figures)),
            Err(_) => {
                self.abandon();
                None
            }
        }
    }

    fn start(&mut self, selection: Selection) {
        let (tx, rx) = channel();
        self.result_rx = Some(rx);
        self.in_flight = Some(selection.clone());
        self.state = BinderState::Computing;

        let table = Arc::clone(&self.table);
        let settings = self.settings.clone();

        // Run calculation in background thread
        thread::spawn(move || {
            let figures = Pipeline::compute(&table, &selection, &settings);
            let _ = tx.send(figures);
        });
    }

    fn finish(&mut self, figures: DashboardFigures) -> DashboardFigures {
        self.result_rx = None;
        self.in_flight = None;
        self.state = BinderState::Idle;
        self.displayed = Some(figures.selection.clone());

        if let Some(next) = self.pending.take() {
            if next != figures.selection {
                self.start(next);
            }
        }

        figures
    }

    /// The worker went away without a result.
    fn abandon(&mut self) {
        warn!("dashboard computation ended without a result");
        self.result_rx = None;
        self.in_flight = None;
        self.state = BinderState::Idle;

        if let Some(next) = self.pending.take() {
            self.start(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Incident;

    fn table() -> Arc<IncidentTable> {
        let incident = |region: &str, month: u32, nkill: f64| Incident {
            year: Some(2021),
            month: Some(month),
            day: Some(1),
            region: Some(region.to_string()),
            country: Some("Iraq".to_string()),
            fatalities: Some(nkill),
            ..Default::default()
        };
        Arc::new(IncidentTable::new(vec![
            incident("Middle East & North Africa", 1, 2.0),
            incident("Middle East & North Africa", 2, 3.0),
            incident("South Asia", 1, 5.0),
        ]))
    }

    #[test]
    fn select_computes_one_bundle() {
        let mut binder = ReactiveBinder::new(table(), PipelineSettings::default());
        assert_eq!(binder.state(), BinderState::Idle);

        binder.select(Selection::new("South Asia", 1));
        assert_eq!(binder.state(), BinderState::Computing);

        let figures = binder.wait().unwrap();
        assert_eq!(figures.selection, Selection::new("South Asia", 1));
        assert_eq!(figures.charts.len(), 7);
        assert_eq!(binder.state(), BinderState::Idle);
        assert!(binder.wait().is_none());
    }

    #[test]
    fn changes_during_computation_coalesce() {
        let mut binder = ReactiveBinder::new(table(), PipelineSettings::default());

        binder.select(Selection::new("South Asia", 1));
        binder.select(Selection::new("South Asia", 2));
        binder.select(Selection::new("Middle East & North Africa", 2));
        assert_eq!(
            binder.pending(),
            Some(&Selection::new("Middle East & North Africa", 2))
        );

        let first = binder.wait().unwrap();
        assert_eq!(first.selection, Selection::new("South Asia", 1));
        assert_eq!(binder.state(), BinderState::Computing);

        let second = binder.wait().unwrap();
        assert_eq!(
            second.selection,
            Selection::new("Middle East & North Africa", 2)
        );
        assert!(binder.wait().is_none());
    }

    #[test]
    fn reselecting_in_flight_value_drops_pending() {
        let mut binder = ReactiveBinder::new(table(), PipelineSettings::default());

        binder.select(Selection::new("South Asia", 1));
        binder.select(Selection::new("South Asia", 2));
        binder.select(Selection::new("South Asia", 1));
        assert!(binder.pending().is_none());

        binder.wait().unwrap();
        assert_eq!(binder.state(), BinderState::Idle);
    }

    #[test]
    fn unchanged_selection_is_not_recomputed() {
        let mut binder = ReactiveBinder::new(table(), PipelineSettings::default());

        binder.select(Selection::new("South Asia", 1));
        binder.wait().unwrap();

        binder.select(Selection::new("South Asia", 1));
        assert_eq!(binder.state(), BinderState::Idle);
    }

    #[test]
    fn poll_eventually_delivers() {
        let mut binder = ReactiveBinder::new(table(), PipelineSettings::default());
        binder.select(Selection::new("Middle East & North Africa", 2));

        let figures = loop {
            if let Some(figures) = binder.poll() {
                break figures;
            }
            thread::yield_now();
        };
        assert_eq!(figures.selection.month, 2);
    }
}
