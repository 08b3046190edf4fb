use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::Duration,
};

use chrono::NaiveDateTime;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub trait TimeSource: Send + 'static {
    fn now(&self) -> NaiveDateTime;
}

/// the computer's local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl TimeSource for LocalClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub now: NaiveDateTime,
}

/// Owns the thread that produces a [`Tick`] every period.
///
/// Ticks stop for good once the ticker is stopped or dropped, there is no restarting it.
pub struct Ticker {
    // closing this channel is what tells the thread to quit
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    ticks: Receiver<Tick>,
}

impl Ticker {
    /// `waker` gets called after every tick, so whoever drains the ticks knows to look
    pub fn spawn<S, W>(source: S, period: Duration, waker: W) -> Self
    where
        S: TimeSource,
        W: Fn() + Send + 'static,
    {
        let (stop, stop_rx) = mpsc::channel::<()>();
        let (tick_tx, ticks) = mpsc::channel();
        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => {
                    if tick_tx.send(Tick { now: source.now() }).is_err() {
                        // nobody is listening anymore
                        break;
                    }
                    waker();
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        log::debug!("ticker started with period {period:?}");
        Self {
            stop: Some(stop),
            handle: Some(handle),
            ticks,
        }
    }

    /// all the ticks that came in since last time, never blocks
    pub fn ticks(&self) -> impl Iterator<Item = Tick> + '_ {
        self.ticks.try_iter()
    }

    /// Stops the ticker and waits for its thread to exit.
    pub fn stop(&mut self) {
        // dropping the sender wakes the thread up with Disconnected
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("ticker thread panicked");
            }
            log::debug!("ticker stopped");
        }
        // anything sent before the thread quit is thrown away
        while self.ticks.try_recv().is_ok() {}
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
