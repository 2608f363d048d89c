use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

enum PumpOp {
    Start(Duration),
    Stop,
    Quit,
}

/// Periodic tick source on its own thread.
///
/// While started it sends `tick` to the event channel once per interval.
/// `start` and `stop` only message the thread when the state changes, so
/// repeating either is a no-op.
pub struct Pump {
    control: Sender<PumpOp>,
    running: bool,
    handle: Option<JoinHandle<()>>,
}

impl Pump {
    pub fn spawn<E>(events: Sender<E>, tick: E) -> Self
    where
        E: Clone + Send + 'static,
    {
        let (control, ops) = mpsc::channel();
        let handle = thread::spawn(move || {
            let mut interval: Option<Duration> = None;
            let mut next = Instant::now();
            loop {
                // Block while stopped, otherwise wait for the next deadline.
                let op = match interval {
                    None => match ops.recv() {
                        Ok(op) => Some(op),
                        Err(_) => break,
                    },
                    Some(_) => {
                        let wait = next.saturating_duration_since(Instant::now());
                        match ops.recv_timeout(wait) {
                            Ok(op) => Some(op),
                            Err(RecvTimeoutError::Timeout) => None,
                            Err(RecvTimeoutError::Disconnected) => break,
                        }
                    }
                };
                match op {
                    Some(PumpOp::Start(every)) => {
                        interval = Some(every);
                        next = Instant::now() + every;
                    }
                    Some(PumpOp::Stop) => interval = None,
                    Some(PumpOp::Quit) => break,
                    None => {
                        if events.send(tick.clone()).is_err() {
                            break;
                        }
                        if let Some(every) = interval {
                            next += every;
                        }
                    }
                }
            }
            log::debug!("pump thread exiting");
        });
        Self {
            control,
            running: false,
            handle: Some(handle),
        }
    }

    pub fn start(&mut self, interval: Duration) {
        if !self.running {
            self.running = true;
            self.control.send(PumpOp::Start(interval)).ok();
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.control.send(PumpOp::Stop).ok();
        }
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Drop for Pump {
    fn drop(&mut self) {
        self.control.send(PumpOp::Quit).ok();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("pump thread panicked");
            }
        }
    }
}
