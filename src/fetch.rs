//! Background network work for the UI loop.
//!
//! Each request runs on its own thread and reports back over a channel that
//! the main loop drains once per frame, so the clock never blocks on I/O.

use crate::api::{LocalInfo, MapSource, WorldApi};
use crate::city::City;
use crate::error::{ApiError, LookupError, ProjectionError};
use crate::topo::LandTopology;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A finished background request.
#[derive(Debug)]
pub enum Outcome {
    Time(Result<i64, ApiError>),
    Local(Result<LocalInfo, ApiError>),
    City {
        generation: u64,
        result: Result<City, LookupError>,
    },
    Map(Result<LandTopology, ProjectionError>),
}

pub struct Fetcher {
    api: Arc<dyn WorldApi>,
    sender: Sender<Outcome>,
    receiver: Receiver<Outcome>,
}

impl Fetcher {
    pub fn new(api: Arc<dyn WorldApi>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { api, sender, receiver }
    }

    fn spawn(&self, job: impl FnOnce(&dyn WorldApi) -> Outcome + Send + 'static) {
        let api = Arc::clone(&self.api);
        let tx = self.sender.clone();
        thread::spawn(move || {
            // Receiver gone means the UI is shutting down
            let _ = tx.send(job(api.as_ref()));
        });
    }

    pub fn request_time(&self, timezones: Vec<String>) {
        self.spawn(move |api| Outcome::Time(api.server_time(&timezones)));
    }

    pub fn request_local(&self) {
        self.spawn(|api| Outcome::Local(api.local_info()));
    }

    pub fn request_city(&self, query: String, generation: u64) {
        self.spawn(move |api| Outcome::City {
            generation,
            result: api.lookup_city(&query),
        });
    }

    pub fn request_map(&self, source: MapSource, object: String, timeout: Duration) {
        self.spawn(move |_| Outcome::Map(source.load(&object, timeout)));
    }

    /// Everything that finished since the last call.
    pub fn drain(&self) -> Vec<Outcome> {
        let mut done = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(outcome) => done.push(outcome),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        done
    }
}
