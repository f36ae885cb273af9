use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use timeguard_core::Timestamp;
use timeguard_ports::{
    ClockDevice, DeviceError, DeviceResult, HardwareClock, NetworkError, NetworkResult,
    TrustedTimeSource,
};

#[derive(Debug)]
struct RtcState {
    time: Timestamp,
    open_error: Option<String>,
    read_error: Option<String>,
    write_error: Option<String>,
    opens: usize,
    reads: usize,
    writes: Vec<Timestamp>,
}

/// In-memory hardware clock
///
/// Clones share state, so a test keeps one clone to inspect what the
/// validator did with the other. Time does not advance on its own: reads
/// return the last written (or initial) instant.
#[derive(Debug, Clone)]
pub struct SimulatedRtc {
    state: Arc<Mutex<RtcState>>,
    name: String,
}

impl SimulatedRtc {
    pub fn new(time: Timestamp) -> Self {
        Self {
            state: Arc::new(Mutex::new(RtcState {
                time,
                open_error: None,
                read_error: None,
                write_error: None,
                opens: 0,
                reads: 0,
                writes: Vec::new(),
            })),
            name: "SimulatedRtc".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Make every `open` fail with `reason`
    pub fn fail_open(self, reason: impl Into<String>) -> Self {
        self.state.lock().open_error = Some(reason.into());
        self
    }

    /// Make every `read` fail with `reason`
    pub fn fail_read(self, reason: impl Into<String>) -> Self {
        self.state.lock().read_error = Some(reason.into());
        self
    }

    /// Make every `set` fail with `reason`
    pub fn fail_write(self, reason: impl Into<String>) -> Self {
        self.state.lock().write_error = Some(reason.into());
        self
    }

    /// Instant currently held
    pub fn time(&self) -> Timestamp {
        self.state.lock().time
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().opens
    }

    pub fn read_count(&self) -> usize {
        self.state.lock().reads
    }

    /// Every instant successfully written, in order
    pub fn writes(&self) -> Vec<Timestamp> {
        self.state.lock().writes.clone()
    }
}

impl ClockDevice for SimulatedRtc {
    fn open(&self) -> DeviceResult<Box<dyn HardwareClock>> {
        let mut state = self.state.lock();
        state.opens += 1;
        if let Some(reason) = &state.open_error {
            return Err(DeviceError::Open(reason.clone()));
        }
        Ok(Box::new(SimulatedHandle {
            state: self.state.clone(),
        }))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

struct SimulatedHandle {
    state: Arc<Mutex<RtcState>>,
}

impl HardwareClock for SimulatedHandle {
    fn read(&mut self) -> DeviceResult<Timestamp> {
        let mut state = self.state.lock();
        state.reads += 1;
        match &state.read_error {
            Some(reason) => Err(DeviceError::Read(reason.clone())),
            None => Ok(state.time),
        }
    }

    fn set(&mut self, instant: Timestamp) -> DeviceResult<()> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.write_error {
            return Err(DeviceError::Write(reason.clone()));
        }
        state.time = instant;
        state.writes.push(instant);
        Ok(())
    }
}

/// Time source answering from a script
///
/// Responses are consumed in order; once the script runs out the last
/// response is repeated. An empty script fails every attempt.
#[derive(Debug)]
pub struct ScriptedTimeSource {
    server: String,
    script: Mutex<VecDeque<NetworkResult<Timestamp>>>,
    last: Mutex<Option<NetworkResult<Timestamp>>>,
    attempts: AtomicUsize,
}

impl ScriptedTimeSource {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Append a successful answer
    pub fn answer(self, instant: Timestamp) -> Self {
        self.script.lock().push_back(Ok(instant));
        self
    }

    /// Append a failed attempt
    pub fn fail(self, error: NetworkError) -> Self {
        self.script.lock().push_back(Err(error));
        self
    }

    /// Append `count` failed attempts
    pub fn fail_times(self, count: usize, error: NetworkError) -> Self {
        {
            let mut script = self.script.lock();
            for _ in 0..count {
                script.push_back(Err(error.clone()));
            }
        }
        self
    }

    /// Number of `fetch` calls so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrustedTimeSource for ScriptedTimeSource {
    async fn fetch(&self) -> NetworkResult<Timestamp> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().pop_front();
        let mut last = self.last.lock();
        match next {
            Some(response) => {
                *last = Some(response.clone());
                response
            }
            None => last.clone().unwrap_or_else(|| {
                Err(NetworkError::Io(format!(
                    "no scripted response from {}",
                    self.server
                )))
            }),
        }
    }

    fn server(&self) -> &str {
        &self.server
    }
}
