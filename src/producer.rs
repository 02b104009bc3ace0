use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::channel::{Command, Outbound};
use crate::error::{ProducerError, Result, StepError};

/// Default sleep between iterations while the outbound buffer is full
const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_millis(5);

/// User-supplied production behavior.
///
/// Both hooks run on the producer's background task, never on the host.
/// Implementations hold whatever mutable state the output sequence needs;
/// the loop owns the value once the producer is started.
pub trait Production: Send + 'static {
    /// Control message type accepted from the host
    type Msg: Send + 'static;

    /// Value type emitted to the host
    type Output: Send + 'static;

    /// React to one inbound control message.
    ///
    /// Runs before any production in the same loop iteration, so a
    /// reconfiguration is always visible to the next produced value. The
    /// handler may mutate internal state and may [`clear`](Outbound::clear)
    /// the outbound buffer to drop stale output.
    ///
    /// An error is logged and the message is dropped; it never reaches the
    /// host.
    fn handle_message(
        &mut self,
        msg: Self::Msg,
        outbound: &Outbound<Self::Output>,
    ) -> std::result::Result<(), StepError>;

    /// Produce the next value in the output sequence.
    ///
    /// Called only when the outbound buffer has free capacity; each
    /// successful call enqueues exactly one value. An error is logged and
    /// nothing is enqueued that iteration.
    fn production_step(&mut self) -> std::result::Result<Self::Output, StepError>;
}

/// Producer configuration
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Outbound buffer capacity; `None` means unbounded
    pub buffer_size: Option<usize>,
    /// Sleep between iterations while the outbound buffer is full
    pub idle_interval: Duration,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            buffer_size: None,
            idle_interval: DEFAULT_IDLE_INTERVAL,
        }
    }
}

/// Handle to an autonomous background producer.
///
/// Owns both sides of the coordination protocol: an unbounded inbound
/// channel carrying control messages to the generation loop, and an
/// optionally bounded outbound buffer carrying produced values back. The
/// loop runs on its own task once [`start`](Producer::start) is called and
/// shares no state with the host beyond the two channels.
///
/// A full outbound buffer throttles production entirely rather than
/// blocking the loop or dropping buffered values; the loop keeps draining
/// control messages while throttled.
pub struct Producer<P: Production> {
    production: Option<P>,
    cmd_tx: mpsc::UnboundedSender<Command<P::Msg>>,
    cmd_rx: Option<mpsc::UnboundedReceiver<Command<P::Msg>>>,
    outbound: Outbound<P::Output>,
    idle_interval: Duration,
    task: Option<JoinHandle<()>>,
    did_start: bool,
}

impl<P: Production> Producer<P> {
    /// Create a producer with an unbounded outbound buffer
    pub fn new(production: P) -> Self {
        Self::build(production, ProducerConfig::default())
    }

    /// Create a producer with the given configuration.
    ///
    /// Rejects a zero buffer size: a buffer that can never hold a value
    /// would silence the producer forever.
    pub fn with_config(production: P, config: ProducerConfig) -> Result<Self> {
        if config.buffer_size == Some(0) {
            return Err(ProducerError::ZeroBufferSize);
        }
        Ok(Self::build(production, config))
    }

    fn build(production: P, config: ProducerConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        Self {
            production: Some(production),
            cmd_tx,
            cmd_rx: Some(cmd_rx),
            outbound: Outbound::new(config.buffer_size),
            idle_interval: config.idle_interval,
            task: None,
            did_start: false,
        }
    }

    /// Spawn the generation loop on a background task.
    ///
    /// A producer starts at most once; a second call returns
    /// [`ProducerError::AlreadyStarted`] without spawning another loop on
    /// the same channels.
    pub fn start(&mut self) -> Result<()> {
        let (production, cmd_rx) = match (self.production.take(), self.cmd_rx.take()) {
            (Some(production), Some(cmd_rx)) => (production, cmd_rx),
            _ => return Err(ProducerError::AlreadyStarted),
        };

        let outbound = self.outbound.clone();
        let idle_interval = self.idle_interval;
        self.task = Some(tokio::spawn(run(production, cmd_rx, outbound, idle_interval)));
        self.did_start = true;

        Ok(())
    }

    /// Send a control message to the generation loop.
    ///
    /// Never fails: inbound is unbounded, and a message sent after the loop
    /// has exited is simply never drained.
    pub fn send(&self, msg: P::Msg) {
        let _ = self.cmd_tx.send(Command::Message(msg));
    }

    /// Return the oldest produced value, suspending until one is available
    pub async fn get(&mut self) -> Result<P::Output> {
        if !self.did_start {
            return Err(ProducerError::NotStarted);
        }
        Ok(self.outbound.pop().await)
    }

    /// Like [`get`](Producer::get), but gives up after `wait`
    pub async fn get_timeout(&mut self, wait: Duration) -> Result<P::Output> {
        if !self.did_start {
            return Err(ProducerError::NotStarted);
        }
        tokio::time::timeout(wait, self.outbound.pop())
            .await
            .map_err(|_| ProducerError::Timeout)
    }

    /// Non-blocking variant of [`get`](Producer::get).
    ///
    /// Returns `None` when nothing is buffered, including on a producer
    /// that was never started.
    pub fn try_get(&mut self) -> Option<P::Output> {
        self.outbound.try_pop()
    }

    /// Ask the generation loop to quit, and wait for it to exit.
    ///
    /// The quit signal travels the inbound channel, so control messages
    /// sent before `stop` are still handled first. No-op on a producer
    /// that was never started.
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        let _ = self.cmd_tx.send(Command::Quit);
        if let Err(e) = task.await {
            warn!(error = %e, "Producer task ended abnormally");
        }
    }

    /// Number of values currently buffered in outbound
    pub fn buffered(&self) -> usize {
        self.outbound.len()
    }
}

/// Generation loop: drain at most one control message, then produce at most
/// one value, idling while the outbound buffer is full.
#[instrument(skip_all, name = "producer")]
async fn run<P: Production>(
    mut production: P,
    mut commands: mpsc::UnboundedReceiver<Command<P::Msg>>,
    outbound: Outbound<P::Output>,
    idle_interval: Duration,
) {
    info!(buffer = ?outbound.capacity(), "Producer starting");

    loop {
        // One message per iteration: a chatty host cannot starve production,
        // and the drain-then-produce order makes a handled message visible
        // to the value produced in the same iteration
        match commands.try_recv() {
            Ok(Command::Message(msg)) => {
                debug!("Handling control message");
                if let Err(e) = production.handle_message(msg, &outbound) {
                    warn!(error = %e, "Message handler failed, skipping message");
                }
            }
            Ok(Command::Quit) => {
                info!("Received quit signal");
                break;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                // Host dropped its handle; no one is left to observe output
                info!("Host handle dropped");
                break;
            }
        }

        if outbound.is_full() {
            // Backpressure: defer production but stay responsive to inbound
            tokio::time::sleep(idle_interval).await;
            continue;
        }

        match production.production_step() {
            Ok(value) => {
                outbound.push(value);
            }
            Err(e) => warn!(error = %e, "Production step failed, skipping iteration"),
        }

        // The hooks never await, so the loop must yield on its own to let
        // other tasks onto the runtime
        tokio::task::yield_now().await;
    }

    info!("Producer shutting down");
}
